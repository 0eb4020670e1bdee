//! Overlay styling: colors, outline, shadow and background box.

use image::Rgba;

/// Parse `#RRGGBB` (the `#` is optional). Anything else is black.
pub(crate) fn parse_hex_rgb(value: &str) -> [u8; 3] {
    let hex = value.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return [0, 0, 0];
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16);
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Ok(r), Ok(g), Ok(b)) => [r, g, b],
        _ => [0, 0, 0],
    }
}

/// Hex color plus an opacity clamped to `[0, 1]`.
pub(crate) fn parse_hex_rgba(value: &str, opacity: f32) -> Rgba<u8> {
    let [r, g, b] = parse_hex_rgb(value);
    Rgba([r, g, b, opacity_to_alpha(opacity)])
}

pub(crate) fn opacity_to_alpha(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0) as u8
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ShadowStyle {
    pub enabled: bool,
    pub color: String,
    pub opacity: f32,
    pub dx: i32,
    pub dy: i32,
}

impl ShadowStyle {
    pub(crate) fn is_visible(&self) -> bool {
        self.enabled && self.opacity > 0.0
    }
}

impl Default for ShadowStyle {
    fn default() -> Self {
        Self {
            enabled: true,
            color: "#000000".to_string(),
            opacity: 0.5,
            dx: 2,
            dy: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BoxStyle {
    pub enabled: bool,
    pub color: String,
    pub opacity: f32,
    pub padding: u32,
}

impl BoxStyle {
    pub(crate) fn is_visible(&self) -> bool {
        self.enabled && self.opacity > 0.0
    }
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            enabled: false,
            color: "#000000".to_string(),
            opacity: 0.25,
            padding: 16,
        }
    }
}

/// Complete text style shared by every segment of one render.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OverlayStyle {
    pub font_size: f32,
    pub color: String,
    pub stroke_width: u32,
    pub stroke_color: String,
    pub shadow: ShadowStyle,
    pub background: BoxStyle,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            font_size: 50.0,
            color: "#FFFFFF".to_string(),
            stroke_width: 2,
            stroke_color: "#000000".to_string(),
            shadow: ShadowStyle::default(),
            background: BoxStyle::default(),
        }
    }
}

impl OverlayStyle {
    /// Paint for the main text layer.
    pub(crate) fn text_paint(&self) -> TextPaint {
        TextPaint {
            size: self.font_size,
            fill: parse_hex_rgba(&self.color, 1.0),
            stroke_width: self.stroke_width,
            stroke: (self.stroke_width > 0).then(|| parse_hex_rgba(&self.stroke_color, 1.0)),
        }
    }

    /// Paint for the shadow layer: no outline, but the same canvas padding as the text.
    pub(crate) fn shadow_paint(&self) -> TextPaint {
        TextPaint {
            size: self.font_size,
            fill: parse_hex_rgba(&self.shadow.color, self.shadow.opacity),
            stroke_width: self.stroke_width,
            stroke: None,
        }
    }

    pub(crate) fn box_fill(&self) -> Rgba<u8> {
        parse_hex_rgba(&self.background.color, self.background.opacity)
    }
}

/// How one text raster is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TextPaint {
    pub size: f32,
    pub fill: Rgba<u8>,
    /// Canvas padding reserved for the outline on every side.
    pub stroke_width: u32,
    pub stroke: Option<Rgba<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex_rgb("#FF8000"), [255, 128, 0]);
        assert_eq!(parse_hex_rgb("00ff7f"), [0, 255, 127]);
        assert_eq!(parse_hex_rgb("  #ffffff "), [255, 255, 255]);
    }

    #[test]
    fn test_parse_hex_invalid_is_black() {
        assert_eq!(parse_hex_rgb(""), [0, 0, 0]);
        assert_eq!(parse_hex_rgb("#FFF"), [0, 0, 0]);
        assert_eq!(parse_hex_rgb("#GGGGGG"), [0, 0, 0]);
        assert_eq!(parse_hex_rgb("white"), [0, 0, 0]);
        assert_eq!(parse_hex_rgb("#ééé"), [0, 0, 0]);
    }

    #[test]
    fn test_opacity_clamping() {
        assert_eq!(opacity_to_alpha(1.5), 255);
        assert_eq!(opacity_to_alpha(-0.5), 0);
        assert_eq!(opacity_to_alpha(0.25), 63);
        assert_eq!(parse_hex_rgba("#102030", 0.5), Rgba([16, 32, 48, 127]));
    }

    #[test]
    fn test_visibility_requires_opacity() {
        let mut shadow = ShadowStyle::default();
        assert!(shadow.is_visible());
        shadow.opacity = 0.0;
        assert!(!shadow.is_visible());

        let mut background = BoxStyle::default();
        assert!(!background.is_visible());
        background.enabled = true;
        assert!(background.is_visible());
    }

    #[test]
    fn test_paints() {
        let style = OverlayStyle::default();
        let text = style.text_paint();
        assert_eq!(text.fill, Rgba([255, 255, 255, 255]));
        assert_eq!(text.stroke, Some(Rgba([0, 0, 0, 255])));

        let shadow = style.shadow_paint();
        assert_eq!(shadow.stroke, None);
        assert_eq!(shadow.stroke_width, text.stroke_width);
        assert_eq!(shadow.fill, Rgba([0, 0, 0, 127]));

        let flat = OverlayStyle {
            stroke_width: 0,
            ..OverlayStyle::default()
        };
        assert_eq!(flat.text_paint().stroke, None);
    }
}
