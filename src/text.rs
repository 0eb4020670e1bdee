//! Text rasterization with `fontdue`.

use std::fs;
use std::path::Path;

use fontdue::layout::{
    CoordinateSystem, GlyphPosition, HorizontalAlign, Layout, LayoutSettings, TextStyle, WrapStyle,
};
use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};

use crate::error::{OverlayError, OverlayResult};
use crate::style::TextPaint;

/// Turns a string into a tightly cropped RGBA raster.
///
/// Lines wrap at `max_width` and are centered against each other. The raster
/// is padded by `paint.stroke_width` on every side so outlined and plain
/// rasters of the same text have identical sizes.
pub(crate) trait Typesetter {
    fn typeset(&self, text: &str, max_width: u32, paint: &TextPaint) -> RgbaImage;
}

/// DejaVu Sans, used when no font file is found on the system.
const BUILTIN_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
pub(crate) const BUILTIN_FONT_NAME: &str = "built-in DejaVu Sans";

pub(crate) struct FontPainter {
    font: Font,
    source: String,
}

impl FontPainter {
    pub(crate) fn load(path: &Path) -> OverlayResult<Self> {
        let font_error = |message: String| OverlayError::FontLoad {
            path: path.to_path_buf(),
            message,
        };
        let bytes = fs::read(path).map_err(|e| font_error(e.to_string()))?;
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|message| font_error(message.to_string()))?;
        Ok(Self {
            font,
            source: path.display().to_string(),
        })
    }

    pub(crate) fn builtin() -> OverlayResult<Self> {
        let font = Font::from_bytes(BUILTIN_FONT, FontSettings::default()).map_err(|message| {
            OverlayError::FontLoad {
                path: BUILTIN_FONT_NAME.into(),
                message: message.to_string(),
            }
        })?;
        Ok(Self {
            font,
            source: BUILTIN_FONT_NAME.to_string(),
        })
    }

    /// Font file path, or the built-in face's name.
    pub(crate) fn source(&self) -> &str {
        &self.source
    }

    fn layout(&self, text: &str, size: f32, max_width: u32) -> Layout {
        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings {
            max_width: Some(max_width.max(1) as f32),
            horizontal_align: HorizontalAlign::Center,
            wrap_style: WrapStyle::Word,
            wrap_hard_breaks: true,
            ..LayoutSettings::default()
        });
        layout.append(&[&self.font], &TextStyle::new(text, size, 0));
        layout
    }
}

impl Typesetter for FontPainter {
    fn typeset(&self, text: &str, max_width: u32, paint: &TextPaint) -> RgbaImage {
        let layout = self.layout(text, paint.size, max_width);
        let glyphs: Vec<&GlyphPosition> = layout
            .glyphs()
            .iter()
            .filter(|glyph| glyph.width > 0 && glyph.height > 0)
            .collect();
        let pad = paint.stroke_width as i32;
        let line_height = layout.height().ceil() as i32;

        if glyphs.is_empty() {
            return RgbaImage::new((1 + 2 * pad) as u32, (line_height.max(1) + 2 * pad) as u32);
        }

        let min_x = glyphs.iter().map(|g| g.x.round() as i32).min().unwrap_or(0);
        let max_x = glyphs
            .iter()
            .map(|g| g.x.round() as i32 + g.width as i32)
            .max()
            .unwrap_or(1);
        let min_y = glyphs
            .iter()
            .map(|g| g.y.round() as i32)
            .min()
            .unwrap_or(0)
            .min(0);
        let max_y = glyphs
            .iter()
            .map(|g| g.y.round() as i32 + g.height as i32)
            .max()
            .unwrap_or(1)
            .max(line_height);

        let mut coverage = Coverage::new(
            (max_x - min_x + 2 * pad) as u32,
            (max_y - min_y + 2 * pad) as u32,
        );
        for glyph in glyphs {
            let (_, bitmap) = self.font.rasterize_config(glyph.key);
            coverage.stamp(
                glyph.x.round() as i32 - min_x + pad,
                glyph.y.round() as i32 - min_y + pad,
                glyph.width,
                &bitmap,
            );
        }

        coverage.paint(paint)
    }
}

/// Per-pixel glyph coverage for one raster.
struct Coverage {
    width: u32,
    height: u32,
    values: Vec<u8>,
}

impl Coverage {
    fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            values: vec![0; (width * height) as usize],
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn stamp(&mut self, left: i32, top: i32, glyph_width: usize, bitmap: &[u8]) {
        for (i, &value) in bitmap.iter().enumerate() {
            if value == 0 {
                continue;
            }
            let x = left + (i % glyph_width) as i32;
            let y = top + (i / glyph_width) as i32;
            if let Some(index) = self.index(x, y) {
                self.values[index] = self.values[index].max(value);
            }
        }
    }

    /// Coverage grown by a disk of `radius` pixels.
    fn dilate(&self, radius: u32) -> Vec<u8> {
        let r = radius as i32;
        let mut grown = self.values.clone();
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let value = self.values[y as usize * self.width as usize + x as usize];
                if value == 0 {
                    continue;
                }
                for dy in -r..=r {
                    for dx in -r..=r {
                        if dx * dx + dy * dy > r * r {
                            continue;
                        }
                        if let Some(index) = self.index(x + dx, y + dy) {
                            grown[index] = grown[index].max(value);
                        }
                    }
                }
            }
        }
        grown
    }

    fn paint(&self, paint: &TextPaint) -> RgbaImage {
        let outline = match paint.stroke {
            Some(color) if paint.stroke_width > 0 => Some((color, self.dilate(paint.stroke_width))),
            _ => None,
        };

        let mut image = RgbaImage::new(self.width, self.height);
        for (i, pixel) in image.pixels_mut().enumerate() {
            let fill_alpha = scale(self.values[i], paint.fill[3]);
            *pixel = match &outline {
                Some((color, grown)) => over(
                    with_alpha(paint.fill, fill_alpha),
                    with_alpha(*color, scale(grown[i], color[3])),
                ),
                None => with_alpha(paint.fill, fill_alpha),
            };
        }
        image
    }
}

fn scale(coverage: u8, alpha: u8) -> u8 {
    ((u16::from(coverage) * u16::from(alpha)) / 255) as u8
}

fn with_alpha(color: Rgba<u8>, alpha: u8) -> Rgba<u8> {
    Rgba([color[0], color[1], color[2], alpha])
}

/// Straight-alpha "source over destination".
fn over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = f32::from(src[3]) / 255.0;
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |i: usize| {
        let value = (f32::from(src[i]) * sa + f32::from(dst[i]) * da * (1.0 - sa)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round() as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paint(stroke_width: u32, stroke: Option<Rgba<u8>>) -> TextPaint {
        TextPaint {
            size: 10.0,
            fill: Rgba([255, 255, 255, 255]),
            stroke_width,
            stroke,
        }
    }

    #[test]
    fn test_stamp_clips_to_canvas() {
        let mut coverage = Coverage::new(3, 3);
        coverage.stamp(2, 2, 2, &[255, 255, 255, 255]);
        assert_eq!(coverage.values, vec![0, 0, 0, 0, 0, 0, 0, 0, 255]);
    }

    #[test]
    fn test_dilate_disk() {
        let mut coverage = Coverage::new(5, 5);
        coverage.stamp(2, 2, 1, &[200]);
        let grown = coverage.dilate(1);
        let lit: Vec<usize> = (0..25).filter(|i| grown[*i] == 200).collect();
        // Center plus the four edge neighbours; corners lie outside the disk.
        assert_eq!(lit, vec![7, 11, 12, 13, 17]);
    }

    #[test]
    fn test_paint_fill_only() {
        let mut coverage = Coverage::new(2, 1);
        coverage.stamp(0, 0, 1, &[255]);
        let image = coverage.paint(&paint(0, None));
        assert_eq!(image.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(image.get_pixel(1, 0)[3], 0);
    }

    #[test]
    fn test_paint_outline_under_fill() {
        let mut coverage = Coverage::new(3, 1);
        coverage.stamp(1, 0, 1, &[255]);
        let image = coverage.paint(&paint(1, Some(Rgba([0, 0, 0, 255]))));
        assert_eq!(image.get_pixel(1, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(image.get_pixel(2, 0), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_paint_translucent_fill() {
        let mut coverage = Coverage::new(1, 1);
        coverage.stamp(0, 0, 1, &[255]);
        let translucent = TextPaint {
            fill: Rgba([10, 20, 30, 127]),
            ..paint(0, None)
        };
        assert_eq!(coverage.paint(&translucent).get_pixel(0, 0), &Rgba([10, 20, 30, 127]));
    }

    #[test]
    fn test_over_blends() {
        let out = over(Rgba([255, 255, 255, 0]), Rgba([0, 0, 0, 255]));
        assert_eq!(out, Rgba([0, 0, 0, 255]));
        let out = over(Rgba([0, 0, 0, 0]), Rgba([0, 0, 0, 0]));
        assert_eq!(out, Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_missing_font_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.ttf");
        assert!(matches!(
            FontPainter::load(&missing),
            Err(OverlayError::FontLoad { .. })
        ));
        let garbage = dir.path().join("garbage.ttf");
        fs::write(&garbage, b"not a font").unwrap();
        assert!(matches!(
            FontPainter::load(&garbage),
            Err(OverlayError::FontLoad { .. })
        ));
    }

    #[test]
    fn test_builtin_font_renders_text() {
        let painter = FontPainter::builtin().unwrap();
        assert_eq!(painter.source(), BUILTIN_FONT_NAME);
        let large = TextPaint {
            size: 48.0,
            ..paint(0, None)
        };
        let image = painter.typeset("Hi", 500, &large);
        assert!(image.width() > 1 && image.height() > 1);
        assert!(image.pixels().any(|pixel| pixel[3] == 255));
    }
}
