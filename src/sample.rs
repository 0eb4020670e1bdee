//! Still preview of the current font and style.

use std::path::Path;

use image::{imageops, ImageFormat, Rgba, RgbaImage};

use crate::error::OverlayResult;
use crate::style::OverlayStyle;
use crate::text::Typesetter;

pub(crate) const SAMPLE_WIDTH: u32 = 900;
pub(crate) const SAMPLE_HEIGHT: u32 = 220;

const DEFAULT_SAMPLE_TEXT: &str = "The quick brown fox 123";
const MAX_SAMPLE_CHARS: usize = 60;
const SAMPLE_INSET: i64 = 10;

/// Single-line sample string derived from the overlay text.
pub(crate) fn sample_text(text: Option<&str>) -> String {
    let trimmed = text.map(str::trim).unwrap_or("");
    let line = if trimmed.is_empty() {
        DEFAULT_SAMPLE_TEXT.to_string()
    } else {
        trimmed.replace('\n', " ")
    };
    if line.chars().count() > MAX_SAMPLE_CHARS {
        let kept: String = line.chars().take(MAX_SAMPLE_CHARS - 3).collect();
        format!("{kept}...")
    } else {
        line
    }
}

pub(crate) fn save_sample(image: &RgbaImage, path: &Path) -> OverlayResult<()> {
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Draw box, shadow and text centered on a transparent canvas.
pub(crate) fn render_sample(
    typesetter: &dyn Typesetter,
    text: &str,
    style: &OverlayStyle,
    width: u32,
    height: u32,
) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    // No wrapping: the sample is a single line.
    let no_wrap = u32::MAX / 2;
    let main = typesetter.typeset(text, no_wrap, &style.text_paint());
    let (text_w, text_h) = main.dimensions();

    let x = SAMPLE_INSET.max((i64::from(width) - i64::from(text_w)) / 2);
    let y = SAMPLE_INSET.max((i64::from(height) - i64::from(text_h)) / 2);

    if style.background.is_visible() {
        let pad = i64::from(style.background.padding);
        let x0 = (x - pad).max(0);
        let y0 = (y - pad).max(0);
        let x1 = (x + i64::from(text_w) + pad).min(i64::from(width));
        let y1 = (y + i64::from(text_h) + pad).min(i64::from(height));
        if x1 > x0 && y1 > y0 {
            let fill = RgbaImage::from_pixel((x1 - x0) as u32, (y1 - y0) as u32, style.box_fill());
            imageops::overlay(&mut canvas, &fill, x0, y0);
        }
    }

    if style.shadow.is_visible() {
        let shadow = typesetter.typeset(text, no_wrap, &style.shadow_paint());
        imageops::overlay(
            &mut canvas,
            &shadow,
            x + i64::from(style.shadow.dx),
            y + i64::from(style.shadow.dy),
        );
    }

    imageops::overlay(&mut canvas, &main, x, y);
    canvas
}
