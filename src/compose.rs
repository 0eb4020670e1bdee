//! Per-frame compositing of overlay layers onto decoded video.

use image::{imageops, RgbaImage};

use crate::error::{OverlayError, OverlayResult};
use crate::layers::Layer;
use crate::layout::Frame;

/// Blit every layer active at `t` onto `canvas`, in list order.
///
/// A layer that would not touch the canvas at all is an error.
pub(crate) fn composite_frame(canvas: &mut RgbaImage, layers: &[Layer], t: f64) -> OverlayResult<()> {
    let (width, height) = canvas.dimensions();
    let frame = Frame { width, height };

    for layer in layers.iter().filter(|layer| layer.is_active(t)) {
        let point = layer.position_at(t, frame);
        let x = point.x.round() as i64;
        let y = point.y.round() as i64;
        let (layer_w, layer_h) = layer.size();

        let overlaps = x < i64::from(width)
            && y < i64::from(height)
            && x + i64::from(layer_w) > 0
            && y + i64::from(layer_h) > 0;
        if !overlaps {
            return Err(OverlayError::render(format!(
                "{:?} layer of size {}x{} at ({x}, {y}) is outside the {}x{} frame at t={t:.3}s",
                layer.kind, layer_w, layer_h, width, height
            )));
        }

        imageops::overlay(canvas, &layer.image, x, y);
    }
    Ok(())
}
