//! Stacked visual layers for one overlay segment.

use image::{Rgba, RgbaImage};

use crate::layout::{Frame, LayerPosition, Point, Position, MIN_DURATION};
use crate::style::OverlayStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LayerKind {
    Box,
    Shadow,
    Text,
}

/// One raster composited onto the base video for a time span.
#[derive(Debug, Clone)]
pub(crate) struct Layer {
    pub kind: LayerKind,
    pub image: RgbaImage,
    /// Seconds from the start of the output video.
    pub start: f64,
    pub duration: f64,
    position: LayerPosition,
}

impl Layer {
    pub(crate) fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub(crate) fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub(crate) fn is_active(&self, t: f64) -> bool {
        t >= self.start && t < self.end()
    }

    /// Clamped top-left corner at absolute video time `t`.
    pub(crate) fn position_at(&self, t: f64, frame: Frame) -> Point {
        self.position.sample(t - self.start, self.size(), frame)
    }
}

/// Rasters making up one segment, before positioning.
pub(crate) struct SegmentRasters {
    pub text: RgbaImage,
    pub shadow: Option<RgbaImage>,
}

/// Build `[box?, shadow?, text]` sharing one position function.
pub(crate) fn build_segment_layers(
    rasters: SegmentRasters,
    style: &OverlayStyle,
    position: Position,
    start: f64,
    duration: f64,
) -> Vec<Layer> {
    let duration = duration.max(MIN_DURATION);
    let (text_w, text_h) = rasters.text.dimensions();
    let layer = |kind, image, dx: i64, dy: i64| Layer {
        kind,
        image,
        start,
        duration,
        position: LayerPosition::new(position, dx as f64, dy as f64),
    };

    let mut layers = Vec::with_capacity(3);

    if style.background.is_visible() {
        let pad = style.background.padding;
        let fill: Rgba<u8> = style.box_fill();
        let image = RgbaImage::from_pixel(
            (text_w + pad * 2).max(1),
            (text_h + pad * 2).max(1),
            fill,
        );
        let offset = -i64::from(pad);
        layers.push(layer(LayerKind::Box, image, offset, offset));
    }

    if style.shadow.is_visible() {
        if let Some(shadow) = rasters.shadow {
            layers.push(layer(
                LayerKind::Shadow,
                shadow,
                i64::from(style.shadow.dx),
                i64::from(style.shadow.dy),
            ));
        }
    }

    layers.push(layer(LayerKind::Text, rasters.text, 0, 0));
    layers
}
