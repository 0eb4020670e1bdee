//! Turns overlay text or caption segments into positioned layers.

use tracing::debug;

use crate::error::{OverlayError, OverlayResult};
use crate::layers::{build_segment_layers, Layer, LayerKind, SegmentRasters};
use crate::layout::{
    resolve_target, AnimationSpec, Frame, Placement, Position, TextBlock, DEFAULT_MARGIN,
    MIN_DURATION,
};
use crate::style::OverlayStyle;
use crate::text::Typesetter;
use crate::transcribe::CaptionSegment;

/// Share of the frame width caption lines may use before wrapping.
const CAPTION_WIDTH_RATIO: f64 = 0.9;

/// Where the overlay text comes from.
#[derive(Debug, Clone)]
pub(crate) enum OverlaySource {
    Manual(String),
    Captions(Vec<CaptionSegment>),
}

/// Layers produced for one span of on-screen text.
#[derive(Debug)]
pub(crate) struct PlannedSegment {
    pub text: String,
    pub block: TextBlock,
    pub layers: Vec<Layer>,
}

pub(crate) struct OverlayPlan<'a> {
    pub frame: Frame,
    /// Length of the output clip in seconds.
    pub clip_duration: f64,
    pub placement: Placement,
    pub animation: Option<AnimationSpec>,
    pub style: &'a OverlayStyle,
}

impl OverlayPlan<'_> {
    pub(crate) fn build(
        &self,
        source: &OverlaySource,
        typesetter: &dyn Typesetter,
    ) -> OverlayResult<Vec<PlannedSegment>> {
        match source {
            OverlaySource::Manual(text) => {
                if text.trim().is_empty() {
                    return Err(OverlayError::EmptyOverlayText);
                }
                let segment = self.segment(
                    text,
                    0.0,
                    self.clip_duration,
                    self.frame.width,
                    self.animation,
                    typesetter,
                );
                Ok(vec![segment])
            }
            OverlaySource::Captions(captions) => {
                let wrap_width = ((f64::from(self.frame.width) * CAPTION_WIDTH_RATIO) as u32).max(1);
                let mut planned = Vec::with_capacity(captions.len());
                for caption in captions {
                    let text = caption.text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    if caption.start >= self.clip_duration {
                        debug!(start = caption.start, "Caption starts after clip end, skipping");
                        continue;
                    }
                    let duration = (caption.end - caption.start).max(MIN_DURATION);
                    let animation = self.animation.map(|spec| spec.capped_at(duration));
                    planned.push(self.segment(
                        text,
                        caption.start,
                        duration,
                        wrap_width,
                        animation,
                        typesetter,
                    ));
                }
                Ok(planned)
            }
        }
    }

    fn segment(
        &self,
        text: &str,
        start: f64,
        duration: f64,
        wrap_width: u32,
        animation: Option<AnimationSpec>,
        typesetter: &dyn Typesetter,
    ) -> PlannedSegment {
        let main = typesetter.typeset(text, wrap_width, &self.style.text_paint());
        let (width, height) = main.dimensions();
        let block = TextBlock { width, height };
        let shadow = self
            .style
            .shadow
            .is_visible()
            .then(|| typesetter.typeset(text, wrap_width, &self.style.shadow_paint()));

        let target = resolve_target(self.placement, self.frame, block, DEFAULT_MARGIN);
        let position = Position::for_target(target, animation, self.frame, block);
        debug!(
            text,
            start,
            duration,
            target_x = target.0,
            target_y = target.1,
            animated = animation.is_some(),
            "Planned overlay segment"
        );

        let layers = build_segment_layers(
            SegmentRasters { text: main, shadow },
            self.style,
            position,
            start,
            duration,
        );
        PlannedSegment {
            text: text.to_string(),
            block,
            layers,
        }
    }
}

/// Flatten planned segments into one compositing list, preserving order.
pub(crate) fn flatten(segments: Vec<PlannedSegment>) -> Vec<Layer> {
    segments
        .into_iter()
        .flat_map(|segment| segment.layers)
        .collect()
}

/// Number of main-text layers, for logging.
pub(crate) fn text_layer_count(layers: &[Layer]) -> usize {
    layers
        .iter()
        .filter(|layer| layer.kind == LayerKind::Text)
        .count()
}
