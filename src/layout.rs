//! Overlay placement, slide-in animation and frame clamping.
//!
//! Coordinates are in pixels with the origin at the top-left corner of the
//! base frame. Positions are `f64` so animated layers can sit between pixels;
//! the compositor rounds when it blits.

use clap::ValueEnum;

/// Distance kept between a resolved overlay and the frame edge.
pub(crate) const DEFAULT_MARGIN: i64 = 24;

/// Minimum pixels of a layer that must stay inside the frame.
pub(crate) const EDGE_OVERLAP: i64 = 1;

/// Shortest animation or segment duration, in seconds.
pub(crate) const MIN_DURATION: f64 = 0.05;

/// Base video frame the overlay is composited onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Frame {
    pub width: u32,
    pub height: u32,
}

/// Measured bounding box of a rendered text layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TextBlock {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub(crate) fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Semantic anchor for a text block within the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Placement {
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

/// Frame edge a slide-in animation starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AnimationSpec {
    pub from: Edge,
    pub duration: f64,
}

impl AnimationSpec {
    pub(crate) fn new(from: Edge, duration: f64) -> Self {
        Self { from, duration }
    }

    /// Shorten the animation so it finishes within `limit` seconds.
    pub(crate) fn capped_at(self, limit: f64) -> Self {
        Self {
            duration: self.duration.min(limit),
            ..self
        }
    }
}

fn centered(dimension: u32, size: u32, margin: i64) -> i64 {
    // Rust integer division truncates toward zero, matching a truncating int cast.
    margin.max((i64::from(dimension) - i64::from(size)) / 2)
}

/// Resolve a placement to the top-left corner of the text block.
pub(crate) fn resolve_target(
    placement: Placement,
    frame: Frame,
    text: TextBlock,
    margin: i64,
) -> (i64, i64) {
    let (fw, fh) = (i64::from(frame.width), i64::from(frame.height));
    let (tw, th) = (i64::from(text.width), i64::from(text.height));
    let center_x = centered(frame.width, text.width, margin);
    let center_y = centered(frame.height, text.height, margin);

    match placement {
        Placement::Bottom => (center_x, margin.max(fh - th - margin)),
        Placement::Top => (center_x, margin),
        Placement::Left => (margin, center_y),
        Placement::Right => (margin.max(fw - tw - margin), center_y),
        Placement::Center => (center_x, center_y),
    }
}

/// Point just inside `edge` from which a slide-in towards `target` begins.
pub(crate) fn slide_start(
    edge: Edge,
    target: (i64, i64),
    frame: Frame,
    text: TextBlock,
) -> (i64, i64) {
    let (tx, ty) = target;
    match edge {
        Edge::Top => (tx, -i64::from(text.height) + EDGE_OVERLAP),
        Edge::Left => (-i64::from(text.width) + EDGE_OVERLAP, ty),
        Edge::Right => (i64::from(frame.width) - EDGE_OVERLAP, ty),
        Edge::Bottom => (tx, i64::from(frame.height) - EDGE_OVERLAP),
    }
}

/// Position of a segment as a function of time since the segment started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Position {
    Fixed(Point),
    Slide {
        start: Point,
        target: Point,
        duration: f64,
    },
}

impl Position {
    /// Build a fixed or sliding position for a resolved target.
    pub(crate) fn for_target(
        target: (i64, i64),
        animation: Option<AnimationSpec>,
        frame: Frame,
        text: TextBlock,
    ) -> Self {
        let target_point = Point::new(target.0 as f64, target.1 as f64);
        match animation {
            None => Self::Fixed(target_point),
            Some(spec) => {
                let (sx, sy) = slide_start(spec.from, target, frame, text);
                Self::Slide {
                    start: Point::new(sx as f64, sy as f64),
                    target: target_point,
                    duration: spec.duration.max(MIN_DURATION),
                }
            }
        }
    }

    pub(crate) fn at(&self, t: f64) -> Point {
        match *self {
            Self::Fixed(point) => point,
            Self::Slide {
                start,
                target,
                duration,
            } => {
                if t <= 0.0 {
                    return start;
                }
                if t >= duration {
                    return target;
                }
                let progress = t / duration;
                Point::new(
                    start.x + (target.x - start.x) * progress,
                    start.y + (target.y - start.y) * progress,
                )
            }
        }
    }
}

/// Clamp a layer's top-left corner so at least `edge` pixels overlap the frame.
pub(crate) fn clamp_layer(point: Point, layer: (u32, u32), frame: Frame, edge: i64) -> Point {
    let layer_w = i64::from(layer.0.max(1));
    let layer_h = i64::from(layer.1.max(1));
    let frame_w = i64::from(frame.width.max(1));
    let frame_h = i64::from(frame.height.max(1));

    let min_x = (-layer_w + edge) as f64;
    let max_x = (frame_w - edge) as f64;
    let min_y = (-layer_h + edge) as f64;
    let max_y = (frame_h - edge) as f64;

    Point::new(point.x.max(min_x).min(max_x), point.y.max(min_y).min(max_y))
}

/// Shared position of a segment plus the fixed offset of one layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LayerPosition {
    pub base: Position,
    pub dx: f64,
    pub dy: f64,
}

impl LayerPosition {
    pub(crate) fn new(base: Position, dx: f64, dy: f64) -> Self {
        Self { base, dx, dy }
    }

    /// Clamped top-left corner at `t` seconds into the segment.
    pub(crate) fn sample(&self, t: f64, size: (u32, u32), frame: Frame) -> Point {
        let unclamped = self.base.at(t).offset(self.dx, self.dy);
        clamp_layer(unclamped, size, frame, EDGE_OVERLAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HD: Frame = Frame {
        width: 1920,
        height: 1080,
    };
    const BLOCK: TextBlock = TextBlock {
        width: 400,
        height: 100,
    };

    #[test]
    fn test_resolve_every_placement() {
        let m = DEFAULT_MARGIN;
        assert_eq!(resolve_target(Placement::Bottom, HD, BLOCK, m), (760, 956));
        assert_eq!(resolve_target(Placement::Top, HD, BLOCK, m), (760, 24));
        assert_eq!(resolve_target(Placement::Left, HD, BLOCK, m), (24, 490));
        assert_eq!(resolve_target(Placement::Right, HD, BLOCK, m), (1496, 490));
        assert_eq!(resolve_target(Placement::Center, HD, BLOCK, m), (760, 490));
    }

    #[test]
    fn test_resolve_never_closer_than_margin() {
        let wide = TextBlock {
            width: 2000,
            height: 1200,
        };
        for placement in [
            Placement::Top,
            Placement::Bottom,
            Placement::Left,
            Placement::Right,
            Placement::Center,
        ] {
            let (x, y) = resolve_target(placement, HD, wide, 24);
            assert_eq!((x, y), (24, 24), "{placement:?}");
        }
    }

    #[test]
    fn test_resolve_custom_margin() {
        assert_eq!(resolve_target(Placement::Bottom, HD, BLOCK, 0), (760, 980));
        assert_eq!(resolve_target(Placement::Right, HD, BLOCK, 100), (1420, 490));
    }

    #[test]
    fn test_slide_start_points() {
        let target = (760, 956);
        assert_eq!(slide_start(Edge::Top, target, HD, BLOCK), (760, -99));
        assert_eq!(slide_start(Edge::Bottom, target, HD, BLOCK), (760, 1079));
        assert_eq!(slide_start(Edge::Left, target, HD, BLOCK), (-399, 956));
        assert_eq!(slide_start(Edge::Right, target, HD, BLOCK), (1919, 956));
    }

    #[test]
    fn test_slide_endpoints_and_midpoint() {
        let position = Position::for_target(
            (760, 956),
            Some(AnimationSpec::new(Edge::Left, 0.6)),
            HD,
            BLOCK,
        );
        assert_eq!(position.at(0.0), Point::new(-399.0, 956.0));
        assert_eq!(position.at(-1.0), Point::new(-399.0, 956.0));
        assert_eq!(position.at(0.6), Point::new(760.0, 956.0));
        assert_eq!(position.at(42.0), Point::new(760.0, 956.0));
        assert_eq!(position.at(0.3), Point::new(180.5, 956.0));
    }

    #[test]
    fn test_slide_duration_floor() {
        let position = Position::for_target(
            (0, 0),
            Some(AnimationSpec::new(Edge::Bottom, 0.0)),
            HD,
            BLOCK,
        );
        match position {
            Position::Slide { duration, .. } => assert_eq!(duration, MIN_DURATION),
            other => panic!("expected slide, got {other:?}"),
        }
        assert_eq!(position.at(0.05), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_slide_is_pure_out_of_order() {
        let position = Position::for_target(
            (100, 200),
            Some(AnimationSpec::new(Edge::Top, 1.0)),
            HD,
            BLOCK,
        );
        let late = position.at(0.75);
        let early = position.at(0.25);
        assert_eq!(position.at(0.75), late);
        assert_eq!(position.at(0.25), early);
    }

    #[test]
    fn test_animation_cap() {
        let spec = AnimationSpec::new(Edge::Bottom, 0.6).capped_at(0.4);
        assert_eq!(spec.duration, 0.4);
        let spec = AnimationSpec::new(Edge::Bottom, 0.6).capped_at(3.0);
        assert_eq!(spec.duration, 0.6);
    }

    #[test]
    fn test_clamp_in_range_is_identity() {
        let point = Point::new(760.0, 956.0);
        assert_eq!(clamp_layer(point, (400, 100), HD, 1), point);
        let edge = Point::new(-399.0, 1079.0);
        assert_eq!(clamp_layer(edge, (400, 100), HD, 1), edge);
    }

    #[test]
    fn test_clamp_fully_offscreen_leaves_one_pixel() {
        let left_top = clamp_layer(Point::new(-5000.0, -5000.0), (400, 100), HD, 1);
        assert_eq!(left_top, Point::new(-399.0, -99.0));
        let right_bottom = clamp_layer(Point::new(9000.0, 9000.0), (400, 100), HD, 1);
        assert_eq!(right_bottom, Point::new(1919.0, 1079.0));
    }

    #[test]
    fn test_clamp_degenerate_sizes() {
        let frame = Frame {
            width: 0,
            height: 0,
        };
        assert_eq!(
            clamp_layer(Point::new(10.0, -10.0), (0, 0), frame, 1),
            Point::new(0.0, 0.0)
        );
    }

    #[test]
    fn test_layer_position_applies_offset_then_clamps() {
        let position = LayerPosition::new(Position::Fixed(Point::new(10.0, 10.0)), -16.0, -16.0);
        assert_eq!(position.sample(0.0, (432, 132), HD), Point::new(-6.0, -6.0));

        let shadow = LayerPosition::new(Position::Fixed(Point::new(1919.0, 500.0)), 2.0, 2.0);
        assert_eq!(shadow.sample(0.0, (400, 100), HD), Point::new(1919.0, 502.0));
    }
}
