//! Tap zone routing: map a pointer position to a reading-navigation zone.
//!
//! Pure logic, no I/O. Coordinates are percentages of the viewport
//! (0–100 on both axes). A layout is an ordered list of regions; the first
//! region containing the point wins, and a point matching no region is a
//! `Menu` tap (toggle the overlay).

use log::trace;
use serde::Deserialize;

/// Which geometric partition of the viewport is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TapZoneLayout {
    Edge,
    #[default]
    Kindle,
    LShape,
    RightLeft,
    Disabled,
}

impl TapZoneLayout {
    pub const ALL: [TapZoneLayout; 5] = [
        TapZoneLayout::Edge,
        TapZoneLayout::Kindle,
        TapZoneLayout::LShape,
        TapZoneLayout::RightLeft,
        TapZoneLayout::Disabled,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TapZoneLayout::Edge => "edge",
            TapZoneLayout::Kindle => "kindle",
            TapZoneLayout::LShape => "l_shape",
            TapZoneLayout::RightLeft => "right_left",
            TapZoneLayout::Disabled => "disabled",
        }
    }
}

/// Semantic meaning of a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapZoneRegionType {
    Menu,
    Previous,
    Next,
}

/// Axis-aligned rectangle in percentage space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Half-open containment `[x, x+w) × [y, y+h)`, except that a side lying
    /// on the viewport's far edge (100) is closed, so `100` itself is inside.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        span_contains(self.x, self.width, px) && span_contains(self.y, self.height, py)
    }
}

fn span_contains(start: f64, len: f64, p: f64) -> bool {
    let end = start + len;
    p >= start && (p < end || (end >= 100.0 && p <= 100.0))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapZoneRegion {
    pub rect: Rect,
    pub kind: TapZoneRegionType,
}

const fn region(x: f64, y: f64, w: f64, h: f64, kind: TapZoneRegionType) -> TapZoneRegion {
    TapZoneRegion { rect: Rect::new(x, y, w, h), kind }
}

use TapZoneRegionType::{Menu, Next, Previous};

static EDGE: [TapZoneRegion; 3] = [
    region(0.0, 0.0, 33.0, 100.0, Next),
    region(33.0, 66.0, 33.0, 34.0, Previous),
    region(66.0, 0.0, 34.0, 100.0, Next),
];

static KINDLE: [TapZoneRegion; 2] = [
    region(0.0, 33.0, 33.0, 67.0, Previous),
    region(33.0, 33.0, 67.0, 67.0, Next),
];

static L_SHAPE: [TapZoneRegion; 4] = [
    region(0.0, 33.0, 33.0, 33.0, Previous),
    region(0.0, 0.0, 100.0, 33.0, Previous),
    region(66.0, 33.0, 34.0, 33.0, Next),
    region(0.0, 66.0, 100.0, 34.0, Next),
];

static RIGHT_LEFT: [TapZoneRegion; 2] = [
    region(0.0, 0.0, 33.0, 100.0, Previous),
    region(66.0, 0.0, 34.0, 100.0, Next),
];

/// Ordered region list for a layout. `Disabled` has none.
pub fn regions(layout: TapZoneLayout) -> &'static [TapZoneRegion] {
    match layout {
        TapZoneLayout::Edge => &EDGE,
        TapZoneLayout::Kindle => &KINDLE,
        TapZoneLayout::LShape => &L_SHAPE,
        TapZoneLayout::RightLeft => &RIGHT_LEFT,
        TapZoneLayout::Disabled => &[],
    }
}

/// Axis flips applied before matching (right-to-left / bottom-up reading).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct TapZoneInvertMode {
    pub vertical: bool,
    pub horizontal: bool,
}

/// A tap position in percentage space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapPoint {
    pub x: f64,
    pub y: f64,
}

impl TapPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert absolute pointer coordinates inside a `width × height`
    /// viewport to percentages. A zero-sized viewport maps to the centre.
    pub fn from_viewport(px: f64, py: f64, width: f64, height: f64) -> Self {
        let pct = |p: f64, extent: f64| {
            if extent > 0.0 {
                p / extent * 100.0
            } else {
                50.0
            }
        };
        Self::new(pct(px, width), pct(py, height))
    }

    fn clamped(self) -> Self {
        let c = |v: f64| if v.is_finite() { v.clamp(0.0, 100.0) } else { 50.0 };
        Self::new(c(self.x), c(self.y))
    }
}

/// Classify a tap.
///
/// Inversion mirrors the point (`x → 100 - x`, `y → 100 - y`) and then
/// matches against the unmodified layout, so an inverted layout is the exact
/// mirror image of the normal one. Out-of-range or non-finite coordinates
/// are clamped into the viewport rather than rejected.
pub fn classify(
    layout: TapZoneLayout,
    invert: TapZoneInvertMode,
    point: TapPoint,
) -> TapZoneRegionType {
    if layout == TapZoneLayout::Disabled {
        return Menu;
    }

    let p = point.clamped();
    let x = if invert.horizontal { 100.0 - p.x } else { p.x };
    let y = if invert.vertical { 100.0 - p.y } else { p.y };

    let kind = regions(layout)
        .iter()
        .find(|r| r.rect.contains(x, y))
        .map_or(Menu, |r| r.kind);
    trace!(
        "tap: layout={} invert=({}, {}) point=({:.1}, {:.1}) → {kind:?}",
        layout.name(),
        invert.horizontal,
        invert.vertical,
        point.x,
        point.y
    );
    kind
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_INVERT: TapZoneInvertMode = TapZoneInvertMode {
        vertical: false,
        horizontal: false,
    };
    const INVERT_H: TapZoneInvertMode = TapZoneInvertMode {
        vertical: false,
        horizontal: true,
    };

    fn tap(layout: TapZoneLayout, x: f64, y: f64) -> TapZoneRegionType {
        classify(layout, NO_INVERT, TapPoint::new(x, y))
    }

    fn grid() -> impl Iterator<Item = (f64, f64)> {
        (0..100)
            .step_by(3)
            .flat_map(|x| (0..100).step_by(3).map(move |y| (x as f64, y as f64)))
            .chain([(99.9, 99.9), (0.0, 99.99), (33.0, 66.0), (66.0, 33.0)])
    }

    #[test]
    fn kindle_top_third_is_menu() {
        assert_eq!(tap(TapZoneLayout::Kindle, 50.0, 10.0), Menu);
        assert_eq!(tap(TapZoneLayout::Kindle, 10.0, 50.0), Previous);
        assert_eq!(tap(TapZoneLayout::Kindle, 80.0, 80.0), Next);
    }

    #[test]
    fn edge_layout() {
        assert_eq!(tap(TapZoneLayout::Edge, 10.0, 50.0), Next);
        assert_eq!(tap(TapZoneLayout::Edge, 90.0, 50.0), Next);
        assert_eq!(tap(TapZoneLayout::Edge, 50.0, 80.0), Previous);
        assert_eq!(tap(TapZoneLayout::Edge, 50.0, 40.0), Menu);
    }

    #[test]
    fn l_shape_layout() {
        assert_eq!(tap(TapZoneLayout::LShape, 50.0, 20.0), Previous);
        assert_eq!(tap(TapZoneLayout::LShape, 10.0, 50.0), Previous);
        assert_eq!(tap(TapZoneLayout::LShape, 50.0, 50.0), Menu);
        assert_eq!(tap(TapZoneLayout::LShape, 90.0, 50.0), Next);
        assert_eq!(tap(TapZoneLayout::LShape, 50.0, 90.0), Next);
    }

    #[test]
    fn right_left_layout() {
        assert_eq!(tap(TapZoneLayout::RightLeft, 10.0, 50.0), Previous);
        assert_eq!(tap(TapZoneLayout::RightLeft, 50.0, 50.0), Menu);
        assert_eq!(tap(TapZoneLayout::RightLeft, 90.0, 50.0), Next);
    }

    #[test]
    fn top_edge_follows_layout_regions() {
        assert_eq!(tap(TapZoneLayout::Edge, 10.0, 2.0), Next);
        assert_eq!(tap(TapZoneLayout::Edge, 50.0, 2.0), Menu);
        assert_eq!(tap(TapZoneLayout::LShape, 10.0, 2.0), Previous);
        assert_eq!(tap(TapZoneLayout::RightLeft, 90.0, 2.0), Next);
        assert_eq!(tap(TapZoneLayout::Kindle, 10.0, 2.0), Menu);
    }

    #[test]
    fn every_layout_leaves_a_menu_area() {
        assert_eq!(tap(TapZoneLayout::Edge, 50.0, 50.0), Menu);
        assert_eq!(tap(TapZoneLayout::Kindle, 50.0, 10.0), Menu);
        assert_eq!(tap(TapZoneLayout::LShape, 50.0, 50.0), Menu);
        assert_eq!(tap(TapZoneLayout::RightLeft, 50.0, 50.0), Menu);
    }

    #[test]
    fn disabled_is_always_menu() {
        for (x, y) in grid() {
            for invert in [NO_INVERT, INVERT_H] {
                assert_eq!(
                    classify(TapZoneLayout::Disabled, invert, TapPoint::new(x, y)),
                    Menu
                );
            }
        }
    }

    #[test]
    fn horizontal_invert_mirrors_point() {
        for layout in TapZoneLayout::ALL {
            for (x, y) in grid() {
                assert_eq!(
                    classify(layout, INVERT_H, TapPoint::new(x, y)),
                    classify(layout, NO_INVERT, TapPoint::new(100.0 - x, y)),
                    "{layout:?} at ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn vertical_invert_swaps_kindle_rows() {
        let invert = TapZoneInvertMode {
            vertical: true,
            horizontal: false,
        };
        // bottom of the screen now behaves like the top
        assert_eq!(
            classify(TapZoneLayout::Kindle, invert, TapPoint::new(50.0, 90.0)),
            Menu
        );
        assert_eq!(
            classify(TapZoneLayout::Kindle, invert, TapPoint::new(80.0, 20.0)),
            Next
        );
    }

    #[test]
    fn inverted_right_left_swaps_sides() {
        assert_eq!(
            classify(TapZoneLayout::RightLeft, INVERT_H, TapPoint::new(10.0, 50.0)),
            Next
        );
        assert_eq!(
            classify(TapZoneLayout::RightLeft, INVERT_H, TapPoint::new(90.0, 50.0)),
            Previous
        );
    }

    #[test]
    fn far_edge_belongs_to_edge_region() {
        // x=0 inverted becomes 100, which must still hit the right-hand region
        assert_eq!(
            classify(TapZoneLayout::RightLeft, INVERT_H, TapPoint::new(0.0, 50.0)),
            Next
        );
        assert_eq!(tap(TapZoneLayout::RightLeft, 100.0, 50.0), Next);
    }

    #[test]
    fn out_of_range_points_are_clamped() {
        assert_eq!(tap(TapZoneLayout::RightLeft, -20.0, 50.0), Previous);
        assert_eq!(tap(TapZoneLayout::RightLeft, 250.0, 50.0), Next);
        assert_eq!(tap(TapZoneLayout::RightLeft, f64::NAN, 50.0), Menu);
    }

    #[test]
    fn classify_is_idempotent() {
        for layout in TapZoneLayout::ALL {
            for (x, y) in grid() {
                let p = TapPoint::new(x, y);
                assert_eq!(classify(layout, NO_INVERT, p), classify(layout, NO_INVERT, p));
            }
        }
    }

    #[test]
    fn from_viewport_converts_to_percent() {
        let p = TapPoint::from_viewport(40.0, 10.0, 80.0, 40.0);
        assert_eq!(p, TapPoint::new(50.0, 25.0));
        let centre = TapPoint::from_viewport(3.0, 3.0, 0.0, 0.0);
        assert_eq!(centre, TapPoint::new(50.0, 50.0));
    }
}
