//! Colors, fonts and figure sizes shared by every chart.

use fuzzlens_analysis::consistency::RatioKind;
use plotters::prelude::*;
use plotters::style::FontDesc;

pub const FONT: &str = "sans-serif";

pub const LIGHTBLUE: RGBColor = RGBColor(173, 216, 230);
pub const DARKBLUE: RGBColor = RGBColor(0, 0, 139);
pub const LIGHTPINK: RGBColor = RGBColor(255, 182, 193);
pub const DARKRED: RGBColor = RGBColor(139, 0, 0);
pub const GRAY: RGBColor = RGBColor(128, 128, 128);
pub const BAR: RGBColor = RGBColor(31, 119, 180);

/// One per agreement category, in `OBSERVER_LABELS` order.
pub const OBSERVER_COLORS: [RGBColor; 4] = [
    RGBColor(0xff, 0x99, 0x99),
    RGBColor(0x66, 0xb3, 0xff),
    RGBColor(0x99, 0xff, 0x99),
    RGBColor(0xff, 0xcc, 0x99),
];

const LINE_COLORS: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

pub fn line_color(index: usize) -> RGBColor {
    LINE_COLORS[index % LINE_COLORS.len()]
}

pub fn font(size: f64) -> FontDesc<'static> {
    (FONT, size).into_font()
}

/// Figure size in pixels for a size given in inches at 100 dpi.
pub const fn inches(width: u32, height: u32) -> (u32, u32) {
    (width * 100, height * 100)
}

#[derive(Debug, Clone, Copy)]
pub struct RatioColors {
    pub fill: RGBColor,
    pub edge: RGBColor,
    pub accent: RGBColor,
}

pub fn ratio_colors(kind: RatioKind) -> RatioColors {
    match kind {
        RatioKind::Second => RatioColors {
            fill: LIGHTBLUE,
            edge: BLUE,
            accent: DARKBLUE,
        },
        RatioKind::Sum => RatioColors {
            fill: LIGHTPINK,
            edge: RED,
            accent: DARKRED,
        },
    }
}

pub fn grid_style() -> ShapeStyle {
    BLACK.mix(0.08).stroke_width(1)
}
