//! # Flex Layout Utilities
//!
//! Helper functions for the single-axis flex algorithm. The main loop
//! lives in the layout engine's `layout_frame` method; this module holds
//! the axis bookkeeping and the space distribution arithmetic.

use crate::style::{AlignItems, JustifyContent, LayoutAxis};

/// The main axis of a frame, with helpers to project a (width, height)
/// pair onto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl From<LayoutAxis> for Axis {
    fn from(layout: LayoutAxis) -> Self {
        match layout {
            LayoutAxis::Vertical => Axis::Vertical,
            LayoutAxis::Horizontal => Axis::Horizontal,
        }
    }
}

impl Axis {
    /// Component of `(width, height)` along this axis.
    pub fn main(self, width: f64, height: f64) -> f64 {
        match self {
            Axis::Horizontal => width,
            Axis::Vertical => height,
        }
    }

    /// Component of `(width, height)` across this axis.
    pub fn cross(self, width: f64, height: f64) -> f64 {
        match self {
            Axis::Horizontal => height,
            Axis::Vertical => width,
        }
    }
}

/// Total space taken by gaps between `count` children.
pub fn total_gap(gap: f64, count: usize) -> f64 {
    if count > 1 {
        gap * (count - 1) as f64
    } else {
        0.0
    }
}

/// Equal share of the leftover main-axis space for each fill child.
/// Leftover space is clamped at zero; no fill children means a zero share.
pub fn fill_share(content_main: f64, fixed_main: f64, gaps: f64, fill_count: usize) -> f64 {
    if fill_count == 0 {
        return 0.0;
    }
    let remaining = (content_main - fixed_main - gaps).max(0.0);
    remaining / fill_count as f64
}

/// Where the first child starts on the main axis and how far apart
/// consecutive children are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MainPlacement {
    pub offset: f64,
    pub spacing: f64,
}

/// Resolve `justify-content` for one line of children.
///
/// `sizes_sum` is the sum of all children's main sizes (fixed and fill),
/// `gap` the frame's configured gap.
pub fn place_main(
    justify: JustifyContent,
    content_main: f64,
    sizes_sum: f64,
    gap: f64,
    count: usize,
) -> MainPlacement {
    let used = sizes_sum + total_gap(gap, count);
    match justify {
        JustifyContent::Start => MainPlacement {
            offset: 0.0,
            spacing: gap,
        },
        JustifyContent::Center => MainPlacement {
            offset: (content_main - used) / 2.0,
            spacing: gap,
        },
        JustifyContent::End => MainPlacement {
            offset: content_main - used,
            spacing: gap,
        },
        JustifyContent::SpaceBetween => MainPlacement {
            offset: 0.0,
            spacing: if count > 1 {
                (content_main - sizes_sum) / (count - 1) as f64
            } else {
                0.0
            },
        },
    }
}

/// Offset of a child inside the cross-axis extent `available`.
pub fn cross_offset(align: AlignItems, available: f64, size: f64) -> f64 {
    match align {
        AlignItems::Start => 0.0,
        AlignItems::Center => (available - size) / 2.0,
        AlignItems::End => available - size,
    }
}
