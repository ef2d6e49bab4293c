//! # Layout Engine
//!
//! Turns a resolved [`Document`] into positioned boxes, one [`Page`] per
//! top-level frame.
//!
//! The algorithm is a deliberately small slice of flexbox:
//!
//! 1. Each frame flows its children along one axis (horizontal unless the
//!    frame says `vertical`), no wrapping.
//! 2. A child is sized by a fixed value, by `fill_container`, or by its
//!    content (intrinsic size, text measurement).
//! 3. Space left on the main axis after fixed children and gaps is split
//!    equally among fill children. Fill on the cross axis stretches to the
//!    full content extent.
//! 4. `justifyContent` places the run along the main axis, `alignItems`
//!    places each child across it.
//!
//! Page roots are always placed at (0,0). The frame's own `x`/`y` are canvas
//! coordinates from the design tool and intentionally play no part in the
//! PDF page.
//!
//! Geometry never fails: negative leftovers clamp to zero and degenerate
//! frames produce zero-size boxes. The only error is a top-level node that
//! isn't a frame.

pub mod flex;

use log::{debug, trace};
use serde::Serialize;

use crate::error::{PenError, Result};
use crate::model::{Document, Frame, Node, Text};
use crate::text::{estimate_text, EstimateConfig, TextMeasurer};
use flex::Axis;

/// A laid-out page: the root frame's box plus the page size.
#[derive(Debug, Clone)]
pub struct Page<'doc> {
    pub width: f64,
    pub height: f64,
    pub root: LayoutBox<'doc>,
}

/// A positioned node. Coordinates are absolute on the page.
#[derive(Debug, Clone)]
pub struct LayoutBox<'doc> {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// The source node. The box tree never copies node data.
    pub node: &'doc Node,
    pub children: Vec<LayoutBox<'doc>>,
}

impl<'doc> LayoutBox<'doc> {
    fn leaf(node: &'doc Node, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            node,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &'doc str {
        self.node.id()
    }

    /// Depth-first search for the box of the node with `id`.
    pub fn find(&self, id: &str) -> Option<&LayoutBox<'doc>> {
        if self.node.id() == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

// ── Serializable geometry (for debugging and tooling) ───────────────

/// Geometry snapshot of one box and its subtree.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxInfo {
    pub id: String,
    pub name: String,
    pub node_type: &'static str,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BoxInfo>,
}

/// Geometry snapshot of a page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub width: f64,
    pub height: f64,
    pub root: BoxInfo,
}

impl From<&LayoutBox<'_>> for BoxInfo {
    fn from(b: &LayoutBox<'_>) -> Self {
        BoxInfo {
            id: b.node.id().to_string(),
            name: b.node.name().to_string(),
            node_type: b.node.type_tag(),
            x: b.x,
            y: b.y,
            width: b.width,
            height: b.height,
            children: b.children.iter().map(BoxInfo::from).collect(),
        }
    }
}

impl Page<'_> {
    pub fn info(&self) -> PageInfo {
        PageInfo {
            width: self.width,
            height: self.height,
            root: BoxInfo::from(&self.root),
        }
    }
}

/// Per-child sizing decided in the measurement pass.
struct ChildSize<'doc> {
    node: &'doc Node,
    width: f64,
    height: f64,
    fill_width: bool,
    fill_height: bool,
}

impl ChildSize<'_> {
    fn fills_main(&self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.fill_width,
            Axis::Vertical => self.fill_height,
        }
    }
}

/// The layout engine. Holds only configuration; every call is independent.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    estimate: EstimateConfig,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `estimate` when no measurer is supplied.
    pub fn with_estimate(estimate: EstimateConfig) -> Self {
        Self { estimate }
    }

    /// Main entry point: lay out every top-level frame as a page.
    pub fn layout<'doc>(
        &self,
        document: &'doc Document,
        measurer: Option<&dyn TextMeasurer>,
    ) -> Result<Vec<Page<'doc>>> {
        let mut pages = Vec::with_capacity(document.children.len());

        for node in &document.children {
            let Node::Frame(frame) = node else {
                return Err(PenError::InvalidDocument {
                    id: node.id().to_string(),
                });
            };

            let width = frame.width.value();
            let height = frame.height.value();
            debug!("laying out page {:?} ({width}x{height})", frame.name);

            let root = self.layout_frame(node, frame, 0.0, 0.0, width, height, measurer);
            pages.push(Page {
                width,
                height,
                root,
            });
        }

        debug!("layout produced {} page(s)", pages.len());
        Ok(pages)
    }

    /// Lay out `frame` into the rectangle (x, y, w, h). The caller has
    /// already resolved auto sizes.
    #[allow(clippy::too_many_arguments)]
    fn layout_frame<'doc>(
        &self,
        node: &'doc Node,
        frame: &'doc Frame,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        measurer: Option<&dyn TextMeasurer>,
    ) -> LayoutBox<'doc> {
        trace!("frame {:?} at ({x}, {y}) {w}x{h}", frame.id);
        let mut layout_box = LayoutBox::leaf(node, x, y, w, h);

        if frame.children.is_empty() {
            return layout_box;
        }

        let content_x = x + frame.padding.left;
        let content_y = y + frame.padding.top;
        let content_w = w - frame.padding.horizontal();
        let content_h = h - frame.padding.vertical();

        let axis = Axis::from(frame.layout);
        let content_main = axis.main(content_w, content_h);
        let content_cross = axis.cross(content_w, content_h);

        // Phase 1: measure every child, fixed vs fill
        let mut children: Vec<ChildSize<'doc>> = frame
            .children
            .iter()
            .map(|child| self.measure_child(child, content_w, measurer))
            .collect();

        let mut fixed_main = 0.0;
        let mut fill_count = 0;
        for child in &children {
            if child.fills_main(axis) {
                fill_count += 1;
            } else {
                fixed_main += axis.main(child.width, child.height);
            }
        }

        // Phase 2: resolve fill_container sizes
        let gaps = flex::total_gap(frame.gap, children.len());
        let share = flex::fill_share(content_main, fixed_main, gaps, fill_count);

        for child in &mut children {
            match axis {
                Axis::Vertical => {
                    if child.fill_height {
                        child.height = share;
                    }
                    if child.fill_width {
                        child.width = content_cross;
                    }
                }
                Axis::Horizontal => {
                    if child.fill_width {
                        child.width = share;
                    }
                    if child.fill_height {
                        child.height = content_cross;
                    }
                }
            }
        }

        // Phase 3: position along both axes and recurse
        let sizes_sum = fixed_main + fill_count as f64 * share;
        let placement = flex::place_main(
            frame.justify_content,
            content_main,
            sizes_sum,
            frame.gap,
            children.len(),
        );

        let mut cursor = placement.offset;
        for child in children {
            let main_size = axis.main(child.width, child.height);
            let cross_size = axis.cross(child.width, child.height);
            let cross = flex::cross_offset(frame.align_items, content_cross, cross_size);

            let (child_x, child_y) = match axis {
                Axis::Vertical => (content_x + cross, content_y + cursor),
                Axis::Horizontal => (content_x + cursor, content_y + cross),
            };
            cursor += main_size + placement.spacing;

            let child_box = match child.node {
                Node::Frame(inner) => self.layout_frame(
                    child.node,
                    inner,
                    child_x,
                    child_y,
                    child.width,
                    child.height,
                    measurer,
                ),
                Node::Text(_) => {
                    LayoutBox::leaf(child.node, child_x, child_y, child.width, child.height)
                }
            };
            layout_box.children.push(child_box);
        }

        layout_box
    }

    /// Decide a child's size before fill distribution. Fill axes are left
    /// at zero and flagged.
    fn measure_child<'doc>(
        &self,
        node: &'doc Node,
        content_w: f64,
        measurer: Option<&dyn TextMeasurer>,
    ) -> ChildSize<'doc> {
        match node {
            Node::Frame(frame) => {
                let fill_width = frame.width.is_fill();
                let fill_height = frame.height.is_fill();
                let mut width = frame.width.fixed().unwrap_or(0.0);
                let mut height = frame.height.fixed().unwrap_or(0.0);

                let auto_width = !fill_width && frame.width.fixed().is_none();
                let auto_height = !fill_height && frame.height.fixed().is_none();
                if auto_width || auto_height {
                    let (iw, ih) = self.intrinsic_size(frame, measurer, content_w);
                    if auto_width {
                        width = iw;
                    }
                    if auto_height {
                        height = ih;
                    }
                }

                ChildSize {
                    node,
                    width,
                    height,
                    fill_width,
                    fill_height,
                }
            }
            Node::Text(text) => {
                let fill_width = text.width.is_fill();
                let fixed_width = text.width.fixed().filter(|w| *w > 0.0);
                let max_width = fixed_width.unwrap_or(content_w);
                let (tw, th) = self.measure_text(text, max_width, measurer);

                ChildSize {
                    node,
                    width: match (fill_width, fixed_width) {
                        (true, _) => 0.0,
                        (false, Some(w)) => w,
                        (false, None) => tw,
                    },
                    height: th,
                    fill_width,
                    fill_height: false,
                }
            }
        }
    }

    /// Natural size of a frame that has neither a fixed nor a fill
    /// dimension: children summed along the main axis with gaps, maxed
    /// across it, plus this frame's padding. Text wraps at
    /// `available_width` minus padding.
    pub fn intrinsic_size(
        &self,
        frame: &Frame,
        measurer: Option<&dyn TextMeasurer>,
        available_width: f64,
    ) -> (f64, f64) {
        let pad_h = frame.padding.horizontal();
        let pad_v = frame.padding.vertical();

        if frame.children.is_empty() {
            return (pad_h, pad_v);
        }

        let content_w = (available_width - pad_h).max(0.0);
        let axis = Axis::from(frame.layout);

        let mut total_main = 0.0;
        let mut max_cross = 0.0f64;

        for child in &frame.children {
            let (cw, ch) = match child {
                Node::Frame(inner) => self.intrinsic_child_frame(inner, measurer, content_w),
                Node::Text(text) => {
                    let fixed = text.width.fixed().filter(|w| *w > 0.0);
                    let (tw, th) = self.measure_text(text, fixed.unwrap_or(content_w), measurer);
                    (fixed.unwrap_or(tw), th)
                }
            };
            total_main += axis.main(cw, ch);
            max_cross = max_cross.max(axis.cross(cw, ch));
        }

        let main = total_main + flex::total_gap(frame.gap, frame.children.len());
        match axis {
            Axis::Vertical => (max_cross + pad_h, main + pad_v),
            Axis::Horizontal => (main + pad_h, max_cross + pad_v),
        }
    }

    /// A nested frame's contribution to its parent's intrinsic size: fixed
    /// positive sizes as declared, fill axes as zero, the rest recursively.
    fn intrinsic_child_frame(
        &self,
        frame: &Frame,
        measurer: Option<&dyn TextMeasurer>,
        available_width: f64,
    ) -> (f64, f64) {
        let fixed_width = frame.width.fixed().filter(|w| *w > 0.0);
        let fixed_height = frame.height.fixed().filter(|h| *h > 0.0);
        let needs_width = fixed_width.is_none() && !frame.width.is_fill();
        let needs_height = fixed_height.is_none() && !frame.height.is_fill();

        let (iw, ih) = if needs_width || needs_height {
            self.intrinsic_size(frame, measurer, available_width)
        } else {
            (0.0, 0.0)
        };

        let width = match fixed_width {
            Some(w) => w,
            None if needs_width => iw,
            None => 0.0,
        };
        let height = match fixed_height {
            Some(h) => h,
            None if needs_height => ih,
            None => 0.0,
        };
        (width, height)
    }

    fn measure_text(
        &self,
        text: &Text,
        max_width: f64,
        measurer: Option<&dyn TextMeasurer>,
    ) -> (f64, f64) {
        match measurer {
            Some(m) => m.measure_text(
                &text.content,
                &text.font_family,
                text.font_size,
                &text.font_weight,
                max_width,
            ),
            None => estimate_text(&text.content, text.font_size, max_width, &self.estimate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dimension, Padding};
    use crate::style::{AlignItems, JustifyContent, LayoutAxis};

    /// 8px per char, capped at max width; height is the font size.
    struct StubMeasurer;

    impl TextMeasurer for StubMeasurer {
        fn measure_text(&self, text: &str, _: &str, size: f64, _: &str, max_width: f64) -> (f64, f64) {
            let mut w = text.chars().count() as f64 * 8.0;
            if max_width > 0.0 && w > max_width {
                w = max_width;
            }
            (w, size)
        }
    }

    fn frame(id: &str, w: f64, h: f64) -> Node {
        Frame::fixed(id, w, h).into()
    }

    fn container(layout: LayoutAxis, gap: f64, children: Vec<Node>) -> Frame {
        Frame {
            id: "f1".to_string(),
            layout,
            gap,
            children,
            ..Default::default()
        }
    }

    fn page(width: f64, height: f64, configure: impl FnOnce(&mut Frame)) -> Document {
        let mut root = Frame::fixed("page", width, height);
        configure(&mut root);
        Document {
            children: vec![root.into()],
            ..Default::default()
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn one_page_per_top_level_frame() {
        let doc = Document {
            children: vec![frame("p1", 100.0, 100.0), frame("p2", 200.0, 50.0)],
            ..Default::default()
        };
        let pages = LayoutEngine::new().layout(&doc, None).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!((pages[1].width, pages[1].height), (200.0, 50.0));
        assert_eq!(pages[1].root.id(), "p2");
    }

    #[test]
    fn empty_document_has_no_pages() {
        let doc = Document::default();
        let pages = LayoutEngine::new().layout(&doc, None).unwrap();
        assert!(pages.is_empty());
    }

    #[test]
    fn text_at_top_level_is_rejected() {
        let doc = Document {
            children: vec![frame("p1", 100.0, 100.0), Text::new("t1", "Hi", 12.0).into()],
            ..Default::default()
        };
        let err = LayoutEngine::new().layout(&doc, None).unwrap_err();
        assert!(matches!(err, PenError::InvalidDocument { ref id } if id == "t1"));
    }

    #[test]
    fn root_ignores_canvas_position() {
        let doc = page(400.0, 300.0, |root| {
            root.x = 1200.0;
            root.y = -80.0;
        });
        let pages = LayoutEngine::new().layout(&doc, None).unwrap();
        assert_eq!((pages[0].root.x, pages[0].root.y), (0.0, 0.0));
    }

    #[test]
    fn padding_offsets_child() {
        let doc = page(800.0, 600.0, |root| {
            root.padding = Padding {
                top: 10.0,
                right: 20.0,
                bottom: 30.0,
                left: 40.0,
            };
            root.children = vec![frame("a", 100.0, 50.0)];
        });
        let pages = LayoutEngine::new().layout(&doc, None).unwrap();
        let a = &pages[0].root.children[0];
        assert_eq!((a.x, a.y), (40.0, 10.0));
    }

    #[test]
    fn vertical_children_stack() {
        let doc = page(800.0, 600.0, |root| {
            root.layout = LayoutAxis::Vertical;
            root.children = vec![
                frame("a", 100.0, 50.0),
                frame("b", 100.0, 70.0),
                frame("c", 100.0, 30.0),
            ];
        });
        let pages = LayoutEngine::new().layout(&doc, None).unwrap();
        let ys: Vec<f64> = pages[0].root.children.iter().map(|c| c.y).collect();
        assert_eq!(ys, vec![0.0, 50.0, 120.0]);
    }

    #[test]
    fn horizontal_is_the_default_axis() {
        let doc = page(800.0, 600.0, |root| {
            root.children = vec![frame("a", 100.0, 50.0), frame("b", 100.0, 50.0)];
        });
        let pages = LayoutEngine::new().layout(&doc, None).unwrap();
        let b = &pages[0].root.children[1];
        assert_eq!((b.x, b.y), (100.0, 0.0));
    }

    #[test]
    fn gap_between_children() {
        let doc = page(800.0, 600.0, |root| {
            root.layout = LayoutAxis::Vertical;
            root.gap = 15.0;
            root.children = vec![
                frame("a", 100.0, 50.0),
                frame("b", 100.0, 70.0),
                frame("c", 100.0, 30.0),
            ];
        });
        let pages = LayoutEngine::new().layout(&doc, None).unwrap();
        let ys: Vec<f64> = pages[0].root.children.iter().map(|c| c.y).collect();
        assert_eq!(ys, vec![0.0, 65.0, 150.0]);
    }

    #[test]
    fn fill_takes_remaining_main_space() {
        let fill = Frame {
            id: "fill".to_string(),
            width: Dimension::Fixed(100.0),
            height: Dimension::FillContainer,
            ..Default::default()
        };
        let doc = page(800.0, 1000.0, |root| {
            root.layout = LayoutAxis::Vertical;
            root.gap = 20.0;
            root.children = vec![frame("header", 800.0, 200.0), fill.into()];
        });
        let pages = LayoutEngine::new().layout(&doc, None).unwrap();
        let f = &pages[0].root.children[1];
        assert_eq!((f.y, f.height), (220.0, 780.0));
    }

    #[test]
    fn equal_fills_split_evenly() {
        let fill = |id: &str| -> Node {
            Frame {
                id: id.to_string(),
                width: Dimension::Fixed(100.0),
                height: Dimension::FillContainer,
                ..Default::default()
            }
            .into()
        };
        let doc = page(800.0, 1000.0, |root| {
            root.layout = LayoutAxis::Vertical;
            root.children = vec![fill("a"), fill("b")];
        });
        let pages = LayoutEngine::new().layout(&doc, None).unwrap();
        let kids = &pages[0].root.children;
        assert_eq!(kids[0].height, 500.0);
        assert_eq!(kids[1].height, 500.0);
        assert_eq!(kids[1].y, 500.0);
    }

    #[test]
    fn uneven_fill_split_stays_within_epsilon() {
        let fill = |id: &str| -> Node {
            Frame {
                id: id.to_string(),
                width: Dimension::FillContainer,
                height: Dimension::Fixed(10.0),
                ..Default::default()
            }
            .into()
        };
        let doc = page(100.0, 10.0, |root| {
            root.children = vec![fill("a"), fill("b"), fill("c")];
        });
        let pages = LayoutEngine::new().layout(&doc, None).unwrap();
        let total: f64 = pages[0].root.children.iter().map(|c| c.width).sum();
        assert!(approx(total, 100.0));
    }

    #[test]
    fn overflow_clamps_fill_to_zero() {
        let fill = Frame {
            id: "fill".to_string(),
            width: Dimension::FillContainer,
            height: Dimension::Fixed(10.0),
            ..Default::default()
        };
        let doc = page(100.0, 10.0, |root| {
            root.children = vec![frame("wide", 300.0, 10.0), fill.into()];
        });
        let pages = LayoutEngine::new().layout(&doc, None).unwrap();
        assert_eq!(pages[0].root.children[1].width, 0.0);
    }

    #[test]
    fn cross_axis_fill_stretches() {
        let fill = Frame {
            id: "fill".to_string(),
            width: Dimension::FillContainer,
            height: Dimension::Fixed(40.0),
            ..Default::default()
        };
        let doc = page(800.0, 600.0, |root| {
            root.layout = LayoutAxis::Vertical;
            root.padding = Padding::uniform(25.0);
            root.children = vec![fill.into()];
        });
        let pages = LayoutEngine::new().layout(&doc, None).unwrap();
        assert_eq!(pages[0].root.children[0].width, 750.0);
    }

    #[test]
    fn justify_center_end_and_space_between() {
        let layout_with = |justify: JustifyContent| {
            let doc = page(1000.0, 100.0, |root| {
                root.justify_content = justify;
                root.gap = 10.0;
                root.children = vec![frame("a", 100.0, 10.0), frame("b", 200.0, 10.0)];
            });
            let pages = LayoutEngine::new().layout(&doc, None).unwrap();
            let kids = &pages[0].root.children;
            (kids[0].x, kids[1].x)
        };

        // used = 300 + 10
        assert_eq!(layout_with(JustifyContent::Center), (345.0, 455.0));
        assert_eq!(layout_with(JustifyContent::End), (690.0, 800.0));
        // second starts at first end + (1000 - 300)
        assert_eq!(layout_with(JustifyContent::SpaceBetween), (0.0, 800.0));
    }

    #[test]
    fn align_items_cross_offsets() {
        for (align, expected) in [
            (AlignItems::Start, 0.0),
            (AlignItems::Center, 300.0),
            (AlignItems::End, 600.0),
        ] {
            for justify in [JustifyContent::Start, JustifyContent::End] {
                let doc = page(800.0, 1000.0, |root| {
                    root.layout = LayoutAxis::Vertical;
                    root.align_items = align;
                    root.justify_content = justify;
                    root.children = vec![frame("a", 200.0, 100.0)];
                });
                let pages = LayoutEngine::new().layout(&doc, None).unwrap();
                assert_eq!(pages[0].root.children[0].x, expected);
            }
        }
    }

    #[test]
    fn combined_vertical_centered_page() {
        let doc = page(800.0, 1000.0, |root| {
            root.layout = LayoutAxis::Vertical;
            root.gap = 20.0;
            root.align_items = AlignItems::Center;
            root.padding = Padding::uniform(40.0);
            root.children = vec![frame("A", 200.0, 100.0), frame("B", 300.0, 100.0)];
        });
        let pages = LayoutEngine::new().layout(&doc, None).unwrap();
        let a = pages[0].root.find("A").unwrap();
        let b = pages[0].root.find("B").unwrap();
        assert_eq!((a.x, a.y), (300.0, 40.0));
        assert_eq!((b.x, b.y), (250.0, 160.0));
    }

    #[test]
    fn nested_frames_use_absolute_coordinates() {
        let inner = Frame {
            padding: Padding::uniform(5.0),
            children: vec![frame("leaf", 10.0, 10.0)],
            ..Frame::fixed("inner", 100.0, 100.0)
        };
        let doc = page(800.0, 600.0, |root| {
            root.padding = Padding::uniform(20.0);
            root.children = vec![frame("spacer", 50.0, 50.0), inner.into()];
        });
        let pages = LayoutEngine::new().layout(&doc, None).unwrap();
        let leaf = pages[0].root.find("leaf").unwrap();
        assert_eq!((leaf.x, leaf.y), (75.0, 25.0));
    }

    #[test]
    fn layout_is_idempotent() {
        let doc = page(800.0, 1000.0, |root| {
            root.layout = LayoutAxis::Vertical;
            root.gap = 7.0;
            root.justify_content = JustifyContent::Center;
            root.children = vec![
                frame("a", 123.0, 45.0),
                Text::new("t", "Some words here", 13.0).into(),
            ];
        });
        let engine = LayoutEngine::new();
        let first = engine.layout(&doc, None).unwrap()[0].info();
        let second = engine.layout(&doc, None).unwrap()[0].info();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn text_without_measurer_is_estimated() {
        let doc = page(800.0, 600.0, |root| {
            root.children = vec![Text::new("t", "Hello", 10.0).into()];
        });
        let pages = LayoutEngine::new().layout(&doc, None).unwrap();
        let t = &pages[0].root.children[0];
        assert!(approx(t.width, 30.0));
        assert!(approx(t.height, 12.0));
    }

    #[test]
    fn text_uses_supplied_measurer() {
        let doc = page(800.0, 600.0, |root| {
            root.children = vec![Text::new("t", "Hello", 16.0).into()];
        });
        let pages = LayoutEngine::new().layout(&doc, Some(&StubMeasurer)).unwrap();
        let t = &pages[0].root.children[0];
        assert_eq!((t.width, t.height), (40.0, 16.0));
    }

    #[test]
    fn custom_estimate_config() {
        let engine = LayoutEngine::with_estimate(EstimateConfig {
            char_width_ratio: 1.0,
            line_height_ratio: 2.0,
        });
        let doc = page(800.0, 600.0, |root| {
            root.children = vec![Text::new("t", "abc", 10.0).into()];
        });
        let pages = engine.layout(&doc, None).unwrap();
        let t = &pages[0].root.children[0];
        assert_eq!((t.width, t.height), (30.0, 20.0));
    }

    #[test]
    fn degenerate_frame_does_not_fail() {
        let doc = page(10.0, 10.0, |root| {
            root.padding = Padding::uniform(50.0);
            root.children = vec![frame("a", 20.0, 20.0)];
        });
        let pages = LayoutEngine::new().layout(&doc, None).unwrap();
        assert_eq!(pages[0].root.children.len(), 1);
    }

    #[test]
    fn intrinsic_empty_frame_is_zero() {
        let engine = LayoutEngine::new();
        let f = Frame::default();
        assert_eq!(engine.intrinsic_size(&f, None, 800.0), (0.0, 0.0));
    }

    #[test]
    fn intrinsic_empty_frame_is_its_padding() {
        let engine = LayoutEngine::new();
        let f = Frame {
            padding: Padding {
                top: 10.0,
                right: 20.0,
                bottom: 30.0,
                left: 40.0,
            },
            ..Default::default()
        };
        assert_eq!(engine.intrinsic_size(&f, None, 800.0), (60.0, 40.0));
    }

    #[test]
    fn intrinsic_horizontal_sums_width_maxes_height() {
        let engine = LayoutEngine::new();
        let f = container(
            LayoutAxis::Horizontal,
            0.0,
            vec![frame("a", 100.0, 50.0), frame("b", 200.0, 80.0)],
        );
        assert_eq!(engine.intrinsic_size(&f, None, 800.0), (300.0, 80.0));
    }

    #[test]
    fn intrinsic_vertical_sums_height_maxes_width() {
        let engine = LayoutEngine::new();
        let f = container(
            LayoutAxis::Vertical,
            0.0,
            vec![frame("a", 100.0, 50.0), frame("b", 200.0, 80.0)],
        );
        assert_eq!(engine.intrinsic_size(&f, None, 800.0), (200.0, 130.0));
    }

    #[test]
    fn intrinsic_includes_gaps() {
        let engine = LayoutEngine::new();
        let f = container(
            LayoutAxis::Vertical,
            10.0,
            vec![
                frame("a", 100.0, 50.0),
                frame("b", 100.0, 50.0),
                frame("c", 100.0, 50.0),
            ],
        );
        assert_eq!(engine.intrinsic_size(&f, None, 800.0), (100.0, 170.0));
    }

    #[test]
    fn intrinsic_adds_padding_to_content() {
        let engine = LayoutEngine::new();
        let mut f = container(LayoutAxis::Horizontal, 0.0, vec![frame("a", 100.0, 50.0)]);
        f.padding = Padding::symmetric(10.0, 20.0);
        assert_eq!(engine.intrinsic_size(&f, None, 800.0), (140.0, 70.0));
    }

    #[test]
    fn intrinsic_recurses_into_auto_frames() {
        let engine = LayoutEngine::new();
        let inner = container(
            LayoutAxis::Horizontal,
            0.0,
            vec![frame("a", 60.0, 30.0), frame("b", 40.0, 30.0)],
        );
        let outer = container(LayoutAxis::Vertical, 0.0, vec![inner.into()]);
        assert_eq!(engine.intrinsic_size(&outer, None, 800.0), (100.0, 30.0));
    }

    #[test]
    fn intrinsic_fill_child_contributes_nothing() {
        let engine = LayoutEngine::new();
        let fill = Frame {
            id: "fill".to_string(),
            width: Dimension::FillContainer,
            height: Dimension::Fixed(40.0),
            children: vec![frame("big", 500.0, 10.0)],
            ..Default::default()
        };
        let f = container(LayoutAxis::Vertical, 0.0, vec![fill.into(), frame("a", 100.0, 20.0)]);
        assert_eq!(engine.intrinsic_size(&f, None, 800.0), (100.0, 60.0));
    }

    #[test]
    fn intrinsic_measures_text() {
        let engine = LayoutEngine::new();
        let f = container(
            LayoutAxis::Vertical,
            0.0,
            vec![Text::new("t1", "Hello", 16.0).into()],
        );
        assert_eq!(engine.intrinsic_size(&f, Some(&StubMeasurer), 800.0), (40.0, 16.0));
    }

    #[test]
    fn intrinsic_text_with_fixed_width() {
        let engine = LayoutEngine::new();
        let mut text = Text::new("t1", "Hello", 16.0);
        text.width = Dimension::Fixed(200.0);
        let f = container(LayoutAxis::Vertical, 0.0, vec![text.into()]);
        assert_eq!(engine.intrinsic_size(&f, Some(&StubMeasurer), 800.0), (200.0, 16.0));
    }

    #[test]
    fn negative_text_width_is_measured() {
        let engine = LayoutEngine::new();
        let mut text = Text::new("t1", "Hello", 16.0);
        text.width = Dimension::Fixed(-50.0);

        let f = container(LayoutAxis::Vertical, 0.0, vec![text.clone().into()]);
        assert_eq!(engine.intrinsic_size(&f, Some(&StubMeasurer), 800.0), (40.0, 16.0));

        let doc = page(800.0, 600.0, |root| root.children = vec![text.into()]);
        let pages = engine.layout(&doc, Some(&StubMeasurer)).unwrap();
        let t = &pages[0].root.children[0];
        assert_eq!((t.width, t.height), (40.0, 16.0));
    }

    #[test]
    fn intrinsic_text_wraps_inside_padding() {
        let engine = LayoutEngine::new();
        // 20 chars * 8 = 160, available 100 - 2*10 padding = 80
        let mut f = container(
            LayoutAxis::Vertical,
            0.0,
            vec![Text::new("t1", &"x".repeat(20), 10.0).into()],
        );
        f.padding = Padding::uniform(10.0);
        assert_eq!(engine.intrinsic_size(&f, Some(&StubMeasurer), 100.0), (100.0, 30.0));
    }

    #[test]
    fn intrinsic_without_measurer_estimates_text() {
        let engine = LayoutEngine::new();
        let f = container(
            LayoutAxis::Vertical,
            0.0,
            vec![Text::new("t1", "Hello", 10.0).into()],
        );
        // 5 * 10 * 0.6 = 30, 10 * 1.2 = 12
        let (w, h) = engine.intrinsic_size(&f, None, 800.0);
        assert!((w - 30.0).abs() < 1e-9);
        assert!((h - 12.0).abs() < 1e-9);
    }

    #[test]
    fn auto_sized_child_uses_intrinsic_size() {
        let engine = LayoutEngine::new();
        let auto = container(
            LayoutAxis::Horizontal,
            10.0,
            vec![frame("a", 50.0, 20.0), frame("b", 50.0, 30.0)],
        );
        let doc = Document {
            children: vec![Frame {
                id: "page".to_string(),
                width: Dimension::Fixed(800.0),
                height: Dimension::Fixed(600.0),
                layout: LayoutAxis::Vertical,
                children: vec![auto.into()],
                ..Default::default()
            }
            .into()],
            ..Default::default()
        };

        let pages = engine.layout(&doc, None).unwrap();
        let auto_box = &pages[0].root.children[0];
        assert_eq!((auto_box.width, auto_box.height), (110.0, 30.0));
        let b = &auto_box.children[1];
        assert_eq!((b.x, b.y), (60.0, 0.0));
    }

    #[test]
    fn fill_width_text_takes_share() {
        let engine = LayoutEngine::new();
        let mut text = Text::new("t", "Hi", 10.0);
        text.width = Dimension::FillContainer;
        let doc = Document {
            children: vec![Frame {
                id: "page".to_string(),
                width: Dimension::Fixed(500.0),
                height: Dimension::Fixed(100.0),
                children: vec![frame("a", 100.0, 50.0), text.into()],
                ..Default::default()
            }
            .into()],
            ..Default::default()
        };

        let pages = engine.layout(&doc, Some(&StubMeasurer)).unwrap();
        let t = &pages[0].root.children[1];
        assert_eq!((t.x, t.width, t.height), (100.0, 400.0, 10.0));
    }

    #[test]
    fn page_info_mirrors_box_tree() {
        let engine = LayoutEngine::new();
        let doc = Document {
            children: vec![Frame {
                children: vec![frame("a", 10.0, 10.0)],
                ..Frame::fixed("page", 100.0, 100.0)
            }
            .into()],
            ..Default::default()
        };
        let pages = engine.layout(&doc, None).unwrap();
        let info = pages[0].info();
        assert_eq!(info.root.node_type, "frame");
        assert_eq!(info.root.children[0].id, "a");

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["root"]["children"][0]["nodeType"], "frame");
    }
}
