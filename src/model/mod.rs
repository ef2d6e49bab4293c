//! # Document Model
//!
//! The input representation for the layout engine. A .pen document is a
//! list of top-level frames (one per page) plus a table of named variables.
//! Frames nest other frames and text leaves.
//!
//! The JSON shapes are loose in a few places: a dimension is a number or the
//! keyword `"fill_container"`, padding is a number or a 2/4 element array,
//! and a fill is either a color string or an image object. Those are decoded
//! through small untagged "raw" enums and converted with `try_from`, so a
//! malformed value surfaces as a serde data error pointing at the field.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{PenError, Result};
use crate::style::{AlignItems, JustifyContent, LayoutAxis, TextAlign};

/// A complete .pen document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub version: String,

    /// Top-level nodes. Each must be a frame; each frame becomes a page.
    #[serde(default)]
    pub children: Vec<Node>,

    /// Named values referenced from fills as `$name`. `None` when the
    /// document has no `variables` key at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, Variable>>,
}

impl Document {
    /// Parse a document from .pen JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Keep only the top-level nodes whose names appear in `names`.
    pub fn retain_pages(&mut self, names: &str) -> Result<()> {
        let children = std::mem::take(&mut self.children);
        self.children = filter_pages_by_name(children, names)?;
        Ok(())
    }
}

/// A node in the document tree. The set is closed: every algorithm over the
/// tree matches both variants explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Frame(Frame),
    Text(Text),
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Frame(f) => &f.id,
            Node::Text(t) => &t.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Frame(f) => &f.name,
            Node::Text(t) => &t.name,
        }
    }

    /// The JSON `"type"` tag of this node.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Node::Frame(_) => "frame",
            Node::Text(_) => "text",
        }
    }

    pub fn as_frame(&self) -> Option<&Frame> {
        match self {
            Node::Frame(f) => Some(f),
            Node::Text(_) => None,
        }
    }
}

/// A container. Lays its children out along one axis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Canvas position in the design tool. Not used for page roots.
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: Dimension,
    #[serde(default)]
    pub height: Dimension,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(default)]
    pub corner_radius: f64,
    #[serde(default)]
    pub clip: bool,
    #[serde(default)]
    pub layout: LayoutAxis,
    #[serde(default)]
    pub gap: f64,
    #[serde(default)]
    pub padding: Padding,
    #[serde(default)]
    pub justify_content: JustifyContent,
    #[serde(default)]
    pub align_items: AlignItems,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// A text leaf.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
    /// Text color, `#RRGGBB[AA]` or a `$variable` before resolution.
    #[serde(default)]
    pub fill: String,
    #[serde(default)]
    pub font_family: String,
    #[serde(default)]
    pub font_size: f64,
    #[serde(default)]
    pub font_weight: String,
    #[serde(default)]
    pub font_style: String,
    #[serde(default)]
    pub letter_spacing: f64,
    /// Multiplier of `font_size`. Zero means the default of 1.2.
    #[serde(default)]
    pub line_height: f64,
    #[serde(default)]
    pub text_align: TextAlign,
    #[serde(default)]
    pub width: Dimension,
    #[serde(default)]
    pub text_growth: String,
}

/// A frame or text size along one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDimension", into = "RawDimension")]
pub enum Dimension {
    /// Sized by content.
    #[default]
    Auto,
    /// Exact size in pixels.
    Fixed(f64),
    /// Takes the container's space along this axis.
    FillContainer,
}

impl Dimension {
    /// The explicit size, if one is set. A zero value counts as unset.
    pub fn fixed(&self) -> Option<f64> {
        match *self {
            Dimension::Fixed(v) if v != 0.0 => Some(v),
            _ => None,
        }
    }

    pub fn is_fill(&self) -> bool {
        matches!(self, Dimension::FillContainer)
    }

    /// Size as a plain number: the fixed value, or 0.
    pub fn value(&self) -> f64 {
        match *self {
            Dimension::Fixed(v) => v,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawDimension {
    Number(f64),
    Keyword(String),
    Missing(()),
}

impl TryFrom<RawDimension> for Dimension {
    type Error = String;

    fn try_from(raw: RawDimension) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawDimension::Number(v) => Ok(Dimension::Fixed(v)),
            RawDimension::Keyword(s) if s == "fill_container" => Ok(Dimension::FillContainer),
            RawDimension::Keyword(s) => Err(format!("unknown dimension value: {s:?}")),
            RawDimension::Missing(()) => Ok(Dimension::Auto),
        }
    }
}

impl From<Dimension> for RawDimension {
    fn from(d: Dimension) -> Self {
        match d {
            Dimension::Auto => RawDimension::Missing(()),
            Dimension::Fixed(v) => RawDimension::Number(v),
            Dimension::FillContainer => RawDimension::Keyword("fill_container".to_string()),
        }
    }
}

/// Edge insets inside a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPadding", into = "RawPadding")]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawPadding {
    Uniform(f64),
    Edges(Vec<f64>),
    Missing(()),
}

impl TryFrom<RawPadding> for Padding {
    type Error = String;

    fn try_from(raw: RawPadding) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawPadding::Uniform(v) => Ok(Padding::uniform(v)),
            RawPadding::Edges(edges) => match edges.as_slice() {
                [v, h] => Ok(Padding::symmetric(*v, *h)),
                [top, right, bottom, left] => Ok(Padding {
                    top: *top,
                    right: *right,
                    bottom: *bottom,
                    left: *left,
                }),
                other => Err(format!(
                    "padding array must have 2 or 4 elements, got {}",
                    other.len()
                )),
            },
            RawPadding::Missing(()) => Ok(Padding::default()),
        }
    }
}

impl From<Padding> for RawPadding {
    fn from(p: Padding) -> Self {
        RawPadding::Edges(vec![p.top, p.right, p.bottom, p.left])
    }
}

/// How a frame's background is painted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFill", into = "RawFill")]
pub enum Fill {
    Solid {
        color: String,
    },
    Image {
        url: String,
        mode: String,
        opacity: f64,
        enabled: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawFill {
    Color(String),
    Object {
        #[serde(rename = "type", default)]
        kind: String,
        #[serde(default)]
        url: String,
        #[serde(default)]
        mode: String,
        #[serde(default)]
        opacity: f64,
        #[serde(default = "enabled_by_default")]
        enabled: bool,
    },
}

fn enabled_by_default() -> bool {
    true
}

impl TryFrom<RawFill> for Fill {
    type Error = String;

    fn try_from(raw: RawFill) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawFill::Color(color) => Ok(Fill::Solid { color }),
            RawFill::Object {
                kind,
                url,
                mode,
                opacity,
                enabled,
            } => match kind.as_str() {
                "image" => Ok(Fill::Image {
                    url,
                    mode,
                    opacity,
                    enabled,
                }),
                _ => Err(format!("unknown fill type: {kind:?}")),
            },
        }
    }
}

impl From<Fill> for RawFill {
    fn from(fill: Fill) -> Self {
        match fill {
            Fill::Solid { color } => RawFill::Color(color),
            Fill::Image {
                url,
                mode,
                opacity,
                enabled,
            } => RawFill::Object {
                kind: "image".to_string(),
                url,
                mode,
                opacity,
                enabled,
            },
        }
    }
}

/// A named value in the document's variable table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Variable {
    Color(String),
    String(String),
    Number(f64),
}

impl Variable {
    /// The string payload of color and string variables.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variable::Color(s) | Variable::String(s) => Some(s),
            Variable::Number(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Variable::Color(_) => "color",
            Variable::String(_) => "string",
            Variable::Number(_) => "number",
        }
    }
}

/// Keep the nodes whose names appear in the comma-separated `names` list.
/// Order follows `children`, not the filter.
pub fn filter_pages_by_name(children: Vec<Node>, names: &str) -> Result<Vec<Node>> {
    let wanted: HashSet<&str> = names.split(',').map(str::trim).collect();

    let filtered: Vec<Node> = children
        .into_iter()
        .filter(|child| wanted.contains(child.name()))
        .collect();

    if filtered.is_empty() {
        return Err(PenError::NoPagesMatch {
            filter: names.to_string(),
        });
    }
    Ok(filtered)
}

/// A unique font family + weight + style combination used by text nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontRef {
    pub family: String,
    pub weight: String,
    pub style: String,
}

/// Walk the document and return every distinct font reference, in the order
/// they are first seen. Text nodes without a family are skipped.
pub fn collect_font_refs(document: &Document) -> Vec<FontRef> {
    let mut seen = HashSet::new();
    let mut refs = Vec::new();
    for child in &document.children {
        collect_from_node(child, &mut seen, &mut refs);
    }
    refs
}

fn collect_from_node(node: &Node, seen: &mut HashSet<FontRef>, refs: &mut Vec<FontRef>) {
    match node {
        Node::Text(text) => {
            if text.font_family.is_empty() {
                return;
            }
            let font = FontRef {
                family: text.font_family.clone(),
                weight: text.font_weight.clone(),
                style: text.font_style.clone(),
            };
            if seen.insert(font.clone()) {
                refs.push(font);
            }
        }
        Node::Frame(frame) => {
            for child in &frame.children {
                collect_from_node(child, seen, refs);
            }
        }
    }
}

impl Frame {
    /// A frame with fixed width and height and no children.
    pub fn fixed(id: &str, width: f64, height: f64) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            width: Dimension::Fixed(width),
            height: Dimension::Fixed(height),
            ..Default::default()
        }
    }
}

impl Text {
    /// A text node with content and font size.
    pub fn new(id: &str, content: &str, font_size: f64) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            content: content.to_string(),
            font_size,
            ..Default::default()
        }
    }
}

impl From<Frame> for Node {
    fn from(frame: Frame) -> Self {
        Node::Frame(frame)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_frame(json: &str) -> std::result::Result<Frame, serde_json::Error> {
        match serde_json::from_str::<Node>(json)? {
            Node::Frame(f) => Ok(f),
            Node::Text(_) => panic!("expected a frame"),
        }
    }

    #[test]
    fn dimension_shapes() {
        let f = parse_frame(r#"{"type":"frame","id":"a","width":800,"height":"fill_container"}"#)
            .unwrap();
        assert_eq!(f.width, Dimension::Fixed(800.0));
        assert_eq!(f.height, Dimension::FillContainer);

        let f = parse_frame(r#"{"type":"frame","id":"a"}"#).unwrap();
        assert_eq!(f.width, Dimension::Auto);

        let f = parse_frame(r#"{"type":"frame","id":"a","width":null}"#).unwrap();
        assert_eq!(f.width, Dimension::Auto);
    }

    #[test]
    fn unknown_dimension_keyword_is_rejected() {
        let err = parse_frame(r#"{"type":"frame","id":"a","width":"hug_contents"}"#).unwrap_err();
        assert!(err.to_string().contains("hug_contents"));
    }

    #[test]
    fn zero_dimension_counts_as_unset() {
        assert_eq!(Dimension::Fixed(0.0).fixed(), None);
        assert_eq!(Dimension::Fixed(12.0).fixed(), Some(12.0));
        assert_eq!(Dimension::FillContainer.fixed(), None);
    }

    #[test]
    fn padding_shapes() {
        let f = parse_frame(r#"{"type":"frame","padding":40}"#).unwrap();
        assert_eq!(f.padding, Padding::uniform(40.0));

        let f = parse_frame(r#"{"type":"frame","padding":[10,20]}"#).unwrap();
        assert_eq!(f.padding, Padding::symmetric(10.0, 20.0));

        let f = parse_frame(r#"{"type":"frame","padding":[1,2,3,4]}"#).unwrap();
        assert_eq!(
            f.padding,
            Padding {
                top: 1.0,
                right: 2.0,
                bottom: 3.0,
                left: 4.0
            }
        );

        assert!(parse_frame(r#"{"type":"frame","padding":[1,2,3]}"#).is_err());
    }

    #[test]
    fn fill_shapes() {
        let f = parse_frame(r##"{"type":"frame","fill":"#FF0000"}"##).unwrap();
        assert_eq!(
            f.fill,
            Some(Fill::Solid {
                color: "#FF0000".to_string()
            })
        );

        let f = parse_frame(
            r#"{"type":"frame","fill":{"type":"image","url":"bg.png","mode":"fill","opacity":0.5,"enabled":true}}"#,
        )
        .unwrap();
        assert_eq!(
            f.fill,
            Some(Fill::Image {
                url: "bg.png".to_string(),
                mode: "fill".to_string(),
                opacity: 0.5,
                enabled: true,
            })
        );

        let f = parse_frame(r#"{"type":"frame","fill":{"type":"image","url":"bg.png"}}"#).unwrap();
        assert!(matches!(f.fill, Some(Fill::Image { enabled: true, .. })));

        assert!(parse_frame(r#"{"type":"frame","fill":{"type":"gradient"}}"#).is_err());
    }

    #[test]
    fn unknown_node_type_is_rejected() {
        assert!(serde_json::from_str::<Node>(r#"{"type":"ellipse","id":"e"}"#).is_err());
    }

    #[test]
    fn variables_by_type() {
        let doc = Document::from_json(
            r##"{"version":"2.6","children":[],"variables":{
                "primary":{"type":"color","value":"#112233"},
                "title":{"type":"string","value":"Hello"},
                "size":{"type":"number","value":14}
            }}"##,
        )
        .unwrap();
        assert_eq!(doc.version, "2.6");
        let variables = doc.variables.as_ref().unwrap();
        assert_eq!(variables["primary"], Variable::Color("#112233".to_string()));
        assert_eq!(variables["title"].as_str(), Some("Hello"));
        assert_eq!(variables["size"], Variable::Number(14.0));
        assert_eq!(variables["size"].as_str(), None);
    }

    #[test]
    fn absent_and_empty_variable_tables_differ() {
        let doc = Document::from_json(r#"{"children":[]}"#).unwrap();
        assert!(doc.variables.is_none());

        let doc = Document::from_json(r#"{"children":[],"variables":{}}"#).unwrap();
        assert_eq!(doc.variables.map(|v| v.len()), Some(0));
    }

    #[test]
    fn node_accessors() {
        let node: Node = Text::new("t1", "Hi", 12.0).into();
        assert_eq!(node.id(), "t1");
        assert_eq!(node.name(), "t1");
        assert_eq!(node.type_tag(), "text");
        assert!(node.as_frame().is_none());
    }

    fn named(name: &str) -> Node {
        Frame {
            id: name.to_lowercase(),
            name: name.to_string(),
            ..Default::default()
        }
        .into()
    }

    #[test]
    fn filter_keeps_document_order_and_trims() {
        let children = vec![named("Front"), named("Middle"), named("Back")];
        let kept = filter_pages_by_name(children, " Back , Front").unwrap();
        let names: Vec<&str> = kept.iter().map(Node::name).collect();
        assert_eq!(names, vec!["Front", "Back"]);
    }

    #[test]
    fn filter_without_match_fails() {
        let err = filter_pages_by_name(vec![named("Front")], "Cover").unwrap_err();
        assert!(matches!(err, PenError::NoPagesMatch { .. }));
    }

    #[test]
    fn font_refs_are_unique_and_ordered() {
        let text = |family: &str, weight: &str| -> Node {
            Text {
                font_family: family.to_string(),
                font_weight: weight.to_string(),
                ..Default::default()
            }
            .into()
        };
        let doc = Document {
            children: vec![Frame {
                children: vec![
                    text("Inter", "700"),
                    text("", "400"),
                    Frame {
                        children: vec![text("Inter", "700"), text("Roboto", "400")],
                        ..Default::default()
                    }
                    .into(),
                ],
                ..Default::default()
            }
            .into()],
            ..Default::default()
        };

        let refs = collect_font_refs(&doc);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].family, "Inter");
        assert_eq!(refs[1].family, "Roboto");
    }
}
