//! Logical draw requests shared by the SVG and Canvas backends.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rect, Size};
use super::paint::Paint;
use crate::error::{DrawkitError, Result};
use crate::geometry::PathSpec;

/// Average glyph advance as a fraction of the font size, used when no text
/// metrics are available.
const APPROX_GLYPH_WIDTH: f64 = 0.6;

/// Opaque reference to a drawn shape.
///
/// For the SVG backend it maps to a live node, for the Canvas backend to an
/// entry of the retained display list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeHandle(u32);

impl ShapeHandle {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ShapeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference to a clip region, usable in [`DrawOptions::clip`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClipRef {
    pub id: String,
}

impl ClipRef {
    /// CSS `clip-path` value.
    pub fn css_value(&self) -> String {
        format!("url(#{})", self.id)
    }
}

/// A clip region together with the handle of its (updatable) inner shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPath {
    pub reference: ClipRef,
    pub shape: ShapeHandle,
}

/// Geometry of a clip region.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipRegion {
    Rect(Rect),
    Path(PathSpec),
}

/// Stroke cap style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
            Self::Square => "square",
        }
    }
}

/// Horizontal text anchoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

impl TextAnchor {
    /// SVG `text-anchor` value.
    pub fn svg_value(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }

    /// Canvas `textAlign` value.
    pub fn canvas_value(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "center",
            Self::End => "end",
        }
    }
}

/// Font and fill of a text run.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels.
    pub size: f64,
    pub family: String,
    pub style: String,
    pub weight: String,
    pub fill: Paint,
    pub anchor: TextAnchor,
    pub baseline: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 16.0,
            family: "Segoe UI".to_string(),
            style: "normal".to_string(),
            weight: "normal".to_string(),
            fill: Paint::Color("#000000".to_string()),
            anchor: TextAnchor::Start,
            baseline: None,
        }
    }
}

impl TextStyle {
    /// Canvas font shorthand, e.g. `"normal bold 12px Roboto"`.
    pub fn font(&self) -> String {
        format!(
            "{} {} {}px {}",
            self.style.to_lowercase(),
            self.normalized_weight(),
            crate::geometry::format_number(self.size),
            self.family
        )
    }

    /// `"regular"` is not a CSS weight; browsers expect `"normal"`.
    pub fn normalized_weight(&self) -> String {
        if self.weight.eq_ignore_ascii_case("regular") {
            "normal".to_string()
        } else {
            self.weight.to_lowercase()
        }
    }

    /// Size estimate for backends without real text metrics.
    pub fn approximate_size(&self, text: &str) -> Size {
        #[allow(clippy::cast_precision_loss)]
        let glyphs = text.chars().count() as f64;
        Size::new(glyphs * self.size * APPROX_GLYPH_WIDTH, self.size)
    }
}

/// Image location: a URL or an inline data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    pub href: String,
}

impl ImageSource {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self { href: url.into() }
    }

    /// Embed raw image bytes as a base64 data URI.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self {
            href: format!("data:{mime};base64,{}", BASE64_STANDARD.encode(bytes)),
        }
    }
}

/// Per-call drawing configuration. Build a fresh one per frame when animating.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOptions {
    /// Element id (SVG); generated when absent.
    pub id: Option<String>,
    pub fill: Paint,
    pub stroke: Paint,
    pub stroke_width: f64,
    pub opacity: f64,
    pub dash_array: Option<Vec<f64>>,
    pub corner_radius: Option<f64>,
    pub line_cap: Option<LineCap>,
    pub clip: Option<ClipRef>,
    pub visible: bool,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            id: None,
            fill: Paint::None,
            stroke: Paint::None,
            stroke_width: 0.0,
            opacity: 1.0,
            dash_array: None,
            corner_radius: None,
            line_cap: None,
            clip: None,
            visible: true,
        }
    }
}

impl DrawOptions {
    /// Stroke-only options.
    pub fn stroked(stroke: impl Into<Paint>, width: f64) -> Self {
        Self {
            stroke: stroke.into(),
            stroke_width: width,
            ..Self::default()
        }
    }

    /// Fill-only options.
    pub fn filled(fill: impl Into<Paint>) -> Self {
        Self {
            fill: fill.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_fill(mut self, fill: impl Into<Paint>) -> Self {
        self.fill = fill.into();
        self
    }

    pub fn with_stroke(mut self, stroke: impl Into<Paint>, width: f64) -> Self {
        self.stroke = stroke.into();
        self.stroke_width = width;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_dash_array(mut self, dash: Vec<f64>) -> Self {
        self.dash_array = Some(dash);
        self
    }

    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = Some(radius);
        self
    }

    pub fn with_line_cap(mut self, cap: LineCap) -> Self {
        self.line_cap = Some(cap);
        self
    }

    pub fn with_clip(mut self, clip: ClipRef) -> Self {
        self.clip = Some(clip);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Whether a stroke pass is needed.
    pub fn has_stroke(&self) -> bool {
        self.stroke_width > 0.0 && !self.stroke.is_none()
    }
}

/// Logical shape description.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line { from: Point, to: Point },
    Rect { rect: Rect },
    Path { path: PathSpec },
    Circle { center: Point, radius: f64 },
    Ellipse { center: Point, rx: f64, ry: f64 },
    Polyline { points: Vec<Point> },
    Text { content: String, position: Point, style: TextStyle },
    Image { source: ImageSource, bounds: Rect },
}

impl Shape {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Line { .. } => "line",
            Self::Rect { .. } => "rect",
            Self::Path { .. } => "path",
            Self::Circle { .. } => "circle",
            Self::Ellipse { .. } => "ellipse",
            Self::Polyline { .. } => "polyline",
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
        }
    }

    /// Conservative bounding box of the geometry (stroke excluded).
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Line { from, to } => Rect::bounding([*from, *to]),
            Self::Rect { rect } => Some(*rect),
            Self::Path { path } => path.bounds(),
            Self::Circle { center, radius } => Some(Rect::new(
                center.x - radius,
                center.y - radius,
                radius * 2.0,
                radius * 2.0,
            )),
            Self::Ellipse { center, rx, ry } => Some(Rect::new(
                center.x - rx,
                center.y - ry,
                rx * 2.0,
                ry * 2.0,
            )),
            Self::Polyline { points } => Rect::bounding(points.iter().copied()),
            Self::Text {
                content,
                position,
                style,
            } => {
                let size = style.approximate_size(content);
                let x = match style.anchor {
                    TextAnchor::Start => position.x,
                    TextAnchor::Middle => position.x - size.width / 2.0,
                    TextAnchor::End => position.x - size.width,
                };
                Some(Rect::new(x, position.y - size.height, size.width, size.height))
            }
            Self::Image { bounds, .. } => Some(*bounds),
        }
    }

    /// Apply the geometric part of an update, rejecting fields that do not
    /// apply to this kind of shape.
    pub fn apply(&mut self, update: &AttributeUpdate) -> Result<()> {
        if let Some(x) = update.x {
            match self {
                Self::Rect { rect } => rect.x = x,
                Self::Image { bounds, .. } => bounds.x = x,
                Self::Text { position, .. } => position.x = x,
                other => return Err(mismatch("x", other)),
            }
        }
        if let Some(width) = update.width {
            match self {
                Self::Rect { rect } => rect.width = width,
                Self::Image { bounds, .. } => bounds.width = width,
                other => return Err(mismatch("width", other)),
            }
        }
        if let Some(ref new_path) = update.path {
            match self {
                Self::Path { path } => *path = new_path.clone(),
                other => return Err(mismatch("d", other)),
            }
        }
        if let Some(ref text) = update.text {
            match self {
                Self::Text { content, .. } => content.clone_from(text),
                other => return Err(mismatch("text", other)),
            }
        }
        Ok(())
    }
}

fn mismatch(attribute: &str, shape: &Shape) -> DrawkitError {
    DrawkitError::InvalidUpdate(format!(
        "attribute `{attribute}` does not apply to {}",
        shape.kind()
    ))
}

/// A shape plus its drawing configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRequest {
    pub shape: Shape,
    pub options: DrawOptions,
}

impl DrawRequest {
    pub fn new(shape: Shape, options: DrawOptions) -> Self {
        Self { shape, options }
    }

    /// Apply a partial update to both geometry and options.
    pub fn apply(&mut self, update: &AttributeUpdate) -> Result<()> {
        self.shape.apply(update)?;
        update.apply_to_options(&mut self.options);
        Ok(())
    }
}

/// Partial attribute update for an already-drawn shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeUpdate {
    pub fill: Option<Paint>,
    pub stroke: Option<Paint>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<f64>,
    /// An empty vector clears the dash pattern.
    pub dash_array: Option<Vec<f64>>,
    pub line_cap: Option<LineCap>,
    pub visible: Option<bool>,
    pub clip: Option<ClipRef>,
    pub x: Option<f64>,
    pub width: Option<f64>,
    pub path: Option<PathSpec>,
    pub text: Option<String>,
}

impl AttributeUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill(mut self, fill: impl Into<Paint>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    pub fn stroke(mut self, stroke: impl Into<Paint>) -> Self {
        self.stroke = Some(stroke.into());
        self
    }

    pub fn stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn dash_array(mut self, dash: Vec<f64>) -> Self {
        self.dash_array = Some(dash);
        self
    }

    pub fn line_cap(mut self, cap: LineCap) -> Self {
        self.line_cap = Some(cap);
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn clip(mut self, clip: ClipRef) -> Self {
        self.clip = Some(clip);
        self
    }

    pub fn x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn path(mut self, path: PathSpec) -> Self {
        self.path = Some(path);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    fn apply_to_options(&self, options: &mut DrawOptions) {
        if let Some(ref fill) = self.fill {
            options.fill = fill.clone();
        }
        if let Some(ref stroke) = self.stroke {
            options.stroke = stroke.clone();
        }
        if let Some(width) = self.stroke_width {
            options.stroke_width = width;
        }
        if let Some(opacity) = self.opacity {
            options.opacity = opacity;
        }
        if let Some(ref dash) = self.dash_array {
            options.dash_array = if dash.is_empty() {
                None
            } else {
                Some(dash.clone())
            };
        }
        if let Some(cap) = self.line_cap {
            options.line_cap = Some(cap);
        }
        if let Some(visible) = self.visible {
            options.visible = visible;
        }
        if let Some(ref clip) = self.clip {
            options.clip = Some(clip.clone());
        }
    }
}
