//! SVG renderer: every draw call creates a persistent node and every update
//! mutates that node in place.

use std::collections::HashMap;

use tracing::debug;

use super::document::SvgSurface;
use crate::error::{DrawkitError, Result};
use crate::geometry::{clamp_corner_radius, format_number};
use crate::render::backend::RenderBackend;
use crate::types::{
    AttributeUpdate, ClipPath, ClipRef, ClipRegion, DrawOptions, DrawRequest, GradientGeometry,
    GradientRef, GradientSpec, GradientTransform, GradientUnits, Paint, Rect, Shape, ShapeHandle,
    Size, SpreadMethod, TextStyle,
};

type Attributes = Vec<(&'static str, String)>;

struct SvgShape<N> {
    node: N,
    request: DrawRequest,
}

/// SVG backend over any [`SvgSurface`].
pub struct SvgRenderer<S: SvgSurface> {
    surface: S,
    root_id: String,
    next_handle: u32,
    next_clip: u32,
    next_gradient: u32,
    shapes: HashMap<ShapeHandle, SvgShape<S::Node>>,
    /// Draw order of top-level shapes; clip shapes are not listed.
    order: Vec<ShapeHandle>,
    gradients: HashMap<String, S::Node>,
}

impl<S: SvgSurface> SvgRenderer<S> {
    /// `root_id` prefixes every generated element id.
    pub fn new(surface: S, root_id: &str) -> Self {
        debug!(root_id, "svg renderer created");
        Self {
            surface,
            root_id: root_id.to_string(),
            next_handle: 0,
            next_clip: 0,
            next_gradient: 0,
            shapes: HashMap::new(),
            order: Vec::new(),
            gradients: HashMap::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Surface node backing a handle.
    pub fn node(&self, handle: ShapeHandle) -> Option<&S::Node> {
        self.shapes.get(&handle).map(|s| &s.node)
    }

    /// Number of live shapes, clip shapes included.
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    fn issue_handle(&mut self) -> ShapeHandle {
        let handle = ShapeHandle::from_raw(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn check_paints(&self, options: &DrawOptions) -> Result<()> {
        for paint in [&options.fill, &options.stroke] {
            if let Paint::Gradient(g) = paint {
                if !self.gradients.contains_key(&g.id) {
                    return Err(DrawkitError::Gradient(format!("unknown gradient `{}`", g.id)));
                }
            }
        }
        Ok(())
    }

    fn insert_shape(
        &mut self,
        parent: &S::Node,
        handle: ShapeHandle,
        request: DrawRequest,
    ) -> Result<()> {
        if let Shape::Path { path } = &request.shape {
            path.validate()?;
        }
        self.check_paints(&request.options)?;
        let node = self.surface.create_element(parent, svg_tag(&request.shape))?;
        let id = request
            .options
            .id
            .clone()
            .unwrap_or_else(|| format!("{}_shape_{}", self.root_id, handle.raw()));
        self.surface.set_attribute(&node, "id", &id)?;
        for (name, value) in attributes(&request) {
            self.surface.set_attribute(&node, name, &value)?;
        }
        if let Shape::Text { content, .. } = &request.shape {
            self.surface.set_text(&node, content)?;
        }
        self.shapes.insert(handle, SvgShape { node, request });
        Ok(())
    }
}

impl<S: SvgSurface> RenderBackend for SvgRenderer<S> {
    fn draw(&mut self, request: DrawRequest) -> Result<ShapeHandle> {
        let handle = self.issue_handle();
        let root = self.surface.root();
        self.insert_shape(&root, handle, request)?;
        self.order.push(handle);
        Ok(handle)
    }

    fn update_attributes(&mut self, handle: ShapeHandle, update: &AttributeUpdate) -> Result<()> {
        let shape = self
            .shapes
            .get(&handle)
            .ok_or(DrawkitError::UnknownShape(handle))?;
        let mut next = shape.request.clone();
        next.apply(update)?;
        self.check_paints(&next.options)?;

        let before = attributes(&shape.request);
        let after = attributes(&next);
        let node = shape.node.clone();
        for (name, _) in before.iter().filter(|(n, _)| !after.iter().any(|(m, _)| m == n)) {
            self.surface.remove_attribute(&node, name)?;
        }
        for (name, value) in &after {
            let unchanged = before.iter().any(|(n, v)| n == name && v == value);
            if !unchanged {
                self.surface.set_attribute(&node, name, value)?;
            }
        }
        if let Some(text) = &update.text {
            self.surface.set_text(&node, text)?;
        }
        if let Some(shape) = self.shapes.get_mut(&handle) {
            shape.request = next;
        }
        Ok(())
    }

    fn remove(&mut self, handle: ShapeHandle) -> Result<()> {
        let shape = self
            .shapes
            .remove(&handle)
            .ok_or(DrawkitError::UnknownShape(handle))?;
        self.order.retain(|h| *h != handle);
        self.surface.remove(&shape.node)
    }

    fn create_gradient(&mut self, spec: &GradientSpec) -> Result<GradientRef> {
        spec.validate()?;
        let id = spec.id.clone().unwrap_or_else(|| {
            self.next_gradient += 1;
            format!("{}_gradient_{}", self.root_id, self.next_gradient)
        });
        if let Some(old) = self.gradients.remove(&id) {
            self.surface.remove(&old)?;
        }
        let defs = self.surface.defs()?;
        let tag = if spec.is_linear() {
            "linearGradient"
        } else {
            "radialGradient"
        };
        let node = self.surface.create_element(&defs, tag)?;
        self.surface.set_attribute(&node, "id", &id)?;
        for (name, value) in gradient_attributes(spec) {
            self.surface.set_attribute(&node, name, &value)?;
        }
        for stop in &spec.stops {
            let stop_node = self.surface.create_element(&node, "stop")?;
            self.surface.set_attribute(
                &stop_node,
                "offset",
                &format!("{}%", format_number(stop.offset * 100.0)),
            )?;
            self.surface
                .set_attribute(&stop_node, "stop-color", &stop.color)?;
            self.surface
                .set_attribute(&stop_node, "stop-opacity", &format_number(stop.opacity))?;
        }
        self.gradients.insert(id.clone(), node);
        Ok(GradientRef { id })
    }

    fn set_gradient_transform(
        &mut self,
        gradient: &GradientRef,
        transform: GradientTransform,
    ) -> Result<()> {
        let node = self
            .gradients
            .get(&gradient.id)
            .ok_or_else(|| DrawkitError::Gradient(format!("unknown gradient `{}`", gradient.id)))?;
        self.surface
            .set_attribute(node, "gradientTransform", &transform.to_svg())
    }

    fn create_clip_path(&mut self, region: ClipRegion) -> Result<ClipPath> {
        self.next_clip += 1;
        let id = format!("{}_clip_{}", self.root_id, self.next_clip);
        let defs = self.surface.defs()?;
        let clip = self.surface.create_element(&defs, "clipPath")?;
        self.surface.set_attribute(&clip, "id", &id)?;

        let shape = match region {
            ClipRegion::Rect(rect) => Shape::Rect { rect },
            ClipRegion::Path(path) => Shape::Path { path },
        };
        let handle = self.issue_handle();
        let options = DrawOptions::default().with_id(format!("{id}_shape"));
        self.insert_shape(&clip, handle, DrawRequest::new(shape, options))?;
        Ok(ClipPath {
            reference: ClipRef { id },
            shape: handle,
        })
    }

    fn clear_region(&mut self, region: Rect) -> Result<()> {
        let doomed: Vec<ShapeHandle> = self
            .order
            .iter()
            .filter(|h| {
                self.shapes
                    .get(*h)
                    .and_then(|s| s.request.shape.bounds())
                    .is_some_and(|b| region.contains_rect(&b))
            })
            .copied()
            .collect();
        debug!(count = doomed.len(), "svg clear region");
        for handle in doomed {
            self.remove(handle)?;
        }
        Ok(())
    }

    fn measure_text(&self, text: &str, style: &TextStyle) -> Size {
        self.surface.measure_text(text, style)
    }

    fn size(&self) -> Size {
        self.surface.size()
    }
}

fn svg_tag(shape: &Shape) -> &'static str {
    match shape {
        Shape::Line { .. } => "line",
        Shape::Rect { .. } => "rect",
        Shape::Path { .. } => "path",
        Shape::Circle { .. } => "circle",
        Shape::Ellipse { .. } => "ellipse",
        Shape::Polyline { .. } => "polyline",
        Shape::Text { .. } => "text",
        Shape::Image { .. } => "image",
    }
}

/// Every attribute a request maps to, `id` excluded.
fn attributes(request: &DrawRequest) -> Attributes {
    let mut attrs: Attributes = Vec::new();
    let n = format_number;
    match &request.shape {
        Shape::Line { from, to } => {
            attrs.push(("x1", n(from.x)));
            attrs.push(("y1", n(from.y)));
            attrs.push(("x2", n(to.x)));
            attrs.push(("y2", n(to.y)));
        }
        Shape::Rect { rect } => {
            push_rect(&mut attrs, rect);
            let radius = request
                .options
                .corner_radius
                .map_or(0.0, |r| clamp_corner_radius(rect.width, rect.height, r));
            if radius > 0.0 {
                attrs.push(("rx", n(radius)));
                attrs.push(("ry", n(radius)));
            }
        }
        Shape::Path { path } => attrs.push(("d", path.to_path_data())),
        Shape::Circle { center, radius } => {
            attrs.push(("cx", n(center.x)));
            attrs.push(("cy", n(center.y)));
            attrs.push(("r", n(*radius)));
        }
        Shape::Ellipse { center, rx, ry } => {
            attrs.push(("cx", n(center.x)));
            attrs.push(("cy", n(center.y)));
            attrs.push(("rx", n(*rx)));
            attrs.push(("ry", n(*ry)));
        }
        Shape::Polyline { points } => {
            let joined = points
                .iter()
                .map(|p| format!("{},{}", n(p.x), n(p.y)))
                .collect::<Vec<_>>()
                .join(" ");
            attrs.push(("points", joined));
        }
        Shape::Text {
            position, style, ..
        } => {
            attrs.push(("x", n(position.x)));
            attrs.push(("y", n(position.y)));
            push_text_style(&mut attrs, style);
        }
        Shape::Image { source, bounds } => {
            attrs.push(("href", source.href.clone()));
            push_rect(&mut attrs, bounds);
        }
    }
    push_options(&mut attrs, request);
    attrs
}

fn push_rect(attrs: &mut Attributes, rect: &Rect) {
    attrs.push(("x", format_number(rect.x)));
    attrs.push(("y", format_number(rect.y)));
    attrs.push(("width", format_number(rect.width.max(0.0))));
    attrs.push(("height", format_number(rect.height.max(0.0))));
}

fn push_text_style(attrs: &mut Attributes, style: &TextStyle) {
    attrs.push(("font-size", format!("{}px", format_number(style.size))));
    attrs.push(("font-family", style.family.clone()));
    attrs.push(("font-style", style.style.to_lowercase()));
    attrs.push(("font-weight", style.normalized_weight()));
    attrs.push(("text-anchor", style.anchor.svg_value().to_string()));
    if let Some(baseline) = &style.baseline {
        attrs.push(("dominant-baseline", baseline.clone()));
    }
    attrs.push(("fill", style.fill.css_value()));
}

fn push_options(attrs: &mut Attributes, request: &DrawRequest) {
    let options = &request.options;
    let is_text = matches!(request.shape, Shape::Text { .. });
    if !is_text {
        attrs.push(("fill", options.fill.css_value()));
    }
    if !is_text || options.has_stroke() {
        attrs.push(("stroke", options.stroke.css_value()));
        attrs.push(("stroke-width", format_number(options.stroke_width)));
    }
    attrs.push(("opacity", format_number(options.opacity)));
    if let Some(dash) = &options.dash_array {
        let joined = dash
            .iter()
            .map(|d| format_number(*d))
            .collect::<Vec<_>>()
            .join(" ");
        attrs.push(("stroke-dasharray", joined));
    }
    if let Some(cap) = options.line_cap {
        attrs.push(("stroke-linecap", cap.as_str().to_string()));
    }
    if let Some(clip) = &options.clip {
        attrs.push(("clip-path", clip.css_value()));
    }
    if !options.visible {
        attrs.push(("visibility", "hidden".to_string()));
    }
}

fn gradient_attributes(spec: &GradientSpec) -> Attributes {
    let n = format_number;
    let mut attrs: Attributes = match spec.geometry {
        GradientGeometry::Linear { start, end } => vec![
            ("x1", n(start.x)),
            ("y1", n(start.y)),
            ("x2", n(end.x)),
            ("y2", n(end.y)),
        ],
        GradientGeometry::Radial { center, radius } => {
            vec![("cx", n(center.x)), ("cy", n(center.y)), ("r", n(radius))]
        }
    };
    if spec.units == GradientUnits::UserSpaceOnUse {
        attrs.push(("gradientUnits", "userSpaceOnUse".to_string()));
    }
    if spec.spread == SpreadMethod::Repeat {
        attrs.push(("spreadMethod", "repeat".to_string()));
    }
    if let Some(transform) = spec.transform {
        attrs.push(("gradientTransform", transform.to_svg()));
    }
    attrs
}
