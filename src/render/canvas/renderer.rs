//! Canvas renderer: an immediate-mode surface made to look retained.
//!
//! Every draw paints once and appends to a display list. Updates, removals
//! and gradient changes clear the surface and replay the list in order.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::f64::consts::TAU;
use std::rc::Rc;

use tracing::debug;

use super::context::{Canvas2d, CanvasPaint};
use crate::error::{DrawkitError, Result};
use crate::geometry::{
    clamp_corner_radius, endpoint_to_center, rect_path, CenterArc, PathCommand, PathSpec,
};
use crate::render::backend::RenderBackend;
use crate::render::colors::parse_color_rgba;
use crate::types::{
    AttributeUpdate, ClipPath, ClipRef, ClipRegion, DrawOptions, DrawRequest, GradientGeometry,
    GradientRef, GradientSpec, GradientStop, GradientTransform, GradientUnits, Paint, Point, Rect,
    Shape, ShapeHandle, Size, SpreadMethod, TextStyle,
};

const TEXT_MEASURE_CACHE_MAX: usize = 512;

/// Upper bound on stop repetitions when expanding a repeating gradient.
const MAX_GRADIENT_REPEATS: f64 = 256.0;

struct TextMeasureCache {
    entries: HashMap<Rc<str>, f64>,
    order: VecDeque<Rc<str>>,
    max_entries: usize,
    scratch: String,
}

impl TextMeasureCache {
    fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            max_entries,
            scratch: String::new(),
        }
    }

    fn get(&mut self, font: &str, text: &str) -> Option<f64> {
        if self.max_entries == 0 {
            return None;
        }
        let key = Self::build_key(&mut self.scratch, font, text);
        self.entries.get(key).copied()
    }

    fn insert(&mut self, font: &str, text: &str, width: f64) {
        if self.max_entries == 0 {
            return;
        }
        let key = Self::build_key(&mut self.scratch, font, text);
        if self.entries.contains_key(key) {
            return;
        }
        let key_rc: Rc<str> = key.into();
        self.entries.insert(Rc::clone(&key_rc), width);
        self.order.push_back(key_rc);
        while self.entries.len() > self.max_entries {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn build_key<'a>(scratch: &'a mut String, font: &str, text: &str) -> &'a str {
        scratch.clear();
        scratch.reserve(font.len() + 1 + text.len());
        scratch.push_str(font);
        scratch.push('\n');
        scratch.push_str(text);
        scratch.as_str()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Role {
    Paint,
    /// Inner shape of the clip region with this id.
    Clip(String),
}

struct Entry {
    handle: ShapeHandle,
    request: DrawRequest,
    role: Role,
}

/// Everything a replay needs besides the context.
#[derive(Default)]
struct Scene {
    entries: Vec<Entry>,
    gradients: HashMap<String, GradientSpec>,
}

impl Scene {
    fn entry(&self, handle: ShapeHandle) -> Option<&Entry> {
        self.entries.iter().find(|e| e.handle == handle)
    }

    fn clip_shape(&self, id: &str) -> Option<&DrawRequest> {
        self.entries
            .iter()
            .find(|e| matches!(&e.role, Role::Clip(c) if c == id))
            .map(|e| &e.request)
    }

    fn check(&self, request: &DrawRequest) -> Result<()> {
        if let Shape::Path { path } = &request.shape {
            path.validate()?;
        }
        let options = &request.options;
        for paint in [&options.fill, &options.stroke] {
            if let Paint::Gradient(g) = paint {
                if !self.gradients.contains_key(&g.id) {
                    return Err(DrawkitError::Gradient(format!("unknown gradient `{}`", g.id)));
                }
            }
        }
        if let Some(clip) = &options.clip {
            if self.clip_shape(&clip.id).is_none() {
                return Err(DrawkitError::Render(format!("unknown clip path `{}`", clip.id)));
            }
        }
        Ok(())
    }

    fn resolve(&self, paint: &Paint, bounds: Option<Rect>) -> Result<CanvasPaint> {
        match paint {
            Paint::None | Paint::Color(_) => Ok(CanvasPaint::Color(paint.css_value())),
            Paint::Gradient(g) => {
                let spec = self
                    .gradients
                    .get(&g.id)
                    .ok_or_else(|| DrawkitError::Gradient(format!("unknown gradient `{}`", g.id)))?;
                Ok(canvas_gradient(spec, bounds))
            }
        }
    }
}

/// Canvas backend over any [`Canvas2d`] context.
pub struct CanvasRenderer<C: Canvas2d> {
    ctx: C,
    root_id: String,
    next_handle: u32,
    next_clip: u32,
    next_gradient: u32,
    scene: Scene,
    text_cache: RefCell<TextMeasureCache>,
}

impl<C: Canvas2d> CanvasRenderer<C> {
    /// `root_id` prefixes generated clip and gradient ids.
    pub fn new(ctx: C, root_id: &str) -> Self {
        debug!(root_id, "canvas renderer created");
        Self {
            ctx,
            root_id: root_id.to_string(),
            next_handle: 0,
            next_clip: 0,
            next_gradient: 0,
            scene: Scene::default(),
            text_cache: RefCell::new(TextMeasureCache::new(TEXT_MEASURE_CACHE_MAX)),
        }
    }

    pub fn context(&self) -> &C {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.ctx
    }

    pub fn into_context(self) -> C {
        self.ctx
    }

    /// Current request behind a handle.
    pub fn request(&self, handle: ShapeHandle) -> Option<&DrawRequest> {
        self.scene.entry(handle).map(|e| &e.request)
    }

    /// Number of live display list entries, clip shapes included.
    pub fn shape_count(&self) -> usize {
        self.scene.entries.len()
    }

    fn issue_handle(&mut self) -> ShapeHandle {
        let handle = ShapeHandle::from_raw(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Clear the surface and paint the display list again.
    fn repaint(&mut self) -> Result<()> {
        let (w, h) = (self.ctx.width(), self.ctx.height());
        self.ctx.clear_rect(0.0, 0.0, w, h);
        for entry in &self.scene.entries {
            if entry.role == Role::Paint {
                paint(&mut self.ctx, &self.scene, &entry.request)?;
            }
        }
        Ok(())
    }
}

impl<C: Canvas2d> RenderBackend for CanvasRenderer<C> {
    fn draw(&mut self, request: DrawRequest) -> Result<ShapeHandle> {
        self.scene.check(&request)?;
        let handle = self.issue_handle();
        paint(&mut self.ctx, &self.scene, &request)?;
        self.scene.entries.push(Entry {
            handle,
            request,
            role: Role::Paint,
        });
        Ok(handle)
    }

    fn update_attributes(&mut self, handle: ShapeHandle, update: &AttributeUpdate) -> Result<()> {
        let entry = self
            .scene
            .entry(handle)
            .ok_or(DrawkitError::UnknownShape(handle))?;
        let mut next = entry.request.clone();
        next.apply(update)?;
        self.scene.check(&next)?;
        if let Some(entry) = self.scene.entries.iter_mut().find(|e| e.handle == handle) {
            entry.request = next;
        }
        self.repaint()
    }

    fn remove(&mut self, handle: ShapeHandle) -> Result<()> {
        let index = self
            .scene
            .entries
            .iter()
            .position(|e| e.handle == handle)
            .ok_or(DrawkitError::UnknownShape(handle))?;
        self.scene.entries.remove(index);
        self.repaint()
    }

    fn create_gradient(&mut self, spec: &GradientSpec) -> Result<GradientRef> {
        spec.validate()?;
        let id = spec.id.clone().unwrap_or_else(|| {
            self.next_gradient += 1;
            format!("{}_gradient_{}", self.root_id, self.next_gradient)
        });
        let replaced = self.scene.gradients.insert(id.clone(), spec.clone()).is_some();
        if replaced {
            self.repaint()?;
        }
        Ok(GradientRef { id })
    }

    fn set_gradient_transform(
        &mut self,
        gradient: &GradientRef,
        transform: GradientTransform,
    ) -> Result<()> {
        let spec = self
            .scene
            .gradients
            .get_mut(&gradient.id)
            .ok_or_else(|| DrawkitError::Gradient(format!("unknown gradient `{}`", gradient.id)))?;
        spec.transform = Some(transform);
        self.repaint()
    }

    fn create_clip_path(&mut self, region: ClipRegion) -> Result<ClipPath> {
        self.next_clip += 1;
        let id = format!("{}_clip_{}", self.root_id, self.next_clip);
        let shape = match region {
            ClipRegion::Rect(rect) => Shape::Rect { rect },
            ClipRegion::Path(path) => {
                path.validate()?;
                Shape::Path { path }
            }
        };
        let handle = self.issue_handle();
        self.scene.entries.push(Entry {
            handle,
            request: DrawRequest::new(shape, DrawOptions::default().with_id(format!("{id}_shape"))),
            role: Role::Clip(id.clone()),
        });
        Ok(ClipPath {
            reference: ClipRef { id },
            shape: handle,
        })
    }

    fn clear_region(&mut self, region: Rect) -> Result<()> {
        let before = self.scene.entries.len();
        self.scene.entries.retain(|e| {
            e.role != Role::Paint
                || !e
                    .request
                    .shape
                    .bounds()
                    .is_some_and(|b| region.contains_rect(&b))
        });
        debug!(count = before - self.scene.entries.len(), "canvas clear region");
        self.repaint()
    }

    fn measure_text(&self, text: &str, style: &TextStyle) -> Size {
        if self.size().is_empty() {
            return Size::ZERO;
        }
        let font = style.font();
        let Ok(mut cache) = self.text_cache.try_borrow_mut() else {
            return self
                .ctx
                .measure_text(&font, text)
                .map_or_else(|| style.approximate_size(text), |w| Size::new(w, style.size));
        };
        if let Some(width) = cache.get(&font, text) {
            return Size::new(width, style.size);
        }
        match self.ctx.measure_text(&font, text) {
            Some(width) => {
                cache.insert(&font, text, width);
                Size::new(width, style.size)
            }
            None => style.approximate_size(text),
        }
    }

    fn size(&self) -> Size {
        let (w, h) = (self.ctx.width(), self.ctx.height());
        if w <= 0.0 || h <= 0.0 {
            return Size::ZERO;
        }
        Size::new(w, h)
    }
}

fn paint<C: Canvas2d>(ctx: &mut C, scene: &Scene, request: &DrawRequest) -> Result<()> {
    if !request.options.visible {
        return Ok(());
    }
    ctx.save();
    let result = paint_shape(ctx, scene, request);
    ctx.restore();
    result
}

fn paint_shape<C: Canvas2d>(ctx: &mut C, scene: &Scene, request: &DrawRequest) -> Result<()> {
    let options = &request.options;
    if let Some(clip) = options.clip.as_ref().and_then(|c| scene.clip_shape(&c.id)) {
        // A hidden mask exposes nothing, as in SVG.
        if !clip.options.visible {
            return Ok(());
        }
        ctx.begin_path();
        trace_shape(ctx, &clip.shape, clip.options.corner_radius)?;
        ctx.clip();
    }
    ctx.set_global_alpha(options.opacity);
    let bounds = request.shape.bounds();

    match &request.shape {
        Shape::Text {
            content,
            position,
            style,
        } => {
            ctx.set_font(&style.font());
            ctx.set_text_align(style.anchor.canvas_value());
            if let Some(baseline) = &style.baseline {
                ctx.set_text_baseline(canvas_baseline(baseline));
            }
            ctx.set_fill_style(&scene.resolve(&style.fill, bounds)?)?;
            ctx.fill_text(content, position.x, position.y)?;
        }
        Shape::Image { source, bounds } => {
            ctx.draw_image(&source.href, bounds.x, bounds.y, bounds.width, bounds.height)?;
        }
        shape => {
            ctx.begin_path();
            trace_shape(ctx, shape, options.corner_radius)?;
            if !matches!(shape, Shape::Line { .. }) {
                ctx.set_fill_style(&scene.resolve(&options.fill, bounds)?)?;
                ctx.fill();
            }
            if options.has_stroke() {
                ctx.set_line_width(options.stroke_width);
                ctx.set_line_dash(options.dash_array.as_deref().unwrap_or(&[]))?;
                if let Some(cap) = options.line_cap {
                    ctx.set_line_cap(cap.as_str());
                }
                ctx.set_stroke_style(&scene.resolve(&options.stroke, bounds)?)?;
                ctx.stroke();
            }
        }
    }
    Ok(())
}

fn canvas_baseline(baseline: &str) -> &str {
    match baseline {
        "central" | "middle" => "middle",
        "hanging" | "text-before-edge" => "hanging",
        "auto" | "alphabetic" => "alphabetic",
        other => other,
    }
}

/// Add the outline of `shape` to the current path.
fn trace_shape<C: Canvas2d>(ctx: &mut C, shape: &Shape, corner_radius: Option<f64>) -> Result<()> {
    match shape {
        Shape::Line { from, to } => {
            ctx.move_to(from.x, from.y);
            ctx.line_to(to.x, to.y);
        }
        Shape::Rect { rect } => {
            let radius = corner_radius.map_or(0.0, |r| clamp_corner_radius(rect.width, rect.height, r));
            trace_path(ctx, &rect_path(rect, radius))?;
        }
        Shape::Path { path } => trace_path(ctx, path)?,
        Shape::Circle { center, radius } => ctx.ellipse(&full_ellipse(*center, *radius, *radius))?,
        Shape::Ellipse { center, rx, ry } => ctx.ellipse(&full_ellipse(*center, *rx, *ry))?,
        Shape::Polyline { points } => {
            let mut iter = points.iter();
            if let Some(first) = iter.next() {
                ctx.move_to(first.x, first.y);
            }
            for p in iter {
                ctx.line_to(p.x, p.y);
            }
        }
        Shape::Text { .. } | Shape::Image { .. } => {}
    }
    Ok(())
}

fn full_ellipse(center: Point, rx: f64, ry: f64) -> CenterArc {
    CenterArc {
        center,
        rx,
        ry,
        rotation: 0.0,
        start_angle: 0.0,
        end_angle: TAU,
        anticlockwise: false,
    }
}

/// Replay path commands. Endpoint arcs become `ellipse()` calls.
fn trace_path<C: Canvas2d>(ctx: &mut C, path: &PathSpec) -> Result<()> {
    let mut pen: Option<Point> = None;
    let mut subpath_start = Point::default();
    for command in path.commands() {
        match *command {
            PathCommand::MoveTo(p) => {
                ctx.move_to(p.x, p.y);
                subpath_start = p;
            }
            PathCommand::LineTo(p) => ctx.line_to(p.x, p.y),
            PathCommand::QuadraticCurveTo { control, to } => {
                ctx.quadratic_curve_to(control.x, control.y, to.x, to.y);
            }
            PathCommand::CubicCurveTo {
                control1,
                control2,
                to,
            } => ctx.bezier_curve_to(control1.x, control1.y, control2.x, control2.y, to.x, to.y),
            PathCommand::ArcTo {
                rx,
                ry,
                rotation,
                large_arc,
                sweep,
                to,
            } => match pen {
                // A leading arc has no start point; it only positions the pen.
                None => {
                    ctx.move_to(to.x, to.y);
                    subpath_start = to;
                }
                Some(from) => match endpoint_to_center(from, to, rx, ry, rotation, large_arc, sweep) {
                    Some(arc) => ctx.ellipse(&arc)?,
                    None => ctx.line_to(to.x, to.y),
                },
            },
            PathCommand::ClosePath => {
                ctx.close_path();
                pen = Some(subpath_start);
                continue;
            }
        }
        pen = command.end_point();
    }
    Ok(())
}

fn stop_color(stop: &GradientStop) -> String {
    if stop.opacity >= 1.0 {
        return stop.color.clone();
    }
    match parse_color_rgba(&stop.color) {
        Some((r, g, b, a)) => format!("rgba({r}, {g}, {b}, {})", a * stop.opacity.max(0.0)),
        None => stop.color.clone(),
    }
}

/// Resolve a gradient description against the bounds of the painted shape.
fn canvas_gradient(spec: &GradientSpec, bounds: Option<Rect>) -> CanvasPaint {
    let bbox = bounds.unwrap_or_default();
    let transform = |p: Point| spec.transform.map_or(p, |t| t.apply(p));
    let place = |p: Point| match spec.units {
        GradientUnits::ObjectBoundingBox => {
            let q = transform(p);
            Point::new(bbox.x + q.x * bbox.width, bbox.y + q.y * bbox.height)
        }
        GradientUnits::UserSpaceOnUse => transform(p),
    };
    let stops: Vec<(f64, String)> = spec
        .stops
        .iter()
        .map(|s| (s.offset, stop_color(s)))
        .collect();

    match spec.geometry {
        GradientGeometry::Linear { start, end } => {
            let (p0, p1) = (place(start), place(end));
            if spec.spread == SpreadMethod::Repeat {
                if let Some(b) = bounds {
                    return repeat_linear(p0, p1, &stops, &b);
                }
            }
            CanvasPaint::LinearGradient {
                x0: p0.x,
                y0: p0.y,
                x1: p1.x,
                y1: p1.y,
                stops,
            }
        }
        GradientGeometry::Radial { center, radius } => {
            let c = place(center);
            let r = match spec.units {
                GradientUnits::ObjectBoundingBox => radius * bbox.width.max(bbox.height),
                GradientUnits::UserSpaceOnUse => radius,
            };
            CanvasPaint::RadialGradient {
                x: c.x,
                y: c.y,
                r,
                stops,
            }
        }
    }
}

/// Canvas has no repeat spread: stretch the gradient line over `area` and
/// copy the stops once per period.
fn repeat_linear(p0: Point, p1: Point, stops: &[(f64, String)], area: &Rect) -> CanvasPaint {
    let (dx, dy) = (p1.x - p0.x, p1.y - p0.y);
    let len2 = dx * dx + dy * dy;
    let plain = || CanvasPaint::LinearGradient {
        x0: p0.x,
        y0: p0.y,
        x1: p1.x,
        y1: p1.y,
        stops: stops.to_vec(),
    };
    if len2 <= f64::EPSILON {
        return plain();
    }
    let project = |x: f64, y: f64| ((x - p0.x) * dx + (y - p0.y) * dy) / len2;
    let ts = [
        project(area.x, area.y),
        project(area.right(), area.y),
        project(area.x, area.bottom()),
        project(area.right(), area.bottom()),
    ];
    let first = ts.iter().copied().fold(f64::INFINITY, f64::min).floor();
    let last = ts.iter().copied().fold(f64::NEG_INFINITY, f64::max).ceil();
    let span = (last - first).clamp(1.0, MAX_GRADIENT_REPEATS);

    let mut expanded = Vec::with_capacity(stops.len() * 2);
    let mut k = 0.0;
    while k < span {
        for (offset, color) in stops {
            expanded.push((((k + offset) / span).clamp(0.0, 1.0), color.clone()));
        }
        k += 1.0;
    }
    CanvasPaint::LinearGradient {
        x0: p0.x + dx * first,
        y0: p0.y + dy * first,
        x1: p0.x + dx * (first + span),
        y1: p0.y + dy * (first + span),
        stops: expanded,
    }
}
