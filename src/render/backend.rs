//! Render backend trait shared by the SVG and Canvas renderers.
//!
//! Both backends accept the same logical [`DrawRequest`]s and hand back an
//! opaque [`ShapeHandle`]. What a handle refers to (a live node or a display
//! list entry) stays inside the backend.

use crate::error::{DrawkitError, Result};
use crate::geometry::PathSpec;
use crate::types::{
    AttributeUpdate, ClipPath, ClipRegion, DrawOptions, DrawRequest, GradientRef, GradientSpec,
    GradientTransform, ImageSource, Point, Rect, Shape, ShapeHandle, Size, TextStyle,
};

/// Trait for render backends
///
/// Required methods carry the backend-specific work; the `draw_*` helpers
/// are thin constructors over [`RenderBackend::draw`].
pub trait RenderBackend {
    /// Draw a shape and return its handle.
    fn draw(&mut self, request: DrawRequest) -> Result<ShapeHandle>;

    /// Apply a partial update to a previously drawn shape.
    fn update_attributes(&mut self, handle: ShapeHandle, update: &AttributeUpdate) -> Result<()>;

    /// Remove a shape. The handle becomes invalid.
    fn remove(&mut self, handle: ShapeHandle) -> Result<()>;

    /// Register a gradient and return a reference usable as a [`crate::types::Paint`].
    fn create_gradient(&mut self, spec: &GradientSpec) -> Result<GradientRef>;

    /// Replace the transform of an existing gradient.
    fn set_gradient_transform(
        &mut self,
        gradient: &GradientRef,
        transform: GradientTransform,
    ) -> Result<()>;

    /// Create a clip region whose inner shape can later be updated by handle.
    fn create_clip_path(&mut self, region: ClipRegion) -> Result<ClipPath>;

    /// Remove every shape lying entirely inside `region`.
    fn clear_region(&mut self, region: Rect) -> Result<()>;

    /// Measure a text run. Returns [`Size::ZERO`] when the surface is not
    /// attached yet.
    fn measure_text(&self, text: &str, style: &TextStyle) -> Size;

    /// Size of the drawing surface, [`Size::ZERO`] when unattached.
    fn size(&self) -> Size;

    fn draw_line(&mut self, from: Point, to: Point, options: DrawOptions) -> Result<ShapeHandle> {
        self.draw(DrawRequest::new(Shape::Line { from, to }, options))
    }

    /// Rectangle; `options.corner_radius` rounds the corners.
    fn draw_rect(&mut self, rect: Rect, options: DrawOptions) -> Result<ShapeHandle> {
        self.draw(DrawRequest::new(Shape::Rect { rect }, options))
    }

    fn draw_path(&mut self, path: PathSpec, options: DrawOptions) -> Result<ShapeHandle> {
        path.validate()?;
        self.draw(DrawRequest::new(Shape::Path { path }, options))
    }

    /// Parse `d` attribute syntax and draw it.
    fn draw_path_data(&mut self, data: &str, options: DrawOptions) -> Result<ShapeHandle> {
        self.draw_path(PathSpec::parse(data)?, options)
    }

    fn draw_circle(
        &mut self,
        center: Point,
        radius: f64,
        options: DrawOptions,
    ) -> Result<ShapeHandle> {
        self.draw(DrawRequest::new(Shape::Circle { center, radius }, options))
    }

    fn draw_ellipse(
        &mut self,
        center: Point,
        rx: f64,
        ry: f64,
        options: DrawOptions,
    ) -> Result<ShapeHandle> {
        self.draw(DrawRequest::new(Shape::Ellipse { center, rx, ry }, options))
    }

    fn draw_polyline(&mut self, points: Vec<Point>, options: DrawOptions) -> Result<ShapeHandle> {
        self.draw(DrawRequest::new(Shape::Polyline { points }, options))
    }

    /// Text anchored at `position` according to `style.anchor`.
    fn create_text(
        &mut self,
        content: &str,
        style: TextStyle,
        position: Point,
        options: DrawOptions,
    ) -> Result<ShapeHandle> {
        self.draw(DrawRequest::new(
            Shape::Text {
                content: content.to_string(),
                position,
                style,
            },
            options,
        ))
    }

    fn draw_image(
        &mut self,
        source: ImageSource,
        bounds: Rect,
        options: DrawOptions,
    ) -> Result<ShapeHandle> {
        self.draw(DrawRequest::new(Shape::Image { source, bounds }, options))
    }

    fn create_linear_gradient(&mut self, spec: &GradientSpec) -> Result<GradientRef> {
        if !spec.is_linear() {
            return Err(DrawkitError::Gradient(
                "expected linear gradient geometry".to_string(),
            ));
        }
        self.create_gradient(spec)
    }

    fn create_radial_gradient(&mut self, spec: &GradientSpec) -> Result<GradientRef> {
        if spec.is_linear() {
            return Err(DrawkitError::Gradient(
                "expected radial gradient geometry".to_string(),
            ));
        }
        self.create_gradient(spec)
    }
}
