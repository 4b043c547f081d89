//! The Canvas 2D calls the renderer issues, behind a trait so the same replay
//! code drives a browser context or an in-memory recorder.

use crate::error::Result;
use crate::geometry::CenterArc;

/// Fill or stroke style resolved to concrete Canvas terms.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasPaint {
    Color(String),
    LinearGradient {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        /// `(offset, color)` pairs, offsets in `[0, 1]`.
        stops: Vec<(f64, String)>,
    },
    RadialGradient {
        x: f64,
        y: f64,
        r: f64,
        stops: Vec<(f64, String)>,
    },
}

/// Subset of `CanvasRenderingContext2D` used by the renderer.
pub trait Canvas2d {
    fn save(&mut self);
    fn restore(&mut self);
    fn begin_path(&mut self);
    fn close_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn quadratic_curve_to(&mut self, cpx: f64, cpy: f64, x: f64, y: f64);
    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64);
    fn ellipse(&mut self, arc: &CenterArc) -> Result<()>;
    fn fill(&mut self);
    fn stroke(&mut self);
    fn clip(&mut self);
    fn set_fill_style(&mut self, paint: &CanvasPaint) -> Result<()>;
    fn set_stroke_style(&mut self, paint: &CanvasPaint) -> Result<()>;
    fn set_line_width(&mut self, width: f64);
    fn set_line_dash(&mut self, segments: &[f64]) -> Result<()>;
    fn set_line_cap(&mut self, cap: &str);
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: &str);
    fn set_text_baseline(&mut self, baseline: &str);
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<()>;
    fn draw_image(&mut self, href: &str, x: f64, y: f64, width: f64, height: f64) -> Result<()>;
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Advance width of `text` in `font`, if the context can measure.
    fn measure_text(&self, font: &str, text: &str) -> Option<f64>;

    fn width(&self) -> f64;
    fn height(&self) -> f64;
}

/// One recorded Canvas call.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    Save,
    Restore,
    BeginPath,
    ClosePath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    QuadraticCurveTo(f64, f64, f64, f64),
    BezierCurveTo(f64, f64, f64, f64, f64, f64),
    Ellipse(CenterArc),
    Fill,
    Stroke,
    Clip,
    FillStyle(CanvasPaint),
    StrokeStyle(CanvasPaint),
    LineWidth(f64),
    LineDash(Vec<f64>),
    LineCap(String),
    GlobalAlpha(f64),
    Font(String),
    TextAlign(String),
    TextBaseline(String),
    FillText(String, f64, f64),
    DrawImage(String, f64, f64, f64, f64),
    ClearRect(f64, f64, f64, f64),
}

/// Headless context that records every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    width: f64,
    height: f64,
    ops: Vec<CanvasOp>,
}

impl RecordingCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[CanvasOp] {
        &self.ops
    }

    /// Drain the recorded calls.
    pub fn take_ops(&mut self) -> Vec<CanvasOp> {
        std::mem::take(&mut self.ops)
    }
}

impl Canvas2d for RecordingCanvas {
    fn save(&mut self) {
        self.ops.push(CanvasOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(CanvasOp::Restore);
    }

    fn begin_path(&mut self) {
        self.ops.push(CanvasOp::BeginPath);
    }

    fn close_path(&mut self) {
        self.ops.push(CanvasOp::ClosePath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ops.push(CanvasOp::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ops.push(CanvasOp::LineTo(x, y));
    }

    fn quadratic_curve_to(&mut self, cpx: f64, cpy: f64, x: f64, y: f64) {
        self.ops.push(CanvasOp::QuadraticCurveTo(cpx, cpy, x, y));
    }

    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) {
        self.ops
            .push(CanvasOp::BezierCurveTo(cp1x, cp1y, cp2x, cp2y, x, y));
    }

    fn ellipse(&mut self, arc: &CenterArc) -> Result<()> {
        self.ops.push(CanvasOp::Ellipse(*arc));
        Ok(())
    }

    fn fill(&mut self) {
        self.ops.push(CanvasOp::Fill);
    }

    fn stroke(&mut self) {
        self.ops.push(CanvasOp::Stroke);
    }

    fn clip(&mut self) {
        self.ops.push(CanvasOp::Clip);
    }

    fn set_fill_style(&mut self, paint: &CanvasPaint) -> Result<()> {
        self.ops.push(CanvasOp::FillStyle(paint.clone()));
        Ok(())
    }

    fn set_stroke_style(&mut self, paint: &CanvasPaint) -> Result<()> {
        self.ops.push(CanvasOp::StrokeStyle(paint.clone()));
        Ok(())
    }

    fn set_line_width(&mut self, width: f64) {
        self.ops.push(CanvasOp::LineWidth(width));
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<()> {
        self.ops.push(CanvasOp::LineDash(segments.to_vec()));
        Ok(())
    }

    fn set_line_cap(&mut self, cap: &str) {
        self.ops.push(CanvasOp::LineCap(cap.to_string()));
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ops.push(CanvasOp::GlobalAlpha(alpha));
    }

    fn set_font(&mut self, font: &str) {
        self.ops.push(CanvasOp::Font(font.to_string()));
    }

    fn set_text_align(&mut self, align: &str) {
        self.ops.push(CanvasOp::TextAlign(align.to_string()));
    }

    fn set_text_baseline(&mut self, baseline: &str) {
        self.ops.push(CanvasOp::TextBaseline(baseline.to_string()));
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<()> {
        self.ops.push(CanvasOp::FillText(text.to_string(), x, y));
        Ok(())
    }

    fn draw_image(&mut self, href: &str, x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        self.ops
            .push(CanvasOp::DrawImage(href.to_string(), x, y, width, height));
        Ok(())
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(CanvasOp::ClearRect(x, y, width, height));
    }

    fn measure_text(&self, _font: &str, _text: &str) -> Option<f64> {
        None
    }

    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{CanvasGradient, CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

    use super::{Canvas2d, CanvasPaint};
    use crate::error::{DrawkitError, Result};
    use crate::geometry::CenterArc;

    /// Look up a `<canvas>` by id and get its 2D context.
    pub fn context_for(canvas_id: &str) -> Result<CanvasRenderingContext2d> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("No document available")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| DrawkitError::RootNotFound(canvas_id.to_string()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| DrawkitError::RootNotFound(format!("{canvas_id} is not a canvas")))?;
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| "Failed to get 2d context")?
            .ok_or("No 2d context available")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "Failed to cast to CanvasRenderingContext2d")?;
        Ok(ctx)
    }

    fn gradient(ctx: &CanvasRenderingContext2d, paint: &CanvasPaint) -> Result<Option<CanvasGradient>> {
        let (gradient, stops) = match paint {
            CanvasPaint::Color(_) => return Ok(None),
            CanvasPaint::LinearGradient {
                x0,
                y0,
                x1,
                y1,
                stops,
            } => (ctx.create_linear_gradient(*x0, *y0, *x1, *y1), stops),
            CanvasPaint::RadialGradient { x, y, r, stops } => {
                (ctx.create_radial_gradient(*x, *y, 0.0, *x, *y, *r)?, stops)
            }
        };
        for (offset, color) in stops {
            #[allow(clippy::cast_possible_truncation)]
            gradient.add_color_stop(*offset as f32, color)?;
        }
        Ok(Some(gradient))
    }

    impl Canvas2d for CanvasRenderingContext2d {
        fn save(&mut self) {
            CanvasRenderingContext2d::save(self);
        }

        fn restore(&mut self) {
            CanvasRenderingContext2d::restore(self);
        }

        fn begin_path(&mut self) {
            CanvasRenderingContext2d::begin_path(self);
        }

        fn close_path(&mut self) {
            CanvasRenderingContext2d::close_path(self);
        }

        fn move_to(&mut self, x: f64, y: f64) {
            CanvasRenderingContext2d::move_to(self, x, y);
        }

        fn line_to(&mut self, x: f64, y: f64) {
            CanvasRenderingContext2d::line_to(self, x, y);
        }

        fn quadratic_curve_to(&mut self, cpx: f64, cpy: f64, x: f64, y: f64) {
            CanvasRenderingContext2d::quadratic_curve_to(self, cpx, cpy, x, y);
        }

        fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) {
            CanvasRenderingContext2d::bezier_curve_to(self, cp1x, cp1y, cp2x, cp2y, x, y);
        }

        fn ellipse(&mut self, arc: &CenterArc) -> Result<()> {
            self.ellipse_with_anticlockwise(
                arc.center.x,
                arc.center.y,
                arc.rx,
                arc.ry,
                arc.rotation,
                arc.start_angle,
                arc.end_angle,
                arc.anticlockwise,
            )?;
            Ok(())
        }

        fn fill(&mut self) {
            CanvasRenderingContext2d::fill(self);
        }

        fn stroke(&mut self) {
            CanvasRenderingContext2d::stroke(self);
        }

        fn clip(&mut self) {
            CanvasRenderingContext2d::clip(self);
        }

        fn set_fill_style(&mut self, paint: &CanvasPaint) -> Result<()> {
            match (paint, gradient(self, paint)?) {
                (_, Some(g)) => self.set_fill_style_canvas_gradient(&g),
                (CanvasPaint::Color(c), None) => self.set_fill_style_str(c),
                _ => {}
            }
            Ok(())
        }

        fn set_stroke_style(&mut self, paint: &CanvasPaint) -> Result<()> {
            match (paint, gradient(self, paint)?) {
                (_, Some(g)) => self.set_stroke_style_canvas_gradient(&g),
                (CanvasPaint::Color(c), None) => self.set_stroke_style_str(c),
                _ => {}
            }
            Ok(())
        }

        fn set_line_width(&mut self, width: f64) {
            CanvasRenderingContext2d::set_line_width(self, width);
        }

        fn set_line_dash(&mut self, segments: &[f64]) -> Result<()> {
            let array = js_sys::Array::new();
            for s in segments {
                array.push(&JsValue::from_f64(*s));
            }
            CanvasRenderingContext2d::set_line_dash(self, &array)?;
            Ok(())
        }

        fn set_line_cap(&mut self, cap: &str) {
            CanvasRenderingContext2d::set_line_cap(self, cap);
        }

        fn set_global_alpha(&mut self, alpha: f64) {
            CanvasRenderingContext2d::set_global_alpha(self, alpha);
        }

        fn set_font(&mut self, font: &str) {
            CanvasRenderingContext2d::set_font(self, font);
        }

        fn set_text_align(&mut self, align: &str) {
            CanvasRenderingContext2d::set_text_align(self, align);
        }

        fn set_text_baseline(&mut self, baseline: &str) {
            CanvasRenderingContext2d::set_text_baseline(self, baseline);
        }

        fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<()> {
            CanvasRenderingContext2d::fill_text(self, text, x, y)?;
            Ok(())
        }

        fn draw_image(&mut self, href: &str, x: f64, y: f64, width: f64, height: f64) -> Result<()> {
            let image = HtmlImageElement::new()?;
            image.set_src(href);
            self.draw_image_with_html_image_element_and_dw_and_dh(&image, x, y, width, height)?;
            Ok(())
        }

        fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
            CanvasRenderingContext2d::clear_rect(self, x, y, width, height);
        }

        fn measure_text(&self, font: &str, text: &str) -> Option<f64> {
            CanvasRenderingContext2d::set_font(self, font);
            CanvasRenderingContext2d::measure_text(self, text)
                .ok()
                .map(|m| m.width())
        }

        fn width(&self) -> f64 {
            self.canvas().map_or(0.0, |c| f64::from(c.width()))
        }

        fn height(&self) -> f64 {
            self.canvas().map_or(0.0, |c| f64::from(c.height()))
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::context_for;
