//! Browser DOM surface for the SVG renderer.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement};

use super::document::{SvgSurface, SVG_NS};
use crate::error::{DrawkitError, Result};
use crate::geometry::format_number;
use crate::types::{Size, TextStyle};

/// An `<svg>` element appended to a host element looked up by id.
pub struct DomSurface {
    document: Document,
    svg: Element,
    defs: Option<Element>,
    /// Scratch context used for text measurement.
    measure: Option<CanvasRenderingContext2d>,
}

impl DomSurface {
    /// Attach to the element with `host_id`.
    ///
    /// Fails with [`DrawkitError::RootNotFound`] when the host does not exist.
    /// Without an explicit `size` the host's client size is used.
    pub fn attach(host_id: &str, size: Option<Size>) -> Result<Self> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("No document available")?;
        let host = document
            .get_element_by_id(host_id)
            .ok_or_else(|| DrawkitError::RootNotFound(host_id.to_string()))?;

        let size = size.unwrap_or_else(|| {
            Size::new(f64::from(host.client_width()), f64::from(host.client_height()))
        });
        let svg_id = format!("{host_id}_svg");
        if let Some(stale) = document.get_element_by_id(&svg_id) {
            stale.remove();
        }
        let svg = document.create_element_ns(Some(SVG_NS), "svg")?;
        svg.set_attribute("id", &svg_id)?;
        svg.set_attribute("width", &format_number(size.width))?;
        svg.set_attribute("height", &format_number(size.height))?;
        host.append_child(&svg)?;

        let measure = document
            .create_element("canvas")
            .ok()
            .and_then(|c| c.dyn_into::<HtmlCanvasElement>().ok())
            .and_then(|c| c.get_context("2d").ok().flatten())
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok());

        Ok(Self {
            document,
            svg,
            defs: None,
            measure,
        })
    }
}

impl SvgSurface for DomSurface {
    type Node = Element;

    fn root(&self) -> Element {
        self.svg.clone()
    }

    fn defs(&mut self) -> Result<Element> {
        if let Some(defs) = &self.defs {
            return Ok(defs.clone());
        }
        let defs = self.document.create_element_ns(Some(SVG_NS), "defs")?;
        self.svg
            .insert_before(&defs, self.svg.first_child().as_ref())?;
        self.defs = Some(defs.clone());
        Ok(defs)
    }

    fn create_element(&mut self, parent: &Element, tag: &str) -> Result<Element> {
        let element = self.document.create_element_ns(Some(SVG_NS), tag)?;
        parent.append_child(&element)?;
        Ok(element)
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) -> Result<()> {
        node.set_attribute(name, value)?;
        Ok(())
    }

    fn remove_attribute(&mut self, node: &Element, name: &str) -> Result<()> {
        node.remove_attribute(name)?;
        Ok(())
    }

    fn set_text(&mut self, node: &Element, text: &str) -> Result<()> {
        node.set_text_content(Some(text));
        Ok(())
    }

    fn remove(&mut self, node: &Element) -> Result<()> {
        node.remove();
        Ok(())
    }

    fn size(&self) -> Size {
        let rect = self.svg.get_bounding_client_rect();
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return Size::ZERO;
        }
        Size::new(rect.width(), rect.height())
    }

    fn measure_text(&self, text: &str, style: &TextStyle) -> Size {
        let Some(ctx) = &self.measure else {
            return Size::ZERO;
        };
        ctx.set_font(&style.font());
        ctx.measure_text(text)
            .map(|m| Size::new(m.width(), style.size))
            .unwrap_or(Size::ZERO)
    }
}
