//! SVG node surfaces: the trait the renderer writes through, and a headless
//! in-memory tree that serializes to markup with quick-xml.

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{DrawkitError, Result};
use crate::geometry::format_number;
use crate::types::{Size, TextStyle};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// A retained SVG node store.
///
/// The DOM implements this on wasm32; [`SvgTree`] implements it everywhere.
pub trait SvgSurface {
    type Node: Clone;

    /// The `<svg>` element.
    fn root(&self) -> Self::Node;

    /// The `<defs>` element, created on first use.
    fn defs(&mut self) -> Result<Self::Node>;

    fn create_element(&mut self, parent: &Self::Node, tag: &str) -> Result<Self::Node>;

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str) -> Result<()>;

    fn remove_attribute(&mut self, node: &Self::Node, name: &str) -> Result<()>;

    fn set_text(&mut self, node: &Self::Node, text: &str) -> Result<()>;

    /// Detach a node and its subtree.
    fn remove(&mut self, node: &Self::Node) -> Result<()>;

    /// Size of the drawing surface; [`Size::ZERO`] when not laid out.
    fn size(&self) -> Size;

    fn measure_text(&self, text: &str, style: &TextStyle) -> Size {
        style.approximate_size(text)
    }
}

/// Index of a node in an [`SvgTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct SvgNode {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl SvgNode {
    fn new(tag: &str, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
            parent,
        }
    }
}

/// Headless SVG document.
///
/// Removed nodes leave a tombstone so ids stay stable.
#[derive(Debug, Clone)]
pub struct SvgTree {
    nodes: Vec<Option<SvgNode>>,
    defs: Option<NodeId>,
    size: Size,
}

impl SvgTree {
    const ROOT: NodeId = NodeId(0);

    pub fn new(id: &str, size: Size) -> Self {
        let mut root = SvgNode::new("svg", None);
        root.attributes = vec![
            ("xmlns".to_string(), SVG_NS.to_string()),
            ("id".to_string(), id.to_string()),
            ("width".to_string(), format_number(size.width)),
            ("height".to_string(), format_number(size.height)),
        ];
        Self {
            nodes: vec![Some(root)],
            defs: None,
            size,
        }
    }

    fn node(&self, id: NodeId) -> Option<&SvgNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SvgNode> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| DrawkitError::Render(format!("stale svg node {}", id.0)))
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| n.tag.as_str())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)?
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id)?.text.as_deref()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Look a live node up by its `id` attribute.
    pub fn find_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.nodes.iter().enumerate().find_map(|(i, n)| {
            let node = n.as_ref()?;
            node.attributes
                .iter()
                .any(|(k, v)| k == "id" && v == element_id)
                .then_some(NodeId(i))
        })
    }

    /// Number of live elements with the given tag.
    pub fn count_tag(&self, tag: &str) -> usize {
        self.nodes
            .iter()
            .flatten()
            .filter(|n| n.tag == tag)
            .count()
    }

    /// Serialize the whole document.
    pub fn to_markup(&self) -> Result<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        self.write_node(&mut writer, Self::ROOT)?;
        String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| DrawkitError::Render(format!("non-utf8 markup: {e}")))
    }

    fn write_node(&self, writer: &mut Writer<Cursor<Vec<u8>>>, id: NodeId) -> Result<()> {
        let Some(node) = self.node(id) else {
            return Ok(());
        };
        let mut start = BytesStart::new(node.tag.as_str());
        for (k, v) in &node.attributes {
            start.push_attribute((k.as_str(), v.as_str()));
        }
        if node.children.is_empty() && node.text.is_none() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        writer.write_event(Event::Start(start))?;
        if let Some(text) = &node.text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &node.children {
            self.write_node(writer, *child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(node.tag.as_str())))?;
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        let children = match self.nodes.get_mut(id.0).and_then(Option::take) {
            Some(node) => {
                if let Some(parent) = node.parent {
                    if let Ok(p) = self.node_mut(parent) {
                        p.children.retain(|c| *c != id);
                    }
                }
                node.children
            }
            None => return,
        };
        for child in children {
            self.detach(child);
        }
    }
}

impl SvgSurface for SvgTree {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        Self::ROOT
    }

    fn defs(&mut self) -> Result<NodeId> {
        if let Some(defs) = self.defs {
            return Ok(defs);
        }
        let defs = self.create_element(&Self::ROOT, "defs")?;
        // Definitions go first so later shapes can reference them.
        let root = self.node_mut(Self::ROOT)?;
        root.children.retain(|c| *c != defs);
        root.children.insert(0, defs);
        self.defs = Some(defs);
        Ok(defs)
    }

    fn create_element(&mut self, parent: &NodeId, tag: &str) -> Result<NodeId> {
        let id = NodeId(self.nodes.len());
        self.node_mut(*parent)?.children.push(id);
        self.nodes.push(Some(SvgNode::new(tag, Some(*parent))));
        Ok(id)
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) -> Result<()> {
        let node = self.node_mut(*node)?;
        match node.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => {
                v.clear();
                v.push_str(value);
            }
            None => node.attributes.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) -> Result<()> {
        self.node_mut(*node)?.attributes.retain(|(k, _)| k != name);
        Ok(())
    }

    fn set_text(&mut self, node: &NodeId, text: &str) -> Result<()> {
        self.node_mut(*node)?.text = Some(text.to_string());
        Ok(())
    }

    fn remove(&mut self, node: &NodeId) -> Result<()> {
        if *node == Self::ROOT {
            return Err(DrawkitError::Render("cannot remove the svg root".to_string()));
        }
        self.node_mut(*node)?;
        if self.defs == Some(*node) {
            self.defs = None;
        }
        self.detach(*node);
        Ok(())
    }

    fn size(&self) -> Size {
        self.size
    }
}
