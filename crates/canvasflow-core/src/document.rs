//! Pages of shapes and their serialized form.

use crate::error::ShapeError;
use crate::shape::{SerializedShape, Shape, ShapeId, ShapeRegistry};
use serde::{Deserialize, Serialize};

/// A page and its shapes, back to front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedPage {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub shapes: Vec<SerializedShape>,
}

/// Snapshot of the whole document, used for undo and for save/load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedDocument {
    pub current_page_id: String,
    #[serde(default)]
    pub selected_ids: Vec<ShapeId>,
    pub pages: Vec<SerializedPage>,
}

impl SerializedDocument {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A page of live shapes.
#[derive(Debug)]
pub struct Page {
    pub id: String,
    pub name: String,
    shapes: Vec<Box<dyn Shape>>,
}

impl Page {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            shapes: Vec::new(),
        }
    }

    /// Shapes in z-order (back to front).
    pub fn shapes(&self) -> &[Box<dyn Shape>] {
        &self.shapes
    }

    pub fn shape_ids(&self) -> Vec<ShapeId> {
        self.shapes.iter().map(|s| s.id()).collect()
    }

    pub fn shape(&self, id: ShapeId) -> Option<&dyn Shape> {
        self.shapes.iter().find(|s| s.id() == id).map(|s| s.as_ref())
    }

    pub fn shape_mut(&mut self, id: ShapeId) -> Option<&mut (dyn Shape + 'static)> {
        self.shapes.iter_mut().find(|s| s.id() == id).map(|s| s.as_mut())
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.iter().any(|s| s.id() == id)
    }

    /// Add a shape on top of the others.
    pub fn add_shape(&mut self, shape: Box<dyn Shape>) -> ShapeId {
        let id = shape.id();
        self.shapes.push(shape);
        id
    }

    /// Remove shapes by id, returning the removed ones.
    pub fn remove_shapes(&mut self, ids: &[ShapeId]) -> Vec<Box<dyn Shape>> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.shapes)
            .into_iter()
            .partition(|s| ids.contains(&s.id()));
        self.shapes = kept;
        removed
    }

    pub fn serialized(&self) -> Result<SerializedPage, ShapeError> {
        Ok(SerializedPage {
            id: self.id.clone(),
            name: self.name.clone(),
            shapes: self.shapes.iter().map(|s| s.serialized()).collect::<Result<_, _>>()?,
        })
    }

    pub fn from_serialized(page: &SerializedPage, registry: &ShapeRegistry) -> Result<Self, ShapeError> {
        let shapes = page
            .shapes
            .iter()
            .map(|s| registry.create(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: page.id.clone(),
            name: page.name.clone(),
            shapes,
        })
    }
}

/// The pages of a drawing. There is always at least one page and a current page.
#[derive(Debug)]
pub struct Document {
    pages: Vec<Page>,
    current: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub const DEFAULT_PAGE_ID: &'static str = "page";

    /// Create a document with one empty page.
    pub fn new() -> Self {
        Self {
            pages: vec![Page::new(Self::DEFAULT_PAGE_ID, "Page 1")],
            current: 0,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn current_page_id(&self) -> &str {
        &self.pages[self.current].id
    }

    pub fn current_page(&self) -> &Page {
        &self.pages[self.current]
    }

    pub fn current_page_mut(&mut self) -> &mut Page {
        &mut self.pages[self.current]
    }

    /// Switch the current page. Returns false if no page has that id.
    pub fn set_current_page(&mut self, id: &str) -> bool {
        match self.pages.iter().position(|p| p.id == id) {
            Some(index) => {
                self.current = index;
                true
            }
            None => false,
        }
    }

    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Remove a page. The last remaining page cannot be removed.
    pub fn remove_page(&mut self, id: &str) -> Option<Page> {
        if self.pages.len() <= 1 {
            return None;
        }
        let index = self.pages.iter().position(|p| p.id == id)?;
        let page = self.pages.remove(index);
        if self.current >= index && self.current > 0 {
            self.current -= 1;
        }
        Some(page)
    }

    pub fn serialized(&self, selected_ids: Vec<ShapeId>) -> Result<SerializedDocument, ShapeError> {
        Ok(SerializedDocument {
            current_page_id: self.current_page_id().to_string(),
            selected_ids,
            pages: self.pages.iter().map(Page::serialized).collect::<Result<_, _>>()?,
        })
    }

    /// Rebuild a document. A missing current page falls back to the first page.
    pub fn from_serialized(doc: &SerializedDocument, registry: &ShapeRegistry) -> Result<Self, ShapeError> {
        let mut pages = doc
            .pages
            .iter()
            .map(|p| Page::from_serialized(p, registry))
            .collect::<Result<Vec<_>, _>>()?;
        if pages.is_empty() {
            pages.push(Page::new(Self::DEFAULT_PAGE_ID, "Page 1"));
        }
        let current = pages
            .iter()
            .position(|p| p.id == doc.current_page_id)
            .unwrap_or(0);
        Ok(Self { pages, current })
    }
}
