//! Host document seam.
//!
//! The engine never owns the page. Everything it needs from the host
//! document goes through [`Dom`], which a browser binding implements over the
//! live DOM and [`MemoryDom`] implements in memory.

mod memory;

pub use memory::MemoryDom;

/// Stable identity of an element in a host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

/// Id of the tooltip container owned by the extension.
pub const TOOLTIP_CONTAINER_ID: &str = "hover-translator-tooltip";

/// Id of the search overlay container owned by the extension.
pub const SEARCH_OVERLAY_ID: &str = "hover-translator-search-overlay";

/// Document operations the engine relies on.
///
/// Methods taking an id of an element that no longer exists must not panic:
/// getters return `None`/empty and setters do nothing.
pub trait Dom {
    /// Serialized content of the element.
    fn inner_html(&self, element: ElementId) -> Option<String>;

    /// Replaces the element content with `html`.
    fn set_inner_html(&mut self, element: ElementId, html: &str);

    /// Text of the element and its descendants, markup removed.
    fn text_content(&self, element: ElementId) -> Option<String>;

    /// Number of child elements (text nodes excluded).
    fn child_element_count(&self, element: ElementId) -> usize;

    fn parent(&self, element: ElementId) -> Option<ElementId>;

    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str);

    fn remove_attribute(&mut self, element: ElementId, name: &str);

    /// Every element in document order.
    fn elements(&self) -> Vec<ElementId>;

    fn contains_element(&self, element: ElementId) -> bool {
        self.inner_html(element).is_some()
    }

    fn has_attribute(&self, element: ElementId, name: &str) -> bool {
        self.attribute(element, name).is_some()
    }

    /// The element itself or its nearest ancestor carrying `name`.
    fn closest_with_attribute(&self, element: ElementId, name: &str) -> Option<ElementId> {
        let mut current = Some(element);
        while let Some(id) = current {
            if self.has_attribute(id, name) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    /// Whether `descendant` is `ancestor` or lies inside it.
    fn is_inclusive_descendant(&self, descendant: ElementId, ancestor: ElementId) -> bool {
        let mut current = Some(descendant);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Every element carrying `name`, in document order.
    fn elements_with_attribute(&self, name: &str) -> Vec<ElementId> {
        self.elements().into_iter().filter(|id| self.has_attribute(*id, name)).collect()
    }
}

/// Whether `element` lies inside one of the extension's own containers.
#[must_use]
pub fn is_inside_extension_ui(dom: &dyn Dom, element: ElementId) -> bool {
    let mut current = Some(element);
    while let Some(id) = current {
        if let Some(element_id) = dom.attribute(id, "id")
            && (element_id == TOOLTIP_CONTAINER_ID || element_id == SEARCH_OVERLAY_ID)
        {
            return true;
        }
        current = dom.parent(id);
    }
    false
}

/// Trimmed text of a leaf element, or `None` for elements with child
/// elements or without text.
#[must_use]
pub fn leaf_text(dom: &dyn Dom, element: ElementId) -> Option<String> {
    if dom.child_element_count(element) > 0 {
        return None;
    }
    let text = dom.text_content(element)?;
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
