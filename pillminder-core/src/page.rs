//! Menu page tree
//!
//! A page is one menu entry. Its children are either a fixed list or a
//! producer function that is called again on every access, so menus backed
//! by external data (the stored schedules) always reflect the current state.
//!
//! Parent links are weak. Static children get theirs when the parent is
//! built; dynamic children get theirs each time the producer runs.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::navigation::Visit;

/// Shared handle to a page
pub type PageRef = Arc<Page>;

/// Callback run when a page is selected
pub type VisitFn = Arc<dyn Fn(&mut Visit<'_>) + Send + Sync>;

/// Function producing a page's children on demand
pub type ProducerFn = Arc<dyn Fn() -> Vec<PageRef> + Send + Sync>;

/// Children of a page
#[derive(Clone)]
pub enum Children {
    /// Fixed list, parents assigned at construction
    Static(Vec<PageRef>),
    /// Re-evaluated on every access, never cached
    Dynamic(ProducerFn),
}

impl fmt::Debug for Children {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Children::Static(pages) => f.debug_tuple("Static").field(&pages.len()).finish(),
            Children::Dynamic(_) => f.write_str("Dynamic"),
        }
    }
}

/// One node of the menu tree
pub struct Page {
    /// Text shown for this page (as a row in its parent, as a title when open)
    label: String,
    /// Child pages
    children: Children,
    /// Draw a selection marker column in front of child rows
    prefix_marker: bool,
    /// Run when the page is selected
    on_visit: Option<VisitFn>,
    /// Containing page
    parent: Mutex<Weak<Page>>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("label", &self.label)
            .field("children", &self.children)
            .field("prefix_marker", &self.prefix_marker)
            .field("on_visit", &self.on_visit.is_some())
            .finish()
    }
}

impl Page {
    /// Start building a page
    pub fn builder(label: impl Into<String>) -> PageBuilder {
        PageBuilder {
            label: label.into(),
            children: Children::Static(Vec::new()),
            prefix_marker: true,
            on_visit: None,
        }
    }

    /// A page with no children and no callback
    pub fn leaf(label: impl Into<String>) -> PageRef {
        Self::builder(label).build()
    }

    /// Display label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether child rows get a selection marker
    pub fn prefix_marker(&self) -> bool {
        self.prefix_marker
    }

    /// Selection callback, if any
    pub fn on_visit(&self) -> Option<VisitFn> {
        self.on_visit.clone()
    }

    /// Whether children come from a producer
    pub fn is_dynamic(&self) -> bool {
        matches!(self.children, Children::Dynamic(_))
    }

    /// Current child list
    ///
    /// For a producer this runs it and points every returned page back at
    /// `self` before handing the list out.
    pub fn children(self: &Arc<Self>) -> Vec<PageRef> {
        match &self.children {
            Children::Static(pages) => pages.clone(),
            Children::Dynamic(produce) => {
                let pages = produce();
                let me = Arc::downgrade(self);
                for page in &pages {
                    page.set_parent(me.clone());
                }
                pages
            }
        }
    }

    /// Containing page, if it is still alive
    pub fn parent(&self) -> Option<PageRef> {
        self.parent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .upgrade()
    }

    /// False only for the root (or a page whose container was dropped)
    pub fn has_parent(&self) -> bool {
        self.parent().is_some()
    }

    fn set_parent(&self, parent: Weak<Page>) {
        *self.parent.lock().unwrap_or_else(PoisonError::into_inner) = parent;
    }
}

/// Builder for [`Page`]
pub struct PageBuilder {
    label: String,
    children: Children,
    prefix_marker: bool,
    on_visit: Option<VisitFn>,
}

impl PageBuilder {
    /// Fixed child list
    pub fn children(mut self, pages: Vec<PageRef>) -> Self {
        self.children = Children::Static(pages);
        self
    }

    /// Children produced on every access
    pub fn dynamic<F>(mut self, produce: F) -> Self
    where
        F: Fn() -> Vec<PageRef> + Send + Sync + 'static,
    {
        self.children = Children::Dynamic(Arc::new(produce));
        self
    }

    /// Draw child rows without the selection marker column
    pub fn no_prefix(mut self) -> Self {
        self.prefix_marker = false;
        self
    }

    /// Callback run when this page is selected
    pub fn on_visit<F>(mut self, visit: F) -> Self
    where
        F: Fn(&mut Visit<'_>) + Send + Sync + 'static,
    {
        self.on_visit = Some(Arc::new(visit));
        self
    }

    /// Finish the page, pointing static children back at it
    pub fn build(self) -> PageRef {
        Arc::new_cyclic(|me| {
            if let Children::Static(pages) = &self.children {
                for page in pages {
                    page.set_parent(me.clone());
                }
            }
            Page {
                label: self.label,
                children: self.children,
                prefix_marker: self.prefix_marker,
                on_visit: self.on_visit,
                parent: Mutex::new(Weak::new()),
            }
        })
    }
}
