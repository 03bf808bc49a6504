//! Mount points that rendered diagrams live in.
//!
//! The [`Stage`] is an ordered set of named containers. Each container holds
//! exactly one piece of [`Content`] and a request token that orders
//! overlapping render calls: only the most recent call may mount into it.
//!
//! The stage uses interior mutability so a render in flight can hold a shared
//! reference while other tasks on the same thread inspect it. It is not
//! `Sync`.

use std::{
    cell::RefCell,
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use indexmap::IndexMap;
use log::{debug, trace};

use tessera_core::{kind::DiagramKind, vector::VectorOutput};

/// Name of a mount point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContainerId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

static NEXT_DIAGRAM: AtomicU64 = AtomicU64::new(1);

/// Identifier of one mounted diagram element.
///
/// Identifiers come from a process-wide counter and are never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiagramId(u64);

impl DiagramId {
    /// Allocates the next identifier.
    pub fn next() -> Self {
        Self(NEXT_DIAGRAM.fetch_add(1, Ordering::Relaxed))
    }

    pub fn sequence(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mermaid-diagram-{}", self.0)
    }
}

/// A diagram element mounted in a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedDiagram {
    pub id: DiagramId,
    pub source: String,
    pub kind: DiagramKind,
    /// Filled in by a successful layout pass.
    pub vector: Option<VectorOutput>,
}

/// What a container currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Content {
    /// "Your diagram will appear here".
    #[default]
    Placeholder,
    /// A user-visible error in place of a diagram.
    Diagnostic(String),
    Diagram(MountedDiagram),
}

impl Content {
    pub fn as_diagram(&self) -> Option<&MountedDiagram> {
        match self {
            Self::Diagram(diagram) => Some(diagram),
            Self::Placeholder | Self::Diagnostic(_) => None,
        }
    }
}

#[derive(Debug, Default)]
struct Container {
    content: Content,
    token: u64,
}

/// The set of mount points.
#[derive(Debug, Default)]
pub struct Stage {
    containers: RefCell<IndexMap<ContainerId, Container>>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a stage with one empty container.
    pub fn with_container(id: impl Into<ContainerId>) -> Self {
        let stage = Self::new();
        stage.register(id);
        stage
    }

    /// Adds a container showing the placeholder. Registering an existing
    /// name leaves it untouched.
    pub fn register(&self, id: impl Into<ContainerId>) {
        let id = id.into();
        let mut containers = self.containers.borrow_mut();
        if !containers.contains_key(&id) {
            debug!(container:% = id; "Registering container");
            containers.insert(id, Container::default());
        }
    }

    pub fn contains(&self, id: &ContainerId) -> bool {
        self.containers.borrow().contains_key(id)
    }

    /// Returns a snapshot of a container's content.
    pub fn content(&self, id: &ContainerId) -> Option<Content> {
        self.containers
            .borrow()
            .get(id)
            .map(|container| container.content.clone())
    }

    /// Starts a new render request against a container and returns its token.
    ///
    /// Any request started earlier on the same container becomes stale.
    pub fn begin_request(&self, id: &ContainerId) -> Option<u64> {
        let mut containers = self.containers.borrow_mut();
        let container = containers.get_mut(id)?;
        container.token += 1;
        trace!(container:% = id, token = container.token; "Render request started");
        Some(container.token)
    }

    /// Returns `true` if `token` is the most recent request on the container.
    pub fn is_current(&self, id: &ContainerId, token: u64) -> bool {
        self.containers
            .borrow()
            .get(id)
            .is_some_and(|container| container.token == token)
    }

    /// Replaces a container's content with a fresh diagram element.
    ///
    /// Returns `false` without touching the container when `token` is stale.
    pub fn mount(&self, id: &ContainerId, token: u64, diagram: MountedDiagram) -> bool {
        self.replace_if_current(id, token, Content::Diagram(diagram))
    }

    /// Replaces a container's content with a diagnostic message.
    ///
    /// Returns `false` without touching the container when `token` is stale.
    pub fn show_diagnostic(&self, id: &ContainerId, token: u64, message: impl Into<String>) -> bool {
        self.replace_if_current(id, token, Content::Diagnostic(message.into()))
    }

    /// Stores layout output on a mounted element.
    ///
    /// Returns `false` when the element is no longer mounted in the
    /// container.
    pub fn attach_vector(&self, id: &ContainerId, diagram: &DiagramId, vector: VectorOutput) -> bool {
        let mut containers = self.containers.borrow_mut();
        match containers.get_mut(id).map(|container| &mut container.content) {
            Some(Content::Diagram(mounted)) if mounted.id == *diagram => {
                mounted.vector = Some(vector);
                true
            }
            _ => false,
        }
    }

    /// Puts the placeholder back and invalidates any request in flight.
    pub fn clear(&self, id: &ContainerId) -> bool {
        let mut containers = self.containers.borrow_mut();
        match containers.get_mut(id) {
            Some(container) => {
                container.token += 1;
                container.content = Content::Placeholder;
                true
            }
            None => false,
        }
    }

    /// Lists every mounted diagram in container registration order.
    pub fn rendered_diagrams(&self) -> Vec<MountedDiagram> {
        self.containers
            .borrow()
            .values()
            .filter_map(|container| container.content.as_diagram().cloned())
            .collect()
    }

    /// Returns the first mounted diagram in container registration order.
    pub fn first_diagram(&self) -> Option<MountedDiagram> {
        self.containers
            .borrow()
            .values()
            .find_map(|container| container.content.as_diagram().cloned())
    }

    pub fn has_diagram(&self) -> bool {
        self.containers
            .borrow()
            .values()
            .any(|container| container.content.as_diagram().is_some())
    }

    fn replace_if_current(&self, id: &ContainerId, token: u64, content: Content) -> bool {
        let mut containers = self.containers.borrow_mut();
        match containers.get_mut(id) {
            Some(container) if container.token == token => {
                container.content = content;
                true
            }
            Some(_) => {
                debug!(container:% = id, token; "Dropping stale render output");
                false
            }
            None => false,
        }
    }
}
