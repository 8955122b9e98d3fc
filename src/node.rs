//! The window node: a tagged variant describing one element of the
//! layout tree (screen, status bar, work area, workspace, tile-fork,
//! tile, frame, client).

use crate::id::ObjectId;
use crate::tree_index::TreeIndex;

/// A display-server window handle. Newtype over the raw integer id the
/// backend hands out, so that object ids and window handles (both
/// plain `u64` in the C sources this is grounded on) can never be
/// confused at a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowHandle(pub u64);

impl std::fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// The tag driving exhaustive dispatch in the engine. New variants are
/// a source change, not a runtime extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Screen,
    Status,
    WorkArea,
    Workspace,
    TileFork,
    Tile,
    Frame,
    Client,
}

/// Geometry tuple, relative to the parent's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub border_width: u32,
}

impl Geometry {
    pub fn new(x: i32, y: i32, width: u32, height: u32, border_width: u32) -> Self {
        Geometry { x, y, width, height, border_width }
    }

    /// The interior a child is resized against: this node's own box,
    /// minus its own border on both sides.
    pub fn interior_width(&self) -> u32 {
        self.width.saturating_sub(self.border_width * 2)
    }

    pub fn interior_height(&self) -> u32 {
        self.height.saturating_sub(self.border_width * 2)
    }
}

/// Descriptor for a physical display root, carried only by `Screen`
/// nodes.
#[derive(Debug, Clone, Copy)]
pub struct ScreenDescriptor {
    pub root: WindowHandle,
    pub width: u32,
    pub height: u32,
    pub root_visual: u64,
}

/// One element of the layout tree. `kind` drives dispatch; the
/// `screen_descriptor` field is only meaningful when `kind ==
/// NodeKind::Screen`.
#[derive(Debug, Clone)]
pub struct Node {
    pub object_id: ObjectId,
    pub handle: WindowHandle,
    pub kind: NodeKind,
    pub screen_root: WindowHandle,
    pub parent: WindowHandle,
    pub geometry: Geometry,
    pub children: TreeIndex<ObjectId, WindowHandle>,
    pub screen_descriptor: Option<ScreenDescriptor>,
}

impl Node {
    pub fn new(
        object_id: ObjectId,
        handle: WindowHandle,
        kind: NodeKind,
        screen_root: WindowHandle,
        parent: WindowHandle,
        geometry: Geometry,
    ) -> Self {
        Node {
            object_id,
            handle,
            kind,
            screen_root,
            parent,
            geometry,
            children: TreeIndex::new(),
            screen_descriptor: None,
        }
    }
}
