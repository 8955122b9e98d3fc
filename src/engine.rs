//! The layout engine: owns the forest of window nodes and the
//! active-element pointers, and implements every tree mutation (split,
//! destroy, cycle, workspace switch, client attach/detach). Grounded in
//! `layout.c`'s `layout_*` entry points, reshaped around a single
//! owning arena (`windows`) instead of `calloc`'d nodes linked by raw
//! pointers.

use std::collections::HashMap;

use log::{debug, info, trace};

use crate::backend::{ConfigureGeometry, DisplayBackend, WindowKindProfile};
use crate::id::{IdAllocator, ObjectId};
use crate::node::{Geometry, Node, NodeKind, ScreenDescriptor, WindowHandle};
use crate::palette::{self, Palette};
use crate::tree_index::TreeIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    Horizontal,
    Vertical,
}

pub struct LayoutEngine<B: DisplayBackend> {
    backend: B,
    ids: IdAllocator,
    windows: HashMap<WindowHandle, Node>,
    screen_order: Vec<WindowHandle>,
    tiles_by_id: TreeIndex<ObjectId, WindowHandle>,
    current_workarea: HashMap<WindowHandle, WindowHandle>,
    current_workspace: HashMap<WindowHandle, WindowHandle>,
    current_tile: HashMap<WindowHandle, WindowHandle>,
    active_screen: Option<WindowHandle>,
    palette: Palette,
    tile_border_width: u32,
}

impl<B: DisplayBackend> LayoutEngine<B> {
    pub fn new(backend: B, palette: Palette, tile_border_width: u32) -> Self {
        LayoutEngine {
            backend,
            ids: IdAllocator::new(),
            windows: HashMap::new(),
            screen_order: Vec::new(),
            tiles_by_id: TreeIndex::new(),
            current_workarea: HashMap::new(),
            current_workspace: HashMap::new(),
            current_tile: HashMap::new(),
            active_screen: None,
            palette,
            tile_border_width,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn active_screen(&self) -> Option<WindowHandle> {
        self.active_screen
    }

    pub fn screens(&self) -> &[WindowHandle] {
        &self.screen_order
    }

    // -- node access -------------------------------------------------

    fn node(&self, handle: WindowHandle) -> &Node {
        self.windows
            .get(&handle)
            .unwrap_or_else(|| panic!("invariant violation: window {} absent from arena", handle))
    }

    fn node_mut(&mut self, handle: WindowHandle) -> &mut Node {
        self.windows
            .get_mut(&handle)
            .unwrap_or_else(|| panic!("invariant violation: window {} absent from arena", handle))
    }

    pub fn lookup(&self, handle: WindowHandle) -> Option<&Node> {
        self.windows.get(&handle)
    }

    /// Walk the parent chain from `start` until a node of `kind` is
    /// found; `None` if `Screen` is reached without a match.
    fn find_ancestor(&self, start: WindowHandle, kind: NodeKind) -> Option<WindowHandle> {
        let mut current = start;
        loop {
            let n = self.node(current);
            if n.kind == kind {
                return Some(current);
            }
            if n.kind == NodeKind::Screen {
                return None;
            }
            current = n.parent;
        }
    }

    // -- node construction --------------------------------------------

    #[allow(clippy::too_many_arguments)]
    fn spawn_child(
        &mut self,
        kind: NodeKind,
        profile: WindowKindProfile,
        screen_root: WindowHandle,
        parent: WindowHandle,
        geometry: Geometry,
        background_pixel: u32,
        border_pixel: u32,
    ) -> WindowHandle {
        let root_visual = self
            .node(screen_root)
            .screen_descriptor
            .expect("invariant violation: screen_root does not carry a screen descriptor")
            .root_visual;

        let handle = self.backend.new_window_id();
        let object_id = self.ids.next();
        let node = Node::new(object_id, handle, kind, screen_root, parent, geometry);
        self.windows.insert(handle, node);
        self.node_mut(parent).children.xset(object_id, handle);

        self.backend.create_window(
            profile,
            handle,
            parent,
            geometry.x,
            geometry.y,
            geometry.width,
            geometry.height,
            geometry.border_width,
            root_visual,
            background_pixel,
            border_pixel,
        );

        handle
    }

    fn reparent_node(&mut self, handle: WindowHandle, new_parent: WindowHandle) {
        let object_id = self.node(handle).object_id;
        let old_parent = self.node(handle).parent;
        self.node_mut(old_parent).children.pop(object_id);
        self.node_mut(new_parent).children.xset(object_id, handle);
        self.node_mut(handle).parent = new_parent;
        self.backend.reparent(handle, new_parent);
    }

    /// Resize every child of `parent` to fill its interior exactly
    /// (the common case: a single child, or several `Client`s
    /// overlapping the same `Tile`), then recurse. The one exception is
    /// a `TileFork` with two children: those carry an explicit
    /// side-by-side or stacked split and must be rescaled by the same
    /// half-plus-remainder rule `tile_split` uses, not collapsed onto
    /// the full interior, or a parent resize (from a sibling split or
    /// destroy higher up the tree) would leave a stale gap where one
    /// half used to be.
    fn resize_descendants(&mut self, parent: WindowHandle) {
        let interior_w = self.node(parent).geometry.interior_width();
        let interior_h = self.node(parent).geometry.interior_height();
        let parent_kind = self.node(parent).kind;
        let children: Vec<WindowHandle> = self.node(parent).children.values().copied().collect();

        if parent_kind == NodeKind::TileFork && children.len() == 2 {
            let (first, second) = (children[0], children[1]);
            let first_geometry = self.node(first).geometry;
            let second_geometry = self.node(second).geometry;
            let border = first_geometry.border_width;
            let horizontal = first_geometry.y != second_geometry.y;

            let (first_geometry, second_geometry) = if horizontal {
                let width = interior_w.saturating_sub(2 * border);
                let half = interior_h / 2;
                let remainder = interior_h % 2;
                let first_height = half.saturating_sub(2 * border);
                let second_height = (half + remainder).saturating_sub(2 * border);
                let second_y = (first_height + 2 * border) as i32;
                (
                    Geometry::new(0, 0, width, first_height, border),
                    Geometry::new(0, second_y, width, second_height, border),
                )
            } else {
                let height = interior_h.saturating_sub(2 * border);
                let half = interior_w / 2;
                let remainder = interior_w % 2;
                let first_width = half.saturating_sub(2 * border);
                let second_width = (half + remainder).saturating_sub(2 * border);
                let second_x = (first_width + 2 * border) as i32;
                (
                    Geometry::new(0, 0, first_width, height, border),
                    Geometry::new(second_x, 0, second_width, height, border),
                )
            };

            self.node_mut(first).geometry = first_geometry;
            self.node_mut(second).geometry = second_geometry;
            self.backend.configure(
                first,
                ConfigureGeometry::all(first_geometry.x, first_geometry.y, first_geometry.width, first_geometry.height),
            );
            self.backend.configure(
                second,
                ConfigureGeometry::all(second_geometry.x, second_geometry.y, second_geometry.width, second_geometry.height),
            );
            self.resize_descendants(first);
            self.resize_descendants(second);
            return;
        }

        for child in children {
            let border = self.node(child).geometry.border_width;
            let width = interior_w.saturating_sub(2 * border);
            let height = interior_h.saturating_sub(2 * border);
            let geometry = Geometry::new(0, 0, width, height, border);
            self.node_mut(child).geometry = geometry;
            self.backend.configure(child, ConfigureGeometry::all(0, 0, width, height));
            self.resize_descendants(child);
        }
    }

    // -- lifecycle ------------------------------------------------------

    pub fn register_screen(&mut self, descriptor: ScreenDescriptor) -> WindowHandle {
        let root = descriptor.root;
        let screen_geometry = Geometry::new(0, 0, descriptor.width, descriptor.height, palette::BORDER_SCREEN);
        let object_id = self.ids.next();
        let mut screen_node = Node::new(object_id, root, NodeKind::Screen, root, root, screen_geometry);
        screen_node.screen_descriptor = Some(descriptor);
        self.windows.insert(root, screen_node);
        self.screen_order.push(root);
        info!("registered screen {} ({}x{})", root, descriptor.width, descriptor.height);

        let status_geometry = Geometry::new(
            0,
            0,
            screen_geometry.width.saturating_sub(2 * palette::BORDER_STATUS),
            palette::STATUS_HEIGHT,
            palette::BORDER_STATUS,
        );
        self.spawn_child(
            NodeKind::Status,
            WindowKindProfile::Status,
            root,
            root,
            status_geometry,
            self.palette.status_background,
            self.palette.status_border,
        );

        let workarea_geometry = Geometry::new(
            0,
            (screen_geometry.border_width + palette::STATUS_HEIGHT) as i32,
            screen_geometry.width.saturating_sub(2 * palette::BORDER_WORKAREA),
            screen_geometry
                .height
                .saturating_sub(palette::STATUS_HEIGHT)
                .saturating_sub(2 * palette::BORDER_WORKAREA),
            palette::BORDER_WORKAREA,
        );
        let workarea_handle = self.spawn_child(
            NodeKind::WorkArea,
            WindowKindProfile::WorkArea,
            root,
            root,
            workarea_geometry,
            self.palette.workarea_background,
            self.palette.workarea_border,
        );
        self.current_workarea.insert(root, workarea_handle);

        let workspace_handle = self.create_workspace_subtree(root, workarea_handle);
        self.current_workspace.insert(root, workspace_handle);

        if self.active_screen.is_none() {
            self.active_screen = Some(root);
        }

        root
    }

    fn create_workspace_subtree(&mut self, root: WindowHandle, workarea: WindowHandle) -> WindowHandle {
        let workarea_geometry = self.node(workarea).geometry;
        let workspace_geometry = Geometry::new(
            0,
            0,
            workarea_geometry.interior_width(),
            workarea_geometry.interior_height(),
            palette::BORDER_WORKSPACE,
        );
        let workspace_handle = self.spawn_child(
            NodeKind::Workspace,
            WindowKindProfile::Workspace,
            root,
            workarea,
            workspace_geometry,
            self.palette.workspace_background,
            palette::random_workspace_border(),
        );

        let tilefork_geometry = Geometry::new(
            0,
            0,
            workspace_geometry.interior_width(),
            workspace_geometry.interior_height(),
            palette::BORDER_TILEFORK,
        );
        let tilefork_handle = self.spawn_child(
            NodeKind::TileFork,
            WindowKindProfile::TileFork,
            root,
            workspace_handle,
            tilefork_geometry,
            self.palette.tile_background,
            0,
        );

        let tile_width = tilefork_geometry.width.saturating_sub(2 * self.tile_border_width);
        let tile_height = tilefork_geometry.height.saturating_sub(2 * self.tile_border_width);
        let tile_geometry = Geometry::new(0, 0, tile_width, tile_height, self.tile_border_width);
        let tile_handle = self.spawn_child(
            NodeKind::Tile,
            WindowKindProfile::Tile,
            root,
            tilefork_handle,
            tile_geometry,
            self.palette.tile_background,
            self.palette.tile_new_border,
        );
        self.tiles_by_id.xset(self.node(tile_handle).object_id, tile_handle);
        self.tile_set_active(tile_handle);

        workspace_handle
    }

    /// Map every live node, screen-by-screen, top-down; flush once at
    /// the end.
    pub fn render_all(&mut self) {
        let screens = self.screen_order.clone();
        for screen in screens {
            self.map_subtree(screen);
        }
        self.backend.flush();
    }

    fn map_subtree(&mut self, handle: WindowHandle) {
        self.backend.map(handle);
        let children: Vec<WindowHandle> = self.node(handle).children.values().copied().collect();
        for child in children {
            self.map_subtree(child);
        }
    }

    fn destroy_subtree(&mut self, handle: WindowHandle) {
        let children: Vec<WindowHandle> = self.node(handle).children.values().copied().collect();
        for child in children {
            self.destroy_subtree(child);
        }
        let node = self
            .windows
            .remove(&handle)
            .unwrap_or_else(|| panic!("invariant violation: destroying untracked window {}", handle));
        self.backend.unmap(handle);
        if node.kind == NodeKind::Tile {
            self.tiles_by_id.pop(node.object_id);
            self.current_tile.retain(|_, v| *v != handle);
        }
    }

    // -- clients ----------------------------------------------------

    pub fn client_attach(&mut self, root: WindowHandle, new_window_handle: WindowHandle) {
        if self.windows.contains_key(&new_window_handle) {
            return;
        }
        let workspace = match self.current_workspace.get(&root) {
            Some(&w) => w,
            None => return,
        };
        let tile = match self.current_tile.get(&workspace) {
            Some(&t) => t,
            None => return,
        };

        let tile_geometry = self.node(tile).geometry;
        let width = tile_geometry.interior_width();
        let height = tile_geometry.interior_height();
        let object_id = self.ids.next();
        let geometry = Geometry::new(0, 0, width, height, palette::BORDER_CLIENT);
        let node = Node::new(object_id, new_window_handle, NodeKind::Client, root, tile, geometry);
        self.windows.insert(new_window_handle, node);
        self.node_mut(tile).children.xset(object_id, new_window_handle);

        self.backend.reparent(new_window_handle, tile);
        self.backend.configure(new_window_handle, ConfigureGeometry::all(0, 0, width, height));
        self.backend.set_border_colour(new_window_handle, self.palette.client_border);
        self.backend.set_border_width(new_window_handle, palette::BORDER_CLIENT);
        self.backend.map(new_window_handle);
        self.backend.flush();
        debug!("attached client {} to tile {}", new_window_handle, tile);
    }

    pub fn client_detach(&mut self, window_handle: WindowHandle) {
        let (object_id, parent, kind) = match self.windows.get(&window_handle) {
            Some(n) => (n.object_id, n.parent, n.kind),
            None => return,
        };
        if kind != NodeKind::Client {
            return;
        }
        self.node_mut(parent).children.pop(object_id);
        self.windows.remove(&window_handle);
        debug!("detached client {}", window_handle);
    }

    // -- workspaces ---------------------------------------------------

    pub fn workspace_create(&mut self, root: WindowHandle) {
        let workarea = match self.current_workarea.get(&root) {
            Some(&w) => w,
            None => return,
        };
        let previous = self.current_workspace.get(&root).copied();

        let new_workspace = self.create_workspace_subtree(root, workarea);
        self.map_subtree(new_workspace);
        if let Some(previous) = previous {
            self.unmap_subtree(previous);
        }
        self.current_workspace.insert(root, new_workspace);
        self.backend.flush();
    }

    fn unmap_subtree(&mut self, handle: WindowHandle) {
        self.backend.unmap(handle);
        let children: Vec<WindowHandle> = self.node(handle).children.values().copied().collect();
        for child in children {
            self.unmap_subtree(child);
        }
    }

    pub fn workspace_destroy(&mut self, root: WindowHandle) {
        let workarea = match self.current_workarea.get(&root) {
            Some(&w) => w,
            None => return,
        };
        if self.node(workarea).children.count() <= 1 {
            return;
        }
        let current = match self.current_workspace.get(&root) {
            Some(&w) => w,
            None => return,
        };
        let object_id = self.node(current).object_id;

        self.destroy_subtree(current);
        self.node_mut(workarea).children.pop(object_id);

        let (_, &next) = self
            .node(workarea)
            .children
            .root()
            .expect("invariant violation: workarea left with no workspace");
        self.current_workspace.insert(root, next);
        self.map_subtree(next);
        self.backend.flush();
    }

    pub fn workspace_next(&mut self, root: WindowHandle) {
        let workarea = match self.current_workarea.get(&root) {
            Some(&w) => w,
            None => return,
        };
        let current = match self.current_workspace.get(&root) {
            Some(&w) => w,
            None => return,
        };
        let current_id = self.node(current).object_id;
        let next = self
            .node(workarea)
            .children
            .iter_from(current_id + 1)
            .next()
            .or_else(|| self.node(workarea).children.iter().next())
            .map(|(_, &h)| h)
            .unwrap_or(current);

        if next == current {
            return;
        }
        self.backend.map(next);
        self.backend.unmap(current);
        self.current_workspace.insert(root, next);
        self.backend.flush();
    }

    pub fn workspace_prev(&mut self, root: WindowHandle) {
        let workarea = match self.current_workarea.get(&root) {
            Some(&w) => w,
            None => return,
        };
        let current = match self.current_workspace.get(&root) {
            Some(&w) => w,
            None => return,
        };
        let prev = self.cycle_workspace_prev(workarea, current);
        if prev == current {
            return;
        }
        self.backend.map(prev);
        self.backend.unmap(current);
        self.current_workspace.insert(root, prev);
        self.backend.flush();
    }

    fn cycle_workspace_prev(&self, workarea: WindowHandle, current: WindowHandle) -> WindowHandle {
        let current_id = self.node(current).object_id;
        let mut last = current;
        for (id, &handle) in self.node(workarea).children.iter() {
            if id == current_id {
                break;
            }
            last = handle;
        }
        if last != current {
            return last;
        }
        self.node(workarea).children.iter().last().map(|(_, &h)| h).unwrap_or(current)
    }

    // -- tiles ----------------------------------------------------------

    fn cycle_tile_next(&self, workspace: WindowHandle, current: WindowHandle) -> WindowHandle {
        let current_id = self.node(current).object_id;
        self.tiles_by_id
            .iter_from(current_id + 1)
            .chain(self.tiles_by_id.iter())
            .map(|(_, &h)| h)
            .find(|&h| self.find_ancestor(h, NodeKind::Workspace) == Some(workspace))
            .unwrap_or(current)
    }

    fn cycle_tile_prev(&self, workspace: WindowHandle, current: WindowHandle) -> WindowHandle {
        let current_id = self.node(current).object_id;
        let mut last = current;
        for (id, &handle) in self.tiles_by_id.iter() {
            if id == current_id {
                break;
            }
            if self.find_ancestor(handle, NodeKind::Workspace) == Some(workspace) {
                last = handle;
            }
        }
        if last != current {
            return last;
        }
        let mut wrapped = current;
        for (_, &handle) in self.tiles_by_id.iter() {
            if self.find_ancestor(handle, NodeKind::Workspace) == Some(workspace) {
                wrapped = handle;
            }
        }
        wrapped
    }

    pub fn tile_next(&mut self, root: WindowHandle) {
        let workspace = match self.current_workspace.get(&root) {
            Some(&w) => w,
            None => return,
        };
        let current = match self.current_tile.get(&workspace) {
            Some(&t) => t,
            None => return,
        };
        let next = self.cycle_tile_next(workspace, current);
        if next == current {
            return;
        }
        self.tile_set_active(next);
    }

    pub fn tile_prev(&mut self, root: WindowHandle) {
        let workspace = match self.current_workspace.get(&root) {
            Some(&w) => w,
            None => return,
        };
        let current = match self.current_tile.get(&workspace) {
            Some(&t) => t,
            None => return,
        };
        let prev = self.cycle_tile_prev(workspace, current);
        if prev == current {
            return;
        }
        self.tile_set_active(prev);
    }

    pub fn tile_set_active(&mut self, handle: WindowHandle) {
        let is_tile = matches!(self.windows.get(&handle), Some(n) if n.kind == NodeKind::Tile);
        if !is_tile {
            return;
        }
        let workspace = self
            .find_ancestor(handle, NodeKind::Workspace)
            .expect("invariant violation: tile without a workspace ancestor");

        if let Some(&previous) = self.current_tile.get(&workspace) {
            if previous != handle {
                self.backend.set_border_colour(previous, self.palette.tile_inactive_border);
            }
        }
        self.backend.set_border_colour(handle, self.palette.tile_active_border);
        self.current_tile.insert(workspace, handle);
        debug!("current active tile: {}", handle);
    }

    pub fn tile_split(&mut self, root: WindowHandle, direction: SplitDirection) {
        let workspace = match self.current_workspace.get(&root) {
            Some(&w) => w,
            None => return,
        };
        let active_tile = match self.current_tile.get(&workspace) {
            Some(&t) => t,
            None => return,
        };
        trace!("splitting tile {} direction={:?}", active_tile, direction);

        let tile_geometry = self.node(active_tile).geometry;
        let p = self.node(active_tile).parent;
        let p_children = self.node(p).children.count();

        let p_prime = if p_children > 1 {
            let p_prime_geometry = Geometry::new(
                tile_geometry.x,
                tile_geometry.y,
                tile_geometry.width + 2 * tile_geometry.border_width,
                tile_geometry.height + 2 * tile_geometry.border_width,
                palette::BORDER_TILEFORK,
            );
            let handle = self.spawn_child(
                NodeKind::TileFork,
                WindowKindProfile::TileFork,
                root,
                p,
                p_prime_geometry,
                self.palette.tile_background,
                0,
            );
            self.reparent_node(active_tile, handle);
            handle
        } else {
            p
        };

        let placeholder = Geometry::new(0, 0, 1, 1, self.tile_border_width);
        let sibling = self.spawn_child(
            NodeKind::Tile,
            WindowKindProfile::Tile,
            root,
            p_prime,
            placeholder,
            self.palette.tile_background,
            self.palette.tile_new_border,
        );

        let container = self.node(p_prime).geometry;
        let border = self.tile_border_width;
        let (tile_geometry, sibling_geometry) = match direction {
            SplitDirection::Horizontal => {
                let width = container.width.saturating_sub(2 * border);
                let half = container.height / 2;
                let remainder = container.height % 2;
                let tile_height = half.saturating_sub(2 * border);
                let sibling_height = (half + remainder).saturating_sub(2 * border);
                let sibling_y = (tile_height + 2 * border) as i32;
                (
                    Geometry::new(0, 0, width, tile_height, border),
                    Geometry::new(0, sibling_y, width, sibling_height, border),
                )
            }
            SplitDirection::Vertical => {
                let height = container.height.saturating_sub(2 * border);
                let half = container.width / 2;
                let remainder = container.width % 2;
                let tile_width = half.saturating_sub(2 * border);
                let sibling_width = (half + remainder).saturating_sub(2 * border);
                let sibling_x = (tile_width + 2 * border) as i32;
                (
                    Geometry::new(0, 0, tile_width, height, border),
                    Geometry::new(sibling_x, 0, sibling_width, height, border),
                )
            }
        };

        self.node_mut(active_tile).geometry = tile_geometry;
        self.node_mut(sibling).geometry = sibling_geometry;
        self.tiles_by_id.xset(self.node(sibling).object_id, sibling);

        self.backend.configure(
            active_tile,
            ConfigureGeometry::all(tile_geometry.x, tile_geometry.y, tile_geometry.width, tile_geometry.height),
        );
        self.backend.configure(
            sibling,
            ConfigureGeometry::all(sibling_geometry.x, sibling_geometry.y, sibling_geometry.width, sibling_geometry.height),
        );
        self.resize_descendants(active_tile);
        self.resize_descendants(sibling);

        self.tile_set_active(active_tile);

        if p_prime != p {
            self.backend.map(p_prime);
        }
        self.backend.map(sibling);
        self.backend.map(active_tile);
        self.backend.flush();
    }

    pub fn tile_destroy(&mut self, root: WindowHandle) {
        let workspace = match self.current_workspace.get(&root) {
            Some(&w) => w,
            None => return,
        };
        let active_tile = match self.current_tile.get(&workspace) {
            Some(&t) => t,
            None => return,
        };
        let sibling = self.cycle_tile_next(workspace, active_tile);
        if sibling == active_tile {
            return;
        }

        let t_object_id = self.node(active_tile).object_id;
        let p = self.node(active_tile).parent;

        self.node_mut(p).children.pop(t_object_id);
        self.windows.remove(&active_tile);
        self.backend.unmap(active_tile);
        self.tiles_by_id.pop(t_object_id);
        self.current_tile.retain(|_, v| *v != active_tile);

        self.resize_descendants(p);
        self.tile_set_active(sibling);

        let workspace_root_fork = self.node(workspace).children.root().map(|(_, &h)| h);
        if self.node(p).children.count() == 1 {
            let (_, &u) = self.node(p).children.root().unwrap();
            if Some(p) == workspace_root_fork {
                // `p` is the workspace's permanent top-level fork and
                // can't be dropped. If its lone child is itself a
                // `TileFork`, leaving it there would violate "a
                // one-child TileFork's child is a Tile" — splice the
                // nested fork out instead and adopt its children
                // directly into `p`.
                if self.node(u).kind == NodeKind::TileFork {
                    self.splice_tile_fork(p, u);
                }
            } else {
                self.collapse_tile_fork(p);
            }
        }

        self.backend.flush();
    }

    /// `P` now has exactly one child `U`; re-parent `U` under `P`'s own
    /// parent in its place, then drop `P`.
    fn collapse_tile_fork(&mut self, p: WindowHandle) {
        let (_, &u) = self
            .node(p)
            .children
            .root()
            .expect("invariant violation: collapsing a tile fork with no remaining child");
        let grandparent = self.node(p).parent;
        self.reparent_node(u, grandparent);

        let p_object_id = self.node(p).object_id;
        self.node_mut(grandparent).children.pop(p_object_id);
        self.windows.remove(&p);
        self.backend.unmap(p);
    }

    /// `u` is `p`'s sole child and is itself a `TileFork`. `u` sits at
    /// `p`'s own origin (a lone child always fills its parent's
    /// interior from `(0, 0)`), so its children's geometry is already
    /// correct relative to `p` directly — no recomputation needed, just
    /// re-parenting and dropping the now-empty `u`.
    fn splice_tile_fork(&mut self, p: WindowHandle, u: WindowHandle) {
        let grandchildren: Vec<WindowHandle> = self.node(u).children.values().copied().collect();
        for child in grandchildren {
            self.reparent_node(child, p);
        }

        let u_object_id = self.node(u).object_id;
        self.node_mut(p).children.pop(u_object_id);
        self.windows.remove(&u);
        self.backend.unmap(u);
    }

    // -- derived state --------------------------------------------------

    pub fn window_resized(&mut self, window_handle: WindowHandle) {
        let geometry = match self.windows.get(&window_handle) {
            Some(n) => n.geometry,
            None => return,
        };
        self.backend.configure(
            window_handle,
            ConfigureGeometry::all(geometry.x, geometry.y, geometry.width, geometry.height),
        );
        self.backend.flush();
    }

    pub fn refresh_status(&mut self) {
        let now = format_ctime();
        let screens = self.screen_order.clone();
        for (index, root) in screens.iter().enumerate() {
            let workspace = match self.current_workspace.get(root) {
                Some(&w) => w,
                None => continue,
            };
            let workarea = match self.current_workarea.get(root) {
                Some(&w) => w,
                None => continue,
            };
            let workspace_index = self
                .node(workarea)
                .children
                .iter()
                .position(|(_, &h)| h == workspace)
                .unwrap_or(0);
            let tile_text = self
                .current_tile
                .get(&workspace)
                .map(|h| format!("{}", h))
                .unwrap_or_else(|| "-".to_string());

            let text = format!(
                " {} | screen: {} | workspace: {} | active tile: {}",
                now, index, workspace_index, tile_text
            );

            let status_handle = self
                .node(*root)
                .children
                .values()
                .copied()
                .find(|&h| self.node(h).kind == NodeKind::Status);
            if let Some(status_handle) = status_handle {
                self.backend.draw_text(
                    status_handle,
                    0,
                    palette::STATUS_TEXT_BASELINE_Y,
                    palette::STATUS_FONT,
                    0xffffff,
                    0x000000,
                    &text,
                );
            }
        }
        self.backend.flush();
    }
}

/// Local time in `ctime(3)` form, without the trailing newline `ctime`
/// appends.
fn format_ctime() -> String {
    unsafe {
        let mut now: libc::time_t = 0;
        libc::time(&mut now);
        let rendered = libc::ctime(&now);
        if rendered.is_null() {
            return String::new();
        }
        std::ffi::CStr::from_ptr(rendered).to_string_lossy().trim_end().to_string()
    }
}
