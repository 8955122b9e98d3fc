//! End-to-end tests against a `RecordingBackend`: no real X server is
//! needed to exercise the layout engine's tree invariants and the
//! split/destroy/cycle algorithms.

use tilewm::engine::{LayoutEngine, SplitDirection};
use tilewm::node::{NodeKind, ScreenDescriptor, WindowHandle};
use tilewm::palette::{self, Palette};
use tilewm::testing::{RecordedCall, RecordingBackend};

fn new_engine() -> (LayoutEngine<RecordingBackend>, WindowHandle) {
    let mut engine = LayoutEngine::new(RecordingBackend::new(), Palette::default(), palette::BORDER_TILE);
    let root = WindowHandle(1);
    engine.register_screen(ScreenDescriptor { root, width: 1920, height: 1080, root_visual: 0 });
    engine.render_all();
    (engine, root)
}

fn child_of_kind(engine: &LayoutEngine<RecordingBackend>, parent: WindowHandle, kind: NodeKind) -> WindowHandle {
    engine
        .lookup(parent)
        .unwrap()
        .children
        .values()
        .copied()
        .find(|&h| engine.lookup(h).unwrap().kind == kind)
        .unwrap_or_else(|| panic!("no {:?} child under {}", kind, parent))
}

fn collect_tiles(engine: &LayoutEngine<RecordingBackend>, start: WindowHandle, out: &mut Vec<WindowHandle>) {
    let node = engine.lookup(start).unwrap();
    if node.kind == NodeKind::Tile {
        out.push(start);
    }
    let children: Vec<WindowHandle> = node.children.values().copied().collect();
    for child in children {
        collect_tiles(engine, child, out);
    }
}

fn is_mapped(engine: &LayoutEngine<RecordingBackend>, handle: WindowHandle) -> bool {
    engine
        .backend()
        .calls
        .iter()
        .rev()
        .find_map(|c| match c {
            RecordedCall::Map(h) if *h == handle => Some(true),
            RecordedCall::Unmap(h) if *h == handle => Some(false),
            _ => None,
        })
        .unwrap_or(false)
}

fn active_tile_among(engine: &LayoutEngine<RecordingBackend>, tiles: &[WindowHandle]) -> WindowHandle {
    let active_colour = Palette::default().tile_active_border;
    *tiles
        .iter()
        .find(|&&t| engine.backend().border_colour_of(t) == Some(active_colour))
        .expect("no tile carries the active border colour")
}

/// Recursively checks invariants 1 and 2 from §8: exactly one Status
/// and one WorkArea per Screen, exactly one TileFork per Workspace,
/// 1-or-2 children per TileFork, every child's stored parent pointer
/// agrees with its actual parent, and every child's geometry fits
/// within its parent's interior.
fn check_invariants(engine: &LayoutEngine<RecordingBackend>) {
    for &root in engine.screens() {
        check_node(engine, root);
    }
}

fn check_node(engine: &LayoutEngine<RecordingBackend>, handle: WindowHandle) {
    let node = engine.lookup(handle).unwrap();
    match node.kind {
        NodeKind::Screen => {
            let statuses = node.children.values().filter(|&&h| engine.lookup(h).unwrap().kind == NodeKind::Status).count();
            let workareas = node.children.values().filter(|&&h| engine.lookup(h).unwrap().kind == NodeKind::WorkArea).count();
            assert_eq!(statuses, 1, "screen {} must have exactly one Status child", handle);
            assert_eq!(workareas, 1, "screen {} must have exactly one WorkArea child", handle);
        }
        NodeKind::WorkArea => {
            assert!(node.children.count() >= 1, "work area {} has no workspace", handle);
            for &child in node.children.values() {
                assert_eq!(engine.lookup(child).unwrap().kind, NodeKind::Workspace);
            }
        }
        NodeKind::Workspace => {
            assert_eq!(node.children.count(), 1, "workspace {} must have exactly one top-level tile fork", handle);
        }
        NodeKind::TileFork => {
            let n = node.children.count();
            assert!(n == 1 || n == 2, "tile fork {} has {} children", handle, n);
            if n == 1 {
                let only = *node.children.values().next().unwrap();
                assert_eq!(
                    engine.lookup(only).unwrap().kind,
                    NodeKind::Tile,
                    "tile fork {} has a single child that is not a Tile",
                    handle
                );
            }
        }
        _ => {}
    }

    let children: Vec<WindowHandle> = node.children.values().copied().collect();
    let parent_geometry = node.geometry;
    let parent_kind = node.kind;
    for child in children {
        let child_node = engine.lookup(child).unwrap();
        assert_eq!(child_node.parent, handle, "child {} does not point back at parent {}", child, handle);

        if parent_kind != NodeKind::Screen {
            let interior_w = parent_geometry.interior_width();
            let interior_h = parent_geometry.interior_height();
            let extent_w = child_node.geometry.x.max(0) as u32 + child_node.geometry.width + 2 * child_node.geometry.border_width;
            let extent_h = child_node.geometry.y.max(0) as u32 + child_node.geometry.height + 2 * child_node.geometry.border_width;
            assert!(extent_w <= interior_w, "child {} of {} overflows width: {} > {}", child, handle, extent_w, interior_w);
            assert!(extent_h <= interior_h, "child {} of {} overflows height: {} > {}", child, handle, extent_h, interior_h);
        }

        check_node(engine, child);
    }
}

#[test]
fn s1_register_screen_builds_expected_shape() {
    let (engine, root) = new_engine();
    let status = child_of_kind(&engine, root, NodeKind::Status);
    let workarea = child_of_kind(&engine, root, NodeKind::WorkArea);
    let workspace = child_of_kind(&engine, workarea, NodeKind::Workspace);
    let tilefork = child_of_kind(&engine, workspace, NodeKind::TileFork);
    let tile = child_of_kind(&engine, tilefork, NodeKind::Tile);

    let status_geom = engine.lookup(status).unwrap().geometry;
    assert_eq!((status_geom.x, status_geom.y), (0, 0));
    assert_eq!(status_geom.height, palette::STATUS_HEIGHT);

    let workarea_geom = engine.lookup(workarea).unwrap().geometry;
    assert_eq!(workarea_geom.y, palette::STATUS_HEIGHT as i32);

    let workspace_geom = engine.lookup(workspace).unwrap().geometry;
    assert_eq!(workspace_geom.width, workarea_geom.interior_width());
    assert_eq!(workspace_geom.height, workarea_geom.interior_height());

    let tilefork_geom = engine.lookup(tilefork).unwrap().geometry;
    assert_eq!(tilefork_geom.width, workspace_geom.interior_width());
    assert_eq!(tilefork_geom.height, workspace_geom.interior_height());

    let tile_geom = engine.lookup(tile).unwrap().geometry;
    assert_eq!(tile_geom.width, tilefork_geom.interior_width());
    assert_eq!(tile_geom.height, tilefork_geom.interior_height());

    check_invariants(&engine);
}

#[test]
fn s2_horizontal_split_produces_two_tiles_spanning_workspace_height() {
    let (mut engine, root) = new_engine();
    engine.tile_split(root, SplitDirection::Horizontal);

    let workarea = child_of_kind(&engine, root, NodeKind::WorkArea);
    let workspace = child_of_kind(&engine, workarea, NodeKind::Workspace);
    let workspace_geom = engine.lookup(workspace).unwrap().geometry;

    let mut tiles = Vec::new();
    collect_tiles(&engine, workspace, &mut tiles);
    assert_eq!(tiles.len(), 2);

    for &t in &tiles {
        let g = engine.lookup(t).unwrap().geometry;
        assert_eq!(g.width, workspace_geom.interior_width());
    }
    let total_height: u32 = tiles
        .iter()
        .map(|&t| {
            let g = engine.lookup(t).unwrap().geometry;
            g.height + 2 * g.border_width
        })
        .sum();
    assert_eq!(total_height, workspace_geom.interior_height());

    check_invariants(&engine);
}

#[test]
fn s3_second_split_yields_three_tiles() {
    let (mut engine, root) = new_engine();
    engine.tile_split(root, SplitDirection::Horizontal);
    engine.tile_split(root, SplitDirection::Vertical);

    let workarea = child_of_kind(&engine, root, NodeKind::WorkArea);
    let workspace = child_of_kind(&engine, workarea, NodeKind::Workspace);
    let mut tiles = Vec::new();
    collect_tiles(&engine, workspace, &mut tiles);
    assert_eq!(tiles.len(), 3);

    let active = active_tile_among(&engine, &tiles);
    let parent = engine.lookup(active).unwrap().parent;
    let siblings: Vec<WindowHandle> = engine
        .lookup(parent)
        .unwrap()
        .children
        .values()
        .copied()
        .filter(|&h| h != active)
        .collect();
    assert_eq!(siblings.len(), 1);
    let sibling_geom = engine.lookup(siblings[0]).unwrap().geometry;
    let active_geom = engine.lookup(active).unwrap().geometry;
    assert_eq!(sibling_geom.height, active_geom.height);

    check_invariants(&engine);
}

#[test]
fn s4_destroying_both_splits_returns_to_one_tile() {
    let (mut engine, root) = new_engine();
    engine.tile_split(root, SplitDirection::Horizontal);
    engine.tile_split(root, SplitDirection::Vertical);
    engine.tile_destroy(root);
    engine.tile_destroy(root);

    let workarea = child_of_kind(&engine, root, NodeKind::WorkArea);
    let workspace = child_of_kind(&engine, workarea, NodeKind::Workspace);
    let workspace_geom = engine.lookup(workspace).unwrap().geometry;
    let mut tiles = Vec::new();
    collect_tiles(&engine, workspace, &mut tiles);
    assert_eq!(tiles.len(), 1);

    let tile_geom = engine.lookup(tiles[0]).unwrap().geometry;
    assert_eq!(tile_geom.width, workspace_geom.interior_width());
    assert_eq!(tile_geom.height, workspace_geom.interior_height());

    check_invariants(&engine);
}

#[test]
fn s5_destroying_the_only_workspace_is_rejected() {
    let (mut engine, root) = new_engine();
    let workarea = child_of_kind(&engine, root, NodeKind::WorkArea);
    let workspace_before = child_of_kind(&engine, workarea, NodeKind::Workspace);

    engine.workspace_destroy(root);

    let workspace_after = child_of_kind(&engine, workarea, NodeKind::Workspace);
    assert_eq!(workspace_before, workspace_after);
    assert_eq!(engine.lookup(workarea).unwrap().children.count(), 1);
}

#[test]
fn s6_create_notify_attaches_exactly_one_client_sized_to_tile_interior() {
    let (mut engine, root) = new_engine();
    let workarea = child_of_kind(&engine, root, NodeKind::WorkArea);
    let workspace = child_of_kind(&engine, workarea, NodeKind::Workspace);
    let tilefork = child_of_kind(&engine, workspace, NodeKind::TileFork);
    let tile = child_of_kind(&engine, tilefork, NodeKind::Tile);

    let new_window = WindowHandle(9999);
    engine.client_attach(root, new_window);

    let clients: Vec<WindowHandle> = engine
        .lookup(tile)
        .unwrap()
        .children
        .values()
        .copied()
        .filter(|&h| engine.lookup(h).unwrap().kind == NodeKind::Client)
        .collect();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0], new_window);

    let tile_geom = engine.lookup(tile).unwrap().geometry;
    let client_geom = engine.lookup(new_window).unwrap().geometry;
    assert_eq!(client_geom.width, tile_geom.interior_width());
    assert_eq!(client_geom.height, tile_geom.interior_height());

    check_invariants(&engine);
}

#[test]
fn tile_next_then_tile_prev_returns_to_original_active_tile() {
    let (mut engine, root) = new_engine();
    engine.tile_split(root, SplitDirection::Horizontal);
    engine.tile_split(root, SplitDirection::Vertical);

    let workarea = child_of_kind(&engine, root, NodeKind::WorkArea);
    let workspace = child_of_kind(&engine, workarea, NodeKind::Workspace);
    let mut tiles = Vec::new();
    collect_tiles(&engine, workspace, &mut tiles);
    assert!(tiles.len() >= 2);

    let original = active_tile_among(&engine, &tiles);
    engine.tile_next(root);
    engine.tile_prev(root);
    let restored = active_tile_among(&engine, &tiles);
    assert_eq!(original, restored);
}

#[test]
fn workspace_next_is_a_permutation_over_all_workspaces() {
    let (mut engine, root) = new_engine();
    engine.workspace_create(root);
    engine.workspace_create(root);

    let workarea = child_of_kind(&engine, root, NodeKind::WorkArea);
    let workspaces: Vec<WindowHandle> = engine.lookup(workarea).unwrap().children.values().copied().collect();
    assert_eq!(workspaces.len(), 3);

    let find_current = |engine: &LayoutEngine<RecordingBackend>| {
        workspaces.iter().copied().find(|&w| is_mapped(engine, w)).expect("exactly one workspace should be mapped")
    };

    let start = find_current(&engine);
    let mut visited = vec![start];
    for _ in 0..workspaces.len() - 1 {
        engine.workspace_next(root);
        visited.push(find_current(&engine));
    }
    engine.workspace_next(root);
    assert_eq!(find_current(&engine), start, "cycling N times returns to the start");

    visited.sort_by_key(|h| h.0);
    visited.dedup();
    assert_eq!(visited.len(), workspaces.len(), "every workspace is visited exactly once");
}

#[test]
fn workspace_destroy_is_inverse_of_create() {
    let (mut engine, root) = new_engine();
    let workarea = child_of_kind(&engine, root, NodeKind::WorkArea);
    let before = engine.lookup(workarea).unwrap().children.count();

    engine.workspace_create(root);
    engine.workspace_destroy(root);

    let after = engine.lookup(workarea).unwrap().children.count();
    assert_eq!(before, after);
    check_invariants(&engine);
}

#[test]
fn client_detach_leaves_no_orphan_index_entries() {
    let (mut engine, root) = new_engine();
    let workarea = child_of_kind(&engine, root, NodeKind::WorkArea);
    let workspace = child_of_kind(&engine, workarea, NodeKind::Workspace);
    let tilefork = child_of_kind(&engine, workspace, NodeKind::TileFork);
    let tile = child_of_kind(&engine, tilefork, NodeKind::Tile);

    let window = WindowHandle(4242);
    engine.client_attach(root, window);
    engine.client_detach(window);

    assert!(engine.lookup(window).is_none());
    assert!(!engine.lookup(tile).unwrap().children.values().any(|&h| h == window));
}

#[test]
fn destroying_a_sibling_of_a_nested_split_rescales_its_grandchildren_and_splices_the_fork() {
    // root tile -> split H (top/bottom) -> move to bottom -> split V
    // (left/right) -> move back to top -> destroy the top tile. The
    // root fork's one surviving child is itself a two-child fork (the
    // nested left/right split); it must be spliced into the root fork
    // directly, its two children rescaled to the full workspace
    // interior rather than left sized for the half they used to
    // occupy.
    let (mut engine, root) = new_engine();
    engine.tile_split(root, SplitDirection::Horizontal);
    engine.tile_next(root);
    engine.tile_split(root, SplitDirection::Vertical);
    engine.tile_prev(root);
    engine.tile_destroy(root);

    let workarea = child_of_kind(&engine, root, NodeKind::WorkArea);
    let workspace = child_of_kind(&engine, workarea, NodeKind::Workspace);
    let root_fork = child_of_kind(&engine, workspace, NodeKind::TileFork);
    let workspace_geom = engine.lookup(workspace).unwrap().geometry;

    assert_eq!(engine.lookup(root_fork).unwrap().children.count(), 2);
    let children: Vec<WindowHandle> = engine.lookup(root_fork).unwrap().children.values().copied().collect();
    for &child in &children {
        assert_eq!(
            engine.lookup(child).unwrap().kind,
            NodeKind::Tile,
            "root fork's children must both be Tiles after the nested fork is spliced out"
        );
    }

    // The surviving pair was split vertically (left/right): both
    // fill the full workspace height, and their widths sum to it.
    for &child in &children {
        let g = engine.lookup(child).unwrap().geometry;
        assert_eq!(g.height, workspace_geom.interior_height());
    }
    let total_width: u32 = children
        .iter()
        .map(|&c| {
            let g = engine.lookup(c).unwrap().geometry;
            g.width + 2 * g.border_width
        })
        .sum();
    assert_eq!(total_width, workspace_geom.interior_width());

    check_invariants(&engine);
}

#[test]
fn tile_destroy_collapses_degenerate_tile_fork() {
    let (mut engine, root) = new_engine();
    engine.tile_split(root, SplitDirection::Horizontal);

    let workarea = child_of_kind(&engine, root, NodeKind::WorkArea);
    let workspace = child_of_kind(&engine, workarea, NodeKind::Workspace);
    let root_fork = child_of_kind(&engine, workspace, NodeKind::TileFork);

    engine.tile_destroy(root);

    // The surviving tile is re-parented directly under the workspace's
    // single top-level tile fork, not left under an intermediate one.
    assert_eq!(root_fork, child_of_kind(&engine, workspace, NodeKind::TileFork));
    assert_eq!(engine.lookup(root_fork).unwrap().children.count(), 1);
    check_invariants(&engine);
}
