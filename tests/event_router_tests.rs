//! Exercises keybinding dispatch for both profiles, and the
//! notification side of event handling, against a `RecordingBackend`.

use tilewm::engine::LayoutEngine;
use tilewm::event_router::{EventRouter, KeybindingProfile, MOD_SUPER};
use tilewm::events::{InboundEvent, KeyPress};
use tilewm::node::{NodeKind, ScreenDescriptor, WindowHandle};
use tilewm::palette::{self, Palette};
use tilewm::testing::RecordingBackend;

fn new_engine() -> (LayoutEngine<RecordingBackend>, WindowHandle) {
    let mut engine = LayoutEngine::new(RecordingBackend::new(), Palette::default(), palette::BORDER_TILE);
    let root = WindowHandle(1);
    engine.register_screen(ScreenDescriptor { root, width: 1920, height: 1080, root_visual: 0 });
    engine.render_all();
    (engine, root)
}

fn press(letter: char) -> InboundEvent {
    InboundEvent::KeyPress(KeyPress { modifier_mask: MOD_SUPER, keycode: letter as u32 })
}

fn press_unmodified(letter: char) -> InboundEvent {
    InboundEvent::KeyPress(KeyPress { modifier_mask: 0, keycode: letter as u32 })
}

fn workspace_count(engine: &LayoutEngine<RecordingBackend>, root: WindowHandle) -> usize {
    let workarea = engine
        .lookup(root)
        .unwrap()
        .children
        .values()
        .copied()
        .find(|&h| engine.lookup(h).unwrap().kind == NodeKind::WorkArea)
        .unwrap();
    engine.lookup(workarea).unwrap().children.count()
}

#[test]
fn direct_profile_q_quits_immediately() {
    let (mut engine, root) = new_engine();
    let mut router = EventRouter::new(KeybindingProfile::Direct);
    assert!(router.is_running());
    router.handle_event(&mut engine, InboundEvent::KeyPress(KeyPress { modifier_mask: MOD_SUPER, keycode: 'q' as u32 }));
    assert!(!router.is_running());
    let _ = root;
}

#[test]
fn direct_profile_w_creates_a_workspace() {
    let (mut engine, root) = new_engine();
    let mut router = EventRouter::new(KeybindingProfile::Direct);
    let before = workspace_count(&engine, root);
    router.handle_event(&mut engine, press('w'));
    assert_eq!(workspace_count(&engine, root), before + 1);
}

#[test]
fn keys_without_super_modifier_are_ignored() {
    let (mut engine, root) = new_engine();
    let mut router = EventRouter::new(KeybindingProfile::Direct);
    let before = workspace_count(&engine, root);
    router.handle_event(&mut engine, press_unmodified('w'));
    assert_eq!(workspace_count(&engine, root), before);
    assert!(router.is_running());
}

#[test]
fn unbound_key_is_a_no_op() {
    let (mut engine, _root) = new_engine();
    let mut router = EventRouter::new(KeybindingProfile::Direct);
    router.handle_event(&mut engine, press('z'));
    assert!(router.is_running());
}

#[test]
fn modal_profile_requires_entering_a_mode_before_its_actions_fire() {
    let (mut engine, root) = new_engine();
    let mut router = EventRouter::new(KeybindingProfile::Modal);
    let before = workspace_count(&engine, root);

    // 'c' (WorkspaceCreate) is only bound inside Workspace mode, so
    // pressing it at top level must do nothing.
    router.handle_event(&mut engine, press('c'));
    assert_eq!(workspace_count(&engine, root), before);

    // Entering Workspace mode (via 'w') then pressing 'c' creates one.
    router.handle_event(&mut engine, press('w'));
    router.handle_event(&mut engine, press('c'));
    assert_eq!(workspace_count(&engine, root), before + 1);
}

#[test]
fn modal_profile_returns_to_top_level_mode_after_one_action() {
    let (mut engine, root) = new_engine();
    let mut router = EventRouter::new(KeybindingProfile::Modal);
    let before = workspace_count(&engine, root);

    router.handle_event(&mut engine, press('w'));
    router.handle_event(&mut engine, press('c'));
    assert_eq!(workspace_count(&engine, root), before + 1);

    // Mode should have reset to top level: 'c' alone (no longer valid
    // at top level) must not create a second workspace.
    router.handle_event(&mut engine, press('c'));
    assert_eq!(workspace_count(&engine, root), before + 1);
}

#[test]
fn modal_profile_unbound_key_inside_a_mode_falls_back_to_top_level() {
    let (mut engine, root) = new_engine();
    let mut router = EventRouter::new(KeybindingProfile::Modal);

    router.handle_event(&mut engine, press('w'));
    // 'z' is bound nowhere, so this must reset to top-level mode
    // rather than leaving the router stuck inside Workspace mode.
    router.handle_event(&mut engine, press('z'));
    let before = workspace_count(&engine, root);
    router.handle_event(&mut engine, press('c'));
    assert_eq!(workspace_count(&engine, root), before, "top level has no binding for 'c'");
}

#[test]
fn create_notify_attaches_a_client_exactly_once() {
    let (mut engine, root) = new_engine();
    let mut router = EventRouter::new(KeybindingProfile::Direct);
    let window = WindowHandle(777);

    router.handle_event(&mut engine, InboundEvent::CreateNotify { root, window });
    assert!(engine.lookup(window).is_some());
    let parent_before = engine.lookup(window).unwrap().parent;

    // A duplicate CreateNotify for the same window (X can redeliver)
    // must not attach it twice or move it to a different parent.
    router.handle_event(&mut engine, InboundEvent::CreateNotify { root, window });
    assert_eq!(engine.lookup(window).unwrap().parent, parent_before);
    assert_eq!(engine.lookup(parent_before).unwrap().children.values().filter(|&&h| h == window).count(), 1);
}

#[test]
fn destroy_notify_detaches_a_tracked_client() {
    let (mut engine, root) = new_engine();
    let mut router = EventRouter::new(KeybindingProfile::Direct);
    let window = WindowHandle(778);

    router.handle_event(&mut engine, InboundEvent::CreateNotify { root, window });
    assert!(engine.lookup(window).is_some());

    router.handle_event(&mut engine, InboundEvent::DestroyNotify(window));
    assert!(engine.lookup(window).is_none());
}

#[test]
fn grab_keys_registers_every_distinct_keysym_in_the_profile() {
    let (mut engine, root) = new_engine();
    let router = EventRouter::new(KeybindingProfile::Modal);
    router.grab_keys(&mut engine, root);

    let grabbed: std::collections::HashSet<u32> = engine
        .backend()
        .calls
        .iter()
        .filter_map(|c| match c {
            tilewm::testing::RecordedCall::GrabKey(_, _, keycode) => Some(*keycode),
            _ => None,
        })
        .collect();

    for letter in ['q', 'w', 't', 'r', 'c', 'd', 'n', 'p', 'h', 'v'] {
        assert!(grabbed.contains(&(letter as u32)), "missing grab for {:?}", letter);
    }
}
