//! Classifies inbound display events, dispatches keybindings, and ticks
//! the status model. Grounded in `event.c`'s dispatch loop and key
//! table; generalised to support both the original's flat modifier+key
//! scheme and a leader/mode scheme this crate adds as a second
//! profile (see `SPEC_FULL.md` §4.6).

use std::collections::HashSet;

use log::{info, trace, warn};

use crate::backend::DisplayBackend;
use crate::engine::{LayoutEngine, SplitDirection};
use crate::events::{InboundEvent, KeyPress};
use crate::node::WindowHandle;
use crate::spawn;

/// `Mod4Mask`: the modifier the shipped default binds every command to.
/// Kept as a bare constant here (rather than pulled from `x11::xlib`)
/// so the event router stays off the `x11` crate entirely; only the
/// backend is allowed to know about raw X constants.
pub const MOD_SUPER: u32 = 1 << 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeybindingProfile {
    Direct,
    Modal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    None,
    Workspace,
    Tile,
    Run,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Quit,
    SpawnTerminal,
    WorkspaceCreate,
    WorkspaceDestroy,
    WorkspaceNext,
    WorkspacePrev,
    TileDestroy,
    TileNext,
    TilePrev,
    SplitHorizontal,
    SplitVertical,
    EnterWorkspaceMode,
    EnterTileMode,
    EnterRunMode,
}

struct Binding {
    mode: Mode,
    keysym: u64,
    action: Action,
}

fn direct_bindings() -> Vec<Binding> {
    vec![
        Binding { mode: Mode::None, keysym: 'q' as u64, action: Action::Quit },
        Binding { mode: Mode::None, keysym: 't' as u64, action: Action::SpawnTerminal },
        Binding { mode: Mode::None, keysym: 'w' as u64, action: Action::WorkspaceCreate },
        Binding { mode: Mode::None, keysym: 'd' as u64, action: Action::WorkspaceDestroy },
        Binding { mode: Mode::None, keysym: 'h' as u64, action: Action::SplitHorizontal },
        Binding { mode: Mode::None, keysym: 'v' as u64, action: Action::SplitVertical },
        Binding { mode: Mode::None, keysym: 'n' as u64, action: Action::TileNext },
        Binding { mode: Mode::None, keysym: 'p' as u64, action: Action::TilePrev },
    ]
}

fn modal_bindings() -> Vec<Binding> {
    vec![
        Binding { mode: Mode::None, keysym: 'q' as u64, action: Action::Quit },
        Binding { mode: Mode::None, keysym: 'w' as u64, action: Action::EnterWorkspaceMode },
        Binding { mode: Mode::None, keysym: 't' as u64, action: Action::EnterTileMode },
        Binding { mode: Mode::None, keysym: 'r' as u64, action: Action::EnterRunMode },
        Binding { mode: Mode::Workspace, keysym: 'c' as u64, action: Action::WorkspaceCreate },
        Binding { mode: Mode::Workspace, keysym: 'd' as u64, action: Action::WorkspaceDestroy },
        Binding { mode: Mode::Workspace, keysym: 'n' as u64, action: Action::WorkspaceNext },
        Binding { mode: Mode::Workspace, keysym: 'p' as u64, action: Action::WorkspacePrev },
        Binding { mode: Mode::Tile, keysym: 'd' as u64, action: Action::TileDestroy },
        Binding { mode: Mode::Tile, keysym: 'n' as u64, action: Action::TileNext },
        Binding { mode: Mode::Tile, keysym: 'p' as u64, action: Action::TilePrev },
        Binding { mode: Mode::Tile, keysym: 'h' as u64, action: Action::SplitHorizontal },
        Binding { mode: Mode::Tile, keysym: 'v' as u64, action: Action::SplitVertical },
        Binding { mode: Mode::Run, keysym: 't' as u64, action: Action::SpawnTerminal },
    ]
}

/// Single-threaded event dispatcher. Mode state (for the modal
/// profile) is private to this component, not the layout engine.
pub struct EventRouter {
    profile: KeybindingProfile,
    bindings: Vec<Binding>,
    mode: Mode,
    running: bool,
    tracked_clients: HashSet<WindowHandle>,
}

impl EventRouter {
    pub fn new(profile: KeybindingProfile) -> Self {
        let bindings = match profile {
            KeybindingProfile::Direct => direct_bindings(),
            KeybindingProfile::Modal => modal_bindings(),
        };
        EventRouter { profile, bindings, mode: Mode::None, running: true, tracked_clients: HashSet::new() }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Grab every keysym this profile's table references, across all
    /// its keycode mappings, on `root`. Called once per registered
    /// screen.
    pub fn grab_keys<B: DisplayBackend>(&self, engine: &mut LayoutEngine<B>, root: WindowHandle) {
        let mut seen = HashSet::new();
        for binding in &self.bindings {
            if !seen.insert(binding.keysym) {
                continue;
            }
            for keycode in engine.backend_mut().resolve_keycodes(binding.keysym) {
                engine.backend_mut().grab_key(root, MOD_SUPER, keycode);
            }
        }
    }

    pub fn handle_event<B: DisplayBackend>(&mut self, engine: &mut LayoutEngine<B>, event: InboundEvent) {
        trace!("dispatching event {:?}", event);
        match event {
            InboundEvent::CreateNotify { root, window } => {
                if !self.tracked_clients.contains(&window) && engine.lookup(window).is_none() {
                    engine.client_attach(root, window);
                    self.tracked_clients.insert(window);
                }
            }
            InboundEvent::DestroyNotify(window) => {
                engine.client_detach(window);
                self.tracked_clients.remove(&window);
            }
            InboundEvent::MapRequest(window) => {
                engine.backend_mut().map(window);
            }
            InboundEvent::ConfigureNotify(window) => {
                if engine.lookup(window).is_some() {
                    engine.window_resized(window);
                }
            }
            InboundEvent::EnterNotify(window) => {
                engine.tile_set_active(window);
            }
            InboundEvent::KeyPress(key) => self.handle_key(engine, key),
            InboundEvent::Unknown => warn!("dropping unrecognised event type"),
        }
    }

    fn handle_key<B: DisplayBackend>(&mut self, engine: &mut LayoutEngine<B>, key: KeyPress) {
        if key.modifier_mask & MOD_SUPER == 0 {
            return;
        }
        let keysym = engine.backend_mut().resolve_keysym(key.keycode, 0);

        let binding = self.bindings.iter().find(|b| b.mode == self.mode && b.keysym == keysym);
        let action = match binding {
            Some(b) => b.action,
            None => {
                if self.profile == KeybindingProfile::Modal {
                    self.mode = Mode::None;
                }
                return;
            }
        };

        if self.profile == KeybindingProfile::Modal && self.mode != Mode::None {
            self.mode = Mode::None;
        }

        let root = match engine.active_screen() {
            Some(root) => root,
            None => return,
        };

        match action {
            Action::Quit => {
                info!("quit requested");
                self.running = false;
            }
            Action::SpawnTerminal => spawn::run_terminal(),
            Action::WorkspaceCreate => engine.workspace_create(root),
            Action::WorkspaceDestroy => engine.workspace_destroy(root),
            Action::WorkspaceNext => engine.workspace_next(root),
            Action::WorkspacePrev => engine.workspace_prev(root),
            Action::TileDestroy => engine.tile_destroy(root),
            Action::TileNext => engine.tile_next(root),
            Action::TilePrev => engine.tile_prev(root),
            Action::SplitHorizontal => engine.tile_split(root, SplitDirection::Horizontal),
            Action::SplitVertical => engine.tile_split(root, SplitDirection::Vertical),
            Action::EnterWorkspaceMode => self.mode = Mode::Workspace,
            Action::EnterTileMode => self.mode = Mode::Tile,
            Action::EnterRunMode => self.mode = Mode::Run,
        }

        engine.refresh_status();
    }
}
