//! Backend-neutral event vocabulary. The concrete `XEvent` decoding
//! lives next to `XlibBackend` in [`crate::backend::xlib`]; everything
//! above the backend seam (the event router, the engine) only ever
//! sees this enum.

use crate::node::WindowHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub modifier_mask: u32,
    pub keycode: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundEvent {
    /// `root` is the window the creation was reported under (the
    /// screen root, since the backend selects `SubstructureNotify` only
    /// there); `window` is the newly created window.
    CreateNotify { root: WindowHandle, window: WindowHandle },
    DestroyNotify(WindowHandle),
    MapRequest(WindowHandle),
    ConfigureNotify(WindowHandle),
    EnterNotify(WindowHandle),
    KeyPress(KeyPress),
    Unknown,
}
