//! A `DisplayBackend` that records calls instead of talking to an X
//! server. Used by the engine's own unit tests and by the top-level
//! integration tests, so the layout engine's invariants can be
//! exercised without a running X11 display — the reference crate has
//! no equivalent, since it only ever spoke to a live Xlib display.

use crate::backend::{ConfigureGeometry, DisplayBackend, WindowKindProfile};
use crate::node::WindowHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    CreateWindow { profile: WindowKindProfile, handle: WindowHandle, parent: WindowHandle },
    Map(WindowHandle),
    Unmap(WindowHandle),
    Raise(WindowHandle),
    Reparent(WindowHandle, WindowHandle),
    Configure(WindowHandle, ConfigureGeometry),
    SetBorderColour(WindowHandle, u32),
    SetBorderWidth(WindowHandle, u32),
    GrabKey(WindowHandle, u32, u32),
    DrawText(WindowHandle, String),
    Flush,
}

/// Records every call made against it; `next_id` hands out fake window
/// handles starting at a configurable base so tests can tell
/// backend-allocated handles apart from externally supplied ones (e.g.
/// a simulated client window).
pub struct RecordingBackend {
    pub calls: Vec<RecordedCall>,
    next_id: u64,
}

impl RecordingBackend {
    pub fn new() -> Self {
        RecordingBackend { calls: Vec::new(), next_id: 1000 }
    }

    pub fn border_colour_of(&self, handle: WindowHandle) -> Option<u32> {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                RecordedCall::SetBorderColour(h, rgb) if *h == handle => Some(*rgb),
                _ => None,
            })
    }

    pub fn last_geometry_of(&self, handle: WindowHandle) -> Option<ConfigureGeometry> {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                RecordedCall::Configure(h, geom) if *h == handle => Some(*geom),
                _ => None,
            })
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayBackend for RecordingBackend {
    fn new_window_id(&mut self) -> WindowHandle {
        self.next_id += 1;
        WindowHandle(self.next_id)
    }

    fn create_window(
        &mut self,
        profile: WindowKindProfile,
        handle: WindowHandle,
        parent: WindowHandle,
        _x: i32,
        _y: i32,
        _width: u32,
        _height: u32,
        _border_width: u32,
        _root_visual: u64,
        _background_pixel: u32,
        _border_pixel: u32,
    ) {
        self.calls.push(RecordedCall::CreateWindow { profile, handle, parent });
    }

    fn map(&mut self, handle: WindowHandle) {
        self.calls.push(RecordedCall::Map(handle));
    }

    fn unmap(&mut self, handle: WindowHandle) {
        self.calls.push(RecordedCall::Unmap(handle));
    }

    fn raise(&mut self, handle: WindowHandle) {
        self.calls.push(RecordedCall::Raise(handle));
    }

    fn reparent(&mut self, handle: WindowHandle, new_parent: WindowHandle) {
        self.calls.push(RecordedCall::Reparent(handle, new_parent));
    }

    fn configure(&mut self, handle: WindowHandle, geometry: ConfigureGeometry) {
        self.calls.push(RecordedCall::Configure(handle, geometry));
    }

    fn set_border_colour(&mut self, handle: WindowHandle, rgb: u32) {
        self.calls.push(RecordedCall::SetBorderColour(handle, rgb));
    }

    fn set_border_width(&mut self, handle: WindowHandle, px: u32) {
        self.calls.push(RecordedCall::SetBorderWidth(handle, px));
    }

    fn grab_key(&mut self, root: WindowHandle, modifier_mask: u32, keycode: u32) {
        self.calls.push(RecordedCall::GrabKey(root, modifier_mask, keycode));
    }

    fn resolve_keysym(&mut self, keycode: u32, _group: i32) -> u64 {
        keycode as u64
    }

    fn resolve_keycodes(&mut self, keysym: u64) -> Vec<u32> {
        vec![keysym as u32]
    }

    fn draw_text(
        &mut self,
        handle: WindowHandle,
        _x: i32,
        _y: i32,
        _font_name: &str,
        _fg: u32,
        _bg: u32,
        text: &str,
    ) {
        self.calls.push(RecordedCall::DrawText(handle, text.to_string()));
    }

    fn flush(&mut self) {
        self.calls.push(RecordedCall::Flush);
    }
}
