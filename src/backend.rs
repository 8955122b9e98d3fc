//! The seam between the layout engine and the display server. The
//! engine only ever talks to a `Box<dyn DisplayBackend>` (or a
//! generic `B: DisplayBackend`); it never touches `x11`/`libc`
//! directly. Grounded in the reference crate's `Rdwm::init`/`run`,
//! which open the Xlib display, grab the root window and drive the
//! event loop directly — that raw Xlib code lives here instead, behind
//! the trait.

use crate::node::WindowHandle;

/// Selects the background/border colour defaults a freshly created
/// window should carry (see the colour-defaults table in §6 of the
/// spec). The backend applies these at `create_window` time; the
/// engine may still override the border colour later via
/// `set_border_colour` (e.g. tile activation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKindProfile {
    Screen,
    Status,
    WorkArea,
    Workspace,
    TileFork,
    Tile,
    Frame,
    Client,
}

/// Partial configure request: any field left `None` is left unchanged
/// on the display-server side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigureGeometry {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub border_width: Option<u32>,
}

impl ConfigureGeometry {
    pub fn all(x: i32, y: i32, width: u32, height: u32) -> Self {
        ConfigureGeometry {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
            border_width: None,
        }
    }
}

/// Display-server primitives the layout engine and event router may
/// call. Every call here is synchronous from the engine's point of
/// view: by the time `flush()` returns, prior calls have taken effect
/// on the server.
pub trait DisplayBackend {
    /// Allocate a fresh display-server window id.
    fn new_window_id(&mut self) -> WindowHandle;

    /// Create a window of the given handle under `parent`, with the
    /// background/border colour defaults for `profile`.
    #[allow(clippy::too_many_arguments)]
    fn create_window(
        &mut self,
        profile: WindowKindProfile,
        handle: WindowHandle,
        parent: WindowHandle,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        border_width: u32,
        root_visual: u64,
        background_pixel: u32,
        border_pixel: u32,
    );

    fn map(&mut self, handle: WindowHandle);
    fn unmap(&mut self, handle: WindowHandle);
    fn raise(&mut self, handle: WindowHandle);
    fn reparent(&mut self, handle: WindowHandle, new_parent: WindowHandle);

    fn configure(&mut self, handle: WindowHandle, geometry: ConfigureGeometry);

    fn set_border_colour(&mut self, handle: WindowHandle, rgb: u32);
    fn set_border_width(&mut self, handle: WindowHandle, px: u32);

    fn grab_key(&mut self, root: WindowHandle, modifier_mask: u32, keycode: u32);

    /// Translate a keycode (in the given keyboard group) to a keysym.
    fn resolve_keysym(&mut self, keycode: u32, group: i32) -> u64;

    /// All keycodes that could produce the given keysym.
    fn resolve_keycodes(&mut self, keysym: u64) -> Vec<u32>;

    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &mut self,
        handle: WindowHandle,
        x: i32,
        y: i32,
        font_name: &str,
        fg: u32,
        bg: u32,
        text: &str,
    );

    fn flush(&mut self);
}

#[cfg(not(test))]
pub mod xlib {
    //! The real Xlib-backed implementation. Grounded in the reference
    //! crate's raw `x11::xlib` calls (`XOpenDisplay`, `XCreateSimpleWindow`,
    //! `XSelectInput`, `XGrabKey`, `XReparentWindow`, …); the difference is
    //! that every call here goes through `DisplayBackend` rather than being
    //! inlined into the window-manager struct itself.

    use super::{ConfigureGeometry, DisplayBackend, WindowKindProfile};
    use crate::error::BackendError;
    use crate::node::WindowHandle;
    use libc::{c_int, c_uint};
    use log::{error, info, trace, warn};
    use std::ffi::CString;
    use std::sync::atomic::{AtomicBool, Ordering};
    use x11::xlib;

    /// Set by [`on_wm_detected`] when `XSync` surfaces a `BadAccess` from
    /// a substructure-redirect select, meaning some other client already
    /// owns the role. Global because Xlib's error handler is itself a
    /// process-wide callback, not a per-display one.
    static WM_DETECTED: AtomicBool = AtomicBool::new(false);

    unsafe extern "C" fn on_wm_detected(
        _display: *mut xlib::Display,
        event: *mut xlib::XErrorEvent,
    ) -> c_int {
        WM_DETECTED.store(true, Ordering::SeqCst);
        error!("another window manager detected (X error code {})", (*event).error_code);
        0
    }

    pub struct XlibBackend {
        display: *mut xlib::Display,
    }

    impl XlibBackend {
        /// Opens the display named by `$DISPLAY` (or the platform default
        /// when unset, exactly as `XOpenDisplay(NULL)` resolves it).
        pub fn open() -> Result<Self, BackendError> {
            let display = unsafe { xlib::XOpenDisplay(std::ptr::null()) };
            if display.is_null() {
                return Err(BackendError::Fatal);
            }
            Ok(XlibBackend { display })
        }

        pub fn raw_display(&self) -> *mut xlib::Display {
            self.display
        }

        pub fn default_screen_descriptor(&self) -> (WindowHandle, u32, u32, u64) {
            unsafe {
                let screen_num = xlib::XDefaultScreen(self.display);
                let screen = xlib::XScreenOfDisplay(self.display, screen_num);
                let root = xlib::XDefaultRootWindow(self.display);
                let visual = xlib::XDefaultVisual(self.display, screen_num);
                (
                    WindowHandle(root),
                    (*screen).width as u32,
                    (*screen).height as u32,
                    visual as u64,
                )
            }
        }

        /// Briefly request substructure redirection on `root` and check
        /// whether the X server answered with `BadAccess`, which is how
        /// Xlib tells a would-be window manager that another one already
        /// holds that role. Grounded in the reference crate's
        /// `Rdwm::run`/`on_wm_detected`.
        pub fn detect_existing_wm(&mut self, root: WindowHandle) -> Result<(), BackendError> {
            WM_DETECTED.store(false, Ordering::SeqCst);
            unsafe {
                xlib::XSetErrorHandler(Some(on_wm_detected));
                xlib::XSelectInput(self.display, root.0, xlib::SubstructureRedirectMask);
                xlib::XSync(self.display, false as c_int);
            }
            if WM_DETECTED.load(Ordering::SeqCst) {
                Err(BackendError::AnotherWmDetected)
            } else {
                Ok(())
            }
        }

        pub fn select_root_input(&mut self, root: WindowHandle) {
            unsafe {
                xlib::XSelectInput(
                    self.display,
                    root.0,
                    xlib::SubstructureRedirectMask
                        | xlib::SubstructureNotifyMask
                        | xlib::FocusChangeMask,
                );
                xlib::XSync(self.display, false as c_int);
            }
        }

        pub fn next_event(&mut self) -> xlib::XEvent {
            unsafe {
                let mut event: xlib::XEvent = std::mem::MaybeUninit::zeroed().assume_init();
                xlib::XNextEvent(self.display, &mut event);
                event
            }
        }

        pub fn pending(&mut self) -> i32 {
            unsafe { xlib::XPending(self.display) }
        }

        pub fn connection_fd(&self) -> i32 {
            unsafe { xlib::XConnectionNumber(self.display) }
        }

        /// Classify a raw Xlib event into the backend-neutral vocabulary
        /// the event router understands. Everything above this seam is
        /// oblivious to `x11::xlib`.
        pub fn translate_event(&mut self, event: &xlib::XEvent) -> crate::events::InboundEvent {
            use crate::events::{InboundEvent, KeyPress};
            unsafe {
                match event.type_ {
                    xlib::CreateNotify => InboundEvent::CreateNotify {
                        root: WindowHandle(event.create_window.parent),
                        window: WindowHandle(event.create_window.window),
                    },
                    xlib::DestroyNotify => {
                        InboundEvent::DestroyNotify(WindowHandle(event.destroy_window.window))
                    }
                    xlib::MapRequest => {
                        InboundEvent::MapRequest(WindowHandle(event.map_request.window))
                    }
                    xlib::ConfigureNotify => {
                        InboundEvent::ConfigureNotify(WindowHandle(event.configure.window))
                    }
                    xlib::EnterNotify => {
                        InboundEvent::EnterNotify(WindowHandle(event.crossing.window))
                    }
                    xlib::KeyPress => InboundEvent::KeyPress(KeyPress {
                        modifier_mask: event.key.state,
                        keycode: event.key.keycode,
                    }),
                    _ => InboundEvent::Unknown,
                }
            }
        }
    }

    impl Drop for XlibBackend {
        fn drop(&mut self) {
            unsafe {
                xlib::XCloseDisplay(self.display);
            }
            info!("closed display connection");
        }
    }

    impl DisplayBackend for XlibBackend {
        /// Reserves a fresh window id by actually creating a minimal 1x1
        /// window at the display's default root. Unlike XCB, Xlib has no
        /// "generate id" primitive separate from window creation; the
        /// window is reparented and resized into its real place by the
        /// following `create_window` call.
        fn new_window_id(&mut self) -> WindowHandle {
            let root = unsafe { xlib::XDefaultRootWindow(self.display) };
            let handle = unsafe { xlib::XCreateSimpleWindow(self.display, root, 0, 0, 1, 1, 0, 0, 0) };
            WindowHandle(handle)
        }

        fn create_window(
            &mut self,
            profile: WindowKindProfile,
            handle: WindowHandle,
            parent: WindowHandle,
            x: i32,
            y: i32,
            width: u32,
            height: u32,
            border_width: u32,
            _root_visual: u64,
            background_pixel: u32,
            border_pixel: u32,
        ) {
            trace!(
                "create_window {:?} handle={} parent={} geom=({},{},{},{}) border={}",
                profile, handle, parent, x, y, width, height, border_width
            );
            unsafe {
                xlib::XReparentWindow(self.display, handle.0, parent.0, x, y);
                let mut changes: xlib::XWindowChanges = std::mem::zeroed();
                changes.x = x;
                changes.y = y;
                changes.width = width.max(1) as c_int;
                changes.height = height.max(1) as c_int;
                changes.border_width = border_width as c_int;
                let mask = xlib::CWX
                    | xlib::CWY
                    | xlib::CWWidth
                    | xlib::CWHeight
                    | xlib::CWBorderWidth;
                xlib::XConfigureWindow(self.display, handle.0, mask as u32, &mut changes);

                let mut attrs: xlib::XSetWindowAttributes = std::mem::zeroed();
                attrs.background_pixel = background_pixel as u64;
                attrs.border_pixel = border_pixel as u64;
                xlib::XChangeWindowAttributes(
                    self.display,
                    handle.0,
                    xlib::CWBackPixel | xlib::CWBorderPixel,
                    &mut attrs,
                );
            }
        }

        fn map(&mut self, handle: WindowHandle) {
            trace!("map {}", handle);
            unsafe { xlib::XMapWindow(self.display, handle.0) };
        }

        fn unmap(&mut self, handle: WindowHandle) {
            trace!("unmap {}", handle);
            unsafe { xlib::XUnmapWindow(self.display, handle.0) };
        }

        fn raise(&mut self, handle: WindowHandle) {
            unsafe { xlib::XRaiseWindow(self.display, handle.0) };
        }

        fn reparent(&mut self, handle: WindowHandle, new_parent: WindowHandle) {
            trace!("reparent {} under {}", handle, new_parent);
            unsafe { xlib::XReparentWindow(self.display, handle.0, new_parent.0, 0, 0) };
        }

        fn configure(&mut self, handle: WindowHandle, geometry: ConfigureGeometry) {
            trace!("configure {} {:?}", handle, geometry);
            let mut mask: u32 = 0;
            let mut changes: xlib::XWindowChanges = unsafe { std::mem::zeroed() };
            if let Some(x) = geometry.x {
                changes.x = x;
                mask |= xlib::CWX as u32;
            }
            if let Some(y) = geometry.y {
                changes.y = y;
                mask |= xlib::CWY as u32;
            }
            if let Some(w) = geometry.width {
                changes.width = w as c_int;
                mask |= xlib::CWWidth as u32;
            }
            if let Some(h) = geometry.height {
                changes.height = h as c_int;
                mask |= xlib::CWHeight as u32;
            }
            if let Some(bw) = geometry.border_width {
                changes.border_width = bw as c_int;
                mask |= xlib::CWBorderWidth as u32;
            }
            unsafe { xlib::XConfigureWindow(self.display, handle.0, mask, &mut changes) };
        }

        fn set_border_colour(&mut self, handle: WindowHandle, rgb: u32) {
            trace!("set_border_colour {} #{:06x}", handle, rgb);
            unsafe { xlib::XSetWindowBorder(self.display, handle.0, rgb as u64) };
        }

        fn set_border_width(&mut self, handle: WindowHandle, px: u32) {
            self.configure(
                handle,
                ConfigureGeometry { border_width: Some(px), ..Default::default() },
            );
        }

        fn grab_key(&mut self, root: WindowHandle, modifier_mask: u32, keycode: u32) {
            unsafe {
                xlib::XGrabKey(
                    self.display,
                    keycode as c_int,
                    modifier_mask as c_uint,
                    root.0,
                    false as c_int,
                    xlib::GrabModeAsync,
                    xlib::GrabModeAsync,
                );
            }
        }

        fn resolve_keysym(&mut self, keycode: u32, group: i32) -> u64 {
            unsafe { xlib::XkbKeycodeToKeysym(self.display, keycode as u8, group, 0) as u64 }
        }

        fn resolve_keycodes(&mut self, keysym: u64) -> Vec<u32> {
            let keycode = unsafe { xlib::XKeysymToKeycode(self.display, keysym) };
            if keycode == 0 {
                Vec::new()
            } else {
                vec![keycode as u32]
            }
        }

        fn draw_text(
            &mut self,
            handle: WindowHandle,
            x: i32,
            y: i32,
            font_name: &str,
            fg: u32,
            bg: u32,
            text: &str,
        ) {
            trace!("draw_text {} {:?}", handle, text);
            unsafe {
                let font_cstr = match CString::new(font_name) {
                    Ok(s) => s,
                    Err(_) => return,
                };
                let font = xlib::XLoadQueryFont(self.display, font_cstr.as_ptr());
                if font.is_null() {
                    warn!("could not load font {:?}", font_name);
                    return;
                }

                let gc = xlib::XCreateGC(self.display, handle.0, 0, std::ptr::null_mut());
                xlib::XSetFont(self.display, gc, (*font).fid);
                xlib::XSetForeground(self.display, gc, fg as u64);
                xlib::XSetBackground(self.display, gc, bg as u64);

                let text_cstr = match CString::new(text) {
                    Ok(s) => s,
                    Err(_) => {
                        xlib::XFreeGC(self.display, gc);
                        xlib::XFreeFont(self.display, font);
                        return;
                    }
                };
                xlib::XDrawImageString(
                    self.display,
                    handle.0,
                    gc,
                    x,
                    y,
                    text_cstr.as_ptr(),
                    text.len() as c_int,
                );

                xlib::XFreeGC(self.display, gc);
                xlib::XFreeFont(self.display, font);
            }
        }

        fn flush(&mut self) {
            unsafe { xlib::XFlush(self.display) };
        }
    }
}
