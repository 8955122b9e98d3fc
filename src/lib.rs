//! Core of a tiling window manager for X11: the layout tree, the
//! layout engine that mutates it, the backend seam that talks to the
//! display server, and the event router that ties commands and
//! notifications together. The binary in `main.rs` is a thin driver
//! over this library.

pub mod backend;
pub mod colour;
pub mod config;
pub mod engine;
pub mod error;
pub mod event_router;
pub mod events;
pub mod id;
pub mod node;
pub mod palette;
pub mod spawn;
pub mod testing;
pub mod tree_index;
