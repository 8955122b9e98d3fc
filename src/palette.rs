//! Border/background colour and width defaults (see the colour-defaults
//! table in §6 of the spec). `Config` may override individual fields;
//! anything left unset falls back to these.

use rand::Rng;

pub const STATUS_HEIGHT: u32 = 16;
pub const STATUS_FONT: &str = "7x13";
pub const STATUS_TEXT_BASELINE_Y: i32 = 12;

pub const BORDER_SCREEN: u32 = 0;
pub const BORDER_STATUS: u32 = 1;
pub const BORDER_WORKAREA: u32 = 1;
pub const BORDER_WORKSPACE: u32 = 1;
pub const BORDER_TILEFORK: u32 = 0;
pub const BORDER_TILE: u32 = 1;
pub const BORDER_FRAME: u32 = 1;
pub const BORDER_CLIENT: u32 = 0;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub screen_background: u32,
    pub status_background: u32,
    pub status_border: u32,
    pub workarea_background: u32,
    pub workarea_border: u32,
    pub workspace_background: u32,
    pub tile_background: u32,
    pub tile_inactive_border: u32,
    pub tile_new_border: u32,
    pub tile_active_border: u32,
    pub client_background: u32,
    pub client_border: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            screen_background: 0x335599,
            status_background: 0x000000,
            status_border: 0x0000ff,
            workarea_background: 0x000000,
            workarea_border: 0x0000ff,
            workspace_background: 0x000000,
            tile_background: 0x000000,
            tile_inactive_border: 0x335599,
            tile_new_border: 0xffffff,
            tile_active_border: 0xff0000,
            client_background: 0x000000,
            client_border: 0xffffff,
        }
    }
}

/// A fresh random 24-bit colour for a newly created workspace's border,
/// grounded in the original C `window_create_workspace`'s use of
/// `arc4random()` as the border-pixel value.
pub fn random_workspace_border() -> u32 {
    rand::thread_rng().gen_range(0..=0x00ff_ffff)
}
