//! Parses an optional `config.toml` (keybinding profile, border
//! colours/size, named colour and command aliases), falling back
//! field-by-field to the built-in defaults. Grounded in the reference
//! crate's `Config`/`get_config`, generalised away from its
//! hardcoded development path.

use std::collections::HashMap;
use std::path::PathBuf;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::event_router::KeybindingProfile;
use crate::palette::{self, Palette};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    profile: Option<String>,
    border: Option<BorderSettings>,
    #[serde(alias = "colour")]
    colours: Option<Vec<ColourSettings>>,
    #[serde(alias = "command")]
    commands: Option<Vec<CommandSettings>>,
}

/// `[border]` section: overrides for the neutral/active tile border
/// colours and the tile border width documented in §6.
#[derive(Debug, Default, Serialize, Deserialize)]
struct BorderSettings {
    colour: Option<String>,
    focus_colour: Option<String>,
    size: Option<u32>,
}

/// `[[colour]]` entries: named aliases that `border.colour` and
/// `border.focus_colour` may reference instead of a literal `#RRGGBB`.
#[derive(Debug, Serialize, Deserialize)]
struct ColourSettings {
    name: Option<String>,
    value: Option<String>,
}

/// `[[command]]` entries: named shell-command aliases. Not consumed by
/// the built-in keybinding tables (those are fixed per profile), but
/// parsed and validated the way the reference crate parses its own
/// `[[command]]` table, for scripts or future bindings to look up by
/// name.
#[derive(Debug, Serialize, Deserialize)]
struct CommandSettings {
    name: Option<String>,
    action: Option<String>,
}

/// Resolved, defaults-merged configuration the rest of the crate
/// actually consumes.
#[derive(Debug, Clone)]
pub struct Settings {
    pub profile: KeybindingProfile,
    pub palette: Palette,
    pub tile_border_width: u32,
    pub commands: HashMap<String, String>,
}

fn default_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_default();
    PathBuf::from(home).join(".config/tilewm/config.toml")
}

impl Config {
    /// Loads `config.toml` from its conventional path. A missing file
    /// is not an error — it merges to "sensible defaults" (§4.7).
    /// A present-but-malformed file is.
    pub fn load() -> Result<Config, EngineError> {
        let path = default_path();
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(_) => {
                debug!("no config file at {:?}, using built-in defaults", path);
                return Ok(Config::default());
            }
        };

        let config: Config = toml::from_str(&contents)
            .map_err(|e| EngineError::InvalidConfig(format!("{:?}: {}", path, e)))?;
        debug!("loaded config: {:#?}", config);
        Ok(config)
    }

    /// Merge this config over the built-in defaults, resolving colour
    /// aliases and validating every literal along the way.
    pub fn resolve(&self) -> Result<Settings, EngineError> {
        let aliases = self.colour_aliases()?;
        let mut palette = Palette::default();
        let mut tile_border_width = palette::BORDER_TILE;

        if let Some(border) = &self.border {
            if let Some(colour) = &border.colour {
                palette.tile_inactive_border = resolve_colour(colour, &aliases)?;
            }
            if let Some(colour) = &border.focus_colour {
                palette.tile_active_border = resolve_colour(colour, &aliases)?;
            }
            if let Some(size) = border.size {
                tile_border_width = size;
            }
        }

        let profile = match self.profile.as_deref() {
            None => KeybindingProfile::Modal,
            Some("modal") => KeybindingProfile::Modal,
            Some("direct") => KeybindingProfile::Direct,
            Some(other) => {
                return Err(EngineError::InvalidConfig(format!("unknown profile {:?}", other)));
            }
        };

        let mut commands = HashMap::new();
        if let Some(entries) = &self.commands {
            for entry in entries {
                if let (Some(name), Some(action)) = (&entry.name, &entry.action) {
                    commands.insert(name.clone(), action.clone());
                }
            }
        }

        Ok(Settings { profile, palette, tile_border_width, commands })
    }

    fn colour_aliases(&self) -> Result<HashMap<String, u32>, EngineError> {
        let mut aliases = HashMap::new();
        if let Some(entries) = &self.colours {
            for entry in entries {
                if let (Some(name), Some(value)) = (&entry.name, &entry.value) {
                    aliases.insert(name.clone(), crate::colour::parse_colour(value)?);
                }
            }
        }
        Ok(aliases)
    }
}

fn resolve_colour(literal: &str, aliases: &HashMap<String, u32>) -> Result<u32, EngineError> {
    if let Some(&rgb) = aliases.get(literal) {
        return Ok(rgb);
    }
    crate::colour::parse_colour(literal)
}
