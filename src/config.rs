use crate::error::{PgnavError, Result};
use crate::query::TypeFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "PGNAV_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub keybindings: KeybindingConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Browser width as a percentage of the screen
    pub left_panel_width: u16,
    /// Page size used before the first draw reports the real height
    pub viewport_height: usize,
    /// Show the ancestor path next to filter results
    pub show_context: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    pub quit: char,
    pub search: char,
    pub parent: char,
    pub next_sibling: char,
    pub prev_sibling: char,
    pub next_of_type: char,
    pub prev_of_type: char,
    pub set_mark: char,
    pub jump_to_mark: char,
    pub quick_jump: char,
    pub quick_jump_back: char,
    pub goto_top: char,
    pub goto_bottom: char,
    pub toggle: char,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Object class walked by the next/prev-of-type keys
    pub jump_type: TypeFilter,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            left_panel_width: 45,
            viewport_height: 20,
            show_context: true,
        }
    }
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self {
            quit: 'q',
            search: '/',
            parent: 'p',
            next_sibling: 'J',
            prev_sibling: 'K',
            next_of_type: 't',
            prev_of_type: 'T',
            set_mark: 'm',
            jump_to_mark: '\'',
            quick_jump: 'f',
            quick_jump_back: 'F',
            goto_top: 'g',
            goto_bottom: 'G',
            toggle: ' ',
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            jump_type: TypeFilter::Table,
        }
    }
}

impl Config {
    /// Load from `path`, else from `$PGNAV_CONFIG`, else defaults. An
    /// explicit path must exist; a stale environment entry only warns.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_path(path);
        }
        match std::env::var_os(CONFIG_ENV).map(PathBuf::from) {
            Some(path) if path.exists() => Self::from_path(&path),
            Some(path) => {
                log::warn!("{} points at missing file {}", CONFIG_ENV, path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PgnavError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&text)
            .map_err(|e| PgnavError::Config(format!("{}: {}", path.display(), e)))?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.keybindings.search, '/');
        assert_eq!(config.keybindings.jump_to_mark, '\'');
        assert_eq!(config.search.jump_type, TypeFilter::Table);
        assert_eq!(config.layout.left_panel_width, 45);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let file = write_config(
            r#"{ "keybindings": { "quit": "x" }, "search": { "jump_type": "view" } }"#,
        );
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.keybindings.quit, 'x');
        assert_eq!(config.keybindings.parent, 'p');
        assert_eq!(config.search.jump_type, TypeFilter::View);
        assert_eq!(config.layout, LayoutConfig::default());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, PgnavError::Config(_)));
    }

    #[test]
    fn test_invalid_json_is_a_config_error() {
        let file = write_config(r#"{ "keybindings": { "quit": "too long" } }"#);
        let err = Config::from_path(file.path()).unwrap_err();
        assert!(matches!(err, PgnavError::Config(_)));
    }
}
