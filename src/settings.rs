use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "envswap";
const STORE_FILE: &str = "profiles.db";

/// Environment variable overriding the store location.
pub const STORE_ENV: &str = "ENVSWAP_STORE";

/// Contents of `~/.config/envswap/config.toml`. Every key is optional.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct Settings {
    pub store: Option<PathBuf>,
    pub default_shell: Option<String>,
    pub picker: Option<PickerSection>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct PickerSection {
    pub title: Option<String>,
    // `#RRGGBB` or `#RGB`
    pub highlight_fg: Option<String>,
    pub highlight_bg: Option<String>,
    pub border: Option<String>,
}

pub fn default_shell() -> &'static str {
    "sh"
}

pub fn load_settings() -> Result<Settings> {
    let Some(path) = settings_path() else {
        return Ok(Settings::default());
    };

    let text = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("no settings file at {}", path.display());
            return Ok(Settings::default());
        }
        Err(e) => return Err(e).with_context(|| format!("read settings {}", path.display())),
    };

    parse_settings(&text, &path)
}

pub fn parse_settings(text: &str, path: &Path) -> Result<Settings> {
    toml::from_str::<Settings>(text).with_context(|| format!("parse settings {}", path.display()))
}

/// Where the profile store lives: `ENVSWAP_STORE`, then `store` from the
/// settings file, then the per-user config directory.
pub fn store_path(settings: &Settings) -> Result<PathBuf> {
    let env_override = std::env::var_os(STORE_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    resolve_store_path(env_override, settings, config_dir())
        .context("cannot determine where to keep profiles; set ENVSWAP_STORE or HOME")
}

fn resolve_store_path(
    env_override: Option<PathBuf>,
    settings: &Settings,
    config_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    let path = env_override
        .or_else(|| settings.store.clone())
        .or_else(|| config_dir.map(|dir| dir.join(APP_DIR).join(STORE_FILE)));
    if let Some(p) = &path {
        log::debug!("profile store: {}", p.display());
    }
    path
}

pub fn settings_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

fn config_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        Some(PathBuf::from(xdg))
    } else {
        home_dir().map(|home| home.join(".config"))
    }
}

pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() -> Result<()> {
        assert_eq!(parse_settings("", Path::new("config.toml"))?, Settings::default());
        Ok(())
    }

    #[test]
    fn parses_every_key() -> Result<()> {
        let text = r##"
            store = "/tmp/envswap/profiles.db"
            default_shell = "zsh"

            [picker]
            title = "Pick one"
            highlight_fg = "#282a36"
            highlight_bg = "#bd93f9"
            border = "#6272a4"
        "##;
        let s = parse_settings(text, Path::new("config.toml"))?;
        assert_eq!(s.store, Some(PathBuf::from("/tmp/envswap/profiles.db")));
        assert_eq!(s.default_shell.as_deref(), Some("zsh"));
        let picker = s.picker.expect("picker section");
        assert_eq!(picker.title.as_deref(), Some("Pick one"));
        assert_eq!(picker.highlight_bg.as_deref(), Some("#bd93f9"));
        Ok(())
    }

    #[test]
    fn malformed_settings_are_an_error() {
        let err = parse_settings("store = [", Path::new("/x/config.toml"))
            .expect_err("must fail");
        assert!(err.to_string().contains("/x/config.toml"));
    }

    #[test]
    fn store_path_precedence() {
        let configured = Settings {
            store: Some(PathBuf::from("/from/settings.db")),
            ..Settings::default()
        };
        let base = Some(PathBuf::from("/home/u/.config"));

        assert_eq!(
            resolve_store_path(Some(PathBuf::from("/from/env.db")), &configured, base.clone()),
            Some(PathBuf::from("/from/env.db"))
        );
        assert_eq!(
            resolve_store_path(None, &configured, base.clone()),
            Some(PathBuf::from("/from/settings.db"))
        );
        assert_eq!(
            resolve_store_path(None, &Settings::default(), base),
            Some(PathBuf::from("/home/u/.config/envswap/profiles.db"))
        );
        assert_eq!(resolve_store_path(None, &Settings::default(), None), None);
    }
}
