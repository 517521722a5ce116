use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::launch::LaunchOptions;

const APP_DIR_NAME: &str = "transaid";
const DEFAULT_DATA_ROOT: &str = "Data_Pasien";
const DEFAULT_DATABASE: &str = "pasien.db";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub data_root: Option<PathBuf>,
    pub database: Option<PathBuf>,
}

/// Where the application keeps visit folders and the patient table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub data_root: PathBuf,
    pub database: PathBuf,
}

impl Settings {
    /// Command-line flags win over the settings file, which wins over defaults.
    pub fn resolve(&self, launch: &LaunchOptions, base_dir: &Path) -> ResolvedPaths {
        let data_root = launch
            .data_root
            .clone()
            .or_else(|| self.data_root.clone())
            .unwrap_or_else(|| base_dir.join(DEFAULT_DATA_ROOT));
        let database = launch
            .database
            .clone()
            .or_else(|| self.database.clone())
            .unwrap_or_else(|| base_dir.join(DEFAULT_DATABASE));
        ResolvedPaths {
            data_root,
            database,
        }
    }
}

pub fn settings_file_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        return env::var_os("APPDATA")
            .map(PathBuf::from)
            .map(|base| base.join(APP_DIR_NAME).join("settings.toml"));
    }

    #[cfg(target_os = "macos")]
    {
        return env::var_os("HOME").map(PathBuf::from).map(|home| {
            home.join("Library")
                .join("Application Support")
                .join(APP_DIR_NAME)
                .join("settings.toml")
        });
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg).join(APP_DIR_NAME).join("settings.toml"));
        }
        env::var_os("HOME")
            .map(PathBuf::from)
            .map(|home| home.join(".config").join(APP_DIR_NAME).join("settings.toml"))
    }
}

pub fn load_settings(path: &Path) -> Option<Settings> {
    let text = fs::read_to_string(path).ok()?;
    Some(parse_settings_toml(&text))
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create settings directory {}", parent.display()))?;
    }
    fs::write(path, render_settings_toml(settings))
        .with_context(|| format!("Could not write settings file {}", path.display()))
}

fn render_settings_toml(settings: &Settings) -> String {
    let mut text = String::new();
    for (key, value) in [
        ("data_root", settings.data_root.as_deref()),
        ("database", settings.database.as_deref()),
    ] {
        if let Some(path) = value {
            text.push_str(&format!("{key} = {}\n", quote_path(path)));
        }
    }
    text
}

fn parse_settings_toml(text: &str) -> Settings {
    let mut settings = Settings::default();
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, raw_value)) = line.split_once('=') else {
            continue;
        };
        let Some(value) = unquote_value(raw_value.trim()) else {
            log::warn!("Ignoring malformed settings line: {line}");
            continue;
        };
        if value.trim().is_empty() {
            continue;
        }
        match key.trim() {
            "data_root" => settings.data_root = Some(PathBuf::from(value)),
            "database" => settings.database = Some(PathBuf::from(value)),
            _ => {}
        }
    }
    settings
}

/// Basic TOML string for a path; Windows separators come out doubled.
fn quote_path(path: &Path) -> String {
    let text = path.to_string_lossy();
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        match ch {
            '\\' | '"' => {
                quoted.push('\\');
                quoted.push(ch);
            }
            '\t' => quoted.push_str("\\t"),
            '\n' => quoted.push_str("\\n"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

/// Inverse of `quote_path`. Unquoted values and unknown escapes yield `None`.
fn unquote_value(raw: &str) -> Option<String> {
    let inner = raw.strip_prefix('"')?.strip_suffix('"')?;
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        value.push(match ch {
            '\\' => match chars.next()? {
                '\\' => '\\',
                '"' => '"',
                't' => '\t',
                'n' => '\n',
                _ => return None,
            },
            '"' => return None,
            other => other,
        });
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_toml_roundtrip_keeps_windows_paths() {
        let settings = Settings {
            data_root: Some(PathBuf::from(r"C:\klinik\Data_Pasien")),
            database: Some(PathBuf::from("/srv/klinik/pasien.db")),
        };
        let text = render_settings_toml(&settings);
        assert!(text.contains(r#"data_root = "C:\\klinik\\Data_Pasien""#));
        assert_eq!(parse_settings_toml(&text), settings);
    }

    #[test]
    fn parse_ignores_comments_unknown_keys_and_blank_values() {
        let text = concat!(
            "# saved by transaid\n",
            "theme = \"dark\"\n",
            "database = \"\"\n",
            "data_root = \"/data\"\n",
        );
        let settings = parse_settings_toml(text);
        assert_eq!(settings.data_root, Some(PathBuf::from("/data")));
        assert_eq!(settings.database, None);
    }

    #[test]
    fn bad_escapes_and_bare_values_are_skipped() {
        let text = concat!(
            "data_root = \"C:\\q\\x\"\n",
            "database = /srv/pasien.db\n",
        );
        assert_eq!(parse_settings_toml(text), Settings::default());
        assert_eq!(unquote_value(r#""a\"b""#), Some("a\"b".to_string()));
        assert_eq!(unquote_value(r#""a"b""#), None);
    }

    #[test]
    fn launch_flags_override_settings_and_defaults() {
        let settings = Settings {
            data_root: Some(PathBuf::from("/from-settings/data")),
            database: Some(PathBuf::from("/from-settings/pasien.db")),
        };
        let launch = LaunchOptions {
            database: Some(PathBuf::from("/from-cli/pasien.db")),
            ..LaunchOptions::default()
        };

        let resolved = settings.resolve(&launch, Path::new("/base"));
        assert_eq!(resolved.data_root, PathBuf::from("/from-settings/data"));
        assert_eq!(resolved.database, PathBuf::from("/from-cli/pasien.db"));

        let defaults = Settings::default().resolve(&LaunchOptions::default(), Path::new("/base"));
        assert_eq!(defaults.data_root, Path::new("/base").join("Data_Pasien"));
        assert_eq!(defaults.database, Path::new("/base").join("pasien.db"));
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let settings = Settings {
            data_root: Some(PathBuf::from("/data")),
            database: None,
        };

        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path), Some(settings));
    }
}
