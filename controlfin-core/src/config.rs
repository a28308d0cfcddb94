//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "language": "pt",
//!   "pageSize": 20,
//!   "currency": "BRL",
//!   "import": { "delimiter": ";", "dateFormat": "DD/MM/YYYY", "skipDuplicates": true },
//!   "importProfiles": { "nubank": { "mapping": { "Valor": "amount" } } }
//! }
//! ```
//! Keys this crate does not know about are kept when saving. Scalar settings
//! are only written back when the caller changed them, so an environment
//! override never ends up in the file.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::pagination::DEFAULT_PAGE_SIZE;
use crate::domain::{ColumnMapping, HeaderMode};
use crate::i18n::DEFAULT_LANGUAGE;

pub const SETTINGS_FILE: &str = "settings.json";
pub const LANGUAGE_ENV: &str = "CONTROLFIN_LANGUAGE";
pub const DEFAULT_CURRENCY: &str = "USD";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    page_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    currency: Option<String>,
    #[serde(default)]
    import: ImportDefaults,
    #[serde(default)]
    import_profiles: HashMap<String, ImportProfile>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// ControlFin configuration (resolved view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub language: String,
    pub page_size: usize,
    pub currency: String,
    pub import: ImportDefaults,
    pub import_profiles: HashMap<String, ImportProfile>,
    // Values as resolved at load time, to tell caller changes from inherited ones
    loaded: LoadedValues,
}

#[derive(Debug, Clone, PartialEq)]
struct LoadedValues {
    language: String,
    page_size: usize,
    currency: String,
}

impl Default for LoadedValues {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let loaded = LoadedValues::default();
        Self {
            language: loaded.language.clone(),
            page_size: loaded.page_size,
            currency: loaded.currency.clone(),
            import: ImportDefaults::default(),
            import_profiles: HashMap::new(),
            loaded,
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// The language can be overridden with `CONTROLFIN_LANGUAGE`. An
    /// unreadable settings file is logged and treated as empty.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = match read_settings(data_dir) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("ignoring settings: {:#}", e);
                SettingsFile::default()
            }
        };
        let env_language = std::env::var(LANGUAGE_ENV).ok();
        Ok(Self::from_settings(raw, env_language))
    }

    fn from_settings(raw: SettingsFile, env_language: Option<String>) -> Self {
        let defaults = LoadedValues::default();

        let language = env_language
            .filter(|l| !l.trim().is_empty())
            .or(raw.language)
            .unwrap_or(defaults.language);

        let loaded = LoadedValues {
            language,
            page_size: raw.page_size.filter(|n| *n > 0).unwrap_or(defaults.page_size),
            currency: raw.currency.unwrap_or(defaults.currency),
        };

        Self {
            language: loaded.language.clone(),
            page_size: loaded.page_size,
            currency: loaded.currency.clone(),
            import: raw.import,
            import_profiles: raw.import_profiles,
            loaded,
        }
    }

    /// Save config to the data directory, preserving unmanaged keys
    ///
    /// Fails instead of overwriting a settings file that cannot be parsed.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let mut settings = read_settings(data_dir)?;

        if self.language != self.loaded.language {
            settings.language = Some(self.language.clone());
        }
        if self.page_size != self.loaded.page_size {
            settings.page_size = Some(self.page_size);
        }
        if self.currency != self.loaded.currency {
            settings.currency = Some(self.currency.clone());
        }
        settings.import = self.import.clone();
        settings.import_profiles = self.import_profiles.clone();

        std::fs::create_dir_all(data_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(data_dir.join(SETTINGS_FILE), content)
            .context("Failed to write settings.json")?;
        Ok(())
    }
}

fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
    let settings_path = data_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)
        .with_context(|| format!("Failed to read {}", settings_path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid settings file {}", settings_path.display()))
}

/// Import defaults applied when a command does not say otherwise
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDefaults {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(default = "default_true")]
    pub skip_duplicates: bool,
    #[serde(default)]
    pub update_existing: bool,
}

impl Default for ImportDefaults {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            date_format: None,
            skip_duplicates: true,
            update_existing: false,
        }
    }
}

fn default_delimiter() -> char {
    ','
}

fn default_true() -> bool {
    true
}

/// Saved mapping and options for a recurring file layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportProfile {
    #[serde(default)]
    pub mapping: ColumnMapping,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(default)]
    pub header_mode: HeaderMode,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ImportField;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.import.delimiter, ',');
        assert!(config.import.skip_duplicates);
        assert!(config.import_profiles.is_empty());
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"theme": "dark", "pageSize": 25, "import": {"delimiter": ";"}}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.import.delimiter, ';');

        config.import_profiles.insert(
            "bank".to_string(),
            ImportProfile {
                mapping: ColumnMapping::new().with("Valor", ImportField::Amount),
                delimiter: Some(';'),
                date_format: Some("DD/MM/YYYY".to_string()),
                header_mode: HeaderMode::Scan,
            },
        );
        config.save(dir.path()).unwrap();

        let raw: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw["importProfiles"]["bank"]["mapping"]["Valor"], "amount");

        let reloaded = Config::load(dir.path()).unwrap();
        assert_eq!(reloaded.import_profiles["bank"].header_mode, HeaderMode::Scan);
    }

    #[test]
    fn test_corrupt_settings_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "not json").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.currency, DEFAULT_CURRENCY);
    }

    #[test]
    fn test_save_refuses_to_clobber_corrupt_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "{\"language\": \"pt\",").unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.import_profiles.insert("bank".to_string(), ImportProfile::default());
        assert!(config.save(dir.path()).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"language\": \"pt\",");
    }

    #[test]
    fn test_save_writes_only_changed_scalars() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{"language": "en"}"#).unwrap();

        let raw = read_settings(dir.path()).unwrap();
        let mut config = Config::from_settings(raw, Some("pt".to_string()));
        assert_eq!(config.language, "pt");
        config.import_profiles.insert("bank".to_string(), ImportProfile::default());
        config.save(dir.path()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["language"], "en");
        assert!(raw.get("pageSize").is_none());
        assert!(raw.get("currency").is_none());
        assert!(raw["importProfiles"].get("bank").is_some());

        let mut config = Config::load(dir.path()).unwrap();
        config.currency = "BRL".to_string();
        config.save(dir.path()).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["currency"], "BRL");
    }
}
