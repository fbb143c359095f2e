use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BatchError, Result};

/// Key in a local config file that declares "produce output here".
/// It is split off at load time and never inherited by subdirectories.
pub const OUTPUT_PATH_KEY: &str = "output_path";

/// Default name of the per-directory config file.
pub const DEFAULT_CONFIG_FILE_NAME: &str = "texture_packer.json";

/// A single settings value as it appears in a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<String>),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
        }
    }
}

/// String form used when a value is forwarded to the packer as one token.
///
/// Booleans render as `true`/`false` and lists are joined with `,`
/// (`["a", "b"]` becomes `a,b`). Python `str()` spellings such as `True` or
/// `['a', 'b']` are never produced.
impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::List(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        Self::Number(v.into())
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

/// Inheritable option-name → value mapping visible at one directory.
///
/// Keys keep the order in which they first appeared along the inheritance
/// chain; an override of an existing key keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    entries: IndexMap<String, SettingValue>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overwrites (or inserts) every key of `overrides` in place. Values are
    /// replaced wholesale; lists are not concatenated.
    pub fn merge_from(&mut self, overrides: &Settings) {
        for (key, value) in &overrides.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    /// Returns `self` with `overrides` applied, leaving `self` untouched.
    pub fn merged(&self, overrides: &Settings) -> Settings {
        let mut out = self.clone();
        out.merge_from(overrides);
        out
    }
}

impl<K: Into<String>, V: Into<SettingValue>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut s = Settings::new();
        for (k, v) in iter {
            s.insert(k, v);
        }
        s
    }
}

/// Encoding of a local config file, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// `.yaml`/`.yml` select YAML; anything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

impl FromStr for ConfigFormat {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(()),
        }
    }
}

/// Contents of one directory's config file: the inheritable overrides plus the
/// optional output declaration, carried separately.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalConfig {
    pub overrides: Settings,
    pub output_path: Option<Vec<String>>,
}

impl LocalConfig {
    /// Parses config text. `path` is used for error messages only.
    pub fn parse(text: &str, format: ConfigFormat, path: &Path) -> Result<Self> {
        let mut entries: IndexMap<String, SettingValue> = match format {
            ConfigFormat::Json => serde_json::from_str(text).map_err(|e| {
                BatchError::ConfigParse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            })?,
            ConfigFormat::Yaml => serde_yaml::from_str(text).map_err(|e| {
                BatchError::ConfigParse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            })?,
        };
        let output_path = match entries.shift_remove(OUTPUT_PATH_KEY) {
            None => None,
            Some(SettingValue::List(segments)) => Some(segments),
            Some(other) => {
                return Err(BatchError::InvalidConfig(format!(
                    "{}: `{}` must be a list of path segments, got {}",
                    path.display(),
                    OUTPUT_PATH_KEY,
                    other.kind()
                )));
            }
        };
        Ok(Self {
            overrides: Settings { entries },
            output_path,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| BatchError::io(path, e))?;
        Self::parse(&text, ConfigFormat::from_path(path), path)
    }

    /// Loads `dir/file_name` if it exists. A missing file is not an error.
    pub fn load_in_dir(dir: &Path, file_name: &str) -> Result<Option<Self>> {
        let path = dir.join(file_name);
        if !path.is_file() {
            return Ok(None);
        }
        let cfg = Self::load(&path)?;
        debug!(
            path = %path.display(),
            keys = cfg.overrides.len(),
            declares_output = cfg.output_path.is_some(),
            "loaded local config"
        );
        Ok(Some(cfg))
    }
}

/// Typed view of the convenience keys that steer job building. These keys are
/// read here and never forwarded to the packer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOptions {
    /// When false, sprite names keep the source sub-path (`--replace`).
    pub flatten_path: bool,
    pub sheet_extension: String,
    pub data_extension: String,
    /// Directories (relative to the declaring directory) scanned for images.
    pub input_directories: Vec<PathBuf>,
    /// One sheet for all inputs, or one sheet per input image.
    pub combine_images: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            flatten_path: true,
            sheet_extension: "pvr.ccz".into(),
            data_extension: "plist".into(),
            input_directories: vec![PathBuf::from(".")],
            combine_images: true,
        }
    }
}

impl BatchOptions {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut opts = Self::default();
        if let Some(v) = settings.get("flatten_path") {
            opts.flatten_path = expect_bool("flatten_path", v)?;
        }
        if let Some(v) = settings.get("sheet_extension") {
            opts.sheet_extension = expect_str("sheet_extension", v)?;
        }
        if let Some(v) = settings.get("data_extension") {
            opts.data_extension = expect_str("data_extension", v)?;
        }
        if let Some(v) = settings.get("input_directories") {
            let dirs = v.as_list().ok_or_else(|| wrong_type("input_directories", "list", v))?;
            opts.input_directories = dirs.iter().map(PathBuf::from).collect();
        }
        if let Some(v) = settings.get("combine_images") {
            opts.combine_images = expect_bool("combine_images", v)?;
        }
        Ok(opts)
    }
}

fn expect_bool(key: &str, v: &SettingValue) -> Result<bool> {
    v.as_bool().ok_or_else(|| wrong_type(key, "bool", v))
}

fn expect_str(key: &str, v: &SettingValue) -> Result<String> {
    v.as_str()
        .map(str::to_string)
        .ok_or_else(|| wrong_type(key, "string", v))
}

fn wrong_type(key: &str, expected: &str, got: &SettingValue) -> BatchError {
    BatchError::InvalidConfig(format!(
        "`{key}` must be a {expected}, got {}",
        got.kind()
    ))
}
