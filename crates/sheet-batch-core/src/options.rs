use serde::{Deserialize, Serialize};

use crate::settings::{SettingValue, Settings};

/// Settings keys starting with this prefix are forwarded to the packer.
pub const PACKER_OPTION_PREFIX: &str = "--";

/// The option that may be given several times, once per list item.
pub const VARIANT_OPTION: &str = "--variant";

/// Packer options that take no value; their presence is the signal.
pub const FLAG_OPTIONS: &[&str] = &[
    "--multipack",
    "--enable-rotation",
    "--disable-rotation",
    "--disable-auto-alias",
    "--flip-pvr",
    "--premultiply-alpha",
    "--force-squared",
    "--force-word-aligned",
    "--force-identical-layout",
    "--reduce-border-artifacts",
    "--disable-clean-transparency",
    "--shape-debug",
];

/// How a forwarded option turns into command-line tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// `--flag` only.
    Flag,
    /// `--flag value`.
    Value,
    /// `--flag item` repeated for every list item.
    Repeated,
}

impl OptionKind {
    /// Kind of a forwarded option, or `None` for keys the packer never sees.
    pub fn of(key: &str) -> Option<Self> {
        if !key.starts_with(PACKER_OPTION_PREFIX) {
            return None;
        }
        if key == VARIANT_OPTION {
            Some(Self::Repeated)
        } else if FLAG_OPTIONS.contains(&key) {
            Some(Self::Flag)
        } else {
            Some(Self::Value)
        }
    }
}

/// Translates settings into packer tokens, in the settings' key order.
/// Convenience keys (no `--` prefix) are skipped.
pub fn translate(settings: &Settings) -> Vec<String> {
    let mut tokens = Vec::with_capacity(settings.len() * 2);
    for (key, value) in settings.iter() {
        let Some(kind) = OptionKind::of(key) else {
            continue;
        };
        match kind {
            OptionKind::Flag => tokens.push(key.to_string()),
            OptionKind::Value => {
                tokens.push(key.to_string());
                tokens.push(value.to_string());
            }
            OptionKind::Repeated => match value {
                SettingValue::List(items) => {
                    for item in items {
                        tokens.push(key.to_string());
                        tokens.push(item.clone());
                    }
                }
                scalar => {
                    tokens.push(key.to_string());
                    tokens.push(scalar.to_string());
                }
            },
        }
    }
    tokens
}
