use anyhow::{Context, Result};
use expense_core::{DisplayStyle, LedgerLayout, NormalizerConfig, SourceProfile};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything a run needs; every section may be left out of the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub normalizer: NormalizerConfig,
    pub layout: LedgerLayout,
    pub sources: Sources,
    /// Display used by `group` and the terminal totals of reports
    pub report: DisplayStyle,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            normalizer: NormalizerConfig::default(),
            layout: LedgerLayout::default(),
            sources: Sources::default(),
            report: DisplayStyle::euro(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sources {
    pub aliexpress: SourceProfile,
    pub cnfans: SourceProfile,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            aliexpress: SourceProfile::aliexpress(),
            cnfans: SourceProfile::cnfans(),
        }
    }
}

pub fn expenses_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".expenses"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(expenses_home()?.join("config.toml"))
}

/// Overlay `patch` onto `base`, recursing into tables present in both.
fn merge_tables(base: &mut toml::Table, patch: toml::Table) {
    for (key, value) in patch {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(inner)), toml::Value::Table(patch_inner)) => {
                merge_tables(inner, patch_inner)
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Parse a config file on top of the built-in defaults, so a partial
/// `[sources.cnfans]` section still inherits the CNFans profile.
pub fn parse_config(text: &str) -> Result<LedgerConfig> {
    let patch: toml::Table = toml::from_str(text)?;
    let mut merged = match toml::Value::try_from(LedgerConfig::default())? {
        toml::Value::Table(t) => t,
        _ => toml::Table::new(),
    };
    merge_tables(&mut merged, patch);
    Ok(toml::Value::Table(merged).try_into()?)
}

pub fn read_config(path: &Path) -> Result<LedgerConfig> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", path.display()))
}

/// `--config` if given (must exist), else ~/.expenses/config.toml if present, else defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<LedgerConfig> {
    if let Some(p) = explicit {
        return read_config(p);
    }
    let p = default_config_path()?;
    if !p.exists() {
        return Ok(LedgerConfig::default());
    }
    read_config(&p)
}

pub fn save_config(cfg: &LedgerConfig, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Write the built-in defaults, leaving an existing file alone.
pub fn init_config(explicit: Option<&Path>) -> Result<PathBuf> {
    let p = match explicit {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(p);
    }
    save_config(&LedgerConfig::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(p)
}
