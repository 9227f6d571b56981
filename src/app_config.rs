//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// TOML-backed file configuration for `hean` defaults.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    /// API hostname of the HeanCMS host, e.g. `https://api.templescan.net`.
    pub hostname: Option<String>,
    /// Path segment that precedes the series slug in public URLs.
    pub url_prefix: Option<String>,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Directory covers are downloaded into; covers are not cached when unset.
    pub cover_cache_dir: Option<PathBuf>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(hostname) = self.hostname.as_deref()
            && !(hostname.starts_with("http://") || hostname.starts_with("https://"))
        {
            bail!("Invalid config value for `hostname`: '{hostname}'. Expected an http(s) URL");
        }

        if let Some(url_prefix) = self.url_prefix.as_deref() {
            validate_url_prefix(url_prefix)?;
        }

        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }
}

/// Checks that a URL prefix is a `/`-delimited path segment such as
/// `/series/`. Shared by the config file and `--url-prefix`.
pub fn validate_url_prefix(url_prefix: &str) -> Result<()> {
    if !(url_prefix.starts_with('/') && url_prefix.ends_with('/')) {
        bail!("Invalid `url_prefix` '{url_prefix}'. Expected a path such as \"/series/\"");
    }
    Ok(())
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    const ALL: [Self; 4] = [Self::Default, Self::Verbose, Self::Quiet, Self::Debug];

    /// Label used in the config file.
    fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }

    /// Log level used when neither `RUST_LOG` nor a CLI flag decides.
    #[must_use]
    pub fn default_level(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Quiet => "error",
            Self::Debug => "trace",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/hean/config.toml`
/// 2. `$HOME/.config/hean/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join("hean").join("config.toml"));
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("hean")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

const KEYS: [&str; 6] = [
    "hostname",
    "url_prefix",
    "connect_timeout_secs",
    "read_timeout_secs",
    "cover_cache_dir",
    "verbosity",
];

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_no, line) in (1..).zip(raw.lines()) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, rest)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };
        let key = key.trim();
        if !KEYS.contains(&key) {
            bail!("Unknown configuration key: '{key}' on line {line_no}");
        }

        apply_entry(&mut cfg, key, rest)
            .with_context(|| format!("Invalid `{key}` value on line {line_no}"))?;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn apply_entry(cfg: &mut FileConfig, key: &str, rest: &str) -> Result<()> {
    let value = RawValue::split(rest)?;
    match key {
        "hostname" => cfg.hostname = Some(value.quoted()?.to_string()),
        "url_prefix" => cfg.url_prefix = Some(value.quoted()?.to_string()),
        "connect_timeout_secs" => cfg.connect_timeout_secs = Some(value.seconds()?),
        "read_timeout_secs" => cfg.read_timeout_secs = Some(value.seconds()?),
        "cover_cache_dir" => cfg.cover_cache_dir = Some(PathBuf::from(value.quoted()?)),
        "verbosity" => {
            let label = value.quoted()?;
            let setting = VerbositySetting::ALL
                .into_iter()
                .find(|setting| setting.as_str() == label)
                .with_context(|| {
                    format!("'{label}' is not one of: default, verbose, quiet, debug")
                })?;
            cfg.verbosity = Some(setting);
        }
        other => bail!("Unknown configuration key: '{other}'"),
    }
    Ok(())
}

/// Right-hand side of a `key = value` line with any trailing comment removed.
enum RawValue<'a> {
    Quoted(&'a str),
    Bare(&'a str),
}

impl<'a> RawValue<'a> {
    fn split(rest: &'a str) -> Result<Self> {
        let rest = rest.trim_start();
        let Some(body) = rest.strip_prefix('"') else {
            let bare = rest.split_once('#').map_or(rest, |(value, _)| value);
            return Ok(Self::Bare(bare.trim()));
        };
        let (text, tail) = body.split_once('"').context("Unterminated string")?;
        let tail = tail.trim_start();
        if !(tail.is_empty() || tail.starts_with('#')) {
            bail!("Unexpected text after string: '{tail}'");
        }
        Ok(Self::Quoted(text))
    }

    fn quoted(&self) -> Result<&'a str> {
        match *self {
            Self::Quoted(text) => Ok(text),
            Self::Bare(_) => bail!("Expected double-quoted string"),
        }
    }

    fn seconds(&self) -> Result<u64> {
        match *self {
            Self::Bare(number) => number
                .parse()
                .with_context(|| format!("Expected whole seconds, got '{number}'")),
            Self::Quoted(_) => bail!("Expected an unquoted number of seconds"),
        }
    }
}
