//! Configuration primitives and loader for the journal tools.
//!
//! Settings are resolved with the precedence
//! command line → environment → override file → working directory → git root →
//! built-in defaults, then validated into typed structures so the tool crates
//! never touch raw TOML or the process environment.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use journal_outline::ParagraphMode;
use serde::Deserialize;
use thiserror::Error;

const CONFIG_FILE_NAME: &str = ".journal-tools.toml";

/// Environment variable naming the Logseq journal directory.
pub const JOURNAL_DIR_ENV: &str = "LOGSEQ_JOURNAL_DIR";

const DEFAULT_LOOKBACK_DAYS: u32 = 365;
const MAX_LOOKBACK_DAYS: u32 = 36_500;
const DEFAULT_INDENT_WIDTH: usize = 2;
const MAX_INDENT_WIDTH: usize = 8;
const DEFAULT_FILE_PREFIX: &str = "Podcasts___";
const DEFAULT_SPLIT_DIR: &str = "split_episodes";

/// Complete configuration resolved from defaults and overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub journal: JournalSettings,
    pub outline: OutlineSettings,
    pub snipd: SnipdSettings,
    pub sources: ConfigSources,
}

/// Settings for journal discovery and cleaning.
#[derive(Clone, Debug)]
pub struct JournalSettings {
    pub directory: Option<PathBuf>,
    pub lookback_days: u32,
    pub backup: bool,
}

impl JournalSettings {
    /// The journal directory, or [`ConfigError::JournalDirUnset`] when no layer provided one.
    pub fn require_directory(&self) -> Result<&Path, ConfigError> {
        self.directory
            .as_deref()
            .ok_or(ConfigError::JournalDirUnset)
    }
}

/// Settings for the Markdown to outline converter.
#[derive(Clone, Debug)]
pub struct OutlineSettings {
    pub paragraph_mode: ParagraphMode,
    pub indent_width: usize,
}

/// Settings for the Snipd export splitter.
#[derive(Clone, Debug)]
pub struct SnipdSettings {
    pub file_prefix: String,
    /// Relative paths are resolved against the export file's directory.
    pub output_dir: PathBuf,
}

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// Specific layer of configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
    pub base_dir: PathBuf,
}

impl ConfigSource {
    fn without_file(kind: ConfigSourceKind, base_dir: PathBuf) -> Self {
        ConfigSource {
            kind,
            path: None,
            base_dir,
        }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        ConfigSource {
            kind,
            path: Some(path),
            base_dir,
        }
    }

    fn describe(&self) -> String {
        match (&self.kind, &self.path) {
            (ConfigSourceKind::Default, _) => "built-in defaults".to_owned(),
            (kind, Some(path)) => format!("{} at {}", kind, path.display()),
            (kind, None) => kind.to_string(),
        }
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
    Environment,
    CommandLine,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::GitRoot => "git-root config",
            ConfigSourceKind::Local => "local config",
            ConfigSourceKind::Override => "override config",
            ConfigSourceKind::Environment => JOURNAL_DIR_ENV,
            ConfigSourceKind::CommandLine => "command line",
        };
        f.write_str(label)
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
    pub env_journal_dir: Option<PathBuf>,
    pub journal_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }

    /// Value of [`JOURNAL_DIR_ENV`] as read once by the binary.
    pub fn with_env_journal_dir(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.env_journal_dir = path.map(Into::into);
        self
    }

    pub fn with_journal_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.journal_dir = Some(path.into());
        self
    }
}

/// Errors surfaced while loading or consulting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
    #[error(
        "journal directory is not configured; set LOGSEQ_JOURNAL_DIR, pass --journal-dir, \
         or add `directory` under [journal] in .journal-tools.toml"
    )]
    JournalDirUnset,
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let override_path = options
            .override_path
            .map(|path| make_absolute(&path, &working_dir));

        if let Some(path) = &override_path {
            if !path.exists() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let default_source = ConfigSource::without_file(ConfigSourceKind::Default, working_dir.clone());
        let mut merged = defaults_layer(default_source.clone());
        let mut source_layers = vec![default_source];

        let git_root = find_git_root(&working_dir);
        let git_config_path = git_root.as_ref().map(|root| root.join(CONFIG_FILE_NAME));
        let local_config_path = working_dir.join(CONFIG_FILE_NAME);

        if let Some(path) = git_config_path.as_ref() {
            if path.exists() && Some(path) != override_path.as_ref() && path != &local_config_path {
                let source = ConfigSource::for_file(ConfigSourceKind::GitRoot, path.clone());
                merged.merge(load_layer(path, source.clone())?);
                source_layers.push(source);
            }
        }

        if local_config_path.exists() && Some(&local_config_path) != override_path.as_ref() {
            let source = ConfigSource::for_file(ConfigSourceKind::Local, local_config_path.clone());
            merged.merge(load_layer(&local_config_path, source.clone())?);
            source_layers.push(source);
        }

        if let Some(path) = override_path {
            let source = ConfigSource::for_file(ConfigSourceKind::Override, path.clone());
            merged.merge(load_layer(&path, source.clone())?);
            source_layers.push(source);
        }

        for (kind, value) in [
            (ConfigSourceKind::Environment, options.env_journal_dir),
            (ConfigSourceKind::CommandLine, options.journal_dir),
        ] {
            let Some(directory) = value.filter(|path| !path.as_os_str().is_empty()) else {
                continue;
            };
            let source = ConfigSource::without_file(kind, working_dir.clone());
            merged.journal.directory = Some(Located::new(directory, source.clone()));
            source_layers.push(source);
        }

        let resolved = merged.finalize().map_err(ConfigError::Validation)?;
        Ok(Config {
            journal: resolved.journal,
            outline: resolved.outline,
            snipd: resolved.snipd,
            sources: ConfigSources {
                working_directory: working_dir,
                layers: source_layers,
            },
        })
    }
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Expands a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

fn load_layer(path: &Path, source: ConfigSource) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.into(),
        source,
    })?;
    Ok(raw.into_partial(source))
}

fn defaults_layer(source: ConfigSource) -> PartialConfig {
    PartialConfig {
        journal: JournalPartial {
            directory: None,
            lookback_days: Some(Located::new(DEFAULT_LOOKBACK_DAYS, source.clone())),
            backup: Some(Located::new(false, source.clone())),
        },
        outline: OutlinePartial {
            paragraph_mode: Some(Located::new(
                ParagraphMode::default().as_str().to_owned(),
                source.clone(),
            )),
            indent_width: Some(Located::new(DEFAULT_INDENT_WIDTH, source.clone())),
        },
        snipd: SnipdPartial {
            file_prefix: Some(Located::new(DEFAULT_FILE_PREFIX.to_owned(), source.clone())),
            output_dir: Some(Located::new(PathBuf::from(DEFAULT_SPLIT_DIR), source)),
        },
    }
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

struct ResolvedConfig {
    journal: JournalSettings,
    outline: OutlineSettings,
    snipd: SnipdSettings,
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    journal: JournalPartial,
    outline: OutlinePartial,
    snipd: SnipdPartial,
}

impl PartialConfig {
    fn merge(&mut self, other: PartialConfig) {
        self.journal.merge(other.journal);
        self.outline.merge(other.outline);
        self.snipd.merge(other.snipd);
    }

    fn finalize(self) -> Result<ResolvedConfig, ConfigValidationErrors> {
        let mut errors = Vec::new();
        let fallback = || ConfigSource::without_file(ConfigSourceKind::Default, PathBuf::from("."));

        let directory = self.journal.directory.map(|located| {
            let expanded = expand_home(&located.value);
            if expanded.is_absolute() {
                expanded
            } else {
                located.source.base_dir.join(expanded)
            }
        });

        let lookback = self
            .journal
            .lookback_days
            .unwrap_or_else(|| Located::new(DEFAULT_LOOKBACK_DAYS, fallback()));
        if lookback.value == 0 {
            errors.push(ConfigValidationError::new(
                Some(lookback.source.clone()),
                "journal.lookback_days must be at least 1".to_owned(),
            ));
        } else if lookback.value > MAX_LOOKBACK_DAYS {
            errors.push(ConfigValidationError::new(
                Some(lookback.source.clone()),
                format!(
                    "journal.lookback_days must be at most {MAX_LOOKBACK_DAYS} (received {})",
                    lookback.value
                ),
            ));
        }

        let backup = self
            .journal
            .backup
            .map(|located| located.value)
            .unwrap_or(false);

        let mode_loc = self.outline.paragraph_mode.unwrap_or_else(|| {
            Located::new(ParagraphMode::default().as_str().to_owned(), fallback())
        });
        let paragraph_mode = match mode_loc.value.parse::<ParagraphMode>() {
            Ok(mode) => mode,
            Err(err) => {
                errors.push(ConfigValidationError::new(
                    Some(mode_loc.source.clone()),
                    format!("outline.paragraph_mode {err}"),
                ));
                ParagraphMode::default()
            }
        };

        let width = self
            .outline
            .indent_width
            .unwrap_or_else(|| Located::new(DEFAULT_INDENT_WIDTH, fallback()));
        if width.value == 0 || width.value > MAX_INDENT_WIDTH {
            errors.push(ConfigValidationError::new(
                Some(width.source.clone()),
                format!(
                    "outline.indent_width must be between 1 and {MAX_INDENT_WIDTH} (received {})",
                    width.value
                ),
            ));
        }

        let prefix = self
            .snipd
            .file_prefix
            .unwrap_or_else(|| Located::new(DEFAULT_FILE_PREFIX.to_owned(), fallback()));
        if prefix.value.contains(['/', '\\']) {
            errors.push(ConfigValidationError::new(
                Some(prefix.source.clone()),
                format!(
                    "snipd.file_prefix must not contain path separators (received '{}')",
                    prefix.value
                ),
            ));
        }

        let output_dir = self
            .snipd
            .output_dir
            .map(|located| expand_home(&located.value))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SPLIT_DIR));

        if !errors.is_empty() {
            return Err(ConfigValidationErrors(errors));
        }

        Ok(ResolvedConfig {
            journal: JournalSettings {
                directory,
                lookback_days: lookback.value,
                backup,
            },
            outline: OutlineSettings {
                paragraph_mode,
                indent_width: width.value,
            },
            snipd: SnipdSettings {
                file_prefix: prefix.value,
                output_dir,
            },
        })
    }
}

#[derive(Clone, Debug, Default)]
struct JournalPartial {
    directory: Option<Located<PathBuf>>,
    lookback_days: Option<Located<u32>>,
    backup: Option<Located<bool>>,
}

impl JournalPartial {
    fn merge(&mut self, other: JournalPartial) {
        if other.directory.is_some() {
            self.directory = other.directory;
        }
        if other.lookback_days.is_some() {
            self.lookback_days = other.lookback_days;
        }
        if other.backup.is_some() {
            self.backup = other.backup;
        }
    }
}

#[derive(Clone, Debug, Default)]
struct OutlinePartial {
    paragraph_mode: Option<Located<String>>,
    indent_width: Option<Located<usize>>,
}

impl OutlinePartial {
    fn merge(&mut self, other: OutlinePartial) {
        if other.paragraph_mode.is_some() {
            self.paragraph_mode = other.paragraph_mode;
        }
        if other.indent_width.is_some() {
            self.indent_width = other.indent_width;
        }
    }
}

#[derive(Clone, Debug, Default)]
struct SnipdPartial {
    file_prefix: Option<Located<String>>,
    output_dir: Option<Located<PathBuf>>,
}

impl SnipdPartial {
    fn merge(&mut self, other: SnipdPartial) {
        if other.file_prefix.is_some() {
            self.file_prefix = other.file_prefix;
        }
        if other.output_dir.is_some() {
            self.output_dir = other.output_dir;
        }
    }
}

#[derive(Clone, Debug)]
struct Located<T> {
    value: T,
    source: ConfigSource,
}

impl<T> Located<T> {
    fn new(value: T, source: ConfigSource) -> Self {
        Located { value, source }
    }
}

/// Container for validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

/// Validation failure with optional provenance.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub message: String,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        ConfigValidationError { source, message }
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(source) = &self.source {
            write!(f, " ({})", source.describe())?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    journal: Option<RawJournal>,
    #[serde(default)]
    outline: Option<RawOutline>,
    #[serde(default)]
    snipd: Option<RawSnipd>,
}

impl RawConfig {
    fn into_partial(self, source: ConfigSource) -> PartialConfig {
        PartialConfig {
            journal: self
                .journal
                .map(|journal| journal.into_partial(&source))
                .unwrap_or_default(),
            outline: self
                .outline
                .map(|outline| outline.into_partial(&source))
                .unwrap_or_default(),
            snipd: self
                .snipd
                .map(|snipd| snipd.into_partial(&source))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawJournal {
    #[serde(default)]
    directory: Option<PathBuf>,
    #[serde(default)]
    lookback_days: Option<u32>,
    #[serde(default)]
    backup: Option<bool>,
}

impl RawJournal {
    fn into_partial(self, source: &ConfigSource) -> JournalPartial {
        JournalPartial {
            directory: self
                .directory
                .map(|value| Located::new(value, source.clone())),
            lookback_days: self
                .lookback_days
                .map(|value| Located::new(value, source.clone())),
            backup: self.backup.map(|value| Located::new(value, source.clone())),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOutline {
    #[serde(default)]
    paragraph_mode: Option<String>,
    #[serde(default)]
    indent_width: Option<usize>,
}

impl RawOutline {
    fn into_partial(self, source: &ConfigSource) -> OutlinePartial {
        OutlinePartial {
            paragraph_mode: self
                .paragraph_mode
                .map(|value| Located::new(value, source.clone())),
            indent_width: self
                .indent_width
                .map(|value| Located::new(value, source.clone())),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSnipd {
    #[serde(default)]
    file_prefix: Option<String>,
    #[serde(default)]
    output_dir: Option<PathBuf>,
}

impl RawSnipd {
    fn into_partial(self, source: &ConfigSource) -> SnipdPartial {
        SnipdPartial {
            file_prefix: self
                .file_prefix
                .map(|value| Located::new(value, source.clone())),
            output_dir: self
                .output_dir
                .map(|value| Located::new(value, source.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_tilde_prefix_only() {
        let plain = PathBuf::from("/var/journals");
        assert_eq!(expand_home(&plain), plain);

        let relative = PathBuf::from("notes/~draft");
        assert_eq!(expand_home(&relative), relative);

        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_home(Path::new("~/logseq/journals")),
                home.join("logseq/journals")
            );
        }
    }

    #[test]
    fn describes_sources() {
        let source = ConfigSource::for_file(ConfigSourceKind::Local, PathBuf::from("/tmp/x.toml"));
        assert_eq!(source.describe(), "local config at /tmp/x.toml");
        let env_source = ConfigSource::without_file(ConfigSourceKind::Environment, PathBuf::from("."));
        assert_eq!(env_source.describe(), JOURNAL_DIR_ENV);
    }
}
