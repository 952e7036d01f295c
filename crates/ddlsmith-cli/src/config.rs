use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::CliError;

pub const CONFIG_FILE: &str = "ddlsmith.toml";
pub const DEFAULT_TABLE: &str = "table.yaml";
pub const DEFAULT_DICTIONARY: &str = "dict.yaml";
pub const DEFAULT_DOMAINS: &str = "domains.yaml";

/// Settings read from `ddlsmith.toml`.
///
/// Relative paths are taken relative to the directory holding the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub dictionary: Option<PathBuf>,
    pub domains: Option<PathBuf>,
    pub table: Option<PathBuf>,
    pub strict: bool,
}

impl Config {
    pub fn parse(text: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        Ok(match path.parent() {
            Some(base) if !base.as_os_str().is_empty() => config.rebased(base),
            _ => config,
        })
    }

    /// An explicit path must exist; otherwise `ddlsmith.toml` in `cwd` is used
    /// when present.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self, CliError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let path = cwd.join(CONFIG_FILE);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    fn rebased(self, base: &Path) -> Self {
        let rebase = |path: Option<PathBuf>| path.map(|path| base.join(path));
        Self {
            dictionary: rebase(self.dictionary),
            domains: rebase(self.domains),
            table: rebase(self.table),
            strict: self.strict,
        }
    }
}

/// A document location together with whether the user asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPath {
    pub path: PathBuf,
    pub explicit: bool,
}

impl DocumentPath {
    /// Flag first, then the config file, then the built-in default.
    pub fn resolve(flag: Option<&Path>, configured: Option<&Path>, default: PathBuf) -> Self {
        match flag.or(configured) {
            Some(path) => Self {
                path: path.to_path_buf(),
                explicit: true,
            },
            None => Self {
                path: default,
                explicit: false,
            },
        }
    }
}

/// Directory holding the running executable, where the default dictionary
/// and domain documents live.
pub fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
