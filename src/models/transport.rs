use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// External programs hosts shell out to. Each entry is a program followed by
/// any leading arguments; the host appends its own operands.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Transport {
    /// Invoked as `remote_shell... HOST 'quoted command'`.
    pub remote_shell: Vec<String>,
    /// Invoked as `file_sync... SRC DST`, either side may be `HOST:PATH`.
    pub file_sync: Vec<String>,
    /// Invoked as `mover... SRC DST`.
    pub mover: Vec<String>,
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            remote_shell: vec!["ssh".into()],
            file_sync: vec!["rsync".into(), "-ut".into()],
            mover: vec!["mv".into()],
        }
    }
}

impl Transport {
    /// Parses TOML; every entry that is present must name a program.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let transport: Self =
            toml::from_str(source).map_err(|e| Error::Transport(e.to_string()))?;
        transport.validate()?;
        Ok(transport)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let config_error = |message: String| Error::Config {
            path: path.to_path_buf(),
            message,
        };
        let source = fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let transport = Self::from_toml_str(&source).map_err(|e| match e {
            Error::Transport(message) => config_error(message),
            other => other,
        })?;
        log::debug!("Loaded transport from {}: {:?}", path.display(), transport);
        Ok(transport)
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("remote_shell", &self.remote_shell),
            ("file_sync", &self.file_sync),
            ("mover", &self.mover),
        ] {
            if value.is_empty() {
                return Err(Error::Transport(format!("'{}' must name a program", key)));
            }
        }
        Ok(())
    }
}
