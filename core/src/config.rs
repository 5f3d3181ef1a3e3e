/// Configuration management
use crate::error::{AppError, Result};
use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = ".commonplace";

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the kv store and the optional `catalog.json`
    pub data_dir: PathBuf,

    /// Colorize terminal output
    pub color: bool,

    /// Command and its arguments, with global flags removed
    pub command: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            color: true,
            command: Vec::new(),
        }
    }
}

impl Config {
    /// Create config from command line arguments (`args[0]` is the binary)
    ///
    /// Global flags may appear anywhere: `--data-dir <path>`, `--no-color`.
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut data_dir: Option<PathBuf> = None;
        let mut color = true;
        let mut command = Vec::new();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--data-dir" => {
                    let path = args.get(i + 1).ok_or_else(|| {
                        AppError::Config("--data-dir requires a path argument".to_string())
                    })?;
                    data_dir = Some(PathBuf::from(path));
                    i += 2;
                }
                "--no-color" => {
                    color = false;
                    i += 1;
                }
                other => {
                    command.push(other.to_string());
                    i += 1;
                }
            }
        }

        // Env overrides, flags win
        if data_dir.is_none() {
            if let Ok(dir) = std::env::var("COMMONPLACE_DATA_DIR") {
                if !dir.is_empty() {
                    data_dir = Some(PathBuf::from(dir));
                }
            }
        }
        if std::env::var_os("NO_COLOR").is_some() {
            color = false;
        }

        Ok(Self {
            data_dir: data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            color,
            command,
        })
    }
}
