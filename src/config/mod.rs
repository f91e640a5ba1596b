//! Repository-local configuration: `.mygit/config`, INI-style, read once at
//! startup alongside the state cache.
//!
//! Recognised keys are `core.ignorefile` (default `.mygit_ignore`) and
//! `core.verbose` (boolean, raises the tracing filter to `debug`). Unknown
//! sections and keys are ignored rather than rejected.

mod parser;

use crate::error::Result;
use crate::infra::fs::Fs;

const DEFAULT_IGNORE_FILE: &str = ".mygit_ignore";

/// A parsed `.mygit/config`, or the defaults if the file does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub ignorefile: String,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ignorefile: DEFAULT_IGNORE_FILE.to_string(),
            verbose: false,
        }
    }
}

impl Config {
    /// Loads `path` if it exists; an absent file yields all defaults.
    pub fn load(fs: &dyn Fs, path: &str) -> Result<Self> {
        if !fs.exists(path) {
            return Ok(Config::default());
        }
        let text = fs.read_text(path)?;
        Ok(Self::parse(&text))
    }

    fn parse(text: &str) -> Self {
        let sections = parser::parse(text);
        let mut config = Config::default();

        if let Some(core) = sections.get("core") {
            if let Some(ignorefile) = core.get("ignorefile") {
                if !ignorefile.is_empty() {
                    config.ignorefile = ignorefile.clone();
                }
            }
            if let Some(verbose) = core.get("verbose") {
                config.verbose = parse_bool(verbose);
            }
        }

        config
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "yes" | "on" | "1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::fs::MemFs;

    #[test]
    fn test_missing_file_is_default() {
        let fs = MemFs::new();
        let config = Config::load(&fs, ".mygit/config").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_ignorefile() {
        let fs = MemFs::new();
        fs.write_text(".mygit/config", "[core]\nignorefile = .myignore\n").unwrap();
        let config = Config::load(&fs, ".mygit/config").unwrap();
        assert_eq!(config.ignorefile, ".myignore");
    }

    #[test]
    fn test_load_verbose() {
        let fs = MemFs::new();
        fs.write_text(".mygit/config", "[core]\nverbose = true\n").unwrap();
        let config = Config::load(&fs, ".mygit/config").unwrap();
        assert!(config.verbose);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let fs = MemFs::new();
        fs.write_text(".mygit/config", "[user]\nname = someone\n").unwrap();
        let config = Config::load(&fs, ".mygit/config").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_empty_ignorefile_value_keeps_default() {
        let fs = MemFs::new();
        fs.write_text(".mygit/config", "[core]\nignorefile =\n").unwrap();
        let config = Config::load(&fs, ".mygit/config").unwrap();
        assert_eq!(config.ignorefile, DEFAULT_IGNORE_FILE);
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.ignorefile, ".mygit_ignore");
        assert!(!config.verbose);
    }
}
