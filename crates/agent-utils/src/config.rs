//! Project path resolution
//!
//! The configuration reloader reads a single `.env` file that lives at a fixed
//! location relative to the project root. [`ProjectPaths`] pins that location
//! once at start-up so every consumer agrees on which file is "the" config.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file inside the project root
pub const ENV_FILE_NAME: &str = ".env";

/// Name of the template users copy to create [`ENV_FILE_NAME`]
pub const ENV_EXAMPLE_FILE_NAME: &str = ".env.example";

/// Environment variable that overrides the project root
pub const PROJECT_ROOT_VAR: &str = "TRADINGAGENTS_PROJECT_ROOT";

/// Resolved project locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPaths {
    /// Project root directory
    pub project_root: PathBuf,
    /// Configuration file read on reload
    pub env_file: PathBuf,
}

impl ProjectPaths {
    /// Paths rooted at `project_root`, with the env file at `<root>/.env`
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let env_file = project_root.join(ENV_FILE_NAME);
        Self {
            project_root,
            env_file,
        }
    }

    /// Resolve the project root from `TRADINGAGENTS_PROJECT_ROOT`, falling back
    /// to the current working directory
    pub fn from_env() -> std::io::Result<Self> {
        match std::env::var_os(PROJECT_ROOT_VAR) {
            Some(root) if !root.is_empty() => Ok(Self::new(PathBuf::from(root))),
            _ => Ok(Self::new(std::env::current_dir()?)),
        }
    }

    /// Override the configuration file location
    ///
    /// Relative paths are resolved against the project root.
    pub fn with_env_file(mut self, env_file: impl AsRef<Path>) -> Self {
        let env_file = env_file.as_ref();
        self.env_file = if env_file.is_absolute() {
            env_file.to_path_buf()
        } else {
            self.project_root.join(env_file)
        };
        self
    }

    /// Configuration file read on reload
    pub fn env_file(&self) -> &Path {
        &self.env_file
    }

    /// Template file shipped next to the configuration file
    pub fn env_example_file(&self) -> PathBuf {
        self.env_file
            .parent()
            .unwrap_or(&self.project_root)
            .join(ENV_EXAMPLE_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_file_under_root() {
        let paths = ProjectPaths::new("/srv/tradingagents");
        assert_eq!(paths.env_file(), Path::new("/srv/tradingagents/.env"));
        assert_eq!(
            paths.env_example_file(),
            PathBuf::from("/srv/tradingagents/.env.example")
        );
    }

    #[test]
    fn test_relative_override_resolves_against_root() {
        let paths = ProjectPaths::new("/srv/app").with_env_file("config/prod.env");
        assert_eq!(paths.env_file(), Path::new("/srv/app/config/prod.env"));
        assert_eq!(
            paths.env_example_file(),
            PathBuf::from("/srv/app/config/.env.example")
        );
    }

    #[test]
    fn test_absolute_override_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("custom.env");
        let paths = ProjectPaths::new("/srv/app").with_env_file(&file);
        assert_eq!(paths.env_file(), file.as_path());
    }
}
