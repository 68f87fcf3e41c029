use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde_json::json;

use crate::config::{Config, ConfigOverrides, EnvSnapshot, GlobalOptions};
use crate::effects::{self, SharedEffects};
use crate::{CommandGroup, UserError};

#[derive(Clone, Copy, Debug)]
pub struct CommandInfo {
    pub group: CommandGroup,
    pub name: &'static str,
}

impl CommandInfo {
    #[must_use]
    pub const fn new(group: CommandGroup, name: &'static str) -> Self {
        Self { group, name }
    }
}

pub struct CommandContext<'a> {
    pub global: &'a GlobalOptions,
    config: Config,
    project_root: PathBuf,
    python: OnceLock<String>,
    effects: SharedEffects,
}

impl<'a> CommandContext<'a> {
    /// Creates a new command context with the provided global options.
    ///
    /// # Errors
    /// Returns an error if the working directory cannot be resolved.
    pub fn new(
        global: &'a GlobalOptions,
        overrides: &ConfigOverrides,
        effects: SharedEffects,
    ) -> Result<Self> {
        let env = EnvSnapshot::capture();
        let config = Config::from_snapshot(&env, overrides);
        let project_root = match &global.directory {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => std::env::current_dir()
                .context("unable to determine current directory")?
                .join(dir),
            None => std::env::current_dir().context("unable to determine current directory")?,
        };
        Ok(Self::with_config(global, config, project_root, effects))
    }

    pub(crate) fn with_config(
        global: &'a GlobalOptions,
        config: Config,
        project_root: PathBuf,
        effects: SharedEffects,
    ) -> Self {
        Self {
            global,
            config,
            project_root,
            python: OnceLock::new(),
            effects,
        }
    }

    pub fn fs(&self) -> &dyn effects::FileSystem {
        self.effects.fs()
    }

    pub fn git(&self) -> &dyn effects::GitClient {
        self.effects.git()
    }

    pub fn processes(&self) -> &dyn effects::ProcessRunner {
        self.effects.processes()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Resolves the Python interpreter used for setup.py and test discovery.
    ///
    /// # Errors
    /// Returns a user error when no interpreter is configured or on `PATH`.
    pub fn python(&self) -> Result<String> {
        if let Some(python) = self.python.get() {
            return Ok(python.clone());
        }
        let python = match &self.config.tools.python {
            Some(explicit) => explicit.clone(),
            None => ["python3", "python"]
                .iter()
                .find_map(|candidate| self.processes().locate(candidate))
                .map(|path| path.to_string_lossy().to_string())
                .ok_or_else(|| {
                    UserError::new(
                        "no Python interpreter found",
                        json!({
                            "reason": "python_missing",
                            "hint": "install python3 or set SKYNET_PYTHON",
                        }),
                    )
                })?,
        };
        let _ = self.python.set(python.clone());
        Ok(python)
    }
}
