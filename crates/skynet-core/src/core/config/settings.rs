use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::UserError;

pub const DEFAULT_PART: &str = "patch";
pub const DEFAULT_TEST_PATTERN: &str = "test_*";
pub const DEFAULT_PROJECT_NAME: &str = "skynet-application";
pub const DEFAULT_REPOSITORY: &str = "pypi";
pub const UNIT_TEST_DIR: &str = "tests/unit";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalOptions {
    pub quiet: bool,
    pub verbose: u8,
    pub trace: bool,
    pub json: bool,
    pub dry_run: bool,
    pub directory: Option<PathBuf>,
}

/// Values given on the command line; they win over the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigOverrides {
    pub part: Option<String>,
    pub test: Option<String>,
    pub project_name: Option<String>,
    pub repository: Option<String>,
}

impl ConfigOverrides {
    /// Applies a make-style `KEY=VALUE` assignment.
    ///
    /// # Errors
    /// Returns an error for malformed assignments or unknown keys.
    pub fn assign(&mut self, raw: &str) -> Result<(), UserError> {
        let Some((key, value)) = raw.split_once('=') else {
            return Err(UserError::new(
                format!("expected VAR=VALUE, got `{raw}`"),
                json!({ "reason": "invalid_assignment", "assignment": raw }),
            ));
        };
        let value = value.trim().to_string();
        match key.trim() {
            "PART" => self.part = Some(value),
            "TEST" => self.test = Some(value),
            "PROJECT_NAME" => self.project_name = Some(value),
            "REPOSITORY_NAME" => self.repository = Some(value),
            other => {
                return Err(UserError::new(
                    format!("unknown variable `{other}`"),
                    json!({
                        "reason": "unknown_variable",
                        "variable": other,
                        "hint": "known variables: PART, TEST, PROJECT_NAME, REPOSITORY_NAME",
                    }),
                ))
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub(crate) fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    pub(crate) fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    #[cfg(test)]
    pub(crate) fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) project: ProjectConfig,
    pub(crate) version: VersionConfig,
    pub(crate) test: TestConfig,
    pub(crate) publish: PublishConfig,
    pub(crate) tools: ToolConfig,
    pub(crate) pythonpath: Option<String>,
}

impl Config {
    /// Builds a configuration from the current process environment.
    #[must_use]
    pub fn from_env(overrides: &ConfigOverrides) -> Self {
        Self::from_snapshot(&EnvSnapshot::capture(), overrides)
    }

    pub(crate) fn from_snapshot(
        snapshot: &EnvSnapshot,
        overrides: &ConfigOverrides,
    ) -> Self {
        let pick = |flag: Option<&String>, key: &str, default: &str| -> String {
            flag.map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .or_else(|| snapshot.var(key).map(|value| value.trim().to_string()))
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            project: ProjectConfig {
                name: pick(
                    overrides.project_name.as_ref(),
                    "PROJECT_NAME",
                    DEFAULT_PROJECT_NAME,
                ),
            },
            version: VersionConfig {
                part: pick(overrides.part.as_ref(), "PART", DEFAULT_PART),
            },
            test: TestConfig {
                pattern: pick(overrides.test.as_ref(), "TEST", DEFAULT_TEST_PATTERN),
                directory: PathBuf::from(UNIT_TEST_DIR),
            },
            publish: PublishConfig {
                repository: pick(
                    overrides.repository.as_ref(),
                    "REPOSITORY_NAME",
                    DEFAULT_REPOSITORY,
                ),
            },
            tools: ToolConfig {
                python: snapshot.var("SKYNET_PYTHON").map(ToOwned::to_owned),
                bumpversion: pick(None, "SKYNET_BUMPVERSION", "bumpversion"),
                twine: pick(None, "SKYNET_TWINE", "twine"),
                formatter: pick(None, "SKYNET_FORMATTER", "yapf"),
            },
            pythonpath: snapshot.var("PYTHONPATH").map(ToOwned::to_owned),
        }
    }

    #[must_use]
    pub fn project(&self) -> &ProjectConfig {
        &self.project
    }

    #[must_use]
    pub fn version(&self) -> &VersionConfig {
        &self.version
    }

    #[must_use]
    pub fn test(&self) -> &TestConfig {
        &self.test
    }

    #[must_use]
    pub fn publish(&self) -> &PublishConfig {
        &self.publish
    }

    #[must_use]
    pub fn tools(&self) -> &ToolConfig {
        &self.tools
    }
}

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub name: String,
}

impl ProjectConfig {
    /// Egg-info directory names setuptools may produce for this project.
    #[must_use]
    pub fn egg_info_dirs(&self) -> Vec<String> {
        let mut dirs = vec![format!("{}.egg-info", self.name)];
        let normalized = format!("{}.egg-info", self.name.replace('-', "_"));
        if !dirs.contains(&normalized) {
            dirs.push(normalized);
        }
        dirs
    }
}

/// `part` is handed to bumpversion verbatim; its own config decides which
/// parts exist.
#[derive(Debug, Clone)]
pub struct VersionConfig {
    pub part: String,
}

#[derive(Debug, Clone)]
pub struct TestConfig {
    pub pattern: String,
    pub directory: PathBuf,
}

impl TestConfig {
    /// File-name glob handed to the discovery runner for a test name.
    #[must_use]
    pub fn file_glob(name: &str) -> String {
        if std::path::Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("py"))
        {
            name.to_string()
        } else {
            format!("{name}.py")
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub repository: String,
}

#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub python: Option<String>,
    pub bumpversion: String,
    pub twine: String,
    pub formatter: String,
}
