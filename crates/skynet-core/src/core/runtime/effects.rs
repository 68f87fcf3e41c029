use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use super::process::{run_command, run_command_passthrough, RunOutput};

pub trait ProcessRunner: Send + Sync {
    /// Resolves a program name against `PATH`.
    fn locate(&self, program: &str) -> Option<PathBuf>;
    /// Runs with stdio inherited from `skynet`.
    fn run_passthrough(
        &self,
        program: &str,
        args: &[String],
        env: &[(String, String)],
        cwd: &Path,
    ) -> Result<RunOutput>;
    /// Runs with stdout/stderr collected, leaving `skynet`'s own stdout alone.
    fn run_captured(
        &self,
        program: &str,
        args: &[String],
        env: &[(String, String)],
        cwd: &Path,
    ) -> Result<RunOutput>;
}

pub trait GitClient: Send + Sync {
    /// Porcelain status lines for `root`, or `None` when git cannot inspect it.
    fn worktree_changes(&self, root: &Path) -> Result<Option<Vec<String>>>;
}

pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    fn list_files(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

pub trait Effects: Send + Sync {
    fn processes(&self) -> &dyn ProcessRunner;
    fn git(&self) -> &dyn GitClient;
    fn fs(&self) -> &dyn FileSystem;
}

pub struct SystemEffects {
    processes: Arc<SystemProcessRunner>,
    git: Arc<SystemGit>,
    fs: Arc<SystemFileSystem>,
}

impl SystemEffects {
    #[must_use]
    pub fn new() -> Self {
        Self {
            processes: Arc::new(SystemProcessRunner),
            git: Arc::new(SystemGit),
            fs: Arc::new(SystemFileSystem),
        }
    }
}

impl Default for SystemEffects {
    fn default() -> Self {
        Self::new()
    }
}

impl Effects for SystemEffects {
    fn processes(&self) -> &dyn ProcessRunner {
        self.processes.as_ref()
    }

    fn git(&self) -> &dyn GitClient {
        self.git.as_ref()
    }

    fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }
}

struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    fn run_passthrough(
        &self,
        program: &str,
        args: &[String],
        env: &[(String, String)],
        cwd: &Path,
    ) -> Result<RunOutput> {
        run_command_passthrough(program, args, env, cwd)
    }

    fn run_captured(
        &self,
        program: &str,
        args: &[String],
        env: &[(String, String)],
        cwd: &Path,
    ) -> Result<RunOutput> {
        run_command(program, args, env, cwd)
    }
}

struct SystemGit;

impl GitClient for SystemGit {
    fn worktree_changes(&self, root: &Path) -> Result<Option<Vec<String>>> {
        let args = ["status".to_string(), "--porcelain".to_string()];
        match run_command("git", &args, &[], root) {
            Ok(out) if out.success() => {
                let lines = out
                    .stdout
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(ToString::to_string)
                    .collect::<Vec<_>>();
                Ok(Some(lines))
            }
            Ok(out) => {
                tracing::debug!(code = out.code, stderr = %out.stderr.trim(), "git status failed");
                Ok(None)
            }
            Err(err) => {
                tracing::debug!(error = %err, "git unavailable");
                Ok(None)
            }
        }
    }
}

pub(crate) struct SystemFileSystem;

impl FileSystem for SystemFileSystem {
    fn exists(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path)
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).with_context(|| format!("removing file {}", path.display()))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::remove_dir_all(path).with_context(|| format!("removing dir {}", path.display()))
    }

    fn list_files(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in
            std::fs::read_dir(path).with_context(|| format!("reading dir {}", path.display()))?
        {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }
}

pub type SharedEffects = Arc<dyn Effects>;
