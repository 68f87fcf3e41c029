use std::path::PathBuf;

use anyhow::Result;

use super::Target;
use crate::config::TestConfig;
use crate::CommandContext;

pub const DIRTY_WORKTREE_MESSAGE: &str =
    "uncommitted changes in the working tree; commit or stash them first";

pub(crate) const DIST_DIR: &str = "dist";
pub(crate) const BUILD_DIR: &str = "build";
pub(crate) const MANIFEST_FILE: &str = "MANIFEST";
pub(crate) const INSTALL_RECORD: &str = "files.txt";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CommandSpec {
    pub(crate) program: String,
    pub(crate) args: Vec<String>,
    pub(crate) env: Vec<(String, String)>,
}

impl CommandSpec {
    fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.env.push((key.to_string(), value.into()));
        self
    }

    pub(crate) fn display(&self) -> String {
        let mut parts: Vec<String> = self
            .env
            .iter()
            .map(|(key, value)| format!("{key}={}", quote(value)))
            .collect();
        parts.push(quote(&self.program));
        parts.extend(self.args.iter().map(|arg| quote(arg)));
        parts.join(" ")
    }
}

fn quote(raw: &str) -> String {
    let plain = !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@%+,".contains(c));
    if plain {
        raw.to_string()
    } else {
        format!("'{}'", raw.replace('\'', r"'\''"))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    /// Run another target in full.
    Invoke(Target),
    Run(CommandSpec),
    /// Delete paths relative to the project root; missing paths are fine.
    Remove(Vec<PathBuf>),
    AssertClean,
    /// Upload every file in `dist/`; the file list is read when the step runs.
    Upload { twine: String, repository: String },
    /// Delete every path listed in the install record, then the record.
    UninstallRecorded(PathBuf),
}

impl Step {
    pub(crate) fn action(&self) -> &'static str {
        match self {
            Step::Invoke(_) => "invoke",
            Step::Run(_) => "run",
            Step::Remove(_) => "remove",
            Step::AssertClean => "assert-clean",
            Step::Upload { .. } => "upload",
            Step::UninstallRecorded(_) => "uninstall",
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Step::Invoke(target) => format!("skynet {target}"),
            Step::Run(spec) => spec.display(),
            Step::Remove(paths) => {
                let listed: Vec<String> = paths
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect();
                format!("rm -rf {}", listed.join(" "))
            }
            Step::AssertClean => "git status --porcelain".to_string(),
            Step::Upload { twine, repository } => {
                format!("{twine} upload -r {repository} {DIST_DIR}/*")
            }
            Step::UninstallRecorded(record) => format!("xargs rm -rf < {}", record.display()),
        }
    }
}

/// Steps of `target`, in execution order.
///
/// Nested targets are returned as [`Step::Invoke`] and expanded by the caller,
/// so tools are only resolved for targets that actually run.
pub(crate) fn recipe(ctx: &CommandContext, target: Target) -> Result<Vec<Step>> {
    let config = ctx.config();
    let steps = match target {
        Target::All => vec![Step::Invoke(Target::Build)],
        Target::NewDist => vec![Step::Invoke(Target::BumpUpload)],
        Target::BumpUpload => vec![Step::Invoke(Target::Bump), Step::Invoke(Target::Upload)],
        Target::Bump => vec![Step::Run(
            CommandSpec::new(&config.tools().bumpversion).arg(&config.version().part),
        )],
        Target::Upload => vec![
            Step::Invoke(Target::Clean),
            Step::Invoke(Target::Build),
            Step::Upload {
                twine: config.tools().twine.clone(),
                repository: config.publish().repository.clone(),
            },
            Step::Invoke(Target::Clean),
        ],
        Target::Build => vec![
            Step::Invoke(Target::AssertNotDirty),
            Step::Run(CommandSpec::new(ctx.python()?).args(["setup.py", "sdist"])),
        ],
        Target::Install => vec![Step::Run(CommandSpec::new(ctx.python()?).args([
            "setup.py",
            "install",
            "--record",
            INSTALL_RECORD,
        ]))],
        Target::Uninstall => vec![Step::UninstallRecorded(PathBuf::from(INSTALL_RECORD))],
        Target::Clean => {
            let mut paths = vec![PathBuf::from(DIST_DIR), PathBuf::from(BUILD_DIR)];
            paths.extend(config.project().egg_info_dirs().into_iter().map(PathBuf::from));
            paths.push(PathBuf::from(MANIFEST_FILE));
            vec![Step::Remove(paths)]
        }
        Target::Format => vec![Step::Run(
            CommandSpec::new(&config.tools().formatter).args(["-r", "-i", "-p", "."]),
        )],
        Target::Test => vec![Step::Invoke(Target::TestUnit)],
        Target::TestUnit => vec![Step::Run(discover_tests(
            ctx,
            crate::config::DEFAULT_TEST_PATTERN,
        )?)],
        Target::TestOneUnit => vec![Step::Run(discover_tests(ctx, &config.test().pattern)?)],
        Target::AssertNotDirty => vec![Step::AssertClean],
    };
    Ok(steps)
}

fn discover_tests(ctx: &CommandContext, pattern: &str) -> Result<CommandSpec> {
    let root = ctx.project_root().display().to_string();
    let pythonpath = match &ctx.config().pythonpath {
        Some(existing) => format!("{existing}:{root}"),
        None => root,
    };
    Ok(CommandSpec::new(ctx.python()?)
        .args(["-m", "unittest", "discover", "-v", "-s"])
        .arg(ctx.config().test().directory.display().to_string())
        .arg("-p")
        .arg(TestConfig::file_glob(pattern))
        .env("PYTHONPATH", pythonpath))
}
