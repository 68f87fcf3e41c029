use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use super::recipe::{recipe, CommandSpec, Step, DIRTY_WORKTREE_MESSAGE, DIST_DIR};
use super::Target;
use crate::{CommandContext, ExecutionOutcome, UserError};

/// Exit status a shell reports for a command it cannot find.
const COMMAND_NOT_FOUND: i32 = 127;

#[derive(Clone, Debug, Serialize)]
pub(crate) struct StepRecord {
    target: Target,
    action: &'static str,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    removed: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stderr: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
struct PlannedStep {
    target: Target,
    depth: usize,
    action: &'static str,
    description: String,
}

enum Flow {
    Continue,
    Stop(ExecutionOutcome),
}

/// Runs `target` and everything it is composed of.
///
/// Steps run strictly in order; the first failing step stops the whole
/// chain and its outcome is returned.
///
/// # Errors
/// Returns an error when a step fails for reasons other than the tool's own
/// exit status (for example, a path that cannot be removed).
pub fn run_target(ctx: &CommandContext, target: Target) -> Result<ExecutionOutcome> {
    if ctx.global.dry_run {
        return plan_target(ctx, target);
    }

    let mut engine = Engine {
        ctx,
        records: Vec::new(),
        stack: Vec::new(),
    };
    let flow = match engine.run(target) {
        Ok(flow) => flow,
        Err(err) => match err.downcast::<UserError>() {
            Ok(user) => Flow::Stop(user.into_outcome()),
            Err(err) => return Err(err),
        },
    };
    let steps = serde_json::to_value(&engine.records)?;
    let outcome = match flow {
        Flow::Continue => success_outcome(ctx, target, &engine.records),
        Flow::Stop(outcome) => outcome,
    };
    Ok(outcome
        .with_detail("target", json!(target))
        .with_detail("steps", steps))
}

fn plan_target(ctx: &CommandContext, target: Target) -> Result<ExecutionOutcome> {
    let mut planned = Vec::new();
    if let Err(err) = expand_plan(ctx, target, 0, &mut planned) {
        return match err.downcast::<UserError>() {
            Ok(user) => Ok(user.into_outcome()),
            Err(err) => Err(err),
        };
    }
    let message = format!("dry-run ({} steps)", planned.len());
    let details = json!({
        "target": target,
        "dry_run": true,
        "plan": planned,
    });
    Ok(ExecutionOutcome::success(message, details))
}

fn expand_plan(
    ctx: &CommandContext,
    target: Target,
    depth: usize,
    planned: &mut Vec<PlannedStep>,
) -> Result<()> {
    for step in recipe(ctx, target)? {
        if let Step::Invoke(nested) = step {
            expand_plan(ctx, nested, depth + 1, planned)?;
            continue;
        }
        planned.push(PlannedStep {
            target,
            depth,
            action: step.action(),
            description: step.describe(),
        });
    }
    Ok(())
}

struct Engine<'a, 'ctx> {
    ctx: &'a CommandContext<'ctx>,
    records: Vec<StepRecord>,
    stack: Vec<Target>,
}

impl Engine<'_, '_> {
    fn run(&mut self, target: Target) -> Result<Flow> {
        if self.stack.contains(&target) {
            bail!("target `{target}` depends on itself");
        }
        self.stack.push(target);
        debug!(%target, "running target");
        let flow = self.run_steps(target);
        self.stack.pop();
        flow
    }

    fn run_steps(&mut self, target: Target) -> Result<Flow> {
        for step in recipe(self.ctx, target)? {
            let flow = match &step {
                Step::Invoke(nested) => self.run(*nested)?,
                Step::Run(spec) => self.run_command(target, &step, spec)?,
                Step::Remove(paths) => self.remove_paths(target, &step, paths)?,
                Step::AssertClean => self.assert_clean(target, &step)?,
                Step::Upload { twine, repository } => {
                    self.upload(target, twine, repository)?
                }
                Step::UninstallRecorded(record) => self.uninstall(target, &step, record)?,
            };
            if let Flow::Stop(outcome) = flow {
                return Ok(Flow::Stop(outcome));
            }
        }
        Ok(Flow::Continue)
    }

    fn record(&mut self, target: Target, step: &Step) -> &mut StepRecord {
        self.records.push(StepRecord {
            target,
            action: step.action(),
            description: step.describe(),
            exit_code: None,
            removed: Vec::new(),
            stdout: None,
            stderr: None,
        });
        let last = self.records.len() - 1;
        &mut self.records[last]
    }

    fn run_command(&mut self, target: Target, step: &Step, spec: &CommandSpec) -> Result<Flow> {
        let root = self.ctx.project_root().to_path_buf();
        info!(%target, command = %spec.display(), "running");
        // JSON mode owns stdout, so tool output goes into the step record.
        let captured = self.ctx.global.json;
        let processes = self.ctx.processes();
        let result = if captured {
            processes.run_captured(&spec.program, &spec.args, &spec.env, &root)
        } else {
            processes.run_passthrough(&spec.program, &spec.args, &spec.env, &root)
        };
        let output = match result {
            Ok(output) => output,
            Err(err) => {
                debug!(error = %err, program = %spec.program, "spawn failed");
                self.record(target, step).exit_code = Some(COMMAND_NOT_FOUND);
                return Ok(Flow::Stop(ExecutionOutcome::failure(
                    format!("`{}` could not be started", spec.program),
                    json!({
                        "reason": "tool_missing",
                        "command": spec.display(),
                        "exit_code": COMMAND_NOT_FOUND,
                        "error": err.to_string(),
                        "hint": format!("is `{}` installed and on PATH?", spec.program),
                    }),
                )));
            }
        };
        let code = output.code;
        let record = self.record(target, step);
        record.exit_code = Some(code);
        if captured {
            record.stdout = Some(output.stdout.clone());
            record.stderr = Some(output.stderr.clone());
        }
        if code == 0 {
            return Ok(Flow::Continue);
        }
        let mut details = json!({
            "reason": "tool_failed",
            "command": spec.display(),
            "exit_code": code,
        });
        if captured {
            details["stdout"] = json!(output.stdout);
            details["stderr"] = json!(output.stderr);
        }
        Ok(Flow::Stop(ExecutionOutcome::failure(
            format!("`{}` exited with status {code}", spec.display()),
            details,
        )))
    }

    fn remove_paths(&mut self, target: Target, step: &Step, paths: &[PathBuf]) -> Result<Flow> {
        let root = self.ctx.project_root().to_path_buf();
        let mut removed = Vec::new();
        for relative in paths {
            let path = root.join(relative);
            if remove_path(self.ctx, &path)? {
                removed.push(relative.display().to_string());
            }
        }
        debug!(%target, ?removed, "removed paths");
        self.record(target, step).removed = removed;
        Ok(Flow::Continue)
    }

    fn assert_clean(&mut self, target: Target, step: &Step) -> Result<Flow> {
        let ctx = self.ctx;
        let root = ctx.project_root();
        let changes = ctx.git().worktree_changes(root)?;
        self.record(target, step);
        match changes {
            Some(changes) if changes.is_empty() => Ok(Flow::Continue),
            Some(changes) => Ok(Flow::Stop(ExecutionOutcome::user_error(
                DIRTY_WORKTREE_MESSAGE,
                json!({
                    "reason": "dirty_worktree",
                    "changes": changes,
                    "hint": "commit or stash your changes, then rerun",
                }),
            ))),
            None => Ok(Flow::Stop(ExecutionOutcome::user_error(
                "unable to inspect the working tree",
                json!({
                    "reason": "vcs_unavailable",
                    "project_root": root.display().to_string(),
                    "hint": "run inside a git repository with git on PATH",
                }),
            ))),
        }
    }

    fn upload(&mut self, target: Target, twine: &str, repository: &str) -> Result<Flow> {
        let root = self.ctx.project_root().to_path_buf();
        let dist = root.join(DIST_DIR);
        let artifacts = if self.ctx.fs().is_dir(&dist) {
            self.ctx.fs().list_files(&dist)?
        } else {
            Vec::new()
        };
        if artifacts.is_empty() {
            return Ok(Flow::Stop(ExecutionOutcome::user_error(
                format!("no distribution artifacts in {DIST_DIR}/"),
                json!({
                    "reason": "no_artifacts",
                    "dist_dir": dist.display().to_string(),
                    "hint": "run `skynet build` first",
                }),
            )));
        }
        let mut spec = CommandSpec {
            program: twine.to_string(),
            args: vec!["upload".into(), "-r".into(), repository.to_string()],
            env: Vec::new(),
        };
        spec.args.extend(
            artifacts
                .iter()
                .map(|path| relative_display(path, &root)),
        );
        let step = Step::Run(spec.clone());
        self.run_command(target, &step, &spec)
    }

    fn uninstall(&mut self, target: Target, step: &Step, record: &Path) -> Result<Flow> {
        let root = self.ctx.project_root().to_path_buf();
        let record_path = root.join(record);
        if !self.ctx.fs().exists(&record_path) {
            return Ok(Flow::Stop(ExecutionOutcome::user_error(
                format!("{} not found", record.display()),
                json!({
                    "reason": "install_record_missing",
                    "record": record_path.display().to_string(),
                    "hint": "run `skynet install` first",
                }),
            )));
        }
        let contents = self.ctx.fs().read_to_string(&record_path)?;
        let mut removed = Vec::new();
        for line in contents.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let listed = PathBuf::from(line);
            let path = if listed.is_absolute() {
                listed
            } else {
                root.join(listed)
            };
            if remove_path(self.ctx, &path)? {
                removed.push(line.to_string());
            }
        }
        self.ctx.fs().remove_file(&record_path)?;
        self.record(target, step).removed = removed;
        Ok(Flow::Continue)
    }
}

fn remove_path(ctx: &CommandContext, path: &Path) -> Result<bool> {
    let fs = ctx.fs();
    if !fs.exists(path) {
        return Ok(false);
    }
    if fs.is_dir(path) {
        fs.remove_dir_all(path)?;
    } else {
        fs.remove_file(path)?;
    }
    Ok(true)
}

fn relative_display(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn success_outcome(ctx: &CommandContext, target: Target, records: &[StepRecord]) -> ExecutionOutcome {
    let config = ctx.config();
    let removed: usize = records
        .iter()
        .filter(|record| record.target == target)
        .map(|record| record.removed.len())
        .sum();
    let message = match target {
        Target::AssertNotDirty => {
            return ExecutionOutcome::success("", json!({ "passthrough": true }));
        }
        Target::All | Target::Build => "source distribution built".to_string(),
        Target::Upload => format!("uploaded to {}", config.publish().repository),
        Target::Bump => format!("bumped {} version", config.version().part),
        Target::BumpUpload | Target::NewDist => format!(
            "released new {} version to {}",
            config.version().part,
            config.publish().repository
        ),
        Target::Install => "installed (record: files.txt)".to_string(),
        Target::Uninstall => format!("removed {removed} installed paths"),
        Target::Clean if removed == 0 => "nothing to clean".to_string(),
        Target::Clean => format!("removed {removed} paths"),
        Target::Format => "sources formatted".to_string(),
        Target::Test | Target::TestUnit | Target::TestOneUnit => "tests passed".to_string(),
    };
    ExecutionOutcome::success(message, json!({}))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use super::*;
    use crate::config::{Config, ConfigOverrides, EnvSnapshot, GlobalOptions};
    use crate::effects::testing::RecordingEffects;
    use crate::CommandStatus;
    use tempfile::TempDir;

    struct Harness {
        temp: TempDir,
        effects: Arc<RecordingEffects>,
    }

    impl Harness {
        fn new(effects: RecordingEffects) -> Self {
            Self {
                temp: tempfile::tempdir().expect("tempdir"),
                effects: Arc::new(effects),
            }
        }

        fn root(&self) -> &Path {
            self.temp.path()
        }

        fn run(&self, target: Target) -> ExecutionOutcome {
            self.run_with(target, &GlobalOptions::default(), &[])
        }

        fn run_with(
            &self,
            target: Target,
            global: &GlobalOptions,
            env: &[(&str, &str)],
        ) -> ExecutionOutcome {
            let mut pairs = vec![("SKYNET_PYTHON", "python3")];
            pairs.extend_from_slice(env);
            let config =
                Config::from_snapshot(&EnvSnapshot::testing(&pairs), &ConfigOverrides::default());
            let ctx = CommandContext::with_config(
                global,
                config,
                self.root().to_path_buf(),
                self.effects.clone(),
            );
            run_target(&ctx, target).expect("run target")
        }

        fn touch(&self, relative: &str) {
            let path = self.root().join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, b"x").unwrap();
        }
    }

    #[test]
    fn assert_not_dirty_is_silent_when_clean() {
        let harness = Harness::new(RecordingEffects::clean_tree());
        let outcome = harness.run(Target::AssertNotDirty);
        assert_eq!(outcome.status, CommandStatus::Ok);
        assert!(outcome.message.is_empty());
        assert_eq!(outcome.details["passthrough"], true);
    }

    #[test]
    fn assert_not_dirty_fails_with_fixed_message() {
        let harness = Harness::new(RecordingEffects::dirty_tree(&[" M setup.py", "?? notes.txt"]));
        let outcome = harness.run(Target::AssertNotDirty);
        assert_eq!(outcome.status, CommandStatus::UserError);
        assert_eq!(outcome.message, DIRTY_WORKTREE_MESSAGE);
        assert_eq!(outcome.details["changes"][1], "?? notes.txt");
    }

    #[test]
    fn assert_not_dirty_fails_outside_repository() {
        let harness = Harness::new(RecordingEffects::without_git());
        let outcome = harness.run(Target::AssertNotDirty);
        assert_eq!(outcome.status, CommandStatus::UserError);
        assert_eq!(outcome.details["reason"], "vcs_unavailable");
    }

    #[test]
    fn clean_removes_artifacts_and_is_idempotent() {
        let harness = Harness::new(RecordingEffects::clean_tree());
        harness.touch("dist/skynet-application-0.0.1.tar.gz");
        harness.touch("build/lib/skynet/__init__.py");
        harness.touch("skynet_application.egg-info/PKG-INFO");
        harness.touch("MANIFEST");
        harness.touch("setup.py");

        let first = harness.run(Target::Clean);
        assert_eq!(first.status, CommandStatus::Ok);
        assert_eq!(first.message, "removed 4 paths");
        for path in ["dist", "build", "skynet_application.egg-info", "MANIFEST"] {
            assert!(!harness.root().join(path).exists(), "{path} should be gone");
        }
        assert!(harness.root().join("setup.py").exists());

        let second = harness.run(Target::Clean);
        assert_eq!(second.status, CommandStatus::Ok);
        assert_eq!(second.message, "nothing to clean");
        assert!(harness.effects.lines().is_empty());
    }

    #[test]
    fn build_refuses_dirty_tree_without_building() {
        let harness = Harness::new(RecordingEffects::dirty_tree(&[" M skynet/types.py"]));
        let outcome = harness.run(Target::Build);
        assert_eq!(outcome.status, CommandStatus::UserError);
        assert_eq!(outcome.message, DIRTY_WORKTREE_MESSAGE);
        assert!(harness.effects.lines().is_empty());
        assert!(!harness.root().join("dist").exists());
    }

    #[test]
    fn build_runs_sdist_exactly_once() {
        let harness = Harness::new(RecordingEffects::clean_tree());
        let outcome = harness.run(Target::Build);
        assert_eq!(outcome.status, CommandStatus::Ok);
        assert_eq!(harness.effects.lines(), vec!["python3 setup.py sdist"]);
        let steps = outcome.details["steps"].as_array().unwrap();
        assert_eq!(steps[0]["action"], "assert-clean");
        assert_eq!(steps[0]["target"], "assert-not-dirty");
        assert_eq!(steps[1]["exit_code"], 0);
    }

    #[test]
    fn upload_runs_clean_build_upload_clean_in_order() {
        let harness = Harness::new(RecordingEffects::clean_tree());
        harness.touch("dist/stale-0.0.0.tar.gz");

        let outcome = harness.run(Target::Upload);
        assert_eq!(outcome.status, CommandStatus::Ok, "{outcome:?}");
        assert_eq!(
            harness.effects.lines(),
            vec![
                "python3 setup.py sdist",
                "twine upload -r pypi dist/skynet-application-0.0.1.tar.gz",
            ]
        );
        let actions: Vec<(String, String)> = outcome.details["steps"]
            .as_array()
            .unwrap()
            .iter()
            .map(|step| {
                (
                    step["target"].as_str().unwrap().to_string(),
                    step["action"].as_str().unwrap().to_string(),
                )
            })
            .collect();
        let expected = [
            ("clean", "remove"),
            ("assert-not-dirty", "assert-clean"),
            ("build", "run"),
            ("upload", "run"),
            ("clean", "remove"),
        ];
        let expected: Vec<(String, String)> = expected
            .iter()
            .map(|(t, a)| ((*t).to_string(), (*a).to_string()))
            .collect();
        assert_eq!(actions, expected);
        assert!(!harness.root().join("dist").exists());
    }

    #[test]
    fn upload_stops_after_failed_build() {
        let harness = Harness::new(RecordingEffects::clean_tree().failing("sdist", 1));
        let outcome = harness.run(Target::Upload);
        assert_eq!(outcome.status, CommandStatus::Failure);
        assert_eq!(outcome.tool_exit_code(), Some(1));
        assert_eq!(harness.effects.lines(), vec!["python3 setup.py sdist"]);
        let steps = outcome.details["steps"].as_array().unwrap();
        assert_eq!(steps.len(), 3, "second clean must not run: {steps:?}");
    }

    #[test]
    fn upload_failure_propagates_tool_exit_code() {
        let harness = Harness::new(RecordingEffects::clean_tree().failing("twine", 3));
        let outcome = harness.run(Target::Upload);
        assert_eq!(outcome.status, CommandStatus::Failure);
        assert_eq!(outcome.tool_exit_code(), Some(3));
        assert_eq!(outcome.details["reason"], "tool_failed");
        // The artifact stays because the trailing clean never ran.
        assert!(harness.root().join("dist").exists());
    }

    #[test]
    fn bump_upload_bumps_before_uploading() {
        let harness = Harness::new(RecordingEffects::clean_tree());
        let outcome = harness.run_with(
            Target::NewDist,
            &GlobalOptions::default(),
            &[("PART", "minor"), ("REPOSITORY_NAME", "testpypi")],
        );
        assert_eq!(outcome.status, CommandStatus::Ok);
        assert_eq!(outcome.message, "released new minor version to testpypi");
        let lines = harness.effects.lines();
        assert_eq!(lines[0], "bumpversion minor");
        assert_eq!(lines[1], "python3 setup.py sdist");
        assert!(lines[2].starts_with("twine upload -r testpypi dist/"));
    }

    #[test]
    fn failed_bump_aborts_release() {
        let harness = Harness::new(RecordingEffects::clean_tree().failing("bumpversion", 2));
        let outcome = harness.run(Target::BumpUpload);
        assert_eq!(outcome.status, CommandStatus::Failure);
        assert_eq!(harness.effects.lines(), vec!["bumpversion patch"]);
    }

    #[test]
    fn test_one_unit_uses_test_glob() {
        let harness = Harness::new(RecordingEffects::clean_tree());
        let outcome = harness.run_with(
            Target::TestOneUnit,
            &GlobalOptions::default(),
            &[("TEST", "test_foo")],
        );
        assert_eq!(outcome.status, CommandStatus::Ok);
        let recorded = harness.effects.recorded();
        assert_eq!(recorded.len(), 1);
        let args = &recorded[0].args;
        let pattern_at = args.iter().position(|arg| arg == "-p").unwrap();
        assert_eq!(args[pattern_at + 1], "test_foo.py");
        let start_at = args.iter().position(|arg| arg == "-s").unwrap();
        assert_eq!(args[start_at + 1], "tests/unit");
        assert_eq!(recorded[0].env[0].0, "PYTHONPATH");
    }

    #[test]
    fn failing_tests_propagate_exit_code() {
        let harness = Harness::new(RecordingEffects::clean_tree().failing("unittest", 1));
        let outcome = harness.run(Target::Test);
        assert_eq!(outcome.status, CommandStatus::Failure);
        assert_eq!(outcome.tool_exit_code(), Some(1));
    }

    #[test]
    fn uninstall_removes_recorded_paths() {
        let harness = Harness::new(RecordingEffects::clean_tree());
        harness.touch("site/skynet/__init__.py");
        harness.touch("site/skynet/types.py");
        let absolute = harness.root().join("bin/skynet-node");
        harness.touch("bin/skynet-node");
        let record = format!(
            "site/skynet/__init__.py\n\n{}\nsite/skynet/missing.py\n",
            absolute.display()
        );
        fs::write(harness.root().join("files.txt"), record).unwrap();

        let outcome = harness.run(Target::Uninstall);
        assert_eq!(outcome.status, CommandStatus::Ok);
        assert_eq!(outcome.message, "removed 2 installed paths");
        assert!(!harness.root().join("site/skynet/__init__.py").exists());
        assert!(!absolute.exists());
        assert!(harness.root().join("site/skynet/types.py").exists());
        assert!(!harness.root().join("files.txt").exists());
    }

    #[test]
    fn uninstall_requires_record() {
        let harness = Harness::new(RecordingEffects::clean_tree());
        let outcome = harness.run(Target::Uninstall);
        assert_eq!(outcome.status, CommandStatus::UserError);
        assert_eq!(outcome.details["reason"], "install_record_missing");
    }

    #[test]
    fn upload_without_artifacts_is_user_error() {
        let harness = Harness::new(RecordingEffects::clean_tree().without_artifacts());
        let outcome = harness.run(Target::Upload);
        assert_eq!(outcome.status, CommandStatus::UserError);
        assert_eq!(outcome.details["reason"], "no_artifacts");
    }

    #[test]
    fn json_mode_captures_tool_output_into_steps() {
        let harness = Harness::new(RecordingEffects::clean_tree());
        let global = GlobalOptions {
            json: true,
            ..GlobalOptions::default()
        };
        let outcome = harness.run_with(Target::Format, &global, &[]);
        assert_eq!(outcome.status, CommandStatus::Ok);
        assert!(harness.effects.recorded().iter().all(|call| call.captured));
        let steps = outcome.details["steps"].as_array().unwrap();
        assert_eq!(steps[0]["stdout"], "yapf output\n");
        assert_eq!(steps[0]["stderr"], "");
    }

    #[test]
    fn json_mode_failure_carries_tool_output() {
        let harness = Harness::new(RecordingEffects::clean_tree().failing("twine", 5));
        let global = GlobalOptions {
            json: true,
            ..GlobalOptions::default()
        };
        let outcome = harness.run_with(Target::Upload, &global, &[]);
        assert_eq!(outcome.tool_exit_code(), Some(5));
        assert_eq!(outcome.details["stdout"], "twine output\n");
        assert_eq!(outcome.details["stderr"], "twine failed\n");
    }

    #[test]
    fn human_mode_passes_tool_output_through() {
        let harness = Harness::new(RecordingEffects::clean_tree());
        let outcome = harness.run(Target::Format);
        assert_eq!(outcome.status, CommandStatus::Ok);
        assert!(harness.effects.recorded().iter().all(|call| !call.captured));
        assert!(outcome.details["steps"][0].get("stdout").is_none());
    }

    #[test]
    fn dry_run_plans_without_side_effects() {
        let harness = Harness::new(RecordingEffects::dirty_tree(&[" M setup.py"]));
        harness.touch("dist/keep.tar.gz");
        let global = GlobalOptions {
            dry_run: true,
            ..GlobalOptions::default()
        };
        let outcome = harness.run_with(Target::Upload, &global, &[]);
        assert_eq!(outcome.status, CommandStatus::Ok);
        assert_eq!(outcome.message, "dry-run (5 steps)");
        let plan = outcome.details["plan"].as_array().unwrap();
        assert_eq!(plan[2]["description"], "python3 setup.py sdist");
        assert_eq!(plan[2]["depth"], 1);
        assert_eq!(plan[3]["description"], "twine upload -r pypi dist/*");
        assert!(harness.effects.lines().is_empty());
        assert!(harness.root().join("dist/keep.tar.gz").exists());
    }
}
