use std::sync::Arc;

use color_eyre::Result;
use serde_json::json;
use skynet_core::{
    CommandContext, CommandInfo, ConfigOverrides, ExecutionOutcome, GlobalOptions, SystemEffects,
    Target, UserError,
};

use crate::cli::{SkynetCli, TargetCli};

pub fn target_for(command: &TargetCli) -> Target {
    match command {
        TargetCli::All(_) => Target::All,
        TargetCli::NewDist(_) => Target::NewDist,
        TargetCli::BumpUpload(_) => Target::BumpUpload,
        TargetCli::Bump(_) => Target::Bump,
        TargetCli::Upload(_) => Target::Upload,
        TargetCli::Build(_) => Target::Build,
        TargetCli::Install(_) => Target::Install,
        TargetCli::Uninstall(_) => Target::Uninstall,
        TargetCli::Clean(_) => Target::Clean,
        TargetCli::Format(_) => Target::Format,
        TargetCli::Test(_) => Target::Test,
        TargetCli::TestUnit(_) => Target::TestUnit,
        TargetCli::TestOneUnit(_) => Target::TestOneUnit,
        TargetCli::AssertNotDirty(_) => Target::AssertNotDirty,
    }
}

/// Flags first, then make-style assignments, so `TEST=x` after the target
/// name wins over `--test`.
pub fn overrides_from_cli(cli: &SkynetCli) -> Result<ConfigOverrides, UserError> {
    let mut overrides = ConfigOverrides {
        part: cli.part.clone(),
        test: cli.test.clone(),
        project_name: cli.project_name.clone(),
        repository: cli.repository.clone(),
    };
    for assignment in &cli.command.args().assignments {
        overrides.assign(assignment)?;
    }
    Ok(overrides)
}

pub fn dispatch_command(
    global: &GlobalOptions,
    cli: &SkynetCli,
) -> Result<(CommandInfo, ExecutionOutcome)> {
    let target = target_for(&cli.command);
    let info = target.info();
    let overrides = match overrides_from_cli(cli) {
        Ok(overrides) => overrides,
        Err(user) => return Ok((info, user.into_outcome())),
    };
    core_call(info, || {
        let ctx = CommandContext::new(global, &overrides, Arc::new(SystemEffects::new()))?;
        skynet_core::run_target(&ctx, target)
    })
}

fn core_call<F>(info: CommandInfo, action: F) -> Result<(CommandInfo, ExecutionOutcome)>
where
    F: FnOnce() -> anyhow::Result<ExecutionOutcome>,
{
    match action() {
        Ok(outcome) => Ok((info, outcome)),
        Err(err) => match err.downcast::<UserError>() {
            Ok(user) => Ok((info, user.into_outcome())),
            Err(err) => {
                let issues: Vec<String> = err.chain().map(ToString::to_string).collect();
                Ok((
                    info,
                    ExecutionOutcome::failure(
                        err.to_string(),
                        json!({
                            "reason": "internal_error",
                            "error": err.to_string(),
                            "issues": issues,
                        }),
                    ),
                ))
            }
        },
    }
}
