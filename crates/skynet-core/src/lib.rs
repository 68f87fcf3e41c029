#![deny(clippy::all)]

mod core;

pub(crate) use crate::core::config;
pub(crate) use crate::core::runtime::effects;

pub use crate::core::config::context::{CommandContext, CommandInfo};
pub use crate::core::config::{
    Config, ConfigOverrides, GlobalOptions, ProjectConfig, PublishConfig, TestConfig, ToolConfig,
    VersionConfig,
};
pub use crate::core::runtime::effects::{
    Effects, FileSystem, GitClient, ProcessRunner, SharedEffects, SystemEffects,
};
pub use crate::core::runtime::process::RunOutput;
pub use crate::core::runtime::{format_status_message, to_json_response, CommandGroup};
pub use crate::core::targets::{run_target, Target, DIRTY_WORKTREE_MESSAGE};
pub use crate::core::tooling::outcome::{CommandStatus, ExecutionOutcome, UserError};

pub(crate) use crate::core::runtime::SKYNET_VERSION;

/// Version string reported by `skynet --version` and JSON envelopes.
#[must_use]
pub fn version() -> &'static str {
    SKYNET_VERSION
}
