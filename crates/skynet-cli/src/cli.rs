use std::path::PathBuf;

use clap::{value_parser, ArgAction, Args, Parser, Subcommand};
use skynet_core::{CommandGroup, Target};
use strum::IntoEnumIterator;

pub const SKYNET_HELP_TEMPLATE: &str =
    "{before-help}\nUsage:\n    {usage}\n\nGlobal options:\n{options}\n";

/// Header of `skynet --help`: every target under its group.
pub fn target_overview() -> String {
    let mut out = format!(
        "skynet {} – release tooling for skynet-application\n",
        env!("CARGO_PKG_VERSION")
    );
    for group in [
        CommandGroup::Release,
        CommandGroup::Package,
        CommandGroup::Quality,
        CommandGroup::Vcs,
    ] {
        let heading = match group {
            CommandGroup::Release => "Release",
            CommandGroup::Package => "Package",
            CommandGroup::Quality => "Quality",
            CommandGroup::Vcs => "Working tree",
        };
        out.push_str(&format!("\n\x1b[1;36m{heading}\x1b[0m\n"));
        for target in Target::iter().filter(|target| target.group() == group) {
            out.push_str(&format!("  {:<17}{}\n", target.name(), target.description()));
        }
    }
    out.push_str(
        "\nVariables may be passed make-style, e.g. `skynet test-one-unit TEST=test_buffer`.\n",
    );
    out
}

#[derive(Parser, Debug)]
#[command(
    name = "skynet",
    author,
    version,
    propagate_version = false,
    disable_help_subcommand = true,
    before_help = target_overview(),
    help_template = SKYNET_HELP_TEMPLATE
)]
#[allow(clippy::struct_excessive_bools)]
pub struct SkynetCli {
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)",
        global = true
    )]
    pub quiet: bool,
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Increase logging (-vv reaches trace)",
        global = true
    )]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[arg(
        long,
        help = "Print the steps a target would run without running them",
        global = true
    )]
    pub dry_run: bool,
    #[arg(
        short = 'C',
        long,
        value_name = "DIR",
        value_parser = value_parser!(PathBuf),
        help = "Run as if started in DIR",
        global = true
    )]
    pub directory: Option<PathBuf>,
    #[arg(
        long,
        value_name = "PART",
        help = "Version part handed to bumpversion, e.g. major, minor, patch (env: PART)",
        global = true
    )]
    pub part: Option<String>,
    #[arg(
        long,
        value_name = "GLOB",
        help = "Test file glob for test-one-unit (env: TEST)",
        global = true
    )]
    pub test: Option<String>,
    #[arg(
        long,
        value_name = "NAME",
        help = "Project name used for the egg-info directory (env: PROJECT_NAME)",
        global = true
    )]
    pub project_name: Option<String>,
    #[arg(
        long,
        value_name = "NAME",
        help = "Repository to upload to (env: REPOSITORY_NAME)",
        global = true
    )]
    pub repository: Option<String>,
    #[command(subcommand)]
    pub command: TargetCli,
}

#[derive(Subcommand, Debug)]
pub enum TargetCli {
    #[command(about = Target::All.description())]
    All(TargetArgs),
    #[command(about = Target::NewDist.description())]
    NewDist(TargetArgs),
    #[command(about = Target::BumpUpload.description())]
    BumpUpload(TargetArgs),
    #[command(
        about = "Increment the version component selected by PART.",
        override_usage = "skynet bump [PART=<PART>]"
    )]
    Bump(TargetArgs),
    #[command(
        about = "Clean, build, upload dist/* to REPOSITORY_NAME, clean again.",
        override_usage = "skynet upload [REPOSITORY_NAME=NAME]"
    )]
    Upload(TargetArgs),
    #[command(about = Target::Build.description())]
    Build(TargetArgs),
    #[command(about = Target::Install.description())]
    Install(TargetArgs),
    #[command(about = Target::Uninstall.description())]
    Uninstall(TargetArgs),
    #[command(about = Target::Clean.description())]
    Clean(TargetArgs),
    #[command(about = Target::Format.description())]
    Format(TargetArgs),
    #[command(about = Target::Test.description())]
    Test(TargetArgs),
    #[command(about = Target::TestUnit.description())]
    TestUnit(TargetArgs),
    #[command(
        about = Target::TestOneUnit.description(),
        override_usage = "skynet test-one-unit TEST=<NAME>"
    )]
    TestOneUnit(TargetArgs),
    #[command(about = Target::AssertNotDirty.description())]
    AssertNotDirty(TargetArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    #[arg(
        value_name = "VAR=VALUE",
        help = "Make-style variable assignments (PART, TEST, PROJECT_NAME, REPOSITORY_NAME)"
    )]
    pub assignments: Vec<String>,
}

impl TargetCli {
    pub fn args(&self) -> &TargetArgs {
        match self {
            TargetCli::All(args)
            | TargetCli::NewDist(args)
            | TargetCli::BumpUpload(args)
            | TargetCli::Bump(args)
            | TargetCli::Upload(args)
            | TargetCli::Build(args)
            | TargetCli::Install(args)
            | TargetCli::Uninstall(args)
            | TargetCli::Clean(args)
            | TargetCli::Format(args)
            | TargetCli::Test(args)
            | TargetCli::TestUnit(args)
            | TargetCli::TestOneUnit(args)
            | TargetCli::AssertNotDirty(args) => args,
        }
    }
}
