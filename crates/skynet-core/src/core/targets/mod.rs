//! Release targets and their sequential composition.

mod engine;
mod recipe;

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{CommandGroup, CommandInfo};

pub use engine::run_target;
pub use recipe::DIRTY_WORKTREE_MESSAGE;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    All,
    NewDist,
    BumpUpload,
    Bump,
    Upload,
    Build,
    Install,
    Uninstall,
    Clean,
    Format,
    Test,
    TestUnit,
    TestOneUnit,
    AssertNotDirty,
}

impl Target {
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    #[must_use]
    pub fn group(self) -> CommandGroup {
        match self {
            Target::All | Target::NewDist | Target::BumpUpload | Target::Bump | Target::Upload => {
                CommandGroup::Release
            }
            Target::Build | Target::Install | Target::Uninstall | Target::Clean => {
                CommandGroup::Package
            }
            Target::Format | Target::Test | Target::TestUnit | Target::TestOneUnit => {
                CommandGroup::Quality
            }
            Target::AssertNotDirty => CommandGroup::Vcs,
        }
    }

    #[must_use]
    pub fn info(self) -> CommandInfo {
        CommandInfo::new(self.group(), self.name())
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Target::All => "Build the source distribution.",
            Target::NewDist => "Bump the version and publish a new distribution.",
            Target::BumpUpload => "Bump the version, then upload.",
            Target::Bump => "Increment the version component selected by PART.",
            Target::Upload => "Clean, build, upload dist/* to REPOSITORY_NAME, clean again.",
            Target::Build => "Check the working tree is clean, then build the sdist.",
            Target::Install => "Install the package, recording installed files in files.txt.",
            Target::Uninstall => "Remove every path recorded in files.txt.",
            Target::Clean => "Remove dist/, build/, the egg-info directory and MANIFEST.",
            Target::Format => "Format the repository in place.",
            Target::Test => "Run the unit tests.",
            Target::TestUnit => "Discover and run tests/unit/test_*.py.",
            Target::TestOneUnit => "Discover and run tests/unit/${TEST}.py.",
            Target::AssertNotDirty => "Fail when the working tree has uncommitted changes.",
        }
    }
}
