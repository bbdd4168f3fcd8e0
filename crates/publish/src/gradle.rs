//! Gradle wrapper integration
//!
//! Used to produce the release artifact before publishing.

use aarpub_core::error::{Error, Result};
use aarpub_core::process::{run_command_in_dir, CommandResult};
use std::path::Path;

fn wrapper() -> &'static str {
    if cfg!(windows) {
        "gradlew.bat"
    } else {
        "./gradlew"
    }
}

/// Task path scoped to a module, e.g. `:samplelib:assembleRelease`
pub fn module_task(module: &str, task: &str) -> String {
    let module = module.trim_matches(|c| c == ':' || c == '/');
    if module.is_empty() || module == "." {
        task.to_string()
    } else {
        format!(":{}:{}", module.replace('/', ":"), task)
    }
}

/// Run a Gradle task through the project's wrapper
pub fn run_task(project_dir: &Path, task: &str) -> Result<CommandResult> {
    if !project_dir.join(wrapper()).exists() {
        return Err(Error::process(format!(
            "Gradle wrapper not found in {}",
            project_dir.display()
        ))
        .with_suggestion("Run from the Gradle project root or set [project].root in aarpub.toml"));
    }
    run_command_in_dir(wrapper(), &[task], project_dir)
}

/// Build the module's release `.aar`
pub fn assemble_release(project_dir: &Path, module: &str) -> Result<CommandResult> {
    run_task(project_dir, &module_task(module, "assembleRelease"))
}
