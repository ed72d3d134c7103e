//! verdiff push command implementation

use std::path::Path;

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::store;

#[derive(serde::Serialize)]
struct PushReport {
    pr: u64,
    versions: Vec<u32>,
}

pub fn run(scratch: &Path, pr: u64, versions: Vec<u32>, options: OutputOptions) -> Result<()> {
    if versions.iter().any(|version| *version == 0) {
        return Err(Error::InvalidArgument(
            "version numbers start at 1".to_string(),
        ));
    }

    let context = super::open_work_repo(scratch)?;
    store::push_versions(&context.shell, pr, &versions)?;

    let mut human = HumanOutput::new(format!("Pushed PR #{pr} version refs to origin"));
    human.push_summary(
        "versions",
        versions
            .iter()
            .map(|version| format!("v{version}"))
            .collect::<Vec<_>>()
            .join(", "),
    );

    emit_success(options, "push", &PushReport { pr, versions }, Some(&human))
}
