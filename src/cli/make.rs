//! verdiff make command implementation
//!
//! Records the next version of a PR (base/head refs first, interdiff
//! second) in the scratch repository.

use std::path::Path;

use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::store::{self, Version};

#[derive(serde::Serialize)]
struct MakeReport {
    pr: u64,
    number: u32,
    #[serde(flatten)]
    version: Version,
}

pub fn run(
    scratch: &Path,
    pr: u64,
    base: String,
    head: Option<String>,
    options: OutputOptions,
) -> Result<()> {
    let context = super::open_work_repo(scratch)?;

    let head = match head {
        Some(head) => head,
        None => store::fetch_pr(&context.shell, pr)?,
    };

    let versions = store::get_versions(&context.shell, pr)?;
    let number = store::next_version_number(&versions);
    let version = store::make_version(&context.shell, pr, number, &base, &head)?;

    let mut human = HumanOutput::new(format!("Recorded version {number} of PR #{pr}"));
    human.push_summary("base", version.base.clone());
    human.push_summary("head", version.head.clone());
    human.push_summary(
        "interdiff",
        version
            .interdiff
            .clone()
            .unwrap_or_else(|| "(first version, nothing to diff against)".to_string()),
    );

    emit_success(
        options,
        "make",
        &MakeReport {
            pr,
            number,
            version,
        },
        Some(&human),
    )
}
