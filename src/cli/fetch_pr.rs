//! verdiff fetch-pr command implementation

use std::path::Path;

use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::store;

#[derive(serde::Serialize)]
struct FetchPrReport {
    pr: u64,
    head: String,
}

pub fn run(scratch: &Path, pr: u64, options: OutputOptions) -> Result<()> {
    let context = super::open_work_repo(scratch)?;
    let head = store::fetch_pr(&context.shell, pr)?;

    let mut human = HumanOutput::new(format!("PR #{pr} head"));
    human.push_summary("head", head.clone());

    emit_success(options, "fetch-pr", &FetchPrReport { pr, head }, Some(&human))
}
