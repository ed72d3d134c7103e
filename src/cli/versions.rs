//! verdiff versions command implementation

use std::path::Path;

use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::store::{self, Version};

#[derive(serde::Serialize)]
struct VersionsReport {
    pr: u64,
    versions: Vec<VersionRow>,
}

#[derive(serde::Serialize)]
struct VersionRow {
    number: u32,
    #[serde(flatten)]
    version: Version,
}

pub fn run(scratch: &Path, pr: u64, options: OutputOptions) -> Result<()> {
    let context = super::open_work_repo(scratch)?;
    let versions = store::get_versions(&context.shell, pr)?;

    let rows: Vec<VersionRow> = versions
        .into_iter()
        .enumerate()
        .filter_map(|(number, version)| {
            version.map(|version| VersionRow {
                number: number as u32,
                version,
            })
        })
        .collect();

    let mut human = HumanOutput::new(format!("PR #{pr}: {} version(s)", rows.len()));
    for row in &rows {
        let interdiff = row.version.interdiff.as_deref().unwrap_or("-");
        human.push_detail(format!(
            "v{}: base {} head {} interdiff {}",
            row.number,
            short(&row.version.base),
            short(&row.version.head),
            short(interdiff),
        ));
    }

    emit_success(options, "versions", &VersionsReport { pr, versions: rows }, Some(&human))
}

fn short(sha: &str) -> &str {
    if sha.len() > 12 {
        &sha[..12]
    } else {
        sha
    }
}
