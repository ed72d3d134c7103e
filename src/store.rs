//! PR version store.
//!
//! Uses a scratch git repository as durable storage for an ordered sequence
//! of immutable pull-request snapshots, and synthesizes interdiff commits
//! between consecutive snapshots. Every persisted field is a ref, so the
//! repository doubles as the database:
//!
//! ```text
//! refs/pr/<pr>/<version>/base       sha the PR was proposed against
//! refs/pr/<pr>/<version>/head       sha of the PR tip at submission
//! refs/pr/<pr>/<version>/interdiff  synthesized commit (absent for v1)
//! ```
//!
//! Version numbers are dense and start at 1; enumerating the namespace
//! reconstructs every version with no side index. Base and head are written
//! before interdiff synthesis starts, so a version's identity survives a
//! failed synthesis.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::apply::{force_pick, force_range_apply};
use crate::error::Result;
use crate::shell::Shell;

/// Ref namespace all version state lives under.
pub const PR_REF_NAMESPACE: &str = "refs/pr";

/// Branch name a fresh scratch repository starts on. Never fetched into:
/// the store only ever checks out detached positions.
const SCRATCH_BRANCH: &str = "verdiff/scratch";

/// Committer identity configured in scratch repositories. The store acts
/// as a bot, not as the end user.
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub name: String,
    pub email: String,
}

impl Default for BotIdentity {
    fn default() -> Self {
        Self {
            name: "verdiff".to_string(),
            email: "verdiff@localhost".to_string(),
        }
    }
}

/// One immutable snapshot of a pull request.
///
/// `interdiff` is best-effort: a version whose synthesis failed still has
/// base and head and is a valid, visible state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Version {
    pub base: String,
    pub head: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interdiff: Option<String>,
}

fn pr_prefix(pr: u64) -> String {
    format!("{PR_REF_NAMESPACE}/{pr}")
}

fn version_ref(pr: u64, version: u32, field: &str) -> String {
    format!("{}/{version}/{field}", pr_prefix(pr))
}

/// Establish a fresh scratch repository: fixed bot identity, `origin_url`
/// as the sole remote, and all branch refs plus the whole PR-version
/// namespace fetched so prior versions are locally visible.
///
/// `origin_url` may embed a short-lived credential; it is treated as an
/// opaque string.
pub fn init_work_repo(shell: &Shell, origin_url: &str, bot: &BotIdentity) -> Result<()> {
    shell.check_call("git", &["init", "--initial-branch", SCRATCH_BRANCH])?;
    shell.check_call("git", &["config", "user.name", &bot.name])?;
    shell.check_call("git", &["config", "user.email", &bot.email])?;
    shell.check_call("git", &["remote", "add", "origin", origin_url])?;

    let version_refspec = format!("+{PR_REF_NAMESPACE}/*:{PR_REF_NAMESPACE}/*");
    shell.check_call(
        "git",
        &[
            "fetch",
            "origin",
            "+refs/heads/*:refs/heads/*",
            &version_refspec,
        ],
    )?;
    info!(workdir = %shell.workdir().display(), "initialized scratch work repository");
    Ok(())
}

/// Fetch the PR's current head from origin's PR-head ref convention and
/// return its sha.
pub fn fetch_pr(shell: &Shell, pr: u64) -> Result<String> {
    let pr_head = format!("refs/pull/{pr}/head");
    shell.check_call("git", &["fetch", "origin", &pr_head])?;
    let sha = shell.check_output("git", &["rev-parse", "FETCH_HEAD"])?;
    Ok(sha.trim().to_string())
}

/// Enumerate every stored version of a PR in one ref query.
///
/// The result is a sparse sequence indexed by version number; index 0 is
/// always absent since versions start at 1. An entry is present only when
/// both its base and head refs parsed; partially-written versions surface
/// as absent.
pub fn get_versions(shell: &Shell, pr: u64) -> Result<Vec<Option<Version>>> {
    let raw = shell.check_output(
        "git",
        &[
            "for-each-ref",
            "--format=%(refname) %(objectname)",
            &pr_prefix(pr),
        ],
    )?;
    Ok(decode_versions(pr, &raw))
}

/// Read one version by number; absent when not fully written.
pub fn get_version(shell: &Shell, pr: u64, version: u32) -> Result<Option<Version>> {
    let prefix = format!("{}/{version}", pr_prefix(pr));
    let raw = shell.check_output(
        "git",
        &["for-each-ref", "--format=%(refname) %(objectname)", &prefix],
    )?;
    Ok(decode_versions(pr, &raw)
        .into_iter()
        .nth(version as usize)
        .flatten())
}

#[derive(Default)]
struct RefFields {
    base: Option<String>,
    head: Option<String>,
    interdiff: Option<String>,
}

fn decode_versions(pr: u64, raw: &str) -> Vec<Option<Version>> {
    let prefix = format!("{}/", pr_prefix(pr));
    let mut by_version: BTreeMap<u32, RefFields> = BTreeMap::new();

    for line in raw.lines() {
        let Some((refname, sha)) = line.split_once(' ') else {
            continue;
        };
        let Some(rest) = refname.strip_prefix(prefix.as_str()) else {
            continue;
        };
        let Some((version, field)) = rest.split_once('/') else {
            continue;
        };
        let Ok(version) = version.parse::<u32>() else {
            continue;
        };
        if version == 0 {
            continue;
        }

        let fields = by_version.entry(version).or_default();
        match field {
            "base" => fields.base = Some(sha.to_string()),
            "head" => fields.head = Some(sha.to_string()),
            "interdiff" => fields.interdiff = Some(sha.to_string()),
            _ => {}
        }
    }

    let len = by_version
        .keys()
        .next_back()
        .map(|highest| *highest as usize + 1)
        .unwrap_or(0);
    let mut versions = vec![None; len];
    for (version, fields) in by_version {
        if let (Some(base), Some(head)) = (fields.base, fields.head) {
            versions[version as usize] = Some(Version {
                base,
                head,
                interdiff: fields.interdiff,
            });
        }
    }
    versions
}

/// Next version number for a PR, given its sparse version sequence.
///
/// The sequence length equals highest-stored-version + 1, which under the
/// density invariant is exactly the next number; an empty store starts
/// at 1.
pub fn next_version_number(versions: &[Option<Version>]) -> u32 {
    (versions.len() as u32).max(1)
}

pub fn set_version_base(shell: &Shell, pr: u64, version: u32, sha: &str) -> Result<()> {
    set_version_field(shell, pr, version, "base", sha)
}

pub fn set_version_head(shell: &Shell, pr: u64, version: u32, sha: &str) -> Result<()> {
    set_version_field(shell, pr, version, "head", sha)
}

pub fn set_version_interdiff(shell: &Shell, pr: u64, version: u32, sha: &str) -> Result<()> {
    set_version_field(shell, pr, version, "interdiff", sha)
}

fn set_version_field(shell: &Shell, pr: u64, version: u32, field: &str, sha: &str) -> Result<()> {
    let refname = version_ref(pr, version, field);
    debug!(%refname, %sha, "updating version ref");
    shell.check_call("git", &["update-ref", &refname, sha])
}

/// Message given to a synthesized interdiff commit.
pub fn interdiff_label(version: u32) -> String {
    format!("interdiff: v{} -> v{}", version - 1, version)
}

/// Record version `version` of a PR and synthesize its interdiff against
/// the previous version.
///
/// Base and head refs are written first, before any computation, so the
/// version's identity is durable even when synthesis fails. When version
/// `version - 1` is absent (or incomplete), there is nothing to diff
/// against and the version is returned without an interdiff.
///
/// The synthesized commit's tree is byte-identical to `head`'s tree, but
/// its ancestry carries the previous version's content replayed onto the
/// new base, so diffing the commit against its own parent shows exactly
/// what changed between the two submissions, independent of base-branch
/// movement.
pub fn make_version(
    shell: &Shell,
    pr: u64,
    version: u32,
    base: &str,
    head: &str,
) -> Result<Version> {
    set_version_base(shell, pr, version, base)?;
    set_version_head(shell, pr, version, head)?;

    let previous = if version > 1 {
        get_version(shell, pr, version - 1)?
    } else {
        None
    };
    let Some(previous) = previous else {
        return Ok(Version {
            base: base.to_string(),
            head: head.to_string(),
            interdiff: None,
        });
    };

    shell.check_call("git", &["checkout", "--detach", base])?;
    force_range_apply(shell, &format!("{}..{}", previous.base, previous.head))?;
    force_pick(shell, head)?;
    shell.check_call(
        "git",
        &[
            "commit",
            "--amend",
            "--allow-empty",
            "-m",
            &interdiff_label(version),
        ],
    )?;

    let interdiff = shell.check_output("git", &["rev-parse", "HEAD"])?.trim().to_string();
    set_version_interdiff(shell, pr, version, &interdiff)?;
    info!(pr, version, %interdiff, "synthesized interdiff");

    Ok(Version {
        base: base.to_string(),
        head: head.to_string(),
        interdiff: Some(interdiff),
    })
}

/// Force-push the named versions' full sub-namespaces to origin in a
/// single push, overwriting whatever the remote holds at those paths. The
/// store is the sole writer of this namespace by convention, so there is
/// no conflict detection.
pub fn push_versions(shell: &Shell, pr: u64, versions: &[u32]) -> Result<()> {
    if versions.is_empty() {
        return Ok(());
    }
    let refspecs = push_refspecs(pr, versions);
    let mut args = vec!["push", "--force", "origin"];
    args.extend(refspecs.iter().map(String::as_str));
    shell.check_call("git", &args)
}

/// Force refspecs for the given version sub-namespaces.
pub fn push_refspecs(pr: u64, versions: &[u32]) -> Vec<String> {
    versions
        .iter()
        .map(|version| {
            format!(
                "+{prefix}/{version}/*:{prefix}/{version}/*",
                prefix = pr_prefix(pr)
            )
        })
        .collect()
}
