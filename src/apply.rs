//! Forced-apply primitives.
//!
//! Two building blocks used by interdiff synthesis:
//!
//! - [`force_pick`] makes the current checkout's content exactly equal to a
//!   target commit's tree, then commits on top of the current history with
//!   the target's message and authorship.
//! - [`force_range_apply`] replays a range of historical changes onto the
//!   current position with a prefer-incoming merge policy, resolving the
//!   conflicts that policy cannot handle via a fixed table keyed on the
//!   porcelain status code. The table is content-independent, so a replay
//!   never needs human input and can be repeated from scratch.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::shell::Shell;
use crate::status::{parse_porcelain, StatusEntry};

/// Outcome of a single replay attempt.
#[derive(Debug)]
pub enum ApplyAttempt {
    /// The attempt finished with no conflict.
    Clean,
    /// The attempt stopped on a content conflict; the listed entries need
    /// resolution before the replay can continue.
    Conflicted(Vec<StatusEntry>),
    /// The attempt failed for a reason other than a content conflict
    /// (tool misuse, missing object). Not retried.
    Fatal(Error),
}

/// Snap the working tree and index to exactly `target`'s tree, then record
/// a commit reusing `target`'s message and authorship. The new commit's
/// parent is the current position, not `target`'s own parent.
pub fn force_pick(shell: &Shell, target: &str) -> Result<()> {
    shell.check_call("git", &["read-tree", "--reset", "-u", target])?;
    shell.check_call("git", &["commit", "--allow-empty", "-C", target])?;
    Ok(())
}

/// Replay the commit range `range` (e.g. `base..head`) onto the current
/// position, preferring incoming changes and resolving leftover conflicts
/// by the fixed policy, until an attempt completes cleanly.
pub fn force_range_apply(shell: &Shell, range: &str) -> Result<()> {
    // --keep-redundant-commits: picks that become empty on the new base
    // must be recorded, not stop the sequencer with a clean status.
    let mut outcome = attempt(
        shell,
        &[
            "cherry-pick",
            "--allow-empty",
            "--keep-redundant-commits",
            "-X",
            "theirs",
            range,
        ],
    );

    loop {
        match outcome {
            ApplyAttempt::Clean => return Ok(()),
            ApplyAttempt::Fatal(err) => return Err(err),
            ApplyAttempt::Conflicted(entries) => {
                resolve_entries(shell, &entries)?;
                shell.check_call("git", &["commit", "--allow-empty", "--no-edit"])?;
                outcome = attempt(shell, &["cherry-pick", "--continue"]);
            }
        }
    }
}

fn attempt(shell: &Shell, args: &[&str]) -> ApplyAttempt {
    match shell.check_call("git", args) {
        Ok(()) => ApplyAttempt::Clean,
        Err(err) => classify_failure(shell, err),
    }
}

/// A failed attempt counts as a conflict only when porcelain status lists
/// entries. An empty status means the failure was not about content, and
/// the original error stands.
fn classify_failure(shell: &Shell, original: Error) -> ApplyAttempt {
    let raw = match shell.check_output("git", &["status", "--porcelain"]) {
        Ok(raw) => raw,
        Err(_) => return ApplyAttempt::Fatal(original),
    };

    let entries = parse_porcelain(&raw);
    if entries.is_empty() {
        ApplyAttempt::Fatal(original)
    } else {
        ApplyAttempt::Conflicted(entries)
    }
}

/// Resolve every status entry by the fixed policy:
///
/// | xy   | meaning                               | resolution        |
/// |------|---------------------------------------|-------------------|
/// | `M ` `A ` `R ` `C ` | staged by the merge    | none              |
/// | `D ` | deletion already staged               | none              |
/// | `UD` | we modified, incoming deleted         | stage the deletion|
/// | `DU` | we deleted, incoming modified         | stage the deletion|
/// | `UA` | incoming added a new path             | stage the addition|
///
/// Any other code is an unknown conflict shape and fails fatally.
pub fn resolve_entries(shell: &Shell, entries: &[StatusEntry]) -> Result<()> {
    for entry in entries {
        debug!(xy = %entry.xy, path = %entry.path, "resolving status entry");
        match entry.xy.as_str() {
            "M " | "A " | "R " | "C " | "D " => {}
            "UD" | "DU" => {
                shell.check_call("git", &["rm", "-f", "--", &entry.path])?;
            }
            "UA" => {
                shell.check_call("git", &["add", "--", &entry.path])?;
            }
            _ => {
                return Err(Error::UnresolvableConflict {
                    xy: entry.xy.clone(),
                    path: entry.path.clone(),
                });
            }
        }
    }
    info!(entries = entries.len(), "resolved conflict entries");
    Ok(())
}
