//! Decoder for git's short-status format (`git status --porcelain`).
//!
//! Each line is a two-character `XY` code, a space, and a path. Lines that
//! do not match that shape (headers or footers some git versions emit) are
//! skipped rather than reported.
//!
//! Known gaps, inherited from the behavior this replaces and deliberately
//! not "fixed": quoted paths (`core.quotepath`) and rename lines
//! (`R  old -> new`) are returned with the raw path text as-is. The
//! downstream resolution policy has only ever been exercised against plain
//! unquoted paths.

/// One working-tree status entry. Transient: produced during a forced
/// range apply and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Two-character index/worktree code, e.g. `M `, `UD`, `UA`.
    pub xy: String,
    /// Path text exactly as printed by the tool.
    pub path: String,
}

/// Decode porcelain status output into entries.
pub fn parse_porcelain(raw: &str) -> Vec<StatusEntry> {
    raw.lines().filter_map(parse_line).collect()
}

// ^(..) (.+)$
fn parse_line(line: &str) -> Option<StatusEntry> {
    let xy = line.get(..2)?;
    let path = line.get(2..)?.strip_prefix(' ')?;
    if path.is_empty() {
        return None;
    }
    Some(StatusEntry {
        xy: xy.to_string(),
        path: path.to_string(),
    })
}
