//! Decoder for git's raw commit-log format (`git log --pretty=raw`).
//!
//! The format is line-oriented: a `commit <sha>` line, header lines
//! (`tree`, `parent`, `author`, `committer`; `parent` repeats for merges),
//! a blank line, then message lines indented by four spaces, then a blank
//! line before the next commit. The decoder is a three-state machine and
//! fails with [`Error::MalformedLog`] when a commit block completes without
//! all required fields, since that means the tool and decoder disagree
//! about the format.

use chrono::{DateTime, FixedOffset, TimeZone};

use crate::error::{Error, Result};

/// Author or committer identity from a commit header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
    /// Commit timestamp; absent for person-only identities.
    pub when: Option<DateTime<FixedOffset>>,
}

impl Identity {
    /// Parse a `Name <email> timestamp tz` identity string.
    ///
    /// The timestamp is located after the *last* `>` in the string, so stray
    /// `>` characters inside the name or email cannot shift the split point.
    /// A missing or unparseable `timestamp tz` tail yields a person-only
    /// identity rather than an error.
    pub fn parse(raw: &str) -> Identity {
        let raw = raw.trim();
        let (person, tail) = match raw.rfind('>') {
            Some(pos) => (&raw[..=pos], raw[pos + 1..].trim()),
            None => (raw, ""),
        };

        let (name, email) = match person.rfind('<') {
            Some(open) => {
                let name = person[..open].trim();
                let email = person[open + 1..].trim_end_matches('>').trim();
                (name, email)
            }
            None => (person.trim_end_matches('>').trim(), ""),
        };

        Identity {
            name: name.to_string(),
            email: email.to_string(),
            when: parse_when(tail),
        }
    }
}

fn parse_when(tail: &str) -> Option<DateTime<FixedOffset>> {
    let mut parts = tail.split_whitespace();
    let seconds: i64 = parts.next()?.parse().ok()?;
    let offset = parse_tz(parts.next().unwrap_or("+0000"))?;
    offset.timestamp_opt(seconds, 0).single()
}

fn parse_tz(tz: &str) -> Option<FixedOffset> {
    let (sign, digits) = match tz.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, tz.strip_prefix('+').unwrap_or(tz)),
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// One decoded commit record.
///
/// Produced only by decoding tool output; the store never constructs
/// commits itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub sha: String,
    pub tree: String,
    /// Parent shas in the order listed; empty for a root commit, two or
    /// more for a merge.
    pub parents: Vec<String>,
    pub author: Identity,
    pub committer: Identity,
    /// Full message, without the four-space indent.
    pub message: String,
}

impl Commit {
    /// First line of the message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Message text after the first blank line, if any.
    pub fn body(&self) -> Option<&str> {
        self.message.split_once("\n\n").map(|(_, body)| body)
    }
}

/// Message lines are indented with exactly this many characters.
const MESSAGE_INDENT: usize = 4;

#[derive(Debug)]
struct PartialCommit {
    sha: String,
    tree: Option<String>,
    parents: Vec<String>,
    author: Option<Identity>,
    committer: Option<Identity>,
    message_lines: Vec<String>,
}

impl PartialCommit {
    fn new(sha: &str) -> Self {
        Self {
            sha: sha.trim().to_string(),
            tree: None,
            parents: Vec::new(),
            author: None,
            committer: None,
            message_lines: Vec::new(),
        }
    }

    fn header_line(&mut self, line: &str) {
        let Some((key, value)) = line.split_once(' ') else {
            return;
        };
        match key {
            "tree" => self.tree = Some(value.trim().to_string()),
            "parent" => self.parents.push(value.trim().to_string()),
            "author" => self.author = Some(Identity::parse(value)),
            "committer" => self.committer = Some(Identity::parse(value)),
            // gpgsig, encoding, and anything newer: not ours to interpret
            _ => {}
        }
    }

    fn message_line(&mut self, line: &str) {
        self.message_lines
            .push(line.get(MESSAGE_INDENT..).unwrap_or("").to_string());
    }

    fn finish(self) -> Result<Commit> {
        let missing = |field: &str| {
            Error::MalformedLog(format!("commit {} missing {field} header", self.sha))
        };
        let tree = self.tree.ok_or_else(|| missing("tree"))?;
        let author = self.author.ok_or_else(|| missing("author"))?;
        let committer = self.committer.ok_or_else(|| missing("committer"))?;

        Ok(Commit {
            sha: self.sha,
            tree,
            parents: self.parents,
            author,
            committer,
            message: self.message_lines.join("\n"),
        })
    }
}

#[derive(Debug)]
enum DecodeState {
    /// Looking for the next `commit <sha>` line.
    SeekCommit,
    /// Inside the header block of a commit.
    ReadHeader(PartialCommit),
    /// Inside the indented message block of a commit.
    ReadMessage(PartialCommit),
}

/// Decode raw log output into commits, preserving the output order.
///
/// A trailing commit with no terminating blank line is still finalized.
pub fn parse_log(raw: &str) -> Result<Vec<Commit>> {
    let mut commits = Vec::new();
    let mut state = DecodeState::SeekCommit;

    for line in raw.lines() {
        state = match state {
            DecodeState::SeekCommit => match line.strip_prefix("commit ") {
                Some(sha) => DecodeState::ReadHeader(PartialCommit::new(sha)),
                None => DecodeState::SeekCommit,
            },
            DecodeState::ReadHeader(mut current) => {
                if line.is_empty() {
                    DecodeState::ReadMessage(current)
                } else {
                    current.header_line(line);
                    DecodeState::ReadHeader(current)
                }
            }
            DecodeState::ReadMessage(mut current) => {
                if line.is_empty() {
                    commits.push(current.finish()?);
                    DecodeState::SeekCommit
                } else {
                    current.message_line(line);
                    DecodeState::ReadMessage(current)
                }
            }
        };
    }

    match state {
        DecodeState::SeekCommit => {}
        DecodeState::ReadHeader(current) | DecodeState::ReadMessage(current) => {
            commits.push(current.finish()?);
        }
    }

    Ok(commits)
}
