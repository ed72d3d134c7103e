//! Forced-apply primitives against real repositories.

mod support;

use support::{ScratchRepo, UpstreamRepo};
use verdiff::apply::{force_pick, force_range_apply, resolve_entries};
use verdiff::status::{parse_porcelain, StatusEntry};

#[test]
fn modify_delete_conflict_drops_the_path() {
    let upstream = UpstreamRepo::init();
    let base = upstream.commit(
        &[],
        &[("f.txt", Some("base\n")), ("keep.txt", Some("keep\n"))],
        "base",
    );
    // Current side modified f.txt; incoming range deletes it, then adds
    // another file so the replay continues past the conflict.
    let ours = upstream.commit(&[base], &[("f.txt", Some("ours\n"))], "modify f");
    let delete = upstream.commit(&[base], &[("f.txt", None)], "delete f");
    let follow = upstream.commit(&[delete], &[("other.txt", Some("other\n"))], "add other");
    upstream.set_branch("main", base);
    upstream.set_branch("current", ours);
    upstream.set_branch("incoming", follow);

    let scratch = ScratchRepo::init_from(&upstream);
    scratch.checkout_detached(&ours.to_string());

    force_range_apply(&scratch.shell, &format!("{base}..{follow}")).expect("forced apply");

    let head = scratch.head_sha();
    assert!(scratch.blob_in_tree(&head, "f.txt").is_none());
    assert_eq!(
        scratch.blob_in_tree(&head, "other.txt").as_deref(),
        Some("other\n")
    );
    assert_eq!(
        scratch.blob_in_tree(&head, "keep.txt").as_deref(),
        Some("keep\n")
    );
}

#[test]
fn delete_modify_conflict_keeps_the_deletion() {
    let upstream = UpstreamRepo::init();
    let base = upstream.commit(
        &[],
        &[("f.txt", Some("base\n")), ("keep.txt", Some("keep\n"))],
        "base",
    );
    // Current side deleted f.txt; incoming range modifies it. The fixed
    // policy discards the incoming modification.
    let ours = upstream.commit(&[base], &[("f.txt", None)], "delete f");
    let modify = upstream.commit(&[base], &[("f.txt", Some("theirs\n"))], "modify f");
    let follow = upstream.commit(&[modify], &[("extra.txt", Some("extra\n"))], "add extra");
    upstream.set_branch("main", base);
    upstream.set_branch("current", ours);
    upstream.set_branch("incoming", follow);

    let scratch = ScratchRepo::init_from(&upstream);
    scratch.checkout_detached(&ours.to_string());

    force_range_apply(&scratch.shell, &format!("{base}..{follow}")).expect("forced apply");

    let head = scratch.head_sha();
    assert!(scratch.blob_in_tree(&head, "f.txt").is_none());
    assert_eq!(
        scratch.blob_in_tree(&head, "extra.txt").as_deref(),
        Some("extra\n")
    );
}

#[test]
fn both_sides_modified_resolves_to_incoming() {
    let upstream = UpstreamRepo::init();
    let base = upstream.commit(&[], &[("f.txt", Some("line\n"))], "base");
    let ours = upstream.commit(&[base], &[("f.txt", Some("ours\n"))], "our change");
    let theirs = upstream.commit(&[base], &[("f.txt", Some("theirs\n"))], "their change");
    upstream.set_branch("main", base);
    upstream.set_branch("current", ours);
    upstream.set_branch("incoming", theirs);

    let scratch = ScratchRepo::init_from(&upstream);
    scratch.checkout_detached(&ours.to_string());

    force_range_apply(&scratch.shell, &format!("{base}..{theirs}")).expect("forced apply");

    let head = scratch.head_sha();
    assert_eq!(
        scratch.blob_in_tree(&head, "f.txt").as_deref(),
        Some("theirs\n")
    );
}

#[test]
fn force_pick_snaps_tree_and_reuses_metadata() {
    let upstream = UpstreamRepo::init();
    let base = upstream.commit(&[], &[("a.txt", Some("a\n"))], "base");
    let target = upstream.commit(&[base], &[("feature.txt", Some("one\n"))], "add feature");
    let elsewhere = upstream.commit(&[base], &[("b.txt", Some("b\n"))], "unrelated");
    upstream.set_branch("main", base);
    upstream.set_branch("target", target);
    upstream.set_branch("elsewhere", elsewhere);

    let scratch = ScratchRepo::init_from(&upstream);
    scratch.checkout_detached(&elsewhere.to_string());

    force_pick(&scratch.shell, &target.to_string()).expect("force pick");

    let head = scratch.head_sha();
    assert_ne!(head, target.to_string());
    assert_eq!(scratch.tree_of(&head), upstream.tree_of(&target.to_string()));

    let repo = scratch.repo();
    let head_commit = repo
        .find_commit(git2::Oid::from_str(&head).unwrap())
        .unwrap();
    assert_eq!(head_commit.parent_count(), 1);
    assert_eq!(
        head_commit.parent_id(0).unwrap().to_string(),
        elsewhere.to_string()
    );
    assert_eq!(head_commit.message().unwrap().trim_end(), "add feature");
    assert_eq!(head_commit.author().name(), Some("upstream"));
    // Committer is the bot identity configured by init_work_repo.
    assert_eq!(head_commit.committer().name(), Some("verdiff"));
}

#[test]
fn simulated_added_by_them_stages_the_addition() {
    let upstream = UpstreamRepo::init();
    let base = upstream.commit(&[], &[("a.txt", Some("a\n"))], "base");
    upstream.set_branch("main", base);

    let scratch = ScratchRepo::init_from(&upstream);
    scratch.checkout_detached(&base.to_string());

    // What the merge machinery would have left behind for a UA entry: the
    // incoming side's new file sitting in the working tree, unstaged.
    std::fs::write(scratch.workdir().join("incoming.txt"), "incoming\n").expect("write");

    let entries = vec![StatusEntry {
        xy: "UA".to_string(),
        path: "incoming.txt".to_string(),
    }];
    resolve_entries(&scratch.shell, &entries).expect("resolve");

    let raw = scratch
        .shell
        .check_output("git", &["status", "--porcelain"])
        .expect("status");
    let staged = parse_porcelain(&raw);
    assert_eq!(staged.len(), 1);
    assert_eq!(staged[0].xy, "A ");
    assert_eq!(staged[0].path, "incoming.txt");
}

#[test]
fn simulated_deleted_by_them_stages_the_deletion() {
    let upstream = UpstreamRepo::init();
    let base = upstream.commit(&[], &[("f.txt", Some("base\n"))], "base");
    upstream.set_branch("main", base);

    let scratch = ScratchRepo::init_from(&upstream);
    scratch.checkout_detached(&base.to_string());

    let entries = vec![StatusEntry {
        xy: "UD".to_string(),
        path: "f.txt".to_string(),
    }];
    resolve_entries(&scratch.shell, &entries).expect("resolve");

    assert!(!scratch.workdir().join("f.txt").exists());
    let raw = scratch
        .shell
        .check_output("git", &["status", "--porcelain"])
        .expect("status");
    let staged = parse_porcelain(&raw);
    assert_eq!(staged.len(), 1);
    assert_eq!(staged[0].xy, "D ");
    assert_eq!(staged[0].path, "f.txt");
}

#[test]
fn non_conflict_failure_is_fatal() {
    let upstream = UpstreamRepo::init();
    let base = upstream.commit(&[], &[("a.txt", Some("a\n"))], "base");
    upstream.set_branch("main", base);

    let scratch = ScratchRepo::init_from(&upstream);
    scratch.checkout_detached(&base.to_string());

    // An empty range is tool misuse, not a content conflict: status stays
    // clean and the original error surfaces.
    let err = force_range_apply(&scratch.shell, &format!("{base}..{base}")).unwrap_err();
    match err {
        verdiff::Error::CommandFailed { command, .. } => {
            assert!(command.contains("cherry-pick"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
