//! End-to-end revision pipeline behavior against a scripted executor.

use aidd::revise::run_revision;
use aidd::test_support::{ScriptedExecutor, sample_config};

#[test]
fn revision_clones_branch_directly_and_comments_on_pr() {
    let temp = tempfile::tempdir().expect("tempdir");
    let cfg = sample_config();
    let executor = ScriptedExecutor::new();

    let outcome = run_revision(
        &cfg,
        "aidd/task_7",
        "Tighten the tests",
        &executor,
        temp.path(),
    )
    .expect("revise");

    let calls = executor.rendered_calls();
    assert_eq!(
        calls[0],
        "git clone -b aidd/task_7 --single-branch git@github.com:octo/widgets.git"
    );
    // No branch guard, no new branch: the branch already exists remotely.
    assert!(!executor.invoked("git ls-remote"));
    assert!(!executor.invoked("git checkout"));
    assert_eq!(calls[1], "gemini -p Tighten the tests -y");
    assert_eq!(calls[2], "git add -A");
    assert!(calls[3].starts_with("git commit -m aidd: [aidd/task_7_"));
    assert!(calls[3].ends_with("] Revision"));
    assert_eq!(calls[4], "git push -u origin aidd/task_7");
    assert_eq!(
        calls[5],
        "gh pr comment aidd/task_7 --body 【Revision Detail】\nTighten the tests"
    );
    assert!(outcome.pushed);
    assert!(outcome.commented);
}

#[test]
fn revision_workspace_label_sanitizes_branch_name() {
    let temp = tempfile::tempdir().expect("tempdir");
    let cfg = sample_config();
    let executor = ScriptedExecutor::new();

    run_revision(&cfg, "aidd/task_7", "Do it", &executor, temp.path()).expect("revise");

    let workspace = &executor.calls()[0].workdir;
    let name = workspace.file_name().expect("name").to_string_lossy().to_string();
    assert!(name.starts_with("revision_aidd_task_7_"), "got {name}");
}

#[test]
fn revision_commit_message_carries_branch_and_timestamp() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut cfg = sample_config();
    cfg.github.push_branch_on_complete = false;
    let executor = ScriptedExecutor::new();

    run_revision(&cfg, "aidd/task_2", "Fix", &executor, temp.path()).expect("revise");

    let commit = executor
        .rendered_calls()
        .into_iter()
        .find(|cmd| cmd.starts_with("git commit"))
        .expect("commit call");
    // git commit -m aidd: [aidd/task_2_<YYYYMMDD_HHMMSS>] Revision
    let message = commit.strip_prefix("git commit -m ").expect("message");
    assert!(message.starts_with("aidd: [aidd/task_2_"));
    assert!(message.ends_with("] Revision"));
    let stamp = &message["aidd: [aidd/task_2_".len()..message.len() - "] Revision".len()];
    assert_eq!(stamp.len(), "20260830_120000".len());
}

#[test]
fn missing_branch_surfaces_as_clone_stage_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let cfg = sample_config();
    let executor = ScriptedExecutor::new().fail_on("git clone");

    let err = run_revision(&cfg, "aidd/task_404", "Fix", &executor, temp.path()).unwrap_err();
    assert!(format!("{err:#}").contains("clone branch"));
    assert!(!executor.invoked("gemini"));
}

#[test]
fn skip_revision_flag_short_circuits_without_any_command() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut cfg = sample_config();
    cfg.run.skip_revision = true;
    let executor = ScriptedExecutor::new();

    let outcome =
        run_revision(&cfg, "aidd/task_7", "Fix", &executor, temp.path()).expect("revise");

    assert!(outcome.skipped);
    assert!(executor.calls().is_empty());
    assert!(!temp.path().join("work").exists());
}

#[test]
fn disabled_pr_flag_pushes_without_comment() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut cfg = sample_config();
    cfg.github.create_pr_on_complete = false;
    let executor = ScriptedExecutor::new();

    let outcome =
        run_revision(&cfg, "aidd/task_7", "Fix", &executor, temp.path()).expect("revise");

    assert!(outcome.pushed);
    assert!(!outcome.commented);
    assert!(!executor.invoked("gh pr comment"));
}

#[test]
fn failing_revision_leaves_process_cwd_unchanged() {
    let before = std::env::current_dir().expect("cwd");
    for stage in ["git clone", "gemini", "git add", "git commit", "git push"] {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = sample_config();
        let executor = ScriptedExecutor::new().fail_on(stage);

        let result = run_revision(&cfg, "aidd/task_1", "Fix", &executor, temp.path());
        assert!(result.is_err(), "stage `{stage}` should fail the run");
        assert_eq!(std::env::current_dir().expect("cwd"), before);
    }
}
