//! Execution integration tests.
//!
//! These tests run real child processes through the public runner API.

use std::collections::HashSet;
use std::fs::File;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;

use cmdr::execution::terminate;
use cmdr::{CmdrError, CommandTemplate, Param, Runner};

fn go_project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    File::create(dir.path().join("main.go")).unwrap();
    dir
}

// ============================================================================
// Synchronous runs
// ============================================================================

#[test]
fn test_glob_parameter_runs_ls() {
    let dir = go_project();
    let template = CommandTemplate::new("ls")
        .args("-l {{WHAT}}")
        .working_dir(dir.path());

    let result = Runner::new()
        .run(&template, &[Param::named("WHAT", "*.go")])
        .unwrap();

    assert_eq!(result.exit_code, 0);
    assert!(result.command_line.ends_with("ls -l main.go"));
    assert!(result.stdout.contains("main.go"));
    assert!(result.started.is_some() && result.finished.is_some());
}

#[test]
fn test_bracket_does_not_protect_required_placeholder() {
    let template = CommandTemplate::new("ls").args("-l {{WHAT}} [{{EVER}}]");

    let err = Runner::new()
        .run(&template, &[Param::named("EVER", "-r")])
        .unwrap_err();

    assert!(matches!(err.error, CmdrError::Incomplete(_)));
    assert_eq!(err.invocation.pid, 0);
}

#[test]
fn test_glob_without_match_fails() {
    let dir = go_project();
    let template = CommandTemplate::new("ls")
        .args("-l {{WHAT}}")
        .working_dir(dir.path());

    let err = Runner::new()
        .run(&template, &[Param::named("WHAT", "*.blah")])
        .unwrap_err();

    assert!(matches!(err.error, CmdrError::NoSuchFile(_)));
}

#[test]
fn test_missing_executable() {
    let err = Runner::new()
        .run(&CommandTemplate::new("/cmdr/no/such/program"), &[])
        .unwrap_err();

    assert!(err.error.is_not_found());
    assert!(matches!(err.error, CmdrError::ExecutableNotFound(_)));
    assert_eq!(err.invocation.exit_code, 0);
    assert_eq!(err.invocation.pid, 0);
}

#[test]
fn test_false_exits_one_without_error() {
    let result = Runner::new().run(&CommandTemplate::new("false"), &[]).unwrap();

    assert_eq!(result.exit_code, 1);
    assert!(!result.success());
    assert!(result.pid > 0);
}

#[test]
fn test_working_directory() {
    let dir = go_project();
    let template = CommandTemplate::new("pwd").working_dir(dir.path());

    let result = Runner::new().run(&template, &[]).unwrap();
    let expected = dir.path().canonicalize().unwrap();
    assert_eq!(result.output_trimmed(), expected.to_str().unwrap());
}

#[test]
fn test_large_output_does_not_block() {
    // Several hundred KiB, well beyond a pipe buffer.
    let result = Runner::new()
        .run(
            &CommandTemplate::new("seq").args("{{N}}"),
            &[Param::named("N", "100000")],
        )
        .unwrap();

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.output_lines().count(), 100_000);
    assert_eq!(result.output_lines().last(), Some("100000"));
}

#[test]
fn test_cpu_time_recorded() {
    let result = Runner::new()
        .run(
            &CommandTemplate::new("seq").args("{{N}}"),
            &[Param::named("N", "3000000")],
        )
        .unwrap();

    assert_eq!(result.exit_code, 0);
    assert!(result.user_time + result.system_time > Duration::ZERO);
}

#[test]
fn test_display_dump() {
    let result = Runner::new()
        .run(&CommandTemplate::new("echo").args("dump"), &[])
        .unwrap();
    let text = result.to_string();

    assert!(text.contains(&format!("SID: {}", result.session_id)));
    assert!(text.contains(&format!("PID: {}", result.pid)));
    assert!(text.contains("RC : 0"));
    assert!(text.contains("OUT: dump"));
}

// ============================================================================
// Session identifiers
// ============================================================================

#[test]
fn test_concurrent_runs_get_distinct_ids() {
    let runner = Runner::new();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let runner = runner.clone();
            std::thread::spawn(move || runner.run(&CommandTemplate::new("true"), &[]).unwrap())
        })
        .collect();

    let ids: HashSet<_> = handles
        .into_iter()
        .map(|h| h.join().unwrap().session_id)
        .collect();

    assert_eq!(ids.len(), 8);
    assert!(ids.iter().all(|id| id.is_assigned()));
    assert_eq!(runner.counter().last().unwrap().as_i64(), 8);
}

#[test]
fn test_ids_never_reused() {
    let runner = Runner::new();
    let template = CommandTemplate::new("true");

    let first = runner.run(&template, &[]).unwrap().session_id;
    let second = runner.run(&template, &[]).unwrap().session_id;
    assert!(second > first);
}

// ============================================================================
// Asynchronous runs
// ============================================================================

#[tokio::test]
async fn test_async_delivers_result() {
    let (tx, mut rx) = mpsc::channel(1);
    let template = CommandTemplate::new("echo").args("{{MSG}}");

    let launched = Runner::new()
        .run_async(&template, &[Param::named("MSG", "later")], tx)
        .await
        .unwrap();

    let result = rx.recv().await.unwrap();
    assert_eq!(result.stdout, "later\n");
    assert_eq!(result.session_id, launched.session_id);
    assert_eq!(result.pid, launched.pid);
    launched.join().await.unwrap();

    // Exactly one delivery.
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_async_failure_still_delivers() {
    let (tx, mut rx) = mpsc::channel(1);

    let err = Runner::new()
        .run_async(&CommandTemplate::new("cmdr-no-such-binary-xyz"), &[], tx)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    let partial = rx.recv().await.unwrap();
    assert_eq!(partial.pid, 0);
    assert!(!partial.session_id.is_assigned());
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_two_concurrent_async_runs() {
    let runner = Runner::new();
    let (tx, mut rx) = mpsc::channel(2);
    let template = CommandTemplate::new("true");

    let a = runner.run_async(&template, &[], tx.clone()).await.unwrap();
    let b = runner.run_async(&template, &[], tx).await.unwrap();
    assert!(a.session_id < b.session_id);

    let mut ids = vec![
        rx.recv().await.unwrap().session_id,
        rx.recv().await.unwrap().session_id,
    ];
    ids.sort();
    assert_eq!(ids, vec![a.session_id, b.session_id]);
}

#[tokio::test]
async fn test_submit_honors_async_flag() {
    let (tx, mut rx) = mpsc::channel(1);
    let template = CommandTemplate::new("echo").args("flagged").asynchronous(true);

    let launched = Runner::new().submit(&template, &[], tx).await.unwrap();
    assert!(launched.is_some());
    assert_eq!(rx.recv().await.unwrap().stdout, "flagged\n");
}

#[tokio::test]
async fn test_deadline_layered_with_terminate() {
    let (tx, mut rx) = mpsc::channel(1);
    let template = CommandTemplate::new("sleep").args("30");

    let launched = Runner::new().run_async(&template, &[], tx).await.unwrap();
    let early = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(early.is_err());

    assert!(terminate(launched.pid).unwrap());
    let result = rx.recv().await.unwrap();
    assert_eq!(result.exit_code, -1);
}

#[tokio::test]
async fn test_deadline_after_exit_still_reports() {
    let (tx, mut rx) = mpsc::channel(1);
    let template = CommandTemplate::new("echo").args("done");

    let launched = Runner::new().run_async(&template, &[], tx).await.unwrap();
    let pid = launched.pid;
    launched.join().await.unwrap();

    // The child has been reaped; a late deadline must not lose the result.
    assert!(!terminate(pid).unwrap());
    let result = rx.recv().await.unwrap();
    assert_eq!(result.stdout, "done\n");
    assert_eq!(result.exit_code, 0);
}

// ============================================================================
// Background runs
// ============================================================================

#[test]
fn test_background_returns_pid() {
    let pid = Runner::new()
        .background(&CommandTemplate::new("true").args("{{IGNORED}}"))
        .unwrap();
    assert!(pid > 0);
}

#[test]
fn test_background_missing_executable() {
    let err = Runner::new()
        .background(&CommandTemplate::new("/cmdr/no/such/program"))
        .unwrap_err();
    assert!(err.is_not_found());
}
