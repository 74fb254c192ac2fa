use super::*;
use std::time::{Duration, Instant};

const SH: &str = "sh";

fn args(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

#[tokio::test]
async fn test_captures_output_and_exit_code() {
    let result = invoke(SH, &args(&["-c", "echo out; echo err >&2; exit 3"]))
        .await
        .unwrap();

    assert_eq!(result.return_code, 3);
    assert!(!result.success());
    assert_eq!(result.stdout, "out\n");
    assert_eq!(result.stderr, "err\n");
}

#[tokio::test]
async fn test_simple_command() {
    let result = invoke(SH, &args(&["-c", "echo 'Hello World'"]))
        .await
        .unwrap();

    assert!(result.success());
    assert_eq!(result.return_code, 0);
    assert!(result.stdout.contains("Hello World"));
    assert!(result.stderr.is_empty());
}

#[tokio::test]
async fn test_arguments_are_not_shell_interpreted() {
    // "$0" and "$1" are printed by the script itself, so the literal
    // tokens must arrive untouched.
    let result = invoke(
        SH,
        &args(&["-c", "printf '%s|%s' \"$0\" \"$1\"", "$HOME", "*; rm -rf /"]),
    )
    .await
    .unwrap();

    assert_eq!(result.stdout, "$HOME|*; rm -rf /");
}

#[tokio::test]
async fn test_large_output_is_fully_captured() {
    let result = invoke(SH, &args(&["-c", "i=0; while [ $i -lt 20000 ]; do echo line$i; i=$((i+1)); done; echo done >&2"]))
        .await
        .unwrap();

    assert!(result.success());
    assert_eq!(result.stdout.lines().count(), 20000);
    assert_eq!(result.stderr, "done\n");
}

#[tokio::test]
async fn test_missing_binary_is_not_spawned() {
    let err = invoke("/nonexistent/cbk/buildah", &args(&["images"]))
        .await
        .unwrap_err();

    assert!(matches!(err, InvocationError::BinaryNotFound { .. }));
}

#[tokio::test]
async fn test_cancellation_kills_child() {
    let invoker = ProcessInvoker::default();
    let token = CancellationToken::new();
    let canceller = token.clone();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let result = tokio::time::timeout(
        Duration::from_secs(10),
        invoker.invoke(SH, &args(&["-c", "sleep 30 & sleep 30"]), &token),
    )
    .await
    .expect("cancellation should end the invocation promptly");

    assert!(matches!(result, Err(InvocationError::Cancelled { .. })));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_already_cancelled_token() {
    let invoker = ProcessInvoker::default();
    let token = CancellationToken::new();
    token.cancel();

    let result = invoker
        .invoke(SH, &args(&["-c", "echo should-not-matter"]), &token)
        .await;

    assert!(matches!(result, Err(InvocationError::Cancelled { .. })));
}

#[tokio::test]
async fn test_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut invoker = ProcessInvoker::default();
    invoker.set_working_dir(dir.path()).unwrap();
    assert_eq!(invoker.working_dir(), Some(dir.path()));

    let result = invoker
        .invoke(SH, &args(&["-c", "pwd"]), &CancellationToken::new())
        .await
        .unwrap();

    assert!(result.success());
    let reported = PathBuf::from(result.stdout.trim());
    assert_eq!(
        reported.canonicalize().unwrap(),
        dir.path().canonicalize().unwrap()
    );
}

#[test]
fn test_set_working_dir_rejects_missing() {
    let mut invoker = ProcessInvoker::default();
    assert!(invoker
        .set_working_dir(Path::new("/nonexistent/cbk/dir"))
        .is_err());
    assert!(invoker.working_dir().is_none());
}
