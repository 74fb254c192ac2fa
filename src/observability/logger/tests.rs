use super::*;
use tempfile::tempdir;

#[test]
fn test_logger_creation() {
    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("test.log");

    let logger = Logger::new(Some(&log_path), Some("debug"));
    assert!(logger.is_ok());

    let logger = logger.unwrap();
    assert_eq!(logger.log_file(), &log_path);
    assert_eq!(logger.log_level(), "DEBUG");
}

#[test]
fn test_log_file_creation() {
    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("logs").join("test.md");

    let _logger = Logger::new(Some(&log_path), None).unwrap();
    assert!(log_path.exists());

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert!(content.contains("# Buildah Operation Log"));
    assert!(content.contains("Log started:"));
}

#[test]
fn test_existing_file_is_appended() {
    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("test.md");

    Logger::new(Some(&log_path), None)
        .unwrap()
        .log_error("rm", "first")
        .unwrap();
    Logger::new(Some(&log_path), None)
        .unwrap()
        .log_error("rm", "second")
        .unwrap();

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert_eq!(content.matches("# Buildah Operation Log").count(), 1);
    assert!(content.contains("first"));
    assert!(content.contains("second"));
}

#[test]
fn test_log_command_execution() {
    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("test.md");
    let logger = Logger::new(Some(&log_path), None).unwrap();

    logger
        .log_command_execution("rm", "buildah rm c1", "", "no such container", 1)
        .unwrap();

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert!(content.contains("Command Execution"));
    assert!(content.contains("**Operation:** rm"));
    assert!(content.contains("`buildah rm c1`"));
    assert!(content.contains("**Return Code:** 1"));
    assert!(content.contains("no such container"));
}

#[test]
fn test_stdout_recorded_only_on_failure_or_debug() {
    let temp_dir = tempdir().unwrap();

    let info_path = temp_dir.path().join("info.md");
    let info = Logger::new(Some(&info_path), None).unwrap();
    info.log_command_execution("images", "buildah images", "IMAGE-LIST", "", 0)
        .unwrap();
    let content = std::fs::read_to_string(&info_path).unwrap();
    assert!(!content.contains("IMAGE-LIST"));

    let debug_path = temp_dir.path().join("debug.md");
    let debug = Logger::new(Some(&debug_path), Some("DEBUG")).unwrap();
    debug
        .log_command_execution("images", "buildah images", "IMAGE-LIST", "", 0)
        .unwrap();
    let content = std::fs::read_to_string(&debug_path).unwrap();
    assert!(content.contains("IMAGE-LIST"));
}

#[test]
fn test_log_check_mode() {
    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("test.md");
    let logger = Logger::new(Some(&log_path), None).unwrap();

    logger
        .log_check_mode("commit", "buildah commit c1 img", true)
        .unwrap();

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert!(content.contains("Check Mode"));
    assert!(content.contains("**Would change:** true"));
}
