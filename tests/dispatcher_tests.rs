//! Dispatcher Tests
//!
//! Exercises command execution and the exact response wording clients see.

use std::sync::Arc;

use depot::protocol::{Command, Response};
use depot::{Dispatcher, FileStore, ServerStats};
use tempfile::TempDir;

fn fixture(dir: &TempDir) -> (Dispatcher, Arc<ServerStats>) {
    let store = FileStore::open(dir.path().join("files")).unwrap();
    let stats = Arc::new(ServerStats::new());
    (Dispatcher::new(store, Arc::clone(&stats)), stats)
}

fn upload_command(filename: &str, content: &[u8]) -> Command {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    Command::Upload {
        filename: filename.to_string(),
        payload: STANDARD.encode(content),
    }
}

// =============================================================================
// Happy Paths
// =============================================================================

#[test]
fn test_upload_confirmation_wording() {
    let dir = TempDir::new().unwrap();
    let (dispatcher, _) = fixture(&dir);

    match dispatcher.dispatch(upload_command("a.bin", b"hello")) {
        Response::Message(message) => assert_eq!(message, "a.bin uploaded"),
        other => panic!("Expected confirmation message, got {:?}", other),
    }
}

#[test]
fn test_upload_then_get_returns_same_bytes() {
    let dir = TempDir::new().unwrap();
    let (dispatcher, _) = fixture(&dir);

    let content = b"some binary\x00\x01\x02 content";
    dispatcher.dispatch(upload_command("blob.bin", content));

    match dispatcher.dispatch(Command::Get {
        filename: "blob.bin".to_string(),
    }) {
        Response::File { filename, content: encoded } => {
            use base64::engine::general_purpose::STANDARD;
            use base64::Engine as _;
            assert_eq!(filename, "blob.bin");
            assert_eq!(STANDARD.decode(encoded).unwrap(), content);
        }
        other => panic!("Expected file response, got {:?}", other),
    }
}

#[test]
fn test_delete_confirmation_wording() {
    let dir = TempDir::new().unwrap();
    let (dispatcher, _) = fixture(&dir);

    dispatcher.dispatch(upload_command("a.bin", b"hello"));
    match dispatcher.dispatch(Command::Delete {
        filename: "a.bin".to_string(),
    }) {
        Response::Message(message) => assert_eq!(message, "a.bin deleted"),
        other => panic!("Expected confirmation message, got {:?}", other),
    }
}

#[test]
fn test_list_reflects_uploads_sorted() {
    let dir = TempDir::new().unwrap();
    let (dispatcher, _) = fixture(&dir);

    dispatcher.dispatch(upload_command("b.bin", b"b"));
    dispatcher.dispatch(upload_command("a.bin", b"a"));

    match dispatcher.dispatch(Command::List) {
        Response::Listing(filenames) => assert_eq!(filenames, vec!["a.bin", "b.bin"]),
        other => panic!("Expected listing response, got {:?}", other),
    }
}

// =============================================================================
// Failure Paths
// =============================================================================

#[test]
fn test_get_missing_file_wording() {
    let dir = TempDir::new().unwrap();
    let (dispatcher, _) = fixture(&dir);

    match dispatcher.dispatch(Command::Get {
        filename: "absent.bin".to_string(),
    }) {
        Response::Error(message) => assert_eq!(message, "File 'absent.bin' not found."),
        other => panic!("Expected error response, got {:?}", other),
    }
}

#[test]
fn test_delete_missing_file_wording() {
    let dir = TempDir::new().unwrap();
    let (dispatcher, _) = fixture(&dir);

    match dispatcher.dispatch(Command::Delete {
        filename: "absent.bin".to_string(),
    }) {
        Response::Error(message) => assert_eq!(message, "File 'absent.bin' not found."),
        other => panic!("Expected error response, got {:?}", other),
    }
}

#[test]
fn test_upload_with_invalid_base64_is_an_error() {
    let dir = TempDir::new().unwrap();
    let (dispatcher, _) = fixture(&dir);

    let response = dispatcher.dispatch(Command::Upload {
        filename: "a.bin".to_string(),
        payload: "this is !!! not base64".to_string(),
    });
    match response {
        Response::Error(message) => {
            assert!(message.starts_with("Invalid base64 payload:"), "{}", message);
        }
        other => panic!("Expected error response, got {:?}", other),
    }

    // Nothing must have been stored
    match dispatcher.dispatch(Command::List) {
        Response::Listing(filenames) => assert!(filenames.is_empty()),
        other => panic!("Expected listing response, got {:?}", other),
    }
}

#[test]
fn test_traversal_filename_is_an_error_response() {
    let dir = TempDir::new().unwrap();
    let (dispatcher, _) = fixture(&dir);

    match dispatcher.dispatch(Command::Get {
        filename: "../evil".to_string(),
    }) {
        Response::Error(message) => assert_eq!(message, "Invalid filename '../evil'."),
        other => panic!("Expected error response, got {:?}", other),
    }
}

// =============================================================================
// Statistics Query
// =============================================================================

#[test]
fn test_stats_command_reads_shared_counters() {
    let dir = TempDir::new().unwrap();
    let (dispatcher, stats) = fixture(&dir);

    stats.record_success();
    stats.record_success();
    stats.record_failure();

    match dispatcher.dispatch(Command::Stats) {
        Response::Stats(snapshot) => {
            assert_eq!(snapshot.successful, 2);
            assert_eq!(snapshot.failed, 1);
        }
        other => panic!("Expected stats response, got {:?}", other),
    }
}

#[test]
fn test_dispatch_never_touches_counters_itself() {
    // Counting happens at the session layer, after the response is written
    let dir = TempDir::new().unwrap();
    let (dispatcher, stats) = fixture(&dir);

    dispatcher.dispatch(upload_command("a.bin", b"x"));
    dispatcher.dispatch(Command::Get {
        filename: "absent.bin".to_string(),
    });

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.successful, 0);
    assert_eq!(snapshot.failed, 0);
}
