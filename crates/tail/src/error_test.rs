//! Tests for tailing error types

use super::*;

#[test]
fn test_io_error_display() {
    let err = TailError::io(
        "/var/log/app.log",
        io::Error::new(io::ErrorKind::NotFound, "gone"),
    );
    assert_eq!(err.to_string(), "failed to read '/var/log/app.log': gone");
}

#[test]
fn test_io_error_source() {
    use std::error::Error;

    let err = TailError::io("a.log", io::Error::other("boom"));
    assert!(err.source().is_some());
}

#[test]
fn test_not_a_file_display() {
    let err = TailError::NotAFile(PathBuf::from("/tmp"));
    assert_eq!(err.to_string(), "'/tmp' is not a file");
}

#[test]
fn test_invalid_from_line_display() {
    let err = TailError::InvalidFromLine("-3".to_string());
    assert!(err.to_string().starts_with("invalid number of lines '-3'"));
}
