use relcrawl::handlers::*;
use std::io::Cursor;
use std::io::Write;
use tempfile::NamedTempFile;
use tracing::Level;

#[test]
fn test_parse_seed_line_trims() {
    let result = parse_seed_line("  https://www.youtube.com/watch?v=abc \n");
    assert_eq!(result, Some("https://www.youtube.com/watch?v=abc".to_string()));
}

#[test]
fn test_parse_seed_line_rejects_blank_and_comments() {
    assert_eq!(parse_seed_line("   "), None);
    assert_eq!(parse_seed_line("# seed goes here"), None);
}

#[test]
fn test_read_seed_prefers_argument() {
    let arg = "abc123".to_string();
    let stdin = Cursor::new("ignored\n");
    assert_eq!(read_seed(Some(&arg), stdin).unwrap(), "abc123");
}

#[test]
fn test_read_seed_rejects_blank_argument() {
    let arg = "  ".to_string();
    let result = read_seed(Some(&arg), Cursor::new(""));
    assert!(result.unwrap_err().contains("must not be empty"));
}

#[test]
fn test_read_seed_from_stdin_skips_blank_lines() {
    let stdin = Cursor::new("\n   \nhttps://youtu.be/xyz\nsecond\n");
    assert_eq!(read_seed(None, stdin).unwrap(), "https://youtu.be/xyz");
}

#[test]
fn test_read_seed_from_piped_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "# seeds")?;
    writeln!(temp_file, "dQw4w9WgXcQ")?;

    let reader = std::io::BufReader::new(temp_file.reopen()?);
    assert_eq!(read_seed(None, reader)?, "dQw4w9WgXcQ");
    Ok(())
}

#[test]
fn test_read_seed_no_input() {
    let result = read_seed(None, Cursor::new(""));
    assert!(result.unwrap_err().contains("No seed provided"));
}

#[test]
fn test_log_level_flags() {
    assert_eq!(log_level(false, false), Level::WARN);
    assert_eq!(log_level(true, false), Level::ERROR);
    assert_eq!(log_level(false, true), Level::DEBUG);
}
