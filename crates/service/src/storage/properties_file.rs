//! Line-oriented `key=value` file handling.
//!
//! Every mutation reads the whole file, edits the matching line and
//! truncates/rewrites the file in place. Lines that do not belong to the
//! edited key are written back verbatim, original line ending included.

use std::{collections::HashMap, io::SeekFrom, path::Path};

use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::warn;

use crate::errors::ServiceError;

/// Split one line into `(key, value)` at the first `=`.
///
/// Whitespace around the key is ignored; the value is everything after the
/// `=` up to the line ending, unmodified. Blank lines and lines without `=`
/// yield `None`.
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = strip_ending(line);
    if line.trim().is_empty() {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value))
}

/// Parse a whole document. Malformed lines are skipped; a later occurrence of
/// a key overrides an earlier one.
pub fn parse(content: &str) -> HashMap<String, String> {
    let mut conf = HashMap::new();
    for (no, line) in content.lines().enumerate() {
        match parse_line(line) {
            Some((key, value)) => {
                conf.insert(key.to_string(), value.to_string());
            }
            None if !line.trim().is_empty() => {
                warn!(line = no + 1, "skipping properties line without '='");
            }
            None => {}
        }
    }
    conf
}

/// Line without its `\n` / `\r\n` terminator.
fn strip_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

fn is_entry_of(line: &str, key: &str) -> bool {
    parse_line(line).is_some_and(|(k, _)| k == key)
}

/// Replace the first line for `key` (dropping any later duplicates) or append one.
///
/// The replaced line keeps its original terminator; an appended line ends in `\n`.
pub fn upsert_entry(content: &str, key: &str, value: &str) -> String {
    let entry = format!("{key}={value}");
    let mut found = false;
    let mut out = String::with_capacity(content.len() + entry.len() + 1);
    for line in content.split_inclusive('\n') {
        if !is_entry_of(line, key) {
            out.push_str(line);
            continue;
        }
        if !found {
            let ending = &line[strip_ending(line).len()..];
            out.push_str(&entry);
            out.push_str(if ending.is_empty() { "\n" } else { ending });
            found = true;
        }
    }
    if !found {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&entry);
        out.push('\n');
    }
    out
}

/// Drop every line for `key`. Returns `None` when nothing matched.
pub fn remove_entry(content: &str, key: &str) -> Option<String> {
    let mut found = false;
    let mut out = String::with_capacity(content.len());
    for line in content.split_inclusive('\n') {
        if is_entry_of(line, key) {
            found = true;
        } else {
            out.push_str(line);
        }
    }
    found.then_some(out)
}

/// Load the file into a map. A missing file is an empty configuration.
pub async fn load(path: &Path) -> Result<HashMap<String, String>, ServiceError> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(parse(&content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
        Err(e) => Err(ServiceError::io(path, e)),
    }
}

async fn rewrite(file: &mut fs::File, path: &Path, content: &str) -> Result<(), ServiceError> {
    let io = |e| ServiceError::io(path, e);
    file.set_len(0).await.map_err(io)?;
    file.seek(SeekFrom::Start(0)).await.map_err(io)?;
    file.write_all(content.as_bytes()).await.map_err(io)?;
    file.flush().await.map_err(io)?;
    Ok(())
}

/// Set `key=value` in the file, creating the file (and its parent directory) if needed.
pub async fn update(path: &Path, key: &str, value: &str) -> Result<(), ServiceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(|e| ServiceError::io(parent, e))?;
    }
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .await
        .map_err(|e| ServiceError::io(path, e))?;

    let mut content = String::new();
    file.read_to_string(&mut content).await.map_err(|e| ServiceError::io(path, e))?;

    let rewritten = upsert_entry(&content, key, value);
    rewrite(&mut file, path, &rewritten).await
}

/// Remove `key` from the file. Returns whether a line was dropped; the file
/// is left untouched when the key is absent.
pub async fn remove(path: &Path, key: &str) -> Result<bool, ServiceError> {
    let mut file = match OpenOptions::new().read(true).write(true).open(path).await {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServiceError::not_found(&format!("properties file {}", path.display())));
        }
        Err(e) => return Err(ServiceError::io(path, e)),
    };

    let mut content = String::new();
    file.read_to_string(&mut content).await.map_err(|e| ServiceError::io(path, e))?;

    match remove_entry(&content, key) {
        Some(rewritten) => {
            rewrite(&mut file, path, &rewritten).await?;
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn parse_skips_blank_and_malformed_lines() {
        let conf = parse("a.x=1\n\n   \nnot a pair\nb.y = 2 \na.z=k=v\n");
        assert_eq!(conf.len(), 3);
        assert_eq!(conf["a.x"], "1");
        // the key is trimmed, the value is kept as written
        assert_eq!(conf["b.y"], " 2 ");
        // value runs to the end of the line, including further '='
        assert_eq!(conf["a.z"], "k=v");
    }

    #[test]
    fn parse_keeps_last_duplicate() {
        let conf = parse("a.x=1\na.x=2\n");
        assert_eq!(conf["a.x"], "2");
    }

    #[test]
    fn parse_drops_only_the_line_terminator() {
        let conf = parse("a.x=hello \r\na.y=\tv\r\n");
        assert_eq!(conf["a.x"], "hello ");
        assert_eq!(conf["a.y"], "\tv");
    }

    #[test]
    fn key_match_needs_the_separator() {
        assert!(is_entry_of("app.port=1", "app.port"));
        assert!(is_entry_of("  app.port=1", "app.port"));
        assert!(is_entry_of("app.port=1\r\n", "app.port"));
        assert!(!is_entry_of("app.ports=1", "app.port"));
        assert!(!is_entry_of("xapp.port=1", "app.port"));
    }

    #[test]
    fn upsert_replaces_in_place_and_collapses_duplicates() {
        let src = "other.a=1\napp.port=80\nnoise\napp.port=81\nother.b=2";
        let out = upsert_entry(src, "app.port", "9090");
        assert_eq!(out, "other.a=1\napp.port=9090\nnoise\nother.b=2");

        // appending after an unterminated last line adds the separator first
        let out = upsert_entry(src, "app.host", "h");
        assert_eq!(out, format!("{src}\napp.host=h\n"));

        assert_eq!(upsert_entry("", "a.x", "1"), "a.x=1\n");
    }

    #[test]
    fn crlf_lines_keep_their_endings() {
        let src = "db.url=x\r\napp.port=80\r\ndb.pool=4\r\n";
        assert_eq!(upsert_entry(src, "app.port", "81"), "db.url=x\r\napp.port=81\r\ndb.pool=4\r\n");
        assert_eq!(remove_entry(src, "app.port").as_deref(), Some("db.url=x\r\ndb.pool=4\r\n"));
    }

    #[test]
    fn remove_reports_absence() {
        assert!(remove_entry("a.x=1", "a.y").is_none());
        let out = remove_entry("a.x=1\na.y=2\na.y=3", "a.y").unwrap();
        assert_eq!(out, "a.x=1\n");
    }

    #[tokio::test]
    async fn file_round_trip() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("properties_file_{}", Uuid::new_v4()));
        let path = dir.join("nested").join("cfg.properties");

        assert!(load(&path).await?.is_empty());
        assert!(matches!(remove(&path, "a.x").await, Err(ServiceError::NotFound(_))));

        update(&path, "a.x", "1").await?;
        update(&path, "b.y", "2").await?;
        update(&path, "a.x", "3").await?;
        assert_eq!(fs::read_to_string(&path).await?, "a.x=3\nb.y=2\n");

        assert!(!remove(&path, "a.missing").await?);
        assert!(remove(&path, "a.x").await?);
        assert_eq!(fs::read_to_string(&path).await?, "b.y=2\n");

        let conf = load(&path).await?;
        assert_eq!(conf.len(), 1);
        assert_eq!(conf["b.y"], "2");

        let _ = fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn shorter_rewrite_truncates_tail() -> Result<(), anyhow::Error> {
        let path = std::env::temp_dir().join(format!("properties_trunc_{}.properties", Uuid::new_v4()));
        fs::write(&path, "a.x=a-rather-long-value\nb.y=2\n").await?;
        update(&path, "a.x", "s").await?;
        assert_eq!(fs::read_to_string(&path).await?, "a.x=s\nb.y=2\n");
        let _ = fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn rewrite_keeps_crlf_and_trailing_spaces() -> Result<(), anyhow::Error> {
        let path = std::env::temp_dir().join(format!("properties_crlf_{}.properties", Uuid::new_v4()));
        fs::write(&path, "db.url=jdbc:x\r\napp.port=80\r\nmotd=hi \r\n").await?;

        update(&path, "app.port", "81").await?;
        assert_eq!(fs::read_to_string(&path).await?, "db.url=jdbc:x\r\napp.port=81\r\nmotd=hi \r\n");

        assert!(remove(&path, "db.url").await?);
        assert_eq!(fs::read_to_string(&path).await?, "app.port=81\r\nmotd=hi \r\n");

        assert_eq!(load(&path).await?["motd"], "hi ");
        let _ = fs::remove_file(&path).await;
        Ok(())
    }
}
