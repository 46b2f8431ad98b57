//! Saved editor session: the last submitted code and language selection,
//! restored on the next run and cleared on explicit reset. The original
//! web client kept these under two fixed browser-storage keys; here they
//! live in one JSON file under the state dir.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Session {
    pub code: String,
    pub language: Option<String>,
}

pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Option<Session>> {
    let path = path.as_ref();
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(anyhow::Error::new(e))
                .with_context(|| format!("failed to read session: {}", path.display()))
        }
    };
    let session: Session =
        serde_json::from_slice(&bytes).context("failed to parse session JSON")?;
    Ok(Some(session))
}

/// Write-then-rename so a crash mid-write never leaves a torn session file.
pub fn save_atomic(path: impl AsRef<Path>, session: &Session) -> anyhow::Result<()> {
    let path = path.as_ref();
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create session directory: {}", dir.display()))?;

    let tmp = tmp_path(path);
    let bytes = serde_json::to_vec_pretty(session).context("failed to serialize session")?;
    std::fs::write(&tmp, bytes)
        .with_context(|| format!("failed to write temp session: {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to move session into place: {}", path.display()))?;
    Ok(())
}

pub fn clear(path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(anyhow::Error::new(e))
            .with_context(|| format!("failed to clear session: {}", path.display())),
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "session.json".to_string());
    p.set_file_name(format!("{file}.tmp"));
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_clear_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        assert_eq!(load(&path).unwrap(), None);

        let session = Session {
            code: "print(1)".to_string(),
            language: Some("python".to_string()),
        };
        save_atomic(&path, &session).unwrap();
        assert_eq!(load(&path).unwrap(), Some(session));

        clear(&path).unwrap();
        assert_eq!(load(&path).unwrap(), None);
        // Clearing twice is fine.
        clear(&path).unwrap();
    }

    #[test]
    fn save_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state").join("session.json");
        save_atomic(&path, &Session::default()).unwrap();
        assert!(load(&path).unwrap().is_some());
    }

    #[test]
    fn corrupt_session_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load(&path).is_err());
    }
}
