// File system operations for storing MIDI artifacts
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A file written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredArtifact {
    pub path: PathBuf,

    /// SHA-256 of the contents, lowercase hex
    pub sha256: String,

    /// Size in bytes
    pub size: usize,
}

/// Write `data` to `path`, creating the parent directory first
///
/// The buffer goes to `<path>.tmp` and is renamed over `path` once fully
/// written, so a failed write leaves any existing file untouched. A read-only
/// destination is refused.
pub fn store_bytes(path: &Path, data: &[u8]) -> StorageResult<StoredArtifact> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let write_error = |source: io::Error| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Ok(metadata) = fs::metadata(path) {
        if metadata.permissions().readonly() {
            return Err(write_error(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "destination is read-only",
            )));
        }
    }

    let tmp = temp_path(path);
    let mut file = fs::File::create(&tmp).map_err(write_error)?;

    let written = file.write_all(data).and_then(|_| file.sync_all());
    drop(file);
    let written = written.and_then(|_| fs::rename(&tmp, path));

    if let Err(source) = written {
        if let Err(e) = fs::remove_file(&tmp) {
            log::warn!("Failed to remove temp file {}: {}", tmp.display(), e);
        }
        return Err(write_error(source));
    }

    let artifact = StoredArtifact {
        path: path.to_path_buf(),
        sha256: calculate_sha256(data),
        size: data.len(),
    };
    log::info!("Stored {} ({} bytes)", artifact.path.display(), artifact.size);

    Ok(artifact)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Path of the hex dump written next to a MIDI file: `<stem>_hex.txt`
pub fn companion_dump_path(midi_path: &Path) -> PathBuf {
    let stem = midi_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    midi_path.with_file_name(format!("{}_hex.txt", stem))
}

/// Write a hex dump next to the MIDI file it describes
pub fn store_hex_dump(midi_path: &Path, dump: &str) -> StorageResult<StoredArtifact> {
    store_bytes(&companion_dump_path(midi_path), dump.as_bytes())
}

/// Read a text file (hex input, config)
pub fn read_text(path: &Path) -> StorageResult<String> {
    fs::read_to_string(path).map_err(|source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Calculate SHA256 hash of data
pub fn calculate_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_calculate_sha256() {
        let data = b"hello world";
        let hash = calculate_sha256(data);
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_store_bytes_creates_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("songs").join("nested").join("demo.mid");

        let artifact = store_bytes(&path, b"MThd").unwrap();
        assert_eq!(artifact.path, path);
        assert_eq!(artifact.size, 4);
        assert_eq!(artifact.sha256, calculate_sha256(b"MThd"));
        assert_eq!(fs::read(&path).unwrap(), b"MThd");
    }

    #[test]
    fn test_store_bytes_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("demo.mid");

        store_bytes(&path, b"first version").unwrap();
        store_bytes(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn test_store_bytes_reports_path() {
        let dir = TempDir::new().unwrap();
        // A regular file where a directory is needed
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let path = blocker.join("demo.mid");

        match store_bytes(&path, b"MThd") {
            Err(StorageError::CreateDir { path: failed, .. }) => assert_eq!(failed, blocker),
            other => panic!("Expected CreateDir error, got {:?}", other),
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_store_bytes_keeps_existing_file_on_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("song.mid");
        fs::write(&path, b"previous take").unwrap();
        // A directory where the temp file would go
        fs::create_dir(dir.path().join("song.mid.tmp")).unwrap();

        match store_bytes(&path, b"MThd") {
            Err(StorageError::Write { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("Expected Write error, got {:?}", other),
        }
        assert_eq!(fs::read(&path).unwrap(), b"previous take");
    }

    #[test]
    fn test_store_bytes_refuses_read_only_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("song.mid");
        fs::write(&path, b"previous take").unwrap();

        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&path, permissions.clone()).unwrap();

        let result = store_bytes(&path, b"MThd");
        assert!(matches!(result, Err(StorageError::Write { .. })));
        assert_eq!(fs::read(&path).unwrap(), b"previous take");
        assert!(!dir.path().join("song.mid.tmp").exists());

        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        fs::set_permissions(&path, permissions).unwrap();
    }

    #[test]
    fn test_companion_dump_path() {
        assert_eq!(
            companion_dump_path(Path::new("out/My Song.mid")),
            PathBuf::from("out/My Song_hex.txt")
        );
        assert_eq!(companion_dump_path(Path::new("demo")), PathBuf::from("demo_hex.txt"));
    }

    #[test]
    fn test_store_hex_dump() {
        let dir = TempDir::new().unwrap();
        let midi_path = dir.path().join("demo.mid");

        let artifact = store_hex_dump(&midi_path, "// Full MIDI Hex\nFF 2F 00\n").unwrap();
        assert_eq!(artifact.path, dir.path().join("demo_hex.txt"));
        assert_eq!(
            fs::read_to_string(&artifact.path).unwrap(),
            "// Full MIDI Hex\nFF 2F 00\n"
        );
    }

    #[test]
    fn test_read_text_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.txt");

        match read_text(&path) {
            Err(StorageError::Read { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("Expected Read error, got {:?}", other),
        }
    }
}
