//! Fetching model artifacts into the cache.
//!
//! Bytes stream into `<name>.part` next to the destination and are hashed on
//! the way through. The partial file is renamed into place only after the
//! whole body has been written, so an interrupted download never leaves a
//! file that `has_valid_model_files` would accept.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const CHUNK: usize = 8192;
const TIMEOUT: Duration = Duration::from_secs(300);

/// A file that has been written to its final location.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub bytes: u64,
    /// Lowercase hex SHA-256 of the written bytes
    pub sha256: String,
}

/// SHA-256 of a file on disk, as lowercase hex.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; CHUNK];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Sibling path the body is streamed into before the rename.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

/// GET `url` into `dest`, printing progress in MB.
pub fn fetch(url: &str, dest: &Path) -> Result<Fetched> {
    println!("  {}", url);

    let client = reqwest::blocking::Client::builder().timeout(TIMEOUT).build()?;
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to GET {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP {}: {}", response.status(), url);
    }

    let total_mb = response.content_length().map(|t| t / (1024 * 1024));
    let fetched = write_atomic(response, dest, |written| {
        let mb = written / (1024 * 1024);
        match total_mb {
            Some(total) => print!("\r  {}/{} MB", mb, total),
            None => print!("\r  {} MB", mb),
        }
        std::io::stdout().flush().ok();
    })
    .with_context(|| format!("Failed to download {}", url))?;

    println!(" {}", &fetched.sha256[..12]);
    Ok(fetched)
}

/// Stream `reader` into `dest` through a `.part` file.
///
/// On any error the partial file is removed and `dest` is left untouched.
pub fn write_atomic<R, F>(reader: R, dest: &Path, progress: F) -> Result<Fetched>
where
    R: Read,
    F: FnMut(u64),
{
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let part = partial_path(dest);
    let result = stream_to(reader, &part, progress)
        .and_then(|fetched| {
            fs::rename(&part, dest)
                .with_context(|| format!("Failed to move {:?} into place", part))?;
            Ok(fetched)
        });

    match result {
        Ok(fetched) => {
            debug!(path = %dest.display(), bytes = fetched.bytes, "download complete");
            Ok(fetched)
        }
        Err(e) => {
            if part.exists() {
                if let Err(cleanup) = fs::remove_file(&part) {
                    warn!(path = %part.display(), error = %cleanup, "could not remove partial download");
                }
            }
            Err(e)
        }
    }
}

fn stream_to<R: Read, F: FnMut(u64)>(mut reader: R, part: &Path, mut progress: F) -> Result<Fetched> {
    let mut file = File::create(part).with_context(|| format!("Failed to create {:?}", part))?;
    let mut hasher = Sha256::new();
    let mut written: u64 = 0;
    let mut buffer = [0u8; CHUNK];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        file.write_all(&buffer[..n])?;
        hasher.update(&buffer[..n]);
        written += n as u64;
        progress(written);
    }
    file.sync_all()?;

    Ok(Fetched {
        bytes: written,
        sha256: format!("{:x}", hasher.finalize()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};
    use tempfile::NamedTempFile;

    /// Yields `good` bytes, then fails as a dropped connection would
    struct Interrupted {
        good: Cursor<Vec<u8>>,
    }

    impl Read for Interrupted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.good.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_sha256_empty_file() {
        let file = NamedTempFile::new().unwrap();
        assert_eq!(
            sha256_file(file.path()).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(sha256_file(&dir.path().join("absent.onnx")).is_err());
    }

    #[test]
    fn test_partial_path_keeps_extension() {
        let part = partial_path(Path::new("/cache/m/model_quantized.onnx"));
        assert_eq!(part, PathBuf::from("/cache/m/model_quantized.onnx.part"));
    }

    #[test]
    fn test_complete_write_is_renamed_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("m").join("tokenizer.json");

        let mut calls = 0;
        let fetched = write_atomic(Cursor::new(b"test".to_vec()), &dest, |_| calls += 1).unwrap();

        assert_eq!(fetched.bytes, 4);
        assert_eq!(
            fetched.sha256,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
        assert_eq!(calls, 1);
        assert_eq!(fs::read(&dest).unwrap(), b"test");
        assert!(!partial_path(&dest).exists());
        assert_eq!(sha256_file(&dest).unwrap(), fetched.sha256);
    }

    #[test]
    fn test_interrupted_write_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("model_quantized.onnx");
        let reader = Interrupted {
            good: Cursor::new(vec![7u8; 3 * CHUNK]),
        };

        let err = write_atomic(reader, &dest, |_| {}).unwrap_err();

        assert!(format!("{err:#}").contains("connection reset"));
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }

    #[test]
    fn test_interrupted_write_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("tokenizer.json");
        fs::write(&dest, b"{\"previous\": true}").unwrap();

        let reader = Interrupted {
            good: Cursor::new(b"{\"trunc".to_vec()),
        };
        assert!(write_atomic(reader, &dest, |_| {}).is_err());

        assert_eq!(fs::read(&dest).unwrap(), b"{\"previous\": true}");
        assert!(!partial_path(&dest).exists());
    }
}
