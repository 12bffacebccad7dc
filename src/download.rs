// src/download.rs

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::command::attestation::ops::sha256_hex;
use crate::command::attestation::types::Downloader;
use crate::error::{FormError, FormResult};

/// Saves artifacts into a directory. Writes go to a temp file in the same
/// directory and are renamed into place, replacing an existing file.
#[derive(Debug, Clone)]
pub struct DirDownloader {
    dir: PathBuf,
}

impl DirDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Downloader for DirDownloader {
    fn deliver(&self, artifact: &[u8], filename: &str) -> FormResult<PathBuf> {
        if filename.is_empty()
            || filename.starts_with('.')
            || filename.contains(['/', '\\'])
        {
            return Err(FormError::DownloadFailed(format!(
                "invalid file name: {filename}"
            )));
        }

        fs::create_dir_all(&self.dir)
            .map_err(|e| FormError::DownloadFailed(format!("create dir: {e}")))?;

        let path = self.dir.join(filename);
        let tmp = self
            .dir
            .join(format!(".{filename}.{}.tmp", &sha256_hex(artifact)[..12]));

        let write_res: FormResult<()> = (|| {
            let mut f = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&tmp)
                .map_err(|e| FormError::DownloadFailed(e.to_string()))?;

            f.write_all(artifact)
                .and_then(|_| f.flush())
                .and_then(|_| f.sync_all())
                .map_err(|e| FormError::DownloadFailed(e.to_string()))?;

            fs::rename(&tmp, &path).map_err(|e| FormError::DownloadFailed(e.to_string()))?;
            Ok(())
        })();

        if write_res.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        write_res?;

        Ok(path)
    }
}

// ======================================================
// Unit Tests
// ======================================================
