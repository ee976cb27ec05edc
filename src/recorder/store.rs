//! Persists finished recordings to disk.

use std::fmt;
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tempfile::NamedTempFile;
use tracing::debug;

/// Who produced a recording, taken from the `X-Audio-Type` request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Ai,
}

impl Role {
    /// `User` when the header mentions "user" anywhere, ignoring case.
    pub fn from_header(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.to_ascii_lowercase().contains("user") => Role::User,
            _ => Role::Ai,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Ai => "ai",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes `{role}_{YYYYMMDD_HHMMSS}.wav` files into one directory.
#[derive(Debug, Clone)]
pub struct RecordingStore {
    dir: PathBuf,
}

impl RecordingStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save(&self, role: Role, wav: &[u8]) -> Result<PathBuf> {
        self.save_at(role, wav, Local::now())
    }

    /// Save under the name for `timestamp`. An existing file with that name is
    /// never overwritten; a `_1`, `_2`, ... suffix is tried instead.
    pub fn save_at(&self, role: Role, wav: &[u8], timestamp: DateTime<Local>) -> Result<PathBuf> {
        let path = self.save_with(role, timestamp, |file| file.write_all(wav))?;
        debug!("Saved WAV file {:?}, size: {} bytes", path, wav.len());
        Ok(path)
    }

    /// The recording is staged in a temporary file inside the directory and
    /// only linked under its final name once `write` has succeeded.
    fn save_with(
        &self,
        role: Role,
        timestamp: DateTime<Local>,
        write: impl FnOnce(&mut fs::File) -> io::Result<()>,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).context(format!(
            "Failed to create recordings directory {:?}",
            self.dir
        ))?;

        let mut staged = NamedTempFile::new_in(&self.dir)
            .context(format!("Failed to create recording in {:?}", self.dir))?;
        write(staged.as_file_mut())
            .context(format!("Failed to write recording in {:?}", self.dir))?;

        let stem = format!("{}_{}", role, timestamp.format("%Y%m%d_%H%M%S"));

        let mut attempt = 0u32;
        loop {
            let file_name = match attempt {
                0 => format!("{stem}.wav"),
                n => format!("{stem}_{n}.wav"),
            };
            let path = self.dir.join(file_name);

            match staged.persist_noclobber(&path) {
                Ok(_) => return Ok(path),
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                    staged = e.file;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(e.error).context(format!("Failed to save recording {:?}", path));
                }
            }
        }
    }
}
