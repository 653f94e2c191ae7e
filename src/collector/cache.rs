//! On-disk cache of unpacked bulk extracts
//!
//! Each dataset code owns three files in the cache folder: the downloaded
//! `<code>.zip`, the unpacked `<code>.csv`, and a `<code>.txt` status file
//! that holds `OK` once unpacking finished.

use crate::constants::CACHE_STATUS_OK;
use crate::error::{FaostatError, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

#[derive(Debug, Clone)]
pub struct CachedExtract {
    pub csv_path: PathBuf,
    pub status_path: PathBuf,
    pub zip_path: PathBuf,
}

impl CachedExtract {
    pub fn new(folder: &Path, code: &str) -> Self {
        Self {
            csv_path: folder.join(format!("{}.csv", code)),
            status_path: folder.join(format!("{}.txt", code)),
            zip_path: folder.join(format!("{}.zip", code)),
        }
    }

    /// True when the extract was unpacked successfully within `max_age`
    pub fn is_fresh(&self, max_age: Duration) -> bool {
        if !self.csv_path.exists() {
            return false;
        }
        let Ok(modified) = fs::metadata(&self.status_path).and_then(|m| m.modified()) else {
            return false;
        };
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        if age >= max_age {
            debug!("Status file {} is stale", self.status_path.display());
            return false;
        }
        fs::read_to_string(&self.status_path)
            .map(|status| status == CACHE_STATUS_OK)
            .unwrap_or(false)
    }

    /// Remove every file belonging to this extract
    pub fn invalidate(&self) -> Result<()> {
        for path in [&self.status_path, &self.csv_path, &self.zip_path] {
            match fs::remove_file(path) {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Unpack `member` from the downloaded zip into the csv path
    pub fn unpack(&self, member: &str) -> Result<()> {
        let mut archive = ZipArchive::new(File::open(&self.zip_path)?)?;
        let mut entry = archive.by_name(member).map_err(|e| match e {
            ZipError::FileNotFound => FaostatError::MissingArchiveMember {
                path: self.zip_path.clone(),
                member: member.to_string(),
            },
            other => other.into(),
        })?;
        let mut output = File::create(&self.csv_path)?;
        let bytes = io::copy(&mut entry, &mut output)?;
        debug!("Unpacked {} ({} bytes) to {}", member, bytes, self.csv_path.display());
        Ok(())
    }

    pub fn mark_ok(&self) -> Result<()> {
        fs::write(&self.status_path, CACHE_STATUS_OK)?;
        Ok(())
    }
}
