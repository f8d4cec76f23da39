//! Durable per-contract outcome storage
//!
//! One JSON file per contract, `<results_dir>[/<pass>]/<address>.json`. The
//! presence of a committed file is the only "already processed" marker. Writes
//! go through a temp file and a rename so a crash never leaves a partial
//! record behind. While a worker processes an address it holds an exclusive
//! `<address>.lock` claim file.

use lazy_static::lazy_static;
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::{AppError, AppResult};
use crate::types::outcome::OutcomeRecord;

lazy_static! {
    static ref ADDRESS_RE: Regex =
        Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("static address regex");
}

const RECORD_EXTENSION: &str = "json";
const CLAIM_EXTENSION: &str = "lock";

/// Whether `address` is a 20-byte hex account address
pub fn is_valid_address(address: &str) -> bool {
    ADDRESS_RE.is_match(address)
}

/// One file found by [`OutcomeStore::scan`]
#[derive(Debug)]
pub struct ScannedOutcome {
    pub address: String,
    /// Parse failures are reported per file, never for the whole scan
    pub record: Result<OutcomeRecord, String>,
}

/// Exclusive claim on an address; released on drop
#[derive(Debug)]
pub struct ClaimGuard {
    path: PathBuf,
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                warn!("Failed to release claim {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Outcome records for one pass directory
#[derive(Debug, Clone)]
pub struct OutcomeStore {
    dir: PathBuf,
}

impl OutcomeStore {
    /// Store rooted at `results_dir`, optionally namespaced by a pass prefix
    pub fn open(results_dir: &Path, pass: Option<&str>) -> AppResult<Self> {
        let dir = match pass {
            Some(prefix) => {
                if prefix.is_empty()
                    || !prefix
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
                {
                    return Err(AppError::Config(format!(
                        "Invalid pass prefix '{}': use letters, digits, '-' or '_'",
                        prefix
                    )));
                }
                results_dir.join(prefix)
            }
            None => results_dir.to_path_buf(),
        };
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, address: &str, extension: &str) -> AppResult<PathBuf> {
        if !is_valid_address(address) {
            return Err(AppError::InvalidData(format!(
                "Not a contract address: {}",
                address
            )));
        }
        Ok(self
            .dir
            .join(format!("{}.{}", address.to_ascii_lowercase(), extension)))
    }

    pub fn exists(&self, address: &str) -> AppResult<bool> {
        Ok(self.path_for(address, RECORD_EXTENSION)?.is_file())
    }

    pub fn read(&self, address: &str) -> AppResult<Option<OutcomeRecord>> {
        let path = self.path_for(address, RECORD_EXTENSION)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Atomically write (or replace) the record for `address`
    pub fn commit(&self, address: &str, record: &OutcomeRecord) -> AppResult<()> {
        let path = self.path_for(address, RECORD_EXTENSION)?;
        let tmp = self
            .dir
            .join(format!(".{}.tmp", address.to_ascii_lowercase()));

        let json = serde_json::to_vec_pretty(record)?;
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            AppError::Store(format!("Failed to commit {}: {}", path.display(), e))
        })?;

        debug!("Committed outcome {}", path.display());
        Ok(())
    }

    /// Claim `address` for processing; `None` when another worker holds it
    pub fn try_claim(&self, address: &str) -> AppResult<Option<ClaimGuard>> {
        let path = self.path_for(address, CLAIM_EXTENSION)?;
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Some(ClaimGuard { path })),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Remove claims left behind by an interrupted run
    pub fn clear_stale_claims(&self) -> AppResult<usize> {
        let pattern = self.dir.join(format!("*.{}", CLAIM_EXTENSION));
        let mut cleared = 0;
        for entry in glob::glob(&pattern.to_string_lossy())? {
            fs::remove_file(entry?)?;
            cleared += 1;
        }
        if cleared > 0 {
            warn!("Cleared {} stale claim(s) in {}", cleared, self.dir.display());
        }
        Ok(cleared)
    }

    /// Every record file in the directory, sorted by address
    pub fn scan(&self) -> AppResult<Vec<ScannedOutcome>> {
        let pattern = self.dir.join(format!("*.{}", RECORD_EXTENSION));
        let mut outcomes = Vec::new();

        for entry in glob::glob(&pattern.to_string_lossy())? {
            let path = entry?;
            let Some(address) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let record = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|content| {
                    serde_json::from_str::<OutcomeRecord>(&content).map_err(|e| e.to_string())
                });
            outcomes.push(ScannedOutcome {
                address: address.to_string(),
                record,
            });
        }

        outcomes.sort_by(|a, b| a.address.cmp(&b.address));
        Ok(outcomes)
    }
}
