//! Solidity compiler version parsing
//!
//! Explorer metadata and corpus records carry compiler identifiers in the
//! `v0.8.13+commit.abaa5c0e` form; only the numeric release is compared.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

lazy_static! {
    static ref VERSION_RE: Regex =
        Regex::new(r"^v?(\d+)\.(\d+)\.(\d+)").expect("static version regex");
    static ref RELEASE_ID_RE: Regex =
        Regex::new(r"^v\d+\.\d+\.\d+\+commit\.[0-9a-f]{8}$").expect("static release regex");
}

/// Numeric `major.minor.patch` compiler release
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SolidityVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SolidityVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Report bucket key, e.g. `0.8.x`
    pub fn minor_key(&self) -> String {
        format!("{}.{}.x", self.major, self.minor)
    }
}

impl FromStr for SolidityVersion {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = VERSION_RE
            .captures(s.trim())
            .ok_or_else(|| AppError::InvalidData(format!("Unparseable compiler version: {}", s)))?;
        let part = |i: usize| -> Result<u32, AppError> {
            caps[i]
                .parse()
                .map_err(|_| AppError::InvalidData(format!("Compiler version out of range: {}", s)))
        };
        Ok(Self::new(part(1)?, part(2)?, part(3)?))
    }
}

impl fmt::Display for SolidityVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Whether a string is a complete solc release identifier
/// (`v<major>.<minor>.<patch>+commit.<8 hex>`), safe to splice into a binary name
pub fn is_release_identifier(s: &str) -> bool {
    RELEASE_ID_RE.is_match(s)
}
