use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Upper bound (exclusive) for the minor component of a package version.
pub const MINOR_CEILING: u64 = 256;
/// Upper bound (exclusive) for the patch component of a package version.
pub const PATCH_CEILING: u64 = 65536;

/// Errors raised while normalizing a `product.version` string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The version does not have 3 or 4 dot-separated parts.
    #[error("invalid version format: {0:?} (expected MAJOR.MINOR.PATCH[.REV] or YYYY.MM.DD)")]
    InvalidVersionFormat(String),
    /// One of the parts is not a non-negative integer.
    #[error("invalid version part: {0:?} is not a number")]
    InvalidVersionPart(String),
}

/// How a raw version string is turned into the package version.
///
/// A build picks one policy and uses its output everywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum VersionPolicy {
    /// Fold a revision into the patch, shorten 4-digit years and wrap
    /// minor/patch into the package format's field widths.
    #[default]
    Reduce,
    /// Only check that every part is numeric and keep the string as is.
    PassThrough,
}

impl VersionPolicy {
    pub fn apply(self, raw: &str) -> Result<String, VersionError> {
        match self {
            VersionPolicy::Reduce => normalize_version(raw),
            VersionPolicy::PassThrough => validate_version(raw),
        }
    }
}

impl fmt::Display for VersionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionPolicy::Reduce => write!(f, "reduce"),
            VersionPolicy::PassThrough => write!(f, "pass-through"),
        }
    }
}

impl FromStr for VersionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reduce" => Ok(VersionPolicy::Reduce),
            "pass-through" | "passthrough" => Ok(VersionPolicy::PassThrough),
            other => Err(anyhow::anyhow!("Unknown version policy: {}", other)),
        }
    }
}

fn parse_part(part: &str) -> Result<u64, VersionError> {
    part.parse::<u64>()
        .map_err(|_| VersionError::InvalidVersionPart(part.to_string()))
}

/// Normalizes a version into the three-component form accepted by the package format.
///
/// - `YYYY.MM.DD` keeps the last two digits of the year as major.
/// - `MAJOR.MINOR.PATCH.REV` folds the revision into the patch as `patch * 1000 + rev`.
/// - Minor wraps at [`MINOR_CEILING`], patch at [`PATCH_CEILING`]. Overflow is not an error.
///
/// # Errors
/// [`VersionError::InvalidVersionFormat`] if the part count is not 3 or 4,
/// [`VersionError::InvalidVersionPart`] for the first part that is not a number.
///
/// # Example
///
/// ```
/// use chocopack::normalize_version;
///
/// assert_eq!(normalize_version("2024.10.11").unwrap(), "24.10.11");
/// assert_eq!(normalize_version("1.2.3.456").unwrap(), "1.2.3456");
/// ```
pub fn normalize_version(raw: &str) -> Result<String, VersionError> {
    let parts: Vec<&str> = raw.split('.').collect();
    let (major, minor, patch) = match parts.as_slice() {
        [first, minor, patch] => {
            // 4-digit first part is a year: keep the last two digits
            let major = if first.len() == 4 {
                parse_part(first)?;
                parse_part(&first[2..])?
            } else {
                parse_part(first)?
            };
            (major, parse_part(minor)?, parse_part(patch)?)
        }
        [major, minor, patch, rev] => {
            let major = parse_part(major)?;
            let minor = parse_part(minor)?;
            let patch = parse_part(patch)?;
            let rev = parse_part(rev)?;
            (major, minor, patch.wrapping_mul(1000).wrapping_add(rev))
        }
        _ => return Err(VersionError::InvalidVersionFormat(raw.to_string())),
    };
    Ok(format!(
        "{}.{}.{}",
        major,
        minor % MINOR_CEILING,
        patch % PATCH_CEILING
    ))
}

/// Checks that every dot-separated part of `raw` is a number and returns it unchanged.
pub fn validate_version(raw: &str) -> Result<String, VersionError> {
    for part in raw.split('.') {
        parse_part(part)?;
    }
    Ok(raw.to_string())
}
