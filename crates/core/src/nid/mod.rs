//! NID computation and string helpers.
//!
//! A NID is the first four bytes of the SHA-1 digest of a function name, read
//! little-endian and rendered as eight uppercase hex digits. Downstream tools
//! compare against this literal form, so the output format is fixed:
//! no separators, no `0x` prefix.

use sha1::{Digest, Sha1};
use thiserror::Error;

/// Errors raised while hashing a name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NidError {
    /// Names are hashed as ASCII bytes; anything else is a caller bug.
    #[error("Function name is not ASCII: {name:?}")]
    NonAsciiName { name: String },
}

/// Compute the NID string for a function name.
pub fn compute_nid(name: &str) -> Result<String, NidError> {
    if !name.is_ascii() {
        return Err(NidError::NonAsciiName { name: name.to_string() });
    }

    let mut hasher = Sha1::new();
    hasher.update(name.as_bytes());
    let digest = hasher.finalize();

    Ok(format!("{:02X}{:02X}{:02X}{:02X}", digest[3], digest[2], digest[1], digest[0]))
}

/// Returns true when `name` hashes to `nid`.
pub fn name_matches_nid(name: &str, nid: &str) -> Result<bool, NidError> {
    Ok(compute_nid(name)? == nid)
}

/// A name ending with its own NID is the conventional "no real name known"
/// placeholder (e.g. `ThreadManForUser_446D8DE6`).
pub fn is_placeholder_name(name: &str, nid: &str) -> bool {
    name.ends_with(nid)
}

/// Normalize a NID as found in source files: trim, uppercase, strip `0X`.
pub fn normalize_nid(raw: &str) -> String {
    let upper = raw.trim().to_ascii_uppercase();
    match upper.strip_prefix("0X") {
        Some(rest) => rest.to_string(),
        None => upper,
    }
}

/// Render a NID the way reports display it.
pub fn format_nid(nid: &str) -> String {
    format!("0x{nid}")
}
