//! Content change detection

use sha2::{Digest, Sha256};

/// Computes the hex SHA-256 fingerprint of a page body
///
/// # Example
///
/// ```
/// use search_crawler::crawler::fingerprint;
///
/// assert_eq!(fingerprint("abc"), fingerprint("abc"));
/// assert_ne!(fingerprint("abc"), fingerprint("abd"));
/// ```
pub fn fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Returns true when two fingerprints differ
pub fn changed(old_fingerprint: &str, new_fingerprint: &str) -> bool {
    old_fingerprint != new_fingerprint
}
