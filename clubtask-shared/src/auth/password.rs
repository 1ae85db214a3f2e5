/// Password codec
///
/// Passwords are stored as lowercase hex SHA-256 digests. Sheets that predate
/// hashing hold plaintext; those values are still accepted and compared as-is.
///
/// # Stored Forms
///
/// - **Hash**: exactly 64 hex characters (any case); compared against `hash_password(input)`
/// - **Plaintext**: anything else; compared directly
///
/// Both comparisons run in constant time with respect to the content.
///
/// # Example
///
/// ```
/// use clubtask_shared::auth::password::{hash_password, verify_password};
///
/// let stored = hash_password("hunter2");
/// assert_eq!(stored.len(), 64);
/// assert!(verify_password("hunter2", &stored));
///
/// // Legacy plaintext
/// assert!(verify_password("hunter2", "hunter2"));
/// assert!(!verify_password("hunter3", "hunter2"));
/// ```

use sha2::{Digest, Sha256};

/// Password accepted for every member when the sheet has no `Password` column
pub const DEFAULT_PASSWORD: &str = "password123";

/// Hashes a password to 64 lowercase hex characters
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Returns true if `stored` has the shape of a SHA-256 hex digest
pub fn looks_like_hash(stored: &str) -> bool {
    stored.len() == 64 && stored.chars().all(|c| c.is_ascii_hexdigit())
}

/// Checks `password` against a stored hash or legacy plaintext value
pub fn verify_password(password: &str, stored: &str) -> bool {
    if looks_like_hash(stored) {
        constant_time_compare(&hash_password(password), stored)
    } else {
        constant_time_compare(password, stored)
    }
}

/// Compares two strings without short-circuiting on the first difference
///
/// Length differences return early; only the content comparison is
/// constant-time.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
