//! Short identifier generation.
//!
//! Ids only have to be unique among currently live entries, so 48 bits of
//! randomness are plenty: collisions are negligible at clipboard scale, and
//! the store re-rolls on the rare live collision anyway.

use uuid::Uuid;

/// Length of a generated id in characters.
pub const ID_LEN: usize = 12;

/// Produces a short printable id.
///
/// The id is the first 12 hex characters of a v4 UUID: URL-safe, easy to
/// paste into a query string, and effectively unique among live entries.
pub fn generate() -> String {
    Uuid::new_v4().simple().to_string()[..ID_LEN].to_string()
}
