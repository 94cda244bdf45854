//! Opaque resource identifiers.
//!
//! Every primary and foreign key is a random 128-bit id with two
//! representations: canonical hyphenated text at the API boundary and a
//! compact 16-byte binary form for storage and engine-internal equality.
//! Round trip holds: `to_text(to_binary(x)) == to_text(x)`.

use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OpaqueId(Uuid);

impl OpaqueId {
    /// Fresh random (version 4) identifier. Generated only at row creation.
    pub fn generate() -> Self {
        OpaqueId(Uuid::new_v4())
    }

    /// Compact binary form used for storage and index comparison.
    pub fn to_binary(self) -> [u8; 16] {
        *self.0.as_bytes()
    }

    /// Canonical hyphenated text form used at the API boundary.
    pub fn to_text(self) -> String {
        self.0.hyphenated().to_string()
    }

    pub fn parse_text(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(OpaqueId)
    }

    pub fn from_binary(bytes: &[u8]) -> Option<Self> {
        Uuid::from_slice(bytes).ok().map(OpaqueId)
    }

    pub fn is_valid_text(s: &str) -> bool {
        Uuid::parse_str(s).is_ok()
    }
}

impl std::fmt::Display for OpaqueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}
