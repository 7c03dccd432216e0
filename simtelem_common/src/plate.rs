//! Fixed-width vehicle plate identifier.
//!
//! A plate is exactly 7 printable characters. The compiler would pad a
//! 7-byte array to 8 anyway, so the 8th byte is used as a `'\0'` terminator
//! and kept constant — this lets `Hash`/`Eq` reinterpret the whole 8-byte
//! window as a single `u64` instead of hashing byte-by-byte.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 7-character vehicle plate plus a constant zero terminator.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PlateKey([u8; 8]);

impl PlateKey {
    /// Build a plate from exactly 7 bytes. Panics if `bytes` is not 7 long —
    /// callers (CSV/RPC parsers) are expected to have already validated
    /// field width before constructing a `PlateKey`.
    pub fn new(bytes: &[u8]) -> Self {
        assert_eq!(bytes.len(), 7, "plate must be exactly 7 characters");
        let mut raw = [0u8; 8];
        raw[..7].copy_from_slice(bytes);
        Self(raw)
    }

    /// Build a plate from a `&str`, asserting it is 7 printable ASCII bytes.
    pub fn from_str_exact(s: &str) -> Self {
        Self::new(s.as_bytes())
    }

    /// The 7 plate characters as a `&str`.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0[..7]).expect("plate bytes are not valid UTF-8")
    }

    #[inline]
    fn as_u64(&self) -> u64 {
        u64::from_ne_bytes(self.0)
    }
}

impl std::hash::Hash for PlateKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.as_u64());
    }
}

impl fmt::Debug for PlateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PlateKey").field(&self.as_str()).finish()
    }
}

impl fmt::Display for PlateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PlateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PlateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.len() != 7 {
            return Err(serde::de::Error::custom(format!(
                "plate must be exactly 7 characters, got {} ({s:?})",
                s.len()
            )));
        }
        Ok(PlateKey::from_str_exact(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::hash::{DefaultHasher, Hash, Hasher};

    fn hash_of(p: &PlateKey) -> u64 {
        let mut h = DefaultHasher::new();
        p.hash(&mut h);
        h.finish()
    }

    #[test]
    fn equal_plates_have_equal_hashes() {
        let a = PlateKey::from_str_exact("ABC1234");
        let b = PlateKey::from_str_exact("ABC1234");
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn distinct_plates_are_not_equal() {
        let a = PlateKey::from_str_exact("ABC1234");
        let b = PlateKey::from_str_exact("ABC1235");
        assert_ne!(a, b);
    }

    #[test]
    fn usable_as_hashmap_key() {
        let mut set = HashSet::new();
        set.insert(PlateKey::from_str_exact("ABC1234"));
        assert!(set.contains(&PlateKey::from_str_exact("ABC1234")));
    }

    #[test]
    #[should_panic(expected = "exactly 7 characters")]
    fn wrong_width_panics() {
        let _ = PlateKey::new(b"ABC123");
    }

    #[test]
    fn round_trips_through_json() {
        let plate = PlateKey::from_str_exact("ABC1234");
        let json = serde_json::to_string(&plate).unwrap();
        assert_eq!(json, "\"ABC1234\"");
        let back: PlateKey = serde_json::from_str(&json).unwrap();
        assert_eq!(plate, back);
    }

    #[test]
    fn rejects_wrong_width_on_deserialize() {
        let result: Result<PlateKey, _> = serde_json::from_str("\"ABC123\"");
        assert!(result.is_err());
    }
}
