use crate::Error;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

const ID_LEN: usize = 12;

/// Opaque 12-byte record identifier, rendered as 24 hex characters.
///
/// Bytes 0..4 hold the creation time in unix seconds and bytes 4..12 a
/// process-wide sequence number, both big-endian, so ids compare in
/// creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId([u8; ID_LEN]);

fn sequence() -> &'static AtomicU64 {
    static SEQUENCE: OnceLock<AtomicU64> = OnceLock::new();
    SEQUENCE.get_or_init(|| {
        let seed = chrono::Utc::now().timestamp_subsec_nanos() as u64;
        AtomicU64::new(seed << 24)
    })
}

impl RecordId {
    /// Allocate a fresh id.
    pub fn generate() -> Self {
        let secs = chrono::Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        let seq = sequence().fetch_add(1, Ordering::Relaxed);

        let mut bytes = [0u8; ID_LEN];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..].copy_from_slice(&seq.to_be_bytes());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ID_LEN * 2 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidId(format!(
                "'{}' is not a {}-character hex id",
                s,
                ID_LEN * 2
            )));
        }

        let mut bytes = [0u8; ID_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|e| Error::InvalidId(format!("'{}': {}", s, e)))?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_form_parses_back() {
        let id = RecordId::generate();
        let hex = id.to_hex();

        assert_eq!(hex.len(), 24);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hex.parse::<RecordId>().unwrap(), id);
    }

    #[test]
    fn test_uppercase_hex_accepted() {
        let id: RecordId = "5A0C1F2E3D4B5A6978877665".parse().unwrap();
        assert_eq!(id.to_hex(), "5a0c1f2e3d4b5a6978877665");
    }

    #[test]
    fn test_malformed_ids_rejected() {
        for bad in ["", "xyz", "5a0c1f2e3d4b5a697887766", "5a0c1f2e3d4b5a69788776650", "zz0c1f2e3d4b5a6978877665"] {
            assert!(
                matches!(bad.parse::<RecordId>(), Err(Error::InvalidId(_))),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_ids_sort_in_creation_order() {
        let ids: Vec<RecordId> = (0..100).map(|_| RecordId::generate()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let id: RecordId = "000000010000000000000002".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"000000010000000000000002\"");

        let back: RecordId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<RecordId>("\"nothex\"").is_err());
    }
}
