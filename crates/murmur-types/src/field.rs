//! Interchange representation of BN254 scalars.

use crate::error::{MurmurError, MurmurResult};
use crate::FIELD_ELEMENT_SIZE;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroize;

/// A BN254 scalar in canonical little-endian encoding.
///
/// The byte form is the interchange representation; all field arithmetic
/// lives in `murmur-crypto`. Serializes as a hex string on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Zeroize)]
pub struct FieldElement(pub [u8; FIELD_ELEMENT_SIZE]);

impl FieldElement {
    /// Wrap raw canonical bytes.
    pub fn from_bytes(bytes: [u8; FIELD_ELEMENT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Borrow the canonical bytes.
    pub fn as_bytes(&self) -> &[u8; FIELD_ELEMENT_SIZE] {
        &self.0
    }

    /// Hex encoding of the canonical bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a hex string produced by [`FieldElement::to_hex`].
    pub fn from_hex(s: &str) -> MurmurResult<Self> {
        let bytes = hex::decode(s).map_err(|e| MurmurError::Serialization(e.to_string()))?;
        if bytes.len() != FIELD_ELEMENT_SIZE {
            return Err(MurmurError::Serialization(format!(
                "field element must be {} bytes, got {}",
                FIELD_ELEMENT_SIZE,
                bytes.len()
            )));
        }
        let mut arr = [0u8; FIELD_ELEMENT_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// The additive identity.
    pub fn zero() -> Self {
        Self([0u8; FIELD_ELEMENT_SIZE])
    }
}

impl Default for FieldElement {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<[u8; FIELD_ELEMENT_SIZE]> for FieldElement {
    fn from(bytes: [u8; FIELD_ELEMENT_SIZE]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.to_hex())
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let fe = FieldElement::from_bytes([0xab; 32]);
        let restored = FieldElement::from_hex(&fe.to_hex()).unwrap();
        assert_eq!(fe, restored);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(FieldElement::from_hex("abcd").is_err());
        assert!(FieldElement::from_hex("not hex").is_err());
    }

    #[test]
    fn serde_uses_hex_strings() {
        let fe = FieldElement::from_bytes([0x01; 32]);
        let json = serde_json::to_string(&fe).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(32)));

        let back: FieldElement = serde_json::from_str(&json).unwrap();
        assert_eq!(fe, back);
    }
}
