//! Object ID (SHA-1 hash) representation.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// The length of a SHA-1 hash in bytes.
pub const OID_BYTES: usize = 20;

/// The length of a SHA-1 hash as a hexadecimal string.
pub const OID_HEX_LEN: usize = 40;

/// A Git object ID (SHA-1 hash).
///
/// This type represents a 20-byte SHA-1 hash that uniquely identifies
/// a Git object (blob, tree, commit, or tag).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid {
    bytes: [u8; OID_BYTES],
}

impl Oid {
    /// Creates an Oid from a 40-character hexadecimal string.
    ///
    /// # Arguments
    ///
    /// * `hex` - A 40-character hexadecimal string (case-insensitive).
    ///
    /// # Returns
    ///
    /// The Oid on success, or `Error::InvalidOid` if the string is invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use vcsdiff::objects::Oid;
    ///
    /// let oid = Oid::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();
    /// assert_eq!(oid.to_hex(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    /// ```
    pub fn from_hex(hex: &str) -> Result<Self> {
        if hex.len() != OID_HEX_LEN {
            return Err(Error::InvalidOid(hex.to_string()));
        }

        let mut bytes = [0u8; OID_BYTES];

        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let high =
                hex_digit_to_value(chunk[0]).ok_or_else(|| Error::InvalidOid(hex.to_string()))?;
            let low =
                hex_digit_to_value(chunk[1]).ok_or_else(|| Error::InvalidOid(hex.to_string()))?;
            bytes[i] = (high << 4) | low;
        }

        Ok(Oid { bytes })
    }

    /// Creates an Oid from a 20-byte array.
    ///
    /// # Arguments
    ///
    /// * `bytes` - A 20-byte array containing the raw SHA-1 hash.
    ///
    /// # Examples
    ///
    /// ```
    /// use vcsdiff::objects::Oid;
    ///
    /// let bytes = [0u8; 20];
    /// let oid = Oid::from_bytes(bytes);
    /// ```
    pub fn from_bytes(bytes: [u8; OID_BYTES]) -> Self {
        Oid { bytes }
    }

    /// Returns the hexadecimal string representation of this Oid.
    ///
    /// The returned string is always lowercase and 40 characters long.
    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(OID_HEX_LEN);
        for byte in &self.bytes {
            hex.push(HEX_CHARS[(byte >> 4) as usize]);
            hex.push(HEX_CHARS[(byte & 0x0f) as usize]);
        }
        hex
    }

    /// Returns a short (7-character) hexadecimal representation of this Oid.
    ///
    /// This is commonly used for display purposes where the full hash
    /// is not necessary.
    pub fn short(&self) -> String {
        self.to_hex()[..7].to_string()
    }

    /// Returns a reference to the raw 20-byte array.
    pub fn as_bytes(&self) -> &[u8; OID_BYTES] {
        &self.bytes
    }

    /// Returns the all-zero sentinel Oid.
    ///
    /// Used by the diff engine to mean "content identity not yet known",
    /// e.g. a workdir entry that hasn't been hashed.
    pub const fn zero() -> Self {
        Oid {
            bytes: [0u8; OID_BYTES],
        }
    }

    /// Returns true if this is the all-zero sentinel Oid.
    pub fn is_zero(&self) -> bool {
        self.bytes == [0u8; OID_BYTES]
    }
}

impl Default for Oid {
    fn default() -> Self {
        Oid::zero()
    }
}

/// Hexadecimal characters for encoding.
const HEX_CHARS: [char; 16] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f',
];

/// Converts a hexadecimal ASCII character to its numeric value.
fn hex_digit_to_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self.short())
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Oid::from_hex(s)
    }
}
