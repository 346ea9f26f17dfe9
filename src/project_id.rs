//! Project identifier codec.
//!
//! Projects are stored under a dense integer key but shown to users as a
//! four-character code `CCNN`: two letters forming a base-26 number (most
//! significant first) followed by a zero-padded decimal suffix `00..=99`.
//!
//!   0     -> "AA00"
//!   100   -> "AB00"
//!   2600  -> "BA00"
//!   67599 -> "ZZ99"
//!
//! Decoding is strict: only uppercase letters are accepted.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ProjectIdError;

const PER_PREFIX: u32 = 100;
const LETTERS: u32 = 26;

/// Largest integer that still has a two-letter display code ("ZZ99").
pub const MAX_PROJECT_ID: u32 = LETTERS * LETTERS * PER_PREFIX - 1;

/// Encode a storage key into its display code.
pub fn encode(n: u32) -> Result<String, ProjectIdError> {
    if n > MAX_PROJECT_ID {
        return Err(ProjectIdError::OutOfRange(n));
    }
    let prefix = n / PER_PREFIX;
    let first = char::from(b'A' + (prefix / LETTERS) as u8);
    let second = char::from(b'A' + (prefix % LETTERS) as u8);
    Ok(format!("{first}{second}{:02}", n % PER_PREFIX))
}

/// Decode a display code back into its storage key.
pub fn decode(code: &str) -> Result<u32, ProjectIdError> {
    let invalid = |reason: &'static str| ProjectIdError::InvalidFormat {
        code: code.to_string(),
        reason,
    };

    let bytes = code.as_bytes();
    if bytes.len() != 4 {
        return Err(invalid("expected exactly 4 characters"));
    }
    if !bytes[0].is_ascii_uppercase() || !bytes[1].is_ascii_uppercase() {
        return Err(invalid("prefix must be two letters A-Z"));
    }
    // Both remaining bytes are checked as digits, so `parse` rejects signs too.
    if !bytes[2].is_ascii_digit() || !bytes[3].is_ascii_digit() {
        return Err(invalid("suffix must be two digits"));
    }
    let number: u32 = code[2..]
        .parse()
        .map_err(|_| invalid("suffix must be two digits"))?;

    let prefix = u32::from(bytes[0] - b'A') * LETTERS + u32::from(bytes[1] - b'A');
    Ok(prefix * PER_PREFIX + number)
}

/// A validated project identifier.
///
/// Serializes as its display code so the integer key never shows up on the
/// wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(u32);

impl ProjectId {
    pub fn new(n: u32) -> Result<Self, ProjectIdError> {
        if n > MAX_PROJECT_ID {
            return Err(ProjectIdError::OutOfRange(n));
        }
        Ok(Self(n))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `new` already checked the range.
        let code = encode(self.0).map_err(|_| fmt::Error)?;
        f.write_str(&code)
    }
}

impl FromStr for ProjectId {
    type Err = ProjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s).map(Self)
    }
}

impl Serialize for ProjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_known_values() {
        let cases = [
            (0, "AA00"),
            (99, "AA99"),
            (100, "AB00"),
            (2600, "BA00"),
            (MAX_PROJECT_ID, "ZZ99"),
            (12345, "ET45"),
        ];
        for (n, want) in cases {
            assert_eq!(encode(n).unwrap(), want, "encode({n})");
        }
    }

    #[test]
    fn decode_known_values() {
        assert_eq!(decode("AA00").unwrap(), 0);
        assert_eq!(decode("AA99").unwrap(), 99);
        assert_eq!(decode("AB00").unwrap(), 100);
        assert_eq!(decode("BA00").unwrap(), 2600);
        assert_eq!(decode("ZZ99").unwrap(), 67599);
        assert_eq!(decode("ET45").unwrap(), 12345);
    }

    #[test]
    fn decode_rejects_malformed_codes() {
        for code in ["A00", "AA000", "aA00", "Aa00", "A_00", "AAAB", "AA100", "AA-1", "AA+1", "", "ÄA00"] {
            assert!(
                matches!(decode(code), Err(ProjectIdError::InvalidFormat { .. })),
                "{code:?} should be rejected"
            );
        }
    }

    #[test]
    fn encode_refuses_values_past_zz99() {
        assert!(matches!(encode(MAX_PROJECT_ID + 1), Err(ProjectIdError::OutOfRange(67600))));
        assert!(ProjectId::new(MAX_PROJECT_ID + 1).is_err());
    }

    #[test]
    fn every_key_survives_encode_then_decode() {
        for n in 0..=MAX_PROJECT_ID {
            let code = encode(n).unwrap();
            assert_eq!(decode(&code).unwrap(), n, "code {code}");
        }
    }

    #[test]
    fn project_id_display_matches_encode() {
        let id = ProjectId::new(12345).unwrap();
        assert_eq!(id.to_string(), "ET45");
        assert_eq!("ET45".parse::<ProjectId>().unwrap(), id);
    }

    #[test]
    fn project_id_serializes_as_code() {
        let id = ProjectId::new(101).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"AB01\"");
        let back: ProjectId = serde_json::from_str("\"AB01\"").unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<ProjectId>("\"ab01\"").is_err());
    }
}
