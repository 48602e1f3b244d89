//! Structured SAE numbers.
//!
//! An SAE number is written as `<study_number>-<NN>`: the participant's study
//! number, a hyphen, and a two-digit zero-padded sequence. Study numbers may
//! contain hyphens themselves, so the sequence is always taken from the text
//! after the last hyphen. A bare study number such as `ICA-10234` has no
//! two-digit suffix and is therefore malformed.
//!
//! Older projects hold numbers from sequence 10 upwards written with a
//! leading zero (`ICA-10234-010`). These parse as sequence 10; new numbers
//! always use the two-digit form.

use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, Result};

const SEPARATOR: char = '-';
const SUFFIX_DIGITS: usize = 2;
/// Legacy suffix: a zero followed by a sequence of 10 or more.
const LEGACY_SUFFIX_DIGITS: usize = 3;

/// Largest sequence that fits the two-digit suffix.
pub const MAX_SEQUENCE: u32 = 99;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SaeNumber {
    study_number: String,
    sequence: u32,
}

impl SaeNumber {
    /// Build a number for `study_number` with the given 1-based sequence.
    pub fn new(study_number: impl Into<String>, sequence: u32) -> Result<Self> {
        let study_number = study_number.into();
        let trimmed = study_number.trim();
        if trimmed.is_empty() {
            return Err(ModelError::BlankStudyNumber);
        }
        if sequence == 0 || sequence > MAX_SEQUENCE {
            return Err(ModelError::InvalidSequence(sequence));
        }
        Ok(Self {
            study_number: trimmed.to_string(),
            sequence,
        })
    }

    /// Parse the external string form. Anything that does not end in a
    /// `-NN` (or legacy `-0NN`) suffix after a non-empty study number is
    /// malformed.
    pub fn parse(value: &str) -> Result<Self> {
        let malformed = |reason: &'static str| ModelError::MalformedSaeNumber {
            value: value.to_string(),
            reason,
        };
        let trimmed = value.trim();
        let (study_number, suffix) = trimmed
            .rsplit_once(SEPARATOR)
            .ok_or_else(|| malformed("missing '-' separator"))?;
        if study_number.trim().is_empty() {
            return Err(malformed("missing study number"));
        }
        if !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("suffix is not a two-digit sequence"));
        }
        let sequence: u32 = match suffix.len() {
            SUFFIX_DIGITS => suffix
                .parse()
                .map_err(|_| malformed("suffix is not a two-digit sequence"))?,
            LEGACY_SUFFIX_DIGITS if suffix.starts_with('0') => suffix[1..]
                .parse()
                .ok()
                .filter(|sequence| *sequence >= 10)
                .ok_or_else(|| malformed("suffix is not a two-digit sequence"))?,
            _ => return Err(malformed("suffix is not a two-digit sequence")),
        };
        if sequence == 0 {
            return Err(malformed("sequence must start at 01"));
        }
        Ok(Self {
            study_number: study_number.trim().to_string(),
            sequence,
        })
    }

    pub fn study_number(&self) -> &str {
        &self.study_number
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for SaeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{:02}", self.study_number, self.sequence)
    }
}

impl FromStr for SaeNumber {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl serde::Serialize for SaeNumber {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for SaeNumber {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
