//! Typed parsing of the vision model's `installation_name by artist` answer.
//!
//! The vision provider is instructed to answer in the literal format
//! `installation_name by artist`, optionally wrapped in backticks. The
//! contract between the vision call and the knowledge call is this parse:
//! nothing downstream validates the identity again.

use thiserror::Error;

/// The literal delimiter the vision prompt mandates.
const DELIMITER: &str = " by ";

/// An art installation identified from a photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationIdentity {
    pub installation_name: String,
    pub artist: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityParseError {
    #[error("vision answer {0:?} does not contain the \" by \" delimiter")]
    MissingDelimiter(String),

    #[error("vision answer {0:?} contains the \" by \" delimiter more than once")]
    AmbiguousDelimiter(String),

    #[error("vision answer {0:?} has an empty installation name or artist")]
    EmptyField(String),
}

impl InstallationIdentity {
    /// Parse a raw vision answer into a typed identity.
    ///
    /// Backticks are stripped before splitting, and each side of the split
    /// is trimmed. The cleaned text must contain `" by "` exactly once, with
    /// non-empty text on both sides.
    pub fn parse(raw: &str) -> Result<Self, IdentityParseError> {
        let cleaned = raw.replace('`', "");

        let mut parts = cleaned.split(DELIMITER);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(artist), None) => {
                let name = name.trim();
                let artist = artist.trim();
                if name.is_empty() || artist.is_empty() {
                    return Err(IdentityParseError::EmptyField(raw.to_string()));
                }
                Ok(Self {
                    installation_name: name.to_string(),
                    artist: artist.to_string(),
                })
            }
            (_, None, _) => Err(IdentityParseError::MissingDelimiter(raw.to_string())),
            _ => Err(IdentityParseError::AmbiguousDelimiter(raw.to_string())),
        }
    }
}
