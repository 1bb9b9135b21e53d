//! Firmware Artifact Names
//!
//! An artifact identifier is the only structured data a channel carries:
//!
//! ```text
//! artifact  = prefix "_" version [ "." extension ]
//! prefix    = device family (nodes) or hardware type (endpoints), any case
//! version   = *WSP [ "+" ] 1*DIGIT *( "_" 1*DIGIT ) *WSP
//! extension = *CHAR            ; conventionally "swu", not validated
//! ```
//!
//! The prefix is the text before the first `_`, the version is the text
//! between that `_` and the next `.`. Single underscores may group digits,
//! so `moxa_3_5.swu` carries version 35. Negative versions never parse.

use std::fmt;
use std::str::FromStr;

use super::error::UpdateError;

/// Parsed form of an artifact identifier like `ep1_11.swu`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub prefix: String,
    pub version: u64,
    pub extension: Option<String>,
}

impl Artifact {
    /// Parse an artifact identifier, failing with `BadArtifactFormat`
    pub fn parse(raw: &str) -> Result<Self, UpdateError> {
        let (prefix, rest) = raw.split_once('_').ok_or(UpdateError::BadArtifactFormat)?;

        let (version, extension) = match rest.split_once('.') {
            Some((version, ext)) => (version, Some(ext.to_string())),
            None => (rest, None),
        };

        Ok(Self {
            prefix: prefix.to_string(),
            version: parse_version(version)?,
            extension,
        })
    }

    /// Case-insensitive check that `raw` starts with `<tag>_`
    pub fn has_prefix(raw: &str, tag: &str) -> bool {
        let expected = format!("{}_", tag.to_lowercase());
        raw.to_lowercase().starts_with(&expected)
    }
}

fn parse_version(token: &str) -> Result<u64, UpdateError> {
    let token = token.trim();
    let digits = token.strip_prefix('+').unwrap_or(token);

    let well_formed = !digits.is_empty()
        && digits
            .split('_')
            .all(|group| !group.is_empty() && group.bytes().all(|b| b.is_ascii_digit()));
    if !well_formed {
        return Err(UpdateError::BadArtifactFormat);
    }

    digits
        .replace('_', "")
        .parse()
        .map_err(|_| UpdateError::BadArtifactFormat)
}

impl FromStr for Artifact {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.prefix, self.version)?;
        if let Some(ext) = &self.extension {
            write!(f, ".{}", ext)?;
        }
        Ok(())
    }
}
