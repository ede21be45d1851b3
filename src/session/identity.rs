//! Client identity and per-session state

use crate::error::SessionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque 8-character token naming a client's storage root.
///
/// The token is also the only credential: anyone presenting it through
/// session recovery gains access to the matching storage root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientId(String);

impl ClientId {
    /// Number of characters in every client id
    pub const LEN: usize = 8;

    /// Generates a fresh random id from the head of a v4 UUID.
    pub fn generate() -> Self {
        let uuid = Uuid::new_v4().to_string();
        Self(uuid.chars().take(Self::LEN).collect())
    }

    /// Accepts a client-supplied token of exactly [`ClientId::LEN`] hex digits.
    ///
    /// The token becomes part of a folder name, so anything outside the
    /// generated alphabet is refused.
    pub fn parse(candidate: &str) -> Result<Self, SessionError> {
        if candidate.len() == Self::LEN && candidate.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(SessionError::InvalidClientId(candidate.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the storage folder owned by this client
    pub fn folder_name(&self) -> String {
        format!("user_{}", self.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ClientId {
    type Error = SessionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClientId> for String {
    fn from(id: ClientId) -> Self {
        id.0
    }
}

/// Server-side record behind one session cookie
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    pub client_id: Option<ClientId>,
    pub flashes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_have_fixed_length() {
        let id = ClientId::generate();
        assert_eq!(id.as_str().chars().count(), ClientId::LEN);
        assert_eq!(id.folder_name(), format!("user_{}", id));
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(ClientId::generate(), ClientId::generate());
    }

    #[test]
    fn parse_requires_exactly_eight_chars() {
        assert!(ClientId::parse("abcd1234").is_ok());
        assert!(ClientId::parse("abcd123").is_err());
        assert!(ClientId::parse("abcd12345").is_err());
        assert!(ClientId::parse("").is_err());
    }

    #[test]
    fn parse_refuses_path_characters() {
        assert!(ClientId::parse("1/../../").is_err());
        assert!(ClientId::parse("..\\abcde").is_err());
        assert!(ClientId::parse("abcd.123").is_err());
        assert!(ClientId::parse("ghijklmn").is_err());
        assert!(ClientId::parse("ABCDEF12").is_ok());
    }

    #[test]
    fn generated_ids_parse_back() {
        let id = ClientId::generate();
        assert_eq!(ClientId::parse(id.as_str()).unwrap(), id);
    }

    #[test]
    fn deserializing_rejects_invalid_ids() {
        let data: SessionData =
            serde_json::from_str(r#"{"client_id":"abcd1234","flashes":["hi"]}"#).unwrap();
        assert_eq!(data.client_id, Some(ClientId::parse("abcd1234").unwrap()));

        let bad = serde_json::from_str::<SessionData>(r#"{"client_id":"../../x","flashes":[]}"#);
        assert!(bad.is_err());
    }
}
