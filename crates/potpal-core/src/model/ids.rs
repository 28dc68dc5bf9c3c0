// ── Identity newtypes ──
//
// Store-assigned and radio-level identifiers are plain strings on the
// wire; the newtypes keep them from being mixed up in signatures.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned to a document by the cloud store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

/// Identifier of an authenticated cloud account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

/// Radio address of a smart pot, as reported during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PotId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

string_id!(DocumentId);
string_id!(UserId);
string_id!(PotId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_round_trips() {
        let id = DocumentId::from("abc123");
        assert_eq!(id.as_str(), "abc123");
        assert_eq!(id.to_string(), "abc123");
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = PotId::from("pot-7");
        let json = serde_json::to_string(&id).expect("serializes");
        assert_eq!(json, "\"pot-7\"");
    }
}
