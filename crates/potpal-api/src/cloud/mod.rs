// PotPal cloud client: account identity + per-user document store.
//
// The cloud exposes an identity-toolkit-style auth surface
// (`/v1/accounts:*`) and a per-user document API
// (`/v1/users/{uid}/{collection}`). Split across modules the same way the
// endpoints group: `client` owns transport mechanics, `identity` the auth
// flows, `documents` the CRUD surface, `listener` the polling snapshot
// subscription.

pub mod client;
pub mod documents;
pub mod identity;
pub mod listener;

pub use client::CloudClient;

use serde::{Deserialize, Serialize};

// ── Account ─────────────────────────────────────────────────────────

/// An authenticated cloud account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Backend-assigned user identifier.
    pub user_id: String,
    pub email: String,
}

// ── Document ────────────────────────────────────────────────────────

/// A document from a per-user collection: the store-assigned id plus the
/// raw JSON payload. Domain typing happens in `potpal-core`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: serde_json::Value,
}

// ── OrderBy ─────────────────────────────────────────────────────────

/// Server-side ordering request for a collection listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

impl OrderBy {
    /// Order by `field`, newest/largest first.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// Order by `field`, ascending.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    /// The `orderBy` query parameter value, e.g. `"created_at desc"`.
    pub(crate) fn query_value(&self) -> String {
        let dir = if self.descending { "desc" } else { "asc" };
        format!("{} {dir}", self.field)
    }
}
