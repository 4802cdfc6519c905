//! Read-only client and supplier directory entries.
//!
//! Clients and suppliers are owned by external CRUD modules; the order core
//! only lists them for name auto-suggestion and phone lookup.

use serde::{Deserialize, Serialize};

/// Client is a directory entry for a known customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
}

/// Supplier is a directory entry for a known supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
}

/// Looks up a client's phone number by name, case-insensitively.
/// Mirrors the entry form's phone auto-fill.
pub fn client_phone_for<'a>(clients: &'a [Client], name: &str) -> Option<&'a str> {
    clients
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name))
        .and_then(|c| c.phone.as_deref())
}
