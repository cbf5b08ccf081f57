// Wire types for the AgroTrade API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of an asynchronous operation's state.
///
/// Shared by the session and every resource collection. Any state may
/// transition back to `Loading` on a new attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Account role selected during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Farmer,
    StoreOwner,
}

/// Moderation state of a seller account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
    Blocked,
}

/// Current authenticated user. Replaced wholesale on each successful
/// fetch, never partially patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub approval_status: Option<ApprovalStatus>,
}

/// Successful login envelope: `{ token, user }`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    pub user: UserProfile,
}

/// Catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub seller_name: Option<String>,
}

/// Order summary as returned by the orders endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub status: String,
    pub total: f64,
    #[serde(default)]
    pub items_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// List endpoints respond with either `{ "data": [...] }` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Wrapped { data: Vec<T> },
    Bare(Vec<T>),
}

impl<T> ListEnvelope<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Wrapped { data } => data,
            ListEnvelope::Bare(items) => items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_value(Role::StoreOwner).unwrap(), json!("store_owner"));
        assert_eq!(serde_json::to_value(Role::Client).unwrap(), json!("client"));

        let role: Role = serde_json::from_value(json!("farmer")).unwrap();
        assert_eq!(role, Role::Farmer);
    }

    #[test]
    fn test_user_profile_without_approval_status() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": 7,
            "name": "Amina",
            "email": "amina@example.com",
            "role": "farmer"
        }))
        .unwrap();

        assert_eq!(profile.role, Role::Farmer);
        assert_eq!(profile.approval_status, None);
    }

    #[test]
    fn test_list_envelope_wrapped() {
        let envelope: ListEnvelope<Product> = serde_json::from_value(json!({
            "data": [{"id": 1, "name": "Tomatoes", "price": 2.5}]
        }))
        .unwrap();

        let items = envelope.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Tomatoes");
    }

    #[test]
    fn test_list_envelope_bare_array() {
        let envelope: ListEnvelope<Product> = serde_json::from_value(json!([
            {"id": 1, "name": "Maize", "price": 1.2},
            {"id": 2, "name": "Beans", "price": 3.0}
        ]))
        .unwrap();

        assert_eq!(envelope.into_items().len(), 2);
    }

    #[test]
    fn test_login_response_without_token() {
        let response: LoginResponse = serde_json::from_value(json!({
            "user": {"id": 1, "name": "Ed", "email": "ed@example.com", "role": "client"}
        }))
        .unwrap();

        assert!(response.token.is_none());
        assert_eq!(response.user.name, "Ed");
    }
}
