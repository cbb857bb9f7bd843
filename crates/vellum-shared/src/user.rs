//! User profile and notification-subscription records.

use serde::{Deserialize, Serialize};

/// Profile of the signed-in user, fetched once per session from `/me`.
///
/// The payload follows the identity provider's profile shape, so the wire
/// names are snake_case (`given_name`), unlike the rest of the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub picture: String,
}

/// How notifications for a product area are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionType {
    /// Bundled into a periodic digest.
    Digest,
    /// Sent as each event happens.
    Instant,
}

/// A per-product-area notification subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub product_area: String,
    pub subscription_type: SubscriptionType,
}

impl Subscription {
    pub fn instant(product_area: impl Into<String>) -> Self {
        Self {
            product_area: product_area.into(),
            subscription_type: SubscriptionType::Instant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_type_wire_casing() {
        let json = serde_json::to_string(&SubscriptionType::Instant).unwrap();
        assert_eq!(json, "\"instant\"");
        let parsed: SubscriptionType = serde_json::from_str("\"digest\"").unwrap();
        assert_eq!(parsed, SubscriptionType::Digest);
    }

    #[test]
    fn test_profile_tolerates_missing_optional_fields() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"email":"u@example.com","name":"U"}"#).unwrap();
        assert_eq!(profile.email, "u@example.com");
        assert!(profile.picture.is_empty());
    }

    #[test]
    fn test_profile_reads_provider_wire_names() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"email":"u@example.com","name":"U Ser","given_name":"U","picture":"p.png"}"#,
        )
        .unwrap();
        assert_eq!(profile.given_name, "U");
        assert_eq!(
            serde_json::to_value(&profile).unwrap()["given_name"],
            "U"
        );
    }
}
