//! Identity claims returned by the provider's userinfo endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Reasons a userinfo payload is not accepted as a claims object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimsError {
    #[error("Claims payload is not a JSON object")]
    NotAnObject,

    #[error("Claims payload is empty")]
    Empty,

    #[error("Claims payload has no subject identifier")]
    MissingSubject,
}

/// Mapping of claim name to scalar or nested value.
///
/// Every value of this type carries a non-empty `sub` string claim. Stored
/// claims are re-validated on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct IdentityClaims {
    claims: Map<String, Value>,
}

impl IdentityClaims {
    pub const SUBJECT: &'static str = "sub";

    /// Validate a decoded userinfo body.
    pub fn from_value(value: Value) -> Result<Self, ClaimsError> {
        match value {
            Value::Object(map) => Self::try_from(map),
            _ => Err(ClaimsError::NotAnObject),
        }
    }

    pub fn subject(&self) -> &str {
        // Checked on construction.
        self.claims
            .get(Self::SUBJECT)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn email(&self) -> Option<&str> {
        self.claims.get("email").and_then(Value::as_str)
    }

    pub fn email_verified(&self) -> Option<bool> {
        self.claims.get("email_verified").and_then(Value::as_bool)
    }

    pub fn picture(&self) -> Option<&str> {
        self.claims.get("picture").and_then(Value::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.claims.iter()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for IdentityClaims {
    type Error = ClaimsError;

    fn try_from(claims: Map<String, Value>) -> Result<Self, Self::Error> {
        if claims.is_empty() {
            return Err(ClaimsError::Empty);
        }

        match claims.get(Self::SUBJECT).and_then(Value::as_str) {
            Some(sub) if !sub.is_empty() => Ok(Self { claims }),
            _ => Err(ClaimsError::MissingSubject),
        }
    }
}

impl From<IdentityClaims> for Map<String, Value> {
    fn from(claims: IdentityClaims) -> Self {
        claims.claims
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_claims_from_userinfo() {
        let claims = IdentityClaims::from_value(json!({
            "sub": "auth0|1",
            "email": "a@b.com",
            "email_verified": true,
            "picture": "https://example.com/a.png",
            "app_metadata": {"plan": "pro"}
        }))
        .unwrap();

        assert_eq!(claims.subject(), "auth0|1");
        assert_eq!(claims.email(), Some("a@b.com"));
        assert_eq!(claims.email_verified(), Some(true));
        assert_eq!(claims.picture(), Some("https://example.com/a.png"));
        assert_eq!(claims.get("app_metadata").unwrap()["plan"], "pro");
        assert_eq!(claims.len(), 5);
    }

    #[test]
    fn test_rejects_payloads_without_subject() {
        assert_eq!(
            IdentityClaims::from_value(json!({})),
            Err(ClaimsError::Empty)
        );
        assert_eq!(
            IdentityClaims::from_value(json!({"email": "a@b.com"})),
            Err(ClaimsError::MissingSubject)
        );
        assert_eq!(
            IdentityClaims::from_value(json!({"sub": ""})),
            Err(ClaimsError::MissingSubject)
        );
        assert_eq!(
            IdentityClaims::from_value(json!({"sub": 42})),
            Err(ClaimsError::MissingSubject)
        );
        assert_eq!(
            IdentityClaims::from_value(json!("auth0|1")),
            Err(ClaimsError::NotAnObject)
        );
    }

    #[test]
    fn test_deserialize_validates_subject() {
        let ok: IdentityClaims = serde_json::from_str(r#"{"sub":"auth0|1"}"#).unwrap();
        assert_eq!(ok.subject(), "auth0|1");

        let err = serde_json::from_str::<IdentityClaims>(r#"{"email":"a@b.com"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let claims = IdentityClaims::from_value(json!({"sub": "auth0|1", "name": "A"})).unwrap();
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value, json!({"sub": "auth0|1", "name": "A"}));
    }
}
