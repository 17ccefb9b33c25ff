//! Claims carried inside a signed app token

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    errors::DomainError,
    value_objects::{Region, UserId},
};

/// Claim names owned by the signer; callers may not set them
pub const RESERVED_CLAIMS: [&str; 2] = ["iat", "exp"];

/// Immutable map of claims that is the sole input to token signing
///
/// Verification must hand back exactly this map, so the signer-managed
/// timestamps are kept out of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct TokenPayload(Map<String, Value>);

impl TokenPayload {
    /// Create a payload from a claim map
    pub fn new(claims: Map<String, Value>) -> Result<Self, DomainError> {
        if let Some(reserved) = RESERVED_CLAIMS.iter().find(|c| claims.contains_key(**c)) {
            return Err(DomainError::InvalidTokenPayload(format!(
                "claim '{reserved}' is reserved"
            )));
        }
        Ok(Self(claims))
    }

    /// Create a payload from an arbitrary JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        match value {
            Value::Object(map) => Self::new(map),
            other => Err(DomainError::InvalidTokenPayload(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    /// All claims
    pub const fn claims(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Look up a single claim
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Look up a string claim
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Consume the payload, returning the claim map
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl TryFrom<Map<String, Value>> for TokenPayload {
    type Error = DomainError;

    fn try_from(claims: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::new(claims)
    }
}

impl From<TokenPayload> for Map<String, Value> {
    fn from(payload: TokenPayload) -> Self {
        payload.0
    }
}

/// Session identity issued at login: who the user is and where they live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub region: Region,
    pub user_id: UserId,
}

impl SessionClaims {
    pub const fn new(region: Region, user_id: UserId) -> Self {
        Self { region, user_id }
    }

    /// Render the claims as a token payload
    pub fn to_payload(&self) -> TokenPayload {
        let mut claims = Map::new();
        claims.insert("region".into(), Value::String(self.region.to_string()));
        claims.insert("user_id".into(), Value::String(self.user_id.to_string()));
        TokenPayload(claims)
    }
}

impl TryFrom<&TokenPayload> for SessionClaims {
    type Error = DomainError;

    fn try_from(payload: &TokenPayload) -> Result<Self, Self::Error> {
        let region = payload
            .get_str("region")
            .ok_or_else(|| DomainError::InvalidTokenPayload("missing region claim".into()))?
            .parse()?;
        let user_id = payload
            .get_str("user_id")
            .ok_or_else(|| DomainError::InvalidTokenPayload("missing user_id claim".into()))
            .and_then(UserId::parse)?;
        Ok(Self { region, user_id })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn payload_keeps_claims_verbatim() {
        let payload = TokenPayload::from_value(json!({"id": 1, "role": "admin"})).unwrap();
        assert_eq!(payload.get("id"), Some(&json!(1)));
        assert_eq!(payload.get_str("role"), Some("admin"));
        assert_eq!(payload.claims().len(), 2);
    }

    #[test]
    fn reserved_claims_rejected() {
        for name in RESERVED_CLAIMS {
            let mut claims = Map::new();
            claims.insert(name.to_string(), json!(0));
            assert!(matches!(
                TokenPayload::new(claims),
                Err(DomainError::InvalidTokenPayload(_))
            ));
        }
    }

    #[test]
    fn non_object_payload_rejected() {
        assert!(TokenPayload::from_value(json!([1, 2])).is_err());
        assert!(TokenPayload::from_value(json!("id")).is_err());
    }

    #[test]
    fn payload_serde_is_a_plain_object() {
        let payload = TokenPayload::from_value(json!({"id": 1})).unwrap();
        assert_eq!(serde_json::to_value(&payload).unwrap(), json!({"id": 1}));

        let back: TokenPayload = serde_json::from_value(json!({"id": 1})).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn deserializing_reserved_claim_fails() {
        let result: Result<TokenPayload, _> = serde_json::from_value(json!({"exp": 1}));
        assert!(result.is_err());
    }

    #[test]
    fn session_claims_round_trip_through_payload() {
        let claims = SessionClaims::new(Region::Eu, UserId::parse("blt42").unwrap());
        let payload = claims.to_payload();
        assert_eq!(payload.get_str("region"), Some("EU"));
        assert_eq!(payload.get_str("user_id"), Some("blt42"));
        assert_eq!(SessionClaims::try_from(&payload).unwrap(), claims);
    }

    #[test]
    fn session_claims_require_user_id() {
        let payload = TokenPayload::from_value(json!({"region": "NA"})).unwrap();
        assert!(SessionClaims::try_from(&payload).is_err());
    }

    #[test]
    fn session_claims_reject_unknown_region() {
        let payload =
            TokenPayload::from_value(json!({"region": "MOON", "user_id": "blt1"})).unwrap();
        assert_eq!(
            SessionClaims::try_from(&payload),
            Err(DomainError::InvalidRegion("MOON".to_string()))
        );
    }
}
