//! HS256 app tokens via `jsonwebtoken`

use std::fmt;

use application::{TokenError, TokenPort};
use chrono::Utc;
use domain::TokenPayload;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::AuthConfig;

/// Wire form of a token: the payload claims plus the reserved time claims
#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    payload: Map<String, Value>,
    iat: i64,
    exp: i64,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Signs and verifies app tokens with a shared secret
pub struct JwtTokenService {
    keys: Option<SigningKeys>,
    expiration_secs: i64,
}

impl fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("has_signing_key", &self.keys.is_some())
            .field("expiration_secs", &self.expiration_secs)
            .finish()
    }
}

impl JwtTokenService {
    /// An empty or absent key yields a service that fails every call with
    /// [`TokenError::MissingSigningKey`].
    pub fn new(signing_key: Option<&str>, expiration_secs: u64) -> Self {
        let keys = signing_key.filter(|k| !k.is_empty()).map(|key| SigningKeys {
            encoding: EncodingKey::from_secret(key.as_bytes()),
            decoding: DecodingKey::from_secret(key.as_bytes()),
        });

        Self {
            keys,
            expiration_secs: i64::try_from(expiration_secs).unwrap_or(i64::MAX),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.signing_key_str(), config.token_expiration_secs)
    }

    /// Sign `payload` as if issued at `issued_at` (unix seconds)
    pub fn issue_at(&self, payload: &TokenPayload, issued_at: i64) -> Result<String, TokenError> {
        let keys = self.keys.as_ref().ok_or(TokenError::MissingSigningKey)?;
        let claims = Claims {
            payload: payload.claims().clone(),
            iat: issued_at,
            exp: issued_at.saturating_add(self.expiration_secs),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }

    fn map_error(err: &jsonwebtoken::errors::Error) -> TokenError {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::InvalidSignature
            },
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

impl TokenPort for JwtTokenService {
    fn issue(&self, payload: &TokenPayload) -> Result<String, TokenError> {
        self.issue_at(payload, Utc::now().timestamp())
    }

    fn verify(&self, token: &str) -> Result<TokenPayload, TokenError> {
        let keys = self.keys.as_ref().ok_or(TokenError::MissingSigningKey)?;

        let data = decode::<Claims>(token, &keys.decoding, &Self::validation()).map_err(|e| {
            debug!(error = %e, "App token rejected");
            Self::map_error(&e)
        })?;

        TokenPayload::new(data.claims.payload).map_err(|e| TokenError::Malformed(e.to_string()))
    }
}
