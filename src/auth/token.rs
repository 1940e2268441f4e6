//! Session token issuing and verification
//!
//! Access and refresh tokens are HS256-signed JWTs carrying the user id and
//! email. Each token also carries a random `jti` so two tokens minted for the
//! same identity within the same second are still distinct strings.

use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// Lifetime of an access token
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);

/// Lifetime of a refresh token
pub const REFRESH_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Length of the random token id in bytes
const TOKEN_ID_BYTES: usize = 16;

/// Claims carried by every session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: i64,
    pub email: String,
    /// Expiry, seconds since the epoch
    pub exp: i64,
    /// Issued at, seconds since the epoch; zero when absent
    #[serde(default)]
    pub iat: i64,
    /// Random token id; empty when absent
    #[serde(default)]
    pub jti: String,
}

/// Signs and verifies session tokens with a single shared secret
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("encoding_key", &"<redacted>")
            .field("decoding_key", &"<redacted>")
            .field("algorithms", &self.validation.algorithms)
            .finish()
    }
}

impl TokenIssuer {
    /// Create an issuer from the signing secret
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::EmptySecret`] if the secret is empty
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Issue a token valid for `ttl` from now
    pub fn issue(&self, user_id: i64, email: &str, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(user_id, email, Utc::now(), ttl)
    }

    /// Issue a token as if minted at `issued_at`
    pub fn issue_at(
        &self,
        user_id: i64,
        email: &str,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let iat = issued_at.timestamp();
        let exp = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|secs| iat.checked_add(secs))
            .ok_or_else(|| TokenError::Signing(format!("ttl out of range: {:?}", ttl)))?;
        let claims = TokenClaims {
            user_id,
            email: email.to_string(),
            exp,
            iat,
            jti: generate_token_id(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token's signature, algorithm and expiry and return its claims
    ///
    /// All failures collapse into [`TokenError::InvalidToken`].
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::InvalidToken)
    }
}

/// Generate a random URL-safe token id
pub fn generate_token_id() -> String {
    let mut bytes = [0u8; TOKEN_ID_BYTES];
    getrandom(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Fill a byte slice with random bytes using OsRng
fn getrandom(dest: &mut [u8]) {
    use rand::RngCore;
    OsRng.fill_bytes(dest);
}
