//! Manage json web tokens.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

const DEFAULT_AUDIENCE: &str = "refuel.app";
/// Session token lifetime, in seconds.
pub const EXPIRATION_TIME: u64 = 60 * 15; // 15 minutes.
/// Logout marker token lifetime, in seconds.
///
/// Logout is stateless: nothing is revoked server-side, the marker simply
/// expires on its own.
pub const LOGOUT_EXPIRATION_TIME: u64 = 1;
/// The only role issued by this service.
pub const USER_ROLE: &str = "user";

/// Pieces of information asserted on a JWT.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Claims {
    /// Recipients that the JWT is intended for.
    pub aud: String,
    /// Identifies the expiration time on or after which the JWT must not be
    /// accepted for processing.
    pub exp: u64,
    /// Identifies the time at which the JWT was issued.
    pub iat: u64,
    /// Identifies the organization that issued the JWT.
    pub iss: String,
    /// User ID.
    pub sub: String,
    /// Role asserted for the subject.
    pub role: String,
}

/// Manage JWT tokens.
#[derive(Clone)]
pub struct TokenManager {
    algorithm: Algorithm,
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    name: String,
    audience: String,
}

impl TokenManager {
    /// Create a new [`TokenManager`] instance signing with a shared secret.
    pub fn new(name: &str, secret: &str) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            name: name.to_owned(),
            audience: DEFAULT_AUDIENCE.to_string(),
        }
    }

    /// Set `audience` field on JWT.
    pub fn audience(&mut self, audience: &str) {
        self.audience = audience.to_owned();
    }

    /// Create a new session token for a subject and role.
    pub fn create(&self, user_id: &str, role: &str) -> Result<String> {
        self.sign(user_id, role, EXPIRATION_TIME)
    }

    /// Create the short-lived marker token returned on logout.
    pub fn logout_marker(&self, user_id: &str) -> Result<String> {
        self.sign(user_id, USER_ROLE, LOGOUT_EXPIRATION_TIME)
    }

    fn sign(&self, user_id: &str, role: &str, lifetime: u64) -> Result<String> {
        let time = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let header = Header::new(self.algorithm);
        let claims = Claims {
            aud: self.audience.clone(),
            exp: time + lifetime,
            iat: time,
            iss: self.name.clone(),
            sub: user_id.to_owned(),
            role: role.to_owned(),
        };

        Ok(encode(&header, &claims, &self.encoding_key)?)
    }

    /// Decode and check a token.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_audience(&[&self.audience]);
        Ok(decode::<Claims>(token, &self.decoding_key, &validation)?.claims)
    }
}
