//! Token issuance for tests.

use jobdock_api::auth::Claims;
use jsonwebtoken::{encode, EncodingKey, Header};

pub const TEST_JWT_SECRET: &str = "test-secret-key-min-32-characters-long-for-testing";

/// Issue a bearer token for the given user id, valid for an hour.
pub fn token_for(user_id: i64) -> String {
    let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Failed to encode test token")
}

pub fn bearer(user_id: i64) -> String {
    format!("Bearer {}", token_for(user_id))
}
