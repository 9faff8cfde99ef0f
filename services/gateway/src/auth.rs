use crate::error::AppError;
use crate::state::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use types::ids::WalletAddress;

/// Session token claims issued by the identity provider after wallet
/// signature verification (external to this service)
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Wallet address of the authenticated caller
    pub sub: String,
    pub exp: usize,
}

/// Authenticated caller identity, trusted as-is from the session token
pub struct AuthenticatedUser {
    pub wallet: WalletAddress,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("Authorization")
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;
        let header = header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid header string".into()))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Expected Bearer token".into()))?;

        let key = DecodingKey::from_secret(state.config.jwt_secret.as_bytes());
        let data = decode::<Claims>(token, &key, &Validation::default())
            .map_err(|err| AppError::Unauthorized(format!("Invalid token: {err}")))?;

        Ok(AuthenticatedUser {
            wallet: WalletAddress::new(data.claims.sub),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    pub(crate) fn token_for(wallet: &str, secret: &str) -> String {
        let claims = Claims {
            sub: wallet.to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_token_roundtrip() {
        let token = token_for("0xAbc", "secret");
        let key = DecodingKey::from_secret("secret".as_bytes());
        let data = decode::<Claims>(&token, &key, &Validation::default()).unwrap();
        assert_eq!(data.claims.sub, "0xAbc");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = token_for("0xAbc", "secret");
        let key = DecodingKey::from_secret("other".as_bytes());
        assert!(decode::<Claims>(&token, &key, &Validation::default()).is_err());
    }
}
