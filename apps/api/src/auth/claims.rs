use anyhow::Result;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Session token payload issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // provider user id
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub exp: usize,
    #[serde(default)]
    pub iat: Option<usize>,
    #[serde(default)]
    pub iss: Option<String>,
}

/// Verifies signature, expiry and (optionally) issuer of a session token.
pub fn verify_session_token(
    token: &str,
    secret: &str,
    issuer: Option<&str>,
) -> Result<SessionClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp", "sub"]);
    if let Some(issuer) = issuer {
        validation.set_issuer(&[issuer]);
    }

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    if data.claims.sub.trim().is_empty() {
        anyhow::bail!("session token has an empty subject");
    }
    Ok(data.claims)
}


#[cfg(test)]
mod tests {
    use super::test_tokens::{claims_for, sign};
    use super::*;

    #[test]
    fn test_valid_token_verifies() {
        let token = sign(&claims_for("user_123", 300, None), "secret");
        let claims = verify_session_token(&token, "secret", None).unwrap();
        assert_eq!(claims.sub, "user_123");
        assert_eq!(claims.email, "user_123@example.com");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = sign(&claims_for("user_123", 300, None), "secret");
        assert!(verify_session_token(&token, "other-secret", None).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // well past the default 60s leeway
        let token = sign(&claims_for("user_123", -600, None), "secret");
        assert!(verify_session_token(&token, "secret", None).is_err());
    }

    #[test]
    fn test_issuer_is_enforced_when_configured() {
        let token = sign(
            &claims_for("user_123", 300, Some("https://accounts.other.dev")),
            "secret",
        );
        assert!(verify_session_token(&token, "secret", Some("https://accounts.resumind.dev")).is_err());

        let token = sign(
            &claims_for("user_123", 300, Some("https://accounts.resumind.dev")),
            "secret",
        );
        assert!(verify_session_token(&token, "secret", Some("https://accounts.resumind.dev")).is_ok());
    }

    #[test]
    fn test_empty_subject_is_rejected() {
        let token = sign(&claims_for("", 300, None), "secret");
        assert!(verify_session_token(&token, "secret", None).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(verify_session_token("not.a.jwt", "secret", None).is_err());
    }
}
