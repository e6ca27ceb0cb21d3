use anyhow::{Context, Result};

/// Which candidate matcher backs `POST /api/v1/recruiter/match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherBackend {
    Llm,
    Keyword,
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    /// Shared secret the identity provider signs session tokens with (HS256).
    pub auth_jwt_secret: String,
    /// When set, session tokens must carry this `iss`.
    pub auth_issuer: Option<String>,
    pub razorpay_key_id: String,
    pub razorpay_key_secret: String,
    pub signup_credits: i32,
    pub max_upload_bytes: usize,
    pub matcher_backend: MatcherBackend,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            auth_jwt_secret: require_env("AUTH_JWT_SECRET")?,
            auth_issuer: std::env::var("AUTH_ISSUER").ok().filter(|s| !s.is_empty()),
            razorpay_key_id: require_env("RAZORPAY_KEY_ID")?,
            razorpay_key_secret: require_env("RAZORPAY_KEY_SECRET")?,
            signup_credits: parse_env("SIGNUP_CREDITS", 3)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            matcher_backend: parse_matcher_backend(
                &std::env::var("MATCHER_BACKEND").unwrap_or_else(|_| "llm".to_string()),
            )?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}

fn parse_matcher_backend(raw: &str) -> Result<MatcherBackend> {
    match raw.trim().to_lowercase().as_str() {
        "llm" => Ok(MatcherBackend::Llm),
        "keyword" => Ok(MatcherBackend::Keyword),
        other => anyhow::bail!("MATCHER_BACKEND must be 'llm' or 'keyword', got '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matcher_backend_parses_case_insensitively() {
        assert_eq!(parse_matcher_backend("LLM").unwrap(), MatcherBackend::Llm);
        assert_eq!(
            parse_matcher_backend(" keyword ").unwrap(),
            MatcherBackend::Keyword
        );
    }

    #[test]
    fn test_matcher_backend_rejects_unknown() {
        assert!(parse_matcher_backend("semantic").is_err());
    }
}
