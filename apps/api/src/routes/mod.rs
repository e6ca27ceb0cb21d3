pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::credits::handlers as credits;
use crate::export::handlers as export;
use crate::payments::handlers as payments;
use crate::resumes::handlers as resumes;
use crate::state::AppState;
use crate::templates::handlers as templates;
use crate::users::handlers as users;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    let api = Router::new()
        // Profile & credits
        .route("/me", get(users::handle_get_me))
        .route("/me/role", put(users::handle_update_role))
        .route("/credits", get(credits::handle_get_credits))
        .route("/credits/usage", get(credits::handle_usage_history))
        // Resumes
        .route(
            "/resumes",
            get(resumes::handle_list_resumes).post(resumes::handle_create_resume),
        )
        .route("/resumes/upload", post(analysis::handle_upload_resume))
        .route(
            "/resumes/:id",
            get(resumes::handle_get_resume)
                .put(resumes::handle_update_resume)
                .delete(resumes::handle_delete_resume),
        )
        .route("/resumes/:id/source", get(resumes::handle_download_source))
        .route("/resumes/:id/download", get(export::handle_download_resume))
        // Analysis
        .route("/resumes/:id/analyze", post(analysis::handle_analyze_resume))
        .route("/resumes/:id/optimize", post(analysis::handle_optimize_resume))
        .route("/analyze", post(analysis::handle_analyze_upload))
        .route("/generate", post(analysis::handle_generate_resume))
        // Templates
        .route(
            "/templates",
            get(templates::handle_list_templates).post(templates::handle_create_template),
        )
        .route(
            "/templates/:id",
            get(templates::handle_get_template)
                .put(templates::handle_update_template)
                .delete(templates::handle_delete_template),
        )
        .route(
            "/templates/:id/download",
            get(templates::handle_download_template),
        )
        .route("/templates/:id/use", post(templates::handle_use_template))
        // Recruiter
        .route("/recruiter/templates", get(templates::handle_list_own_templates))
        .route("/recruiter/match", post(analysis::handle_match_candidates))
        // Payments
        .route("/payments", get(payments::handle_list_payments))
        .route("/payments/packs", get(payments::handle_list_packs))
        .route("/payments/orders", post(payments::handle_create_order))
        .route("/payments/verify", post(payments::handle_verify_payment));

    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api/v1", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::test_tokens;
    use crate::state::test_support::{test_state, TEST_AUTH_SECRET};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health_reports_service() {
        let (status, body) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "resumind-api");
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        for (method, uri) in [
            ("GET", "/api/v1/me"),
            ("GET", "/api/v1/resumes"),
            ("POST", "/api/v1/resumes"),
            ("GET", "/api/v1/credits"),
            ("POST", "/api/v1/payments/verify"),
            ("GET", "/api/v1/recruiter/templates"),
        ] {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap();
            let (status, body) = send(request).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        }
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected_before_database() {
        let claims = test_tokens::claims_for("user_123", -3600, None);
        let token = test_tokens::sign(&claims, TEST_AUTH_SECRET);
        let request = Request::get("/api/v1/me")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_rejected() {
        let claims = test_tokens::claims_for("user_123", 3600, None);
        let token = test_tokens::sign(&claims, "someone-elses-secret");
        let request = Request::get("/api/v1/resumes")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (status, _) = send(Request::get("/api/v1/nope").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
