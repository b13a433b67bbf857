use axum::{
    Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, debug, info};
use uuid::Uuid;

use crate::{
    checks::{StubGeofenceChecker, StubPresenceChecker},
    config::ServiceConfig,
    error::ClaimError,
    llm::OpenRouterModel,
    models::{ActionResponse, PhotoUpload},
    submission::RawClaimForm,
    verification::{ClaimVerificationService, into_response},
};

#[derive(Clone)]
pub struct AppState {
    pub verifier: ClaimVerificationService,
}

pub fn create_app(config: ServiceConfig) -> Router {
    let model = OpenRouterModel::new(config.openrouter_api_key.clone(), config.llm_model.clone());

    let verifier = ClaimVerificationService::new(
        Arc::new(StubGeofenceChecker),
        Arc::new(StubPresenceChecker),
        Arc::new(model),
        config.prompt,
        config.locations,
        config.llm_timeout,
    );

    build_router(AppState { verifier }, config.max_upload_bytes)
}

pub fn build_router(app_state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/claims", post(submit_claim))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(from_fn(correlation_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Tags every request span with a fresh correlation id.
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Crop Claims Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Crop insurance claim submission with location verification",
        "endpoints": {
            "POST /claims": "Submit a claim (multipart: name, cropType, damageDescription, photo)",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn submit_claim(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> (StatusCode, Json<ActionResponse>) {
    let result = match multipart {
        Ok(multipart) => match read_claim_form(multipart).await {
            Ok(form) => state.verifier.process_submission(form).await,
            Err(e) => Err(e),
        },
        Err(rejection) => Err(ClaimError::InvalidInput(rejection.body_text())),
    };

    let status = match &result {
        Ok(decision) => {
            info!(claim_approved = decision.is_approved, "Claim verified");
            StatusCode::OK
        }
        Err(ClaimError::InvalidInput(_) | ClaimError::MediaProcessing(_)) => StatusCode::BAD_REQUEST,
        Err(ClaimError::Verification(_)) => StatusCode::BAD_GATEWAY,
    };

    (status, Json(into_response(result)))
}

async fn read_claim_form(mut multipart: Multipart) -> Result<RawClaimForm, ClaimError> {
    let mut form = RawClaimForm::default();

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "name" => form.name = Some(field.text().await.map_err(form_error)?),
            "cropType" => form.crop_type = Some(field.text().await.map_err(form_error)?),
            "damageDescription" => {
                form.damage_description = Some(field.text().await.map_err(form_error)?)
            }
            "photo" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(photo_error)?;

                form.photo = Some(PhotoUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            other => debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

fn form_error(err: MultipartError) -> ClaimError {
    ClaimError::InvalidInput(err.body_text())
}

fn photo_error(err: MultipartError) -> ClaimError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ClaimError::InvalidInput(err.body_text())
    } else {
        ClaimError::MediaProcessing(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocationDefaults;
    use crate::error::ModelError;
    use crate::llm::DecisionModel;
    use crate::models::ClaimDecision;
    use crate::prompt::{PromptTemplate, VerificationPrompt};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use std::time::Duration;
    use tower::ServiceExt;

    const BOUNDARY: &str = "crop-claims-test-boundary";

    struct CannedModel(Option<&'static str>);

    #[async_trait]
    impl DecisionModel for CannedModel {
        async fn render(&self, _: &VerificationPrompt) -> Result<ClaimDecision, ModelError> {
            match self.0 {
                Some(message) => Err(ModelError::Request(message.to_string())),
                None => Ok(ClaimDecision {
                    is_within_insured_area: true,
                    is_claimant_present: true,
                    is_approved: true,
                    review_reason: None,
                }),
            }
        }
    }

    fn app(failure: Option<&'static str>) -> Router {
        let verifier = ClaimVerificationService::new(
            Arc::new(StubGeofenceChecker),
            Arc::new(StubPresenceChecker),
            Arc::new(CannedModel(failure)),
            PromptTemplate::default(),
            LocationDefaults::default(),
            Duration::from_secs(60),
        );
        build_router(AppState { verifier }, 10 * 1024 * 1024)
    }

    fn multipart_body(fields: &[(&str, &str)], photo: Option<(&str, Vec<u8>)>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((content_type, bytes)) = photo {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"crop\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(&bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn claim_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/claims")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, ActionResponse) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    const VALID_FIELDS: [(&str, &str); 3] = [
        ("name", "Meera Patel"),
        ("cropType", "sugarcane"),
        ("damageDescription", "Stalks lodged after a cyclone passed through"),
    ];

    #[tokio::test]
    async fn test_submit_claim_approved() {
        let body = multipart_body(&VALID_FIELDS, Some(("image/jpeg", vec![0xFF, 0xD8, 0xFF])));
        let (status, response) = send(app(None), claim_request(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(response.success);
        let decision = response.data.unwrap();
        assert!(decision.is_approved);
        assert_eq!(decision.review_reason, None);
    }

    #[tokio::test]
    async fn test_submit_claim_missing_field() {
        let body = multipart_body(&VALID_FIELDS[..2], None);
        let (status, response) = send(app(None), claim_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, ActionResponse::failed("Invalid form data."));
    }

    #[tokio::test]
    async fn test_submit_claim_oversized_photo() {
        let body = multipart_body(&VALID_FIELDS, Some(("image/png", vec![0; 6 * 1024 * 1024])));
        let (status, response) = send(app(None), claim_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.as_deref(), Some("Invalid form data."));
    }

    #[tokio::test]
    async fn test_submit_claim_model_failure() {
        let body = multipart_body(&VALID_FIELDS, None);
        let (status, response) = send(app(Some("rate limited")), claim_request(body)).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!response.success);
        assert_eq!(response.data, None);
        assert_eq!(
            response.error.as_deref(),
            Some("AI Verification Failed: LLM request failed: rate limited")
        );
    }

    #[tokio::test]
    async fn test_truncated_photo_part_fails_processing() {
        let mut body = multipart_body(&VALID_FIELDS, None);
        // Drop the closing boundary and append a photo part that never ends.
        body.truncate(body.len() - format!("--{BOUNDARY}--\r\n").len());
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"crop\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]);

        let (status, response) = send(app(None), claim_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, ActionResponse::failed("Failed to process photo."));
    }

    #[tokio::test]
    async fn test_non_multipart_request_is_invalid() {
        let request = Request::builder()
            .method("POST")
            .uri("/claims")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, response) = send(app(None), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.as_deref(), Some("Invalid form data."));
    }

    #[tokio::test]
    async fn test_health_check() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app(None).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
