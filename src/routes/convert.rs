//! Conversion routes
//!
//! `/convert` and `/convert-raw` return a single PDF; `/convert-batch` fans
//! out over a document list and returns either a zip archive or an
//! inline-base64 JSON body. Request validation (blank input, payload and
//! batch-size limits) happens here, before anything reaches the conversion
//! core.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, DefaultBodyLimit, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::config::LimitsConfig;
use crate::convert::package::{build_inline_response, build_zip_archive};
use crate::convert::RenderJob;
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct HtmlRequest {
    html: String,
}

#[derive(Deserialize)]
pub struct RawHtmlRequest {
    html_content: String,
}

#[derive(Deserialize)]
pub struct BatchHtmlRequest {
    html_list: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnFormat {
    #[default]
    Zip,
    Json,
}

#[derive(Debug, Default, Deserialize)]
pub struct BatchQuery {
    #[serde(default)]
    return_format: ReturnFormat,
}

/// Create the conversion router.
///
/// The default body cap is lifted; payload size is governed by the
/// service's own limits below.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/convert", post(convert))
        .route("/convert-raw", post(convert_raw))
        .route("/convert-batch", post(convert_batch))
        .layer(DefaultBodyLimit::disable())
}

async fn convert(
    State(state): State<AppState>,
    payload: std::result::Result<Json<HtmlRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload.map_err(reject_json)?;
    convert_single(&state, request.html).await
}

async fn convert_raw(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RawHtmlRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload.map_err(reject_json)?;
    convert_single(&state, request.html_content).await
}

async fn convert_single(state: &AppState, html: String) -> Result<Response> {
    validate_html(&html, &state.config().limits)?;
    let pdf = state.converter().convert(RenderJob::single(html)).await?;
    pdf_response(pdf)
}

async fn convert_batch(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
    payload: std::result::Result<Json<BatchHtmlRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload.map_err(reject_json)?;
    validate_batch(&request.html_list, &state.config().limits)?;

    let outcome = state.converter().convert_batch(request.html_list).await;
    if outcome.is_total_failure() {
        return Err(AppError::BatchFailed {
            total: outcome.total,
            failures: outcome.failures,
        });
    }

    match query.return_format {
        ReturnFormat::Json => Ok(Json(build_inline_response(&outcome)).into_response()),
        ReturnFormat::Zip => {
            let archive = build_zip_archive(&outcome)?;
            let mut builder = Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "application/zip")
                .header(header::CONTENT_LENGTH, archive.len())
                .header(
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=documents.zip",
                );
            // Partial-failure counters ride out-of-band so callers can
            // detect them without opening the archive.
            if outcome.failure_count() > 0 {
                builder = builder
                    .header("X-Conversion-Errors", outcome.failure_count())
                    .header("X-Conversion-Success", outcome.success_count());
            }
            builder
                .body(Body::from(archive))
                .map_err(|e| AppError::Internal(e.to_string()))
        }
    }
}

fn pdf_response(pdf: Vec<u8>) -> Result<Response> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_LENGTH, pdf.len())
        .header(header::CONTENT_DISPOSITION, "attachment; filename=document.pdf")
        .body(Body::from(pdf))
        .map_err(|e| AppError::Internal(e.to_string()))
}

fn validate_html(html: &str, limits: &LimitsConfig) -> Result<()> {
    if html.trim().is_empty() {
        return Err(AppError::BadRequest("HTML content is required".to_string()));
    }
    if html.len() > limits.max_html_size {
        return Err(AppError::BadRequest(format!(
            "HTML content exceeds maximum size of {} bytes",
            limits.max_html_size
        )));
    }
    Ok(())
}

fn validate_batch(html_list: &[String], limits: &LimitsConfig) -> Result<()> {
    if html_list.is_empty() {
        return Err(AppError::BadRequest("HTML list cannot be empty".to_string()));
    }
    if html_list.len() > limits.max_batch_size {
        return Err(AppError::BadRequest(format!(
            "Batch size exceeds maximum of {} items",
            limits.max_batch_size
        )));
    }
    for (index, html) in html_list.iter().enumerate() {
        if html.trim().is_empty() {
            return Err(AppError::BadRequest(format!(
                "HTML content at index {} is empty",
                index
            )));
        }
        if html.len() > limits.max_html_size {
            return Err(AppError::BadRequest(format!(
                "HTML content at index {} exceeds maximum size of {} bytes",
                index, limits.max_html_size
            )));
        }
    }
    Ok(())
}

fn reject_json(rejection: JsonRejection) -> AppError {
    let text = rejection.body_text();
    // serde_json points at raw control bytes inside string literals; the
    // usual culprit here is unescaped HTML pasted into the JSON body.
    if text.contains("control character") {
        return AppError::BadRequest(
            "Invalid JSON: HTML content contains unescaped control characters. \
             Make sure your HTML is properly escaped in JSON."
                .to_string(),
        );
    }
    AppError::BadRequest(text)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::Duration;

    use axum_test::TestServer;
    use serde_json::json;
    use zip::ZipArchive;

    use super::*;
    use crate::config::Config;
    use crate::renderer::testing::MockFactory;
    use crate::renderer::RendererHandle;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.limits.max_batch_size = 10;
        config.limits.max_html_size = 4096;
        config.renderer.conversion_timeout = Duration::from_millis(100);
        config
    }

    fn server_with(factory: MockFactory) -> TestServer {
        let state = AppState::new(test_config(), RendererHandle::new(Box::new(factory)));
        let app = Router::new().merge(router()).with_state(state);
        TestServer::new(app).unwrap()
    }

    fn server() -> TestServer {
        server_with(MockFactory::new())
    }

    #[tokio::test]
    async fn test_convert_returns_pdf_attachment() {
        let server = server();
        let response = server
            .post("/convert")
            .json(&json!({"html": "<p>Hello</p>"}))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/pdf"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=document.pdf"
        );
        assert!(response.as_bytes().starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_convert_rejects_blank_html() {
        let server = server();
        for html in ["", "   \n\t "] {
            let response = server.post("/convert").json(&json!({"html": html})).await;
            assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
            let body: serde_json::Value = response.json();
            assert_eq!(body["error"], "bad_request");
        }
    }

    #[tokio::test]
    async fn test_convert_rejects_oversize_html() {
        let server = server();
        let html = format!("<p>{}</p>", "x".repeat(8192));
        let response = server.post("/convert").json(&json!({"html": html})).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_convert_raw_uses_html_content_field() {
        let server = server();
        let response = server
            .post("/convert-raw")
            .json(&json!({"html_content": "<p>raw</p>"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(response.as_bytes().starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_convert_timeout_maps_to_504() {
        let server = server();
        let response = server
            .post("/convert")
            .json(&json!({"html": "<!--hang--><p>never</p>"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::GATEWAY_TIMEOUT);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "timeout");
    }

    #[tokio::test]
    async fn test_convert_engine_failure_maps_to_500() {
        let server = server();
        let response = server
            .post("/convert")
            .json(&json!({"html": "<!--fail-load--><p>x</p>"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "conversion_failed");
    }

    #[tokio::test]
    async fn test_unescaped_control_characters_get_hint() {
        let server = server();
        let response = server
            .post("/convert")
            .content_type("application/json")
            .bytes("{\"html\": \"<p>line\nbreak</p>\"}".into())
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("unescaped control characters"));
    }

    #[tokio::test]
    async fn test_batch_zip_with_partial_failure() {
        let server = server();
        let response = server
            .post("/convert-batch")
            .json(&json!({"html_list": ["<p>A</p>", "<!--fail-load-->", "<p>B</p>"]}))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/zip"
        );
        assert_eq!(response.headers().get("X-Conversion-Errors").unwrap(), "1");
        assert_eq!(response.headers().get("X-Conversion-Success").unwrap(), "2");

        let mut archive = ZipArchive::new(Cursor::new(response.as_bytes().to_vec())).unwrap();
        let names: Vec<String> = archive.file_names().map(String::from).collect();
        assert_eq!(names, vec!["document_1.pdf", "document_3.pdf"]);
        assert_eq!(archive.len(), 2);
    }

    #[tokio::test]
    async fn test_batch_zip_without_failures_has_no_error_headers() {
        let server = server();
        let response = server
            .post("/convert-batch")
            .json(&json!({"html_list": ["<p>A</p>", "<p>B</p>"]}))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(response.headers().get("X-Conversion-Errors").is_none());
        assert!(response.headers().get("X-Conversion-Success").is_none());
    }

    #[tokio::test]
    async fn test_batch_json_mode() {
        let server = server();
        let response = server
            .post("/convert-batch")
            .add_query_param("return_format", "json")
            .json(&json!({"html_list": ["<p>A</p>", "<!--fail-pdf-->x", "<p>B</p>"]}))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert_eq!(body["total"], 3);
        assert_eq!(body["success_count"], 2);
        assert_eq!(body["failure_count"], 1);
        assert!(body["documents"]["0"].is_string());
        assert!(body["documents"]["2"].is_string());
        assert_eq!(body["errors"][0]["index"], 1);
        assert_eq!(body["errors"][0]["kind"], "error");
    }

    #[tokio::test]
    async fn test_batch_all_failed_returns_500_with_descriptors() {
        let server = server();
        let response = server
            .post("/convert-batch")
            .json(&json!({"html_list": ["<!--fail-load-->a", "<!--fail-load-->b"]}))
            .await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "all_conversions_failed");
        assert_eq!(body["total"], 2);
        assert_eq!(body["failures"].as_array().unwrap().len(), 2);
        assert_eq!(body["failures"][1]["index"], 1);
    }

    #[tokio::test]
    async fn test_batch_validation_limits() {
        let server = server();

        let response = server
            .post("/convert-batch")
            .json(&json!({"html_list": []}))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

        let too_many: Vec<String> = (0..11).map(|i| format!("<p>{}</p>", i)).collect();
        let response = server
            .post("/convert-batch")
            .json(&json!({"html_list": too_many}))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

        let response = server
            .post("/convert-batch")
            .json(&json!({"html_list": ["<p>ok</p>", "  "]}))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert!(body["message"].as_str().unwrap().contains("index 1"));
    }
}
