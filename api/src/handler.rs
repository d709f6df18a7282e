use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{
    models::{NewWebhook, PairQuery, RateTable, RecordId, WebhookRegistration},
    Error as CommonError,
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use crate::service::RateService;

pub type SharedService = Arc<RateService>;

// Create a wrapper for our common::Error type
pub struct ApiError(CommonError);

impl From<CommonError> for ApiError {
    fn from(err: CommonError) -> Self {
        ApiError(err)
    }
}

// Convert our API error wrapper to an Axum response
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            CommonError::ParseError(msg) => (StatusCode::BAD_REQUEST, msg),
            CommonError::InvalidId(msg) => (StatusCode::BAD_REQUEST, msg),
            CommonError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            CommonError::UnknownCurrency(code) => (
                StatusCode::NOT_FOUND,
                format!("No rate for currency '{}'", code),
            ),
            CommonError::ProviderError(msg) => (StatusCode::BAD_GATEWAY, msg),
            CommonError::HttpError(e) => (
                StatusCode::BAD_GATEWAY,
                format!("External API request failed: {}", e),
            ),
            err @ CommonError::InvalidRate { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            CommonError::DbError(msg) | CommonError::WebhookError(msg) => {
                error!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Decode a JSON body regardless of content type; any failure is a 400.
fn decode_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, CommonError> {
    serde_json::from_slice(body)
        .map_err(|e| CommonError::ParseError(format!("Incorrect body: {}", e)))
}

// Lookups report store read failures as missing records.
fn read_failure_as_not_found(err: CommonError) -> CommonError {
    match err {
        CommonError::DbError(msg) => CommonError::NotFound(msg),
        other => other,
    }
}

/// Live rates straight from the provider; nothing is stored
pub async fn live_rates(State(service): State<SharedService>) -> Result<Json<RateTable>, ApiError> {
    Ok(Json(service.live_rates().await?))
}

/// Register a webhook; the body of the response is the new id
pub async fn register_webhook(
    State(service): State<SharedService>,
    body: Bytes,
) -> Result<String, ApiError> {
    let webhook: NewWebhook = decode_body(&body)?;
    let registration = service.register_webhook(webhook).await?;
    Ok(registration.id.to_hex())
}

pub async fn latest_rate(
    State(service): State<SharedService>,
    body: Bytes,
) -> Result<String, ApiError> {
    let pair: PairQuery = decode_body(&body)?;
    debug!("Latest {}/{}", pair.base_currency, pair.target_currency);

    let rate = service
        .latest_rate(&pair)
        .await
        .map_err(read_failure_as_not_found)?;
    Ok(rate.to_string())
}

pub async fn average_rate(
    State(service): State<SharedService>,
    body: Bytes,
) -> Result<String, ApiError> {
    let pair: PairQuery = decode_body(&body)?;
    debug!("Average {}/{}", pair.base_currency, pair.target_currency);

    let rate = service.average_rate(&pair).await?;
    Ok(rate.to_string())
}

/// Fire every registered webhook against the latest snapshot
pub async fn evaluate_trigger(
    State(service): State<SharedService>,
) -> Result<&'static str, ApiError> {
    // delivery runs detached; the response does not wait for it
    let _delivery = service.evaluate_all().await?;
    Ok("Invoking webhooks")
}

pub async fn get_webhook(
    State(service): State<SharedService>,
    Path(id): Path<String>,
) -> Result<Json<WebhookRegistration>, ApiError> {
    let id: RecordId = id.parse()?;
    let webhook = service
        .get_webhook(&id)
        .await
        .map_err(read_failure_as_not_found)?;
    Ok(Json(webhook))
}

pub async fn delete_webhook(
    State(service): State<SharedService>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: RecordId = id.parse()?;
    service
        .delete_webhook(&id)
        .await
        .map_err(read_failure_as_not_found)?;
    Ok(StatusCode::OK)
}
