use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::bet::{Bet, BetStatus};
use crate::error::{DomainError, ServiceError, ValidationError};
use crate::events::EventPublisher;
use crate::placement::{publish_bet_events, PlaceBetCommand, PlaceBetUseCase};
use crate::repository::BetRepository;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn BetRepository>,
    pub publisher: Arc<EventPublisher>,
    pub place_bet: Arc<PlaceBetUseCase>,
}

impl AppState {
    pub fn new(repository: Arc<dyn BetRepository>, publisher: Arc<EventPublisher>) -> Self {
        let place_bet = Arc::new(PlaceBetUseCase::new(repository.clone(), publisher.clone()));
        Self {
            repository,
            publisher,
            place_bet,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/bets", post(place_bet))
        .route("/bets/{id}", get(get_bet))
        .route("/bets/{id}/settle", post(settle_bet))
        .route("/bets/{id}/cancel", post(cancel_bet))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceBetBody {
    customer_id: String,
    stake: Decimal,
    odds_price: Decimal,
    selection: String,
    market_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OddsBody {
    price: Decimal,
    selection: String,
    market_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BetResponse {
    bet_id: Uuid,
    stake: Decimal,
    potential_win: Decimal,
    odds: OddsBody,
    placed_at: DateTime<Utc>,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    actual_win: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    settled_at: Option<DateTime<Utc>>,
}

impl BetResponse {
    fn from_bet(bet: &Bet) -> Self {
        Self {
            bet_id: bet.id(),
            stake: bet.stake(),
            potential_win: bet.potential_win(),
            odds: OddsBody {
                price: bet.odds().price(),
                selection: bet.odds().selection().to_string(),
                market_id: bet.odds().market_id().to_string(),
            },
            placed_at: bet.placed_at(),
            status: bet.status().to_string(),
            actual_win: bet.actual_win(),
            settled_at: bet.settled_at(),
        }
    }
}

async fn place_bet(
    State(state): State<AppState>,
    Json(body): Json<PlaceBetBody>,
) -> Result<(StatusCode, Json<BetResponse>), ApiError> {
    let bet = state
        .place_bet
        .execute(PlaceBetCommand {
            customer_id: body.customer_id,
            stake: body.stake,
            odds_price: body.odds_price,
            selection: body.selection,
            market_id: body.market_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(BetResponse::from_bet(&bet))))
}

async fn get_bet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BetResponse>, ApiError> {
    let bet = load_bet(&state, id).await?;
    Ok(Json(BetResponse::from_bet(&bet)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettleBetBody {
    outcome: SettleOutcome,
    market_result: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SettleOutcome {
    Won,
    Lost,
}

async fn settle_bet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SettleBetBody>,
) -> Result<Json<BetResponse>, ApiError> {
    let mut bet = load_bet(&state, id).await?;

    if matches!(bet.status(), BetStatus::Won | BetStatus::Lost) {
        return Err(DomainError::BetAlreadySettled { bet_id: bet.id() }.into());
    }

    match body.outcome {
        SettleOutcome::Won => bet.settle_as_won(&body.market_result)?,
        SettleOutcome::Lost => bet.settle_as_lost(&body.market_result)?,
    }

    publish_bet_events(&state.publisher, &mut bet).await;
    state.repository.save(&bet).await?;
    Ok(Json(BetResponse::from_bet(&bet)))
}

#[derive(Debug, Deserialize)]
struct CancelBetBody {
    reason: Option<String>,
}

async fn cancel_bet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<BetResponse>, ApiError> {
    let mut bet = load_bet(&state, id).await?;
    // The cancellation body is optional; an empty body means no reason given.
    let reason = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<CancelBetBody>(&body)
            .map_err(|err| ValidationError::new("body", err.to_string()))?
            .reason
    };

    bet.cancel(reason.as_deref())?;
    publish_bet_events(&state.publisher, &mut bet).await;
    state.repository.save(&bet).await?;
    Ok(Json(BetResponse::from_bet(&bet)))
}

async fn load_bet(state: &AppState, id: Uuid) -> Result<Bet, ApiError> {
    state
        .repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::BetNotFound { bet_id: id.to_string() }))
}

/// JSON error body: `{"success": false, "error": {"code", "message"}}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// HTTP-layer wrapper around `ServiceError` translating error codes into
/// status codes. Upstream failures surface as a generic 5xx body; internal
/// details are logged, never returned.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(ServiceError::Domain(err))
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(ServiceError::Validation(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self.0 {
            ServiceError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR".to_string(),
                err.to_string(),
            ),
            ServiceError::Domain(err) => {
                let status = match err.code() {
                    "BET_NOT_FOUND" => StatusCode::NOT_FOUND,
                    "BET_ALREADY_SETTLED" => StatusCode::CONFLICT,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, err.code().to_string(), err.to_string())
            }
            ServiceError::Adapter(err) => {
                error!(error = %err, "upstream failure surfaced to HTTP layer");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR".to_string(),
                    "upstream service unavailable".to_string(),
                )
            }
        };

        let body = ErrorBody {
            success: false,
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}
