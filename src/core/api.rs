//! HTTP + WebSocket API for cribwatch
//!
//! Endpoints:
//! - GET /health - Health check
//! - POST /session/new - Create session (waits in INTRO)
//! - GET /session/{id} - Get session status
//! - DELETE /session/{id} - Drop a session and close its event stream
//! - POST /session/{id}/start - Start, or restart after CAUGHT/FINISHED
//! - POST /session/{id}/intro - Back to INTRO after CAUGHT/FINISHED
//! - POST /session/{id}/frame - Submit a landmark snapshot
//! - POST /session/{id}/signals - Submit pre-classified signals
//! - POST /session/{id}/perception - Report camera/model availability
//! - WS /ws/{id} - Live session events

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::core::config::GameConfig;
use crate::core::driver::{SessionClock, DRIVER_PERIOD_MS};
use crate::core::session::Session;
use crate::error::SessionError;
use crate::types::{BehaviorSignals, LandmarkSnapshot, PlayerAction, SessionEvent, SessionStatus};

/// Session plus its live event channel
#[derive(Debug)]
pub struct ApiSession {
    pub id: String,
    pub session: Session,
    pub update_tx: broadcast::Sender<SessionEvent>,
}

impl ApiSession {
    /// Advance to `now_ms` and fan the events out
    fn advance(&mut self, now_ms: u64) {
        let events = self.session.advance(now_ms);
        self.publish(events);
    }

    fn publish(&self, events: Vec<SessionEvent>) {
        for event in events {
            // No subscribers is fine
            let _ = self.update_tx.send(event);
        }
    }
}

/// App state
#[derive(Debug)]
pub struct AppState {
    pub sessions: RwLock<HashMap<String, ApiSession>>,
    pub config: GameConfig,
    pub clock: SessionClock,
}

impl AppState {
    pub fn new(config: GameConfig) -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            config,
            clock: SessionClock::new(),
        })
    }
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
}

/// Frame / signals response
#[derive(Debug, Serialize)]
pub struct FrameResponse {
    pub signals: BehaviorSignals,
    pub action: PlayerAction,
    pub status: SessionStatus,
}

/// Perception availability report
#[derive(Debug, Deserialize)]
pub struct PerceptionReport {
    pub available: bool,
    pub reason: Option<String>,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Create the API router with fresh state
pub fn create_router(config: GameConfig) -> Router {
    router_with_state(AppState::new(config))
}

/// Create the API router over existing state
pub fn router_with_state(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session).delete(delete_session))
        .route("/session/:id/start", post(start_session))
        .route("/session/:id/intro", post(return_to_intro))
        .route("/session/:id/frame", post(submit_frame))
        .route("/session/:id/signals", post(submit_signals))
        .route("/session/:id/perception", post(report_perception))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// Create new session
async fn create_session(State(state): State<Arc<AppState>>) -> Json<NewSessionResponse> {
    let session_id = generate_session_id();
    let (tx, _) = broadcast::channel(100);

    let session = ApiSession {
        id: session_id.clone(),
        session: Session::new(state.config.clone()),
        update_tx: tx,
    };

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), session);
    debug!(%session_id, "session created");

    Json(NewSessionResponse {
        session_id: session_id.clone(),
        websocket_url: format!("/ws/{}", session_id),
    })
}

/// Get session status
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<SessionStatus> {
    let mut sessions = state.sessions.write().await;
    let entry = sessions.get_mut(&id).ok_or_else(not_found)?;
    entry.advance(state.clock.now_ms());
    Ok(Json(entry.session.status()))
}

/// Drop a session. Its broadcast sender goes with it, which ends any
/// WebSocket forwarding for it.
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let mut sessions = state.sessions.write().await;
    sessions.remove(&id).ok_or_else(not_found)?;
    debug!(session_id = %id, "session deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Start or restart
async fn start_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<SessionStatus> {
    let mut sessions = state.sessions.write().await;
    let entry = sessions.get_mut(&id).ok_or_else(not_found)?;
    let now = state.clock.now_ms();
    entry.advance(now);
    let events = entry.session.start_or_restart(now).map_err(session_error)?;
    entry.publish(events);
    Ok(Json(entry.session.status()))
}

/// Back to INTRO
async fn return_to_intro(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<SessionStatus> {
    let mut sessions = state.sessions.write().await;
    let entry = sessions.get_mut(&id).ok_or_else(not_found)?;
    entry.advance(state.clock.now_ms());
    entry.session.return_to_intro().map_err(session_error)?;
    Ok(Json(entry.session.status()))
}

/// Classify and commit one landmark snapshot
async fn submit_frame(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(snapshot): Json<LandmarkSnapshot>,
) -> ApiResult<FrameResponse> {
    let mut sessions = state.sessions.write().await;
    let entry = sessions.get_mut(&id).ok_or_else(not_found)?;
    let events = entry.session.observe(state.clock.now_ms(), &snapshot);
    entry.publish(events);
    Ok(Json(frame_response(&entry.session)))
}

/// Commit signals classified elsewhere
async fn submit_signals(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(signals): Json<BehaviorSignals>,
) -> ApiResult<FrameResponse> {
    let mut sessions = state.sessions.write().await;
    let entry = sessions.get_mut(&id).ok_or_else(not_found)?;
    let events = entry.session.submit_signals(state.clock.now_ms(), signals);
    entry.publish(events);
    Ok(Json(frame_response(&entry.session)))
}

/// Camera/model came up, or failed to
async fn report_perception(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(report): Json<PerceptionReport>,
) -> ApiResult<SessionStatus> {
    let mut sessions = state.sessions.write().await;
    let entry = sessions.get_mut(&id).ok_or_else(not_found)?;
    if report.available {
        entry.session.mark_perception_ready();
    } else {
        let reason = report.reason.unwrap_or_else(|| "perception unavailable".to_string());
        entry.session.mark_perception_unavailable(reason);
    }
    Ok(Json(entry.session.status()))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let sessions = state.sessions.read().await;
    let entry = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let rx = entry.update_tx.subscribe();
    drop(sessions);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Forward session events until either side closes
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<SessionEvent>) {
    let (mut sender, mut receiver) = socket.split();

    let mut forward = tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "websocket client lagging");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            let Ok(json) = serde_json::to_string(&event) else {
                continue;
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    // Inbound messages are ignored; we only watch for the close
    let mut drain = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut forward => drain.abort(),
        _ = &mut drain => forward.abort(),
    }
    debug!("websocket closed");
}

/// Advance every session on the shared clock
pub fn spawn_ticker(state: Arc<AppState>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let now = state.clock.now_ms();
            let mut sessions = state.sessions.write().await;
            for entry in sessions.values_mut() {
                entry.advance(now);
            }
        }
    })
}

fn frame_response(session: &Session) -> FrameResponse {
    FrameResponse {
        signals: session.signals(),
        action: session.action(),
        status: session.status(),
    }
}

fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "session not found".to_string(),
        }),
    )
}

fn session_error(err: SessionError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        SessionError::InvalidTransition { .. } => StatusCode::CONFLICT,
        SessionError::PerceptionUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// Generate session ID
fn generate_session_id() -> String {
    format!("session_{:016x}", rand::random::<u64>())
}

/// Run the API server
pub async fn run_server(addr: &str, config: GameConfig) -> anyhow::Result<()> {
    let state = AppState::new(config);
    let ticker = spawn_ticker(state.clone(), Duration::from_millis(DRIVER_PERIOD_MS));
    let router = router_with_state(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "cribwatch API listening");
    let result = axum::serve(listener, router).await;
    ticker.abort();
    result?;
    Ok(())
}
