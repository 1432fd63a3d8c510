use crate::persistence::{save_snapshot, saves_immediately};
use crate::state::{wall_clock_ms, AppState, NoticeLevel, StreamItem};
use crate::sync::publish;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{
        sse::{Event, Sse},
        IntoResponse, Json, Response,
    },
    routing::{get, post},
    Router,
};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tycoon_core::{Action, ActionError, Command, ErrorKind, EventEnvelope, MetricsSnapshot};

/// Every command the action endpoint accepts, by its wire name.
pub const ACTION_KINDS: [&str; 29] = [
    "buy",
    "sell",
    "clean_item",
    "equip",
    "unequip",
    "repair",
    "unlock_perk",
    "convert_currency",
    "resolve_hack",
    "console_submit",
    "answer_signal",
    "join_corp",
    "leave_corp",
    "accept_corp_quest",
    "collect_corp_quest",
    "start_project",
    "write_code",
    "release_project",
    "set_crunch",
    "pay_bill",
    "take_loan",
    "repay_loan",
    "recharge",
    "craft",
    "save_file",
    "delete_file",
    "rename_file",
    "set_role",
    "dismiss_modal",
];

pub fn make_router(state: AppState, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/meta", get(meta_handler))
        .route("/api/v1/snapshot", get(snapshot_handler))
        .route("/api/v1/metrics", get(metrics_handler))
        .route("/api/v1/stream", get(stream_handler))
        .route("/api/v1/actions", get(actions_handler))
        .route("/api/v1/actions/:kind", post(action_handler))
        .route("/api/v1/save", post(save_handler))
        .route("/api/v1/pause", post(pause_handler))
        .route("/api/v1/resume", post(resume_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn meta_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    let sim = app_state.sim.lock();
    let meta = &sim.game_state.meta;
    Json(serde_json::json!({
        "tick": meta.tick,
        "seed": meta.seed,
        "player_id": meta.player_id,
        "schema_version": meta.schema_version,
        "content_version": meta.content_version,
        "day": sim.game_state.clock.day,
        "ticks_per_sec": app_state.ticks_per_sec,
        "paused": app_state.paused.load(Ordering::Relaxed),
        "autopilot": sim.autopilot.is_some(),
    }))
}

pub async fn snapshot_handler(
    State(app_state): State<AppState>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let sim = app_state.sim.lock();
    let body = serde_json::to_string(&sim.game_state);
    drop(sim);
    match body {
        Ok(json) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            json,
        ),
        Err(err) => {
            tracing::error!("snapshot serialization failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "application/json")],
                r#"{"error":"serialization failed"}"#.to_string(),
            )
        }
    }
}

pub async fn metrics_handler(State(app_state): State<AppState>) -> Json<VecDeque<MetricsSnapshot>> {
    let sim = app_state.sim.lock();
    Json(sim.metrics_history.clone())
}

pub async fn actions_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "actions": ACTION_KINDS }))
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InsufficientResource | ErrorKind::StolenGoods => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ErrorKind::InvariantViolation => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Rejected => StatusCode::BAD_REQUEST,
    }
}

/// Parse `body` as the arguments of the `kind` command. An empty body is an
/// empty argument object.
fn parse_command(kind: &str, body: &[u8]) -> Result<Command, String> {
    let mut args = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::Map::new()
    } else {
        match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(_) => return Err("body must be a JSON object".to_string()),
            Err(err) => return Err(format!("invalid JSON: {err}")),
        }
    };
    args.insert("type".to_string(), serde_json::Value::from(kind));
    serde_json::from_value(serde_json::Value::Object(args))
        .map_err(|err| format!("invalid {kind} arguments: {err}"))
}

pub async fn action_handler(
    State(app_state): State<AppState>,
    Path(kind): Path<String>,
    body: Bytes,
) -> Response {
    if !ACTION_KINDS.contains(&kind.as_str()) {
        return error_response(StatusCode::NOT_FOUND, format!("unknown action {kind}"));
    }
    let command = match parse_command(&kind, &body) {
        Ok(command) => command,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let saves = saves_immediately(&command);
    let result: Result<Vec<EventEnvelope>, ActionError> = {
        let mut guard = app_state.sim.lock();
        let sim = &mut *guard;
        let result = tycoon_core::apply(
            &mut sim.game_state,
            &Action::Player(command),
            &sim.content,
            &mut sim.rng,
            wall_clock_ms(),
        );
        // Published under the lock so file changes queue in commit order.
        if let Ok(events) = &result {
            publish(&app_state, events.clone());
        }
        result
    };

    match result {
        Ok(events) => {
            if saves {
                app_state.save_now.notify_one();
            }
            (StatusCode::OK, Json(serde_json::json!({ "events": events }))).into_response()
        }
        Err(err) => {
            tracing::debug!(%kind, "action rejected: {err}");
            app_state.notify(NoticeLevel::Warning, err.to_string());
            (
                status_for(err.kind()),
                Json(serde_json::json!({ "error": err.to_string(), "kind": err.kind() })),
            )
                .into_response()
        }
    }
}

pub async fn save_handler(State(app_state): State<AppState>) -> Response {
    if app_state.store.is_none() {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "no save store (started without --save-dir?)",
        );
    }
    match save_snapshot(&app_state).await {
        Ok(point) => {
            (StatusCode::OK, Json(serde_json::json!({ "tick": point.tick }))).into_response()
        }
        Err(err) => {
            tracing::error!("save failed: {err}");
            app_state.notify(NoticeLevel::Error, format!("save failed: {err}"));
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

pub async fn pause_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    app_state.paused.store(true, Ordering::Relaxed);
    Json(serde_json::json!({"paused": true}))
}

pub async fn resume_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    app_state.paused.store(false, Ordering::Relaxed);
    Json(serde_json::json!({"paused": false}))
}

/// Committed events are batched into one `events` message per flush;
/// notices and chat pass straight through.
pub async fn stream_handler(
    State(app_state): State<AppState>,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = app_state.event_tx.subscribe();
    let sim = app_state.sim.clone();

    let stream = async_stream::stream! {
        let mut heartbeat = tokio::time::interval(Duration::from_millis(200));
        heartbeat.tick().await;
        let mut flush = tokio::time::interval(Duration::from_millis(50));
        flush.tick().await;
        let mut pending: Vec<EventEnvelope> = Vec::new();
        loop {
            tokio::select! {
                result = rx.recv() => {
                    match result {
                        Ok(StreamItem::Events { events }) => pending.extend(events),
                        Ok(item) => {
                            let data = serde_json::to_string(&item).unwrap_or_default();
                            yield Ok(Event::default().data(data));
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::debug!(skipped, "stream subscriber lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = flush.tick() => {
                    if !pending.is_empty() {
                        let item = StreamItem::Events { events: std::mem::take(&mut pending) };
                        let data = serde_json::to_string(&item).unwrap_or_default();
                        yield Ok(Event::default().data(data));
                    }
                }
                _ = heartbeat.tick() => {
                    let tick = sim.lock().game_state.meta.tick;
                    let hb = serde_json::json!({"kind": "heartbeat", "tick": tick});
                    yield Ok(Event::default().data(hb.to_string()));
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}
