use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::services::ServeDir;
use tracing::warn;

use scenekick_common::{clock::format_timestamp, SceneRef, ScheduleEntry};

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct StatusView {
    hostname: String,
    now: String,
    #[serde(rename = "nowEpoch")]
    now_epoch: i64,
    #[serde(rename = "timeSynced")]
    time_synced: bool,
    #[serde(rename = "scheduleCount")]
    schedule_count: usize,
    #[serde(rename = "scenesRegistered")]
    scenes_registered: bool,
}

#[derive(Debug, Serialize)]
struct JournalView {
    lines: Vec<String>,
}

pub fn router(state: AppState) -> Router {
    let web_root = format!("{}/web", env!("CARGO_MANIFEST_DIR"));
    Router::new()
        .route("/api/status", get(handle_get_status))
        .route("/api/journal", get(handle_get_journal))
        .route(
            "/api/schedule",
            get(handle_get_schedule)
                .put(handle_put_schedule)
                .post(handle_post_schedule),
        )
        .route(
            "/api/schedule/{index}",
            put(handle_put_entry).delete(handle_delete_entry),
        )
        .route("/api/scenes", get(handle_get_scenes).put(handle_put_scenes))
        .route("/api/scenes/available", get(handle_get_available_scenes))
        .route("/api/test/{index}", post(handle_post_test))
        .route("/api/resync", post(handle_post_resync))
        .fallback_service(ServeDir::new(web_root))
        .with_state(state)
}

async fn handle_get_status(State(state): State<AppState>) -> impl IntoResponse {
    let now = state.clock.now();
    let schedule_count = state.table.lock().await.len();
    let scenes_registered = !state.directory.lock().await.is_empty();

    Json(StatusView {
        hostname: state.config.network.hostname.clone(),
        now: format_timestamp(now),
        now_epoch: now,
        time_synced: state.clock.is_synced(),
        schedule_count,
        scenes_registered,
    })
}

async fn handle_get_journal(State(state): State<AppState>) -> impl IntoResponse {
    let lines = state.journal.lock().await.lines();
    Json(JournalView { lines })
}

async fn handle_get_schedule(State(state): State<AppState>) -> impl IntoResponse {
    let entries = state.table.lock().await.entries().to_vec();
    Json(entries)
}

async fn handle_put_schedule(
    State(state): State<AppState>,
    Json(entries): Json<Vec<ScheduleEntry>>,
) -> impl IntoResponse {
    if let Some(invalid) = entries.iter().find(|entry| !entry.validate()) {
        return error_response(
            StatusCode::BAD_REQUEST,
            &format!("invalid schedule entry {:?}", invalid.name),
        );
    }

    {
        let mut table = state.table.lock().await;
        *table = scenekick_common::ScheduleTable::new(entries);
    }
    persist_schedule(&state).await
}

async fn handle_post_schedule(
    State(state): State<AppState>,
    Json(entry): Json<ScheduleEntry>,
) -> impl IntoResponse {
    if !entry.validate() {
        return error_response(StatusCode::BAD_REQUEST, "invalid schedule entry");
    }

    state.table.lock().await.push(entry);
    persist_schedule(&state).await
}

async fn handle_put_entry(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(entry): Json<ScheduleEntry>,
) -> impl IntoResponse {
    if !entry.validate() {
        return error_response(StatusCode::BAD_REQUEST, "invalid schedule entry");
    }

    // Whole-entry replace only; the worker never observes a half-updated row.
    let replaced = state.table.lock().await.replace(index, entry);
    if !replaced {
        return error_response(StatusCode::NOT_FOUND, "no schedule entry at that index");
    }
    persist_schedule(&state).await
}

async fn handle_delete_entry(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> impl IntoResponse {
    // Positional delete: every later entry shifts down one index, so an index
    // cached across this call addresses a different entry afterwards.
    let removed = state.table.lock().await.remove(index);
    if removed.is_none() {
        return error_response(StatusCode::NOT_FOUND, "no schedule entry at that index");
    }
    persist_schedule(&state).await
}

async fn handle_get_scenes(State(state): State<AppState>) -> impl IntoResponse {
    let scenes = state.directory.lock().await.scenes().to_vec();
    Json(scenes)
}

async fn handle_put_scenes(
    State(state): State<AppState>,
    Json(scenes): Json<Vec<SceneRef>>,
) -> impl IntoResponse {
    let snapshot = {
        let mut directory = state.directory.lock().await;
        directory.replace(scenes);
        directory.clone()
    };

    if let Err(err) = state.store.save_directory(&snapshot).await {
        warn!("failed to persist scene directory: {err:#}");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to persist scene directory",
        );
    }

    state.journal_record("Scene directory saved.").await;
    Json(snapshot.scenes().to_vec()).into_response()
}

async fn handle_get_available_scenes(State(state): State<AppState>) -> impl IntoResponse {
    match state.executor.list_scenes().await {
        Ok(scenes) => Json(scenes).into_response(),
        Err(err) => {
            warn!("vendor scene listing failed: {err:#}");
            state.journal_record("Retrieve scenes failed.").await;
            error_response(StatusCode::BAD_GATEWAY, "Failed to retrieve vendor scenes")
        }
    }
}

/// Fire an entry's scene ad hoc, one second from now, through the mailbox.
async fn handle_post_test(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> impl IntoResponse {
    let scene_name = match state.table.lock().await.get(index) {
        Some(entry) => entry.scene_name.clone(),
        None => return error_response(StatusCode::NOT_FOUND, "no schedule entry at that index"),
    };

    let scene_id = match state.directory.lock().await.resolve(&scene_name) {
        Some(id) => id.to_string(),
        None => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "entry names a scene that is not registered",
            )
        }
    };

    state
        .mailbox
        .lock()
        .await
        .post_fire(state.clock.now() + 1, scene_id.clone());
    state
        .journal_record(format!("Kick test scheduled: {scene_id}"))
        .await;
    StatusCode::ACCEPTED.into_response()
}

async fn handle_post_resync(State(state): State<AppState>) -> impl IntoResponse {
    state
        .mailbox
        .lock()
        .await
        .post_resync(state.clock.now() + 1);
    state.journal_record("Time adjust scheduled.").await;
    StatusCode::ACCEPTED.into_response()
}

async fn persist_schedule(state: &AppState) -> axum::response::Response {
    let snapshot = state.table.lock().await.clone();
    if let Err(err) = state.store.save_schedule(&snapshot).await {
        warn!("failed to persist schedule: {err:#}");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to persist schedule");
    }

    state.journal_record("Configuration saved.").await;
    Json(snapshot.entries().to_vec()).into_response()
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}
