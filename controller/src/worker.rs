use std::time::Duration;

use tracing::{info, warn};

use scenekick_common::{
    clock::decompose,
    worker::{Trigger, WorkerAction, WorkerEngine},
};

use crate::{state::AppState, watchdog::Watchdog};

/// Poll cadence: fine enough to observe every wall-clock second, coarse
/// enough to bound wake cost. The engine's per-second gate keeps evaluation
/// at exactly once per second.
pub const TICK_INTERVAL: Duration = Duration::from_millis(200);

pub fn spawn(state: AppState, watchdog: Watchdog) {
    tokio::spawn(run(state, watchdog));
}

async fn run(state: AppState, watchdog: Watchdog) {
    state.journal_record("Start worker").await;
    info!("worker loop started");

    let mut engine = WorkerEngine::new(state.clock.now());
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    watchdog.feed();

    loop {
        ticker.tick().await;
        run_tick(&state, &mut engine, state.clock.now()).await;
        watchdog.feed();
    }
}

/// One wake of the loop: evaluate, then perform the emitted actions in
/// order. Split from `run` so the evaluation/IO sequencing is testable with
/// fabricated timestamps.
async fn run_tick(state: &AppState, engine: &mut WorkerEngine, now: i64) {
    let parts = decompose(now);

    let actions = {
        let table = state.table.lock().await;
        let directory = state.directory.lock().await;
        let mailbox = state.mailbox.lock().await;
        engine.tick(now, &parts, &table, &directory, &mailbox)
    };

    for action in actions {
        match action {
            WorkerAction::Heartbeat => {
                state.journal.lock().await.heartbeat(state.clock.now());
            }
            WorkerAction::ExecuteScene { scene_id, trigger } => {
                execute_scene(state, &scene_id, &trigger).await;
            }
            WorkerAction::SceneMissing {
                entry_name,
                scene_name,
            } => {
                warn!("entry {entry_name:?} names unregistered scene {scene_name:?}");
                state
                    .journal_record(format!("Scene name \"{scene_name}\" not found."))
                    .await;
            }
            WorkerAction::Resync => match state.clock.resync().await {
                Ok(_) => {
                    state.journal_record("Clock adjusted from NTP.").await;
                    engine.note_resync(state.clock.now(), true);
                }
                Err(err) => {
                    warn!("clock resync failed: {err:#}");
                    state.clock.note_resync_failure();
                    state.journal_record("Clock adjust failure.").await;
                    engine.note_resync(state.clock.now(), false);
                }
            },
        }
    }
}

async fn execute_scene(state: &AppState, scene_id: &str, trigger: &Trigger) {
    if scene_id.is_empty() {
        state.journal_record("Scene id is empty.").await;
        return;
    }

    state
        .journal_record(format!("Execute scene {scene_id}"))
        .await;
    match state.executor.execute(scene_id).await {
        Ok(()) => {
            state
                .journal_record(format!("Scene {scene_id} executed."))
                .await;
        }
        Err(err) => {
            warn!("scene execution failed: {err:#}");
            state
                .journal_record(format!("Failed to execute scene {scene_id}."))
                .await;
        }
    }

    if matches!(trigger, Trigger::Request) {
        state.journal_record("Kick test executed.").await;
    }
}
