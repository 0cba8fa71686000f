use crate::{
    clock::TimeParts, mailbox::RequestMailbox, scenes::SceneDirectory, schedule::ScheduleTable,
};

pub const HEARTBEAT_INTERVAL_SECS: i64 = 10;
pub const RESYNC_INTERVAL_SECS: i64 = 12 * 3600;
pub const RESYNC_RETRY_SECS: i64 = 5 * 60;

/// What caused a scene execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Ad-hoc fire request from the configuration interface.
    Request,
    /// A matching schedule entry, identified by its display name.
    Entry { name: String },
}

/// Work the loop must perform for one evaluated second, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerAction {
    Heartbeat,
    ExecuteScene { scene_id: String, trigger: Trigger },
    SceneMissing { entry_name: String, scene_name: String },
    Resync,
}

/// The per-second evaluation state machine. The surrounding loop wakes every
/// ~200ms, calls [`tick`](Self::tick), performs the emitted actions in order,
/// and reports resync outcomes back through [`note_resync`](Self::note_resync).
#[derive(Debug)]
pub struct WorkerEngine {
    /// Wall-clock second value of the last evaluation pass. Gates the loop to
    /// exactly one pass per second regardless of poll cadence.
    last_second: i8,
    heartbeat_due: i64,
    resync_due: i64,
    /// Scheduled time of the mailbox resync request already folded into
    /// `resync_due`, so an unconsumed slot is not re-applied every pass.
    applied_resync_at: Option<i64>,
}

impl WorkerEngine {
    pub fn new(now: i64) -> Self {
        Self {
            last_second: -1,
            heartbeat_due: now + 1,
            resync_due: now + RESYNC_INTERVAL_SECS,
            applied_resync_at: None,
        }
    }

    pub fn tick(
        &mut self,
        now: i64,
        parts: &TimeParts,
        table: &ScheduleTable,
        directory: &SceneDirectory,
        mailbox: &RequestMailbox,
    ) -> Vec<WorkerAction> {
        if parts.second as i8 == self.last_second {
            return Vec::new();
        }
        self.last_second = parts.second as i8;

        let mut actions = Vec::new();

        if now >= self.heartbeat_due {
            actions.push(WorkerAction::Heartbeat);
            self.heartbeat_due = now + HEARTBEAT_INTERVAL_SECS;
        }

        // A fire request is consumed implicitly: once `now` has moved past
        // its scheduled second it never matches again.
        if let Some(request) = mailbox.fire() {
            if request.at == now {
                actions.push(WorkerAction::ExecuteScene {
                    scene_id: request.scene_id.clone(),
                    trigger: Trigger::Request,
                });
            }
        }

        for entry in table.entries().iter().filter(|entry| entry.matches(parts)) {
            match directory.resolve(&entry.scene_name) {
                Some(scene_id) => actions.push(WorkerAction::ExecuteScene {
                    scene_id: scene_id.to_string(),
                    trigger: Trigger::Entry {
                        name: entry.name.clone(),
                    },
                }),
                None => actions.push(WorkerAction::SceneMissing {
                    entry_name: entry.name.clone(),
                    scene_name: entry.scene_name.clone(),
                }),
            }
        }

        if let Some(request) = mailbox.resync() {
            if self.applied_resync_at != Some(request.at) {
                self.resync_due = request.at;
                self.applied_resync_at = Some(request.at);
            }
        }
        if now >= self.resync_due {
            actions.push(WorkerAction::Resync);
        }

        actions
    }

    /// Report the outcome of a [`WorkerAction::Resync`]: failures retry after
    /// five minutes, successes reschedule twelve hours out.
    pub fn note_resync(&mut self, now: i64, success: bool) {
        self.resync_due = now
            + if success {
                RESYNC_INTERVAL_SECS
            } else {
                RESYNC_RETRY_SECS
            };
    }
}
