/// Ad-hoc "fire this scene at T" request from the configuration interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireRequest {
    pub at: i64,
    pub scene_id: String,
}

/// Ad-hoc "resync the clock at T" request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResyncRequest {
    pub at: i64,
}

/// Single-slot cross-task channel. Each slot holds at most one pending
/// request; a new post overwrites any unconsumed value (last-writer-wins).
/// Slots are never explicitly cleared: the worker consumes a request purely
/// by the clock moving past its scheduled time.
#[derive(Debug, Default)]
pub struct RequestMailbox {
    fire: Option<FireRequest>,
    resync: Option<ResyncRequest>,
}

impl RequestMailbox {
    pub fn post_fire(&mut self, at: i64, scene_id: impl Into<String>) {
        self.fire = Some(FireRequest {
            at,
            scene_id: scene_id.into(),
        });
    }

    pub fn post_resync(&mut self, at: i64) {
        self.resync = Some(ResyncRequest { at });
    }

    pub fn fire(&self) -> Option<&FireRequest> {
        self.fire.as_ref()
    }

    pub fn resync(&self) -> Option<ResyncRequest> {
        self.resync
    }
}
