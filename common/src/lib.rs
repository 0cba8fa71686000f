pub mod clock;
pub mod config;
pub mod journal;
pub mod mailbox;
pub mod mdns;
pub mod ntp;
pub mod scenes;
pub mod schedule;
pub mod worker;

pub use clock::TimeParts;
pub use config::{NetworkConfig, RuntimeConfig, VendorConfig};
pub use journal::Journal;
pub use mailbox::RequestMailbox;
pub use scenes::{SceneDirectory, SceneRef};
pub use schedule::{ScheduleEntry, ScheduleTable, Weekday, WeekdaySet};
pub use worker::{Trigger, WorkerAction, WorkerEngine};
