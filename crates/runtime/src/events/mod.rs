//! Topic-based event bus for runtime events.
//!
//! Events are published to specific topics, and consumers subscribe only to
//! the topics they need. Notices are additionally kept in a bounded
//! [`ActivityLog`] so late subscribers can catch up.

mod activity;
mod bus;
mod types;

pub use activity::ActivityLog;
pub use bus::{Event, EventBus, Topic};
pub use types::{
    ConversationEvent, EntryOutcome, ExecutionEvent, ExecutorPhase, Notice, NoticeLevel,
    QueueEvent,
};
