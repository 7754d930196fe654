pub mod backoff;
pub mod codec;
pub mod coordinator;
pub mod notice;
pub mod runner;
pub mod types;

pub use coordinator::{Coordinator, Exchange, RollupHttpClient};
pub use notice::{NoticeEmitter, PublishOutcome};
pub use runner::{LoopSettings, LoopStats, RollupRunner};
pub use types::{AdvanceMetadata, PendingRequest, RequestType, Verdict};
