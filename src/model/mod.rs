pub mod association;
pub mod config;
pub mod local_task;
pub mod project;
pub mod task;
pub mod user;

pub use association::*;
pub use config::*;
pub use local_task::*;
pub use project::*;
pub use task::*;
pub use user::*;

/// Server-assigned record identifier. Opaque to this layer beyond equality.
pub type RecordId = String;
