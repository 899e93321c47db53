pub mod fields;
pub mod gateway;
pub mod memory;
pub mod store;

pub use gateway::*;
pub use store::*;
