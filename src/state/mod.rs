pub mod auth;
pub mod entity;
pub mod resolver;
pub mod session;

pub use auth::*;
pub use entity::*;
pub use resolver::*;
pub use session::*;
