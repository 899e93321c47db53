pub mod cli;
pub mod identity;
pub mod io;
pub mod local;
pub mod model;
pub mod remote;
pub mod state;
