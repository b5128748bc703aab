//! HTTP Handlers

mod articles;
mod auth;
mod catalog;
mod generation;
mod mutation;
mod ping;
mod tasks;

pub use articles::*;
pub use auth::*;
pub use catalog::*;
pub use generation::*;
pub use mutation::*;
pub use ping::*;
pub use tasks::*;
