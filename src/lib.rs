//! RPG special-move and chibi-avatar generator service
//!
//! A small HTTP service that turns a self-introduction into a humorous RPG
//! special move and a photo into a chibi character, delegating all generation
//! to OpenAI.

pub mod ai;
pub mod app;
pub mod avatar;
pub mod error;
pub mod models;
pub mod prompts;
pub mod server;
pub mod skill;

pub use error::{Error, Result};
