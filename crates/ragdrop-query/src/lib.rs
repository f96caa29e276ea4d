//! Ragdrop Query - Answers questions using only retrieved document context.
//!
//! The engine embeds the question, pulls the closest chunks from the vector
//! store, and asks the chat model to answer from those chunks alone.

mod engine;
mod error;
mod operation;
mod prompt;

pub use engine::{QueryEngine, QueryOptions, QuerySession};
pub use error::{EngineResult, QueryError};
pub use operation::{Operation, Progress};
pub use prompt::{build_messages, build_system_prompt, build_user_prompt, truncate_preview, NO_ANSWER};
