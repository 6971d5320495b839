//! Core types for Courier.

pub mod email;
pub mod generation;
pub mod message;
pub mod stream;
pub mod task;
pub mod usage;

pub use email::*;
pub use generation::*;
pub use message::*;
pub use stream::*;
pub use task::*;
pub use usage::*;
