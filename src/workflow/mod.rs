//! Multi-step workflows over the delegation tool.

pub mod batch;
pub mod driver;

pub use batch::run_batch;
pub use driver::{star_emails_instruction, WorkflowDriver, DEFAULT_STAR_COUNT};
