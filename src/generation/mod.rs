//! Text, streaming, and structured output generation.

pub mod object;
pub mod stream;
pub mod text;

pub use object::{generate_object, GenerateObjectResult};
pub use stream::{stream_text_with_tools, StreamEvent};
pub use text::generate_text;
