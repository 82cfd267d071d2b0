//! Output formatting for CLI.

mod json;
mod text;

pub use json::{EndpointOutput, JsonFormatter, ResponseOutput};
pub use text::{TextFormatter, format_seconds};
#[cfg(test)]
mod tests;
