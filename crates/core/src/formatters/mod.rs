pub mod text;

pub use text::{OutputFormatter, plain_text};
