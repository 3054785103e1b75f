pub mod decoder;
pub mod metrics;
pub mod prompts;
pub mod providers;

pub use decoder::{Decoder, Explanation};
