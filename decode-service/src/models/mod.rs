pub mod event;

pub use event::{FunctionEvent, FunctionResponse, JSON_CONTENT_TYPE};
