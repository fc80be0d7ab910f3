pub mod json_body;
pub mod request_metadata;

pub use json_body::JsonBody;
pub use request_metadata::{request_metadata_middleware, RequestMetadata};
