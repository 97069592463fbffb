pub mod security_headers;
pub mod tracing;

pub use security_headers::security_headers_middleware;
pub use self::tracing::{RequestId, request_id_middleware};
