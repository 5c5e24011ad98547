pub mod metrics;
pub mod security_headers;
pub mod tracing;

pub use self::tracing::REQUEST_ID_HEADER;
