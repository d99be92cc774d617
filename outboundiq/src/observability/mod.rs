//! Observability utilities.

#[cfg(test)]
pub(crate) mod capture;
mod logging;
mod tracing;

pub use self::logging::{build_filter, init_logging};
pub use self::tracing::{request_span, RequestSpanAttributes};
