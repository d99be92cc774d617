//! Testing utilities for code that relies on request-scoped user context.
//!
//! This module provides:
//! - Request and principal fixtures
//! - An instrumentation double that records attributed calls
//! - Assertions over recorded calls

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_all_attributed_to, assert_attributed_to, assert_unattributed};
pub use fixtures::{StaticPrincipal, TestRequest};
pub use mocks::{RecordingInstrumentation, TrackedCall};
