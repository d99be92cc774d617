//! User identity for attributing outbound calls.
//!
//! This module provides:
//! - The normalized [`UserContext`] record
//! - The [`Principal`] trait that auth layers attach to requests
//! - The [`IdentityExtractor`] that turns one into the other

mod extractor;
mod principal;
mod user_context;

pub use extractor::{extract_user_context, IdentityExtractor};
pub use principal::{short_type_name, JsonPrincipal, Principal};
pub use user_context::UserContext;
