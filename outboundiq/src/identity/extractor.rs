//! Derives a [`UserContext`] from a request and its principal.

use super::{Principal, UserContext};
use crate::config::ContextConfig;
use crate::context::RequestContext;

/// Derives normalized identities from requests.
///
/// Extraction is read-only and never fails: a request without a principal
/// simply has no user context.
#[derive(Debug, Clone, Default)]
pub struct IdentityExtractor {
    config: ContextConfig,
}

impl IdentityExtractor {
    /// Creates an extractor with the given configuration.
    #[must_use]
    pub fn new(config: ContextConfig) -> Self {
        Self { config }
    }

    /// Returns the extractor's configuration.
    #[must_use]
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Extracts the user context for a request.
    ///
    /// A manually attached context always wins. Otherwise the attached
    /// principal is normalized; without a principal the result is `None`.
    #[must_use]
    pub fn extract(&self, request: &RequestContext) -> Option<UserContext> {
        if let Some(manual) = request.user_context_override() {
            return Some(manual);
        }

        let principal = request.principal()?;
        Some(self.normalize(principal.as_ref()))
    }

    /// Normalizes a principal into a user context.
    #[must_use]
    pub fn normalize(&self, principal: &dyn Principal) -> UserContext {
        // An empty id is treated as no id at all.
        let subject_id = principal
            .id()
            .or_else(|| principal.alternate_id())
            .or_else(|| principal.user_id())
            .or_else(|| principal.subject())
            .filter(|id| !id.is_empty());

        let subject_type = principal
            .principal_type()
            .or_else(|| principal.role())
            .or_else(|| {
                self.config
                    .infer_type_from_type_name
                    .then(|| principal.type_name())
                    .flatten()
                    .map(str::to_string)
            })
            .unwrap_or_else(|| self.config.default_subject_type.clone());

        UserContext::new(subject_id, subject_type, self.config.origin_kind.clone())
    }
}

/// Extracts the user context for a request using the default configuration.
#[must_use]
pub fn extract_user_context(request: &RequestContext) -> Option<UserContext> {
    IdentityExtractor::default().extract(request)
}
