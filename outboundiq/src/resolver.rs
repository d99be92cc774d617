//! Publication point for the user context resolver.
//!
//! The instrumentation layer that records outbound calls does not know when
//! requests begin or end. It only calls [`resolve_user_context`] each time it
//! needs to attribute a call; whichever component owns request scoping
//! installs the resolver that answers it.

use crate::context::has_active_scope;
use crate::identity::UserContext;
use parking_lot::RwLock;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

/// A function returning the user context for the current request.
pub type UserContextResolver = Arc<dyn Fn() -> Option<UserContext> + Send + Sync>;

/// Outcome of a resolver registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The resolver was installed.
    Installed,
    /// A resolver was already installed; the new one was dropped.
    AlreadyRegistered,
}

impl Registration {
    /// Returns true if the resolver was installed.
    #[must_use]
    pub fn is_installed(self) -> bool {
        matches!(self, Self::Installed)
    }
}

/// Single-slot registry holding the active resolver.
///
/// The first registration wins; later registrations are ignored and reported
/// as [`Registration::AlreadyRegistered`]. There is intentionally no way to
/// replace an installed resolver outside of [`reset`](Self::reset).
#[derive(Default)]
pub struct ResolverRegistry {
    slot: RwLock<Option<UserContextResolver>>,
}

impl ResolverRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `resolver` unless one is already installed.
    pub fn register<F>(&self, resolver: F) -> Registration
    where
        F: Fn() -> Option<UserContext> + Send + Sync + 'static,
    {
        self.register_shared(Arc::new(resolver))
    }

    /// Installs a shared resolver unless one is already installed.
    pub fn register_shared(&self, resolver: UserContextResolver) -> Registration {
        // Check and set under one write guard.
        let mut slot = self.slot.write();
        if slot.is_some() {
            tracing::debug!("User context resolver already registered, ignoring");
            return Registration::AlreadyRegistered;
        }
        *slot = Some(resolver);
        tracing::debug!("User context resolver registered");
        Registration::Installed
    }

    /// Returns true if a resolver is installed.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Resolves the user context for the current request.
    ///
    /// Returns `None` when no resolver is installed, when the caller is not
    /// inside a request scope, or when the resolver itself panics.
    #[must_use]
    pub fn invoke(&self) -> Option<UserContext> {
        if !has_active_scope() {
            return None;
        }

        let resolver = self.slot.read().clone()?;
        match catch_unwind(AssertUnwindSafe(|| resolver())) {
            Ok(context) => context,
            Err(_) => {
                tracing::warn!("User context resolver panicked, recording call without user context");
                None
            }
        }
    }

    /// Removes the installed resolver.
    ///
    /// Intended for tests that need a fresh registry between cases.
    #[doc(hidden)]
    pub fn reset(&self) {
        *self.slot.write() = None;
    }
}

impl std::fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverRegistry")
            .field("registered", &self.is_registered())
            .finish()
    }
}

static GLOBAL_REGISTRY: OnceLock<Arc<ResolverRegistry>> = OnceLock::new();

/// Returns the process-wide registry.
pub fn global_registry() -> Arc<ResolverRegistry> {
    GLOBAL_REGISTRY
        .get_or_init(|| Arc::new(ResolverRegistry::new()))
        .clone()
}

/// Installs the process-wide resolver unless one is already installed.
pub fn set_user_context_resolver<F>(resolver: F) -> Registration
where
    F: Fn() -> Option<UserContext> + Send + Sync + 'static,
{
    global_registry().register(resolver)
}

/// Resolves the user context for the current request using the process-wide
/// registry.
pub fn resolve_user_context() -> Option<UserContext> {
    global_registry().invoke()
}
