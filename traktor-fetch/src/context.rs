//! Client context providing the transport and cache store.
//!
//! A [`ClientContext`] is handed to every client at construction. The cache
//! store has no default here: the composition root decides whether calls are
//! cached in memory, on disk, or elsewhere.

use std::sync::Arc;
use std::time::Duration;

use traktor_core::CacheStore;

use crate::error::ClientError;
use crate::transport::{ReqwestTransport, Transport};

// ============================================================================
// Client Settings
// ============================================================================

/// Settings for the default HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// User agent sent with every request.
    pub user_agent: String,
    /// Request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Domains requests may target. `None` allows all.
    pub allowed_domains: Option<Vec<String>>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            user_agent: format!("traktor/{}", env!("CARGO_PKG_VERSION")),
            timeout: None,
            allowed_domains: None,
        }
    }
}

impl ClientSettings {
    /// Sets a request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Restricts requests to the given domains.
    #[must_use]
    pub fn with_allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = Some(domains);
        self
    }
}

// ============================================================================
// Client Context
// ============================================================================

/// Dependencies shared by every endpoint of a client.
#[derive(Clone)]
pub struct ClientContext {
    /// Transport used for every request.
    pub transport: Arc<dyn Transport>,
    /// Cache store shared by every cached endpoint.
    pub cache: Arc<dyn CacheStore>,
    /// Transport settings.
    pub settings: ClientSettings,
}

impl ClientContext {
    /// Creates a context with the default reqwest transport.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(cache: Arc<dyn CacheStore>) -> Result<Self, ClientError> {
        Self::builder(cache).build()
    }

    /// Creates a builder for customizing the context.
    pub fn builder(cache: Arc<dyn CacheStore>) -> ClientContextBuilder {
        ClientContextBuilder::new(cache)
    }
}

impl std::fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("transport", &self.transport.name())
            .field("cache", &self.cache.name())
            .field("settings", &self.settings)
            .finish()
    }
}

// ============================================================================
// Client Context Builder
// ============================================================================

/// Builder for constructing a [`ClientContext`].
pub struct ClientContextBuilder {
    cache: Arc<dyn CacheStore>,
    transport: Option<Arc<dyn Transport>>,
    settings: ClientSettings,
}

impl ClientContextBuilder {
    /// Creates a new builder around a cache store.
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self {
            cache,
            transport: None,
            settings: ClientSettings::default(),
        }
    }

    /// Sets the transport.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the transport settings.
    #[must_use]
    pub fn settings(mut self, settings: ClientSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = Some(timeout);
        self
    }

    /// Builds the context.
    ///
    /// # Errors
    ///
    /// Fails if no transport was given and the reqwest client cannot be built.
    pub fn build(self) -> Result<ClientContext, ClientError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::with_settings(&self.settings)?),
        };

        Ok(ClientContext {
            transport,
            cache: self.cache,
            settings: self.settings,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
