//! Routes a pharmacy link to the adapter that knows how to read its page

use tracing::debug;
use url::Url;

use crate::scrapers::{AhumadaAdapter, CruzVerdeAdapter, DrSimiAdapter, SalcobrandAdapter};
use crate::traits::SiteAdapter;

/// Lookup table from match tokens to registered site adapters
pub struct AdapterDispatcher {
    adapters: Vec<Box<dyn SiteAdapter>>,
    /// `(token, index into adapters)` in registration order
    tokens: Vec<(&'static str, usize)>,
}

impl AdapterDispatcher {
    /// Dispatcher with no adapters registered
    pub fn empty() -> Self {
        Self {
            adapters: Vec::new(),
            tokens: Vec::new(),
        }
    }

    /// Dispatcher covering the four supported pharmacies
    pub fn with_default_adapters() -> Self {
        let mut dispatcher = Self::empty();
        dispatcher.register(Box::new(DrSimiAdapter::new()));
        dispatcher.register(Box::new(AhumadaAdapter::new()));
        dispatcher.register(Box::new(CruzVerdeAdapter::new()));
        dispatcher.register(Box::new(SalcobrandAdapter::new()));
        dispatcher
    }

    /// Add an adapter; earlier registrations win on overlapping tokens
    pub fn register(&mut self, adapter: Box<dyn SiteAdapter>) {
        let index = self.adapters.len();
        self.tokens
            .extend(adapter.config().tokens.iter().map(|token| (*token, index)));
        self.adapters.push(adapter);
    }

    /// Find the adapter for a link by pharmacy name or product URL host.
    ///
    /// Matching is a case-insensitive substring test; an unparseable URL
    /// only contributes its pharmacy name.
    pub fn route(&self, pharmacy_name: &str, product_url: &str) -> Option<&dyn SiteAdapter> {
        let name = pharmacy_name.to_lowercase();
        let host = Url::parse(product_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_lowercase))
            .unwrap_or_default();

        let index = self
            .tokens
            .iter()
            .find(|(token, _)| name.contains(token) || host.contains(token))
            .map(|(_, index)| *index)?;

        let adapter = self.adapters[index].as_ref();
        debug!(pharmacy = pharmacy_name, adapter = adapter.config().name, "Routed link");
        Some(adapter)
    }

    pub fn adapter_names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.config().name).collect()
    }
}

impl Default for AdapterDispatcher {
    fn default() -> Self {
        Self::with_default_adapters()
    }
}
