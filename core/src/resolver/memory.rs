use super::{BatchResults, LinkBatch, LinkRequest, LinkResolver, ResolverError};
use crate::uri::LinkType;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Resolves links from a fixed in-memory table.
///
/// Typed entries win over entries registered for any link type.
#[derive(Debug, Default)]
pub struct StaticLinkResolver {
    links: HashMap<String, String>,
    typed_links: HashMap<(String, LinkType), String>,
    unavailable: AtomicBool,
    batches: AtomicUsize,
    requests: AtomicUsize,
}

impl StaticLinkResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_link(mut self, uri: impl Into<String>, url: impl Into<String>) -> Self {
        self.links.insert(uri.into(), url.into());
        self
    }

    pub fn with_typed_link(
        mut self,
        uri: impl Into<String>,
        link_type: LinkType,
        url: impl Into<String>,
    ) -> Self {
        self.typed_links.insert((uri.into(), link_type), url.into());
        self
    }

    /// Makes every following batch fail as if the channel were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn batches_executed(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }

    pub fn requests_received(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn lookup(&self, request: &LinkRequest) -> Option<String> {
        self.typed_links
            .get(&(request.uri.clone(), request.link_type))
            .or_else(|| self.links.get(&request.uri))
            .cloned()
    }
}

impl LinkResolver for StaticLinkResolver {
    fn name(&self) -> &'static str {
        "static"
    }

    fn execute(
        &self,
        batch: &LinkBatch,
    ) -> impl Future<Output = Result<BatchResults, ResolverError>> + Send {
        let outcome = if self.unavailable.load(Ordering::SeqCst) {
            Err(ResolverError::Unavailable(self.name().to_string()))
        } else {
            self.batches.fetch_add(1, Ordering::SeqCst);
            self.requests.fetch_add(batch.len(), Ordering::SeqCst);
            Ok(BatchResults::new(
                batch.requests().iter().map(|request| self.lookup(request)).collect(),
            ))
        };

        async move { outcome }
    }
}
