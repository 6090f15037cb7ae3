//! The external link resolution capability.
//!
//! Resolution always goes through a [`LinkBatch`]: requests are added one by
//! one, each returning a [`LinkSubscription`], and the whole batch is executed
//! in a single round trip.

pub mod http;
pub mod memory;
pub mod retry;

use crate::uri::LinkType;
use serde::Serialize;
use std::future::Future;
use thiserror::Error;

pub use http::HttpLinkResolver;
pub use memory::StaticLinkResolver;

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("link resolver returned HTTP {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("link resolver request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("link resolver sent an invalid response: {0}")]
    InvalidResponse(String),
    #[error("link resolver returned {actual} results for {expected} requests")]
    ResultCountMismatch { expected: usize, actual: usize },
    #[error("link resolver {0} is unavailable")]
    Unavailable(String),
}

/// One link to resolve, with the context it is rendered in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRequest {
    pub uri: String,
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub publication_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<u32>,
    pub resolve_to_shortest: bool,
}

impl LinkRequest {
    pub fn new(uri: impl Into<String>, link_type: LinkType, publication_id: u32) -> Self {
        Self {
            uri: uri.into(),
            link_type,
            publication_id,
            page_id: None,
            template_id: None,
            resolve_to_shortest: false,
        }
    }

    pub fn with_link_type(&self, link_type: LinkType) -> Self {
        Self {
            link_type,
            ..self.clone()
        }
    }
}

/// Handle to one request's result inside a [`LinkBatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkSubscription(usize);

#[derive(Debug, Clone, Default)]
pub struct LinkBatch {
    requests: Vec<LinkRequest>,
}

impl LinkBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, request: LinkRequest) -> LinkSubscription {
        self.requests.push(request);
        LinkSubscription(self.requests.len() - 1)
    }

    pub fn requests(&self) -> &[LinkRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// Results of an executed batch, positionally aligned with its requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResults {
    urls: Vec<Option<String>>,
}

impl BatchResults {
    pub fn new(urls: Vec<Option<String>>) -> Self {
        Self { urls }
    }

    /// The resolved URL; `None` when the item could not be resolved.
    pub fn get(&self, subscription: LinkSubscription) -> Option<&str> {
        self.urls
            .get(subscription.0)
            .and_then(Option::as_deref)
            .filter(|url| !url.is_empty())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// A channel to the link resolution service.
///
/// A resolver is shared between requests; it holds no per-request state.
/// Timeouts and retries are the channel's own concern.
pub trait LinkResolver: Send + Sync {
    fn name(&self) -> &'static str;

    fn execute(
        &self,
        batch: &LinkBatch,
    ) -> impl Future<Output = Result<BatchResults, ResolverError>> + Send;
}
