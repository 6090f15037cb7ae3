//! Per-request batching of link resolutions.
//!
//! A [`BatchLinkCoordinator`] collects every link a page or entity needs,
//! resolves them in one batch against the injected [`LinkResolver`], and then
//! hands each result to the update callback registered with it. Create one
//! coordinator per request; it owns the pending callbacks and must not be
//! shared.

use crate::config::LinkResolverConfig;
use crate::paths::post_process_url;
use crate::resolution_log::{
    resolution_logger, ResolutionLogEntry, ResolutionLogger, ResolutionOutcome,
};
use crate::resolver::{LinkBatch, LinkRequest, LinkResolver, ResolverError};
use crate::richtext::{RichText, RichTextLinkProcessor};
use crate::uri::{ItemUri, LinkType};
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Receives the resolved URL, or an empty string when the link is unresolved.
pub type LinkUpdate<'a> = Box<dyn FnOnce(&str) + 'a>;

/// Receives the resolved table of a group and the set collecting its unresolved identifiers.
pub type GroupUpdate<'a> = Box<dyn FnOnce(&HashMap<String, String>, &mut HashSet<String>) + 'a>;

/// Where a link is rendered. Page and template ids let the resolver pick
/// the right target for the same item on different pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LinkContext {
    pub publication_id: u32,
    pub page_id: Option<u32>,
    pub template_id: Option<u32>,
    pub resolve_to_shortest: bool,
}

impl LinkContext {
    pub fn new(publication_id: u32) -> Self {
        Self {
            publication_id,
            ..Default::default()
        }
    }

    pub fn on_page(mut self, page_id: u32, template_id: Option<u32>) -> Self {
        self.page_id = Some(page_id);
        self.template_id = template_id;
        self
    }

    fn request(&self, uri: &str, link_type: LinkType) -> LinkRequest {
        LinkRequest {
            page_id: self.page_id,
            template_id: self.template_id,
            resolve_to_shortest: self.resolve_to_shortest,
            ..LinkRequest::new(uri, link_type, self.publication_id)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDescriptor {
    pub uri: String,
    pub link_type: LinkType,
    pub context: LinkContext,
}

impl LinkDescriptor {
    pub fn new(uri: impl Into<String>, link_type: LinkType, context: LinkContext) -> Self {
        Self {
            uri: uri.into(),
            link_type,
            context,
        }
    }
}

/// All links discovered in one rich-text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipleLinksDescriptor {
    pub uris: Vec<String>,
    pub link_type: LinkType,
    pub context: LinkContext,
}

impl MultipleLinksDescriptor {
    pub fn new(uris: Vec<String>, context: LinkContext) -> Self {
        Self {
            uris,
            link_type: LinkType::Component,
            context,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushSummary {
    /// Distinct requests sent in the main batch
    pub requests: usize,
    pub resolved: usize,
    pub unresolved: usize,
    /// Requests retried with a fallback link type
    pub fallbacks: usize,
}

struct PendingLink<'a> {
    request: LinkRequest,
    updates: Vec<LinkUpdate<'a>>,
}

struct PendingGroup<'a> {
    links: Vec<(String, LinkRequest)>,
    apply: GroupUpdate<'a>,
}

pub struct BatchLinkCoordinator<'a, R: LinkResolver> {
    resolver: Arc<R>,
    config: Arc<LinkResolverConfig>,
    processor: RichTextLinkProcessor,
    logger: Arc<ResolutionLogger>,
    pending: Vec<PendingLink<'a>>,
    index: HashMap<LinkRequest, usize>,
    groups: Vec<PendingGroup<'a>>,
    rejected: Vec<LinkUpdate<'a>>,
}

impl<'a, R: LinkResolver> BatchLinkCoordinator<'a, R> {
    pub fn new(resolver: Arc<R>, config: Arc<LinkResolverConfig>) -> Self {
        let processor = RichTextLinkProcessor::new(config.rich_text_options());
        Self {
            resolver,
            config,
            processor,
            logger: resolution_logger(),
            pending: Vec::new(),
            index: HashMap::new(),
            groups: Vec::new(),
            rejected: Vec::new(),
        }
    }

    pub fn with_logger(mut self, logger: Arc<ResolutionLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn processor(&self) -> &RichTextLinkProcessor {
        &self.processor
    }

    /// Distinct requests waiting for the next flush
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.groups.is_empty() && self.rejected.is_empty()
    }

    /// Registers one link. Nothing is sent until [`Self::resolve_and_flush`].
    ///
    /// Identical requests share one batch entry; every registered update
    /// receives the same result.
    pub fn dispatch_link_resolution<F>(&mut self, descriptor: LinkDescriptor, update: F)
    where
        F: FnOnce(&str) + 'a,
    {
        if let Err(error) = descriptor.uri.parse::<ItemUri>() {
            debug!("not resolving link with invalid identifier: {error}");
            self.rejected.push(Box::new(update));
            return;
        }

        let request = descriptor
            .context
            .request(&descriptor.uri, descriptor.link_type);
        let slot = self.register(request);
        self.pending[slot].updates.push(Box::new(update));
    }

    /// Registers all links of one rich-text value as a group.
    ///
    /// After the flush, `apply` receives an identifier → URL table holding
    /// every identifier of the group (empty URL when unresolved). Bypassed
    /// entirely when rich-text resolution is disabled.
    pub fn dispatch_multiple_links_resolution<F>(
        &mut self,
        descriptor: MultipleLinksDescriptor,
        apply: F,
    ) where
        F: FnOnce(&HashMap<String, String>, &mut HashSet<String>) + 'a,
    {
        if !self.config.rich_text_resolve {
            return;
        }

        let mut seen = HashSet::new();
        let mut links = Vec::new();
        for uri in descriptor.uris {
            if !seen.insert(uri.clone()) {
                continue;
            }
            let request = descriptor.context.request(&uri, descriptor.link_type);
            match uri.parse::<ItemUri>() {
                Ok(_) => {
                    self.register(request.clone());
                }
                Err(error) => debug!("not resolving link with invalid identifier: {error}"),
            }
            links.push((uri, request));
        }

        self.groups.push(PendingGroup {
            links,
            apply: Box::new(apply),
        });
    }

    /// Discovers the links of a rich-text value and rewrites its fragments
    /// once the batch has been resolved.
    pub fn dispatch_rich_text(&mut self, rich_text: &'a mut RichText, context: LinkContext) {
        if !self.config.rich_text_resolve {
            return;
        }

        let uris = self.processor.discover_rich_text_links(rich_text);
        let processor = self.processor.clone();
        self.dispatch_multiple_links_resolution(
            MultipleLinksDescriptor::new(uris, context),
            move |resolved, not_resolved| {
                processor.process_rich_text(rich_text, resolved, not_resolved)
            },
        );
    }

    /// Resolves everything dispatched so far and runs all update callbacks.
    ///
    /// Unresolved links reach their callbacks as empty strings. A channel
    /// failure is returned as is; pending state is discarded either way.
    ///
    /// Identifiers a group could not resolve are added to `not_resolved`
    /// once that group has been rewritten.
    pub async fn resolve_and_flush(
        &mut self,
        not_resolved: &mut HashSet<String>,
    ) -> Result<FlushSummary, ResolverError> {
        let pending = std::mem::take(&mut self.pending);
        let index = std::mem::take(&mut self.index);
        let groups = std::mem::take(&mut self.groups);
        let rejected = std::mem::take(&mut self.rejected);

        let mut summary = FlushSummary {
            requests: pending.len(),
            ..Default::default()
        };

        let mut batch = LinkBatch::new();
        let subscriptions: Vec<_> = pending
            .iter()
            .map(|link| batch.add(link.request.clone()))
            .collect();

        let mut urls: Vec<Option<String>> = if batch.is_empty() {
            Vec::new()
        } else {
            let results = self.resolver.execute(&batch).await?;
            self.logger.log_batch();
            subscriptions
                .iter()
                .map(|subscription| results.get(*subscription).map(str::to_owned))
                .collect()
        };

        let fell_back = if self.config.link_type_fallback {
            self.resolve_fallbacks(&pending, &index, &mut urls).await?
        } else {
            HashSet::new()
        };
        summary.fallbacks = fell_back.len();

        let url_options = self.config.url_options();
        let urls: Vec<String> = urls
            .into_iter()
            .map(|url| {
                url.map(|url| post_process_url(&url, url_options))
                    .unwrap_or_default()
            })
            .collect();

        for (slot, (link, url)) in pending.iter().zip(&urls).enumerate() {
            let outcome = match (url.is_empty(), fell_back.contains(&slot)) {
                (true, true) => {
                    self.logger.log_failed_fallback();
                    ResolutionOutcome::Unresolved
                }
                (true, false) => ResolutionOutcome::Unresolved,
                (false, true) => ResolutionOutcome::ResolvedByFallback,
                (false, false) => ResolutionOutcome::Resolved,
            };
            if outcome == ResolutionOutcome::Unresolved {
                summary.unresolved += 1;
            } else {
                summary.resolved += 1;
            }
            self.logger.log_outcome(&ResolutionLogEntry::new(
                link.request.uri.clone(),
                link.request.link_type,
                link.request.publication_id,
                outcome,
            ));
        }

        for (link, url) in pending.into_iter().zip(&urls) {
            for update in link.updates {
                update(url);
            }
        }

        for group in groups {
            let table: HashMap<String, String> = group
                .links
                .into_iter()
                .map(|(uri, request)| {
                    let url = index
                        .get(&request)
                        .and_then(|slot| urls.get(*slot))
                        .cloned()
                        .unwrap_or_default();
                    (uri, url)
                })
                .collect();
            // the same identifier may resolve on one page and not on another
            let mut group_not_resolved = HashSet::new();
            (group.apply)(&table, &mut group_not_resolved);
            not_resolved.extend(group_not_resolved);
        }

        for update in rejected {
            update("");
        }

        info!(
            "link resolution flushed via {}: {} requests, {} resolved, {} unresolved, {} fallbacks",
            self.resolver.name(),
            summary.requests,
            summary.resolved,
            summary.unresolved,
            summary.fallbacks
        );

        Ok(summary)
    }

    fn register(&mut self, request: LinkRequest) -> usize {
        if let Some(slot) = self.index.get(&request) {
            return *slot;
        }

        let slot = self.pending.len();
        self.index.insert(request.clone(), slot);
        self.pending.push(PendingLink {
            request,
            updates: Vec::new(),
        });
        slot
    }

    /// Retries unresolved requests once with their fallback link type.
    ///
    /// Returns the slots that were retried. A fallback request that is
    /// already part of the main batch reuses that result instead.
    async fn resolve_fallbacks(
        &self,
        pending: &[PendingLink<'a>],
        index: &HashMap<LinkRequest, usize>,
        urls: &mut [Option<String>],
    ) -> Result<HashSet<usize>, ResolverError> {
        let mut retried = HashSet::new();
        let mut batch = LinkBatch::new();
        let mut subscriptions = Vec::new();

        for (slot, link) in pending.iter().enumerate() {
            if urls.get(slot).map_or(true, Option::is_some) {
                continue;
            }
            let Some(fallback_type) = link.request.link_type.fallback() else {
                continue;
            };

            retried.insert(slot);
            let fallback = link.request.with_link_type(fallback_type);
            match index.get(&fallback) {
                Some(existing) => {
                    let url = urls.get(*existing).cloned().flatten();
                    urls[slot] = url;
                }
                None => subscriptions.push((slot, batch.add(fallback))),
            }
        }

        if batch.is_empty() {
            return Ok(retried);
        }

        debug!("retrying {} unresolved links with fallback link types", batch.len());
        let results = self.resolver.execute(&batch).await?;
        self.logger.log_batch();
        for (slot, subscription) in subscriptions {
            urls[slot] = results.get(subscription).map(str::to_owned);
        }

        Ok(retried)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{BatchResults, StaticLinkResolver};
    use std::cell::RefCell;
    use std::future::Future;

    /// Resolves every link, but only when it is rendered on one page.
    struct SinglePageResolver {
        page_id: u32,
    }

    impl LinkResolver for SinglePageResolver {
        fn name(&self) -> &'static str {
            "single-page"
        }

        fn execute(
            &self,
            batch: &LinkBatch,
        ) -> impl Future<Output = Result<BatchResults, ResolverError>> + Send {
            let urls = batch
                .requests()
                .iter()
                .map(|request| {
                    (request.page_id == Some(self.page_id))
                        .then(|| format!("/on-{}", self.page_id))
                })
                .collect();
            async move { Ok(BatchResults::new(urls)) }
        }
    }

    fn config() -> Arc<LinkResolverConfig> {
        Arc::new(LinkResolverConfig::default())
    }

    fn coordinator<'a>(
        resolver: &Arc<StaticLinkResolver>,
        config: Arc<LinkResolverConfig>,
    ) -> BatchLinkCoordinator<'a, StaticLinkResolver> {
        BatchLinkCoordinator::new(Arc::clone(resolver), config)
            .with_logger(Arc::new(ResolutionLogger::new()))
    }

    #[test]
    fn resolves_multiple_descriptors_in_one_batch() {
        let resolver = Arc::new(
            StaticLinkResolver::new()
                .with_link("tcm:1-2", "/articles/two.html")
                .with_link("tcm:1-3", "/about/index.html"),
        );
        let context = LinkContext::new(1);
        let (mut two, mut three, mut missing) = (String::new(), String::new(), String::from("x"));

        let mut coordinator = coordinator(&resolver, config());
        coordinator.dispatch_link_resolution(
            LinkDescriptor::new("tcm:1-3", LinkType::Page, context),
            |url| three = url.to_string(),
        );
        coordinator.dispatch_link_resolution(
            LinkDescriptor::new("tcm:1-9", LinkType::Component, context),
            |url| missing = url.to_string(),
        );
        coordinator.dispatch_link_resolution(
            LinkDescriptor::new("tcm:1-2", LinkType::Component, context),
            |url| two = url.to_string(),
        );
        assert_eq!(coordinator.pending_requests(), 3);
        assert_eq!(resolver.batches_executed(), 0);

        let mut not_resolved = HashSet::new();
        let summary =
            tokio_test::block_on(coordinator.resolve_and_flush(&mut not_resolved)).unwrap();
        assert!(coordinator.is_idle());
        drop(coordinator);

        assert_eq!(two, "/articles/two");
        assert_eq!(three, "/about");
        assert_eq!(missing, "");
        assert_eq!(resolver.batches_executed(), 1);
        assert_eq!(summary.resolved, 2);
        assert_eq!(summary.unresolved, 1);
    }

    #[test]
    fn identical_requests_share_one_entry() {
        let resolver = Arc::new(StaticLinkResolver::new().with_link("tcm:1-2", "/two"));
        let seen = RefCell::new(Vec::new());
        let context = LinkContext::new(1).on_page(65, Some(7));

        let mut coordinator = coordinator(&resolver, config());
        for _ in 0..3 {
            coordinator.dispatch_link_resolution(
                LinkDescriptor::new("tcm:1-2", LinkType::Component, context),
                |url| seen.borrow_mut().push(url.to_string()),
            );
        }
        // a different page context is a different request
        coordinator.dispatch_link_resolution(
            LinkDescriptor::new(
                "tcm:1-2",
                LinkType::Component,
                LinkContext::new(1).on_page(66, None),
            ),
            |url| seen.borrow_mut().push(url.to_string()),
        );
        assert_eq!(coordinator.pending_requests(), 2);

        let mut not_resolved = HashSet::new();
        tokio_test::block_on(coordinator.resolve_and_flush(&mut not_resolved)).unwrap();
        drop(coordinator);

        assert_eq!(resolver.requests_received(), 2);
        assert_eq!(seen.into_inner(), vec!["/two"; 4]);
    }

    #[test]
    fn rich_text_group_rewrites_split_fragments() {
        let resolver = Arc::new(StaticLinkResolver::new().with_link("tcm:1-3", "/three.html"));
        let mut first = RichText::from_fragments([
            r#"<p><a href="tcm:1-2">"#,
            "gone</a><!--CompLink tcm:1-2--> ",
            r#"<a href="tcm:1-3">kept</a><!--CompLink tcm:1-3--></p>"#,
        ]);
        let mut second = RichText::from_fragments([
            r#"<a href="tcm:1-3">again</a><!--CompLink tcm:1-3-->"#,
        ]);

        let mut not_resolved = HashSet::new();
        let mut coordinator = coordinator(&resolver, config());
        coordinator.dispatch_rich_text(&mut first, LinkContext::new(1));
        coordinator.dispatch_rich_text(&mut second, LinkContext::new(1));
        assert_eq!(coordinator.pending_requests(), 2);

        tokio_test::block_on(coordinator.resolve_and_flush(&mut not_resolved)).unwrap();
        drop(coordinator);

        assert_eq!(resolver.batches_executed(), 1);
        assert_eq!(first.to_html(), r#"<p>gone <a href="/three">kept</a></p>"#);
        assert_eq!(second.to_html(), r#"<a href="/three">again</a>"#);
        assert!(not_resolved.contains("tcm:1-2"));
    }

    #[test]
    fn rich_text_outcomes_stay_per_page_context() {
        let resolver = Arc::new(SinglePageResolver { page_id: 66 });
        let fragment = r#"<a href="tcm:1-2">b</a><!--CompLink tcm:1-2-->"#;
        let mut on_65 = RichText::from_fragments([fragment]);
        let mut on_66 = RichText::from_fragments([fragment]);

        let mut not_resolved = HashSet::new();
        let mut coordinator = BatchLinkCoordinator::new(resolver, config())
            .with_logger(Arc::new(ResolutionLogger::new()));
        coordinator.dispatch_rich_text(&mut on_65, LinkContext::new(1).on_page(65, None));
        coordinator.dispatch_rich_text(&mut on_66, LinkContext::new(1).on_page(66, None));
        assert_eq!(coordinator.pending_requests(), 2);

        tokio_test::block_on(coordinator.resolve_and_flush(&mut not_resolved)).unwrap();
        drop(coordinator);

        assert_eq!(on_65.to_html(), "b");
        assert_eq!(on_66.to_html(), r#"<a href="/on-66">b</a>"#);
        // the page-wide set still reports the identifier
        assert!(not_resolved.contains("tcm:1-2"));
    }

    #[test]
    fn group_table_holds_every_identifier() {
        let resolver = Arc::new(StaticLinkResolver::new().with_link("tcm:1-2", "/two"));
        let table = RefCell::new(HashMap::new());

        let mut coordinator = coordinator(&resolver, config());
        coordinator.dispatch_multiple_links_resolution(
            MultipleLinksDescriptor::new(
                vec!["tcm:1-2".into(), "tcm:1-4".into(), "tcm:1-2".into(), "bogus".into()],
                LinkContext::new(1),
            ),
            |resolved, _| *table.borrow_mut() = resolved.clone(),
        );

        let mut not_resolved = HashSet::new();
        tokio_test::block_on(coordinator.resolve_and_flush(&mut not_resolved)).unwrap();
        drop(coordinator);

        let table = table.into_inner();
        assert_eq!(table.len(), 3);
        assert_eq!(table["tcm:1-2"], "/two");
        assert_eq!(table["tcm:1-4"], "");
        assert_eq!(table["bogus"], "");
        assert_eq!(resolver.requests_received(), 2);
    }

    #[test]
    fn disabled_rich_text_is_bypassed() {
        let resolver = Arc::new(StaticLinkResolver::new().with_link("tcm:1-2", "/two"));
        let config = Arc::new(LinkResolverConfig {
            rich_text_resolve: false,
            ..Default::default()
        });
        let original = r#"<a href="tcm:1-2">x</a><!--CompLink tcm:1-2-->"#;
        let mut rich_text = RichText::from_fragments([original]);

        let mut not_resolved = HashSet::new();
        let mut coordinator = coordinator(&resolver, config);
        coordinator.dispatch_rich_text(&mut rich_text, LinkContext::new(1));
        assert!(coordinator.is_idle());

        let summary =
            tokio_test::block_on(coordinator.resolve_and_flush(&mut not_resolved)).unwrap();
        drop(coordinator);

        assert_eq!(summary, FlushSummary::default());
        assert_eq!(resolver.batches_executed(), 0);
        assert_eq!(rich_text.to_html(), original);
    }

    #[test]
    fn falls_back_to_component_links() {
        let resolver = Arc::new(
            StaticLinkResolver::new()
                .with_typed_link("tcm:1-5", LinkType::Component, "/five")
                .with_typed_link("tcm:1-6", LinkType::Component, "/six"),
        );
        let context = LinkContext::new(1);
        let (mut dynamic, mut binary, mut component) =
            (String::new(), String::new(), String::new());
        let mut six_dynamic = String::new();
        let logger = Arc::new(ResolutionLogger::new());

        let mut coordinator = BatchLinkCoordinator::new(Arc::clone(&resolver), config())
            .with_logger(Arc::clone(&logger));
        coordinator.dispatch_link_resolution(
            LinkDescriptor::new("tcm:1-5", LinkType::DynamicComponent, context),
            |url| dynamic = url.to_string(),
        );
        coordinator.dispatch_link_resolution(
            LinkDescriptor::new("tcm:1-7", LinkType::Binary, context),
            |url| binary = url.to_string(),
        );
        // already in the main batch, reused by the dynamic fallback of tcm:1-6
        coordinator.dispatch_link_resolution(
            LinkDescriptor::new("tcm:1-6", LinkType::Component, context),
            |url| component = url.to_string(),
        );
        coordinator.dispatch_link_resolution(
            LinkDescriptor::new("tcm:1-6", LinkType::DynamicComponent, context),
            |url| six_dynamic = url.to_string(),
        );

        let mut not_resolved = HashSet::new();
        let summary =
            tokio_test::block_on(coordinator.resolve_and_flush(&mut not_resolved)).unwrap();
        drop(coordinator);

        assert_eq!(dynamic, "/five");
        assert_eq!(binary, "");
        assert_eq!(component, "/six");
        assert_eq!(six_dynamic, "/six");
        assert_eq!(summary.fallbacks, 3);
        assert_eq!(summary.resolved, 3);
        assert_eq!(summary.unresolved, 1);
        // main batch plus one fallback batch holding tcm:1-5 and tcm:1-7
        assert_eq!(resolver.batches_executed(), 2);
        assert_eq!(resolver.requests_received(), 6);

        let metrics = logger.get_metrics();
        assert_eq!(metrics.batches, 2);
        assert_eq!(metrics.fallback_attempts, 3);
        assert_eq!(metrics.fallback_successes, 2);
    }

    #[test]
    fn fallback_can_be_disabled() {
        let resolver = Arc::new(
            StaticLinkResolver::new().with_typed_link("tcm:1-5", LinkType::Component, "/five"),
        );
        let config = Arc::new(LinkResolverConfig {
            link_type_fallback: false,
            ..Default::default()
        });
        let mut dynamic = String::from("unset");

        let mut coordinator = coordinator(&resolver, config);
        coordinator.dispatch_link_resolution(
            LinkDescriptor::new("tcm:1-5", LinkType::DynamicComponent, LinkContext::new(1)),
            |url| dynamic = url.to_string(),
        );
        let mut not_resolved = HashSet::new();
        let summary =
            tokio_test::block_on(coordinator.resolve_and_flush(&mut not_resolved)).unwrap();
        drop(coordinator);

        assert_eq!(dynamic, "");
        assert_eq!(summary.fallbacks, 0);
        assert_eq!(resolver.batches_executed(), 1);
    }

    #[test]
    fn channel_failure_propagates_and_clears_state() {
        let resolver = Arc::new(StaticLinkResolver::new().with_link("tcm:1-2", "/two"));
        resolver.set_unavailable(true);
        let mut called = false;

        let mut coordinator = coordinator(&resolver, config());
        coordinator.dispatch_link_resolution(
            LinkDescriptor::new("tcm:1-2", LinkType::Component, LinkContext::new(1)),
            |_| called = true,
        );

        let mut not_resolved = HashSet::new();
        let result = tokio_test::block_on(coordinator.resolve_and_flush(&mut not_resolved));
        assert!(matches!(result, Err(ResolverError::Unavailable(_))));
        assert!(coordinator.is_idle());
        drop(coordinator);

        assert!(!called);
    }

    #[test]
    fn invalid_identifier_is_unresolved_without_request() {
        let resolver = Arc::new(StaticLinkResolver::new());
        let mut url = String::from("unset");

        let mut coordinator = coordinator(&resolver, config());
        coordinator.dispatch_link_resolution(
            LinkDescriptor::new("not-an-id", LinkType::Component, LinkContext::new(1)),
            |resolved| url = resolved.to_string(),
        );
        assert_eq!(coordinator.pending_requests(), 0);
        assert!(!coordinator.is_idle());

        let mut not_resolved = HashSet::new();
        tokio_test::block_on(coordinator.resolve_and_flush(&mut not_resolved)).unwrap();
        drop(coordinator);

        assert_eq!(url, "");
        assert_eq!(resolver.batches_executed(), 0);
    }

    #[test]
    fn coordinator_is_reusable_after_flush() {
        let resolver = Arc::new(StaticLinkResolver::new().with_link("tcm:1-2", "/two"));
        let results = RefCell::new(Vec::new());
        let mut not_resolved = HashSet::new();

        let mut coordinator = coordinator(&resolver, config());
        for _ in 0..2 {
            coordinator.dispatch_link_resolution(
                LinkDescriptor::new("tcm:1-2", LinkType::Component, LinkContext::new(1)),
                |url| results.borrow_mut().push(url.to_string()),
            );
            tokio_test::block_on(coordinator.resolve_and_flush(&mut not_resolved)).unwrap();
        }
        drop(coordinator);

        assert_eq!(resolver.batches_executed(), 2);
        assert_eq!(results.into_inner(), vec!["/two", "/two"]);
    }
}
