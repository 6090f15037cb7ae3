pub mod config;
pub mod coordinator;
pub mod paths;
pub mod resolution_log;
pub mod resolver;
pub mod richtext;
pub mod uri;

pub use config::{
    ConfigError, LinkResolverConfig, ResolverEndpointOptions, RetryOptions, RichTextOptions,
    UrlOptions,
};
pub use coordinator::{
    BatchLinkCoordinator, FlushSummary, LinkContext, LinkDescriptor, MultipleLinksDescriptor,
};
pub use paths::post_process_url;
pub use resolution_log::{
    default_resolution_log_path, init_resolution_logging, resolution_logger, ResolutionLogEntry,
    ResolutionLogger, ResolutionMetrics, ResolutionOutcome,
};
pub use resolver::{
    BatchResults, HttpLinkResolver, LinkBatch, LinkRequest, LinkResolver, LinkSubscription,
    ResolverError, StaticLinkResolver,
};
pub use richtext::{
    LinkMarkupScanner, RegexMarkupScanner, ResolvedLinkLookup, RichText, RichTextFragment,
    RichTextLinkProcessor,
};
pub use uri::{ItemUri, LinkType, UriError};
