//! Link resolution inside rich-text fragments.
//!
//! Processing a rich-text value happens in two passes over the same fragments:
//! [`RichTextLinkProcessor::discover_links`] collects identifiers, the caller
//! resolves them, then [`RichTextLinkProcessor::process_fragment`] rewrites each
//! fragment in order. An anchor start and its marker comment may sit in
//! different fragments, so the caller threads one not-resolved set through all
//! fragments of a value.

pub mod model;
pub mod scanner;

use crate::config::RichTextOptions;
use log::debug;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::BuildHasher;

pub use model::{RichText, RichTextFragment};
pub use scanner::{LinkEnd, LinkMarkupScanner, LinkStart, RegexMarkupScanner};

/// Read-only view of resolved links.
///
/// `None` means the identifier is known to be unresolvable; an empty URL is
/// treated the same way.
pub trait ResolvedLinkLookup {
    fn resolved_url(&self, uri: &str) -> Option<&str>;
}

impl<S: BuildHasher> ResolvedLinkLookup for HashMap<String, String, S> {
    fn resolved_url(&self, uri: &str) -> Option<&str> {
        self.get(uri).map(String::as_str).filter(|url| !url.is_empty())
    }
}

impl<S: BuildHasher> ResolvedLinkLookup for HashMap<String, Option<String>, S> {
    fn resolved_url(&self, uri: &str) -> Option<&str> {
        self.get(uri)
            .and_then(Option::as_deref)
            .filter(|url| !url.is_empty())
    }
}

impl ResolvedLinkLookup for BTreeMap<String, String> {
    fn resolved_url(&self, uri: &str) -> Option<&str> {
        self.get(uri).map(String::as_str).filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RichTextLinkProcessor<S = RegexMarkupScanner> {
    options: RichTextOptions,
    scanner: S,
}

impl RichTextLinkProcessor<RegexMarkupScanner> {
    pub fn new(options: RichTextOptions) -> Self {
        Self::with_scanner(options, RegexMarkupScanner::new())
    }
}

impl<S: LinkMarkupScanner> RichTextLinkProcessor<S> {
    pub fn with_scanner(options: RichTextOptions, scanner: S) -> Self {
        Self { options, scanner }
    }

    pub fn options(&self) -> RichTextOptions {
        self.options
    }

    /// Identifiers of all link starts in the fragment, in order, duplicates included.
    pub fn discover_links(&self, fragment: &str) -> Vec<String> {
        if !self.options.resolve {
            return Vec::new();
        }

        let normalized = self.normalize_namespaces(fragment);
        self.scanner
            .link_starts(&normalized)
            .iter()
            .map(|start| start.uri(&normalized).to_string())
            .collect()
    }

    /// Rewrites one fragment against the resolved table.
    ///
    /// Unresolved anchors are removed and their identifiers recorded in
    /// `not_resolved`; a marker comment whose identifier is in the set also
    /// takes the closing tag in front of it. Already rewritten text contains
    /// no identifiers, so running this twice leaves the output unchanged.
    pub fn process_fragment<L>(
        &self,
        fragment: &str,
        resolved: &L,
        not_resolved: &mut HashSet<String>,
    ) -> String
    where
        L: ResolvedLinkLookup + ?Sized,
    {
        if !self.options.resolve {
            return fragment.to_string();
        }

        let normalized = self.normalize_namespaces(fragment);
        let with_starts = self.resolve_link_starts(&normalized, resolved, not_resolved);
        let with_ends = self.resolve_link_ends(&with_starts, not_resolved);
        with_ends.into_owned()
    }

    pub fn discover_rich_text_links(&self, rich_text: &RichText) -> Vec<String> {
        rich_text
            .text_fragments()
            .flat_map(|fragment| self.discover_links(fragment))
            .collect()
    }

    /// Rewrites every text fragment of a rich-text value in order.
    pub fn process_rich_text<L>(
        &self,
        rich_text: &mut RichText,
        resolved: &L,
        not_resolved: &mut HashSet<String>,
    ) where
        L: ResolvedLinkLookup + ?Sized,
    {
        if !self.options.resolve {
            return;
        }

        for fragment in rich_text.text_fragments_mut() {
            let processed = self.process_fragment(fragment, resolved, not_resolved);
            *fragment = processed;
        }
    }

    fn normalize_namespaces<'t>(&self, fragment: &'t str) -> Cow<'t, str> {
        if self.options.xmlns_remove {
            self.scanner.drop_namespaces(fragment)
        } else {
            self.scanner.generate_href(fragment)
        }
    }

    fn resolve_link_starts<'t, L>(
        &self,
        text: &'t str,
        resolved: &L,
        not_resolved: &mut HashSet<String>,
    ) -> Cow<'t, str>
    where
        L: ResolvedLinkLookup + ?Sized,
    {
        let starts = self.scanner.link_starts(text);
        if starts.is_empty() {
            return Cow::Borrowed(text);
        }

        let mut output = String::with_capacity(text.len());
        let mut cursor = 0usize;
        for start in &starts {
            output.push_str(&text[cursor..start.span.start]);

            let uri = start.uri(text);
            match resolved.resolved_url(uri) {
                Some(url) => {
                    let tag = format!(
                        "{}{}{}",
                        &text[start.span.start..start.uri.start],
                        url,
                        &text[start.uri.end..start.span.end]
                    );
                    output.push_str(&self.scanner.tidy_tag(&tag));
                }
                None => {
                    debug!("suppressing link to unresolved item {uri}");
                    if !not_resolved.contains(uri) {
                        not_resolved.insert(uri.to_string());
                    }
                }
            }
            cursor = start.span.end;
        }
        output.push_str(&text[cursor..]);

        Cow::Owned(output)
    }

    fn resolve_link_ends<'t>(&self, text: &'t str, not_resolved: &HashSet<String>) -> Cow<'t, str> {
        let ends = self.scanner.link_ends(text);
        if ends.is_empty() {
            return Cow::Borrowed(text);
        }

        let mut output = String::with_capacity(text.len());
        let mut cursor = 0usize;
        for end in &ends {
            output.push_str(&text[cursor..end.span.start]);
            if end.has_closing_tag && !not_resolved.contains(end.uri(text)) {
                output.push_str("</a>");
            }
            cursor = end.span.end;
        }
        output.push_str(&text[cursor..]);

        Cow::Owned(output)
    }
}
