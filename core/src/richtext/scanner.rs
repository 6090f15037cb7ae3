//! Pattern matching over rich-text fragments.
//!
//! Fragments are not parsed as HTML. Link starts and link ends are located by
//! independent patterns so that a link split across fragments can still be
//! handled one half at a time.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::ops::Range;

// <a ... href="tcm:15-980" ...>, attribute must be a plain `href`
static LINK_START_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<a(?:\s+[^<>]*?)?\s+href="(?P<uri>[A-Za-z][A-Za-z0-9]*:\d+-\d+)"[^<>]*>"#,
    )
    .expect("valid link start regex")
});

// </a><!--CompLink tcm:15-980-->, closing tag optional when it sits in another fragment
static LINK_END_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<close></a>)?<!--CompLink (?P<uri>[A-Za-z][A-Za-z0-9]*:\d+-\d+)-->")
        .expect("valid link end regex")
});

static TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^<>!/][^<>]*>").expect("valid tag regex"));

// xmlns="..." and xmlns:prefix="..." declarations
static XMLNS_ATTR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\s+xmlns(?::[\w.-]+)?\s*=\s*"[^"]*""#).expect("valid xmlns attribute regex")
});

static XLINK_ATTR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\s+xlink:(?P<name>[\w.-]+)\s*=\s*"(?P<value>[^"]*)""#)
        .expect("valid xlink attribute regex")
});

static NAMESPACED_HREF_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\s(?:xmlns|xlink):href\s*=\s*"(?P<value>[^"]*)""#)
        .expect("valid namespaced href regex")
});

static PLAIN_HREF_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\shref\s*=").expect("valid plain href regex"));

// quoted values are matched first so their whitespace is never collapsed
static TAG_WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""[^"]*"|\s{2,}"#).expect("valid whitespace regex"));

static SPACE_BEFORE_CLOSE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+/?>$").expect("valid tag close regex"));

/// An anchor start tag whose `href` is an item identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStart {
    /// Byte range of the whole `<a ...>` tag
    pub span: Range<usize>,
    /// Byte range of the identifier inside the `href` value
    pub uri: Range<usize>,
}

/// A marker comment, with the closing tag in front of it when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEnd {
    pub span: Range<usize>,
    pub uri: Range<usize>,
    pub has_closing_tag: bool,
}

impl LinkStart {
    pub fn uri<'t>(&self, fragment: &'t str) -> &'t str {
        &fragment[self.uri.clone()]
    }
}

impl LinkEnd {
    pub fn uri<'t>(&self, fragment: &'t str) -> &'t str {
        &fragment[self.uri.clone()]
    }
}

/// Locates link markup in a single fragment.
///
/// Implementations must be stateless; everything carried between fragments
/// is owned by the caller.
pub trait LinkMarkupScanner: Send + Sync {
    /// Anchor start tags in left-to-right order.
    fn link_starts(&self, fragment: &str) -> Vec<LinkStart>;

    /// Marker comments in left-to-right order.
    fn link_ends(&self, fragment: &str) -> Vec<LinkEnd>;

    /// Removes namespace declarations and `xlink:` prefixes from tags.
    fn drop_namespaces<'t>(&self, fragment: &'t str) -> Cow<'t, str>;

    /// Adds a plain `href` next to a namespaced one when the tag has none.
    fn generate_href<'t>(&self, fragment: &'t str) -> Cow<'t, str>;

    /// Collapses whitespace runs between attributes and removes it before `>`.
    /// Quoted attribute values are left as they are.
    fn tidy_tag<'t>(&self, tag: &'t str) -> Cow<'t, str>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegexMarkupScanner;

impl RegexMarkupScanner {
    pub fn new() -> Self {
        Self
    }
}

fn has_namespace_markup(text: &str) -> bool {
    text.contains("xmlns") || text.contains("xlink:")
}

impl LinkMarkupScanner for RegexMarkupScanner {
    fn link_starts(&self, fragment: &str) -> Vec<LinkStart> {
        if !fragment.contains("<a") {
            return Vec::new();
        }

        LINK_START_REGEX
            .captures_iter(fragment)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let uri = caps.name("uri")?;
                Some(LinkStart {
                    span: whole.range(),
                    uri: uri.range(),
                })
            })
            .collect()
    }

    fn link_ends(&self, fragment: &str) -> Vec<LinkEnd> {
        if !fragment.contains("<!--CompLink") {
            return Vec::new();
        }

        LINK_END_REGEX
            .captures_iter(fragment)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let uri = caps.name("uri")?;
                Some(LinkEnd {
                    span: whole.range(),
                    uri: uri.range(),
                    has_closing_tag: caps.name("close").is_some(),
                })
            })
            .collect()
    }

    fn drop_namespaces<'t>(&self, fragment: &'t str) -> Cow<'t, str> {
        if !has_namespace_markup(fragment) {
            return Cow::Borrowed(fragment);
        }

        TAG_REGEX.replace_all(fragment, |caps: &Captures| {
            let tag = &caps[0];
            if !has_namespace_markup(tag) {
                return tag.to_string();
            }

            let has_plain_href = PLAIN_HREF_REGEX.is_match(tag);
            let without_xmlns = XMLNS_ATTR_REGEX.replace_all(tag, "");
            let without_prefix = XLINK_ATTR_REGEX.replace_all(&without_xmlns, |attr: &Captures| {
                let name = &attr["name"];
                if name == "href" && has_plain_href {
                    String::new()
                } else {
                    format!(" {}=\"{}\"", name, &attr["value"])
                }
            });
            self.tidy_tag(&without_prefix).into_owned()
        })
    }

    fn generate_href<'t>(&self, fragment: &'t str) -> Cow<'t, str> {
        if !fragment.contains(":href") {
            return Cow::Borrowed(fragment);
        }

        TAG_REGEX.replace_all(fragment, |caps: &Captures| {
            let tag = &caps[0];
            if PLAIN_HREF_REGEX.is_match(tag) {
                return tag.to_string();
            }

            match NAMESPACED_HREF_REGEX.captures(tag) {
                Some(href) => {
                    let attr = href.get(0).map(|m| m.end()).unwrap_or(0);
                    format!(
                        "{} href=\"{}\"{}",
                        &tag[..attr],
                        &href["value"],
                        &tag[attr..]
                    )
                }
                None => tag.to_string(),
            }
        })
    }

    fn tidy_tag<'t>(&self, tag: &'t str) -> Cow<'t, str> {
        let has_loose_whitespace = TAG_WHITESPACE_REGEX
            .find_iter(tag)
            .any(|run| !run.as_str().starts_with('"'));
        let collapsed = if has_loose_whitespace {
            TAG_WHITESPACE_REGEX.replace_all(tag, |caps: &Captures| {
                let run = &caps[0];
                if run.starts_with('"') {
                    run.to_string()
                } else {
                    " ".to_string()
                }
            })
        } else {
            Cow::Borrowed(tag)
        };
        let trimmed = SPACE_BEFORE_CLOSE_REGEX.find(&collapsed).map(|ws| {
            format!(
                "{}{}",
                &collapsed[..ws.start()],
                collapsed[ws.start()..].trim_start()
            )
        });

        match trimmed {
            Some(tidied) => Cow::Owned(tidied),
            None => collapsed,
        }
    }
}
