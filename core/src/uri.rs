//! Content item identifiers (`tcm:15-980`, `tcm:15-980-64`) and link types
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Item type number the broker uses for pages
pub const PAGE_ITEM_TYPE: u32 = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UriError {
    #[error("identifier has no namespace: {0}")]
    MissingNamespace(String),
    #[error("identifier has {1} numeric parts, expected 2 or 3: {0}")]
    PartCount(String, usize),
    #[error("identifier part is not a number: {0}")]
    InvalidNumber(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemUri {
    pub namespace: String,
    pub publication_id: u32,
    pub item_id: u32,
    pub item_type: Option<u32>,
}

impl ItemUri {
    pub fn new(namespace: impl Into<String>, publication_id: u32, item_id: u32) -> Self {
        Self {
            namespace: namespace.into(),
            publication_id,
            item_id,
            item_type: None,
        }
    }

    pub fn with_item_type(mut self, item_type: u32) -> Self {
        self.item_type = Some(item_type);
        self
    }

    /// Link type implied by the item type, if the identifier carries one
    pub fn link_type(&self) -> LinkType {
        self.item_type
            .map(LinkType::from_item_type)
            .unwrap_or(LinkType::Component)
    }
}

impl FromStr for ItemUri {
    type Err = UriError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (namespace, rest) = value
            .split_once(':')
            .filter(|(namespace, _)| !namespace.is_empty())
            .ok_or_else(|| UriError::MissingNamespace(value.to_string()))?;

        let parts = rest
            .split('-')
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| UriError::InvalidNumber(value.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match parts.as_slice() {
            [publication_id, item_id] => Ok(Self::new(namespace, *publication_id, *item_id)),
            [publication_id, item_id, item_type] => {
                Ok(Self::new(namespace, *publication_id, *item_id).with_item_type(*item_type))
            }
            _ => Err(UriError::PartCount(value.to_string(), parts.len())),
        }
    }
}

impl fmt::Display for ItemUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.namespace, self.publication_id, self.item_id)?;
        if let Some(item_type) = self.item_type {
            write!(f, "-{item_type}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum LinkType {
    Page,
    Component,
    DynamicComponent,
    Binary,
}

impl LinkType {
    pub fn from_item_type(item_type: u32) -> Self {
        match item_type {
            PAGE_ITEM_TYPE => LinkType::Page,
            _ => LinkType::Component,
        }
    }

    /// The more general type to retry with once this one fails to resolve
    pub fn fallback(self) -> Option<LinkType> {
        match self {
            LinkType::DynamicComponent | LinkType::Binary => Some(LinkType::Component),
            LinkType::Page | LinkType::Component => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Page => "page",
            LinkType::Component => "component",
            LinkType::DynamicComponent => "dynamicComponent",
            LinkType::Binary => "binary",
        }
    }
}
