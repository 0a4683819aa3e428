//! Compiled CSS selectors

use scraper::Selector;
use std::fmt;

use crate::error::DomError;
use crate::Result;

/// A CSS selector parsed once and reused for every lookup.
#[derive(Debug, Clone)]
pub struct Query {
    source: String,
    selector: Selector,
}

impl Query {
    pub fn parse(source: &str) -> Result<Self> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(DomError::InvalidSelector(source.to_string()));
        }

        let selector = Selector::parse(trimmed)
            .map_err(|_| DomError::InvalidSelector(source.to_string()))?;

        Ok(Self {
            source: trimmed.to_string(),
            selector,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub(crate) fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
