//! Cursor pagination over Sophos Central list endpoints.
//!
//! List responses come in one of two envelopes, `{ items: [...], next }` or
//! `{ data: [...], next }`. Anything else is treated as an opaque body.

use reqwest::Url;
use serde_json::{json, Value};

use super::client::SophosClient;
use crate::error::{Result, SophosError};

/// Envelope fields checked for a record list, in priority order.
const COLLECTION_FIELDS: [&str; 2] = ["items", "data"];
const CURSOR_FIELD: &str = "next";

/// One decoded response page.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    /// A recognized list envelope and its cursor, if any.
    Collection {
        items: Vec<Value>,
        next: Option<String>,
    },
    /// Any body that is not a list envelope.
    Opaque(Value),
}

impl Page {
    pub fn decode(body: Value) -> Self {
        let Value::Object(mut map) = body else {
            return Self::Opaque(body);
        };
        let field = COLLECTION_FIELDS
            .into_iter()
            .find(|field| map.get(*field).is_some_and(Value::is_array));
        let Some(field) = field else {
            return Self::Opaque(Value::Object(map));
        };

        let items = match map.remove(field) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        let next = map
            .get(CURSOR_FIELD)
            .and_then(Value::as_str)
            .filter(|cursor| !cursor.is_empty())
            .map(str::to_string);
        Self::Collection { items, next }
    }
}

/// Outcome of a pagination walk.
#[derive(Debug, Clone, PartialEq)]
pub enum PagedResult {
    /// Records from every recognized page, in server order.
    Items(Vec<Value>),
    /// The first page was not a list envelope; returned untouched.
    Raw(Value),
}

impl PagedResult {
    pub fn items(&self) -> Option<&[Value]> {
        match self {
            Self::Items(items) => Some(items.as_slice()),
            Self::Raw(_) => None,
        }
    }

    /// Consume into the record list, failing when the first page was opaque.
    pub fn try_into_items(self) -> Result<Vec<Value>> {
        match self {
            Self::Items(items) => Ok(items),
            Self::Raw(raw) => Err(SophosError::UnrecognizedResponseShape(format!(
                "expected an items or data list, got {}",
                describe(&raw)
            ))),
        }
    }

    /// `{ "items": [...] }` for aggregated results, the raw body otherwise.
    pub fn into_value(self) -> Value {
        match self {
            Self::Items(items) => json!({ "items": items }),
            Self::Raw(raw) => raw,
        }
    }
}

impl From<PagedResult> for Value {
    fn from(result: PagedResult) -> Self {
        result.into_value()
    }
}

/// Turn a `next` cursor into a path (plus query) on the API host.
///
/// Absolute URLs lose their scheme and authority so that every page is
/// fetched from the configured host.
pub fn cursor_path(cursor: &str) -> Result<String> {
    if cursor.starts_with("http://") || cursor.starts_with("https://") {
        let url = Url::parse(cursor)
            .map_err(|e| SophosError::InvalidCursor(format!("{cursor}: {e}")))?;
        return Ok(match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        });
    }
    if cursor.starts_with('/') {
        Ok(cursor.to_string())
    } else {
        Ok(format!("/{cursor}"))
    }
}

impl SophosClient {
    /// GET `path` and follow `next` cursors until exhausted, concatenating
    /// the records of every page.
    ///
    /// `query` is sent with the first request only; later pages use the
    /// cursor as given. A later page with an unrecognized shape ends the walk
    /// and is dropped; the records gathered so far are returned.
    pub async fn fetch_all_pages(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<PagedResult> {
        let first = self.get(path, query).await?;
        let (mut items, mut next) = match Page::decode(first) {
            Page::Collection { items, next } => (items, next),
            Page::Opaque(raw) => {
                tracing::debug!(path, "response is not a list envelope; returning raw body");
                return Ok(PagedResult::Raw(raw));
            }
        };

        let mut pages = 1usize;
        while let Some(cursor) = next.take() {
            if self.max_pages.is_some_and(|max| pages >= max) {
                tracing::warn!(path, pages, "page limit reached; returning partial results");
                break;
            }
            let page_path = cursor_path(&cursor)?;
            tracing::debug!(path = %page_path, page = pages, "fetching next page");
            let body = self.get(&page_path, &[]).await?;
            pages += 1;
            match Page::decode(body) {
                Page::Collection {
                    items: page_items,
                    next: page_next,
                } => {
                    items.extend(page_items);
                    next = page_next;
                }
                Page::Opaque(_) => {
                    tracing::warn!(path = %page_path, "unrecognized page shape; stopping pagination");
                    break;
                }
            }
        }

        tracing::debug!(path, pages, records = items.len(), "pagination complete");
        Ok(PagedResult::Items(items))
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object without a list field",
    }
}
