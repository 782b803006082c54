//! Pagination handling for GitHub API.
//!
//! GitHub paginates list endpoints with `page` / `per_page` query parameters and
//! advertises the following page in an RFC 8288 `Link` header. [`Pager`] walks
//! that chain one page at a time: a page is requested only after the previous
//! one has been handed to the caller, and the `max_pages` bound of the
//! [`PaginationParams`] window stops the walk early without an error.

use crate::client::GitHubClient;
use crate::errors::{ensure_not_empty, ensure_positive, GitHubError, GitHubResult, RateLimitInfo};
use crate::observability::TracingHooks;
use crate::rate_limit::extract_rate_limit;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::header::HeaderMap;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Largest `per_page` value GitHub honours.
pub const MAX_PER_PAGE: u32 = 100;

/// Pagination links parsed from Link header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationLinks {
    /// URL for the next page.
    pub next: Option<String>,
    /// URL for the previous page.
    pub prev: Option<String>,
    /// URL for the first page.
    pub first: Option<String>,
    /// URL for the last page.
    pub last: Option<String>,
}

impl PaginationLinks {
    /// Parses pagination links from the Link header (RFC 8288).
    ///
    /// Link targets are read between `<` and `>` first, so commas inside a URL
    /// never split a link.
    pub fn from_header(header_value: &str) -> Self {
        let mut links = Self::default();
        let mut rest = header_value;

        while let Some(start) = rest.find('<') {
            let after = &rest[start + 1..];
            let end = match after.find('>') {
                Some(end) => end,
                None => break,
            };
            let url = after[..end].trim();
            let tail = &after[end + 1..];

            // Parameters run up to the next link target.
            let params_end = tail.find('<').unwrap_or(tail.len());
            let rel = Self::rel_param(&tail[..params_end]);
            rest = &tail[params_end..];

            if let Some(rel) = rel {
                // A relation may list several space-separated types.
                for rel in rel.split_whitespace() {
                    match rel {
                        "next" => links.next = Some(url.to_string()),
                        "prev" => links.prev = Some(url.to_string()),
                        "first" => links.first = Some(url.to_string()),
                        "last" => links.last = Some(url.to_string()),
                        _ => {}
                    }
                }
            }
        }

        links
    }

    fn rel_param(params: &str) -> Option<&str> {
        params.split(';').find_map(|param| {
            let (name, value) = param.split_once('=')?;
            if name.trim().eq_ignore_ascii_case("rel") {
                Some(value.trim().trim_end_matches(',').trim().trim_matches('"'))
            } else {
                None
            }
        })
    }

    /// Parses pagination links from response headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get("link")
            .and_then(|v| v.to_str().ok())
            .map(Self::from_header)
            .unwrap_or_default()
    }

    /// Returns true if there is a next page.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Returns true if there is a previous page.
    pub fn has_prev(&self) -> bool {
        self.prev.is_some()
    }

    /// Gets the total page count from the last link.
    pub fn total_pages(&self) -> Option<u32> {
        self.last.as_deref().and_then(extract_page_number)
    }
}

/// Response metadata carried alongside a page. Never interpreted by the pager.
#[derive(Debug, Clone, Default)]
pub struct ResponseInfo {
    /// Rate limit state reported by the response.
    pub rate_limit: Option<RateLimitInfo>,
    /// ETag of the response.
    pub etag: Option<String>,
    /// All response headers with textual values, keyed by lowercase name.
    pub headers: BTreeMap<String, String>,
}

impl ResponseInfo {
    /// Captures metadata from response headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut map = BTreeMap::new();
        for (name, value) in headers {
            if let Ok(value) = value.to_str() {
                map.insert(name.as_str().to_string(), value.to_string());
            }
        }

        Self {
            rate_limit: extract_rate_limit(headers),
            etag: map.get("etag").cloned(),
            headers: map,
        }
    }
}

/// A single page of results.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// The items in this page.
    pub items: Vec<T>,
    /// Pagination links.
    pub links: PaginationLinks,
    /// Current page number (if known).
    pub page: Option<u32>,
    /// Items per page (if known).
    pub per_page: Option<u32>,
    /// Total count (if provided by API).
    pub total_count: Option<u64>,
    /// Response metadata.
    pub info: ResponseInfo,
}

impl<T> Page<T> {
    /// Creates a new page.
    pub fn new(items: Vec<T>, links: PaginationLinks) -> Self {
        Self {
            items,
            links,
            page: None,
            per_page: None,
            total_count: None,
            info: ResponseInfo::default(),
        }
    }

    /// Sets the page number.
    pub fn with_page(mut self, page: Option<u32>) -> Self {
        self.page = page;
        self
    }

    /// Sets items per page.
    pub fn with_per_page(mut self, per_page: Option<u32>) -> Self {
        self.per_page = per_page;
        self
    }

    /// Sets total count.
    pub fn with_total_count(mut self, count: Option<u64>) -> Self {
        self.total_count = count;
        self
    }

    /// Sets the response metadata.
    pub fn with_info(mut self, info: ResponseInfo) -> Self {
        self.info = info;
        self
    }

    /// Returns true if there is a next page.
    pub fn has_next(&self) -> bool {
        self.links.has_next()
    }

    /// Returns the URL for the next page.
    pub fn next_url(&self) -> Option<&str> {
        self.links.next.as_deref()
    }

    /// Returns the number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the page is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the page and returns the items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Maps the items in this page.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            links: self.links,
            page: self.page,
            per_page: self.per_page,
            total_count: self.total_count,
            info: self.info,
        }
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Pagination window for list requests.
///
/// Every bound is optional; `None` leaves the server default (`page`,
/// `per_page`) or fetches until the last page (`max_pages`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PaginationParams {
    /// Page to start from (1-indexed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Items per page (max 100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    /// Maximum number of pages to fetch.
    #[serde(skip)]
    pub max_pages: Option<u32>,
}

impl PaginationParams {
    /// Creates new pagination parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page number.
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets items per page.
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page.min(MAX_PER_PAGE));
        self
    }

    /// Sets the maximum number of pages to fetch.
    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Rejects zero for any bound that is set.
    pub fn validate(&self) -> GitHubResult<()> {
        if let Some(page) = self.page {
            ensure_positive(page, "page")?;
        }
        if let Some(per_page) = self.per_page {
            ensure_positive(per_page, "per_page")?;
        }
        if let Some(max_pages) = self.max_pages {
            ensure_positive(max_pages, "max_pages")?;
        }
        Ok(())
    }

    /// Converts to query parameters.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            params.push(("per_page".to_string(), per_page.min(MAX_PER_PAGE).to_string()));
        }
        params
    }
}

/// The first request of a fetch chain.
///
/// Built with validating builder methods and then moved into a [`Pager`], so it
/// cannot change once issued. Parameters passed in are copied.
#[derive(Debug, Clone)]
pub struct PageRequest {
    location: String,
    parameters: BTreeMap<String, String>,
    accept: Option<String>,
    window: PaginationParams,
}

impl PageRequest {
    /// Creates a request for a path relative to the API base URL or an absolute URL.
    ///
    /// Fails with `MissingParameter` when `location` is empty or whitespace.
    pub fn new(location: impl Into<String>) -> GitHubResult<Self> {
        let location = location.into();
        ensure_not_empty(&location, "location")?;

        Ok(Self {
            location,
            parameters: BTreeMap::new(),
            accept: None,
            window: PaginationParams::default(),
        })
    }

    /// Request for a `Link` target; carries nothing but the accept override.
    pub(crate) fn follow(url: String, accept: Option<String>) -> Self {
        Self {
            location: url,
            parameters: BTreeMap::new(),
            accept,
            window: PaginationParams::default(),
        }
    }

    /// Adds filter parameters.
    pub fn with_parameters(mut self, parameters: &BTreeMap<String, String>) -> Self {
        self.parameters
            .extend(parameters.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Adds one filter parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Adds the fields of a serializable filter struct as parameters.
    pub fn with_filter<F: Serialize>(mut self, filter: &F) -> GitHubResult<Self> {
        let encoded = serde_urlencoded::to_string(filter).map_err(|e| {
            GitHubError::invalid_parameter(format!("Failed to serialize parameters: {}", e))
        })?;

        for (key, value) in url::form_urlencoded::parse(encoded.as_bytes()) {
            self.parameters.insert(key.into_owned(), value.into_owned());
        }
        Ok(self)
    }

    /// Overrides the `Accept` header for every page of the chain.
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Sets the pagination window.
    pub fn with_window(mut self, window: PaginationParams) -> GitHubResult<Self> {
        window.validate()?;
        self.window = window;
        Ok(self)
    }

    /// Gets the location.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Gets the filter parameters.
    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    /// Gets the accept override.
    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }

    /// Gets the pagination window.
    pub fn window(&self) -> &PaginationParams {
        &self.window
    }

    /// Query pairs sent with the request: filters plus window fields.
    ///
    /// Window fields win over a filter parameter of the same name.
    pub fn query(&self) -> Vec<(String, String)> {
        let mut query = self.parameters.clone();
        query.extend(self.window.to_query());
        query.into_iter().collect()
    }
}

/// Decodes a page body: a JSON array, or an object holding `items`.
///
/// An empty body is an empty page.
pub(crate) fn decode_page<T: DeserializeOwned>(body: &[u8]) -> GitHubResult<(Vec<T>, Option<u64>)> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok((Vec::new(), None));
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| {
        GitHubError::deserialization(format!("Failed to parse page body: {}", e)).with_cause(e)
    })?;

    let (items, total_count) = match value {
        Value::Array(_) => (value, None),
        Value::Object(mut map) => {
            let total_count = map.get("total_count").and_then(Value::as_u64);
            let items = map.remove("items").ok_or_else(|| {
                GitHubError::deserialization("Page object has no 'items' field")
            })?;
            (items, total_count)
        }
        _ => {
            return Err(GitHubError::deserialization(
                "Page body must be a JSON array or an object with 'items'",
            ))
        }
    };

    let items = serde_json::from_value(items).map_err(|e| {
        GitHubError::deserialization(format!("Failed to deserialize page items: {}", e))
            .with_cause(e)
    })?;

    Ok((items, total_count))
}

enum Cursor {
    Start(PageRequest),
    Next(String),
    Done,
}

/// Walks a `Link`-header page chain, one page per call.
///
/// Created by [`GitHubClient::get_all_pages`]. The pager owns a clone of the
/// client, so it is `'static` and can be moved into a task.
pub struct Pager<T> {
    client: GitHubClient,
    cursor: Cursor,
    accept: Option<String>,
    max_pages: Option<u32>,
    pages_fetched: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Pager<T> {
    pub(crate) fn new(client: GitHubClient, request: PageRequest) -> Self {
        Self {
            client,
            accept: request.accept.clone(),
            max_pages: request.window.max_pages,
            cursor: Cursor::Start(request),
            pages_fetched: 0,
            _marker: PhantomData,
        }
    }

    /// Fetches the next page, or `None` once the chain has ended.
    ///
    /// After an error the chain is over and every later call returns `Ok(None)`.
    pub async fn next_page(&mut self) -> GitHubResult<Option<Page<T>>> {
        let request = match std::mem::replace(&mut self.cursor, Cursor::Done) {
            Cursor::Done => return Ok(None),
            Cursor::Start(request) => request,
            Cursor::Next(url) => PageRequest::follow(url, self.accept.clone()),
        };

        let page: Page<T> = self.client.get_page(&request).await?;
        self.pages_fetched += 1;

        TracingHooks::on_page_fetched(
            request.location(),
            self.pages_fetched,
            page.len(),
            page.has_next(),
        );

        if let Some(next) = page.next_url() {
            match self.max_pages {
                Some(max) if self.pages_fetched >= max => TracingHooks::on_window_exhausted(max),
                _ => self.cursor = Cursor::Next(next.to_string()),
            }
        }

        Ok(Some(page))
    }

    /// Collects all items from all remaining pages.
    pub async fn collect_all(mut self) -> GitHubResult<Vec<T>> {
        let mut all_items = Vec::new();

        while let Some(page) = self.next_page().await? {
            all_items.extend(page.into_items());
        }

        Ok(all_items)
    }

    /// Returns true if another call to `next_page` may issue a request.
    pub fn has_more(&self) -> bool {
        !matches!(self.cursor, Cursor::Done)
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Turns the pager into a lazy stream of pages that ends after the first error.
    pub fn into_stream(self) -> BoxStream<'static, GitHubResult<Page<T>>>
    where
        T: Send + 'static,
    {
        stream::try_unfold(self, |mut pager| async move {
            let next = pager.next_page().await;
            next.map(|page| page.map(|page| (page, pager)))
        })
        .boxed()
    }
}

/// Extracts page number from a URL.
pub fn extract_page_number(url: &str) -> Option<u32> {
    query_number(url, "page")
}

pub(crate) fn query_number(url: &str, key: &str) -> Option<u32> {
    url::Url::parse(url).ok().and_then(|u| {
        u.query_pairs()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.parse().ok())
    })
}
