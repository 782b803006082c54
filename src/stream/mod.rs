//! Item streams flattened from page chains.
//!
//! [`flatten`] turns a stream of pages into a stream of items. A page is pulled
//! from the source only after every item of the previous page has been handed
//! out, so a consumer that stops reading stops the fetching too.

use crate::errors::{GitHubError, GitHubResult};
use crate::observability::TracingHooks;
use crate::pagination::Page;
use futures::pin_mut;
use futures::stream::{BoxStream, Stream, StreamExt};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

/// Flattens pages into their items, in page order then within-page order.
///
/// The stream ends after yielding the first error.
pub fn flatten<T, S>(pages: S) -> impl Stream<Item = GitHubResult<T>>
where
    S: Stream<Item = GitHubResult<Page<T>>>,
{
    async_stream::stream! {
        pin_mut!(pages);

        while let Some(page) = pages.next().await {
            match page {
                Ok(page) => {
                    for item in page.into_items() {
                        yield Ok(item);
                    }
                }
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
    }
}

/// Ordered, single-pass stream of items from every page of a chain.
///
/// Returned by [`GitHubClient::get_and_flatten_all_pages`](crate::GitHubClient::get_and_flatten_all_pages).
pub struct ItemStream<T> {
    inner: BoxStream<'static, GitHubResult<T>>,
}

impl<T> ItemStream<T> {
    /// Wraps an item stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = GitHubResult<T>> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
        }
    }

    /// Flattens a page stream.
    pub fn from_pages<S>(pages: S) -> Self
    where
        S: Stream<Item = GitHubResult<Page<T>>> + Send + 'static,
        T: Send + 'static,
    {
        Self::new(flatten(pages))
    }

    /// Drains the stream into a vector. The first error wins.
    pub async fn collect_all(mut self) -> GitHubResult<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.inner.next().await {
            items.push(item?);
        }
        Ok(items)
    }

    /// Converts the stream into a cancellable subscription.
    pub fn subscribe(self) -> Subscription<T> {
        Subscription {
            inner: Some(self),
            cancelled: Arc::new(AtomicBool::new(false)),
            outcome: None,
            emitted: 0,
        }
    }
}

impl<T> Stream for ItemStream<T> {
    type Item = GitHubResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

/// How a subscription ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Every page was delivered.
    Completed,
    /// The chain ended with an error.
    Failed,
    /// The consumer cancelled before the end.
    Cancelled,
}

/// Push-style consumer for [`Subscription::run`].
pub trait Observer<T> {
    /// Called once per item, in order.
    fn on_next(&mut self, item: T);

    /// Called once if the chain fails. Nothing is delivered afterwards.
    fn on_error(&mut self, error: GitHubError);

    /// Called once after the last item of a chain that ran to its end.
    fn on_completed(&mut self) {}
}

/// Cancels a [`Subscription`] from anywhere, including from inside an observer.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A cancellable item stream.
///
/// Cancellation is checked before every poll of the underlying stream and again
/// when an item arrives, so once cancelled no further page is requested. A fetch
/// already in flight is allowed to finish and its items are dropped.
pub struct Subscription<T> {
    inner: Option<ItemStream<T>>,
    cancelled: Arc<AtomicBool>,
    outcome: Option<Completion>,
    emitted: u64,
}

impl<T> Subscription<T> {
    /// Returns a handle that cancels this subscription.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Number of items delivered so far.
    pub fn items_emitted(&self) -> u64 {
        self.emitted
    }

    /// How the subscription ended, or `None` while it is still live.
    pub fn completion(&self) -> Option<Completion> {
        self.outcome
    }

    /// Drives the subscription to its end, pushing every item to `observer`.
    ///
    /// Exactly one of `on_error` / `on_completed` is called, unless the
    /// subscription is cancelled, in which case neither is.
    pub async fn run<O>(mut self, observer: &mut O) -> Completion
    where
        O: Observer<T> + ?Sized,
    {
        while let Some(item) = self.next().await {
            match item {
                Ok(item) => observer.on_next(item),
                Err(e) => {
                    observer.on_error(e);
                    return Completion::Failed;
                }
            }
        }

        match self.outcome {
            Some(Completion::Cancelled) => Completion::Cancelled,
            _ => {
                observer.on_completed();
                Completion::Completed
            }
        }
    }

    fn finish(&mut self, outcome: Completion) {
        self.inner = None;
        self.outcome = Some(outcome);
        if outcome == Completion::Cancelled {
            TracingHooks::on_subscription_cancelled(self.emitted);
        }
    }
}

impl<T> Stream for Subscription<T> {
    type Item = GitHubResult<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.is_cancelled() && this.outcome.is_none() {
            this.finish(Completion::Cancelled);
        }

        let inner = match this.inner.as_mut() {
            Some(inner) => inner,
            None => return Poll::Ready(None),
        };

        match inner.poll_next_unpin(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(None) => {
                this.finish(Completion::Completed);
                Poll::Ready(None)
            }
            Poll::Ready(Some(item)) => {
                if this.is_cancelled() {
                    this.finish(Completion::Cancelled);
                    return Poll::Ready(None);
                }

                match item {
                    Ok(item) => {
                        this.emitted += 1;
                        Poll::Ready(Some(Ok(item)))
                    }
                    Err(e) => {
                        this.finish(Completion::Failed);
                        Poll::Ready(Some(Err(e)))
                    }
                }
            }
        }
    }
}
