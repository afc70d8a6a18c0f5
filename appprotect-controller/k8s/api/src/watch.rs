use futures::prelude::*;
pub use kube::runtime::watcher::{Event, Result};
use std::pin::Pin;
use tokio::time;
use tracing::{info, Instrument};

/// Wraps a resource event stream, riding through stream errors.
pub struct Watch<T> {
    span: tracing::Span,
    rx: Pin<Box<dyn Stream<Item = Result<Event<T>>> + Send + 'static>>,
}

// === impl Watch ===

impl<T, W> From<W> for Watch<T>
where
    W: Stream<Item = Result<Event<T>>> + Send + 'static,
{
    fn from(watch: W) -> Self {
        Self::new(watch.boxed())
    }
}

impl<T> Watch<T> {
    pub fn new(rx: Pin<Box<dyn Stream<Item = Result<Event<T>>> + Send + 'static>>) -> Watch<T> {
        Self {
            rx,
            span: tracing::Span::current(),
        }
    }

    pub fn instrument(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    /// Receive the next event in the stream.
    ///
    /// If the stream fails, log the error and sleep for 1s before polling it again. Returns `None`
    /// only if the underlying stream ends.
    pub async fn recv(&mut self) -> Option<Event<T>> {
        loop {
            match self.rx.next().instrument(self.span.clone()).await? {
                Ok(ev) => return Some(ev),
                Err(error) => {
                    info!(parent: &self.span, %error, "Failed");
                    time::sleep(time::Duration::from_secs(1)).await;
                    info!(parent: &self.span, "Restarting");
                }
            }
        }
    }

    /// Converts the watch into a stream of events that ends only when the underlying stream ends.
    pub fn into_stream(self) -> impl Stream<Item = Event<T>> + Send + 'static
    where
        T: Send + 'static,
    {
        stream::unfold(self, |mut watch| async move {
            let ev = watch.recv().await?;
            Some((ev, watch))
        })
    }
}
