use super::error::TtsServiceError;
use super::scheduler::AudioSegment;
use axum::body::Bytes;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Ordered, finite stream of rendered segments for one request.
///
/// End of stream is the channel closing; there is no sentinel item. Dropping
/// the stream (or calling [`SegmentStream::cancel`]) tells the producer to
/// stop before the next chunk.
pub struct SegmentStream {
    inner: ReceiverStream<Result<AudioSegment, TtsServiceError>>,
    total: usize,
}

impl SegmentStream {
    pub(crate) fn new(rx: mpsc::Receiver<Result<AudioSegment, TtsServiceError>>, total: usize) -> Self {
        Self {
            inner: ReceiverStream::new(rx),
            total,
        }
    }

    pub fn total_chunks(&self) -> usize {
        self.total
    }

    /// Stop accepting segments; anything already rendered may still be drained
    pub fn cancel(&mut self) {
        self.inner.close();
    }

    /// Raw byte chunks for a streaming HTTP body
    pub fn into_bytes(self) -> impl Stream<Item = Result<Bytes, TtsServiceError>> + Send {
        self.map(|item| {
            item.map(|segment| {
                tracing::debug!(
                    segment = segment.number(),
                    total = segment.total,
                    bytes = segment.bytes.len(),
                    "Delivering audio segment"
                );
                Bytes::from(segment.bytes)
            })
        })
    }
}

impl Stream for SegmentStream {
    type Item = Result<AudioSegment, TtsServiceError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.total))
    }
}
