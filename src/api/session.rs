//! Ownership unit for one in-flight streaming request

use super::decoder::{DecodeStats, Fragment, StreamDecoder};
use super::transport::ByteStream;
use super::SessionError;
use bytes::Bytes;
use futures_util::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, trace};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Exclusive handle on a response body.
///
/// The body is released exactly once: on the first call to
/// [`ReaderGuard::release`] or on drop, whichever comes first. Later calls
/// are no-ops.
pub struct ReaderGuard {
    reader: Option<ByteStream>,
    session_id: u64,
}

impl ReaderGuard {
    pub fn new(reader: ByteStream, session_id: u64) -> Self {
        Self {
            reader: Some(reader),
            session_id,
        }
    }

    /// Next chunk from the body, or `None` at end of stream or once released
    pub async fn read(&mut self) -> Option<Result<Bytes, SessionError>> {
        match self.reader.as_mut() {
            Some(reader) => reader.next().await,
            None => None,
        }
    }

    /// Release the body. Returns `false` if it was already released.
    pub fn release(&mut self) -> bool {
        match self.reader.take() {
            Some(reader) => {
                drop(reader);
                debug!(session = self.session_id, "reader released");
                true
            }
            None => {
                trace!(session = self.session_id, "reader already released");
                false
            }
        }
    }

    pub fn is_released(&self) -> bool {
        self.reader.is_none()
    }
}

impl Drop for ReaderGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// One streaming request: its reader and its decoder, owned together.
pub struct RequestSession {
    id: u64,
    reader: ReaderGuard,
    decoder: StreamDecoder,
}

impl RequestSession {
    pub fn new(body: ByteStream) -> Self {
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        debug!(session = id, "session opened");
        Self {
            id,
            reader: ReaderGuard::new(body, id),
            decoder: StreamDecoder::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Read the body to the end, pushing fragments to `tx` in wire order.
    ///
    /// A `done` sentinel does not stop the loop; only end of stream does.
    /// The reader is released before this returns, on every path.
    pub async fn pump(&mut self, tx: mpsc::UnboundedSender<Fragment>) -> Result<DecodeStats, SessionError> {
        let result = self.read_to_end(&tx).await;
        self.reader.release();

        let stats = self.decoder.stats();
        debug!(
            session = self.id,
            lines = stats.lines,
            fragments = stats.fragments,
            malformed = stats.malformed,
            "stream consumed"
        );
        result.map(|()| stats)
    }

    /// Release the reader if the read loop did not get to it.
    pub fn close(&mut self) {
        self.reader.release();
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_released()
    }

    async fn read_to_end(&mut self, tx: &mpsc::UnboundedSender<Fragment>) -> Result<(), SessionError> {
        while let Some(chunk) = self.reader.read().await {
            let chunk = chunk?;
            trace!(session = self.id, bytes = chunk.len(), "chunk read");

            for fragment in self.decoder.decode_chunk(&chunk) {
                if tx.send(fragment).is_err() {
                    // Nobody is listening any more
                    return Ok(());
                }
            }
        }

        for fragment in self.decoder.finish() {
            if tx.send(fragment).is_err() {
                return Ok(());
            }
        }

        Ok(())
    }
}
