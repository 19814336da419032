//! In-memory output sink.
//!
//! `StringResponse` is cheap to clone; every clone shares the same buffer,
//! so a caller can hand one clone to `execute` and read the other after the
//! render has flushed and closed it.

use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};

use tokio::io::AsyncWrite;

#[derive(Debug, Clone, Default)]
pub struct StringResponse {
    data: Arc<Mutex<Vec<u8>>>,
    closed: Arc<AtomicBool>,
}

impl StringResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, decoded as UTF-8 (lossily).
    pub fn data(&self) -> String {
        String::from_utf8_lossy(&self.buffer()).into_owned()
    }

    pub fn set_data(&self, data: impl Into<String>) {
        *self.buffer() = data.into().into_bytes();
    }

    /// True once the sink has been shut down.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<u8>> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AsyncWrite for StringResponse {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if self.is_closed() {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "response already ended",
            )));
        }
        self.buffer().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.closed.store(true, Ordering::Release);
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_clones_share_data() {
        let response = StringResponse::new();
        let mut writer = response.clone();
        writer.write_all("héllo ".as_bytes()).await.unwrap();
        writer.write_all(b"world").await.unwrap();
        assert_eq!(response.data(), "héllo world");
        assert!(!response.is_closed());
    }

    #[tokio::test]
    async fn test_write_after_shutdown_fails() {
        let response = StringResponse::new();
        let mut writer = response.clone();
        writer.shutdown().await.unwrap();
        assert!(response.is_closed());

        let err = writer.write_all(b"late").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(response.data(), "");
    }

    #[test]
    fn test_set_data_replaces_buffer() {
        let response = StringResponse::new();
        response.set_data("seed");
        assert_eq!(response.data(), "seed");
    }
}
