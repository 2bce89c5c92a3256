use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// A duplex connection made of an independent reader and writer.
///
/// Reads go to `r`; writes, flushes and shutdowns go to `w`. Handy for
/// relaying a pair like stdin/stdout, or the two halves of something that
/// was never a single stream.
#[derive(Debug)]
pub struct AsyncRW<R, W> {
    pub r: R,
    pub w: W,
}

impl<R, W> AsyncRW<R, W> {
    pub fn new(r: R, w: W) -> Self {
        Self { r, w }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.r, self.w)
    }
}

impl<R, W> AsyncRead for AsyncRW<R, W>
where
    R: AsyncRead + Unpin,
    W: Unpin,
{
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.r).poll_read(cx, buf)
    }
}

impl<R, W> AsyncWrite for AsyncRW<R, W>
where
    R: Unpin,
    W: AsyncWrite + Unpin,
{
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, std::io::Error>> {
        Pin::new(&mut self.w).poll_write(cx, buf)
    }

    fn poll_flush(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        Pin::new(&mut self.w).poll_flush(cx)
    }

    fn poll_shutdown(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<(), std::io::Error>> {
        Pin::new(&mut self.w).poll_shutdown(cx)
    }
}
