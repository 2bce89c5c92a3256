use std::fmt;
use std::io::{self, ErrorKind};
use std::time::Duration;

use log::{debug, trace};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::config::{ClosePolicy, Config};

/// Longest a closed session waits for a destination to accept its shutdown.
pub const CLOSE_GRACE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    NearToFar,
    FarToNear,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::NearToFar => f.write_str("near->far"),
            Direction::FarToNear => f.write_str("far->near"),
        }
    }
}

/// Why a direction stopped copying.
///
/// None of these are failures of the session: a peer hanging up, resetting
/// or going quiet is how every direction eventually ends.
#[derive(Debug)]
pub enum End {
    /// The source reported end-of-stream.
    Eof,
    /// Reading from the source failed.
    Read(io::Error),
    /// Writing to the destination failed.
    Write(io::Error),
    /// The source sent nothing for longer than the idle timeout.
    Idle,
    /// The session was closed, by a [`crate::Closer`] or by the
    /// opposite direction under [`ClosePolicy::CloseBoth`].
    Closed,
    /// The copy task panicked.
    Aborted,
}

impl End {
    pub fn is_eof(&self) -> bool {
        matches!(self, End::Eof)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, End::Closed)
    }
}

impl fmt::Display for End {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            End::Eof => f.write_str("end of stream"),
            End::Read(e) => write!(f, "read failed: {e}"),
            End::Write(e) => write!(f, "write failed: {e}"),
            End::Idle => f.write_str("idle timeout"),
            End::Closed => f.write_str("closed"),
            End::Aborted => f.write_str("copy task aborted"),
        }
    }
}

/// What one direction moved before it ended.
#[derive(Debug)]
pub struct Transfer {
    pub direction: Direction,
    /// Bytes the destination accepted, including those of a chunk whose
    /// write failed partway.
    pub bytes: u64,
    pub end: End,
}

pub(crate) struct Pump {
    pub direction: Direction,
    pub policy: ClosePolicy,
    pub buffer_size: usize,
    pub idle_timeout: Option<Duration>,
    pub stop: CancellationToken,
}

impl Pump {
    pub fn new(direction: Direction, config: &Config, stop: CancellationToken) -> Self {
        Self {
            direction,
            policy: config.policy,
            buffer_size: config.buffer_size,
            idle_timeout: config.idle_timeout(),
            stop,
        }
    }

    /// Copies `src` into `dst` until one of them gives out or the session is
    /// closed, then applies the close policy to `dst`. The halves are handed
    /// back so the caller can reassemble the connections.
    pub async fn run<R, W>(self, mut src: R, mut dst: W) -> (Transfer, R, W)
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        // a panicking copy loop must still release the opposite direction
        let guard = self.stop.clone().drop_guard();
        let mut buf = vec![0u8; self.buffer_size];
        let mut bytes = 0u64;

        let end = loop {
            let n = tokio::select! {
                biased;
                _ = self.stop.cancelled() => break End::Closed,
                r = self.read(&mut src, &mut buf) => match r {
                    Ok(Some(0)) => break End::Eof,
                    Ok(Some(n)) => n,
                    Ok(None) => break End::Idle,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => break End::Read(e),
                },
            };

            let w = tokio::select! {
                biased;
                _ = self.stop.cancelled() => break End::Closed,
                w = write_chunk(&mut dst, &buf[..n], &mut bytes) => w,
            };
            if let Err(e) = w {
                break End::Write(e);
            }

            trace!("{}: {n} bytes", self.direction);
        };

        debug!("{} ended after {bytes} bytes: {end}", self.direction);

        match (self.policy, &end) {
            (_, End::Closed) => self.shutdown_closed(&mut dst).await,
            (ClosePolicy::HalfClose, _) => self.shutdown(&mut dst).await,
            (ClosePolicy::CloseBoth, _) => {
                self.shutdown(&mut dst).await;
                self.stop.cancel();
            }
            (ClosePolicy::NoClose, _) => {}
        }
        let _ = guard.disarm();

        let transfer = Transfer {
            direction: self.direction,
            bytes,
            end,
        };
        (transfer, src, dst)
    }

    // None means the idle timeout elapsed
    async fn read<R>(&self, src: &mut R, buf: &mut [u8]) -> io::Result<Option<usize>>
    where
        R: AsyncRead + Unpin,
    {
        match self.idle_timeout {
            Some(t) => match timeout(t, src.read(buf)).await {
                Ok(r) => r.map(Some),
                Err(_) => Ok(None),
            },
            None => src.read(buf).await.map(Some),
        }
    }

    // Graceful end: a shutdown that flushes into a peer which stopped
    // reading waits for the idle timeout or the session closing.
    async fn shutdown<W>(&self, dst: &mut W)
    where
        W: AsyncWrite + Unpin,
    {
        let res = tokio::select! {
            biased;
            _ = self.stop.cancelled() => None,
            r = bounded(self.idle_timeout, dst.shutdown()) => Some(r),
        };

        match res {
            Some(r) => self.ignore(r),
            None => self.shutdown_closed(dst).await,
        }
    }

    // The session is closing: never wait on the destination past the grace.
    async fn shutdown_closed<W>(&self, dst: &mut W)
    where
        W: AsyncWrite + Unpin,
    {
        let grace = match self.idle_timeout {
            Some(t) => t.min(CLOSE_GRACE),
            None => CLOSE_GRACE,
        };
        self.ignore(bounded(Some(grace), dst.shutdown()).await);
    }

    // Errors here are expected (the peer may already be gone) and ignored.
    fn ignore(&self, res: io::Result<()>) {
        if let Err(e) = res {
            trace!("{}: ignoring shutdown error: {e}", self.direction);
        }
    }
}

async fn bounded<F>(limit: Option<Duration>, f: F) -> io::Result<()>
where
    F: std::future::Future<Output = io::Result<()>>,
{
    match limit {
        Some(t) => timeout(t, f)
            .await
            .unwrap_or_else(|_| Err(ErrorKind::TimedOut.into())),
        None => f.await,
    }
}

// Adds to `written` as the destination accepts bytes, so a chunk that fails
// halfway still counts what got through.
async fn write_chunk<W>(dst: &mut W, chunk: &[u8], written: &mut u64) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut rest = chunk;
    while !rest.is_empty() {
        match dst.write(rest).await {
            Ok(0) => return Err(ErrorKind::WriteZero.into()),
            Ok(n) => {
                *written += n as u64;
                rest = &rest[n..];
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    dst.flush().await
}
