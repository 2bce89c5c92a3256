//! The relay session: two copy tasks over a pair of connections.

use log::{debug, warn};
use tokio::io::{self, AsyncRead, AsyncWrite};
use tokio::task::JoinError;

use crate::closer::Closer;
use crate::config::{ClosePolicy, Config};
use crate::direction::{Direction, End, Pump, Transfer};
use crate::error;

/// A duplex byte stream the relay can own for a session.
///
/// Closing is expressed through `AsyncWrite::poll_shutdown` (write side) and
/// through dropping the value.
pub trait Connection: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

impl<T> Connection for T where T: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

/// One relay session between a `near` (client facing) and a `far` (backend
/// facing) connection.
pub struct Relay<N, F> {
    near: N,
    far: F,
    config: Config,
    closer: Closer,
}

/// Per direction outcome of a session.
#[derive(Debug)]
pub struct Report {
    pub near_to_far: Transfer,
    pub far_to_near: Transfer,
}

/// What `run` hands back once both directions are done.
///
/// The connections are `None` when [`ClosePolicy::CloseBoth`] closed them, or
/// when a copy task panicked while holding one of their halves.
#[derive(Debug)]
pub struct Finished<N, F> {
    pub report: Report,
    pub near: Option<N>,
    pub far: Option<F>,
}

impl<N, F> Relay<N, F>
where
    N: Connection,
    F: Connection,
{
    pub fn new(near: N, far: F) -> Self {
        Self {
            near,
            far,
            config: Config::default(),
            closer: Closer::new(),
        }
    }

    pub fn with_config(near: N, far: F, config: Config) -> Result<Self, error::Box> {
        config.validate()?;
        Ok(Self {
            near,
            far,
            config,
            closer: Closer::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle for ending the session from outside while `run` is pending.
    pub fn closer(&self) -> Closer {
        self.closer.clone()
    }

    /// Relays bytes both ways and returns once both directions have ended,
    /// whichever ends first and for whatever reason.
    ///
    /// Dropping the returned future before it completes (for example when it
    /// loses a `timeout`) closes the session: both copy tasks stop and
    /// release the connections.
    pub async fn run(self) -> Finished<N, F> {
        let Relay {
            near,
            far,
            config,
            closer,
        } = self;

        debug!(
            "Relay started: policy {:?}, buffer {} bytes, idle timeout {:?}",
            config.policy,
            config.buffer_size,
            config.idle_timeout()
        );

        let (near_r, near_w) = io::split(near);
        let (far_r, far_w) = io::split(far);

        let to_near = Pump::new(Direction::FarToNear, &config, closer.token());
        let to_far = Pump::new(Direction::NearToFar, &config, closer.token());

        // fires if this future is dropped while the tasks are still running
        let guard = closer.token().drop_guard();
        let (to_near, to_far) = tokio::join!(
            tokio::spawn(to_near.run(far_r, near_w)),
            tokio::spawn(to_far.run(near_r, far_w)),
        );
        let _ = guard.disarm();

        let (far_to_near, far_r, near_w) = settle(Direction::FarToNear, to_near);
        let (near_to_far, near_r, far_w) = settle(Direction::NearToFar, to_far);

        debug!(
            "Relay finished: near->far {} bytes ({}), far->near {} bytes ({})",
            near_to_far.bytes, near_to_far.end, far_to_near.bytes, far_to_near.end
        );

        let report = Report {
            near_to_far,
            far_to_near,
        };

        if config.policy == ClosePolicy::CloseBoth {
            // dropping the halves closes both connections
            return Finished {
                report,
                near: None,
                far: None,
            };
        }

        Finished {
            report,
            near: near_r.zip(near_w).map(|(r, w)| r.unsplit(w)),
            far: far_r.zip(far_w).map(|(r, w)| r.unsplit(w)),
        }
    }
}

fn settle<R, W>(
    direction: Direction,
    res: Result<(Transfer, R, W), JoinError>,
) -> (Transfer, Option<R>, Option<W>) {
    match res {
        Ok((t, r, w)) => (t, Some(r), Some(w)),
        Err(e) => {
            warn!("{direction} copy task failed: {e}");
            let t = Transfer {
                direction,
                bytes: 0,
                end: End::Aborted,
            };
            (t, None, None)
        }
    }
}
