use log::debug;
use tokio_util::sync::CancellationToken;

/// Handle for closing a relay session from outside.
///
/// Cloneable and safe to trigger from any task, any number of times. Once
/// closed, both directions stop copying and shut down their destination.
#[derive(Debug, Clone, Default)]
pub struct Closer(CancellationToken);

impl Closer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn close(&self) {
        if !self.0.is_cancelled() {
            debug!("Closing relay session");
        }
        self.0.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_cancelled()
    }

    /// Completes once [`Closer::close`] has been called on any clone.
    pub async fn closed(&self) {
        self.0.cancelled().await
    }

    pub(crate) fn token(&self) -> CancellationToken {
        self.0.clone()
    }
}
