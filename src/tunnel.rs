use crate::config::Config;
use crate::error;
use crate::relay::{Connection, Relay, Report};

/// Relays between `l` and `r` with the default config until both
/// directions end, then drops what is left of them.
pub async fn join<L, R>(l: L, r: R) -> Report
where
    L: Connection,
    R: Connection,
{
    Relay::new(l, r).run().await.report
}

pub async fn join_with<L, R>(l: L, r: R, config: Config) -> Result<Report, error::Box>
where
    L: Connection,
    R: Connection,
{
    let report = Relay::with_config(l, r, config)?.run().await.report;
    log::debug!(
        "l->r {}, r->l {} bytes spliced",
        report.near_to_far.bytes,
        report.far_to_near.bytes
    );
    Ok(report)
}
