//! Per-request context shared by every pass and collaborator.

use chrono::{DateTime, Utc};
use tally_core::Channel;

/// The channel an order is priced in, and the instant it is priced at.
///
/// `now` is fixed for the whole run so a promotion cannot expire halfway
/// through the passes.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub channel: Channel,
    pub now: DateTime<Utc>,
}

impl RequestContext {
    /// Context priced at the current time.
    pub fn new(channel: Channel) -> Self {
        Self::at(channel, Utc::now())
    }

    /// Context priced at a given instant (replays, tests).
    pub fn at(channel: Channel, now: DateTime<Utc>) -> Self {
        RequestContext { channel, now }
    }
}
