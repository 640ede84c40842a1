//! Upstream-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` exposes validated metadata ([`UpstreamDescriptor`]) covering the identity and
//! quotation endpoints, the fixed request selectors (market division, transaction id), and
//! upstream quirks. `strategy` defines [`UpstreamStrategy`], the hook used by the token manager
//! to decorate identity requests and by the quote fetcher to classify upstream failures.

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;
