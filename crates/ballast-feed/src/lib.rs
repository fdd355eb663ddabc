//! Price-source seam for the ballast risk core.
//!
//! The price-feed transport itself is an external collaborator: it exposes
//! a read returning a value plus a staleness indicator, and may fail. This
//! crate provides:
//! - `PriceSource` / `RedemptionSource`: the transport traits
//! - `PriceReading`: a raw reading with freshness tracking
//! - `PriceObservation`: banded price bounds plus the peg price
//! - `CollateralReader` / `FeedKind`: the capability interface and the
//!   closed set of collateral kinds selected at monitor construction

pub mod error;
pub mod observation;
pub mod reader;
pub mod source;

pub use error::{FeedError, FeedResult};
pub use observation::PriceObservation;
pub use reader::{CollateralReader, FeedKind, PeggedReader, YieldBearingReader};
pub use source::{PriceReading, PriceSource, RedemptionSource};
