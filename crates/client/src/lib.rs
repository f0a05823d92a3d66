//! # FloorLink Client
//!
//! Synchronous client for the FloorLink cloud manufacturing-operations API,
//! meant to run inside automation-gateway scripts: report cycle counts,
//! production/scrap tallies and maintenance dispatches, and read back the
//! site/area/line/machine hierarchy.
//!
//! Every call is one blocking HTTP round-trip; there is no queuing, no
//! retry layer and no state shared across calls beyond the immutable
//! connection context.
//!
//! ```no_run
//! use floorlink_client::{ClientConfig, FloorLinkClient, MachineFilter};
//!
//! fn main() -> floorlink_client::Result<()> {
//!     let config = ClientConfig::new("acme", "api-key", 25);
//!     let client = FloorLinkClient::connect(config)?;
//!
//!     client.increment_cycle_count("1032920", 4)?;
//!
//!     let machines = client.get_machines(MachineFilter {
//!         linecode: Some("Press 1".to_string()),
//!         ..Default::default()
//!     })?;
//!     println!("{:?}", machines.records()?);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod datetime;
mod transport;

// Re-export commonly used items
pub use client::FloorLinkClient;
pub use datetime::{normalize, DateTimeInput, API_DATETIME_FORMAT};
pub use floorlink_domain::{
    AreaFilter, ClientConfig, DispatchRequest, Envelope, FloorLinkError, LineFilter, LineRef,
    MachineFilter, Params, PitchCounts, Result, SiteFilter,
};
