//! CDSLINK - status translation and route mutation engine bridging a
//! flight-simulation ATC client to an external controller display program.
//!
//! The display has no status channel of its own, so coded statuses ride in
//! the scratchpad carrier field; this crate owns that translation, plus
//! collision-free squawk allocation, algebraic route-string editing,
//! direct-to present-position splicing and altitude conformance. The wire
//! transport and message codec live in the host and are out of scope here.

pub mod config;
pub mod conformance;
pub mod direct_to;
pub mod errors;
pub mod gateway;
pub mod position;
pub mod registry;
pub mod route;
pub mod snapshot;
pub mod squawk;
pub mod status;

pub use config::BridgeConfig;
pub use errors::ModifyError;
pub use gateway::{Ack, BridgeEvent, EventOutcome};
pub use position::PositionSample;
pub use registry::{AircraftRegistry, FlightPlan};
pub use snapshot::FlightSnapshot;
pub use status::{SpecialStatus, StatusCode, StatusTransition};
