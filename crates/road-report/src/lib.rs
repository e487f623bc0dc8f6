//! Road issue reporting: the multi-step report wizard, its geolocation and
//! suggestion search helpers, and the local report history.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
