//! Data models
//!
//! Rust structs representing database entities.

mod dispense_request;
mod profile;

pub use dispense_request::{DispenseRequest, DispenseRequestCreate, VISIT_TIMESTAMP_FORMAT};
pub use profile::{Profile, ProfileCreate};
