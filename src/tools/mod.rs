//! Clinic Reports Tools module
//!
//! Support for the MCP tool surface.

pub mod status;
