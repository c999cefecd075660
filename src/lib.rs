//! Clinic Reports Library
//!
//! Monthly medicine, complaint and age-bracket reporting for the clinic,
//! with CSV and printable PDF export.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod reports;
pub mod tools;
