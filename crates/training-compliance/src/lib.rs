//! Training qualification engine and roster workflows for the volunteer fire department
//! compliance portal.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
