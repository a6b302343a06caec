//! Foundation module - Core utilities and types
//!
//! - Math types and matrix helpers
//! - The slot table used for root scene nodes
//! - Frame timing
//! - Logging setup

pub mod collections;
pub mod logging;
pub mod math;
pub mod time;
