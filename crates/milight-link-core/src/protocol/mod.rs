//! Protocol layer for bridge discovery.
//!
//! This module builds the discovery request and parses bridge responses.

pub mod discovery;

pub use discovery::{decode_response, encode_discovery_request, format_hardware_address};
