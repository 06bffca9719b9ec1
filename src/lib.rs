//! Typed statistics from the Open vSwitch control interface
//!
//! The "show" commands of ovs-vswitchd (`ovs-appctl dpif/show` and friends)
//! report a wealth of dataplane statistics, but only as human-readable text.
//! That text has no formal grammar: hierarchy is expressed through inconsistent
//! indentation, and free-text labels are mixed with `key:value` pairs and
//! positional fields on the same line.
//!
//! This crate turns such output into typed records, in two stages:
//!
//! - The splitter measures the indentation of every line of a response, and
//!   normalizes it into canonical nesting depths.
//! - A per-command parser walks the depth-tagged lines and assembles records,
//!   checking its assumptions about the output's structure along the way and
//!   failing loudly on any deviation.
//!
//! Talking to the control socket itself is left to the user, through the
//! Connector and CommandClient traits of the reader module.

#[macro_use]
mod parser;

pub mod appctl;
pub mod error;
pub mod reader;
pub mod service;
pub mod splitter;

pub use crate::appctl::{parse_datapath_summary, parse_pmd_rxq_usage, Datapath,
                        LookupCounters, MaskCounters, Pmd, Rxq};
pub use crate::error::{Error, ResponseError, StructureError, TransportError};
pub use crate::parser::{parse_response, ShowParser};
pub use crate::reader::{CommandClient, Connector, Endpoint};
pub use crate::service::{AppClient, ServiceConfig, VSWITCHD_SERVICE};
