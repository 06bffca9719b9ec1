//! This module contains a parser for the output of `dpif/show`
//!
//! This command summarizes the datapaths of vswitchd. A datapath is the
//! collection of ports attached to bridges, along with a flow table that
//! userspace populates with flows mapping packet headers and metadata to sets
//! of actions. The output looks like this:
//!
//! ```text
//! system@ovs-system:
//!   lookups: hit:1220 missed:30 lost:0
//!   flows: 4
//!   masks: hit:1532 total:2 hit/pkt:1.23
//!   port 0: ovs-system (internal)
//!   port 1: br0 (internal)
//! ```
//!
//! Only the datapath statistics are extracted, port listings are skipped.

use crate::appctl;
use crate::error::StructureError;
use crate::parser::ShowParser;
use crate::splitter::TaggedLine;


/// Statistics of a datapath, as reported by `dpif/show`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Datapath {
    /// Name of the datapath (e.g. "system@ovs-system"), unique in a response
    pub name: String,

    /// Flow table lookup statistics
    pub lookup_counters: LookupCounters,

    /// Number of flows in the datapath's flow table
    pub flow_count: f64,

    /// Megaflow mask statistics
    pub mask_counters: MaskCounters,
}
//
impl Datapath {
    /// Open a new datapath record, with all statistics zeroed
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }
}


/// Flow table lookup counters of a datapath
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LookupCounters {
    /// Packets which matched an existing flow
    pub hit: f64,

    /// Packets which matched no flow and were sent to userspace
    pub missed: f64,

    /// Packets which were dropped before reaching userspace
    pub lost: f64,
}


/// Megaflow mask counters of a datapath
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MaskCounters {
    /// Mask lookups which led to a matching flow
    pub hit: f64,

    /// Number of masks currently installed
    pub total: f64,

    /// Average number of masks visited per packet
    pub hit_ratio: f64,
}


/// Parser for the output of `dpif/show`
pub struct DatapathSummary;
//
impl ShowParser for DatapathSummary {
    const COMMAND: &'static str = "dpif/show";
    type Output = Vec<Datapath>;

    fn parse(lines: &[TaggedLine]) -> Result<Vec<Datapath>, StructureError> {
        let mut datapaths = Vec::new();
        let mut current: Option<Datapath> = None;

        for line in lines {
            // Attributes are introduced by a colon-terminated prefix
            let attribute = line.text.find(':').map(|idx| {
                (&line.text[..idx], line.text[idx + 1..].trim())
            });

            match (line.depth, attribute, current.as_mut()) {
                // A datapath header closes the previous datapath, if any
                (0, Some((name, _)), _) => {
                    datapaths.extend(current.take());
                    current = Some(Datapath::new(name.trim_end()));
                },
                (0, None, _) => {
                    return Err(StructureError::MissingColon {
                        line: line.text.to_owned(),
                    });
                },

                // Counters cannot be attributed without an open datapath
                (1..=2, _, None) => continue,

                (1..=2, Some(("lookups", values)), Some(datapath)) => {
                    let counters = &mut datapath.lookup_counters;
                    appctl::parse_counters(
                        "lookups", &["hit", "missed", "lost"], line.text, values,
                        |key, value| match key {
                            "hit" => counters.hit = value,
                            "missed" => counters.missed = value,
                            _ => counters.lost = value,
                        }
                    )?;
                },

                // An unparseable flow count is tolerated, unlike an unknown
                // counter key in the lookups and masks lines.
                (1..=2, Some(("flows", value)), Some(datapath)) => {
                    if let Ok(flow_count) = value.parse::<f64>() {
                        datapath.flow_count = flow_count;
                    }
                },

                (1..=2, Some(("masks", values)), Some(datapath)) => {
                    let counters = &mut datapath.mask_counters;
                    appctl::parse_counters(
                        "masks", &["hit", "total", "hit/pkt"], line.text, values,
                        |key, value| match key {
                            "hit" => counters.hit = value,
                            "total" => counters.total = value,
                            _ => counters.hit_ratio = value,
                        }
                    )?;
                },

                // Ports and whatever else may be listed there
                (1..=2, _, Some(_)) => {},

                (depth, _, _) => {
                    return Err(StructureError::UnexpectedDepth {
                        depth,
                        line: line.text.to_owned(),
                    });
                },
            }
        }

        datapaths.extend(current);
        Ok(datapaths)
    }
}




/// Performance benchmarks
///
/// These are ignored by default. Run them with `cargo test -- --ignored`.
///
#[cfg(test)]
mod benchmarks {
    use super::DatapathSummary;

    define_parser_benchs!(
        DatapathSummary,
        "\"system@ovs-system:\\n  lookups: hit:1220 missed:30 lost:0\\n  flows: 4\\n  masks: hit:1532 total:2 hit/pkt:1.23\\n  port 0: ovs-system (internal)\\n  port 1: br0 (internal)\\n\"",
        500_000
    );
}
