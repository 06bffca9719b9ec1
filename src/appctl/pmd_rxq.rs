//! This module contains a parser for the output of `dpif-netdev/pmd-rxq-show`
//!
//! With the userspace datapath, packets are received by poll-mode threads
//! (PMDs), each of which busy-polls a set of receive queues (RXQs). This
//! command tells which queues each thread owns, and how much of the thread's
//! processing cycles each queue has been using:
//!
//! ```text
//! pmd thread numa_id 0 core_id 3:
//!   isolated : false
//!   port: dpdk0             queue-id:  0 (enabled)   pmd usage: 42 %
//!   port: vhost-user0       queue-id:  1 (disabled)  pmd usage:  0 %
//! ```
//!
//! Unlike `dpif/show`, this output is parsed strictly: every line must be
//! understood, since queue placement is what rebalancing decisions and alerts
//! are based on.

use crate::appctl::Fields;
use crate::error::StructureError;
use crate::parser::ShowParser;
use crate::splitter::TaggedLine;


/// Poll-mode thread, as reported by `dpif-netdev/pmd-rxq-show`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pmd {
    /// NUMA node on which the thread runs
    pub numa_node: u32,

    /// CPU core to which the thread is pinned
    pub core_id: u32,

    /// Whether the thread is reserved to its pinned queues (None until the
    /// corresponding attribute has been read)
    pub isolated: Option<bool>,
}
//
impl Pmd {
    /// Parse a thread header, e.g. "pmd thread numa_id 0 core_id 3:"
    fn from_header(line: &str) -> Result<Self, StructureError> {
        let fields_text = line.strip_suffix(':').unwrap_or(line);
        let found = fields_text.split_whitespace().count();
        if found != 6 {
            return Err(StructureError::FieldCount {
                expected: 6,
                found,
                line: line.to_owned(),
            });
        }

        let mut fields = Fields::within(line, fields_text);
        fields.literal("pmd", "pmd")?;
        fields.literal("thread", "thread")?;
        fields.literal("numa_id", "numa_id")?;
        let numa_node = fields.parse("numa_id")?;
        fields.literal("core_id", "core_id")?;
        let core_id = fields.parse("core_id")?;
        Ok(Self {
            numa_node,
            core_id,
            isolated: None,
        })
    }
}


/// Receive queue, as reported by `dpif-netdev/pmd-rxq-show`
#[derive(Clone, Debug, PartialEq)]
pub struct Rxq {
    /// Name of the port which the queue belongs to
    pub port_name: String,

    /// Index of the queue within its port
    pub queue_id: u32,

    /// Whether the queue is enabled
    pub enabled: bool,

    /// Share of the owning thread's processing cycles spent on this queue
    pub usage: f64,

    /// Core of the poll-mode thread which polls this queue
    pub owner_core_id: u32,
}
//
impl Rxq {
    /// Parse a queue line, e.g.
    /// "port: dpdk0 queue-id: 0 (enabled) pmd usage: 42 %"
    fn from_line(line: &str, owner_core_id: u32) -> Result<Self, StructureError> {
        let mut fields = Fields::new(line);
        let port_name = fields.labelled("port")?.to_owned();
        let queue_id = fields.labelled("queue-id")?
                             .parse::<u32>()
                             .map_err(|_| fields.bad_slot("queue-id"))?;
        let enabled = match fields.value("state")? {
            "(enabled)" => true,
            "(disabled)" => false,
            _ => return Err(fields.bad_slot("state")),
        };
        fields.literal("pmd", "pmd")?;
        let usage = fields.labelled("usage")?;
        let usage = usage.strip_suffix('%')
                         .unwrap_or(usage)
                         .parse::<f64>()
                         .map_err(|_| fields.bad_slot("usage"))?;
        fields.skip_if("%");
        fields.end()?;
        Ok(Self {
            port_name,
            queue_id,
            enabled,
            usage,
            owner_core_id,
        })
    }
}


/// Parse an isolation attribute, e.g. "isolated : true"
fn parse_isolated(line: &str) -> Result<bool, StructureError> {
    let mut fields = Fields::new(line);
    fields.literal("isolated", "isolated")?;
    fields.value("separator")?;
    let isolated = match fields.value("isolated")? {
        "true" => true,
        "false" => false,
        _ => return Err(fields.bad_slot("isolated")),
    };
    fields.end()?;
    Ok(isolated)
}


/// Parser for the output of `dpif-netdev/pmd-rxq-show`
pub struct PmdRxqUsage;
//
impl ShowParser for PmdRxqUsage {
    const COMMAND: &'static str = "dpif-netdev/pmd-rxq-show";
    type Output = (Vec<Pmd>, Vec<Rxq>);

    fn parse(lines: &[TaggedLine]) -> Result<Self::Output, StructureError> {
        let mut pmds: Vec<Pmd> = Vec::new();
        let mut rxqs = Vec::new();

        for line in lines {
            let first = line.text.split_whitespace().next().unwrap_or("");
            match (line.depth, first) {
                // Thread headers are recorded right away
                (0, _) => pmds.push(Pmd::from_header(line.text)?),

                // Attributes belong to the most recently seen thread
                (1, "isolated") => {
                    let isolated = parse_isolated(line.text)?;
                    current_pmd(&mut pmds, line)?.isolated = Some(isolated);
                },
                (1, port) if port.starts_with("port:") => {
                    let owner_core_id = current_pmd(&mut pmds, line)?.core_id;
                    rxqs.push(Rxq::from_line(line.text, owner_core_id)?);
                },
                (1, token) => {
                    return Err(StructureError::UnknownAttribute {
                        token: token.to_owned(),
                        line: line.text.to_owned(),
                    });
                },

                (depth, _) => {
                    return Err(StructureError::UnexpectedDepth {
                        depth,
                        line: line.text.to_owned(),
                    });
                },
            }
        }

        Ok((pmds, rxqs))
    }
}


/// INTERNAL: Thread which the attribute on a certain line belongs to
fn current_pmd<'a>(pmds: &'a mut [Pmd],
                   line: &TaggedLine) -> Result<&'a mut Pmd, StructureError> {
    pmds.last_mut().ok_or_else(|| StructureError::Orphan {
        line: line.text.to_owned(),
    })
}


/// Unit tests
#[cfg(test)]
mod tests {
    use crate::appctl::parse_pmd_rxq_usage;
    use crate::error::{ResponseError, StructureError};
    use super::{Pmd, Rxq};

    /// INTERNAL: Parse a response which is expected to be well-formed
    fn parse_ok(raw: &str) -> (Vec<Pmd>, Vec<Rxq>) {
        parse_pmd_rxq_usage(raw).expect("Response should parse")
    }

    /// INTERNAL: Parse a response which is expected to be malformed
    fn parse_err(raw: &str) -> StructureError {
        match parse_pmd_rxq_usage(raw) {
            Err(ResponseError::Structure(error)) => error,
            other => panic!("Expected a structure error, got {:?}", other),
        }
    }

    /// INTERNAL: Build the response line describing a receive queue
    fn rxq_line(port: &str, queue: u32, usage: f64) -> String {
        format!("  port: {}  queue-id: {:2} (enabled)   pmd usage: {} %",
                port, queue, usage)
    }

    /// Check the reference single thread, single queue response
    #[test]
    fn single_queue() {
        let raw = "pmd thread numa_id 0 core_id 3:\n\tisolated : true\n\tport: dpdk0 queue-id: 0 (enabled) pmd usage: 42.5\n";
        let (pmds, rxqs) = parse_ok(raw);
        assert_eq!(pmds,
                   vec![Pmd { numa_node: 0, core_id: 3, isolated: Some(true) }]);
        assert_eq!(rxqs,
                   vec![Rxq {
                       port_name: "dpdk0".to_owned(),
                       queue_id: 0,
                       enabled: true,
                       usage: 42.5,
                       owner_core_id: 3,
                   }]);
    }

    /// Check that queues are attributed to the thread that precedes them
    #[test]
    fn queue_ownership() {
        let mut lines = Vec::new();
        let mut expected_owners = Vec::new();
        for (numa, core, queues) in &[(0, 1, 2), (0, 5, 0), (1, 17, 3)] {
            lines.push(format!("pmd thread numa_id {} core_id {}:", numa, core));
            lines.push("  isolated : false".to_owned());
            for queue in 0..*queues {
                lines.push(rxq_line("dpdk1", queue, 12.));
                expected_owners.push(*core);
            }
        }
        let raw = format!("\"{}\\n\"", lines.join("\\n"));

        let (pmds, rxqs) = parse_ok(&raw);
        assert_eq!(pmds.len(), 3);
        assert!(pmds.iter().all(|pmd| pmd.isolated == Some(false)));
        assert_eq!(rxqs.len(),
                   lines.iter().filter(|l| l.trim_start().starts_with("port:")).count());
        assert_eq!(rxqs.iter().map(|rxq| rxq.owner_core_id).collect::<Vec<_>>(),
                   expected_owners);
        assert_eq!(rxqs.iter().map(|rxq| rxq.queue_id).collect::<Vec<_>>(),
                   vec![0, 1, 0, 1, 2]);
    }

    /// Check the alternate layouts that vswitchd has used for queue lines
    #[test]
    fn queue_layouts() {
        let (pmds, rxqs) = parse_ok("pmd thread numa_id 1 core_id 9:\\n  port:vhu0 queue-id:4 (disabled) pmd usage:7%\\n  port: vhu1 queue-id: 5 (enabled) pmd usage: 0.5%");
        assert_eq!(pmds, vec![Pmd { numa_node: 1, core_id: 9, isolated: None }]);
        assert_eq!(rxqs,
                   vec![Rxq {
                       port_name: "vhu0".to_owned(),
                       queue_id: 4,
                       enabled: false,
                       usage: 7.,
                       owner_core_id: 9,
                   },
                   Rxq {
                       port_name: "vhu1".to_owned(),
                       queue_id: 5,
                       enabled: true,
                       usage: 0.5,
                       owner_core_id: 9,
                   }]);
    }

    /// Check that malformed thread headers are rejected
    #[test]
    fn bad_header() {
        // Wrong field count, even if well-formed lines follow
        assert_eq!(parse_err("pmd thread numa_id 0 core_id:\\n  isolated : true\\n  port: dpdk0 queue-id: 0 (enabled) pmd usage: 1"),
                   StructureError::FieldCount {
                       expected: 6,
                       found: 5,
                       line: "pmd thread numa_id 0 core_id:".to_owned(),
                   });

        // Wrong literal
        assert_eq!(parse_err("pmd thread numa 0 core_id 3:"),
                   StructureError::BadSlot {
                       slot: "numa_id",
                       line: "pmd thread numa 0 core_id 3:".to_owned(),
                   });

        // Unparseable numbers
        assert!(matches!(parse_err("pmd thread numa_id x core_id 3:"),
                         StructureError::BadSlot { slot: "numa_id", .. }));
        assert!(matches!(parse_err("pmd thread numa_id 0 core_id -3:"),
                         StructureError::BadSlot { slot: "core_id", .. }));
    }

    /// Check that isolation must be explicitly true or false
    #[test]
    fn bad_isolation() {
        assert!(matches!(parse_err("pmd thread numa_id 0 core_id 3:\\n  isolated : yes"),
                         StructureError::BadSlot { slot: "isolated", .. }));
        assert!(matches!(parse_err("pmd thread numa_id 0 core_id 3:\\n  isolated :"),
                         StructureError::BadSlot { slot: "isolated", .. }));
    }

    /// Check that every field of a queue line is validated
    #[test]
    fn bad_queue() {
        let header = "pmd thread numa_id 0 core_id 3:\\n  ";
        let slot_of = |queue_line: &str| {
            match parse_err(&format!("{}{}", header, queue_line)) {
                StructureError::BadSlot { slot, .. } => slot,
                other => panic!("Expected a bad slot, got {:?}", other),
            }
        };
        assert_eq!(slot_of("port:"), "port");
        assert_eq!(slot_of("port: dpdk0 queue: 0 (enabled) pmd usage: 1"), "queue-id");
        assert_eq!(slot_of("port: dpdk0 queue-id: x (enabled) pmd usage: 1"), "queue-id");
        assert_eq!(slot_of("port: dpdk0 queue-id: 0 enabled pmd usage: 1"), "state");
        assert_eq!(slot_of("port: dpdk0 queue-id: 0 (enabled) cpu usage: 1"), "pmd");
        assert_eq!(slot_of("port: dpdk0 queue-id: 0 (enabled) pmd usage: NOT AVAIL"), "usage");
        assert_eq!(slot_of("port: dpdk0 queue-id: 0 (enabled) pmd usage: 1 % extra"), "end");
    }

    /// Check that unknown attributes are rejected rather than skipped
    #[test]
    fn unknown_attribute() {
        assert_eq!(parse_err("pmd thread numa_id 0 core_id 3:\\n  overhead: 4 %"),
                   StructureError::UnknownAttribute {
                       token: "overhead:".to_owned(),
                       line: "overhead: 4 %".to_owned(),
                   });
    }

    /// Check that attributes need a thread to belong to
    #[test]
    fn orphan_attribute() {
        assert_eq!(parse_err("  isolated : true\\npmd thread numa_id 0 core_id 3:"),
                   StructureError::Orphan { line: "isolated : true".to_owned() });
    }

    /// Check that only two levels of nesting are accepted
    #[test]
    fn unexpected_depth() {
        assert_eq!(parse_err("pmd thread numa_id 0 core_id 3:\\n  port: dpdk0 queue-id: 0 (enabled) pmd usage: 1\\n    extra"),
                   StructureError::UnexpectedDepth {
                       depth: 2,
                       line: "extra".to_owned(),
                   });
    }

    /// Check that empty responses are rejected
    #[test]
    fn empty_response() {
        assert_eq!(parse_pmd_rxq_usage(""), Err(ResponseError::Empty));
        assert_eq!(parse_pmd_rxq_usage("\"  \\n \\n\""), Err(ResponseError::Empty));
    }
}
