//! Statistics queries against the services of an Open vSwitch host
//!
//! This is the entry point of the crate: an AppClient resolves a target name
//! to a control socket, queries it through the reader, and runs the matching
//! parser on the response.

use crate::appctl::{Datapath, DatapathSummary, Pmd, PmdRxqUsage, Rxq};
use crate::error::Error;
use crate::parser::{self, ShowParser};
use crate::reader::{CommandReader, Connector, Endpoint};
use std::path::PathBuf;
use std::time::Duration;


/// Name of the vswitchd target, the only one which answers "show" commands
pub const VSWITCHD_SERVICE: &str = "vswitchd-service";

/// Default location of the vswitchd control socket
pub const DEFAULT_VSWITCHD_SOCKET: &str = "/var/run/openvswitch/ovs-vswitchd.ctl";

/// Default time to wait for a control socket to answer
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);


/// How to reach the services of an Open vSwitch host
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceConfig {
    /// Control socket of ovs-vswitchd
    pub vswitchd: Endpoint,
}
//
impl ServiceConfig {
    /// Use another vswitchd control socket
    pub fn with_control_socket<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.vswitchd.control_socket = path.into();
        self
    }

    /// Use another response timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.vswitchd.timeout = timeout;
        self
    }

    /// Find the endpoint associated with a certain target, if any
    pub fn endpoint(&self, target: &str) -> Option<&Endpoint> {
        match target {
            VSWITCHD_SERVICE => Some(&self.vswitchd),
            _ => None,
        }
    }
}
//
impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            vswitchd: Endpoint {
                control_socket: PathBuf::from(DEFAULT_VSWITCHD_SOCKET),
                timeout: DEFAULT_TIMEOUT,
            },
        }
    }
}


/// Client for the statistics exposed by Open vSwitch "show" commands
///
/// Every query is self-contained: it connects, runs one command, parses the
/// output and returns fresh records. Nothing is cached across queries.
///
pub struct AppClient<C: Connector> {
    /// Connection factory
    connector: C,

    /// Location of the services
    config: ServiceConfig,
}
//
impl<C: Connector> AppClient<C> {
    /// Set up a client
    pub fn new(connector: C, config: ServiceConfig) -> Self {
        Self {
            connector,
            config,
        }
    }

    /// Access the client's configuration
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Summarize the datapaths of a target (`dpif/show`)
    pub fn get_datapath_summary(&self, target: &str) -> Result<Vec<Datapath>, Error> {
        self.run::<DatapathSummary>(target)
    }

    /// Tell how receive queues are spread across the poll-mode threads of a
    /// target, and how busy they keep them (`dpif-netdev/pmd-rxq-show`)
    pub fn get_poll_thread_usage(&self,
                                 target: &str) -> Result<(Vec<Pmd>, Vec<Rxq>), Error> {
        self.run::<PmdRxqUsage>(target)
    }

    /// INTERNAL: Run a parameterless "show" command against a target
    fn run<P: ShowParser>(&self, target: &str) -> Result<P::Output, Error> {
        let endpoint = self.config.endpoint(target).ok_or_else(|| {
            Error::UnsupportedTarget {
                command: P::COMMAND,
                target: target.to_owned(),
            }
        })?;

        CommandReader::new(&self.connector, endpoint)
            .query(P::COMMAND, &[], parser::parse_response::<P>)
            .map_err(|source| Error::Transport {
                command: P::COMMAND,
                target: target.to_owned(),
                source,
            })?
            .map_err(|error| Error::from_response(P::COMMAND, target, error))
    }
}
