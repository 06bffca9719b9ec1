//! A query-oriented reader for the vswitchd control interface
//!
//! The control socket of vswitchd has a number of characteristics which are
//! best accounted for through a dedicated abstraction:
//!
//! - Establishing a connection and exchanging requests with it is somebody
//!   else's business. We only get to see it through the Connector and
//!   CommandClient traits, whose implementations own socket handling,
//!   request encoding and timeouts.
//! - "Show" commands are cheap and stateless, so we use one connection per
//!   query and close it right away, rather than keeping it around.
//! - Responses are small, textual, and only meaningful once parsed. So the
//!   reader hands them to a parser and returns the parser's result, instead
//!   of exposing the raw text.

use crate::error::TransportError;
use log::debug;
use std::path::PathBuf;
use std::time::Duration;


/// Where and how a vswitchd control socket can be reached
#[derive(Clone, Debug, PartialEq)]
pub struct Endpoint {
    /// Path to the control socket (usually a UNIX socket in /var/run)
    pub control_socket: PathBuf,

    /// Time to wait for a response before giving up
    pub timeout: Duration,
}


/// Capability to open connections to a control socket
pub trait Connector {
    /// Connection type, which should release its socket on drop
    type Client: CommandClient;

    /// Connect to a control socket
    fn connect(&self, endpoint: &Endpoint) -> Result<Self::Client, TransportError>;
}


/// Capability to execute control interface commands
pub trait CommandClient {
    /// Execute a command and return its raw textual response
    fn execute(&mut self,
               command: &str,
               args: &[&str]) -> Result<String, TransportError>;
}


/// Query-oriented reader for a certain control socket
pub struct CommandReader<'a, C: Connector> {
    /// Connection factory
    connector: &'a C,

    /// Control socket to be queried
    endpoint: &'a Endpoint,
}
//
impl<'a, C: Connector> CommandReader<'a, C> {
    /// Prepare to query a certain control socket
    pub fn new(connector: &'a C, endpoint: &'a Endpoint) -> Self {
        Self {
            connector,
            endpoint,
        }
    }

    /// Run a command and parse its response
    ///
    /// This method takes care of connecting to the control socket, executing
    /// the command, and disconnecting. The raw response is then handed to a
    /// user-provided parser, whose result is returned. Transport errors are
    /// propagated as-is, there is no retry.
    ///
    pub fn query<F, R>(&self,
                       command: &str,
                       args: &[&str],
                       mut parser: F) -> Result<R, TransportError>
        where F: FnMut(&str) -> R
    {
        debug!("querying '{}' from {}", command,
               self.endpoint.control_socket.display());

        // Get the response, dropping the connection as soon as possible
        let response = {
            let mut client = self.connector.connect(self.endpoint)?;
            client.execute(command, args)?
        };

        // Run the user-provided parser on the response
        Ok(parser(&response))
    }
}
