//! This module defines what a "show" command parser is and how it's driven
//!
//! The textual output of a control interface command is not exploitable as-is.
//! It must be parsed back into typed records first, and this is what a parser
//! does: it takes the depth-tagged lines of a response as input, and provides
//! record collections as output. By nature, this operation is very specific to
//! a given command, aside from the basic text processing building blocks found
//! in the splitter module, so each command gets its own parser.
//!
//! Parsers are eager and fail-closed. They walk the entire response, and either
//! return every record that it describes, or an error that discards everything
//! parsed so far. Silently incomplete statistics would be indistinguishable
//! from a healthy but idle dataplane, which is worse than no statistics.

use crate::error::{ResponseError, StructureError};
use crate::splitter::{self, TaggedLine};
use log::{debug, warn};


/// All "show" command parsers are expected to implement the following trait
pub trait ShowParser {
    /// Name of the control interface command whose output this parses
    const COMMAND: &'static str;

    /// Record collections produced from one response
    type Output;

    /// Build records out of the depth-tagged lines of a response
    fn parse(lines: &[TaggedLine]) -> Result<Self::Output, StructureError>;
}


/// Run the whole parsing pipeline on a raw command response
///
/// The response is expected in the form in which the control interface sends
/// it, i.e. wrapped in quotes and with escaped line breaks. A response without
/// any non-blank line is an error in its own right, as no command of interest
/// answers with nothing when it succeeds.
///
pub fn parse_response<P: ShowParser>(raw: &str) -> Result<P::Output, ResponseError> {
    let lines = splitter::split_response(raw.trim_matches('"'));
    let tagged = splitter::tag_lines(&lines);
    if tagged.is_empty() {
        warn!("the '{}' command returned no data", P::COMMAND);
        return Err(ResponseError::Empty);
    }

    match P::parse(&tagged) {
        Ok(output) => {
            debug!("parsed the output of '{}' ({} lines)", P::COMMAND, tagged.len());
            Ok(output)
        },
        Err(error) => {
            warn!("rejected the output of '{}': {}", P::COMMAND, error);
            Err(error.into())
        },
    }
}


/// Define the benchmarks associated with a certain parser
///
/// This macro should be invoked inside of the module associated with the
/// benchmarks for a certain command. The parameters are the parser type, a
/// representative raw response, and the number of iterations to carry out.
///
#[cfg(test)]
macro_rules! define_parser_benchs {
    ($parser:ty, $response:expr, $bench_iters:expr) => {
        /// Benchmark for the full response parsing overhead
        #[test]
        #[ignore]
        fn parsing_overhead() {
            let response: &str = $response;
            testbench::benchmark($bench_iters, || {
                $crate::parser::parse_response::<$parser>(response)
                               .expect("Failed to parse response");
            });
        }
    };
}
