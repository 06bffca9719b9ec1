//! A mechanism for splitting "show" responses into depth-tagged lines
//!
//! The output of the vswitchd control interface has no formal grammar. What it
//! does have is a hierarchy, expressed through indentation: a datapath owns its
//! counters, a poll-mode thread owns its receive queues, and so on. Sadly, the
//! amount of whitespace used for each level is not consistent across commands
//! or releases (two spaces here, four there, a tab elsewhere).
//!
//! So rather than assuming an indentation unit, we proceed in two passes:
//!
//! - Measure the raw indentation width of every line of the response.
//! - Rank the distinct widths in increasing order, which gives each of them a
//!   canonical depth (0, 1, 2...).
//!
//! The record builders then only ever reason in terms of canonical depths.

use itertools::Itertools;
use log::trace;
use std::borrow::Cow;


/// Measure the indentation width of a line of text
///
/// This is the number of leading whitespace characters, with a tab counting as
/// much as a space. Lines which contain nothing but whitespace carry no
/// structural information, and are reported as None.
///
pub fn measure_indent(line: &str) -> Option<usize> {
    let mut width = 0;
    for c in line.chars() {
        if !c.is_whitespace() {
            return Some(width);
        }
        width += 1;
    }
    None
}


/// Split the text of a response into lines
///
/// Responses come to us as the control interface encoded them: wrapped in
/// quotes, with the `\n` escape sequence standing for line breaks and `\t`
/// standing for tabs. Raw newlines are also accepted as line separators.
/// The caller is expected to have already stripped the quotes.
///
pub fn split_response(text: &str) -> Vec<Cow<str>> {
    text.split("\\n")
        .flat_map(|chunk| chunk.split('\n'))
        .map(|line| {
            if line.contains("\\t") {
                Cow::Owned(line.replace("\\t", "\t"))
            } else {
                Cow::Borrowed(line)
            }
        })
        .collect()
}


/// Ladder of indentation widths observed in a response
///
/// Each distinct width is a rung of the ladder, and its canonical depth is the
/// rank of that rung, counting from the narrowest indentation.
///
#[derive(Debug, PartialEq)]
pub struct DepthLadder {
    /// Distinct indentation widths, sorted in increasing order
    widths: Vec<usize>,
}
//
impl DepthLadder {
    /// Build the ladder associated with the widths of a response's lines
    ///
    /// Blank lines may be included (as None), they do not add a rung. Any set
    /// of widths makes a valid ladder: whether a depth makes sense is up to the
    /// record builder which consumes it.
    ///
    pub fn analyze<I>(widths: I) -> Self
        where I: IntoIterator<Item = Option<usize>>
    {
        Self {
            widths: widths.into_iter()
                          .flatten()
                          .sorted()
                          .dedup()
                          .collect(),
        }
    }

    /// Canonical depth of a certain indentation width, if it was observed
    pub fn depth(&self, width: usize) -> Option<usize> {
        self.widths.binary_search(&width).ok()
    }

    /// Number of distinct depths in the response
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    /// Tell whether the response had no structural content at all
    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// INTERNAL: Depth of a width which is known to be on the ladder
    fn rank(&self, width: usize) -> usize {
        self.widths.binary_search(&width)
                   .unwrap_or_else(|insert_pos| insert_pos)
    }
}


/// A non-blank line of a response, along with its canonical depth
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TaggedLine<'a> {
    /// Nesting level of the line, 0 being the outermost
    pub depth: usize,

    /// Contents of the line, without surrounding whitespace
    pub text: &'a str,
}


/// Tag every non-blank line of a response with its canonical depth
pub fn tag_lines<'a, S>(lines: &'a [S]) -> Vec<TaggedLine<'a>>
    where S: AsRef<str>
{
    // First, evaluate the output depth
    let widths = lines.iter().map(|line| measure_indent(line.as_ref()));
    let ladder = DepthLadder::analyze(widths);

    // Then tag each line that has some structural content
    lines.iter()
         .filter_map(|line| {
             let line = line.as_ref();
             measure_indent(line).map(|width| (width, line.trim()))
         })
         .map(|(width, text)| {
             let depth = ladder.rank(width);
             trace!("depth {}: {}", depth, text);
             TaggedLine { depth, text }
         })
         .collect()
}
