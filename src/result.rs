/*!
The outcome of evaluating a rule or an action.

A [`MatchResult`] is a small tree: composite rules keep the results of their
parts as children, so a failure can be traced back to where it happened.
Children marked as debug nodes record attempts that did not influence the
overall outcome, e.g. the failed try of an optional rule.

[`MatchResult`]: struct.MatchResult.html
*/

use std::fmt;

/// The message stored on successful results.
const MATCHED: &str = "Matched correctly";

/// Number of spaces one level of nesting is indented by in messages.
const INDENT: usize = 4;

/// The kind of a [`MatchResult`](struct.MatchResult.html).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The input matched.
    Success,
    /// The input matched, with a remark.
    Warning,
    /// The input was understood but is not allowed here.
    ParseError,
    /// The input does not have the expected structure.
    SyntaxError,
    /// The grammar itself could not be evaluated.
    UnknownError,
}

impl Outcome {
    /// Whether this outcome counts as a match.
    pub fn is_successful(self) -> bool {
        match self {
            Outcome::Success | Outcome::Warning => true,
            Outcome::ParseError | Outcome::SyntaxError | Outcome::UnknownError => {
                false
            }
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            Outcome::Success => "SUCCESS",
            Outcome::Warning => "WARNING",
            Outcome::ParseError => "PARSE_ERROR",
            Outcome::SyntaxError => "SYNTAX_ERROR",
            Outcome::UnknownError => "UNKNOWN_ERROR",
        };
        f.write_str(name)
    }
}

/// The result of matching input against a rule.
///
/// `end` is the byte offset just past the matched input on success. On
/// failure it is the offset where the failing rule gave up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchResult {
    end: usize,
    outcome: Outcome,
    message: String,
    children: Vec<MatchResult>,
    debug: bool,
}

/// Constructors.
impl MatchResult {
    /// Creates a result from all of its parts.
    pub fn new(
        end: usize,
        outcome: Outcome,
        message: &str,
        children: Vec<MatchResult>,
    ) -> Self {
        MatchResult {
            end,
            outcome,
            message: message.to_owned(),
            children,
            debug: false,
        }
    }

    /// A successful match ending at `end`.
    pub fn success(end: usize) -> Self {
        MatchResult::new(end, Outcome::Success, MATCHED, Vec::new())
    }

    /// A successful match with a remark.
    pub fn warning(message: &str, end: usize) -> Self {
        MatchResult::new(end, Outcome::Warning, message, Vec::new())
    }

    /// A failure because the input is not allowed at `end`.
    pub fn parse_error(message: &str, end: usize) -> Self {
        MatchResult::new(end, Outcome::ParseError, message, Vec::new())
    }

    /// A structural failure at `end`, caused by `children`.
    pub fn syntax_error(
        message: &str,
        end: usize,
        children: Vec<MatchResult>,
    ) -> Self {
        MatchResult::new(end, Outcome::SyntaxError, message, children)
    }

    /// A failure to evaluate the grammar.
    pub fn unknown_error(message: &str, end: usize) -> Self {
        MatchResult::new(end, Outcome::UnknownError, message, Vec::new())
    }

    /// Combines `children` into one result.
    ///
    /// The result is a success exactly when no non-debug child failed, and a
    /// syntax error carrying `error` otherwise.
    pub fn composed(error: &str, end: usize, children: Vec<MatchResult>) -> Self {
        let failed = children.iter().any(|r| !r.is_successful() && !r.debug);
        if failed {
            MatchResult::syntax_error(error, end, children)
        } else {
            MatchResult::new(end, Outcome::Success, MATCHED, children)
        }
    }

    /// Marks this result as a debug node.
    ///
    /// Debug nodes never make a composed result fail and are hidden from
    /// messages by default.
    pub fn as_debug(mut self) -> Self {
        self.debug = true;
        self
    }
}

/// Accessors.
impl MatchResult {
    /// The end offset.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The kind of this result.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// The message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The results this one was composed of.
    pub fn children(&self) -> &[MatchResult] {
        &self.children
    }

    /// Whether this is a debug node.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Whether the outcome counts as a match.
    pub fn is_successful(&self) -> bool {
        self.outcome.is_successful()
    }
}

/// Messages.
impl MatchResult {
    /// Renders this result and its non-debug descendants, one per line.
    ///
    /// ```
    /// use pattern_token::MatchResult;
    ///
    /// let result = MatchResult::syntax_error(
    ///     "Expected a value",
    ///     0,
    ///     vec![MatchResult::parse_error("Unexpected \"x\"", 0)],
    /// );
    /// assert_eq!(
    ///     result.build_message(),
    ///     "[0] SYNTAX_ERROR: Unsuccessful: Expected a value. Caused by:\n    \
    ///      [0] PARSE_ERROR: Unsuccessful: Unexpected \"x\"\n"
    /// );
    /// ```
    pub fn build_message(&self) -> String {
        self.build_message_with(false)
    }

    /// Like `build_message`, including debug nodes if `debug` is set.
    pub fn build_message_with(&self, debug: bool) -> String {
        let mut message = String::new();
        self.write_message(&mut message, 0, debug);
        message
    }

    fn write_message(&self, out: &mut String, depth: usize, debug: bool) {
        let visible =
            move || self.children.iter().filter(move |r| debug || !r.debug);
        for _ in 0..depth * INDENT {
            out.push(' ');
        }
        out.push_str(&format!(
            "[{}] {}: {}: {}",
            self.end,
            self.outcome,
            if self.is_successful() { "Successful" } else { "Unsuccessful" },
            self.message
        ));
        if visible().next().is_some() {
            out.push_str(". Caused by:");
        }
        out.push('\n');
        for child in visible() {
            child.write_message(out, depth + 1, debug);
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.build_message())
    }
}
