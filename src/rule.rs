/*!
Composable matching rules.

A [`Rule`] is an immutable tree, built with the free functions in this
module, that decides whether input matches at a given byte offset and how far
the match extends. Evaluation is backtracking: every rule is tried at a fixed
start offset, and composite rules retry their parts at other offsets as they
see fit.

Rules are cheap to clone and can be shared between threads. Recursion is
expressed through names: [`set_and_use`] binds a rule to a name before
evaluating it, and [`lazy`] refers to whatever is bound to a name when it is
evaluated.

# Examples

```
use pattern_token::rule::{completed, lazy, literal, optional, sequence, set_and_use};

// Balanced parentheses.
let parens = set_and_use(
    "parens",
    sequence(vec![literal("("), optional(lazy("parens")), literal(")")]),
);
assert_eq!(parens.matches("(())").end(), 4);
assert!(!completed(parens.clone()).matches("(()").is_successful());
```

[`Rule`]: struct.Rule.html
[`set_and_use`]: fn.set_and_use.html
[`lazy`]: fn.lazy.html
*/

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use tracing::{trace, warn};

use crate::context::Context;
use crate::error::{GrammarError, GrammarResult};
use crate::result::MatchResult;

type Refinement = Box<dyn Fn(&str, usize) -> MatchResult + Send + Sync>;

/// A matching rule.
///
/// See the [module documentation](index.html) for how rules are built.
#[derive(Clone)]
pub struct Rule(Arc<Inner>);

/// The possible rules.
///
/// Every variant but `Literal`, `Length`, `Regex` and `Lazy` holds other rules.
enum Inner {
    Literal(String),
    /// A number of characters, not bytes.
    Length(usize),
    /// Anchored at the start offset when compiled.
    Regex(Regex),
    Predicate {
        base: Rule,
        refine: Refinement,
    },
    Sequence(Vec<Rule>),
    And(Vec<Rule>),
    Or {
        longest: bool,
        alternatives: Vec<Rule>,
    },
    Not(Rule),
    Optional(Rule),
    Repeating {
        rule: Rule,
        at_least_one: bool,
    },
    NonGreedy {
        rule: Rule,
        stop: Rule,
        at_least_one: bool,
    },
    Set(String, Rule),
    SetAndUse(String, Rule),
    Lazy(String),
    Completed(Rule),
}

// `Debug` cannot be derived for `Inner` because it cannot be derived for
// `refine`. Implement it omitting `refine`.
impl fmt::Debug for Inner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Inner::Literal(ref literal) => {
                f.debug_tuple("Literal").field(literal).finish()
            }
            Inner::Length(n) => f.debug_tuple("Length").field(&n).finish(),
            Inner::Regex(ref re) => f.debug_tuple("Regex").field(re).finish(),
            Inner::Predicate { ref base, .. } => {
                f.debug_struct("Predicate").field("base", base).finish()
            }
            Inner::Sequence(ref rules) => {
                f.debug_tuple("Sequence").field(rules).finish()
            }
            Inner::And(ref rules) => f.debug_tuple("And").field(rules).finish(),
            Inner::Or { longest, ref alternatives } => f
                .debug_struct("Or")
                .field("longest", &longest)
                .field("alternatives", alternatives)
                .finish(),
            Inner::Not(ref rule) => f.debug_tuple("Not").field(rule).finish(),
            Inner::Optional(ref rule) => {
                f.debug_tuple("Optional").field(rule).finish()
            }
            Inner::Repeating { ref rule, at_least_one } => f
                .debug_struct("Repeating")
                .field("rule", rule)
                .field("at_least_one", &at_least_one)
                .finish(),
            Inner::NonGreedy { ref rule, ref stop, at_least_one } => f
                .debug_struct("NonGreedy")
                .field("rule", rule)
                .field("stop", stop)
                .field("at_least_one", &at_least_one)
                .finish(),
            Inner::Set(ref name, ref rule) => {
                f.debug_tuple("Set").field(name).field(rule).finish()
            }
            Inner::SetAndUse(ref name, ref rule) => {
                f.debug_tuple("SetAndUse").field(name).field(rule).finish()
            }
            Inner::Lazy(ref name) => f.debug_tuple("Lazy").field(name).finish(),
            Inner::Completed(ref rule) => {
                f.debug_tuple("Completed").field(rule).finish()
            }
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Rule {
    fn from_inner(inner: Inner) -> Self {
        Rule(Arc::new(inner))
    }

    /// Matches the whole of `input` from its start, with a fresh context.
    ///
    /// The match does not need to extend to the end of `input`; wrap the rule
    /// with [`completed`](fn.completed.html) for that.
    #[tracing::instrument(skip(self))]
    pub fn matches(&self, input: &str) -> MatchResult {
        self.match_at(input, 0, &mut Context::new())
    }

    /// Matches `input` at the byte offset `start`.
    ///
    /// `start` must lie on a character boundary; any other offset fails to
    /// match. The returned result's end is a byte offset into `input`.
    pub fn match_at(
        &self,
        input: &str,
        start: usize,
        context: &mut Context,
    ) -> MatchResult {
        match *self.0 {
            Inner::Literal(ref literal) => match_literal(literal, input, start),
            Inner::Length(n) => match_length(n, input, start),
            Inner::Regex(ref re) => match_regex(re, input, start),
            Inner::Predicate { ref base, ref refine } => {
                let result = base.match_at(input, start, context);
                if result.is_successful() {
                    refine(input, result.end())
                } else {
                    result
                }
            }
            Inner::Sequence(ref rules) => {
                match_sequence(rules, input, start, context)
            }
            Inner::And(ref rules) => match_and(rules, input, start, context),
            Inner::Or { longest, ref alternatives } => {
                match_or(longest, alternatives, input, start, context)
            }
            Inner::Not(ref rule) => {
                let result = rule.match_at(input, start, context);
                if result.is_successful() {
                    let disallowed = input.get(start..result.end()).unwrap_or("");
                    MatchResult::parse_error(
                        &format!("Disallowed input {:?}", disallowed),
                        start,
                    )
                } else {
                    MatchResult::success(start)
                }
            }
            Inner::Optional(ref rule) => {
                let result = rule.match_at(input, start, context);
                if result.is_successful() {
                    MatchResult::composed("", result.end(), vec![result])
                } else {
                    MatchResult::composed("", start, vec![result.as_debug()])
                }
            }
            Inner::Repeating { ref rule, at_least_one } => {
                match_repeating(rule, at_least_one, input, start, context)
            }
            Inner::NonGreedy { ref rule, ref stop, at_least_one } => {
                match_non_greedy(rule, stop, at_least_one, input, start, context)
            }
            Inner::Set(ref name, ref rule) => {
                let result = rule.match_at(input, start, context);
                if result.is_successful() {
                    context.bind(name, rule.clone());
                    capture(name, &result, input, start, context);
                }
                result
            }
            Inner::SetAndUse(ref name, ref rule) => {
                context.bind(name, rule.clone());
                let result = rule.match_at(input, start, context);
                if result.is_successful() {
                    capture(name, &result, input, start, context);
                }
                result
            }
            Inner::Lazy(ref name) => match context.rule(name) {
                Ok(rule) => {
                    trace!(name = &name[..], start, "resolved lazy rule");
                    rule.match_at(input, start, context)
                }
                Err(err) => {
                    warn!(%err, "lazy rule is unbound");
                    MatchResult::unknown_error(&err.to_string(), start)
                }
            },
            Inner::Completed(ref rule) => {
                let result = rule.match_at(input, start, context);
                let end = result.end();
                if !result.is_successful() {
                    MatchResult::syntax_error(
                        "Input did not match",
                        end,
                        vec![result],
                    )
                } else if end != input.len() {
                    let rest = input.get(end..).unwrap_or("");
                    MatchResult::parse_error(
                        &format!("Unexpected input {:?}", rest),
                        end,
                    )
                } else {
                    result
                }
            }
        }
    }
}

fn capture(
    name: &str,
    result: &MatchResult,
    input: &str,
    start: usize,
    context: &mut Context,
) {
    let text = input.get(start..result.end()).unwrap_or("");
    context.record(name, text);
}

fn match_literal(literal: &str, input: &str, start: usize) -> MatchResult {
    match input.get(start..) {
        Some(rest) if rest.starts_with(literal) => {
            MatchResult::success(start + literal.len())
        }
        _ => MatchResult::parse_error(&format!("Expected {:?}", literal), start),
    }
}

fn match_length(n: usize, input: &str, start: usize) -> MatchResult {
    let failure = || {
        MatchResult::parse_error(&format!("Expected {} more characters", n), start)
    };
    let rest = match input.get(start..) {
        Some(rest) => rest,
        None => return failure(),
    };
    if n == 0 {
        return MatchResult::success(start);
    }
    match rest.char_indices().nth(n - 1) {
        Some((i, c)) => MatchResult::success(start + i + c.len_utf8()),
        None => failure(),
    }
}

fn match_regex(re: &Regex, input: &str, start: usize) -> MatchResult {
    match input.get(start..).and_then(|rest| re.find(rest)) {
        Some(m) => MatchResult::success(start + m.end()),
        None => MatchResult::parse_error(
            &format!("Expected a match of /{}/", re.as_str()),
            start,
        ),
    }
}

fn match_sequence(
    rules: &[Rule],
    input: &str,
    start: usize,
    context: &mut Context,
) -> MatchResult {
    let mut children = Vec::with_capacity(rules.len());
    let mut pos = start;
    for rule in rules {
        let result = rule.match_at(input, pos, context);
        let end = result.end();
        let successful = result.is_successful();
        children.push(result);
        if !successful {
            return MatchResult::syntax_error("Sequence did not match", end, children);
        }
        pos = end;
    }
    MatchResult::composed("", pos, children)
}

fn match_and(
    rules: &[Rule],
    input: &str,
    start: usize,
    context: &mut Context,
) -> MatchResult {
    let children: Vec<_> = rules
        .iter()
        .map(|rule| rule.match_at(input, start, context))
        .collect();
    if children.iter().any(|r| !r.is_successful()) {
        return MatchResult::syntax_error("Not all rules matched", start, children);
    }
    let end = children.first().map_or(start, |r| r.end());
    if children.iter().any(|r| r.end() != end) {
        return MatchResult::syntax_error(
            "Rules matched different lengths",
            start,
            children,
        );
    }
    MatchResult::composed("", end, children)
}

fn match_or(
    longest: bool,
    alternatives: &[Rule],
    input: &str,
    start: usize,
    context: &mut Context,
) -> MatchResult {
    let mut failed = Vec::new();
    let mut best: Option<MatchResult> = None;
    for rule in alternatives {
        let result = rule.match_at(input, start, context);
        if !result.is_successful() {
            failed.push(result);
            continue;
        }
        if best.as_ref().map_or(true, |b| result.end() > b.end()) {
            best = Some(result);
            if !longest {
                break;
            }
        }
    }
    match best {
        Some(result) => result,
        None => MatchResult::syntax_error("No alternative matched", start, failed),
    }
}

fn match_repeating(
    rule: &Rule,
    at_least_one: bool,
    input: &str,
    start: usize,
    context: &mut Context,
) -> MatchResult {
    let mut children = Vec::new();
    let mut pos = start;
    loop {
        let result = rule.match_at(input, pos, context);
        if !result.is_successful() {
            if children.is_empty() && at_least_one {
                return MatchResult::syntax_error(
                    "Expected at least one repetition",
                    start,
                    vec![result],
                );
            }
            children.push(result.as_debug());
            break;
        }
        let end = result.end();
        children.push(result);
        if end == pos {
            break;
        }
        pos = end;
    }
    MatchResult::composed("", pos, children)
}

fn match_non_greedy(
    rule: &Rule,
    stop: &Rule,
    at_least_one: bool,
    input: &str,
    start: usize,
    context: &mut Context,
) -> MatchResult {
    let mut children = Vec::new();
    let mut pos = start;
    loop {
        let stopped = stop.match_at(input, pos, context);
        if stopped.is_successful() {
            if children.is_empty() && at_least_one {
                return MatchResult::parse_error(
                    "Expected at least one repetition before the stop rule",
                    start,
                );
            }
            break;
        }
        let result = rule.match_at(input, pos, context);
        let end = result.end();
        let successful = result.is_successful();
        children.push(result);
        if !successful {
            return MatchResult::syntax_error(
                "Repetition failed before the stop rule matched",
                end,
                children,
            );
        }
        if end == pos {
            return MatchResult::syntax_error(
                "Repetition made no progress before the stop rule matched",
                pos,
                children,
            );
        }
        pos = end;
    }
    MatchResult::composed("", pos, children)
}

/// Matches `literal` exactly.
pub fn literal(literal: &str) -> Rule {
    Rule::from_inner(Inner::Literal(literal.to_owned()))
}

/// Matches any `n` characters.
pub fn length(n: usize) -> Rule {
    Rule::from_inner(Inner::Length(n))
}

/// Matches any single character.
pub fn any_char() -> Rule {
    length(1)
}

/// Matches a regular expression, anchored at the start offset.
///
/// # Errors
///
/// Returns `GrammarError::InvalidRegex` if `pattern` does not compile.
pub fn regex(pattern: &str) -> GrammarResult<Rule> {
    let re = Regex::new(&format!("^(?:{})", pattern)).map_err(|source| {
        GrammarError::InvalidRegex {
            pattern: pattern.to_owned(),
            source,
        }
    })?;
    Ok(Rule::from_inner(Inner::Regex(re)))
}

/// Matches `base`, then lets `refine` decide the final result.
///
/// `refine` receives the whole input and the offset `base` matched up to. It
/// is not called if `base` fails.
///
/// ```
/// use pattern_token::MatchResult;
/// use pattern_token::rule::{predicate, regex};
///
/// let byte = predicate(regex("[0-9]+").unwrap(), |input, end| {
///     match input[..end].parse::<u32>() {
///         Ok(n) if n < 256 => MatchResult::success(end),
///         _ => MatchResult::parse_error("Not a byte", 0),
///     }
/// });
/// assert!(byte.matches("255").is_successful());
/// assert!(!byte.matches("256").is_successful());
/// ```
pub fn predicate<F>(base: Rule, refine: F) -> Rule
where
    F: Fn(&str, usize) -> MatchResult + Send + Sync + 'static,
{
    Rule::from_inner(Inner::Predicate {
        base,
        refine: Box::new(refine),
    })
}

/// Matches all `rules` one after another.
pub fn sequence<I>(rules: I) -> Rule
where
    I: IntoIterator<Item = Rule>,
{
    Rule::from_inner(Inner::Sequence(rules.into_iter().collect()))
}

/// Matches if all `rules` match the same input at the same offset.
pub fn and<I>(rules: I) -> Rule
where
    I: IntoIterator<Item = Rule>,
{
    Rule::from_inner(Inner::And(rules.into_iter().collect()))
}

/// Matches the first of `alternatives` that matches.
pub fn or<I>(alternatives: I) -> Rule
where
    I: IntoIterator<Item = Rule>,
{
    Rule::from_inner(Inner::Or {
        longest: false,
        alternatives: alternatives.into_iter().collect(),
    })
}

/// Matches the alternative with the longest match, the earliest one on ties.
pub fn longest<I>(alternatives: I) -> Rule
where
    I: IntoIterator<Item = Rule>,
{
    Rule::from_inner(Inner::Or {
        longest: true,
        alternatives: alternatives.into_iter().collect(),
    })
}

/// Matches the longest of `literals` that matches, the earliest one on ties.
pub fn one_of(literals: &[&str]) -> Rule {
    longest(literals.iter().map(|l| literal(l)))
}

/// Matches everything `rule` does not match, consuming nothing.
pub fn not(rule: Rule) -> Rule {
    Rule::from_inner(Inner::Not(rule))
}

/// Matches `rule` or nothing.
pub fn optional(rule: Rule) -> Rule {
    Rule::from_inner(Inner::Optional(rule))
}

/// Matches `rule` as often as possible, at least once.
pub fn repeating(rule: Rule) -> Rule {
    Rule::from_inner(Inner::Repeating { rule, at_least_one: true })
}

/// Matches `rule` as often as possible, possibly never.
pub fn repeating_or_none(rule: Rule) -> Rule {
    Rule::from_inner(Inner::Repeating { rule, at_least_one: false })
}

/// Matches `rule` repeatedly, at least once, until `stop` matches.
///
/// `stop` is checked before every repetition and is not consumed.
pub fn repeating_non_greedy(rule: Rule, stop: Rule) -> Rule {
    Rule::from_inner(Inner::NonGreedy { rule, stop, at_least_one: true })
}

/// Matches `rule` repeatedly until `stop` matches, possibly never.
pub fn repeating_or_none_non_greedy(rule: Rule, stop: Rule) -> Rule {
    Rule::from_inner(Inner::NonGreedy { rule, stop, at_least_one: false })
}

/// Matches `element`, followed by any number of `separator` and `element`.
pub fn list(element: Rule, separator: Rule) -> Rule {
    sequence(vec![
        element.clone(),
        repeating_or_none(sequence(vec![separator, element])),
    ])
}

/// Matches `rule` and afterwards binds it, and the matched text, to `name`.
pub fn set(name: &str, rule: Rule) -> Rule {
    Rule::from_inner(Inner::Set(name.to_owned(), rule))
}

/// Binds `rule` to `name`, then matches it.
///
/// `rule` may refer to itself through `lazy(name)`.
pub fn set_and_use(name: &str, rule: Rule) -> Rule {
    Rule::from_inner(Inner::SetAndUse(name.to_owned(), rule))
}

/// Matches the rule bound to `name` at the time of matching.
///
/// Matching an unbound name yields an `UnknownError` result.
pub fn lazy(name: &str) -> Rule {
    Rule::from_inner(Inner::Lazy(name.to_owned()))
}

/// Matches `rule` only if it extends to the end of the input.
pub fn completed(rule: Rule) -> Rule {
    Rule::from_inner(Inner::Completed(rule))
}
