/*!
Tokenizing actions.

An [`Action`] matches input like a [`Rule`] does, and at the same time
produces the elements of a [`Token`] tree. Plain rules are brought in with
[`literal`], which emits the text they matched, and [`wrap`] packages
whatever an action emits into a named token.

# Examples

```
use pattern_token::action::{consume_rule, list, sequence, wrap_rule};
use pattern_token::rule::{literal, regex};

let number = wrap_rule("number", regex("[0-9]+").unwrap());
let array = sequence(vec![
    consume_rule(literal("[")),
    list(number, consume_rule(literal(";"))),
    consume_rule(literal("]")),
]);

let (token, result) = array.tokenize("[1;2;3]", "array");
assert!(result.is_successful());
assert_eq!(
    token.unwrap().to_string(),
    "@array(@number(\"1\"), @number(\"2\"), @number(\"3\"))"
);
```

[`Action`]: struct.Action.html
[`Rule`]: ../rule/struct.Rule.html
[`Token`]: ../token/struct.Token.html
[`literal`]: fn.literal.html
[`wrap`]: fn.wrap.html
*/

use std::sync::Arc;

use tracing::{trace, warn};

use crate::context::TokenizerContext;
use crate::result::MatchResult;
use crate::rule::Rule;
use crate::token::{self, Element, Token};

/// The elements an action emitted, together with the result of matching.
///
/// On failure the elements are empty.
pub type Tokenized = (Vec<Element>, MatchResult);

/// A tokenizing action.
///
/// Actions are immutable and cheap to clone, like rules.
#[derive(Clone, Debug)]
pub struct Action(Arc<Inner>);

#[derive(Debug)]
enum Inner {
    Literal(Rule),
    Wrap(String, Action),
    Consume(Action),
    Sequence(Vec<Action>),
    Or {
        longest: bool,
        alternatives: Vec<Action>,
    },
    Optional(Action),
    Repeating {
        action: Action,
        at_least_one: bool,
    },
    NonGreedy {
        action: Action,
        stop: Rule,
        at_least_one: bool,
    },
    Set(String, Action),
    SetAndUse(String, Action),
    Lazy(String),
}

fn failed(result: MatchResult) -> Tokenized {
    (Vec::new(), result)
}

impl Action {
    fn from_inner(inner: Inner) -> Self {
        Action(Arc::new(inner))
    }

    /// Tokenizes `input` from its start with a fresh context and wraps
    /// everything emitted into a token called `name`.
    ///
    /// The token is `None` if the action did not match. As with rules, the
    /// match does not need to reach the end of `input`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not a valid token name.
    #[tracing::instrument(skip(self))]
    pub fn tokenize(&self, input: &str, name: &str) -> (Option<Token>, MatchResult) {
        let (elements, result) =
            wrap(name, self.clone()).tokenize_at(input, 0, &mut TokenizerContext::new());
        let token = elements.into_iter().next().and_then(|element| match element {
            Element::Token(token) => Some(token),
            Element::Text(_) => None,
        });
        (token, result)
    }

    /// Tokenizes `input` at the byte offset `start`.
    pub fn tokenize_at(
        &self,
        input: &str,
        start: usize,
        context: &mut TokenizerContext,
    ) -> Tokenized {
        match *self.0 {
            Inner::Literal(ref rule) => {
                let result = rule.match_at(input, start, context.matching_mut());
                if !result.is_successful() {
                    return failed(result);
                }
                let text = input.get(start..result.end()).unwrap_or("");
                let elements = if text.is_empty() {
                    Vec::new()
                } else {
                    vec![Element::Text(text.to_owned())]
                };
                (elements, result)
            }
            Inner::Wrap(ref name, ref action) => {
                let (elements, result) = action.tokenize_at(input, start, context);
                if result.is_successful() {
                    let token = Token::unchecked(name, elements);
                    (vec![Element::Token(token)], result)
                } else {
                    failed(result)
                }
            }
            Inner::Consume(ref action) => {
                let (_, result) = action.tokenize_at(input, start, context);
                (Vec::new(), result)
            }
            Inner::Sequence(ref actions) => {
                tokenize_sequence(actions, input, start, context)
            }
            Inner::Or { longest, ref alternatives } => {
                tokenize_or(longest, alternatives, input, start, context)
            }
            Inner::Optional(ref action) => {
                let (elements, result) = action.tokenize_at(input, start, context);
                if result.is_successful() {
                    let end = result.end();
                    (elements, MatchResult::composed("", end, vec![result]))
                } else {
                    let debug = vec![result.as_debug()];
                    (Vec::new(), MatchResult::composed("", start, debug))
                }
            }
            Inner::Repeating { ref action, at_least_one } => {
                tokenize_repeating(action, at_least_one, input, start, context)
            }
            Inner::NonGreedy { ref action, ref stop, at_least_one } => {
                tokenize_non_greedy(action, stop, at_least_one, input, start, context)
            }
            Inner::Set(ref name, ref action) => {
                let tokenized = action.tokenize_at(input, start, context);
                if tokenized.1.is_successful() {
                    context.bind(name, action.clone());
                    record(name, &tokenized.1, input, start, context);
                }
                tokenized
            }
            Inner::SetAndUse(ref name, ref action) => {
                context.bind(name, action.clone());
                let tokenized = action.tokenize_at(input, start, context);
                if tokenized.1.is_successful() {
                    record(name, &tokenized.1, input, start, context);
                }
                tokenized
            }
            Inner::Lazy(ref name) => match context.action(name) {
                Ok(action) => {
                    trace!(name = &name[..], start, "resolved lazy action");
                    action.tokenize_at(input, start, context)
                }
                Err(err) => {
                    warn!(%err, "lazy action is unbound");
                    failed(MatchResult::unknown_error(&err.to_string(), start))
                }
            },
        }
    }
}

fn record(
    name: &str,
    result: &MatchResult,
    input: &str,
    start: usize,
    context: &mut TokenizerContext,
) {
    let text = input.get(start..result.end()).unwrap_or("");
    context.matching_mut().record(name, text);
}

fn tokenize_sequence(
    actions: &[Action],
    input: &str,
    start: usize,
    context: &mut TokenizerContext,
) -> Tokenized {
    let mut elements = Vec::new();
    let mut children = Vec::with_capacity(actions.len());
    let mut pos = start;
    for action in actions {
        let (emitted, result) = action.tokenize_at(input, pos, context);
        let end = result.end();
        let successful = result.is_successful();
        children.push(result);
        if !successful {
            return failed(MatchResult::syntax_error(
                "Sequence did not match",
                end,
                children,
            ));
        }
        elements.extend(emitted);
        pos = end;
    }
    (elements, MatchResult::composed("", pos, children))
}

fn tokenize_or(
    longest: bool,
    alternatives: &[Action],
    input: &str,
    start: usize,
    context: &mut TokenizerContext,
) -> Tokenized {
    let mut failures = Vec::new();
    let mut best: Option<Tokenized> = None;
    for action in alternatives {
        let (elements, result) = action.tokenize_at(input, start, context);
        if !result.is_successful() {
            failures.push(result);
            continue;
        }
        if best.as_ref().map_or(true, |b| result.end() > b.1.end()) {
            best = Some((elements, result));
            if !longest {
                break;
            }
        }
    }
    match best {
        Some(tokenized) => tokenized,
        None => failed(MatchResult::syntax_error(
            "No alternative matched",
            start,
            failures,
        )),
    }
}

fn tokenize_repeating(
    action: &Action,
    at_least_one: bool,
    input: &str,
    start: usize,
    context: &mut TokenizerContext,
) -> Tokenized {
    let mut elements = Vec::new();
    let mut children = Vec::new();
    let mut pos = start;
    loop {
        let (emitted, result) = action.tokenize_at(input, pos, context);
        if !result.is_successful() {
            if children.is_empty() && at_least_one {
                return failed(MatchResult::syntax_error(
                    "Expected at least one repetition",
                    start,
                    vec![result],
                ));
            }
            children.push(result.as_debug());
            break;
        }
        let end = result.end();
        elements.extend(emitted);
        children.push(result);
        if end == pos {
            break;
        }
        pos = end;
    }
    (elements, MatchResult::composed("", pos, children))
}

fn tokenize_non_greedy(
    action: &Action,
    stop: &Rule,
    at_least_one: bool,
    input: &str,
    start: usize,
    context: &mut TokenizerContext,
) -> Tokenized {
    let mut elements = Vec::new();
    let mut children = Vec::new();
    let mut pos = start;
    loop {
        if stop.match_at(input, pos, context.matching_mut()).is_successful() {
            if children.is_empty() && at_least_one {
                return failed(MatchResult::parse_error(
                    "Expected at least one repetition before the stop rule",
                    start,
                ));
            }
            break;
        }
        let (emitted, result) = action.tokenize_at(input, pos, context);
        let end = result.end();
        let successful = result.is_successful();
        children.push(result);
        if !successful {
            return failed(MatchResult::syntax_error(
                "Repetition failed before the stop rule matched",
                end,
                children,
            ));
        }
        if end == pos {
            return failed(MatchResult::syntax_error(
                "Repetition made no progress before the stop rule matched",
                pos,
                children,
            ));
        }
        elements.extend(emitted);
        pos = end;
    }
    (elements, MatchResult::composed("", pos, children))
}

/// Matches `rule` and emits the matched text, unless it is empty.
pub fn literal(rule: Rule) -> Action {
    Action::from_inner(Inner::Literal(rule))
}

/// Wraps everything `action` emits into one token called `name`.
///
/// # Panics
///
/// Panics if `name` is not a valid token name, see
/// [`token::is_valid_name`](../token/fn.is_valid_name.html).
pub fn wrap(name: &str, action: Action) -> Action {
    assert!(token::is_valid_name(name), "invalid token name: {:?}", name);
    Action::from_inner(Inner::Wrap(name.to_owned(), action))
}

/// Wraps the text matched by `rule` into a token called `name`.
///
/// # Panics
///
/// Panics if `name` is not a valid token name.
pub fn wrap_rule(name: &str, rule: Rule) -> Action {
    wrap(name, literal(rule))
}

/// Matches `action` and discards what it emits.
pub fn consume(action: Action) -> Action {
    Action::from_inner(Inner::Consume(action))
}

/// Matches `rule` without emitting anything.
pub fn consume_rule(rule: Rule) -> Action {
    consume(literal(rule))
}

/// Matches all `actions` one after another, emitting what each one emits.
pub fn sequence<I>(actions: I) -> Action
where
    I: IntoIterator<Item = Action>,
{
    Action::from_inner(Inner::Sequence(actions.into_iter().collect()))
}

/// Like `sequence`, with each member's output wrapped into a token called
/// `name`.
///
/// # Panics
///
/// Panics if `name` contains characters that would need escaping.
pub fn sequence_named<I>(name: &str, actions: I) -> Action
where
    I: IntoIterator<Item = Action>,
{
    sequence(actions.into_iter().map(|action| wrap(name, action)))
}

/// Uses the first of `alternatives` that matches.
pub fn or<I>(alternatives: I) -> Action
where
    I: IntoIterator<Item = Action>,
{
    Action::from_inner(Inner::Or {
        longest: false,
        alternatives: alternatives.into_iter().collect(),
    })
}

/// Uses the alternative with the longest match, the earliest one on ties.
pub fn longest<I>(alternatives: I) -> Action
where
    I: IntoIterator<Item = Action>,
{
    Action::from_inner(Inner::Or {
        longest: true,
        alternatives: alternatives.into_iter().collect(),
    })
}

/// Matches `action` or nothing.
pub fn optional(action: Action) -> Action {
    Action::from_inner(Inner::Optional(action))
}

/// Matches `action` as often as possible, at least once.
pub fn repeating(action: Action) -> Action {
    Action::from_inner(Inner::Repeating { action, at_least_one: true })
}

/// Matches `action` as often as possible, possibly never.
pub fn repeating_or_none(action: Action) -> Action {
    Action::from_inner(Inner::Repeating { action, at_least_one: false })
}

/// Matches `action` repeatedly, at least once, until `stop` matches.
///
/// `stop` is checked before every repetition and is not consumed.
pub fn repeating_non_greedy(action: Action, stop: Rule) -> Action {
    Action::from_inner(Inner::NonGreedy { action, stop, at_least_one: true })
}

/// Matches `action` repeatedly until `stop` matches, possibly never.
pub fn repeating_or_none_non_greedy(action: Action, stop: Rule) -> Action {
    Action::from_inner(Inner::NonGreedy { action, stop, at_least_one: false })
}

/// Matches `element`, followed by any number of `separator` and `element`.
pub fn list(element: Action, separator: Action) -> Action {
    sequence(vec![
        element.clone(),
        repeating_or_none(sequence(vec![separator, element])),
    ])
}

/// Matches `action` and afterwards binds it to `name`.
pub fn set(name: &str, action: Action) -> Action {
    Action::from_inner(Inner::Set(name.to_owned(), action))
}

/// Binds `action` to `name`, then matches it.
///
/// `action` may refer to itself through `lazy(name)`.
pub fn set_and_use(name: &str, action: Action) -> Action {
    Action::from_inner(Inner::SetAndUse(name.to_owned(), action))
}

/// Matches the action bound to `name` at the time of tokenizing.
pub fn lazy(name: &str) -> Action {
    Action::from_inner(Inner::Lazy(name.to_owned()))
}
