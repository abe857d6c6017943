/*!
Naming contexts used while evaluating rules and actions.

Rule and action trees are immutable and may be shared freely. Recursive
grammars therefore refer to parts of themselves by name: a `set` rule binds a
name in the context, and a `lazy` rule looks it up when it is evaluated. A
fresh context is created for every top-level evaluation.
*/

use std::collections::HashMap;

use tracing::trace;

use crate::action::Action;
use crate::error::{GrammarError, GrammarResult};
use crate::rule::Rule;

/// What is known about one name.
#[derive(Clone, Debug, Default)]
struct Binding {
    rule: Option<Rule>,
    text: Option<String>,
}

/// The context of one evaluation of a rule tree.
///
/// ```
/// use pattern_token::Context;
/// use pattern_token::rule::{literal, set};
///
/// let mut context = Context::new();
/// let result = set("greeting", literal("hi")).match_at("hi!", 0, &mut context);
/// assert!(result.is_successful());
/// assert_eq!(context.captured("greeting"), Some("hi"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Context {
    bindings: HashMap<String, Binding>,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Default::default()
    }

    /// Binds `rule` to `name`, replacing any earlier binding.
    pub fn bind(&mut self, name: &str, rule: Rule) {
        trace!(name, "binding rule");
        self.bindings.entry(name.to_owned()).or_default().rule = Some(rule);
    }

    /// Records `text` as the last input matched under `name`.
    pub fn record(&mut self, name: &str, text: &str) {
        self.bindings.entry(name.to_owned()).or_default().text =
            Some(text.to_owned());
    }

    /// Returns the rule bound to `name`.
    pub fn rule(&self, name: &str) -> GrammarResult<Rule> {
        self.bindings
            .get(name)
            .and_then(|binding| binding.rule.clone())
            .ok_or_else(|| GrammarError::Unbound { name: name.to_owned() })
    }

    /// Returns the text last matched under `name`, if any.
    pub fn captured(&self, name: &str) -> Option<&str> {
        self.bindings
            .get(name)
            .and_then(|binding| binding.text.as_ref())
            .map(|text| &text[..])
    }

    /// Whether anything is bound to `name`.
    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings
            .get(name)
            .map_or(false, |binding| binding.rule.is_some())
    }

    /// Removes all bindings and captured text.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}

/// The context of one evaluation of an action tree.
///
/// Actions are bound separately from rules. Plain rules used inside actions
/// (literal adapters and stop rules) are evaluated with the embedded
/// [`Context`](struct.Context.html).
#[derive(Clone, Debug, Default)]
pub struct TokenizerContext {
    actions: HashMap<String, Action>,
    matching: Context,
}

impl TokenizerContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Default::default()
    }

    /// Binds `action` to `name`, replacing any earlier binding.
    pub fn bind(&mut self, name: &str, action: Action) {
        trace!(name, "binding action");
        self.actions.insert(name.to_owned(), action);
    }

    /// Returns the action bound to `name`.
    pub fn action(&self, name: &str) -> GrammarResult<Action> {
        self.actions
            .get(name)
            .cloned()
            .ok_or_else(|| GrammarError::Unbound { name: name.to_owned() })
    }

    /// The context plain rules are matched with.
    pub fn matching(&self) -> &Context {
        &self.matching
    }

    /// Mutable access to the context plain rules are matched with.
    pub fn matching_mut(&mut self) -> &mut Context {
        &mut self.matching
    }

    /// Removes all bindings, including those of the embedded context.
    pub fn clear(&mut self) {
        self.actions.clear();
        self.matching.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action;
    use crate::rule::literal;

    #[test]
    fn unbound_lookup() {
        let context = Context::new();
        match context.rule("missing") {
            Err(GrammarError::Unbound { name }) => assert_eq!(name, "missing"),
            other => panic!("Unexpected result: {:?}", other),
        }
        assert!(!context.is_bound("missing"));
        assert_eq!(context.captured("missing"), None);
    }

    #[test]
    fn bind_and_record_are_independent() {
        let mut context = Context::new();
        context.record("x", "abc");
        assert!(!context.is_bound("x"));
        assert_eq!(context.captured("x"), Some("abc"));

        context.bind("x", literal("a"));
        assert!(context.is_bound("x"));
        assert_eq!(context.captured("x"), Some("abc"));
        assert!(context.rule("x").is_ok());

        context.clear();
        assert!(!context.is_bound("x"));
        assert_eq!(context.captured("x"), None);
    }

    #[test]
    fn tokenizer_context() {
        let mut context = TokenizerContext::new();
        match context.action("a") {
            Err(err) => assert_eq!(err.to_string(), "nothing is bound to \"a\""),
            other => panic!("Unexpected result: {:?}", other),
        }
        context.bind("a", action::literal(literal("a")));
        context.matching_mut().bind("b", literal("b"));
        assert!(context.action("a").is_ok());
        assert!(context.matching().is_bound("b"));
        context.clear();
        assert!(context.action("a").is_err());
        assert!(!context.matching().is_bound("b"));
    }
}
