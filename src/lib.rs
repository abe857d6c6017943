/*!
This library matches text against grammars built from composable rules, and
extracts structured values from it while doing so.

It is made up of three parts that build on each other:

- an escape-aware scanner ([`EscapeState`] and [`Cursor`]) that reads text
  while keeping track of escape sequences, quotes and brackets,
- [`Rule`]s, which decide whether input matches and report why it did not in a
  [`MatchResult`],
- [`Action`]s, which match like rules and at the same time build a tree of
  named [`Token`]s. Tokens can be written to text and read back.

# Rules

Rules are built with the functions in the [`rule`] module and evaluated with
[`Rule::matches`] or, at an arbitrary byte offset, [`Rule::match_at`].
A rule tree is immutable; recursion goes through names that are bound in a
[`Context`] while matching.

```
use pattern_token::rule::{completed, list, literal, regex, sequence};

let array = completed(sequence(vec![
    literal("["),
    list(regex("[0-9]+").unwrap(), literal(";")),
    literal("]"),
]));

assert!(array.matches("[1;2;3]").is_successful());

let result = array.matches("[1;2;]");
assert!(!result.is_successful());
println!("{}", result.build_message());
```

Matching never fails with an error or panics. Whether input matched, and if
not, where and why, is all contained in the `MatchResult`.

# Actions and Tokens

Actions are built with the functions in the [`action`] module. Plain rules are
used in actions through [`action::literal`], which emits the text the rule
matched, or [`action::consume_rule`], which emits nothing. [`action::wrap`]
collects what an action emits into a named token.

```
use pattern_token::Token;
use pattern_token::action::{consume_rule, list, sequence, wrap_rule};
use pattern_token::rule::{literal, regex};

let array = sequence(vec![
    consume_rule(literal("[")),
    list(
        wrap_rule("number", regex("[0-9]+").unwrap()),
        consume_rule(literal(";")),
    ),
    consume_rule(literal("]")),
]);

let (token, result) = array.tokenize("[1;2;3]", "array");
assert!(result.is_successful());
let token = token.unwrap();
assert_eq!(
    token.write(),
    "@array(@number(\"1\"), @number(\"2\"), @number(\"3\"))"
);
assert_eq!(Token::parse(&token.write()), Ok(token));
```

# Escapes

The default escape format follows string literals as known from C-like
languages: `\` followed by one of `0 b t n f r " ' \`, or by `u` and four
hexadecimal digits. [`escape::escape`] and [`escape::de_escape`] convert
between the two representations; other formats can be configured on an
[`EscapeState`].

# Logging

The library logs through [`tracing`]. Top-level entry points open a span,
lazy references are traced, and references to unbound names are logged as
warnings. No subscriber is installed.

[`EscapeState`]: escape/struct.EscapeState.html
[`Cursor`]: cursor/struct.Cursor.html
[`Rule`]: rule/struct.Rule.html
[`MatchResult`]: result/struct.MatchResult.html
[`Action`]: action/struct.Action.html
[`Token`]: token/struct.Token.html
[`rule`]: rule/index.html
[`action`]: action/index.html
[`Rule::matches`]: rule/struct.Rule.html#method.matches
[`Rule::match_at`]: rule/struct.Rule.html#method.match_at
[`Context`]: context/struct.Context.html
[`action::literal`]: action/fn.literal.html
[`action::consume_rule`]: action/fn.consume_rule.html
[`action::wrap`]: action/fn.wrap.html
[`escape::escape`]: escape/fn.escape.html
[`escape::de_escape`]: escape/fn.de_escape.html
[`tracing`]: https://docs.rs/tracing
*/

#![deny(missing_docs)]

pub mod escape;
pub use escape::EscapeState;

pub mod cursor;
pub use cursor::Cursor;

pub mod context;
pub use context::{Context, TokenizerContext};

pub mod result;
pub use result::{MatchResult, Outcome};

pub mod rule;
pub use rule::Rule;

pub mod action;
pub use action::Action;

pub mod token;
pub use token::{Element, Token};

pub mod reader;
pub use reader::TokenReader;

mod error;
pub use error::{GrammarError, GrammarResult, TokenError, TokenResult};

#[cfg(test)]
mod tests;
