/*!
This module provides error types and result types using them.

Evaluating a [`Rule`] or an [`Action`] never fails with an error; the outcome
of a match is always reported through a [`MatchResult`].
The errors in here cover the remaining, genuinely exceptional cases: malformed
token text handed to the reader, and grammar definitions that cannot be used
as written.

[`Rule`]: ../rule/struct.Rule.html
[`Action`]: ../action/struct.Action.html
[`MatchResult`]: ../result/struct.MatchResult.html
*/

use std::result;

use thiserror::Error;

/// The result of reading token text, holding either the desired return value
/// (`Ok`) or a [`TokenError`] (`Err`).
///
/// ```
/// use pattern_token::{Token, TokenError};
///
/// match Token::parse("name(\"value\")") {
///     Ok(token) => {
///         // Do something with `token`.
///         # let _ = token;
///     }
///     Err(TokenError::MissingPrefix { found }) => {
///         // The text did not start with `@`.
///         assert_eq!(found, "name");
///     }
///     Err(err) => panic!("Unexpected error: {}", err),
/// }
/// ```
///
/// [`TokenError`]: enum.TokenError.html
pub type TokenResult<T> = result::Result<T, TokenError>;

/// The result of an operation on a grammar definition, holding either the
/// desired return value (`Ok`) or a [`GrammarError`] (`Err`).
///
/// [`GrammarError`]: enum.GrammarError.html
pub type GrammarResult<T> = result::Result<T, GrammarError>;

/// An error that occurred while reading or building a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// A token name did not start with the token prefix `@`.
    #[error("token \"{found}\" does not start with token prefix \"@\"")]
    MissingPrefix {
        /// The text that was read in place of a name.
        found: String,
    },
    /// A token name was not followed by a parameter block.
    #[error("token \"{name}\" has no parameter block")]
    MissingParameters {
        /// The name that was read.
        name: String,
    },
    /// The parameter block of a token was never closed.
    ///
    /// Quotes and escapes are taken into account, so a parenthesis within a
    /// quoted string does not count.
    #[error("unbalanced parameter block: {text}")]
    Unbalanced {
        /// The text from the opening parenthesis to the end of input.
        text: String,
    },
    /// A parameter was neither a nested token nor a quoted string.
    #[error("parameter is neither a token nor a quoted string: {param}")]
    InvalidParameter {
        /// The offending parameter, trimmed.
        param: String,
    },
    /// A token name contains characters that require escaping.
    #[error("token names cannot require escaping (\"{name}\" was not equal to \"{escaped}\")")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// What the name looks like once escaped.
        escaped: String,
    },
    /// A token name would not be read back unchanged from the textual form.
    ///
    /// Names must not contain parentheses or commas, and must not start or
    /// end with whitespace.
    #[error("token name {name:?} cannot be read back from its textual form")]
    UnreadableName {
        /// The rejected name.
        name: String,
    },
    /// There are remaining characters after a complete token was read.
    #[error("characters left after token: {rest}")]
    TrailingCharacters {
        /// The unread remainder.
        rest: String,
    },
}

/// An error in the definition or use of a grammar.
#[derive(Debug, Clone, Error)]
pub enum GrammarError {
    /// A regex rule was given a pattern the `regex` crate rejects.
    #[error("invalid regex {pattern:?}: {source}")]
    InvalidRegex {
        /// The pattern as given by the caller.
        pattern: String,
        /// The error reported by the regex compiler.
        #[source]
        source: regex::Error,
    },
    /// A lazy reference named a rule or action that was never bound.
    #[error("nothing is bound to \"{name}\"")]
    Unbound {
        /// The unbound name.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_error_messages() {
        let err = TokenError::MissingPrefix { found: "foo".to_owned() };
        assert_eq!(
            err.to_string(),
            "token \"foo\" does not start with token prefix \"@\""
        );
        let err = TokenError::InvalidName {
            name: "a\"b".to_owned(),
            escaped: "a\\\"b".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "token names cannot require escaping (\"a\"b\" was not equal to \"a\\\"b\")"
        );
    }

    #[test]
    fn grammar_error_source() {
        use std::error::Error;

        let source = regex::Regex::new("(").unwrap_err();
        let err = GrammarError::InvalidRegex {
            pattern: "(".to_owned(),
            source,
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("invalid regex \"(\""));

        let err = GrammarError::Unbound { name: "expr".to_owned() };
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "nothing is bound to \"expr\"");
    }
}
