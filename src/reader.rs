/*!
This module provides [`TokenReader`], which reads tokens from their textual
form.

Most of the time [`Token::parse`] is all that is needed. A `TokenReader` is
useful to read several tokens from one input, e.g. a file with one token per
line.

```
use pattern_token::TokenReader;

let mut reader = TokenReader::new("@a(\"1\")\n@b(@c())\n");
let names: Vec<String> = reader
    .tokens()
    .map(|token| token.unwrap().name().to_owned())
    .collect();
assert_eq!(names, vec!["a", "b"]);
```

[`TokenReader`]: struct.TokenReader.html
[`Token::parse`]: ../token/struct.Token.html#method.parse
*/

use tracing::debug;

use crate::cursor::Cursor;
use crate::error::{TokenError, TokenResult};
use crate::escape::{self, EscapeState};
use crate::token::{Element, Token, TOKEN_PREFIX};

/// A reader of tokens in their textual form.
#[derive(Clone, Debug)]
pub struct TokenReader {
    cursor: Cursor,
    /// Tracks string literals and parentheses of parameter blocks.
    format: EscapeState,
}

/// Basic functions.
impl TokenReader {
    /// Creates a reader at the start of `input`.
    pub fn new(input: &str) -> Self {
        TokenReader {
            cursor: Cursor::new(input),
            format: escape::java_format().brackets('(', ')').quote('"'),
        }
    }

    /// Whether anything but whitespace is left to read.
    pub fn has_next(&self) -> bool {
        self.cursor.content()[self.cursor.byte_offset()..]
            .chars()
            .any(|c| !c.is_whitespace())
    }

    /// Skips trailing whitespace and fails if anything else is left.
    pub fn finish(&mut self) -> TokenResult<()> {
        self.cursor.consume_all(char::is_whitespace);
        if self.cursor.has_next() {
            return Err(TokenError::TrailingCharacters {
                rest: self.cursor.remaining(),
            });
        }
        Ok(())
    }

    /// Returns an iterator over the remaining tokens.
    ///
    /// The iterator ends after the first error.
    pub fn tokens(&mut self) -> Tokens {
        Tokens {
            reader: self,
            failed: false,
        }
    }
}

/// Reading.
impl TokenReader {
    /// Reads the next token, skipping leading whitespace.
    pub fn next_token(&mut self) -> TokenResult<Token> {
        self.cursor.consume_all(char::is_whitespace);
        let head = self.cursor.read_until(|c| c == '(');
        let head = head.trim();
        let name = match head.strip_prefix(TOKEN_PREFIX) {
            Some(name) => name,
            None => {
                return Err(TokenError::MissingPrefix {
                    found: head.to_owned(),
                })
            }
        };
        if !self.cursor.has_next() {
            return Err(TokenError::MissingParameters {
                name: name.to_owned(),
            });
        }
        let mut token = Token::new(name)?;

        let mut engine = self.format.reset();
        let block = self.cursor.read_balanced(&mut engine);
        if !engine.should_consider() {
            return Err(TokenError::Unbalanced { text: block });
        }
        // Strip the enclosing parentheses.
        let inner = &block[1..block.len() - 1];
        for param in self.split_parameters(inner) {
            if let Some(element) = read_parameter(param.trim())? {
                token.push(element);
            }
        }
        debug!(
            name = token.name(),
            elements = token.elements().len(),
            "read token"
        );
        Ok(token)
    }

    /// Splits a parameter block at commas outside of strings and nested
    /// parameter blocks.
    fn split_parameters(&self, block: &str) -> Vec<String> {
        let mut params = Vec::new();
        let mut cursor = Cursor::new(block);
        loop {
            let mut engine = self.format.reset();
            params.push(cursor.read_raw_until_considering(|c| c == ',', &mut engine));
            if cursor.next().is_none() {
                break;
            }
        }
        params
    }
}

/// Reads one trimmed parameter. Empty and `null` parameters are skipped.
fn read_parameter(param: &str) -> TokenResult<Option<Element>> {
    if param.is_empty() || param == "null" {
        Ok(None)
    } else if param.starts_with(TOKEN_PREFIX) {
        Token::parse(param).map(|token| Some(Element::Token(token)))
    } else {
        match unquote(param) {
            Some(text) => Ok(Some(Element::Text(text))),
            None => Err(TokenError::InvalidParameter {
                param: param.to_owned(),
            }),
        }
    }
}

/// Returns the de-escaped content of a single quoted string.
fn unquote(param: &str) -> Option<String> {
    let inner = param.strip_prefix('"')?.strip_suffix('"')?;
    let mut engine = escape::java_format();
    for c in inner.chars() {
        engine.consider(c);
        if c == '"' && !engine.is_prev_escaped() {
            return None;
        }
    }
    if engine.is_escaped() {
        // The closing quote was escaped.
        return None;
    }
    Some(escape::de_escape(inner))
}

/// An iterator over the tokens of a [`TokenReader`].
///
/// [`TokenReader`]: struct.TokenReader.html
#[derive(Debug)]
pub struct Tokens<'a> {
    reader: &'a mut TokenReader,
    failed: bool,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = TokenResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || !self.reader.has_next() {
            return None;
        }
        let result = self.reader.next_token();
        self.failed = result.is_err();
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strings_may_contain_delimiters() {
        let token = Token::parse("@t(\"a, b\", \"(\", \"\\\")\")").unwrap();
        assert_eq!(token.texts(), vec!["a, b", "(", "\")"]);
    }

    #[test]
    fn null_and_empty_parameters_are_skipped() {
        let token = Token::parse("@t(null, , \"x\",)").unwrap();
        assert_eq!(token.texts(), vec!["x"]);
        assert_eq!(Token::parse("@t()").unwrap().elements().len(), 0);
    }

    #[test]
    fn missing_prefix() {
        assert_eq!(
            Token::parse("name(\"value\")"),
            Err(TokenError::MissingPrefix { found: "name".to_owned() })
        );
        assert_eq!(
            Token::parse(""),
            Err(TokenError::MissingPrefix { found: String::new() })
        );
    }

    #[test]
    fn missing_parameters() {
        assert_eq!(
            Token::parse("@name"),
            Err(TokenError::MissingParameters { name: "name".to_owned() })
        );
    }

    #[test]
    fn unbalanced() {
        assert_eq!(
            Token::parse("@a(@b(\"x\")"),
            Err(TokenError::Unbalanced { text: "(@b(\"x\")".to_owned() })
        );
        assert!(Token::parse("@a(\")\"").is_err());
    }

    #[test]
    fn invalid_parameter() {
        assert_eq!(
            Token::parse("@a(bare)"),
            Err(TokenError::InvalidParameter { param: "bare".to_owned() })
        );
        assert_eq!(
            Token::parse("@a(\"x\" \"y\")"),
            Err(TokenError::InvalidParameter { param: "\"x\" \"y\"".to_owned() })
        );
    }

    #[test]
    fn invalid_name() {
        match Token::parse("@a\\tb()") {
            Err(TokenError::InvalidName { name, .. }) => assert_eq!(name, "a\\tb"),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn trailing_characters() {
        assert_eq!(
            Token::parse("@a() x"),
            Err(TokenError::TrailingCharacters { rest: "x".to_owned() })
        );
        assert!(Token::parse("  @a()  \n").is_ok());
    }

    #[test]
    fn nested_errors_propagate() {
        assert_eq!(
            Token::parse("@a(@b(oops))"),
            Err(TokenError::InvalidParameter { param: "oops".to_owned() })
        );
    }

    #[test]
    fn several_tokens() {
        let mut reader = TokenReader::new(" @a() @b(\"1\")\n\n@c(@d())  ");
        let tokens: Vec<_> = reader.tokens().collect::<TokenResult<_>>().unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].first("d").map(Token::name), Some("d"));
        assert!(!reader.has_next());
        assert_eq!(reader.finish(), Ok(()));
    }

    #[test]
    fn iteration_stops_after_error() {
        let mut reader = TokenReader::new("@a() b() @c()");
        let results: Vec<_> = reader.tokens().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
