/*!
The output tree produced by tokenizing actions.

A [`Token`] has a name and an ordered list of [`Element`]s, each of which is
either a piece of text or a nested token. Tokens have a textual form,

```text
@name("text", @nested("more text"), @empty())
```

written by [`write`] and [`write_pretty`] and read back by [`Token::parse`].
Text elements are quoted and escaped like string literals; names are written
as they are and therefore must not need escaping.

[`Token`]: struct.Token.html
[`Element`]: enum.Element.html
[`write`]: struct.Token.html#method.write
[`write_pretty`]: struct.Token.html#method.write_pretty
[`Token::parse`]: struct.Token.html#method.parse
*/

use std::fmt;
use std::str::FromStr;

use crate::error::{TokenError, TokenResult};
use crate::escape;
use crate::reader::TokenReader;

/// The character every token name starts with in the textual form.
pub const TOKEN_PREFIX: char = '@';

/// Indentation per nesting level used by `write_pretty`.
const INDENT: &str = "    ";

/// Whether `name` can be used as a token name.
///
/// A name is written as it is, so it must not need escaping. It also must not
/// contain the delimiters of parameter blocks, `(`, `)` and `,`, and must not
/// start or end with whitespace, which is trimmed when reading.
pub fn is_valid_name(name: &str) -> bool {
    escape::is_canonical(name) && is_readable_name(name)
}

fn is_readable_name(name: &str) -> bool {
    !name.contains(|c| c == '(' || c == ')' || c == ',') && name.trim() == name
}

/// A named node of the output tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    name: String,
    elements: Vec<Element>,
}

/// One element of a token.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Element {
    /// A piece of text.
    Text(String),
    /// A nested token.
    Token(Token),
}

impl Element {
    /// Returns the text, if this is a text element.
    pub fn as_text(&self) -> Option<&str> {
        match *self {
            Element::Text(ref text) => Some(text),
            Element::Token(_) => None,
        }
    }

    /// Returns the token, if this is a token element.
    pub fn as_token(&self) -> Option<&Token> {
        match *self {
            Element::Text(_) => None,
            Element::Token(ref token) => Some(token),
        }
    }

    fn write_to(&self, out: &mut String) {
        match *self {
            Element::Text(ref text) => write_quoted(text, out),
            Element::Token(ref token) => token.write_to(out),
        }
    }
}

impl From<Token> for Element {
    fn from(token: Token) -> Self {
        Element::Token(token)
    }
}

impl From<String> for Element {
    fn from(text: String) -> Self {
        Element::Text(text)
    }
}

impl<'a> From<&'a str> for Element {
    fn from(text: &'a str) -> Self {
        Element::Text(text.to_owned())
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut out = String::new();
        self.write_to(&mut out);
        f.write_str(&out)
    }
}

/// Construction and access.
impl Token {
    /// Creates a token without elements.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidName` if `name` contains characters that
    /// would need escaping, and `TokenError::UnreadableName` if the name
    /// would not be read back unchanged (see [`is_valid_name`]).
    ///
    /// # Examples
    ///
    /// ```
    /// use pattern_token::Token;
    ///
    /// let token = Token::new("pair").unwrap().with("a").with("b");
    /// assert_eq!(token.to_string(), "@pair(\"a\", \"b\")");
    /// assert!(Token::new("tab\there").is_err());
    /// assert!(Token::new("call(").is_err());
    /// ```
    ///
    /// [`is_valid_name`]: fn.is_valid_name.html
    pub fn new(name: &str) -> TokenResult<Self> {
        let escaped = escape::escape(name);
        if escaped != name {
            return Err(TokenError::InvalidName {
                name: name.to_owned(),
                escaped,
            });
        }
        if !is_readable_name(name) {
            return Err(TokenError::UnreadableName {
                name: name.to_owned(),
            });
        }
        Ok(Token::unchecked(name, Vec::new()))
    }

    /// Creates a token whose name has already been validated.
    pub(crate) fn unchecked(name: &str, elements: Vec<Element>) -> Self {
        Token {
            name: name.to_owned(),
            elements,
        }
    }

    /// The name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The elements, in order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Mutable access to the elements.
    pub fn elements_mut(&mut self) -> &mut Vec<Element> {
        &mut self.elements
    }

    /// Appends an element.
    pub fn push<E: Into<Element>>(&mut self, element: E) {
        self.elements.push(element.into());
    }

    /// Appends an element, builder style.
    pub fn with<E: Into<Element>>(mut self, element: E) -> Self {
        self.push(element);
        self
    }

    /// Returns the first directly nested token called `name`.
    pub fn first(&self, name: &str) -> Option<&Token> {
        self.tokens().find(|token| token.name == name)
    }

    /// Returns all directly nested tokens called `name`.
    pub fn all(&self, name: &str) -> Vec<&Token> {
        self.tokens().filter(|token| token.name == name).collect()
    }

    /// Returns all directly nested tokens.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.elements.iter().filter_map(Element::as_token)
    }

    /// Returns all text elements of this token, ignoring nested tokens.
    pub fn texts(&self) -> Vec<&str> {
        self.elements.iter().filter_map(Element::as_text).collect()
    }
}

/// Writing and reading.
impl Token {
    /// Writes the token on one line.
    pub fn write(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    /// Writes the token with one element per line, nested elements indented
    /// by four spaces per level.
    ///
    /// ```
    /// use pattern_token::Token;
    ///
    /// let token = Token::new("outer")
    ///     .unwrap()
    ///     .with("a")
    ///     .with(Token::new("inner").unwrap());
    /// assert_eq!(
    ///     token.write_pretty(),
    ///     "@outer(\n    \"a\",\n    @inner()\n)"
    /// );
    /// ```
    pub fn write_pretty(&self) -> String {
        let mut out = String::new();
        self.write_pretty_to(&mut out, 0);
        out
    }

    /// Reads a single token from `input`.
    ///
    /// Whitespace around the token is ignored; anything else after it is an
    /// error.
    #[tracing::instrument]
    pub fn parse(input: &str) -> TokenResult<Self> {
        let mut reader = TokenReader::new(input);
        let token = reader.next_token()?;
        reader.finish()?;
        Ok(token)
    }

    fn write_to(&self, out: &mut String) {
        out.push(TOKEN_PREFIX);
        out.push_str(&self.name);
        out.push('(');
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            element.write_to(out);
        }
        out.push(')');
    }

    fn write_pretty_to(&self, out: &mut String, depth: usize) {
        push_indent(out, depth);
        out.push(TOKEN_PREFIX);
        out.push_str(&self.name);
        out.push('(');
        if self.elements.is_empty() {
            out.push(')');
            return;
        }
        out.push('\n');
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                out.push_str(",\n");
            }
            match *element {
                Element::Text(ref text) => {
                    push_indent(out, depth + 1);
                    write_quoted(text, out);
                }
                Element::Token(ref token) => token.write_pretty_to(out, depth + 1),
            }
        }
        out.push('\n');
        push_indent(out, depth);
        out.push(')');
    }
}

fn write_quoted(text: &str, out: &mut String) {
    out.push('"');
    out.push_str(&escape::escape(text));
    out.push('"');
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.write())
    }
}

impl FromStr for Token {
    type Err = TokenError;

    fn from_str(s: &str) -> TokenResult<Self> {
        Token::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Token {
        Token::new("array")
            .unwrap()
            .with(Token::new("number").unwrap().with("1"))
            .with("sep")
            .with(Token::new("number").unwrap().with("2"))
    }

    #[test]
    fn invalid_names() {
        assert_eq!(
            Token::new("a\"b"),
            Err(TokenError::InvalidName {
                name: "a\"b".to_owned(),
                escaped: "a\\\"b".to_owned(),
            })
        );
        assert!(Token::new("a\\b").is_err());
        assert!(Token::new("plain_name").is_ok());
    }

    #[test]
    fn names_must_read_back_unchanged() {
        for name in &["x ", " x", "\u{2003}x", "a(b", "a)b", "a,b"] {
            assert_eq!(
                Token::new(name),
                Err(TokenError::UnreadableName { name: (*name).to_owned() })
            );
            assert!(!is_valid_name(name));
        }
        for name in &["with space", "a.b:c", "<=", "@at", ""] {
            let token = Token::new(name).unwrap().with("v");
            assert_eq!(Token::parse(&token.write()), Ok(token.clone()));
            let outer = Token::new("outer").unwrap().with(token).with("w");
            assert_eq!(Token::parse(&outer.write()), Ok(outer.clone()));
            assert_eq!(Token::parse(&outer.write_pretty()), Ok(outer));
        }
    }

    #[test]
    fn write_escapes_text() {
        let token = Token::new("t").unwrap().with("say \"hi\"\n");
        assert_eq!(token.write(), "@t(\"say \\\"hi\\\"\\n\")");
        assert_eq!(Token::new("empty").unwrap().write(), "@empty()");
    }

    #[test]
    fn write_nested() {
        assert_eq!(
            sample().write(),
            "@array(@number(\"1\"), \"sep\", @number(\"2\"))"
        );
    }

    #[test]
    fn write_pretty_nested() {
        let token = sample().with(Token::new("empty").unwrap());
        assert_eq!(
            token.write_pretty(),
            "@array(\n    \
             @number(\n        \"1\"\n    ),\n    \
             \"sep\",\n    \
             @number(\n        \"2\"\n    ),\n    \
             @empty()\n\
             )"
        );
    }

    #[test]
    fn lookups() {
        let token = sample();
        assert_eq!(token.first("number").map(|t| t.texts()), Some(vec!["1"]));
        assert_eq!(token.all("number").len(), 2);
        assert_eq!(token.first("missing"), None);
        assert_eq!(token.texts(), vec!["sep"]);
        assert_eq!(token.tokens().count(), 2);
    }

    #[test]
    fn parse_round_trip() {
        let token = sample();
        assert_eq!(Token::parse(&token.write()), Ok(token.clone()));
        assert_eq!(token.write_pretty().parse::<Token>(), Ok(token));
    }

    #[test]
    fn element_display() {
        assert_eq!(Element::from("a\tb").to_string(), "\"a\\tb\"");
        assert_eq!(
            Element::from(Token::new("x").unwrap()).to_string(),
            "@x()"
        );
    }
}
