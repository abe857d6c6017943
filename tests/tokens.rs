//! Round trips between token trees and their textual form.

use pattern_token::token::is_valid_name;
use pattern_token::{Element, Token, TokenError, TokenReader};
use proptest::prelude::*;

fn arb_name() -> impl Strategy<Value = String> {
    // Spaces, punctuation and non-ASCII letters, but never at the ends.
    "[a-z0-9_ .:;!?@#%*+=<>/|\u{e9}\u{3bb}-]{0,10}"
        .prop_filter("valid token name", |name| is_valid_name(name))
}

fn arb_token() -> impl Strategy<Value = Token> {
    let leaf = arb_name().prop_map(|name| Token::new(&name).unwrap());
    leaf.prop_recursive(4, 32, 6, |inner| {
        (
            arb_name(),
            prop::collection::vec(
                prop_oneof![
                    any::<String>().prop_map(Element::Text),
                    inner.prop_map(Element::Token),
                ],
                0..6,
            ),
        )
            .prop_map(|(name, elements)| {
                let mut token = Token::new(&name).unwrap();
                for element in elements {
                    token.push(element);
                }
                token
            })
    })
}

proptest! {
    #[test]
    fn write_then_parse(token in arb_token()) {
        prop_assert_eq!(Token::parse(&token.write()), Ok(token));
    }

    #[test]
    fn write_pretty_then_parse(token in arb_token()) {
        prop_assert_eq!(token.write_pretty().parse::<Token>(), Ok(token));
    }

    #[test]
    fn several_tokens_in_sequence(tokens in prop::collection::vec(arb_token(), 0..5)) {
        let text: Vec<String> = tokens.iter().map(Token::write).collect();
        let mut reader = TokenReader::new(&text.join("\n"));
        let read: Result<Vec<_>, _> = reader.tokens().collect();
        prop_assert_eq!(read, Ok(tokens));
    }
}

#[test]
fn empty_strings_survive() {
    let token = Token::new("t").unwrap().with("").with("");
    // `""` is a quoted empty string, not an empty parameter.
    assert_eq!(token.write(), "@t(\"\", \"\")");
    assert_eq!(Token::parse(&token.write()), Ok(token));
}

#[test]
fn reader_errors() {
    assert_eq!(
        Token::parse("array(\"1\")"),
        Err(TokenError::MissingPrefix {
            found: "array".to_owned()
        })
    );
    assert!(matches!(
        Token::parse("@array(\"1\""),
        Err(TokenError::Unbalanced { .. })
    ));
    assert!(matches!(
        Token::parse("@array(1)"),
        Err(TokenError::InvalidParameter { .. })
    ));
    assert!(matches!(
        Token::parse("@array() @more()"),
        Err(TokenError::TrailingCharacters { .. })
    ));
}

#[test]
fn hand_written_pretty_form() {
    let text = r#"
        @person(
            @name(
                "Ada"
            ),
            @languages(
                "English",
                "French"
            ),
            @note(
                "wrote \"the\" first program\n"
            )
        )
    "#;
    let token = Token::parse(text).unwrap();
    assert_eq!(token.name(), "person");
    assert_eq!(token.first("name").unwrap().texts(), vec!["Ada"]);
    assert_eq!(
        token.first("languages").unwrap().texts(),
        vec!["English", "French"]
    );
    assert_eq!(
        token.first("note").unwrap().texts(),
        vec!["wrote \"the\" first program\n"]
    );
}
