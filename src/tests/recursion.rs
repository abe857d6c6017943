//! Tests for grammars that refer to themselves by name.

use pretty_assertions::assert_eq;

use crate::action;
use crate::context::{Context, TokenizerContext};
use crate::result::Outcome;
use crate::rule::*;
use crate::token::Token;

fn parens() -> Rule {
    set_and_use(
        "expr",
        sequence(vec![literal("("), optional(lazy("expr")), literal(")")]),
    )
}

#[test]
fn balanced_parentheses() {
    assert_eq!(parens().matches("(())").end(), 4);
    assert_eq!(parens().matches("()").end(), 2);
    assert!(!parens().matches("(()").is_successful());
    assert!(!parens().matches(")(").is_successful());
}

fn groups() -> Rule {
    set_and_use(
        "expr",
        sequence(vec![
            literal("("),
            repeating_or_none(lazy("expr")),
            literal(")"),
        ]),
    )
}

#[test]
fn sibling_groups() {
    assert_eq!(groups().matches("()").end(), 2);
    assert_eq!(groups().matches("(()())").end(), 6);
    assert_eq!(groups().matches("((())()(()))").end(), 12);
    assert_eq!(groups().matches("(()())()").end(), 6);
    assert!(completed(groups()).matches("(()())").is_successful());
    assert!(!groups().matches("(()()").is_successful());
    assert!(!completed(groups()).matches("())").is_successful());
}

#[test]
fn parentheses_record_captured_text() {
    let mut context = Context::new();
    let result = parens().match_at("((()))tail", 0, &mut context);
    assert_eq!(result.end(), 6);
    // The outermost match is recorded last.
    assert_eq!(context.captured("expr"), Some("((()))"));
}

#[test]
fn arithmetic() {
    let term = or(vec![
        regex("[0-9]+").unwrap(),
        sequence(vec![literal("("), lazy("sum"), literal(")")]),
    ]);
    let sum = completed(set_and_use("sum", list(term, one_of(&["+", "-"]))));
    assert!(sum.matches("1+2").is_successful());
    assert!(sum.matches("(1+(2-3))-4").is_successful());
    assert!(!sum.matches("(1+2").is_successful());
    assert!(!sum.matches("1+").is_successful());
}

#[test]
fn unbound_reference_is_unknown_error() {
    let rule = sequence(vec![literal("a"), lazy("b")]);
    let result = rule.matches("ab");
    assert_eq!(result.outcome(), Outcome::SyntaxError);
    assert_eq!(result.children()[1].outcome(), Outcome::UnknownError);
}

#[test]
fn reference_bound_by_earlier_set() {
    let header = or(vec![
        sequence(vec![literal("n:"), set("value", regex("[0-9]+").unwrap())]),
        sequence(vec![literal("w:"), set("value", regex("[a-z]+").unwrap())]),
    ]);
    let record = completed(sequence(vec![header, literal(","), lazy("value")]));
    assert!(record.matches("n:1,22").is_successful());
    assert!(record.matches("w:a,bc").is_successful());
    assert!(!record.matches("n:1,ab").is_successful());
    assert!(!record.matches("w:a,12").is_successful());
}

#[test]
fn context_is_reusable_after_clear() {
    let mut context = Context::new();
    assert!(parens().match_at("()", 0, &mut context).is_successful());
    assert!(context.is_bound("expr"));
    context.clear();
    let result = lazy("expr").match_at("()", 0, &mut context);
    assert_eq!(result.outcome(), Outcome::UnknownError);
}

fn nested_arrays() -> action::Action {
    let value = action::or(vec![
        action::wrap_rule("number", regex("[0-9]+").unwrap()),
        action::lazy("array"),
    ]);
    action::set_and_use(
        "array",
        action::wrap(
            "array",
            action::sequence(vec![
                action::consume_rule(literal("[")),
                action::list(value, action::consume_rule(literal(";"))),
                action::consume_rule(literal("]")),
            ]),
        ),
    )
}

#[test]
fn nested_arrays_tokenize() {
    let (token, result) = nested_arrays().tokenize("[1;[2;[3]];4]", "root");
    assert!(result.is_successful());
    assert_eq!(
        token.unwrap().write(),
        "@root(@array(@number(\"1\"), @array(@number(\"2\"), @array(@number(\"3\"))), \
         @number(\"4\")))"
    );
}

#[test]
fn nested_arrays_failure() {
    let (token, result) = nested_arrays().tokenize("[1;[2;3]", "root");
    assert_eq!(token, None);
    assert!(!result.is_successful());
}

#[test]
fn tokenizer_context_records_text() {
    let mut context = TokenizerContext::new();
    let (elements, result) = nested_arrays().tokenize_at("[[5]]", 0, &mut context);
    assert_eq!(result.end(), 5);
    assert_eq!(elements.len(), 1);
    assert_eq!(context.matching().captured("array"), Some("[[5]]"));

    let expected = Token::new("array")
        .unwrap()
        .with(Token::new("array").unwrap().with(Token::new("number").unwrap().with("5")));
    assert_eq!(elements[0].as_token(), Some(&expected));
}
