use plait::parser::*;
use plait::{Error, FailureKind, Modality, ParseError, Token};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn string_matches_prefix() {
    let state = string("hello").run("hello world");
    assert_eq!(state.result(), Some(&"hello".to_string()));
    assert_eq!(state.cursor(), 5);
}

#[test]
fn string_mismatch_is_no_match() {
    let state = string("abc").run("abd");
    let error = state.failure().unwrap();
    assert_eq!(error.kind(), FailureKind::NoMatch);
    assert_eq!(error.position(), 0);
    assert_eq!(error.parser(), "string");
}

#[test]
fn string_too_short_is_end_of_input() {
    let error = string("abc").get_result("ab").unwrap_err();
    assert!(matches!(
        error,
        ParseError::EndOfInput {
            position: 0,
            available: 2,
            ..
        }
    ));
}

#[test]
fn string_counts_chars_not_bytes() {
    let state = string("hé").run("héllo");
    assert_eq!(state.cursor(), 2);
}

#[test]
fn string_on_bytes_matches_utf8() {
    let state = string("hé").run("hé!".as_bytes());
    assert_eq!(state.result(), Some(&"hé".to_string()));
    assert_eq!(state.cursor(), 3);
}

#[test]
fn string_rejects_tokens() {
    let error = string("a").get_result(vec![Token::dataless("a")]).unwrap_err();
    assert!(matches!(
        error,
        ParseError::BadInputType {
            actual: Modality::Tokens,
            ..
        }
    ));
}

#[rstest]
#[case("7", true)]
#[case("x", false)]
#[case("", false)]
fn digit_cases(#[case] input: &str, #[case] matches: bool) {
    assert_eq!(digit().run(input).is_failure(), !matches);
}

#[test]
fn classes_report_their_own_name() {
    let error = digit().get_result("x").unwrap_err();
    assert_eq!(error.parser(), "digit");
    assert!(matches!(&error, ParseError::NoMatch { expected, .. } if expected == "a digit"));
}

#[test]
fn character_classes() {
    assert_eq!(digits().get_result("123abc").unwrap(), "123");
    assert_eq!(letters().get_result("abc1").unwrap(), "abc");
    assert_eq!(letter().get_result("q").unwrap(), 'q');
    assert_eq!(whitespace().get_result(" \t\nx").unwrap(), " \t\n");
    assert!(whitespace().run("x").is_failure());
}

#[test]
fn optional_whitespace_defaults_to_empty() {
    let state = optional_whitespace().run("x");
    assert_eq!(state.result(), Some(&String::new()));
    assert_eq!(state.cursor(), 0);
}

#[test]
fn single_characters() {
    assert_eq!(character('a').get_result("abc").unwrap(), 'a');
    assert_eq!(any_of("+-").get_result("-1").unwrap(), '-');
    assert!(any_of("+-").run("*").is_failure());

    let vowel = char_where("a vowel", |c| "aeiou".contains(c));
    let error = vowel.get_result("b").unwrap_err();
    assert!(matches!(error, ParseError::NoMatch { expected, .. } if expected == "a vowel"));
}

#[test]
fn regex_matches_at_cursor() -> anyhow::Result<()> {
    let word = regex("^[a-z]+")?;
    let state = word.run("abc123");
    assert_eq!(state.result(), Some(&"abc".to_string()));
    assert_eq!(state.cursor(), 3);

    // a match further along does not count
    let number = regex("[0-9]+")?;
    assert!(number.run("ab12").is_failure());
    Ok(())
}

#[test]
fn unanchored_patterns_match_only_at_cursor() -> anyhow::Result<()> {
    let digit_run = many(regex("[0-9]")?);
    let state = digit_run.run("12a3");
    assert_eq!(state.result(), Some(&vec!["1".to_string(), "2".to_string()]));
    assert_eq!(state.cursor(), 2);

    let error = regex("[0-9]+")?.get_result("x1").unwrap_err();
    assert!(matches!(
        error,
        ParseError::NoMatch { position: 0, expected, .. }
            if expected == "string matching pattern \"[0-9]+\""
    ));
    Ok(())
}

#[test]
fn regex_advances_by_chars() -> anyhow::Result<()> {
    let state = regex("^h.l")?.run("héllo");
    assert_eq!(state.cursor(), 3);
    Ok(())
}

#[test]
fn regex_group_returns_capture() -> anyhow::Result<()> {
    let value = regex_group("^([a-z]+)=([0-9]+)", 2)?;
    let state = value.run("x=42;");
    assert_eq!(state.result(), Some(&"42".to_string()));
    assert_eq!(state.cursor(), 4);
    Ok(())
}

#[test]
fn bad_patterns_are_construction_errors() {
    assert!(matches!(regex("("), Err(Error::InvalidPattern(_))));
    assert!(matches!(
        regex_group("^([a-z]+)", 5),
        Err(Error::MissingGroup { group: 5, .. })
    ));
}

#[test]
fn regex_rejects_bytes() -> anyhow::Result<()> {
    let error = regex("^a")?.get_result(b"a").unwrap_err();
    assert_eq!(error.kind(), FailureKind::BadInputType);
    Ok(())
}

#[test]
fn byte_literals() {
    let state = bytes(vec![0xca, 0xfe]).run(&[0xca_u8, 0xfe, 0x00]);
    assert_eq!(state.result(), Some(&vec![0xca, 0xfe]));
    assert_eq!(state.cursor(), 2);

    assert_eq!(byte(0x01).get_result(&[0x01_u8]).unwrap(), 0x01);
    assert_eq!(
        bytes(vec![0xca, 0xfe]).get_result(&[0xca_u8]).unwrap_err().kind(),
        FailureKind::EndOfInput
    );
}

#[test]
fn end_of_input_is_zero_width() {
    assert_eq!(end_of_input().run("").cursor(), 0);
    assert!(end_of_input().run("a").is_failure());
    assert!(!end_of_input().run(Vec::<u8>::new()).is_failure());
}

#[test]
fn any_element() {
    assert_eq!(any_char().get_result("z").unwrap(), 'z');
    assert_eq!(any::<u8>().get_result(&[9_u8]).unwrap(), 9);
    assert_eq!(any_char().get_result("").unwrap_err().kind(), FailureKind::EndOfInput);
    assert_eq!(
        any::<u8>().get_result("a").unwrap_err().kind(),
        FailureKind::BadInputType
    );
}

#[test]
fn peeking_consumes_nothing() {
    let state = peek::<char>(3).run("ab");
    assert_eq!(state.result(), Some(&vec!['a', 'b']));
    assert_eq!(state.cursor(), 0);

    assert_eq!(peek_string(2).get_result("xyz").unwrap(), "xy");
    assert_eq!(peek_char().get_result("").unwrap(), None);
    assert_eq!(peek_byte().get_result(&[7_u8]).unwrap(), Some(7));
}

#[test]
fn unconditional_parsers() {
    assert_eq!(succeed_with(5).get_result("").unwrap(), 5);

    let error = fail::<()>("nope").get_result("abc").unwrap_err();
    assert_eq!(
        error,
        ParseError::UserRejected {
            parser: "fail".to_string(),
            position: 0,
            message: "nope".to_string(),
        }
    );
}

#[test]
fn label_replaces_expected() {
    let paren = string("(").label("an opening parenthesis");
    let error = paren.get_result("x").unwrap_err();
    assert!(matches!(
        error,
        ParseError::NoMatch { expected, .. } if expected == "an opening parenthesis"
    ));
}

#[test]
fn named_replaces_parser_name() {
    let keyword = string("let").named("keyword");
    assert_eq!(keyword.get_result("var").unwrap_err().parser(), "keyword");
}
