mod common;

use plait::parser::*;
use plait::{FailureKind, Modality, ParseError, Settings, Source, Token};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn settings_deserialize_with_defaults() -> anyhow::Result<()> {
    let settings: Settings = serde_json::from_str(r#"{ "char-snippet-width": 3 }"#)?;
    assert_eq!(
        settings,
        Settings {
            char_snippet_width: 3,
            element_snippet_width: 8,
        }
    );

    let empty: Settings = serde_json::from_str("{}")?;
    assert_eq!(empty, Settings::default());
    Ok(())
}

#[test]
fn settings_shape_snippets() {
    let narrow = Settings {
        char_snippet_width: 3,
        ..Settings::default()
    };
    let state = string("x").run_with("abcdef", narrow);
    assert!(matches!(
        state.failure(),
        Some(ParseError::NoMatch { actual, .. }) if actual == "\"abc\"..."
    ));

    let state = string("x").run("abcdef");
    assert!(matches!(
        state.failure(),
        Some(ParseError::NoMatch { actual, .. }) if actual == "\"abcdef\""
    ));
}

#[test]
fn unbounded_snippet_width() {
    let everything = Settings {
        char_snippet_width: usize::MAX,
        element_snippet_width: usize::MAX,
    };

    let state = (string("a") + string("b")).run_with("ac", everything.clone());
    assert_eq!(state.failure().map(ParseError::position), Some(1));

    let state = (byte(0x01) + byte(0x02)).run_with(vec![0x01_u8, 0x03, 0x04], everything);
    assert_eq!(state.failure().map(ParseError::position), Some(1));
}

#[test]
fn settings_do_not_change_results() {
    let tight = Settings {
        char_snippet_width: 1,
        element_snippet_width: 1,
    };
    let parser = separated_by(character(','), digits());
    assert_eq!(
        parser.run_with("1,2", tight).into_result(),
        parser.run("1,2").into_result()
    );
}

#[test]
fn run_accepts_every_input_shape() {
    assert_eq!(any::<char>().run("a").cursor(), 1);
    assert_eq!(any::<char>().run(String::from("a")).cursor(), 1);
    assert_eq!(any::<u8>().run(&[1_u8, 2]).cursor(), 1);
    assert_eq!(any::<u8>().run(vec![1_u8]).cursor(), 1);
    assert_eq!(any::<u8>().run(&b"ab"[..]).cursor(), 1);

    let tokens = vec![Token::dataless("t")];
    assert_eq!(any::<Token>().run(tokens.as_slice()).cursor(), 1);
    assert_eq!(any::<Token>().run(tokens).cursor(), 1);
}

#[rstest]
#[case(Source::from("abc"), Modality::Characters)]
#[case(Source::from(vec![1_u8, 2]), Modality::Bytes)]
#[case(Source::from(vec![Token::dataless("t")]), Modality::Tokens)]
fn sources_know_their_modality(#[case] source: Source, #[case] modality: Modality) {
    assert_eq!(source.modality(), modality);
}

#[test]
fn fork_calls_one_continuation() {
    let describe = |input: &str| {
        digits().fork(
            input,
            |value, state| format!("{value} up to {}", state.cursor()),
            |error, state| format!("failed at {} from {}", error.position(), state.cursor()),
        )
    };

    assert_eq!(describe("12x"), "12 up to 2");
    assert_eq!(describe("x"), "failed at 0 from 0");
}

#[test]
fn get_result_works_with_question_mark() -> anyhow::Result<()> {
    let number: u32 = digits().get_result("250")?.parse()?;
    assert_eq!(number, 250);
    Ok(())
}

#[test]
fn modality_is_checked_before_parsing() {
    let error = bytes(vec![0x00]).get_result("a").unwrap_err();
    assert_eq!(
        error,
        ParseError::BadInputType {
            parser: "bytes".to_string(),
            position: 0,
            expected: plait::error::Modalities(Modality::Bytes.into()),
            actual: Modality::Characters,
        }
    );
    assert_eq!(
        error.to_string(),
        "bytes parser (position 0): expected byte input, got character input"
    );
}

#[test]
fn manual_states() {
    common::init_logging();

    let start = ParseState::new("abc");
    assert_eq!(start.remaining(), 3);
    assert!(!start.is_at_end());

    let next = string("ab").execute(&start);
    assert_eq!(next.cursor(), 2);
    assert_eq!(next.remaining(), 1);
    assert_eq!(next.snippet(), "\"c\"");

    let done = any_char().execute(&next);
    assert!(done.is_at_end());
    assert_eq!(done.snippet(), "end of input");
}

#[test]
fn failed_states_stay_failed() {
    let failed = digit().run("x");
    assert!(failed.is_failure());

    let after = succeed_with(1).execute(&failed);
    assert_eq!(after.failure(), failed.failure());
    assert_eq!(after.result(), None);
}

#[test]
fn errors_classify() {
    let cases = [
        (string("a").get_result("b").unwrap_err(), FailureKind::NoMatch),
        (string("a").get_result("").unwrap_err(), FailureKind::EndOfInput),
        (u8().get_result("a").unwrap_err(), FailureKind::BadInputType),
        (exactly(digit(), 2).get_result("1").unwrap_err(), FailureKind::CountOutOfRange),
        (fail::<String>("no").get_result("").unwrap_err(), FailureKind::UserRejected),
    ];
    for (error, kind) in cases {
        assert_eq!(error.kind(), kind);
    }
}
