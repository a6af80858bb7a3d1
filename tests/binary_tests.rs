use plait::parser::*;
use plait::{Error, FailureKind, Modality, ParseError};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case(u8(), vec![0xff], 255)]
#[case(s8(), vec![0xff], -1)]
#[case(s8(), vec![0x80], -128)]
#[case(u16_be(), vec![0x01, 0x02], 0x0102)]
#[case(u16_le(), vec![0x01, 0x02], 0x0201)]
#[case(s16_be(), vec![0xff, 0xfe], -2)]
#[case(s16_le(), vec![0x00, 0x80], -32768)]
#[case(u32_be(), vec![0x00, 0x00, 0x01, 0x00], 256)]
#[case(u32_le(), vec![0x78, 0x56, 0x34, 0x12], 0x1234_5678)]
#[case(s32_be(), vec![0xff, 0xff, 0xff, 0xff], -1)]
#[case(s32_le(), vec![0x00, 0x00, 0x00, 0x80], -2_147_483_648)]
fn decodes_fixed_widths(
    #[case] parser: BoxedParser<i128>,
    #[case] input: Vec<u8>,
    #[case] expected: i128,
) {
    let width = input.len();
    let state = parser.run(input);
    assert_eq!(state.result(), Some(&expected));
    assert_eq!(state.cursor(), width);
}

#[test]
fn generic_widths() -> anyhow::Result<()> {
    let three = binary(3, Sign::Unsigned, Endian::Big)?;
    assert_eq!(three.get_result(&[0x01_u8, 0x00, 0x00])?, 65536);

    let eight = binary(8, Sign::Unsigned, Endian::Little)?;
    assert_eq!(eight.get_result(&[0xff_u8; 8])?, i128::from(u64::MAX));
    Ok(())
}

#[test]
fn unsupported_widths_are_rejected() {
    assert!(matches!(
        binary(9, Sign::Signed, Endian::Big),
        Err(Error::UnsupportedWidth(9))
    ));
    assert!(exact_binary(0, Sign::Signed, Endian::Big, 0).is_err());
}

#[test]
fn short_input_is_end_of_input() {
    let error = u32_be().get_result(&[0x01_u8, 0x02]).unwrap_err();
    assert_eq!(
        error,
        ParseError::EndOfInput {
            parser: "binary".to_string(),
            position: 0,
            expected: "4 binary bytes".to_string(),
            available: 2,
        }
    );
}

#[test]
fn exact_values() {
    assert_eq!(exact_u16_be(0x0102).get_result(&[0x01_u8, 0x02]).unwrap(), 0x0102);
    assert_eq!(exact_s8(-1).get_result(&[0xff_u8]).unwrap(), -1);

    let state = exact_u16_be(0x0102).run(&[0x01_u8, 0x03]);
    assert_eq!(state.cursor(), 0);
    assert!(matches!(
        state.failure(),
        Some(ParseError::NoMatch { expected, actual, .. })
            if expected == "number 258 in binary" && actual == "number 259 in binary"
    ));
}

#[test]
fn binary_needs_bytes() {
    let error = u8().get_result("a").unwrap_err();
    assert!(matches!(
        error,
        ParseError::BadInputType {
            actual: Modality::Characters,
            ..
        }
    ));
    assert_eq!(error.kind(), FailureKind::BadInputType);
}

#[test]
fn optional_binary_still_needs_bytes() {
    let state = maybe(u8()).run("abc");
    assert_eq!(state.result(), None);
    assert_eq!(
        state.failure().map(ParseError::kind),
        Some(FailureKind::BadInputType)
    );

    assert_eq!(maybe(u8()).get_result(&[0x07_u8]).unwrap(), Some(7));
    assert_eq!(maybe(u8()).get_result(Vec::<u8>::new()).unwrap(), None);
}

#[test]
fn binary_fields_in_sequence() {
    let header = bytes(b"HD".to_vec()) * (u8() + u16_le());
    let (version, length) = header.get_result(&[b'H', b'D', 0x02, 0x10, 0x00]).unwrap();
    assert_eq!(version, 2);
    assert_eq!(length, 16);
}

#[test]
fn tagged_record() {
    let record = exact_u8(0x01) * repeat(s16_be(), 2) | exact_u8(0x02) * repeat(u8(), 1);
    assert_eq!(
        record.get_result(&[0x01_u8, 0xff, 0xff, 0x00, 0x05]).unwrap(),
        vec![-1, 5]
    );
    assert_eq!(record.get_result(&[0x02_u8, 0x07]).unwrap(), vec![7]);
    assert!(record.run(&[0x03_u8]).is_failure());
}
