use copyan_dtype::test::generators::argument_definitions;
use copyan_dtype::{ArgType, ArgumentDefinition, ScalarType};
use proptest::prelude::*;
use test_case::test_case;

use crate::{ArgumentDescriptor, Error};

#[test]
fn test_empty_is_explicit_token() {
    let descriptor = ArgumentDescriptor::default();
    assert_eq!(descriptor.serialize(), "()\n");
    assert_eq!(ArgumentDescriptor::parse("()\n").unwrap(), descriptor);
    assert_eq!(ArgumentDescriptor::parse("()").unwrap(), descriptor);
}

#[test]
fn test_serialize_layout() {
    let descriptor = ArgumentDescriptor::new(vec![
        ArgumentDefinition::buffer("X", ScalarType::Float32),
        ArgumentDefinition::scalar("N", ScalarType::Int32),
        ArgumentDefinition::stream("stream"),
    ]);

    assert_eq!(descriptor.serialize(), "X: buffer<float32>\nN: int32\nstream: stream\n");
}

#[test]
fn test_parse_without_trailing_newline() {
    let descriptor = ArgumentDescriptor::parse("x: bool\ny: buffer<bfloat16>").unwrap();
    assert_eq!(
        descriptor.args(),
        [ArgumentDefinition::new("x", ArgType::BOOL), ArgumentDefinition::buffer("y", ScalarType::BFloat16)]
    );
}

#[test_case("" ; "empty file")]
#[test_case("\n" ; "lone newline")]
#[test_case("   \n" ; "whitespace")]
#[test_case("x int32\n" ; "missing separator")]
#[test_case("x:int32\n" ; "separator without space")]
#[test_case("x: int33\n" ; "unknown tag")]
#[test_case("x: buffer<int32\n" ; "unterminated buffer tag")]
#[test_case("1x: int32\n" ; "name starts with digit")]
#[test_case("x: int32\nx: bool\n" ; "duplicate name")]
#[test_case("x: int32\n\ny: bool\n" ; "blank line between entries")]
#[test_case("x: int32\r\n" ; "carriage return")]
#[test_case("()\nx: int32\n" ; "empty token followed by entries")]
fn test_parse_rejects(text: &str) {
    assert!(ArgumentDescriptor::parse(text).is_err(), "accepted {text:?}");
}

#[test]
fn test_parse_error_names_line() {
    let err = ArgumentDescriptor::parse("a: int32\nb: float128\n").unwrap_err();
    assert!(err.to_string().starts_with("line 2:"), "{err}");
}

#[test]
fn test_read_missing_file_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kernel.args");

    let err = ArgumentDescriptor::read(&path).unwrap_err();
    assert!(matches!(err, Error::MalformedArgumentDescriptor { path: p, .. } if p == path));
}

#[test]
fn test_write_then_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kernel.args");
    let descriptor = ArgumentDescriptor::new(vec![ArgumentDefinition::buffer("out", ScalarType::Float16)]);

    descriptor.write(&path).unwrap();
    assert_eq!(ArgumentDescriptor::read(&path).unwrap(), descriptor);
}

proptest! {
    #[test]
    fn descriptor_round_trip(defs in argument_definitions(8)) {
        let descriptor = ArgumentDescriptor::new(defs);
        let parsed = ArgumentDescriptor::parse(&descriptor.serialize()).unwrap();
        prop_assert_eq!(parsed, descriptor);
    }
}
