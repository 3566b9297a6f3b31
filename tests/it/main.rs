mod flags;
mod typed;

use arguable::{Error, Matches};
use expect_test::Expect;

pub fn matched(pattern: &str, args: &str) -> Matches {
    arguable::parse_args(pattern, args.split_ascii_whitespace())
        .unwrap_or_else(|err| panic!("`{pattern}` vs `{args}`: {err}"))
}

pub fn match_err(pattern: &str, args: &str) -> Error {
    match arguable::parse_args(pattern, args.split_ascii_whitespace()) {
        Ok(_) => panic!("`{pattern}` vs `{args}` unexpectedly matched"),
        Err(err) => err,
    }
}

pub fn compile_err(pattern: &str, expect: Expect) {
    let err = arguable::Parser::new(pattern).unwrap_err();
    expect.assert_eq(&err.to_string());
}

#[test]
fn empty_pattern() {
    let args = matched("", "");
    assert_eq!(args.names().count(), 0);
    assert!(matches!(match_err("", "stray"), Error::Match(_)));
}

#[test]
fn metadata_round_trip() {
    let parser = arguable::Parser::new("")
        .unwrap()
        .with_name("bar")
        .with_description("foo");
    assert_eq!(parser.name(), Some("bar"));
    assert_eq!(parser.description(), Some("foo"));
}

#[test]
fn per_argument_help_is_accepted() {
    // unknown names are ignored, known ones are passed to the engine
    let parser = arguable::Parser::new("-v infile")
        .unwrap()
        .with_help("v", "enable verbose output")
        .with_help("nope", "never attached");
    let args = parser.try_parse(["-v", "in.txt"]).unwrap();
    assert!(args.flag("v"));
    assert_eq!(args.string("infile"), Some("in.txt"));
}
