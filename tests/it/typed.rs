use std::io::{Read, Write};

use arguable::{Error, Parser};

use crate::{match_err, matched};

#[test]
fn int_coercion() {
    let args = matched("x:int", "10");
    assert_eq!(args.int("x"), Some(10));

    assert!(matches!(match_err("x:int", "abc"), Error::Match(_)));
}

#[test]
fn optional_typed_positional() {
    let args = matched("x:int y:int?", "10 7");
    assert_eq!(args.int("x"), Some(10));
    assert_eq!(args.int("y"), Some(7));

    let args = matched("x:int y:int?", "10");
    assert_eq!(args.int("x"), Some(10));
    assert!(args.get("y").unwrap().is_absent());
}

#[test]
fn float_coercion() {
    let args = matched("x:float", "7.8");
    assert_eq!(args.float("x"), Some(7.8));
}

#[test]
fn bool_is_strict_true_false() {
    let args = matched("x:bool", "true");
    assert_eq!(args.boolean("x"), Some(true));

    let args = matched("x:bool", "false");
    assert_eq!(args.boolean("x"), Some(false));

    // nothing truthy: only the two literals parse
    assert!(matches!(match_err("x:bool", "yes"), Error::Match(_)));
}

#[test]
fn typed_long_option() {
    let args = matched("--jobs:int", "--jobs 4");
    assert_eq!(args.int("jobs"), Some(4));

    let args = matched("--jobs:int", "");
    assert!(args.get("jobs").unwrap().is_absent());
}

#[test]
fn typed_gathering() {
    let args = matched("xs:int...", "1 2 3");
    let xs: Vec<_> = args.list("xs").unwrap().iter().map(|v| v.as_int().unwrap()).collect();
    assert_eq!(xs, [1, 2, 3]);
}

#[test]
fn wfile_is_created_and_closed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt");

    let parser = Parser::new("x:wfile").unwrap();
    let mut args = parser.try_parse([path.to_str().unwrap()]).unwrap();

    let file = args.file("x").unwrap();
    assert!(file.is_open());
    assert!(file.writable());
    assert_eq!(file.path(), path);

    let mut file = args.take_file("x").unwrap();
    file.write_all(b"hello").unwrap();
    drop(file);

    args.close().unwrap();
    assert!(!args.file("x").unwrap().is_open());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
}

#[test]
fn rfile_reads_an_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("in.txt");
    std::fs::write(&path, "content").unwrap();

    let parser = Parser::new("x:rfile").unwrap();
    let args = parser.try_parse([path.to_str().unwrap()]).unwrap();

    let mut file = args.take_file("x").unwrap();
    let mut buf = String::new();
    file.read_to_string(&mut buf).unwrap();
    assert_eq!(buf, "content");
}

#[test]
fn rfile_must_exist() {
    let parser = Parser::new("x:rfile").unwrap();
    let err = parser.try_parse(["no-such-file-anywhere"]).unwrap_err();
    assert!(err.message().contains("can't open"), "{err}");
}

#[test]
fn close_runs_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt");

    let parser = Parser::new("x:wfile").unwrap();
    let args = parser.try_parse([path.to_str().unwrap()]).unwrap();
    let handle = args.file("x").unwrap().clone();
    assert!(handle.is_open());
    drop(args);
    // the container released its handle when it went out of scope
    assert!(!handle.is_open());
}
