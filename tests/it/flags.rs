use crate::matched;

#[test]
fn long_option() {
    let args = matched("--verbose", "--verbose");
    assert!(args.flag("verbose"));

    let args = matched("--verbose", "");
    assert!(!args.flag("verbose"));
}

#[test]
fn all_flags_default_to_false() {
    let args = matched("-abc --long -x[extra]", "");
    for name in ["a", "b", "c", "long", "extra"] {
        assert!(!args.flag(name), "{name} should default to false");
    }
}

#[test]
fn cluster_order_does_not_matter() {
    for pattern in ["-v[verbose]fo", "-fv[verbose]o", "-fov[verbose]"] {
        let args = matched(pattern, "-v -f");
        assert!(args.flag("verbose"), "in {pattern}");
        assert!(args.flag("f"), "in {pattern}");
        assert!(!args.flag("o"), "in {pattern}");
    }
}

#[test]
fn repeatable_flag_counts() {
    let args = matched("-vv", "");
    assert_eq!(args.count("v"), 0);

    let args = matched("-vv", "-v");
    assert_eq!(args.count("v"), 1);

    let args = matched("-vv", "-vvvvv");
    assert_eq!(args.count("v"), 5);

    let args = matched("-vv", "-v -v -v");
    assert_eq!(args.count("v"), 3);
}

#[test]
fn aliased_repeatable_flag() {
    let args = matched("-fvv[verbose]o", "-vvvv -f");
    assert_eq!(args.count("verbose"), 4);
    assert!(args.flag("f"));
    assert!(!args.flag("o"));

    // the alias itself works too
    let args = matched("-fvv[verbose]o", "--verbose --verbose");
    assert_eq!(args.count("verbose"), 2);
}

#[test]
fn input_flags_can_be_combined() {
    let args = matched("-abc", "-ac");
    assert!(args.flag("a"));
    assert!(!args.flag("b"));
    assert!(args.flag("c"));
}
