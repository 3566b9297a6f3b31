//! Lowering: turn a [`ParserSpec`] into a `clap::Command` for the matching
//! engine.

use clap::builder::ValueParser;
use clap::{Arg, ArgAction, Command};

use crate::ast::{ArgSpec, Arity, Kind, ParserSpec, Ty};

/// Id of the single engine-side argument that gathers every positional
/// value. It contains a space, which a pattern name never can, so it cannot
/// collide with a declared argument.
pub(crate) const POSITIONALS: &str = "positional arguments";

pub(crate) fn command(
    spec: &ParserSpec,
    name: String,
    description: Option<&str>,
    help: &[(String, String)],
) -> Command {
    // the compiled grammar alone defines the argument set, so the engine's
    // auto flags are turned off
    let mut cmd = Command::new(name)
        .no_binary_name(true)
        .disable_help_flag(true)
        .disable_version_flag(true);
    if let Some(about) = description {
        cmd = cmd.about(about.to_string());
    }
    let mut has_positionals = false;
    for arg in spec.args() {
        if arg.is_positional() {
            has_positionals = true;
            continue;
        }
        // zero-width arguments consume nothing and are never registered;
        // collection fills in an empty list for them
        if matches!((arg.kind, arg.arity), (Kind::Value, Arity::Exactly(0))) {
            continue;
        }
        cmd = cmd.arg(lower(arg, help));
    }
    // positionals are not lowered one by one: the engine cannot split a run
    // of values across fixed-width positionals, nor accept an optional one
    // before a required one. A single greedy argument captures every
    // positional token; collection distributes them per declared arity.
    if has_positionals {
        cmd = cmd.arg(
            Arg::new(POSITIONALS)
                .num_args(0..)
                .required(false)
                .value_parser(ValueParser::string())
                .hide(true),
        );
    }
    cmd
}

fn lower(spec: &ArgSpec, help: &[(String, String)]) -> Arg {
    let mut arg = Arg::new(spec.name.clone());
    if let Some(short) = spec.short {
        arg = arg.short(short);
    }
    if let Some(long) = &spec.long {
        arg = arg.long(long.clone());
    }
    if let Some((_, text)) = help.iter().find(|(name, _)| *name == spec.name) {
        arg = arg.help(text.clone());
    }

    match spec.kind {
        Kind::Flag => arg.action(ArgAction::SetTrue),
        Kind::Count => arg.action(ArgAction::Count),
        Kind::Value => {
            arg = typed(arg, spec.ty.unwrap_or(Ty::Str));
            match spec.arity {
                Arity::Zero | Arity::One => arg.num_args(1),
                Arity::ZeroOrOne => arg.num_args(0..=1),
                Arity::OneOrMore => arg.num_args(1..),
                Arity::ZeroOrMore => arg.num_args(0..),
                Arity::Exactly(n) => arg.num_args(n),
            }
        }
    }
}

fn typed(arg: Arg, ty: Ty) -> Arg {
    match ty {
        // file paths stay strings here; the adapter opens them while
        // collecting results
        Ty::Str | Ty::RFile | Ty::WFile => arg.value_parser(ValueParser::string()),
        Ty::Int => arg.value_parser(clap::value_parser!(i64)),
        Ty::Float => arg.value_parser(clap::value_parser!(f64)),
        // strict `true`/`false`, nothing truthy
        Ty::Bool => arg.value_parser(clap::value_parser!(bool)),
    }
}
