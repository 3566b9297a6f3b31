//! Compile a compact pattern string into a command line argument parser.
//!
//! A pattern is a whitespace separated list of tokens:
//!
//! ```text
//! -v              boolean short flag
//! -vfq            three independent boolean short flags
//! -vv             counting flag: the value is the number of occurrences
//! -v[verbose]     short flag with a long alias, result key `verbose`
//! -vv[verbose]    counting flag with a long alias
//! --verbose       boolean long flag
//! --data...       value-taking long option, one or more values
//! --data...?      zero or more values
//! --data...2      exactly two values
//! infile          required positional
//! outfile?        optional positional
//! rest...         positional gathering one or more remaining values
//! rest...?        same, but fine with zero
//! pair...2        positional consuming exactly two values
//! x:int           typed value; int, bool, str, float, rfile, wfile
//! ```
//!
//! Type and arity suffixes compose, e.g. `foo:int...?`. Flag and option
//! matching is delegated to [`clap`]; positional values are distributed
//! across the declared positionals greedily left to right, so `foo...3
//! bar...2` and `x? y` both match the way a reader of the pattern expects.
//! The engine's output ends up in a [`Matches`] container keyed by
//! canonical name.
//!
//! For the live process arguments, failure prints diagnostics and exits:
//!
//! ```no_run
//! let args = arguable::parse_or_exit("-vv[verbose] infile rest:int...?");
//! println!("verbosity: {}", args.count("verbose"));
//! println!("infile: {:?}", args.string("infile"));
//! ```
//!
//! Programmatic input uses the recoverable form instead:
//!
//! ```
//! let args = arguable::parse_args("-v x:int", ["-v", "92"]).unwrap();
//! assert!(args.flag("v"));
//! assert_eq!(args.int("x"), Some(92));
//! ```

mod ast;
mod emit;
mod parse;
mod rt;

use std::ffi::OsString;
use std::path::Path;

use thiserror::Error as ThisError;

pub use crate::ast::{ArgSpec, Arity, Kind, ParserSpec, Ty};
pub use crate::rt::{Closeable, FileValue, MatchError, Matches, Value};

/// Malformed pattern text. Raised at compile time; the pattern is rejected
/// in full.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum GrammarError {
    #[error("`[` in `{token}` needs a closing `]`")]
    UnterminatedAlias { token: String },
    #[error("`...` must be followed by nothing, `?` or an integer, not `{suffix}`")]
    InvalidArity { suffix: String },
    #[error("unrecognized type specifier `{name}`")]
    UnknownType { name: String },
}

/// Why a pattern failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum CompileError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error("duplicate argument name `{name}`")]
    DuplicateName { name: String },
}

/// Umbrella error for the one-shot [`parse_args`] shortcut.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Match(#[from] MatchError),
}

/// A compiled pattern, ready to match input tokens any number of times.
#[derive(Debug)]
pub struct Parser {
    spec: ParserSpec,
    name: Option<String>,
    description: Option<String>,
    help: Vec<(String, String)>,
}

impl Parser {
    /// Compile `pattern`. Fails fast on the first grammar error or duplicate
    /// name.
    pub fn new(pattern: &str) -> Result<Parser, CompileError> {
        let spec = parse::parse(pattern)?;
        Ok(Parser { spec, name: None, description: None, help: Vec::new() })
    }

    /// Program name reported in diagnostics. Defaults to the basename of the
    /// current executable.
    pub fn with_name(mut self, name: impl Into<String>) -> Parser {
        self.name = Some(name.into());
        self
    }

    /// Program description, passed through to the engine opaquely.
    pub fn with_description(mut self, description: impl Into<String>) -> Parser {
        self.description = Some(description.into());
        self
    }

    /// Help text for one argument, by canonical name. Unknown names are
    /// silently ignored.
    pub fn with_help(mut self, arg: impl Into<String>, text: impl Into<String>) -> Parser {
        self.help.push((arg.into(), text.into()));
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The compiled specification, in declaration order.
    pub fn spec(&self) -> &ParserSpec {
        &self.spec
    }

    /// Match `args` against the compiled specification. Nothing is printed;
    /// engine-level failures come back as [`MatchError`].
    pub fn try_parse<I, T>(&self, args: I) -> Result<Matches, MatchError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command().try_get_matches_from(args).map_err(MatchError::from)?;
        rt::collect(&self.spec, &matches)
    }

    /// Match the live process arguments. On failure, prints the engine's
    /// diagnostics and terminates the process.
    pub fn parse_or_exit(&self) -> Matches {
        let matches = self
            .command()
            .try_get_matches_from(std::env::args_os().skip(1))
            .unwrap_or_else(|err| err.exit());
        match rt::collect(&self.spec, &matches) {
            Ok(matches) => matches,
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(2)
            }
        }
    }

    fn command(&self) -> clap::Command {
        let name = self.name.clone().unwrap_or_else(program_name);
        emit::command(&self.spec, name, self.description.as_deref(), &self.help)
    }
}

/// Compile `pattern` and match it against `args` in one go.
pub fn parse_args<I, T>(pattern: &str, args: I) -> Result<Matches, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let parser = Parser::new(pattern)?;
    Ok(parser.try_parse(args)?)
}

/// Compile `pattern` and match the live process arguments, exiting with
/// diagnostics on any failure.
pub fn parse_or_exit(pattern: &str) -> Matches {
    match Parser::new(pattern) {
        Ok(parser) => parser.parse_or_exit(),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2)
        }
    }
}

fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "program".to_string())
}
