//! Compiled form of a pattern: one [`ArgSpec`] per argument, collected into
//! a [`ParserSpec`] in declaration order.

use crate::CompileError;

/// The engine-ready description of a single argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    /// Canonical name, used as the key in the match result. For an aliased
    /// short flag this is the alias, otherwise the flag letter; for long
    /// options and positionals it is the name itself.
    pub name: String,
    /// Short flag letter, if any.
    pub short: Option<char>,
    /// Long name the engine recognizes in addition to the short letter.
    pub long: Option<String>,
    pub kind: Kind,
    pub arity: Arity,
    /// Declared element type; `None` means untyped raw text.
    pub ty: Option<Ty>,
}

impl ArgSpec {
    pub fn is_positional(&self) -> bool {
        self.short.is_none() && self.long.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Present-or-absent boolean flag, defaults to false.
    Flag,
    /// Counting flag: the value is the number of occurrences, defaults to 0.
    Count,
    /// A value-taking option or positional.
    Value,
}

/// How many values an argument consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No value at all. Flags and counting flags only.
    Zero,
    /// Exactly one value, the default for positionals and typed options.
    One,
    /// Zero or one value (`name?`).
    ZeroOrOne,
    /// One or more values (`name...`).
    OneOrMore,
    /// Zero or more values (`name...?`).
    ZeroOrMore,
    /// Exactly `n` values (`name...n`).
    Exactly(usize),
}

/// Element type of a value-taking argument (`name:type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ty {
    Str,
    Int,
    Float,
    Bool,
    /// An existing file, opened for reading while matching.
    RFile,
    /// A file created for writing while matching.
    WFile,
}

impl Ty {
    pub(crate) fn from_name(name: &str) -> Option<Ty> {
        let ty = match name {
            "str" => Ty::Str,
            "int" => Ty::Int,
            "float" => Ty::Float,
            "bool" => Ty::Bool,
            "rfile" => Ty::RFile,
            "wfile" => Ty::WFile,
            _ => return None,
        };
        Some(ty)
    }
}

/// An ordered sequence of [`ArgSpec`]s, uniquely keyed by canonical name.
/// Declaration order is preserved and determines positional matching order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserSpec {
    args: Vec<ArgSpec>,
}

impl ParserSpec {
    pub fn args(&self) -> &[ArgSpec] {
        &self.args
    }

    pub fn get(&self, name: &str) -> Option<&ArgSpec> {
        self.args.iter().find(|it| it.name == name)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Append a spec, rejecting anything the engine could not tell apart
    /// from an earlier one: a reused canonical name, short letter, or long
    /// name.
    pub(crate) fn push(&mut self, arg: ArgSpec) -> Result<(), CompileError> {
        let clash = self.args.iter().any(|it| {
            it.name == arg.name
                || (it.short.is_some() && it.short == arg.short)
                || (it.long.is_some() && it.long == arg.long)
        });
        if clash {
            return Err(CompileError::DuplicateName { name: arg.name });
        }
        self.args.push(arg);
        Ok(())
    }
}
