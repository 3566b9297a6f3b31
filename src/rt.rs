//! Runtime half: collect the engine's output into a [`Matches`] container
//! and manage the file handles owned by it.

use std::cell::RefCell;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::ArgMatches;
use thiserror::Error;

use crate::ast::{ArgSpec, Arity, Kind, ParserSpec, Ty};

/// Input tokens did not satisfy the compiled specification: a missing
/// required value, a failed type coercion, insufficient arity, or an
/// unopenable `rfile`/`wfile`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct MatchError {
    message: String,
}

impl MatchError {
    pub(crate) fn new(message: impl Into<String>) -> MatchError {
        MatchError { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<clap::Error> for MatchError {
    fn from(err: clap::Error) -> MatchError {
        MatchError { message: err.to_string().trim_end().to_string() }
    }
}

/// Capability for values that hold a releasable resource. Only values that
/// implement this are tracked for automatic release by [`Matches`].
pub trait Closeable {
    fn close(&mut self) -> io::Result<()>;
}

/// An open file produced by an `rfile`/`wfile` typed argument.
///
/// The handle is shared between the owning [`Matches`] container, which
/// tracks it for release, and any clones handed out to callers.
/// [`FileValue::take`] moves the raw [`File`] out, after which automatic
/// release becomes a no-op and the caller owns the handle.
#[derive(Clone)]
pub struct FileValue {
    file: Rc<RefCell<Option<File>>>,
    path: PathBuf,
    writable: bool,
}

impl FileValue {
    fn open(path: &str, writable: bool) -> io::Result<FileValue> {
        let file = if writable { File::create(path)? } else { File::open(path)? };
        Ok(FileValue {
            file: Rc::new(RefCell::new(Some(file))),
            path: PathBuf::from(path),
            writable,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn writable(&self) -> bool {
        self.writable
    }

    pub fn is_open(&self) -> bool {
        self.file.borrow().is_some()
    }

    /// Transfer the underlying file out of the container's ownership.
    pub fn take(&self) -> Option<File> {
        self.file.borrow_mut().take()
    }
}

impl Closeable for FileValue {
    fn close(&mut self) -> io::Result<()> {
        match self.file.borrow_mut().take() {
            Some(file) if self.writable => file.sync_all(),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for FileValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileValue")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .finish()
    }
}

/// One matched value, keyed by canonical name in [`Matches`].
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Count(u64),
    Str(String),
    Int(i64),
    Float(f64),
    File(FileValue),
    List(Vec<Value>),
    /// An optional argument that was not supplied.
    Absent,
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<u64> {
        match self {
            Value::Count(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileValue> {
        match self {
            Value::File(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }
}

/// The result of a successful match: every argument of the compiled pattern,
/// keyed by canonical name, in declaration order.
///
/// Files opened for `rfile`/`wfile` arguments are owned by the container and
/// released by [`Matches::close`], or best-effort on drop. A caller that
/// wants to keep a file open past the container's lifetime takes it out with
/// [`Matches::take_file`].
pub struct Matches {
    values: Vec<(String, Value)>,
    closeables: Vec<FileValue>,
}

impl Matches {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Boolean flag state; false when the flag is unknown or unset.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some(Value::Bool(true)))
    }

    /// Occurrence count of a counting flag; zero when unknown or unset.
    pub fn count(&self, name: &str) -> u64 {
        match self.get(name) {
            Some(Value::Count(n)) => *n,
            _ => 0,
        }
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_str()
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_int()
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name)?.as_float()
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name)?.as_bool()
    }

    pub fn list(&self, name: &str) -> Option<&[Value]> {
        self.get(name)?.as_list()
    }

    pub fn file(&self, name: &str) -> Option<&FileValue> {
        self.get(name)?.as_file()
    }

    /// Take ownership of an open file, removing it from automatic release.
    pub fn take_file(&self, name: &str) -> Option<File> {
        self.file(name)?.take()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| n.as_str())
    }

    /// Release every tracked resource. Returns the first error encountered,
    /// after attempting to close the rest.
    pub fn close(&mut self) -> io::Result<()> {
        let mut first_err = None;
        for mut file in self.closeables.drain(..) {
            if let Err(err) = file.close() {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Drop for Matches {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl fmt::Debug for Matches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.values.iter().map(|(n, v)| (n.as_str(), v))).finish()
    }
}

/// Collect the engine's matches into a [`Matches`] container, opening
/// `rfile`/`wfile` arguments along the way.
///
/// Positional values all arrive through one engine-side argument; they are
/// sliced into per-argument groups here, greedily left to right, each group
/// taking as many values as its arity allows while leaving the minimum the
/// remaining positionals still need.
pub(crate) fn collect(spec: &ParserSpec, m: &ArgMatches) -> Result<Matches, MatchError> {
    let positionals: Vec<&ArgSpec> = spec.args().iter().filter(|it| it.is_positional()).collect();
    let tokens: Vec<&str> = if positionals.is_empty() {
        Vec::new()
    } else {
        m.get_many::<String>(crate::emit::POSITIONALS)
            .map(|vals| vals.map(String::as_str).collect())
            .unwrap_or_default()
    };
    let counts = allocate(&positionals, &tokens)?;

    let mut values = Vec::with_capacity(spec.len());
    let mut closeables = Vec::new();
    let mut cursor = 0;
    let mut slot = 0;
    for arg in spec.args() {
        let value = match arg.kind {
            Kind::Flag => Value::Bool(m.get_flag(&arg.name)),
            Kind::Count => Value::Count(u64::from(m.get_count(&arg.name))),
            Kind::Value if arg.is_positional() => {
                let group = &tokens[cursor..cursor + counts[slot]];
                cursor += counts[slot];
                slot += 1;
                positional_value(arg, group, &mut closeables)?
            }
            Kind::Value => option_value(arg, m, &mut closeables)?,
        };
        values.push((arg.name.clone(), value));
    }
    Ok(Matches { values, closeables })
}

fn min_values(arity: Arity) -> usize {
    match arity {
        Arity::Zero | Arity::ZeroOrOne | Arity::ZeroOrMore => 0,
        Arity::One | Arity::OneOrMore => 1,
        Arity::Exactly(n) => n,
    }
}

fn max_values(arity: Arity) -> Option<usize> {
    match arity {
        Arity::Zero => Some(0),
        Arity::One | Arity::ZeroOrOne => Some(1),
        Arity::OneOrMore | Arity::ZeroOrMore => None,
        Arity::Exactly(n) => Some(n),
    }
}

/// How many of `tokens` each positional gets, in declaration order.
fn allocate(positionals: &[&ArgSpec], tokens: &[&str]) -> Result<Vec<usize>, MatchError> {
    let mut counts = Vec::with_capacity(positionals.len());
    let mut remaining = tokens.len();
    for (i, arg) in positionals.iter().enumerate() {
        let lo = min_values(arg.arity);
        if remaining < lo {
            return Err(match lo {
                1 => MatchError::new(format!("expected a value for `{}`", arg.name)),
                _ => MatchError::new(format!("expected {lo} values for `{}`", arg.name)),
            });
        }
        let reserved: usize = positionals[i + 1..].iter().map(|it| min_values(it.arity)).sum();
        let take = max_values(arg.arity)
            .unwrap_or(usize::MAX)
            .min(remaining.saturating_sub(reserved))
            .max(lo);
        counts.push(take);
        remaining -= take;
    }
    if remaining > 0 {
        let stray = tokens[tokens.len() - remaining];
        return Err(MatchError::new(format!("unexpected argument `{stray}`")));
    }
    Ok(counts)
}

fn positional_value(
    arg: &ArgSpec,
    group: &[&str],
    closeables: &mut Vec<FileValue>,
) -> Result<Value, MatchError> {
    match arg.arity {
        Arity::Zero | Arity::One | Arity::ZeroOrOne => match group.first() {
            Some(token) => convert(arg, token, closeables),
            None => Ok(Value::Absent),
        },
        Arity::OneOrMore | Arity::ZeroOrMore | Arity::Exactly(_) => {
            let items = group
                .iter()
                .map(|token| convert(arg, token, closeables))
                .collect::<Result<Vec<Value>, MatchError>>()?;
            Ok(Value::List(items))
        }
    }
}

/// Coerce one positional token. Long option values are coerced by the
/// engine's value parsers instead; the messages match in spirit.
fn convert(
    arg: &ArgSpec,
    token: &str,
    closeables: &mut Vec<FileValue>,
) -> Result<Value, MatchError> {
    match arg.ty.unwrap_or(Ty::Str) {
        Ty::Str => Ok(Value::Str(token.to_string())),
        Ty::Int => token
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|err| MatchError::new(format!("can't parse `{}`, {err}", arg.name))),
        Ty::Float => token
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|err| MatchError::new(format!("can't parse `{}`, {err}", arg.name))),
        // strict `true`/`false`, nothing truthy
        Ty::Bool => token.parse::<bool>().map(Value::Bool).map_err(|_| {
            MatchError::new(format!("can't parse `{}`, expected `true` or `false`", arg.name))
        }),
        ty @ (Ty::RFile | Ty::WFile) => open_into(token, ty == Ty::WFile, closeables),
    }
}

fn option_value(
    arg: &ArgSpec,
    m: &ArgMatches,
    closeables: &mut Vec<FileValue>,
) -> Result<Value, MatchError> {
    let ty = arg.ty.unwrap_or(Ty::Str);
    let name = arg.name.as_str();
    match arg.arity {
        // never registered with the engine, see emit
        Arity::Exactly(0) => Ok(Value::List(Vec::new())),
        Arity::OneOrMore | Arity::ZeroOrMore | Arity::Exactly(_) => {
            // an option that never appeared is absent; one given with zero
            // values is an empty list
            if !m.contains_id(name) {
                return Ok(Value::Absent);
            }
            let mut items = Vec::new();
            match ty {
                Ty::Str => {
                    if let Some(vals) = m.get_many::<String>(name) {
                        items.extend(vals.map(|v| Value::Str(v.clone())));
                    }
                }
                Ty::Int => {
                    if let Some(vals) = m.get_many::<i64>(name) {
                        items.extend(vals.map(|v| Value::Int(*v)));
                    }
                }
                Ty::Float => {
                    if let Some(vals) = m.get_many::<f64>(name) {
                        items.extend(vals.map(|v| Value::Float(*v)));
                    }
                }
                Ty::Bool => {
                    if let Some(vals) = m.get_many::<bool>(name) {
                        items.extend(vals.map(|v| Value::Bool(*v)));
                    }
                }
                Ty::RFile | Ty::WFile => {
                    if let Some(vals) = m.get_many::<String>(name) {
                        for path in vals {
                            items.push(open_into(path, ty == Ty::WFile, closeables)?);
                        }
                    }
                }
            }
            Ok(Value::List(items))
        }
        Arity::Zero | Arity::One | Arity::ZeroOrOne => {
            let value = match ty {
                Ty::Str => m.get_one::<String>(name).map(|v| Value::Str(v.clone())),
                Ty::Int => m.get_one::<i64>(name).map(|v| Value::Int(*v)),
                Ty::Float => m.get_one::<f64>(name).map(|v| Value::Float(*v)),
                Ty::Bool => m.get_one::<bool>(name).map(|v| Value::Bool(*v)),
                Ty::RFile | Ty::WFile => match m.get_one::<String>(name) {
                    Some(path) => Some(open_into(path, ty == Ty::WFile, closeables)?),
                    None => None,
                },
            };
            Ok(value.unwrap_or(Value::Absent))
        }
    }
}

fn open_into(
    path: &str,
    writable: bool,
    closeables: &mut Vec<FileValue>,
) -> Result<Value, MatchError> {
    let file = FileValue::open(path, writable)
        .map_err(|err| MatchError::new(format!("can't open `{path}`: {err}")))?;
    closeables.push(file.clone());
    Ok(Value::File(file))
}
