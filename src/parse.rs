//! Pattern compilation: segment a pattern string into atomic tokens, then
//! translate each token into an [`ArgSpec`].

use crate::ast::{ArgSpec, Arity, Kind, ParserSpec, Ty};
use crate::{CompileError, GrammarError};

type Result<T, E = GrammarError> = std::result::Result<T, E>;

/// Fold a whole pattern into a [`ParserSpec`]. Fails on the first grammar
/// error or duplicate name; compilation is all-or-nothing.
pub(crate) fn parse(pattern: &str) -> Result<ParserSpec, CompileError> {
    let mut spec = ParserSpec::default();
    for token in segment(pattern) {
        spec.push(translate(&token?)?)?;
    }
    Ok(spec)
}

/// Split a pattern into atomic tokens, expanding short flag clusters like
/// `-vfq` into `-v`, `-f`, `-q`. Repeat markers and alias brackets stay
/// attached to their flag: `-fvv[verbose]q` yields `-f`, `-vv[verbose]`,
/// `-q`. The iterator depends only on the pattern, so re-invoking it yields
/// the same sequence.
pub(crate) fn segment(pattern: &str) -> Segment<'_> {
    Segment { words: pattern.split_whitespace(), cluster: Vec::new().into_iter() }
}

pub(crate) struct Segment<'a> {
    words: std::str::SplitWhitespace<'a>,
    cluster: std::vec::IntoIter<Result<String>>,
}

impl Iterator for Segment<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Result<String>> {
        loop {
            if let Some(token) = self.cluster.next() {
                return Some(token);
            }
            let word = self.words.next()?;
            if is_short(word) {
                self.cluster = split_cluster(word).into_iter();
            } else {
                return Some(Ok(word.to_string()));
            }
        }
    }
}

/// A single dash followed by a non-dash character.
fn is_short(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next() == Some('-') && matches!(chars.next(), Some(c) if c != '-')
}

fn split_cluster(word: &str) -> Vec<Result<String>> {
    let chars: Vec<char> = word.chars().collect();
    let mut out = Vec::new();
    let mut i = 1;
    while i < chars.len() {
        let repeat = i + 1 < chars.len() && chars[i + 1] == chars[i];
        // an alias bracket opens either right after the letter or right
        // after a repeat pair: `v[verbose]`, `vv[verbose]`
        let open = if i + 1 < chars.len() && chars[i + 1] == '[' {
            Some(i + 1)
        } else if repeat && i + 2 < chars.len() && chars[i + 2] == '[' {
            Some(i + 2)
        } else {
            None
        };
        match open {
            Some(open) => match chars[open..].iter().position(|&c| c == ']') {
                Some(off) => {
                    let close = open + off;
                    let token: String =
                        std::iter::once('-').chain(chars[i..=close].iter().copied()).collect();
                    out.push(Ok(token));
                    i = close + 1;
                }
                None => {
                    out.push(Err(GrammarError::UnterminatedAlias { token: word.to_string() }));
                    return out;
                }
            },
            None if repeat => {
                out.push(Ok(format!("-{}{}", chars[i], chars[i + 1])));
                i += 2;
            }
            None => {
                out.push(Ok(format!("-{}", chars[i])));
                i += 1;
            }
        }
    }
    out
}

/// Translate one atomic token into an [`ArgSpec`].
pub(crate) fn translate(token: &str) -> Result<ArgSpec> {
    if is_short(token) {
        short_flag(token)
    } else {
        valued(token)
    }
}

fn short_flag(token: &str) -> Result<ArgSpec> {
    let (head, alias) = match token.split_once('[') {
        Some((head, rest)) => match rest.strip_suffix(']') {
            Some(alias) => (head, Some(alias)),
            None => return Err(GrammarError::UnterminatedAlias { token: token.to_string() }),
        },
        None => (token, None),
    };
    let alias = alias.filter(|it| !it.is_empty());

    let letters: Vec<char> = head.chars().skip(1).collect();
    let short = match letters.first() {
        Some(&c) => c,
        None => return Err(GrammarError::UnterminatedAlias { token: token.to_string() }),
    };
    // a doubled letter is a repeat marker: the flag counts occurrences
    let repeated = letters.len() == 2 && letters[0] == letters[1];

    Ok(ArgSpec {
        name: alias.map(str::to_string).unwrap_or_else(|| short.to_string()),
        short: Some(short),
        long: alias.map(str::to_string),
        kind: if repeated { Kind::Count } else { Kind::Flag },
        arity: Arity::Zero,
        ty: None,
    })
}

fn valued(token: &str) -> Result<ArgSpec> {
    let (token, arity) = strip_arity(token)?;
    let (name, ty) = strip_ty(token)?;

    if let Some(long) = name.strip_prefix("--") {
        // a long option with neither an explicit `...` arity nor a type is a
        // plain boolean flag
        let explicit =
            matches!(arity, Some(Arity::OneOrMore | Arity::ZeroOrMore | Arity::Exactly(_)));
        if !explicit && ty.is_none() {
            return Ok(ArgSpec {
                name: long.to_string(),
                short: None,
                long: Some(long.to_string()),
                kind: Kind::Flag,
                arity: Arity::Zero,
                ty: None,
            });
        }
        return Ok(ArgSpec {
            name: long.to_string(),
            short: None,
            long: Some(long.to_string()),
            kind: Kind::Value,
            arity: arity.unwrap_or(Arity::One),
            ty,
        });
    }

    Ok(ArgSpec {
        name: name.to_string(),
        short: None,
        long: None,
        kind: Kind::Value,
        arity: arity.unwrap_or(Arity::One),
        ty,
    })
}

fn strip_arity(token: &str) -> Result<(&str, Option<Arity>)> {
    if let Some((head, suffix)) = token.split_once("...") {
        let arity = match suffix {
            "" => Arity::OneOrMore,
            "?" => Arity::ZeroOrMore,
            _ => match suffix.parse::<usize>() {
                Ok(n) => Arity::Exactly(n),
                Err(_) => return Err(GrammarError::InvalidArity { suffix: suffix.to_string() }),
            },
        };
        return Ok((head, Some(arity)));
    }
    match token.strip_suffix('?') {
        Some(head) => Ok((head, Some(Arity::ZeroOrOne))),
        None => Ok((token, None)),
    }
}

fn strip_ty(token: &str) -> Result<(&str, Option<Ty>)> {
    match token.split_once(':') {
        None => Ok((token, None)),
        Some((head, name)) => match Ty::from_name(name) {
            Some(ty) => Ok((head, Some(ty))),
            None => Err(GrammarError::UnknownType { name: name.to_string() }),
        },
    }
}
