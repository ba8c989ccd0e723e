//! Type spec strings
//!
//! A spec is either a bare registry key (`"string"`, `"coercible.integer"`)
//! or a parametric composite `OUTER<INNER>` where `OUTER` is a bare key and
//! `INNER` is itself a spec, e.g. `"array<array<string>>"`.
//!
//! Parsing peels `OUTER<` prefixes off in a loop: the first `<` opens the
//! member spec and must be closed by the final `>`, so every level is
//! unambiguous and the work is linear in the length of the spec. Nesting
//! deeper than [`MAX_DEPTH`] is rejected as malformed.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TypeError};

/// A parsed type reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSpec {
    /// A direct registry key
    Simple(String),
    /// A container type parametrized by a member spec
    Parametric {
        container: String,
        member: Box<TypeSpec>,
    },
}

/// Deepest nesting a spec may have
pub const MAX_DEPTH: usize = 256;

/// One `OUTER<...>` level of a split spec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Level<'a> {
    /// Registry key of the container
    pub container: &'a str,
    /// The full spec text of this level, brackets included
    pub spec: &'a str,
}

/// A spec split into its container levels, outermost first, and the
/// innermost simple key
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Split<'a> {
    pub levels: Vec<Level<'a>>,
    pub leaf: &'a str,
}

/// Split a spec without building the tree
pub(crate) fn split(spec: &str) -> Result<Split<'_>> {
    let malformed = |reason: &str| TypeError::MalformedSpec {
        spec: spec.to_string(),
        reason: reason.to_string(),
    };

    let mut levels = Vec::new();
    let mut rest = spec;
    while let Some(open) = rest.find('<') {
        if levels.len() == MAX_DEPTH {
            return Err(malformed(&format!("nesting deeper than {} levels", MAX_DEPTH)));
        }

        let container = &rest[..open];
        if container.is_empty() {
            return Err(malformed("missing container name before '<'"));
        }
        if container.contains('>') {
            return Err(malformed("unexpected '>' in container name"));
        }
        if !rest.ends_with('>') {
            return Err(malformed("'<' is not closed by the final '>'"));
        }

        levels.push(Level {
            container,
            spec: rest,
        });
        rest = &rest[open + 1..rest.len() - 1];
        if rest.is_empty() {
            return Err(malformed("empty member spec"));
        }
    }

    if rest.contains('>') {
        return Err(malformed("unexpected '>' without matching '<'"));
    }
    if rest.is_empty() {
        return Err(malformed("empty type name"));
    }

    Ok(Split { levels, leaf: rest })
}

impl TypeSpec {
    pub fn parse(spec: &str) -> Result<Self> {
        let Split { levels, leaf } = split(spec)?;
        Ok(levels
            .iter()
            .rev()
            .fold(TypeSpec::Simple(leaf.to_string()), |member, level| {
                TypeSpec::Parametric {
                    container: level.container.to_string(),
                    member: Box::new(member),
                }
            }))
    }

    /// Nesting depth: 0 for a simple key
    pub fn depth(&self) -> usize {
        match self {
            TypeSpec::Simple(_) => 0,
            TypeSpec::Parametric { member, .. } => 1 + member.depth(),
        }
    }

    /// Whether `name` is used as a registry key anywhere in the spec
    pub fn mentions(&self, name: &str) -> bool {
        match self {
            TypeSpec::Simple(key) => key == name,
            TypeSpec::Parametric { container, member } => {
                container == name || member.mentions(name)
            }
        }
    }

    /// The outermost registry key
    pub fn head(&self) -> &str {
        match self {
            TypeSpec::Simple(name) => name,
            TypeSpec::Parametric { container, .. } => container,
        }
    }
}

impl FromStr for TypeSpec {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self> {
        TypeSpec::parse(s)
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Simple(name) => f.write_str(name),
            TypeSpec::Parametric { container, member } => write!(f, "{}<{}>", container, member),
        }
    }
}
