//! Object paths used by the `map` part
//!
//! A path such as `variables.files.1` (or `0.variables.file` in a batch)
//! addresses a `null` placeholder inside an operation. Paths are parsed into
//! explicit segments and resolved by walking the variables tree.

use indexmap::IndexMap;
use std::borrow::Cow;
use std::fmt;

use crate::core::error::DecodeError;
use crate::core::value::InputValue;

/// One step of a [`VariablePath`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    /// Text used when the segment addresses an object key
    fn as_key(&self) -> Cow<'_, str> {
        match self {
            PathSegment::Key(k) => Cow::Borrowed(k),
            PathSegment::Index(i) => Cow::Owned(i.to_string()),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{}", k),
            PathSegment::Index(i) => write!(f, "{}", i),
        }
    }
}

/// A parsed `map` path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariablePath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl VariablePath {
    /// Parse a dotted path; `files[1]` is accepted as a synonym of `files.1`
    pub fn parse(raw: &str) -> Result<Self, DecodeError> {
        if raw.is_empty() {
            return Err(DecodeError::unresolved(raw, "path is empty"));
        }

        let mut segments = Vec::new();
        for part in raw.split('.') {
            parse_part(raw, part, &mut segments)?;
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Find which operation the path targets and the route inside its
    /// variables
    ///
    /// In a batch the leading segment selects the operation. The route that
    /// follows must start with `variables` and name at least one variable.
    pub fn locate(&self, batched: bool) -> Result<(usize, &[PathSegment]), DecodeError> {
        let (index, rest) = if batched {
            match self.segments.split_first() {
                Some((PathSegment::Index(i), rest)) => (*i, rest),
                _ => {
                    return Err(DecodeError::unresolved(
                        self,
                        "batched paths must start with an operation index",
                    ));
                }
            }
        } else {
            (0, self.segments.as_slice())
        };

        match rest.split_first() {
            Some((PathSegment::Key(root), route)) if root == "variables" => {
                if route.is_empty() {
                    return Err(DecodeError::unresolved(self, "path must name a variable"));
                }
                Ok((index, route))
            }
            _ => Err(DecodeError::unresolved(
                self,
                "only paths under 'variables' can hold files",
            )),
        }
    }
}

impl fmt::Display for VariablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_part(raw: &str, part: &str, segments: &mut Vec<PathSegment>) -> Result<(), DecodeError> {
    let (name, mut brackets) = match part.find('[') {
        Some(pos) => part.split_at(pos),
        None => (part, ""),
    };

    if name.is_empty() && brackets.is_empty() {
        return Err(DecodeError::unresolved(raw, "path contains an empty segment"));
    }
    if !name.is_empty() {
        segments.push(dotted_segment(name));
    }

    while !brackets.is_empty() {
        let close = brackets
            .find(']')
            .filter(|_| brackets.starts_with('['))
            .ok_or_else(|| DecodeError::unresolved(raw, "unbalanced '[' in path"))?;
        let index = brackets[1..close]
            .parse::<usize>()
            .map_err(|_| DecodeError::unresolved(raw, "bracket segments must be list indices"))?;
        segments.push(PathSegment::Index(index));
        brackets = &brackets[close + 1..];
    }

    Ok(())
}

/// Canonical decimals are indices; `01` and the like stay object keys.
fn dotted_segment(name: &str) -> PathSegment {
    let canonical =
        name.bytes().all(|b| b.is_ascii_digit()) && (name == "0" || !name.starts_with('0'));
    match name.parse::<usize>() {
        Ok(i) if canonical => PathSegment::Index(i),
        _ => PathSegment::Key(name.to_string()),
    }
}

/// Replace the `null` found at `route` inside `variables` with `value`
///
/// The first segment names the variable; the remaining ones walk objects by
/// key and lists by index. Fails without modifying anything if a step is
/// missing or the final value is not `null`.
pub fn replace_null(
    variables: &mut IndexMap<String, InputValue>,
    route: &[PathSegment],
    value: InputValue,
) -> Result<(), String> {
    let Some((first, rest)) = route.split_first() else {
        return Err("path must name a variable".to_string());
    };

    let mut current = variables
        .get_mut(&*first.as_key())
        .ok_or_else(|| format!("variable '{}' does not exist", first))?;

    for segment in rest {
        current = match (current, segment) {
            (InputValue::Object(map), segment) => map
                .get_mut(&*segment.as_key())
                .ok_or_else(|| format!("key '{}' does not exist", segment))?,
            (InputValue::List(items), PathSegment::Index(i)) => {
                let len = items.len();
                items
                    .get_mut(*i)
                    .ok_or_else(|| format!("index {} is out of bounds (length {})", i, len))?
            }
            (InputValue::List(_), PathSegment::Key(k)) => {
                return Err(format!("key '{}' cannot address a list", k));
            }
            (_, segment) => {
                return Err(format!("cannot descend into a scalar at '{}'", segment));
            }
        };
    }

    if !current.is_null() {
        return Err("target value is not null".to_string());
    }
    *current = value;
    Ok(())
}
