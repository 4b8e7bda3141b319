/* src/server/core/rust/src/pattern.rs */

use std::borrow::Cow;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::errors::PatternError;

/// One `/`-separated piece of a route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// `about`
  Literal(String),
  /// `[slug]`: exactly one non-empty segment
  Dynamic(String),
  /// `[...slug]`: one or more trailing segments
  CatchAll(String),
  /// `[[...slug]]`: zero or more trailing segments
  OptionalCatchAll(String),
}

impl Segment {
  fn param_name(&self) -> Option<&str> {
    match self {
      Self::Literal(_) => None,
      Self::Dynamic(name) | Self::CatchAll(name) | Self::OptionalCatchAll(name) => Some(name),
    }
  }

  fn is_catch_all(&self) -> bool {
    matches!(self, Self::CatchAll(_) | Self::OptionalCatchAll(_))
  }
}

/// Value captured for (or supplied to) a template parameter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParamValue {
  One(String),
  Many(Vec<String>),
}

pub type Params = BTreeMap<String, ParamValue>;

/// Specificity class of a template. Variant order is match priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PatternKind {
  Static,
  Dynamic,
  CatchAll,
  OptionalCatchAll,
}

/// A compiled route template such as `/products/[slug]` or `/docs/[[...path]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
  template: String,
  segments: Vec<Segment>,
}

impl PathPattern {
  pub fn parse(template: &str) -> Result<Self, PatternError> {
    if !template.starts_with('/') {
      return Err(PatternError::MissingLeadingSlash(template.to_string()));
    }

    let raw_segments: Vec<&str> = split_segments(template).collect();
    let mut segments = Vec::with_capacity(raw_segments.len());
    let mut seen = HashSet::new();

    for (i, raw) in raw_segments.iter().enumerate() {
      let segment = classify(raw).map_err(|reason| PatternError::InvalidSegment {
        template: template.to_string(),
        segment: (*raw).to_string(),
        reason,
      })?;
      if let Some(name) = segment.param_name() {
        if !seen.insert(name.to_string()) {
          return Err(PatternError::DuplicateParam {
            template: template.to_string(),
            name: name.to_string(),
          });
        }
        if segment.is_catch_all() && i + 1 != raw_segments.len() {
          return Err(PatternError::CatchAllNotLast {
            template: template.to_string(),
            name: name.to_string(),
          });
        }
      }
      segments.push(segment);
    }

    Ok(Self { template: template.to_string(), segments })
  }

  pub fn template(&self) -> &str {
    &self.template
  }

  pub fn segments(&self) -> &[Segment] {
    &self.segments
  }

  pub fn kind(&self) -> PatternKind {
    self.segments.iter().fold(PatternKind::Static, |kind, segment| {
      let own = match segment {
        Segment::Literal(_) => PatternKind::Static,
        Segment::Dynamic(_) => PatternKind::Dynamic,
        Segment::CatchAll(_) => PatternKind::CatchAll,
        Segment::OptionalCatchAll(_) => PatternKind::OptionalCatchAll,
      };
      kind.max(own)
    })
  }

  pub fn is_static(&self) -> bool {
    self.kind() == PatternKind::Static
  }

  /// Sort key: lower sorts first. Ties are left to the caller's registration order.
  pub(crate) fn priority(&self) -> (PatternKind, Reverse<usize>) {
    let literals = self.segments.iter().filter(|s| matches!(s, Segment::Literal(_))).count();
    (self.kind(), Reverse(literals))
  }

  /// Parameter names with a flag telling whether the parameter takes a sequence.
  pub(crate) fn param_signature(&self) -> BTreeMap<&str, bool> {
    self.segments.iter().filter_map(|s| s.param_name().map(|name| (name, s.is_catch_all()))).collect()
  }

  /// Match a concrete path. Trailing and repeated slashes are ignored,
  /// captured values come back percent-decoded.
  pub fn matches(&self, path: &str) -> Option<Params> {
    let parts: Vec<&str> = split_segments(path).collect();
    let mut params = Params::new();
    let mut idx = 0;

    for segment in &self.segments {
      match segment {
        Segment::Literal(literal) => {
          let part = parts.get(idx)?;
          if decode(part) != literal.as_str() {
            return None;
          }
          idx += 1;
        }
        Segment::Dynamic(name) => {
          let part = parts.get(idx)?;
          params.insert(name.clone(), ParamValue::One(decode(part).into_owned()));
          idx += 1;
        }
        Segment::CatchAll(name) => {
          if idx >= parts.len() {
            return None;
          }
          let values = parts[idx..].iter().map(|p| decode(p).into_owned()).collect();
          params.insert(name.clone(), ParamValue::Many(values));
          idx = parts.len();
        }
        Segment::OptionalCatchAll(name) => {
          let values = parts[idx..].iter().map(|p| decode(p).into_owned()).collect();
          params.insert(name.clone(), ParamValue::Many(values));
          idx = parts.len();
        }
      }
    }

    (idx == parts.len()).then_some(params)
  }

  /// Render the template with `params`. The result never has a trailing slash
  /// (except the bare root `/`).
  pub fn render(&self, params: &Params) -> Result<String, PatternError> {
    let mut out = String::new();

    for segment in &self.segments {
      match segment {
        Segment::Literal(literal) => {
          out.push('/');
          out.push_str(&encode_literal(literal));
        }
        Segment::Dynamic(name) => match params.get(name) {
          Some(ParamValue::One(value)) if !value.is_empty() => {
            out.push('/');
            out.push_str(&urlencoding::encode(value));
          }
          Some(_) => return Err(self.shape_error(name)),
          None => return Err(self.missing_error(name)),
        },
        Segment::CatchAll(name) => match params.get(name) {
          Some(ParamValue::Many(values)) if !values.is_empty() && all_non_empty(values) => {
            push_all(&mut out, values);
          }
          Some(_) => return Err(self.shape_error(name)),
          None => return Err(self.missing_error(name)),
        },
        Segment::OptionalCatchAll(name) => match params.get(name) {
          Some(ParamValue::Many(values)) if all_non_empty(values) => push_all(&mut out, values),
          Some(_) => return Err(self.shape_error(name)),
          None => {}
        },
      }
    }

    if out.is_empty() {
      out.push('/');
    }
    Ok(out)
  }

  fn shape_error(&self, name: &str) -> PatternError {
    PatternError::ParamShape { template: self.template.clone(), name: name.to_string() }
  }

  fn missing_error(&self, name: &str) -> PatternError {
    PatternError::MissingParam { template: self.template.clone(), name: name.to_string() }
  }
}

impl fmt::Display for PathPattern {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.template)
  }
}

pub(crate) fn split_segments(path: &str) -> impl Iterator<Item = &str> {
  path.split('/').filter(|s| !s.is_empty())
}

fn classify(raw: &str) -> Result<Segment, &'static str> {
  if let Some(inner) = raw.strip_prefix("[[").and_then(|s| s.strip_suffix("]]")) {
    let name = inner.strip_prefix("...").ok_or("optional segments must be catch-all: [[...name]]")?;
    return Ok(Segment::OptionalCatchAll(param_name(name)?));
  }
  if let Some(inner) = raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
    if let Some(name) = inner.strip_prefix("...") {
      return Ok(Segment::CatchAll(param_name(name)?));
    }
    return Ok(Segment::Dynamic(param_name(inner)?));
  }
  if raw.contains(['[', ']']) {
    return Err("unbalanced brackets");
  }
  // Incoming segments are decoded before comparison, and `?`/`#` would end the path.
  if raw.contains(['?', '#', '%']) {
    return Err("literal segments may not contain '?', '#' or '%'");
  }
  Ok(Segment::Literal(raw.to_string()))
}

fn param_name(name: &str) -> Result<String, &'static str> {
  if name.is_empty() {
    return Err("empty parameter name");
  }
  if !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
    return Err("parameter names may only contain letters, digits, '_' and '-'");
  }
  Ok(name.to_string())
}

fn decode(raw: &str) -> Cow<'_, str> {
  urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

/// Empty elements would render as `//` and vanish when matched back.
fn all_non_empty(values: &[String]) -> bool {
  values.iter().all(|v| !v.is_empty())
}

fn push_all(out: &mut String, values: &[String]) {
  for value in values {
    out.push('/');
    out.push_str(&urlencoding::encode(value));
  }
}

/// Literals keep reserved ASCII as written; only non-ASCII, whitespace and
/// control characters are percent-encoded.
fn encode_literal(literal: &str) -> Cow<'_, str> {
  if literal.chars().all(|c| c.is_ascii_graphic()) {
    return Cow::Borrowed(literal);
  }
  let mut out = String::with_capacity(literal.len() * 3);
  let mut buf = [0u8; 4];
  for c in literal.chars() {
    if c.is_ascii_graphic() {
      out.push(c);
    } else {
      out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
    }
  }
  Cow::Owned(out)
}
