/* src/server/core/rust/src/pathnames.rs */

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::errors::{ConfigError, PatternError};
use crate::pattern::{Params, PathPattern, Segment};

/// External form of an internal template as written in config:
/// one template for every locale, or a per-locale map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ExternalTemplate {
  Shared(String),
  PerLocale(BTreeMap<String, String>),
}

impl ExternalTemplate {
  pub fn for_locale(&self, locale: &str) -> Option<&str> {
    match self {
      Self::Shared(template) => Some(template),
      Self::PerLocale(map) => map.get(locale).map(String::as_str),
    }
  }
}

/// A concrete external path resolved back to its internal template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
  pub internal_template: String,
  pub params: Params,
  /// Locale whose external template matched. Differs from the requested
  /// locale when the path is another locale's localized form.
  pub matched_locale: String,
}

/// The canonical route of a request: a registered template with its values,
/// or a raw path the registry knows nothing about (identical in every locale).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalRoute {
  Registered(RouteMatch),
  Unregistered(String),
}

#[derive(Debug, Clone)]
struct Entry {
  internal: PathPattern,
  /// Aligned with `PathnameRegistry::locales`.
  externals: Vec<PathPattern>,
}

/// Bidirectional mapping between internal templates and localized external templates.
#[derive(Debug, Clone, Default)]
pub struct PathnameRegistry {
  locales: Vec<String>,
  entries: Vec<Entry>,
  /// Per locale, entry indices in match priority order.
  order: Vec<Vec<usize>>,
}

impl PathnameRegistry {
  /// Compile `pathnames` (in registration order) for `locales`. Every problem
  /// is collected; the registry is only returned when there are none.
  pub fn build(
    locales: &[String],
    pathnames: &[(String, ExternalTemplate)],
  ) -> Result<Self, Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut entries = Vec::with_capacity(pathnames.len());

    for (internal, external) in pathnames {
      let internal_pattern = match PathPattern::parse(internal) {
        Ok(p) => p,
        Err(e) => {
          errors.push(e.into());
          continue;
        }
      };

      if let ExternalTemplate::PerLocale(map) = external {
        for locale in map.keys().filter(|l| !locales.contains(l)) {
          errors.push(ConfigError::PathnameForUnknownLocale {
            internal: internal.clone(),
            locale: locale.clone(),
          });
        }
      }

      let mut externals = Vec::with_capacity(locales.len());
      let mut valid = true;
      for locale in locales {
        // Missing per-locale entries fall back to the internal template.
        let template = external.for_locale(locale).unwrap_or(internal);
        match PathPattern::parse(template) {
          Ok(p) => {
            if p.param_signature() != internal_pattern.param_signature() {
              errors.push(ConfigError::ParamMismatch {
                internal: internal.clone(),
                external: template.to_string(),
                locale: locale.clone(),
              });
              valid = false;
            }
            externals.push(p);
          }
          Err(e) => {
            errors.push(e.into());
            valid = false;
          }
        }
      }

      if valid {
        entries.push(Entry { internal: internal_pattern, externals });
      }
    }

    for (li, locale) in locales.iter().enumerate() {
      let mut seen: HashMap<String, usize> = HashMap::new();
      for (ei, entry) in entries.iter().enumerate() {
        let key = shape_key(&entry.externals[li]);
        match seen.get(&key) {
          Some(&first) => errors.push(ConfigError::PathnameCollision {
            locale: locale.clone(),
            external: entry.externals[li].template().to_string(),
            first: entries[first].internal.template().to_string(),
            second: entry.internal.template().to_string(),
          }),
          None => {
            seen.insert(key, ei);
          }
        }
      }
    }

    if !errors.is_empty() {
      return Err(errors);
    }

    let order = (0..locales.len())
      .map(|li| {
        let mut indices: Vec<usize> = (0..entries.len()).collect();
        indices.sort_by_key(|&ei| entries[ei].externals[li].priority());
        indices
      })
      .collect();

    Ok(Self { locales: locales.to_vec(), entries, order })
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Registered internal templates in registration order.
  pub fn templates(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|e| e.internal.template())
  }

  /// Resolve an unprefixed external path. `locale`'s own templates are tried
  /// first, then every other locale's in configured order.
  pub fn internal_for(&self, locale: &str, external_path: &str) -> Option<RouteMatch> {
    let own = self.locale_index(locale);
    if let Some(li) = own
      && let Some(found) = self.match_in(li, external_path)
    {
      return Some(found);
    }
    (0..self.locales.len()).filter(|&li| Some(li) != own).find_map(|li| self.match_in(li, external_path))
  }

  /// Render the external path of `internal_template` for `locale`. Templates
  /// the registry does not know are rendered as they are.
  pub fn external_for(
    &self,
    locale: &str,
    internal_template: &str,
    params: &Params,
  ) -> Result<String, PatternError> {
    match (self.locale_index(locale), self.entry(internal_template)) {
      (Some(li), Some(entry)) => entry.externals[li].render(params),
      _ => PathPattern::parse(internal_template)?.render(params),
    }
  }

  /// Render the internal (canonical) path of a match.
  pub fn internal_path(&self, route: &RouteMatch) -> Result<String, PatternError> {
    match self.entry(&route.internal_template) {
      Some(entry) => entry.internal.render(&route.params),
      None => PathPattern::parse(&route.internal_template)?.render(&route.params),
    }
  }

  /// Unprefixed external path of `route` in `locale`.
  pub fn localize(&self, locale: &str, route: &InternalRoute) -> Option<String> {
    match route {
      InternalRoute::Registered(m) => {
        self.external_for(locale, &m.internal_template, &m.params).ok()
      }
      InternalRoute::Unregistered(path) => Some(path.clone()),
    }
  }

  fn match_in(&self, li: usize, path: &str) -> Option<RouteMatch> {
    self.order[li].iter().find_map(|&ei| {
      let entry = &self.entries[ei];
      entry.externals[li].matches(path).map(|params| RouteMatch {
        internal_template: entry.internal.template().to_string(),
        params,
        matched_locale: self.locales[li].clone(),
      })
    })
  }

  fn locale_index(&self, locale: &str) -> Option<usize> {
    self.locales.iter().position(|l| l == locale)
  }

  fn entry(&self, internal_template: &str) -> Option<&Entry> {
    self.entries.iter().find(|e| e.internal.template() == internal_template)
  }
}

/// Template shape with parameter names erased: `/p/[id]` and `/p/[slug]`
/// accept exactly the same paths.
fn shape_key(pattern: &PathPattern) -> String {
  let mut key = String::new();
  for segment in pattern.segments() {
    key.push('/');
    match segment {
      Segment::Literal(literal) => key.push_str(literal),
      Segment::Dynamic(_) => key.push_str("[]"),
      Segment::CatchAll(_) => key.push_str("[...]"),
      Segment::OptionalCatchAll(_) => key.push_str("[[...]]"),
    }
  }
  key
}
