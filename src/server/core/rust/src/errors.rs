/* src/server/core/rust/src/errors.rs */

use std::path::PathBuf;

use thiserror::Error;

/// Failure to parse or render a single route template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
  #[error("template \"{0}\" must start with '/'")]
  MissingLeadingSlash(String),

  #[error("template \"{template}\": invalid segment \"{segment}\" ({reason})")]
  InvalidSegment { template: String, segment: String, reason: &'static str },

  #[error("template \"{template}\": parameter \"{name}\" appears more than once")]
  DuplicateParam { template: String, name: String },

  #[error("template \"{template}\": catch-all parameter \"{name}\" must be the last segment")]
  CatchAllNotLast { template: String, name: String },

  #[error("template \"{template}\": missing value for parameter \"{name}\"")]
  MissingParam { template: String, name: String },

  #[error("template \"{template}\": parameter \"{name}\" has a value of the wrong shape")]
  ParamShape { template: String, name: String },
}

/// Configuration problems. All of these are fatal at start-up.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read routing config {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid routing config JSON: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("locales must not be empty")]
  EmptyLocales,

  #[error("locale \"{0}\" is listed more than once")]
  DuplicateLocale(String),

  #[error("defaultLocale \"{default}\" is not in locales {locales:?}")]
  DefaultLocaleNotSupported { default: String, locales: Vec<String> },

  #[error("localePrefix: prefix \"{prefix}\" for \"{locale}\" must start with '/' and not end with '/'")]
  InvalidPrefix { locale: String, prefix: String },

  #[error("localePrefix: prefix \"{prefix}\" is used by both \"{first}\" and \"{second}\"")]
  DuplicatePrefix { prefix: String, first: String, second: String },

  #[error("localePrefix: prefix configured for unknown locale \"{0}\"")]
  PrefixForUnknownLocale(String),

  #[error("localePrefix: custom prefixes cannot be combined with mode \"never\"")]
  PrefixesWithNever,

  #[error("basePath \"{0}\" must start with '/' and not end with '/'")]
  InvalidBasePath(String),

  #[error("domain \"{0}\" is configured more than once")]
  DuplicateDomain(String),

  #[error("domain \"{domain}\": locale \"{locale}\" is not in locales")]
  DomainLocaleNotSupported { domain: String, locale: String },

  #[error("domain \"{domain}\": defaultLocale \"{locale}\" is not served by this domain")]
  DomainDefaultNotServed { domain: String, locale: String },

  #[error("pathnames: {0}")]
  Pattern(#[from] PatternError),

  #[error("pathnames: \"{internal}\" has an entry for unknown locale \"{locale}\"")]
  PathnameForUnknownLocale { internal: String, locale: String },

  #[error(
    "pathnames: \"{internal}\" and its \"{locale}\" form \"{external}\" use different parameters"
  )]
  ParamMismatch { internal: String, external: String, locale: String },

  #[error("pathnames: \"{first}\" and \"{second}\" both map to \"{external}\" for \"{locale}\"")]
  PathnameCollision { locale: String, external: String, first: String, second: String },

  #[error("localeCookie: name must not be empty")]
  EmptyCookieName,

  #[error("localeHeader: \"{0}\" is not a valid header name")]
  InvalidHeaderName(String),

  #[error("routing config is invalid: {}", join_errors(.0))]
  Invalid(Vec<ConfigError>),
}

fn join_errors(errors: &[ConfigError]) -> String {
  errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
