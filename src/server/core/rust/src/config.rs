/* src/server/core/rust/src/config.rs */

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, Visitor};

use crate::domain::{DomainEntry, DomainTable, normalize_host};
use crate::errors::ConfigError;
use crate::pathnames::{ExternalTemplate, PathnameRegistry};

// -- Input shape (what the JSON file / caller provides) --

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrefixMode {
  #[default]
  AsNeeded,
  Always,
  Never,
}

impl PrefixMode {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::AsNeeded => "as-needed",
      Self::Always => "always",
      Self::Never => "never",
    }
  }
}

/// `"as-needed"` or `{ "mode": "always", "prefixes": { "de-AT": "/de/at" } }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LocalePrefixInput {
  Mode(PrefixMode),
  Detailed {
    #[serde(default)]
    mode: PrefixMode,
    #[serde(default)]
    prefixes: BTreeMap<String, String>,
  },
}

impl Default for LocalePrefixInput {
  fn default() -> Self {
    Self::Mode(PrefixMode::AsNeeded)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainConfig {
  #[serde(alias = "host")]
  pub domain: String,
  pub default_locale: String,
  /// Served subset; every configured locale when absent.
  #[serde(default)]
  pub locales: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
  Strict,
  #[default]
  Lax,
  None,
}

impl SameSite {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Strict => "Strict",
      Self::Lax => "Lax",
      Self::None => "None",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocaleCookieConfig {
  pub name: String,
  pub max_age: u64,
  pub same_site: SameSite,
}

impl Default for LocaleCookieConfig {
  fn default() -> Self {
    Self { name: "NEXT_LOCALE".to_string(), max_age: 31_536_000, same_site: SameSite::Lax }
  }
}

/// `true`/`false`, or an object overriding the cookie attributes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LocaleCookieInput {
  Enabled(bool),
  Custom(LocaleCookieConfig),
}

impl Default for LocaleCookieInput {
  fn default() -> Self {
    Self::Enabled(true)
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConfigInput {
  pub locales: Vec<String>,
  pub default_locale: String,
  #[serde(default)]
  pub locale_prefix: LocalePrefixInput,
  /// Internal template -> external form, in file order.
  #[serde(default, deserialize_with = "ordered_pathnames")]
  pub pathnames: Vec<(String, ExternalTemplate)>,
  #[serde(default)]
  pub domains: Vec<DomainConfig>,
  #[serde(default = "default_true")]
  pub locale_detection: bool,
  #[serde(default)]
  pub trailing_slash: bool,
  #[serde(default)]
  pub base_path: String,
  #[serde(default)]
  pub locale_cookie: LocaleCookieInput,
  #[serde(default = "default_true")]
  pub alternate_links: bool,
  #[serde(default = "default_locale_header")]
  pub locale_header: String,
}

impl RoutingConfigInput {
  /// Defaults for everything except the locale list.
  pub fn new(locales: &[&str], default_locale: &str) -> Self {
    Self {
      locales: locales.iter().map(|l| (*l).to_string()).collect(),
      default_locale: default_locale.to_string(),
      locale_prefix: LocalePrefixInput::default(),
      pathnames: Vec::new(),
      domains: Vec::new(),
      locale_detection: true,
      trailing_slash: false,
      base_path: String::new(),
      locale_cookie: LocaleCookieInput::default(),
      alternate_links: true,
      locale_header: default_locale_header(),
    }
  }
}

fn default_true() -> bool {
  true
}

fn default_locale_header() -> String {
  "x-seam-locale".to_string()
}

fn ordered_pathnames<'de, D>(deserializer: D) -> Result<Vec<(String, ExternalTemplate)>, D::Error>
where
  D: Deserializer<'de>,
{
  struct PathnamesVisitor;

  impl<'de> Visitor<'de> for PathnamesVisitor {
    type Value = Vec<(String, ExternalTemplate)>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
      f.write_str("a map of internal templates to external templates")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
      let mut out = Vec::with_capacity(map.size_hint().unwrap_or(0));
      while let Some(entry) = map.next_entry()? {
        out.push(entry);
      }
      Ok(out)
    }
  }

  deserializer.deserialize_map(PathnamesVisitor)
}

// -- Runtime shape --

/// How locales appear at the start of the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixStrategy {
  AsNeeded,
  Always,
  Never,
  /// Per-locale prefixes replacing `/<locale>`; `mode` is never `Never`.
  Custom { mode: PrefixMode, prefixes: BTreeMap<String, String> },
}

impl PrefixStrategy {
  pub fn mode(&self) -> PrefixMode {
    match self {
      Self::AsNeeded => PrefixMode::AsNeeded,
      Self::Always => PrefixMode::Always,
      Self::Never => PrefixMode::Never,
      Self::Custom { mode, .. } => *mode,
    }
  }
}

/// Validated, normalized routing configuration. Built once, shared read-only.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
  locales: Vec<String>,
  default_locale: String,
  prefix: PrefixStrategy,
  /// Effective prefix of each locale, index-aligned with `locales`.
  prefixes: Vec<String>,
  pathnames: PathnameRegistry,
  domains: DomainTable,
  locale_detection: bool,
  trailing_slash: bool,
  base_path: String,
  locale_cookie: Option<LocaleCookieConfig>,
  alternate_links: bool,
  locale_header: String,
}

impl RoutingConfig {
  pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
    let input: RoutingConfigInput = serde_json::from_str(json)?;
    Self::try_from(input)
  }

  pub fn locales(&self) -> &[String] {
    &self.locales
  }

  pub fn default_locale(&self) -> &str {
    &self.default_locale
  }

  pub fn prefix_strategy(&self) -> &PrefixStrategy {
    &self.prefix
  }

  pub fn pathnames(&self) -> &PathnameRegistry {
    &self.pathnames
  }

  pub fn domains(&self) -> &DomainTable {
    &self.domains
  }

  pub fn locale_detection(&self) -> bool {
    self.locale_detection
  }

  pub fn trailing_slash(&self) -> bool {
    self.trailing_slash
  }

  /// Empty when the app is mounted at the root.
  pub fn base_path(&self) -> &str {
    &self.base_path
  }

  pub fn locale_cookie(&self) -> Option<&LocaleCookieConfig> {
    self.locale_cookie.as_ref()
  }

  pub fn alternate_links(&self) -> bool {
    self.alternate_links
  }

  /// Lowercased header name.
  pub fn locale_header(&self) -> &str {
    &self.locale_header
  }

  pub fn is_supported(&self, locale: &str) -> bool {
    self.locales.iter().any(|l| l == locale)
  }

  /// URL prefix of `locale`, e.g. `/de` or a custom `/de/at`.
  pub fn prefix_for(&self, locale: &str) -> Option<&str> {
    self.locale_prefixes().find(|(l, _)| *l == locale).map(|(_, prefix)| prefix)
  }

  /// `(locale, prefix)` pairs in configured locale order.
  pub fn locale_prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
    self.locales.iter().map(String::as_str).zip(self.prefixes.iter().map(String::as_str))
  }

  /// Whether URLs for `locale` carry its prefix. Under `as-needed` the
  /// default is the domain's default when a domain is recognized.
  pub fn prefix_required(&self, locale: &str, domain: Option<&DomainEntry>) -> bool {
    match self.prefix.mode() {
      PrefixMode::Always => true,
      PrefixMode::Never => false,
      PrefixMode::AsNeeded => {
        let default = domain.map_or(self.default_locale.as_str(), |d| d.default_locale.as_str());
        locale != default
      }
    }
  }

  /// Public path for an already localized, unprefixed path:
  /// base path + prefix when required + path, with the trailing-slash policy applied.
  pub fn external_path(&self, locale: &str, localized: &str, domain: Option<&DomainEntry>) -> String {
    let prefix = if self.prefix_required(locale, domain) { self.prefix_for(locale).unwrap_or_default() } else { "" };
    join_path(&self.base_path, prefix, localized, self.trailing_slash)
  }
}

/// `base + prefix + rest` where `rest` is an absolute path; the root rest
/// collapses into the prefix (`/de`, not `/de/`) before the slash policy runs.
pub(crate) fn join_path(base: &str, prefix: &str, rest: &str, trailing_slash: bool) -> String {
  let mut path = String::with_capacity(base.len() + prefix.len() + rest.len() + 1);
  path.push_str(base);
  path.push_str(prefix);
  if rest != "/" || path.is_empty() {
    // Runs of `/` collapse so a relative target never starts with `//`.
    for c in rest.chars() {
      if c != '/' || !path.ends_with('/') {
        path.push(c);
      }
    }
  }
  apply_trailing_slash(path, trailing_slash)
}

pub(crate) fn apply_trailing_slash(mut path: String, trailing_slash: bool) -> String {
  if path.is_empty() {
    path.push('/');
  }
  if trailing_slash {
    if !path.ends_with('/') {
      path.push('/');
    }
  } else {
    while path.len() > 1 && path.ends_with('/') {
      path.pop();
    }
  }
  path
}

impl TryFrom<RoutingConfigInput> for RoutingConfig {
  type Error = ConfigError;

  fn try_from(input: RoutingConfigInput) -> Result<Self, Self::Error> {
    let mut errors = Vec::new();

    if input.locales.is_empty() {
      errors.push(ConfigError::EmptyLocales);
    }
    let mut seen = Vec::with_capacity(input.locales.len());
    for locale in &input.locales {
      if seen.contains(&locale) {
        errors.push(ConfigError::DuplicateLocale(locale.clone()));
      }
      seen.push(locale);
    }
    if !input.locales.is_empty() && !input.locales.contains(&input.default_locale) {
      errors.push(ConfigError::DefaultLocaleNotSupported {
        default: input.default_locale.clone(),
        locales: input.locales.clone(),
      });
    }

    let prefix = build_prefix_strategy(&input.locales, input.locale_prefix, &mut errors);

    let base_path = match input.base_path.as_str() {
      "" | "/" => String::new(),
      base if base.starts_with('/') && !base.ends_with('/') => base.to_string(),
      base => {
        errors.push(ConfigError::InvalidBasePath(base.to_string()));
        String::new()
      }
    };

    let domains = build_domains(&input.locales, input.domains, &mut errors);

    let pathnames = match PathnameRegistry::build(&input.locales, &input.pathnames) {
      Ok(registry) => registry,
      Err(found) => {
        errors.extend(found);
        PathnameRegistry::default()
      }
    };

    let locale_cookie = match input.locale_cookie {
      LocaleCookieInput::Enabled(false) => None,
      LocaleCookieInput::Enabled(true) => Some(LocaleCookieConfig::default()),
      LocaleCookieInput::Custom(cookie) => {
        if cookie.name.trim().is_empty() {
          errors.push(ConfigError::EmptyCookieName);
        }
        Some(cookie)
      }
    };

    if !is_header_name(&input.locale_header) {
      errors.push(ConfigError::InvalidHeaderName(input.locale_header.clone()));
    }

    let prefixes = input
      .locales
      .iter()
      .map(|locale| match &prefix {
        PrefixStrategy::Custom { prefixes, .. } => {
          prefixes.get(locale).cloned().unwrap_or_else(|| format!("/{locale}"))
        }
        _ => format!("/{locale}"),
      })
      .collect();

    match errors.len() {
      0 => Ok(Self {
        locales: input.locales,
        default_locale: input.default_locale,
        prefix,
        prefixes,
        pathnames,
        domains,
        locale_detection: input.locale_detection,
        trailing_slash: input.trailing_slash,
        base_path,
        locale_cookie,
        alternate_links: input.alternate_links,
        locale_header: input.locale_header.to_ascii_lowercase(),
      }),
      1 => Err(errors.remove(0)),
      _ => Err(ConfigError::Invalid(errors)),
    }
  }
}

fn build_prefix_strategy(
  locales: &[String],
  input: LocalePrefixInput,
  errors: &mut Vec<ConfigError>,
) -> PrefixStrategy {
  let (mode, prefixes) = match input {
    LocalePrefixInput::Mode(mode) => (mode, BTreeMap::new()),
    LocalePrefixInput::Detailed { mode, prefixes } => (mode, prefixes),
  };
  if prefixes.is_empty() {
    return match mode {
      PrefixMode::AsNeeded => PrefixStrategy::AsNeeded,
      PrefixMode::Always => PrefixStrategy::Always,
      PrefixMode::Never => PrefixStrategy::Never,
    };
  }
  if mode == PrefixMode::Never {
    errors.push(ConfigError::PrefixesWithNever);
  }

  for (locale, prefix) in &prefixes {
    if !locales.contains(locale) {
      errors.push(ConfigError::PrefixForUnknownLocale(locale.clone()));
    }
    let malformed = !prefix.starts_with('/')
      || prefix.ends_with('/')
      || prefix.contains("//")
      || prefix.contains(['?', '#', '[', ']']);
    if malformed {
      errors.push(ConfigError::InvalidPrefix { locale: locale.clone(), prefix: prefix.clone() });
    }
  }

  // Effective prefixes include the implicit `/<locale>` of locales without a custom one.
  let mut owners: HashMap<String, &str> = HashMap::new();
  for locale in locales {
    let prefix = prefixes.get(locale).cloned().unwrap_or_else(|| format!("/{locale}"));
    if let Some(first) = owners.insert(prefix.to_lowercase(), locale) {
      errors.push(ConfigError::DuplicatePrefix {
        prefix,
        first: first.to_string(),
        second: locale.clone(),
      });
    }
  }

  PrefixStrategy::Custom { mode, prefixes }
}

fn build_domains(
  locales: &[String],
  input: Vec<DomainConfig>,
  errors: &mut Vec<ConfigError>,
) -> DomainTable {
  let mut hosts = Vec::with_capacity(input.len());
  let mut entries = Vec::with_capacity(input.len());

  for domain in input {
    let host = normalize_host(&domain.domain);
    if hosts.contains(&host) {
      errors.push(ConfigError::DuplicateDomain(domain.domain.clone()));
    }
    hosts.push(host);

    let subset = domain.locales.unwrap_or_else(|| locales.to_vec());
    for locale in subset.iter().filter(|l| !locales.contains(l)) {
      errors.push(ConfigError::DomainLocaleNotSupported {
        domain: domain.domain.clone(),
        locale: locale.clone(),
      });
    }
    if !locales.contains(&domain.default_locale) {
      errors.push(ConfigError::DomainLocaleNotSupported {
        domain: domain.domain.clone(),
        locale: domain.default_locale.clone(),
      });
    } else if !subset.contains(&domain.default_locale) {
      errors.push(ConfigError::DomainDefaultNotServed {
        domain: domain.domain.clone(),
        locale: domain.default_locale.clone(),
      });
    }

    // Served locales follow the global order.
    let served = locales.iter().filter(|l| subset.contains(l)).cloned().collect();
    entries.push(DomainEntry::new(domain.domain, domain.default_locale, served));
  }

  DomainTable::new(entries)
}

fn is_header_name(name: &str) -> bool {
  !name.is_empty()
    && name.bytes().all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

/// Read and validate a JSON routing config file.
pub fn load_routing_config(path: impl AsRef<Path>) -> Result<RoutingConfig, ConfigError> {
  let path = path.as_ref();
  let content = std::fs::read_to_string(path)
    .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
  let config = RoutingConfig::from_json_str(&content)?;
  tracing::info!(
    path = %path.display(),
    locales = ?config.locales(),
    default_locale = config.default_locale(),
    prefix = config.prefix_strategy().mode().as_str(),
    pathnames = config.pathnames().len(),
    domains = config.domains().entries().len(),
    "routing config loaded"
  );
  Ok(config)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn minimal_json_gets_defaults() {
    let config = RoutingConfig::from_json_str(r#"{"locales":["en","de"],"defaultLocale":"en"}"#).unwrap();
    assert_eq!(config.prefix_strategy(), &PrefixStrategy::AsNeeded);
    assert!(config.locale_detection());
    assert!(config.alternate_links());
    assert!(!config.trailing_slash());
    assert_eq!(config.base_path(), "");
    assert_eq!(config.locale_header(), "x-seam-locale");
    assert_eq!(config.locale_cookie(), Some(&LocaleCookieConfig::default()));
    assert!(config.pathnames().is_empty());
  }

  #[test]
  fn full_json_shape() {
    let json = r#"{
      "locales": ["en", "de", "de-AT"],
      "defaultLocale": "en",
      "localePrefix": { "mode": "always", "prefixes": { "de-AT": "/de/at" } },
      "pathnames": {
        "/about": { "de": "/ueber" },
        "/blog/[slug]": "/blog/[slug]"
      },
      "domains": [{ "domain": "example.de", "defaultLocale": "de", "locales": ["de-AT", "de"] }],
      "localeDetection": false,
      "trailingSlash": true,
      "basePath": "/docs",
      "localeCookie": { "name": "LANG", "sameSite": "strict" },
      "alternateLinks": false,
      "localeHeader": "X-Locale"
    }"#;
    let config = RoutingConfig::from_json_str(json).unwrap();
    assert_eq!(config.prefix_for("de-AT"), Some("/de/at"));
    assert_eq!(config.prefix_for("de"), Some("/de"));
    assert_eq!(config.prefix_for("fr"), None);
    assert_eq!(
      config.locale_prefixes().collect::<Vec<_>>(),
      [("en", "/en"), ("de", "/de"), ("de-AT", "/de/at")]
    );
    assert_eq!(config.prefix_strategy().mode(), PrefixMode::Always);
    assert_eq!(config.pathnames().templates().collect::<Vec<_>>(), ["/about", "/blog/[slug]"]);
    let domain = &config.domains().entries()[0];
    assert_eq!(domain.locales, ["de", "de-AT"]);
    assert_eq!(config.base_path(), "/docs");
    let cookie = config.locale_cookie().unwrap();
    assert_eq!(cookie.name, "LANG");
    assert_eq!(cookie.max_age, 31_536_000);
    assert_eq!(cookie.same_site, SameSite::Strict);
    assert_eq!(config.locale_header(), "x-locale");
  }

  #[test]
  fn cookie_can_be_disabled() {
    let json = r#"{"locales":["en"],"defaultLocale":"en","localeCookie":false}"#;
    assert!(RoutingConfig::from_json_str(json).unwrap().locale_cookie().is_none());
  }

  #[test]
  fn domain_without_locales_serves_everything() {
    let json = r#"{"locales":["en","fr"],"defaultLocale":"en","domains":[{"domain":"example.fr","defaultLocale":"fr"}]}"#;
    let config = RoutingConfig::from_json_str(json).unwrap();
    assert_eq!(config.domains().entries()[0].locales, ["en", "fr"]);
  }

  #[test]
  fn default_locale_must_be_supported() {
    let err = RoutingConfig::try_from(RoutingConfigInput::new(&["en", "de"], "fr")).unwrap_err();
    assert_eq!(err.to_string(), "defaultLocale \"fr\" is not in locales [\"en\", \"de\"]");
  }

  #[test]
  fn every_problem_is_reported() {
    let mut input = RoutingConfigInput::new(&["en", "en"], "en");
    input.base_path = "docs/".into();
    input.locale_header = "bad header".into();
    let Err(ConfigError::Invalid(errors)) = RoutingConfig::try_from(input) else {
      panic!("expected aggregated errors");
    };
    assert_eq!(errors.len(), 3);
    assert!(matches!(errors[0], ConfigError::DuplicateLocale(ref l) if l == "en"));
    assert!(matches!(errors[1], ConfigError::InvalidBasePath(_)));
    assert!(matches!(errors[2], ConfigError::InvalidHeaderName(_)));
  }

  #[test]
  fn custom_prefix_validation() {
    let mut input = RoutingConfigInput::new(&["en", "de"], "en");
    input.locale_prefix = LocalePrefixInput::Detailed {
      mode: PrefixMode::Never,
      prefixes: BTreeMap::from([("de".to_string(), "/en".to_string()), ("fr".to_string(), "fr/".to_string())]),
    };
    let Err(ConfigError::Invalid(errors)) = RoutingConfig::try_from(input) else {
      panic!("expected aggregated errors");
    };
    assert!(errors.iter().any(|e| matches!(e, ConfigError::PrefixesWithNever)));
    assert!(errors.iter().any(|e| matches!(e, ConfigError::PrefixForUnknownLocale(l) if l == "fr")));
    assert!(errors.iter().any(|e| matches!(e, ConfigError::InvalidPrefix { .. })));
    assert!(errors.iter().any(|e| matches!(e, ConfigError::DuplicatePrefix { .. })));
  }

  #[test]
  fn domain_validation() {
    let mut input = RoutingConfigInput::new(&["en", "de"], "en");
    input.domains = vec![
      DomainConfig { domain: "example.com".into(), default_locale: "de".into(), locales: Some(vec!["en".into()]) },
      DomainConfig { domain: "EXAMPLE.com:443".into(), default_locale: "it".into(), locales: Some(vec!["it".into()]) },
    ];
    let Err(ConfigError::Invalid(errors)) = RoutingConfig::try_from(input) else {
      panic!("expected aggregated errors");
    };
    assert!(errors.iter().any(|e| matches!(e, ConfigError::DomainDefaultNotServed { .. })));
    assert!(errors.iter().any(|e| matches!(e, ConfigError::DuplicateDomain(_))));
    assert!(errors.iter().any(|e| matches!(e, ConfigError::DomainLocaleNotSupported { .. })));
  }

  #[test]
  fn malformed_json_is_a_parse_error() {
    assert!(matches!(RoutingConfig::from_json_str("{"), Err(ConfigError::Parse(_))));
  }

  #[test]
  fn join_path_collapses_root() {
    assert_eq!(join_path("", "/de", "/", false), "/de");
    assert_eq!(join_path("", "/de", "/", true), "/de/");
    assert_eq!(join_path("", "", "/", false), "/");
    assert_eq!(join_path("/base", "", "/", false), "/base");
    assert_eq!(join_path("/base", "/de", "/about/", false), "/base/de/about");
    assert_eq!(join_path("", "", "/about", true), "/about/");
  }

  #[test]
  fn join_path_collapses_repeated_slashes() {
    assert_eq!(join_path("", "", "//evil.com", false), "/evil.com");
    assert_eq!(join_path("", "/de", "//evil.com//x", false), "/de/evil.com/x");
    assert_eq!(join_path("/base", "", "///", true), "/base/");
    assert_eq!(join_path("", "", "//", false), "/");
  }

  #[test]
  fn prefix_required_respects_domain_default() {
    let mut input = RoutingConfigInput::new(&["en", "de"], "en");
    input.domains = vec![DomainConfig { domain: "example.de".into(), default_locale: "de".into(), locales: None }];
    let config = RoutingConfig::try_from(input).unwrap();
    let de = config.domains().lookup("example.de");
    assert!(!config.prefix_required("de", de));
    assert!(config.prefix_required("en", de));
    assert!(config.prefix_required("de", None));
  }
}
