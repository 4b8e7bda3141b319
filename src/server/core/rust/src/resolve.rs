/* src/server/core/rust/src/resolve.rs */

use crate::config::RoutingConfig;
use crate::domain::DomainEntry;
use crate::negotiate::{best_match, parse_accept_language};
use crate::request::RoutingRequest;

/// Which tier of the resolution chain picked the locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleSource {
  PathPrefix,
  Domain,
  Cookie,
  AcceptLanguage,
  Default,
}

impl LocaleSource {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::PathPrefix => "path-prefix",
      Self::Domain => "domain",
      Self::Cookie => "cookie",
      Self::AcceptLanguage => "accept-language",
      Self::Default => "default",
    }
  }
}

/// A locale prefix found at the start of the (base-path-relative) path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixMatch<'a> {
  /// Canonical locale the prefix belongs to.
  pub locale: &'a str,
  /// Prefix exactly as it appeared in the URL, possibly in another case.
  pub raw: &'a str,
  /// Remainder after the prefix; `/` when nothing follows.
  pub rest: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
  pub locale: &'a str,
  pub source: LocaleSource,
  /// Configured domain recognized from the request host.
  pub domain: Option<&'a DomainEntry>,
  pub prefix: Option<PrefixMatch<'a>>,
  /// Request path with the base path removed.
  pub path: &'a str,
}

impl<'a> Resolution<'a> {
  /// Path after the locale prefix, or the whole path when there is none.
  pub fn rest(&self) -> &'a str {
    self.prefix.map_or(self.path, |m| m.rest)
  }
}

/// Path relative to `base_path`, or `None` when the request lives outside it.
pub fn strip_base_path<'a>(base_path: &str, path: &'a str) -> Option<&'a str> {
  if base_path.is_empty() {
    return Some(path);
  }
  match path.strip_prefix(base_path)? {
    "" => Some("/"),
    rest if rest.starts_with('/') => Some(rest),
    _ => None,
  }
}

/// Longest configured prefix (case-insensitive, whole segments) at the start of `path`.
pub fn match_locale_prefix<'a>(config: &'a RoutingConfig, path: &'a str) -> Option<PrefixMatch<'a>> {
  let mut best: Option<PrefixMatch<'a>> = None;
  for (locale, prefix) in config.locale_prefixes() {
    let Some(head) = path.get(..prefix.len()) else {
      continue;
    };
    if !head.eq_ignore_ascii_case(prefix) {
      continue;
    }
    let rest = &path[prefix.len()..];
    if !(rest.is_empty() || rest.starts_with('/')) {
      continue;
    }
    if best.is_none_or(|b| head.len() > b.raw.len()) {
      best = Some(PrefixMatch { locale, raw: head, rest: if rest.is_empty() { "/" } else { rest } });
    }
  }
  best
}

pub fn from_domain(domain: Option<&DomainEntry>) -> Option<&str> {
  domain.map(|d| d.default_locale.as_str())
}

/// Cookie value, when detection is on and it names a supported locale exactly.
pub fn from_cookie<'a>(config: &'a RoutingConfig, request: &RoutingRequest<'_>) -> Option<&'a str> {
  if !config.locale_detection() {
    return None;
  }
  let value = request.cookie(&config.locale_cookie()?.name)?;
  config.locales().iter().find(|l| *l == value).map(String::as_str)
}

/// Best Accept-Language match among the domain's locales (or all locales).
pub fn from_accept_language<'a>(
  config: &'a RoutingConfig,
  request: &RoutingRequest<'_>,
  domain: Option<&'a DomainEntry>,
) -> Option<&'a str> {
  if !config.locale_detection() {
    return None;
  }
  let prefs = parse_accept_language(request.accept_language?);
  let supported = domain.map_or(config.locales(), |d| d.locales.as_slice());
  best_match(&prefs, supported)
}

/// Resolve the request locale: path prefix, then the recognized domain's
/// default, then cookie, then Accept-Language, then the default locale.
pub fn resolve_locale<'a>(
  config: &'a RoutingConfig,
  request: &RoutingRequest<'a>,
  path: &'a str,
) -> Resolution<'a> {
  let domain = request.effective_host().and_then(|host| config.domains().lookup(host));
  let prefix = match_locale_prefix(config, path);

  let (locale, source) = if let Some(m) = prefix {
    (m.locale, LocaleSource::PathPrefix)
  } else if let Some(locale) = from_domain(domain) {
    (locale, LocaleSource::Domain)
  } else if let Some(locale) = from_cookie(config, request) {
    (locale, LocaleSource::Cookie)
  } else if let Some(locale) = from_accept_language(config, request, domain) {
    (locale, LocaleSource::AcceptLanguage)
  } else {
    (config.default_locale(), LocaleSource::Default)
  };

  Resolution { locale, source, domain, prefix, path }
}
