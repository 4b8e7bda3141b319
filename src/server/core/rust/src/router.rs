/* src/server/core/rust/src/router.rs */

use tracing::debug;

use crate::alternates::{generate_alternate_links, link_header_value};
use crate::config::{RoutingConfig, SameSite};
use crate::decide::{RoutingVerdict, decide};
use crate::request::RoutingRequest;
use crate::resolve::{LocaleSource, resolve_locale, strip_base_path};

/// Locale cookie the response should set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieWrite {
  pub name: String,
  pub value: String,
  pub path: String,
  pub max_age: u64,
  pub same_site: SameSite,
}

impl CookieWrite {
  /// `Set-Cookie` header value.
  pub fn to_header_value(&self) -> String {
    let mut out = format!(
      "{}={}; Path={}; Max-Age={}; SameSite={}",
      self.name,
      self.value,
      self.path,
      self.max_age,
      self.same_site.as_str()
    );
    if self.same_site == SameSite::None {
      out.push_str("; Secure");
    }
    out
  }
}

/// Everything an adapter needs to apply a routing decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingOutcome {
  pub verdict: RoutingVerdict,
  /// Resolved locale; `None` for requests outside the base path.
  pub locale: Option<String>,
  pub source: Option<LocaleSource>,
  /// `(name, value)` to insert into the forwarded request.
  pub locale_header: Option<(String, String)>,
  pub cookie: Option<CookieWrite>,
  /// `Link` header value with the alternate URLs.
  pub link_header: Option<String>,
}

impl RoutingOutcome {
  fn untouched() -> Self {
    Self {
      verdict: RoutingVerdict::PassThrough,
      locale: None,
      source: None,
      locale_header: None,
      cookie: None,
      link_header: None,
    }
  }
}

/// Per-request entry point. Holds the validated config; cheap to share behind `Arc`.
#[derive(Debug, Clone)]
pub struct LocaleRouter {
  config: RoutingConfig,
}

impl LocaleRouter {
  pub fn new(config: RoutingConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &RoutingConfig {
    &self.config
  }

  pub fn route(&self, request: &RoutingRequest<'_>) -> RoutingOutcome {
    let config = &self.config;
    let Some(path) = strip_base_path(config.base_path(), request.path) else {
      debug!(path = request.path, base_path = config.base_path(), "outside base path, passing through");
      return RoutingOutcome::untouched();
    };

    let resolution = resolve_locale(config, request, path);
    let decision = decide(config, &resolution, request);
    let locale = resolution.locale;

    let cookie = config
      .locale_cookie()
      .filter(|_| config.locale_detection() && decision.verdict != RoutingVerdict::PassThrough)
      .filter(|c| request.cookie(&c.name) != Some(locale))
      .map(|c| CookieWrite {
        name: c.name.clone(),
        value: locale.to_string(),
        path: if config.base_path().is_empty() { "/".to_string() } else { config.base_path().to_string() },
        max_age: c.max_age,
        same_site: c.same_site,
      });

    let link_header = config
      .alternate_links()
      .then(|| generate_alternate_links(config, &decision.route, &request.origin()))
      .filter(|links| !links.is_empty())
      .map(|links| link_header_value(&links));

    debug!(
      path = request.path,
      locale,
      source = resolution.source.as_str(),
      verdict = %decision.verdict,
      "locale routing decision"
    );

    RoutingOutcome {
      verdict: decision.verdict,
      locale: Some(locale.to_string()),
      source: Some(resolution.source),
      locale_header: Some((config.locale_header().to_string(), locale.to_string())),
      cookie,
      link_header,
    }
  }
}
