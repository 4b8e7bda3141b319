/* src/server/core/rust/src/decide.rs */

use std::borrow::Cow;
use std::fmt;
use std::ptr;

use crate::config::{RoutingConfig, join_path};
use crate::domain::DomainEntry;
use crate::pathnames::InternalRoute;
use crate::request::RoutingRequest;
use crate::resolve::Resolution;

/// Status used for every locale-driven redirect.
pub const TEMPORARY_REDIRECT: u16 = 307;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingVerdict {
  /// Forward the request untouched.
  PassThrough,
  /// Forward the request to `target` (path and query) internally.
  Rewrite { target: String },
  /// Answer with a redirect to `target`, relative unless the host changes.
  Redirect { target: String, status: u16 },
}

impl RoutingVerdict {
  pub fn kind(&self) -> &'static str {
    match self {
      Self::PassThrough => "pass-through",
      Self::Rewrite { .. } => "rewrite",
      Self::Redirect { .. } => "redirect",
    }
  }
}

impl fmt::Display for RoutingVerdict {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::PassThrough => f.write_str("pass-through"),
      Self::Rewrite { target } => write!(f, "rewrite {target}"),
      Self::Redirect { target, status } => write!(f, "redirect {status} {target}"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
  pub verdict: RoutingVerdict,
  /// Canonical route of the request, shared with alternate link generation.
  pub route: InternalRoute,
}

/// Domain that should serve the resolved locale: the current one when it
/// can, otherwise the domain configured for that locale.
fn target_domain<'a>(config: &'a RoutingConfig, resolution: &Resolution<'a>) -> Option<&'a DomainEntry> {
  let current = resolution.domain?;
  if current.serves(resolution.locale) {
    return Some(current);
  }
  config.domains().domain_for_locale(resolution.locale).or(Some(current))
}

/// Decide what to do with a request whose locale has been resolved.
///
/// The canonical public URL for the resolved locale is computed first
/// (target domain, base path, prefix policy, localized pathname, slash
/// policy). Any difference from the request becomes a redirect; otherwise
/// the request is rewritten to `/<locale><internal path>`, unless a pathname
/// registry is configured and nothing in it matched.
pub fn decide(config: &RoutingConfig, resolution: &Resolution<'_>, request: &RoutingRequest<'_>) -> Decision {
  let locale = resolution.locale;
  let rest = resolution.rest();
  let registry = config.pathnames();
  let matched = registry.internal_for(locale, rest);

  let localized: Cow<'_, str> = match &matched {
    Some(m) if m.matched_locale != locale => registry
      .external_for(locale, &m.internal_template, &m.params)
      .map_or(Cow::Borrowed(rest), Cow::Owned),
    _ => Cow::Borrowed(rest),
  };

  let target = target_domain(config, resolution);
  let expected = config.external_path(locale, &localized, target);
  let search = request.search();
  let host_changes = match (resolution.domain, target) {
    (Some(current), Some(target)) => !ptr::eq(current, target),
    _ => false,
  };

  let verdict = if host_changes || expected != request.path {
    let target = match target {
      Some(domain) if host_changes => {
        format!("{}{expected}{search}", request.origin().with_host(&domain.host))
      }
      _ => format!("{expected}{search}"),
    };
    RoutingVerdict::Redirect { target, status: TEMPORARY_REDIRECT }
  } else if !registry.is_empty() && matched.is_none() {
    RoutingVerdict::PassThrough
  } else {
    let internal = match &matched {
      Some(m) => registry.internal_path(m).map_or(Cow::Borrowed(rest), Cow::Owned),
      None => Cow::Borrowed(rest),
    };
    let path = join_path(config.base_path(), &format!("/{locale}"), &internal, config.trailing_slash());
    RoutingVerdict::Rewrite { target: format!("{path}{search}") }
  };

  let route = match matched {
    Some(m) => InternalRoute::Registered(m),
    None => InternalRoute::Unregistered(rest.to_string()),
  };
  Decision { verdict, route }
}
