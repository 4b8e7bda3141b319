/* src/server/core/rust/src/alternates.rs */

use crate::config::{PrefixMode, RoutingConfig};
use crate::domain::DomainEntry;
use crate::pathnames::InternalRoute;
use crate::request::Origin;

pub const X_DEFAULT: &str = "x-default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternateLink {
  pub url: String,
  pub hreflang: String,
}

fn link_for(
  config: &RoutingConfig,
  route: &InternalRoute,
  locale: &str,
  domain: Option<&DomainEntry>,
  origin: &Origin,
  hreflang: &str,
) -> Option<AlternateLink> {
  let localized = config.pathnames().localize(locale, route)?;
  let path = config.external_path(locale, &localized, domain);
  Some(AlternateLink { url: format!("{origin}{path}"), hreflang: hreflang.to_string() })
}

/// Every locale's URL for `route`, plus `x-default`.
///
/// With domains configured, links are grouped per domain (each domain's
/// locales in configured order, on that domain's host), followed by locales
/// no domain serves on the request origin. `x-default` points at the
/// default locale and is left out under `never` or with a single locale.
pub fn generate_alternate_links(
  config: &RoutingConfig,
  route: &InternalRoute,
  origin: &Origin,
) -> Vec<AlternateLink> {
  let domains = config.domains();
  let mut links = Vec::with_capacity(config.locales().len() + 1);

  if domains.is_empty() {
    for locale in config.locales() {
      links.extend(link_for(config, route, locale, None, origin, locale));
    }
  } else {
    for domain in domains.entries() {
      let domain_origin = origin.with_host(&domain.host);
      for locale in &domain.locales {
        links.extend(link_for(config, route, locale, Some(domain), &domain_origin, locale));
      }
    }
    let unserved = config.locales().iter().filter(|l| !domains.entries().iter().any(|d| d.serves(l)));
    for locale in unserved {
      links.extend(link_for(config, route, locale, None, origin, locale));
    }
  }

  if config.prefix_strategy().mode() != PrefixMode::Never && config.locales().len() > 1 {
    let default = config.default_locale();
    let x_default = match domains.domain_for_locale(default) {
      Some(domain) => link_for(config, route, default, Some(domain), &origin.with_host(&domain.host), X_DEFAULT),
      None => link_for(config, route, default, None, origin, X_DEFAULT),
    };
    links.extend(x_default);
  }

  links
}

/// Serialize links as an HTTP `Link` header value.
pub fn link_header_value(links: &[AlternateLink]) -> String {
  links
    .iter()
    .map(|l| format!("<{}>; rel=\"alternate\"; hreflang=\"{}\"", l.url, l.hreflang))
    .collect::<Vec<_>>()
    .join(", ")
}
