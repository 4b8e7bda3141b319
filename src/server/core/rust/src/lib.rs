/* src/server/core/rust/src/lib.rs */

//! Locale routing for SeamJS servers.
//!
//! A [`LocaleRouter`] takes a validated [`RoutingConfig`] and turns each
//! incoming [`RoutingRequest`] into a [`RoutingOutcome`]: the resolved
//! locale, a rewrite / redirect / pass-through verdict, and the headers and
//! cookie the response should carry. Everything here is synchronous and free
//! of I/O apart from [`load_routing_config`].

pub mod alternates;
pub mod config;
pub mod decide;
pub mod domain;
pub mod errors;
pub mod negotiate;
pub mod pathnames;
pub mod pattern;
pub mod request;
pub mod resolve;
pub mod router;

// Re-exports for ergonomic use
pub use alternates::{AlternateLink, generate_alternate_links, link_header_value};
pub use config::{
  DomainConfig, LocaleCookieConfig, LocaleCookieInput, LocalePrefixInput, PrefixMode,
  PrefixStrategy, RoutingConfig, RoutingConfigInput, SameSite, load_routing_config,
};
pub use decide::{Decision, RoutingVerdict, TEMPORARY_REDIRECT, decide};
pub use domain::{DomainEntry, DomainTable};
pub use errors::{ConfigError, PatternError};
pub use negotiate::{LanguagePreference, match_locale, negotiate_locale, parse_accept_language};
pub use pathnames::{ExternalTemplate, InternalRoute, PathnameRegistry, RouteMatch};
pub use pattern::{ParamValue, Params, PathPattern, PatternKind, Segment};
pub use request::{Origin, RoutingRequest};
pub use resolve::{LocaleSource, PrefixMatch, Resolution, resolve_locale};
pub use router::{CookieWrite, LocaleRouter, RoutingOutcome};

#[cfg(test)]
mod tests;
