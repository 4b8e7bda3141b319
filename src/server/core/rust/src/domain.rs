/* src/server/core/rust/src/domain.rs */

/// A host that serves a subset of the configured locales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainEntry {
  /// Host as configured (may include a port).
  pub host: String,
  /// Lowercased host without port, used for lookups.
  match_host: String,
  pub default_locale: String,
  /// Served locales in global `locales` order; always contains `default_locale`.
  pub locales: Vec<String>,
}

impl DomainEntry {
  pub fn new(host: impl Into<String>, default_locale: impl Into<String>, locales: Vec<String>) -> Self {
    let host = host.into();
    let match_host = normalize_host(&host);
    Self { host, match_host, default_locale: default_locale.into(), locales }
  }

  pub fn serves(&self, locale: &str) -> bool {
    self.locales.iter().any(|l| l == locale)
  }

  fn matches(&self, host: &str) -> bool {
    if host == self.match_host {
      return true;
    }
    !self.match_host.starts_with("www.")
      && host.strip_prefix("www.").is_some_and(|bare| bare == self.match_host)
  }
}

/// Ordered set of domain entries. Empty when domain routing is off.
#[derive(Debug, Clone, Default)]
pub struct DomainTable {
  entries: Vec<DomainEntry>,
}

impl DomainTable {
  pub fn new(entries: Vec<DomainEntry>) -> Self {
    Self { entries }
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn entries(&self) -> &[DomainEntry] {
    &self.entries
  }

  /// Entry for a request host. Ports are ignored, comparison is
  /// case-insensitive and `www.` aliases match their bare domain.
  pub fn lookup(&self, host: &str) -> Option<&DomainEntry> {
    let host = normalize_host(host);
    self.entries.iter().find(|e| e.matches(&host))
  }

  /// Domain that should serve `locale`: the first one defaulting to it,
  /// else the first one listing it.
  pub fn domain_for_locale(&self, locale: &str) -> Option<&DomainEntry> {
    self
      .entries
      .iter()
      .find(|e| e.default_locale == locale)
      .or_else(|| self.entries.iter().find(|e| e.serves(locale)))
  }
}

/// Lowercase and strip a trailing `:port`. IPv6 literals keep their brackets.
pub(crate) fn normalize_host(host: &str) -> String {
  let host = host.trim();
  let without_port = match host.rfind(':') {
    Some(idx) if !host[idx..].contains(']') && host[idx + 1..].bytes().all(|b| b.is_ascii_digit()) => {
      &host[..idx]
    }
    _ => host,
  };
  without_port.trim_end_matches('.').to_ascii_lowercase()
}
