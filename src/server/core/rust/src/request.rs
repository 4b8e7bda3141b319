/* src/server/core/rust/src/request.rs */

use std::fmt;

/// The parts of an incoming request the router reads. Borrowed so adapters
/// can build it straight from their own request type without copying.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RoutingRequest<'a> {
  /// Raw (still percent-encoded) path, starting with `/`.
  pub path: &'a str,
  /// Query string without the leading `?`.
  pub query: Option<&'a str>,
  /// Scheme the server itself received the request on.
  pub scheme: Option<&'a str>,
  pub host: Option<&'a str>,
  pub forwarded_host: Option<&'a str>,
  pub forwarded_proto: Option<&'a str>,
  pub forwarded_port: Option<&'a str>,
  pub accept_language: Option<&'a str>,
  pub cookie_header: Option<&'a str>,
}

impl<'a> RoutingRequest<'a> {
  pub fn new(path: &'a str) -> Self {
    Self { path, ..Self::default() }
  }

  pub fn query(mut self, query: &'a str) -> Self {
    self.query = Some(query);
    self
  }

  pub fn scheme(mut self, scheme: &'a str) -> Self {
    self.scheme = Some(scheme);
    self
  }

  pub fn host(mut self, host: &'a str) -> Self {
    self.host = Some(host);
    self
  }

  pub fn forwarded(mut self, proto: Option<&'a str>, host: Option<&'a str>, port: Option<&'a str>) -> Self {
    self.forwarded_proto = proto;
    self.forwarded_host = host;
    self.forwarded_port = port;
    self
  }

  pub fn accept_language(mut self, value: &'a str) -> Self {
    self.accept_language = Some(value);
    self
  }

  pub fn cookies(mut self, value: &'a str) -> Self {
    self.cookie_header = Some(value);
    self
  }

  /// Host as the client sees it: the first `X-Forwarded-Host` entry, else `Host`.
  pub fn effective_host(&self) -> Option<&'a str> {
    self
      .forwarded_host
      .and_then(first_list_value)
      .or_else(|| self.host.map(str::trim).filter(|h| !h.is_empty()))
  }

  /// Scheme as the client sees it; `http` when nothing says otherwise.
  pub fn effective_scheme(&self) -> &'a str {
    self.forwarded_proto.and_then(first_list_value).or(self.scheme).unwrap_or("http")
  }

  /// `?query` or empty. The query is carried byte-for-byte.
  pub fn search(&self) -> String {
    match self.query {
      Some(q) if !q.is_empty() => format!("?{q}"),
      _ => String::new(),
    }
  }

  pub fn origin(&self) -> Origin {
    let scheme = self.effective_scheme().to_ascii_lowercase();
    let host = self.effective_host().map(|host| {
      match self.forwarded_port.and_then(first_list_value) {
        Some(port) if !has_port(host) && !is_default_port(&scheme, port) => format!("{host}:{port}"),
        _ => host.to_string(),
      }
    });
    Origin { scheme, host }
  }

  /// First cookie named `name`, trimmed.
  pub fn cookie(&self, name: &str) -> Option<&'a str> {
    self.cookie_header?.split(';').find_map(|pair| {
      let (k, v) = pair.split_once('=')?;
      (k.trim() == name).then(|| v.trim().trim_matches('"'))
    })
  }
}

fn first_list_value(value: &str) -> Option<&str> {
  value.split(',').next().map(str::trim).filter(|v| !v.is_empty())
}

fn has_port(host: &str) -> bool {
  host.rsplit_once(':').is_some_and(|(_, port)| !port.contains(']') && port.bytes().all(|b| b.is_ascii_digit()))
}

fn is_default_port(scheme: &str, port: &str) -> bool {
  matches!((scheme, port), ("http", "80") | ("https", "443"))
}

/// `scheme://host[:port]` of a request, as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
  pub scheme: String,
  /// Absent when the request carried no host at all.
  pub host: Option<String>,
}

impl Origin {
  /// Same scheme, different host (a configured domain, kept as written).
  pub fn with_host(&self, host: &str) -> Self {
    Self { scheme: self.scheme.clone(), host: Some(host.to_string()) }
  }
}

impl fmt::Display for Origin {
  /// Renders nothing without a host, which leaves URLs relative.
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.host {
      Some(host) => write!(f, "{}://{host}", self.scheme),
      None => Ok(()),
    }
  }
}
