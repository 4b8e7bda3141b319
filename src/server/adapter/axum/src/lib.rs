/* src/server/adapter/axum/src/lib.rs */

use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::header::{ACCEPT_LANGUAGE, COOKIE, HOST, LINK, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use seam_i18n_routing::{CookieWrite, LocaleRouter, RoutingOutcome, RoutingRequest, RoutingVerdict};
use tracing::{info, warn};

/// Re-export the routing core for convenience
pub use seam_i18n_routing;

const X_FORWARDED_HOST: &str = "x-forwarded-host";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const X_FORWARDED_PORT: &str = "x-forwarded-port";

fn header<'a>(headers: &'a HeaderMap, name: impl axum::http::header::AsHeaderName) -> Option<&'a str> {
  headers.get(name).and_then(|v| v.to_str().ok())
}

fn routing_request(req: &Request) -> RoutingRequest<'_> {
  let uri = req.uri();
  let headers = req.headers();
  RoutingRequest {
    path: uri.path(),
    query: uri.query(),
    scheme: uri.scheme_str(),
    host: header(headers, HOST).or_else(|| uri.authority().map(|a| a.as_str())),
    forwarded_host: header(headers, X_FORWARDED_HOST),
    forwarded_proto: header(headers, X_FORWARDED_PROTO),
    forwarded_port: header(headers, X_FORWARDED_PORT),
    accept_language: header(headers, ACCEPT_LANGUAGE),
    cookie_header: header(headers, COOKIE),
  }
}

fn attach_response_headers(res: &mut Response, cookie: Option<&CookieWrite>, link: Option<&str>) {
  let headers = res.headers_mut();
  if let Some(cookie) = cookie {
    match HeaderValue::from_str(&cookie.to_header_value()) {
      Ok(value) => {
        headers.append(SET_COOKIE, value);
      }
      Err(_) => warn!(cookie = %cookie.name, "locale cookie is not a valid header value"),
    }
  }
  if let Some(link) = link {
    match HeaderValue::from_str(link) {
      Ok(value) => {
        headers.append(LINK, value);
      }
      Err(_) => warn!(link, "alternate links are not a valid header value"),
    }
  }
}

/// Axum middleware running every request through a [`LocaleRouter`].
///
/// Redirects are answered directly. Rewrites replace the request URI before
/// the inner service sees it, so the middleware must wrap the whole router
/// (see [`LocaleRoutingExt`]), not individual routes.
pub async fn locale_routing(State(router): State<Arc<LocaleRouter>>, mut req: Request, next: Next) -> Response {
  let RoutingOutcome { verdict, locale_header, cookie, link_header, .. } = router.route(&routing_request(&req));

  match verdict {
    RoutingVerdict::Redirect { target, status } => match HeaderValue::from_str(&target) {
      Ok(location) => {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::TEMPORARY_REDIRECT);
        let mut res = (status, [(LOCATION, location)]).into_response();
        attach_response_headers(&mut res, cookie.as_ref(), link_header.as_deref());
        return res;
      }
      Err(_) => warn!(location = %target, "redirect target is not a valid header value, forwarding request"),
    },
    RoutingVerdict::Rewrite { target } => match target.parse::<Uri>() {
      Ok(uri) => *req.uri_mut() = uri,
      Err(err) => warn!(rewrite = %target, error = %err, "rewrite target is not a valid URI, forwarding request"),
    },
    RoutingVerdict::PassThrough => {}
  }

  if let Some((name, value)) = locale_header {
    match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
      (Ok(name), Ok(value)) => {
        req.headers_mut().insert(name, value);
      }
      _ => warn!(header = %name, "locale header could not be set"),
    }
  }

  let mut res = next.run(req).await;
  attach_response_headers(&mut res, cookie.as_ref(), link_header.as_deref());
  res
}

/// Extension trait that puts locale routing in front of an Axum router.
pub trait LocaleRoutingExt {
  fn with_locale_routing(self, router: Arc<LocaleRouter>) -> Router;
}

impl LocaleRoutingExt for Router {
  fn with_locale_routing(self, router: Arc<LocaleRouter>) -> Router {
    // Layers on a router run after route matching, so nest the app as a
    // fallback and let it route the rewritten URI.
    Router::new()
      .fallback_service(self)
      .layer(middleware::from_fn_with_state(router, locale_routing))
  }
}

/// Bind `addr` and serve `app` until the process is stopped.
pub async fn serve(app: Router, addr: &str) -> std::io::Result<()> {
  let listener = tokio::net::TcpListener::bind(addr).await?;
  let local_addr = listener.local_addr()?;
  info!(%local_addr, "locale-routed server listening");
  axum::serve(listener, app).await
}
