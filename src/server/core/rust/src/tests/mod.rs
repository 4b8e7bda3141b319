/* src/server/core/rust/src/tests/mod.rs */

use super::*;

mod scenarios;

fn router_from_json(json: &str) -> LocaleRouter {
  LocaleRouter::new(RoutingConfig::from_json_str(json).unwrap())
}

fn redirect(target: &str) -> RoutingVerdict {
  RoutingVerdict::Redirect { target: target.to_string(), status: TEMPORARY_REDIRECT }
}

fn rewrite(target: &str) -> RoutingVerdict {
  RoutingVerdict::Rewrite { target: target.to_string() }
}
