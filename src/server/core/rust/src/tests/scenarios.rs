/* src/server/core/rust/src/tests/scenarios.rs */

use super::*;

const BASIC: &str = r#"{ "locales": ["en", "de"], "defaultLocale": "en" }"#;

const LOCALIZED: &str = r#"{
  "locales": ["en", "de"],
  "defaultLocale": "en",
  "pathnames": {
    "/": "/",
    "/about": { "en": "/about", "de": "/ueber" },
    "/products/[slug]": { "de": "/produkte/[slug]" },
    "/products/add": { "de": "/produkte/neu" }
  }
}"#;

const DOMAINS: &str = r#"{
  "locales": ["en", "de"],
  "defaultLocale": "en",
  "domains": [
    { "domain": "example.com", "defaultLocale": "en", "locales": ["en"] },
    { "domain": "example.de", "defaultLocale": "de", "locales": ["de"] }
  ]
}"#;

// -- Verdicts --

#[test]
fn root_with_german_browser_redirects_to_prefix() {
  let outcome = router_from_json(BASIC).route(&RoutingRequest::new("/").accept_language("de"));
  assert_eq!(outcome.verdict, redirect("/de"));
  assert_eq!(outcome.source, Some(LocaleSource::AcceptLanguage));
}

#[test]
fn prefixed_root_rewrites_and_sets_cookie() {
  let outcome = router_from_json(BASIC).route(&RoutingRequest::new("/de"));
  assert_eq!(outcome.verdict, rewrite("/de"));
  assert_eq!(
    outcome.cookie.map(|c| c.to_header_value()).as_deref(),
    Some("NEXT_LOCALE=de; Path=/; Max-Age=31536000; SameSite=Lax")
  );
  assert_eq!(outcome.locale.as_deref(), Some("de"));
}

#[test]
fn untranslated_path_redirects_to_localized_form() {
  let r = router_from_json(LOCALIZED);
  assert_eq!(r.route(&RoutingRequest::new("/de/about")).verdict, redirect("/de/ueber"));
  assert_eq!(r.route(&RoutingRequest::new("/de/ueber")).verdict, rewrite("/de/about"));
  assert_eq!(r.route(&RoutingRequest::new("/ueber")).verdict, redirect("/about"));
  assert_eq!(r.route(&RoutingRequest::new("/about")).verdict, rewrite("/en/about"));
}

#[test]
fn static_localized_route_beats_dynamic_one() {
  let r = router_from_json(LOCALIZED);
  assert_eq!(r.route(&RoutingRequest::new("/de/produkte/neu")).verdict, rewrite("/de/products/add"));
  assert_eq!(r.route(&RoutingRequest::new("/de/produkte/schuh")).verdict, rewrite("/de/products/schuh"));
  assert_eq!(r.route(&RoutingRequest::new("/de/products/add")).verdict, redirect("/de/produkte/neu"));
  assert_eq!(r.route(&RoutingRequest::new("/de/products/schuh")).verdict, redirect("/de/produkte/schuh"));
}

#[test]
fn encoded_params_survive_rewrite() {
  let r = router_from_json(LOCALIZED);
  assert_eq!(
    r.route(&RoutingRequest::new("/de/produkte/caf%C3%A9")).verdict,
    rewrite("/de/products/caf%C3%A9")
  );
}

#[test]
fn unknown_path_with_registry_passes_through() {
  let outcome = router_from_json(LOCALIZED).route(&RoutingRequest::new("/contact").host("example.com"));
  assert_eq!(outcome.verdict, RoutingVerdict::PassThrough);
  assert!(outcome.cookie.is_none());
  assert_eq!(outcome.locale_header, Some(("x-seam-locale".to_string(), "en".to_string())));
  assert!(outcome.link_header.is_some());
}

#[test]
fn doubled_slashes_never_yield_protocol_relative_redirects() {
  let r = router_from_json(BASIC);
  assert_eq!(r.route(&RoutingRequest::new("/en//evil.com")).verdict, redirect("/evil.com"));
  assert_eq!(r.route(&RoutingRequest::new("//evil.com")).verdict, redirect("/evil.com"));
  assert_eq!(r.route(&RoutingRequest::new("/de//evil.com")).verdict, redirect("/de/evil.com"));

  let never = router_from_json(r#"{ "locales": ["en", "de"], "defaultLocale": "en", "localePrefix": "never" }"#);
  assert_eq!(never.route(&RoutingRequest::new("/de//evil.com/")).verdict, redirect("/evil.com"));
}

// -- Policies --

#[test]
fn default_locale_redirect_symmetry_under_as_needed() {
  let r = router_from_json(BASIC);
  assert_eq!(r.route(&RoutingRequest::new("/en/pricing")).verdict, redirect("/pricing"));
  assert_eq!(r.route(&RoutingRequest::new("/pricing")).verdict, rewrite("/en/pricing"));
}

#[test]
fn always_prefix_is_enforced() {
  let r = router_from_json(r#"{ "locales": ["en", "de"], "defaultLocale": "en", "localePrefix": "always" }"#);
  assert_eq!(r.route(&RoutingRequest::new("/pricing")).verdict, redirect("/en/pricing"));
  assert_eq!(r.route(&RoutingRequest::new("/")).verdict, redirect("/en"));
  assert_eq!(r.route(&RoutingRequest::new("/en/pricing")).verdict, rewrite("/en/pricing"));
}

#[test]
fn never_prefix_rewrites_from_cookie() {
  let r = router_from_json(r#"{ "locales": ["en", "de"], "defaultLocale": "en", "localePrefix": "never" }"#);
  let outcome = r.route(&RoutingRequest::new("/").cookies("NEXT_LOCALE=de"));
  assert_eq!(outcome.verdict, rewrite("/de"));
  assert!(outcome.cookie.is_none());
  assert_eq!(r.route(&RoutingRequest::new("/de/pricing")).verdict, redirect("/pricing"));
}

#[test]
fn uppercase_prefix_redirects_to_canonical_case() {
  let r = router_from_json(BASIC);
  assert_eq!(r.route(&RoutingRequest::new("/DE/about")).verdict, redirect("/de/about"));
  assert_eq!(r.route(&RoutingRequest::new("/De")).verdict, redirect("/de"));
}

#[test]
fn search_is_preserved_byte_for_byte() {
  let r = router_from_json(BASIC);
  let req = RoutingRequest::new("/").query("utm=a%20b&x=1&x=2&empty=").accept_language("de");
  assert_eq!(r.route(&req).verdict, redirect("/de?utm=a%20b&x=1&x=2&empty="));
  let req = RoutingRequest::new("/de/shop").query("q=%C3%BC+x");
  assert_eq!(r.route(&req).verdict, rewrite("/de/shop?q=%C3%BC+x"));
}

#[test]
fn custom_prefix_round_trip() {
  let r = router_from_json(
    r#"{
      "locales": ["en", "de-AT"],
      "defaultLocale": "en",
      "localePrefix": { "mode": "as-needed", "prefixes": { "de-AT": "/at" } }
    }"#,
  );
  assert_eq!(r.route(&RoutingRequest::new("/").accept_language("de-AT")).verdict, redirect("/at"));
  assert_eq!(r.route(&RoutingRequest::new("/at/preise")).verdict, rewrite("/de-AT/preise"));
}

#[test]
fn base_path_with_trailing_slash() {
  let r = router_from_json(
    r#"{ "locales": ["en", "de"], "defaultLocale": "en", "basePath": "/shop", "trailingSlash": true }"#,
  );
  assert_eq!(r.route(&RoutingRequest::new("/shop")).verdict, redirect("/shop/"));
  assert_eq!(r.route(&RoutingRequest::new("/shop/")).verdict, rewrite("/shop/en/"));
  assert_eq!(r.route(&RoutingRequest::new("/shop/de/cart")).verdict, redirect("/shop/de/cart/"));
  assert_eq!(r.route(&RoutingRequest::new("/elsewhere")).verdict, RoutingVerdict::PassThrough);
}

#[test]
fn detection_off_ignores_browser_and_cookie() {
  let r = router_from_json(r#"{ "locales": ["en", "de"], "defaultLocale": "en", "localeDetection": false }"#);
  let outcome = r.route(&RoutingRequest::new("/").accept_language("de").cookies("NEXT_LOCALE=de"));
  assert_eq!(outcome.verdict, rewrite("/en"));
  assert_eq!(outcome.source, Some(LocaleSource::Default));
  assert!(outcome.cookie.is_none());
}

// -- Resolver tiers --

#[test]
fn resolver_tier_order() {
  let r = router_from_json(BASIC);
  let full = RoutingRequest::new("/de").cookies("NEXT_LOCALE=en").accept_language("en");
  assert_eq!(r.route(&full).source, Some(LocaleSource::PathPrefix));
  let no_prefix = RoutingRequest::new("/").cookies("NEXT_LOCALE=de").accept_language("en");
  assert_eq!(r.route(&no_prefix).locale.as_deref(), Some("de"));
  assert_eq!(r.route(&no_prefix).source, Some(LocaleSource::Cookie));
  let header_only = RoutingRequest::new("/").accept_language("fr, de;q=0.5");
  assert_eq!(r.route(&header_only).source, Some(LocaleSource::AcceptLanguage));
  assert_eq!(r.route(&RoutingRequest::new("/").accept_language("fr")).source, Some(LocaleSource::Default));
}

// -- Domains --

#[test]
fn domain_default_wins_over_cookie_and_header() {
  let r = router_from_json(DOMAINS);
  let req = RoutingRequest::new("/").host("www.example.de").cookies("NEXT_LOCALE=en").accept_language("en");
  let outcome = r.route(&req);
  assert_eq!(outcome.source, Some(LocaleSource::Domain));
  assert_eq!(outcome.verdict, rewrite("/de"));
}

#[test]
fn locale_not_served_redirects_across_domains() {
  let r = router_from_json(DOMAINS);
  let req = RoutingRequest::new("/en/about")
    .host("example.de")
    .forwarded(Some("https"), None, None)
    .query("ref=1");
  assert_eq!(r.route(&req).verdict, redirect("https://example.com/about?ref=1"));
}

#[test]
fn cross_domain_redirect_translates_pathname() {
  let r = router_from_json(
    r#"{
      "locales": ["en", "de"],
      "defaultLocale": "en",
      "pathnames": { "/about": { "de": "/ueber" } },
      "domains": [
        { "domain": "example.com", "defaultLocale": "en", "locales": ["en"] },
        { "domain": "example.de", "defaultLocale": "de", "locales": ["de"] }
      ]
    }"#,
  );
  let req = RoutingRequest::new("/de/about").host("example.com").query("a=1");
  assert_eq!(r.route(&req).verdict, redirect("http://example.de/ueber?a=1"));
}

#[test]
fn unknown_host_uses_global_defaults() {
  let r = router_from_json(DOMAINS);
  let req = RoutingRequest::new("/about").host("localhost:3000").accept_language("de");
  assert_eq!(r.route(&req).verdict, redirect("/de/about"));
}

// -- Alternate links --

#[test]
fn link_header_lists_every_locale_and_one_x_default() {
  let outcome = router_from_json(LOCALIZED).route(&RoutingRequest::new("/de/ueber").host("example.com"));
  let header = outcome.link_header.unwrap();
  assert_eq!(
    header,
    "<http://example.com/about>; rel=\"alternate\"; hreflang=\"en\", \
     <http://example.com/de/ueber>; rel=\"alternate\"; hreflang=\"de\", \
     <http://example.com/about>; rel=\"alternate\"; hreflang=\"x-default\""
  );
  assert_eq!(header.matches("x-default").count(), 1);
}

#[test]
fn link_header_uses_domain_hosts() {
  let outcome = router_from_json(DOMAINS).route(&RoutingRequest::new("/team").host("example.com"));
  assert_eq!(
    outcome.link_header.as_deref(),
    Some(
      "<http://example.com/team>; rel=\"alternate\"; hreflang=\"en\", \
       <http://example.de/team>; rel=\"alternate\"; hreflang=\"de\", \
       <http://example.com/team>; rel=\"alternate\"; hreflang=\"x-default\""
    )
  );
}
