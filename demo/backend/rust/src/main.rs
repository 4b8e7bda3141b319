/* demo/backend/rust/src/main.rs */

use std::env;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Request};
use axum::routing::get;
use seam_i18n_routing::{LocaleRouter, load_routing_config};
use seam_i18n_routing_axum::LocaleRoutingExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn locale_of(req: &Request) -> String {
  req.headers().get("x-seam-locale").and_then(|v| v.to_str().ok()).unwrap_or("?").to_string()
}

async fn home(Path(locale): Path<String>) -> String {
  format!("[{locale}] home")
}

async fn about(Path(locale): Path<String>) -> String {
  format!("[{locale}] about")
}

async fn product(Path((locale, slug)): Path<(String, String)>) -> String {
  format!("[{locale}] product {slug}")
}

async fn docs(Path((locale, path)): Path<(String, String)>) -> String {
  format!("[{locale}] docs /{path}")
}

async fn not_localized(req: Request) -> String {
  format!("[{}] unrouted {}", locale_of(&req), req.uri())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let config_path = env::var("ROUTING_CONFIG").unwrap_or_else(|_| "routing.json".to_string());
  let config = load_routing_config(&config_path)?;
  info!(path = %config_path, "locale routing enabled");

  // Internal routes always carry the locale as their first segment.
  let app = Router::new()
    .route("/{locale}", get(home))
    .route("/{locale}/about", get(about))
    .route("/{locale}/products", get(|Path(locale): Path<String>| async move { format!("[{locale}] products") }))
    .route("/{locale}/products/{slug}", get(product))
    .route("/{locale}/docs", get(|Path(locale): Path<String>| async move { format!("[{locale}] docs /") }))
    .route("/{locale}/docs/{*path}", get(docs))
    .fallback(not_localized)
    .with_locale_routing(Arc::new(LocaleRouter::new(config)));

  let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
  seam_i18n_routing_axum::serve(app, &format!("0.0.0.0:{port}")).await?;
  Ok(())
}
