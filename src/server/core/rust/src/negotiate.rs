/* src/server/core/rust/src/negotiate.rs */

use std::cmp::Ordering;

/// One weighted entry of an Accept-Language header.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguagePreference {
  pub tag: String,
  pub quality: f32,
}

/// Parse an Accept-Language header into preferences ordered by descending
/// weight. Entries with `q=0`, unparsable weights or the `*` wildcard are
/// dropped; equal weights keep header order.
pub fn parse_accept_language(header: &str) -> Vec<LanguagePreference> {
  let mut prefs: Vec<LanguagePreference> = header
    .split(',')
    .filter_map(|part| {
      let mut pieces = part.split(';');
      let tag = pieces.next()?.trim();
      if tag.is_empty() || tag == "*" {
        return None;
      }
      let mut quality = 1.0_f32;
      for piece in pieces {
        if let Some(value) = piece.trim().strip_prefix("q=") {
          quality = value.trim().parse().ok().filter(|q: &f32| (0.0..=1.0).contains(q))?;
        }
      }
      (quality > 0.0).then(|| LanguagePreference { tag: tag.to_string(), quality })
    })
    .collect();
  prefs.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(Ordering::Equal));
  prefs
}

/// Language part of a tag: `en-CA` -> `en`.
pub fn primary_subtag(tag: &str) -> &str {
  tag.split(['-', '_']).next().unwrap_or(tag)
}

/// Best supported locale for `prefs`, in preference order. Each preference is
/// tried as an exact (case-insensitive) match, then by primary subtag, before
/// moving on to the next one.
pub fn best_match<'a, S: AsRef<str>>(
  prefs: &[LanguagePreference],
  supported: &'a [S],
) -> Option<&'a str> {
  prefs.iter().find_map(|pref| {
    let exact = supported.iter().map(S::as_ref).find(|l| l.eq_ignore_ascii_case(&pref.tag));
    exact.or_else(|| {
      let primary = primary_subtag(&pref.tag);
      let by_primary = supported.iter().map(S::as_ref).find(|l| l.eq_ignore_ascii_case(primary));
      by_primary.or_else(|| {
        supported.iter().map(S::as_ref).find(|l| primary_subtag(l).eq_ignore_ascii_case(primary))
      })
    })
  })
}

/// `best_match` with a fallback; never fails.
pub fn match_locale<'a, S: AsRef<str>>(
  prefs: &[LanguagePreference],
  supported: &'a [S],
  fallback: &'a str,
) -> &'a str {
  best_match(prefs, supported).unwrap_or(fallback)
}

/// Negotiate straight from a raw header value.
pub fn negotiate_locale<'a, S: AsRef<str>>(
  header: &str,
  supported: &'a [S],
  fallback: &'a str,
) -> &'a str {
  match_locale(&parse_accept_language(header), supported, fallback)
}

#[cfg(test)]
mod tests {
  use super::*;

  const SUPPORTED: &[&str] = &["en", "de", "zh-Hant"];

  #[test]
  fn parses_weights_in_descending_order() {
    let prefs = parse_accept_language("en;q=0.5, de, fr;q=0.8");
    let tags: Vec<&str> = prefs.iter().map(|p| p.tag.as_str()).collect();
    assert_eq!(tags, ["de", "fr", "en"]);
    assert_eq!(prefs[0].quality, 1.0);
  }

  #[test]
  fn drops_zero_wildcard_and_malformed_weights() {
    let prefs = parse_accept_language("*, de;q=0, fr;q=abc, it;q=2, en;q=0.1");
    let tags: Vec<&str> = prefs.iter().map(|p| p.tag.as_str()).collect();
    assert_eq!(tags, ["en"]);
  }

  #[test]
  fn equal_weights_keep_header_order() {
    let prefs = parse_accept_language("fr, de, en");
    let tags: Vec<&str> = prefs.iter().map(|p| p.tag.as_str()).collect();
    assert_eq!(tags, ["fr", "de", "en"]);
  }

  #[test]
  fn exact_match_is_case_insensitive() {
    assert_eq!(negotiate_locale("ZH-hant", SUPPORTED, "en"), "zh-Hant");
  }

  #[test]
  fn primary_subtag_match() {
    assert_eq!(negotiate_locale("de-AT,en;q=0.5", SUPPORTED, "en"), "de");
  }

  #[test]
  fn primary_subtag_match_against_regional_locale() {
    assert_eq!(negotiate_locale("zh-CN", SUPPORTED, "en"), "zh-Hant");
  }

  #[test]
  fn earlier_preference_wins_over_later_exact_match() {
    assert_eq!(negotiate_locale("de-CH, en", SUPPORTED, "en"), "de");
  }

  #[test]
  fn malformed_or_empty_header_falls_back() {
    assert_eq!(negotiate_locale("", SUPPORTED, "en"), "en");
    assert_eq!(negotiate_locale(";;,,", SUPPORTED, "en"), "en");
    assert_eq!(negotiate_locale("fr, ja", SUPPORTED, "en"), "en");
  }

  #[test]
  fn primary_subtag_of_plain_tag() {
    assert_eq!(primary_subtag("en"), "en");
    assert_eq!(primary_subtag("pt-BR"), "pt");
  }
}
