//! Slug derivation
//!
//! Slugs are the natural keys of the location store: a location is matched
//! across sync runs by `slugify(business_name)`, and the city listing pages
//! key on `city_slug(city, state)`. Both functions are total and
//! deterministic; feeding the same name in twice always yields the same
//! slug.
//!
//! Two distinct business names can collide to the same slug. A collision is
//! treated as the same logical location (last write wins) rather than being
//! disambiguated.

/// Derive a URL-safe slug from a business name.
///
/// Lowercases the name, turns whitespace runs into single hyphens, drops
/// every character that is not an ASCII alphanumeric or hyphen, collapses
/// repeated hyphens, and trims hyphens from both ends.
///
/// ```
/// use fairway_common::slug::slugify;
///
/// assert_eq!(slugify("Par Tee Golf"), "par-tee-golf");
/// assert_eq!(slugify("  Eagle's   Nest! "), "eagles-nest");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for ch in name.to_lowercase().chars() {
        if ch.is_whitespace() || ch == '-' {
            pending_hyphen = true;
            continue;
        }
        if !ch.is_ascii_alphanumeric() {
            continue;
        }
        if pending_hyphen && !slug.is_empty() {
            slug.push('-');
        }
        pending_hyphen = false;
        slug.push(ch);
    }

    slug
}

/// Derive the grouping key for a (city, state) pair.
///
/// Used by the read-side city listing; the value is computed on demand and
/// never persisted.
pub fn city_slug(city: &str, state: &str) -> String {
    format!("{}-{}", slugify(city), slugify(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Par Tee Golf"), "par-tee-golf");
        assert_eq!(slugify("Golf Zone"), "golf-zone");
    }

    #[test]
    fn test_slugify_is_deterministic() {
        let name = "The Back Nine Indoor Golf & Lounge";
        assert_eq!(slugify(name), slugify(name));
    }

    #[test]
    fn test_slugify_charset() {
        let slug = slugify("Eagle's Nest #1 (Downtown)!");
        assert!(slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        assert_eq!(slug, "eagles-nest-1-downtown");
    }

    #[test]
    fn test_slugify_collapses_hyphen_runs() {
        assert_eq!(slugify("Tee -- Time"), "tee-time");
        assert_eq!(slugify("a - - b"), "a-b");
    }

    #[test]
    fn test_slugify_trims_edges() {
        assert_eq!(slugify("  Links  "), "links");
        assert_eq!(slugify("-Links-"), "links");
    }

    #[test]
    fn test_slugify_strips_punctuation_without_splitting() {
        // No whitespace around the stripped character, so no hyphen appears.
        assert_eq!(slugify("Par&Tee"), "partee");
    }

    #[test]
    fn test_slugify_empty_and_symbol_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_city_slug() {
        assert_eq!(city_slug("Springfield", "OR"), "springfield-or");
        assert_eq!(city_slug("Walla Walla", "WA"), "walla-walla-wa");
    }
}
