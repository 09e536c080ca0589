use std::collections::HashSet;
use std::sync::OnceLock;

/// Slugs that collide with app routes or look like HTTP status pages.
const RESERVED_SLUGS: &[&str] = &[
    "admin", "dashboard", "register", "login", "help", "privacy", "terms", "contact", "about",
    "support", "faq", "blog", "news", "events", "products", "services", "projects", "portfolio",
    "gallery", "store", "shop", "cart", "checkout", "search", "400", "401", "403", "404", "408",
    "409", "410", "411", "412", "413", "414", "415", "416", "417", "418", "422", "423", "424",
    "425", "426", "427", "428", "429", "431", "451", "500", "501", "502", "503", "504", "505",
    "506", "507", "508", "509", "510", "511",
];

fn reserved_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| RESERVED_SLUGS.iter().copied().collect())
}

/// Membership test against the reserved-word set. Expects a normalized slug.
pub fn is_reserved(slug: &str) -> bool {
    reserved_set().contains(slug)
}

/// Trim and lowercase. This is all the availability check applies.
pub fn normalize_slug(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Turn arbitrary input into a URL-safe slug: lowercase ASCII alphanumerics
/// separated by single hyphens, never starting or ending with one.
pub fn format_slug(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());

    for c in input.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    if slug.ends_with('-') {
        slug.pop();
    }
    slug
}
