#![allow(dead_code)]
use tagpurge_core::TagHasher;

/// Tags a CMS typically attaches to a rendered article page.
pub fn article_page_tags() -> Vec<&'static str> {
    vec![
        "node:42",
        "node_view",
        "user:7",
        "taxonomy_term:3",
        "config:system.site",
        "rendered",
        "node:42",
    ]
}

/// Hasher with the default length, scoped to a test site.
pub fn site_hasher(site: &str) -> TagHasher {
    TagHasher::default().with_site_id(site)
}
