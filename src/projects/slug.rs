// src/projects/slug.rs

use regex::Regex;
use std::sync::OnceLock;

fn separator_run() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid slug pattern"))
}

/// Lowercases `title`, collapses every run of non-alphanumerics into a single
/// hyphen and trims hyphens from both ends. "TB Study!!" becomes "tb-study".
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    separator_run()
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Uses the override when it is non-empty after normalization, else derives
/// the slug from the title
pub fn resolve_slug(title: &str, slug_override: Option<&str>) -> String {
    slug_override
        .map(slugify)
        .filter(|slug| !slug.is_empty())
        .unwrap_or_else(|| slugify(title))
}
