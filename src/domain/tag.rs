/// Derive the tag name for a release branch.
///
/// Strips the release prefix from `current` and prepends the tag prefix,
/// e.g. `release/2.3.0` with prefixes `release/` and `v` gives `v2.3.0`.
pub fn tag_name(current: &str, release_prefix: &str, tag_prefix: &str) -> String {
    let stripped = current.strip_prefix(release_prefix).unwrap_or(current);
    format!("{}{}", tag_prefix, stripped)
}
