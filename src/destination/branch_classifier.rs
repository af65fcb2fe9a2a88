//! Mapping from a pushed ref to a bucket suffix.

/// Suffix used for pushes to `master`.
pub const PRODUCTION_SUFFIX: &str = "prod";

/// Suffix used for pushes to `development`.
pub const DEVELOPMENT_SUFFIX: &str = "devel";

/// Classify a ref name into a bucket suffix.
///
/// Only the leaf segment of the ref is considered (the part after the last
/// `/`, ignoring trailing separators). `master` maps to `prod`,
/// `development` maps to `devel`, and any other leaf is returned unchanged.
///
/// ```
/// use git2s3::destination::classify;
///
/// assert_eq!(classify("refs/heads/master"), "prod");
/// assert_eq!(classify("refs/heads/feature-x"), "feature-x");
/// ```
pub fn classify(git_ref: &str) -> String {
    match leaf_segment(git_ref) {
        "master" => PRODUCTION_SUFFIX.to_string(),
        "development" => DEVELOPMENT_SUFFIX.to_string(),
        other => other.to_string(),
    }
}

fn leaf_segment(git_ref: &str) -> &str {
    let trimmed = git_ref.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((_, leaf)) => leaf,
        None => trimmed,
    }
}
