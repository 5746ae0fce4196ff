use std::sync::LazyLock;

use regex::Regex;

static SOURCE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?(www\.)?(youtube\.com|youtu\.be)/.+").expect("static regex")
});

/// Returns true when `candidate` looks like a YouTube video URL.
///
/// Accepts an optional `http(s)://` scheme, an optional `www.` prefix, the
/// hosts `youtube.com` or `youtu.be`, and requires a non-empty path.
pub fn is_valid_source_url(candidate: &str) -> bool {
    SOURCE_URL.is_match(candidate)
}
