use sha2::{Digest, Sha256};

/// Local file name for a downloaded artifact.
///
/// Prefers the server-suggested name, then the last path segment of the link,
/// and falls back to `analysis--{short_hash(link)}.csv`.
pub fn artifact_filename(suggested: Option<&str>, link: &str) -> String {
    let candidate = suggested
        .map(str::to_owned)
        .or_else(|| last_path_segment(link))
        .map(|name| sanitize(&name))
        .filter(|name| !name.is_empty());

    match candidate {
        Some(name) if !is_reserved_windows_name(stem(&name)) => name,
        Some(name) => format!("{name}_"),
        None => format!("analysis--{}.csv", short_hash(link)),
    }
}

fn last_path_segment(link: &str) -> Option<String> {
    let parsed = url::Url::parse(link).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    Some(segment.to_string())
}

fn sanitize(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let c = if is_forbidden(c) { '_' } else { c };
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }
    let mut cleaned = compacted.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.len() > 120 {
        let mut cut = 120;
        while !cleaned.is_char_boundary(cut) {
            cut -= 1;
        }
        cleaned.truncate(cut);
    }
    cleaned
}

fn stem(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::artifact_filename;

    #[test]
    fn prefers_suggested_name() {
        assert_eq!(
            artifact_filename(Some("emotions: run?1.csv"), "https://x/y.csv"),
            "emotions_ run_1.csv"
        );
    }

    #[test]
    fn falls_back_to_link_segment() {
        assert_eq!(
            artifact_filename(None, "https://cdn.example.com/out/result.csv?sig=1"),
            "result.csv"
        );
    }

    #[test]
    fn hashes_when_nothing_usable() {
        let name = artifact_filename(None, "https://cdn.example.com/");
        assert!(name.starts_with("analysis--"));
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), "analysis--".len() + 8 + ".csv".len());
        assert_eq!(name, artifact_filename(Some("///"), "https://cdn.example.com/"));
    }

    #[test]
    fn reserved_names_are_suffixed() {
        assert_eq!(artifact_filename(Some("con.csv"), "https://x/"), "con.csv_");
    }
}
