/// Builds a filesystem-safe cache key from a namespace and an ordered list
/// of parts. Characters outside `[A-Za-z0-9._-]` are replaced with `_` so
/// the key can double as a file stem under any cache backend.
pub fn generate_key(namespace: &str, parts: &[&str]) -> String {
    let mut key = String::from(namespace);
    for part in parts {
        key.push('_');
        key.push_str(part);
    }
    sanitize(&key)
}

fn sanitize(raw: &str) -> String {
    raw.chars().map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_namespace_and_parts_with_underscores() {
        assert_eq!(generate_key("analysis", &["version-availability", "news"]), "analysis_version-availability_news");
    }

    #[test]
    fn sanitizes_path_separators_and_colons() {
        assert_eq!(generate_key("analysis", &["georgringer/news", "3:1:0"]), "analysis_georgringer_news_3_1_0");
    }
}
