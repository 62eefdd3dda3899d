/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Reduce a server-supplied filename to a safe local file name.
/// Path separators and control characters are replaced so a hostile
/// filename cannot escape the download directory.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    // A name of only dots would resolve to the directory itself
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "download".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly-10", 10), "exactly-10");
        assert_eq!(truncate("a longer string", 10), "a longe...");
        assert_eq!(truncate("abc", 2), "ab");
    }

    #[test]
    fn test_sanitize_plain_name() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("with space.txt"), "with space.txt");
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("/etc/passwd"), "_etc_passwd");
        assert_eq!(sanitize_filename("a\\b.txt"), "a_b.txt");
    }

    #[test]
    fn test_sanitize_degenerate_names() {
        assert_eq!(sanitize_filename(""), "download");
        assert_eq!(sanitize_filename(".."), "download");
        assert_eq!(sanitize_filename("."), "download");
    }

    #[test]
    fn test_sanitize_control_characters() {
        assert_eq!(sanitize_filename("a\nb.txt"), "a_b.txt");
    }
}
