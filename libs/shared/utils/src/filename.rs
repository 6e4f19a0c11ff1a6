/// Reduce an uploaded filename to a safe object-name component: path
/// separators stripped, anything outside `[A-Za-z0-9._-]` replaced by an
/// underscore, runs collapsed.
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);

    let mut out = String::with_capacity(base.len());
    let mut last_was_sep = false;
    for ch in base.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-') {
            out.push(ch);
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }

    let trimmed = out.trim_matches(|c| c == '_' || c == '.').to_string();
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_safe_names() {
        assert_eq!(sanitize_filename("scan-2024.pdf"), "scan-2024.pdf");
    }

    #[test]
    fn strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\temp\\x ray.png"), "x_ray.png");
    }

    #[test]
    fn collapses_unsafe_runs() {
        assert_eq!(sanitize_filename("lab   result (final).pdf"), "lab_result_final_.pdf");
    }

    #[test]
    fn never_returns_empty() {
        assert_eq!(sanitize_filename("???"), "file");
    }
}
