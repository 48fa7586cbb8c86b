/// Canonical form used for storing and looking up account emails.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_lowercases() {
        assert_eq!(normalize_email("  Owner@Example.COM "), "owner@example.com");
    }

    #[test]
    fn canonical_input_is_unchanged() {
        assert_eq!(normalize_email("owner@example.com"), "owner@example.com");
    }
}
