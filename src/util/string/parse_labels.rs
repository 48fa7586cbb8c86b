/// Splits a comma-separated label string as typed into the editor.
///
/// Entries are trimmed and empty ones dropped. Duplicates are kept.
pub fn parse_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_drops_empty_entries_without_deduplicating() {
        assert_eq!(parse_labels("a, b ,  , b"), vec!["a", "b", "b"]);
    }

    #[test]
    fn blank_input_yields_no_labels() {
        assert!(parse_labels("").is_empty());
        assert!(parse_labels(" , ,").is_empty());
    }
}
