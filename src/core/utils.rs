/// Case-insensitive substring match. An empty query matches everything.
pub fn text_matches_search(text: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    text.to_lowercase().contains(&query.to_lowercase())
}

/// Trims every text field a user typed into a form.
pub fn trimmed(text: &str) -> String {
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_ignores_case() {
        assert!(text_matches_search("Serendipity", "seren"));
        assert!(text_matches_search("serendipity", "DIP"));
        assert!(!text_matches_search("serendipity", "luck"));
        assert!(text_matches_search("anything", ""));
    }
}
