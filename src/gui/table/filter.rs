use crate::core::{
    utils::text_matches_search,
    VocabularyEntry,
};

/// Search box plus part-of-speech selector above the vocabulary table.
#[derive(Debug, Clone, Default)]
pub struct WordFilter {
    pub search: String,
    pub part_of_speech: Option<String>,
}

impl WordFilter {
    /// Term and definition match without regard to case; translations match exactly.
    pub fn matches(&self, entry: &VocabularyEntry) -> bool {
        let query = self.search.as_str();
        let search_hit = query.is_empty()
            || text_matches_search(&entry.term, query)
            || text_matches_search(&entry.definition, query)
            || entry.translation.contains(query);

        let pos_hit = match &self.part_of_speech {
            Some(pos) => entry.part_of_speech == *pos,
            None => true,
        };

        search_hit && pos_hit
    }

    pub fn visible_indices(&self, entries: &[VocabularyEntry]) -> Vec<usize> {
        entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| self.matches(entry))
            .map(|(index, _)| index)
            .collect()
    }
}
