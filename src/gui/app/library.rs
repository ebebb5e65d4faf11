use std::time::Duration;

use tracing::debug;

use crate::{
    core::{
        TemporaryWord,
        VocabularyEntry,
    },
    deck::ReviewDeck,
};

/// Orders overlapping fetches of one collection. Only a response newer than the last
/// applied one may replace the snapshot.
#[derive(Debug, Default, Clone, Copy)]
struct FetchCounter {
    issued: u64,
    applied: u64,
}

impl FetchCounter {
    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn accept(&mut self, sequence: u64) -> bool {
        if sequence <= self.applied {
            return false;
        }
        self.applied = sequence;
        true
    }

    /// Invalidates every fetch issued so far.
    fn reset(&mut self) {
        self.applied = self.issued;
    }
}

/// Per-user data shown by the views: the entry snapshot, temporary words and the deck.
pub(super) struct Library {
    pub entries: Vec<VocabularyEntry>,
    pub temporary_words: Vec<TemporaryWord>,
    pub deck: ReviewDeck,
    entries_fetch: FetchCounter,
    words_fetch: FetchCounter,
}

impl Library {
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            entries: Vec::new(),
            temporary_words: Vec::new(),
            deck: ReviewDeck::new(settle_delay),
            entries_fetch: FetchCounter::default(),
            words_fetch: FetchCounter::default(),
        }
    }

    /// Forgets the current user's data. Fetches already in flight will not be applied.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.temporary_words.clear();
        self.deck.clear();
        self.entries_fetch.reset();
        self.words_fetch.reset();
    }

    pub fn entries_ticket(&mut self) -> u64 {
        self.entries_fetch.issue()
    }

    pub fn temporary_words_ticket(&mut self) -> u64 {
        self.words_fetch.issue()
    }

    /// Applies a fetched entry list unless a newer one was applied already.
    pub fn accept_entries(&mut self, sequence: u64, entries: Vec<VocabularyEntry>) -> bool {
        if !self.entries_fetch.accept(sequence) {
            debug!("Ignoring entries from fetch #{}", sequence);
            return false;
        }
        debug!("Loaded {} entries", entries.len());
        self.entries = entries.clone();
        self.deck.load(entries);
        true
    }

    pub fn accept_temporary_words(&mut self, sequence: u64, words: Vec<TemporaryWord>) -> bool {
        if !self.words_fetch.accept(sequence) {
            debug!("Ignoring temporary words from fetch #{}", sequence);
            return false;
        }
        self.temporary_words = words;
        true
    }

    /// The review session is over; a pending move to the next card is dropped.
    pub fn leave_review(&mut self) {
        self.deck.cancel_advance();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::{
        core::EntryId,
        deck::DeckState,
    };

    const DELAY: Duration = Duration::from_millis(250);

    fn entry(id: &str) -> VocabularyEntry {
        VocabularyEntry {
            id: EntryId::new(id),
            user_id: None,
            term: format!("term-{id}"),
            definition: String::new(),
            translation: String::new(),
            notes: String::new(),
            part_of_speech: "noun".to_string(),
            favorite: false,
            created_at: None,
        }
    }

    #[test]
    fn older_fetch_arriving_late_is_ignored() {
        let mut library = Library::new(DELAY);
        let first = library.entries_ticket();
        let second = library.entries_ticket();

        assert!(library.accept_entries(second, vec![entry("a"), entry("b")]));
        assert!(!library.accept_entries(first, vec![entry("a")]));

        assert_eq!(library.entries.len(), 2);
        assert_eq!(library.deck.len(), 2);
    }

    #[test]
    fn fetch_issued_before_reset_leaves_deck_empty() {
        let mut library = Library::new(DELAY);
        let entries_ticket = library.entries_ticket();
        let words_ticket = library.temporary_words_ticket();

        library.reset();

        assert!(!library.accept_entries(entries_ticket, vec![entry("a")]));
        assert!(!library.accept_temporary_words(words_ticket, Vec::new()));
        assert!(library.entries.is_empty());
        assert_eq!(library.deck.state(), DeckState::Empty);

        let ticket = library.entries_ticket();
        assert!(library.accept_entries(ticket, vec![entry("b")]));
        assert_eq!(library.deck.len(), 1);
    }

    #[test]
    fn leaving_review_drops_pending_advance() {
        let mut library = Library::new(DELAY);
        let ticket = library.entries_ticket();
        library.accept_entries(ticket, vec![entry("a"), entry("b")]);
        let now = Instant::now();

        assert!(library.deck.advance(now));
        library.leave_review();

        assert!(!library.deck.poll(now + DELAY));
        assert_eq!(library.deck.state(), DeckState::Viewing { position: 0, flipped: false });
        assert_eq!(library.deck.time_until_settled(now), None);
    }
}
