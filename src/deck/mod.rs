//! Flashcard review deck.
//!
//! The deck keeps a shuffled presentation order that stays fixed for as long as the
//! set of entry ids it was computed for is unchanged, plus a single-card cursor.
//! Loading the same entries again (with any field edits) keeps both order and cursor.
//! A change in the number of entries, or an ordered id disappearing, produces a
//! fresh permutation and puts the cursor back on the first card.

mod cursor;
mod order;

use std::{
    collections::HashMap,
    time::{
        Duration,
        Instant,
    },
};

pub use cursor::{
    DeckCursor,
    SettleTimer,
};
pub use order::{
    FisherYates,
    PresentationOrder,
    Shuffler,
};
use rand::rngs::StdRng;
use tracing::debug;

use crate::core::{
    EntryId,
    EntryPatch,
    VocabularyEntry,
};

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckState {
    Empty,
    Viewing { position: usize, flipped: bool },
    Transitioning { position: usize },
}

/// What the host renders: the current card and where the cursor sits.
#[derive(Debug, Clone, Copy)]
pub struct DeckView<'a> {
    pub card: Option<&'a VocabularyEntry>,
    pub has_cards: bool,
    pub position: usize,
    pub total: usize,
    pub flipped: bool,
    pub transitioning: bool,
}

impl DeckView<'_> {
    fn empty() -> Self {
        Self {
            card: None,
            has_cards: false,
            position: 0,
            total: 0,
            flipped: false,
            transitioning: false,
        }
    }
}

/// Store command produced by an optimistic favorite toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteToggle {
    pub id: EntryId,
    pub favorite: bool,
}

impl FavoriteToggle {
    pub fn patch(&self) -> EntryPatch {
        EntryPatch::favorite(self.favorite)
    }
}

pub struct ReviewDeck<S = FisherYates<StdRng>> {
    entries: HashMap<EntryId, VocabularyEntry>,
    order: Option<PresentationOrder>,
    cursor: Option<DeckCursor>,
    settle: Option<SettleTimer>,
    settle_delay: Duration,
    shuffler: S,
}

impl ReviewDeck {
    pub fn new(settle_delay: Duration) -> Self {
        Self::with_shuffler(FisherYates::from_os_rng(), settle_delay)
    }
}

impl Default for ReviewDeck {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_DELAY)
    }
}

impl<S: Shuffler> ReviewDeck<S> {
    pub fn with_shuffler(shuffler: S, settle_delay: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            order: None,
            cursor: None,
            settle: None,
            settle_delay,
            shuffler,
        }
    }

    pub fn set_settle_delay(&mut self, settle_delay: Duration) {
        self.settle_delay = settle_delay;
    }

    /// Replaces the local snapshot of entries. Call this when the upstream entry list
    /// changes, not on every repaint.
    pub fn load(&mut self, entries: Vec<VocabularyEntry>) -> DeckView<'_> {
        let mut by_id = HashMap::with_capacity(entries.len());
        let mut arrival = Vec::with_capacity(entries.len());
        for entry in entries {
            if !by_id.contains_key(&entry.id) {
                arrival.push(entry.id.clone());
            }
            by_id.insert(entry.id.clone(), entry);
        }

        if by_id.is_empty() {
            self.clear();
            return self.view();
        }

        let keep_order = self.order.as_ref().is_some_and(|order| order.covers(&by_id));
        self.entries = by_id;

        if keep_order {
            let total = self.entries.len();
            let cursor = self.cursor.get_or_insert_with(DeckCursor::default);
            cursor.position %= total;
        } else {
            debug!(
                "Shuffling review deck of {} entries (previous size {:?})",
                arrival.len(),
                self.order.as_ref().map(PresentationOrder::len)
            );
            self.order = Some(PresentationOrder::shuffled(arrival, &mut self.shuffler));
            self.cursor = Some(DeckCursor::default());
            self.settle = None;
        }

        self.view()
    }

    /// Drops every entry, e.g. after sign-out.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order = None;
        self.cursor = None;
        self.settle = None;
    }

    pub fn view(&self) -> DeckView<'_> {
        let (Some(order), Some(cursor)) = (&self.order, &self.cursor) else {
            return DeckView::empty();
        };

        DeckView {
            card: order.get(cursor.position).and_then(|id| self.entries.get(id)),
            has_cards: true,
            position: cursor.position,
            total: order.len(),
            flipped: cursor.flipped,
            transitioning: cursor.transitioning,
        }
    }

    pub fn state(&self) -> DeckState {
        match self.cursor {
            None => DeckState::Empty,
            Some(cursor) if cursor.transitioning => {
                DeckState::Transitioning { position: cursor.position }
            }
            Some(cursor) => DeckState::Viewing { position: cursor.position, flipped: cursor.flipped },
        }
    }

    pub fn order(&self) -> Option<&PresentationOrder> {
        self.order.as_ref()
    }

    pub fn cursor(&self) -> Option<DeckCursor> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.order.as_ref().map_or(0, PresentationOrder::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Starts moving to the next card. The card turns face-up right away; the move
    /// itself lands once the settle delay has elapsed and `poll` is called.
    /// Returns false when the request was dropped.
    pub fn advance(&mut self, now: Instant) -> bool {
        let Some(cursor) = self.cursor.as_mut() else {
            return false;
        };
        if cursor.transitioning {
            return false;
        }

        cursor.flipped = false;
        cursor.transitioning = true;
        self.settle = Some(SettleTimer::start(now, self.settle_delay));
        true
    }

    /// Completes a pending advance whose delay has elapsed. Returns true if the cursor moved.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(timer) = self.settle else {
            return false;
        };
        if !timer.is_due(now) {
            return false;
        }
        self.settle = None;

        let total = self.len();
        match self.cursor.as_mut() {
            Some(cursor) if total > 0 => {
                cursor.position = (cursor.position + 1) % total;
                cursor.flipped = false;
                cursor.transitioning = false;
                true
            }
            _ => false,
        }
    }

    pub fn cancel_advance(&mut self) {
        self.settle = None;
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.transitioning = false;
        }
    }

    /// How long until a pending advance lands, for scheduling the next wake-up.
    pub fn time_until_settled(&self, now: Instant) -> Option<Duration> {
        self.settle.map(|timer| timer.remaining(now))
    }

    /// Turns the current card over. Ignored while empty or transitioning.
    pub fn flip(&mut self) -> bool {
        match self.cursor.as_mut() {
            Some(cursor) if !cursor.transitioning => {
                cursor.flipped = !cursor.flipped;
                true
            }
            _ => false,
        }
    }

    /// Flips the favorite flag of the current card in the local snapshot and returns
    /// the update to forward to the store. Order and cursor are untouched.
    pub fn toggle_favorite(&mut self) -> Option<FavoriteToggle> {
        let cursor = self.cursor?;
        let id = self.order.as_ref()?.get(cursor.position)?;
        let entry = self.entries.get_mut(id)?;

        entry.favorite = !entry.favorite;
        Some(FavoriteToggle { id: entry.id.clone(), favorite: entry.favorite })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{
        core::UserId,
        store::{
            InMemoryStore,
            VocabularyStore,
        },
    };

    const DELAY: Duration = Duration::from_millis(250);

    /// Arranges ids into a fixed target order instead of shuffling.
    struct FixedOrder(Vec<&'static str>);

    impl Shuffler for FixedOrder {
        fn shuffle(&mut self, ids: &mut [EntryId]) {
            ids.sort_by_key(|id| {
                self.0.iter().position(|target| *target == id.as_str()).unwrap_or(usize::MAX)
            });
        }
    }

    fn entry(id: &str) -> VocabularyEntry {
        VocabularyEntry {
            id: EntryId::new(id),
            user_id: None,
            term: format!("term {id}"),
            definition: format!("definition of {id}"),
            translation: String::new(),
            notes: String::new(),
            part_of_speech: "noun".to_string(),
            favorite: false,
            created_at: None,
        }
    }

    fn entries(ids: &[&str]) -> Vec<VocabularyEntry> {
        ids.iter().map(|id| entry(id)).collect()
    }

    fn seeded_deck(seed: u64) -> ReviewDeck<FisherYates<StdRng>> {
        ReviewDeck::with_shuffler(FisherYates::seeded(seed), DELAY)
    }

    fn advance_and_settle<S: Shuffler>(deck: &mut ReviewDeck<S>, now: Instant) -> Instant {
        assert!(deck.advance(now));
        let later = now + DELAY;
        assert!(deck.poll(later));
        later
    }

    #[test]
    fn load_produces_permutation_of_all_ids() {
        let ids = ["a", "b", "c", "d", "e", "f", "g"];
        let mut deck = seeded_deck(1);
        let view = deck.load(entries(&ids));

        assert!(view.has_cards);
        assert_eq!(view.total, ids.len());
        assert_eq!(view.position, 0);

        let order: HashSet<&str> = deck.order().unwrap().ids().iter().map(EntryId::as_str).collect();
        assert_eq!(order, ids.into_iter().collect());
    }

    #[test]
    fn reloading_same_ids_keeps_order_and_position() {
        let mut deck = seeded_deck(2);
        deck.load(entries(&["a", "b", "c", "d"]));
        let order = deck.order().cloned();
        advance_and_settle(&mut deck, Instant::now());

        // Same ids, different arrival order and edited fields.
        let mut reloaded = entries(&["d", "c", "b", "a"]);
        reloaded[0].definition = "edited".to_string();
        reloaded[2].favorite = true;
        let view = deck.load(reloaded);

        assert_eq!(view.position, 1);
        assert_eq!(deck.order().cloned(), order);
        assert!(deck.entries.get(&EntryId::new("d")).is_some_and(|e| e.definition == "edited"));
    }

    #[test]
    fn count_change_reshuffles_and_resets_cursor() {
        let mut deck = seeded_deck(3);
        deck.load(entries(&["a", "b", "c"]));
        let now = advance_and_settle(&mut deck, Instant::now());
        assert!(deck.flip());
        assert!(deck.advance(now));

        let view = deck.load(entries(&["a", "b", "c", "d"]));
        assert_eq!(view.position, 0);
        assert!(!view.flipped);
        assert!(!view.transitioning);
        assert_eq!(view.total, 4);
        assert_eq!(deck.time_until_settled(now), None);
    }

    #[test]
    fn stale_id_with_same_count_reshuffles() {
        let mut deck = ReviewDeck::with_shuffler(FixedOrder(vec!["c", "b", "a", "x"]), DELAY);
        deck.load(entries(&["a", "b", "c"]));
        advance_and_settle(&mut deck, Instant::now());

        // "c" was deleted and "x" added in the same refresh.
        let view = deck.load(entries(&["a", "b", "x"]));
        assert_eq!(view.position, 0);
        let order: Vec<&str> = deck.order().unwrap().ids().iter().map(EntryId::as_str).collect();
        assert_eq!(order, vec!["b", "a", "x"]);
    }

    #[test]
    fn advance_wraps_around_after_full_cycle() {
        let mut deck = seeded_deck(4);
        deck.load(entries(&["a", "b", "c", "d", "e"]));
        let mut now = advance_and_settle(&mut deck, Instant::now());
        let start = deck.view().position;

        for _ in 0..deck.len() {
            now = advance_and_settle(&mut deck, now);
        }
        assert_eq!(deck.view().position, start);
    }

    #[test]
    fn double_flip_restores_face() {
        let mut deck = seeded_deck(5);
        deck.load(entries(&["a", "b"]));

        assert!(deck.flip());
        assert!(deck.view().flipped);
        assert!(deck.flip());
        assert!(!deck.view().flipped);
    }

    #[test]
    fn second_advance_during_transition_is_dropped() {
        let mut deck = seeded_deck(6);
        deck.load(entries(&["a", "b", "c"]));
        let now = Instant::now();

        assert!(deck.advance(now));
        assert!(!deck.advance(now + Duration::from_millis(10)));
        assert!(!deck.flip());
        assert!(!deck.poll(now + Duration::from_millis(100)));
        assert_eq!(deck.state(), DeckState::Transitioning { position: 0 });

        assert!(deck.poll(now + DELAY));
        assert_eq!(deck.state(), DeckState::Viewing { position: 1, flipped: false });
        assert!(!deck.poll(now + DELAY * 4));
        assert_eq!(deck.view().position, 1);
    }

    #[test]
    fn advance_turns_card_face_up_immediately() {
        let mut deck = seeded_deck(7);
        deck.load(entries(&["a", "b"]));
        deck.flip();

        let now = Instant::now();
        deck.advance(now);
        let view = deck.view();
        assert!(!view.flipped);
        assert!(view.transitioning);
        assert_eq!(view.position, 0);
        assert_eq!(deck.time_until_settled(now), Some(DELAY));
    }

    #[test]
    fn cancel_advance_keeps_position() {
        let mut deck = seeded_deck(8);
        deck.load(entries(&["a", "b"]));
        let now = Instant::now();

        deck.advance(now);
        deck.cancel_advance();
        assert!(!deck.poll(now + DELAY));
        assert_eq!(deck.state(), DeckState::Viewing { position: 0, flipped: false });
        assert!(deck.advance(now + DELAY));
    }

    #[test]
    fn favorite_toggle_then_reload_keeps_order() {
        let mut deck = seeded_deck(9);
        deck.load(entries(&["a", "b", "c", "d"]));
        advance_and_settle(&mut deck, Instant::now());
        let order = deck.order().cloned();

        let toggle = deck.toggle_favorite().unwrap();
        assert!(toggle.favorite);
        assert!(deck.view().card.unwrap().favorite);

        let mut refreshed = entries(&["a", "b", "c", "d"]);
        for entry in &mut refreshed {
            if entry.id == toggle.id {
                entry.favorite = true;
            }
        }
        let view = deck.load(refreshed);
        assert_eq!(view.position, 1);
        assert!(view.card.unwrap().favorite);
        assert_eq!(deck.order().cloned(), order);
    }

    #[test]
    fn favorite_toggle_is_allowed_during_transition() {
        let mut deck = seeded_deck(10);
        deck.load(entries(&["a", "b"]));
        deck.advance(Instant::now());

        let toggle = deck.toggle_favorite();
        assert!(toggle.is_some());
        assert!(deck.view().transitioning);
    }

    #[test]
    fn empty_load_moves_to_empty() {
        let mut deck = seeded_deck(11);
        let view = deck.load(Vec::new());
        assert!(!view.has_cards);
        assert!(view.card.is_none());
        assert_eq!(deck.state(), DeckState::Empty);

        deck.load(entries(&["a"]));
        assert_eq!(deck.state(), DeckState::Viewing { position: 0, flipped: false });

        let view = deck.load(Vec::new());
        assert!(!view.has_cards);
        assert!(!deck.advance(Instant::now()));
        assert!(!deck.flip());
        assert!(deck.toggle_favorite().is_none());
    }

    #[test]
    fn single_card_deck_cycles_onto_itself() {
        let mut deck = seeded_deck(12);
        deck.load(entries(&["only"]));
        advance_and_settle(&mut deck, Instant::now());
        assert_eq!(deck.view().position, 0);
        assert_eq!(deck.view().card.unwrap().id.as_str(), "only");
    }

    #[test]
    fn duplicate_ids_count_once() {
        let mut deck = seeded_deck(13);
        let view = deck.load(entries(&["a", "a", "b"]));
        assert_eq!(view.total, 2);
    }

    #[tokio::test]
    async fn review_scenario_with_store() {
        let user = UserId::new("user-1");
        let store = InMemoryStore::new();
        store.seed(&user, entries(&["A", "B", "C"]));

        let mut deck = ReviewDeck::with_shuffler(FixedOrder(vec!["B", "A", "C"]), DELAY);
        let fetched = store.fetch_entries(&user).await.unwrap();
        let view = deck.load(fetched);
        assert_eq!(view.position, 0);
        assert_eq!(view.card.unwrap().id.as_str(), "B");

        let now = Instant::now();
        deck.advance(now);
        deck.poll(now + DELAY);
        let view = deck.view();
        assert_eq!(view.position, 1);
        assert_eq!(view.card.unwrap().id.as_str(), "A");
        assert!(!view.flipped);

        let toggle = deck.toggle_favorite().unwrap();
        assert_eq!(toggle, FavoriteToggle { id: EntryId::new("A"), favorite: true });
        assert!(deck.view().card.unwrap().favorite);
        assert_eq!(deck.view().position, 1);

        store.update_entry(&toggle.id, &toggle.patch()).await.unwrap();
        let stored = store.fetch_entries(&user).await.unwrap();
        assert!(stored.iter().any(|e| e.id.as_str() == "A" && e.favorite));

        let view = deck.load(stored);
        assert_eq!(view.position, 1);
        assert_eq!(view.card.unwrap().id.as_str(), "A");
    }
}
