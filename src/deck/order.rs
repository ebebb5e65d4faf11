use std::collections::HashMap;

use rand::{
    rngs::StdRng,
    Rng,
    SeedableRng,
};

use crate::core::{
    EntryId,
    VocabularyEntry,
};

/// Produces the permutation a deck is presented in.
pub trait Shuffler {
    fn shuffle(&mut self, ids: &mut [EntryId]);
}

/// Uniform Fisher–Yates shuffle over any `rand` generator.
pub struct FisherYates<R> {
    rng: R,
}

impl<R: Rng> FisherYates<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl FisherYates<StdRng> {
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Shuffler for FisherYates<R> {
    fn shuffle(&mut self, ids: &mut [EntryId]) {
        for i in (1..ids.len()).rev() {
            let j = self.rng.random_range(0..=i);
            ids.swap(i, j);
        }
    }
}

/// Entry ids in the order the deck shows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationOrder {
    ids: Vec<EntryId>,
}

impl PresentationOrder {
    pub fn shuffled(mut ids: Vec<EntryId>, shuffler: &mut impl Shuffler) -> Self {
        shuffler.shuffle(&mut ids);
        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&EntryId> {
        self.ids.get(position)
    }

    pub fn ids(&self) -> &[EntryId] {
        &self.ids
    }

    /// True when the order still covers exactly the given entries: same count and no stale ids.
    pub fn covers(&self, entries: &HashMap<EntryId, VocabularyEntry>) -> bool {
        self.ids.len() == entries.len() && self.ids.iter().all(|id| entries.contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn ids(count: usize) -> Vec<EntryId> {
        (0..count).map(|i| EntryId::new(format!("e{i}"))).collect()
    }

    #[test]
    fn fisher_yates_is_a_permutation() {
        let mut shuffler = FisherYates::seeded(7);
        for count in [1, 2, 5, 40] {
            let order = PresentationOrder::shuffled(ids(count), &mut shuffler);
            assert_eq!(order.len(), count);
            let unique: HashSet<&EntryId> = order.ids().iter().collect();
            assert_eq!(unique.len(), count);
            assert!(ids(count).iter().all(|id| unique.contains(id)));
        }
    }

    #[test]
    fn same_seed_gives_same_order() {
        let first = PresentationOrder::shuffled(ids(20), &mut FisherYates::seeded(42));
        let second = PresentationOrder::shuffled(ids(20), &mut FisherYates::seeded(42));
        assert_eq!(first, second);
    }

    #[test]
    fn shuffle_reaches_every_arrangement_of_three() {
        let mut shuffler = FisherYates::seeded(3);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            let order = PresentationOrder::shuffled(ids(3), &mut shuffler);
            seen.insert(order.ids().to_vec());
        }
        assert_eq!(seen.len(), 6);
    }
}
