//! Ordering of placement requests across asset types.
//!
//! [`PlacementSequence`] is a finite, lazy iterator built fresh for every run. It yields
//! one asset id per instance to place, following a [`SequenceMode`].
use rand::rngs::StdRng;
use rand::SeedableRng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::params::AssetId;
use crate::random::uniform_index;

/// Order in which asset types are requested.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceMode {
    /// Exhaust each type in authored order before moving to the next.
    #[default]
    Sequential,
    /// Pick uniformly among types that still have instances left.
    Random,
    /// Round-robin across types in authored order.
    Interleaved,
}

impl SequenceMode {
    /// Maps the two editor toggles onto a mode. Both set at once is rejected.
    pub fn from_flags(random: bool, interleaved: bool) -> Result<Self> {
        match (random, interleaved) {
            (false, false) => Ok(Self::Sequential),
            (true, false) => Ok(Self::Random),
            (false, true) => Ok(Self::Interleaved),
            (true, true) => Err(Error::InvalidConfig(
                "random and interleaved ordering are mutually exclusive".into(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
struct SequenceEntry {
    id: AssetId,
    quantity: usize,
    remaining: usize,
}

/// Lazily yields asset ids in the order they should be placed.
#[derive(Debug, Clone)]
pub struct PlacementSequence {
    entries: Vec<SequenceEntry>,
    mode: SequenceMode,
    rng: StdRng,
    round: usize,
    cursor: usize,
    rounds: usize,
}

impl PlacementSequence {
    /// Creates a sequence over `(asset id, quantity)` pairs in authored order.
    ///
    /// `seed` drives the random mode and is ignored otherwise.
    pub fn new(assets: Vec<(AssetId, usize)>, mode: SequenceMode, seed: u64) -> Self {
        let rounds = assets.iter().map(|(_, q)| *q).max().unwrap_or(0);
        Self {
            entries: assets
                .into_iter()
                .map(|(id, quantity)| SequenceEntry {
                    id,
                    quantity,
                    remaining: quantity,
                })
                .collect(),
            mode,
            rng: StdRng::seed_from_u64(seed),
            round: 0,
            cursor: 0,
            rounds,
        }
    }

    pub fn mode(&self) -> SequenceMode {
        self.mode
    }

    /// Instances not yet yielded.
    pub fn remaining(&self) -> usize {
        self.entries.iter().map(|e| e.remaining).sum()
    }

    fn take(&mut self, index: usize) -> AssetId {
        let entry = &mut self.entries[index];
        entry.remaining -= 1;
        entry.id.clone()
    }

    fn next_interleaved(&mut self) -> Option<usize> {
        while self.round < self.rounds {
            while self.cursor < self.entries.len() {
                let index = self.cursor;
                self.cursor += 1;
                if self.entries[index].quantity > self.round {
                    return Some(index);
                }
            }
            self.cursor = 0;
            self.round += 1;
        }
        None
    }
}

impl Iterator for PlacementSequence {
    type Item = AssetId;

    fn next(&mut self) -> Option<AssetId> {
        let index = match self.mode {
            SequenceMode::Sequential => self.entries.iter().position(|e| e.remaining > 0)?,
            SequenceMode::Random => {
                let open: Vec<usize> = self
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.remaining > 0)
                    .map(|(i, _)| i)
                    .collect();
                if open.is_empty() {
                    return None;
                }
                open[uniform_index(&mut self.rng, open.len())]
            }
            SequenceMode::Interleaved => self.next_interleaved()?,
        };
        Some(self.take(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for PlacementSequence {}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets(pairs: &[(&str, usize)]) -> Vec<(AssetId, usize)> {
        pairs.iter().map(|(id, q)| (id.to_string(), *q)).collect()
    }

    fn collect(seq: PlacementSequence) -> Vec<String> {
        seq.collect()
    }

    #[test]
    fn sequential_exhausts_each_type_in_order() {
        let seq = PlacementSequence::new(
            assets(&[("a", 2), ("b", 0), ("c", 1)]),
            SequenceMode::Sequential,
            0,
        );
        assert_eq!(collect(seq), vec!["a", "a", "c"]);
    }

    #[test]
    fn interleaved_alternates_then_trails_longest() {
        let seq = PlacementSequence::new(
            assets(&[("A", 3), ("B", 2)]),
            SequenceMode::Interleaved,
            0,
        );
        assert_eq!(collect(seq), vec!["A", "B", "A", "B", "A"]);
    }

    #[test]
    fn interleaved_with_three_types() {
        let seq = PlacementSequence::new(
            assets(&[("a", 1), ("b", 3), ("c", 2)]),
            SequenceMode::Interleaved,
            0,
        );
        assert_eq!(collect(seq), vec!["a", "b", "c", "b", "c", "b"]);
    }

    #[test]
    fn random_yields_every_instance_exactly_once() {
        let seq = PlacementSequence::new(
            assets(&[("a", 5), ("b", 3), ("c", 7)]),
            SequenceMode::Random,
            42,
        );
        assert_eq!(seq.len(), 15);
        let out = collect(seq);
        assert_eq!(out.len(), 15);
        assert_eq!(out.iter().filter(|s| *s == "a").count(), 5);
        assert_eq!(out.iter().filter(|s| *s == "b").count(), 3);
        assert_eq!(out.iter().filter(|s| *s == "c").count(), 7);
    }

    #[test]
    fn random_is_deterministic_for_same_seed() {
        let make = |seed| {
            collect(PlacementSequence::new(
                assets(&[("a", 6), ("b", 6)]),
                SequenceMode::Random,
                seed,
            ))
        };
        assert_eq!(make(7), make(7));
        let sequential: Vec<String> = std::iter::repeat_n("a".to_string(), 6)
            .chain(std::iter::repeat_n("b".to_string(), 6))
            .collect();
        assert!((0..8).any(|seed| make(seed) != sequential));
    }

    #[test]
    fn empty_input_yields_nothing() {
        for mode in [
            SequenceMode::Sequential,
            SequenceMode::Random,
            SequenceMode::Interleaved,
        ] {
            assert!(collect(PlacementSequence::new(Vec::new(), mode, 1)).is_empty());
        }
    }

    #[test]
    fn mode_flags_are_mutually_exclusive() {
        assert_eq!(
            SequenceMode::from_flags(false, false).unwrap(),
            SequenceMode::Sequential
        );
        assert_eq!(
            SequenceMode::from_flags(true, false).unwrap(),
            SequenceMode::Random
        );
        assert_eq!(
            SequenceMode::from_flags(false, true).unwrap(),
            SequenceMode::Interleaved
        );
        assert!(matches!(
            SequenceMode::from_flags(true, true),
            Err(Error::InvalidConfig(_))
        ));
    }
}
