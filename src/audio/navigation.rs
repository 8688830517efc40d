//! Track selection for next/previous under each play mode.
//!
//! `next` and `previous` are pure: they read the playlist length, the play
//! mode, the current index and the shuffle history, and return the chosen
//! index together with the history that results from choosing it. Nothing
//! is committed until the caller decides the transition happened.

use std::collections::{BTreeSet, VecDeque};

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::state::PlayMode;

/// Default number of shuffle steps `previous` can walk back.
pub const DEFAULT_BACK_STACK_DEPTH: usize = 32;

/// Shuffle bookkeeping for the current cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffleHistory {
    /// Indices already played in the current cycle.
    played: BTreeSet<usize>,
    /// Indices played before the current one, most recent last.
    back: VecDeque<usize>,
    /// Indices stepped back over with `previous`, most recent last.
    forward: Vec<usize>,
    /// Maximum length of `back` and `forward`.
    depth: usize,
}

impl Default for ShuffleHistory {
    fn default() -> Self {
        Self::with_depth(DEFAULT_BACK_STACK_DEPTH)
    }
}

impl ShuffleHistory {
    /// Creates an empty history remembering at most `depth` steps.
    #[must_use]
    pub fn with_depth(depth: usize) -> Self {
        Self {
            played: BTreeSet::new(),
            back: VecDeque::new(),
            forward: Vec::new(),
            depth,
        }
    }

    /// Indices played in the current cycle.
    #[must_use]
    pub fn played(&self) -> &BTreeSet<usize> {
        &self.played
    }

    /// Whether the history holds no state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.played.is_empty() && self.back.is_empty() && self.forward.is_empty()
    }

    /// Forgets everything except the configured depth.
    pub fn reset(&mut self) {
        self.played.clear();
        self.back.clear();
        self.forward.clear();
    }

    fn push_back(&mut self, index: usize) {
        if self.depth == 0 {
            return;
        }
        self.back.push_back(index);
        while self.back.len() > self.depth {
            self.back.pop_front();
        }
    }

    fn push_forward(&mut self, index: usize) {
        if self.depth == 0 {
            return;
        }
        self.forward.push(index);
        if self.forward.len() > self.depth {
            self.forward.remove(0);
        }
    }
}

/// A navigation result: the index to move to and the history after moving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Playlist index to load.
    pub index: usize,
    /// History to commit if the move happens.
    pub history: ShuffleHistory,
}

impl Selection {
    fn keep(index: usize, history: &ShuffleHistory) -> Self {
        Self {
            index,
            history: history.clone(),
        }
    }
}

/// Chooses the track after `current`.
///
/// Returns `None` when there is no next track: the playlist is empty,
/// `current` is not a valid index, or Sequential mode reached the end.
pub fn next<R: Rng + ?Sized>(
    len: usize,
    mode: PlayMode,
    current: usize,
    history: &ShuffleHistory,
    rng: &mut R,
) -> Option<Selection> {
    if current >= len {
        return None;
    }

    match mode {
        PlayMode::Sequential => {
            (current + 1 < len).then(|| Selection::keep(current + 1, history))
        }
        PlayMode::LoopSingle => Some(Selection::keep(current, history)),
        PlayMode::LoopAll => Some(Selection::keep((current + 1) % len, history)),
        PlayMode::Shuffle => Some(shuffle_next(len, current, history, rng)),
    }
}

/// Chooses the track before `current`.
///
/// Under Shuffle this walks the back-stack; an empty stack means there is
/// no previous track.
#[must_use]
pub fn previous(
    len: usize,
    mode: PlayMode,
    current: usize,
    history: &ShuffleHistory,
) -> Option<Selection> {
    if current >= len {
        return None;
    }

    match mode {
        PlayMode::Sequential => current
            .checked_sub(1)
            .map(|index| Selection::keep(index, history)),
        PlayMode::LoopSingle => Some(Selection::keep(current, history)),
        PlayMode::LoopAll => Some(Selection::keep((current + len - 1) % len, history)),
        PlayMode::Shuffle => {
            let mut history = history.clone();
            let index = history.back.pop_back().filter(|&index| index < len)?;
            history.push_forward(current);
            Some(Selection { index, history })
        }
    }
}

fn shuffle_next<R: Rng + ?Sized>(
    len: usize,
    current: usize,
    history: &ShuffleHistory,
    rng: &mut R,
) -> Selection {
    let mut history = history.clone();
    history.push_back(current);

    // Replay what `previous` stepped back over before picking anything new.
    if let Some(index) = history.forward.pop().filter(|&index| index < len) {
        history.played.insert(index);
        return Selection { index, history };
    }

    history.played.insert(current);
    if (0..len).all(|index| history.played.contains(&index)) {
        history.played.clear();
    }

    let candidates: Vec<usize> = (0..len)
        .filter(|index| !history.played.contains(index) && (len == 1 || *index != current))
        .collect();
    let index = candidates.choose(rng).copied().unwrap_or(current);
    history.played.insert(index);

    Selection { index, history }
}

/// Navigation state owned alongside the controller.
///
/// Holds the committed shuffle history and the random source. Planning a
/// move never changes the history; `commit` does.
#[derive(Debug)]
pub struct NavigationStrategy<R = StdRng> {
    /// Committed shuffle history.
    history: ShuffleHistory,
    /// Random source for shuffle picks.
    rng: R,
}

impl NavigationStrategy<StdRng> {
    /// Creates a strategy seeded from system entropy.
    #[must_use]
    pub fn new(depth: usize) -> Self {
        Self::with_rng(depth, StdRng::from_entropy())
    }
}

impl<R: Rng> NavigationStrategy<R> {
    /// Creates a strategy using the given random source.
    pub fn with_rng(depth: usize, rng: R) -> Self {
        Self {
            history: ShuffleHistory::with_depth(depth),
            rng,
        }
    }

    /// Plans the move after `current` without committing it.
    pub fn plan_next(&mut self, len: usize, mode: PlayMode, current: usize) -> Option<Selection> {
        next(len, mode, current, &self.history, &mut self.rng)
    }

    /// Plans the move before `current` without committing it.
    #[must_use]
    pub fn plan_previous(&self, len: usize, mode: PlayMode, current: usize) -> Option<Selection> {
        previous(len, mode, current, &self.history)
    }

    /// Adopts the history of a move that was carried out.
    pub fn commit(&mut self, history: ShuffleHistory) {
        self.history = history;
    }

    /// Starts a fresh cycle.
    pub fn reset(&mut self) {
        self.history.reset();
    }

    /// The committed history.
    #[must_use]
    pub fn history(&self) -> &ShuffleHistory {
        &self.history
    }
}
