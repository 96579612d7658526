//! Conversation history and model-input assembly.
//!
//! A `History` is the ordered list of turns (user and generated) for one
//! session, most-recent-last. It is owned by the caller; the decoder only
//! reads a bounded window of it when building model input.

use serde::{Deserialize, Serialize};

/// One turn of a conversation as token ids.
pub type Utterance = Vec<u32>;

/// Append-only record of a session's turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    turns: Vec<Utterance>,
}

impl History {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append one turn (user input or generated response).
    pub fn push(&mut self, utterance: Utterance) {
        self.turns.push(utterance);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[Utterance] {
        &self.turns
    }

    /// The last `n` turns, oldest first. Fewer if the history is shorter.
    pub fn recent(&self, n: usize) -> &[Utterance] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }
}

impl From<Vec<Utterance>> for History {
    fn from(turns: Vec<Utterance>) -> Self {
        Self { turns }
    }
}

/// Build the flat model input: start marker, then each windowed utterance
/// followed by one separator id. The newest turn must already be pushed;
/// it counts toward the window.
pub fn assemble_input(history: &History, window: usize, bos_id: u32, sep_id: u32) -> Vec<u32> {
    let recent = history.recent(window);
    let total: usize = recent.iter().map(|u| u.len() + 1).sum();
    let mut input_ids = Vec::with_capacity(1 + total);
    input_ids.push(bos_id);
    for utterance in recent {
        input_ids.extend_from_slice(utterance);
        input_ids.push(sep_id);
    }
    input_ids
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOS: u32 = 101;
    const SEP: u32 = 102;

    #[test]
    fn recent_returns_last_n_oldest_first() {
        let history = History::from(vec![vec![1], vec![2], vec![3], vec![4]]);
        assert_eq!(history.recent(2), &[vec![3], vec![4]]);
    }

    #[test]
    fn recent_handles_short_history() {
        let history = History::from(vec![vec![1]]);
        assert_eq!(history.recent(5), &[vec![1]]);
        assert!(History::new().recent(5).is_empty());
    }

    #[test]
    fn assemble_single_turn() {
        let mut history = History::new();
        history.push(vec![7, 8, 9]);
        let input = assemble_input(&history, 5, BOS, SEP);
        assert_eq!(input, vec![BOS, 7, 8, 9, SEP]);
    }

    #[test]
    fn assemble_windows_old_turns_out() {
        let turns: Vec<Utterance> = (0..7).map(|i| vec![i * 10]).collect();
        let history = History::from(turns);
        let input = assemble_input(&history, 5, BOS, SEP);
        // Turns 0 and 1 fall outside the window of 5.
        assert_eq!(input, vec![BOS, 20, SEP, 30, SEP, 40, SEP, 50, SEP, 60, SEP]);
    }

    #[test]
    fn assemble_separator_after_every_turn() {
        let history = History::from(vec![vec![1, 2], vec![3]]);
        let input = assemble_input(&history, 5, BOS, SEP);
        assert_eq!(input.iter().filter(|&&id| id == SEP).count(), 2);
        assert_eq!(*input.last().unwrap(), SEP);
    }
}
