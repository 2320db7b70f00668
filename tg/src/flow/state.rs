//! Flow position and transitions
//!
//! `FlowState` is a plain value: every transition consumes the old state
//! and returns the new one together with what should be shown next.

use serde::Serialize;

use super::definition::Answers;

/// Where the controller is in the guided sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "index", rename_all = "kebab-case")]
pub enum FlowPhase {
    /// Before the first question
    Idle,
    /// Waiting for the user to answer question `i`
    AwaitingAnswer(usize),
    /// Answer to question `i` is being handled
    Submitting(usize),
    /// All questions done; input goes to free chat
    Finished,
}

/// What to show after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Ask question `index`; `repeat` selects the repeat prompt
    Prompt { index: usize, repeat: bool },
    /// The sequence is over
    Finish,
}

/// Guided mode flag, current position and collected answers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlowState {
    pub guided_mode: bool,
    pub current_question_index: usize,
    pub answers: Answers,
}

impl FlowState {
    /// Initial state for a flow of `total` questions
    pub fn start(total: usize) -> (Self, Transition) {
        if total == 0 {
            return (Self::default().finish(total), Transition::Finish);
        }
        let state = Self {
            guided_mode: true,
            current_question_index: 0,
            answers: Answers::new(),
        };
        (state, Transition::Prompt { index: 0, repeat: false })
    }

    /// Store an answer under its storage key (last write wins)
    pub fn record_answer(mut self, key: &str, value: &str) -> Self {
        self.answers.insert(key, value);
        self
    }

    /// Move on from question `from`
    pub fn advance(self, from: usize, total: usize) -> (Self, Transition) {
        let next = from + 1;
        if next < total {
            (self.at(next), Transition::Prompt { index: next, repeat: false })
        } else {
            (self.finish(total), Transition::Finish)
        }
    }

    /// Ask again after question `from` did not complete
    ///
    /// The repeat prompt is only used when asking the same question again.
    pub fn repeat(self, from: usize, target: Option<usize>, total: usize) -> (Self, Transition) {
        let target = target.filter(|t| *t < total).unwrap_or(from);
        let repeat = target == from;
        (self.at(target), Transition::Prompt { index: target, repeat })
    }

    /// Position at question `index` in guided mode
    pub fn at(mut self, index: usize) -> Self {
        self.guided_mode = true;
        self.current_question_index = index;
        self
    }

    /// Terminal state: index == total, guided mode off
    pub fn finish(mut self, total: usize) -> Self {
        self.guided_mode = false;
        self.current_question_index = total;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_empty_flow_finishes() {
        let (state, transition) = FlowState::start(0);
        assert_eq!(transition, Transition::Finish);
        assert!(!state.guided_mode);
        assert_eq!(state.current_question_index, 0);
    }

    #[test]
    fn test_start_prompts_first_question() {
        let (state, transition) = FlowState::start(3);
        assert_eq!(transition, Transition::Prompt { index: 0, repeat: false });
        assert!(state.guided_mode);
        assert_eq!(state.current_question_index, 0);
    }

    #[test]
    fn test_advance_increments_by_one() {
        let (state, _) = FlowState::start(3);
        let (state, transition) = state.advance(0, 3);
        assert_eq!(state.current_question_index, 1);
        assert_eq!(transition, Transition::Prompt { index: 1, repeat: false });
    }

    #[test]
    fn test_advance_from_last_finishes() {
        let (state, _) = FlowState::start(2);
        let (state, transition) = state.at(1).advance(1, 2);
        assert_eq!(transition, Transition::Finish);
        assert_eq!(state.current_question_index, 2);
        assert!(!state.guided_mode);
    }

    #[test]
    fn test_repeat_same_question_uses_repeat_prompt() {
        let (state, _) = FlowState::start(4);
        let (state, transition) = state.at(3).repeat(3, None, 4);
        assert_eq!(transition, Transition::Prompt { index: 3, repeat: true });
        assert_eq!(state.current_question_index, 3);
    }

    #[test]
    fn test_repeat_jumps_to_repeat_index() {
        let (state, _) = FlowState::start(4);
        let (state, transition) = state.at(3).repeat(3, Some(0), 4);
        assert_eq!(transition, Transition::Prompt { index: 0, repeat: false });
        assert_eq!(state.current_question_index, 0);
    }

    #[test]
    fn test_repeat_ignores_out_of_range_target() {
        let (state, _) = FlowState::start(2);
        let (_, transition) = state.at(1).repeat(1, Some(9), 2);
        assert_eq!(transition, Transition::Prompt { index: 1, repeat: true });
    }

    #[test]
    fn test_record_answer_overwrites() {
        let (state, _) = FlowState::start(1);
        let state = state.record_answer("from", "Seattle").record_answer("from", "Tacoma");
        assert_eq!(state.answers.get("from"), Some("Tacoma"));
        assert_eq!(state.answers.len(), 1);
    }
}
