//! Widget state algebra: pure types, zero effects.
//!
//! States carry only indices and buffers. The choice values themselves
//! stay with the caller; default values are resolved to indices once, by
//! value equality, when a state is constructed.

use std::collections::BTreeSet;

// ============================================================================
// TRANSITIONS
// ============================================================================

/// Result of feeding one key to a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition<S, T> {
    /// Keep reading keys with this state.
    Continue(S),
    /// The widget finished with this value.
    Done(T),
}

// ============================================================================
// SELECTION
// ============================================================================

/// Single-choice cursor.
///
/// Invariant: `cursor < len` and `len > 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleSelect {
    pub cursor: usize,
    pub len: usize,
    /// Index of the caller's default value, if it is among the choices.
    pub default: Option<usize>,
}

impl SingleSelect {
    /// Returns `None` for an empty choice list.
    pub fn new(len: usize, default: Option<usize>) -> Option<Self> {
        if len == 0 {
            return None;
        }
        let default = default.filter(|&i| i < len);
        Some(SingleSelect {
            cursor: default.unwrap_or(0),
            len,
            default,
        })
    }
}

/// Multi-choice cursor plus the selected set.
///
/// Invariant: `cursor < len`, every selected index `< len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSelect {
    pub cursor: usize,
    pub len: usize,
    pub selected: BTreeSet<usize>,
}

impl MultiSelect {
    /// Returns `None` for an empty choice list.
    pub fn new(len: usize, selected: BTreeSet<usize>) -> Option<Self> {
        if len == 0 {
            return None;
        }
        let selected = selected.into_iter().filter(|&i| i < len).collect();
        Some(MultiSelect { cursor: 0, len, selected })
    }
}

/// Index of the first choice equal to `value`.
pub fn index_of<T: PartialEq>(choices: &[T], value: &T) -> Option<usize> {
    choices.iter().position(|c| c == value)
}

/// Indices of every choice equal to any of `defaults`.
pub fn indices_of<T: PartialEq>(choices: &[T], defaults: &[T]) -> BTreeSet<usize> {
    choices
        .iter()
        .enumerate()
        .filter(|(_, c)| defaults.contains(c))
        .map(|(i, _)| i)
        .collect()
}

// ============================================================================
// LINE EDITING
// ============================================================================

/// Buffer of a hidden prompt: characters are collected, never echoed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    pub chars: Vec<char>,
}

impl LineBuffer {
    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }
}

/// Raw buffer of a multi-value prompt, split on `separator` at commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBuffer {
    pub raw: String,
    pub separator: char,
}

impl TokenBuffer {
    pub fn new(separator: char) -> Self {
        TokenBuffer {
            raw: String::new(),
            separator,
        }
    }

    /// Non-empty tokens in typing order.
    pub fn tokens(&self) -> Vec<String> {
        self.raw
            .split(self.separator)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_select_starts_at_zero_without_default() {
        let state = SingleSelect::new(3, None).unwrap();
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn single_select_starts_at_default_index() {
        let choices = ["red", "green", "blue"];
        let state = SingleSelect::new(3, index_of(&choices, &"blue")).unwrap();
        assert_eq!(state.cursor, 2);
        assert_eq!(state.default, Some(2));
    }

    #[test]
    fn absent_default_falls_back_to_zero() {
        let choices = ["red", "green"];
        let state = SingleSelect::new(2, index_of(&choices, &"pink")).unwrap();
        assert_eq!(state.cursor, 0);
        assert_eq!(state.default, None);
    }

    #[test]
    fn empty_choices_have_no_state() {
        assert!(SingleSelect::new(0, None).is_none());
        assert!(MultiSelect::new(0, BTreeSet::new()).is_none());
    }

    #[test]
    fn defaults_match_by_value_and_collapse_duplicates() {
        let choices = [10, 20, 30, 40];
        let selected = indices_of(&choices, &[40, 20, 20, 99]);
        assert_eq!(selected, BTreeSet::from([1, 3]));
    }

    #[test]
    fn tokens_skip_empty_segments() {
        let buffer = TokenBuffer {
            raw: ",a,,b,c,".to_string(),
            separator: ',',
        };
        assert_eq!(buffer.tokens(), vec!["a", "b", "c"]);
    }
}
