//! Pure state transitions: (state, key) → transition.
//!
//! Fully testable without a terminal. Keys a widget does not understand
//! leave its state unchanged. Ctrl+C never reaches these functions; the
//! effects layer intercepts it first.

use std::io;

use crate::key::Key;

use super::state::{LineBuffer, MultiSelect, SingleSelect, TokenBuffer, Transition};

/// Tokens accepted as "yes", compared case-insensitively.
pub const AFFIRMATIVE: [&str; 6] = ["y", "yea", "yeah", "yep", "yes", "yup"];

/// Tokens accepted as "no", compared case-insensitively.
pub const NEGATIVE: [&str; 3] = ["n", "no", "nope"];

// ============================================================================
// SELECTION
// ============================================================================

fn step_down(cursor: usize, len: usize) -> usize {
    (cursor + 1) % len
}

fn step_up(cursor: usize, len: usize) -> usize {
    (cursor + len - 1) % len
}

/// Single choice: arrows or j/k move with wrap-around, Enter picks the
/// cursor row, Space picks the default (if there is one).
pub fn update_single(state: SingleSelect, key: Key) -> Transition<SingleSelect, usize> {
    match key {
        Key::Down | Key::Char('j') => Transition::Continue(SingleSelect {
            cursor: step_down(state.cursor, state.len),
            ..state
        }),
        Key::Up | Key::Char('k') => Transition::Continue(SingleSelect {
            cursor: step_up(state.cursor, state.len),
            ..state
        }),
        Key::Enter => Transition::Done(state.cursor),
        Key::Space => match state.default {
            Some(default) => Transition::Done(default),
            None => Transition::Continue(state),
        },
        _ => Transition::Continue(state),
    }
}

/// Multi choice: same movement, Space toggles the cursor row, Enter
/// returns the selected indices in ascending (choice) order.
pub fn update_multi(state: MultiSelect, key: Key) -> Transition<MultiSelect, Vec<usize>> {
    match key {
        Key::Down | Key::Char('j') => Transition::Continue(MultiSelect {
            cursor: step_down(state.cursor, state.len),
            ..state
        }),
        Key::Up | Key::Char('k') => Transition::Continue(MultiSelect {
            cursor: step_up(state.cursor, state.len),
            ..state
        }),
        Key::Space => {
            let mut selected = state.selected;
            if !selected.remove(&state.cursor) {
                selected.insert(state.cursor);
            }
            Transition::Continue(MultiSelect { selected, ..state })
        }
        Key::Enter => Transition::Done(state.selected.into_iter().collect()),
        _ => Transition::Continue(state),
    }
}

// ============================================================================
// LINE EDITING
// ============================================================================

/// Hidden line: characters append, Backspace pops, Enter commits.
pub fn update_line(buffer: LineBuffer, key: Key) -> Transition<LineBuffer, String> {
    let mut buffer = buffer;
    match key {
        Key::Char(c) => buffer.chars.push(c),
        Key::Space => buffer.chars.push(' '),
        Key::Backspace => {
            buffer.chars.pop();
        }
        Key::Enter => return Transition::Done(buffer.as_string()),
        _ => {}
    }
    Transition::Continue(buffer)
}

/// Multi-value line: characters (separator included) append to the raw
/// buffer, Backspace pops one character, Enter splits into tokens. Other
/// control keys are ignored.
pub fn update_tokens(buffer: TokenBuffer, key: Key) -> Transition<TokenBuffer, Vec<String>> {
    let mut buffer = buffer;
    match key {
        Key::Char(c) => buffer.raw.push(c),
        Key::Space => buffer.raw.push(' '),
        Key::Backspace => {
            buffer.raw.pop();
        }
        Key::Enter => return Transition::Done(buffer.tokens()),
        _ => {}
    }
    Transition::Continue(buffer)
}

// ============================================================================
// CONFIRMATION
// ============================================================================

/// Interpret a typed answer. `None` when it is neither yes nor no.
pub fn parse_confirmation(input: &str) -> Option<bool> {
    let lowered = input.trim().to_lowercase();
    if AFFIRMATIVE.contains(&lowered.as_str()) {
        Some(true)
    } else if NEGATIVE.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Resolve the outcome of a line read into a yes/no answer.
///
/// End of input, an empty or unrecognised answer, and a read failure all
/// resolve to `default`.
pub fn resolve_confirmation(read: &io::Result<Option<String>>, default: bool) -> bool {
    match read {
        Ok(Some(line)) => parse_confirmation(line).unwrap_or(default),
        Ok(None) | Err(_) => default,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn single(len: usize, default: Option<usize>) -> SingleSelect {
        SingleSelect::new(len, default).unwrap()
    }

    fn multi(len: usize) -> MultiSelect {
        MultiSelect::new(len, BTreeSet::new()).unwrap()
    }

    fn continue_single(t: Transition<SingleSelect, usize>) -> SingleSelect {
        match t {
            Transition::Continue(s) => s,
            Transition::Done(i) => panic!("unexpected Done({i})"),
        }
    }

    fn continue_multi(t: Transition<MultiSelect, Vec<usize>>) -> MultiSelect {
        match t {
            Transition::Continue(s) => s,
            Transition::Done(v) => panic!("unexpected Done({v:?})"),
        }
    }

    fn feed_tokens(separator: char, keys: &[Key]) -> Vec<String> {
        let mut buffer = TokenBuffer::new(separator);
        for &key in keys {
            match update_tokens(buffer, key) {
                Transition::Continue(b) => buffer = b,
                Transition::Done(tokens) => return tokens,
            }
        }
        panic!("no Enter in key script")
    }

    fn typed(text: &str) -> Vec<Key> {
        text.chars()
            .map(|c| match c {
                '\u{7f}' => Key::Backspace,
                '\n' => Key::Enter,
                ' ' => Key::Space,
                c => Key::Char(c),
            })
            .collect()
    }

    #[test]
    fn cursor_wraps_in_both_directions() {
        for len in 1..5 {
            let up = continue_single(update_single(single(len, None), Key::Up));
            assert_eq!(up.cursor, len - 1);

            let last = single(len, Some(len - 1));
            let down = continue_single(update_single(last, Key::Down));
            assert_eq!(down.cursor, 0);
        }
    }

    #[test]
    fn vim_keys_move_like_arrows() {
        let s = continue_single(update_single(single(3, None), Key::Char('j')));
        assert_eq!(s.cursor, 1);
        let s = continue_single(update_single(s, Key::Char('k')));
        assert_eq!(s.cursor, 0);
    }

    #[test]
    fn enter_returns_cursor_index() {
        let s = continue_single(update_single(single(3, None), Key::Down));
        assert_eq!(update_single(s, Key::Enter), Transition::Done(1));
    }

    #[test]
    fn space_returns_default_even_after_moving() {
        let s = continue_single(update_single(single(3, Some(2)), Key::Down));
        assert_eq!(s.cursor, 0);
        assert_eq!(update_single(s, Key::Space), Transition::Done(2));
    }

    #[test]
    fn space_without_default_is_a_noop() {
        let s = single(3, None);
        assert_eq!(update_single(s.clone(), Key::Space), Transition::Continue(s));
    }

    #[test]
    fn other_keys_leave_single_select_unchanged() {
        let s = single(3, None);
        for key in [Key::Left, Key::Right, Key::Other, Key::Char('x'), Key::Backspace] {
            assert_eq!(update_single(s.clone(), key), Transition::Continue(s.clone()));
        }
    }

    #[test]
    fn toggling_twice_unselects() {
        let s = continue_multi(update_multi(multi(3), Key::Space));
        assert_eq!(s.selected, BTreeSet::from([0]));
        let s = continue_multi(update_multi(s, Key::Space));
        assert!(s.selected.is_empty());
        assert_eq!(s.cursor, 0);
    }

    #[test]
    fn multi_returns_choice_order_not_toggle_order() {
        let mut s = multi(4);
        let keys = [
            Key::Up,
            Key::Space,
            Key::Up,
            Key::Up,
            Key::Space,
            Key::Down,
            Key::Down,
            Key::Space,
        ];
        for key in keys {
            s = continue_multi(update_multi(s, key));
        }
        // 3 on, 1 on, 3 off.
        assert_eq!(update_multi(s, Key::Enter), Transition::Done(vec![1]));

        let mut s = multi(4);
        for key in [Key::Up, Key::Space, Key::Down, Key::Space] {
            s = continue_multi(update_multi(s, key));
        }
        assert_eq!(update_multi(s, Key::Enter), Transition::Done(vec![0, 3]));
    }

    #[test]
    fn hidden_buffer_backspace_on_empty_is_harmless() {
        let mut buffer = LineBuffer::default();
        for key in [Key::Backspace, Key::Char('a'), Key::Char('b'), Key::Backspace] {
            buffer = match update_line(buffer, key) {
                Transition::Continue(b) => b,
                Transition::Done(v) => panic!("unexpected Done({v})"),
            };
        }
        assert_eq!(update_line(buffer, Key::Enter), Transition::Done("a".to_string()));
    }

    #[test]
    fn tokens_split_on_separator() {
        assert_eq!(feed_tokens(',', &typed("a,b,c\n")), vec!["a", "b", "c"]);
    }

    #[test]
    fn trailing_separator_adds_no_token() {
        assert_eq!(feed_tokens(',', &typed("a,b,c,\n")), vec!["a", "b", "c"]);
    }

    #[test]
    fn backspace_across_separator_merges() {
        assert_eq!(feed_tokens(',', &typed("a,x\u{7f}\u{7f},b\n")), vec!["a", "b"]);
        assert_eq!(feed_tokens(',', &typed("a,\u{7f}b\n")), vec!["ab"]);
    }

    #[test]
    fn control_keys_are_ignored_in_tokens() {
        let keys = [
            Key::Char('a'),
            Key::Up,
            Key::Other,
            Key::Left,
            Key::Char(';'),
            Key::Char('b'),
            Key::Enter,
        ];
        assert_eq!(feed_tokens(';', &keys), vec!["a", "b"]);
    }

    #[test]
    fn affirmative_tokens() {
        for input in ["y", "Y", "Yes", "yes", "yeah", "yea", "yup"] {
            assert_eq!(parse_confirmation(input), Some(true), "{input}");
        }
    }

    #[test]
    fn negative_tokens() {
        for input in ["n", "N", "No", "no", "nope", "Nope", "nopE"] {
            assert_eq!(parse_confirmation(input), Some(false), "{input}");
        }
    }

    #[test]
    fn unmatched_and_failed_reads_fall_back_to_default() {
        for default in [true, false] {
            assert_eq!(resolve_confirmation(&Ok(Some(String::new())), default), default);
            assert_eq!(resolve_confirmation(&Ok(Some("maybe".into())), default), default);
            assert_eq!(resolve_confirmation(&Ok(None), default), default);
            let failed = Err(io::Error::new(io::ErrorKind::InvalidData, "bad"));
            assert_eq!(resolve_confirmation(&failed, default), default);
        }
    }
}
