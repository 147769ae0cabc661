//! Keystroke decoding: raw input bytes → logical keys.
//!
//! The decoder is an explicit automaton over single bytes:
//!
//! ```text
//! Start ──ESC──▶ Escape ──'[' / 'O'──▶ Csi ──final byte──▶ key
//!   │               └──other──▶ Other
//!   └──UTF-8 lead──▶ Utf8 ──continuations──▶ Char
//! ```
//!
//! A key is only produced once its whole sequence has been read, so a
//! partial escape sequence never leaks out as stray characters.

use std::io;

use crate::terminal::InputSource;

const CTRL_C: u8 = 0x03;
const BACKSPACE: u8 = 0x08;
const LINE_FEED: u8 = 0x0A;
const CARRIAGE_RETURN: u8 = 0x0D;
const ESC: u8 = 0x1B;
const SPACE: u8 = 0x20;
const DELETE: u8 = 0x7F;

// ============================================================================
// KEYS
// ============================================================================

/// A logical key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character other than space.
    Char(char),
    /// Carriage return or line feed.
    Enter,
    /// Backspace, DEL, or the forward-delete key.
    Backspace,
    Up,
    Down,
    Left,
    Right,
    CtrlC,
    Space,
    /// Any other control code or escape sequence. Consumers ignore it.
    Other,
}

// ============================================================================
// DECODER
// ============================================================================

/// Automaton state between bytes of one key.
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Start,
    Escape,
    /// Inside `ESC [` or `ESC O`; parameter bytes collected so far.
    Csi(Vec<u8>),
    /// Inside a multi-byte UTF-8 character.
    Utf8 { buf: [u8; 4], len: usize, need: usize },
}

/// Outcome of feeding one byte.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Pending(State),
    Key(Key),
    Invalid,
}

/// Blocking key iterator over an [`InputSource`].
///
/// Yields `None` at end of input, and an `InvalidData` error for bytes
/// that are not valid UTF-8.
pub struct KeyDecoder<'a> {
    input: &'a mut dyn InputSource,
}

impl<'a> KeyDecoder<'a> {
    pub fn new(input: &'a mut dyn InputSource) -> Self {
        KeyDecoder { input }
    }

    /// Read bytes until one complete key is decoded.
    pub fn next_key(&mut self) -> io::Result<Option<Key>> {
        let mut state = State::Start;
        loop {
            let Some(byte) = self.input.read_byte()? else {
                return Ok(None);
            };
            match feed(state, byte) {
                Step::Pending(next) => state = next,
                Step::Key(key) => return Ok(Some(key)),
                Step::Invalid => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "input is not valid UTF-8",
                    ));
                }
            }
        }
    }
}

impl Iterator for KeyDecoder<'_> {
    type Item = io::Result<Key>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_key().transpose()
    }
}

/// Transition function of the automaton.
fn feed(state: State, byte: u8) -> Step {
    match state {
        State::Start => start(byte),
        State::Escape => match byte {
            b'[' | b'O' => Step::Pending(State::Csi(Vec::new())),
            _ => Step::Key(Key::Other),
        },
        State::Csi(mut params) => match byte {
            // Parameter and intermediate bytes.
            0x20..=0x3F => {
                params.push(byte);
                Step::Pending(State::Csi(params))
            }
            b'A' if params.is_empty() => Step::Key(Key::Up),
            b'B' if params.is_empty() => Step::Key(Key::Down),
            b'C' if params.is_empty() => Step::Key(Key::Right),
            b'D' if params.is_empty() => Step::Key(Key::Left),
            b'~' if params == b"3" => Step::Key(Key::Backspace),
            _ => Step::Key(Key::Other),
        },
        State::Utf8 { mut buf, len, need } => {
            if byte & 0xC0 != 0x80 {
                return Step::Invalid;
            }
            buf[len] = byte;
            let len = len + 1;
            if len < need {
                return Step::Pending(State::Utf8 { buf, len, need });
            }
            match std::str::from_utf8(&buf[..len]).ok().and_then(|s| s.chars().next()) {
                Some(c) => Step::Key(Key::Char(c)),
                None => Step::Invalid,
            }
        }
    }
}

fn start(byte: u8) -> Step {
    match byte {
        CTRL_C => Step::Key(Key::CtrlC),
        CARRIAGE_RETURN | LINE_FEED => Step::Key(Key::Enter),
        BACKSPACE | DELETE => Step::Key(Key::Backspace),
        SPACE => Step::Key(Key::Space),
        ESC => Step::Pending(State::Escape),
        0x00..=0x1F => Step::Key(Key::Other),
        0x21..=0x7E => Step::Key(Key::Char(char::from(byte))),
        _ => match utf8_char_len(byte) {
            0 | 1 => Step::Invalid,
            need => {
                let mut buf = [0u8; 4];
                buf[0] = byte;
                Step::Pending(State::Utf8 { buf, len: 1, need })
            }
        },
    }
}

/// Expected byte length of a UTF-8 character from its lead byte.
/// Returns 0 for invalid lead bytes (continuation bytes, 0xF8..).
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::ScriptedInput;

    fn decode(bytes: &[u8]) -> Vec<Key> {
        let mut input = ScriptedInput::new().bytes(bytes);
        KeyDecoder::new(&mut input)
            .collect::<io::Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn printable_ascii() {
        assert_eq!(decode(b"jk,"), vec![Key::Char('j'), Key::Char('k'), Key::Char(',')]);
    }

    #[test]
    fn both_enter_terminators() {
        assert_eq!(decode(b"\r\n"), vec![Key::Enter, Key::Enter]);
    }

    #[test]
    fn backspace_and_delete() {
        assert_eq!(
            decode(b"\x7f\x08\x1b[3~"),
            vec![Key::Backspace, Key::Backspace, Key::Backspace]
        );
    }

    #[test]
    fn arrow_keys_csi_and_ss3() {
        assert_eq!(
            decode(b"\x1b[A\x1b[B\x1b[C\x1b[D\x1bOA\x1bOB"),
            vec![Key::Up, Key::Down, Key::Right, Key::Left, Key::Up, Key::Down]
        );
    }

    #[test]
    fn unknown_sequences_are_consumed_whole() {
        // Shift+Up, F5, Alt+x: none of their bytes surface as characters.
        assert_eq!(
            decode(b"\x1b[1;2A\x1b[15~\x1bxa"),
            vec![Key::Other, Key::Other, Key::Other, Key::Char('a')]
        );
    }

    #[test]
    fn ctrl_c_space_and_other_controls() {
        assert_eq!(decode(b"\x03 \t"), vec![Key::CtrlC, Key::Space, Key::Other]);
    }

    #[test]
    fn multibyte_characters_are_assembled() {
        assert_eq!(decode("é✓".as_bytes()), vec![Key::Char('é'), Key::Char('✓')]);
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let mut input = ScriptedInput::new().bytes([0xC3, b'a']);
        let err = KeyDecoder::new(&mut input).next_key().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn partial_sequence_at_eof_yields_nothing() {
        assert_eq!(decode(b"\x1b["), Vec::<Key>::new());
    }
}
