//! Musical note conversion
//!
//! Maps a frequency to the nearest equal-tempered note relative to A4 = 440 Hz
//! and formats it as letter, optional sharp and octave (e.g. "E2", "C#5").

use std::fmt;
use std::io::{Cursor, Write};

use crate::config::{
    MAX_FREQUENCY, MIN_FREQUENCY, NO_SIGNAL_MESSAGE, OCTAVE_OFFSET, REFERENCE_FREQUENCY,
};

/// Letter, optional sharp and up to two octave digits.
pub const NOTE_LABEL_CAPACITY: usize = 4;

// Chromatic scale starting at the reference pitch's class (A).
const NOTE_LETTERS: [char; 12] = ['A', 'A', 'B', 'C', 'C', 'D', 'D', 'E', 'F', 'F', 'G', 'G'];
const NOTE_SHARPS: [bool; 12] = [
    false, true, false, false, true, false, true, false, false, true, false, true,
];

/// A printable note name held inline, no heap allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteLabel {
    letter: char,
    sharp: bool,
    octave: i32,
    text: [u8; NOTE_LABEL_CAPACITY],
    len: usize,
}

impl NoteLabel {
    /// Returns `None` when the label does not fit the inline buffer.
    pub fn new(letter: char, sharp: bool, octave: i32) -> Option<Self> {
        let mut text = [0u8; NOTE_LABEL_CAPACITY];
        let mut cursor = Cursor::new(&mut text[..]);

        let written = if sharp {
            write!(cursor, "{}#{}", letter, octave)
        } else {
            write!(cursor, "{}{}", letter, octave)
        };
        written.ok()?;
        let len = cursor.position() as usize;

        Some(Self {
            letter,
            sharp,
            octave,
            text,
            len,
        })
    }

    pub fn letter(&self) -> char {
        self.letter
    }

    pub fn is_sharp(&self) -> bool {
        self.sharp
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.text[..self.len]).unwrap_or("")
    }
}

impl fmt::Display for NoteLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one block: a note, or nothing in the tuner's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    Note(NoteLabel),
    NoSignal,
}

impl Detection {
    /// The text handed to the display.
    pub fn text(&self) -> &str {
        match self {
            Detection::Note(label) => label.as_str(),
            Detection::NoSignal => NO_SIGNAL_MESSAGE,
        }
    }

    pub fn note(&self) -> Option<&NoteLabel> {
        match self {
            Detection::Note(label) => Some(label),
            Detection::NoSignal => None,
        }
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Nearest semitone above (positive) or below A4. Rounds half away from zero.
pub fn semitones_from_reference(frequency: f32) -> i32 {
    (12.0 * (frequency / REFERENCE_FREQUENCY).log2()).round() as i32
}

pub fn frequency_to_note(frequency: f32) -> Detection {
    // Also rejects NaN, which fails both comparisons.
    if !(MIN_FREQUENCY..=MAX_FREQUENCY).contains(&frequency) {
        return Detection::NoSignal;
    }

    let semitones = semitones_from_reference(frequency);
    let octave = ((semitones + OCTAVE_OFFSET) as f32 / 12.0).ceil() as i32;
    let class = semitones.rem_euclid(12) as usize;

    NoteLabel::new(NOTE_LETTERS[class], NOTE_SHARPS[class], octave)
        .map_or(Detection::NoSignal, Detection::Note)
}
