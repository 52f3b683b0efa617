//! Padding encoder: maps an attempt index to a rendered variant.
//!
//! The [`PaddingScheme::Lines`] encoding is mixed-radix with two levels:
//!
//! ```text
//! combs = 2^line_count
//! cycle = i mod combs        bit j set => line j is padded
//! level = i / combs + 1      spaces appended to every padded line
//! ```
//!
//! Once every bit pattern has been used at one padding depth, the depth
//! increases by one and the bit patterns start over, so the enumeration
//! never runs out. Every `i` maps to a distinct `(cycle, level)` pair, but
//! not to a distinct rendering: `cycle == 0` pads nothing, so every multiple
//! of `combs` renders the unpadded original.
//!
//! Padding is only ever appended at line ends, before the terminator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::CoreError;
use crate::types::{AttemptIndex, RenderedVariant};

/// The two coordinates an attempt index decomposes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinates {
    /// Bitmask of padded lines; bit 0 is the first line.
    pub cycle: u64,
    /// Number of spaces appended to each padded line.
    pub level: u64,
}

impl Coordinates {
    /// Decompose `attempt` against `document`'s combination count.
    ///
    /// Documents of 64 lines or more never wrap: the whole index is the
    /// bitmask and the level stays at 1.
    pub fn of(document: &Document, attempt: AttemptIndex) -> Self {
        match document.combination_count() {
            Some(combs) => Self {
                cycle: attempt % combs,
                level: (attempt / combs).saturating_add(1),
            },
            None => Self {
                cycle: attempt,
                level: 1,
            },
        }
    }

    /// Whether line `index` receives padding.
    pub fn is_padded(&self, index: usize) -> bool {
        u32::try_from(index)
            .ok()
            .and_then(|j| self.cycle.checked_shr(j))
            .map_or(false, |bits| bits & 1 == 1)
    }

    /// Number of lines selected by the bitmask.
    pub fn padded_lines(&self) -> u32 {
        self.cycle.count_ones()
    }
}

/// How an attempt index turns into whitespace padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaddingScheme {
    /// One bit per line, with a shared padding depth that grows each cycle.
    #[default]
    Lines,
    /// `i` spaces after the content of the last line.
    ///
    /// The spaces go before the last line's terminator rather than after
    /// it, so the output stays newline-terminated like every other
    /// rendering.
    ///
    /// Equivalent in reach to `Lines` on a one-line document, but visibly
    /// less natural on longer ones.
    Trailing,
}

impl PaddingScheme {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaddingScheme::Lines => "lines",
            PaddingScheme::Trailing => "trailing",
        }
    }

    /// Render `document` at `attempt`.
    ///
    /// Pure: the same document and index always give the same bytes.
    pub fn render(&self, document: &Document, attempt: AttemptIndex) -> RenderedVariant {
        match self {
            PaddingScheme::Lines => render_lines(document, attempt),
            PaddingScheme::Trailing => render_trailing(document, attempt),
        }
    }
}

impl fmt::Display for PaddingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaddingScheme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lines" => Ok(PaddingScheme::Lines),
            "trailing" => Ok(PaddingScheme::Trailing),
            other => Err(CoreError::UnknownScheme(other.to_string())),
        }
    }
}

fn render_lines(document: &Document, attempt: AttemptIndex) -> RenderedVariant {
    let coords = Coordinates::of(document, attempt);
    let level = coords.level as usize;
    let extra = coords.padded_lines() as usize * level;

    let mut out = String::with_capacity(document.byte_len() + extra);
    for (j, line) in document.lines().iter().enumerate() {
        out.push_str(line);
        if coords.is_padded(j) {
            push_spaces(&mut out, level);
        }
        out.push('\n');
    }
    RenderedVariant::new(out)
}

fn render_trailing(document: &Document, attempt: AttemptIndex) -> RenderedVariant {
    let spaces = attempt as usize;
    let mut out = String::with_capacity(document.byte_len() + spaces);
    let last = document.line_count().saturating_sub(1);
    for (j, line) in document.lines().iter().enumerate() {
        out.push_str(line);
        if j == last {
            push_spaces(&mut out, spaces);
        }
        out.push('\n');
    }
    if document.is_empty() {
        push_spaces(&mut out, spaces);
    }
    RenderedVariant::new(out)
}

fn push_spaces(out: &mut String, count: usize) {
    out.extend(std::iter::repeat(' ').take(count));
}
