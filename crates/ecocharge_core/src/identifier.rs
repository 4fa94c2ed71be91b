use crate::TerminalError;

/// Character class accepted by one segment of the vehicle identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Letters,
    Digits,
}

impl SegmentKind {
    fn accepts(&self, c: char) -> bool {
        match self {
            SegmentKind::Letters => c.is_ascii_uppercase(),
            SegmentKind::Digits => c.is_ascii_digit(),
        }
    }
}

/// Segment layout of a vehicle identifier: `AA-11-AA-1111`.
const SEGMENTS: [(SegmentKind, usize); 4] = [
    (SegmentKind::Letters, 2),
    (SegmentKind::Digits, 2),
    (SegmentKind::Letters, 2),
    (SegmentKind::Digits, 4),
];

/// Incremental, keypad-style editor for a segmented vehicle identifier.
///
/// Each segment has a fixed width and a character class. Keystrokes that
/// violate either are dropped without an error, mirroring physical keypad
/// behavior. Focus advances automatically when a segment fills and
/// retreats on backspace over an empty segment.
#[derive(Debug, Clone, Default)]
pub struct VehicleIdComposer {
    segments: [String; 4],
    focus: usize,
}

impl VehicleIdComposer {
    pub fn new() -> Self {
        VehicleIdComposer::default()
    }

    /// Index of the segment currently holding input focus (0..=3).
    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn segment(&self, index: usize) -> &str {
        &self.segments[index]
    }

    /// Replace the value of a segment with `raw`, upper-cased.
    ///
    /// The new value is stored only if every character matches the
    /// segment's class and it does not exceed the segment width;
    /// otherwise the keystroke is silently ignored. Exactly filling a
    /// segment moves focus to the next one.
    pub fn input(&mut self, index: usize, raw: &str) {
        let (kind, width) = SEGMENTS[index];
        let value = raw.to_ascii_uppercase();

        if value.len() > width || !value.chars().all(|c| kind.accepts(c)) {
            return;
        }

        let filled = value.len() == width;
        self.segments[index] = value;
        if filled && index + 1 < SEGMENTS.len() {
            self.focus = index + 1;
        }
    }

    /// Backspace pressed while the segment is already empty: move focus
    /// back to the previous segment so deletion flows across boundaries.
    pub fn backspace_at_empty(&mut self, index: usize) {
        if self.segments[index].is_empty() && index > 0 {
            self.focus = index - 1;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.segments
            .iter()
            .zip(SEGMENTS)
            .all(|(value, (_, width))| value.len() == width)
    }

    /// Join the four segments as `"AA-11-AA-1111"`.
    ///
    /// Only a fully filled identifier may be composed; anything short of
    /// that is an [`TerminalError::IncompleteIdentifier`].
    pub fn compose(&self) -> Result<String, TerminalError> {
        if !self.is_complete() {
            return Err(TerminalError::IncompleteIdentifier);
        }
        Ok(self.segments.join("-"))
    }

    /// Clear all segments and return focus to the first one.
    pub fn reset(&mut self) {
        for segment in &mut self.segments {
            segment.clear();
        }
        self.focus = 0;
    }
}
