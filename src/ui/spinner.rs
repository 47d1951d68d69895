const SPINNER_CHARS: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Braille spinner shown in the transcript border while a turn is pending.
#[derive(Debug, Clone, Default)]
pub struct Spinner {
    frame: usize,
}

impl Spinner {
    pub fn new() -> Self {
        Self::default()
    }

    // Advanced by the TUI tick, only while the Game Master is thinking.
    pub fn tick(&mut self) {
        self.frame = (self.frame + 1) % SPINNER_CHARS.len();
    }

    pub fn reset(&mut self) {
        self.frame = 0;
    }

    pub fn glyph(&self) -> char {
        SPINNER_CHARS[self.frame]
    }

    pub fn title(&self) -> String {
        format!(" Game Master is thinking {} ", self.glyph())
    }
}
