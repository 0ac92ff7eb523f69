pub const ENTER: char = '\r';
pub const BACKSPACE: char = '\u{7f}';
pub const INTERRUPT: char = '\u{3}';

/// Visible side effect of feeding one key to the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    Echo(char),
    EraseColumn,
    Interrupted,
    /// The completed line, trimmed of surrounding whitespace.
    Submit(String),
}

/// Canonical-mode line discipline for the simulated shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditor {
    buffer: String,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    pub fn feed(&mut self, key: char) -> Option<EditorAction> {
        match key {
            ENTER => {
                let line = std::mem::take(&mut self.buffer);
                Some(EditorAction::Submit(line.trim().to_owned()))
            }
            BACKSPACE => self.buffer.pop().map(|_| EditorAction::EraseColumn),
            INTERRUPT => {
                self.buffer.clear();
                Some(EditorAction::Interrupted)
            }
            key if (key as u32) >= 32 => {
                self.buffer.push(key);
                Some(EditorAction::Echo(key))
            }
            _ => None,
        }
    }

    /// Feeds a chunk of input one character at a time, in order.
    pub fn feed_str(&mut self, data: &str) -> Vec<EditorAction> {
        data.chars().filter_map(|key| self.feed(key)).collect()
    }
}
