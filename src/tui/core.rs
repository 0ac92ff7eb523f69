#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tab {
    Terminal,
    Logs,
}

impl Tab {
    pub(crate) const ALL: [Tab; 2] = [Tab::Terminal, Tab::Logs];

    pub(crate) fn index(self) -> usize {
        match self {
            Tab::Terminal => 0,
            Tab::Logs => 1,
        }
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub(crate) fn title(self) -> &'static str {
        match self {
            Tab::Terminal => "terminal",
            Tab::Logs => "logs",
        }
    }

    pub(crate) fn next(self) -> Self {
        Self::from_index(next_index(self.index(), Self::ALL.len()))
    }

    pub(crate) fn prev(self) -> Self {
        Self::from_index(prev_index(self.index(), Self::ALL.len()))
    }
}

/// Scroll position counted in lines above the newest line. `follow` pins
/// the view to the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScrollState {
    pub(crate) offset: usize,
    pub(crate) follow: bool,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            offset: 0,
            follow: true,
        }
    }
}

impl ScrollState {
    pub(crate) fn up(&mut self, lines: usize, max_offset: usize) {
        self.follow = false;
        self.offset = self.offset.saturating_add(lines).min(max_offset);
    }

    pub(crate) fn down(&mut self, lines: usize) {
        self.offset = self.offset.saturating_sub(lines);
        if self.offset == 0 {
            self.follow = true;
        }
    }

    pub(crate) fn top(&mut self, max_offset: usize) {
        self.follow = false;
        self.offset = max_offset;
    }

    pub(crate) fn bottom(&mut self) {
        self.follow = true;
        self.offset = 0;
    }

    /// Keeps a detached view on the same lines while new ones arrive below.
    pub(crate) fn shift(&mut self, appended: usize) {
        if !self.follow {
            self.offset = self.offset.saturating_add(appended);
        }
    }

    pub(crate) fn clamp(&mut self, max_offset: usize) {
        self.offset = if self.follow {
            0
        } else {
            self.offset.min(max_offset)
        };
    }
}

pub(crate) fn next_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (current + 1) % len
    }
}

pub(crate) fn prev_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else if current == 0 {
        len - 1
    } else {
        current - 1
    }
}
