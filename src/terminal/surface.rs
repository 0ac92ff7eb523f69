use vt100::Parser as VtParser;

use super::fit::{fit_dimensions, ContainerSize, FontMetrics, MIN_COLS, MIN_ROWS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub rows: u16,
    pub cols: u16,
}

impl Dimensions {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows: rows.max(MIN_ROWS),
            cols: cols.max(MIN_COLS),
        }
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::new(24, 80)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Unopened,
    Open,
    Disposed,
}

/// Rows ready to draw plus the clamped scroll position they were taken at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceView {
    pub rows: Vec<String>,
    pub offset: usize,
    pub max_offset: usize,
}

/// ANSI-aware rendering grid backed by a vt100 parser.
pub struct TerminalSurface {
    parser: Option<VtParser>,
    dimensions: Dimensions,
    scrollback: usize,
    lifecycle: Lifecycle,
    pending_cr: bool,
}

impl TerminalSurface {
    pub fn new(dimensions: Dimensions, scrollback: usize) -> Self {
        Self {
            parser: None,
            dimensions,
            scrollback,
            lifecycle: Lifecycle::Unopened,
            pending_cr: false,
        }
    }

    /// Attaches the grid. Opening twice, or after dispose, does nothing.
    pub fn open(&mut self) {
        if self.lifecycle != Lifecycle::Unopened {
            return;
        }
        self.parser = Some(self.fresh_parser());
        self.lifecycle = Lifecycle::Open;
    }

    pub fn is_open(&self) -> bool {
        self.lifecycle == Lifecycle::Open
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Writes raw text at the cursor. A bare `\n` also returns the carriage.
    pub fn write(&mut self, text: &str) {
        let Some(parser) = self.parser.as_mut() else {
            return;
        };
        if text.is_empty() {
            return;
        }
        let mut bytes = Vec::with_capacity(text.len() + 8);
        let mut previous_cr = self.pending_cr;
        for byte in text.bytes() {
            if byte == b'\n' && !previous_cr {
                bytes.push(b'\r');
            }
            bytes.push(byte);
            previous_cr = byte == b'\r';
        }
        self.pending_cr = previous_cr;
        parser.process(&bytes);
    }

    pub fn write_line(&mut self, text: &str) {
        self.write(text);
        self.write("\r\n");
    }

    /// Drops scrollback and homes the cursor. Connection state is untouched.
    pub fn clear(&mut self) {
        if self.parser.is_none() {
            return;
        }
        self.parser = Some(self.fresh_parser());
        self.pending_cr = false;
    }

    pub fn resize(&mut self, dimensions: Dimensions) -> bool {
        if self.dimensions == dimensions {
            return false;
        }
        self.dimensions = dimensions;
        if let Some(parser) = self.parser.as_mut() {
            parser.set_size(dimensions.rows, dimensions.cols);
        }
        true
    }

    /// Recomputes the grid size from the container. Returns the new size
    /// when it changed.
    pub fn fit(&mut self, container: ContainerSize, metrics: FontMetrics) -> Option<Dimensions> {
        if self.lifecycle == Lifecycle::Disposed {
            return None;
        }
        let dimensions = fit_dimensions(container, metrics);
        self.resize(dimensions).then_some(dimensions)
    }

    /// Visible screen text without formatting.
    pub fn contents(&self) -> String {
        self.parser
            .as_ref()
            .map(|parser| parser.screen().contents())
            .unwrap_or_default()
    }

    pub fn cursor_position(&self) -> Option<(u16, u16)> {
        self.parser
            .as_ref()
            .map(|parser| parser.screen().cursor_position())
    }

    /// Formatted rows at `offset` lines above the bottom, or at the bottom
    /// when following.
    pub fn view(&mut self, offset: usize, follow: bool) -> SurfaceView {
        let rows = usize::from(self.dimensions.rows);
        let cols = self.dimensions.cols;
        let Some(parser) = self.parser.as_mut() else {
            return SurfaceView::default();
        };
        let max_offset = safe_max_scrollback(parser, rows);
        let offset = if follow { 0 } else { offset.min(max_offset) };
        parser.set_scrollback(offset);
        let rows = parser
            .screen()
            .rows_formatted(0, cols)
            .map(|row| String::from_utf8_lossy(&row).into_owned())
            .collect::<Vec<String>>();
        parser.set_scrollback(0);
        SurfaceView {
            rows,
            offset,
            max_offset,
        }
    }

    /// Releases the grid. Safe to call repeatedly or before `open`.
    pub fn dispose(&mut self) {
        self.parser = None;
        self.lifecycle = Lifecycle::Disposed;
    }

    fn fresh_parser(&self) -> VtParser {
        VtParser::new(self.dimensions.rows, self.dimensions.cols, self.scrollback)
    }
}

fn safe_max_scrollback(parser: &mut VtParser, visible_rows: usize) -> usize {
    let current = parser.screen().scrollback();
    parser.set_scrollback(usize::MAX);
    let max = parser.screen().scrollback();
    parser.set_scrollback(current);
    // vt100 0.15 panics once the scrollback offset passes the visible row count.
    max.min(visible_rows.max(1).saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn open_surface() -> TerminalSurface {
        let mut surface = TerminalSurface::new(Dimensions::new(6, 40), 100);
        surface.open();
        surface
    }

    #[test]
    fn bare_newline_returns_carriage() {
        let mut surface = open_surface();
        surface.write("one\ntwo");
        let contents = surface.contents();
        assert!(contents.starts_with("one\ntwo"), "{contents:?}");
    }

    #[test]
    fn write_line_moves_to_next_row() {
        let mut surface = open_surface();
        surface.write_line("first");
        surface.write("second");
        assert_eq!(surface.cursor_position(), Some((1, 6)));
    }

    #[test]
    fn clear_twice_equals_clear_once() {
        let mut surface = open_surface();
        surface.write_line("noise");
        surface.clear();
        let once = surface.contents();
        surface.clear();
        assert_eq!(surface.contents(), once);
        assert_eq!(surface.cursor_position(), Some((0, 0)));
    }

    #[test]
    fn writes_before_open_or_after_dispose_are_ignored() {
        let mut surface = TerminalSurface::new(Dimensions::default(), 10);
        surface.write("ignored");
        assert_eq!(surface.contents(), "");
        surface.open();
        surface.dispose();
        surface.dispose();
        surface.write("still ignored");
        assert!(!surface.is_open());
        assert_eq!(surface.contents(), "");
    }

    #[test]
    fn fit_resizes_only_on_change() {
        let mut surface = open_surface();
        let metrics = FontMetrics::default();
        assert_eq!(
            surface.fit(ContainerSize::new(100, 20), metrics),
            Some(Dimensions::new(20, 100))
        );
        assert_eq!(surface.fit(ContainerSize::new(100, 20), metrics), None);
    }

    #[test]
    fn view_clamps_overscroll_without_panicking() {
        let mut surface = open_surface();
        for i in 0..50 {
            surface.write_line(&format!("line-{i}"));
        }
        let view = surface.view(usize::MAX / 2, false);
        assert_eq!(view.offset, view.max_offset);
        assert_eq!(view.rows.len(), 6);
        let bottom = surface.view(3, true);
        assert_eq!(bottom.offset, 0);
    }
}
