use std::io::{IsTerminal, Write};

use anstream::{AutoStream, ColorChoice};
use anstyle::Style;

use crate::ui::progress::{SilentActivity, SpinnerActivity};
use crate::ui::renderer::{Activity, Renderer, UiResult};
use crate::ui::table::render_table;
use crate::ui::theme::{is_ci_environment, resolve_color_enabled, OutputMode, Theme};
use crate::ui::widgets::{KeyValue, MessageBlock, NoticeLevel, ServiceCounts, TableSpec};

pub struct PlainRenderer<W: Write> {
    writer: W,
    color_enabled: bool,
    progress_enabled: bool,
    theme: Theme,
}

impl<W: Write> PlainRenderer<W> {
    pub fn new(writer: W, color_enabled: bool) -> Self {
        Self {
            writer,
            color_enabled,
            progress_enabled: false,
            theme: Theme::default(),
        }
    }

    pub fn with_progress_enabled(mut self, enabled: bool) -> Self {
        self.progress_enabled = enabled;
        self
    }

    pub fn color_enabled(&self) -> bool {
        self.color_enabled
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if !self.color_enabled {
            return text.to_owned();
        }
        format!("{}{}{}", style.render(), text, style.render_reset())
    }

    fn write_block(&mut self, label: &str, style: Style, block: &MessageBlock) -> UiResult<()> {
        let marker = self.paint(style, label);
        writeln!(self.writer, "{marker} {}", block.title)?;
        for line in block.body.lines() {
            writeln!(self.writer, "  {line}")?;
        }
        if let Some(hint) = &block.hint {
            let hint_label = self.paint(self.theme.muted, "hint");
            writeln!(self.writer, "  {hint_label}: {hint}")?;
        }
        Ok(())
    }
}

fn color_choice(mode: OutputMode) -> ColorChoice {
    match mode {
        OutputMode::Auto => ColorChoice::Auto,
        OutputMode::Always => ColorChoice::AlwaysAnsi,
        OutputMode::Never => ColorChoice::Never,
    }
}

impl PlainRenderer<AutoStream<std::io::Stdout>> {
    pub fn stdout(mode: OutputMode) -> Self {
        let stream = AutoStream::new(std::io::stdout(), color_choice(mode));
        let color_enabled = resolve_color_enabled(mode, std::io::stdout().is_terminal());
        Self::new(stream, color_enabled)
    }
}

impl PlainRenderer<AutoStream<std::io::Stderr>> {
    /// Stderr renderer; spinners animate only on an interactive, non-CI terminal.
    pub fn stderr(mode: OutputMode) -> Self {
        let stream = AutoStream::new(std::io::stderr(), color_choice(mode));
        let is_tty = std::io::stderr().is_terminal();
        let color_enabled = resolve_color_enabled(mode, is_tty);
        Self::new(stream, color_enabled).with_progress_enabled(is_tty && !is_ci_environment())
    }
}

impl<W: Write> Renderer for PlainRenderer<W> {
    fn text(&mut self, body: &str) -> UiResult<()> {
        if self.color_enabled {
            write!(self.writer, "{body}")?;
        } else {
            write!(self.writer, "{}", anstream::adapter::strip_str(body))?;
        }
        if !body.ends_with('\n') {
            writeln!(self.writer)?;
        }
        Ok(())
    }

    fn section(&mut self, title: &str) -> UiResult<()> {
        let rendered = self.paint(self.theme.accent, title);
        let underline = self.paint(self.theme.muted, &"─".repeat(title.chars().count()));
        writeln!(self.writer, "{rendered}")?;
        writeln!(self.writer, "{underline}")?;
        Ok(())
    }

    fn notice(&mut self, level: NoticeLevel, body: &str) -> UiResult<()> {
        let (label, style) = self.theme.level(level);
        let marker = self.paint(style, "•");
        let label = self.paint(self.theme.muted, label);
        writeln!(self.writer, "{marker} {label}: {body}")?;
        Ok(())
    }

    fn log_record(&mut self, clock: &str, level: NoticeLevel, message: &str) -> UiResult<()> {
        let (label, style) = self.theme.level(level);
        let clock = self.paint(self.theme.muted, clock);
        let label = self.paint(style, &format!("{label:<5}"));
        let message = if self.color_enabled {
            message.to_owned()
        } else {
            anstream::adapter::strip_str(message).to_string()
        };
        writeln!(self.writer, "{clock} {label} {message}")?;
        Ok(())
    }

    fn bullet_list(&mut self, title: &str, items: &[String]) -> UiResult<()> {
        writeln!(self.writer, "{title}:")?;
        if items.is_empty() {
            writeln!(self.writer, "- <none>")?;
            return Ok(());
        }
        for item in items {
            writeln!(self.writer, "- {item}")?;
        }
        Ok(())
    }

    fn error_block(&mut self, block: &MessageBlock) -> UiResult<()> {
        self.write_block("[error]", self.theme.error, block)
    }

    fn warning_block(&mut self, block: &MessageBlock) -> UiResult<()> {
        self.write_block("[warning]", self.theme.warning, block)
    }

    fn key_values(&mut self, items: &[KeyValue]) -> UiResult<()> {
        let width = items
            .iter()
            .map(|item| item.key.chars().count())
            .max()
            .unwrap_or(0);
        for item in items {
            let pad = " ".repeat(width - item.key.chars().count());
            let key = self.paint(self.theme.label, &item.key);
            let value = self.paint(self.theme.value, &item.value);
            writeln!(self.writer, "{key}:{pad} {value}")?;
        }
        Ok(())
    }

    fn service_counts(&mut self, counts: ServiceCounts) -> UiResult<()> {
        let running = self.paint(self.theme.success, &counts.running.to_string());
        let stopped = self.paint(self.theme.warning, &counts.stopped.to_string());
        let other = self.paint(self.theme.error, &counts.other.to_string());
        writeln!(
            self.writer,
            "{} services  running:{running}  stopped:{stopped}  other:{other}",
            counts.total()
        )?;
        Ok(())
    }

    fn table(&mut self, spec: &TableSpec) -> UiResult<()> {
        let rendered = render_table(spec);
        writeln!(self.writer, "{rendered}")?;
        Ok(())
    }

    fn activity(&mut self, label: &str) -> UiResult<Box<dyn Activity>> {
        if self.progress_enabled {
            return Ok(Box::new(SpinnerActivity::start(label)));
        }
        let marker = self.paint(self.theme.accent, "◌");
        writeln!(self.writer, "{marker} {label}")?;
        Ok(Box::new(SilentActivity))
    }
}
