use crate::ui::widgets::{KeyValue, MessageBlock, NoticeLevel, ServiceCounts, TableSpec};

pub type UiResult<T> = Result<T, UiError>;

#[derive(Debug, thiserror::Error)]
pub enum UiError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A long-running request shown while the command waits on the network.
pub trait Activity {
    fn update(&self, message: &str);
    fn succeed(&self, message: &str);
    fn fail(&self, message: &str);
}

/// Line-oriented output for the one-shot commands.
pub trait Renderer {
    /// Writes `body` as-is; ANSI sequences are stripped when colour is off.
    fn text(&mut self, body: &str) -> UiResult<()>;
    fn section(&mut self, title: &str) -> UiResult<()>;
    fn notice(&mut self, level: NoticeLevel, body: &str) -> UiResult<()>;
    /// One log record: wall-clock stamp, padded level, message.
    fn log_record(&mut self, clock: &str, level: NoticeLevel, message: &str) -> UiResult<()>;
    fn bullet_list(&mut self, title: &str, items: &[String]) -> UiResult<()>;

    fn error_block(&mut self, block: &MessageBlock) -> UiResult<()>;
    fn warning_block(&mut self, block: &MessageBlock) -> UiResult<()>;

    fn key_values(&mut self, items: &[KeyValue]) -> UiResult<()>;
    fn service_counts(&mut self, counts: ServiceCounts) -> UiResult<()>;

    fn table(&mut self, spec: &TableSpec) -> UiResult<()>;
    fn activity(&mut self, label: &str) -> UiResult<Box<dyn Activity>>;
}
