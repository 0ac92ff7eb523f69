pub mod buffer;
pub mod severity;
pub mod subscriber;

pub use buffer::{LogBuffer, LogEntry};
pub use severity::Severity;
pub use subscriber::{ConnectionState, LogSubscriber, PumpReport, Subscription};
