use std::collections::VecDeque;

use chrono::{DateTime, Local};

use super::severity::Severity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: u64,
    pub message: String,
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
}

impl LogEntry {
    pub fn clock(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

/// Arrival-ordered records for the selected service, oldest evicted first
/// once `capacity` is reached. Ids keep counting across clears.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_id: u64,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            next_id: 1,
        }
    }

    pub fn push(&mut self, message: String, timestamp: DateTime<Local>) -> &LogEntry {
        let entry = LogEntry {
            id: self.next_id,
            severity: Severity::classify(&message),
            message,
            timestamp,
        };
        self.next_id += 1;
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        self.entries.iter()
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ids_are_monotonic_across_clear() {
        let mut buffer = LogBuffer::new(10);
        let first = buffer.push("a".to_owned(), Local::now()).id;
        buffer.clear();
        let second = buffer.push("b".to_owned(), Local::now()).id;
        assert!(second > first);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut buffer = LogBuffer::new(2);
        for message in ["one", "two", "three"] {
            buffer.push(message.to_owned(), Local::now());
        }
        let kept = buffer
            .iter()
            .map(|entry| entry.message.as_str())
            .collect::<Vec<&str>>();
        assert_eq!(kept, vec!["two", "three"]);
    }

    #[test]
    fn push_classifies_severity() {
        let mut buffer = LogBuffer::new(4);
        assert_eq!(
            buffer.push("ERROR: boom".to_owned(), Local::now()).severity,
            Severity::Error
        );
        buffer.push("ok".to_owned(), Local::now());
        let severities = buffer
            .iter()
            .map(|entry| entry.severity)
            .collect::<Vec<Severity>>();
        assert_eq!(severities, vec![Severity::Error, Severity::Info]);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut buffer = LogBuffer::new(4);
        buffer.push("x".to_owned(), Local::now());
        buffer.clear();
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
