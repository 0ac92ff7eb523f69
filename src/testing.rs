//! In-memory transports for driving sessions and subscribers without a
//! server. Events are queued by the test and delivered by `poll_event` in
//! order; closing a transport discards whatever is still queued.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::transport::{Connector, Endpoint, Transport, TransportEvent};

#[derive(Debug)]
struct Channel {
    endpoint: Endpoint,
    inbound: VecDeque<TransportEvent>,
    sent: Vec<String>,
    closed: bool,
}

/// Connector handing out scripted transports. Clones share the same record
/// of opened transports, so a test keeps one clone and gives the other away.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    opened: Rc<RefCell<Vec<Rc<RefCell<Channel>>>>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_count(&self) -> usize {
        self.opened.borrow().len()
    }

    /// Transports opened and not yet closed.
    pub fn live_count(&self) -> usize {
        self.opened
            .borrow()
            .iter()
            .filter(|channel| !channel.borrow().closed)
            .count()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.opened
            .borrow()
            .iter()
            .map(|channel| channel.borrow().endpoint.clone())
            .collect()
    }

    /// Queues `event` on the most recently opened transport.
    pub fn push(&self, event: TransportEvent) {
        let opened = self.opened.borrow();
        if let Some(channel) = opened.last() {
            channel.borrow_mut().inbound.push_back(event);
        }
    }

    pub fn push_to(&self, index: usize, event: TransportEvent) {
        if let Some(channel) = self.opened.borrow().get(index) {
            channel.borrow_mut().inbound.push_back(event);
        }
    }

    pub fn push_message(&self, raw: &str) {
        self.push(TransportEvent::Message(raw.to_owned()));
    }

    /// Frames the client sent on transport `index`.
    pub fn sent(&self, index: usize) -> Vec<String> {
        self.opened
            .borrow()
            .get(index)
            .map(|channel| channel.borrow().sent.clone())
            .unwrap_or_default()
    }

    pub fn is_closed(&self, index: usize) -> bool {
        self.opened
            .borrow()
            .get(index)
            .is_some_and(|channel| channel.borrow().closed)
    }
}

impl Connector for ScriptedConnector {
    fn open(&mut self, endpoint: &Endpoint) -> Box<dyn Transport> {
        let channel = Rc::new(RefCell::new(Channel {
            endpoint: endpoint.clone(),
            inbound: VecDeque::new(),
            sent: Vec::new(),
            closed: false,
        }));
        self.opened.borrow_mut().push(Rc::clone(&channel));
        Box::new(ScriptedTransport { channel })
    }
}

pub struct ScriptedTransport {
    channel: Rc<RefCell<Channel>>,
}

impl Transport for ScriptedTransport {
    fn send(&mut self, frame: String) {
        let mut channel = self.channel.borrow_mut();
        if !channel.closed {
            channel.sent.push(frame);
        }
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        let mut channel = self.channel.borrow_mut();
        if channel.closed {
            return None;
        }
        channel.inbound.pop_front()
    }

    fn close(&mut self) {
        let mut channel = self.channel.borrow_mut();
        channel.closed = true;
        channel.inbound.clear();
    }
}

#[cfg(test)]
#[path = "tests/testing_tests.rs"]
mod tests;
