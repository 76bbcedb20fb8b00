//! Bridge task loop tests

use core::time::Duration;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use rust_uart_console::bridge::{BridgeTask, InputHandler, EVENT_WAIT};
use rust_uart_console::error::ConsoleIoError;
use rust_uart_console::event::{EventSource, PortEvent};
use rust_uart_console::logging::{LogLevel, LogStream};

#[test]
fn test_data_ready_notifies_handler_once_per_event() {
    let log: LogStream = LogStream::new();
    let calls = Rc::new(RefCell::new(0));
    let events = ScriptedEvents::new(vec![
        Ok(Some(PortEvent::DataReady { len: 4 })),
        Ok(Some(PortEvent::DataReady { len: 1 })),
    ]);

    BridgeTask::new(events, CountingHandler::new(&calls), &log).run();

    assert_eq!(*calls.borrow(), 2);
}

#[test]
fn test_timeout_takes_no_action() {
    let log: LogStream = LogStream::new();
    let calls = Rc::new(RefCell::new(0));
    let events = ScriptedEvents::new(vec![
        Ok(None),
        Ok(None),
        Ok(Some(PortEvent::DataReady { len: 2 })),
    ]);

    BridgeTask::new(events, CountingHandler::new(&calls), &log).run();

    assert_eq!(*calls.borrow(), 1);
    // Timeouts leave no trace in the log either
    let entry = log.drain().unwrap();
    assert_eq!(entry.level, LogLevel::Error); // channel-loss exit only
    assert!(log.drain().is_none());
}

#[test]
fn test_unexpected_events_logged_and_dropped() {
    let log: LogStream = LogStream::new();
    let calls = Rc::new(RefCell::new(0));
    let events = ScriptedEvents::new(vec![
        Ok(Some(PortEvent::Break)),
        Ok(Some(PortEvent::FifoOverflow)),
        Ok(Some(PortEvent::Other(42))),
    ]);

    BridgeTask::new(events, CountingHandler::new(&calls), &log).run();

    assert_eq!(*calls.borrow(), 0);

    for _ in 0..3 {
        let entry = log.drain().unwrap();
        assert_eq!(entry.level, LogLevel::Warn);
        let msg = std::str::from_utf8(&entry.msg[..entry.len as usize]).unwrap();
        assert!(msg.contains("Unhandled UART event"), "got: {}", msg);
    }
}

#[test]
fn test_channel_loss_logged_once_then_exit() {
    let log: LogStream = LogStream::new();
    let calls = Rc::new(RefCell::new(0));
    let events = ScriptedEvents::new(vec![Err(ConsoleIoError::ChannelDown)]);

    // Returns instead of spinning
    BridgeTask::new(events, CountingHandler::new(&calls), &log).run();

    let entry = log.drain().unwrap();
    assert_eq!(entry.level, LogLevel::Error);
    let msg = std::str::from_utf8(&entry.msg[..entry.len as usize]).unwrap();
    assert!(msg.contains("Event channel lost"), "got: {}", msg);
    assert!(log.drain().is_none());
}

#[test]
fn test_handler_runs_synchronously_between_waits() {
    let log: LogStream = LogStream::new();
    let trace = Rc::new(RefCell::new(Vec::new()));
    let events = ScriptedEvents::new(vec![Ok(Some(PortEvent::DataReady { len: 1 }))])
        .trace(&trace);

    BridgeTask::new(events, TracingHandler { trace: Rc::clone(&trace) }, &log).run();

    // The handler completes before the task waits again
    assert_eq!(*trace.borrow(), vec!["wait", "handler", "wait"]);
}

#[test]
fn test_wait_uses_bounded_interval() {
    let log: LogStream = LogStream::new();
    let calls = Rc::new(RefCell::new(0));
    let events = ScriptedEvents::new(vec![]).expect_timeout(EVENT_WAIT);

    BridgeTask::new(events, CountingHandler::new(&calls), &log).run();

    assert_eq!(EVENT_WAIT, Duration::from_millis(200));
}

// Scripted event source: replays a fixed sequence, then reports the
// channel gone so `run` terminates.
struct ScriptedEvents {
    script: RefCell<VecDeque<Result<Option<PortEvent>, ConsoleIoError>>>,
    trace: Option<Rc<RefCell<Vec<&'static str>>>>,
    expected_timeout: Option<Duration>,
}

impl ScriptedEvents {
    fn new(script: Vec<Result<Option<PortEvent>, ConsoleIoError>>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            trace: None,
            expected_timeout: None,
        }
    }

    fn trace(mut self, trace: &Rc<RefCell<Vec<&'static str>>>) -> Self {
        self.trace = Some(Rc::clone(trace));
        self
    }

    fn expect_timeout(mut self, timeout: Duration) -> Self {
        self.expected_timeout = Some(timeout);
        self
    }

    fn next(&self) -> Result<Option<PortEvent>, ConsoleIoError> {
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(ConsoleIoError::ChannelDown))
    }
}

impl EventSource for ScriptedEvents {
    fn wait(&self, timeout: Duration) -> Result<Option<PortEvent>, ConsoleIoError> {
        if let Some(expected) = self.expected_timeout {
            assert_eq!(timeout, expected);
        }
        if let Some(trace) = &self.trace {
            trace.borrow_mut().push("wait");
        }
        self.next()
    }
}

struct CountingHandler {
    calls: Rc<RefCell<usize>>,
}

impl CountingHandler {
    fn new(calls: &Rc<RefCell<usize>>) -> Self {
        Self {
            calls: Rc::clone(calls),
        }
    }
}

impl InputHandler for CountingHandler {
    fn on_data_ready(&mut self) {
        *self.calls.borrow_mut() += 1;
    }
}

struct TracingHandler {
    trace: Rc<RefCell<Vec<&'static str>>>,
}

impl InputHandler for TracingHandler {
    fn on_data_ready(&mut self) {
        self.trace.borrow_mut().push("handler");
    }
}
