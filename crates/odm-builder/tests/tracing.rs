//! Attachment routing is visible at trace level on both attach paths.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use odm_builder::{AnyElement, FormData, ItemData, ItemGroupData};
use tracing::Level;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_trace(run: impl FnOnce()) -> String {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, run);
    let bytes = captured.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn test_typed_attach_logs_container_and_child() {
    let logs = capture_trace(|| {
        let mut group = ItemGroupData::new();
        group.attach(ItemData::new("AGE", "40")).unwrap();
    });
    let line = logs
        .lines()
        .find(|line| line.contains("attaching element"))
        .unwrap();
    assert!(line.contains("ItemGroupData"));
    assert!(line.contains("ItemData"));
}

#[test]
fn test_dynamic_attach_logs_once_per_child() {
    let logs = capture_trace(|| {
        let mut form = AnyElement::from(FormData::new("DM"));
        form.attach(ItemGroupData::new()).unwrap();
    });
    assert_eq!(logs.matches("attaching element").count(), 1);
    assert!(logs.contains("FormData"));
}

#[test]
fn test_rejected_child_is_not_logged_as_attached() {
    let logs = capture_trace(|| {
        let mut form = AnyElement::from(FormData::new("DM"));
        assert!(form.attach(ItemData::new("AGE", "40")).is_err());
    });
    assert!(!logs.contains("attaching element"));
}
