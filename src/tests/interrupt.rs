use crate::interrupt::ReceiveSignal;
use std::sync::Arc;
use std::thread;

#[test]
fn test_signal_initially_clear() {
    let signal = ReceiveSignal::new();

    assert!(!signal.is_pending());
    assert!(!signal.take());
}

#[test]
fn test_signal_take_clears() {
    let signal = ReceiveSignal::new();

    signal.on_interrupt();
    signal.on_interrupt();

    assert!(signal.is_pending());
    assert!(signal.take());
    assert!(!signal.take());
}

#[test]
fn test_signal_set_from_other_context() {
    let signal = Arc::new(ReceiveSignal::new());
    let handler = Arc::clone(&signal);

    thread::spawn(move || handler.on_interrupt()).join().unwrap();

    assert!(signal.take());
}

#[test]
fn test_signal_taken_once_by_concurrent_readers() {
    let signal = Arc::new(ReceiveSignal::new());
    signal.on_interrupt();

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let signal = Arc::clone(&signal);
            thread::spawn(move || signal.take())
        })
        .collect();

    let taken = readers.into_iter().map(|reader| reader.join().unwrap()).filter(|taken| *taken).count();
    assert_eq!(1, taken);
    assert!(!signal.is_pending());
}
