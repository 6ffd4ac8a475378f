use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use midiway_rt::{message_ring, OutputCycle, ShutdownHandshake};

#[test]
fn requested_close_suppresses_the_drain_for_one_cycle() {
    let (mut tx, rx) = message_ring(256);
    let shutdown = Arc::new(ShutdownHandshake::new());
    let mut cycle = OutputCycle::new(rx, Arc::clone(&shutdown));

    tx.push(&[1, 2, 3]).unwrap();

    // No callback is running, so the wait can only time out; the request
    // stays pending for the next cycle.
    assert!(!shutdown.request_and_wait(Duration::from_millis(0)));

    let mut drained = 0;
    cycle.run(|_| drained += 1);
    assert_eq!(drained, 0);
    assert_eq!(cycle.pending(), 1);

    cycle.run(|msg| {
        assert_eq!(msg, &[1, 2, 3]);
        drained += 1;
    });
    assert_eq!(drained, 1);
}

#[test]
fn close_handshake_survives_a_spinning_callback() {
    for _ in 0..50 {
        let (mut tx, rx) = message_ring(1024);
        let shutdown = Arc::new(ShutdownHandshake::new());
        let mut cycle = OutputCycle::new(rx, Arc::clone(&shutdown));

        let stop = Arc::new(AtomicBool::new(false));
        let bytes_out = Arc::new(AtomicUsize::new(0));
        let callback = thread::spawn({
            let stop = Arc::clone(&stop);
            let bytes_out = Arc::clone(&bytes_out);
            move || {
                while !stop.load(Ordering::Relaxed) {
                    cycle.run(|msg| {
                        bytes_out.fetch_add(msg.len(), Ordering::Relaxed);
                    });
                }
            }
        });

        for i in 0..64u8 {
            let _ = tx.push(&[i, 1, 2]);
        }

        // The spinning callback must acknowledge well within the timeout.
        assert!(shutdown.request_and_wait(Duration::from_secs(1)));

        stop.store(true, Ordering::Relaxed);
        callback.join().unwrap();
        assert_eq!(bytes_out.load(Ordering::Relaxed) % 3, 0);
    }
}
