//! Time-ordered string identifiers.
//!
//! An id is a fixed-width, zero-padded base-36 millisecond timestamp followed by
//! a random base-36 suffix taken from a v4 UUID. Fixed width keeps lexicographic
//! order equal to creation order. Within one process the time component never
//! goes backwards, even if the wall clock does or several ids are minted in the
//! same millisecond.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use uuid::Uuid;

const TIME_WIDTH: usize = 9;
const SUFFIX_WIDTH: usize = 10;

static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Generate a new unique id.
pub fn new_id() -> String {
    let millis = next_millis(&LAST_MILLIS, Utc::now().timestamp_millis());
    let random = Uuid::new_v4().as_u128();
    format!(
        "{}{}",
        to_base36(millis.max(0) as u128, TIME_WIDTH),
        to_base36(random, SUFFIX_WIDTH)
    )
}

/// Strictly increasing millisecond counter seeded from the wall clock.
fn next_millis(counter: &AtomicI64, now: i64) -> i64 {
    let mut last = counter.load(Ordering::Relaxed);
    loop {
        let next = if now > last { now } else { last + 1 };
        match counter.compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

/// Render the low digits of `value` in base 36, left-padded to `width`.
fn to_base36(mut value: u128, width: usize) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = vec![b'0'; width];
    for slot in out.iter_mut().rev() {
        *slot = DIGITS[(value % 36) as usize];
        value /= 36;
    }
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<String> = (0..5_000).map(|_| new_id()).collect();
        assert_eq!(ids.len(), 5_000);
    }

    #[test]
    fn test_ids_sort_in_creation_order() {
        let ids: Vec<String> = (0..500).map(|_| new_id()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_id_width_is_fixed() {
        let id = new_id();
        assert_eq!(id.len(), TIME_WIDTH + SUFFIX_WIDTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_base36_padding() {
        assert_eq!(to_base36(0, 4), "0000");
        assert_eq!(to_base36(35, 4), "000z");
        assert_eq!(to_base36(36, 4), "0010");
    }

    #[test]
    fn test_clock_going_backwards_still_increases() {
        let counter = AtomicI64::new(0);
        let a = next_millis(&counter, 1_000);
        let b = next_millis(&counter, 10);
        let c = next_millis(&counter, 10);
        assert_eq!(a, 1_000);
        assert_eq!(b, 1_001);
        assert_eq!(c, 1_002);
    }
}
