use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Bounded idempotency cache over recent message ids. The webhook source
/// delivers at-least-once, so a repeated id means a retried delivery, not a
/// new message.
pub struct SeenMessages {
    ttl: Duration,
    capacity: usize,
    inner: Mutex<HashMap<String, Instant>>,
}

impl SeenMessages {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Records the id and reports whether this is its first sighting within
    /// the TTL window. Expired entries are pruned on the way in; when full,
    /// the oldest entry is evicted.
    pub fn first_sighting(&self, message_id: &str) -> bool {
        let now = Instant::now();
        let mut seen = match self.inner.lock() {
            Ok(guard) => guard,
            // A poisoned lock only means a panicked test thread; the map
            // itself is still usable.
            Err(poisoned) => poisoned.into_inner(),
        };

        seen.retain(|_, stamp| now.duration_since(*stamp) < self.ttl);

        if seen.contains_key(message_id) {
            return false;
        }

        if seen.len() >= self.capacity {
            if let Some(oldest) = seen
                .iter()
                .min_by_key(|(_, stamp)| **stamp)
                .map(|(id, _)| id.clone())
            {
                seen.remove(&oldest);
            }
        }

        seen.insert(message_id.to_string(), now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sighting_then_duplicate() {
        let seen = SeenMessages::new(Duration::from_secs(60), 16);
        assert!(seen.first_sighting("wamid.1"));
        assert!(!seen.first_sighting("wamid.1"));
        assert!(seen.first_sighting("wamid.2"));
    }

    #[test]
    fn test_expired_id_is_new_again() {
        let seen = SeenMessages::new(Duration::from_millis(10), 16);
        assert!(seen.first_sighting("wamid.1"));
        std::thread::sleep(Duration::from_millis(20));
        assert!(seen.first_sighting("wamid.1"));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let seen = SeenMessages::new(Duration::from_secs(60), 2);
        assert!(seen.first_sighting("a"));
        std::thread::sleep(Duration::from_millis(2));
        assert!(seen.first_sighting("b"));
        std::thread::sleep(Duration::from_millis(2));
        assert!(seen.first_sighting("c"));
        // "a" was the oldest and got evicted, so it reads as new.
        assert!(seen.first_sighting("a"));
        // "c" is still tracked.
        assert!(!seen.first_sighting("c"));
    }
}
