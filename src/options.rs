//! # Mailbox Configuration
//!
//! [`MailboxOptions`] selects the mailbox strategy and sizes its buffer. It
//! derives `serde` traits with `#[serde(default)]`, so it can be embedded in an
//! application's config file and any omitted field falls back to its default.
//!
//! ```rust
//! use actor_mailbox::MailboxOptions;
//!
//! let unbounded = MailboxOptions::default().min_capacity(16);
//! let bounded = MailboxOptions::default().using_chan(true).capacity(8);
//! assert!(!unbounded.using_chan);
//! assert_eq!(bounded.capacity, 8);
//! ```

use serde::{Deserialize, Serialize};

/// Default initial capacity of a mailbox buffer.
pub const DEFAULT_CAPACITY: usize = 64;

/// Default capacity floor of a queue-backed mailbox.
pub const DEFAULT_MIN_CAPACITY: usize = 64;

/// Options recognized by [`Mailbox::new`](crate::Mailbox::new).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailboxOptions {
    /// Use a single bounded channel of `capacity` instead of the unbounded
    /// queue-backed mailbox. Senders wait once the channel is full.
    pub using_chan: bool,

    /// Fixed channel size (`using_chan`), or the queue's initial capacity.
    pub capacity: usize,

    /// Floor the queue never shrinks below. Ignored with `using_chan`.
    pub min_capacity: usize,
}

impl Default for MailboxOptions {
    fn default() -> Self {
        Self {
            using_chan: false,
            capacity: DEFAULT_CAPACITY,
            min_capacity: DEFAULT_MIN_CAPACITY,
        }
    }
}

impl MailboxOptions {
    pub fn using_chan(mut self, using_chan: bool) -> Self {
        self.using_chan = using_chan;
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn min_capacity(mut self, min_capacity: usize) -> Self {
        self.min_capacity = min_capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_queue_backed() {
        let options = MailboxOptions::default();
        assert!(!options.using_chan);
        assert_eq!(options.capacity, DEFAULT_CAPACITY);
        assert_eq!(options.min_capacity, DEFAULT_MIN_CAPACITY);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let options: MailboxOptions = serde_json::from_str(r#"{ "min_capacity": 2 }"#).unwrap();
        assert_eq!(
            options,
            MailboxOptions::default().min_capacity(2),
            "omitted fields fall back to defaults"
        );

        let options: MailboxOptions =
            serde_json::from_str(r#"{ "using_chan": true, "capacity": 3 }"#).unwrap();
        assert!(options.using_chan);
        assert_eq!(options.capacity, 3);
    }
}
