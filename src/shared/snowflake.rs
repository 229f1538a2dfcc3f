//! Snowflake ID Generator
//!
//! Twitter-style unique ids for durable messages.

use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

const SEQUENCE_MASK: u64 = 0xFFF;

/// Snowflake ID generator
pub struct SnowflakeGenerator {
    machine_id: u64,
    node_id: u64,
    epoch: u64,
    // (last timestamp, sequence within that millisecond)
    state: Mutex<(u64, u64)>,
}

impl SnowflakeGenerator {
    /// Create a new snowflake generator counting from `epoch` (unix millis)
    pub fn new(machine_id: u64, node_id: u64, epoch: u64) -> Self {
        Self {
            machine_id: machine_id & 0x1F, // 5 bits
            node_id: node_id & 0x1F,       // 5 bits
            epoch,
            state: Mutex::new((0, 0)),
        }
    }

    /// Generate a new snowflake ID
    ///
    /// Ids are strictly increasing per generator; when the 12-bit sequence
    /// overflows inside one millisecond the clock is advanced logically.
    pub fn generate(&self) -> i64 {
        let mut state = self.state.lock();
        let now = current_millis().max(state.0);

        let (timestamp, sequence) = if now == state.0 {
            let next = (state.1 + 1) & SEQUENCE_MASK;
            if next == 0 {
                (now + 1, 0)
            } else {
                (now, next)
            }
        } else {
            (now, 0)
        };
        *state = (timestamp, sequence);

        let id = (timestamp.saturating_sub(self.epoch) << 22)
            | (self.machine_id << 17)
            | (self.node_id << 12)
            | sequence;

        id as i64
    }
}

fn current_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
