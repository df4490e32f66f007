use serde::{Deserialize, Serialize};

/// Point-in-time view of a queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Tasks admitted but not yet completed.
    pub active: usize,
    pub capacity: usize,
    /// Entries currently held by the status table.
    pub tracked: usize,
    pub pending: usize,
    pub notifiers: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_serialize_with_field_names() {
        let stats = QueueStats {
            active: 1,
            capacity: 4,
            tracked: 2,
            pending: 1,
            notifiers: 0,
        };
        let v = serde_json::to_value(&stats).unwrap();
        assert_eq!(v["active"], 1);
        assert_eq!(v["capacity"], 4);
        assert_eq!(v["tracked"], 2);
    }
}
