use std::collections::VecDeque;

use super::types::Notice;

/// Most recent notices, oldest first, capped at a fixed capacity.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<Notice>,
    capacity: usize,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, notice: Notice) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(notice);
    }

    pub fn snapshot(&self) -> Vec<Notice> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_oldest_beyond_capacity() {
        let mut log = ActivityLog::new(2);
        for message in ["one", "two", "three"] {
            log.push(Notice::info(message));
        }

        let messages: Vec<_> = log.snapshot().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["two", "three"]);
    }
}
