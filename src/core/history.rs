use crate::domain::model::{HistoryEntry, RdapSummary};
use std::collections::VecDeque;

/// 最近的單筆查詢紀錄，新的在前
#[derive(Debug, Clone)]
pub struct SearchHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl SearchHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, query: &str, summary: &RdapSummary) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(HistoryEntry {
            ip: query.to_string(),
            rir: summary.rir.to_string(),
            timestamp: summary.timestamp.clone(),
        });
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Rir;

    fn summary(rir: Rir) -> RdapSummary {
        RdapSummary {
            rir,
            timestamp: "2024-05-01 10:00:00 UTC".to_string(),
            network_name: None,
            ip_range: None,
            cidr_blocks: None,
            organization: None,
            contacts: vec![],
            raw_data: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_newest_first_and_capped() {
        let mut history = SearchHistory::new(3);
        for i in 1..=5 {
            history.record(&format!("8.8.8.{}", i), &summary(Rir::Arin));
        }
        let ips: Vec<String> = history.entries().into_iter().map(|e| e.ip).collect();
        assert_eq!(ips, vec!["8.8.8.5", "8.8.8.4", "8.8.8.3"]);
    }

    #[test]
    fn test_clear() {
        let mut history = SearchHistory::default();
        history.record("193.0.6.139", &summary(Rir::Ripe));
        assert_eq!(history.entries()[0].rir, "RIPE");
        history.clear();
        assert!(history.is_empty());
    }
}
