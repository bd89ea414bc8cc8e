//! Per-level times and the best campaign total.

/// Holds the best completed-campaign total between campaigns.
pub trait BestTimeStore {
    fn load(&self) -> Option<f64>;
    fn save(&mut self, total: f64);
}

/// Keeps the best total for the lifetime of the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    best: Option<f64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_best(best: f64) -> Self {
        Self { best: Some(best) }
    }
}

impl BestTimeStore for MemoryStore {
    fn load(&self) -> Option<f64> {
        self.best
    }

    fn save(&mut self, total: f64) {
        self.best = Some(total);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CampaignSummary {
    pub total: f64,
    pub previous_best: Option<f64>,
    pub new_best: bool,
}

impl CampaignSummary {
    pub fn best(&self) -> f64 {
        match self.previous_best {
            Some(prev) if !self.new_best => prev,
            _ => self.total,
        }
    }
}

#[derive(Debug)]
pub struct TimingLedger<S> {
    times: Vec<f64>,
    store: S,
}

impl<S: BestTimeStore> TimingLedger<S> {
    pub fn new(store: S) -> Self {
        Self {
            times: Vec::new(),
            store,
        }
    }

    pub fn record(&mut self, seconds: f64) {
        self.times.push(seconds);
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn total(&self) -> f64 {
        self.times.iter().sum()
    }

    pub fn best(&self) -> Option<f64> {
        self.store.load()
    }

    /// Totals the campaign and stores it when it beats the previous best, or
    /// when there is none yet.
    pub fn finish(&mut self) -> CampaignSummary {
        let total = self.total();
        let previous_best = self.store.load();
        let new_best = previous_best.map_or(true, |best| total < best);
        if new_best {
            self.store.save(total);
        }
        CampaignSummary {
            total,
            previous_best,
            new_best,
        }
    }

    pub fn reset(&mut self) {
        self.times.clear();
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Lines for the history panel: the best total, one line per recorded
    /// level, and the campaign total once `campaign_len` levels are in.
    pub fn history(&self, campaign_len: usize) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.times.len() + 2);
        if let Some(best) = self.best() {
            lines.push(format!("Best Time: {best:.2} seconds"));
        }
        for (idx, time) in self.times.iter().enumerate() {
            lines.push(format!("Level {}: {time:.2} seconds", idx + 1));
        }
        if self.times.len() == campaign_len {
            lines.push(format!("Total Time: {:.2} seconds", self.total()));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_finish_always_sets_best() {
        let mut ledger = TimingLedger::new(MemoryStore::new());
        ledger.record(3.0);
        ledger.record(4.5);
        let summary = ledger.finish();
        assert_eq!(summary.total, 7.5);
        assert!(summary.new_best);
        assert_eq!(summary.previous_best, None);
        assert_eq!(ledger.best(), Some(7.5));
    }

    #[test]
    fn slower_campaign_keeps_previous_best() {
        let mut ledger = TimingLedger::new(MemoryStore::with_best(5.0));
        ledger.record(6.0);
        let summary = ledger.finish();
        assert!(!summary.new_best);
        assert_eq!(summary.best(), 5.0);
        assert_eq!(ledger.best(), Some(5.0));
    }

    #[test]
    fn faster_campaign_replaces_best() {
        let mut ledger = TimingLedger::new(MemoryStore::with_best(5.0));
        ledger.record(4.0);
        let summary = ledger.finish();
        assert!(summary.new_best);
        assert_eq!(summary.best(), 4.0);
        assert_eq!(ledger.best(), Some(4.0));
    }

    #[test]
    fn equal_total_is_not_an_improvement() {
        let mut ledger = TimingLedger::new(MemoryStore::with_best(5.0));
        ledger.record(5.0);
        assert!(!ledger.finish().new_best);
    }

    #[test]
    fn reset_clears_times_but_keeps_best() {
        let mut ledger = TimingLedger::new(MemoryStore::new());
        ledger.record(1.0);
        ledger.finish();
        ledger.reset();
        assert!(ledger.times().is_empty());
        assert_eq!(ledger.best(), Some(1.0));
    }

    #[test]
    fn history_lists_best_levels_and_total() {
        let mut ledger = TimingLedger::new(MemoryStore::with_best(9.999));
        ledger.record(1.234);
        ledger.record(2.0);
        assert_eq!(
            ledger.history(3),
            vec![
                "Best Time: 10.00 seconds".to_string(),
                "Level 1: 1.23 seconds".to_string(),
                "Level 2: 2.00 seconds".to_string(),
            ]
        );
        ledger.record(0.5);
        assert_eq!(
            ledger.history(3).last().map(String::as_str),
            Some("Total Time: 3.73 seconds")
        );
    }
}
