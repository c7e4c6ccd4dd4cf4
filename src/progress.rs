//! Progress reporting and per-pass statistics.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use log::debug;

/// Periodic progress ticker for long passes. Silent when the interval is 0.
pub struct Progress {
    interval: usize,
}

impl Progress {
    pub fn new(interval: usize) -> Self {
        Self { interval }
    }

    pub fn tick(&self, visited: usize, total: usize) {
        if self.interval != 0 && visited % self.interval == 0 {
            debug!("rewriting: {} / {} nodes", visited, total);
        }
    }
}

/// Accumulated score of one function class.
#[derive(Debug, Default, Copy, Clone)]
pub struct ClassScore {
    pub accepted: usize,
    pub gain: i64,
}

/// Statistics of one rewriting pass.
#[derive(Debug, Default)]
pub struct PassStats {
    pub nodes_begin: usize,
    pub nodes_end: usize,
    pub levels_begin: u32,
    pub levels_end: u32,
    /// AND nodes considered by the scheduler.
    pub visited: usize,
    pub accepted: usize,
    pub accepted_zero_gain: usize,
    pub gain_total: i64,
    pub skipped_persistent: usize,
    pub skipped_fanout: usize,
    /// Candidates whose commit was skipped because the realized cone closed
    /// over the target.
    pub rejected_cycles: usize,
    pub time_cuts: Duration,
    pub time_match: Duration,
    pub time_update: Duration,
    pub time_total: Duration,
    /// Per-class scores, populated only when detailed stats are requested.
    pub class_scores: Option<HashMap<u16, ClassScore>>,
}

impl PassStats {
    pub(crate) fn record_class(&mut self, class: u16, gain: i64) {
        if let Some(scores) = self.class_scores.as_mut() {
            let score = scores.entry(class).or_default();
            score.accepted += 1;
            score.gain += gain;
        }
    }
}

impl fmt::Display for PassStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "rewriting: {} -> {} nodes, {} -> {} levels, gain {}",
            self.nodes_begin, self.nodes_end, self.levels_begin, self.levels_end, self.gain_total
        )?;
        writeln!(
            f,
            "visited {} nodes, accepted {} substitutions ({} zero-gain), \
             skipped {} persistent / {} high-fanout, {} cyclic candidates",
            self.visited,
            self.accepted,
            self.accepted_zero_gain,
            self.skipped_persistent,
            self.skipped_fanout,
            self.rejected_cycles
        )?;
        write!(
            f,
            "time: cuts {:.2?}, matching {:.2?}, updates {:.2?}, total {:.2?}",
            self.time_cuts, self.time_match, self.time_update, self.time_total
        )?;
        if let Some(scores) = &self.class_scores {
            let mut classes: Vec<_> = scores.iter().collect();
            classes.sort_by_key(|(_, s)| std::cmp::Reverse(s.gain));
            for (class, score) in classes {
                write!(
                    f,
                    "\nclass {:#06x}: accepted {}, gain {}",
                    class, score.accepted, score.gain
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_totals() {
        let mut stats = PassStats {
            nodes_begin: 120,
            nodes_end: 100,
            gain_total: 20,
            ..Default::default()
        };
        stats.class_scores = Some(HashMap::new());
        stats.record_class(0x8888, 5);
        let text = stats.to_string();
        assert!(text.contains("120 -> 100 nodes"));
        assert!(text.contains("class 0x8888"));
    }

    #[test]
    fn test_record_class_is_inert_without_detailed_stats() {
        let mut stats = PassStats::default();
        stats.record_class(0x8888, 5);
        assert!(stats.class_scores.is_none());
    }
}
