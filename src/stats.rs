//! Aggregation of probe runs into per-target means
//!
//! Collect-then-reduce: every completed run contributes the metric values of
//! its final hop to per-(address, metric) sample vectors, and the means are
//! computed once after the collection barrier. The divisor for a pair is the
//! number of samples actually collected, never the configured run count, so
//! failed runs cannot drag averages toward zero.

use crate::models::{RunOutcome, Stat};
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Collection phase: per-(address, metric) sample vectors
#[derive(Debug, Default)]
pub struct TraceAccumulator {
    samples: BTreeMap<Ipv4Addr, BTreeMap<Stat, Vec<f64>>>,
}

/// Reduction result: one rounded mean per (address, metric)
///
/// `BTreeMap` keys give the stable output ordering downstream: addresses
/// ascend numerically, metrics follow report column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceAggregate {
    records: BTreeMap<Ipv4Addr, BTreeMap<Stat, f64>>,
}

impl TraceAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one run outcome in
    ///
    /// Only the final matched hop of a completed run contributes, keyed by
    /// that hop's own address. Failures and runs whose report matched no
    /// rows contribute nothing.
    pub fn add(&mut self, outcome: &RunOutcome) {
        let hop = match outcome.completed().and_then(|result| result.target_hop()) {
            Some(hop) => hop,
            None => return,
        };

        let per_stat = self.samples.entry(hop.ip_addr).or_default();
        for (stat, value) in hop.stats() {
            per_stat.entry(stat).or_default().push(value);
        }
    }

    /// Fold a whole batch of outcomes in
    pub fn add_all<'a, I>(&mut self, outcomes: I)
    where
        I: IntoIterator<Item = &'a RunOutcome>,
    {
        for outcome in outcomes {
            self.add(outcome);
        }
    }

    /// Number of addresses with at least one sample
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether nothing has been collected
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Reduce every sample vector to its rounded arithmetic mean
    pub fn finish(self) -> TraceAggregate {
        let records = self
            .samples
            .into_iter()
            .map(|(addr, stats)| {
                let means = stats
                    .into_iter()
                    .map(|(stat, values)| {
                        let mean = values.iter().sum::<f64>() / values.len() as f64;
                        (stat, round_to_tenth(mean))
                    })
                    .collect();
                (addr, means)
            })
            .collect();

        TraceAggregate { records }
    }
}

impl TraceAggregate {
    /// Whether the aggregate holds no addresses at all
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of aggregated addresses
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Iterate addresses in ascending numeric order
    pub fn iter(&self) -> impl Iterator<Item = (&Ipv4Addr, &BTreeMap<Stat, f64>)> {
        self.records.iter()
    }

    /// Look up one mean
    pub fn get(&self, addr: Ipv4Addr, stat: Stat) -> Option<f64> {
        self.records.get(&addr).and_then(|stats| stats.get(&stat)).copied()
    }
}

/// Round half away from zero to one decimal place
fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
