//! Keeps markers on one page at least `min_gap` apart
//!
//! Positions are placed greedily in ascending raw order (ties: more severe
//! first, then input order). A position that collides with an already placed
//! one is pushed down past it; when pushing down would cross the bottom of
//! the band it is pushed up instead. When neither direction has room but the
//! band can still hold every marker, the whole page is re-spaced in raw
//! order. Only a truly overcrowded page puts markers at the point farthest
//! from all placed ones, which may be closer than `min_gap`.

use crate::bounds::PageBounds;
use crate::config::EngineConfig;
use shared_types::{Severity, Violation};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

const EPSILON: f64 = 1e-9;

pub struct OverlapResolver {
    bounds: PageBounds,
    min_gap: f64,
}

impl OverlapResolver {
    pub fn new(page_height: f64, config: &EngineConfig) -> Self {
        Self {
            bounds: PageBounds::from_config(page_height, config),
            min_gap: config.min_gap,
        }
    }

    pub fn bounds(&self) -> PageBounds {
        self.bounds
    }

    /// Map each violation's key to a final `y`. `raw` holds the resolver's
    /// positions by key; violations without one are ignored, and a key seen
    /// twice is placed once.
    pub fn optimize(&self, violations: &[&Violation], raw: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
        let mut seen = HashSet::new();
        let mut order: Vec<(String, f64, Severity, usize)> = violations
            .iter()
            .enumerate()
            .filter_map(|(i, v)| {
                let key = v.key();
                let y = *raw.get(&key)?;
                seen.insert(key.clone()).then_some((key, y, v.severity, i))
            })
            .collect();

        order.sort_by(|a, b| {
            a.1.total_cmp(&b.1)
                .then(a.2.cmp(&b.2))
                .then(a.3.cmp(&b.3))
        });

        let mut placed: Vec<f64> = Vec::with_capacity(order.len());
        let mut result = BTreeMap::new();
        let mut crowded = false;
        for (key, y, _, _) in &order {
            let slot = match self.find_slot(*y, &placed) {
                Some(slot) => slot,
                None => {
                    crowded = true;
                    self.widest_gap(&placed).unwrap_or_else(|| self.bounds.clamp(*y))
                }
            };
            let at = placed.partition_point(|p| *p < slot);
            placed.insert(at, slot);
            result.insert(key.clone(), slot);
        }

        if crowded {
            if self.fits(order.len()) {
                let ys: Vec<f64> = order.iter().map(|(_, y, _, _)| *y).collect();
                return order
                    .into_iter()
                    .map(|(key, ..)| key)
                    .zip(self.pack(&ys))
                    .collect();
            }
            debug!(markers = order.len(), "page overcrowded, accepting overlap");
        }
        result
    }

    /// True when `n` markers can all sit `min_gap` apart inside the band
    fn fits(&self, n: usize) -> bool {
        n.saturating_sub(1) as f64 * self.min_gap <= self.bounds.height() + EPSILON
    }

    /// Space sorted raw positions at least `min_gap` apart: push down from
    /// the top, then pull back up from the bottom. Only valid when
    /// [`Self::fits`] holds.
    fn pack(&self, raw: &[f64]) -> Vec<f64> {
        let mut ys: Vec<f64> = raw.iter().map(|y| self.bounds.clamp(*y)).collect();
        for i in 1..ys.len() {
            ys[i] = ys[i].max(ys[i - 1] + self.min_gap);
        }
        let mut floor = self.bounds.bottom;
        for y in ys.iter_mut().rev() {
            *y = y.min(floor);
            floor = *y - self.min_gap;
        }
        ys.into_iter().map(|y| self.bounds.clamp(y)).collect()
    }

    fn conflicts<'p>(&self, y: f64, placed: &'p [f64]) -> impl Iterator<Item = f64> + 'p {
        let gap = self.min_gap - EPSILON;
        placed.iter().copied().filter(move |p| (y - p).abs() < gap)
    }

    /// Nearest free slot below, then above, the clamped `desired` position.
    /// `None` when neither direction has room.
    fn find_slot(&self, desired: f64, placed: &[f64]) -> Option<f64> {
        let start = self.bounds.clamp(desired);

        let mut candidate = start;
        loop {
            match self.conflicts(candidate, placed).reduce(f64::max) {
                None => return Some(candidate),
                Some(p) if p + self.min_gap <= self.bounds.bottom + EPSILON => {
                    candidate = (p + self.min_gap).min(self.bounds.bottom)
                }
                Some(_) => break,
            }
        }

        let mut candidate = start;
        loop {
            match self.conflicts(candidate, placed).reduce(f64::min) {
                None => return Some(candidate),
                Some(p) if p - self.min_gap >= self.bounds.top - EPSILON => {
                    candidate = (p - self.min_gap).max(self.bounds.top)
                }
                Some(_) => break,
            }
        }

        None
    }

    /// Point inside the band farthest from every placed marker. `placed`
    /// must be sorted.
    fn widest_gap(&self, placed: &[f64]) -> Option<f64> {
        let first = *placed.first()?;
        let last = *placed.last()?;

        let mut best = (self.bounds.top, first - self.bounds.top);
        for pair in placed.windows(2) {
            let half = (pair[1] - pair[0]) / 2.0;
            if half > best.1 {
                best = (pair[0] + half, half);
            }
        }
        if self.bounds.bottom - last > best.1 {
            best = (self.bounds.bottom, self.bounds.bottom - last);
        }
        Some(best.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use shared_types::Severity;

    fn violation(i: usize) -> Violation {
        Violation {
            id: i.to_string(),
            rule_type: "margin_top".to_string(),
            severity: Severity::Info,
            description: String::new(),
            expected_value: String::new(),
            actual_value: String::new(),
            position_in_doc: Some("Page 1".to_string()),
            context_text: None,
        }
    }

    proptest! {
        #[test]
        fn same_raw_y_spread_by_min_gap(
            page_height in 300.0f64..1500.0,
            raw_fraction in 0.0f64..1.0,
            n in 1usize..40,
        ) {
            let config = EngineConfig::default();
            let resolver = OverlapResolver::new(page_height, &config);
            let bounds = resolver.bounds();
            let capacity = (bounds.height() / config.min_gap).floor() as usize;
            let n = n.min(capacity.max(1));

            let vs: Vec<Violation> = (0..n).map(violation).collect();
            let refs: Vec<&Violation> = vs.iter().collect();
            let raw_y = bounds.top + raw_fraction * bounds.height();
            let raw: BTreeMap<String, f64> = vs.iter().map(|v| (v.key(), raw_y)).collect();

            let out = resolver.optimize(&refs, &raw);
            prop_assert_eq!(out.len(), n);

            let mut ys: Vec<f64> = out.values().copied().collect();
            ys.sort_by(f64::total_cmp);
            for y in &ys {
                prop_assert!(bounds.contains(*y));
            }
            for pair in ys.windows(2) {
                prop_assert!(pair[1] - pair[0] >= config.min_gap - 1e-6, "{:?}", ys);
            }
        }

        #[test]
        fn arbitrary_raw_y_separated_when_band_has_room(
            page_height in 100.0f64..1500.0,
            ys in prop::collection::vec(-100.0f64..1600.0, 1..40),
        ) {
            let config = EngineConfig::default();
            let resolver = OverlapResolver::new(page_height, &config);
            let bounds = resolver.bounds();
            let capacity = (bounds.height() / config.min_gap).floor() as usize + 1;
            let ys = &ys[..ys.len().min(capacity)];

            let vs: Vec<Violation> = (0..ys.len()).map(violation).collect();
            let refs: Vec<&Violation> = vs.iter().collect();
            let raw: BTreeMap<String, f64> =
                vs.iter().zip(ys).map(|(v, y)| (v.key(), *y)).collect();

            let out = resolver.optimize(&refs, &raw);
            prop_assert_eq!(out.len(), ys.len());
            let mut placed: Vec<f64> = out.values().copied().collect();
            placed.sort_by(f64::total_cmp);
            prop_assert!(placed.iter().all(|y| bounds.contains(*y)));
            for pair in placed.windows(2) {
                prop_assert!(pair[1] - pair[0] >= config.min_gap - 1e-6, "{:?}", placed);
            }
        }

        #[test]
        fn arbitrary_positions_stay_in_bounds(
            page_height in 50.0f64..1500.0,
            ys in prop::collection::vec(-100.0f64..2000.0, 0..60),
        ) {
            let config = EngineConfig::default();
            let resolver = OverlapResolver::new(page_height, &config);
            let vs: Vec<Violation> = (0..ys.len()).map(violation).collect();
            let refs: Vec<&Violation> = vs.iter().collect();
            let raw: BTreeMap<String, f64> =
                vs.iter().zip(&ys).map(|(v, y)| (v.key(), *y)).collect();

            let out = resolver.optimize(&refs, &raw);
            prop_assert_eq!(out.len(), ys.len());
            let bounds = resolver.bounds();
            prop_assert!(out.values().all(|y| bounds.contains(*y)));
        }
    }
}
