//! Grouping of nearby markers into collapsible badges

use crate::bounds::PageBounds;
use serde::{Deserialize, Serialize};
use shared_types::Severity;
use std::collections::{BTreeMap, HashMap};

/// Markers shown as one badge with a count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    /// Final position of the topmost member; the badge is drawn here
    pub anchor_y: f64,
    /// Member keys, top to bottom
    pub members: Vec<String>,
    /// Most severe severity among the members, for the badge colour
    pub dominant_severity: Severity,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Positions of the members when the badge is expanded: a stack starting
    /// at the anchor, shifted up if it would run past the bottom of the band.
    /// Document positions are not recomputed.
    pub fn expanded_layout(&self, spacing: f64, bounds: PageBounds) -> Vec<(String, f64)> {
        let span = spacing * self.members.len().saturating_sub(1) as f64;
        let start = if self.anchor_y + span > bounds.bottom {
            (bounds.bottom - span).max(bounds.top)
        } else {
            bounds.clamp(self.anchor_y)
        };

        self.members
            .iter()
            .enumerate()
            .map(|(i, key)| (key.clone(), bounds.clamp(start + spacing * i as f64)))
            .collect()
    }
}

/// Group final positions into clusters. A marker joins the current cluster
/// while it is within `threshold` of the cluster's topmost member. Only
/// groups of two or more become clusters.
pub fn build_clusters(
    positions: &BTreeMap<String, f64>,
    severities: &HashMap<String, Severity>,
    threshold: f64,
) -> Vec<Cluster> {
    let mut ordered: Vec<(&String, f64)> = positions.iter().map(|(k, y)| (k, *y)).collect();
    ordered.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(b.0)));

    let mut groups: Vec<Vec<(&String, f64)>> = Vec::new();
    for entry in ordered {
        match groups.last_mut() {
            Some(group) if entry.1 - group[0].1 <= threshold => group.push(entry),
            _ => groups.push(vec![entry]),
        }
    }

    groups
        .into_iter()
        .filter(|group| group.len() > 1)
        .enumerate()
        .map(|(i, group)| {
            let dominant_severity = group
                .iter()
                .filter_map(|(key, _)| severities.get(*key).copied())
                .min()
                .unwrap_or(Severity::Info);
            Cluster {
                id: format!("cluster-{}", i),
                anchor_y: group[0].1,
                members: group.iter().map(|(key, _)| (*key).clone()).collect(),
                dominant_severity,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn positions(items: &[(&str, f64)]) -> BTreeMap<String, f64> {
        items.iter().map(|(k, y)| (k.to_string(), *y)).collect()
    }

    #[test]
    fn test_groups_close_markers() {
        let pos = positions(&[("a", 100.0), ("b", 128.0), ("c", 140.0), ("d", 400.0)]);
        let mut sev = HashMap::new();
        sev.insert("a".to_string(), Severity::Warning);
        sev.insert("b".to_string(), Severity::Critical);
        sev.insert("c".to_string(), Severity::Info);
        let clusters = build_clusters(&pos, &sev, 50.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members, vec!["a", "b", "c"]);
        assert_eq!(clusters[0].anchor_y, 100.0);
        assert_eq!(clusters[0].dominant_severity, Severity::Critical);
    }

    #[test]
    fn test_chain_does_not_grow_past_threshold() {
        let pos = positions(&[("a", 100.0), ("b", 140.0), ("c", 180.0), ("d", 220.0)]);
        let clusters = build_clusters(&pos, &HashMap::new(), 50.0);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members, vec!["a", "b"]);
        assert_eq!(clusters[1].members, vec!["c", "d"]);
    }

    #[test]
    fn test_singletons_are_not_clusters() {
        let pos = positions(&[("a", 100.0), ("b", 300.0)]);
        assert!(build_clusters(&pos, &HashMap::new(), 50.0).is_empty());
    }

    #[test]
    fn test_expanded_layout_stacks_members() {
        let cluster = Cluster {
            id: "cluster-0".to_string(),
            anchor_y: 100.0,
            members: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            dominant_severity: Severity::Error,
        };
        let layout = cluster.expanded_layout(22.0, PageBounds::new(800.0, 30.0, 30.0));
        assert_eq!(
            layout,
            vec![
                ("a".to_string(), 100.0),
                ("b".to_string(), 122.0),
                ("c".to_string(), 144.0)
            ]
        );
    }

    #[test]
    fn test_expanded_layout_shifts_up_at_bottom() {
        let cluster = Cluster {
            id: "cluster-0".to_string(),
            anchor_y: 760.0,
            members: vec!["a".to_string(), "b".to_string()],
            dominant_severity: Severity::Error,
        };
        let layout = cluster.expanded_layout(22.0, PageBounds::new(800.0, 30.0, 30.0));
        assert_eq!(layout[0].1, 748.0);
        assert_eq!(layout[1].1, 770.0);
    }
}
