//! Trail assembly: merging per-file crumb sequences into the grouped
//! document handed to the renderers.
//!
//! A trail is "main" once any of its crumbs is found in the entry-point
//! file, no matter how late in the file order that happens; everything else
//! stays a side trail. Standalone remarks are collected flat.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::scanner::Crumb;

/// The grouped document model. Trail names are unique across main and side
/// trails combined; promotion removes the side entry.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GroupedCrumbs {
    pub main_trails: BTreeMap<String, Vec<Crumb>>,
    pub side_trails: BTreeMap<String, Vec<Crumb>>,
    pub remarks: Vec<Crumb>,
}

impl GroupedCrumbs {
    /// Total number of crumbs across all three collections.
    pub fn total(&self) -> usize {
        self.main_trails.values().map(Vec::len).sum::<usize>()
            + self.side_trails.values().map(Vec::len).sum::<usize>()
            + self.remarks.len()
    }
}

/// Merge per-file crumb sequences, in the given file order, into the
/// grouped document.
///
/// The caller must supply a deterministic file order; the promotion rule is
/// order-sensitive when a trail spans multiple files. An empty entry point
/// means no trail is ever promoted.
pub fn regroup(entry_point: &str, crumbs_per_file: Vec<Vec<Crumb>>) -> GroupedCrumbs {
    let mut grouped = GroupedCrumbs::default();

    for crumbs in crumbs_per_file {
        for crumb in crumbs {
            if !crumb.is_trail() {
                grouped.remarks.push(crumb);
                continue;
            }
            if let Some(trail) = grouped.main_trails.get_mut(&crumb.trail_id) {
                // Already promoted.
                trail.push(crumb);
            } else if !entry_point.is_empty() && crumb.source_path.ends_with(entry_point) {
                // Promote: the accumulated side trail, if any, moves over.
                let mut trail = grouped
                    .side_trails
                    .remove(&crumb.trail_id)
                    .unwrap_or_default();
                let trail_id = crumb.trail_id.clone();
                trail.push(crumb);
                grouped.main_trails.insert(trail_id, trail);
            } else {
                grouped
                    .side_trails
                    .entry(crumb.trail_id.clone())
                    .or_default()
                    .push(crumb);
            }
        }
    }

    for trail in grouped.main_trails.values_mut() {
        trail.sort_by_key(|crumb| crumb.trail_step);
    }
    for trail in grouped.side_trails.values_mut() {
        trail.sort_by_key(|crumb| crumb.trail_step);
    }
    // Two-key lexicographic order: path first, then line.
    grouped.remarks.sort_by(|a, b| {
        a.source_path
            .cmp(&b.source_path)
            .then(a.source_line.cmp(&b.source_line))
    });

    grouped
}
