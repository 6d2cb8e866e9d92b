// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-dimensional clustering of riser coordinates along the primary axis.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Risers sharing one connector line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Snapped coordinate along the primary axis
    pub key: f64,
    /// Indices into the coordinate list, in ascending coordinate order
    pub members: SmallVec<[usize; 4]>,
}

/// Group coordinates lying within `tolerance` of their cluster key
///
/// Coordinates are visited in ascending order. A value joins the current
/// cluster while it lies less than `tolerance` above the cluster key, which
/// is the cluster's lowest member; otherwise it opens a new cluster. Members
/// are therefore never snapped further than `tolerance`, and successive keys
/// are at least `tolerance` apart. Clusters are returned in ascending key
/// order and every index appears in exactly one cluster.
pub fn cluster_positions(coords: &[f64], tolerance: f64) -> Vec<Cluster> {
    let mut order: Vec<usize> = (0..coords.len()).collect();
    order.sort_by(|&a, &b| coords[a].total_cmp(&coords[b]).then(a.cmp(&b)));

    let mut clusters: Vec<Cluster> = Vec::new();
    for index in order {
        let value = coords[index];
        match clusters.last_mut() {
            Some(cluster) if value - cluster.key < tolerance => cluster.members.push(index),
            _ => {
                let mut members = SmallVec::new();
                members.push(index);
                clusters.push(Cluster { key: value, members });
            }
        }
    }
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_close_values() {
        let clusters = cluster_positions(&[1.5, 1.0, 1.05], 0.1);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].key, 1.0);
        assert_eq!(clusters[0].members.as_slice(), &[1, 2]);
        assert_eq!(clusters[1].key, 1.5);
        assert_eq!(clusters[1].members.as_slice(), &[0]);
    }

    #[test]
    fn test_span_is_bounded_by_key_distance() {
        // every gap is below tolerance but the run is much longer
        let coords: Vec<f64> = (0..10).map(|i| 1.0 + 0.09 * i as f64).collect();
        let clusters = cluster_positions(&coords, 0.1);
        assert_eq!(clusters.len(), 5);
        for cluster in &clusters {
            assert_eq!(cluster.members.len(), 2);
            for &m in &cluster.members {
                assert!(coords[m] - cluster.key < 0.1);
            }
        }
        assert!(clusters.windows(2).all(|w| w[1].key - w[0].key >= 0.1));
    }

    #[test]
    fn test_every_index_once() {
        let coords = [3.0, 0.5, 3.02, 7.0, 0.55, 9.9];
        let clusters = cluster_positions(&coords, 0.1);
        let mut seen: Vec<usize> = clusters.iter().flat_map(|c| c.members.iter().copied()).collect();
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
        assert!(clusters.windows(2).all(|w| w[0].key < w[1].key));
    }

    #[test]
    fn test_empty() {
        assert!(cluster_positions(&[], 0.1).is_empty());
    }
}
