//! HDBSCAN: Hierarchical Density-Based Spatial Clustering of Applications with Noise.
//!
//! HDBSCAN (Campello, Moulavi, Sander 2013) removes DBSCAN's global epsilon
//! parameter by building a hierarchy of density-based clusters and extracting
//! the best ones from it. This implementation provides the two extraction
//! strategies the topic pipeline uses:
//!
//! - **Leaf**: take the leaves of the condensed cluster tree — many small,
//!   homogeneous clusters. The default for topic discovery, where fine-grained
//!   themes beat broad blobs.
//! - **Excess of mass**: maximize total stability over the tree — fewer,
//!   larger clusters.
//!
//! # Algorithm Outline
//!
//! 1. **Core distance**: for each point, the distance to its k-th nearest
//!    neighbor (k = `min_samples`). Estimates local density.
//! 2. **Mutual reachability**: `mrd(i, j) = max(core_i, core_j, dist(i, j))`.
//! 3. **MST** over the mutual reachability graph (exact Prim, O(n^2)).
//! 4. **Condensed tree**: walk MST edges in ascending order, merging
//!    components; components below `min_cluster_size` fall out as noise
//!    instead of forming a split.
//! 5. **Extraction** per the configured [`SelectionMethod`].
//! 6. Points in no selected cluster are labeled [`NOISE`].
//!
//! The fit also reports per-cluster **exemplars**: the points of each leaf
//! that persisted to the leaf's highest density level. These are the terms a
//! reader would recognize as "what this topic is about".
//!
//! O(n^2) time and space; fine for term tables in the hundreds-to-thousands
//! range this pipeline works at.

use tracing::debug;

use super::util::{self, UnionFind};
use crate::error::{ClusterError, Result};

/// Label assigned to points that belong to no cluster.
pub const NOISE: i32 = -1;

/// How clusters are extracted from the condensed tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMethod {
    /// Select the leaves of the condensed tree.
    Leaf,
    /// Select the non-overlapping set of clusters maximizing total stability.
    ExcessOfMass,
}

/// HDBSCAN clusterer.
#[derive(Debug, Clone)]
pub struct Hdbscan {
    min_cluster_size: usize,
    min_samples: usize,
    selection_method: SelectionMethod,
}

/// The result of a fit: one label per input point, plus the exemplar point
/// vectors of each cluster (indexed by cluster label).
#[derive(Debug, Clone)]
pub struct HdbscanFit {
    /// Cluster label per point, `0..=label_max`, with [`NOISE`] for outliers.
    pub labels: Vec<i32>,
    /// For each cluster label, the vectors of its most representative points.
    pub exemplars: Vec<Vec<Vec<f32>>>,
}

impl HdbscanFit {
    /// Highest cluster label, or [`NOISE`] when every point is an outlier.
    pub fn label_max(&self) -> i32 {
        self.labels.iter().copied().filter(|&l| l != NOISE).max().unwrap_or(NOISE)
    }
}

impl Hdbscan {
    /// Create a clusterer with the given density parameters and leaf
    /// extraction (the pipeline default).
    pub fn new(min_cluster_size: usize, min_samples: usize) -> Self {
        Self {
            min_cluster_size,
            min_samples,
            selection_method: SelectionMethod::Leaf,
        }
    }

    /// Override the cluster extraction strategy.
    pub fn with_selection_method(mut self, method: SelectionMethod) -> Self {
        self.selection_method = method;
        self
    }

    /// Cluster the point set, returning labels and per-cluster exemplars.
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<HdbscanFit> {
        let n = data.len();
        if n == 0 {
            return Err(ClusterError::EmptyInput);
        }

        if self.min_samples == 0 {
            return Err(ClusterError::InvalidParameter {
                name: "min_samples",
                message: "must be at least 1",
            });
        }

        if self.min_cluster_size < 2 {
            return Err(ClusterError::InvalidParameter {
                name: "min_cluster_size",
                message: "must be at least 2",
            });
        }

        let d = data[0].len();
        if d == 0 {
            return Err(ClusterError::InvalidParameter {
                name: "dimension",
                message: "must be at least 1",
            });
        }
        for point in data.iter().skip(1) {
            if point.len() != d {
                return Err(ClusterError::DimensionMismatch {
                    expected: d,
                    found: point.len(),
                });
            }
        }

        if n == 1 {
            return Ok(HdbscanFit {
                labels: vec![NOISE],
                exemplars: Vec::new(),
            });
        }

        let dists = pairwise_distances(data);
        let core_dists = core_distances(&dists, n, self.min_samples);

        let mut mst = util::prim_mst(n, |i, j| {
            mutual_reachability(dists[i * n + j], core_dists[i], core_dists[j])
        });
        mst.sort_by(|a, b| a.2.total_cmp(&b.2));

        let tree = CondensedTree::build(&mst, n, self.min_cluster_size);
        if tree.num_clusters == 0 {
            return Ok(HdbscanFit {
                labels: vec![NOISE; n],
                exemplars: Vec::new(),
            });
        }

        let stats = tree.cluster_stats();
        let selected = tree.select(&stats, self.selection_method);
        let labels = tree.assign_labels(&selected);
        let exemplars = tree.collect_exemplars(&stats, &selected, data);

        debug!(
            points = n,
            clusters = exemplars.len(),
            method = ?self.selection_method,
            "clustering fit complete"
        );

        Ok(HdbscanFit { labels, exemplars })
    }
}

fn pairwise_distances(data: &[Vec<f32>]) -> Vec<f64> {
    let n = data.len();
    let mut dists = vec![0.0f64; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = util::euclidean(&data[i], &data[j]);
            dists[i * n + j] = d;
            dists[j * n + i] = d;
        }
    }
    dists
}

fn core_distances(dists: &[f64], n: usize, min_samples: usize) -> Vec<f64> {
    let k = min_samples.min(n - 1).max(1);
    let mut core = Vec::with_capacity(n);
    for i in 0..n {
        let mut row: Vec<f64> = (0..n)
            .filter(|&j| j != i)
            .map(|j| dists[i * n + j])
            .collect();
        row.sort_by(|a, b| a.total_cmp(b));
        core.push(row[k - 1]);
    }
    core
}

#[inline]
fn mutual_reachability(dist: f64, core_i: f64, core_j: f64) -> f64 {
    dist.max(core_i).max(core_j)
}

// ---------------------------------------------------------------------------
// Condensed cluster tree
// ---------------------------------------------------------------------------

/// An entry in the condensed cluster tree stored as a flat table.
///
/// Each row represents either a point joining/leaving a cluster (child is a
/// point index, `child_size == 1`) or a cluster splitting into a child
/// cluster (child is a cluster id, `child_size > 1`).
struct CondensedEdge {
    parent: usize, // cluster id (offset by n)
    child: usize,  // point index or cluster id
    lambda: f64,   // 1/distance at which this happened
    child_size: usize,
}

struct CondensedTree {
    edges: Vec<CondensedEdge>,
    num_clusters: usize,
    n_points: usize,
}

impl CondensedTree {
    /// Walk MST edges in ascending distance order, condensing merges into a
    /// flat cluster tree. Cluster ids start at `n` (points are `0..n`).
    fn build(mst: &[(usize, usize, f64)], n: usize, min_cluster_size: usize) -> Self {
        let mut next_cluster_id = n;
        let mut uf = UnionFind::new(n);
        // UF root -> current cluster id (None until a cluster forms).
        let mut component_cluster: Vec<Option<usize>> = vec![None; n];
        let mut edges: Vec<CondensedEdge> = Vec::new();

        for &(u, v, dist) in mst {
            let ru = uf.find(u);
            let rv = uf.find(v);
            if ru == rv {
                continue;
            }

            let lambda = if dist > 0.0 { 1.0 / dist } else { f64::INFINITY };
            let ru_size = uf.size[ru];
            let rv_size = uf.size[rv];

            let left_big = ru_size >= min_cluster_size;
            let right_big = rv_size >= min_cluster_size;

            if left_big && right_big {
                // Genuine split: both sides are large. Create a new parent cluster.
                let new_cluster = next_cluster_id;
                next_cluster_id += 1;

                let left_child = component_cluster[ru].unwrap_or_else(|| {
                    let id = next_cluster_id;
                    next_cluster_id += 1;
                    id
                });
                let right_child = component_cluster[rv].unwrap_or_else(|| {
                    let id = next_cluster_id;
                    next_cluster_id += 1;
                    id
                });

                edges.push(CondensedEdge {
                    parent: new_cluster,
                    child: left_child,
                    lambda,
                    child_size: ru_size,
                });
                edges.push(CondensedEdge {
                    parent: new_cluster,
                    child: right_child,
                    lambda,
                    child_size: rv_size,
                });

                // Sides with no prior cluster have all their points born into
                // the fresh child at this level.
                if component_cluster[ru].is_none() {
                    record_component_points(&mut edges, &uf, ru, left_child, lambda, n);
                }
                if component_cluster[rv].is_none() {
                    record_component_points(&mut edges, &uf, rv, right_child, lambda, n);
                }

                let new_root = uf.union_roots(ru, rv);
                component_cluster[new_root] = Some(new_cluster);
            } else if left_big || right_big {
                let (big, small) = if left_big { (ru, rv) } else { (rv, ru) };

                // Ensure the big side has a cluster.
                let cluster = component_cluster[big].unwrap_or_else(|| {
                    let id = next_cluster_id;
                    next_cluster_id += 1;
                    record_component_points(&mut edges, &uf, big, id, lambda, n);
                    id
                });

                // Small side's points fall out into it.
                record_component_points(&mut edges, &uf, small, cluster, lambda, n);

                let new_root = uf.union_roots(big, small);
                component_cluster[new_root] = Some(cluster);
            } else {
                // Neither side is large. Merge without a cluster event.
                let existing = component_cluster[ru].or(component_cluster[rv]);
                let new_root = uf.union_roots(ru, rv);
                component_cluster[new_root] = existing;
            }
        }

        Self {
            edges,
            num_clusters: next_cluster_id - n,
            n_points: n,
        }
    }

    /// Per-cluster birth level, stability, leaf flag, and child lists.
    fn cluster_stats(&self) -> ClusterStats {
        let n = self.n_points;
        let m = self.num_clusters;

        // A cluster is "born" when it first appears as a child; the root
        // (never a child) is born at lambda = 0.
        let mut lambda_birth = vec![0.0f64; m];
        for edge in &self.edges {
            if edge.child_size > 1 && edge.child >= n {
                lambda_birth[edge.child - n] = edge.lambda;
            }
        }

        // stability(c) = sum over condensed edges with parent c of
        // child_size * (lambda - lambda_birth(c)).
        let mut stability = vec![0.0f64; m];
        let mut has_cluster_child = vec![false; m];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); m];

        for edge in &self.edges {
            if edge.parent < n {
                continue;
            }
            let parent_idx = edge.parent - n;
            let birth = lambda_birth[parent_idx];
            stability[parent_idx] += edge.child_size as f64 * (edge.lambda - birth);

            if edge.child_size > 1 && edge.child >= n {
                has_cluster_child[parent_idx] = true;
                children[parent_idx].push(edge.child - n);
            }
        }

        ClusterStats {
            stability,
            has_cluster_child,
            children,
        }
    }

    /// Decide which clusters survive extraction.
    fn select(&self, stats: &ClusterStats, method: SelectionMethod) -> Vec<bool> {
        match method {
            // Leaves of the condensed tree, nothing else.
            SelectionMethod::Leaf => stats
                .has_cluster_child
                .iter()
                .map(|&internal| !internal)
                .collect(),
            SelectionMethod::ExcessOfMass => self.select_excess_of_mass(stats),
        }
    }

    /// Bottom-up stability selection: a parent supplants its children when its
    /// own stability exceeds their combined subtree stability.
    fn select_excess_of_mass(&self, stats: &ClusterStats) -> Vec<bool> {
        let m = self.num_clusters;
        let mut selected = vec![false; m];
        let mut subtree_stab = stats.stability.clone();

        // Cluster ids don't follow tree depth (a parent is allocated before
        // its fresh children but after pre-existing ones), so walk the forest
        // in explicit post-order: every child resolves before its parent.
        let mut is_child = vec![false; m];
        for children in &stats.children {
            for &c in children {
                is_child[c] = true;
            }
        }

        for root in (0..m).filter(|&i| !is_child[i]) {
            let mut stack = vec![(root, false)];
            while let Some((node, expanded)) = stack.pop() {
                if !expanded {
                    stack.push((node, true));
                    for &c in &stats.children[node] {
                        stack.push((c, false));
                    }
                    continue;
                }

                if !stats.has_cluster_child[node] {
                    selected[node] = true;
                } else {
                    let child_sum: f64 =
                        stats.children[node].iter().map(|&c| subtree_stab[c]).sum();
                    if stats.stability[node] > child_sum {
                        selected[node] = true;
                        deselect_descendants(&stats.children, node, &mut selected);
                        subtree_stab[node] = stats.stability[node];
                    } else {
                        subtree_stab[node] = child_sum;
                    }
                }
            }
        }

        selected
    }

    /// Label points by selected cluster, in ascending cluster-id order.
    fn assign_labels(&self, selected: &[bool]) -> Vec<i32> {
        let n = self.n_points;
        let mut labels = vec![NOISE; n];
        let mut next_label = 0i32;

        for (i, &sel) in selected.iter().enumerate() {
            if !sel {
                continue;
            }
            self.label_subtree_points(selected, i, next_label, &mut labels);
            next_label += 1;
        }

        labels
    }

    /// Label all points belonging to cluster `cluster_idx`, descending through
    /// non-selected child clusters.
    fn label_subtree_points(
        &self,
        selected: &[bool],
        cluster_idx: usize,
        label: i32,
        labels: &mut [i32],
    ) {
        let n = self.n_points;
        let cluster_id = cluster_idx + n;

        for edge in &self.edges {
            if edge.parent != cluster_id {
                continue;
            }
            if edge.child_size == 1 && edge.child < n {
                labels[edge.child] = label;
            } else if edge.child_size > 1 && edge.child >= n {
                let child_idx = edge.child - n;
                if selected[child_idx] {
                    // Independently selected; don't override.
                    continue;
                }
                self.label_subtree_points(selected, child_idx, label, labels);
            }
        }
    }

    /// For each selected cluster (in label order), the vectors of the points
    /// that persisted to the highest density level of each leaf under it.
    fn collect_exemplars(
        &self,
        stats: &ClusterStats,
        selected: &[bool],
        data: &[Vec<f32>],
    ) -> Vec<Vec<Vec<f32>>> {
        let mut out = Vec::new();

        for (i, &sel) in selected.iter().enumerate() {
            if !sel {
                continue;
            }

            let mut cluster_exemplars: Vec<Vec<f32>> = Vec::new();
            for leaf in self.leaves_under(i, stats) {
                let leaf_id = leaf + self.n_points;
                let fallouts: Vec<(usize, f64)> = self
                    .edges
                    .iter()
                    .filter(|e| e.parent == leaf_id && e.child_size == 1 && e.child < self.n_points)
                    .map(|e| (e.child, e.lambda))
                    .collect();

                let Some(max_lambda) = fallouts
                    .iter()
                    .map(|&(_, l)| l)
                    .max_by(|a, b| a.total_cmp(b))
                else {
                    continue;
                };

                for (point, lambda) in fallouts {
                    if lambda == max_lambda {
                        cluster_exemplars.push(data[point].clone());
                    }
                }
            }
            out.push(cluster_exemplars);
        }

        out
    }

    /// Leaf clusters in the subtree rooted at `cluster_idx` (the node itself
    /// when it has no cluster children).
    fn leaves_under(&self, cluster_idx: usize, stats: &ClusterStats) -> Vec<usize> {
        let mut stack = vec![cluster_idx];
        let mut leaves = Vec::new();
        while let Some(c) = stack.pop() {
            if stats.has_cluster_child[c] {
                stack.extend(stats.children[c].iter().copied());
            } else {
                leaves.push(c);
            }
        }
        leaves
    }
}

struct ClusterStats {
    stability: Vec<f64>,
    has_cluster_child: Vec<bool>,
    children: Vec<Vec<usize>>,
}

/// Record every point of the component rooted at `comp_root` as falling into
/// `parent_cluster` at this level.
fn record_component_points(
    edges: &mut Vec<CondensedEdge>,
    uf: &UnionFind,
    comp_root: usize,
    parent_cluster: usize,
    lambda: f64,
    n: usize,
) {
    // UnionFind doesn't track members, so scan all points. find() needs
    // &mut self for path compression; walk the parent chain read-only instead.
    for p in 0..n {
        if util::find_root_readonly(&uf.parent, p) == comp_root {
            edges.push(CondensedEdge {
                parent: parent_cluster,
                child: p,
                lambda,
                child_size: 1,
            });
        }
    }
}

fn deselect_descendants(children: &[Vec<usize>], node: usize, selected: &mut [bool]) {
    for &child in &children[node] {
        selected[child] = false;
        deselect_descendants(children, child, selected);
    }
}
