//! Single-pass greedy near-duplicate clustering over article embeddings.
//!
//! For each unvisited vector (in input order) the k nearest neighbors by
//! squared L2 distance are examined; neighbors above the similarity
//! threshold join the cluster and are marked visited, so a vector can
//! neither seed nor join a second cluster. Similarity uses
//! `sim = 1 - d²/2`, which equals cosine similarity only for
//! unit-normalized vectors; callers MUST normalize first (see
//! [`normalize_unit`]), the conversion is invalid otherwise.
//!
//! The result is order-dependent and can under-cluster when two vectors are
//! each similar to a third but fall outside each other's top-k.

/// Neighbors examined per seed vector.
pub const KNN: usize = 7;

/// Minimum similarity for a neighbor to join a cluster.
pub const SIM_THRESHOLD: f32 = 0.80;

/// Scale a vector to unit L2 norm in place. Zero vectors are left as-is.
pub fn normalize_unit(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

/// Squared-L2-to-cosine conversion for unit vectors:
/// `||a-b||² = 2 - 2·cos(a,b)`, hence `cos = 1 - d²/2`.
fn l2_to_cos(d_squared: f32) -> f32 {
    1.0 - d_squared / 2.0
}

/// Cluster unit-normalized embeddings. Returns clusters of input indices;
/// every index appears in exactly one cluster; members are sorted by
/// original index (smallest index is the cluster representative).
pub fn cluster(embeddings: &[Vec<f32>], k: usize, threshold: f32) -> Vec<Vec<usize>> {
    let n = embeddings.len();
    let mut visited = vec![false; n];
    let mut clusters = Vec::new();

    for i in 0..n {
        if visited[i] {
            continue;
        }

        // Brute-force k-NN; the seed itself is its own nearest neighbor.
        let mut neighbors: Vec<(usize, f32)> = (0..n)
            .map(|j| (j, squared_l2(&embeddings[i], &embeddings[j])))
            .collect();
        neighbors.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        neighbors.truncate(k);

        // Seed joins unconditionally; with heavy ties it can even fall out
        // of its own truncated top-k.
        visited[i] = true;
        let mut members = vec![i];
        for (j, d) in neighbors {
            if !visited[j] && l2_to_cos(d) > threshold {
                visited[j] = true;
                members.push(j);
            }
        }
        members.sort_unstable();
        clusters.push(members);
    }

    clusters
}

/// Cluster with the default k and threshold.
pub fn cluster_default(embeddings: &[Vec<f32>]) -> Vec<Vec<usize>> {
    cluster(embeddings, KNN, SIM_THRESHOLD)
}
