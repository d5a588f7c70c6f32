use crate::types::IndexRecord;

/// Cosine similarity in `[-1, 1]`; zero for mismatched lengths or zero vectors
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Exact top-k search over records kept in insertion order.
///
/// Returns `(position, score)` pairs sorted by score descending. The sort is
/// stable, so equal scores keep insertion order.
pub(crate) fn rank(records: &[IndexRecord], query: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut scores: Vec<(usize, f32)> = records
        .iter()
        .enumerate()
        .map(|(pos, record)| (pos, cosine_similarity(query, &record.vector)))
        .collect();

    scores.sort_by(|a, b| b.1.total_cmp(&a.1));
    scores.truncate(k);
    scores
}
