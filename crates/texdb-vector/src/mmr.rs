//! Maximal marginal relevance.

/// Cosine similarity; zero when either vector has zero length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 { 0.0 } else { dot / (na * nb) }
}

/// Pick up to `k` of `candidates`, trading query relevance against
/// similarity to what is already picked.
///
/// The first pick is the candidate most similar to the query. Each further
/// pick maximizes `lambda * sim(query, c) - (1 - lambda) * max sim(c, picked)`.
/// Returns indices into `candidates` in selection order.
pub fn mmr_select(query: &[f32], candidates: &[&[f32]], k: usize, lambda: f32) -> Vec<usize> {
    let k = k.min(candidates.len());
    if k == 0 {
        return Vec::new();
    }
    let to_query: Vec<f32> = candidates.iter().map(|c| cosine_similarity(query, c)).collect();

    let mut first = 0;
    for (i, score) in to_query.iter().enumerate() {
        if *score > to_query[first] { first = i; }
    }
    let mut picked = vec![first];
    // max similarity of every candidate to the picked set so far
    let mut redundancy: Vec<f32> = candidates.iter().map(|c| cosine_similarity(c, candidates[first])).collect();

    while picked.len() < k {
        let mut best: Option<(usize, f32)> = None;
        for (i, &relevance) in to_query.iter().enumerate() {
            if picked.contains(&i) { continue; }
            let score = lambda * relevance - (1.0 - lambda) * redundancy[i];
            if best.map_or(true, |(_, b)| score > b) { best = Some((i, score)); }
        }
        let Some((next, _)) = best else { break };
        picked.push(next);
        for (i, r) in redundancy.iter_mut().enumerate() {
            *r = r.max(cosine_similarity(candidates[i], candidates[next]));
        }
    }
    picked
}
