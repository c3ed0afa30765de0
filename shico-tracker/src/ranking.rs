use shico_types::TermWeights;

/// Order terms by weight (highest first, ties by term), drop non-positive
/// weights and keep at most `limit`.
pub(crate) fn rank_terms<I>(weights: I, limit: usize) -> TermWeights
where
    I: IntoIterator<Item = (String, f64)>,
{
    let mut ranked: TermWeights = weights.into_iter().filter(|(_, w)| *w > 0.0).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}
