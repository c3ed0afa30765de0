//! Shaping tracker output into the JSON the web client consumes.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use shico_types::{AggregationResult, TrackingResult, YearlyNetwork, YearlyTerms};

use crate::config::NetworkMode;

/// `term -> weight` for one period.
pub type TermMap = BTreeMap<String, f64>;

/// Body of a successful `/track` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackResponse {
    /// Interval label to its aggregated term weights.
    pub stream: BTreeMap<String, TermMap>,
    /// Interval label to the graph shown for it.
    pub networks: BTreeMap<String, YearlyNetwork>,
}

impl TrackResponse {
    /// Assemble the response from the monitor and aggregator output.
    pub fn build(tracking: &TrackingResult, aggregated: &AggregationResult, mode: NetworkMode) -> Self {
        Self {
            stream: year_tuples_as_dict(&aggregated.results),
            networks: yearly_network(mode, tracking, aggregated),
        }
    }
}

/// Ordered pairs to a mapping. A repeated term keeps its last weight.
pub fn tuples_as_dict(pairs: &[(String, f64)]) -> TermMap {
    pairs.iter().cloned().collect()
}

/// [`tuples_as_dict`] applied to every period.
pub fn year_tuples_as_dict(results: &YearlyTerms) -> BTreeMap<String, TermMap> {
    results
        .iter()
        .map(|(year, pairs)| (year.clone(), tuples_as_dict(pairs)))
        .collect()
}

/// One graph per aggregation interval (every key of `aggregated.metadata`).
pub fn yearly_network(
    mode: NetworkMode,
    tracking: &TrackingResult,
    aggregated: &AggregationResult,
) -> BTreeMap<String, YearlyNetwork> {
    aggregated
        .metadata
        .iter()
        .map(|(label, members)| {
            let network = match mode {
                NetworkMode::Placeholder => YearlyNetwork::placeholder(),
                NetworkMode::Links => link_network(tracking, members),
            };
            (label.clone(), network)
        })
        .collect()
}

/// Graph of the seed links followed in an interval's member keys.
///
/// Nodes are the seeds in first-seen order, then every other linked term
/// sorted. An edge's value is its mean similarity over the members where
/// it occurs.
fn link_network(tracking: &TrackingResult, members: &[String]) -> YearlyNetwork {
    let mut seeds: Vec<&str> = Vec::new();
    let mut seen = HashSet::new();
    for key in members {
        for seed in tracking.seeds.get(key).into_iter().flatten() {
            if seen.insert(seed.as_str()) {
                seeds.push(seed);
            }
        }
    }

    let mut edges: BTreeMap<(&str, &str), (f64, usize)> = BTreeMap::new();
    for key in members {
        for (source, targets) in tracking.links.get(key).into_iter().flatten() {
            for (target, sim) in targets {
                let entry = edges.entry((source.as_str(), target.as_str())).or_insert((0.0, 0));
                entry.0 += sim;
                entry.1 += 1;
            }
        }
    }

    let mut others: Vec<&str> = edges
        .keys()
        .flat_map(|&(s, t)| [s, t])
        .filter(|term| !seen.contains(term))
        .collect();
    others.sort_unstable();
    others.dedup();

    let mut network = YearlyNetwork::new();
    let mut index = BTreeMap::new();
    for term in seeds.into_iter().chain(others) {
        index.insert(term, network.add_node(term));
    }
    for ((source, target), (total, count)) in edges {
        network.add_link(index[source], index[target], total / count as f64);
    }
    network
}

#[cfg(test)]
mod tests {
    use super::*;
    use shico_types::TermLinks;

    fn pairs(items: &[(&str, f64)]) -> Vec<(String, f64)> {
        items.iter().map(|(t, w)| (t.to_string(), *w)).collect()
    }

    #[test]
    fn tuples_as_dict_keeps_last_duplicate() {
        let dict = tuples_as_dict(&pairs(&[("cat", 1.0), ("dog", 2.0), ("cat", 3.0)]));
        assert_eq!(dict.len(), 2);
        assert_eq!(dict["cat"], 3.0);
        assert_eq!(dict["dog"], 2.0);

        let again: Vec<(String, f64)> = dict.clone().into_iter().collect();
        assert_eq!(tuples_as_dict(&again), dict);
    }

    #[test]
    fn year_tuples_as_dict_preserves_years() {
        let mut results = YearlyTerms::new();
        results.insert("1950".into(), pairs(&[("x", 1.0)]));
        results.insert("1951".into(), pairs(&[("y", 2.0), ("y", 5.0)]));

        let dict = year_tuples_as_dict(&results);
        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["1950", "1951"]);
        assert_eq!(dict["1950"]["x"], 1.0);
        assert_eq!(dict["1951"].len(), 1);
        assert_eq!(dict["1951"]["y"], 5.0);
    }

    fn sample() -> (TrackingResult, AggregationResult) {
        let mut tracking = TrackingResult::new();
        for (key, sim) in [("1950", 0.8), ("1951", 0.6)] {
            let mut links = TermLinks::new();
            links.insert("war".into(), vec![("battle".into(), sim), ("army".into(), 0.5)]);
            tracking.insert(key, pairs(&[("war", 1.0)]), vec!["war".into()], links);
        }

        let mut aggregated = AggregationResult::new();
        aggregated.results.insert("1950".into(), pairs(&[("war", 2.0), ("battle", 1.4)]));
        aggregated
            .metadata
            .insert("1950".into(), vec!["1950".into(), "1951".into()]);
        (tracking, aggregated)
    }

    #[test]
    fn placeholder_network_for_every_interval() {
        let (tracking, mut aggregated) = sample();
        aggregated.metadata.insert("1960".into(), vec![]);

        let networks = yearly_network(NetworkMode::Placeholder, &tracking, &aggregated);
        assert_eq!(networks.len(), 2);
        for network in networks.values() {
            assert_eq!(network.nodes.len(), 8);
            assert_eq!(network.links.len(), 7);
        }
    }

    #[test]
    fn link_network_averages_similarities() {
        let (tracking, aggregated) = sample();
        let networks = yearly_network(NetworkMode::Links, &tracking, &aggregated);
        let network = &networks["1950"];

        let names: Vec<&str> = network.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["war", "army", "battle"]);
        assert_eq!(network.links.len(), 2);

        let battle = network.links.iter().find(|l| l.target == 2).unwrap();
        assert_eq!(battle.source, 0);
        assert!((battle.value - 0.7).abs() < 1e-9);
    }

    #[test]
    fn response_serializes_stream_and_networks() {
        let (tracking, aggregated) = sample();
        let response = TrackResponse::build(&tracking, &aggregated, NetworkMode::Placeholder);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["stream"]["1950"]["battle"], 1.4);
        assert_eq!(json["networks"]["1950"]["nodes"][0]["name"], "q1");
        assert_eq!(json["networks"]["1950"]["links"][0]["target"], 2);
    }
}
