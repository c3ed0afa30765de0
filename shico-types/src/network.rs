//! Per-interval network structures returned to the web client.

/// A named node in a yearly network.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkNode {
    pub name: String,
}

/// A directed, weighted edge between two nodes, by node index.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

/// Graph shown for one aggregation interval.
///
/// Link endpoints index into `nodes`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct YearlyNetwork {
    pub nodes: Vec<NetworkNode>,
    pub links: Vec<NetworkLink>,
}

/// Node names of the fixed placeholder graph.
const PLACEHOLDER_NODES: [&str; 8] = ["q1", "q2", "r1.1", "r1.2", "r1.3", "r1.4", "r2.1", "r2.2"];

/// Edges of the fixed placeholder graph: two query nodes fanning out to their related nodes.
const PLACEHOLDER_LINKS: [(usize, usize); 7] = [(0, 2), (0, 3), (0, 4), (0, 5), (1, 5), (1, 6), (1, 7)];

impl YearlyNetwork {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed 8-node / 7-link graph, independent of any tracking data.
    pub fn placeholder() -> Self {
        let nodes = PLACEHOLDER_NODES
            .iter()
            .map(|name| NetworkNode {
                name: (*name).to_string(),
            })
            .collect();
        let links = PLACEHOLDER_LINKS
            .iter()
            .map(|&(source, target)| NetworkLink {
                source,
                target,
                value: 1.0,
            })
            .collect();
        Self { nodes, links }
    }

    /// Append a node and return its index.
    pub fn add_node(&mut self, name: impl Into<String>) -> usize {
        self.nodes.push(NetworkNode { name: name.into() });
        self.nodes.len() - 1
    }

    /// Append a link between two existing node indices.
    pub fn add_link(&mut self, source: usize, target: usize, value: f64) {
        debug_assert!(source < self.nodes.len() && target < self.nodes.len());
        self.links.push(NetworkLink {
            source,
            target,
            value,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_has_fixed_shape() {
        let net = YearlyNetwork::placeholder();
        assert_eq!(net.nodes.len(), 8);
        assert_eq!(net.links.len(), 7);
        assert_eq!(net.nodes[0].name, "q1");
        assert_eq!(net.nodes[7].name, "r2.2");
        assert!(net
            .links
            .iter()
            .all(|l| l.source < 8 && l.target < 8 && l.value == 1.0));
    }

    #[test]
    fn add_node_returns_index() {
        let mut net = YearlyNetwork::new();
        let a = net.add_node("war");
        let b = net.add_node("battle");
        net.add_link(a, b, 0.7);
        assert_eq!((a, b), (0, 1));
        assert_eq!(net.links[0].target, 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_nodes_and_links() {
        let json = serde_json::to_value(YearlyNetwork::placeholder()).unwrap();
        assert_eq!(json["nodes"][2]["name"], "r1.1");
        assert_eq!(json["links"][4]["source"], 1);
        assert_eq!(json["links"][4]["target"], 5);
    }
}
