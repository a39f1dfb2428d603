use std::fmt::Display;

use itertools::Itertools;

use crate::{alphabet::Symbol, dfa::Dfa, nfa::Nfa, Show, StateId};

/// A node of the graph underlying an automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphNode {
    /// The id of the state.
    pub id: StateId,
    /// Whether the state is accepting.
    pub accepting: bool,
}

/// A labelled edge of the graph underlying an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphEdge {
    /// The state the edge leaves.
    pub source: StateId,
    /// The symbol the edge is labelled with.
    pub symbol: Symbol,
    /// The state the edge leads to.
    pub target: StateId,
}

fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Enumerates an automaton as a graph, which is all that a renderer needs to know.
/// From the enumeration a description in the DOT format is derived, which can be
/// turned into an image by graphviz.
pub trait Dottable {
    /// The name of the graph in the DOT output.
    fn dot_name(&self) -> Option<String>;

    /// The state in which every run starts.
    fn initial(&self) -> StateId;

    /// All states in ascending order of their id.
    fn nodes(&self) -> Vec<GraphNode>;

    /// All transitions, one edge per symbol and target.
    fn edges(&self) -> Vec<GraphEdge>;

    /// The identifier of a state in the DOT output.
    fn dot_state_ident(&self, idx: StateId) -> String {
        idx.show()
    }

    /// Attributes of a node, accepting states are drawn as double circles.
    fn dot_state_attributes(&self, node: &GraphNode) -> Vec<DotStateAttribute> {
        let shape = if node.accepting {
            "doublecircle"
        } else {
            "circle"
        };
        vec![
            DotStateAttribute::Shape(shape.into()),
            DotStateAttribute::Label(self.dot_state_ident(node.id)),
        ]
    }

    /// Attributes of an edge, by default only its label.
    fn dot_transition_attributes(&self, edge: &GraphEdge) -> Vec<DotTransitionAttribute> {
        vec![DotTransitionAttribute::Label(edge.symbol.show())]
    }

    /// Compute the graphviz representation, for more information on the DOT format,
    /// see the [graphviz documentation](https://graphviz.org/doc/info/lang.html).
    /// An invisible point node with an arrow into it marks the initial state.
    fn dot_representation(&self) -> String {
        let header = [
            format!(
                "digraph {} {{",
                self.dot_name().unwrap_or("A".to_string())
            ),
            "rankdir=LR".to_string(),
            "init [label=\"\", shape=point]".to_string(),
            format!("init -> {}", self.dot_state_ident(self.initial())),
        ];

        let states = self.nodes().into_iter().map(|node| {
            format!(
                "{} [{}]",
                self.dot_state_ident(node.id),
                self.dot_state_attributes(&node)
                    .into_iter()
                    .map(|attr| attr.to_string())
                    .join(", ")
            )
        });

        let transitions = self.edges().into_iter().map(|edge| {
            format!(
                "{} -> {} [{}]",
                self.dot_state_ident(edge.source),
                self.dot_state_ident(edge.target),
                self.dot_transition_attributes(&edge)
                    .into_iter()
                    .map(|attr| attr.to_string())
                    .join(", ")
            )
        });

        header
            .into_iter()
            .chain(states)
            .chain(transitions)
            .chain(std::iter::once("}".to_string()))
            .join("\n")
    }

    /// Attempts to render the object to a PNG file with the given filename by handing the
    /// DOT representation to the `dot` executable. This method is only available on the
    /// `graphviz` crate feature and makes use of temporary files.
    #[cfg(feature = "graphviz")]
    fn render_to_file_name(&self, filename: &std::path::Path) -> Result<(), std::io::Error> {
        use std::io::Write;
        use tracing::trace;

        let dot = self.dot_representation();
        trace!("rendering to {}\n{dot}", filename.display());
        let mut tempfile = tempfile::NamedTempFile::new()?;
        tempfile.write_all(dot.as_bytes())?;

        let output = std::process::Command::new("dot")
            .arg("-Tpng")
            .arg("-o")
            .arg(filename)
            .arg(tempfile.path())
            .output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!(
                    "dot exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ))
        }
    }
}

impl Dottable for Nfa {
    fn dot_name(&self) -> Option<String> {
        Some("NFA".into())
    }

    fn initial(&self) -> StateId {
        self.start()
    }

    fn nodes(&self) -> Vec<GraphNode> {
        self.state_indices()
            .map(|id| GraphNode {
                id,
                accepting: self.is_accepting(id),
            })
            .collect()
    }

    fn edges(&self) -> Vec<GraphEdge> {
        self.state_indices()
            .flat_map(|source| {
                self.edges_from(source).map(move |(symbol, target)| GraphEdge {
                    source,
                    symbol: symbol.clone(),
                    target,
                })
            })
            .collect()
    }
}

impl Dottable for Dfa {
    fn dot_name(&self) -> Option<String> {
        Some("DFA".into())
    }

    fn initial(&self) -> StateId {
        Dfa::initial(self)
    }

    fn nodes(&self) -> Vec<GraphNode> {
        self.state_indices()
            .map(|id| GraphNode {
                id,
                accepting: self.is_accepting(id),
            })
            .collect()
    }

    fn edges(&self) -> Vec<GraphEdge> {
        self.state_indices()
            .flat_map(|source| {
                self.edges_from(source).map(move |(symbol, target)| GraphEdge {
                    source,
                    symbol: symbol.clone(),
                    target,
                })
            })
            .collect()
    }
}

/// Enum that abstracts attributes of nodes in the DOT format.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DotStateAttribute {
    /// The label of a node
    Label(String),
    /// The shape of a node
    Shape(String),
}

impl Display for DotStateAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DotStateAttribute::Label(s) => write!(f, "label=\"{}\"", escape_label(s)),
            DotStateAttribute::Shape(s) => write!(f, "shape=\"{s}\""),
        }
    }
}

/// Attributes of edges in the DOT format.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DotTransitionAttribute {
    /// The label of an edge
    Label(String),
}

impl Display for DotTransitionAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DotTransitionAttribute::Label(lbl) => write!(f, "label=\"{}\"", escape_label(lbl)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn nfa_graph_enumeration() {
        let nfa = Nfa::from_regex("a|b").unwrap();
        let nodes = nfa.nodes();
        assert_eq!(nodes.len(), 6);
        assert_eq!(nodes.iter().filter(|n| n.accepting).count(), 1);
        assert!(nodes[5].accepting);
        assert_eq!(Dottable::initial(&nfa), 4);

        let edges = nfa.edges();
        assert_eq!(edges.len(), 6);
        assert!(edges.contains(&GraphEdge {
            source: 0,
            symbol: Symbol::Char('a'),
            target: 1
        }));
        assert_eq!(edges.iter().filter(|e| e.symbol.is_epsilon()).count(), 4);
    }

    #[test]
    fn dfa_dot_representation() {
        let dfa = Dfa::builder()
            .with_accepting([1])
            .with_edges([(0, 'a', 1), (1, '"', 1)])
            .into_dfa(0);
        assert_eq!(
            dfa.dot_representation(),
            [
                "digraph DFA {",
                "rankdir=LR",
                "init [label=\"\", shape=point]",
                "init -> q0",
                "q0 [shape=\"circle\", label=\"q0\"]",
                "q1 [shape=\"doublecircle\", label=\"q1\"]",
                "q0 -> q1 [label=\"a\"]",
                "q1 -> q1 [label=\"\\\"\"]",
                "}",
            ]
            .join("\n")
        );
    }

    #[test]
    fn minimized_graph_keeps_representative_ids() {
        let minimal = crate::dfa::tests::wiki_dfa().minimize();
        let ids = minimal.nodes().into_iter().map(|n| n.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![0, 2, 5]);
        assert!(minimal
            .edges()
            .iter()
            .all(|e| ids.contains(&e.source) && ids.contains(&e.target)));
        assert!(minimal.dot_representation().contains("q2 -> q5 [label=\"b\"]"));
    }
}
