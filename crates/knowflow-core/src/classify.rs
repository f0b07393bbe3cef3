//! Keyword heuristics for node and edge categories.
//!
//! Labels and predicates are matched case-insensitively against ordered
//! keyword groups; the first group with a keyword contained in the text wins.
//! Classification is a pure function of the input string.

use crate::semantic::{EdgeCategory, NodeCategory};

const NODE_RULES: &[(NodeCategory, &[&str])] = &[
    (NodeCategory::Input, &["markdown", "csv", "json"]),
    (NodeCategory::Output, &["chart", "graph", "view"]),
    (NodeCategory::Process, &["engine", "query", "process"]),
    (NodeCategory::Decision, &["decision", "evaluate"]),
];

const EDGE_RULES: &[(EdgeCategory, &[&str])] = &[
    (EdgeCategory::Default, &["transform", "convert"]),
    (EdgeCategory::Loop, &["loop", "cycle"]),
    (EdgeCategory::Conditional, &["if", "condition"]),
];

fn first_match<C: Copy>(text: &str, rules: &[(C, &[&str])]) -> Option<C> {
    let text = text.to_lowercase();
    rules
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| text.contains(keyword)))
        .map(|(category, _)| *category)
}

/// Classifies a node label.
///
/// # Examples
///
/// ```
/// use knowflow_core::{classify::classify_node, semantic::NodeCategory};
///
/// assert_eq!(classify_node("CSV (A0 schema)"), NodeCategory::Input);
/// assert_eq!(classify_node("Cytoscape graph view"), NodeCategory::Output);
/// assert_eq!(classify_node("Pandas"), NodeCategory::Process);
/// ```
pub fn classify_node(label: &str) -> NodeCategory {
    first_match(label, NODE_RULES).unwrap_or_default()
}

/// Classifies an edge predicate.
///
/// # Examples
///
/// ```
/// use knowflow_core::{classify::classify_edge, semantic::EdgeCategory};
///
/// assert_eq!(classify_edge("transforms_to"), EdgeCategory::Default);
/// assert_eq!(classify_edge("retry_loop"), EdgeCategory::Loop);
/// assert_eq!(classify_edge("on_condition"), EdgeCategory::Conditional);
/// ```
pub fn classify_edge(predicate: &str) -> EdgeCategory {
    first_match(predicate, EDGE_RULES).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_node_keyword_groups() {
        assert_eq!(classify_node("Markdown"), NodeCategory::Input);
        assert_eq!(classify_node("JSON-LD"), NodeCategory::Input);
        assert_eq!(classify_node("Bar Chart"), NodeCategory::Output);
        assert_eq!(classify_node("SPARQL queries"), NodeCategory::Process);
        assert_eq!(classify_node("Evaluate risk"), NodeCategory::Decision);
        assert_eq!(classify_node("Decision gate"), NodeCategory::Decision);
    }

    #[test]
    fn test_node_first_group_wins() {
        // "csv" (input) precedes "view" (output).
        assert_eq!(classify_node("CSV preview"), NodeCategory::Input);
        // "graph" (output) precedes "engine" (process).
        assert_eq!(classify_node("Graph engine"), NodeCategory::Output);
    }

    #[test]
    fn test_node_default_is_process() {
        assert_eq!(classify_node("RDF (rdflib)"), NodeCategory::Process);
        assert_eq!(classify_node(""), NodeCategory::Process);
    }

    #[test]
    fn test_edge_keyword_groups() {
        assert_eq!(classify_edge("converts"), EdgeCategory::Default);
        assert_eq!(classify_edge("CYCLE_BACK"), EdgeCategory::Loop);
        assert_eq!(classify_edge("if_valid"), EdgeCategory::Conditional);
        assert_eq!(classify_edge("feeds_to"), EdgeCategory::Default);
    }

    #[test]
    fn test_edge_substring_matching_is_literal() {
        // "identifies" contains "if".
        assert_eq!(classify_edge("identifies"), EdgeCategory::Conditional);
        // "transform" wins over the "if" in "transform_if".
        assert_eq!(classify_edge("transform_if"), EdgeCategory::Default);
    }

    proptest! {
        #[test]
        fn prop_classification_is_deterministic(label in ".{0,40}") {
            prop_assert_eq!(classify_node(&label), classify_node(&label));
            prop_assert_eq!(classify_edge(&label), classify_edge(&label));
        }

        #[test]
        fn prop_classification_ignores_case(label in "[a-zA-Z_ ]{0,30}") {
            prop_assert_eq!(classify_node(&label), classify_node(&label.to_uppercase()));
            prop_assert_eq!(classify_edge(&label), classify_edge(&label.to_uppercase()));
        }
    }
}
