use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A rendered entity with a stable identity. The id is the key under which
/// the node is stored; the label is free-form display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub label: String,
}

/// A ranked directed relationship between two nodes. Identity is the ordered
/// `(from, to)` pair; the rank is 1, 2, or 3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub from: String,
    pub to: String,
    pub rank: u8,
}

/// How a selection participates in rendering once mutual pairs have been
/// resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRole {
    /// Only direction present between the two nodes.
    Single,
    /// Member of a mutual pair chosen to carry the rendered path.
    Representative,
    /// Member of a mutual pair suppressed from direct rendering.
    Suppressed,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("sociogram definition is empty; expected a 'sociogram' header")]
    MissingHeader,
    #[error("sociogram definition must start with 'sociogram', found '{0}'")]
    BadHeader(String),
    #[error("selection '{0}' is missing a '|rank|' segment")]
    MissingRank(String),
    #[error("selection rank must be 1, 2, or 3, found '{0}'")]
    BadRank(String),
    #[error("node '{0}' cannot select itself")]
    SelfReference(String),
    #[error("node identifier missing in segment '{0}'")]
    EmptyNode(String),
}

/// The node/selection lists as maintained by the external editor. The
/// rendering engine treats this as input; it repositions nodes but never
/// creates or deletes them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sociogram {
    pub nodes: HashMap<String, Node>,
    pub order: Vec<String>,
    pub selections: Vec<Selection>,
}

impl Sociogram {
    /// Parse a text definition:
    ///
    /// ```text
    /// sociogram
    /// A[Alice]
    /// B[Bob]
    /// A ->|1| B
    /// ```
    ///
    /// `%%` lines are comments. Ids referenced only in selection lines are
    /// interned as nodes on first sight. A repeated ordered pair keeps the
    /// last occurrence.
    pub fn parse(definition: &str) -> Result<Self, ParseError> {
        let mut lines = definition
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty() && !line.starts_with("%%"));

        let header = lines.next().ok_or(ParseError::MissingHeader)?;
        if !header.eq_ignore_ascii_case("sociogram") {
            return Err(ParseError::BadHeader(header.to_string()));
        }

        let mut graph = Sociogram::default();

        for line in lines {
            if let Some(selection) = parse_selection_line(line, &mut graph)? {
                graph.upsert_selection(selection);
            }
        }

        Ok(graph)
    }

    /// Regenerate a canonical definition that parses back to this graph.
    pub fn to_definition(&self) -> String {
        let mut lines = Vec::new();
        lines.push("sociogram".to_string());

        for id in &self.order {
            if let Some(node) = self.nodes.get(id) {
                if node.label == *id {
                    lines.push(id.clone());
                } else {
                    lines.push(format!("{id}[{}]", node.label));
                }
            }
        }

        for selection in &self.selections {
            lines.push(format!(
                "{} ->|{}| {}",
                selection.from, selection.rank, selection.to
            ));
        }

        let mut output = lines.join("\n");
        output.push('\n');
        output
    }

    /// Count of selections terminating at each known node. Selections whose
    /// target no longer exists are ignored rather than counted or crashed on.
    pub fn in_degree(&self) -> HashMap<String, usize> {
        let mut counts: HashMap<String, usize> =
            self.nodes.keys().cloned().map(|id| (id, 0_usize)).collect();

        for selection in &self.selections {
            if let Some(count) = counts.get_mut(&selection.to) {
                *count += 1;
            }
        }

        counts
    }

    /// Resolve mutual pairs across the whole selection list. Returns one role
    /// per selection, in selection order. For a mutual pair exactly one side
    /// is `Representative` (the lexicographically smaller ordered pair), so
    /// repeated renders of the same lists always draw the same primitive.
    pub fn edge_roles(&self) -> Vec<EdgeRole> {
        let pairs: HashSet<(&str, &str)> = self
            .selections
            .iter()
            .map(|s| (s.from.as_str(), s.to.as_str()))
            .collect();

        self.selections
            .iter()
            .map(|selection| {
                if pairs.contains(&(selection.to.as_str(), selection.from.as_str())) {
                    if selection.from < selection.to {
                        EdgeRole::Representative
                    } else {
                        EdgeRole::Suppressed
                    }
                } else {
                    EdgeRole::Single
                }
            })
            .collect()
    }

    /// Insert a selection, replacing any existing one for the same ordered
    /// pair (later writes win).
    pub fn upsert_selection(&mut self, selection: Selection) {
        if let Some(existing) = self
            .selections
            .iter_mut()
            .find(|s| s.from == selection.from && s.to == selection.to)
        {
            *existing = selection;
        } else {
            self.selections.push(selection);
        }
    }

    pub fn remove_node(&mut self, node_id: &str) -> bool {
        let existed = self.nodes.remove(node_id).is_some();
        if existed {
            self.order.retain(|id| id != node_id);
            self.selections
                .retain(|s| s.from != node_id && s.to != node_id);
        }
        existed
    }
}

fn parse_selection_line(
    line: &str,
    graph: &mut Sociogram,
) -> Result<Option<Selection>, ParseError> {
    let Some((lhs, rhs)) = line.split_once("->") else {
        intern_node(line, graph)?;
        return Ok(None);
    };

    let rhs = rhs.trim();
    let Some(rest) = rhs.strip_prefix('|') else {
        return Err(ParseError::MissingRank(line.to_string()));
    };
    let Some(end_idx) = rest.find('|') else {
        return Err(ParseError::MissingRank(line.to_string()));
    };

    let rank_raw = rest[..end_idx].trim();
    let rank: u8 = rank_raw
        .parse()
        .map_err(|_| ParseError::BadRank(rank_raw.to_string()))?;
    if !(1..=3).contains(&rank) {
        return Err(ParseError::BadRank(rank_raw.to_string()));
    }

    let from = intern_node(lhs, graph)?;
    let to = intern_node(&rest[end_idx + 1..], graph)?;

    if from == to {
        return Err(ParseError::SelfReference(from));
    }

    Ok(Some(Selection { from, to, rank }))
}

fn intern_node(raw: &str, graph: &mut Sociogram) -> Result<String, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyNode(raw.to_string()));
    }

    let (id, label) = match trimmed.split_once('[') {
        Some((id, rest)) => {
            let label = rest.strip_suffix(']').unwrap_or(rest).trim();
            let id = id.trim();
            if id.is_empty() {
                return Err(ParseError::EmptyNode(trimmed.to_string()));
            }
            let label = if label.is_empty() { id } else { label };
            (id.to_string(), label.to_string())
        }
        None => (trimmed.to_string(), trimmed.to_string()),
    };

    if !graph.nodes.contains_key(&id) {
        graph.order.push(id.clone());
        graph.nodes.insert(id.clone(), Node { label });
    }

    Ok(id)
}
