use std::collections::HashMap;
use std::fmt::Write as FmtWrite;

use anyhow::Result;
use serde::Serialize;

use crate::Point;
use crate::geometry::{self, EdgePath};
use crate::sociogram::{EdgeRole, Sociogram};
use crate::utils::escape_xml;
use crate::viewport::{CanvasSize, ViewBox, Viewport};

pub const MUTUAL_STROKE: &str = "#3b82f6";
pub const NODE_FILL_NORMAL: &str = "#8b5cf6";
pub const NODE_FILL_ISOLATED: &str = "#ef4444";
pub const NODE_FILL_STAR: &str = "#fbbf24";
/// Received-selection count at which a node is styled as a star.
pub const STAR_THRESHOLD: usize = 4;

const SINGLE_STROKE_WIDTH: f32 = 1.5;
const SINGLE_OPACITY: f32 = 0.6;
const MUTUAL_STROKE_WIDTH: f32 = 2.5;
const MUTUAL_OPACITY: f32 = 0.9;

/// Stroke color keyed by rank. An out-of-range rank takes the rank-3 style
/// rather than failing; rank validation belongs to the editor.
pub fn rank_stroke(rank: u8) -> &'static str {
    match rank {
        1 => "#27F557",
        2 => "#F53C27",
        _ => "#C900FF",
    }
}

/// Fill class derived from in-degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeClass {
    Isolated,
    Star,
    Normal,
}

impl NodeClass {
    pub fn from_in_degree(count: usize) -> Self {
        if count == 0 {
            NodeClass::Isolated
        } else if count >= STAR_THRESHOLD {
            NodeClass::Star
        } else {
            NodeClass::Normal
        }
    }

    pub fn fill_color(self) -> &'static str {
        match self {
            NodeClass::Isolated => NODE_FILL_ISOLATED,
            NodeClass::Star => NODE_FILL_STAR,
            NodeClass::Normal => NODE_FILL_NORMAL,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeVisual {
    pub from: String,
    pub to: String,
    pub rank: u8,
    /// Rank of the suppressed twin when this edge represents a mutual pair.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse_rank: Option<u8>,
    pub mutual: bool,
    pub path: EdgePath,
    pub stroke: String,
    pub stroke_width: f32,
    pub opacity: f32,
    pub marker_start: bool,
    pub marker_end: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeVisual {
    pub id: String,
    pub label: String,
    pub center: Point,
    pub radius: f32,
    pub class: NodeClass,
    pub fill: String,
}

/// Everything a host needs to draw one frame.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub view_box: ViewBox,
    pub canvas: CanvasSize,
    pub zoom: f32,
    pub background: String,
    pub edges: Vec<EdgeVisual>,
    pub nodes: Vec<NodeVisual>,
}

impl Scene {
    pub fn build(
        graph: &Sociogram,
        positions: &HashMap<String, Point>,
        viewport: &Viewport,
        background: &str,
    ) -> Scene {
        let degrees = graph.in_degree();
        let roles = graph.edge_roles();
        let radius_of =
            |id: &str| geometry::node_radius(degrees.get(id).copied().unwrap_or(0));
        let rank_of: HashMap<(&str, &str), u8> = graph
            .selections
            .iter()
            .map(|s| ((s.from.as_str(), s.to.as_str()), s.rank))
            .collect();

        let mut edges = Vec::new();
        for (selection, role) in graph.selections.iter().zip(roles) {
            // self-selections are rejected upstream; a stray one is skipped
            if selection.from == selection.to {
                continue;
            }
            if role == EdgeRole::Suppressed {
                continue;
            }
            // a selection can briefly outlive a deleted endpoint
            if !graph.nodes.contains_key(&selection.from)
                || !graph.nodes.contains_key(&selection.to)
            {
                continue;
            }
            let (Some(&from_pos), Some(&to_pos)) = (
                positions.get(&selection.from),
                positions.get(&selection.to),
            ) else {
                continue;
            };

            let mutual = role == EdgeRole::Representative;
            let path = geometry::curve_between(
                from_pos,
                to_pos,
                radius_of(&selection.from),
                radius_of(&selection.to),
                mutual,
            );

            let (stroke, stroke_width, opacity) = if mutual {
                (MUTUAL_STROKE.to_string(), MUTUAL_STROKE_WIDTH, MUTUAL_OPACITY)
            } else {
                (
                    rank_stroke(selection.rank).to_string(),
                    SINGLE_STROKE_WIDTH,
                    SINGLE_OPACITY,
                )
            };

            let reverse_rank = mutual
                .then(|| {
                    rank_of
                        .get(&(selection.to.as_str(), selection.from.as_str()))
                        .copied()
                })
                .flatten();

            edges.push(EdgeVisual {
                from: selection.from.clone(),
                to: selection.to.clone(),
                rank: selection.rank,
                reverse_rank,
                mutual,
                path,
                stroke,
                stroke_width,
                opacity,
                marker_start: mutual,
                marker_end: true,
            });
        }

        let mut nodes = Vec::new();
        for id in &graph.order {
            let Some(node) = graph.nodes.get(id) else {
                continue;
            };
            let Some(&center) = positions.get(id) else {
                continue;
            };

            let count = degrees.get(id).copied().unwrap_or(0);
            let class = NodeClass::from_in_degree(count);
            nodes.push(NodeVisual {
                id: id.clone(),
                label: node.label.clone(),
                center,
                radius: geometry::node_radius(count),
                class,
                fill: class.fill_color().to_string(),
            });
        }

        Scene {
            view_box: viewport.view,
            canvas: viewport.canvas,
            zoom: viewport.zoom_factor(),
            background: background.to_string(),
            edges,
            nodes,
        }
    }

    pub fn to_svg(&self) -> Result<String> {
        let mut svg = String::new();
        write!(
            svg,
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="{:.1} {:.1} {:.1} {:.1}" font-family="Inter, system-ui, sans-serif">
  <defs>
        <marker id="arrow-single" markerWidth="16" markerHeight="12" refX="16" refY="6" orient="auto-start-reverse" markerUnits="userSpaceOnUse">
            <polygon points="0 0, 16 6, 0 12" fill="#666" />
        </marker>
        <marker id="arrow-mutual" markerWidth="16" markerHeight="12" refX="16" refY="6" orient="auto-start-reverse" markerUnits="userSpaceOnUse">
            <polygon points="0 0, 16 6, 0 12" fill="{}" />
        </marker>
  </defs>
  <rect x="{:.1}" y="{:.1}" width="100%" height="100%" fill="{}" />
"##,
            self.canvas.width,
            self.canvas.height,
            self.view_box.x,
            self.view_box.y,
            self.view_box.width,
            self.view_box.height,
            MUTUAL_STROKE,
            self.view_box.x,
            self.view_box.y,
            escape_xml(&self.background)
        )?;

        for edge in &self.edges {
            let marker = if edge.mutual {
                "arrow-mutual"
            } else {
                "arrow-single"
            };
            let marker_start_attr = if edge.marker_start {
                format!(" marker-start=\"url(#{marker})\"")
            } else {
                String::new()
            };
            let marker_end_attr = if edge.marker_end {
                format!(" marker-end=\"url(#{marker})\"")
            } else {
                String::new()
            };

            write!(
                svg,
                "  <path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" opacity=\"{}\"{}{} />\n",
                edge.path.to_path_data(),
                edge.stroke,
                edge.stroke_width,
                edge.opacity,
                marker_start_attr,
                marker_end_attr
            )?;
        }

        for node in &self.nodes {
            write!(
                svg,
                "  <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{:.1}\" fill=\"{}\" stroke=\"#fff\" stroke-width=\"3\" />\n",
                node.center.x, node.center.y, node.radius, node.fill
            )?;
            write!(
                svg,
                "  <text x=\"{:.1}\" y=\"{:.1}\" fill=\"white\" font-size=\"16\" font-weight=\"bold\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>\n",
                node.center.x,
                node.center.y,
                escape_xml(&node.id)
            )?;
        }

        svg.push_str("</svg>\n");
        Ok(svg)
    }
}
