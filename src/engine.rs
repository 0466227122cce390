use std::collections::{HashMap, HashSet};

use anyhow::Result;

use crate::Point;
use crate::geometry;
use crate::interaction::{EngineEvent, Gesture, PointerEvent, PointerPhase, PointerTracker};
use crate::layout::{CircularLayout, LayoutPolicy};
use crate::scene::Scene;
use crate::sociogram::Sociogram;
use crate::viewport::{CanvasSize, Viewport, ZoomDirection};

/// Screen size of the interactive surface the host is expected to provide.
pub const DEFAULT_CANVAS: CanvasSize = CanvasSize {
    width: 1200.0,
    height: 600.0,
};

const DEFAULT_BACKGROUND: &str = "#ffffff";

/// Owns the mutable rendering state: node positions, manual-drag pins, the
/// viewport box, and the per-pointer gesture table. All mutation flows
/// through the command methods; within one render pass positions are written
/// before the scene reads them, never interleaved.
pub struct SociogramEngine {
    graph: Sociogram,
    layout: Box<dyn LayoutPolicy>,
    positions: HashMap<String, Point>,
    pinned: HashSet<String>,
    viewport: Viewport,
    pointers: PointerTracker,
    background: String,
}

impl SociogramEngine {
    pub fn new(graph: Sociogram, canvas: CanvasSize) -> Self {
        let mut engine = Self {
            graph,
            layout: Box::new(CircularLayout::default()),
            positions: HashMap::new(),
            pinned: HashSet::new(),
            viewport: Viewport::new(canvas),
            pointers: PointerTracker::default(),
            background: DEFAULT_BACKGROUND.to_string(),
        };
        engine.recompute_layout();
        engine
    }

    /// Swap the layout policy and re-run it.
    pub fn with_layout(mut self, layout: Box<dyn LayoutPolicy>) -> Self {
        self.layout = layout;
        self.recompute_layout();
        self
    }

    pub fn graph(&self) -> &Sociogram {
        &self.graph
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn positions(&self) -> &HashMap<String, Point> {
        &self.positions
    }

    pub fn is_pinned(&self, node: &str) -> bool {
        self.pinned.contains(node)
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    /// Pure styling input; never touches geometry.
    pub fn set_background(&mut self, color: impl Into<String>) {
        self.background = color.into();
    }

    /// Replace the node/selection lists. Layout re-runs only when the node
    /// sequence (membership or order) changed; selection-only edits keep
    /// every position, manual overrides included.
    pub fn set_graph(&mut self, graph: Sociogram) {
        let node_sequence_changed = graph.order != self.graph.order;
        self.graph = graph;
        if node_sequence_changed {
            self.recompute_layout();
        }
    }

    /// Re-run the layout policy over the current node sequence. Every manual
    /// override is dropped, and drags on nodes that no longer exist end.
    pub fn recompute_layout(&mut self) {
        self.pinned.clear();
        self.positions = self.layout.compute_layout(&self.graph, &self.positions);
        let nodes = &self.graph.nodes;
        self.pointers
            .retain_dragged_nodes(|node| nodes.contains_key(node));
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom(ZoomDirection::In);
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom(ZoomDirection::Out);
    }

    pub fn zoom(&mut self, direction: ZoomDirection) {
        self.viewport.zoom(direction);
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    /// Single entry point for pointer input; drives the per-pointer state
    /// machine (`Idle -> Panning | Dragging -> Idle`). A pointer that lands
    /// on a node starts a drag and is captured for its duration, so the same
    /// gesture can never double as a pan.
    pub fn dispatch_pointer(&mut self, event: PointerEvent) -> Option<EngineEvent> {
        match event.phase {
            PointerPhase::Down => {
                if self.pointers.active(event.pointer).is_some() {
                    // stray repeated down for a captured pointer
                    return None;
                }
                if let Some(node) = self.node_at(event.position()) {
                    self.pinned.insert(node.clone());
                    self.pointers.begin(event.pointer, Gesture::Dragging { node });
                } else {
                    let anchor = self.viewport.screen_to_local(event.position());
                    self.pointers.begin(event.pointer, Gesture::Panning { anchor });
                }
                None
            }
            PointerPhase::Move => match self.pointers.active(event.pointer).cloned() {
                Some(Gesture::Dragging { node }) => {
                    if !self.graph.nodes.contains_key(&node) {
                        // node deleted mid-drag; the session just ends
                        self.pointers.release(event.pointer);
                        return None;
                    }
                    let local = self.viewport.screen_to_local(event.position());
                    self.positions.insert(node.clone(), local);
                    Some(EngineEvent::PositionChanged {
                        node,
                        position: local,
                    })
                }
                Some(Gesture::Panning { anchor }) => {
                    self.viewport.pan_to_anchor(anchor, event.position());
                    None
                }
                None => None,
            },
            PointerPhase::Up | PointerPhase::Leave => {
                self.pointers.release(event.pointer);
                None
            }
        }
    }

    /// Topmost node whose circle covers the given screen position. Later
    /// nodes draw on top, so the order is walked in reverse.
    fn node_at(&self, screen: Point) -> Option<String> {
        let local = self.viewport.screen_to_local(screen);
        let degrees = self.graph.in_degree();

        for id in self.graph.order.iter().rev() {
            let Some(position) = self.positions.get(id) else {
                continue;
            };
            let radius = geometry::node_radius(degrees.get(id).copied().unwrap_or(0));
            if local.distance_to(*position) <= radius {
                return Some(id.clone());
            }
        }

        None
    }

    pub fn scene(&self) -> Scene {
        Scene::build(&self.graph, &self.positions, &self.viewport, &self.background)
    }

    pub fn render_svg(&self) -> Result<String> {
        self.scene().to_svg()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::PointerPhase;

    fn engine_from(definition: &str) -> SociogramEngine {
        SociogramEngine::new(Sociogram::parse(definition).unwrap(), DEFAULT_CANVAS)
    }

    fn down_on(engine: &mut SociogramEngine, pointer: i64, node: &str) {
        let screen = engine
            .viewport()
            .local_to_screen(engine.positions()[node]);
        engine.dispatch_pointer(PointerEvent::new(
            pointer,
            PointerPhase::Down,
            screen.x,
            screen.y,
        ));
    }

    #[test]
    fn layout_is_deterministic_across_engines() {
        let definition = "sociogram\nA\nB\nC\nD\nA ->|1| B\n";
        let first = engine_from(definition);
        let second = engine_from(definition);
        assert_eq!(first.positions(), second.positions());
    }

    #[test]
    fn dragging_moves_only_the_grabbed_node() {
        let mut engine = engine_from("sociogram\nA\nB\nC\nA ->|1| C\nB ->|2| C\n");
        let before = engine.positions().clone();

        down_on(&mut engine, 1, "C");
        let target = engine.viewport().local_to_screen(Point::new(100.0, 100.0));
        let event = engine.dispatch_pointer(PointerEvent::new(
            1,
            PointerPhase::Move,
            target.x,
            target.y,
        ));

        match event {
            Some(EngineEvent::PositionChanged { node, position }) => {
                assert_eq!(node, "C");
                assert!(position.distance_to(Point::new(100.0, 100.0)) < 1e-2);
            }
            other => panic!("expected a position event, got {other:?}"),
        }

        assert!(engine.positions()["C"].distance_to(Point::new(100.0, 100.0)) < 1e-2);
        assert_eq!(engine.positions()["A"], before["A"]);
        assert_eq!(engine.positions()["B"], before["B"]);

        // geometry consumed on the next pass reflects the new position
        let scene = engine.scene();
        let touching: Vec<_> = scene.edges.iter().filter(|e| e.to == "C").collect();
        assert_eq!(touching.len(), 2);
    }

    #[test]
    fn dropped_node_stays_pinned_until_the_node_set_changes() {
        let mut engine = engine_from("sociogram\nA\nB\nC\n");
        down_on(&mut engine, 1, "B");
        let target = engine.viewport().local_to_screen(Point::new(42.0, 24.0));
        engine.dispatch_pointer(PointerEvent::new(1, PointerPhase::Move, target.x, target.y));
        engine.dispatch_pointer(PointerEvent::new(1, PointerPhase::Up, target.x, target.y));

        assert!(engine.is_pinned("B"));
        let dropped = engine.positions()["B"];

        // selection-only change keeps the override
        let mut graph = engine.graph().clone();
        graph.upsert_selection(crate::Selection {
            from: "A".to_string(),
            to: "C".to_string(),
            rank: 1,
        });
        engine.set_graph(graph);
        assert_eq!(engine.positions()["B"], dropped);
        assert!(engine.is_pinned("B"));

        // node-set change recomputes and clears the pin
        let mut graph = engine.graph().clone();
        graph.order.push("D".to_string());
        graph.nodes.insert(
            "D".to_string(),
            crate::Node {
                label: "D".to_string(),
            },
        );
        engine.set_graph(graph);
        assert!(!engine.is_pinned("B"));
        assert_ne!(engine.positions()["B"], dropped);
    }

    #[test]
    fn drag_suppresses_pan_for_the_same_pointer() {
        let mut engine = engine_from("sociogram\nA\nB\nC\n");
        let view_before = engine.viewport().view;

        down_on(&mut engine, 1, "A");
        engine.dispatch_pointer(PointerEvent::new(1, PointerPhase::Move, 10.0, 10.0));

        assert_eq!(engine.viewport().view, view_before);
    }

    #[test]
    fn pointer_down_off_nodes_pans_the_viewport() {
        let mut engine = engine_from("sociogram\nA\nB\nC\n");
        let view_before = engine.viewport().view;

        // far corner of the canvas, away from the layout circle
        engine.dispatch_pointer(PointerEvent::new(1, PointerPhase::Down, 2.0, 2.0));
        engine.dispatch_pointer(PointerEvent::new(1, PointerPhase::Move, 66.0, 34.0));

        let view = engine.viewport().view;
        assert_ne!((view.x, view.y), (view_before.x, view_before.y));
        assert_eq!(view.width, view_before.width);

        engine.dispatch_pointer(PointerEvent::new(1, PointerPhase::Move, 2.0, 2.0));
        let restored = engine.viewport().view;
        assert!((restored.x - view_before.x).abs() < 1e-3);
        assert!((restored.y - view_before.y).abs() < 1e-3);
    }

    #[test]
    fn leave_ends_the_active_gesture() {
        let mut engine = engine_from("sociogram\nA\nB\nC\n");
        down_on(&mut engine, 1, "A");
        engine.dispatch_pointer(PointerEvent::new(1, PointerPhase::Leave, 0.0, 0.0));

        let before = engine.positions()["A"];
        let event = engine.dispatch_pointer(PointerEvent::new(1, PointerPhase::Move, 5.0, 5.0));
        assert!(event.is_none());
        assert_eq!(engine.positions()["A"], before);
    }

    #[test]
    fn up_without_down_is_swallowed() {
        let mut engine = engine_from("sociogram\nA\n");
        let event = engine.dispatch_pointer(PointerEvent::new(9, PointerPhase::Up, 0.0, 0.0));
        assert!(event.is_none());
    }

    #[test]
    fn deleting_a_node_removes_it_and_its_selections_from_the_scene() {
        let mut engine = engine_from(
            "sociogram\nA\nB\nC\nA ->|1| B\nB ->|2| A\nC ->|3| B\nA ->|2| C\n",
        );

        let mut graph = engine.graph().clone();
        assert!(graph.remove_node("B"));
        engine.set_graph(graph);

        let scene = engine.scene();
        assert!(scene.nodes.iter().all(|n| n.id != "B"));
        assert!(scene.edges.iter().all(|e| e.from != "B" && e.to != "B"));
        assert_eq!(scene.edges.len(), 1); // A -> C survives
        assert!(!engine.positions().contains_key("B"));
    }

    #[test]
    fn empty_graph_renders_an_empty_scene() {
        let engine = engine_from("sociogram\n");
        let scene = engine.scene();
        assert!(scene.nodes.is_empty());
        assert!(scene.edges.is_empty());
        assert!(engine.render_svg().unwrap().contains("<svg"));
    }

    #[test]
    fn concurrent_pointers_keep_independent_gestures() {
        let mut engine = engine_from("sociogram\nA\nB\nC\n");
        let view_before = engine.viewport().view;

        down_on(&mut engine, 1, "A");
        engine.dispatch_pointer(PointerEvent::new(2, PointerPhase::Down, 2.0, 2.0));

        // pointer 2 pans while pointer 1 drags
        engine.dispatch_pointer(PointerEvent::new(2, PointerPhase::Move, 30.0, 2.0));
        let moved = engine.dispatch_pointer(PointerEvent::new(1, PointerPhase::Move, 9.0, 9.0));

        assert!(matches!(
            moved,
            Some(EngineEvent::PositionChanged { ref node, .. }) if node == "A"
        ));
        assert_ne!(engine.viewport().view.x, view_before.x);
    }
}
