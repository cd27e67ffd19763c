use crate::derive::{EdgeKind, RagEdgeSet};
use crate::layout::Layout;
use crate::vec2::{Point, Segment};
use core::fmt;
use log::debug;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NodeId {
    Process(usize),
    Resource(usize),
}

impl NodeId {
    pub fn label(self) -> String {
        match self {
            NodeId::Process(i) => format!("P{}", i),
            NodeId::Resource(j) => format!("R{}", j),
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            NodeId::Process(_) => "nodeProc",
            NodeId::Resource(_) => "nodeRes",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    RoundedRect {
        center: Point,
        half_width: f64,
        half_height: f64,
        corner_radius: f64,
    },
    Circle {
        center: Point,
        radius: f64,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub shape: Shape,
    pub label: String,
    /// Baseline anchor of the label; text is centered horizontally on it.
    pub label_at: Point,
}

/// How an edge kind is drawn.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EdgeStyle {
    pub class: &'static str,
    pub marker_id: &'static str,
    pub color: &'static str,
}

pub const ALLOCATION_STYLE: EdgeStyle = EdgeStyle {
    class: "edgeAlloc",
    marker_id: "arrowAlloc",
    color: "#22c55e",
};

pub const REQUEST_STYLE: EdgeStyle = EdgeStyle {
    class: "edgeNeed",
    marker_id: "arrowNeed",
    color: "#fb7185",
};

pub fn edge_style(kind: EdgeKind) -> EdgeStyle {
    match kind {
        EdgeKind::Allocation => ALLOCATION_STYLE,
        EdgeKind::Request => REQUEST_STYLE,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneEdge {
    pub kind: EdgeKind,
    pub process: usize,
    pub resource: usize,
    /// Arrow runs from `segment.from` to `segment.to`.
    pub segment: Segment,
}

impl SceneEdge {
    pub fn style(&self) -> EdgeStyle {
        edge_style(self.kind)
    }
}

/// Everything needed to draw one graph. A scene is never patched; each draw builds a
/// new one and the caller drops the old.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<SceneNode>,
    pub edges: Vec<SceneEdge>,
}

// label baseline sits a little below the node center so the text looks centered
const LABEL_BASELINE_DY: f64 = 4.0;

pub fn render(layout: &Layout, edges: &RagEdgeSet) -> Scene {
    let params = &layout.params;
    let mut nodes = Vec::with_capacity(layout.process_pos.len() + layout.resource_pos.len());

    for (i, &center) in layout.process_pos.iter().enumerate() {
        let id = NodeId::Process(i);
        nodes.push(SceneNode {
            id,
            shape: Shape::RoundedRect {
                center,
                half_width: params.process_half_width,
                half_height: params.process_half_height,
                corner_radius: params.process_corner_radius,
            },
            label: id.label(),
            label_at: Point::new(center.x, center.y + LABEL_BASELINE_DY),
        });
    }

    for (j, &center) in layout.resource_pos.iter().enumerate() {
        let id = NodeId::Resource(j);
        nodes.push(SceneNode {
            id,
            shape: Shape::Circle {
                center,
                radius: params.resource_radius,
            },
            label: id.label(),
            label_at: Point::new(center.x, center.y + LABEL_BASELINE_DY),
        });
    }

    let mut scene_edges = Vec::with_capacity(edges.len());
    for edge in edges.iter() {
        match layout.edge_segment(edge) {
            Some(segment) => scene_edges.push(SceneEdge {
                kind: edge.kind,
                process: edge.process,
                resource: edge.resource,
                segment,
            }),
            None => debug!("skipping edge outside the layout: {:?}", edge),
        }
    }

    Scene {
        width: layout.viewport.width,
        height: layout.viewport.height,
        nodes,
        edges: scene_edges,
    }
}

impl Scene {
    pub fn count_edges(&self, kind: EdgeKind) -> usize {
        self.edges.iter().filter(|e| e.kind == kind).count()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Standalone SVG document for this scene.
    pub fn svg(&self) -> Svg<'_> {
        Svg { scene: self }
    }

    pub fn to_svg(&self) -> String {
        self.svg().to_string()
    }
}

pub struct Svg<'a> {
    scene: &'a Scene,
}

const SVG_STYLE: &str = "\
.nodeProc{fill:#1e293b;stroke:#38bdf8;stroke-width:2}\
.nodeRes{fill:#1e293b;stroke:#facc15;stroke-width:2}\
.textNode{fill:#e2e8f0;font:13px sans-serif}\
.edgeAlloc{stroke:#22c55e;stroke-width:2}\
.edgeNeed{stroke:#fb7185;stroke-width:2;stroke-dasharray:6 4}";

impl<'a> fmt::Display for Svg<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.scene;
        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#,
            w = s.width,
            h = s.height
        )?;
        writeln!(f, "<style>{}</style>", SVG_STYLE)?;
        writeln!(f, "<defs>")?;
        for style in &[ALLOCATION_STYLE, REQUEST_STYLE] {
            writeln!(
                f,
                r#"<marker id="{}" viewBox="0 0 10 10" refX="8" refY="5" markerWidth="6" markerHeight="6" orient="auto"><path d="M 0 0 L 10 5 L 0 10 z" fill="{}"/></marker>"#,
                style.marker_id, style.color
            )?;
        }
        writeln!(f, "</defs>")?;

        for node in s.nodes.iter() {
            write!(f, "<g>")?;
            match node.shape {
                Shape::RoundedRect {
                    center,
                    half_width,
                    half_height,
                    corner_radius,
                } => write!(
                    f,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" class="{}"/>"#,
                    center.x - half_width,
                    center.y - half_height,
                    2.0 * half_width,
                    2.0 * half_height,
                    corner_radius,
                    node.id.class()
                )?,
                Shape::Circle { center, radius } => write!(
                    f,
                    r#"<circle cx="{}" cy="{}" r="{}" class="{}"/>"#,
                    center.x,
                    center.y,
                    radius,
                    node.id.class()
                )?,
            }
            writeln!(
                f,
                r#"<text x="{}" y="{}" text-anchor="middle" class="textNode">{}</text></g>"#,
                node.label_at.x, node.label_at.y, node.label
            )?;
        }

        for edge in s.edges.iter() {
            let style = edge.style();
            writeln!(
                f,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}" class="{}" marker-end="url(#{})"/>"#,
                edge.segment.from.x,
                edge.segment.from.y,
                edge.segment.to.x,
                edge.segment.to.y,
                style.class,
                style.marker_id
            )?;
        }
        write!(f, "</svg>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::GraphData;
    use crate::layout::{layout, LayoutParams, Viewport};
    use crate::scenario::example_scenario;

    fn example_scene() -> Scene {
        let ex = example_scenario();
        let edges = GraphData::from_model(&ex.alloc, &ex.max).edges();
        let l = layout(ex.dims, Viewport::default(), &LayoutParams::new());
        render(&l, &edges)
    }

    #[test]
    fn example_scene_contents() {
        let scene = example_scene();
        assert_eq!(scene.nodes.len(), 6);
        assert_eq!(scene.count_edges(EdgeKind::Allocation), 4);
        assert_eq!(scene.count_edges(EdgeKind::Request), 7);

        let p1 = scene.node(NodeId::Process(1)).unwrap();
        assert_eq!(p1.label, "P1");
        assert!(matches!(p1.shape, Shape::RoundedRect { .. }));
        let r2 = scene.node(NodeId::Resource(2)).unwrap();
        assert_eq!(r2.label, "R2");
        assert!(matches!(r2.shape, Shape::Circle { radius, .. } if radius == 22.0));

        for e in scene.edges.iter() {
            let expected = match e.kind {
                EdgeKind::Allocation => "edgeAlloc",
                EdgeKind::Request => "edgeNeed",
            };
            assert_eq!(e.style().class, expected);
        }
    }

    #[test]
    fn allocation_arrows_point_at_processes() {
        let scene = example_scene();
        for e in scene.edges.iter() {
            match e.kind {
                // process lane is on the left
                EdgeKind::Allocation => assert!(e.segment.to.x < e.segment.from.x),
                EdgeKind::Request => assert!(e.segment.to.x > e.segment.from.x),
            }
        }
    }

    #[test]
    fn rendering_is_idempotent() {
        let a = example_scene();
        let b = example_scene();
        assert_eq!(a, b);
        assert_eq!(a.to_svg(), b.to_svg());
    }

    #[test]
    fn svg_output() {
        let svg = example_scene().to_svg();
        assert!(svg.starts_with("<svg "));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"viewBox="0 0 500 360""#));
        assert!(svg.contains(r#"<marker id="arrowAlloc""#));
        assert!(svg.contains(r##"fill="#fb7185""##));
        assert_eq!(svg.matches("<rect ").count(), 3);
        assert_eq!(svg.matches("<circle ").count(), 3);
        assert_eq!(svg.matches(r#"class="edgeAlloc""#).count(), 4);
        assert_eq!(svg.matches(r#"class="edgeNeed""#).count(), 7);
        assert!(svg.contains(r#"<rect x="58" y="22" width="64" height="36" rx="10" class="nodeProc"/>"#));
        assert!(svg.contains(">R0</text>"));
    }
}
