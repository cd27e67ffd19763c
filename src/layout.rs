//! Two-lane layout for the resource-allocation graph.
//!
//! Processes go on a vertical lane near the left edge of the canvas, resources on a
//! vertical lane near the right edge, both in index order from the top. Positions depend
//! only on the dimensions, the viewport and the params; cell values never move a node.

use crate::derive::{EdgeKind, RagEdge};
use crate::dims::Dimensions;
use crate::vec2::{trim_segment, Point, Segment};
use log::debug;

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutParams {
    /// x of the process lane
    pub left_margin: f64,
    /// distance of the resource lane from the right edge
    pub right_margin: f64,
    /// y of the first node on each lane
    pub first_y: f64,
    /// height subtracted before dividing the canvas among a lane's nodes
    pub gap_reserve: f64,
    /// lower bound on the center-to-center distance between lane neighbors
    pub min_gap: f64,

    pub process_half_width: f64,
    pub process_half_height: f64,
    pub process_corner_radius: f64,
    pub resource_radius: f64,
}

impl LayoutParams {
    pub fn new() -> Self {
        Self {
            left_margin: 90.0,
            right_margin: 120.0,
            first_y: 40.0,
            gap_reserve: 60.0,
            min_gap: 60.0,
            process_half_width: 32.0,
            process_half_height: 18.0,
            process_corner_radius: 10.0,
            resource_radius: 22.0,
        }
    }

    /// Center-to-center spacing for a lane holding `count` nodes.
    pub fn lane_gap(&self, count: usize, height: f64) -> f64 {
        let spread = (height - self.gap_reserve) / (count.max(1) as f64);
        // f64::max ignores a NaN spread
        self.min_gap.max(spread)
    }

    fn boundary_offset(&self, kind: NodeKind) -> f64 {
        match kind {
            NodeKind::Process => self.process_half_width,
            NodeKind::Resource => self.resource_radius,
        }
    }
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const DEFAULT_WIDTH: f64 = 500.0;
    pub const DEFAULT_HEIGHT: f64 = 360.0;

    /// A width or height that is zero, negative or NaN falls back to the default.
    pub fn new(width: f64, height: f64) -> Self {
        fn or_default(v: f64, default: f64) -> f64 {
            if v > 0.0 && v.is_finite() {
                v
            } else {
                default
            }
        }
        Self {
            width: or_default(width, Self::DEFAULT_WIDTH),
            height: or_default(height, Self::DEFAULT_HEIGHT),
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NodeKind {
    Process,
    Resource,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub dims: Dimensions,
    pub viewport: Viewport,
    pub params: LayoutParams,
    /// process_pos[i] = center of P{i}
    pub process_pos: Vec<Point>,
    /// resource_pos[j] = center of R{j}
    pub resource_pos: Vec<Point>,
}

pub fn layout(dims: Dimensions, viewport: Viewport, params: &LayoutParams) -> Layout {
    let p = dims.processes();
    let r = dims.resources();
    let left_x = params.left_margin;
    let right_x = viewport.width - params.right_margin;
    let p_gap = params.lane_gap(p, viewport.height);
    let r_gap = params.lane_gap(r, viewport.height);

    let process_pos: Vec<Point> = (0..p)
        .map(|i| Point::new(left_x, params.first_y + i as f64 * p_gap))
        .collect();
    let resource_pos: Vec<Point> = (0..r)
        .map(|j| Point::new(right_x, params.first_y + j as f64 * r_gap))
        .collect();

    let layout = Layout {
        dims,
        viewport,
        params: params.clone(),
        process_pos,
        resource_pos,
    };
    if layout.content_height() > viewport.height {
        debug!(
            "layout for {} overflows viewport: {} > {}",
            dims,
            layout.content_height(),
            viewport.height
        );
    }
    layout
}

impl Layout {
    pub fn process(&self, i: usize) -> Option<Point> {
        self.process_pos.get(i).copied()
    }

    pub fn resource(&self, j: usize) -> Option<Point> {
        self.resource_pos.get(j).copied()
    }

    /// The lowest point any node reaches. Larger than the viewport height when a lane
    /// had to fall back to `min_gap`.
    pub fn content_height(&self) -> f64 {
        let last_p = self
            .process_pos
            .last()
            .map(|p| p.y + self.params.process_half_height);
        let last_r = self
            .resource_pos
            .last()
            .map(|p| p.y + self.params.resource_radius);
        last_p.into_iter().chain(last_r).fold(0.0, f64::max)
    }

    /// The drawn line for an edge, oriented the way its arrow points and trimmed so
    /// both ends sit on the node outlines. `None` if the edge names a node that is not
    /// part of this layout.
    pub fn edge_segment(&self, edge: &RagEdge) -> Option<Segment> {
        let p = self.process(edge.process)?;
        let r = self.resource(edge.resource)?;
        let p_off = self.params.boundary_offset(NodeKind::Process);
        let r_off = self.params.boundary_offset(NodeKind::Resource);
        Some(match edge.kind {
            EdgeKind::Allocation => trim_segment(r, p, r_off, p_off),
            EdgeKind::Request => trim_segment(p, r, p_off, r_off),
        })
    }
}
