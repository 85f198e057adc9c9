//! Canvas 2D wireframe renderer
//!
//! Draws a ground grid and the bounding box of every element, projected
//! through the viewer camera.

use crate::state::ViewerCore;
use ifc_viewer_model::Aabb;
use ifc_viewer_scene::Camera;
use web_sys::CanvasRenderingContext2d;

/// Half size of the ground grid in metres
const GRID_EXTENT: i32 = 20;
const GRID_STEP: f32 = 1.0;

const BACKGROUND: &str = "#1e1e24";
const GRID_COLOR: &str = "#3a3a44";
const AXIS_COLOR: &str = "#5a5a6a";
const ELEMENT_COLOR: &str = "#9fb4c7";
const SELECTED_COLOR: &str = "#ffb000";
const HOVER_COLOR: &str = "#ffffff";

/// Box edges as corner index pairs (see [`Aabb::corners`])
#[rustfmt::skip]
const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1), (1, 2), (2, 3), (3, 0),
    (4, 5), (5, 6), (6, 7), (7, 4),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

type Segment = ([f32; 3], [f32; 3]);

/// Grid lines on the y = 0 plane; the two centre lines come first
pub fn grid_lines(extent: i32, step: f32) -> Vec<Segment> {
    let half = extent as f32 * step;
    let mut lines = vec![
        ([-half, 0.0, 0.0], [half, 0.0, 0.0]),
        ([0.0, 0.0, -half], [0.0, 0.0, half]),
    ];
    for i in (-extent..=extent).filter(|i| *i != 0) {
        let offset = i as f32 * step;
        lines.push(([-half, 0.0, offset], [half, 0.0, offset]));
        lines.push(([offset, 0.0, -half], [offset, 0.0, half]));
    }
    lines
}

pub fn box_edges(aabb: &Aabb) -> Vec<Segment> {
    let corners = aabb.corners();
    BOX_EDGES
        .iter()
        .map(|&(a, b)| (corners[a], corners[b]))
        .collect()
}

/// Project a segment to pixels; `None` when either end is behind the camera
fn project_segment(
    camera: &Camera,
    segment: &Segment,
    width: f32,
    height: f32,
) -> Option<([f32; 2], [f32; 2])> {
    Some((
        camera.project(segment.0, width, height)?,
        camera.project(segment.1, width, height)?,
    ))
}

fn stroke_segments(
    ctx: &CanvasRenderingContext2d,
    camera: &Camera,
    segments: &[Segment],
    color: &str,
    line_width: f64,
    width: f32,
    height: f32,
) {
    ctx.set_stroke_style_str(color);
    ctx.set_line_width(line_width);
    ctx.begin_path();
    for segment in segments {
        if let Some((a, b)) = project_segment(camera, segment, width, height) {
            ctx.move_to(a[0] as f64, a[1] as f64);
            ctx.line_to(b[0] as f64, b[1] as f64);
        }
    }
    ctx.stroke();
}

/// Redraw the whole frame
pub fn draw(ctx: &CanvasRenderingContext2d, core: &ViewerCore, width: f32, height: f32) {
    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, width as f64, height as f64);

    let camera = &core.camera;
    let grid = grid_lines(GRID_EXTENT, GRID_STEP);
    let (axes, rest) = grid.split_at(2);
    stroke_segments(ctx, camera, rest, GRID_COLOR, 1.0, width, height);
    stroke_segments(ctx, camera, axes, AXIS_COLOR, 1.5, width, height);

    let hovered = core.highlighter.hovered();
    let mut normal = Vec::new();
    let mut selected = Vec::new();
    let mut hover = Vec::new();

    for (node_id, node) in core.scene.iter() {
        for element in &node.elements {
            let edges = box_edges(&element.bounds);
            if core.highlighter.is_selected(node_id, element.id) {
                selected.extend(edges);
            } else if hovered == Some((node_id, element.id)) {
                hover.extend(edges);
            } else {
                normal.extend(edges);
            }
        }
    }

    stroke_segments(ctx, camera, &normal, ELEMENT_COLOR, 1.0, width, height);
    stroke_segments(ctx, camera, &hover, HOVER_COLOR, 1.5, width, height);
    stroke_segments(ctx, camera, &selected, SELECTED_COLOR, 2.5, width, height);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_line_count() {
        let lines = grid_lines(2, 1.0);
        // 5 lines per direction
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], ([-2.0, 0.0, 0.0], [2.0, 0.0, 0.0]));
        assert!(lines.iter().all(|(a, b)| a[1] == 0.0 && b[1] == 0.0));
    }

    #[test]
    fn test_box_edges_are_axis_aligned() {
        let edges = box_edges(&Aabb::new([0.0, 0.0, 0.0], [1.0, 2.0, 3.0]));
        assert_eq!(edges.len(), 12);
        for (a, b) in edges {
            let changed = (0..3).filter(|&i| a[i] != b[i]).count();
            assert_eq!(changed, 1, "edge {a:?} -> {b:?}");
        }
    }

    #[test]
    fn test_segment_behind_camera_skipped() {
        let mut camera = Camera::default();
        camera.set_look_at([0.0, 0.0, 10.0], [0.0, 0.0, 0.0]);
        let behind = ([0.0, 0.0, 20.0], [1.0, 0.0, 20.0]);
        assert!(project_segment(&camera, &behind, 800.0, 600.0).is_none());
        let front = ([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        assert!(project_segment(&camera, &front, 800.0, 600.0).is_some());
    }
}
