//! Edge function-based triangle rasterization.
//!
//! Every pixel of the triangle's screen-space bounding box is tested against
//! three edge equations. For an edge from A to B, the edge function at P is:
//!
//! ```text
//! E(P) = (P.x - A.x) * (B.y - A.y) - (P.y - A.y) * (B.x - A.x)
//! ```
//!
//! Triangles arrive with front faces having a positive signed area in screen
//! space (Y grows downward), so interior pixels have all three edge values
//! positive. The value of the edge opposite vertex `i`, divided by the area,
//! is the barycentric weight of vertex `i`.
//!
//! # Sampling and ties
//!
//! Pixels are sampled at their centers. A center lying exactly on an edge
//! belongs to the triangle only if that edge is a *top* or *left* edge, so a
//! pixel on an edge shared by two triangles is drawn exactly once.
//!
//! # Depth
//!
//! For perspective projections the depth is the camera distance, rebuilt from
//! the linearly interpolated reciprocal `1 / z`; the same factor corrects the
//! barycentric weights before shading. Orthographic projections interpolate
//! NDC z linearly and need no correction.
//!
//! # References
//!
//! - Juan Pineda, "A Parallel Algorithm for Polygon Rasterization" (1988)
//! - Scratchapixel: <https://www.scratchapixel.com/lessons/3d-basic-rendering/rasterization-practical-implementation>

use super::shader::PixelShader;
use super::{FrameStats, RasterState};
use crate::math::{Vec2, Vec3};
use crate::render::framebuffer::FrameBuffer;
use crate::vertex::Vertex;

/// Computes the edge function value for point P relative to edge (A -> B).
///
/// Positive when P is on the interior side of a front-facing triangle's edge,
/// zero when P lies exactly on the edge.
#[inline]
pub(crate) fn edge_function(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x)
}

/// One edge equation with its per-pixel increments.
#[derive(Clone, Copy, Debug)]
struct Edge {
    a: Vec2,
    b: Vec2,
    /// Change of the edge value for one pixel step to the right.
    step_x: f32,
    /// Whether pixels exactly on this edge are drawn (top-left rule).
    owns_boundary: bool,
}

impl Edge {
    fn new(a: Vec2, b: Vec2) -> Self {
        let d = b - a;
        Self {
            a,
            b,
            step_x: d.y,
            // Left edges go down the screen, top edges run horizontally leftwards.
            owns_boundary: d.y > 0.0 || (d.y == 0.0 && d.x < 0.0),
        }
    }

    #[inline]
    fn eval(&self, p: Vec2) -> f32 {
        edge_function(self.a, self.b, p)
    }

    #[inline]
    fn covers(&self, w: f32) -> bool {
        w > 0.0 || (w == 0.0 && self.owns_boundary)
    }
}

/// Map NDC to pixel coordinates; Y is flipped so row 0 is the top.
#[inline]
fn to_screen(ndc: Vec3, width: f32, height: f32) -> Vec2 {
    Vec2::new((1.0 + ndc.x) * width * 0.5, (1.0 - ndc.y) * height * 0.5)
}

/// Rasterize a camera-space triangle that lies entirely in front of the
/// near plane, calling `shader` for every covered pixel that passes the
/// depth test.
pub(crate) fn rasterize_with_shader<S: PixelShader>(
    buffer: &mut FrameBuffer,
    state: &RasterState,
    v: &[Vertex; 3],
    shader: &S,
    stats: &mut FrameStats,
) {
    let (width, height) = (buffer.width(), buffer.height());

    // ─────────────────────────────────────────────────────────────────────
    // Step 1: Project to NDC, then to pixel coordinates
    // ─────────────────────────────────────────────────────────────────────
    let ndc = v.map(|v| state.projection.project_point(v.position));
    let p = ndc.map(|n| to_screen(n, width as f32, height as f32));

    // ─────────────────────────────────────────────────────────────────────
    // Step 2: Reject triangles fully outside the image
    // ─────────────────────────────────────────────────────────────────────
    let lo = p[0].min(p[1]).min(p[2]);
    let hi = p[0].max(p[1]).max(p[2]);
    if hi.x < 0.0 || hi.y < 0.0 || lo.x > width as f32 || lo.y > height as f32 {
        stats.culled += 1;
        return;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Step 3: Signed area; drop back faces and degenerate triangles
    // ─────────────────────────────────────────────────────────────────────
    let area = edge_function(p[1], p[2], p[0]);
    // Written as a negated comparison so NaN areas are dropped too.
    if !(area > 0.0) {
        stats.culled += 1;
        return;
    }
    let inv_area = 1.0 / area;

    // Edge i is opposite vertex i.
    let edges = [
        Edge::new(p[1], p[2]),
        Edge::new(p[2], p[0]),
        Edge::new(p[0], p[1]),
    ];

    // Reciprocal camera distances for perspective-correct interpolation.
    let inv_z = v.map(|v| 1.0 / -v.position.z);
    let ndc_z = ndc.map(|n| n.z);

    // ─────────────────────────────────────────────────────────────────────
    // Step 4: Clamp the bounding box to the image
    // ─────────────────────────────────────────────────────────────────────
    let min_x = lo.x.floor().max(0.0) as usize;
    let min_y = lo.y.floor().max(0.0) as usize;
    let max_x = (hi.x.ceil().max(0.0) as usize).min(width);
    let max_y = (hi.y.ceil().max(0.0) as usize).min(height);

    // ─────────────────────────────────────────────────────────────────────
    // Step 5: Walk rows, stepping the edge values incrementally
    // ─────────────────────────────────────────────────────────────────────
    // Each row restarts from an exact evaluation, so rounding from the
    // x steps never carries over into the next row.
    for row in min_y..max_y {
        let start = Vec2::new(min_x as f32 + 0.5, row as f32 + 0.5);
        let mut w = edges.map(|e| e.eval(start));

        for col in min_x..max_x {
            let inside = edges[0].covers(w[0]) && edges[1].covers(w[1]) && edges[2].covers(w[2]);

            if inside {
                let k1 = w[1] * inv_area;
                let k2 = w[2] * inv_area;
                let mut lambda = [1.0 - k1 - k2, k1, k2];

                let depth = if state.info.perspective {
                    let z = 1.0 / (lambda[0] * inv_z[0] + lambda[1] * inv_z[1] + lambda[2] * inv_z[2]);
                    for (k, iz) in lambda.iter_mut().zip(inv_z) {
                        *k *= z * iz;
                    }
                    z
                } else {
                    lambda[0] * ndc_z[0] + lambda[1] * ndc_z[1] + lambda[2] * ndc_z[2]
                };

                if buffer.test_and_set_depth(row, col, depth) {
                    let fragment = shader.shade(lambda);
                    buffer.write_fragment(row, col, fragment.color, fragment.position, fragment.normal);
                    stats.pixels_shaded += 1;
                }
            }

            for (value, edge) in w.iter_mut().zip(&edges) {
                *value += edge.step_x;
            }
        }
    }
}
