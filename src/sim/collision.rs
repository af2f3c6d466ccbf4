//! Collision detection between rotated rectangles
//!
//! Bikes and trail segments are rectangles rotated about their origin, so hits are
//! found with the separating axis theorem over the four edge normals.

use glam::Vec2;

use crate::rotate_about;

/// Oriented bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    pub centre: Vec2,
    /// Half width and half height along `axes`
    pub half_extents: Vec2,
    /// Local x and y axes in world space (unit length)
    pub axes: [Vec2; 2],
}

impl Obb {
    /// Build from a local rectangle on a sprite at `pos`, rotated by `degrees` about `pos + origin`
    pub fn from_local_rect(pos: Vec2, origin: Vec2, degrees: f32, min: Vec2, max: Vec2) -> Self {
        let pivot = pos + origin;
        let local_centre = pos + (min + max) * 0.5;
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            centre: rotate_about(local_centre, pivot, degrees),
            half_extents: (max - min) * 0.5,
            axes: [Vec2::new(cos, sin), Vec2::new(-sin, cos)],
        }
    }

    /// Corners in winding order
    pub fn corners(&self) -> [Vec2; 4] {
        let ex = self.axes[0] * self.half_extents.x;
        let ey = self.axes[1] * self.half_extents.y;
        [
            self.centre - ex - ey,
            self.centre + ex - ey,
            self.centre + ex + ey,
            self.centre - ex + ey,
        ]
    }

    /// Half length of this box projected onto `axis`
    fn projected_radius(&self, axis: Vec2) -> f32 {
        self.half_extents.x * self.axes[0].dot(axis).abs()
            + self.half_extents.y * self.axes[1].dot(axis).abs()
    }

    /// Radius of the circle enclosing the box
    fn bounding_radius(&self) -> f32 {
        self.half_extents.length()
    }
}

/// Check two oriented boxes for overlap
///
/// Boxes that merely touch along an edge are not considered hitting.
pub fn obb_overlap(a: &Obb, b: &Obb) -> bool {
    let delta = a.centre - b.centre;

    // Cheap reject before the axis tests
    let reach = a.bounding_radius() + b.bounding_radius();
    if delta.length_squared() > reach * reach {
        return false;
    }

    // Separated along any edge normal means no hit
    a.axes.iter().chain(b.axes.iter()).all(|axis| {
        let distance = delta.dot(*axis).abs();
        a.projected_radius(*axis) + b.projected_radius(*axis) > distance
    })
}
