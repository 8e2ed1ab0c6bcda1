//! Procedural shapes packed into one indexed mesh.
//!
//! Vertices are `Float3` positions plus `Byte4N` normals (16 bytes); each
//! shape becomes one primitive group. Triangles wind counter-clockwise seen
//! from outside.

use std::f32::consts::{PI, TAU};

use anyhow::{ensure, Result};
use glam::Vec3;
use prism_engine::render::setup::{MeshSetup, PrimitiveGroup, VertexAttr, VertexFormat, VertexLayout};

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedVertex {
    pub position: [f32; 3],
    pub normal: [i8; 4],
}

/// Packs a unit vector into signed normalized bytes.
pub fn pack_normal(n: Vec3) -> [i8; 4] {
    let n = n.normalize_or_zero() * 127.0;
    [n.x.round() as i8, n.y.round() as i8, n.z.round() as i8, 0]
}

#[derive(Default)]
pub struct ShapeBuilder {
    vertices: Vec<PackedVertex>,
    indices: Vec<u16>,
    groups: Vec<PrimitiveGroup>,
    overflow: bool,
}

impl ShapeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout() -> VertexLayout {
        let mut layout = VertexLayout::new();
        layout
            .add(VertexAttr::Position, VertexFormat::Float3)
            .add(VertexAttr::Normal, VertexFormat::Byte4N);
        layout
    }

    /// Axis-aligned box centered at the origin, each face split into `tiles`².
    pub fn cuboid(&mut self, w: f32, h: f32, d: f32, tiles: u32) -> &mut Self {
        let (hw, hh, hd) = (w * 0.5, h * 0.5, d * 0.5);
        let faces = [
            (Vec3::new(hw, -hh, hd), Vec3::new(0.0, 0.0, -d), Vec3::new(0.0, h, 0.0)),
            (Vec3::new(-hw, -hh, -hd), Vec3::new(0.0, 0.0, d), Vec3::new(0.0, h, 0.0)),
            (Vec3::new(-hw, hh, hd), Vec3::new(w, 0.0, 0.0), Vec3::new(0.0, 0.0, -d)),
            (Vec3::new(-hw, -hh, -hd), Vec3::new(w, 0.0, 0.0), Vec3::new(0.0, 0.0, d)),
            (Vec3::new(-hw, -hh, hd), Vec3::new(w, 0.0, 0.0), Vec3::new(0.0, h, 0.0)),
            (Vec3::new(hw, -hh, -hd), Vec3::new(-w, 0.0, 0.0), Vec3::new(0.0, h, 0.0)),
        ];

        let start = self.indices.len();
        for (origin, u, v) in faces {
            self.quad_grid(origin, u, v, tiles);
        }
        self.close_group(start)
    }

    pub fn sphere(&mut self, radius: f32, slices: u32, stacks: u32) -> &mut Self {
        let start = self.indices.len();
        self.surface(slices, stacks, |s, t| {
            let phi = s * TAU;
            let lat = -PI * 0.5 + t * PI;
            let n = Vec3::new(lat.cos() * phi.cos(), lat.sin(), -lat.cos() * phi.sin());
            (n * radius, n)
        });
        self.close_group(start)
    }

    /// Capped cylinder along +Y, centered at the origin.
    pub fn cylinder(&mut self, radius: f32, length: f32, slices: u32, stacks: u32) -> &mut Self {
        let start = self.indices.len();
        let half = length * 0.5;

        self.surface(slices, stacks, |s, t| {
            let phi = s * TAU;
            let n = Vec3::new(phi.cos(), 0.0, -phi.sin());
            (Vec3::new(n.x * radius, -half + t * length, n.z * radius), n)
        });
        self.cap(radius, half, slices, Vec3::Y);
        self.cap(radius, -half, slices, Vec3::NEG_Y);

        self.close_group(start)
    }

    /// Torus around +Y; `ring_radius` is the tube radius.
    pub fn torus(&mut self, ring_radius: f32, radius: f32, sides: u32, rings: u32) -> &mut Self {
        let start = self.indices.len();
        self.surface(rings, sides, |s, t| {
            let phi = s * TAU;
            let psi = t * TAU;
            let center = Vec3::new(phi.cos(), 0.0, -phi.sin()) * radius;
            let n = Vec3::new(psi.cos() * phi.cos(), psi.sin(), -psi.cos() * phi.sin());
            (center + n * ring_radius, n)
        });
        self.close_group(start)
    }

    /// Plane in XZ facing +Y.
    pub fn plane(&mut self, w: f32, d: f32, tiles: u32) -> &mut Self {
        let start = self.indices.len();
        self.quad_grid(
            Vec3::new(-w * 0.5, 0.0, d * 0.5),
            Vec3::new(w, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -d),
            tiles,
        );
        self.close_group(start)
    }

    /// Finishes the mesh; fails if the shapes need more than 16-bit indices.
    pub fn build(&self) -> Result<MeshSetup> {
        ensure!(!self.overflow, "shapes exceed {} vertices", u16::MAX);
        ensure!(!self.groups.is_empty(), "no shapes added");

        let mut setup = MeshSetup::from_vertices(
            Self::layout(),
            bytemuck::cast_slice(&self.vertices).to_vec(),
        )
        .with_indices16(&self.indices);
        for &group in &self.groups {
            setup.add_primitive_group(group);
        }
        Ok(setup)
    }

    pub fn vertices(&self) -> &[PackedVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn groups(&self) -> &[PrimitiveGroup] {
        &self.groups
    }

    // ── internals ─────────────────────────────────────────────────────────

    fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u16 {
        let index = u16::try_from(self.vertices.len()).unwrap_or_else(|_| {
            self.overflow = true;
            0
        });
        self.vertices.push(PackedVertex {
            position: position.to_array(),
            normal: pack_normal(normal),
        });
        index
    }

    /// `(nu + 1) x (nv + 1)` vertex grid from `f(s, t)` with `s, t` in `[0, 1]`.
    /// Front faces point along `dP/ds x dP/dt`.
    fn surface(&mut self, nu: u32, nv: u32, f: impl Fn(f32, f32) -> (Vec3, Vec3)) {
        let mut grid = Vec::with_capacity(((nu + 1) * (nv + 1)) as usize);
        for j in 0..=nv {
            for i in 0..=nu {
                let (p, n) = f(i as f32 / nu as f32, j as f32 / nv as f32);
                grid.push(self.push_vertex(p, n));
            }
        }
        self.grid_indices(&grid, nu, nv);
    }

    fn quad_grid(&mut self, origin: Vec3, u: Vec3, v: Vec3, tiles: u32) {
        let normal = u.cross(v);
        self.surface(tiles, tiles, |s, t| (origin + u * s + v * t, normal));
    }

    fn grid_indices(&mut self, grid: &[u16], nu: u32, nv: u32) {
        let row = (nu + 1) as usize;
        for j in 0..nv as usize {
            for i in 0..nu as usize {
                let a = grid[j * row + i];
                let b = grid[j * row + i + 1];
                let c = grid[(j + 1) * row + i + 1];
                let d = grid[(j + 1) * row + i];
                self.indices.extend_from_slice(&[a, b, c, a, c, d]);
            }
        }
    }

    fn cap(&mut self, radius: f32, y: f32, slices: u32, normal: Vec3) {
        let center = self.push_vertex(Vec3::new(0.0, y, 0.0), normal);
        let ring: Vec<u16> = (0..=slices)
            .map(|k| {
                let phi = k as f32 / slices as f32 * TAU;
                self.push_vertex(Vec3::new(phi.cos() * radius, y, -phi.sin() * radius), normal)
            })
            .collect();

        for w in ring.windows(2) {
            if normal.y > 0.0 {
                self.indices.extend_from_slice(&[center, w[0], w[1]]);
            } else {
                self.indices.extend_from_slice(&[center, w[1], w[0]]);
            }
        }
    }

    fn close_group(&mut self, start: usize) -> &mut Self {
        let count = self.indices.len() - start;
        self.groups.push(PrimitiveGroup::new(start as u32, count as u32));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_shapes() -> ShapeBuilder {
        let mut b = ShapeBuilder::new();
        b.cuboid(1.0, 1.0, 1.0, 4)
            .sphere(0.75, 36, 20)
            .cylinder(0.5, 1.5, 36, 10)
            .torus(0.3, 0.5, 20, 36)
            .plane(1.5, 1.5, 10);
        b
    }

    fn position(v: &PackedVertex) -> Vec3 {
        Vec3::from_array(v.position)
    }

    fn unpack(v: &PackedVertex) -> Vec3 {
        Vec3::new(v.normal[0] as f32, v.normal[1] as f32, v.normal[2] as f32) / 127.0
    }

    #[test]
    fn one_contiguous_group_per_shape() {
        let b = five_shapes();
        let groups = b.groups();

        assert_eq!(groups.len(), 5);
        assert_eq!(groups[0].base_element, 0);
        for pair in groups.windows(2) {
            assert_eq!(pair[0].end(), Some(pair[1].base_element));
        }
        assert_eq!(groups[4].end(), Some(b.indices().len() as u32));
        assert!(groups.iter().all(|g| g.num_elements % 3 == 0 && g.num_elements > 0));
    }

    #[test]
    fn grid_sizes() {
        let mut b = ShapeBuilder::new();
        b.plane(1.0, 1.0, 10);
        assert_eq!(b.vertices().len(), 11 * 11);
        assert_eq!(b.indices().len(), 10 * 10 * 6);

        let mut b = ShapeBuilder::new();
        b.cuboid(1.0, 1.0, 1.0, 4);
        assert_eq!(b.vertices().len(), 6 * 5 * 5);
    }

    #[test]
    fn indices_stay_in_range() {
        let b = five_shapes();
        let n = b.vertices().len();
        assert!(b.indices().iter().all(|&i| (i as usize) < n));
    }

    #[test]
    fn packed_normals_are_unit_length() {
        let b = five_shapes();
        for v in b.vertices() {
            let len = unpack(v).length();
            assert!((len - 1.0).abs() < 0.02, "normal length {len}");
            assert_eq!(v.normal[3], 0);
        }
    }

    #[test]
    fn sphere_normals_point_outward() {
        let mut b = ShapeBuilder::new();
        b.sphere(0.75, 12, 8);
        for v in b.vertices() {
            assert!(position(v).dot(unpack(v)) > 0.0);
            assert!((position(v).length() - 0.75).abs() < 1e-4);
        }
    }

    #[test]
    fn box_triangles_face_outward() {
        let mut b = ShapeBuilder::new();
        b.cuboid(1.0, 1.0, 1.0, 1);
        let v = b.vertices();
        for tri in b.indices().chunks(3) {
            let [p0, p1, p2] = [0, 1, 2].map(|k| position(&v[tri[k] as usize]));
            let face_normal = (p1 - p0).cross(p2 - p0);
            let centroid = (p0 + p1 + p2) / 3.0;
            assert!(face_normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn cylinder_caps_face_away_from_center() {
        let mut b = ShapeBuilder::new();
        b.cylinder(0.5, 1.5, 8, 1);
        let v = b.vertices();
        let side_indices = 8 * 6;
        for tri in b.indices()[side_indices..].chunks(3) {
            let [p0, p1, p2] = [0, 1, 2].map(|k| position(&v[tri[k] as usize]));
            let face_normal = (p1 - p0).cross(p2 - p0);
            assert!(face_normal.y * p0.y > 0.0);
        }
    }

    #[test]
    fn build_produces_indexed_mesh() {
        let setup = five_shapes().build().unwrap();
        assert_eq!(setup.layout.byte_size(), 16);
        assert!(setup.is_indexed());
        assert_eq!(setup.primitive_groups.len(), 5);
        assert!(setup.validate().is_ok());
    }

    #[test]
    fn empty_builder_is_rejected() {
        assert!(ShapeBuilder::new().build().is_err());
    }

    #[test]
    fn too_many_vertices_is_rejected() {
        let mut b = ShapeBuilder::new();
        b.plane(1.0, 1.0, 300);
        assert!(b.build().is_err());
    }
}
