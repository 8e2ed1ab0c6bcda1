use crate::resource::Locator;

/// Vertex attribute semantic. Each maps to a fixed shader location.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexAttr {
    Position,
    Normal,
    TexCoord0,
    Color0,
}

impl VertexAttr {
    /// `@location(n)` the attribute is bound to in shaders.
    pub const fn shader_location(self) -> u32 {
        match self {
            VertexAttr::Position => 0,
            VertexAttr::Normal => 1,
            VertexAttr::TexCoord0 => 2,
            VertexAttr::Color0 => 3,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexFormat {
    Float2,
    Float3,
    Float4,
    /// Four signed bytes normalized to `[-1, 1]`.
    Byte4N,
    /// Four unsigned bytes normalized to `[0, 1]`.
    UByte4N,
}

impl VertexFormat {
    pub const fn byte_size(self) -> u32 {
        match self {
            VertexFormat::Float2 => 8,
            VertexFormat::Float3 => 12,
            VertexFormat::Float4 => 16,
            VertexFormat::Byte4N | VertexFormat::UByte4N => 4,
        }
    }
}

/// Interleaved vertex layout; components are packed in insertion order.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct VertexLayout {
    components: Vec<(VertexAttr, VertexFormat)>,
}

impl VertexLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, attr: VertexAttr, format: VertexFormat) -> &mut Self {
        self.components.push((attr, format));
        self
    }

    pub fn components(&self) -> &[(VertexAttr, VertexFormat)] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn contains(&self, attr: VertexAttr) -> bool {
        self.components.iter().any(|&(a, _)| a == attr)
    }

    /// Size of one vertex in bytes.
    pub fn byte_size(&self) -> u32 {
        self.components.iter().map(|&(_, f)| f.byte_size()).sum()
    }

    /// Byte offset of each component inside a vertex.
    pub fn offsets(&self) -> impl Iterator<Item = (VertexAttr, VertexFormat, u32)> + '_ {
        self.components.iter().scan(0u32, |offset, &(attr, format)| {
            let at = *offset;
            *offset += format.byte_size();
            Some((attr, format, at))
        })
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum PrimitiveType {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum IndexType {
    #[default]
    None,
    Index16,
    Index32,
}

impl IndexType {
    pub const fn byte_size(self) -> usize {
        match self {
            IndexType::None => 0,
            IndexType::Index16 => 2,
            IndexType::Index32 => 4,
        }
    }
}

/// Range of elements (indices, or vertices for non-indexed meshes) drawn by one draw call.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PrimitiveGroup {
    pub base_element: u32,
    pub num_elements: u32,
}

impl PrimitiveGroup {
    pub const fn new(base_element: u32, num_elements: u32) -> Self {
        Self { base_element, num_elements }
    }

    /// One past the last element, or `None` when the range leaves `u32`.
    pub const fn end(self) -> Option<u32> {
        self.base_element.checked_add(self.num_elements)
    }
}

/// Setup object for mesh resources: vertex/index data plus primitive groups.
#[derive(Debug, Clone, Default)]
pub struct MeshSetup {
    pub locator: Locator,
    pub layout: VertexLayout,
    pub primitive_type: PrimitiveType,
    pub index_type: IndexType,
    pub num_vertices: u32,
    pub num_indices: u32,
    pub primitive_groups: Vec<PrimitiveGroup>,
    pub vertex_data: Vec<u8>,
    pub index_data: Vec<u8>,
}

impl MeshSetup {
    /// Non-indexed mesh from raw interleaved vertex bytes.
    pub fn from_vertices(layout: VertexLayout, vertex_data: Vec<u8>) -> Self {
        let stride = layout.byte_size().max(1) as usize;
        let num_vertices = (vertex_data.len() / stride) as u32;
        Self {
            layout,
            num_vertices,
            vertex_data,
            ..Self::default()
        }
    }

    pub fn with_indices16(mut self, indices: &[u16]) -> Self {
        self.index_type = IndexType::Index16;
        self.num_indices = indices.len() as u32;
        self.index_data = bytemuck::cast_slice(indices).to_vec();
        self
    }

    pub fn with_indices32(mut self, indices: &[u32]) -> Self {
        self.index_type = IndexType::Index32;
        self.num_indices = indices.len() as u32;
        self.index_data = bytemuck::cast_slice(indices).to_vec();
        self
    }

    pub fn add_primitive_group(&mut self, group: PrimitiveGroup) -> &mut Self {
        self.primitive_groups.push(group);
        self
    }

    pub fn is_indexed(&self) -> bool {
        self.index_type != IndexType::None
    }

    /// Number of addressable elements for primitive groups.
    pub fn num_elements(&self) -> u32 {
        if self.is_indexed() { self.num_indices } else { self.num_vertices }
    }

    /// Checks the setup for internal consistency.
    pub fn validate(&self) -> Result<(), String> {
        if self.layout.is_empty() {
            return Err("vertex layout is empty".into());
        }
        if !self.layout.contains(VertexAttr::Position) {
            return Err("vertex layout has no position attribute".into());
        }
        if self.num_vertices == 0 {
            return Err("mesh has no vertices".into());
        }

        let expected = self.num_vertices as usize * self.layout.byte_size() as usize;
        if self.vertex_data.len() != expected {
            return Err(format!(
                "vertex data is {} bytes, layout expects {expected}",
                self.vertex_data.len()
            ));
        }

        let expected = self.num_indices as usize * self.index_type.byte_size();
        if self.index_data.len() != expected {
            return Err(format!(
                "index data is {} bytes, index type expects {expected}",
                self.index_data.len()
            ));
        }

        if self.primitive_groups.is_empty() {
            return Err("mesh has no primitive groups".into());
        }

        let num_elements = self.num_elements();
        for (i, group) in self.primitive_groups.iter().enumerate() {
            match group.end() {
                Some(end) if end <= num_elements => {}
                Some(end) => {
                    return Err(format!(
                        "primitive group {i} ends at element {end}, mesh has {num_elements}"
                    ));
                }
                None => {
                    return Err(format!(
                        "primitive group {i} overflows ({} + {} elements)",
                        group.base_element, group.num_elements
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> VertexLayout {
        let mut l = VertexLayout::new();
        l.add(VertexAttr::Position, VertexFormat::Float3)
            .add(VertexAttr::Normal, VertexFormat::Byte4N);
        l
    }

    fn triangle() -> MeshSetup {
        let mut setup = MeshSetup::from_vertices(layout(), vec![0u8; 3 * 16]);
        setup.add_primitive_group(PrimitiveGroup::new(0, 3));
        setup
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn layout_size_and_offsets() {
        let l = layout();
        assert_eq!(l.byte_size(), 16);
        let offsets: Vec<_> = l.offsets().map(|(_, _, o)| o).collect();
        assert_eq!(offsets, vec![0, 12]);
    }

    #[test]
    fn attributes_have_fixed_locations() {
        assert_eq!(VertexAttr::Position.shader_location(), 0);
        assert_eq!(VertexAttr::Normal.shader_location(), 1);
    }

    // ── validate ──────────────────────────────────────────────────────────

    #[test]
    fn from_vertices_derives_vertex_count() {
        assert_eq!(triangle().num_vertices, 3);
        assert!(triangle().validate().is_ok());
    }

    #[test]
    fn indexed_mesh_validates_against_index_count() {
        let mut setup = MeshSetup::from_vertices(layout(), vec![0u8; 4 * 16]).with_indices16(&[0, 1, 2, 0, 2, 3]);
        setup.add_primitive_group(PrimitiveGroup::new(0, 6));
        assert!(setup.validate().is_ok());
        assert_eq!(setup.index_data.len(), 12);
    }

    #[test]
    fn group_past_end_is_rejected() {
        let mut setup = triangle();
        setup.add_primitive_group(PrimitiveGroup::new(2, 2));
        assert!(setup.validate().is_err());
    }

    #[test]
    fn overflowing_group_is_rejected() {
        let mut setup = triangle();
        setup.add_primitive_group(PrimitiveGroup::new(u32::MAX, 2));
        assert_eq!(PrimitiveGroup::new(u32::MAX, 2).end(), None);
        assert!(setup.validate().unwrap_err().contains("overflows"));
    }

    #[test]
    fn missing_groups_are_rejected() {
        let setup = MeshSetup::from_vertices(layout(), vec![0u8; 3 * 16]);
        assert!(setup.validate().is_err());
    }

    #[test]
    fn data_size_mismatch_is_rejected() {
        let mut setup = triangle();
        setup.vertex_data.pop();
        assert!(setup.validate().is_err());
    }

    #[test]
    fn layout_without_position_is_rejected() {
        let mut l = VertexLayout::new();
        l.add(VertexAttr::Normal, VertexFormat::Byte4N);
        let mut setup = MeshSetup::from_vertices(l, vec![0u8; 12]);
        setup.add_primitive_group(PrimitiveGroup::new(0, 3));
        assert!(setup.validate().is_err());
    }
}
