use crate::resource::Locator;

/// One compiled flavor of a program, picked by an exact selection mask.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProgramVariant {
    pub mask: u32,
    /// WGSL source containing both stages.
    pub source: String,
    pub vs_entry: String,
    pub fs_entry: String,
}

impl ProgramVariant {
    pub fn new(mask: u32, source: impl Into<String>) -> Self {
        Self {
            mask,
            source: source.into(),
            vs_entry: "vs_main".to_owned(),
            fs_entry: "fs_main".to_owned(),
        }
    }
}

/// Index of the variant compiled for `mask`. Masks match exactly.
pub(crate) fn variant_index(masks: &[u32], mask: u32) -> Option<usize> {
    masks.iter().position(|&m| m == mask)
}

/// Setup object for shader programs.
#[derive(Debug, Clone, Default)]
pub struct ProgramSetup {
    pub locator: Locator,
    pub variants: Vec<ProgramVariant>,
    /// Size in bytes of the per-draw uniform block at `@group(0) @binding(0)`.
    /// Zero means the program takes no uniforms.
    pub uniform_block_size: u64,
}

impl ProgramSetup {
    /// Program with a single base variant (mask 0).
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            variants: vec![ProgramVariant::new(0, source)],
            ..Self::default()
        }
    }

    pub fn add_variant(&mut self, mask: u32, source: impl Into<String>) -> &mut Self {
        self.variants.push(ProgramVariant::new(mask, source));
        self
    }

    /// Declares the uniform block as `T`.
    pub fn with_uniform_block<T: bytemuck::Pod>(mut self) -> Self {
        self.uniform_block_size = std::mem::size_of::<T>() as u64;
        self
    }

    /// Selection masks of the variants, in variant order.
    pub fn variant_masks(&self) -> Vec<u32> {
        self.variants.iter().map(|v| v.mask).collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.variants.is_empty() {
            return Err("program has no variants".into());
        }

        for (i, variant) in self.variants.iter().enumerate() {
            if self.variants[..i].iter().any(|v| v.mask == variant.mask) {
                return Err(format!("duplicate variant mask {:#x}", variant.mask));
            }
            if variant.source.trim().is_empty() {
                return Err(format!("variant {:#x} has no source", variant.mask));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    #[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
    struct Block {
        mvp: [[f32; 4]; 4],
    }

    #[test]
    fn from_source_has_base_variant() {
        let setup = ProgramSetup::from_source("fn main() {}");
        assert_eq!(variant_index(&setup.variant_masks(), 0), Some(0));
        assert_eq!(variant_index(&setup.variant_masks(), 1), None);
        assert_eq!(setup.variants[0].vs_entry, "vs_main");
        assert!(setup.validate().is_ok());
    }

    #[test]
    fn variants_resolve_by_exact_mask() {
        let mut setup = ProgramSetup::from_source("a");
        setup.add_variant(0b10, "b").add_variant(0b11, "c");
        let masks = setup.variant_masks();
        assert_eq!(masks, vec![0, 0b10, 0b11]);
        assert_eq!(variant_index(&masks, 0b10), Some(1));
        assert_eq!(variant_index(&masks, 0b11), Some(2));
        assert_eq!(variant_index(&masks, 0b01), None);
    }

    #[test]
    fn duplicate_masks_are_rejected() {
        let mut setup = ProgramSetup::from_source("a");
        setup.add_variant(0, "b");
        assert!(setup.validate().is_err());
    }

    #[test]
    fn empty_program_is_rejected() {
        assert!(ProgramSetup::default().validate().is_err());
    }

    #[test]
    fn uniform_block_size_comes_from_type() {
        let setup = ProgramSetup::from_source("a").with_uniform_block::<Block>();
        assert_eq!(setup.uniform_block_size, 64);
    }
}
