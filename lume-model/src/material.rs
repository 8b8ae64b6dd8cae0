use crate::model::RenderState;
use crate::scene::{SceneMaterial, TextureSlot};

/// Texture paths resolved from a material, relative to the model file.
/// An empty path means the slot is unset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterialSlots {
    pub albedo: String,
    pub normal: String,
    pub opacity: String,
    pub rough: String,
    pub metal: String,
}

impl MaterialSlots {
    pub fn resolve(material: &SceneMaterial) -> Self {
        Self {
            albedo: material.texture(TextureSlot::Diffuse).to_owned(),
            normal: material.texture(TextureSlot::Height).to_owned(),
            opacity: material.texture(TextureSlot::Opacity).to_owned(),
            rough: material.texture(TextureSlot::Ambient).to_owned(),
            metal: material.texture(TextureSlot::Specular).to_owned(),
        }
    }

    /// An opacity map means the albedo alpha channel carries coverage, so
    /// the mesh goes through the transparent pipeline.
    pub fn state(&self) -> RenderState {
        if self.opacity.is_empty() {
            RenderState::Opaque
        } else {
            RenderState::Transparent
        }
    }

    /// Persisted slots in storage order. Opacity is classification only.
    pub fn persisted(&self) -> [(&'static str, &str); 4] {
        [
            ("albedo", self.albedo.as_str()),
            ("normal", self.normal.as_str()),
            ("rough", self.rough.as_str()),
            ("metal", self.metal.as_str()),
        ]
    }
}

pub fn classify(material: &SceneMaterial) -> (RenderState, MaterialSlots) {
    let slots = MaterialSlots::resolve(material);
    (slots.state(), slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_path_drives_state() {
        let plain = SceneMaterial::new("plain").with_texture(TextureSlot::Diffuse, "wood.png");
        assert_eq!(classify(&plain).0, RenderState::Opaque);

        let leaves = plain.clone().with_texture(TextureSlot::Opacity, "wood.png");
        assert_eq!(classify(&leaves).0, RenderState::Transparent);

        let blank = plain.with_texture(TextureSlot::Opacity, "");
        assert_eq!(classify(&blank).0, RenderState::Opaque);
    }

    #[test]
    fn slots_follow_source_conventions() {
        let material = SceneMaterial::new("metal")
            .with_texture(TextureSlot::Diffuse, "albedo.png")
            .with_texture(TextureSlot::Height, "normal.png")
            .with_texture(TextureSlot::Ambient, "rough.png")
            .with_texture(TextureSlot::Specular, "metal.png");
        let (_, slots) = classify(&material);
        assert_eq!(
            slots.persisted(),
            [
                ("albedo", "albedo.png"),
                ("normal", "normal.png"),
                ("rough", "rough.png"),
                ("metal", "metal.png"),
            ]
        );
        assert!(slots.opacity.is_empty());
    }
}
