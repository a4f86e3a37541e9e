use crate::colors::Color;
use crate::math::Vec3;
use crate::texture::Texture;

/// Surface appearance shared by any number of meshes (held through `Rc`).
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub diffuse: Color,
    pub specular: Color,
    pub emissive: Color,
    /// Phong exponent. Zero disables the specular term.
    pub shininess: f32,
    /// Stored for loaders and exporters; shading ignores it.
    pub opacity: f32,
    pub texture: Option<Texture>,
    /// Where the texture came from, as named by the source file.
    pub texture_name: String,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: Vec3::new(0.7, 0.7, 0.9),
            specular: Vec3::splat(0.8),
            emissive: Vec3::ZERO,
            shininess: 12.0,
            opacity: 1.0,
            texture: None,
            texture_name: String::new(),
        }
    }
}

impl Material {
    /// A matte material of the given color with no specular highlight.
    pub fn matte(diffuse: Color) -> Self {
        Self {
            diffuse,
            shininess: 0.0,
            ..Self::default()
        }
    }

    /// The texture to sample, if there is one with at least one texel.
    pub fn active_texture(&self) -> Option<&Texture> {
        self.texture.as_ref().filter(|t| !t.is_empty())
    }

    pub fn has_specular(&self) -> bool {
        self.shininess != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_texture_is_not_active() {
        let m = Material {
            texture: Some(Texture::default()),
            ..Material::default()
        };
        assert!(m.active_texture().is_none());
    }

    #[test]
    fn matte_has_no_specular() {
        assert!(!Material::matte(Vec3::ONE).has_specular());
        assert!(Material::default().has_specular());
    }
}
