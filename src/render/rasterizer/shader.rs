//! Pixel shaders for triangle rasterization.
//!
//! The rasterizer handles coverage, depth and perspective correction; a
//! shader turns the final barycentric weights into a [`Fragment`].
//!
//! Two material shaders exist so that disabling lighting removes the lighting
//! code from the inner loop instead of multiplying it by zero:
//! - [`UnlitShader`]: `emissive + base`
//! - [`PhongShader`]: `emissive + (lambert + ambient) * base + specular`
//!
//! `base` comes from a [`BaseColor`]: the material diffuse color or a texture
//! sample.

use crate::colors::{self, Color};
use crate::light::CameraLight;
use crate::math::{Vec2, Vec3};
use crate::scene::Material;
use crate::texture::Texture;
use crate::vertex::Vertex;

/// Everything written to the frame buffers for one covered pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fragment {
    pub color: Color,
    /// Camera-space position.
    pub position: Vec3,
    /// Unit camera-space normal.
    pub normal: Vec3,
}

/// Trait for per-pixel shading computations.
///
/// `lambda` holds the barycentric weights of the three vertices, already
/// perspective-corrected, summing to 1.
pub trait PixelShader {
    fn shade(&self, lambda: [f32; 3]) -> Fragment;
}

#[inline]
fn mix3(lambda: [f32; 3], a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    a * lambda[0] + b * lambda[1] + c * lambda[2]
}

#[inline]
fn mix2(lambda: [f32; 3], a: Vec2, b: Vec2, c: Vec2) -> Vec2 {
    a * lambda[0] + b * lambda[1] + c * lambda[2]
}

/// Interpolated position, normal and UV of the three triangle corners.
#[derive(Clone, Copy)]
struct Corners<'a>(&'a [Vertex; 3]);

impl Corners<'_> {
    #[inline]
    fn position(&self, lambda: [f32; 3]) -> Vec3 {
        let [a, b, c] = self.0;
        mix3(lambda, a.position, b.position, c.position)
    }

    #[inline]
    fn normal(&self, lambda: [f32; 3]) -> Vec3 {
        let [a, b, c] = self.0;
        mix3(lambda, a.normal, b.normal, c.normal).normalize()
    }

    #[inline]
    fn uv(&self, lambda: [f32; 3]) -> Vec2 {
        let [a, b, c] = self.0;
        mix2(lambda, a.uv, b.uv, c.uv)
    }
}

/// Where the unlit surface color comes from.
#[derive(Clone, Copy)]
pub enum BaseColor<'a> {
    Diffuse(Color),
    Texture(&'a Texture),
}

impl<'a> BaseColor<'a> {
    /// Texture if texturing is on and the material has a non-empty one,
    /// diffuse color otherwise.
    pub fn for_material(material: &'a Material, texturing: bool) -> Self {
        match material.active_texture() {
            Some(texture) if texturing => Self::Texture(texture),
            _ => Self::Diffuse(material.diffuse),
        }
    }

    #[inline]
    fn at(&self, corners: Corners, lambda: [f32; 3]) -> Color {
        match self {
            Self::Diffuse(color) => *color,
            Self::Texture(texture) => {
                let uv = corners.uv(lambda);
                texture.sample(uv.x, uv.y).unwrap_or(colors::BLACK)
            }
        }
    }
}

/// Shader used when lighting is disabled.
pub struct UnlitShader<'a> {
    corners: Corners<'a>,
    base: BaseColor<'a>,
    emissive: Color,
}

impl<'a> UnlitShader<'a> {
    pub fn new(vertices: &'a [Vertex; 3], material: &'a Material, base: BaseColor<'a>) -> Self {
        Self {
            corners: Corners(vertices),
            base,
            emissive: material.emissive,
        }
    }
}

impl PixelShader for UnlitShader<'_> {
    #[inline]
    fn shade(&self, lambda: [f32; 3]) -> Fragment {
        Fragment {
            color: self.emissive + self.base.at(self.corners, lambda),
            position: self.corners.position(lambda),
            normal: self.corners.normal(lambda),
        }
    }
}

/// Lambert + ambient + Blinn-style specular shading.
pub struct PhongShader<'a> {
    corners: Corners<'a>,
    base: BaseColor<'a>,
    material: &'a Material,
    light: CameraLight,
    ambient: f32,
}

impl<'a> PhongShader<'a> {
    pub fn new(
        vertices: &'a [Vertex; 3],
        material: &'a Material,
        base: BaseColor<'a>,
        light: CameraLight,
        ambient: f32,
    ) -> Self {
        Self {
            corners: Corners(vertices),
            base,
            material,
            light,
            ambient,
        }
    }
}

impl PixelShader for PhongShader<'_> {
    #[inline]
    fn shade(&self, lambda: [f32; 3]) -> Fragment {
        let position = self.corners.position(lambda);
        let normal = self.corners.normal(lambda);
        let base = self.base.at(self.corners, lambda);

        let light_dir = self.light.direction_at(position);
        let diffuse = normal.dot(light_dir).max(0.0);
        let mut color = self.material.emissive + base * (diffuse + self.ambient);

        if self.material.has_specular() {
            // The eye sits at the camera-space origin.
            let view_dir = position.normalize();
            let half = (light_dir - view_dir).normalize();
            let specular = half.dot(normal).max(0.0).powf(self.material.shininess);
            color += self.material.specular * specular;
        }

        Fragment {
            color,
            position,
            normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Image;
    use approx::assert_relative_eq;

    fn facing_triangle() -> [Vertex; 3] {
        [
            Vertex::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, Vec2::new(0.0, 0.0)),
            Vertex::new(Vec3::new(1.0, 0.0, -5.0), Vec3::Z, Vec2::new(1.0, 0.0)),
            Vertex::new(Vec3::new(0.0, 1.0, -5.0), Vec3::Z, Vec2::new(0.0, 1.0)),
        ]
    }

    #[test]
    fn unlit_adds_emissive_to_base() {
        let tri = facing_triangle();
        let material = Material {
            emissive: Vec3::new(0.1, 0.0, 0.0),
            ..Material::matte(Vec3::new(0.2, 0.3, 0.4))
        };
        let shader = UnlitShader::new(&tri, &material, BaseColor::for_material(&material, true));
        let f = shader.shade([1.0, 0.0, 0.0]);
        assert_relative_eq!(f.color.x, 0.3, epsilon = 1e-6);
        assert_eq!(f.position, tri[0].position);
        assert_eq!(f.normal, Vec3::Z);
    }

    #[test]
    fn phong_head_on_light_is_diffuse_plus_ambient() {
        let tri = facing_triangle();
        let material = Material::matte(Vec3::new(0.5, 0.5, 0.5));
        let shader = PhongShader::new(
            &tri,
            &material,
            BaseColor::for_material(&material, true),
            CameraLight::Directional(Vec3::Z),
            0.2,
        );
        let f = shader.shade([1.0 / 3.0; 3]);
        assert_relative_eq!(f.color.x, 0.5 * 1.2, epsilon = 1e-5);
    }

    #[test]
    fn phong_specular_peaks_on_mirror_direction() {
        let tri = facing_triangle();
        let material = Material {
            diffuse: Vec3::ZERO,
            specular: Vec3::ONE,
            shininess: 8.0,
            ..Material::default()
        };
        // Pixel straight ahead of the eye, light behind the eye: half vector == normal.
        let at_axis = [
            Vertex::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, Vec2::ZERO),
            tri[1],
            tri[2],
        ];
        let shader = PhongShader::new(
            &at_axis,
            &material,
            BaseColor::for_material(&material, true),
            CameraLight::Directional(Vec3::Z),
            0.0,
        );
        let f = shader.shade([1.0, 0.0, 0.0]);
        assert_relative_eq!(f.color.x, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn texture_replaces_diffuse_only_when_enabled() {
        let tri = facing_triangle();
        let red = Vec3::new(1.0, 0.0, 0.0);
        let material = Material {
            texture: Some(Texture::new(Image::new(1, 1, red))),
            ..Material::matte(Vec3::ONE)
        };
        let textured = UnlitShader::new(&tri, &material, BaseColor::for_material(&material, true));
        assert_eq!(textured.shade([1.0, 0.0, 0.0]).color, red);
        let plain = UnlitShader::new(&tri, &material, BaseColor::for_material(&material, false));
        assert_eq!(plain.shade([1.0, 0.0, 0.0]).color, Vec3::ONE);
    }
}
