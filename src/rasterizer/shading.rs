//! Diffuse lighting, evaluated per vertex before projection

use super::math::Vec3;
use super::types::{Light, ShadingMode, Triangle, Vertex};

/// Lambert term for one vertex: reflectance * max(0, n . l) * light color.
///
/// Nothing is clamped here; the image writer clamps when it quantizes.
pub fn shade(normal: Vec3, reflectance: Vec3, light: &Light) -> Vec3 {
    let diffuse = normal.dot(light.direction.normalize()).max(0.0);
    reflectance.mul_elem(light.color).scale(diffuse)
}

fn shade_vertex(v: &Vertex, light: &Light) -> Vertex {
    Vertex {
        color: shade(v.normal, v.color, light),
        ..*v
    }
}

/// Replace each vertex color with its lit color.
pub fn shade_triangle(t: &Triangle, light: &Light, mode: ShadingMode) -> Triangle {
    match mode {
        ShadingMode::None => *t,
        ShadingMode::Flat | ShadingMode::Smooth => Triangle {
            v1: shade_vertex(&t.v1, light),
            v2: shade_vertex(&t.v2, light),
            v3: shade_vertex(&t.v3, light),
            ..*t
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_light_keeps_reflectance() {
        let light = Light::default();
        let c = shade(Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.5, 0.25), &light);
        assert_eq!(c, Vec3::new(1.0, 0.5, 0.25));
    }

    #[test]
    fn test_facing_away_is_black() {
        let light = Light::default();
        let c = shade(Vec3::new(0.0, 0.0, -1.0), Vec3::ONE, &light);
        assert_eq!(c, Vec3::ZERO);
    }

    #[test]
    fn test_oblique_and_colored_light() {
        let light = Light {
            direction: Vec3::new(0.0, 0.0, 2.0),
            color: Vec3::new(2.0, 1.0, 0.0),
        };
        let n = Vec3::new(0.0, 0.6, 0.8);
        let c = shade(n, Vec3::ONE, &light);
        assert!((c.x - 1.6).abs() < 1e-6);
        assert!((c.y - 0.8).abs() < 1e-6);
        assert_eq!(c.z, 0.0);
    }

    #[test]
    fn test_no_clamp_above_one() {
        let light = Light {
            direction: Vec3::new(0.0, 0.0, 1.0),
            color: Vec3::new(3.0, 3.0, 3.0),
        };
        let c = shade(Vec3::new(0.0, 0.0, 1.0), Vec3::ONE, &light);
        assert_eq!(c, Vec3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn test_shade_triangle_modes() {
        let n = Vec3::new(0.0, 0.0, -1.0);
        let v = Vertex::new(Vec3::ZERO, Vec3::ONE, n);
        let t = Triangle::new(v, v, v, n);
        let light = Light::default();

        assert_eq!(shade_triangle(&t, &light, ShadingMode::None), t);
        let lit = shade_triangle(&t, &light, ShadingMode::Flat);
        assert_eq!(lit.v1.color, Vec3::ZERO);
        assert_eq!(lit.v1.position, t.v1.position);
    }
}
