//! Group display colors.

use serde::{Deserialize, Serialize};

/// Saturation of randomly assigned group colors.
pub const RANDOM_SATURATION: f32 = 0.6;
/// Value (brightness) of randomly assigned group colors.
pub const RANDOM_VALUE: f32 = 0.9;

/// RGBA display color. Purely cosmetic.
///
/// Persisted as a plain `[r, g, b, a]` array. On load, three-component
/// arrays and `{ "r", "g", "b", "a" }` objects are accepted too; missing
/// components default to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ColorRepr", into = "[f32; 4]")]
pub struct GroupColor(pub [f32; 4]);

/// Accepted on-disk color shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Components(Vec<f32>),
    Channels {
        #[serde(default = "opaque")]
        r: f32,
        #[serde(default = "opaque")]
        g: f32,
        #[serde(default = "opaque")]
        b: f32,
        #[serde(default = "opaque")]
        a: f32,
    },
}

const fn opaque() -> f32 {
    1.0
}

impl From<ColorRepr> for GroupColor {
    fn from(repr: ColorRepr) -> Self {
        match repr {
            ColorRepr::Components(c) => Self::from(c),
            ColorRepr::Channels { r, g, b, a } => Self([r, g, b, a]),
        }
    }
}

impl Default for GroupColor {
    fn default() -> Self {
        Self([1.0, 1.0, 1.0, 1.0])
    }
}

impl From<Vec<f32>> for GroupColor {
    fn from(c: Vec<f32>) -> Self {
        let at = |i: usize, fallback: f32| c.get(i).copied().unwrap_or(fallback);
        Self([at(0, 1.0), at(1, 1.0), at(2, 1.0), at(3, 1.0)])
    }
}

impl From<GroupColor> for [f32; 4] {
    fn from(c: GroupColor) -> Self {
        c.0
    }
}

impl GroupColor {
    /// Opaque color from RGB components.
    #[must_use]
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b, 1.0])
    }

    /// Opaque color from hue/saturation/value, all in `[0, 1]`.
    #[must_use]
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let h = h.rem_euclid(1.0) * 6.0;
        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match sector as u32 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Self::rgb(r, g, b)
    }

    /// Random hue at the given saturation and value.
    #[must_use]
    pub fn random_with(saturation: f32, value: f32) -> Self {
        Self::from_hsv(rand::random::<f32>(), saturation, value)
    }

    /// Random hue at the default saturation (0.6) and value (0.9).
    #[must_use]
    pub fn random() -> Self {
        Self::random_with(RANDOM_SATURATION, RANDOM_VALUE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 4], b: [f32; 4]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn hsv_primary_hues() {
        assert!(close(GroupColor::from_hsv(0.0, 1.0, 1.0).0, [1.0, 0.0, 0.0, 1.0]));
        assert!(close(
            GroupColor::from_hsv(1.0 / 3.0, 1.0, 1.0).0,
            [0.0, 1.0, 0.0, 1.0]
        ));
        assert!(close(
            GroupColor::from_hsv(2.0 / 3.0, 1.0, 1.0).0,
            [0.0, 0.0, 1.0, 1.0]
        ));
    }

    #[test]
    fn random_colors_keep_saturation_and_value() {
        for _ in 0..32 {
            let [r, g, b, a] = GroupColor::random().0;
            let max = r.max(g).max(b);
            let min = r.min(g).min(b);
            assert!((max - RANDOM_VALUE).abs() < 1e-4);
            assert!(((max - min) / max - RANDOM_SATURATION).abs() < 1e-4);
            assert_eq!(a, 1.0);
        }
    }

    #[test]
    fn three_component_colors_load_opaque() {
        let c: GroupColor = serde_json::from_str("[0.2, 0.4, 0.6]").unwrap();
        assert_eq!(c.0, [0.2, 0.4, 0.6, 1.0]);
        assert_eq!(serde_json::to_string(&c).unwrap(), "[0.2,0.4,0.6,1.0]");
    }

    #[test]
    fn channel_objects_load() {
        let c: GroupColor =
            serde_json::from_str(r#"{"r": 0.5, "g": 0.25, "b": 1.0, "a": 0.8}"#).unwrap();
        assert_eq!(c.0, [0.5, 0.25, 1.0, 0.8]);
        let c: GroupColor = serde_json::from_str(r#"{"r": 0.0, "g": 0.0, "b": 0.0}"#).unwrap();
        assert_eq!(c.0, [0.0, 0.0, 0.0, 1.0]);
    }
}
