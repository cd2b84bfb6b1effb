//! CPU model of the liquid fragment program.
//!
//! Mirrors `shaders/liquid.frag` operation for operation so the coordinate
//! mapping and colour math can be tested on the host, and so still frames can
//! be rendered without a GPU.

use crate::field::NormalizedField;
use crate::params::RenderParams;

/// Fixed rotation of the pattern space, in radians.
pub const ROTATION: f32 = 0.3;
/// Noise drift per unit of time along x and y.
pub const DRIFT: [f32; 2] = [0.05, 0.1];
/// Gray level the background blends towards.
pub const BASE_SHADE: f32 = 0.05;
pub const ALPHA_LOW: f32 = 0.6;
pub const ALPHA_HIGH: f32 = 0.95;

pub const FRAGMENT_SHADER: &str = include_str!("shaders/liquid.frag");
pub const VERTEX_SHADER: &str = include_str!("shaders/liquid.vert");

/// Uniform values for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub time: f32,
    pub ratio: f32,
    pub img_ratio: f32,
    pub pattern_scale: f32,
    pub refraction: f32,
    pub liquid: f32,
    pub edge: f32,
    pub pattern_blur: f32,
}

impl FrameUniforms {
    pub fn new(
        params: &RenderParams,
        surface: (u32, u32),
        field: (u32, u32),
        elapsed_ms: f64,
    ) -> Self {
        Self {
            time: elapsed_time(elapsed_ms, params.speed),
            ratio: aspect_ratio(surface.0, surface.1),
            img_ratio: aspect_ratio(field.0, field.1),
            pattern_scale: params.pattern_scale,
            refraction: params.refraction,
            liquid: params.liquid,
            edge: params.edge,
            pattern_blur: params.pattern_blur,
        }
    }
}

/// Shader time in seconds, scaled by `speed`.
#[inline]
pub fn elapsed_time(elapsed_ms: f64, speed: f32) -> f32 {
    (elapsed_ms * 0.001 * f64::from(speed)) as f32
}

/// Width over height; a zero height counts as square.
#[inline]
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        return 1.0;
    }
    width as f32 / height as f32
}

/// `mat2(c, -s, s, c) * p` with GLSL's column-major layout.
#[inline]
pub fn rotate([x, y]: [f32; 2], angle: f32) -> [f32; 2] {
    let (s, c) = angle.sin_cos();
    [c * x + s * y, -s * x + c * y]
}

/// Surface UV to the centred, aspect-corrected, rotated pattern space.
pub fn pattern_uv([u, v]: [f32; 2], ratio: f32) -> [f32; 2] {
    let [x, y] = rotate([(u - 0.5) * ratio, v - 0.5], ROTATION);
    [x + 0.5, y + 0.5]
}

/// Pattern space to texture UV, corrected for the field's aspect and flipped
/// to raster row order.
pub fn image_uv([u, v]: [f32; 2], ratio: f32, img_ratio: f32) -> [f32; 2] {
    let (mut x, mut y) = (u - 0.5, v - 0.5);
    if ratio > img_ratio {
        x = x * ratio / img_ratio;
    } else {
        y = y * img_ratio / ratio;
    }
    [x + 0.5, 1.0 - (y + 0.5)]
}

#[inline]
fn fract(x: f32) -> f32 {
    x - x.floor()
}

#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Lattice hash in `[0, 1)`.
#[inline]
pub fn hash([x, y]: [f32; 2]) -> f32 {
    fract((x * 12.9898 + y * 78.233).sin() * 43758.5453)
}

/// 2-D value noise with cubic Hermite interpolation between lattice corners.
pub fn value_noise([x, y]: [f32; 2]) -> f32 {
    let (ix, iy) = (x.floor(), y.floor());
    let (fx, fy) = (x - ix, y - iy);

    let a = hash([ix, iy]);
    let b = hash([ix + 1.0, iy]);
    let c = hash([ix, iy + 1.0]);
    let d = hash([ix + 1.0, iy + 1.0]);

    let ux = fx * fx * (3.0 - 2.0 * fx);
    let uy = fy * fy * (3.0 - 2.0 * fy);

    mix(a, b, ux) + (c - a) * uy * (1.0 - ux) + (d - b) * ux * uy
}

/// Bilinear texture lookup with repeat wrapping, like a LINEAR/REPEAT
/// sampler. Returns the channel normalised to `[0, 1]`.
pub fn sample(field: &NormalizedField, [u, v]: [f32; 2], channel: usize) -> f32 {
    let (w, h) = (field.width() as i64, field.height() as i64);
    let tx = u * w as f32 - 0.5;
    let ty = v * h as f32 - 0.5;
    let (x0, y0) = (tx.floor(), ty.floor());
    let (fx, fy) = (tx - x0, ty - y0);
    let (x0, y0) = (x0 as i64, y0 as i64);

    let texel = |x: i64, y: i64| -> f32 {
        let x = x.rem_euclid(w) as usize;
        let y = y.rem_euclid(h) as usize;
        let i = (y * w as usize + x) * 4 + channel;
        f32::from(field.pixels()[i]) / 255.0
    };

    let top = mix(texel(x0, y0), texel(x0 + 1, y0), fx);
    let bottom = mix(texel(x0, y0 + 1), texel(x0 + 1, y0 + 1), fx);
    mix(top, bottom, fy)
}

/// Evaluate the fragment program at one surface UV. Returns straight RGBA.
pub fn shade(field: &NormalizedField, uniforms: &FrameUniforms, v_uv: [f32; 2]) -> [f32; 4] {
    let uv = pattern_uv(v_uv, uniforms.ratio);
    let img = image_uv(uv, uniforms.ratio, uniforms.img_ratio);

    let n = value_noise([
        uv[0] * uniforms.pattern_scale + uniforms.time * DRIFT[0],
        uv[1] * uniforms.pattern_scale + uniforms.time * DRIFT[1],
    ]);
    let shift = n * uniforms.liquid * uniforms.refraction;

    let edge = sample(field, img, 0);
    let r = sample(field, [img[0] + shift, img[1]], 0);
    let g = sample(field, img, 1);
    let b = sample(field, [img[0] - shift, img[1]], 2);

    [
        mix(BASE_SHADE, r, edge),
        mix(BASE_SHADE, g, edge),
        mix(BASE_SHADE, b, edge),
        smoothstep(ALPHA_LOW, ALPHA_HIGH, edge),
    ]
}

/// Render a full frame into RGBA8 bytes, top row first.
pub fn render_frame(
    field: &NormalizedField,
    uniforms: &FrameUniforms,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(width as usize * height as usize * 4);
    for py in 0..height {
        // GL's vUv has y pointing up.
        let v = 1.0 - (py as f32 + 0.5) / height as f32;
        for px in 0..width {
            let u = (px as f32 + 0.5) / width as f32;
            let rgba = shade(field, uniforms, [u, v]);
            out.extend(rgba.iter().map(|&c| (c.clamp(0.0, 1.0) * 255.0).round() as u8));
        }
    }
    out
}
