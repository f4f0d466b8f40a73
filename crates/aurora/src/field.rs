//! The aurora colour function.
//!
//! Everything here is a pure function of `(frag_coord, time, resolution)`.
//! The maths mirrors the fragment shader compiled by the `renderer` crate
//! line for line, so the CPU path and the GPU path produce the same picture up
//! to floating point differences between the two implementations of `sin`.
//!
//! Coordinates follow the shader convention: `frag_coord` is a pixel centre
//! (`x + 0.5`, `y + 0.5`) measured from the bottom-left corner.

/// Number of octaves summed by [`fbm`].
pub const OCTAVES: usize = 3;

/// Number of light strands accumulated per pixel.
pub const STRANDS: usize = 35;

const OCTAVE_AMPLITUDE: f32 = 0.3;
const OCTAVE_GAIN: f32 = 0.4;
const OCTAVE_SHIFT: f32 = 100.0;
const OCTAVE_ROTATION: f32 = 0.5;

const SHAKE_AMPLITUDE: f32 = 0.005;
const DRIFT_AMPLITUDE: f32 = 0.003;
const NORMALIZE: f32 = 100.0;
const CONTRAST: f32 = 1.6;
const BRIGHTNESS: f32 = 1.5;

type Vec2 = [f32; 2];
type Vec4 = [f32; 4];

fn fract(x: f32) -> f32 {
    x - x.floor()
}

fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn length(v: Vec2) -> f32 {
    (v[0] * v[0] + v[1] * v[1]).sqrt()
}

/// Hash-based pseudo random value in `[0, 1)` for a lattice point.
pub fn rand(n: Vec2) -> f32 {
    fract((n[0] * 12.9898 + n[1] * 4.1414).sin() * 43758.5453)
}

/// Squared value noise: Hermite interpolation of [`rand`] at the four corners
/// of the enclosing lattice cell.
pub fn noise(p: Vec2) -> f32 {
    let ip = [p[0].floor(), p[1].floor()];
    let mut u = [fract(p[0]), fract(p[1])];
    u = [
        u[0] * u[0] * (3.0 - 2.0 * u[0]),
        u[1] * u[1] * (3.0 - 2.0 * u[1]),
    ];

    let res = mix(
        mix(rand(ip), rand([ip[0] + 1.0, ip[1]]), u[0]),
        mix(
            rand([ip[0], ip[1] + 1.0]),
            rand([ip[0] + 1.0, ip[1] + 1.0]),
            u[0],
        ),
        u[1],
    );
    res * res
}

/// Fractal Brownian motion over [`noise`].
///
/// Each octave is rotated by half a radian, doubled in frequency and shifted
/// away from the origin; the amplitude starts at `0.3` and decays by `0.4`.
pub fn fbm(x: Vec2) -> f32 {
    let (s, c) = OCTAVE_ROTATION.sin_cos();
    let mut x = x;
    let mut v = 0.0;
    let mut a = OCTAVE_AMPLITUDE;
    for _ in 0..OCTAVES {
        v += a * noise(x);
        let rotated = [c * x[0] - s * x[1], s * x[0] + c * x[1]];
        x = [
            rotated[0] * 2.0 + OCTAVE_SHIFT,
            rotated[1] * 2.0 + OCTAVE_SHIFT,
        ];
        a *= OCTAVE_GAIN;
    }
    v
}

/// Upper bound of [`fbm`], reached only if every octave samples `1.0`.
pub fn fbm_ceiling() -> f32 {
    (0..OCTAVES)
        .map(|octave| OCTAVE_AMPLITUDE * OCTAVE_GAIN.powi(octave as i32))
        .sum()
}

/// Evaluates the aurora colour for one pixel.
///
/// Returns RGBA in linear units; every channel lies in `[0, 1.5]`.
pub fn shade(frag_coord: Vec2, time: f32, resolution: Vec2) -> Vec4 {
    let t = time;
    let [res_x, res_y] = resolution;

    let shake = [
        (t * 1.2).sin() * SHAKE_AMPLITUDE,
        (t * 2.1).cos() * SHAKE_AMPLITUDE,
    ];
    let q = [
        (frag_coord[0] + shake[0] * res_x - res_x * 0.5) / res_y,
        (frag_coord[1] + shake[1] * res_y - res_y * 0.5) / res_y,
    ];
    // Row vector times mat2(6, -4, 4, 6): a fixed shear and scale.
    let p = [6.0 * q[0] - 4.0 * q[1], 4.0 * q[0] + 6.0 * q[1]];

    let f = 2.0 + fbm([p[0] + t * 5.0, p[1]]) * 0.5;

    let mut o = [0.0f32; 4];
    for strand in 0..STRANDS {
        let i = strand as f32;
        let phase = i * i + (t + p[0] * 0.08) * 0.025;
        let v = [
            p[0] + (phase + i * 13.0).cos() * 3.5 + (t * 3.0 + i).sin() * DRIFT_AMPLITUDE,
            p[1] + (phase + i * 11.0).cos() * 3.5 + (t * 3.5 - i).cos() * DRIFT_AMPLITUDE,
        ];

        let fade = 1.0 - i / STRANDS as f32;
        let tail_noise = fbm([v[0] + t * 0.5, v[1] + i]) * 0.3 * fade;

        let color = [
            0.1 + 0.3 * (i * 0.2 + t * 0.4).sin(),
            0.3 + 0.5 * (i * 0.3 + t * 0.5).cos(),
            0.7 + 0.3 * (i * 0.4 + t * 0.3).sin(),
            1.0,
        ];

        let stretched = [v[0].max(v[0] * f * 0.015), v[1].max(v[1] * 1.5)];
        let weight = (i * i + t * 0.8).sin().exp() / length(stretched);
        let thinness = smoothstep(0.0, 1.0, i / STRANDS as f32) * 0.6;
        let scale = weight * (1.0 + tail_noise * 0.8) * thinness;

        for (acc, channel) in o.iter_mut().zip(color) {
            *acc += channel * scale;
        }
    }

    o.map(|channel| tone_map(channel) * BRIGHTNESS)
}

fn tone_map(channel: f32) -> f32 {
    // A negative red sum would make `powf` produce NaN.
    let normalized = channel.max(0.0) / NORMALIZE;
    let mapped = normalized.powf(CONTRAST).tanh();
    if mapped.is_finite() {
        mapped
    } else {
        0.0
    }
}

/// Clamps a shaded colour to `[0, 1]` and quantizes it to 8-bit RGBA.
pub fn to_rgba8(color: Vec4) -> [u8; 4] {
    color.map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8)
}
