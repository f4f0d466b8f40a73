use std::borrow::Cow;

use wgpu::naga::ShaderStage;

/// Compiles the static full-screen triangle vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen triangle vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Compiles the aurora fragment shader.
pub(crate) fn compile_fragment_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("aurora fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(FRAGMENT_SHADER_GLSL),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

/// GPU port of `aurora::field::shade`.
///
/// The uniform block layout must match `AuroraUniforms` in `gpu::uniforms` and the
/// constants must stay in step with the CPU version so both paths draw the
/// same picture.
pub(crate) const FRAGMENT_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform AuroraParams {
    vec2 resolution;
    float time;
    float _padding;
} ubo;

float rand(vec2 n) {
    return fract(sin(dot(n, vec2(12.9898, 4.1414))) * 43758.5453);
}

float noise(vec2 p) {
    vec2 ip = floor(p);
    vec2 u = fract(p);
    u = u * u * (3.0 - 2.0 * u);

    float res = mix(
        mix(rand(ip), rand(ip + vec2(1.0, 0.0)), u.x),
        mix(rand(ip + vec2(0.0, 1.0)), rand(ip + vec2(1.0, 1.0)), u.x),
        u.y
    );
    return res * res;
}

float fbm(vec2 x) {
    float v = 0.0;
    float a = 0.3;
    vec2 shift = vec2(100.0);
    mat2 rot = mat2(cos(0.5), sin(0.5), -sin(0.5), cos(0.5));
    for (int octave = 0; octave < 3; ++octave) {
        v += a * noise(x);
        x = rot * x * 2.0 + shift;
        a *= 0.4;
    }
    return v;
}

vec4 aurora(vec2 fragCoord) {
    float t = ubo.time;
    vec2 res = ubo.resolution;

    vec2 shake = vec2(sin(t * 1.2) * 0.005, cos(t * 2.1) * 0.005);
    vec2 q = (fragCoord + shake * res - res * 0.5) / res.y;
    vec2 p = q * mat2(6.0, -4.0, 4.0, 6.0);

    float f = 2.0 + fbm(p + vec2(t * 5.0, 0.0)) * 0.5;

    vec4 o = vec4(0.0);
    for (int strand = 0; strand < 35; ++strand) {
        float i = float(strand);
        vec2 v = p
            + cos(i * i + (t + p.x * 0.08) * 0.025 + i * vec2(13.0, 11.0)) * 3.5
            + vec2(sin(t * 3.0 + i) * 0.003, cos(t * 3.5 - i) * 0.003);

        float tailNoise = fbm(v + vec2(t * 0.5, i)) * 0.3 * (1.0 - i / 35.0);
        vec4 color = vec4(
            0.1 + 0.3 * sin(i * 0.2 + t * 0.4),
            0.3 + 0.5 * cos(i * 0.3 + t * 0.5),
            0.7 + 0.3 * sin(i * 0.4 + t * 0.3),
            1.0
        );
        vec4 contribution = color * exp(sin(i * i + t * 0.8))
            / length(max(v, vec2(v.x * f * 0.015, v.y * 1.5)));
        float thinness = smoothstep(0.0, 1.0, i / 35.0) * 0.6;
        o += contribution * (1.0 + tailNoise * 0.8) * thinness;
    }

    o = tanh(pow(max(o, vec4(0.0)) / 100.0, vec4(1.6)));
    return o * 1.5;
}

void main() {
    // Framebuffer rows grow downwards; the colour function expects a
    // bottom-left origin.
    vec2 fragCoord = vec2(gl_FragCoord.x, ubo.resolution.y - gl_FragCoord.y);
    outColor = aurora(fragCoord);
}
";

/// Minimal full-screen triangle vertex shader.
pub(crate) const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::naga::front::glsl::{Frontend, Options};

    fn parse(source: &str, stage: ShaderStage) {
        let mut frontend = Frontend::default();
        if let Err(err) = frontend.parse(&Options::from(stage), source) {
            panic!("{stage:?} shader failed to parse: {err:?}");
        }
    }

    #[test]
    fn shaders_parse_with_naga() {
        parse(VERTEX_SHADER_GLSL, ShaderStage::Vertex);
        parse(FRAGMENT_SHADER_GLSL, ShaderStage::Fragment);
    }

    #[test]
    fn fragment_shares_constants_with_cpu_field() {
        assert!(FRAGMENT_SHADER_GLSL.contains(&format!("strand < {}", aurora::field::STRANDS)));
        assert!(FRAGMENT_SHADER_GLSL.contains(&format!("octave < {}", aurora::field::OCTAVES)));
        assert!(FRAGMENT_SHADER_GLSL.contains("43758.5453"));
        assert!(FRAGMENT_SHADER_GLSL.contains("vec4(1.6)"));
    }

    #[test]
    fn fragment_flips_rows_to_bottom_left_origin() {
        assert!(FRAGMENT_SHADER_GLSL.contains("ubo.resolution.y - gl_FragCoord.y"));
    }
}
