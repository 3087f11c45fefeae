//! GLSL 450 sources for GPU hosts.
//!
//! The fragment stage mirrors [`crate::shade`] line for line. The uniform
//! block layout must match `WaveUniforms` in the renderer crate.

/// Full-screen triangle; emits the interpolated texture coordinate `v_uv`.
pub const FULLSCREEN_VERTEX: &str = r"#version 450
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

/// The wave material fragment stage.
pub const WAVE_FRAGMENT: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;

layout(std140, set = 0, binding = 0) uniform WaveParams {
    vec2 resolution;
    vec2 pointer;
    float time;
    vec3 color1;
    vec3 color2;
    vec3 color3;
    vec3 color4;
} params;

vec3 palette(float t, vec3 phase) {
    vec3 a = vec3(0.5, 0.5, 0.5);
    vec3 b = vec3(0.5, 0.5, 0.5);
    vec3 c = vec3(1.0, 1.0, 1.0);
    return a + b * cos(6.28318530718 * (c * t + phase));
}

float smooth_mix(float edge0, float edge1, float x) {
    float t = clamp((x - edge0) / (edge1 - edge0), 0.0, 1.0);
    return t * t * (3.0 - 2.0 * t);
}

void main() {
    // Bottom-left origin, matching the CPU rasterizer.
    vec2 frag_coord = vec2(gl_FragCoord.x, params.resolution.y - gl_FragCoord.y);

    vec2 uv = (frag_coord * 2.0 - params.resolution) / params.resolution.y;
    vec2 uv0 = uv;
    float radius = length(uv0);

    vec2 normalized_uv = (uv + 1.0) * 0.5;
    float mix_x = smooth_mix(0.3, 0.7, normalized_uv.x);
    float mix_y = smooth_mix(0.3, 0.7, normalized_uv.y);
    vec3 bottom = mix(params.color1, params.color3, mix_x);
    vec3 top = mix(params.color2, params.color4, mix_x);
    vec3 blended = mix(bottom, top, mix_y);

    blended *= sin(radius * 3.0 + params.time * 0.5) * 0.1 + 0.9;

    vec2 wave_uv = sin(uv * 0.5) - params.pointer;
    float wave_distance = length(wave_uv) * exp(-radius);

    vec3 col = palette(radius + params.time * 0.4, blended);

    float ring = abs(sin(wave_distance * 8.0 + params.time) / 8.0);
    float glow_base = 0.02 / ring;
    float glow = glow_base * glow_base;

    out_color = vec4(col * glow, 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{ShadingProgram, WaveProgram};

    #[test]
    fn fragment_declares_every_schema_uniform() {
        let program = WaveProgram::default();
        for uniform in program.uniform_schema() {
            assert!(
                WAVE_FRAGMENT.contains(&format!(" {};", uniform.name)),
                "{} missing from uniform block",
                uniform.name
            );
        }
    }

    #[test]
    fn stages_share_the_uv_varying() {
        assert!(FULLSCREEN_VERTEX.contains("layout(location = 0) out vec2 v_uv;"));
        assert!(WAVE_FRAGMENT.contains("layout(location = 0) in vec2 v_uv;"));
        assert!(WAVE_FRAGMENT.starts_with("#version 450"));
    }
}
