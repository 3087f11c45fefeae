use bytemuck::{Pod, Zeroable};
use wavefield::{FrameUniforms, MaterialBlock};

/// CPU mirror of the `WaveParams` std140 block declared by the fragment stage.
///
/// Every `vec3` starts on a 16-byte boundary, hence the explicit padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct WaveUniforms {
    pub resolution: [f32; 2],
    pub pointer: [f32; 2],
    pub time: f32,
    _padding0: [f32; 3],
    pub color1: [f32; 3],
    _padding1: f32,
    pub color2: [f32; 3],
    _padding2: f32,
    pub color3: [f32; 3],
    _padding3: f32,
    pub color4: [f32; 3],
    _padding4: f32,
}

impl WaveUniforms {
    pub fn new(frame: &FrameUniforms, material: &MaterialBlock) -> Self {
        let mut uniforms = Self::zeroed();
        uniforms.set_frame(frame);
        uniforms.set_material(material);
        uniforms
    }

    pub fn set_frame(&mut self, frame: &FrameUniforms) {
        self.resolution = frame.resolution.as_vec2().into();
        self.pointer = frame.pointer.into();
        self.time = frame.time;
    }

    pub fn set_material(&mut self, material: &MaterialBlock) {
        let [color1, color2, color3, color4] = material.colors;
        self.color1 = color1;
        self.color2 = color2;
        self.color3 = color3;
        self.color4 = color4;
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.resolution = [width.max(1) as f32, height.max(1) as f32];
    }

    pub fn set_pointer(&mut self, pointer: [f32; 2]) {
        self.pointer = pointer;
    }

    pub fn set_time(&mut self, seconds: f32) {
        self.time = seconds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};
    use wavefield::{Resolution, ShadingProgram, Vec2, WaveProgram};

    #[test]
    fn layout_matches_std140_block() {
        assert_eq!(offset_of!(WaveUniforms, resolution), 0);
        assert_eq!(offset_of!(WaveUniforms, pointer), 8);
        assert_eq!(offset_of!(WaveUniforms, time), 16);
        assert_eq!(offset_of!(WaveUniforms, color1), 32);
        assert_eq!(offset_of!(WaveUniforms, color2), 48);
        assert_eq!(offset_of!(WaveUniforms, color3), 64);
        assert_eq!(offset_of!(WaveUniforms, color4), 80);
        assert_eq!(size_of::<WaveUniforms>(), 96);
    }

    #[test]
    fn packs_frame_and_material() {
        let frame = FrameUniforms::new(Resolution::new(800.0, 600.0).unwrap())
            .with_time(1.25)
            .with_pointer(Vec2::new(0.5, -0.25));
        let material = WaveProgram::default().material_block();
        let uniforms = WaveUniforms::new(&frame, &material);

        assert_eq!(uniforms.resolution, [800.0, 600.0]);
        assert_eq!(uniforms.pointer, [0.5, -0.25]);
        assert_eq!(uniforms.time, 1.25);
        assert_eq!(uniforms.color1, material.colors[0]);
        assert_eq!(uniforms.color4, material.colors[3]);

        let bytes = bytemuck::bytes_of(&uniforms);
        assert_eq!(&bytes[16..20], &1.25f32.to_ne_bytes());
    }
}
