use aurora::FrameInputs;
use bytemuck::{Pod, Zeroable};

/// Mirror of the `AuroraParams` std140 block in the fragment shader.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct AuroraUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub _padding: f32,
}

unsafe impl Zeroable for AuroraUniforms {}
unsafe impl Pod for AuroraUniforms {}

impl AuroraUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            resolution: [width as f32, height as f32],
            time: 0.0,
            _padding: 0.0,
        }
    }

    pub fn update(&mut self, inputs: &FrameInputs) {
        self.resolution = inputs.resolution;
        self.time = inputs.time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_std140_block() {
        assert_eq!(std::mem::size_of::<AuroraUniforms>(), 16);
        assert_eq!(std::mem::align_of::<AuroraUniforms>(), 16);

        let uniforms = AuroraUniforms {
            resolution: [800.0, 600.0],
            time: 0.016,
            _padding: 0.0,
        };
        let bytes = bytemuck::bytes_of(&uniforms);
        assert_eq!(&bytes[0..4], &800.0f32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &600.0f32.to_ne_bytes());
        assert_eq!(&bytes[8..12], &0.016f32.to_ne_bytes());
    }

    #[test]
    fn update_copies_frame_inputs() {
        let mut uniforms = AuroraUniforms::new(800, 600);
        uniforms.update(&FrameInputs {
            time: 0.032,
            resolution: [1024.0, 768.0],
            tick: 2,
        });
        assert_eq!(uniforms.resolution, [1024.0, 768.0]);
        assert_eq!(uniforms.time, 0.032);
    }
}
