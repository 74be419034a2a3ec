/// Flat point-cloud arrays handed to the renderer.
///
/// Points are laid out particle-major: particle `i`'s trail occupies points
/// `i * trail_length .. (i + 1) * trail_length`, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBuffer {
    positions: Vec<f32>,
    colors: Vec<f32>,
    sizes: Vec<f32>,
}

impl RenderBuffer {
    pub(crate) fn new(point_count: usize) -> Self {
        Self {
            positions: vec![0.0; point_count * 3],
            colors: vec![0.0; point_count * 3],
            sizes: vec![0.0; point_count],
        }
    }

    pub fn point_count(&self) -> usize {
        self.sizes.len()
    }

    /// xyz triples, already multiplied by the field's display scale.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// rgb triples.
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    /// Scaled position of one point; `None` past the end of the buffer.
    pub fn position(&self, point: usize) -> Option<[f32; 3]> {
        let xyz = self.positions.get(point.checked_mul(3)?..)?.get(..3)?;
        Some([xyz[0], xyz[1], xyz[2]])
    }

    pub(crate) fn write(&mut self, point: usize, position: [f32; 3], color: [f32; 3], size: f32) {
        let base = point * 3;
        self.positions[base..base + 3].copy_from_slice(&position);
        self.colors[base..base + 3].copy_from_slice(&color);
        self.sizes[point] = size;
    }
}
