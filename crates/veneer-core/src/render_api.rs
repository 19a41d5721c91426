use crate::scene::Scene;

/// Host render target. Receives only complete scenes, one per render pass.
pub trait RenderBackend {
    fn configure_surface(&mut self, width: u32, height: u32);
    fn frame(&mut self, scene: &Scene);
}

/// Backend that keeps the last scene it was given; handy for tests and tools.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub size: (u32, u32),
    pub frames: usize,
    pub last: Option<Scene>,
}

impl RenderBackend for RecordingBackend {
    fn configure_surface(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn frame(&mut self, scene: &Scene) {
        self.frames += 1;
        self.last = Some(scene.clone());
    }
}
