//! Headless host renderer
//!
//! Stands in for a GPU-backed renderer: textures live in a map keyed by
//! handle, each tagged with the context generation it was uploaded under.
//! Losing the context drops every texture, the way a real device loss does.

use std::any::Any;
use std::collections::HashMap;
use std::path::Path;

use image::RgbaImage;
use puppet_engine::foundation::math::{affine, Mat3};
use puppet_engine::render::{
    ContextId, GpuTextureHandle, HostRenderer, RenderResult, RenderSubsystems, TextureUpload, Viewport,
};

/// Frames a texture may go untouched before it is collected
const TEXTURE_GC_MAX_IDLE: u64 = 60;

struct GpuTexture {
    context: ContextId,
    pixels: RgbaImage,
    last_used: u64,
}

/// Per-frame counters
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    /// Renderer resets issued this frame
    pub resets: u32,
    /// Textures uploaded this frame
    pub uploads: u32,
    /// Raw draw calls issued this frame
    pub draws: u32,
}

/// Renderer that keeps all GPU state in memory
pub struct HeadlessRenderer {
    context: ContextId,
    viewport: Viewport,
    textures: HashMap<GpuTextureHandle, GpuTexture>,
    next_handle: u64,
    frame: u64,
    stats: FrameStats,
    dirty: RenderSubsystems,
    last_draw_matrix: Option<Mat3>,
    last_draw_alpha: f32,
}

impl HeadlessRenderer {
    /// Create a renderer with a fresh context
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            context: ContextId(0),
            viewport: Viewport::new(0.0, 0.0, width, height),
            textures: HashMap::new(),
            next_handle: 1,
            frame: 0,
            stats: FrameStats::default(),
            dirty: RenderSubsystems::empty(),
            last_draw_matrix: None,
            last_draw_alpha: 1.0,
        }
    }

    /// Drop every GPU resource and start a new context generation
    pub fn lose_context(&mut self) {
        log::warn!("Render context {:?} lost, {} textures dropped", self.context, self.textures.len());
        self.textures.clear();
        self.context = ContextId(self.context.0 + 1);
    }

    /// Start a frame
    pub fn begin_frame(&mut self) {
        self.frame += 1;
        self.stats = FrameStats::default();
    }

    /// Finish a frame and collect textures nobody touched for a while
    pub fn end_frame(&mut self) -> FrameStats {
        let frame = self.frame;
        let before = self.textures.len();
        self.textures
            .retain(|_, texture| frame - texture.last_used <= TEXTURE_GC_MAX_IDLE);
        if self.textures.len() != before {
            log::debug!("Collected {} idle textures", before - self.textures.len());
        }
        self.stats
    }

    /// Record a raw draw issued by a model, composited at `alpha`
    pub fn record_draw(&mut self, matrix: &Mat3, alpha: f32) {
        self.stats.draws += 1;
        self.dirty |= RenderSubsystems::STATE | RenderSubsystems::TEXTURE | RenderSubsystems::SHADER;
        self.last_draw_matrix = Some(*matrix);
        self.last_draw_alpha = alpha;
    }

    /// Whether a texture handle is valid in the current context
    pub fn is_resident(&self, handle: GpuTextureHandle) -> bool {
        self.textures
            .get(&handle)
            .is_some_and(|texture| texture.context == self.context)
    }

    /// Number of textures on the "GPU"
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Clip-space matrix of the last draw
    pub fn last_draw_matrix(&self) -> Option<&Mat3> {
        self.last_draw_matrix.as_ref()
    }

    /// Opacity of the last draw
    pub fn last_draw_alpha(&self) -> f32 {
        self.last_draw_alpha
    }

    /// Sub-systems a raw draw left modified and nobody reset yet
    pub fn dirty(&self) -> RenderSubsystems {
        self.dirty
    }

    /// Write the texture behind `handle` to an image file
    pub fn save_texture(&self, handle: GpuTextureHandle, path: &Path) -> Result<bool, image::ImageError> {
        match self.textures.get(&handle) {
            Some(texture) => {
                texture.pixels.save(path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl HostRenderer for HeadlessRenderer {
    fn context_id(&self) -> ContextId {
        self.context
    }

    fn reset(&mut self, subsystems: RenderSubsystems) {
        self.stats.resets += 1;
        self.dirty.remove(subsystems);
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn projection_matrix(&self) -> Mat3 {
        let Viewport { x, y, width, height } = self.viewport;
        affine(
            2.0 / width,
            0.0,
            0.0,
            -2.0 / height,
            -1.0 - 2.0 * x / width,
            1.0 + 2.0 * y / height,
        )
    }

    fn upload_texture(&mut self, upload: &TextureUpload<'_>) -> RenderResult<GpuTextureHandle> {
        let handle = GpuTextureHandle(self.next_handle);
        self.next_handle += 1;
        self.stats.uploads += 1;

        self.textures.insert(
            handle,
            GpuTexture {
                context: upload.context,
                pixels: upload.oriented_pixels().into_owned(),
                last_used: self.frame,
            },
        );
        Ok(handle)
    }

    fn touch_texture(&mut self, handle: GpuTextureHandle) {
        if let Some(texture) = self.textures.get_mut(&handle) {
            texture.last_used = self.frame;
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
