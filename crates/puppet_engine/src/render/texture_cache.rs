//! GPU texture handle cache
//!
//! Keeps one GPU handle per `(texture slot, context generation)`. The host
//! context is compared once per frame; when it changes, every handle from
//! the previous generation is dangling, so all valid textures are uploaded
//! again, not just the one that happened to be looked up.

use std::collections::HashMap;

use crate::model::InternalModel;
use crate::render::{ContextId, GpuTextureHandle, HostRenderer, ModelTexture, RenderResult, TextureUpload};

/// What one `prepare` pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrepareReport {
    /// The context generation changed since the previous pass
    pub context_changed: bool,
    /// Textures uploaded in this pass
    pub uploaded: usize,
    /// Textures registered with the model
    pub bound: usize,
}

/// Per-model table of GPU texture handles
#[derive(Debug, Default)]
pub struct TextureCache {
    context: ContextId,
    handles: HashMap<(usize, ContextId), GpuTextureHandle>,
}

impl TextureCache {
    /// Create an empty cache bound to no context
    pub fn new() -> Self {
        Self::default()
    }

    /// Context generation recorded by the last pass
    pub fn context(&self) -> ContextId {
        self.context
    }

    /// Cached handle for a slot in the current context
    pub fn handle(&self, slot: usize) -> Option<GpuTextureHandle> {
        self.handles.get(&(slot, self.context)).copied()
    }

    /// Number of cached handles
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether the cache holds no handles
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Forget every handle and the recorded context
    pub fn clear(&mut self) {
        self.handles.clear();
        self.context = ContextId::UNINITIALIZED;
    }

    /// Make every valid texture usable by the model in the renderer's current context
    pub fn prepare(
        &mut self,
        renderer: &mut dyn HostRenderer,
        model: &mut dyn InternalModel,
        textures: &[ModelTexture],
    ) -> RenderResult<PrepareReport> {
        let mut report = PrepareReport::default();

        let context = renderer.context_id();
        if context != self.context {
            log::trace!("Texture cache context {:?} -> {:?}", self.context, context);
            self.context = context;
            self.handles.retain(|&(_, owner), _| owner == context);
            model.update_context(renderer.as_any_mut(), context);
            report.context_changed = true;
        }

        let flip_y = model.texture_flip_y();

        for (slot, texture) in textures.iter().enumerate() {
            let Some(image) = texture.image() else {
                continue;
            };

            let key = (slot, context);
            let handle = match self.handles.get(&key) {
                Some(&handle) if !report.context_changed => handle,
                _ => {
                    let handle = renderer.upload_texture(&TextureUpload { slot, image, flip_y, context })?;
                    self.handles.insert(key, handle);
                    report.uploaded += 1;
                    handle
                }
            };

            model.bind_texture(slot, handle);
            renderer.touch_texture(handle);
            report.bound += 1;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockModel, MockRenderer};
    use image::RgbaImage;

    fn textures(count: usize) -> Vec<ModelTexture> {
        (0..count)
            .map(|i| ModelTexture::new(format!("texture_{i}"), RgbaImage::new(4, 4)))
            .collect()
    }

    #[test]
    fn test_first_pass_uploads_everything() {
        let mut cache = TextureCache::new();
        let mut renderer = MockRenderer::new(ContextId(1));
        let mut model = MockModel::new(200.0, 400.0);

        let report = cache.prepare(&mut renderer, &mut model, &textures(3)).unwrap();

        assert!(report.context_changed);
        assert_eq!(report.uploaded, 3);
        assert_eq!(report.bound, 3);
        assert_eq!(model.state().context_updates, vec![ContextId(1)]);
        assert_eq!(model.state().bound_textures.len(), 3);
    }

    #[test]
    fn test_same_context_reuses_handles() {
        let mut cache = TextureCache::new();
        let mut renderer = MockRenderer::new(ContextId(1));
        let mut model = MockModel::new(200.0, 400.0);
        let textures = textures(2);

        cache.prepare(&mut renderer, &mut model, &textures).unwrap();
        let report = cache.prepare(&mut renderer, &mut model, &textures).unwrap();

        assert!(!report.context_changed);
        assert_eq!(report.uploaded, 0);
        assert_eq!(report.bound, 2);
        assert_eq!(renderer.uploads.len(), 2);
        assert_eq!(renderer.touched.len(), 4);
    }

    #[test]
    fn test_context_change_rebinds_all_valid_textures_once() {
        let mut cache = TextureCache::new();
        let mut renderer = MockRenderer::new(ContextId(1));
        let mut model = MockModel::new(200.0, 400.0);
        let mut textures = textures(3);
        textures.push(ModelTexture::unloaded("missing"));

        cache.prepare(&mut renderer, &mut model, &textures).unwrap();
        renderer.context = ContextId(2);
        renderer.uploads.clear();

        let changed = cache.prepare(&mut renderer, &mut model, &textures).unwrap();
        let steady = cache.prepare(&mut renderer, &mut model, &textures).unwrap();

        assert_eq!(changed.uploaded, 3);
        assert_eq!(steady.uploaded, 0);
        assert_eq!(renderer.uploads.iter().map(|u| u.0).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(renderer.uploads.iter().all(|u| u.2 == ContextId(2)));
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.context(), ContextId(2));
    }

    #[test]
    fn test_missing_row_is_uploaded_without_context_change() {
        let mut cache = TextureCache::new();
        let mut renderer = MockRenderer::new(ContextId(7));
        let mut model = MockModel::new(10.0, 10.0);
        let mut textures = vec![ModelTexture::unloaded("late")];

        cache.prepare(&mut renderer, &mut model, &textures).unwrap();
        assert_eq!(renderer.uploads.len(), 0);

        textures[0] = ModelTexture::new("late", RgbaImage::new(1, 1));
        let report = cache.prepare(&mut renderer, &mut model, &textures).unwrap();

        assert!(!report.context_changed);
        assert_eq!(report.uploaded, 1);
        assert!(cache.handle(0).is_some());
    }

    #[test]
    fn test_flip_convention_reaches_upload() {
        let mut cache = TextureCache::new();
        let mut renderer = MockRenderer::new(ContextId(1));
        let mut model = MockModel::new(10.0, 10.0);
        model.flip_y = true;

        cache.prepare(&mut renderer, &mut model, &textures(1)).unwrap();

        assert!(renderer.uploads[0].1);
    }

    #[test]
    fn test_upload_failure_propagates() {
        let mut cache = TextureCache::new();
        let mut renderer = MockRenderer::new(ContextId(1));
        renderer.fail_uploads = true;
        let mut model = MockModel::new(10.0, 10.0);

        let result = cache.prepare(&mut renderer, &mut model, &textures(1));

        assert!(matches!(result, Err(crate::render::RenderError::TextureUpload { slot: 0, .. })));
    }
}
