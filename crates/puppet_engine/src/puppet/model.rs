//! Puppet scene node
//!
//! [`PuppetModel`] wraps an [`InternalModel`] as a node of the host scene
//! graph. Every rendered frame it:
//!
//! 1. syncs the alpha filter with the world alpha and hands changes to the model
//! 2. resets the host renderer to a known baseline
//! 3. makes every texture valid for the current render context
//! 4. forwards the viewport
//! 5. advances the model by the time accumulated since the last frame
//! 6. hands the model its clip-space matrix
//! 7. lets the model draw
//! 8. restores the renderer state the host expects
//!
//! Steps 2 and 8 always bracket the frame, even when a step in between
//! fails.

use thiserror::Error;

use crate::core::config::PuppetOptions;
use crate::foundation::math::{apply, apply_inverse, Mat3, Point2, Vec2};
use crate::model::{InternalModel, ModelAssets, ModelFactory, ModelSource, SetupError};
use crate::motion::{ExpressionId, MotionOptions, MotionPriority, Playback, PlaybackError, SpeakOptions};
use crate::puppet::automator::{Automator, AutomatorAction, PointerEvent};
use crate::puppet::events::{ModelEvent, ModelEventHandler, ModelEventType, ModelEvents};
use crate::render::{
    AlphaFilter, HostRenderer, ModelTexture, RenderResult, RenderSubsystems, TextureCache,
};
use crate::scene::{
    Bounds, BoundsOverride, DestroyOptions, NodeTransform, ParentFrame, SceneNode, Transform2D,
    TransformRefresh,
};

/// Puppet node errors
#[derive(Error, Debug)]
pub enum ModelError {
    /// The factory could not set up the model
    #[error("Model setup failed: {0}")]
    Setup(#[from] SetupError),

    /// The node already holds a model
    #[error("A model is already loaded")]
    AlreadyLoaded,

    /// The node has been destroyed
    #[error("Node has been destroyed")]
    Destroyed,
}

/// Scene node rendering a rigged 2D model
pub struct PuppetModel {
    tag: String,
    options: PuppetOptions,
    internal: Option<Box<dyn InternalModel>>,
    textures: Vec<ModelTexture>,
    texture_cache: TextureCache,
    transform: NodeTransform,
    anchor: Vec2,
    bounds_override: BoundsOverride,
    alpha_filter: AlphaFilter,
    automator: Automator,
    events: ModelEvents,
    elapsed_time: f64,
    delta_time: f32,
    destroyed: bool,
}

impl Default for PuppetModel {
    fn default() -> Self {
        Self::new(PuppetOptions::default())
    }
}

impl PuppetModel {
    /// Create an empty node; it stays inert until a model is loaded
    pub fn new(options: PuppetOptions) -> Self {
        Self {
            tag: "PuppetModel(uninitialized)".to_string(),
            bounds_override: options.bounds_override.unwrap_or_default(),
            automator: Automator::new(options.automator),
            options,
            internal: None,
            textures: Vec::new(),
            texture_cache: TextureCache::new(),
            transform: NodeTransform::default(),
            anchor: Vec2::zeros(),
            alpha_filter: AlphaFilter::new(),
            events: ModelEvents::new(),
            elapsed_time: 0.0,
            delta_time: 0.0,
            destroyed: false,
        }
    }

    /// Create a node and load a model into it
    pub fn from_factory(
        factory: &mut dyn ModelFactory,
        source: &ModelSource,
        options: PuppetOptions,
    ) -> Result<Self, ModelError> {
        let mut node = Self::new(options);
        node.load(factory, source)?;
        Ok(node)
    }

    /// Load a model through a factory
    pub fn load(&mut self, factory: &mut dyn ModelFactory, source: &ModelSource) -> Result<(), ModelError> {
        if self.destroyed {
            return Err(ModelError::Destroyed);
        }
        if self.internal.is_some() {
            return Err(ModelError::AlreadyLoaded);
        }

        let assets = factory.create(source, &self.options).map_err(|e| {
            log::warn!("{}: failed to set up {}: {}", self.tag, source.display_name(), e);
            e
        })?;
        self.setup(assets)
    }

    /// Adopt a model produced elsewhere and emit [`ModelEvent::Loaded`]
    pub fn setup(&mut self, assets: ModelAssets) -> Result<(), ModelError> {
        if self.destroyed {
            return Err(ModelError::Destroyed);
        }
        if self.internal.is_some() {
            return Err(ModelError::AlreadyLoaded);
        }

        let ModelAssets { model, textures } = assets;
        self.tag = format!("PuppetModel({})", model.name());
        log::debug!(
            "{}: loaded {}x{} with {} textures",
            self.tag,
            model.width(),
            model.height(),
            textures.len()
        );

        self.internal = Some(model);
        self.textures = textures;
        self.apply_anchor();

        self.events.emit(&ModelEvent::Loaded);
        Ok(())
    }

    /// Log tag, `PuppetModel(<name>)`
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Construction options
    pub fn options(&self) -> &PuppetOptions {
        &self.options
    }

    /// Whether a model is loaded and the node is not destroyed
    pub fn is_loaded(&self) -> bool {
        self.internal.is_some()
    }

    /// Whether `destroy` has run
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// The underlying model
    pub fn internal_model(&self) -> Option<&(dyn InternalModel + 'static)> {
        self.internal.as_deref()
    }

    /// The underlying model, mutably
    pub fn internal_model_mut(&mut self) -> Option<&mut (dyn InternalModel + 'static)> {
        self.internal.as_deref_mut()
    }

    /// Texture slots in model order
    pub fn textures(&self) -> &[ModelTexture] {
        &self.textures
    }

    /// Take the textures out of the node, e.g. to hand them to another node
    pub fn take_textures(&mut self) -> Vec<ModelTexture> {
        self.texture_cache.clear();
        std::mem::take(&mut self.textures)
    }

    /// GPU handle table
    pub fn texture_cache(&self) -> &TextureCache {
        &self.texture_cache
    }

    /// Composite opacity filter
    pub fn alpha_filter(&self) -> &AlphaFilter {
        &self.alpha_filter
    }

    /// Automatic update and interaction
    pub fn automator(&self) -> &Automator {
        &self.automator
    }

    /// Automatic update and interaction, mutably
    pub fn automator_mut(&mut self) -> &mut Automator {
        &mut self.automator
    }

    // --- Transform ---

    /// Local transform and cached world state
    pub fn transform(&self) -> &NodeTransform {
        &self.transform
    }

    /// Local transform
    ///
    /// The pivot is derived from the anchor and is overwritten whenever the
    /// anchor changes.
    pub fn local_mut(&mut self) -> &mut Transform2D {
        &mut self.transform.local
    }

    /// Set the position in parent space
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.transform.local.position = Vec2::new(x, y);
    }

    /// Set the scale
    pub fn set_scale(&mut self, x: f32, y: f32) {
        self.transform.local.scale = Vec2::new(x, y);
    }

    /// Set the rotation in radians
    pub fn set_rotation(&mut self, radians: f32) {
        self.transform.local.rotation = radians;
    }

    /// Set the node opacity
    pub fn set_alpha(&mut self, alpha: f32) {
        self.transform.alpha = alpha;
    }

    /// Normalized anchor
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Set the anchor; the pivot becomes `anchor * (width, height)`
    ///
    /// Values are not validated. Before the model is loaded the anchor is
    /// stored and applied at setup.
    pub fn set_anchor(&mut self, x: f32, y: f32) {
        self.anchor = Vec2::new(x, y);
        self.apply_anchor();
    }

    /// Pivot in local pixel space
    pub fn pivot(&self) -> Vec2 {
        self.transform.local.pivot
    }

    fn apply_anchor(&mut self) {
        if let Some(model) = self.internal.as_deref() {
            self.transform.local.pivot = Vec2::new(self.anchor.x * model.width(), self.anchor.y * model.height());
        }
    }

    /// Offsets applied to the natural bounding box
    pub fn bounds_override(&self) -> BoundsOverride {
        self.bounds_override
    }

    /// Replace the bounds offsets. Values are not validated.
    pub fn set_bounds_override(&mut self, bounds: BoundsOverride) {
        self.bounds_override = bounds;
    }

    // --- Time ---

    /// Accumulate `dt` milliseconds; the model sees it at the next render
    pub fn update(&mut self, dt: f32) {
        self.delta_time += dt;
        self.elapsed_time += f64::from(dt);
    }

    /// Host frame tick, forwarded to `update` when auto-update is on
    pub fn tick(&mut self, delta_ms: f32) {
        if self.automator.wants_tick() {
            self.update(delta_ms);
        }
    }

    /// Time not yet consumed by a render, in milliseconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Total accumulated time, in milliseconds
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    // --- Frame ---

    /// Update, texture-sync and draw the model for one frame
    pub fn render(&mut self, renderer: &mut dyn HostRenderer) -> RenderResult<()> {
        if self.destroyed {
            return Ok(());
        }

        let Self {
            tag,
            internal,
            textures,
            texture_cache,
            transform,
            alpha_filter,
            elapsed_time,
            delta_time,
            ..
        } = self;

        let Some(model) = internal.as_deref_mut() else {
            return Ok(());
        };

        if alpha_filter.sync(transform.world_alpha()) {
            log::trace!("{}: alpha {}", tag, alpha_filter.alpha());
            model.set_opacity(alpha_filter.alpha());
        }

        renderer.reset(RenderSubsystems::BEFORE_RAW_DRAW);

        let result = draw_frame(
            renderer,
            model,
            FrameState {
                tag: tag.as_str(),
                textures: textures.as_slice(),
                texture_cache,
                world: transform.world(),
                elapsed_time: *elapsed_time,
                delta_time,
            },
        );

        renderer.reset(RenderSubsystems::AFTER_RAW_DRAW);

        if let Err(e) = &result {
            log::warn!("{}: frame failed: {}", tag, e);
        }
        result
    }

    // --- Coordinates ---

    /// Convert a host world point into model space
    ///
    /// With [`TransformRefresh::Ancestors`] the world matrix is recomputed
    /// from the given chain first; with [`TransformRefresh::Skip`] the matrix
    /// from the last transform pass is used. `None` until a model is loaded.
    pub fn to_model_position(&mut self, point: Point2, refresh: TransformRefresh<'_>) -> Option<Point2> {
        let model = self.internal.as_deref()?;

        if let TransformRefresh::Ancestors(ancestors) = refresh {
            self.transform.recompute(ancestors);
        }

        let local = apply_inverse(self.transform.world(), point);
        Some(apply_inverse(&model.local_transform(), local))
    }

    /// Convert a model-space point into host world space
    pub fn to_world_position(&self, point: Point2) -> Option<Point2> {
        let model = self.internal.as_deref()?;
        Some(apply(&(self.transform.world() * model.local_transform()), point))
    }

    /// Names of the hit areas under a host world point, in definition order
    pub fn hit_test(&mut self, x: f32, y: f32, ancestors: &[Transform2D]) -> Vec<String> {
        let Some(point) = self.to_model_position(Point2::new(x, y), TransformRefresh::Ancestors(ancestors)) else {
            return Vec::new();
        };
        self.internal
            .as_deref()
            .map(|model| model.hit_test(point.x, point.y))
            .unwrap_or_default()
    }

    /// Hit test and emit [`ModelEvent::Hit`] when something was hit
    pub fn tap(&mut self, x: f32, y: f32, ancestors: &[Transform2D]) -> Vec<String> {
        let names = self.hit_test(x, y, ancestors);
        if !names.is_empty() {
            log::info!("{}: hit {:?}", self.tag, names);
            self.events.emit(&ModelEvent::Hit(names.clone()));
        }
        names
    }

    /// Turn the model's gaze toward a host world point
    pub fn focus(&mut self, x: f32, y: f32, instant: bool) {
        let Some(point) = self.to_model_position(Point2::new(x, y), TransformRefresh::Skip) else {
            return;
        };
        let Some(model) = self.internal.as_deref_mut() else {
            return;
        };

        let tx = point.x / model.original_width() * 2.0 - 1.0;
        let ty = point.y / model.original_height() * 2.0 - 1.0;
        let angle = ty.atan2(tx);
        model.focus(angle.cos(), -angle.sin(), instant);
    }

    /// Route a pointer event through the automator
    pub fn handle_pointer(&mut self, event: PointerEvent, ancestors: &[Transform2D]) {
        match self.automator.route(event) {
            AutomatorAction::Focus(x, y) => self.focus(x, y, false),
            AutomatorAction::Tap(x, y) => {
                self.tap(x, y, ancestors);
            }
            AutomatorAction::Ignore => {}
        }
    }

    /// World-space bounding box including the bounds override
    pub fn calculate_bounds(&self) -> Bounds {
        let mut bounds = Bounds::empty();
        if let Some(model) = self.internal.as_deref() {
            let (x0, y0, x1, y1) = self.bounds_override.frame(model.width(), model.height());
            bounds.add_frame(self.transform.world(), x0, y0, x1, y1);
        }
        bounds
    }

    /// Whether a host world point lies inside the bounding box
    pub fn contains_point(&self, point: Point2) -> bool {
        self.calculate_bounds().contains_point(point)
    }

    // --- Playback ---

    /// Start motion `index` of `group`, or a random one when `index` is `None`
    pub fn motion(
        &mut self,
        group: &str,
        index: Option<usize>,
        priority: MotionPriority,
        options: MotionOptions,
    ) -> Playback {
        let Some(model) = self.internal.as_deref_mut() else {
            return Playback::failed(PlaybackError::NotLoaded);
        };
        let manager = model.motion_manager();
        match index {
            Some(index) => manager.start_motion(group, index, priority, options),
            None => manager.start_random_motion(group, priority, options),
        }
    }

    /// Stop every running and queued motion
    pub fn stop_motions(&mut self) {
        if let Some(model) = self.internal.as_deref_mut() {
            model.motion_manager().stop_all_motions();
        }
    }

    /// Play a sound with lip sync
    pub fn speak(&mut self, sound: &str, options: SpeakOptions) -> Playback {
        match self.internal.as_deref_mut() {
            Some(model) => model.motion_manager().speak(sound, options),
            None => Playback::failed(PlaybackError::NotLoaded),
        }
    }

    /// Stop speaking
    pub fn stop_speaking(&mut self) {
        if let Some(model) = self.internal.as_deref_mut() {
            model.motion_manager().stop_speaking();
        }
    }

    /// Apply an expression, or a random one when `id` is `None`
    ///
    /// Finishes with `false` right away when the model has no expressions.
    pub fn expression(&mut self, id: Option<ExpressionId>) -> Playback {
        let Some(model) = self.internal.as_deref_mut() else {
            return Playback::failed(PlaybackError::NotLoaded);
        };
        match model.motion_manager().expression_manager() {
            Some(expressions) => match id {
                Some(id) => expressions.set_expression(&id),
                None => expressions.set_random_expression(),
            },
            None => Playback::resolved(false),
        }
    }

    // --- Events ---

    /// Register a handler for every event
    pub fn register_handler(&mut self, handler: Box<dyn ModelEventHandler>) {
        self.events.register_handler(handler);
    }

    /// Register a handler for one event type
    pub fn register_handler_for(&mut self, event_type: ModelEventType, handler: Box<dyn ModelEventHandler>) {
        self.events.register_handler_for(event_type, handler);
    }

    // --- Teardown ---

    /// Release the model and its GPU state
    ///
    /// Safe on a node that never loaded; a second call does nothing.
    pub fn destroy(&mut self, options: DestroyOptions) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        log::debug!("{}: destroying", self.tag);
        self.events.emit(&ModelEvent::Destroy);

        if options.texture || options.base_texture {
            for texture in &mut self.textures {
                texture.release();
            }
        }

        self.automator.disable();

        if let Some(mut model) = self.internal.take() {
            model.destroy();
        }

        self.texture_cache.clear();
        self.events.clear();
    }
}

/// Node state the frame steps between the two renderer resets need
struct FrameState<'a> {
    tag: &'a str,
    textures: &'a [ModelTexture],
    texture_cache: &'a mut TextureCache,
    world: &'a Mat3,
    elapsed_time: f64,
    delta_time: &'a mut f32,
}

fn draw_frame(
    renderer: &mut dyn HostRenderer,
    model: &mut dyn InternalModel,
    frame: FrameState<'_>,
) -> RenderResult<()> {
    let report = frame.texture_cache.prepare(renderer, model, frame.textures)?;
    if report.context_changed {
        log::debug!(
            "{}: render context is now {:?}, rebound {} textures",
            frame.tag,
            frame.texture_cache.context(),
            report.uploaded
        );
    }

    model.set_viewport(renderer.viewport());

    if *frame.delta_time != 0.0 {
        model.update(*frame.delta_time, frame.elapsed_time);
        *frame.delta_time = 0.0;
    }

    model.update_transform(&(renderer.projection_matrix() * frame.world));
    model.draw(renderer.as_any_mut())
}

impl SceneNode for PuppetModel {
    fn update_transform(&mut self, parent: &ParentFrame) {
        self.transform.update(parent);
    }

    fn calculate_bounds(&self) -> Bounds {
        PuppetModel::calculate_bounds(self)
    }

    fn render(&mut self, renderer: &mut dyn HostRenderer) -> RenderResult<()> {
        PuppetModel::render(self, renderer)
    }

    fn destroy(&mut self, options: DestroyOptions) {
        PuppetModel::destroy(self, options);
    }
}

impl std::fmt::Debug for PuppetModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PuppetModel")
            .field("tag", &self.tag)
            .field("loaded", &self.is_loaded())
            .field("destroyed", &self.destroyed)
            .field("textures", &self.textures.len())
            .field("elapsed_time", &self.elapsed_time)
            .field("delta_time", &self.delta_time)
            .finish()
    }
}
