//! Test doubles for the model and host renderer boundaries

use std::any::Any;
use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::foundation::math::Mat3;
use crate::model::{HitAreas, InternalModel};
use crate::motion::{
    ExpressionId, ExpressionManager, MotionManager, MotionOptions, MotionPriority, Playback, PlaybackSettler,
    SpeakOptions,
};
use crate::render::{
    ContextId, GpuTextureHandle, HostRenderer, RenderError, RenderResult, RenderSubsystems, TextureUpload, Viewport,
};

/// Shared call log, used to check ordering across the model and the renderer
pub type Journal = Rc<RefCell<Vec<String>>>;

/// Create an empty journal
pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

fn record(journal: Option<&Journal>, entry: impl Into<String>) {
    if let Some(journal) = journal {
        journal.borrow_mut().push(entry.into());
    }
}

/// Everything a [`MockModel`] was asked to do
#[derive(Debug, Default)]
pub struct MockState {
    pub context_updates: Vec<ContextId>,
    pub bound_textures: Vec<(usize, GpuTextureHandle)>,
    pub viewports: Vec<Viewport>,
    pub opacities: Vec<f32>,
    pub updates: Vec<(f32, f64)>,
    pub transforms: Vec<Mat3>,
    pub focus_calls: Vec<(f32, f32, bool)>,
    pub motion_calls: Vec<String>,
    pub draws: usize,
    pub destroyed: usize,
}

struct MockExpressions;

impl ExpressionManager for MockExpressions {
    fn set_expression(&mut self, _id: &ExpressionId) -> Playback {
        Playback::resolved(true)
    }

    fn set_random_expression(&mut self) -> Playback {
        Playback::resolved(true)
    }
}

struct MockMotions {
    state: Rc<RefCell<MockState>>,
    pending: Vec<PlaybackSettler>,
    expressions: Option<MockExpressions>,
}

impl MockMotions {
    fn start(&mut self, call: String) -> Playback {
        self.state.borrow_mut().motion_calls.push(call);
        let (playback, settler) = Playback::pending();
        self.pending.push(settler);
        playback
    }
}

impl MotionManager for MockMotions {
    fn start_motion(&mut self, group: &str, index: usize, _priority: MotionPriority, _options: MotionOptions) -> Playback {
        self.start(format!("motion {group} {index}"))
    }

    fn start_random_motion(&mut self, group: &str, _priority: MotionPriority, _options: MotionOptions) -> Playback {
        self.start(format!("random {group}"))
    }

    fn stop_all_motions(&mut self) {
        self.state.borrow_mut().motion_calls.push("stop".into());
        for settler in self.pending.drain(..) {
            settler.finish(false);
        }
    }

    fn speak(&mut self, sound: &str, _options: SpeakOptions) -> Playback {
        self.start(format!("speak {sound}"))
    }

    fn stop_speaking(&mut self) {
        self.state.borrow_mut().motion_calls.push("stop speaking".into());
    }

    fn expression_manager(&mut self) -> Option<&mut dyn ExpressionManager> {
        self.expressions.as_mut().map(|e| e as &mut dyn ExpressionManager)
    }

    fn destroy(&mut self) {
        for settler in self.pending.drain(..) {
            settler.abandon();
        }
    }
}

/// Scriptable [`InternalModel`] recording every call
pub struct MockModel {
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub original_width: f32,
    pub original_height: f32,
    pub local: Mat3,
    pub hit_areas: HitAreas,
    pub flip_y: bool,
    pub fail_draw: bool,
    state: Rc<RefCell<MockState>>,
    journal: Option<Journal>,
    motions: MockMotions,
}

impl MockModel {
    pub fn new(width: f32, height: f32) -> Self {
        let state = Rc::new(RefCell::new(MockState::default()));
        Self {
            name: "mock".into(),
            width,
            height,
            original_width: width,
            original_height: height,
            local: Mat3::identity(),
            hit_areas: HitAreas::default(),
            flip_y: false,
            fail_draw: false,
            motions: MockMotions {
                state: Rc::clone(&state),
                pending: Vec::new(),
                expressions: None,
            },
            state,
            journal: None,
        }
    }

    pub fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = Some(Rc::clone(journal));
        self
    }

    pub fn with_hit_areas(mut self, hit_areas: HitAreas) -> Self {
        self.hit_areas = hit_areas;
        self
    }

    pub fn with_expressions(mut self) -> Self {
        self.motions.expressions = Some(MockExpressions);
        self
    }

    /// Handle that stays valid after the model is boxed into a node
    pub fn shared_state(&self) -> Rc<RefCell<MockState>> {
        Rc::clone(&self.state)
    }

    pub fn state(&self) -> Ref<'_, MockState> {
        self.state.borrow()
    }
}

impl InternalModel for MockModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn original_width(&self) -> f32 {
        self.original_width
    }

    fn original_height(&self) -> f32 {
        self.original_height
    }

    fn local_transform(&self) -> Mat3 {
        self.local
    }

    fn hit_test(&self, x: f32, y: f32) -> Vec<String> {
        self.hit_areas.hit_test(x, y)
    }

    fn update(&mut self, dt: f32, elapsed: f64) {
        record(self.journal.as_ref(), "update");
        self.state.borrow_mut().updates.push((dt, elapsed));
    }

    fn update_transform(&mut self, transform: &Mat3) {
        record(self.journal.as_ref(), "update_transform");
        self.state.borrow_mut().transforms.push(*transform);
    }

    fn draw(&mut self, gpu: &mut dyn Any) -> RenderResult<()> {
        record(self.journal.as_ref(), "draw");
        if let Some(renderer) = gpu.downcast_mut::<MockRenderer>() {
            renderer.draws += 1;
        }
        self.state.borrow_mut().draws += 1;

        if self.fail_draw {
            return Err(RenderError::DrawFailed("mock draw failure".into()));
        }
        Ok(())
    }

    fn bind_texture(&mut self, slot: usize, handle: GpuTextureHandle) {
        record(self.journal.as_ref(), format!("bind {slot}"));
        self.state.borrow_mut().bound_textures.push((slot, handle));
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        record(self.journal.as_ref(), "set_viewport");
        self.state.borrow_mut().viewports.push(viewport);
    }

    fn set_opacity(&mut self, alpha: f32) {
        record(self.journal.as_ref(), "set_opacity");
        self.state.borrow_mut().opacities.push(alpha);
    }

    fn update_context(&mut self, _gpu: &mut dyn Any, context: ContextId) {
        record(self.journal.as_ref(), "update_context");
        self.state.borrow_mut().context_updates.push(context);
    }

    fn texture_flip_y(&self) -> bool {
        self.flip_y
    }

    fn focus(&mut self, x: f32, y: f32, instant: bool) {
        self.state.borrow_mut().focus_calls.push((x, y, instant));
    }

    fn motion_manager(&mut self) -> &mut dyn MotionManager {
        &mut self.motions
    }

    fn destroy(&mut self) {
        self.motions.destroy();
        self.state.borrow_mut().destroyed += 1;
    }
}

/// In-memory [`HostRenderer`]
pub struct MockRenderer {
    pub context: ContextId,
    pub viewport: Viewport,
    pub projection: Mat3,
    /// `(slot, flip_y, context)` per upload
    pub uploads: Vec<(usize, bool, ContextId)>,
    pub touched: Vec<GpuTextureHandle>,
    pub resets: Vec<RenderSubsystems>,
    pub draws: usize,
    pub fail_uploads: bool,
    next_handle: u64,
    journal: Option<Journal>,
}

impl MockRenderer {
    pub fn new(context: ContextId) -> Self {
        Self {
            context,
            viewport: Viewport::new(0.0, 0.0, 800.0, 600.0),
            projection: Mat3::identity(),
            uploads: Vec::new(),
            touched: Vec::new(),
            resets: Vec::new(),
            draws: 0,
            fail_uploads: false,
            next_handle: 1,
            journal: None,
        }
    }

    pub fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = Some(Rc::clone(journal));
        self
    }
}

impl HostRenderer for MockRenderer {
    fn context_id(&self) -> ContextId {
        self.context
    }

    fn reset(&mut self, subsystems: RenderSubsystems) {
        let label = if subsystems == RenderSubsystems::BEFORE_RAW_DRAW {
            "reset before"
        } else if subsystems == RenderSubsystems::AFTER_RAW_DRAW {
            "reset after"
        } else {
            "reset other"
        };
        record(self.journal.as_ref(), label);
        self.resets.push(subsystems);
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn projection_matrix(&self) -> Mat3 {
        self.projection
    }

    fn upload_texture(&mut self, upload: &TextureUpload<'_>) -> RenderResult<GpuTextureHandle> {
        record(self.journal.as_ref(), format!("upload {}", upload.slot));
        if self.fail_uploads {
            return Err(RenderError::TextureUpload {
                slot: upload.slot,
                reason: "mock upload failure".into(),
            });
        }

        self.uploads.push((upload.slot, upload.flip_y, upload.context));
        let handle = GpuTextureHandle(self.next_handle);
        self.next_handle += 1;
        Ok(handle)
    }

    fn touch_texture(&mut self, handle: GpuTextureHandle) {
        self.touched.push(handle);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
