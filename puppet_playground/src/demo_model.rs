//! Procedural demo model
//!
//! A stand-in for a real rig: a parameter table driven by the engine's
//! procedural cycles, a focus controller, two hit areas and a motion
//! manager that plays timed, scripted motions.

use std::any::Any;
use std::collections::HashMap;

use image::{Rgba, RgbaImage};
use puppet_engine::animation::{Breath, EyeBlink, RngJitter};
use puppet_engine::core::config::{BlinkConfig, BreathConfig, PuppetOptions};
use puppet_engine::foundation::math::{Mat3, Vec2};
use puppet_engine::model::{
    FocusController, HitArea, HitAreas, InternalModel, ModelAssets, ModelFactory, ModelSource, ParameterModel,
    ParameterTable, SetupError,
};
use puppet_engine::motion::{
    ExpressionId, ExpressionManager, MotionManager, MotionOptions, MotionPriority, Playback, PlaybackError,
    PlaybackSettler, PlaybackStatus, SpeakOptions,
};
use puppet_engine::render::{ContextId, GpuTextureHandle, ModelTexture, RenderError, RenderResult, Viewport};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::DemoModelConfig;
use crate::headless::HeadlessRenderer;

const PARAM_ANGLE_X: &str = "PARAM_ANGLE_X";
const PARAM_ANGLE_Y: &str = "PARAM_ANGLE_Y";
const PARAM_BODY_ANGLE_X: &str = "PARAM_BODY_ANGLE_X";
const PARAM_MOUTH_OPEN_Y: &str = "PARAM_MOUTH_OPEN_Y";

/// Speech length when the sound itself is not decoded
const SPEECH_MS: f32 = 1500.0;

fn rng_from(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

/// Log a playback nobody else observes if it already failed; returns whether it did
fn log_failure(what: &str, playback: &Playback) -> bool {
    match playback.status() {
        PlaybackStatus::Failed(e) => {
            log::debug!("{what} failed: {e}");
            true
        }
        _ => false,
    }
}

struct RunningMotion {
    group: String,
    priority: MotionPriority,
    duration: f32,
    remaining: f32,
    settler: PlaybackSettler,
}

struct Speech {
    remaining: f32,
    volume: f32,
    settler: PlaybackSettler,
}

/// Named expressions picked by index, name or at random
struct DemoExpressions {
    names: Vec<String>,
    current: Option<usize>,
    rng: StdRng,
}

impl DemoExpressions {
    fn apply(&mut self, index: usize) -> Playback {
        log::debug!("Expression -> {}", self.names[index]);
        self.current = Some(index);
        Playback::resolved(true)
    }
}

impl ExpressionManager for DemoExpressions {
    fn set_expression(&mut self, id: &ExpressionId) -> Playback {
        let index = match id {
            ExpressionId::Index(index) => (*index < self.names.len()).then_some(*index),
            ExpressionId::Name(name) => self.names.iter().position(|n| n == name),
        };
        match index {
            Some(index) => self.apply(index),
            None => Playback::failed(PlaybackError::Unavailable(format!("expression {id:?}"))),
        }
    }

    fn set_random_expression(&mut self) -> Playback {
        let candidates: Vec<usize> = (0..self.names.len()).filter(|&i| Some(i) != self.current).collect();
        if candidates.is_empty() {
            return Playback::resolved(false);
        }
        let index = candidates[self.rng.gen_range(0..candidates.len())];
        self.apply(index)
    }
}

/// Plays timed motions from fixed groups
struct ScriptedMotions {
    groups: HashMap<String, Vec<f32>>,
    idle_group: Option<String>,
    volume: f32,
    running: Option<RunningMotion>,
    speech: Option<Speech>,
    expressions: DemoExpressions,
    rng: StdRng,
}

impl ScriptedMotions {
    fn new(options: &PuppetOptions, seed: Option<u64>) -> Self {
        let groups = HashMap::from([
            ("idle".to_string(), vec![2400.0, 3200.0]),
            ("tap_head".to_string(), vec![800.0]),
            ("tap_body".to_string(), vec![1200.0, 1600.0]),
        ]);

        Self {
            groups,
            idle_group: options.motion.idle_motion_group.clone(),
            volume: options.motion.sound_volume,
            running: None,
            speech: None,
            expressions: DemoExpressions {
                names: vec!["neutral".into(), "smile".into(), "surprised".into()],
                current: None,
                rng: rng_from(seed.map(|s| s.wrapping_add(2))),
            },
            rng: rng_from(seed.map(|s| s.wrapping_add(3))),
        }
    }

    fn update(&mut self, dt: f32, params: &mut ParameterTable) {
        if self.running.is_none() {
            if let Some(group) = self.idle_group.clone() {
                let playback = self.start_random_motion(&group, MotionPriority::Idle, MotionOptions::default());
                log_failure("Idle motion", &playback);
            }
        }

        if let Some(motion) = &mut self.running {
            motion.remaining -= dt;
            let progress = 1.0 - (motion.remaining / motion.duration).max(0.0);
            if let Some(index) = params.parameter_index(PARAM_BODY_ANGLE_X) {
                params.set_parameter(index, (progress * std::f32::consts::TAU).sin() * 10.0);
            }
        }
        if self.running.as_ref().is_some_and(|motion| motion.remaining <= 0.0) {
            if let Some(motion) = self.running.take() {
                log::trace!("Motion in {} finished", motion.group);
                motion.settler.finish(true);
            }
        }

        if let Some(speech) = &mut self.speech {
            speech.remaining -= dt;
            if let Some(index) = params.parameter_index(PARAM_MOUTH_OPEN_Y) {
                let open = ((speech.remaining / 90.0).sin().abs() * speech.volume).min(1.0);
                params.set_parameter(index, open);
            }
        }
        if self.speech.as_ref().is_some_and(|speech| speech.remaining <= 0.0) {
            if let Some(speech) = self.speech.take() {
                speech.settler.finish(true);
            }
        }
    }
}

impl MotionManager for ScriptedMotions {
    fn start_motion(&mut self, group: &str, index: usize, priority: MotionPriority, options: MotionOptions) -> Playback {
        let Some(duration) = self.groups.get(group).and_then(|motions| motions.get(index)).copied() else {
            return Playback::failed(PlaybackError::Unavailable(format!("motion {group}[{index}]")));
        };

        if priority == MotionPriority::None {
            return Playback::resolved(false);
        }
        if let Some(running) = &self.running {
            if priority < running.priority {
                log::trace!("Motion {group}[{index}] declined, {:?} is playing", running.priority);
                return Playback::resolved(false);
            }
        }

        if let Some(expression) = &options.expression {
            log_failure("Expression", &self.expressions.set_expression(expression));
        }
        if let Some(sound) = &options.sound {
            let speech = self.speak(
                sound,
                SpeakOptions {
                    volume: options.volume,
                    ..SpeakOptions::default()
                },
            );
            log_failure("Motion sound", &speech);
        }

        let (playback, settler) = Playback::pending();
        if let Some(previous) = self.running.replace(RunningMotion {
            group: group.to_string(),
            priority,
            duration,
            remaining: duration,
            settler,
        }) {
            previous.settler.finish(false);
        }
        log::debug!("Motion {group}[{index}] started at {priority:?}");
        playback
    }

    fn start_random_motion(&mut self, group: &str, priority: MotionPriority, options: MotionOptions) -> Playback {
        let count = self.groups.get(group).map_or(0, Vec::len);
        if count == 0 {
            return Playback::failed(PlaybackError::Unavailable(format!("motion group {group}")));
        }
        let index = self.rng.gen_range(0..count);
        self.start_motion(group, index, priority, options)
    }

    fn stop_all_motions(&mut self) {
        if let Some(motion) = self.running.take() {
            motion.settler.finish(false);
        }
    }

    fn speak(&mut self, sound: &str, options: SpeakOptions) -> Playback {
        if !sound.ends_with(".wav") && !sound.ends_with(".ogg") {
            return Playback::failed(PlaybackError::Unavailable(format!("sound {sound}")));
        }
        if let Some(expression) = &options.expression {
            log_failure("Expression", &self.expressions.set_expression(expression));
        }

        let (playback, settler) = Playback::pending();
        if let Some(previous) = self.speech.replace(Speech {
            remaining: SPEECH_MS,
            volume: options.volume * self.volume * 2.0,
            settler,
        }) {
            previous.settler.finish(false);
        }
        playback
    }

    fn stop_speaking(&mut self) {
        if let Some(speech) = self.speech.take() {
            speech.settler.finish(false);
        }
    }

    fn expression_manager(&mut self) -> Option<&mut dyn ExpressionManager> {
        Some(&mut self.expressions)
    }

    fn destroy(&mut self) {
        if let Some(motion) = self.running.take() {
            motion.settler.abandon();
        }
        if let Some(speech) = self.speech.take() {
            speech.settler.abandon();
        }
    }
}

/// Rig driven by the engine's procedural cycles
pub struct DemoModel {
    name: String,
    width: f32,
    height: f32,
    params: ParameterTable,
    blink: EyeBlink,
    breath: Breath,
    focus: FocusController,
    hit_areas: HitAreas,
    motions: ScriptedMotions,
    bound: Vec<Option<GpuTextureHandle>>,
    viewport: Viewport,
    draw_matrix: Mat3,
    opacity: f32,
    context: ContextId,
}

impl DemoModel {
    fn new(name: String, config: &DemoModelConfig, cycles: &CycleSettings, options: &PuppetOptions) -> Self {
        let params = ParameterTable::new()
            .with(puppet_engine::animation::eye_blink::PARAM_EYE_L_OPEN, 1.0)
            .with(puppet_engine::animation::eye_blink::PARAM_EYE_R_OPEN, 1.0)
            .with(puppet_engine::animation::breath::PARAM_BREATH, 0.0)
            .with(PARAM_ANGLE_X, 0.0)
            .with(PARAM_ANGLE_Y, 0.0)
            .with(PARAM_BODY_ANGLE_X, 0.0)
            .with(PARAM_MOUTH_OPEN_Y, 0.0);

        let (blink_jitter, breath_jitter) = match cycles.seed {
            Some(seed) => (RngJitter::from_seed(seed), RngJitter::from_seed(seed.wrapping_add(1))),
            None => (RngJitter::from_entropy(), RngJitter::from_entropy()),
        };

        let (w, h) = (config.width, config.height);
        let hit_areas = HitAreas::new()
            .with(HitArea::new("head", Vec2::new(w * 0.25, 0.0), Vec2::new(w * 0.75, h * 0.3)))
            .with(HitArea::new("body", Vec2::new(w * 0.15, h * 0.25), Vec2::new(w * 0.85, h)));

        Self {
            name,
            width: w,
            height: h,
            blink: EyeBlink::with_jitter(&cycles.blink, &params, blink_jitter),
            breath: Breath::with_jitter(&cycles.breath, &params, breath_jitter),
            params,
            focus: FocusController::new(),
            hit_areas,
            motions: ScriptedMotions::new(options, cycles.seed),
            bound: vec![None; config.textures],
            viewport: Viewport::default(),
            draw_matrix: Mat3::identity(),
            opacity: 1.0,
            context: ContextId::UNINITIALIZED,
        }
    }
}

impl InternalModel for DemoModel {
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
        self.width
    }

    fn original_height(&self) -> f32 {
        self.height
    }

    fn local_transform(&self) -> Mat3 {
        Mat3::identity()
    }

    fn hit_test(&self, x: f32, y: f32) -> Vec<String> {
        self.hit_areas.hit_test(x, y)
    }

    fn update(&mut self, dt: f32, elapsed: f64) {
        self.params.reset();
        self.motions.update(dt, &mut self.params);

        self.focus.update(dt);
        let (fx, fy) = self.focus.position();
        for (id, value) in [(PARAM_ANGLE_X, fx * 30.0), (PARAM_ANGLE_Y, fy * 30.0)] {
            if let Some(index) = self.params.parameter_index(id) {
                self.params.set_parameter(index, value);
            }
        }

        self.breath.update(dt, &mut self.params);
        self.blink.update(dt, &mut self.params);
        log::trace!("{}: t={elapsed:.0}ms blink={:?}", self.name, self.blink.phase());
    }

    fn update_transform(&mut self, transform: &Mat3) {
        self.draw_matrix = *transform;
    }

    fn draw(&mut self, gpu: &mut dyn Any) -> RenderResult<()> {
        let renderer = gpu
            .downcast_mut::<HeadlessRenderer>()
            .ok_or_else(|| RenderError::BackendError("demo model draws with the headless renderer only".into()))?;

        for (slot, handle) in self.bound.iter().enumerate() {
            match handle {
                Some(handle) if renderer.is_resident(*handle) => {}
                _ => return Err(RenderError::DrawFailed(format!("texture slot {slot} is not resident"))),
            }
        }

        renderer.record_draw(&self.draw_matrix, self.opacity);
        Ok(())
    }

    fn bind_texture(&mut self, slot: usize, handle: GpuTextureHandle) {
        if let Some(bound) = self.bound.get_mut(slot) {
            *bound = Some(handle);
        }
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn set_opacity(&mut self, alpha: f32) {
        self.opacity = alpha;
    }

    fn update_context(&mut self, _gpu: &mut dyn Any, context: ContextId) {
        log::debug!("{}: context {:?} -> {:?}", self.name, self.context, context);
        self.context = context;
        self.bound.fill(None);
    }

    fn texture_flip_y(&self) -> bool {
        true
    }

    fn focus(&mut self, x: f32, y: f32, instant: bool) {
        self.focus.focus(x, y, instant);
    }

    fn motion_manager(&mut self) -> &mut dyn MotionManager {
        &mut self.motions
    }

    fn destroy(&mut self) {
        self.motions.destroy();
        self.bound.clear();
    }
}

/// Procedural cycle settings shared by every model the factory builds
pub struct CycleSettings {
    /// Blink timing
    pub blink: BlinkConfig,
    /// Breath timing
    pub breath: BreathConfig,
    /// Jitter seed
    pub seed: Option<u64>,
}

/// Builds demo models with generated or file-based textures
pub struct DemoFactory {
    model: DemoModelConfig,
    cycles: CycleSettings,
    rng: StdRng,
}

impl DemoFactory {
    /// Create a factory
    pub fn new(model: DemoModelConfig, cycles: CycleSettings) -> Self {
        let rng = rng_from(cycles.seed.map(|s| s.wrapping_add(4)));
        Self { model, cycles, rng }
    }

    fn generated_texture(&mut self, slot: usize) -> ModelTexture {
        let size = self.model.texture_size.max(1);
        let tint: [u8; 3] = [self.rng.gen(), self.rng.gen(), self.rng.gen()];
        let image = RgbaImage::from_fn(size, size, |x, y| {
            let shade = ((x + y) * 255 / (2 * size)) as u8;
            Rgba([tint[0] ^ shade, tint[1], tint[2] ^ (255 - shade), 255])
        });
        ModelTexture::new(format!("generated_{slot:02}"), image)
    }
}

impl ModelFactory for DemoFactory {
    fn create(&mut self, source: &ModelSource, options: &PuppetOptions) -> Result<ModelAssets, SetupError> {
        let (name, textures) = match source {
            ModelSource::Settings(settings) if !settings.textures.is_empty() => {
                let mut textures = Vec::with_capacity(settings.textures.len());
                for path in &settings.textures {
                    if !path.exists() {
                        return Err(SetupError::NotFound(path.clone()));
                    }
                    let image = image::open(path)?.to_rgba8();
                    textures.push(ModelTexture::new(path.display().to_string(), image));
                }
                (settings.name.clone(), textures)
            }
            _ => {
                if self.model.textures == 0 {
                    return Err(SetupError::InvalidSettings("demo model needs at least one texture".into()));
                }
                let textures = (0..self.model.textures).map(|slot| self.generated_texture(slot)).collect();
                (source.display_name(), textures)
            }
        };

        let mut config = self.model.clone();
        config.textures = textures.len();
        let model = DemoModel::new(name, &config, &self.cycles, options);

        Ok(ModelAssets {
            model: Box::new(model),
            textures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motions() -> ScriptedMotions {
        ScriptedMotions::new(&PuppetOptions::default(), Some(7))
    }

    #[test]
    fn test_log_failure_reports_only_failed_playbacks() {
        assert!(log_failure("test", &Playback::failed(PlaybackError::Unavailable("x".into()))));
        assert!(!log_failure("test", &Playback::resolved(true)));
        assert!(!log_failure("test", &Playback::pending().0));
    }

    #[test]
    fn test_unknown_expression_does_not_block_motion() {
        let mut motions = motions();
        let options = MotionOptions::default().with_expression("grumpy");

        let playback = motions.start_motion("tap_head", 0, MotionPriority::Normal, options);

        assert!(playback.is_pending());
        assert_eq!(motions.expressions.current, None);
    }

    #[test]
    fn test_unsupported_motion_sound_does_not_block_motion() {
        let mut motions = motions();
        let options = MotionOptions::default().with_sound("voice.mp3", 0.5);

        let playback = motions.start_motion("tap_body", 1, MotionPriority::Normal, options);

        assert!(playback.is_pending());
        assert!(motions.speech.is_none());
    }
}
