//! Puppet playground
//!
//! Drives a procedural demo model through the full frame loop with a
//! headless renderer: blinking, breathing, gaze focus, taps that trigger
//! motions, a render context loss halfway through, and teardown.
//!
//! Usage: `puppet_playground [config.toml|config.ron]`

mod config;
mod demo_model;
mod headless;

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use puppet_engine::config::{Config, ConfigError};
use puppet_engine::foundation::logging;
use puppet_engine::foundation::time::Ticker;
use puppet_engine::model::{ModelSettings, ModelSource};
use puppet_engine::motion::{MotionOptions, MotionPriority, Playback, SpeakOptions};
use puppet_engine::prelude::*;
use puppet_engine::puppet::ModelEventType;
use puppet_engine::render::RenderSubsystems;
use thiserror::Error;

use crate::config::PlaygroundConfig;
use crate::demo_model::{CycleSettings, DemoFactory};
use crate::headless::HeadlessRenderer;

#[derive(Error, Debug)]
enum PlaygroundError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Snapshot failed: {0}")]
    Snapshot(#[from] image::ImageError),
}

struct PlaygroundApp {
    config: PlaygroundConfig,
    node: PuppetModel,
    renderer: HeadlessRenderer,
    ticker: Ticker,
    hits: Rc<RefCell<Vec<Vec<String>>>>,
    playbacks: Vec<(String, Playback)>,
}

impl PlaygroundApp {
    fn new(config: PlaygroundConfig) -> Result<Self, PlaygroundError> {
        log::info!("Creating playground with model '{}'", config.model.name);

        let mut factory = DemoFactory::new(
            config.model.clone(),
            CycleSettings {
                blink: config.blink,
                breath: config.breath,
                seed: config.seed,
            },
        );

        let mut node = PuppetModel::new(config.puppet.clone());
        node.register_handler(Box::new(|event: &ModelEvent| {
            log::info!("Model event: {event:?}");
            false
        }));

        let hits = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&hits);
        node.register_handler_for(
            ModelEventType::Hit,
            Box::new(move |event: &ModelEvent| {
                if let ModelEvent::Hit(names) = event {
                    sink.borrow_mut().push(names.clone());
                }
                false
            }),
        );

        let source = ModelSource::Settings(ModelSettings {
            name: config.model.name.clone(),
            model: PathBuf::from(format!("{}.model3.json", config.model.name)),
            textures: Vec::new(),
        });
        node.load(&mut factory, &source)?;

        let [width, height] = config.viewport;
        node.set_anchor(0.5, 0.5);
        node.set_position(width / 2.0, height / 2.0);
        node.set_scale(0.5, 0.5);

        Ok(Self {
            renderer: HeadlessRenderer::new(width, height),
            ticker: Ticker::new(),
            hits,
            playbacks: Vec::new(),
            node,
            config,
        })
    }

    fn run(&mut self) -> Result<(), PlaygroundError> {
        log::info!("Running {} frames at {:.2}ms", self.config.frames, self.config.frame_ms);

        for frame in 0..self.config.frames {
            if self.config.context_loss_frame == Some(frame) {
                self.renderer.lose_context();
            }

            self.script(frame);

            let delta = self.ticker.advance(self.config.frame_ms);
            self.node.tick(delta);
            self.render_frame()?;
        }

        self.report();

        if let Some(path) = self.config.snapshot.clone() {
            if let Some(handle) = self.node.texture_cache().handle(0) {
                if self.renderer.save_texture(handle, &path)? {
                    log::info!("Wrote texture snapshot to {}", path.display());
                }
            }
        }

        self.node.destroy(DestroyOptions {
            texture: true,
            base_texture: true,
        });
        for (label, playback) in &self.playbacks {
            log::debug!("Playback {label}: {:?}", playback.status());
        }
        Ok(())
    }

    /// Scripted interaction, expressed in model space so it follows the node's layout
    fn script(&mut self, frame: u32) {
        let model = &self.config.model;
        let head = Point2::new(model.width * 0.5, model.height * 0.15);
        let body = Point2::new(model.width * 0.5, model.height * 0.6);

        match frame {
            30 => {
                if let Some(p) = self.node.to_world_position(Point2::new(model.width, 0.0)) {
                    self.node.handle_pointer(PointerEvent::Move { x: p.x, y: p.y }, &[]);
                }
            }
            60 => self.tap_at(head),
            120 => self.tap_at(body),
            180 => {
                let playback = self.node.expression(None);
                self.playbacks.push(("random expression".into(), playback));
            }
            240 => {
                let playback = self.node.speak("hello.wav", SpeakOptions::default());
                self.playbacks.push(("speak".into(), playback));
            }
            420 => self.node.set_alpha(0.5),
            _ => {}
        }

        let hits = std::mem::take(&mut *self.hits.borrow_mut());
        for names in hits {
            let group = if names.iter().any(|name| name == "head") {
                "tap_head"
            } else {
                "tap_body"
            };
            let playback = self.node.motion(group, None, MotionPriority::Normal, MotionOptions::default());
            self.playbacks.push((group.to_string(), playback));
        }
    }

    fn tap_at(&mut self, model_point: Point2) {
        if let Some(p) = self.node.to_world_position(model_point) {
            self.node.handle_pointer(PointerEvent::Tap { x: p.x, y: p.y }, &[]);
        }
    }

    fn render_frame(&mut self) -> Result<(), PlaygroundError> {
        self.node.update_transform(&ParentFrame::root());

        self.renderer.begin_frame();
        self.node.render(&mut self.renderer)?;
        let stats = self.renderer.end_frame();

        if stats.uploads > 0 {
            log::debug!(
                "Frame {}: uploaded {} textures in context {:?}",
                self.ticker.frame_count(),
                stats.uploads,
                self.renderer.context_id()
            );
        }
        if stats.draws == 0 {
            log::warn!("Frame {} drew nothing", self.ticker.frame_count());
        }
        if self.renderer.dirty().intersects(RenderSubsystems::AFTER_RAW_DRAW) {
            log::warn!("Renderer state left dirty after {} resets: {:?}", stats.resets, self.renderer.dirty());
        }
        Ok(())
    }

    fn report(&self) {
        let bounds = self.node.calculate_bounds();
        log::info!(
            "Rendered {} frames ({:.0}ms simulated), {} textures resident, bounds {:?}..{:?}",
            self.ticker.frame_count(),
            self.ticker.elapsed_ms(),
            self.renderer.texture_count(),
            bounds.min,
            bounds.max
        );
        if let Some(matrix) = self.renderer.last_draw_matrix() {
            log::debug!("Last draw matrix (alpha {}): {matrix}", self.renderer.last_draw_alpha());
        }
    }
}

fn load_config() -> Result<PlaygroundConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => PlaygroundConfig::load_or_default(path),
        None => Ok(PlaygroundConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_default("info");

    log::info!("Starting puppet playground");

    let result = load_config()
        .map_err(PlaygroundError::from)
        .and_then(PlaygroundApp::new)
        .and_then(|mut app| app.run());

    match result {
        Ok(()) => {
            log::info!("Playground finished successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Application error: {e}");
            Err(e.into())
        }
    }
}
