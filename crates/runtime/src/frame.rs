//! Frame scheduler: decides whether a frame runs, drives per-frame
//! work, and collects scheduling commands issued from inside callbacks.
//!
//! # Invariants
//! - In on-demand mode a pending render request admits exactly one
//!   frame; running a frame consumes the request.
//! - Transient work registered during a frame first runs on the next
//!   frame, never the current one.
//! - `stop` issued from a callback takes effect after the current pass,
//!   so the frame that issued it still completes.

use tableau_common::ObjectId;
use tableau_scene::Scene;

/// Frame scheduling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameloopMode {
    /// A frame runs on every display refresh.
    Continuous,
    /// Frames run only when explicitly requested.
    #[default]
    OnDemand,
}

/// Context handed to transient per-frame work.
pub struct RunWhileContext<'a> {
    pub delta: f32,
    pub frameloop: FrameloopMode,
    pub scene: &'a mut Scene,
    pub commands: &'a mut FrameCommands,
}

/// Transient work: runs every frame until it returns `false`, then
/// deregisters itself.
pub type RunWhile = Box<dyn FnMut(&mut RunWhileContext<'_>) -> bool>;

/// Scheduling requests collected while callbacks run, applied to the
/// loop afterwards. Callbacks never touch the scheduler directly.
#[derive(Default)]
pub struct FrameCommands {
    render: bool,
    start: bool,
    stop: bool,
    transients: Vec<RunWhile>,
}

impl FrameCommands {
    /// Ask for one frame under on-demand scheduling. Harmless when the
    /// loop is continuous.
    pub fn request_render(&mut self) {
        self.render = true;
    }

    pub fn request_start(&mut self) {
        self.start = true;
    }

    pub fn request_stop(&mut self) {
        self.stop = true;
    }

    /// Register transient work that starts on the next frame.
    pub fn run_while(&mut self, predicate: impl FnMut(&mut RunWhileContext<'_>) -> bool + 'static) {
        self.transients.push(Box::new(predicate));
    }
}

/// The frame loop proper: running flag, mode, registered tickable
/// objects and transient work.
pub struct FrameLoop {
    mode: FrameloopMode,
    running: bool,
    render_requested: bool,
    tickables: Vec<ObjectId>,
    transients: Vec<RunWhile>,
}

impl FrameLoop {
    pub fn new(mode: FrameloopMode) -> Self {
        Self {
            mode,
            running: false,
            render_requested: false,
            tickables: Vec::new(),
            transients: Vec::new(),
        }
    }

    pub fn mode(&self) -> FrameloopMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Idempotent: starting a running loop changes nothing.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Halts scheduling of future frames. Idempotent.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn request_render(&mut self) {
        self.render_requested = true;
    }

    /// Decides whether a frame runs on this refresh, consuming any
    /// pending render request.
    pub fn take_frame(&mut self) -> bool {
        if !self.running {
            return false;
        }
        match self.mode {
            FrameloopMode::Continuous => true,
            FrameloopMode::OnDemand => std::mem::take(&mut self.render_requested),
        }
    }

    pub(crate) fn register_tickable(&mut self, id: ObjectId) {
        self.tickables.push(id);
    }

    /// Tickable objects in registration order.
    pub(crate) fn tickables(&self) -> &[ObjectId] {
        &self.tickables
    }

    pub fn run_while(&mut self, predicate: impl FnMut(&mut RunWhileContext<'_>) -> bool + 'static) {
        self.transients.push(Box::new(predicate));
    }

    pub fn transient_count(&self) -> usize {
        self.transients.len()
    }

    /// Runs every transient once, dropping those that return `false`.
    /// Transients registered into `commands` during the pass are not
    /// run until the commands are applied.
    pub(crate) fn run_transients(
        &mut self,
        scene: &mut Scene,
        delta: f32,
        commands: &mut FrameCommands,
    ) {
        let mode = self.mode;
        let mut active = std::mem::take(&mut self.transients);
        active.retain_mut(|work| {
            let mut ctx = RunWhileContext {
                delta,
                frameloop: mode,
                scene: &mut *scene,
                commands: &mut *commands,
            };
            work(&mut ctx)
        });
        // Registrations made outside the pass land behind the survivors.
        active.append(&mut self.transients);
        self.transients = active;
    }

    /// Applies collected commands. `stop` wins over `start` issued in
    /// the same pass.
    pub(crate) fn apply(&mut self, commands: &mut FrameCommands) {
        if std::mem::take(&mut commands.start) {
            self.start();
        }
        if std::mem::take(&mut commands.render) {
            self.request_render();
        }
        self.transients.append(&mut commands.transients);
        if std::mem::take(&mut commands.stop) {
            self.stop();
        }
    }
}

/// Rolling frame accounting, updated once per executed frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub frames: u64,
    pub elapsed: f32,
}

impl FrameStats {
    pub(crate) fn record(&mut self, delta: f32) {
        self.frames += 1;
        self.elapsed += delta;
    }

    pub fn mean_frame_time(&self) -> f32 {
        if self.frames == 0 {
            0.0
        } else {
            self.elapsed / self.frames as f32
        }
    }

    pub fn fps(&self) -> f32 {
        let mean = self.mean_frame_time();
        if mean > 0.0 { 1.0 / mean } else { 0.0 }
    }
}
