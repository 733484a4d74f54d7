//! Flow control and the frame loop.
//!
//! A "flow" is one scene's per-frame logic: it owns its scene graph, mutates
//! it on every update and says what to draw. The [`App`] drives any number of
//! flows with an explicit loop instead of a self-rescheduling callback, so the
//! exit condition is visible and a single tick can be run from a test.
//!
//! # Lifecycle
//!
//! 1. `on_init()` is called once per flow before the first frame; the clock is
//!    reset afterwards so construction time does not count as scene time
//! 2. every tick the clock is read once and `on_update()` is called on every
//!    flow with that reading
//! 3. only if all updates succeeded, `on_render()` of every flow is handed to
//!    the renderer
//! 4. outputs of the flows are applied (`Configure`, `Exit`)
//! 5. the loop stops on a frame limit, an exit request or the first error;
//!    otherwise the scheduler arranges the next frame

use std::fmt::Debug;

use instant::Duration;
use log::{error, info};

use crate::{
    animation::random::{RandomSource, StdRandom},
    context::{Context, LoggingConfig, init_logging},
    render::{HeadlessRenderer, Render, Renderer},
    time::{Clock, FramePacer, Scheduler, SystemClock},
};

///
/// Output of a lifecycle hook.
///
/// `Out::Configure` can be used to modify the Context during runtime, for
/// instance to change the target frame rate or the frame limit.
///
/// `Out::Exit` stops the loop after the current frame has been rendered.
///
/// `Empty` is the default output used when nothing needs to be handled.
///
pub enum Out {
    Configure(Box<dyn FnOnce(&mut Context)>),
    Exit,
    Empty,
}

impl Default for Out {
    fn default() -> Self {
        Self::Empty
    }
}

impl Debug for Out {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configure(_) => f.write_str("Configure(|&mut Context| -> {...})"),
            Self::Exit => f.write_str("Exit"),
            Self::Empty => f.write_str("Empty"),
        }
    }
}

/// Trait for implementing an animated scene.
pub trait GraphicsFlow {
    /// Prepare the flow before the first frame.
    ///
    /// This is the place to adjust the Context directly, e.g. the clear colour.
    fn on_init(&mut self, ctx: &mut Context, rng: &mut dyn RandomSource) -> anyhow::Result<Out>;

    /// Update state every frame.
    ///
    /// `elapsed` is the scene time of this frame, shared by all flows. All
    /// randomness must come from `rng` so runs can be replayed.
    fn on_update(
        &mut self,
        ctx: &Context,
        elapsed: Duration,
        rng: &mut dyn RandomSource,
    ) -> anyhow::Result<Out>;

    /// Return what to draw for this flow. Called each frame after all updates.
    fn on_render(&self) -> Render<'_>;

    /// Name used in log messages.
    fn name(&self) -> &str {
        "flow"
    }
}

/// Type alias for a flow constructor (factory function).
///
/// Constructors run after the run configuration is final, so a flow can seed
/// its noise from [`Context::seed`].
pub type FlowConstructor = Box<dyn FnOnce(&Context) -> anyhow::Result<Box<dyn GraphicsFlow>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    FrameLimit,
    Requested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit(ExitReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub elapsed: Duration,
    pub reason: ExitReason,
}

pub struct App<C: Clock, S: Scheduler, R: Renderer> {
    ctx: Context,
    clock: C,
    scheduler: S,
    renderer: R,
    rng: Box<dyn RandomSource>,
    graphics_flows: Vec<Box<dyn GraphicsFlow>>,
    initialized: bool,
    frames: u64,
}

impl<C: Clock, S: Scheduler, R: Renderer> App<C, S, R> {
    pub fn new(ctx: Context, clock: C, scheduler: S, renderer: R, rng: Box<dyn RandomSource>) -> Self {
        Self {
            ctx,
            clock,
            scheduler,
            renderer,
            rng,
            graphics_flows: Vec::new(),
            initialized: false,
            frames: 0,
        }
    }

    pub fn add_flow(&mut self, flow: Box<dyn GraphicsFlow>) {
        self.graphics_flows.push(flow);
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn flows(&self) -> &[Box<dyn GraphicsFlow>] {
        &self.graphics_flows
    }

    /// Calls `on_init` on every flow once. Runs implicitly before the first tick.
    pub fn init(&mut self) -> anyhow::Result<()> {
        if self.initialized {
            return Ok(());
        }
        let mut outs = Vec::with_capacity(self.graphics_flows.len());
        for flow in self.graphics_flows.iter_mut() {
            info!("initializing {}", flow.name());
            outs.push(flow.on_init(&mut self.ctx, self.rng.as_mut())?);
        }
        // An exit request during init only takes effect after the first frame.
        self.apply(outs);
        self.clock.reset();
        self.initialized = true;
        Ok(())
    }

    /// Runs one frame: update every flow, render every flow, apply outputs.
    ///
    /// On an update error nothing is rendered and the error is returned.
    pub fn tick(&mut self) -> anyhow::Result<Control> {
        self.init()?;
        self.clock.tick();
        let elapsed = self.clock.elapsed();

        let mut outs = Vec::with_capacity(self.graphics_flows.len());
        for flow in self.graphics_flows.iter_mut() {
            match flow.on_update(&self.ctx, elapsed, self.rng.as_mut()) {
                Ok(out) => outs.push(out),
                Err(e) => {
                    error!("{} failed to update at {:?}: {:#}", flow.name(), elapsed, e);
                    return Err(e);
                }
            }
        }

        for flow in self.graphics_flows.iter() {
            if let Err(e) = self.renderer.render(flow.on_render()) {
                error!("Unable to render {}: {:#}", flow.name(), e);
                return Err(e);
            }
        }
        self.frames += 1;

        let exit_requested = self.apply(outs);
        if exit_requested {
            return Ok(Control::Exit(ExitReason::Requested));
        }
        match self.ctx.frame_limit {
            Some(limit) if self.frames >= limit => Ok(Control::Exit(ExitReason::FrameLimit)),
            _ => Ok(Control::Continue),
        }
    }

    /// Ticks until an exit condition holds. Without a frame limit and without
    /// a flow returning `Out::Exit` this never returns `Ok`.
    pub fn run(&mut self) -> anyhow::Result<RunSummary> {
        self.init()?;
        if self.ctx.frame_limit == Some(0) {
            return Ok(self.summary(ExitReason::FrameLimit));
        }
        loop {
            match self.tick()? {
                Control::Continue => self.scheduler.next_frame(),
                Control::Exit(reason) => {
                    let summary = self.summary(reason);
                    info!(
                        "stopped after {} frames ({:?} of scene time): {:?}",
                        summary.frames, summary.elapsed, reason
                    );
                    return Ok(summary);
                }
            }
        }
    }

    fn summary(&self, reason: ExitReason) -> RunSummary {
        RunSummary {
            frames: self.frames,
            elapsed: self.clock.elapsed(),
            reason,
        }
    }

    /// Applies flow outputs in flow order. Returns whether any flow asked to exit.
    fn apply(&mut self, outs: Vec<Out>) -> bool {
        let mut exit = false;
        for out in outs {
            match out {
                Out::Configure(f) => f(&mut self.ctx),
                Out::Exit => exit = true,
                Out::Empty => (),
            }
        }
        exit
    }
}

/// Runs flows with the wall clock, a frame pacer and the headless renderer.
///
/// Logging is initialized if nobody did so before. The seed is fixed before
/// the constructors run and logged so a run can be reproduced with `FLOW_SEED`.
pub fn run(mut ctx: Context, constructors: Vec<FlowConstructor>) -> anyhow::Result<RunSummary> {
    init_logging(LoggingConfig::default());

    let seed = ctx.seed_or_random();
    ctx.seed = Some(seed);
    info!("running {} flows with seed {}", constructors.len(), seed);

    let flows = constructors
        .into_iter()
        .map(|constructor| constructor(&ctx))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let pacer = FramePacer::new(ctx.target_fps);
    let mut app = App::new(
        ctx,
        SystemClock::new(),
        pacer,
        HeadlessRenderer::new(),
        Box::new(StdRandom::seeded(seed)),
    );
    for flow in flows {
        app.add_flow(flow);
    }
    app.run()
}
