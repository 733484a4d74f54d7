#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use flow_scenes::{
    animation::random::RandomSource,
    context::Context,
    data_structures::scene_graph::{NodeId, SceneGraph},
    flow::{App, GraphicsFlow, Out},
    render::{Render, Renderer},
    time::{Immediate, ManualClock},
    Duration,
};

/// Lifecycle counters shared between a probe flow and the test body.
#[derive(Debug, Default)]
pub(crate) struct State {
    init_invocations: u32,
    update_invocations: u32,
    render_invocations: u32,
    pub elapsed: Vec<Duration>,
}

impl State {
    pub fn shared() -> Rc<RefCell<State>> {
        Rc::new(RefCell::new(State::default()))
    }

    pub fn init(&mut self) {
        self.init_invocations += 1;
    }

    pub fn update(&mut self, elapsed: Duration) {
        self.update_invocations += 1;
        self.elapsed.push(elapsed);
    }

    pub fn render(&mut self) {
        self.render_invocations += 1;
    }

    pub fn init_invocations(&self) -> u32 {
        self.init_invocations
    }

    pub fn update_invocations(&self) -> u32 {
        self.update_invocations
    }

    pub fn render_invocations(&self) -> u32 {
        self.render_invocations
    }
}

type Script = Box<dyn FnMut(u32) -> anyhow::Result<Out>>;

/// A flow without a scene that counts its lifecycle calls and answers
/// `on_update` with whatever `script` returns for the 1-based update number.
pub(crate) struct Probe {
    pub state: Rc<RefCell<State>>,
    script: Script,
}

impl Probe {
    pub fn new(state: Rc<RefCell<State>>) -> Self {
        Self::scripted(state, |_| Ok(Out::Empty))
    }

    pub fn scripted(
        state: Rc<RefCell<State>>,
        script: impl FnMut(u32) -> anyhow::Result<Out> + 'static,
    ) -> Self {
        Self {
            state,
            script: Box::new(script),
        }
    }
}

impl GraphicsFlow for Probe {
    fn on_init(&mut self, _: &mut Context, _: &mut dyn RandomSource) -> anyhow::Result<Out> {
        self.state.borrow_mut().init();
        Ok(Out::Empty)
    }

    fn on_update(
        &mut self,
        _: &Context,
        elapsed: Duration,
        _: &mut dyn RandomSource,
    ) -> anyhow::Result<Out> {
        let count = {
            let mut state = self.state.borrow_mut();
            state.update(elapsed);
            state.update_invocations()
        };
        (self.script)(count)
    }

    fn on_render(&self) -> Render<'_> {
        self.state.borrow_mut().render();
        Render::None
    }

    fn name(&self) -> &str {
        "probe"
    }
}

/// Remembers how many scenes each render call carried.
#[derive(Debug, Default)]
pub(crate) struct RecordingRenderer {
    pub calls: Vec<usize>,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, render: Render<'_>) -> anyhow::Result<()> {
        self.calls.push(render.scenes().len());
        Ok(())
    }
}

/// An app on a manual 60 fps clock that never sleeps.
pub(crate) fn test_app<R: Renderer>(
    ctx: Context,
    renderer: R,
    rng: impl RandomSource + 'static,
) -> App<ManualClock, Immediate, R> {
    App::new(ctx, ManualClock::at_fps(60), Immediate, renderer, Box::new(rng))
}

/// Local y values of every child of `parent`.
pub(crate) fn child_heights(graph: &SceneGraph, parent: NodeId) -> Vec<(f32, f32)> {
    graph
        .children(parent)
        .expect("parent exists")
        .iter()
        .map(|&child| {
            let local = graph.local(child).expect("child exists");
            (local.position.y, local.scale.y)
        })
        .collect()
}
