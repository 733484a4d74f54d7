use std::{cell::RefCell, rc::Rc};

use flow_scenes::{
    Duration,
    animation::random::Sequence,
    context::Context,
    flow::{Control, ExitReason, Out},
    render::HeadlessRenderer,
};

use crate::common::test_utils::{Probe, RecordingRenderer, State, test_app};

mod common;

#[test]
fn should_stop_at_frame_limit() {
    let state = State::shared();
    let mut app = test_app(
        Context::new().with_frame_limit(5),
        RecordingRenderer::default(),
        Sequence::constant(0.5),
    );
    app.add_flow(Box::new(Probe::new(state.clone())));

    let summary = app.run().unwrap();

    assert_eq!(summary.frames, 5);
    assert_eq!(summary.reason, ExitReason::FrameLimit);
    let state = state.borrow();
    assert_eq!(state.init_invocations(), 1);
    assert_eq!(state.update_invocations(), 5);
    assert_eq!(state.render_invocations(), 5);
    assert_eq!(app.renderer().calls, vec![0; 5]);
}

#[test]
fn should_hand_every_flow_the_same_clock_reading() {
    let first = State::shared();
    let second = State::shared();
    let mut app = test_app(
        Context::new().with_frame_limit(3),
        RecordingRenderer::default(),
        Sequence::constant(0.5),
    );
    app.add_flow(Box::new(Probe::new(first.clone())));
    app.add_flow(Box::new(Probe::new(second.clone())));

    app.run().unwrap();

    let step = Duration::from_secs_f64(1.0 / 60.0);
    let expected = vec![Duration::ZERO, step, step * 2];
    assert_eq!(first.borrow().elapsed, expected);
    assert_eq!(second.borrow().elapsed, expected);
    // one render call per flow per frame
    assert_eq!(app.renderer().calls.len(), 6);
}

#[test]
fn should_render_nothing_without_frames() {
    let state = State::shared();
    let mut app = test_app(
        Context::new().with_frame_limit(0),
        RecordingRenderer::default(),
        Sequence::constant(0.5),
    );
    app.add_flow(Box::new(Probe::new(state.clone())));

    let summary = app.run().unwrap();

    assert_eq!(summary.frames, 0);
    assert_eq!(state.borrow().init_invocations(), 1);
    assert_eq!(state.borrow().update_invocations(), 0);
    assert!(app.renderer().calls.is_empty());
}

#[test]
fn should_exit_after_rendering_the_requesting_frame() {
    let state = State::shared();
    let mut app = test_app(
        Context::new(),
        RecordingRenderer::default(),
        Sequence::constant(0.5),
    );
    app.add_flow(Box::new(Probe::scripted(state.clone(), |n| {
        Ok(if n == 4 { Out::Exit } else { Out::Empty })
    })));

    let summary = app.run().unwrap();

    assert_eq!(summary.reason, ExitReason::Requested);
    assert_eq!(summary.frames, 4);
    assert_eq!(state.borrow().render_invocations(), 4);
}

#[test]
fn should_not_render_after_failed_update() {
    let healthy = State::shared();
    let failing = State::shared();
    let mut app = test_app(
        Context::new().with_frame_limit(10),
        RecordingRenderer::default(),
        Sequence::constant(0.5),
    );
    app.add_flow(Box::new(Probe::new(healthy.clone())));
    app.add_flow(Box::new(Probe::scripted(failing.clone(), |n| {
        if n == 2 {
            anyhow::bail!("broken on frame {}", n)
        }
        Ok(Out::Empty)
    })));

    let err = app.run().unwrap_err();

    assert!(err.to_string().contains("broken on frame 2"));
    assert_eq!(app.frames(), 1);
    assert_eq!(healthy.borrow().update_invocations(), 2);
    assert_eq!(healthy.borrow().render_invocations(), 1);
    assert_eq!(failing.borrow().render_invocations(), 1);
}

#[test]
fn should_apply_configure_output_to_context() {
    let state = State::shared();
    let mut app = test_app(
        Context::new(),
        HeadlessRenderer::new(),
        Sequence::constant(0.5),
    );
    app.add_flow(Box::new(Probe::scripted(state.clone(), |n| {
        Ok(if n == 1 {
            Out::Configure(Box::new(|ctx: &mut Context| ctx.frame_limit = Some(3)))
        } else {
            Out::Empty
        })
    })));

    assert_eq!(app.tick().unwrap(), Control::Continue);
    assert_eq!(app.context().frame_limit, Some(3));
    assert_eq!(app.tick().unwrap(), Control::Continue);
    assert_eq!(app.tick().unwrap(), Control::Exit(ExitReason::FrameLimit));
    assert_eq!(app.renderer().frames(), 3);
}

#[test]
fn should_init_flows_only_once() {
    let state: Rc<RefCell<State>> = State::shared();
    let mut app = test_app(
        Context::new().with_frame_limit(2),
        RecordingRenderer::default(),
        Sequence::constant(0.5),
    );
    app.add_flow(Box::new(Probe::new(state.clone())));

    app.init().unwrap();
    app.tick().unwrap();
    app.tick().unwrap();

    assert_eq!(state.borrow().init_invocations(), 1);
}
