//! Box grid under fog, filmed by the tweened camera rig.
//!
//! Runs headless; set `FLOW_FRAMES` to stop after a number of frames and
//! `FLOW_SEED` to replay the same noise.

use flow_scenes::{
    context::Context,
    flow::{FlowConstructor, GraphicsFlow},
    scenes::camera_rig::CameraRig,
};

fn main() -> anyhow::Result<()> {
    let rig: FlowConstructor = Box::new(|ctx: &Context| {
        let flow: Box<dyn GraphicsFlow> = Box::new(CameraRig::new(ctx)?);
        Ok(flow)
    });
    let summary = flow_scenes::flow::run(Context::from_env(), vec![rig])?;
    println!("{} frames in {:?}", summary.frames, summary.elapsed);
    Ok(())
}
