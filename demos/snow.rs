//! Twenty thousand drifting snow particles.

use flow_scenes::{
    context::Context,
    flow::{FlowConstructor, GraphicsFlow},
    scenes::snow::Snow,
};

fn main() -> anyhow::Result<()> {
    let snow: FlowConstructor = Box::new(|ctx: &Context| {
        let flow: Box<dyn GraphicsFlow> = Box::new(Snow::from_context(ctx)?);
        Ok(flow)
    });
    let summary = flow_scenes::flow::run(Context::from_env(), vec![snow])?;
    println!("{} frames in {:?}", summary.frames, summary.elapsed);
    Ok(())
}
