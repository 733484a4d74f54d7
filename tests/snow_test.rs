use flow_scenes::{
    animation::random::{Sequence, StdRandom},
    context::Context,
    data_structures::{
        model::{Attachment, Blending},
        particles::{Particle, ParticleBuffer},
    },
    render::HeadlessRenderer,
    scenes::snow::{PARTICLE_SYSTEM, Snow, SnowConfig},
};

const DRIFT: f32 = 0.1;

use crate::common::test_utils::test_app;

mod common;

fn single(x: f32, y: f32, z: f32) -> ParticleBuffer {
    ParticleBuffer::new(vec![Particle::new(x, y, z)])
}

#[test]
fn should_wrap_x_to_the_upper_bound() {
    let mut buffer = single(-49.96, 0.0, 0.0);
    // x moves by (0.0 - 1.0) * 0.1 = -0.1
    buffer.update(&mut Sequence::new(vec![0.0, 0.75, 0.0]));
    assert_eq!(buffer.particles()[0].position[0], 50.0);
    assert_eq!(buffer.wraps().x, 1);
}

#[test]
fn should_wrap_y_to_the_upper_bound() {
    let mut buffer = single(0.0, -49.95, 0.0);
    // y moves by (0.0 - 0.75) * 0.1 = -0.075
    buffer.update(&mut Sequence::new(vec![1.0, 0.0, 0.0]));
    assert_eq!(buffer.particles()[0].position[1], 50.0);
    assert_eq!(buffer.wraps().y, 1);
}

#[test]
fn should_not_wrap_y_at_the_upper_bound() {
    let mut buffer = single(0.0, 49.99, 0.0);
    // y moves by (0.99.. - 0.75) * 0.1, just under +0.025
    buffer.update(&mut Sequence::new(vec![0.5, 1.0, 0.0]));
    let y = buffer.particles()[0].position[1];
    assert!(y > 50.0 && y < 50.025);
    assert_eq!(buffer.wraps().y, 0);
}

#[test]
fn should_wrap_z_in_both_directions() {
    let mut forward = single(0.0, 0.0, 49.95);
    forward.update(&mut Sequence::new(vec![0.5, 0.75, 0.9]));
    assert_eq!(forward.particles()[0].position[2], -50.0);

    let mut backward = single(0.0, 0.0, -50.05).with_bound(50.0);
    backward.update(&mut Sequence::new(vec![0.5, 0.75, 0.0]));
    assert_eq!(backward.particles()[0].position[2], 50.0);
    assert_eq!(forward.wraps().z + backward.wraps().z, 2);
}

#[test]
fn should_wrap_z_within_a_thousand_ticks() {
    let mut buffer = ParticleBuffer::at_origin(10);
    let mut rng = Sequence::constant(0.9);
    for _ in 0..1000 {
        buffer.update(&mut rng);
    }
    // 0.09 per tick crosses +50 after 556 ticks
    assert_eq!(buffer.wraps().z, 10);
    for particle in buffer.particles() {
        assert!(particle.position[2].abs() <= 50.0);
    }
}

#[test]
fn should_keep_x_and_z_inside_bounds() {
    let mut rng = StdRandom::seeded(11);
    let mut buffer = ParticleBuffer::scattered(500, 100.0, &mut rng);
    for _ in 0..2000 {
        buffer.update(&mut rng);
    }
    for particle in buffer.particles() {
        let [x, y, z] = particle.position;
        assert!((-50.0..=50.0).contains(&x));
        assert!((-50.0..=50.0).contains(&z));
        // y has no upper wrap
        assert!(y >= -50.0);
    }
    assert!(buffer.wraps().x > 0);
}

#[test]
fn should_scatter_particles_in_cube() {
    let mut rng = StdRandom::seeded(3);
    let buffer = ParticleBuffer::scattered(1000, 100.0, &mut rng);
    assert_eq!(buffer.len(), 1000);
    assert!(
        buffer
            .particles()
            .iter()
            .flat_map(|p| p.position)
            .all(|c| (-50.0..50.0).contains(&c))
    );
}

#[test]
fn should_build_snow_scene() {
    let mut rng = StdRandom::seeded(5);
    let snow = Snow::new(&Context::new(), &mut rng).unwrap();
    let graph = snow.graph();
    let system = graph.find(PARTICLE_SYSTEM).unwrap();
    assert_eq!(system, snow.system());

    let Some(Attachment::Points(points)) = &graph.node(system).unwrap().attachment else {
        panic!("particle system without points");
    };
    assert_eq!(points.buffer.len(), 20_000);
    assert_eq!(points.material.blending, Blending::Additive);
    assert!(points.material.transparent);
    assert_eq!(points.material.map.as_deref(), Some("assets/textures/particle.jpg"));
}

#[test]
fn should_spin_and_drift_every_update() {
    let config = SnowConfig {
        count: 50,
        ..Default::default()
    };
    let mut snow = Snow::with_config(&Context::new(), config, &mut StdRandom::seeded(9)).unwrap();
    let before = snow.buffer().unwrap().version();

    let mut rng = Sequence::constant(0.5);
    for _ in 0..10 {
        snow.update(&mut rng).unwrap();
    }

    let spin = snow.graph().local(snow.system()).unwrap().rotation.y;
    assert!((spin - 0.05).abs() < 1e-6);
    assert_eq!(snow.buffer().unwrap().version(), before + 10);
}

#[test]
fn should_upload_particles_once_per_change() {
    let config = SnowConfig {
        count: 100,
        ..Default::default()
    };
    let snow = Snow::with_config(&Context::new(), config, &mut StdRandom::seeded(1)).unwrap();
    let mut app = test_app(
        Context::new().with_frame_limit(4),
        HeadlessRenderer::new(),
        Sequence::new(vec![0.1, 0.4, 0.7]),
    );
    app.add_flow(Box::new(snow));

    app.run().unwrap();

    let renderer = app.renderer();
    assert_eq!(renderer.total_uploads(), 4);
    let stats = renderer.last_frame();
    assert_eq!(stats.points, 100);
    assert_eq!(stats.uploaded_bytes, 100 * 12);
}

/// Counts particles whose first x drift reproduces the random draw behind
/// their starting x, which happens when scatter and loop share a stream.
fn drift_matching_start(snow: &mut Snow, seed: u64) -> usize {
    let start: Vec<f32> = snow.buffer().unwrap().particles().iter().map(|p| p.position[0]).collect();
    snow.update(&mut StdRandom::seeded(seed)).unwrap();
    let moved = snow.buffer().unwrap().particles();
    start
        .iter()
        .zip(moved)
        .filter(|(x0, p)| {
            let scatter_draw = *x0 / 100.0 + 0.5;
            let drift_draw = (p.position[0] - *x0) / DRIFT + 1.0;
            (scatter_draw - drift_draw).abs() < 1e-4
        })
        .count()
}

#[test]
fn should_scatter_from_a_different_stream_than_the_frame_loop() {
    let ctx = Context::new().with_seed(7);

    let mut shared = Snow::new(&ctx, &mut StdRandom::seeded(7)).unwrap();
    assert!(drift_matching_start(&mut shared, 7) > 19_000);

    let mut salted = Snow::from_context(&ctx).unwrap();
    assert!(drift_matching_start(&mut salted, 7) < 200);
}

#[test]
fn should_scatter_the_same_way_for_the_same_seed() {
    let ctx = Context::new().with_seed(21);
    let a = Snow::from_context(&ctx).unwrap();
    let b = Snow::from_context(&ctx).unwrap();
    assert_eq!(a.buffer().unwrap().particles(), b.buffer().unwrap().particles());
}
