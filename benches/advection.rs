use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use image::RgbaImage;

use windmap::field::{WindBounds, WindRaster};
use windmap::particles::{ParticleConfig, ParticleEngine};
use windmap::projection::{ViewportBounds, ZoomPolicy, fit_projection};
use windmap::render::{FieldConfig, FieldRenderer};

const WIDTH: u32 = 1024;
const HEIGHT: u32 = 512;

fn test_raster() -> Arc<WindRaster> {
    let image = RgbaImage::from_fn(360, 181, |x, y| {
        image::Rgba([((x * 7) % 256) as u8, ((y * 5 + x) % 256) as u8, 0, 255])
    });
    Arc::new(WindRaster::new(image, WindBounds::new(-25.0, 25.0, -20.0, 20.0)).unwrap())
}

fn bench_particle_tick(c: &mut Criterion) {
    let bounds = ViewportBounds::world();
    let projection = fit_projection(&bounds, WIDTH as f64 / HEIGHT as f64, ZoomPolicy::AspectFit);
    let config = ParticleConfig { seed: Some(42), ..Default::default() };
    let mut engine = ParticleEngine::new(config, WIDTH, HEIGHT).unwrap();
    engine.set_viewport(bounds, projection);
    engine.set_wind(test_raster());

    c.bench_function("particle_tick_5000", |b| {
        b.iter(|| black_box(engine.tick()))
    });
}

fn bench_field_draw(c: &mut Criterion) {
    let config = FieldConfig { grid_res_x: 360, grid_res_y: 180, ..Default::default() };
    let mut renderer = FieldRenderer::new(config, WIDTH, HEIGHT).unwrap();
    renderer.set_wind(test_raster());

    c.bench_function("field_draw_360x180", |b| {
        b.iter(|| black_box(renderer.draw()))
    });
}

fn bench_sample_bilinear(c: &mut Criterion) {
    let raster = test_raster();

    c.bench_function("sample_bilinear_1000", |b| {
        b.iter(|| {
            let mut acc = 0.0f32;
            for i in 0..1000 {
                let t = i as f32 / 1000.0;
                acc += raster.sample_bilinear(black_box(t), black_box(1.0 - t)).speed();
            }
            acc
        })
    });
}

criterion_group!(benches, bench_particle_tick, bench_field_draw, bench_sample_bilinear);
criterion_main!(benches);
