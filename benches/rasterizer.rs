use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use softraster::colors;
use softraster::light::Light;
use softraster::math::{Mat4, Vec3};
use softraster::primitives;
use softraster::projection;
use softraster::render::{FrameBuffer, RasterState, Rasterizer};
use softraster::scene::{Material, Scene, SceneNode};
use softraster::vertex::Vertex;
use softraster::Renderer;

const BUFFER_WIDTH: usize = 800;
const BUFFER_HEIGHT: usize = 600;

fn rasterizer() -> Rasterizer {
    let aspect = BUFFER_WIDTH as f32 / BUFFER_HEIGHT as f32;
    let projection = projection::frustum(1.0, aspect, 1.0, 100.0);
    let light = Light::default().to_camera(&Mat4::identity());
    Rasterizer::new(RasterState::new(projection, light, 0.1))
}

/// Camera-space triangle at depth 10 covering roughly `size` pixels across.
fn triangle(size: f32) -> [Vertex; 3] {
    let s = size / BUFFER_HEIGHT as f32 * 10.0;
    [
        Vertex::at(Vec3::new(-s, -s, -10.0)),
        Vertex::at(Vec3::new(s, -s, -10.0)),
        Vertex::at(Vec3::new(0.0, s, -10.0)),
    ]
}

fn benchmark_single_triangle(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_triangle");
    let material = Material::default();

    for (name, size) in [("small", 20.0), ("medium", 200.0), ("large", 500.0)] {
        let tri = triangle(size);
        group.bench_with_input(BenchmarkId::new("phong", name), &tri, |b, tri| {
            let mut buffer = FrameBuffer::new(BUFFER_WIDTH, BUFFER_HEIGHT, colors::BLACK).unwrap();
            let mut rasterizer = rasterizer();
            b.iter(|| {
                // Clear depth so every iteration shades the full triangle.
                buffer.clear(colors::BLACK);
                rasterizer.paint_triangle(&mut buffer, &material, black_box(*tri));
            });
        });
    }

    group.finish();
}

fn scene_renderer(node: SceneNode) -> Renderer {
    let mut renderer = Renderer::new(BUFFER_WIDTH, BUFFER_HEIGHT).unwrap();
    renderer.set_projection(projection::frustum(0.8, renderer.aspect(), 1.0, 100.0));
    renderer.set_view(Mat4::translation(0.0, 0.0, -8.0) * Mat4::rotation_x(-1.0) * Mat4::rotation_z(0.6));
    let mut scene = Scene::new();
    scene.add(node);
    renderer.set_scene(scene);
    renderer
}

fn benchmark_scenes(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene");

    let mut cube = scene_renderer(SceneNode::mesh(primitives::cube(3.0).unwrap()));
    group.bench_function("cube", |b| b.iter(|| cube.render().unwrap()));

    let mut sphere = scene_renderer(SceneNode::mesh(primitives::sphere(2.0, 64, 128).unwrap()));
    group.bench_function("sphere_16k_triangles", |b| b.iter(|| sphere.render().unwrap()));

    // A grid of small cubes, most triangles only a few pixels wide.
    let mut grid = SceneNode::group();
    for row in 0..20 {
        for col in 0..20 {
            let offset = Mat4::translation(col as f32 * 0.4 - 4.0, row as f32 * 0.4 - 4.0, 0.0);
            grid.add(SceneNode::mesh(primitives::cube(0.2).unwrap()).with_transform(offset));
        }
    }
    let mut many = scene_renderer(grid);
    group.bench_function("grid_400_cubes", |b| b.iter(|| many.render().unwrap()));

    group.finish();
}

criterion_group!(benches, benchmark_single_triangle, benchmark_scenes);
criterion_main!(benches);
