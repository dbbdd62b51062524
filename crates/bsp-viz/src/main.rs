use bsp_viz::{OrbitCamera, TreeNavigator, cube_triangles, floor_triangles};
use convex_bsp::{BspError, BspTree, Material, Tolerance};
use log::{debug, error, info, warn};
use macroquad::prelude::*;
use nalgebra::{Matrix4, Point3, Rotation3, Unit, Vector3, Vector4};

/// Radians per second the scene turns around the vertical axis.
const SPIN_SPEED: f32 = 0.3;

/// Reads the tolerance from `BSP_EPSILON`, falling back to the default.
fn tolerance_from_env() -> Tolerance {
    let Ok(raw) = std::env::var("BSP_EPSILON") else {
        return Tolerance::default();
    };
    match raw.parse::<f32>().ok().and_then(Tolerance::new) {
        Some(tolerance) => tolerance,
        None => {
            warn!("ignoring invalid BSP_EPSILON `{raw}`");
            Tolerance::default()
        }
    }
}

/// Two overlapping cubes on a floor, plus a slanted blade cutting through both.
fn generate_scene() -> Vec<Point3<f32>> {
    let mut stream = Vec::new();

    let tilt = Rotation3::from_axis_angle(&Unit::new_normalize(Vector3::new(1.0, 1.0, 0.0)), 0.5);
    stream.extend(cube_triangles(Point3::new(-1.5, 0.0, 0.0), 3.0, &tilt));
    stream.extend(cube_triangles(Point3::new(1.5, 0.0, 0.5), 2.5, &Rotation3::identity()));
    stream.extend(floor_triangles(-2.5, 6.0));

    stream.extend([
        Point3::new(-5.0, -2.0, -1.0),
        Point3::new(5.0, -2.0, 1.0),
        Point3::new(0.0, 4.0, 0.0),
    ]);

    stream
}

fn build_tree() -> Result<BspTree, BspError> {
    let stream = generate_scene();
    let material = Material::default().with_color(Vector4::new(0.85, 0.7, 0.45, 1.0));

    let build = BspTree::from_triangles_with_tolerance(&stream, &material, tolerance_from_env())?;
    if !build.skipped.is_empty() {
        warn!("{} triangles were degenerate and left out", build.skipped.len());
    }

    let tree = build.tree;
    info!(
        "BSP tree built from {} triangles: {} polygons, {} nodes, depth {}",
        stream.len() / 3,
        tree.polygon_count(),
        tree.node_count(),
        tree.depth()
    );
    debug!("tree dump:\n{tree}");
    Ok(tree)
}

#[macroquad::main("BSP Viewer")]
async fn main() {
    env_logger::init();

    let mut tree = match build_tree() {
        Ok(tree) => tree,
        Err(err) => {
            error!("failed to build BSP tree: {err}");
            return;
        }
    };

    let mut camera = OrbitCamera::new(14.0, 0.4, 0.4).with_zoom(1.0, 4.0, 60.0);
    let mut navigator = TreeNavigator::new();
    let mut spinning = true;

    loop {
        camera.update();
        navigator.update(&tree);
        if is_key_pressed(KeyCode::Space) {
            spinning = !spinning;
        }

        if spinning {
            let spin = Matrix4::from_euler_angles(0.0, SPIN_SPEED * get_frame_time(), 0.0);
            if let Err(err) = tree.apply(&spin) {
                error!("failed to rotate scene: {err}");
                spinning = false;
            }
        }

        clear_background(Color::from_rgba(20, 20, 30, 255));
        set_camera(&camera.to_camera3d());

        navigator.render(&tree);

        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(2.0, 0.0, 0.0), RED);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 2.0, 0.0), GREEN);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, 2.0), BLUE);

        set_default_camera();

        draw_text(
            &format!("BSP Viewer - Total: {} polygons", tree.polygon_count()),
            10.0,
            25.0,
            20.0,
            WHITE,
        );
        draw_text(
            &format!("Tree depth: {} | Nodes: {}", tree.depth(), tree.node_count()),
            10.0,
            45.0,
            18.0,
            GRAY,
        );

        navigator.draw_ui(&tree, 70.0);

        draw_text(
            "Drag mouse to rotate, scroll to zoom, space to pause",
            10.0,
            155.0,
            16.0,
            DARKGRAY,
        );
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 175.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
