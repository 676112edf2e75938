use bevy::prelude::*;
use bevy::window::WindowResolution;
use std::env;

use ship_flight::config::{load_flight_config, FlightConfig};
use ship_flight::error::{FlightError, FlightResult};
use ship_flight::ship::{
    spawn_ship, FlightEvent, FlightPlugin, ShipContact, ShipFlight, ShipFlightEvent,
    ShipVisualRoot,
};
use ship_flight::testing::{
    print_report, run_script, scenario, verify_report, Expectation, InputScript, SCENARIO_NAMES,
};

/// Contact radius of the demo ship hull.
const SHIP_RADIUS: f32 = 1.2;
const CAMERA_OFFSET: Vec3 = Vec3::new(0.0, 28.0, -22.0);
const CAMERA_FOLLOW_SPEED: f32 = 4.0;

/// A static sphere the demo ship can bump into.
#[derive(Component)]
struct Obstacle {
    radius: f32,
}

#[derive(Component)]
struct FollowCamera;

#[derive(Resource)]
struct HullAssets {
    mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
}

fn setup_scene(
    mut commands: Commands,
    config: Res<FlightConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    spawn_ship(&mut commands, &config, Vec3::ZERO, 0.0);
    commands.insert_resource(HullAssets {
        mesh: meshes.add(Cuboid::new(1.6, 0.5, 2.8)),
        material: materials.add(Color::srgb(0.85, 0.55, 0.2)),
    });

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(400.0, 400.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.12, 0.14, 0.18))),
        Transform::from_xyz(0.0, -1.0, 0.0),
    ));

    let rock_material = materials.add(Color::srgb(0.4, 0.42, 0.45));
    for (x, z, radius) in [
        (12.0, 30.0, 3.0),
        (-18.0, 45.0, 4.5),
        (25.0, -10.0, 2.5),
        (-30.0, -25.0, 5.0),
        (0.0, 70.0, 6.0),
    ] {
        commands.spawn((
            Obstacle { radius },
            Mesh3d(meshes.add(Sphere::new(radius))),
            MeshMaterial3d(rock_material.clone()),
            Transform::from_xyz(x, 0.0, z),
        ));
    }

    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(20.0, 40.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        Camera3d::default(),
        FollowCamera,
        Transform::from_translation(CAMERA_OFFSET).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Give each new ship visual root its hull mesh.
fn attach_hull_system(
    mut commands: Commands,
    hull: Option<Res<HullAssets>>,
    roots: Query<Entity, Added<ShipVisualRoot>>,
) {
    let Some(hull) = hull else {
        return;
    };
    for root in &roots {
        commands.entity(root).insert((
            Mesh3d(hull.mesh.clone()),
            MeshMaterial3d(hull.material.clone()),
        ));
    }
}

/// Report sphere overlaps as ship contacts.
fn obstacle_contact_system(
    ships: Query<(Entity, &Transform), With<ShipFlight>>,
    obstacles: Query<(&Transform, &Obstacle)>,
    mut contacts: MessageWriter<ShipContact>,
) {
    for (ship, ship_transform) in &ships {
        for (transform, obstacle) in &obstacles {
            let reach = obstacle.radius + SHIP_RADIUS;
            if ship_transform
                .translation
                .distance_squared(transform.translation)
                < reach * reach
            {
                contacts.write(ShipContact {
                    ship,
                    other_position: transform.translation,
                });
            }
        }
    }
}

/// Tab toggles one-shot / draining dash; live ships pick it up through the
/// config sync.
fn dash_mode_toggle_system(keys: Res<ButtonInput<KeyCode>>, mut config: ResMut<FlightConfig>) {
    if keys.just_pressed(KeyCode::Tab) {
        config.dash_mode = config.dash_mode.toggled();
    }
}

fn camera_follow_system(
    time: Res<Time>,
    ships: Query<&Transform, (With<ShipFlight>, Without<FollowCamera>)>,
    mut cameras: Query<&mut Transform, With<FollowCamera>>,
) {
    let Some(ship) = ships.iter().next() else {
        return;
    };
    let t = (CAMERA_FOLLOW_SPEED * time.delta_secs()).clamp(0.0, 1.0);
    for mut camera in &mut cameras {
        let goal = ship.translation + CAMERA_OFFSET;
        camera.translation = camera.translation.lerp(goal, t);
        camera.look_at(ship.translation, Vec3::Y);
    }
}

fn flight_event_log_system(mut events: MessageReader<ShipFlightEvent>) {
    for ShipFlightEvent { ship, event } in events.read() {
        match event {
            FlightEvent::DashStarted => debug!("{ship:?} dash"),
            FlightEvent::KnockbackEnded { resume_thrust } => {
                debug!("{ship:?} recovered (thrust resumed: {resume_thrust})")
            }
            FlightEvent::DashModeSwitched(mode) => info!("Dash mode: {}", mode.label()),
            _ => {}
        }
    }
}

/// Run the named scenario(s) or script file headlessly.  Returns true when
/// every replay passed.
fn run_replays(target: &str) -> FlightResult<bool> {
    let mut runs: Vec<(InputScript, Vec<Expectation>)> = Vec::new();
    if target == "all" {
        for name in SCENARIO_NAMES {
            let built = scenario(name)?;
            runs.push((built.script, built.expectations));
        }
    } else if target.ends_with(".toml") {
        let text = std::fs::read_to_string(target).map_err(|e| FlightError::ConfigParse {
            path: target.to_string(),
            message: e.to_string(),
        })?;
        let mut script = InputScript::from_toml_str(&text)?;
        if script.name.is_empty() {
            script.name = target.to_string();
        }
        runs.push((script, Vec::new()));
    } else {
        let built = scenario(target)?;
        runs.push((built.script, built.expectations));
    }

    let mut all_passed = true;
    for (script, expectations) in &runs {
        let report = run_script(script);
        let checks = verify_report(&report, &script.config, expectations);
        all_passed &= print_report(&report, &checks);
    }
    println!(
        "\n{} replay(s): {}",
        runs.len(),
        if all_passed { "ALL PASSED" } else { "FAILURES" }
    );
    Ok(all_passed)
}

fn main() {
    // Check for replay mode
    if let Ok(target) = env::var("SHIP_FLIGHT_TEST") {
        println!("Running replay: {target}");
        match run_replays(&target) {
            Ok(true) => return,
            Ok(false) => std::process::exit(1),
            Err(e) => {
                eprintln!("✗ {e}");
                std::process::exit(2);
            }
        }
    }

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Ship Flight".into(),
                resolution: WindowResolution::new(1200, 680),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::BLACK))
        // Compiled defaults; load_flight_config overwrites them from
        // assets/flight.toml (if present) in the Startup schedule.
        .insert_resource(FlightConfig::default())
        .add_plugins(FlightPlugin)
        .add_systems(
            Startup,
            (load_flight_config, setup_scene.after(load_flight_config)),
        )
        .add_systems(
            Update,
            (
                attach_hull_system,
                dash_mode_toggle_system.before(ship_flight::ship::sync_flight_config_system),
                obstacle_contact_system.before(ship_flight::ship::ship_flight_tick_system),
                camera_follow_system.after(ship_flight::ship::apply_ship_visual_system),
                flight_event_log_system.after(ship_flight::ship::ship_flight_tick_system),
            ),
        )
        .run();
}
