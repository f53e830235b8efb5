use raydrive::actors::{Floor, VehicleActor};
use raydrive::config::{SimConfig, VehicleConfig, WorldConfig};
use raydrive::error::SimError;
use raydrive::materials::ContactMaterial;
use raydrive::physics::{PhysicsWorld, chassis_groups};
use raydrive::resources::Resources;
use raydrive::scene::SceneGraph;

use rapier3d::prelude::*;

#[test]
fn assembled_world_has_a_material_for_every_touching_pair() {
    let mut world = PhysicsWorld::new(&WorldConfig::default());
    let mut scene = SceneGraph::new();
    let ground = world.create_material("ground");

    Floor::new(&mut world, &mut scene, ground, 0.0).unwrap();
    VehicleActor::new(&mut world, &mut scene, &Resources::default(), &VehicleConfig::default(), ground).unwrap();

    world.validate_contact_materials().unwrap();
    // wheel/ground and chassis/ground
    assert_eq!(world.materials().len(), 2);
}

#[test]
fn a_body_without_its_pair_fails_validation() {
    let mut world = PhysicsWorld::new(&WorldConfig::default());
    let mut scene = SceneGraph::new();
    let ground = world.create_material("ground");
    Floor::new(&mut world, &mut scene, ground, 0.0).unwrap();

    let crate_material = world.create_material("crate");
    let body = world.add_body(RigidBodyBuilder::dynamic().translation(vector![5.0, 1.0, 5.0]));
    world
        .add_collider(
            ColliderBuilder::cuboid(0.5, 0.5, 0.5).collision_groups(chassis_groups()),
            crate_material,
            Some(body),
        )
        .unwrap();

    match world.validate_contact_materials() {
        Err(SimError::MissingContactMaterial { a, b }) => {
            let mut names = [a, b];
            names.sort();
            assert_eq!(names, ["crate".to_string(), "ground".to_string()]);
        }
        other => panic!("expected a missing pair, got {other:?}"),
    }

    world
        .add_contact_material(ContactMaterial::new(crate_material, ground).friction(0.5))
        .unwrap();
    world.validate_contact_materials().unwrap();
}

#[test]
fn registering_a_pair_twice_is_refused() {
    let mut world = PhysicsWorld::new(&WorldConfig::default());
    let wheel = world.create_material("wheel");
    let ground = world.create_material("ground");

    world.add_contact_material(ContactMaterial::new(wheel, ground)).unwrap();
    let err = world.add_contact_material(ContactMaterial::new(ground, wheel)).unwrap_err();
    assert!(matches!(err, SimError::DuplicateContactMaterial { .. }));
}

#[test]
fn config_file_round_trips_through_disk() {
    let path = std::env::temp_dir().join(format!("raydrive-config-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "vehicle": { "mass": 250.0 }, "camera": { "fov_y_degrees": 45.0 } }"#).unwrap();

    let config = SimConfig::load(&path).unwrap();
    assert_eq!(config.vehicle.mass, 250.0);
    assert_eq!(config.camera.fov_y_degrees, 45.0);
    assert_eq!(config.world.max_dt, 1.0 / 20.0);

    std::fs::remove_file(&path).ok();
}

#[test]
fn missing_config_file_is_an_io_error() {
    let err = SimConfig::load("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, SimError::Io(_)));
}
