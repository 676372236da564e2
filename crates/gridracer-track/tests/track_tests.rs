//! Integration tests against the bundled sample track

use std::path::PathBuf;

use gridracer_track::{Heading, Track, TrackGeometry, DEFAULT_SPAWN_ATTEMPTS};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

fn sample_track_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/tracks/loop.json")
}

fn sample_track() -> Track {
    Track::load(sample_track_path(), TrackGeometry::default()).unwrap()
}

#[test]
fn test_sample_track_loads() {
    let track = sample_track();
    assert_eq!((track.rows(), track.cols()), (16, 22));
    assert_eq!(track.start_cell(), Some((2, 2)));
    assert!(!track.is_wall(2, 2));
    // Closed border
    assert!((0..track.cols() as i64).all(|col| track.is_wall(0, col)));
}

#[test]
fn test_every_cell_center_maps_back() {
    let track = sample_track();
    for row in 0..track.rows() {
        for col in 0..track.cols() {
            let center = track.grid_to_world(row, col);
            assert_eq!(track.world_to_grid(center), (row as i64, col as i64));
        }
    }
}

#[test]
fn test_spawns_have_room_ahead() {
    let track = sample_track();
    let mut rng = Xoshiro256StarStar::seed_from_u64(11);

    for _ in 0..500 {
        let spawn = track.pick_random_spawn(&mut rng, DEFAULT_SPAWN_ATTEMPTS).unwrap();
        let step = match spawn.heading {
            Heading::East => 1,
            Heading::West => -1,
        };
        let (row, col) = (spawn.row as i64, spawn.col as i64);
        assert!(!track.is_wall(row, col));
        assert!(!track.is_wall(row, col + step));
        assert!(!track.is_wall(row, col + 2 * step));
    }
}

#[test]
fn test_saved_layout_reloads_identically() {
    let track = sample_track();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("copy.json");
    std::fs::write(&path, track.to_json().unwrap()).unwrap();

    let reloaded = Track::load(&path, TrackGeometry::default()).unwrap();
    assert_eq!(reloaded, track);
}
