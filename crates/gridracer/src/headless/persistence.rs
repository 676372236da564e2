//! Training output on disk
//!
//! Layout of an output directory:
//! - `models/model_<generation>.bin` and `models/model_last.bin`: policy blobs
//! - `stats.txt`: best fitness per generation, `12.34,` per entry
//! - `run.ron`: metadata of the last save
//! - `track.json`: the layout the run was trained on

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gridracer_core::car::MlpPolicy;
use gridracer_core::track::Track;
use serde::{Deserialize, Serialize};

/// Summary written next to the models on every save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub generation: usize,
    pub best_fitness: Option<f32>,
    pub population_size: usize,
    pub seed: u64,
    pub track: PathBuf,
    pub saved_at: String,
}

/// Output directory of one training run
#[derive(Debug, Clone)]
pub struct RunStore {
    root: PathBuf,
}

impl RunStore {
    /// Open `root`, creating it and its `models/` directory as needed
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(root.join("models"))
            .with_context(|| format!("Failed to create output directory {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn model_path(&self, generation: usize) -> PathBuf {
        self.root.join("models").join(format!("model_{}.bin", generation))
    }

    pub fn last_model_path(&self) -> PathBuf {
        self.root.join("models").join("model_last.bin")
    }

    pub fn stats_path(&self) -> PathBuf {
        self.root.join("stats.txt")
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.root.join("run.ron")
    }

    /// Write the policy as `model_<generation>.bin` and as `model_last.bin`
    pub fn save_policy(&self, generation: usize, policy: &MlpPolicy) -> Result<PathBuf> {
        let data = encode_policy(policy)?;
        let path = self.model_path(generation);
        std::fs::write(&path, &data).context("Failed to write model file")?;
        std::fs::write(self.last_model_path(), &data).context("Failed to write last model file")?;
        Ok(path)
    }

    /// Rewrite the fitness history file
    pub fn write_stats(&self, history: &[f32]) -> Result<()> {
        std::fs::write(self.stats_path(), format_stats(history)).context("Failed to write stats file")
    }

    pub fn write_metadata(&self, metadata: &RunMetadata) -> Result<()> {
        let ron = ron::ser::to_string_pretty(metadata, ron::ser::PrettyConfig::default())
            .context("Failed to serialize run metadata")?;
        std::fs::write(self.metadata_path(), ron).context("Failed to write run metadata")
    }

    pub fn save_track(&self, track: &Track) -> Result<()> {
        let json = track.to_json().context("Failed to serialize track")?;
        std::fs::write(self.root.join("track.json"), json).context("Failed to write track file")
    }
}

fn encode_policy(policy: &MlpPolicy) -> Result<Vec<u8>> {
    bincode_next::serde::encode_to_vec(policy, bincode_next::config::standard())
        .context("Failed to serialize policy")
}

/// Read a policy blob written by [`RunStore::save_policy`]
pub fn load_policy(path: &Path) -> Result<MlpPolicy> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read model {}", path.display()))?;
    let (policy, _): (MlpPolicy, usize) =
        bincode_next::serde::decode_from_slice(&data, bincode_next::config::standard())
            .with_context(|| format!("Failed to decode model {}", path.display()))?;
    Ok(policy)
}

pub fn load_metadata(path: &Path) -> Result<RunMetadata> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read run metadata {}", path.display()))?;
    ron::from_str(&content).context("Failed to parse run metadata")
}

/// Every value rounded to two decimals and followed by a comma
pub fn format_stats(history: &[f32]) -> String {
    history.iter().map(|value| format!("{:.2},", value)).collect()
}

/// Inverse of [`format_stats`]; empty entries are skipped
pub fn parse_stats(content: &str) -> Result<Vec<f32>> {
    content
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<f32>()
                .with_context(|| format!("Invalid stats entry {:?}", entry))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridracer_core::car::Policy;
    use gridracer_core::track::{TrackGeometry, TrackLayout};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    #[test]
    fn test_format_stats() {
        assert_eq!(format_stats(&[]), "");
        assert_eq!(format_stats(&[12.346, 4.0, 0.004]), "12.35,4.00,0.00,");
    }

    #[test]
    fn test_parse_stats() {
        assert_eq!(parse_stats("1.50,2.25,").unwrap(), vec![1.5, 2.25]);
        assert!(parse_stats("").unwrap().is_empty());
        assert!(parse_stats("1.0,x,").is_err());
    }

    #[test]
    fn test_policy_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = RunStore::create(dir.path().join("run")).unwrap();
        let mut rng = Xoshiro256StarStar::seed_from_u64(4);
        let policy = MlpPolicy::random(5, &[5], &mut rng);

        let path = store.save_policy(100, &policy).unwrap();
        assert!(path.ends_with("models/model_100.bin"));
        assert!(store.last_model_path().exists());

        let mut loaded = load_policy(&path).unwrap();
        assert_eq!(loaded.parameters(), policy.parameters());
        assert_eq!(loaded.observation_size(), Some(5));
        assert!(loaded.think(&[0.1, 0.2, 0.3, 0.4, 0.5]).is_ok());
    }

    #[test]
    fn test_corrupt_model_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();
        assert!(load_policy(&path).is_err());
    }

    #[test]
    fn test_metadata_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = RunStore::create(dir.path()).unwrap();
        let metadata = RunMetadata {
            generation: 3,
            best_fitness: Some(812.5),
            population_size: 50,
            seed: 42,
            track: PathBuf::from("assets/tracks/loop.json"),
            saved_at: "2026-01-01T00:00:00+00:00".to_string(),
        };

        store.write_metadata(&metadata).unwrap();
        assert_eq!(load_metadata(&store.metadata_path()).unwrap(), metadata);
    }

    #[test]
    fn test_saved_track_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = RunStore::create(dir.path()).unwrap();
        let layout = TrackLayout::new(vec![vec![0, 1, 1, 1], vec![1, 1, 0, 1]], Some([0, 2]));
        let track = Track::from_layout(&layout, TrackGeometry::default()).unwrap();

        store.save_track(&track).unwrap();
        let reloaded = Track::load(dir.path().join("track.json"), TrackGeometry::default()).unwrap();
        assert_eq!(reloaded, track);
    }
}
