use std::collections::BTreeMap;

use log::warn;

use crate::error::Result;
use crate::tracker::pose::{Pose, Quat, Vec3};

pub const POSITION_KEY: &str = "violin.position";
pub const QUATERNION_KEY: &str = "violin.quaternion";

pub trait KeyValueStore {
    fn load(&self, key: &str) -> Option<Vec<u8>>;
    fn save(&mut self, key: &str, bytes: &[u8]) -> Result<()>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        self.entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

pub fn save_pose(store: &mut dyn KeyValueStore, pose: &Pose) -> Result<()> {
    let (position, orientation) = pose.to_arrays();
    store.save(POSITION_KEY, &serde_json::to_vec(&position)?)?;
    store.save(QUATERNION_KEY, &serde_json::to_vec(&orientation)?)?;
    Ok(())
}

/// Reads a saved pose. `Ok(None)` when nothing is stored; a partially saved
/// pose keeps the default for the missing half.
pub fn load_pose(store: &dyn KeyValueStore) -> Result<Option<Pose>> {
    let position = store.load(POSITION_KEY);
    let orientation = store.load(QUATERNION_KEY);
    if position.is_none() && orientation.is_none() {
        return Ok(None);
    }

    let mut pose = Pose::default();
    if let Some(bytes) = position {
        let p: [f64; 3] = serde_json::from_slice(&bytes)?;
        pose.position = Vec3::from_array(p);
    }
    if let Some(bytes) = orientation {
        let q: [f64; 4] = serde_json::from_slice(&bytes)?;
        pose.orientation = Quat::from_array(q);
    }
    Ok(Some(pose))
}

pub fn load_pose_or(store: &dyn KeyValueStore, default: Pose) -> Pose {
    match load_pose(store) {
        Ok(Some(pose)) => pose,
        Ok(None) => default,
        Err(e) => {
            warn!("ignoring stored pose: {}", e);
            default
        }
    }
}
