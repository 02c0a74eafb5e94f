use std::cmp::Ordering;
use std::fmt::Display;
use std::hash::Hash;

use super::constants::READOUT_INDEX_STRIDE;

/// ReadoutID identifies a single readout channel on the anode.
///
/// The anode is currently pixelated in x and y, so a channel is an (x index, y index)
/// pair. Other parts of the chain should not care how the readout is segmented, they
/// only compare and hash ReadoutIDs. Channels are ordered by y index, then x index, which
/// is also the order of the flattened [`ReadoutID::index`] for any valid PixelMap.
#[derive(Debug, Clone, Copy)]
pub struct ReadoutID {
    pub x_index: i32,
    pub y_index: i32,
}

impl ReadoutID {
    /// Construct a new readout ID
    pub fn new(x_index: i32, y_index: i32) -> Self {
        ReadoutID { x_index, y_index }
    }

    /// Flatten the pair into a single number, unique as long as |x_index| stays below
    /// half of READOUT_INDEX_STRIDE
    pub fn index(&self) -> i64 {
        generate_index(self.x_index, self.y_index)
    }

    fn key(&self) -> (i32, i32) {
        (self.y_index, self.x_index)
    }
}

impl Default for ReadoutID {
    // Not a channel that exists in any real readout
    fn default() -> Self {
        ReadoutID {
            x_index: i32::MIN,
            y_index: i32::MIN,
        }
    }
}

impl PartialEq for ReadoutID {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ReadoutID {}

impl PartialOrd for ReadoutID {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReadoutID {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for ReadoutID {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state)
    }
}

impl Display for ReadoutID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x-index={} y-index={}", self.x_index, self.y_index)
    }
}

/// Generate the flattened index for a given pixel location
pub fn generate_index(x_index: i32, y_index: i32) -> i64 {
    (y_index as i64) * READOUT_INDEX_STRIDE + (x_index as i64)
}
