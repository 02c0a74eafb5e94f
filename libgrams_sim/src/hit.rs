use std::fmt::Display;

/// A point in space-time. Distances are in mm, times in ns.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub t: f64,
}

impl Position4 {
    pub fn new(x: f64, y: f64, z: f64, t: f64) -> Self {
        Self { x, y, z, t }
    }

    /// Spatial distance between two points, ignoring time
    pub fn distance(&self, other: &Position4) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2))
            .sqrt()
    }

    /// Point halfway between two positions (all four coordinates)
    pub fn midpoint(&self, other: &Position4) -> Position4 {
        Position4 {
            x: 0.5 * (self.x + other.x),
            y: 0.5 * (self.y + other.y),
            z: 0.5 * (self.z + other.z),
            t: 0.5 * (self.t + other.t),
        }
    }
}

/// A single ionization energy deposit in the LAr volume, as produced by the transport
/// simulation.
///
/// Identified within an event by (track_id, hit_id). The hit_id carries no ordering
/// meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyDeposit {
    pub track_id: i32,
    pub hit_id: i32,
    pub pdg_code: i32,
    /// Deposited energy in MeV
    pub energy: f64,
    pub start: Position4,
    pub end: Position4,
}

impl EnergyDeposit {
    pub fn midpoint(&self) -> Position4 {
        self.start.midpoint(&self.end)
    }

    pub fn step_length(&self) -> f64 {
        self.start.distance(&self.end)
    }
}

impl Display for EnergyDeposit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Track ID={}, Hit ID={}, PDG={}, Energy={:.4} start=({:.3}, {:.3}, {:.3}, {:.3}) end=({:.3}, {:.3}, {:.3}, {:.3})",
            self.track_id,
            self.hit_id,
            self.pdg_code,
            self.energy,
            self.start.x,
            self.start.y,
            self.start.z,
            self.start.t,
            self.end.x,
            self.end.y,
            self.end.z,
            self.end.t
        )
    }
}
