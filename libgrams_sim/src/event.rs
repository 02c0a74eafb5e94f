use std::fmt::Display;

use super::cluster::ClusterStore;
use super::hit::EnergyDeposit;
use super::readout_map::ReadoutMap;
use super::waveform::ReadoutWaveforms;

/// Identifies an event by run and event number. Ordered by run, then event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventID {
    pub run: i32,
    pub event: i32,
}

impl EventID {
    pub fn new(run: i32, event: i32) -> Self {
        Self { run, event }
    }
}

impl Display for EventID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run={} event={}", self.run, self.event)
    }
}

/// The energy deposits of a single event, as they came out of the transport simulation
#[derive(Debug, Clone)]
pub struct Event {
    pub id: EventID,
    pub hits: Vec<EnergyDeposit>,
}

impl Event {
    pub fn new(id: EventID, hits: Vec<EnergyDeposit>) -> Self {
        Self { id, hits }
    }
}

/// Everything the simulation produced for one event.
///
/// The ReadoutMap refers into the ClusterStore by key; the waveforms are keyed by the
/// same ReadoutIDs as the map.
#[derive(Debug, Clone)]
pub struct SimulatedEvent {
    pub id: EventID,
    pub clusters: ClusterStore,
    pub readout_map: ReadoutMap,
    pub waveforms: ReadoutWaveforms,
}
