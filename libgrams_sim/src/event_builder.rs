use super::error::EventBuilderError;
use super::event::{Event, EventID};
use super::hit::EnergyDeposit;
use super::hit_file::HitRecord;

/// EventBuilder takes HitRecords and composes them into Events.
///
/// The EventBuilder recieves hits from the HitFile in file order and collects them until
/// a hit from a new event shows up. The completed Event can then be sent on to the
/// Simulator.
#[derive(Debug, Default)]
pub struct EventBuilder {
    current_event_id: Option<EventID>,
    hit_stack: Vec<EnergyDeposit>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hit to the event.
    ///
    /// If the hit does not have the same EventID as the event currently being built, this
    /// is taken as indication that that event is complete, and a new event is started for
    /// the hit given. Returns a `Result<Option<Event>>`. If the Option is None, the event
    /// being built is not complete. If the Option is Some, it holds the completed event.
    #[allow(clippy::comparison_chain)]
    pub fn append_hit(&mut self, record: HitRecord) -> Result<Option<Event>, EventBuilderError> {
        if let Some(current_id) = self.current_event_id {
            if record.event_id < current_id {
                // Hit from an event we already emitted
                Err(EventBuilderError::EventOutOfOrder(
                    record.event_id,
                    current_id,
                ))
            } else if record.event_id > current_id {
                let event = Event::new(current_id, std::mem::take(&mut self.hit_stack));
                self.current_event_id = Some(record.event_id);
                self.hit_stack.push(record.hit);
                Ok(Some(event))
            } else {
                self.hit_stack.push(record.hit);
                Ok(None)
            }
        } else {
            // First hit of the run
            self.current_event_id = Some(record.event_id);
            self.hit_stack.push(record.hit);
            Ok(None)
        }
    }

    /// Takes any remaining hits and flushes them to an event.
    ///
    /// Used at the end of processing a run.
    /// Returns None if there were no hits left over.
    pub fn flush_final_event(&mut self) -> Option<Event> {
        match self.current_event_id {
            Some(id) if !self.hit_stack.is_empty() => {
                Some(Event::new(id, std::mem::take(&mut self.hit_stack)))
            }
            _ => None,
        }
    }
}
