use crate::organisms::{CreatureId, CreatureKind, DeathCause};

/// Signals for the presentation layer (colour flashes, particle bursts).
///
/// Collected during a tick and drained by the host; the engine never depends
/// on anyone reading them.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Born {
        id: CreatureId,
        kind: CreatureKind,
    },
    Died {
        id: CreatureId,
        kind: CreatureKind,
        cause: DeathCause,
    },
    Ate {
        eater: CreatureId,
        food: CreatureId,
        amount: f32,
    },
    /// Two creatures of the same kind touched and bred
    Mated {
        kind: CreatureKind,
        parents: (CreatureId, CreatureId),
    },
    Paralyzed {
        victim: CreatureId,
        by: CreatureId,
        duration: f32,
    },
    SeedFailed {
        id: CreatureId,
    },
}
