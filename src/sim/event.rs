/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound effects; the
/// simulation never depends on whether anyone listens.

use crate::domain::actor::{GoodieKind, Species};

#[derive(Clone, Copy, Debug)]
#[allow(dead_code)]
pub enum GameEvent {
    ChargePlaced { x: usize, y: usize },
    ChargeBurst { x: usize, y: usize },
    BugKilled { species: Species, x: usize, y: usize },
    GoodieCollected { kind: GoodieKind },
    PlayerKilled,
    HatchRevealed,
    StageCleared,
}
