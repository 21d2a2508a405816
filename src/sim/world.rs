/// World: the complete state of one level in play.
///
/// ## Actor list order
///
/// `actors` is ordered and the order is simulation-visible: the tick
/// sweep visits actors front to back, and `spawn` inserts at the FRONT.
/// An actor spawned mid-tick is therefore live immediately (occupancy
/// queries see it) but is not visited until the next tick's sweep,
/// and newer actors act before older ones. Dead actors linger until
/// `purge_dead` at the end of the tick.
///
/// ## Randomness
///
/// The world owns its RNG, seeded once at construction. Tests build
/// deterministic worlds via `with_seed`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::domain::actor::{Actor, ActorId, ActorKind, Player, Species, WallKind};
use crate::domain::grid::Dir;
use crate::domain::rules::CellView;
use crate::sim::level::LevelOptions;

/// Top-level screen the harness is showing. Owned by the game loop;
/// the renderer dispatches on it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    Title,
    Playing,
    /// Brief freeze-frame after the player dies, before reload.
    Dying,
    /// Brief freeze-frame on level completion, before the next arena.
    Cleared,
    GameOver,
    Won,
}

pub struct World {
    pub actors: Vec<Actor>,
    pub player: Player,
    pub options: LevelOptions,
    pub width: usize,
    pub height: usize,

    // ── Level lifecycle ──
    pub hatch_revealed: bool,
    pub level_complete: bool,
    /// Decays by 1 per tick, awarded in full on completion.
    pub bonus: u32,

    // ── Run tracking (persists across levels) ──
    pub score: u32,
    pub lives: u32,
    pub level: usize,
    pub tick: u64,

    charge_count: u32,
    next_id: ActorId,
    rng: ChaCha8Rng,
}

impl World {
    pub fn new() -> Self {
        Self::from_rng(ChaCha8Rng::from_entropy())
    }

    /// Deterministic world for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_rng(rng: ChaCha8Rng) -> Self {
        World {
            actors: vec![],
            player: Player::new(0, 0),
            options: LevelOptions::default(),
            width: 0,
            height: 0,
            hatch_revealed: false,
            level_complete: false,
            bonus: 0,
            score: 0,
            lives: 3,
            level: 0,
            tick: 0,
            charge_count: 0,
            next_id: 0,
            rng,
        }
    }

    /// Front-insert a new actor. Charges bump the live-charge count on
    /// construction; the matching decrement runs at purge.
    pub fn spawn(&mut self, x: usize, y: usize, kind: ActorKind) -> ActorId {
        let id = self.next_id;
        self.next_id += 1;
        if matches!(kind, ActorKind::Charge { .. }) {
            self.charge_count += 1;
        }
        self.actors.insert(
            0,
            Actor {
                id,
                x,
                y,
                alive: true,
                kind,
            },
        );
        id
    }

    pub fn index_of(&self, id: ActorId) -> Option<usize> {
        self.actors.iter().position(|a| a.id == id)
    }

    /// Drop every actor (level teardown). Resets the charge count.
    pub fn clear_actors(&mut self) {
        self.actors.clear();
        self.charge_count = 0;
    }

    /// Remove dead actors, running destructor-equivalent cleanup first.
    pub fn purge_dead(&mut self) {
        let dead_charges = self
            .actors
            .iter()
            .filter(|a| !a.alive && a.is_charge())
            .count() as u32;
        self.actors.retain(|a| a.alive);
        self.charge_count -= dead_charges;
    }

    /// Number of live charges in the world. Invariant: equals the count
    /// of `Charge` actors whenever a tick is not mid-sweep.
    pub fn charge_count(&self) -> u32 {
        self.charge_count
    }

    pub fn bugs_alive(&self) -> bool {
        self.actors.iter().any(|a| a.alive && a.is_bug())
    }

    pub fn has_wall(&self, x: usize, y: usize) -> bool {
        self.live_at(x, y).any(|a| a.is_wall())
    }

    pub fn has_live_bug(&self, x: usize, y: usize) -> bool {
        self.live_at(x, y).any(|a| a.is_bug())
    }

    pub fn has_cloud(&self, x: usize, y: usize) -> bool {
        self.live_at(x, y)
            .any(|a| matches!(a.kind, ActorKind::Cloud { .. }))
    }

    /// Uniform roll in 0..n, mirroring the level option percentages.
    pub fn roll(&mut self, n: u32) -> u32 {
        self.rng.gen_range(0..n)
    }

    pub fn random_dir(&mut self) -> Dir {
        Dir::ALL[self.rng.gen_range(0..4)]
    }

    fn live_at(&self, x: usize, y: usize) -> impl Iterator<Item = &Actor> {
        self.actors
            .iter()
            .filter(move |a| a.alive && a.x == x && a.y == y)
    }
}

// Occupancy view for the movement rules and the sniffer BFS.
impl CellView for World {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn has_solid_wall(&self, x: usize, y: usize) -> bool {
        self.live_at(x, y)
            .any(|a| matches!(a.kind, ActorKind::Wall(WallKind::Solid)))
    }

    fn has_cracked_wall(&self, x: usize, y: usize) -> bool {
        self.live_at(x, y)
            .any(|a| matches!(a.kind, ActorKind::Wall(WallKind::Cracked)))
    }

    fn has_charge(&self, x: usize, y: usize) -> bool {
        self.live_at(x, y).any(|a| a.is_charge())
    }
}

impl World {
    /// Species score values, used by the kill path in `sim::step`.
    pub fn species_points(species: Species) -> u32 {
        use crate::domain::actor::{SCUTTLER_POINTS, SNIFFER_POINTS};
        match species {
            Species::Scuttler => SCUTTLER_POINTS,
            Species::Sniffer => SNIFFER_POINTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::CHARGE_FUSE_TICKS;

    #[test]
    fn spawn_inserts_at_front() {
        let mut w = World::with_seed(1);
        w.width = 4;
        w.height = 4;
        let first = w.spawn(0, 0, ActorKind::Wall(WallKind::Solid));
        let second = w.spawn(1, 0, ActorKind::Wall(WallKind::Cracked));
        assert_eq!(w.actors[0].id, second);
        assert_eq!(w.actors[1].id, first);
    }

    #[test]
    fn charge_count_tracks_spawn_and_purge() {
        let mut w = World::with_seed(1);
        w.width = 4;
        w.height = 4;
        let id = w.spawn(1, 1, ActorKind::Charge { fuse: CHARGE_FUSE_TICKS });
        w.spawn(2, 1, ActorKind::Charge { fuse: CHARGE_FUSE_TICKS });
        assert_eq!(w.charge_count(), 2);

        let i = w.index_of(id).unwrap();
        w.actors[i].alive = false;
        w.purge_dead();
        assert_eq!(w.charge_count(), 1);
        assert_eq!(w.actors.len(), 1);
    }

    #[test]
    fn occupancy_ignores_dead_actors() {
        let mut w = World::with_seed(1);
        w.width = 4;
        w.height = 4;
        let id = w.spawn(1, 1, ActorKind::Wall(WallKind::Cracked));
        assert!(w.has_cracked_wall(1, 1));
        let i = w.index_of(id).unwrap();
        w.actors[i].alive = false;
        assert!(!w.has_cracked_wall(1, 1));
    }
}
