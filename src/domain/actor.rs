/// Actors: everything that occupies a maze cell.
///
/// The world holds a flat list of `Actor` values; behavior is dispatched
/// on the `ActorKind` tag in `sim::step`. Multiple actors may stack on
/// one cell (a cloud over a bug over a goodie is normal). The player is
/// a singleton kept outside the list so the tick protocol can update it
/// first and check its liveness between every other update.

use crate::domain::grid::Dir;

/// Hard cap on simultaneous live charges without a charge pack.
pub const MAX_CHARGES: u32 = 2;
/// Fuse length of a placed charge, in ticks.
pub const CHARGE_FUSE_TICKS: u32 = 40;
/// Lifetime of a spray cloud, in ticks.
pub const CLOUD_TTL: u32 = 3;
/// Score for collecting any goodie.
pub const GOODIE_POINTS: u32 = 1000;
/// Score for exterminating a scuttler.
pub const SCUTTLER_POINTS: u32 = 100;
/// Score for exterminating a sniffer.
pub const SNIFFER_POINTS: u32 = 500;

pub type ActorId = u64;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WallKind {
    Solid,
    Cracked,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GoodieKind {
    ExtraLife,
    PhaseSuit,
    ChargePack,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Species {
    Scuttler,
    Sniffer,
}

/// Per-bug state: facing, move cadence, and how far it can smell the
/// player (rectangular radius; only sniffers have a nonzero radius).
#[derive(Clone, Copy, Debug)]
pub struct BugState {
    pub species: Species,
    pub dir: Dir,
    pub ticks_per_move: u32,
    pub tick_count: u32,
    pub smell_radius: i32,
}

impl BugState {
    pub fn new(species: Species, ticks_per_move: u32, smell_radius: i32) -> Self {
        BugState {
            species,
            dir: Dir::Up,
            // cadence 0 would never act and breaks the modulo below
            ticks_per_move: ticks_per_move.max(1),
            tick_count: 0,
            smell_radius,
        }
    }

    /// Advance the cadence counter. True on the ticks the bug acts.
    pub fn should_act(&mut self) -> bool {
        self.tick_count = (self.tick_count + 1) % self.ticks_per_move;
        self.tick_count == 0
    }
}

#[derive(Clone, Copy, Debug)]
pub enum ActorKind {
    Wall(WallKind),
    /// Hidden until all bugs are dead; `open` flips exactly once.
    Hatch { open: bool },
    /// Timed charge. Death (fuse expiry or forced expiry) = burst.
    Charge { fuse: u32 },
    /// Short-lived damage area left by a burst.
    Cloud { ttl: u32 },
    /// Collectible with a countdown; expires silently.
    Goodie { kind: GoodieKind, ttl: u32 },
    Bug(BugState),
}

#[derive(Clone, Debug)]
pub struct Actor {
    pub id: ActorId,
    pub x: usize,
    pub y: usize,
    pub alive: bool,
    pub kind: ActorKind,
}

impl Actor {
    pub fn is_wall(&self) -> bool {
        matches!(self.kind, ActorKind::Wall(_))
    }

    pub fn is_bug(&self) -> bool {
        matches!(self.kind, ActorKind::Bug(_))
    }

    pub fn is_charge(&self) -> bool {
        matches!(self.kind, ActorKind::Charge { .. })
    }
}

/// The singleton player. `phase_ticks` and `boost_ticks` are the
/// remaining durations of the phase-suit and charge-pack statuses.
#[derive(Clone, Debug)]
pub struct Player {
    pub x: usize,
    pub y: usize,
    pub alive: bool,
    pub phase_ticks: u32,
    pub boost_ticks: u32,
}

impl Player {
    pub fn new(x: usize, y: usize) -> Self {
        Player {
            x,
            y,
            alive: true,
            phase_ticks: 0,
            boost_ticks: 0,
        }
    }
}
