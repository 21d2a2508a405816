/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Player update (death check → status decay → input)
///   2. Sweep the actor list in its current order; after every actor,
///      short-circuit on player death or level completion
///   3. Purge dead actors (charge count decrements here)
///   4. Bonus decay
///   5. Hatch reveal when the last bug is gone
///   6. Final death / completion check
///
/// The mid-sweep short-circuit is deliberate: once the player is dead
/// or has exited, the rest of the frame is meaningless. It is an early
/// return, never an unwind.
///
/// Actors spawned during a tick are front-inserted into the list: they
/// are live immediately for occupancy queries, but the sweep iterates a
/// snapshot of ids taken at tick start, so they first act next tick.

use crate::domain::actor::{
    ActorId, ActorKind, BugState, GoodieKind, Species, WallKind, CHARGE_FUSE_TICKS, CLOUD_TTL,
    GOODIE_POINTS, MAX_CHARGES,
};
use crate::domain::ai;
use crate::domain::grid::{Command, Dir};
use crate::domain::rules::{self, CellView};
use crate::sim::event::GameEvent;
use crate::sim::world::World;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickOutcome {
    Continue,
    PlayerDied,
    LevelFinished,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut World, input: Option<Command>) -> (TickOutcome, Vec<GameEvent>) {
    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    if world.player.alive {
        update_player(world, input, &mut events);
    }

    let order: Vec<ActorId> = world.actors.iter().map(|a| a.id).collect();
    for id in order {
        let Some(i) = world.index_of(id) else { continue };
        if world.actors[i].alive {
            update_actor(world, i, &mut events);
        }
        if !world.player.alive {
            world.lives = world.lives.saturating_sub(1);
            return (TickOutcome::PlayerDied, events);
        }
        if world.level_complete {
            world.score += world.bonus;
            return (TickOutcome::LevelFinished, events);
        }
    }

    world.purge_dead();

    if world.bonus > 0 {
        world.bonus -= 1;
    }

    if !world.bugs_alive() && !world.hatch_revealed {
        reveal_hatch(world, &mut events);
    }

    if !world.player.alive {
        world.lives = world.lives.saturating_sub(1);
        return (TickOutcome::PlayerDied, events);
    }
    if world.level_complete {
        world.score += world.bonus;
        return (TickOutcome::LevelFinished, events);
    }
    (TickOutcome::Continue, events)
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn update_player(world: &mut World, input: Option<Command>, events: &mut Vec<GameEvent>) {
    let (px, py) = (world.player.x, world.player.y);
    // The phase value in force this tick is the pre-decrement one; it
    // governs both the death check and movement below.
    let phased = world.player.phase_ticks > 0;

    if world.has_live_bug(px, py)
        || world.has_cloud(px, py)
        || world.has_solid_wall(px, py)
        || (world.has_cracked_wall(px, py) && !phased)
    {
        kill_player(world, events);
        return;
    }

    if world.player.phase_ticks > 0 {
        world.player.phase_ticks -= 1;
    }
    if world.player.boost_ticks > 0 {
        world.player.boost_ticks -= 1;
    }

    match input {
        Some(Command::DropCharge) => try_place_charge(world, events),
        Some(Command::Move(dir)) => {
            try_move_player(world, dir, phased);
        }
        None => {}
    }
}

fn try_place_charge(world: &mut World, events: &mut Vec<GameEvent>) {
    let (px, py) = (world.player.x, world.player.y);
    let count = world.charge_count();
    let boosted = world.player.boost_ticks > 0;
    if count >= MAX_CHARGES && !(boosted && count < world.options.max_boosted_charges) {
        return;
    }
    // Never on a wall, never stacked on another charge.
    if world.has_wall(px, py) || world.has_charge(px, py) {
        return;
    }
    world.spawn(px, py, ActorKind::Charge { fuse: CHARGE_FUSE_TICKS });
    events.push(GameEvent::ChargePlaced { x: px, y: py });
}

fn try_move_player(world: &mut World, dir: Dir, phased: bool) -> bool {
    let (dx, dy) = dir.delta();
    let nx = world.player.x as i32 + dx;
    let ny = world.player.y as i32 + dy;
    if rules::player_can_enter(world, nx, ny, phased) {
        world.player.x = nx as usize;
        world.player.y = ny as usize;
        true
    } else {
        false
    }
}

fn kill_player(world: &mut World, events: &mut Vec<GameEvent>) {
    if !world.player.alive {
        return;
    }
    world.player.alive = false;
    events.push(GameEvent::PlayerKilled);
}

// ══════════════════════════════════════════════════════════════
// Actor dispatch
// ══════════════════════════════════════════════════════════════

fn update_actor(world: &mut World, i: usize, events: &mut Vec<GameEvent>) {
    match world.actors[i].kind {
        ActorKind::Wall(_) => {}
        ActorKind::Hatch { open } => update_hatch(world, i, open, events),
        ActorKind::Charge { fuse } => update_charge(world, i, fuse, events),
        ActorKind::Cloud { ttl } => update_cloud(world, i, ttl, events),
        ActorKind::Goodie { kind, ttl } => update_goodie(world, i, kind, ttl, events),
        ActorKind::Bug(_) => update_bug(world, i, events),
    }
}

fn update_hatch(world: &mut World, i: usize, open: bool, events: &mut Vec<GameEvent>) {
    let (x, y) = (world.actors[i].x, world.actors[i].y);
    if open && world.player.alive && world.player.x == x && world.player.y == y {
        world.level_complete = true;
        events.push(GameEvent::StageCleared);
    }
}

// ── Items: countdown first, silent expiry at zero, effect otherwise ──

fn update_charge(world: &mut World, i: usize, fuse: u32, events: &mut Vec<GameEvent>) {
    let fuse = fuse.saturating_sub(1);
    if fuse == 0 {
        // Fuse ran out (or a cloud forced it to zero): detonate.
        kill_actor(world, i, events);
    } else if let ActorKind::Charge { fuse: f } = &mut world.actors[i].kind {
        *f = fuse;
    }
}

fn update_cloud(world: &mut World, i: usize, ttl: u32, events: &mut Vec<GameEvent>) {
    let ttl = ttl.saturating_sub(1);
    if ttl == 0 {
        world.actors[i].alive = false;
        return;
    }
    if let ActorKind::Cloud { ttl: t } = &mut world.actors[i].kind {
        *t = ttl;
    }
    cloud_contact(world, i, events);
}

/// Everything sharing a live cloud's cell is resolved here: cracked
/// walls and bugs die, a charge is forced to expire (so it detonates
/// exactly once via its own death path), the player is killed.
fn cloud_contact(world: &mut World, i: usize, events: &mut Vec<GameEvent>) {
    let (x, y) = (world.actors[i].x, world.actors[i].y);

    // Snapshot ids: kills may spawn goodies at the list front.
    let targets: Vec<ActorId> = world
        .actors
        .iter()
        .enumerate()
        .filter(|(j, a)| *j != i && a.alive && a.x == x && a.y == y)
        .map(|(_, a)| a.id)
        .collect();

    for id in targets {
        let Some(j) = world.index_of(id) else { continue };
        match world.actors[j].kind {
            ActorKind::Wall(WallKind::Cracked) | ActorKind::Bug(_) => {
                kill_actor(world, j, events);
            }
            ActorKind::Charge { .. } => {
                if let ActorKind::Charge { fuse } = &mut world.actors[j].kind {
                    *fuse = 0;
                }
            }
            _ => {}
        }
    }

    if world.player.alive && world.player.x == x && world.player.y == y {
        kill_player(world, events);
    }
}

fn update_goodie(
    world: &mut World,
    i: usize,
    kind: GoodieKind,
    ttl: u32,
    events: &mut Vec<GameEvent>,
) {
    let ttl = ttl.saturating_sub(1);
    if ttl == 0 {
        // silent expiry, no effect
        world.actors[i].alive = false;
        return;
    }
    if let ActorKind::Goodie { ttl: t, .. } = &mut world.actors[i].kind {
        *t = ttl;
    }

    let (x, y) = (world.actors[i].x, world.actors[i].y);
    if world.player.alive && world.player.x == x && world.player.y == y {
        world.score += GOODIE_POINTS;
        match kind {
            GoodieKind::ExtraLife => world.lives += 1,
            GoodieKind::PhaseSuit => world.player.phase_ticks = world.options.phase_suit_ticks,
            GoodieKind::ChargePack => world.player.boost_ticks = world.options.charge_pack_ticks,
        }
        world.actors[i].alive = false;
        events.push(GameEvent::GoodieCollected { kind });
    }
}

// ── Bugs ──

fn update_bug(world: &mut World, i: usize, events: &mut Vec<GameEvent>) {
    let (x, y) = (world.actors[i].x, world.actors[i].y);
    if world.player.alive && world.player.x == x && world.player.y == y {
        kill_player(world, events);
    }

    let should_act = match &mut world.actors[i].kind {
        ActorKind::Bug(bug) => bug.should_act(),
        _ => return,
    };
    if !should_act {
        return;
    }

    let bug = match world.actors[i].kind {
        ActorKind::Bug(b) => b,
        _ => return,
    };
    match bug.species {
        Species::Scuttler => scuttle(world, i, bug.dir),
        Species::Sniffer => sniff(world, i, bug),
    }
}

/// Random walk: keep going; on a blocked move, re-roll the direction.
fn scuttle(world: &mut World, i: usize, dir: Dir) {
    if !try_move_bug(world, i, dir) {
        let new_dir = world.random_dir();
        if let ActorKind::Bug(bug) = &mut world.actors[i].kind {
            bug.dir = new_dir;
        }
    }
}

/// Chase the player by BFS while within the smell radius; otherwise,
/// or when no path exists, behave like a scuttler.
fn sniff(world: &mut World, i: usize, bug: BugState) {
    let (bx, by) = (world.actors[i].x, world.actors[i].y);
    let (px, py) = (world.player.x, world.player.y);
    let within = (px as i32 - bx as i32).abs() <= bug.smell_radius
        && (py as i32 - by as i32).abs() <= bug.smell_radius;

    if within {
        if let Some(dir) = ai::chase_direction(world, bx, by, px, py) {
            try_move_bug(world, i, dir);
            if let ActorKind::Bug(b) = &mut world.actors[i].kind {
                b.dir = dir;
            }
            return;
        }
    }
    scuttle(world, i, bug.dir);
}

fn try_move_bug(world: &mut World, i: usize, dir: Dir) -> bool {
    let (dx, dy) = dir.delta();
    let nx = world.actors[i].x as i32 + dx;
    let ny = world.actors[i].y as i32 + dy;
    if rules::bug_can_enter(world, nx, ny) {
        world.actors[i].x = nx as usize;
        world.actors[i].y = ny as usize;
        true
    } else {
        false
    }
}

// ══════════════════════════════════════════════════════════════
// Death effects
// ══════════════════════════════════════════════════════════════

/// Central kill path. Idempotent: a dead actor stays dead and its
/// death effect never runs twice.
fn kill_actor(world: &mut World, i: usize, events: &mut Vec<GameEvent>) {
    if !world.actors[i].alive {
        return;
    }
    world.actors[i].alive = false;
    let (x, y) = (world.actors[i].x, world.actors[i].y);
    match world.actors[i].kind {
        ActorKind::Charge { .. } => burst(world, x, y, events),
        ActorKind::Bug(bug) => {
            events.push(GameEvent::BugKilled { species: bug.species, x, y });
            world.score += World::species_points(bug.species);
            maybe_drop_goodie(world, x, y);
        }
        _ => {}
    }
}

/// Detonation: a cloud at the charge's own cell, then up to 2 cells
/// outward in each cardinal direction. A solid wall stops a direction
/// cold; a cracked wall receives a cloud but stops further spread.
fn burst(world: &mut World, x: usize, y: usize, events: &mut Vec<GameEvent>) {
    events.push(GameEvent::ChargeBurst { x, y });
    world.spawn(x, y, ActorKind::Cloud { ttl: CLOUD_TTL });

    for dir in Dir::ALL {
        let (dx, dy) = dir.delta();
        for reach in 1..=2i32 {
            let cx = x as i32 + dx * reach;
            let cy = y as i32 + dy * reach;
            if !rules::in_bounds(world, cx, cy) {
                break;
            }
            let (cx, cy) = (cx as usize, cy as usize);
            if world.has_solid_wall(cx, cy) {
                break;
            }
            world.spawn(cx, cy, ActorKind::Cloud { ttl: CLOUD_TTL });
            if world.has_cracked_wall(cx, cy) {
                break;
            }
        }
    }
}

/// Weighted goodie drop, in the fixed order life → charge pack →
/// phase suit.
fn maybe_drop_goodie(world: &mut World, x: usize, y: usize) {
    let o = world.options;
    if o.prob_goodie_overall == 0 || world.roll(100) >= o.prob_goodie_overall {
        return;
    }
    let total = o.prob_extra_life + o.prob_charge_pack + o.prob_phase_suit;
    if total == 0 {
        return;
    }
    let r = world.roll(total);
    let kind = if r < o.prob_extra_life {
        GoodieKind::ExtraLife
    } else if r < o.prob_extra_life + o.prob_charge_pack {
        GoodieKind::ChargePack
    } else {
        GoodieKind::PhaseSuit
    };
    world.spawn(x, y, ActorKind::Goodie { kind, ttl: o.goodie_ttl });
}

/// Opens every hatch. Runs exactly once per level, on the tick the
/// last bug's death is processed.
fn reveal_hatch(world: &mut World, events: &mut Vec<GameEvent>) {
    for a in world.actors.iter_mut() {
        if let ActorKind::Hatch { open } = &mut a.kind {
            *open = true;
        }
    }
    world.hatch_revealed = true;
    events.push(GameEvent::HatchRevealed);
}

// ══════════════════════════════════════════════════════════════
// Tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{self, LevelOptions};

    /// Build a deterministic world from maze rows.
    fn arena(rows: &[&str], seed: u64, tune: impl Fn(&mut LevelOptions)) -> World {
        let text = rows.join("\n");
        let mut def = level::parse_level(&text).expect("test maze must parse");
        tune(&mut def.options);
        let mut w = World::with_seed(seed);
        level::apply_level(&mut w, &def, 0);
        w
    }

    fn cloud_at(w: &World, x: usize, y: usize) -> bool {
        w.actors
            .iter()
            .any(|a| a.alive && a.x == x && a.y == y && matches!(a.kind, ActorKind::Cloud { .. }))
    }

    fn bug_positions(w: &World) -> Vec<(usize, usize)> {
        w.actors
            .iter()
            .filter(|a| a.alive && a.is_bug())
            .map(|a| (a.x, a.y))
            .collect()
    }

    fn count_bursts(events: &[GameEvent], x: usize, y: usize) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::ChargeBurst { x: bx, y: by } if *bx == x && *by == y))
            .count()
    }

    // ── Tick protocol ──

    #[test]
    fn player_death_halts_the_sweep() {
        let mut w = arena(
            &[
                "#####",
                "#P s#",
                "#####",
            ],
            1,
            |o| o.scuttler_move_ticks = 1,
        );
        // Cloud on the player; spawned last, so it is at the list
        // front and updates before the bug.
        w.spawn(1, 1, ActorKind::Cloud { ttl: CLOUD_TTL });

        let (outcome, events) = step(&mut w, None);
        assert_eq!(outcome, TickOutcome::PlayerDied);
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerKilled)));
        assert_eq!(w.lives, 2);
        // The bug never got its update this tick: cadence counter
        // untouched, position untouched.
        let bug = w
            .actors
            .iter()
            .find(|a| a.is_bug())
            .expect("bug still present");
        assert_eq!((bug.x, bug.y), (3, 1));
        if let ActorKind::Bug(b) = bug.kind {
            assert_eq!(b.tick_count, 0);
        }
    }

    #[test]
    fn bug_contact_kills_the_player() {
        let mut w = arena(
            &[
                "######",
                "#P S #",
                "######",
            ],
            3,
            |o| {
                o.sniffer_move_ticks = 1;
                o.sniffer_smell_radius = 5;
            },
        );
        // t1: sniffer steps to (2,1). t2: steps onto the player.
        // t3: the player's own death check fires.
        let (o1, _) = step(&mut w, None);
        assert_eq!(o1, TickOutcome::Continue);
        let (o2, _) = step(&mut w, None);
        assert_eq!(o2, TickOutcome::Continue);
        assert_eq!(bug_positions(&w), vec![(1, 1)]);
        let (o3, _) = step(&mut w, None);
        assert_eq!(o3, TickOutcome::PlayerDied);
    }

    // ── Charges ──

    #[test]
    fn charge_cap_and_cell_occupancy() {
        let mut w = arena(
            &[
                "#########",
                "#P      #",
                "#########",
            ],
            1,
            |o| o.max_boosted_charges = 3,
        );
        step(&mut w, Some(Command::DropCharge));
        assert_eq!(w.charge_count(), 1);
        // Same cell already has a charge: denied regardless of cap.
        step(&mut w, Some(Command::DropCharge));
        assert_eq!(w.charge_count(), 1);

        step(&mut w, Some(Command::Move(Dir::Right)));
        step(&mut w, Some(Command::DropCharge));
        assert_eq!(w.charge_count(), 2);

        // Hard cap without a charge pack.
        step(&mut w, Some(Command::Move(Dir::Right)));
        step(&mut w, Some(Command::DropCharge));
        assert_eq!(w.charge_count(), 2);

        // With an active charge pack the boosted cap applies.
        w.player.boost_ticks = 100;
        step(&mut w, Some(Command::DropCharge));
        assert_eq!(w.charge_count(), 3);
        step(&mut w, Some(Command::Move(Dir::Right)));
        step(&mut w, Some(Command::DropCharge));
        assert_eq!(w.charge_count(), 3);
    }

    #[test]
    fn charge_count_matches_live_charges_through_burst_and_expiry() {
        let mut w = arena(
            &[
                "###########",
                "#P        #",
                "###########",
            ],
            1,
            |_| {},
        );
        step(&mut w, Some(Command::DropCharge));
        // Walk out of blast range (2 cells + margin).
        for _ in 0..4 {
            step(&mut w, Some(Command::Move(Dir::Right)));
        }
        for _ in 0..60 {
            let (outcome, _) = step(&mut w, None);
            assert_eq!(outcome, TickOutcome::Continue);
            let live = w.actors.iter().filter(|a| a.alive && a.is_charge()).count() as u32;
            assert_eq!(w.charge_count(), live);
        }
        // Fuse long gone: the charge burst and its clouds expired.
        assert_eq!(w.charge_count(), 0);
        assert!(!w.actors.iter().any(|a| a.is_charge()));
    }

    #[test]
    fn no_charge_on_a_wall_cell() {
        let mut w = arena(
            &[
                "#####",
                "#P% #",
                "#####",
            ],
            1,
            |_| {},
        );
        w.player.phase_ticks = 10;
        step(&mut w, Some(Command::Move(Dir::Right)));
        assert_eq!((w.player.x, w.player.y), (2, 1));
        step(&mut w, Some(Command::DropCharge));
        assert_eq!(w.charge_count(), 0);
    }

    // ── Burst geometry ──

    #[test]
    fn burst_geometry_scenario() {
        // Charge on an empty cell, cracked wall 1 east, solid wall 2
        // east. Expected clouds: (0,0) and (+1,0) offsets only.
        let mut w = arena(
            &[
                "######",
                "#    #",
                "# %# #",
                "#   P#",
                "######",
            ],
            1,
            |_| {},
        );
        w.spawn(1, 2, ActorKind::Charge { fuse: 1 });
        let (_, events) = step(&mut w, None);

        assert_eq!(count_bursts(&events, 1, 2), 1);
        assert!(cloud_at(&w, 1, 2), "cloud at the charge cell");
        assert!(cloud_at(&w, 2, 2), "cloud on the cracked wall");
        assert!(!cloud_at(&w, 3, 2), "no cloud past the cracked wall");
        assert!(!cloud_at(&w, 0, 2), "no cloud on the solid border");
        assert!(cloud_at(&w, 1, 1), "cloud one north");
        assert!(cloud_at(&w, 1, 3), "cloud one south");
        // The cracked wall itself dies on the cloud's first contact.
        let (outcome, _) = step(&mut w, None);
        assert_eq!(outcome, TickOutcome::Continue);
        assert!(!w.has_cracked_wall(2, 2));
    }

    #[test]
    fn burst_never_reaches_past_two_cells() {
        let mut w = arena(
            &[
                "#########",
                "#P      #",
                "#       #",
                "#       #",
                "#########",
            ],
            1,
            |_| {},
        );
        w.spawn(4, 2, ActorKind::Charge { fuse: 1 });
        step(&mut w, None);
        assert!(cloud_at(&w, 4, 2));
        assert!(cloud_at(&w, 6, 2));
        assert!(cloud_at(&w, 2, 2));
        assert!(!cloud_at(&w, 7, 2), "three east is out of reach");
        assert!(!cloud_at(&w, 1, 2), "three west is out of reach");
        assert!(cloud_at(&w, 4, 1));
        assert!(cloud_at(&w, 4, 3));
    }

    #[test]
    fn cloud_forces_neighbor_charge_to_chain_once() {
        let mut w = arena(
            &[
                "########",
                "#      #",
                "#    P #",
                "########",
            ],
            1,
            |_| {},
        );
        w.spawn(1, 1, ActorKind::Charge { fuse: 1 });
        w.spawn(3, 1, ActorKind::Charge { fuse: CHARGE_FUSE_TICKS });

        // t1: first charge bursts; its clouds spawn at the front and
        // have not acted yet.
        let (_, e1) = step(&mut w, None);
        assert_eq!(count_bursts(&e1, 1, 1), 1);
        assert_eq!(count_bursts(&e1, 3, 1), 0);

        // t2: the cloud over the second charge zeroes its fuse; the
        // charge then dies through its own update, later in the same
        // sweep, and bursts exactly once.
        let (_, e2) = step(&mut w, None);
        assert_eq!(count_bursts(&e2, 3, 1), 1);

        // No second burst ever.
        let (_, e3) = step(&mut w, None);
        assert_eq!(count_bursts(&e3, 3, 1), 0);
    }

    // ── Hatch ──

    #[test]
    fn hatch_reveals_exactly_once_when_last_bug_dies() {
        let mut w = arena(
            &[
                "#####",
                "#P s#",
                "# X #",
                "#####",
            ],
            1,
            |o| o.scuttler_move_ticks = 1000,
        );
        // Bug alive: no reveal.
        let (_, e0) = step(&mut w, None);
        assert!(!e0.iter().any(|e| matches!(e, GameEvent::HatchRevealed)));
        assert!(!w.hatch_revealed);

        // Kill the bug with a cloud: the reveal lands on the very tick
        // the death is processed.
        w.spawn(3, 1, ActorKind::Cloud { ttl: CLOUD_TTL });
        let (_, e1) = step(&mut w, None);
        assert!(e1.iter().any(|e| matches!(e, GameEvent::BugKilled { .. })));
        assert!(e1.iter().any(|e| matches!(e, GameEvent::HatchRevealed)));
        assert!(w.hatch_revealed);
        assert!(w
            .actors
            .iter()
            .any(|a| matches!(a.kind, ActorKind::Hatch { open: true })));

        // Never again.
        let (_, e2) = step(&mut w, None);
        assert!(!e2.iter().any(|e| matches!(e, GameEvent::HatchRevealed)));
    }

    #[test]
    fn reaching_the_open_hatch_finishes_the_level_with_bonus() {
        let mut w = arena(
            &[
                "####",
                "#PX#",
                "####",
            ],
            1,
            |o| o.level_bonus = 50,
        );
        // No bugs at all: the first tick reveals the hatch and decays
        // the bonus by one.
        let (o1, _) = step(&mut w, None);
        assert_eq!(o1, TickOutcome::Continue);
        assert_eq!(w.bonus, 49);

        let (o2, e2) = step(&mut w, Some(Command::Move(Dir::Right)));
        assert_eq!(o2, TickOutcome::LevelFinished);
        assert!(e2.iter().any(|e| matches!(e, GameEvent::StageCleared)));
        assert_eq!(w.score, 49);
    }

    // ── Goodies ──

    #[test]
    fn certain_drop_spawns_the_configured_goodie() {
        let mut w = arena(
            &[
                "#####",
                "#P s#",
                "#####",
            ],
            42,
            |o| {
                o.scuttler_move_ticks = 1000;
                o.prob_goodie_overall = 100;
                o.prob_extra_life = 0;
                o.prob_charge_pack = 0;
                o.prob_phase_suit = 100;
            },
        );
        w.spawn(3, 1, ActorKind::Cloud { ttl: CLOUD_TTL });
        let (_, events) = step(&mut w, None);
        assert!(events.iter().any(|e| matches!(e, GameEvent::BugKilled { .. })));
        assert_eq!(w.score, 100);
        assert!(w.actors.iter().any(|a| a.alive
            && a.x == 3
            && a.y == 1
            && matches!(
                a.kind,
                ActorKind::Goodie { kind: GoodieKind::PhaseSuit, .. }
            )));
    }

    #[test]
    fn goodie_expires_silently() {
        let mut w = arena(
            &[
                "#####",
                "#P  #",
                "#####",
            ],
            1,
            |_| {},
        );
        w.spawn(3, 1, ActorKind::Goodie { kind: GoodieKind::ExtraLife, ttl: 2 });
        step(&mut w, None);
        let (_, events) = step(&mut w, None);
        assert!(!events
            .iter()
            .any(|e| matches!(e, GameEvent::GoodieCollected { .. })));
        assert_eq!(w.score, 0);
        assert_eq!(w.lives, 3);
        assert!(!w
            .actors
            .iter()
            .any(|a| matches!(a.kind, ActorKind::Goodie { .. })));
    }

    #[test]
    fn phase_suit_lasts_its_full_duration() {
        let mut w = arena(
            &[
                "#####",
                "#P% #",
                "#####",
            ],
            1,
            |o| o.phase_suit_ticks = 10,
        );
        // Collect a phase suit lying under the player.
        w.spawn(1, 1, ActorKind::Goodie { kind: GoodieKind::PhaseSuit, ttl: 50 });
        let (_, events) = step(&mut w, None);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::GoodieCollected { .. })));
        assert_eq!(w.player.phase_ticks, 10);
        assert_eq!(w.score, GOODIE_POINTS);

        // Ticks 1..=8 of the suit: bounce in and out of the cracked
        // wall. Ticks 9: stand still. Tick 10: entry must still work
        // (the pre-decrement value governs the tick).
        for t in 1..=8u32 {
            if t % 2 == 1 {
                step(&mut w, Some(Command::Move(Dir::Right)));
                assert_eq!(w.player.x, 2, "tick {t}: phased entry allowed");
            } else {
                step(&mut w, Some(Command::Move(Dir::Left)));
                assert_eq!(w.player.x, 1);
            }
        }
        step(&mut w, None); // tick 9
        let (o10, _) = step(&mut w, Some(Command::Move(Dir::Right))); // tick 10
        assert_eq!(o10, TickOutcome::Continue);
        assert_eq!(w.player.x, 2, "tick 10 is the last phased tick");
        assert_eq!(w.player.phase_ticks, 0);

        // Tick 11: the suit is gone while the player stands inside the
        // cracked wall — the death check fires.
        let (o11, _) = step(&mut w, None);
        assert_eq!(o11, TickOutcome::PlayerDied);
    }

    #[test]
    fn expired_phase_suit_blocks_reentry() {
        let mut w = arena(
            &[
                "#####",
                "#P% #",
                "#####",
            ],
            1,
            |o| o.phase_suit_ticks = 2,
        );
        w.spawn(1, 1, ActorKind::Goodie { kind: GoodieKind::PhaseSuit, ttl: 50 });
        step(&mut w, None); // collect: phase = 2
        step(&mut w, None); // decay to 1
        step(&mut w, None); // decay to 0
        let (outcome, _) = step(&mut w, Some(Command::Move(Dir::Right)));
        assert_eq!(outcome, TickOutcome::Continue);
        assert_eq!(w.player.x, 1, "cracked wall blocks again");
    }

    // ── Bug movement ──

    #[test]
    fn blocked_scuttler_rerolls_until_it_escapes() {
        let mut w = arena(
            &[
                "#######",
                "##s####",
                "## ####",
                "#P#####",
                "#######",
            ],
            7,
            |o| o.scuttler_move_ticks = 1,
        );
        let mut seen_exit = false;
        for _ in 0..40 {
            let (outcome, _) = step(&mut w, None);
            assert_eq!(outcome, TickOutcome::Continue);
            let pos = bug_positions(&w)[0];
            // The only legal cells are the start and the pocket below.
            assert!(pos == (2, 1) || pos == (2, 2));
            if pos == (2, 2) {
                seen_exit = true;
                break;
            }
        }
        assert!(seen_exit, "random re-rolls must eventually find the opening");
    }

    #[test]
    fn sniffer_chases_with_shortest_path() {
        let mut w = arena(
            &[
                "#######",
                "#P  S #",
                "#######",
            ],
            5,
            |o| {
                o.sniffer_move_ticks = 1;
                o.sniffer_smell_radius = 5;
            },
        );
        step(&mut w, None);
        assert_eq!(bug_positions(&w), vec![(3, 1)]);
    }

    #[test]
    fn sniffer_out_of_radius_walks_randomly_but_legally() {
        let mut w = arena(
            &[
                "#########",
                "#P     S#",
                "#########",
            ],
            11,
            |o| {
                o.sniffer_move_ticks = 1;
                o.sniffer_smell_radius = 2;
            },
        );
        for _ in 0..10 {
            let (outcome, _) = step(&mut w, None);
            if outcome != TickOutcome::Continue {
                break;
            }
            let (bx, by) = bug_positions(&w)[0];
            assert_eq!(by, 1);
            assert!(bx >= 1 && bx <= 7, "stays within the corridor");
        }
    }

    #[test]
    fn bugs_never_step_onto_charges() {
        let mut w = arena(
            &[
                "#######",
                "#P  S #",
                "#######",
            ],
            5,
            |o| {
                o.sniffer_move_ticks = 1;
                o.sniffer_smell_radius = 5;
            },
        );
        // A charge between bug and player seals the corridor: the
        // sniffer has no path and falls back to scuttling, which is
        // also blocked by the charge on one side.
        w.spawn(2, 1, ActorKind::Charge { fuse: CHARGE_FUSE_TICKS });
        for _ in 0..5 {
            step(&mut w, None);
            let (bx, _) = bug_positions(&w)[0];
            assert!(bx >= 3, "never crosses the charge cell");
        }
    }
}
