/// Movement legality — pure predicates over cell occupancy.
///
/// These encode "what is legal" without performing the move. The world
/// implements `CellView`; tests use a tiny fake.
///
/// ## Blocking table
/// ┌──────────────────────────────┬────────┬──────────┐
/// │ Target cell holds             │ Player │ Bug      │
/// ├──────────────────────────────┼────────┼──────────┤
/// │ out of bounds                 │ DENY   │ DENY     │
/// │ solid wall                    │ DENY   │ DENY     │
/// │ cracked wall, phase inactive  │ DENY   │ DENY     │
/// │ cracked wall, phase active    │ allow  │ DENY     │
/// │ live charge                   │ allow  │ DENY     │
/// │ bug / cloud / goodie / hatch  │ allow  │ allow    │
/// └──────────────────────────────┴────────┴──────────┘
///
/// The cracked-wall row pins a clarified rule: a cell blocks the player
/// iff it holds a solid wall, OR it holds a cracked wall while the
/// phase suit is inactive. See the regression test below.

/// Occupancy queries the legality rules need. Implemented by the world;
/// only live actors count.
pub trait CellView {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn has_solid_wall(&self, x: usize, y: usize) -> bool;
    fn has_cracked_wall(&self, x: usize, y: usize) -> bool;
    fn has_charge(&self, x: usize, y: usize) -> bool;
}

pub fn in_bounds(view: &impl CellView, x: i32, y: i32) -> bool {
    x >= 0 && y >= 0 && (x as usize) < view.width() && (y as usize) < view.height()
}

/// Can the player enter (x, y)? `phased` is the phase-suit status the
/// player holds for this tick.
pub fn player_can_enter(view: &impl CellView, x: i32, y: i32, phased: bool) -> bool {
    if !in_bounds(view, x, y) {
        return false;
    }
    let (x, y) = (x as usize, y as usize);
    if view.has_solid_wall(x, y) {
        return false;
    }
    if view.has_cracked_wall(x, y) && !phased {
        return false;
    }
    true
}

/// Can a bug enter (x, y)? Bugs never cross walls and never step onto a
/// live charge.
pub fn bug_can_enter(view: &impl CellView, x: i32, y: i32) -> bool {
    if !in_bounds(view, x, y) {
        return false;
    }
    let (x, y) = (x as usize, y as usize);
    !view.has_solid_wall(x, y) && !view.has_cracked_wall(x, y) && !view.has_charge(x, y)
}
