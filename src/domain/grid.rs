/// Cardinal directions on the grid.
/// The fixed `ALL` order (Up, Down, Left, Right) is load-bearing: the
/// sniffer AI evaluates candidate steps in this order and keeps the
/// first on ties, and random direction rolls index into it.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    /// Screen-space delta: y grows downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

/// One pending player command per simulation tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Move(Dir),
    DropCharge,
}
