/// Sniffer AI — BFS pathfinding toward the player.
///
/// Each of the 4 candidate first-step cells is the seed of an
/// independent breadth-first search over the 4-connected grid. Walls
/// and live charges block traversal; a blocked or out-of-bounds
/// candidate counts as unreachable. The direction with the strictly
/// shortest finite path wins; ties keep the earlier candidate in the
/// fixed Up, Down, Left, Right order.

use std::collections::VecDeque;

use super::grid::Dir;
use super::rules::{self, CellView};

/// Best first step toward (px, py) from (bx, by), or None when every
/// candidate is unreachable. The caller is responsible for the smell
/// radius check; this is pure path search.
pub fn chase_direction(
    view: &impl CellView,
    bx: usize,
    by: usize,
    px: usize,
    py: usize,
) -> Option<Dir> {
    let mut best: Option<(u32, Dir)> = None;
    for dir in Dir::ALL {
        let (dx, dy) = dir.delta();
        let sx = bx as i32 + dx;
        let sy = by as i32 + dy;
        if let Some(dist) = path_len(view, sx, sy, px, py) {
            if best.map_or(true, |(shortest, _)| dist < shortest) {
                best = Some((dist, dir));
            }
        }
    }
    best.map(|(_, dir)| dir)
}

/// Length of the shortest open path from seed (sx, sy) to the player,
/// counting the seed cell as distance 1. None = unreachable.
fn path_len(view: &impl CellView, sx: i32, sy: i32, px: usize, py: usize) -> Option<u32> {
    if !rules::bug_can_enter(view, sx, sy) {
        return None;
    }
    let (w, h) = (view.width(), view.height());
    let (sx, sy) = (sx as usize, sy as usize);

    let mut visited = vec![vec![false; w]; h];
    visited[sy][sx] = true;
    let mut queue: VecDeque<(usize, usize, u32)> = VecDeque::with_capacity(64);
    queue.push_back((sx, sy, 1));

    while let Some((cx, cy, dist)) = queue.pop_front() {
        if cx == px && cy == py {
            return Some(dist);
        }
        for dir in Dir::ALL {
            let (dx, dy) = dir.delta();
            let nx = cx as i32 + dx;
            let ny = cy as i32 + dy;
            if !rules::bug_can_enter(view, nx, ny) {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if !visited[ny][nx] {
                visited[ny][nx] = true;
                queue.push_back((nx, ny, dist + 1));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Legend:  '#'=solid  '%'=cracked  'o'=charge  ' '=open
    struct Diagram {
        rows: Vec<Vec<char>>,
    }

    impl Diagram {
        fn new(rows: &[&str]) -> Self {
            Diagram {
                rows: rows.iter().map(|r| r.chars().collect()).collect(),
            }
        }
    }

    impl CellView for Diagram {
        fn width(&self) -> usize {
            self.rows[0].len()
        }
        fn height(&self) -> usize {
            self.rows.len()
        }
        fn has_solid_wall(&self, x: usize, y: usize) -> bool {
            self.rows[y][x] == '#'
        }
        fn has_cracked_wall(&self, x: usize, y: usize) -> bool {
            self.rows[y][x] == '%'
        }
        fn has_charge(&self, x: usize, y: usize) -> bool {
            self.rows[y][x] == 'o'
        }
    }

    #[test]
    fn walks_straight_corridor() {
        let d = Diagram::new(&[
            "#####",
            "#   #",
            "#####",
        ]);
        // bug at (1,1), player at (3,1): only Right has a finite path
        assert_eq!(chase_direction(&d, 1, 1, 3, 1), Some(Dir::Right));
    }

    #[test]
    fn routes_around_walls() {
        let d = Diagram::new(&[
            "#####",
            "# # #",
            "#   #",
            "#####",
        ]);
        // bug at (1,1), player at (3,1); the wall at (2,1) forces the
        // path down through row 2
        assert_eq!(chase_direction(&d, 1, 1, 3, 1), Some(Dir::Down));
    }

    #[test]
    fn tie_break_prefers_up_over_down() {
        // open 5x5 box, player directly 2 left of the bug: Left is
        // strictly shortest, so first make a symmetric case instead.
        // Player two rows up AND two rows down is impossible; use a
        // layout where Up and Down give equal path lengths to a player
        // on the same column.
        let d = Diagram::new(&[
            "#####",
            "#   #",
            "# # #",
            "#   #",
            "#####",
        ]);
        // bug at (3,2), player at (1,2). Going Up (3,1) or Down (3,3)
        // both reach the player in 4 steps; Left is blocked by the
        // wall at (2,2). The tie must keep Up.
        assert_eq!(chase_direction(&d, 3, 2, 1, 2), Some(Dir::Up));
    }

    #[test]
    fn blocked_candidates_are_skipped() {
        let d = Diagram::new(&[
            "#####",
            "##  #",
            "#####",
        ]);
        // bug at (2,1): Up, Down, Left all blocked; player at (3,1)
        assert_eq!(chase_direction(&d, 2, 1, 3, 1), Some(Dir::Right));
    }

    #[test]
    fn charge_blocks_the_path() {
        let d = Diagram::new(&[
            "#####",
            "# o #",
            "#####",
        ]);
        // bug at (1,1), player at (3,1): the charge seals the corridor
        assert_eq!(chase_direction(&d, 1, 1, 3, 1), None);
    }

    #[test]
    fn unreachable_player_yields_none() {
        let d = Diagram::new(&[
            "######",
            "#  # #",
            "######",
        ]);
        assert_eq!(chase_direction(&d, 1, 1, 4, 1), None);
    }

    #[test]
    fn adjacent_player_is_distance_one() {
        let d = Diagram::new(&[
            "####",
            "#  #",
            "####",
        ]);
        assert_eq!(chase_direction(&d, 1, 1, 2, 1), Some(Dir::Right));
    }
}
