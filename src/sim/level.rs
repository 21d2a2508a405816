/// Level loading: tuning options + maze rows.
///
/// ## Sources (priority order):
///   1. `levels/` directory (individual `.txt` files, sorted by name)
///   2. Built-in embedded levels
///
/// ## Level format:
///   ```text
///   @ name Arena 1 - Front Yard
///   @ scuttler_move_ticks 25
///   @ level_bonus 3000
///   ###############
///   #P  %     s   #
///   ###############
///   ```
///
/// `@ key value` lines set tuning options; everything else is a maze
/// row. Rows are padded to the widest row with spaces.
///
/// ## Tile legend:
///   '#' = solid wall      '%' = cracked wall
///   'P' = player start    'X' = hatch (hidden until bugs are gone)
///   's' = scuttler        'S' = sniffer
///   ' ' = empty
///
/// Unknown tile characters or option keys are malformed level data.

use std::path::Path;

use thiserror::Error;

use crate::config::GameConfig;
use crate::domain::actor::{ActorKind, BugState, Player, Species, WallKind};
use crate::sim::world::World;

#[derive(Debug, Error)]
pub enum LevelError {
    /// The requested level index does not exist. Index 0 missing is a
    /// fatal configuration error; a later index missing means the run
    /// is complete. The harness makes that call.
    #[error("level {0} not found")]
    NotFound(usize),
    #[error("malformed level data: {0}")]
    BadFormat(String),
}

/// Per-level tuning values, all supplied by the level file.
#[derive(Clone, Copy, Debug)]
pub struct LevelOptions {
    pub scuttler_move_ticks: u32,
    pub sniffer_move_ticks: u32,
    pub sniffer_smell_radius: i32,
    pub goodie_ttl: u32,
    pub phase_suit_ticks: u32,
    pub charge_pack_ticks: u32,
    /// Charge cap while a charge pack is active (hard cap is 2 otherwise).
    pub max_boosted_charges: u32,
    /// Percent chance a dying bug drops any goodie at all.
    pub prob_goodie_overall: u32,
    // Relative weights among the three goodie kinds.
    pub prob_extra_life: u32,
    pub prob_charge_pack: u32,
    pub prob_phase_suit: u32,
    pub level_bonus: u32,
}

impl Default for LevelOptions {
    fn default() -> Self {
        LevelOptions {
            scuttler_move_ticks: 30,
            sniffer_move_ticks: 20,
            sniffer_smell_radius: 5,
            goodie_ttl: 300,
            phase_suit_ticks: 100,
            charge_pack_ticks: 150,
            max_boosted_charges: 5,
            prob_goodie_overall: 25,
            prob_extra_life: 33,
            prob_charge_pack: 33,
            prob_phase_suit: 34,
            level_bonus: 5000,
        }
    }
}

/// Parsed level, not yet instantiated into a world.
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub rows: Vec<String>,
    pub options: LevelOptions,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Load level `idx` into the world and return its display name.
/// Score, lives, and the RNG carry over; everything level-local is
/// rebuilt.
pub fn load_level(world: &mut World, idx: usize, config: &GameConfig) -> Result<String, LevelError> {
    let defs = available_levels(config)?;
    let def = defs.get(idx).ok_or(LevelError::NotFound(idx))?;
    apply_level(world, def, idx);
    Ok(def.name.clone())
}

/// Parse a level from text. Validates tiles, options, and the
/// exactly-one-player rule.
pub fn parse_level(text: &str) -> Result<LevelDef, LevelError> {
    let mut name = String::new();
    let mut options = LevelOptions::default();
    let mut rows: Vec<String> = vec![];

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("@ ") {
            parse_option(rest.trim(), &mut name, &mut options)?;
        } else {
            rows.push(line.to_string());
        }
    }

    while rows.last().map_or(false, |r| r.trim().is_empty()) {
        rows.pop();
    }
    if rows.is_empty() {
        return Err(LevelError::BadFormat("no maze rows".into()));
    }

    let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    for row in &mut rows {
        let len = row.chars().count();
        if len < width {
            row.extend(std::iter::repeat(' ').take(width - len));
        }
    }

    let mut players = 0;
    for (y, row) in rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            match ch {
                '#' | '%' | 'X' | 's' | 'S' | ' ' => {}
                'P' => players += 1,
                other => {
                    return Err(LevelError::BadFormat(format!(
                        "unknown tile '{other}' at {x},{y}"
                    )))
                }
            }
        }
    }
    if players != 1 {
        return Err(LevelError::BadFormat(format!(
            "expected exactly one player start, found {players}"
        )));
    }

    if name.is_empty() {
        name = "Unnamed Arena".to_string();
    }
    Ok(LevelDef { name, rows, options })
}

/// Instantiate a parsed level into the world.
pub fn apply_level(world: &mut World, def: &LevelDef, idx: usize) {
    world.clear_actors();
    world.options = def.options;
    world.height = def.rows.len();
    world.width = def.rows.first().map_or(0, |r| r.chars().count());
    world.hatch_revealed = false;
    world.level_complete = false;
    world.bonus = def.options.level_bonus;
    world.level = idx;
    world.tick = 0;

    for (y, row) in def.rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            match ch {
                '#' => {
                    world.spawn(x, y, ActorKind::Wall(WallKind::Solid));
                }
                '%' => {
                    world.spawn(x, y, ActorKind::Wall(WallKind::Cracked));
                }
                'X' => {
                    world.spawn(x, y, ActorKind::Hatch { open: false });
                }
                's' => {
                    let mut bug =
                        BugState::new(Species::Scuttler, def.options.scuttler_move_ticks, 0);
                    bug.dir = world.random_dir();
                    world.spawn(x, y, ActorKind::Bug(bug));
                }
                'S' => {
                    let mut bug = BugState::new(
                        Species::Sniffer,
                        def.options.sniffer_move_ticks,
                        def.options.sniffer_smell_radius,
                    );
                    bug.dir = world.random_dir();
                    world.spawn(x, y, ActorKind::Bug(bug));
                }
                'P' => {
                    world.player = Player::new(x, y);
                }
                _ => {}
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Internal: sources
// ══════════════════════════════════════════════════════════════

fn available_levels(config: &GameConfig) -> Result<Vec<LevelDef>, LevelError> {
    let dir_levels = load_from_directory(&config.levels_dir)?;
    if !dir_levels.is_empty() {
        return Ok(dir_levels);
    }
    Ok(embedded_levels())
}

/// Load `.txt` levels from a directory, sorted by filename. A present
/// but unreadable/unparsable file is malformed data, not "not found".
fn load_from_directory(dir: &Path) -> Result<Vec<LevelDef>, LevelError> {
    if !dir.is_dir() {
        return Ok(vec![]);
    }
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Ok(vec![]),
    };

    let mut files: Vec<_> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |e| e == "txt"))
        .collect();
    files.sort();

    let mut levels = vec![];
    for path in files {
        let text = std::fs::read_to_string(&path)
            .map_err(|e| LevelError::BadFormat(format!("{}: {e}", path.display())))?;
        let def = parse_level(&text)
            .map_err(|e| LevelError::BadFormat(format!("{}: {e}", path.display())))?;
        levels.push(def);
    }
    Ok(levels)
}

fn parse_option(rest: &str, name: &mut String, options: &mut LevelOptions) -> Result<(), LevelError> {
    let (key, value) = match rest.split_once(char::is_whitespace) {
        Some((k, v)) => (k, v.trim()),
        None => return Err(LevelError::BadFormat(format!("bad option line '@ {rest}'"))),
    };

    if key == "name" {
        *name = value.to_string();
        return Ok(());
    }

    let n: u32 = value
        .parse()
        .map_err(|_| LevelError::BadFormat(format!("option {key}: bad value '{value}'")))?;
    match key {
        "scuttler_move_ticks" => options.scuttler_move_ticks = n.max(1),
        "sniffer_move_ticks" => options.sniffer_move_ticks = n.max(1),
        "sniffer_smell_radius" => options.sniffer_smell_radius = n as i32,
        "goodie_ttl" => options.goodie_ttl = n,
        "phase_suit_ticks" => options.phase_suit_ticks = n,
        "charge_pack_ticks" => options.charge_pack_ticks = n,
        "max_boosted_charges" => options.max_boosted_charges = n,
        "prob_goodie_overall" => options.prob_goodie_overall = n.min(100),
        "prob_extra_life" => options.prob_extra_life = n,
        "prob_charge_pack" => options.prob_charge_pack = n,
        "prob_phase_suit" => options.prob_phase_suit = n,
        "level_bonus" => options.level_bonus = n,
        other => return Err(LevelError::BadFormat(format!("unknown option '{other}'"))),
    }
    Ok(())
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded(
            "Arena 1 - Front Yard",
            &[
                "###############",
                "#P  %     %   #",
                "# # # # # # # #",
                "#   %  s    % #",
                "# #%# # # #%# #",
                "#     %       #",
                "# # # # # #%# #",
                "# %   s    %  #",
                "# # # #%# # # #",
                "#   %     % s #",
                "# #%# # # # # #",
                "#    %    % X #",
                "###############",
            ],
            |o| {
                o.scuttler_move_ticks = 25;
                o.level_bonus = 3000;
            },
        ),
        make_embedded(
            "Arena 2 - The Nest",
            &[
                "###############",
                "#P %       % S#",
                "# #%# ### #%# #",
                "#  %   s   %  #",
                "#%### #%# ###%#",
                "#   %     %   #",
                "# # ##%#%## # #",
                "#  s   X   s  #",
                "# # ##%#%## # #",
                "#   %     %   #",
                "#%### #%# ###%#",
                "#  S   s   %  #",
                "###############",
            ],
            |o| {
                o.scuttler_move_ticks = 20;
                o.sniffer_move_ticks = 15;
                o.sniffer_smell_radius = 6;
                o.prob_goodie_overall = 35;
            },
        ),
    ]
}

fn make_embedded(name: &str, rows: &[&str], tune: impl Fn(&mut LevelOptions)) -> LevelDef {
    let mut options = LevelOptions::default();
    tune(&mut options);
    LevelDef {
        name: name.to_string(),
        rows: rows.iter().map(|s| s.to_string()).collect(),
        options,
    }
}
