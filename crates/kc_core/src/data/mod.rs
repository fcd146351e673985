//! Static lookup tables consulted by the analysis pipeline.
//!
//! Categorization is data-driven: unit-line membership and counter
//! relationships live in YAML embedded at compile time, parsed once into
//! process-wide caches. Small fixed sets stay as constants. Keys missing
//! from any table degrade to `unknown` / empty results, never to errors.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

/// Unit name -> unit line mapping (compile-time embedded).
pub const UNIT_LINES_YAML: &str = include_str!("../../../../data/unit_lines.yaml");

/// Unit line -> counter lines mapping (compile-time embedded).
pub const COUNTERS_YAML: &str = include_str!("../../../../data/counters.yaml");

static UNIT_LINES: OnceLock<HashMap<String, String>> = OnceLock::new();
static COUNTERS: OnceLock<HashMap<String, Vec<String>>> = OnceLock::new();

/// Sentinel line for unit names absent from the lookup table.
pub const UNKNOWN_LINE: &str = "unknown";

/// Lines excluded from `military_total` in composition snapshots.
pub const NON_MILITARY_LINES: &[&str] = &["villager", "fishing_ship", "trade"];

/// Lines that never trigger switch detection.
pub const SWITCH_EXCLUDED_LINES: &[&str] = &["villager", "fishing_ship", "trade", "unknown"];

/// Lines whose units cost gold (committed economy).
pub const GOLD_LINES: &[&str] = &[
    "militia_line",
    "eagle_line",
    "archer_line",
    "cavalry_archer_line",
    "hand_cannoneer_line",
    "elephant_archer_line",
    "knight_line",
    "camel_line",
    "battle_elephant_line",
    "steppe_lancer_line",
    "ram_line",
    "mangonel_line",
    "scorpion_line",
    "bombard_cannon_line",
    "trebuchet",
    "petard",
    "monk",
    "galley_line",
    "fire_ship_line",
    "demo_ship_line",
    "cannon_galleon_line",
];

/// Gold-free lines sustainable on food/wood alone.
pub const TRASH_LINES: &[&str] = &["pikeman_line", "skirmisher_line", "scout_line"];

/// Buildings whose per-object production gaps are flagged.
pub const PRODUCTION_BUILDINGS: &[&str] = &[
    "Barracks",
    "Archery Range",
    "Stable",
    "Siege Workshop",
    "Castle",
    "Dock",
    "Monastery",
];

/// The villager-producing building tracked by the town-center idle detector.
pub const TOWN_CENTER: &str = "Town Center";

const BUILDING_KEYS: &[(&str, &str)] = &[
    ("Town Center", "town_center"),
    ("House", "house"),
    ("Mill", "mill"),
    ("Lumber Camp", "lumber_camp"),
    ("Mining Camp", "mining_camp"),
    ("Dock", "dock"),
    ("Barracks", "barracks"),
    ("Archery Range", "archery_range"),
    ("Stable", "stable"),
    ("Blacksmith", "blacksmith"),
    ("Market", "market"),
    ("Monastery", "monastery"),
    ("University", "university"),
    ("Siege Workshop", "siege_workshop"),
    ("Castle", "castle"),
];

const TECH_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "economy",
        &[
            "Loom",
            "Wheelbarrow",
            "Hand Cart",
            "Double-Bit Axe",
            "Bow Saw",
            "Horse Collar",
            "Heavy Plow",
            "Gold Mining",
            "Stone Mining",
        ],
    ),
    (
        "blacksmith",
        &[
            "Forging",
            "Iron Casting",
            "Blast Furnace",
            "Fletching",
            "Bodkin Arrow",
            "Bracer",
            "Scale Mail Armor",
            "Chain Mail Armor",
            "Plate Mail Armor",
            "Scale Barding Armor",
            "Chain Barding Armor",
            "Plate Barding Armor",
            "Padded Archer Armor",
            "Leather Archer Armor",
            "Ring Archer Armor",
        ],
    ),
    (
        "university",
        &[
            "Ballistics",
            "Chemistry",
            "Masonry",
            "Architecture",
            "Murder Holes",
            "Treadmill Crane",
            "Siege Engineers",
        ],
    ),
    (
        "monastery",
        &[
            "Sanctity",
            "Redemption",
            "Atonement",
            "Fervor",
            "Block Printing",
            "Faith",
            "Theocracy",
        ],
    ),
];

fn unit_lines() -> &'static HashMap<String, String> {
    UNIT_LINES.get_or_init(|| {
        serde_yaml::from_str(UNIT_LINES_YAML).expect("Failed to parse unit_lines.yaml")
    })
}

fn counter_map() -> &'static HashMap<String, Vec<String>> {
    COUNTERS
        .get_or_init(|| serde_yaml::from_str(COUNTERS_YAML).expect("Failed to parse counters.yaml"))
}

/// Resolve a unit name to its canonical line, or `unknown`.
pub fn unit_line(name: Option<&str>) -> &'static str {
    match name {
        Some(name) => unit_lines().get(name).map(String::as_str).unwrap_or(UNKNOWN_LINE),
        None => UNKNOWN_LINE,
    }
}

/// Counter lines registered against an opponent line, in tie-break order.
pub fn counters_for(line: &str) -> &'static [String] {
    counter_map().get(line).map(Vec::as_slice).unwrap_or(&[])
}

/// First-building report key for a building name, if tracked.
pub fn building_key(building: &str) -> Option<&'static str> {
    BUILDING_KEYS
        .iter()
        .find(|(name, _)| *name == building)
        .map(|(_, key)| *key)
}

/// Static research category table exposed in the report's tech section.
pub fn tech_categories() -> BTreeMap<String, Vec<String>> {
    TECH_CATEGORIES
        .iter()
        .map(|(category, techs)| {
            (
                category.to_string(),
                techs.iter().map(|tech| tech.to_string()).collect(),
            )
        })
        .collect()
}
