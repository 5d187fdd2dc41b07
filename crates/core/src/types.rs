use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct ItemId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self { y: self.y + dy, x: self.x + dx }
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn distance_squared(self, other: Pos) -> i64 {
        let dx = i64::from(self.x - other.x);
        let dy = i64::from(self.y - other.y);
        dx * dx + dy * dy
    }

    pub fn orthogonal_neighbors(self) -> [Pos; 4] {
        [
            Pos { y: self.y - 1, x: self.x },
            Pos { y: self.y, x: self.x + 1 },
            Pos { y: self.y + 1, x: self.x },
            Pos { y: self.y, x: self.x - 1 },
        ]
    }
}

/// Stable room identifier; the index of the room in its level's room list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomId(pub u32);

impl RoomId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoorState {
    pub locked: bool,
    pub hidden: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrapKind {
    Spike,
    Poison,
    Alarm,
    Teleport,
    Confusion,
}

impl TrapKind {
    pub fn name(self) -> &'static str {
        match self {
            TrapKind::Spike => "spike",
            TrapKind::Poison => "poison",
            TrapKind::Alarm => "alarm",
            TrapKind::Teleport => "teleport",
            TrapKind::Confusion => "confusion",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trap {
    pub kind: TrapKind,
    pub damage: u32,
    pub hidden: bool,
    pub triggered: bool,
}

/// What a triggered trap does to whoever stepped on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrapEffect {
    Damage(u32),
    Poison { damage: u32 },
    Alarm,
    Teleport,
    Confusion { turns: u32 },
}

impl Trap {
    pub fn effect(&self) -> TrapEffect {
        match self.kind {
            TrapKind::Spike => TrapEffect::Damage(self.damage),
            TrapKind::Poison => TrapEffect::Poison { damage: self.damage },
            TrapKind::Alarm => TrapEffect::Alarm,
            TrapKind::Teleport => TrapEffect::Teleport,
            TrapKind::Confusion => TrapEffect::Confusion { turns: 2 + self.damage / 4 },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Floor,
    Door(DoorState),
    Stairs,
    Trap(Trap),
}

impl TileKind {
    pub fn is_walkable(self) -> bool {
        match self {
            TileKind::Wall => false,
            TileKind::Floor | TileKind::Stairs | TileKind::Trap(_) => true,
            TileKind::Door(door) => !door.locked && !door.hidden,
        }
    }

    pub fn blocks_sight(self) -> bool {
        match self {
            TileKind::Wall => true,
            TileKind::Floor | TileKind::Stairs | TileKind::Trap(_) => false,
            TileKind::Door(door) => door.locked || door.hidden,
        }
    }

    /// Multiplier applied to the base step cost when entering this tile.
    pub fn move_cost(self) -> f64 {
        match self {
            TileKind::Trap(trap) if !trap.hidden && !trap.triggered => 3.0,
            _ => 1.0,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            TileKind::Wall => '#',
            TileKind::Floor => '.',
            TileKind::Door(DoorState { hidden: true, .. }) => '#',
            TileKind::Door(DoorState { locked: true, .. }) => '%',
            TileKind::Door(_) => '+',
            TileKind::Stairs => '>',
            TileKind::Trap(trap) if trap.hidden => '.',
            TileKind::Trap(_) => '^',
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloorStyle {
    #[default]
    Stone,
    Moss,
    Marble,
    Cobble,
    Bones,
    Crystal,
}

impl FloorStyle {
    pub const SPECIAL: [FloorStyle; 5] = [
        FloorStyle::Moss,
        FloorStyle::Marble,
        FloorStyle::Cobble,
        FloorStyle::Bones,
        FloorStyle::Crystal,
    ];
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    #[default]
    Normal,
    Start,
    Stairs,
    Boss,
    Shop,
    Secret,
    Special,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomShape {
    Rect,
    Cave,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorridorStyle {
    Elbow,
    Zigzag,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorKind {
    Regular,
    Locked,
    Secret,
}

impl DoorKind {
    pub fn state(self) -> DoorState {
        match self {
            DoorKind::Regular => DoorState { locked: false, hidden: false },
            DoorKind::Locked => DoorState { locked: true, hidden: false },
            DoorKind::Secret => DoorState { locked: false, hidden: true },
        }
    }
}
