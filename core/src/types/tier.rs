//! Raid tiers

/// Raid difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Tier {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
}

impl Tier {
    pub const ALL: [Tier; 5] = [Tier::One, Tier::Two, Tier::Three, Tier::Four, Tier::Five];

    /// Look up a tier by number, `None` for anything outside 1-5
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Tier::One),
            2 => Some(Tier::Two),
            3 => Some(Tier::Three),
            4 => Some(Tier::Four),
            5 => Some(Tier::Five),
            _ => None,
        }
    }

    pub fn number(&self) -> u8 {
        *self as u8
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tier {}", self.number())
    }
}
