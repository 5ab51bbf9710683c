//! Pokemon types listed on raid bosses

/// Pokemon types (18 types as of Gen 6+)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PokemonType {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl PokemonType {
    /// Parse a type name as it appears in boss files (case-insensitive)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Some(PokemonType::Normal),
            "fire" => Some(PokemonType::Fire),
            "water" => Some(PokemonType::Water),
            "electric" => Some(PokemonType::Electric),
            "grass" => Some(PokemonType::Grass),
            "ice" => Some(PokemonType::Ice),
            "fighting" => Some(PokemonType::Fighting),
            "poison" => Some(PokemonType::Poison),
            "ground" => Some(PokemonType::Ground),
            "flying" => Some(PokemonType::Flying),
            "psychic" => Some(PokemonType::Psychic),
            "bug" => Some(PokemonType::Bug),
            "rock" => Some(PokemonType::Rock),
            "ghost" => Some(PokemonType::Ghost),
            "dragon" => Some(PokemonType::Dragon),
            "dark" => Some(PokemonType::Dark),
            "steel" => Some(PokemonType::Steel),
            "fairy" => Some(PokemonType::Fairy),
            _ => None,
        }
    }

    /// Canonical display name
    pub fn as_str(&self) -> &'static str {
        match self {
            PokemonType::Normal => "Normal",
            PokemonType::Fire => "Fire",
            PokemonType::Water => "Water",
            PokemonType::Electric => "Electric",
            PokemonType::Grass => "Grass",
            PokemonType::Ice => "Ice",
            PokemonType::Fighting => "Fighting",
            PokemonType::Poison => "Poison",
            PokemonType::Ground => "Ground",
            PokemonType::Flying => "Flying",
            PokemonType::Psychic => "Psychic",
            PokemonType::Bug => "Bug",
            PokemonType::Rock => "Rock",
            PokemonType::Ghost => "Ghost",
            PokemonType::Dragon => "Dragon",
            PokemonType::Dark => "Dark",
            PokemonType::Steel => "Steel",
            PokemonType::Fairy => "Fairy",
        }
    }
}

impl std::fmt::Display for PokemonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
