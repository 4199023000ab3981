//! Binary save-file encoding.
//!
//! The companion game reads a fixed 765-byte save with a handful of
//! fields at fixed offsets. Only the fields a fresh level-1 character
//! needs are populated; everything else stays zeroed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Total size of a freshly encoded save.
pub const SAVE_SIZE: usize = 765;

/// File magic at offset 0.
const SIGNATURE: u32 = 0xAA55_AA55;
/// Save format version (the 1.10-era layout).
const FORMAT_VERSION: u32 = 71;

const OFFSET_VERSION: usize = 4;
const OFFSET_FILE_SIZE: usize = 8;
const OFFSET_NAME: usize = 20;
const OFFSET_STATUS: usize = 36;
const OFFSET_CLASS: usize = 40;
const OFFSET_LEVEL: usize = 43;

/// Status-byte flag marking a hardcore character.
const STATUS_HARDCORE: u8 = 0x04;

/// Maximum character-name length stored in the save (null-terminated).
pub(crate) const MAX_NAME_LEN: usize = 15;

/// The seven playable classes, with the numeric codes the save format
/// uses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum CharacterClass {
    Amazon,
    Sorceress,
    Necromancer,
    Paladin,
    Barbarian,
    Druid,
    Assassin,
}

impl CharacterClass {
    /// All classes, in code order.
    pub const ALL: [CharacterClass; 7] = [
        Self::Amazon,
        Self::Sorceress,
        Self::Necromancer,
        Self::Paladin,
        Self::Barbarian,
        Self::Druid,
        Self::Assassin,
    ];

    /// Parses a class from its display name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }

    /// The numeric class code stored in the save file.
    pub fn code(self) -> u8 {
        match self {
            Self::Amazon => 0,
            Self::Sorceress => 1,
            Self::Necromancer => 2,
            Self::Paladin => 3,
            Self::Barbarian => 4,
            Self::Druid => 5,
            Self::Assassin => 6,
        }
    }

    /// Display name, as clients send it.
    pub fn name(self) -> &'static str {
        match self {
            Self::Amazon => "Amazon",
            Self::Sorceress => "Sorceress",
            Self::Necromancer => "Necromancer",
            Self::Paladin => "Paladin",
            Self::Barbarian => "Barbarian",
            Self::Druid => "Druid",
            Self::Assassin => "Assassin",
        }
    }

    /// Icon shown next to the character in listings.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Amazon => "🏹",
            Self::Sorceress => "🔮",
            Self::Necromancer => "💀",
            Self::Paladin => "🛡️",
            Self::Barbarian => "⚔️",
            Self::Druid => "🌿",
            Self::Assassin => "🗡️",
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encodes a fresh level-1 save for the given character.
///
/// The name is truncated to [`MAX_NAME_LEN`] bytes; callers sanitize it
/// to ASCII beforehand, so truncation never splits a code point.
pub fn encode_save(
    name: &str,
    class: CharacterClass,
    hardcore: bool,
) -> Vec<u8> {
    let mut buf = vec![0u8; SAVE_SIZE];

    buf[0..4].copy_from_slice(&SIGNATURE.to_le_bytes());
    buf[OFFSET_VERSION..OFFSET_VERSION + 4]
        .copy_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf[OFFSET_FILE_SIZE..OFFSET_FILE_SIZE + 4]
        .copy_from_slice(&(SAVE_SIZE as u32).to_le_bytes());

    let name_bytes = name.as_bytes();
    let len = name_bytes.len().min(MAX_NAME_LEN);
    buf[OFFSET_NAME..OFFSET_NAME + len]
        .copy_from_slice(&name_bytes[..len]);

    if hardcore {
        buf[OFFSET_STATUS] |= STATUS_HARDCORE;
    }
    buf[OFFSET_CLASS] = class.code();
    buf[OFFSET_LEVEL] = 1;

    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_codes_are_stable() {
        assert_eq!(CharacterClass::Amazon.code(), 0);
        assert_eq!(CharacterClass::Assassin.code(), 6);
        for (i, class) in CharacterClass::ALL.iter().enumerate() {
            assert_eq!(class.code() as usize, i);
        }
    }

    #[test]
    fn test_from_name_round_trips_every_class() {
        for class in CharacterClass::ALL {
            assert_eq!(CharacterClass::from_name(class.name()), Some(class));
        }
        assert_eq!(CharacterClass::from_name("Bard"), None);
    }

    #[test]
    fn test_encode_save_writes_header_fields() {
        let save = encode_save("Kormir", CharacterClass::Paladin, false);

        assert_eq!(save.len(), SAVE_SIZE);
        assert_eq!(
            u32::from_le_bytes(save[0..4].try_into().unwrap()),
            SIGNATURE
        );
        assert_eq!(
            u32::from_le_bytes(save[4..8].try_into().unwrap()),
            FORMAT_VERSION
        );
        assert_eq!(
            u32::from_le_bytes(save[8..12].try_into().unwrap()),
            SAVE_SIZE as u32
        );
        assert_eq!(&save[OFFSET_NAME..OFFSET_NAME + 6], b"Kormir");
        assert_eq!(save[OFFSET_NAME + 6], 0, "name is null-terminated");
        assert_eq!(save[OFFSET_STATUS], 0);
        assert_eq!(save[OFFSET_CLASS], CharacterClass::Paladin.code());
        assert_eq!(save[OFFSET_LEVEL], 1);
    }

    #[test]
    fn test_encode_save_sets_hardcore_flag() {
        let save = encode_save("Grim", CharacterClass::Necromancer, true);
        assert_eq!(save[OFFSET_STATUS] & STATUS_HARDCORE, STATUS_HARDCORE);
    }

    #[test]
    fn test_encode_save_truncates_long_names() {
        let save = encode_save(
            "AbsurdlyLongCharacterName",
            CharacterClass::Druid,
            false,
        );
        assert_eq!(
            &save[OFFSET_NAME..OFFSET_NAME + MAX_NAME_LEN],
            b"AbsurdlyLongCha"
        );
        assert_eq!(save[OFFSET_NAME + MAX_NAME_LEN], 0);
    }
}
