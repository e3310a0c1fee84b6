use std::fmt;

/// Chunk tags of the data section. All of them share the `0xcccc` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkTag {
    Object,
    Material,
    Image,
    Palette,
    Animation,
    Mesh,
    Cmp,
    Unk0a00,
    Unk2000,
    /// Binary blob, usually strings
    Binary,
    /// End of the data section
    Terminator(u32),
    Unknown(u32),
}

impl ChunkTag {
    pub const OBJECT: u32 = 0xcccc_0100;
    pub const MATERIAL: u32 = 0xcccc_0200;
    pub const IMAGE: u32 = 0xcccc_0300;
    pub const PALETTE: u32 = 0xcccc_0400;
    pub const ANIMATION: u32 = 0xcccc_0700;
    pub const MESH: u32 = 0xcccc_0800;
    pub const CMP: u32 = 0xcccc_0900;
    pub const UNK_0A00: u32 = 0xcccc_0a00;
    pub const UNK_2000: u32 = 0xcccc_2000;
    pub const BINARY: u32 = 0xcccc_2400;
    pub const END: u32 = 0x0000_0000;
    pub const END_SECTION: u32 = 0xcccc_0005;
    pub const END_FILE: u32 = 0xcccc_1b00;

    pub fn is_terminator(&self) -> bool {
        matches!(self, ChunkTag::Terminator(_))
    }

    pub fn raw(&self) -> u32 {
        match *self {
            ChunkTag::Object => Self::OBJECT,
            ChunkTag::Material => Self::MATERIAL,
            ChunkTag::Image => Self::IMAGE,
            ChunkTag::Palette => Self::PALETTE,
            ChunkTag::Animation => Self::ANIMATION,
            ChunkTag::Mesh => Self::MESH,
            ChunkTag::Cmp => Self::CMP,
            ChunkTag::Unk0a00 => Self::UNK_0A00,
            ChunkTag::Unk2000 => Self::UNK_2000,
            ChunkTag::Binary => Self::BINARY,
            ChunkTag::Terminator(v) | ChunkTag::Unknown(v) => v,
        }
    }
}

impl From<u32> for ChunkTag {
    fn from(value: u32) -> Self {
        match value {
            Self::OBJECT => Self::Object,
            Self::MATERIAL => Self::Material,
            Self::IMAGE => Self::Image,
            Self::PALETTE => Self::Palette,
            Self::ANIMATION => Self::Animation,
            Self::MESH => Self::Mesh,
            Self::CMP => Self::Cmp,
            Self::UNK_0A00 => Self::Unk0a00,
            Self::UNK_2000 => Self::Unk2000,
            Self::BINARY => Self::Binary,
            Self::END | Self::END_SECTION | Self::END_FILE => Self::Terminator(value),
            v => Self::Unknown(v),
        }
    }
}

impl fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkTag::Terminator(v) => write!(f, "terminator {v:#010x}"),
            ChunkTag::Unknown(v) => write!(f, "unknown {v:#010x}"),
            _ => write!(f, "{self:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_round_trip() {
        for raw in [
            ChunkTag::OBJECT,
            ChunkTag::MATERIAL,
            ChunkTag::IMAGE,
            ChunkTag::PALETTE,
            ChunkTag::ANIMATION,
            ChunkTag::MESH,
            ChunkTag::CMP,
            ChunkTag::UNK_0A00,
            ChunkTag::UNK_2000,
            ChunkTag::BINARY,
        ] {
            let tag = ChunkTag::from(raw);
            assert!(!matches!(tag, ChunkTag::Unknown(_)));
            assert_eq!(tag.raw(), raw);
        }
    }

    #[test]
    fn terminators() {
        for raw in [0, 0xcccc_0005, 0xcccc_1b00] {
            assert!(ChunkTag::from(raw).is_terminator());
        }
        assert_eq!(ChunkTag::from(0xcccc_0600), ChunkTag::Unknown(0xcccc_0600));
    }
}
