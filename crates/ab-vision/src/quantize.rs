use serde::{Deserialize, Serialize};

/// 9-bit colour code: the top 3 bits of red, green and blue, red highest.
///
/// Many visually distinct colours share a code. Classifiers disambiguate by
/// shape, adjacency and secondary colours.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u16", into = "u16")]
pub struct QuantizedColor(u16);

impl QuantizedColor {
    /// Number of distinct codes.
    pub const COUNT: usize = 512;

    pub const fn new(code: u16) -> Self {
        assert!(code < 512, "quantized colour code out of range");
        Self(code)
    }

    /// Quantize a packed `0xRRGGBB` pixel.
    pub const fn from_rgb(rgb: u32) -> Self {
        let red = (rgb & 0x00e0_0000) >> 15;
        let green = (rgb & 0x0000_e000) >> 10;
        let blue = (rgb & 0x0000_00e0) >> 5;
        Self((red | green | blue) as u16)
    }

    pub const fn from_channels(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgb(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn code(self) -> u16 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// An RGB triple that quantizes back to this code.
    pub const fn representative_rgb(self) -> [u8; 3] {
        [
            (((self.0 >> 6) & 7) << 5) as u8,
            (((self.0 >> 3) & 7) << 5) as u8,
            ((self.0 & 7) << 5) as u8,
        ]
    }
}

impl TryFrom<u16> for QuantizedColor {
    type Error = String;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        if (code as usize) < Self::COUNT {
            Ok(Self(code))
        } else {
            Err(format!("colour code {} is outside 0..512", code))
        }
    }
}

impl From<QuantizedColor> for u16 {
    fn from(c: QuantizedColor) -> u16 {
        c.0
    }
}

/// A set of admissible colour codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(Vec<QuantizedColor>);

impl Palette {
    pub fn new(codes: &[u16]) -> Self {
        Self(codes.iter().map(|&c| QuantizedColor::new(c)).collect())
    }

    pub fn contains(&self, colour: QuantizedColor) -> bool {
        self.0.contains(&colour)
    }

    pub fn colours(&self) -> &[QuantizedColor] {
        &self.0
    }

    /// Dense membership table for per-pixel loops.
    pub fn mask(&self) -> [bool; QuantizedColor::COUNT] {
        let mut mask = [false; QuantizedColor::COUNT];
        for c in &self.0 {
            mask[c.index()] = true;
        }
        mask
    }
}
