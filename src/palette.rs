//! Box colors: a fixed palette and the cycler handing out palette indices.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteColor {
    pub name: String,
    pub rgb: [u8; 3],
}

impl PaletteColor {
    pub fn new(name: &str, rgb: [u8; 3]) -> Self {
        Self {
            name: name.to_owned(),
            rgb,
        }
    }
}

const DEFAULT_COLORS: &[(&str, [u8; 3])] = &[
    ("red", [255, 0, 0]),
    ("green", [0, 255, 0]),
    ("yellow", [255, 255, 0]),
    ("hot pink", [255, 105, 180]),
    ("DarkOrange3", [205, 102, 0]),
    ("cornflower blue", [100, 149, 237]),
    ("lime green", [50, 205, 50]),
    ("maroon1", [255, 52, 179]),
    ("light slate blue", [132, 112, 255]),
    ("DarkSeaGreen3", [155, 205, 155]),
    ("turquoise", [64, 224, 208]),
    ("VioletRed2", [238, 58, 140]),
    ("MediumOrchid1", [224, 102, 255]),
    ("purple", [160, 32, 240]),
    ("black", [0, 0, 0]),
    ("brown", [165, 42, 42]),
    ("forest green", [34, 139, 34]),
    ("LemonChiffon3", [205, 201, 165]),
    ("dark salmon", [233, 150, 122]),
    ("LightBlue2", [178, 223, 238]),
    ("blue4", [0, 0, 139]),
    ("alice blue", [240, 248, 255]),
    ("orchid3", [205, 105, 201]),
    ("SeaGreen1", [84, 255, 159]),
    ("AntiqueWhite2", [238, 223, 204]),
    ("thistle1", [255, 225, 255]),
    ("light slate gray", [119, 136, 153]),
    ("firebrick3", [205, 38, 38]),
    ("midnight blue", [25, 25, 112]),
    ("goldenrod4", [139, 105, 20]),
    ("PeachPuff2", [238, 203, 173]),
    ("DodgerBlue4", [16, 78, 139]),
    ("LavenderBlush4", [139, 131, 134]),
    ("LemonChiffon4", [139, 137, 112]),
    ("LightSkyBlue2", [164, 211, 238]),
    ("LightCyan4", [122, 139, 139]),
    ("dark violet", [148, 0, 211]),
    ("RosyBrown1", [255, 193, 193]),
    ("firebrick4", [139, 26, 26]),
    ("medium aquamarine", [102, 205, 170]),
    ("salmon2", [238, 130, 98]),
    ("SkyBlue2", [126, 192, 238]),
    ("AntiqueWhite3", [205, 192, 176]),
    ("DarkOrange1", [255, 127, 0]),
    ("DarkOrange2", [238, 118, 0]),
    ("sienna1", [255, 130, 71]),
    ("SkyBlue3", [108, 166, 205]),
    ("LightYellow2", [238, 238, 209]),
    ("powder blue", [176, 224, 230]),
    ("HotPink3", [205, 96, 144]),
    ("NavajoWhite2", [238, 207, 161]),
    ("SlateBlue2", [122, 103, 238]),
    ("red2", [238, 0, 0]),
    ("DarkOliveGreen2", [188, 238, 104]),
    ("light goldenrod yellow", [250, 250, 210]),
    ("aquamarine4", [69, 139, 116]),
    ("bisque4", [139, 125, 107]),
    ("lavender", [230, 230, 250]),
    ("orange2", [238, 154, 0]),
    ("sandy brown", [244, 164, 96]),
    ("linen", [250, 240, 230]),
    ("orchid2", [238, 122, 233]),
    ("gold3", [205, 173, 0]),
    ("LightGoldenrod4", [139, 129, 76]),
    ("SlateBlue3", [105, 89, 205]),
    ("pale goldenrod", [238, 232, 170]),
    ("DarkGoldenrod3", [205, 149, 12]),
];

pub fn default_palette() -> Vec<PaletteColor> {
    DEFAULT_COLORS
        .iter()
        .map(|(name, rgb)| PaletteColor::new(name, *rgb))
        .collect()
}

/// Palette lookup with wraparound, so stored indices beyond the palette still resolve.
pub fn color_at(palette: &[PaletteColor], index: usize) -> Option<&PaletteColor> {
    if palette.is_empty() {
        return None;
    }
    palette.get(index % palette.len())
}

/// Hands out color indices `0, 1, 2, ...` modulo the palette size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorCycler {
    index: usize,
    palette_len: usize,
}

impl ColorCycler {
    pub fn new(palette_len: usize) -> Self {
        Self {
            index: 0,
            palette_len: palette_len.max(1),
        }
    }

    pub fn palette_len(&self) -> usize {
        self.palette_len
    }

    /// Index the next committed box will get.
    pub fn peek(&self) -> usize {
        self.index
    }

    pub fn next(&mut self) -> usize {
        let current = self.index;
        self.index = (self.index + 1) % self.palette_len;
        current
    }

    /// Continue after the highest index already used, or start at 0.
    pub fn reset_from(&mut self, existing_max: Option<usize>) {
        self.index = existing_max.map_or(0, |max| (max % self.palette_len + 1) % self.palette_len);
    }
}
