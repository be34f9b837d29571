//! Colour palettes and art styles
//!
//! Palettes drive both the poster layout (background, text, accent) and
//! the colour world described to the image model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Poster colour palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColourPalette {
    WarmGold,
    CoolMidnight,
    EarthTones,
    Ocean,
    Botanical,
    Monochrome,
    Rose,
    Lavender,
    Sunset,
    Slate,
    Copper,
    Arctic,
}

/// Colours and display name of one palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaletteSpec {
    pub name: &'static str,
    pub colors: [&'static str; 5],
    pub bg: &'static str,
    pub text: &'static str,
    pub accent: &'static str,
}

impl ColourPalette {
    pub const ALL: [ColourPalette; 12] = [
        ColourPalette::WarmGold,
        ColourPalette::CoolMidnight,
        ColourPalette::EarthTones,
        ColourPalette::Ocean,
        ColourPalette::Botanical,
        ColourPalette::Monochrome,
        ColourPalette::Rose,
        ColourPalette::Lavender,
        ColourPalette::Sunset,
        ColourPalette::Slate,
        ColourPalette::Copper,
        ColourPalette::Arctic,
    ];

    /// Wire identifier, e.g. `warm-gold`
    pub fn id(self) -> &'static str {
        match self {
            ColourPalette::WarmGold => "warm-gold",
            ColourPalette::CoolMidnight => "cool-midnight",
            ColourPalette::EarthTones => "earth-tones",
            ColourPalette::Ocean => "ocean",
            ColourPalette::Botanical => "botanical",
            ColourPalette::Monochrome => "monochrome",
            ColourPalette::Rose => "rose",
            ColourPalette::Lavender => "lavender",
            ColourPalette::Sunset => "sunset",
            ColourPalette::Slate => "slate",
            ColourPalette::Copper => "copper",
            ColourPalette::Arctic => "arctic",
        }
    }

    pub fn spec(self) -> PaletteSpec {
        match self {
            ColourPalette::WarmGold => PaletteSpec {
                name: "Warm Gold",
                colors: ["#D4930D", "#E8B94A", "#F5D78E", "#8B6914", "#FDF6EC"],
                bg: "#1A1612",
                text: "#FDF6EC",
                accent: "#D4930D",
            },
            ColourPalette::CoolMidnight => PaletteSpec {
                name: "Cool Midnight",
                colors: ["#4A6FA5", "#6B8FC4", "#9BB5D9", "#2C4A7C", "#E8EFF7"],
                bg: "#0F1624",
                text: "#E8EFF7",
                accent: "#6B8FC4",
            },
            ColourPalette::EarthTones => PaletteSpec {
                name: "Earth Tones",
                colors: ["#8B6F47", "#A68B5B", "#C4A882", "#5C4A2E", "#F5EDE0"],
                bg: "#1C1610",
                text: "#F5EDE0",
                accent: "#A68B5B",
            },
            ColourPalette::Ocean => PaletteSpec {
                name: "Ocean",
                colors: ["#0D7377", "#14919B", "#45C4B0", "#065A5C", "#E0F5F3"],
                bg: "#0A1A1C",
                text: "#E0F5F3",
                accent: "#14919B",
            },
            ColourPalette::Botanical => PaletteSpec {
                name: "Botanical",
                colors: ["#4A7C59", "#6B9E7A", "#9BC4A8", "#2E5C3A", "#EAF5ED"],
                bg: "#0F1A12",
                text: "#EAF5ED",
                accent: "#6B9E7A",
            },
            ColourPalette::Monochrome => PaletteSpec {
                name: "Monochrome",
                colors: ["#888888", "#AAAAAA", "#CCCCCC", "#555555", "#F0F0F0"],
                bg: "#111111",
                text: "#F0F0F0",
                accent: "#AAAAAA",
            },
            ColourPalette::Rose => PaletteSpec {
                name: "Rose",
                colors: ["#C46B8A", "#D4899E", "#E8B0C4", "#8E3A5C", "#FDF0F4"],
                bg: "#1A1014",
                text: "#FDF0F4",
                accent: "#C46B8A",
            },
            ColourPalette::Lavender => PaletteSpec {
                name: "Lavender",
                colors: ["#7B68AE", "#9A8AC4", "#BEB0DA", "#5C4A8E", "#F0ECF7"],
                bg: "#12101A",
                text: "#F0ECF7",
                accent: "#9A8AC4",
            },
            ColourPalette::Sunset => PaletteSpec {
                name: "Sunset",
                colors: ["#D4602A", "#E8844A", "#F5A870", "#8B3D14", "#FDF2EC"],
                bg: "#1A1210",
                text: "#FDF2EC",
                accent: "#D4602A",
            },
            ColourPalette::Slate => PaletteSpec {
                name: "Slate",
                colors: ["#5A6B7A", "#7A8D9E", "#9EB0C0", "#3A4B5A", "#EDF1F4"],
                bg: "#101418",
                text: "#EDF1F4",
                accent: "#7A8D9E",
            },
            ColourPalette::Copper => PaletteSpec {
                name: "Copper",
                colors: ["#B87333", "#CC8844", "#E0A86B", "#8A5520", "#F7EDE0"],
                bg: "#1A1410",
                text: "#F7EDE0",
                accent: "#B87333",
            },
            ColourPalette::Arctic => PaletteSpec {
                name: "Arctic",
                colors: ["#5BB5D5", "#7CC8E4", "#A8DDF0", "#3A8DAA", "#E8F5FA"],
                bg: "#0C1820",
                text: "#E8F5FA",
                accent: "#5BB5D5",
            },
        }
    }

    /// Whether generated artwork should sit on a near-black background
    pub fn is_dark(self) -> bool {
        matches!(
            self,
            ColourPalette::CoolMidnight
                | ColourPalette::Ocean
                | ColourPalette::Monochrome
                | ColourPalette::Lavender
                | ColourPalette::Slate
                | ColourPalette::Arctic
        )
    }

    /// Colour world phrase for the image prompt
    pub fn world(self) -> &'static str {
        match self {
            ColourPalette::WarmGold => "in a warm world of amber, gold, and honeyed light",
            ColourPalette::CoolMidnight => {
                "in a cool nocturnal world of deep blues, silvers, and moonlight"
            }
            ColourPalette::EarthTones => {
                "in rich earthy tones of umber, sienna, warm browns, and aged parchment"
            }
            ColourPalette::Ocean => "in deep oceanic teals, turquoise, and the shimmer of water",
            ColourPalette::Botanical => "in lush greens, sage, moss, and forest tones",
            ColourPalette::Monochrome => "in dramatic black, white, and silver with no colour",
            ColourPalette::Rose => "in soft pinks, dusty rose, blush, and gentle warmth",
            ColourPalette::Lavender => "in dreamy purples, soft violet, and twilight hues",
            ColourPalette::Sunset => {
                "in warm sunset oranges, burnt sienna, and the glow of golden hour"
            }
            ColourPalette::Slate => "in cool greys, steel blue, and the quiet tone of stone",
            ColourPalette::Copper => "in rich copper, warm bronze, and burnished metallic warmth",
            ColourPalette::Arctic => "in icy blues, frost white, and the crystalline cold of winter",
        }
    }

    /// Parse a palette id, falling back to warm gold for unknown ids
    pub fn from_id_lossy(id: &str) -> Self {
        id.parse().unwrap_or(ColourPalette::WarmGold)
    }
}

impl Default for ColourPalette {
    fn default() -> Self {
        ColourPalette::WarmGold
    }
}

impl fmt::Display for ColourPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ColourPalette {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ColourPalette::ALL
            .into_iter()
            .find(|p| p.id() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown palette: {}", s)))
    }
}

/// Rendering style requested from the image model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtStyle {
    Abstract,
    Botanical,
    Celestial,
    Geometric,
    Minimalist,
}

impl ArtStyle {
    pub const ALL: [ArtStyle; 5] = [
        ArtStyle::Abstract,
        ArtStyle::Botanical,
        ArtStyle::Celestial,
        ArtStyle::Geometric,
        ArtStyle::Minimalist,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ArtStyle::Abstract => "abstract",
            ArtStyle::Botanical => "botanical",
            ArtStyle::Celestial => "celestial",
            ArtStyle::Geometric => "geometric",
            ArtStyle::Minimalist => "minimalist",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ArtStyle::Abstract => "Abstract",
            ArtStyle::Botanical => "Botanical",
            ArtStyle::Celestial => "Celestial",
            ArtStyle::Geometric => "Geometric",
            ArtStyle::Minimalist => "Minimalist",
        }
    }

    /// One-line description shown in the style picker
    pub fn description(self) -> &'static str {
        match self {
            ArtStyle::Abstract => "Flowing forms, expressive brushwork",
            ArtStyle::Botanical => "Scientific art, living forms",
            ArtStyle::Celestial => "Starfields, nebulae, celestial light",
            ArtStyle::Geometric => "Sacred geometry, mathematical",
            ArtStyle::Minimalist => "Single element, negative space",
        }
    }

    /// How the image should be rendered
    pub fn render_phrase(self) -> &'static str {
        match self {
            ArtStyle::Abstract => "rendered as abstract fine art with flowing forms, expressive brushstrokes, and fluid organic shapes",
            ArtStyle::Botanical => "rendered as a rich botanical illustration with organic natural elements, leaves, flora, and living forms",
            ArtStyle::Celestial => "rendered with cosmic grandeur, starfields, nebulae, celestial light, and deep space wonder",
            ArtStyle::Geometric => "rendered with sacred geometry, clean precise lines, mathematical harmony, and golden ratio composition",
            ArtStyle::Minimalist => "rendered in ultra-minimalist style with a single powerful focal element, vast negative space, and refined simplicity",
        }
    }

    /// Parse a style id, falling back to abstract for unknown ids
    pub fn from_id_lossy(id: &str) -> Self {
        ArtStyle::ALL
            .into_iter()
            .find(|s| s.id() == id)
            .unwrap_or(ArtStyle::Abstract)
    }
}

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };

    /// Parse `#RRGGBB` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(Error::InvalidInput(format!("bad hex colour: {}", hex)));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| Error::InvalidInput(format!("bad hex colour: {}", hex)))
        };
        Ok(Rgb {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Composite `top` over `self` with the given alpha (0.0..=1.0)
    pub fn blend(self, top: Rgb, alpha: f32) -> Rgb {
        let a = alpha.clamp(0.0, 1.0);
        let mix = |bottom: u8, over: u8| -> u8 {
            (bottom as f32 * (1.0 - a) + over as f32 * a).round() as u8
        };
        Rgb {
            r: mix(self.r, top.r),
            g: mix(self.g, top.g),
            b: mix(self.b, top.b),
        }
    }

    /// Channels scaled to 0.0..=1.0
    pub fn unit(self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}
