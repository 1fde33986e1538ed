//! Image format tags
//!
//! The compiler treats a format as an opaque, equality-comparable tag. The one semantic
//! distinction it needs is whether a format is depth/stencil or color. The tag values
//! follow `VkFormat` so that backends can map them without a lookup table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares the format enum together with its canonical names and raw `VkFormat` codes
macro_rules! image_formats {
    ($($variant:ident => ($name:literal, $raw:literal)),* $(,)?) => {
        /// Pixel format of a render target
        ///
        /// Serialized with the upper-case `VkFormat` spelling without the `VK_FORMAT_`
        /// prefix, e.g. `R8G8B8A8_UNORM` or `D32_SFLOAT`.
        #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum ImageFormat {
            /// No format was declared for the output
            #[default]
            #[serde(rename = "UNDEFINED")]
            Undefined,
            $(
                #[serde(rename = $name)]
                $variant,
            )*
        }

        impl ImageFormat {
            /// Every format tag, `Undefined` first
            pub const ALL: &'static [ImageFormat] = &[ImageFormat::Undefined, $(ImageFormat::$variant),*];

            /// Returns the canonical upper-case name of this format
            pub fn name(&self) -> &'static str {
                match self {
                    ImageFormat::Undefined => "UNDEFINED",
                    $(ImageFormat::$variant => $name,)*
                }
            }

            /// Returns the matching `VkFormat` value
            pub fn raw(&self) -> u32 {
                match self {
                    ImageFormat::Undefined => 0,
                    $(ImageFormat::$variant => $raw,)*
                }
            }
        }
    };
}

image_formats! {
    R8Unorm => ("R8_UNORM", 9),
    R8Snorm => ("R8_SNORM", 10),
    R8Uint => ("R8_UINT", 13),
    R8Sint => ("R8_SINT", 14),
    R8G8Unorm => ("R8G8_UNORM", 16),
    R8G8Snorm => ("R8G8_SNORM", 17),
    R8G8Uint => ("R8G8_UINT", 20),
    R8G8Sint => ("R8G8_SINT", 21),
    R8G8B8Unorm => ("R8G8B8_UNORM", 23),
    R8G8B8Snorm => ("R8G8B8_SNORM", 24),
    R8G8B8Uint => ("R8G8B8_UINT", 27),
    R8G8B8Sint => ("R8G8B8_SINT", 28),
    R8G8B8A8Unorm => ("R8G8B8A8_UNORM", 37),
    R8G8B8A8Snorm => ("R8G8B8A8_SNORM", 38),
    R8G8B8A8Uint => ("R8G8B8A8_UINT", 41),
    R8G8B8A8Sint => ("R8G8B8A8_SINT", 42),
    R16Unorm => ("R16_UNORM", 70),
    R16Snorm => ("R16_SNORM", 71),
    R16Uint => ("R16_UINT", 74),
    R16Sint => ("R16_SINT", 75),
    R16Sfloat => ("R16_SFLOAT", 76),
    R16G16Unorm => ("R16G16_UNORM", 77),
    R16G16Snorm => ("R16G16_SNORM", 78),
    R16G16Uint => ("R16G16_UINT", 81),
    R16G16Sint => ("R16G16_SINT", 82),
    R16G16Sfloat => ("R16G16_SFLOAT", 83),
    R16G16B16Unorm => ("R16G16B16_UNORM", 84),
    R16G16B16Snorm => ("R16G16B16_SNORM", 85),
    R16G16B16Uint => ("R16G16B16_UINT", 88),
    R16G16B16Sint => ("R16G16B16_SINT", 89),
    R16G16B16Sfloat => ("R16G16B16_SFLOAT", 90),
    R16G16B16A16Unorm => ("R16G16B16A16_UNORM", 91),
    R16G16B16A16Snorm => ("R16G16B16A16_SNORM", 92),
    R16G16B16A16Uint => ("R16G16B16A16_UINT", 95),
    R16G16B16A16Sint => ("R16G16B16A16_SINT", 96),
    R16G16B16A16Sfloat => ("R16G16B16A16_SFLOAT", 97),
    R32Uint => ("R32_UINT", 98),
    R32Sint => ("R32_SINT", 99),
    R32Sfloat => ("R32_SFLOAT", 100),
    R32G32Uint => ("R32G32_UINT", 101),
    R32G32Sint => ("R32G32_SINT", 102),
    R32G32Sfloat => ("R32G32_SFLOAT", 103),
    R32G32B32Uint => ("R32G32B32_UINT", 104),
    R32G32B32Sint => ("R32G32B32_SINT", 105),
    R32G32B32Sfloat => ("R32G32B32_SFLOAT", 106),
    R32G32B32A32Uint => ("R32G32B32A32_UINT", 107),
    R32G32B32A32Sint => ("R32G32B32A32_SINT", 108),
    R32G32B32A32Sfloat => ("R32G32B32A32_SFLOAT", 109),
    D32Sfloat => ("D32_SFLOAT", 126),
    D24UnormS8Uint => ("D24_UNORM_S8_UINT", 129),
    D32SfloatS8Uint => ("D32_SFLOAT_S8_UINT", 130),
}

/// Broad category of a format, used to group attachments into render targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FormatClass {
    /// Any color (or undefined) format
    Color,
    /// A depth or combined depth/stencil format
    DepthStencil,
}

impl ImageFormat {
    /// Returns true for depth and depth/stencil formats
    pub fn is_depth(&self) -> bool {
        matches!(self, ImageFormat::D32Sfloat | ImageFormat::D24UnormS8Uint | ImageFormat::D32SfloatS8Uint)
    }

    /// Classifies this format as color or depth/stencil
    pub fn class(&self) -> FormatClass {
        if self.is_depth() { FormatClass::DepthStencil } else { FormatClass::Color }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a format name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown image format '{0}'")]
pub struct UnknownFormatError(pub String);

impl FromStr for ImageFormat {
    type Err = UnknownFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("VK_FORMAT_").unwrap_or(upper.as_str());
        ImageFormat::ALL
            .iter()
            .copied()
            .find(|format| format.name() == name)
            .ok_or_else(|| UnknownFormatError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_classification() {
        let depth: Vec<_> = ImageFormat::ALL.iter().filter(|f| f.is_depth()).collect();
        assert_eq!(depth, vec![&ImageFormat::D32Sfloat, &ImageFormat::D24UnormS8Uint, &ImageFormat::D32SfloatS8Uint]);

        assert_eq!(ImageFormat::R8G8B8A8Unorm.class(), FormatClass::Color);
        assert_eq!(ImageFormat::Undefined.class(), FormatClass::Color);
        assert_eq!(ImageFormat::D24UnormS8Uint.class(), FormatClass::DepthStencil);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("R8G8B8A8_UNORM".parse::<ImageFormat>().unwrap(), ImageFormat::R8G8B8A8Unorm);
        assert_eq!("d32_sfloat".parse::<ImageFormat>().unwrap(), ImageFormat::D32Sfloat);
        assert_eq!("VK_FORMAT_R16G16_SFLOAT".parse::<ImageFormat>().unwrap(), ImageFormat::R16G16Sfloat);
        let err = "R5G6B5_UNORM_PACK16".parse::<ImageFormat>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown image format 'R5G6B5_UNORM_PACK16'");
    }

    #[test]
    fn test_names_and_raw_values_are_unique() {
        let mut names = std::collections::HashSet::new();
        let mut raws = std::collections::HashSet::new();
        for format in ImageFormat::ALL {
            assert!(names.insert(format.name()), "duplicate name {format}");
            assert!(raws.insert(format.raw()), "duplicate raw value for {format}");
        }
        assert_eq!(ImageFormat::R8G8B8A8Unorm.raw(), 37);
        assert_eq!(ImageFormat::default(), ImageFormat::Undefined);
    }

    #[test]
    fn test_serde_spelling() {
        let json = serde_json::to_string(&ImageFormat::D24UnormS8Uint).unwrap();
        assert_eq!(json, "\"D24_UNORM_S8_UINT\"");
        let parsed: ImageFormat = serde_json::from_str("\"R32G32B32A32_SFLOAT\"").unwrap();
        assert_eq!(parsed, ImageFormat::R32G32B32A32Sfloat);
    }
}
