// Copyright 2019 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

// Permission is hereby granted, free of charge, to any person obtaining a copy of this
// software and associated documentation files (the "Software"), to deal in the Software
// without restriction, including without limitation the rights to use, copy, modify,
// merge, publish, distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED,
// INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A
// PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT
// HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE
// SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
use core::fmt;
use std::collections::HashMap;
use std::sync::OnceLock;

pub const MAX_NUMBER_OF_PLANES: usize = 4;

/// An opaque pixel format identifier.
///
/// The numeric value is the one stored in the `format` field of an
/// [`Offscreen`](crate::c_api::Offscreen). Every value listed as an associated
/// constant is registered and has a canonical name; any other value is
/// carried through untouched but reported as `"unknown"`.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct PixelFormat(u32);

macro_rules! pixel_formats {
    ($($name:ident = $value:expr,)*) => {
        impl PixelFormat {
            $(
                #[doc = concat!("`", stringify!($name), "` pixel format.")]
                pub const $name: PixelFormat = PixelFormat($value);
            )*
        }

        const CATALOG: &[(PixelFormat, &str)] = &[
            $((PixelFormat::$name, concat!("ASVL_PAF_", stringify!($name))),)*
        ];
    };
}

pixel_formats! {
    RGB16_B5G6R5 = 0x101,
    RGB16_B5G5R5 = 0x102,
    RGB16_B4G4R4 = 0x103,
    RGB16_B5G5R5T = 0x104,
    RGB16_R5G6B5 = 0x105,
    RGB16_R5G5B5 = 0x106,
    RGB16_R4G4B4 = 0x107,
    RGB24_B8G8R8 = 0x201,
    RGB24_B6G6R6 = 0x202,
    RGB24_B6G6R6T = 0x203,
    RGB24_R8G8B8 = 0x204,
    RGB24_R6G6B6 = 0x205,
    RGB32_B8G8R8 = 0x301,
    RGB32_B8G8R8A8 = 0x302,
    RGB32_R8G8B8 = 0x303,
    RGB32_A8R8G8B8 = 0x304,
    RGB32_R8G8B8A8 = 0x305,
    YUV = 0x401,
    YVU = 0x402,
    UVY = 0x403,
    VUY = 0x404,
    YUYV = 0x501,
    YVYU = 0x502,
    UYVY = 0x503,
    VYUY = 0x504,
    YUYV2 = 0x505,
    YVYU2 = 0x506,
    UYVY2 = 0x507,
    VYUY2 = 0x508,
    YYUV = 0x509,
    I420 = 0x601,
    I422V = 0x602,
    I422H = 0x603,
    I444 = 0x604,
    YV12 = 0x605,
    YV16V = 0x606,
    YV16H = 0x607,
    YV24 = 0x608,
    GRAY = 0x701,
    NV12 = 0x801,
    NV21 = 0x802,
    LPI422H = 0x803,
    LPI422H2 = 0x804,
    NV41 = 0x805,
    NEG_UYVY = 0x1001,
    NEG_I420 = 0x1002,
    MONO_UYVY = 0x1003,
    MONO_I420 = 0x1004,
    P8_YUYV = 0xD01,
    SP16UNIT = 0xE01,
    DEPTH_U16 = 0xC01,
    DEPTH8_U16_MSB = 0xC02,
    DEPTH8_U16_LSB = 0xC03,
    DEPTH10_U16_MSB = 0xC04,
    DEPTH10_U16_LSB = 0xC05,
    DEPTH12_U16_MSB = 0xC06,
    DEPTH12_U16_LSB = 0xC07,
    DEPTH14_U16_MSB = 0xC08,
    DEPTH14_U16_LSB = 0xC09,
    DEPTH16_U16 = 0xC0A,
    DEPTH9_U16_MSB = 0xC0B,
    DEPTH9_U16_LSB = 0xC0C,
    DEPTH11_U16_MSB = 0xC0D,
    DEPTH11_U16_LSB = 0xC0E,
    DEPTH13_U16_MSB = 0xC0F,
    DEPTH13_U16_LSB = 0xC10,
    DEPTH15_U16_MSB = 0xC11,
    DEPTH15_U16_LSB = 0xC12,
    RAW10_RGGB_10B = 0xA01,
    RAW10_GRBG_10B = 0xA02,
    RAW10_GBRG_10B = 0xA03,
    RAW10_BGGR_10B = 0xA04,
    RAW12_RGGB_12B = 0xA05,
    RAW12_GRBG_12B = 0xA06,
    RAW12_GBRG_12B = 0xA07,
    RAW12_BGGR_12B = 0xA08,
    RAW10_RGGB_16B = 0xA09,
    RAW10_GRBG_16B = 0xA0A,
    RAW10_GBRG_16B = 0xA0B,
    RAW10_BGGR_16B = 0xA0C,
    RAW12_RGGB_16B = 0xA0D,
    RAW12_GRBG_16B = 0xA0E,
    RAW12_GBRG_16B = 0xA0F,
    RAW12_BGGR_16B = 0xA10,
    RAW16_RGGB_16B = 0xA11,
    RAW16_GRBG_16B = 0xA12,
    RAW16_GBRG_16B = 0xA13,
    RAW16_BGGR_16B = 0xA14,
    RAW14_RGGB_14B = 0xA15,
    RAW14_GRBG_14B = 0xA16,
    RAW14_GBRG_14B = 0xA17,
    RAW14_BGGR_14B = 0xA18,
    RAW14_RGGB_16B = 0xA19,
    RAW14_GRBG_16B = 0xA1A,
    RAW14_GBRG_16B = 0xA1B,
    RAW14_BGGR_16B = 0xA1C,
    RAW10_RGGB_16B_MSB = 0xA21,
    RAW10_GRBG_16B_MSB = 0xA22,
    RAW10_GBRG_16B_MSB = 0xA23,
    RAW10_BGGR_16B_MSB = 0xA24,
    RAW12_RGGB_16B_MSB = 0xA25,
    RAW12_GRBG_16B_MSB = 0xA26,
    RAW12_GBRG_16B_MSB = 0xA27,
    RAW12_BGGR_16B_MSB = 0xA28,
    RAW14_RGGB_16B_MSB = 0xA29,
    RAW14_GRBG_16B_MSB = 0xA2A,
    RAW14_GBRG_16B_MSB = 0xA2B,
    RAW14_BGGR_16B_MSB = 0xA2C,
    RAW10_RGGB_16B_LSB = 0xA31,
    RAW10_GRBG_16B_LSB = 0xA32,
    RAW10_GBRG_16B_LSB = 0xA33,
    RAW10_BGGR_16B_LSB = 0xA34,
    RAW12_RGGB_16B_LSB = 0xA35,
    RAW12_GRBG_16B_LSB = 0xA36,
    RAW12_GBRG_16B_LSB = 0xA37,
    RAW12_BGGR_16B_LSB = 0xA38,
    RAW14_RGGB_16B_LSB = 0xA39,
    RAW14_GRBG_16B_LSB = 0xA3A,
    RAW14_GBRG_16B_LSB = 0xA3B,
    RAW14_BGGR_16B_LSB = 0xA3C,
    RAW8_RGGB_8B = 0xA41,
    RAW8_GRBG_8B = 0xA42,
    RAW8_GBRG_8B = 0xA43,
    RAW8_BGGR_8B = 0xA44,
    RAW8_RGGB_16B_LSB = 0xA45,
    RAW8_GRBG_16B_LSB = 0xA46,
    RAW8_GBRG_16B_LSB = 0xA47,
    RAW8_BGGR_16B_LSB = 0xA48,
    RAW8_RGGB_16B_MSB = 0xA49,
    RAW8_GRBG_16B_MSB = 0xA4A,
    RAW8_GBRG_16B_MSB = 0xA4B,
    RAW8_BGGR_16B_MSB = 0xA4C,
    RAW10_GRAY_10B = 0xA81,
    RAW12_GRAY_12B = 0xA82,
    RAW14_GRAY_14B = 0xA83,
    RAW16_GRAY_16B = 0xA84,
    RAW10_GRAY_16B = 0xA91,
    RAW10_GRAY_16B_MSB = 0xA92,
    RAW10_GRAY_16B_LSB = 0xA93,
    RAW11_GRAY_16B = 0xA94,
    RAW11_GRAY_16B_MSB = 0xA95,
    RAW11_GRAY_16B_LSB = 0xA96,
    RAW12_GRAY_16B = 0xA97,
    RAW12_GRAY_16B_MSB = 0xA98,
    RAW12_GRAY_16B_LSB = 0xA99,
    RAW13_GRAY_16B = 0xA9A,
    RAW13_GRAY_16B_MSB = 0xA9B,
    RAW13_GRAY_16B_LSB = 0xA9C,
    RAW14_GRAY_16B = 0xA9D,
    RAW14_GRAY_16B_MSB = 0xA9E,
    RAW14_GRAY_16B_LSB = 0xA9F,
    RAW15_GRAY_16B = 0xAA0,
    RAW15_GRAY_16B_MSB = 0xAA1,
    RAW15_GRAY_16B_LSB = 0xAA2,
    P010_MSB = 0xB01,
    P010_LSB = 0xB02,
    P012_MSB = 0xB03,
    P012_LSB = 0xB04,
    P014_MSB = 0xB05,
    P014_LSB = 0xB06,
    NV21_TP10 = 0xB11,
    NV12_TP10 = 0xB12,
    UBWC_TP10 = 0xB13,
    UBWC_NV12 = 0xB14,
    QUADRAW8_RGGB_8B = 0xF01,
    QUADRAW8_GRBG_8B = 0xF02,
    QUADRAW8_GBRG_8B = 0xF03,
    QUADRAW8_BGGR_8B = 0xF04,
    QUADRAW8_RGGB_16B_LSB = 0xF05,
    QUADRAW8_GRBG_16B_LSB = 0xF06,
    QUADRAW8_GBRG_16B_LSB = 0xF07,
    QUADRAW8_BGGR_16B_LSB = 0xF08,
    QUADRAW8_RGGB_16B_MSB = 0xF09,
    QUADRAW8_GRBG_16B_MSB = 0xF0A,
    QUADRAW8_GBRG_16B_MSB = 0xF0B,
    QUADRAW8_BGGR_16B_MSB = 0xF0C,
    QUADRAW10_RGGB_10B = 0xF11,
    QUADRAW10_GRBG_10B = 0xF12,
    QUADRAW10_GBRG_10B = 0xF13,
    QUADRAW10_BGGR_10B = 0xF14,
    QUADRAW10_RGGB_16B_LSB = 0xF15,
    QUADRAW10_GRBG_16B_LSB = 0xF16,
    QUADRAW10_GBRG_16B_LSB = 0xF17,
    QUADRAW10_BGGR_16B_LSB = 0xF18,
    QUADRAW10_RGGB_16B_MSB = 0xF19,
    QUADRAW10_GRBG_16B_MSB = 0xF1A,
    QUADRAW10_GBRG_16B_MSB = 0xF1B,
    QUADRAW10_BGGR_16B_MSB = 0xF1C,
    QUADRAW12_RGGB_12B = 0xF21,
    QUADRAW12_GRBG_12B = 0xF22,
    QUADRAW12_GBRG_12B = 0xF23,
    QUADRAW12_BGGR_12B = 0xF24,
    QUADRAW12_RGGB_16B_LSB = 0xF25,
    QUADRAW12_GRBG_16B_LSB = 0xF26,
    QUADRAW12_GBRG_16B_LSB = 0xF27,
    QUADRAW12_BGGR_16B_LSB = 0xF28,
    QUADRAW12_RGGB_16B_MSB = 0xF29,
    QUADRAW12_GRBG_16B_MSB = 0xF2A,
    QUADRAW12_GBRG_16B_MSB = 0xF2B,
    QUADRAW12_BGGR_16B_MSB = 0xF2C,
    QUADRAW14_RGGB_14B = 0xF31,
    QUADRAW14_GRBG_14B = 0xF32,
    QUADRAW14_GBRG_14B = 0xF33,
    QUADRAW14_BGGR_14B = 0xF34,
    QUADRAW14_RGGB_16B_LSB = 0xF35,
    QUADRAW14_GRBG_16B_LSB = 0xF36,
    QUADRAW14_GBRG_16B_LSB = 0xF37,
    QUADRAW14_BGGR_16B_LSB = 0xF38,
    QUADRAW14_RGGB_16B_MSB = 0xF39,
    QUADRAW14_GRBG_16B_MSB = 0xF3A,
    QUADRAW14_GBRG_16B_MSB = 0xF3B,
    QUADRAW14_BGGR_16B_MSB = 0xF3C,
    QUADRAW16_RGGB_16B = 0xF41,
    QUADRAW16_GRBG_16B = 0xF42,
    QUADRAW16_GBRG_16B = 0xF43,
    QUADRAW16_BGGR_16B = 0xF44,
    RGB_B8G8R8_48B_LSB = 0x1101,
    RGB_B8G8R8_48B_MSB = 0x1102,
    RGB_B10G10R10_30B = 0x1103,
    RGB_B10G10R10_48B_LSB = 0x1104,
    RGB_B10G10R10_48B_MSB = 0x1105,
    RGB_B12G12R12_36B = 0x1106,
    RGB_B12G12R12_48B_LSB = 0x1107,
    RGB_B12G12R12_48B_MSB = 0x1108,
    RGB_B14G14R14_42B = 0x1109,
    RGB_B14G14R14_48B_LSB = 0x110A,
    RGB_B14G14R14_48B_MSB = 0x110B,
    RGB_B16G16R16_48B = 0x110C,
    RGB_R8G8B8_48B_LSB = 0x1111,
    RGB_R8G8B8_48B_MSB = 0x1112,
    RGB_R10G10B10_30B = 0x1113,
    RGB_R10G10B10_48B_LSB = 0x1114,
    RGB_R10G10B10_48B_MSB = 0x1115,
    RGB_R12G12B12_36B = 0x1116,
    RGB_R12G12B12_48B_LSB = 0x1117,
    RGB_R12G12B12_48B_MSB = 0x1118,
    RGB_R14G14B14_42B = 0x1119,
    RGB_R14G14B14_48B_LSB = 0x111A,
    RGB_R14G14B14_48B_MSB = 0x111B,
    RGB_R16G16B16_48B = 0x111C,
}

impl PixelFormat {
    /// Sentinel returned when a format cannot be resolved. It is never registered.
    pub const UNKNOWN: PixelFormat = PixelFormat(0x001);

    /// Packed RGB, 24 bits per pixel, red first. Same as [`PixelFormat::RGB24_R8G8B8`].
    pub const RGB24: PixelFormat = PixelFormat::RGB24_R8G8B8;
    /// Packed RGB, 24 bits per pixel, blue first. Same as [`PixelFormat::RGB24_B8G8R8`].
    pub const BGR24: PixelFormat = PixelFormat::RGB24_B8G8R8;
    /// Packed RGB with alpha last, red first. Same as [`PixelFormat::RGB32_R8G8B8A8`].
    pub const RGBA32: PixelFormat = PixelFormat::RGB32_R8G8B8A8;
    /// Packed RGB with alpha last, blue first. Same as [`PixelFormat::RGB32_B8G8R8A8`].
    pub const BGRA32: PixelFormat = PixelFormat::RGB32_B8G8R8A8;

    /// Wraps a raw identifier, registered or not.
    pub const fn from_raw(value: u32) -> Self {
        PixelFormat(value)
    }

    /// Returns the raw identifier.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the canonical name of the format, or `"unknown"` if it is not registered.
    ///
    /// Canonical names carry the `ASVL_PAF_` prefix of the C headers.
    ///
    /// # Examples
    /// ```
    /// use offscreen_primitives::PixelFormat;
    /// assert_eq!(PixelFormat::NV21.name(), "ASVL_PAF_NV21");
    /// assert_eq!(PixelFormat::from_raw(0xdead).name(), "unknown");
    /// ```
    pub fn name(self) -> &'static str {
        registry().get(&self).copied().unwrap_or("unknown")
    }

    /// Returns true if the identifier belongs to the catalog.
    pub fn is_registered(self) -> bool {
        registry().contains_key(&self)
    }

    /// Iterates over every registered format, in catalog order.
    pub fn all() -> impl Iterator<Item = PixelFormat> {
        CATALOG.iter().map(|&(format, _)| format)
    }
}

fn registry() -> &'static HashMap<PixelFormat, &'static str> {
    static INSTANCE: OnceLock<HashMap<PixelFormat, &'static str>> = OnceLock::new();
    INSTANCE.get_or_init(|| CATALOG.iter().copied().collect())
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}({:#x})", self.name(), self.0)
    }
}

/// Shape of one plane relative to the image size.
#[derive(Copy, Clone, Debug)]
pub(crate) struct PlaneRule {
    pub channels: usize,
    pub width_shift: u32,
    pub height_shift: u32,
}

/// Plane rules of a format plus the pixel block a conversion must not split.
pub(crate) struct FormatLayout {
    pub planes: &'static [PlaneRule],
    pub block_width: u32,
    pub block_height: u32,
}

const fn plane(channels: usize, width_shift: u32, height_shift: u32) -> PlaneRule {
    PlaneRule {
        channels,
        width_shift,
        height_shift,
    }
}

const RGB24_LAYOUT: FormatLayout = FormatLayout {
    planes: &[plane(3, 0, 0)],
    block_width: 1,
    block_height: 1,
};

const RGB32_LAYOUT: FormatLayout = FormatLayout {
    planes: &[plane(4, 0, 0)],
    block_width: 1,
    block_height: 1,
};

const GRAY_LAYOUT: FormatLayout = FormatLayout {
    planes: &[plane(1, 0, 0)],
    block_width: 1,
    block_height: 1,
};

const SEMI_PLANAR_LAYOUT: FormatLayout = FormatLayout {
    planes: &[plane(1, 0, 0), plane(2, 1, 1)],
    block_width: 2,
    block_height: 2,
};

const I420_LAYOUT: FormatLayout = FormatLayout {
    planes: &[plane(1, 0, 0), plane(1, 1, 1), plane(1, 1, 1)],
    block_width: 2,
    block_height: 2,
};

const I444_LAYOUT: FormatLayout = FormatLayout {
    planes: &[plane(1, 0, 0), plane(1, 0, 0), plane(1, 0, 0)],
    block_width: 1,
    block_height: 1,
};

const UYVY_LAYOUT: FormatLayout = FormatLayout {
    planes: &[plane(2, 0, 0)],
    block_width: 2,
    block_height: 1,
};

/// Returns the plane layout of the formats this crate knows how to lay out.
pub(crate) fn layout(format: PixelFormat) -> Option<&'static FormatLayout> {
    match format {
        PixelFormat::RGB24_B8G8R8 | PixelFormat::RGB24_R8G8B8 => Some(&RGB24_LAYOUT),
        PixelFormat::RGB32_B8G8R8A8 | PixelFormat::RGB32_R8G8B8A8 => Some(&RGB32_LAYOUT),
        PixelFormat::GRAY => Some(&GRAY_LAYOUT),
        PixelFormat::NV12 | PixelFormat::NV21 => Some(&SEMI_PLANAR_LAYOUT),
        PixelFormat::I420 => Some(&I420_LAYOUT),
        PixelFormat::I444 => Some(&I444_LAYOUT),
        PixelFormat::UYVY => Some(&UYVY_LAYOUT),
        _ => None,
    }
}

/// Returns which of the four plane slots a well formed image of `format` populates.
///
/// Formats without a known layout yield no active plane.
pub fn expected_active_planes(format: PixelFormat) -> [bool; MAX_NUMBER_OF_PLANES] {
    let mut active = [false; MAX_NUMBER_OF_PLANES];
    match layout(format) {
        Some(layout) => {
            for slot in active.iter_mut().take(layout.planes.len()) {
                *slot = true;
            }
        }
        None => tracing::warn!(format = %format, "no plane layout for pixel format"),
    }

    active
}

/// Returns true if an image of the given size can be converted from or to `format`
/// without splitting a chroma block.
pub(crate) fn is_compatible(format: PixelFormat, width: u32, height: u32) -> bool {
    layout(format).is_some_and(|layout| {
        width % layout.block_width == 0 && height % layout.block_height == 0
    })
}

const EXTENSIONS: &[(PixelFormat, &str)] = &[
    (PixelFormat::NV12, "NV12"),
    (PixelFormat::NV21, "NV21"),
    (PixelFormat::I420, "I420"),
    (PixelFormat::UYVY, "UYVY"),
    (PixelFormat::RGB24_B8G8R8, "BGR24"),
    (PixelFormat::RGB24_R8G8B8, "RGB24"),
    (PixelFormat::RGB32_B8G8R8A8, "BGRA32"),
    (PixelFormat::RGB32_R8G8B8A8, "RGBA32"),
    (PixelFormat::I444, "I444"),
];

// Accepted when parsing, never produced.
const EXTENSION_ALIASES: &[(PixelFormat, &str)] = &[
    (PixelFormat::RGB32_R8G8B8A8, "RGB32"),
    (PixelFormat::RGB32_B8G8R8A8, "BGR32"),
];

/// Returns the file extension used to persist images of `format`.
///
/// Only a handful of formats round-trip through files; `None` is returned
/// for the others.
pub fn extension_of(format: PixelFormat) -> Option<&'static str> {
    let extension = EXTENSIONS
        .iter()
        .find(|&&(candidate, _)| candidate == format)
        .map(|&(_, extension)| extension);

    if extension.is_none() {
        tracing::warn!(format = %format, "pixel format has no file extension");
    }

    extension
}

/// Resolves a file extension, ignoring its case.
///
/// Unknown extensions resolve to [`PixelFormat::UNKNOWN`].
///
/// # Examples
/// ```
/// use offscreen_primitives::{format_from_extension, PixelFormat};
/// assert_eq!(format_from_extension("nv12"), PixelFormat::NV12);
/// assert_eq!(format_from_extension("RGB32"), PixelFormat::RGBA32);
/// assert_eq!(format_from_extension("png"), PixelFormat::UNKNOWN);
/// ```
pub fn format_from_extension(extension: &str) -> PixelFormat {
    let wanted = extension.to_ascii_uppercase();
    EXTENSIONS
        .iter()
        .chain(EXTENSION_ALIASES)
        .find(|&&(_, candidate)| candidate == wanted)
        .map_or_else(
            || {
                tracing::warn!(extension, "unknown image file extension");
                PixelFormat::UNKNOWN
            },
            |&(format, _)| format,
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_values_are_unique() {
        assert_eq!(registry().len(), CATALOG.len());
        assert!(!PixelFormat::UNKNOWN.is_registered());
    }

    #[test]
    fn extensions_round_trip() {
        for &(format, extension) in EXTENSIONS {
            assert_eq!(extension_of(format), Some(extension));
            assert_eq!(format_from_extension(extension), format);
            assert_eq!(format_from_extension(&extension.to_lowercase()), format);
        }
    }

    #[test]
    fn layouts_have_at_most_four_planes() {
        for format in PixelFormat::all() {
            if let Some(layout) = layout(format) {
                assert!(layout.planes.len() <= MAX_NUMBER_OF_PLANES);
            }
        }
    }
}
