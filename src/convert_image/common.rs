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

// Forward weights, applied in floating point and truncated.
pub const XR: f64 = 0.257;
pub const XG: f64 = 0.504;
pub const XB: f64 = 0.098;
pub const YR: f64 = -0.148;
pub const YG: f64 = -0.291;
pub const YB: f64 = 0.439;
pub const ZR: f64 = 0.439;
pub const ZG: f64 = -0.368;
pub const ZB: f64 = -0.071;

// Backward weights, fixed point 12.20
pub const FIX20: i32 = 20;
pub const FIX20_HALF: i32 = 1 << (FIX20 - 1);
pub const CY: i32 = 1_220_542;
pub const CUB: i32 = 2_116_026;
pub const CUG: i32 = -409_993;
pub const CVG: i32 = -852_492;
pub const CVR: i32 = 1_673_527;

pub const Y_MIN: i32 = 16;
pub const C_HALF: i32 = 128;

/// Channel order of a packed 24-bit rgb pixel.
#[derive(Copy, Clone)]
pub enum Sampler {
    Rgb,
    Bgr,
}

impl Sampler {
    /// Byte offsets of red, green and blue inside a pixel.
    pub const fn offsets(self) -> [usize; 3] {
        match self {
            Sampler::Rgb => [0, 1, 2],
            Sampler::Bgr => [2, 1, 0],
        }
    }
}

pub fn wg_index(x: usize, y: usize, w: usize, h: usize) -> usize {
    (h * y) + (x * w)
}

/// Minimum number of bytes a plane of `line_count` rows needs.
pub fn plane_len(stride: usize, line_count: usize, row_bytes: usize) -> Option<usize> {
    if line_count == 0 {
        return Some(0);
    }

    stride.checked_mul(line_count - 1)?.checked_add(row_bytes)
}

/// Returns true if every `(buffer, stride, line_count, row_bytes)` entry fits its buffer.
pub fn planes_fit(planes: &[(&[u8], usize, usize, usize)]) -> bool {
    planes
        .iter()
        .all(|&(buffer, stride, line_count, row_bytes)| {
            stride >= row_bytes
                && plane_len(stride, line_count, row_bytes).is_some_and(|len| len <= buffer.len())
        })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn f64_to_u8_sat(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn fix_to_u8_sat(fix: i32) -> u8 {
    (fix >> FIX20).clamp(0, 255) as u8
}

/// Luma of an rgb triple.
pub fn rgb_to_y(r: u8, g: u8, b: u8) -> u8 {
    let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
    f64_to_u8_sat(XR * r + XG * g + XB * b + f64::from(Y_MIN))
}

/// Chroma (u, v) of an rgb triple.
pub fn rgb_to_uv(r: u8, g: u8, b: u8) -> (u8, u8) {
    let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
    let c_half = f64::from(C_HALF);
    (
        f64_to_u8_sat(YR * r + YG * g + YB * b + c_half),
        f64_to_u8_sat(ZR * r + ZG * g + ZB * b + c_half),
    )
}

/// Chroma terms shared by every pixel of a chroma block, as (red, green, blue) offsets.
pub fn uv_terms(u: u8, v: u8) -> (i32, i32, i32) {
    let u = i32::from(u) - C_HALF;
    let v = i32::from(v) - C_HALF;
    (
        FIX20_HALF + CVR * v,
        FIX20_HALF + CVG * v + CUG * u,
        FIX20_HALF + CUB * u,
    )
}

/// Rgb triple of a luma sample given the chroma terms of its block.
pub fn yuv_to_rgb(y: u8, (ruv, guv, buv): (i32, i32, i32)) -> (u8, u8, u8) {
    let l = (i32::from(y) - Y_MIN).max(0) * CY;
    (
        fix_to_u8_sat(l + ruv),
        fix_to_u8_sat(l + guv),
        fix_to_u8_sat(l + buv),
    )
}
