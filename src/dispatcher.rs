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
use crate::pixel_format::PixelFormat;
use crate::static_assert::static_assert;

// Formats that take part in at least one conversion, in table order.
const CONVERTIBLE: [PixelFormat; 9] = [
    PixelFormat::RGB24_B8G8R8,
    PixelFormat::RGB24_R8G8B8,
    PixelFormat::RGB32_B8G8R8A8,
    PixelFormat::RGB32_R8G8B8A8,
    PixelFormat::NV12,
    PixelFormat::NV21,
    PixelFormat::I420,
    PixelFormat::UYVY,
    PixelFormat::I444,
];

const fn upper_power_of_two(x: u32) -> u32 {
    1 << (32 - (x - 1).leading_zeros())
}

#[allow(clippy::cast_possible_truncation)]
const ROWS: u32 = CONVERTIBLE.len() as u32;
const COLUMNS: u32 = upper_power_of_two(ROWS);
static_assert!(COLUMNS >= ROWS);

pub const TABLE_SIZE: usize = (ROWS * COLUMNS) as usize;

#[allow(clippy::cast_possible_truncation)]
pub fn get_image_index(format: PixelFormat) -> Option<u32> {
    CONVERTIBLE
        .iter()
        .position(|&candidate| candidate == format)
        .map(|index| index as u32)
}

pub fn get_index(src_index: u32, dst_index: u32) -> usize {
    (src_index * COLUMNS + dst_index) as usize
}

/// Slot of the `(src, dst)` converter, if both formats are convertible.
pub fn index_of(src: PixelFormat, dst: PixelFormat) -> Option<usize> {
    Some(get_index(get_image_index(src)?, get_image_index(dst)?))
}
