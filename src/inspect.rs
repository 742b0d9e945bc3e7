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
use crate::image::ImageDescriptor;
use crate::pixel_format::MAX_NUMBER_OF_PLANES;

/// Options of [`almost_equal`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CompareOptions {
    /// Largest accepted absolute difference between two bytes
    pub eps: f64,
    /// Require identical pitches
    pub check_pitch: bool,
    /// Require both images to agree on plane contiguity
    pub check_contiguity: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        CompareOptions {
            eps: 1e-6,
            check_pitch: false,
            check_contiguity: false,
        }
    }
}

/// Compares two images byte by byte, within `options.eps`.
///
/// Sizes and pixel formats must match. Only the meaningful bytes of each row
/// are compared, so images with different padding compare equal unless
/// `options.check_pitch` is set. A plane populated in one image only makes
/// the images different.
///
/// # Examples
/// ```
/// use offscreen_primitives::{almost_equal, CompareOptions, ImageDescriptor, PixelFormat, Size};
///
/// let a = ImageDescriptor::create(PixelFormat::I420, Size::new(8, 8))?;
/// let b = ImageDescriptor::create_with_pitches(PixelFormat::I420, Size::new(8, 8), &[16, 8, 8])?;
/// assert!(almost_equal(&a, &b, &CompareOptions::default()));
///
/// let strict = CompareOptions { check_pitch: true, ..CompareOptions::default() };
/// assert!(!almost_equal(&a, &b, &strict));
/// # Ok::<(), offscreen_primitives::ErrorKind>(())
/// ```
pub fn almost_equal(a: &ImageDescriptor, b: &ImageDescriptor, options: &CompareOptions) -> bool {
    if a.size() != b.size() || a.format() != b.format() {
        return false;
    }

    if options.check_contiguity && a.are_planes_contiguous() != b.are_planes_contiguous() {
        return false;
    }

    (0..MAX_NUMBER_OF_PLANES).all(|index| {
        let (Ok(view_a), Ok(view_b)) = (a.plane_view(index), b.plane_view(index)) else {
            return false;
        };

        if view_a.width != view_b.width || view_a.height != view_b.height {
            return false;
        }

        if options.check_pitch && view_a.pitch != view_b.pitch {
            return false;
        }

        let (data_a, data_b) = match (a.plane(index), b.plane(index)) {
            (None, None) => return true,
            (Some(data_a), Some(data_b)) => (data_a, data_b),
            _ => return false,
        };

        let row_bytes = view_a.row_bytes();
        (0..view_a.height).all(|y| {
            let row_a = data_a.get(y * view_a.pitch..y * view_a.pitch + row_bytes);
            let row_b = data_b.get(y * view_b.pitch..y * view_b.pitch + row_bytes);
            match (row_a, row_b) {
                (Some(row_a), Some(row_b)) => row_a
                    .iter()
                    .zip(row_b)
                    .all(|(&lhs, &rhs)| (f64::from(lhs) - f64::from(rhs)).abs() <= options.eps),
                _ => false,
            }
        })
    })
}

/// Logs the metadata of an image at debug level, optionally tagged.
pub fn dump_meta(image: &ImageDescriptor, tag: Option<&str>) {
    let tag = tag.unwrap_or("image");
    tracing::debug!(
        tag,
        width = image.width(),
        height = image.height(),
        format = %image.format(),
        "{image}"
    );

    for index in 0..MAX_NUMBER_OF_PLANES {
        if let Ok(view) = image.plane_view(index) {
            if let Some(location) = view.location {
                tracing::debug!(
                    tag,
                    plane = index,
                    width = view.width,
                    height = view.height,
                    channels = view.channels,
                    pitch = view.pitch,
                    buffer = location.buffer,
                    offset = location.offset,
                    "plane"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Size;
    use crate::pixel_format::PixelFormat;

    #[test]
    fn tolerance_is_symmetric() {
        let size = Size::new(4, 2);
        let mut a = ImageDescriptor::create(PixelFormat::GRAY, size).unwrap();
        let mut b = a.clone();
        a.plane_mut(0).unwrap()[3] = 10;
        b.plane_mut(0).unwrap()[3] = 13;

        let loose = CompareOptions {
            eps: 3.0,
            ..CompareOptions::default()
        };
        let tight = CompareOptions {
            eps: 2.0,
            ..CompareOptions::default()
        };
        assert!(almost_equal(&a, &b, &loose));
        assert!(almost_equal(&b, &a, &loose));
        assert!(!almost_equal(&a, &b, &tight));
        assert!(!almost_equal(&b, &a, &tight));
    }

    #[test]
    fn padding_is_ignored() {
        let size = Size::new(4, 2);
        let mut a = ImageDescriptor::create(PixelFormat::GRAY, size).unwrap();
        let mut b = ImageDescriptor::create_with_pitches(PixelFormat::GRAY, size, &[6]).unwrap();
        a.plane_mut(0).unwrap().copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        b.plane_mut(0)
            .unwrap()
            .copy_from_slice(&[1, 2, 3, 4, 99, 99, 5, 6, 7, 8, 99, 99]);

        assert!(almost_equal(&a, &b, &CompareOptions::default()));
    }

    #[test]
    fn formats_must_match() {
        let size = Size::new(2, 2);
        let a = ImageDescriptor::create(PixelFormat::NV12, size).unwrap();
        let b = ImageDescriptor::create(PixelFormat::NV21, size).unwrap();
        assert!(!almost_equal(&a, &b, &CompareOptions::default()));
    }
}
