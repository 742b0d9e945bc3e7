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
use crate::pixel_format::{expected_active_planes, layout, PixelFormat, MAX_NUMBER_OF_PLANES};
use crate::ErrorKind;
use core::fmt;

/// Image dimensions, in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Size {
    /// Creates a size.
    pub const fn new(width: u32, height: u32) -> Self {
        Size { width, height }
    }
}

/// Where the bytes of a plane live: one of the buffers owned by the descriptor,
/// at a byte offset.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlaneLocation {
    /// Index of the backing buffer
    pub buffer: usize,
    /// Offset of the first byte of the plane inside the backing buffer
    pub offset: usize,
}

/// Geometry of one plane, derived from the descriptor and its pixel format.
///
/// Slots the format does not use, and formats without a known layout, yield
/// the zero view.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaneView {
    /// Width of the plane in samples
    pub width: usize,
    /// Height of the plane in rows
    pub height: usize,
    /// Bytes per sample
    pub channels: usize,
    /// Distance in bytes between the starts of two consecutive rows
    pub pitch: usize,
    /// Location of the plane data, if the plane is populated
    pub location: Option<PlaneLocation>,
}

impl PlaneView {
    /// Number of meaningful bytes in a row.
    pub fn row_bytes(&self) -> usize {
        self.width * self.channels
    }

    /// Number of bytes the plane occupies, padding included.
    pub fn buffer_size(&self) -> usize {
        self.height * self.pitch
    }
}

/// A multi-plane image: size, pixel format, per-plane pitch and data location.
///
/// The descriptor owns every buffer its planes point into. Images built with
/// [`ImageDescriptor::create`] keep all planes back to back in one buffer;
/// header-only images start without data and receive it through
/// [`ImageDescriptor::bind_plane`].
///
/// # Examples
/// ```
/// use offscreen_primitives::{ImageDescriptor, PixelFormat, Size};
///
/// let image = ImageDescriptor::create(PixelFormat::NV21, Size::new(64, 48))?;
/// assert!(image.validate());
/// assert!(image.are_planes_contiguous());
/// assert_eq!(image.plane(1).map(<[u8]>::len), Some(64 * 24));
/// # Ok::<(), offscreen_primitives::ErrorKind>(())
/// ```
#[derive(Clone, Debug)]
pub struct ImageDescriptor {
    size: Size,
    format: PixelFormat,
    pitches: [usize; MAX_NUMBER_OF_PLANES],
    locations: [Option<PlaneLocation>; MAX_NUMBER_OF_PLANES],
    buffers: Vec<Vec<u8>>,
}

impl ImageDescriptor {
    /// Creates an image with canonical pitches and zeroed pixel data.
    ///
    /// All planes are carved, in ascending order, out of one allocation. The
    /// first plane whose buffer size is zero stops the assignment: it and the
    /// following planes stay unpopulated.
    ///
    /// # Errors
    ///
    /// * [`UnsupportedFormat`] if `format` is not registered
    /// * [`InvalidValue`] if the total size does not fit in memory
    ///
    /// [`UnsupportedFormat`]: ./enum.ErrorKind.html#variant.UnsupportedFormat
    /// [`InvalidValue`]: ./enum.ErrorKind.html#variant.InvalidValue
    pub fn create(format: PixelFormat, size: Size) -> Result<Self, ErrorKind> {
        let mut image = Self::create_header_only(format, size)?;
        image.allocate_planes()?;
        Ok(image)
    }

    /// Like [`ImageDescriptor::create`], with caller chosen pitches.
    ///
    /// A zero pitch, or a missing entry, selects the canonical pitch of the plane.
    /// Entries past the planes of `format` are ignored.
    ///
    /// # Errors
    ///
    /// Same as [`ImageDescriptor::create`].
    pub fn create_with_pitches(
        format: PixelFormat,
        size: Size,
        pitches: &[usize],
    ) -> Result<Self, ErrorKind> {
        let mut image = Self::create_header_only(format, size)?;
        let plane_count = layout(format).map_or(0, |layout| layout.planes.len());
        for (pitch, &requested) in image.pitches.iter_mut().zip(pitches).take(plane_count) {
            if requested != 0 {
                *pitch = requested;
            }
        }

        image.allocate_planes()?;
        Ok(image)
    }

    /// Creates an image with canonical pitches and no pixel data.
    ///
    /// # Errors
    ///
    /// * [`UnsupportedFormat`] if `format` is not registered
    ///
    /// [`UnsupportedFormat`]: ./enum.ErrorKind.html#variant.UnsupportedFormat
    pub fn create_header_only(format: PixelFormat, size: Size) -> Result<Self, ErrorKind> {
        if !format.is_registered() {
            tracing::error!(format = format.raw(), "cannot create image of unregistered pixel format");
            return Err(ErrorKind::UnsupportedFormat(format));
        }

        let mut image = ImageDescriptor {
            size,
            format,
            pitches: [0; MAX_NUMBER_OF_PLANES],
            locations: [None; MAX_NUMBER_OF_PLANES],
            buffers: Vec::new(),
        };
        image.canonicalize_pitch();

        Ok(image)
    }

    /// Shorthand for [`ImageDescriptor::create`] with [`PixelFormat::NV21`].
    ///
    /// # Errors
    ///
    /// Same as [`ImageDescriptor::create`].
    pub fn create_nv21(size: Size) -> Result<Self, ErrorKind> {
        Self::create(PixelFormat::NV21, size)
    }

    /// Shorthand for [`ImageDescriptor::create`] with [`PixelFormat::NV12`].
    ///
    /// # Errors
    ///
    /// Same as [`ImageDescriptor::create`].
    pub fn create_nv12(size: Size) -> Result<Self, ErrorKind> {
        Self::create(PixelFormat::NV12, size)
    }

    /// Creates a packed rgb image, red first.
    ///
    /// # Errors
    ///
    /// Same as [`ImageDescriptor::create`].
    pub fn create_rgb(size: Size) -> Result<Self, ErrorKind> {
        Self::create(PixelFormat::RGB24, size)
    }

    /// Creates a packed rgb image, blue first.
    ///
    /// # Errors
    ///
    /// Same as [`ImageDescriptor::create`].
    pub fn create_bgr(size: Size) -> Result<Self, ErrorKind> {
        Self::create(PixelFormat::BGR24, size)
    }

    /// Creates a packed rgba image, red first.
    ///
    /// # Errors
    ///
    /// Same as [`ImageDescriptor::create`].
    pub fn create_rgba(size: Size) -> Result<Self, ErrorKind> {
        Self::create(PixelFormat::RGBA32, size)
    }

    /// Creates a packed bgra image.
    ///
    /// # Errors
    ///
    /// Same as [`ImageDescriptor::create`].
    pub fn create_bgra(size: Size) -> Result<Self, ErrorKind> {
        Self::create(PixelFormat::BGRA32, size)
    }

    /// Creates a single plane 8 bit gray image.
    ///
    /// # Errors
    ///
    /// Same as [`ImageDescriptor::create`].
    pub fn create_gray(size: Size) -> Result<Self, ErrorKind> {
        Self::create(PixelFormat::GRAY, size)
    }

    /// Releases the image and every buffer it owns.
    #[allow(clippy::needless_pass_by_value)]
    pub fn destroy(self) {
        tracing::trace!(image = %self, "destroying image");
    }

    fn allocate_planes(&mut self) -> Result<(), ErrorKind> {
        let mut sizes = [0usize; MAX_NUMBER_OF_PLANES];
        for (index, size) in sizes.iter_mut().enumerate() {
            let view = self.view(index);
            *size = view
                .height
                .checked_mul(view.pitch)
                .ok_or(ErrorKind::InvalidValue)?;
        }

        let total = sizes
            .iter()
            .try_fold(0usize, |total, &size| total.checked_add(size))
            .ok_or(ErrorKind::InvalidValue)?;

        let buffer = self.buffers.len();
        self.buffers.push(vec![0; total]);

        let mut offset = 0;
        for (index, &size) in sizes.iter().enumerate() {
            if size == 0 {
                break;
            }

            self.locations[index] = Some(PlaneLocation { buffer, offset });
            offset += size;
        }

        Ok(())
    }

    /// Image size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Image width, in pixels.
    pub fn width(&self) -> u32 {
        self.size.width
    }

    /// Image height, in pixels.
    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// Pixel format.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Pitches of the four plane slots.
    pub fn pitches(&self) -> [usize; MAX_NUMBER_OF_PLANES] {
        self.pitches
    }

    /// Data locations of the four plane slots.
    pub fn locations(&self) -> [Option<PlaneLocation>; MAX_NUMBER_OF_PLANES] {
        self.locations
    }

    /// Number of backing buffers owned by the image.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    fn view(&self, index: usize) -> PlaneView {
        let Some(rule) = layout(self.format).and_then(|layout| layout.planes.get(index)) else {
            return PlaneView::default();
        };

        PlaneView {
            width: (self.size.width >> rule.width_shift) as usize,
            height: (self.size.height >> rule.height_shift) as usize,
            channels: rule.channels,
            pitch: self.pitches[index],
            location: self.locations[index],
        }
    }

    /// Geometry of plane `index`.
    ///
    /// # Errors
    ///
    /// * [`InvalidPlaneIndex`] if `index` is not in `0..4`
    ///
    /// [`InvalidPlaneIndex`]: ./enum.ErrorKind.html#variant.InvalidPlaneIndex
    pub fn plane_view(&self, index: usize) -> Result<PlaneView, ErrorKind> {
        if index >= MAX_NUMBER_OF_PLANES {
            return Err(ErrorKind::InvalidPlaneIndex(index));
        }

        if layout(self.format).is_none() {
            tracing::warn!(format = %self.format, "no plane layout for pixel format");
        }

        Ok(self.view(index))
    }

    /// Resets every pitch to `channels * width` of its plane.
    pub fn canonicalize_pitch(&mut self) {
        for index in 0..MAX_NUMBER_OF_PLANES {
            self.pitches[index] = self.view(index).row_bytes();
        }
    }

    /// Bytes of plane `index`, padding included, or `None` if the plane is not populated.
    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        let location = (*self.locations.get(index)?)?;
        let buffer = self.buffers.get(location.buffer)?;
        let end = location
            .offset
            .saturating_add(self.view(index).buffer_size())
            .min(buffer.len());

        buffer.get(location.offset..end)
    }

    /// Mutable counterpart of [`ImageDescriptor::plane`].
    pub fn plane_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        let mut planes = self.planes_mut();
        planes.get_mut(index)?.take()
    }

    /// Mutable bytes of every plane slot at once.
    ///
    /// Planes sharing a backing buffer are split so that they never overlap;
    /// a plane running into the next one is truncated at its start.
    pub fn planes_mut(&mut self) -> [Option<&mut [u8]>; MAX_NUMBER_OF_PLANES] {
        let mut ranges: Vec<(usize, usize, usize, usize)> = (0..MAX_NUMBER_OF_PLANES)
            .filter_map(|index| {
                let location = self.locations[index]?;
                let size = self.view(index).buffer_size();
                Some((location.buffer, location.offset, size, index))
            })
            .collect();
        ranges.sort_unstable();

        let mut planes: [Option<&mut [u8]>; MAX_NUMBER_OF_PLANES] = Default::default();
        for (buffer_index, buffer) in self.buffers.iter_mut().enumerate() {
            let in_buffer: Vec<_> = ranges
                .iter()
                .filter(|range| range.0 == buffer_index)
                .collect();

            let mut rest: &mut [u8] = buffer.as_mut_slice();
            let mut consumed = 0;
            for (position, &&(_, offset, size, index)) in in_buffer.iter().enumerate() {
                if offset < consumed || offset - consumed > rest.len() {
                    continue;
                }

                let limit = in_buffer
                    .get(position + 1)
                    .map_or(usize::MAX, |next| next.1);
                let len = size
                    .min(limit.saturating_sub(offset))
                    .min(rest.len() - (offset - consumed));

                let (_, tail) = std::mem::take(&mut rest).split_at_mut(offset - consumed);
                let (head, tail) = tail.split_at_mut(len);
                planes[index] = Some(head);
                rest = tail;
                consumed = offset + len;
            }
        }

        planes
    }

    /// Attaches `data` to plane `index`, replacing its previous location.
    ///
    /// The image takes ownership of `data`. Binding a plane of an image
    /// created with [`ImageDescriptor::create`] breaks plane contiguity.
    ///
    /// # Errors
    ///
    /// * [`InvalidPlaneIndex`] if `index` is not in `0..4`
    ///
    /// [`InvalidPlaneIndex`]: ./enum.ErrorKind.html#variant.InvalidPlaneIndex
    pub fn bind_plane(&mut self, index: usize, data: Vec<u8>, pitch: usize) -> Result<(), ErrorKind> {
        if index >= MAX_NUMBER_OF_PLANES {
            return Err(ErrorKind::InvalidPlaneIndex(index));
        }

        self.locations[index] = Some(PlaneLocation {
            buffer: self.buffers.len(),
            offset: 0,
        });
        self.pitches[index] = pitch;
        self.buffers.push(data);

        Ok(())
    }

    /// Checks the image metadata against its pixel format.
    ///
    /// The populated planes must be exactly the ones the format expects, each
    /// with a pitch large enough for one row, and the pixel count must fit in
    /// a signed 32-bit integer.
    pub fn validate_header(&self) -> bool {
        let (Ok(width), Ok(height)) = (
            i32::try_from(self.size.width),
            i32::try_from(self.size.height),
        ) else {
            return false;
        };

        if width.checked_mul(height).is_none() {
            return false;
        }

        let expected = expected_active_planes(self.format);
        (0..MAX_NUMBER_OF_PLANES).all(|index| {
            let view = self.view(index);
            let populated = view.location.is_some();

            populated == expected[index] && (!populated || view.pitch >= view.row_bytes())
        })
    }

    /// Like [`ImageDescriptor::validate_header`], and additionally reads every
    /// row of every populated plane.
    pub fn validate(&self) -> bool {
        if !self.validate_header() {
            return false;
        }

        (0..MAX_NUMBER_OF_PLANES).all(|index| {
            let view = self.view(index);
            if view.location.is_none() {
                return true;
            }

            let Some(data) = self.plane(index) else {
                return false;
            };

            let mut checksum = 0u64;
            for y in 0..view.height {
                let start = y * view.pitch;
                let Some(row) = data.get(start..start + view.row_bytes()) else {
                    tracing::debug!(plane = index, row = y, "plane data is truncated");
                    return false;
                };

                checksum += row.iter().map(|&x| u64::from(x)).sum::<u64>();
            }

            tracing::trace!(plane = index, checksum, "plane validated");
            true
        })
    }

    /// Returns true if each of the leading non-empty planes starts right
    /// where the previous one ends, in the same buffer.
    pub fn are_planes_contiguous(&self) -> bool {
        let count = (0..MAX_NUMBER_OF_PLANES)
            .take_while(|&index| self.view(index).buffer_size() != 0)
            .count();

        (1..count).all(|index| {
            let previous = self.view(index - 1);
            match (previous.location, self.locations[index]) {
                (Some(previous_location), Some(location)) => {
                    location.buffer == previous_location.buffer
                        && location.offset == previous_location.offset + previous.buffer_size()
                }
                _ => false,
            }
        })
    }
}

impl fmt::Display for ImageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}x{} {} ({:#x}) pitch={:?} planes=[",
            self.size.width,
            self.size.height,
            self.format,
            self.format.raw(),
            self.pitches,
        )?;

        for (index, location) in self.locations.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }

            match location {
                Some(location) => write!(f, "{}+{}", location.buffer, location.offset)?,
                None => f.write_str("-")?,
            }
        }

        write!(f, "] contiguous={}", self.are_planes_contiguous())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nv12_layout() {
        let image = ImageDescriptor::create(PixelFormat::NV12, Size::new(4, 2)).unwrap();
        assert_eq!(image.pitches(), [4, 4, 0, 0]);
        assert_eq!(
            image.locations(),
            [
                Some(PlaneLocation { buffer: 0, offset: 0 }),
                Some(PlaneLocation { buffer: 0, offset: 8 }),
                None,
                None
            ]
        );
    }

    #[test]
    fn planes_mut_splits_shared_buffer() {
        let mut image = ImageDescriptor::create(PixelFormat::I420, Size::new(4, 4)).unwrap();
        let [y, u, v, unused] = image.planes_mut();
        assert_eq!(y.map(|p| p.len()), Some(16));
        assert_eq!(u.map(|p| p.len()), Some(4));
        assert_eq!(v.map(|p| p.len()), Some(4));
        assert!(unused.is_none());
    }

    #[test]
    fn planes_mut_truncates_overlap() {
        let mut image = ImageDescriptor::create(PixelFormat::NV21, Size::new(4, 4)).unwrap();
        image.pitches[0] = 8;
        let [y, uv, ..] = image.planes_mut();
        assert_eq!(y.map(|p| p.len()), Some(16));
        assert_eq!(uv.map(|p| p.len()), Some(8));
    }

    #[test]
    fn shorthand_constructors() {
        let size = Size::new(6, 4);
        let cases = [
            (ImageDescriptor::create_nv21(size), PixelFormat::NV21),
            (ImageDescriptor::create_nv12(size), PixelFormat::NV12),
            (ImageDescriptor::create_rgb(size), PixelFormat::RGB24),
            (ImageDescriptor::create_bgr(size), PixelFormat::BGR24),
            (ImageDescriptor::create_rgba(size), PixelFormat::RGBA32),
            (ImageDescriptor::create_bgra(size), PixelFormat::BGRA32),
            (ImageDescriptor::create_gray(size), PixelFormat::GRAY),
        ];

        for (image, format) in cases {
            let image = image.unwrap();
            let expected = ImageDescriptor::create(format, size).unwrap();
            assert_eq!(image.format(), format);
            assert_eq!(image.size(), size);
            assert_eq!(image.pitches(), expected.pitches());
            assert!(image.validate());
        }
    }
}
