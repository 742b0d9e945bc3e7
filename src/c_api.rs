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
//! Flat, C compatible view of an image.
//!
//! [`Offscreen`] mirrors the descriptor layout used by native imaging
//! libraries: four pitches and four raw plane pointers.
use crate::image::{ImageDescriptor, Size};
use crate::pixel_format::{PixelFormat, MAX_NUMBER_OF_PLANES};
use crate::ErrorKind;
use std::ptr;

/// Plain data image descriptor with raw plane pointers.
///
/// Unused slots hold a zero pitch and a null pointer.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct Offscreen {
    /// Height in pixels
    pub height: i32,
    /// Width in pixels
    pub width: i32,
    /// Raw pixel format identifier
    pub format: u32,
    /// Bytes per row of each plane
    pub pitch: [i32; MAX_NUMBER_OF_PLANES],
    /// First byte of each plane
    pub planes: [*mut u8; MAX_NUMBER_OF_PLANES],
}

impl ImageDescriptor {
    /// Exposes the image as an [`Offscreen`].
    ///
    /// The pointers borrow the image buffers: they stay valid as long as the
    /// image is neither dropped nor has a plane rebound.
    ///
    /// # Errors
    ///
    /// * [`InvalidValue`] if the size or a pitch does not fit in an `i32`
    ///
    /// [`InvalidValue`]: crate::ErrorKind::InvalidValue
    pub fn as_offscreen(&mut self) -> Result<Offscreen, ErrorKind> {
        let height = i32::try_from(self.height()).map_err(|_| ErrorKind::InvalidValue)?;
        let width = i32::try_from(self.width()).map_err(|_| ErrorKind::InvalidValue)?;
        let format = self.format().raw();

        let mut pitch = [0; MAX_NUMBER_OF_PLANES];
        for (dst, &src) in pitch.iter_mut().zip(&self.pitches()) {
            *dst = i32::try_from(src).map_err(|_| ErrorKind::InvalidValue)?;
        }

        let planes = self
            .planes_mut()
            .map(|plane| plane.map_or(ptr::null_mut(), <[u8]>::as_mut_ptr));

        Ok(Offscreen {
            height,
            width,
            format,
            pitch,
            planes,
        })
    }

    /// Copies an externally owned image into a new descriptor.
    ///
    /// Pitches are kept; a zero pitch selects the canonical one. Planes are
    /// stored back to back in one buffer.
    ///
    /// # Errors
    ///
    /// * [`InvalidValue`] if the size or a pitch is negative
    ///
    /// * [`UnsupportedFormat`] if the format is not registered
    ///
    /// * [`NotEnoughData`] if a plane the format expects has a null pointer
    ///
    /// [`InvalidValue`]: crate::ErrorKind::InvalidValue
    /// [`UnsupportedFormat`]: crate::ErrorKind::UnsupportedFormat
    /// [`NotEnoughData`]: crate::ErrorKind::NotEnoughData
    ///
    /// # Safety
    ///
    /// Every non-null `planes[i]` must be valid for reads of
    /// `pitch[i] * rows` bytes, where `rows` is the height of plane `i`.
    pub unsafe fn from_offscreen(offscreen: &Offscreen) -> Result<Self, ErrorKind> {
        let width = u32::try_from(offscreen.width).map_err(|_| ErrorKind::InvalidValue)?;
        let height = u32::try_from(offscreen.height).map_err(|_| ErrorKind::InvalidValue)?;

        let mut pitches = [0; MAX_NUMBER_OF_PLANES];
        for (dst, &src) in pitches.iter_mut().zip(&offscreen.pitch) {
            *dst = usize::try_from(src).map_err(|_| ErrorKind::InvalidValue)?;
        }

        let mut image = ImageDescriptor::create_with_pitches(
            PixelFormat::from_raw(offscreen.format),
            Size::new(width, height),
            &pitches,
        )?;

        let sizes: [usize; MAX_NUMBER_OF_PLANES] = std::array::from_fn(|index| {
            image
                .plane_view(index)
                .map_or(0, |view| view.buffer_size())
        });

        for ((plane, &source), size) in image
            .planes_mut()
            .into_iter()
            .zip(&offscreen.planes)
            .zip(sizes)
        {
            let Some(plane) = plane else {
                continue;
            };

            if source.is_null() {
                return Err(ErrorKind::NotEnoughData);
            }

            let len = size.min(plane.len());
            plane[..len].copy_from_slice(std::slice::from_raw_parts(source, len));
        }

        Ok(image)
    }
}
