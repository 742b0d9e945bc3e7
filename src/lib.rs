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
#![warn(missing_docs)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unstable_features)]
#![deny(unused_import_braces)]
#![deny(
    clippy::complexity,
    clippy::correctness,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]
#![allow(
    clippy::too_many_arguments, // API design
    clippy::missing_safety_doc, // Until we add them...
    clippy::similar_names, // This requires effort to ensure
    clippy::inline_always,
    clippy::module_name_repetitions,
    // Yield false positives
    clippy::must_use_candidate,
)]

//! Offscreen primitives is a library to describe, validate, convert and persist
//! multi-plane images.
//!
//! An [`ImageDescriptor`] couples a size and a [`PixelFormat`] with up to four
//! planes. It is able to convert the following pixel formats:
//!
//! | Source pixel format  | Destination pixel formats              |
//! | -------------------- | -------------------------------------- |
//! | RGB24, BGR24         | NV12, NV21, I420, UYVY, I444           |
//! | NV12, NV21           | RGB24, BGR24                           |
//! | I420                 | RGB24, BGR24, UYVY                     |
//! | UYVY                 | RGB24, BGR24                           |
//! | I444                 | RGB24, BGR24, NV12, NV21               |
//! | RGB24 / BGR24        | BGR24 / RGB24                          |
//! | RGBA32 / BGRA32      | BGRA32 / RGBA32                        |
//! | NV12 / NV21          | NV21 / NV12                            |
//!
//! The color model is ycbcr, ITU-R Recommendation BT.601, standard range (16-235).
//! Rgb to yuv is computed in floating point and truncated; yuv to rgb uses
//! fixed point arithmetic.
//!
//! Chroma is not averaged when subsampling: NV12, NV21 and I420 take it from the
//! top-left pixel of each 2x2 block. UYVY takes it from the left pixel of each
//! pair on even rows, and odd rows repeat the chroma of the row above.
//!
//! # Examples
//!
//! Convert an rgb image to nv21 and back:
//! ```
//! use offscreen_primitives as osp;
//! use osp::{rgb_from_nv21, rgb_to_nv21, ImageDescriptor, PixelFormat, Size};
//! use std::error;
//!
//! fn convert() -> Result<(), Box<dyn error::Error>> {
//!     let mut rgb = ImageDescriptor::create(PixelFormat::RGB24, Size::new(640, 480))?;
//!     if let Some(pixels) = rgb.plane_mut(0) {
//!         pixels.fill(128);
//!     }
//!
//!     let nv21 = rgb_to_nv21(&rgb)?;
//!     let back = rgb_from_nv21(&nv21)?;
//!     assert_eq!(back.format(), PixelFormat::RGB24);
//!
//!     Ok(())
//! }
//! # convert().unwrap();
//! ```
//!
//! Convert through the generic entry point:
//! ```
//! use offscreen_primitives as osp;
//! use osp::{convert_from, ErrorKind, ImageDescriptor, PixelFormat, Size};
//!
//! let i444 = ImageDescriptor::create(PixelFormat::I444, Size::new(32, 16))?;
//! let nv21 = convert_from(&i444, PixelFormat::NV21)?;
//! assert!(nv21.validate());
//!
//! // Not every pair of formats is supported
//! assert!(matches!(
//!     convert_from(&nv21, PixelFormat::I444),
//!     Err(ErrorKind::InvalidOperation { .. })
//! ));
//! # Ok::<(), ErrorKind>(())
//! ```
//!
//! Persist an image, encoding its size and format in the file name:
//! ```no_run
//! use offscreen_primitives as osp;
//! use osp::{load, save, ImageDescriptor, PixelFormat, Size};
//! use std::error;
//!
//! fn round_trip() -> Result<(), Box<dyn error::Error>> {
//!     let image = ImageDescriptor::create(PixelFormat::NV12, Size::new(64, 48))?;
//!
//!     let path = save("/tmp", "frame", &image)?; // "/tmp/frame_64x48.NV12"
//!     let loaded = load(&path)?;
//!     assert_eq!(loaded.size(), image.size());
//!
//!     Ok(())
//! }
//! ```
pub mod c_api;
mod convert_image;
mod dispatcher;
mod draw;
mod image;
mod image_path;
mod inspect;
mod pixel_format;
mod static_assert;

use paste::paste;
use std::sync::OnceLock;

pub use image::{ImageDescriptor, PlaneLocation, PlaneView, Size};
pub use image_path::{
    load, load_as, load_nv12, load_nv21, load_rgb, load_rgba, save, ImagePathInfo,
};
pub use inspect::{almost_equal, dump_meta, CompareOptions};
pub use pixel_format::{
    expected_active_planes, extension_of, format_from_extension, PixelFormat,
    MAX_NUMBER_OF_PLANES,
};

/// An enumeration of errors.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// One or more parameters have invalid values for the called function
    #[error("One or more parameters have not legal values for the command")]
    InvalidValue,
    /// No converter exists between the two pixel formats
    #[error("Conversion from {src} to {dst} is not supported")]
    InvalidOperation {
        /// Source pixel format
        src: PixelFormat,
        /// Requested destination pixel format
        dst: PixelFormat,
    },
    /// Not enough data was provided to the called function. Typically, image
    /// planes are not populated or are smaller than their pitch requires
    #[error("Not enough data provided")]
    NotEnoughData,
    /// The pixel format is not registered, or has no plane layout where one is needed
    #[error("Pixel format {0:?} is not supported")]
    UnsupportedFormat(PixelFormat),
    /// A plane index outside `0..4` was given
    #[error("Plane index {0} is out of range")]
    InvalidPlaneIndex(usize),
    /// A file name prefix contains characters other than ascii alphanumerics and `_`
    #[error("Invalid file name prefix {0:?}")]
    InvalidPrefix(String),
    /// A path does not follow the `[prefix_]WIDTHxHEIGHT.EXT` convention
    #[error("Malformed image path {0:?}")]
    InvalidPath(String),
    /// Reading or writing an image file failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

type ConvertDispatcher = fn(u32, u32, &[usize], &[&[u8]], &[usize], &mut [&mut [u8]]) -> bool;

macro_rules! register {
    ($conv:expr, $src_pf:ident, $dst_pf:ident) => {
        paste! {
            if let Some(index) =
                dispatcher::index_of(PixelFormat::$src_pf, PixelFormat::$dst_pf)
            {
                $conv[index] = Some(convert_image::scalar::[<$src_pf:lower _ $dst_pf:lower>]);
            }
        }
    };
}

macro_rules! set_dispatch_table {
    ($conv:expr) => {
        register!($conv, RGB24, NV12);
        register!($conv, RGB24, NV21);
        register!($conv, RGB24, I420);
        register!($conv, RGB24, UYVY);
        register!($conv, RGB24, I444);
        register!($conv, BGR24, NV12);
        register!($conv, BGR24, NV21);
        register!($conv, BGR24, I420);
        register!($conv, BGR24, UYVY);
        register!($conv, BGR24, I444);
        register!($conv, NV12, RGB24);
        register!($conv, NV21, RGB24);
        register!($conv, I420, RGB24);
        register!($conv, UYVY, RGB24);
        register!($conv, I444, RGB24);
        register!($conv, NV12, BGR24);
        register!($conv, NV21, BGR24);
        register!($conv, I420, BGR24);
        register!($conv, UYVY, BGR24);
        register!($conv, I444, BGR24);
        register!($conv, BGR24, RGB24);
        register!($conv, RGB24, BGR24);
        register!($conv, BGRA32, RGBA32);
        register!($conv, RGBA32, BGRA32);
        register!($conv, NV12, NV21);
        register!($conv, NV21, NV12);
        register!($conv, I444, NV12);
        register!($conv, I444, NV21);
        register!($conv, I420, UYVY);
    };
}

type DispatchTable = [Option<ConvertDispatcher>; dispatcher::TABLE_SIZE];

struct Context {
    converters: DispatchTable,
}

impl Context {
    pub fn global() -> &'static Context {
        static INSTANCE: OnceLock<Context> = OnceLock::new();
        INSTANCE.get_or_init(Context::new)
    }

    pub fn new() -> Self {
        let mut context = Context {
            converters: [None; dispatcher::TABLE_SIZE],
        };

        set_dispatch_table!(context.converters);
        context
    }

    fn converter(&self, src: PixelFormat, dst: PixelFormat) -> Option<ConvertDispatcher> {
        self.converters[dispatcher::index_of(src, dst)?]
    }
}

/// Converts an image into a newly allocated image of format `dst_format`.
///
/// The source image is never modified.
///
/// # Errors
///
/// * [`InvalidOperation`] if there is no converter from the source format to `dst_format`
///
/// * [`InvalidValue`] if the image size would split a chroma block: NV12, NV21 and I420
///   need even width and height, UYVY needs an even width
///
/// * [`NotEnoughData`] if a source plane is missing or shorter than its pitch and
///   height require
///
/// [`InvalidOperation`]: ./enum.ErrorKind.html#variant.InvalidOperation
/// [`InvalidValue`]: ./enum.ErrorKind.html#variant.InvalidValue
/// [`NotEnoughData`]: ./enum.ErrorKind.html#variant.NotEnoughData
pub fn convert_from(
    src: &ImageDescriptor,
    dst_format: PixelFormat,
) -> Result<ImageDescriptor, ErrorKind> {
    let src_format = src.format();
    let Some(converter) = Context::global().converter(src_format, dst_format) else {
        tracing::error!(src = %src_format, dst = %dst_format, "not supported convert format mapping");
        return Err(ErrorKind::InvalidOperation {
            src: src_format,
            dst: dst_format,
        });
    };

    let Size { width, height } = src.size();
    if !pixel_format::is_compatible(src_format, width, height)
        || !pixel_format::is_compatible(dst_format, width, height)
    {
        tracing::error!(width, height, src = %src_format, dst = %dst_format, "image size splits a chroma block");
        return Err(ErrorKind::InvalidValue);
    }

    let mut dst = ImageDescriptor::create(dst_format, src.size())?;
    let src_strides = src.pitches();
    let dst_strides = dst.pitches();
    let src_buffers: [&[u8]; MAX_NUMBER_OF_PLANES] =
        std::array::from_fn(|index| src.plane(index).unwrap_or_default());

    let converted = {
        let mut dst_buffers = dst.planes_mut().map(Option::unwrap_or_default);
        converter(
            width,
            height,
            &src_strides,
            &src_buffers,
            &dst_strides,
            &mut dst_buffers,
        )
    };

    if converted {
        Ok(dst)
    } else {
        Err(ErrorKind::NotEnoughData)
    }
}

fn convert_checked(
    src: &ImageDescriptor,
    accepted: &[PixelFormat],
    dst_format: PixelFormat,
) -> Result<ImageDescriptor, ErrorKind> {
    if accepted.contains(&src.format()) {
        convert_from(src, dst_format)
    } else {
        tracing::error!(src = %src.format(), dst = %dst_format, "unexpected source pixel format");
        Err(ErrorKind::InvalidOperation {
            src: src.format(),
            dst: dst_format,
        })
    }
}

const RGB24_FORMATS: &[PixelFormat] = &[PixelFormat::RGB24, PixelFormat::BGR24];

macro_rules! to_yuv {
    ($name:ident, $dst_pf:ident) => {
        #[doc = concat!("Converts an RGB24 or BGR24 image to ", stringify!($dst_pf), ".")]
        ///
        /// # Errors
        ///
        /// Same as [`convert_from`], plus [`InvalidOperation`] if the source image is not rgb.
        ///
        /// [`InvalidOperation`]: ./enum.ErrorKind.html#variant.InvalidOperation
        pub fn $name(src: &ImageDescriptor) -> Result<ImageDescriptor, ErrorKind> {
            convert_checked(src, RGB24_FORMATS, PixelFormat::$dst_pf)
        }
    };
}

macro_rules! from_yuv {
    ($name:ident, $src_pf:ident) => {
        #[doc = concat!("Converts a ", stringify!($src_pf), " image to RGB24 (red first).")]
        ///
        /// # Errors
        ///
        /// Same as [`convert_from`], plus [`InvalidOperation`] if the source image has
        /// another format.
        ///
        /// [`InvalidOperation`]: ./enum.ErrorKind.html#variant.InvalidOperation
        pub fn $name(src: &ImageDescriptor) -> Result<ImageDescriptor, ErrorKind> {
            convert_checked(src, &[PixelFormat::$src_pf], PixelFormat::RGB24)
        }
    };
}

to_yuv!(rgb_to_nv21, NV21);
to_yuv!(rgb_to_nv12, NV12);
to_yuv!(rgb_to_i420, I420);
to_yuv!(rgb_to_uyvy, UYVY);
to_yuv!(rgb_to_i444, I444);
from_yuv!(rgb_from_nv21, NV21);
from_yuv!(rgb_from_nv12, NV12);
from_yuv!(rgb_from_i420, I420);
from_yuv!(rgb_from_uyvy, UYVY);
from_yuv!(rgb_from_i444, I444);

/// Repacks an I420 image to UYVY, repeating each chroma sample on both rows of its block.
///
/// # Errors
///
/// Same as [`convert_from`], plus [`InvalidOperation`] if the source image is not I420.
///
/// [`InvalidOperation`]: ./enum.ErrorKind.html#variant.InvalidOperation
pub fn i420_to_uyvy(src: &ImageDescriptor) -> Result<ImageDescriptor, ErrorKind> {
    convert_checked(src, &[PixelFormat::I420], PixelFormat::UYVY)
}

/// Repacks an I444 image to NV21, keeping the chroma of even rows and columns.
///
/// # Errors
///
/// Same as [`convert_from`], plus [`InvalidOperation`] if the source image is not I444.
///
/// [`InvalidOperation`]: ./enum.ErrorKind.html#variant.InvalidOperation
pub fn i444_to_nv21(src: &ImageDescriptor) -> Result<ImageDescriptor, ErrorKind> {
    convert_checked(src, &[PixelFormat::I444], PixelFormat::NV21)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_indexed_format_has_a_converter() {
        let context = Context::global();
        let indexed: Vec<_> = PixelFormat::all()
            .filter(|&format| dispatcher::get_image_index(format).is_some())
            .collect();

        for &format in &indexed {
            assert!(indexed.iter().any(|&other| {
                context.converter(format, other).is_some() || context.converter(other, format).is_some()
            }));
        }
    }
}
