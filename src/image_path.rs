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
use crate::image::{ImageDescriptor, Size};
use crate::pixel_format::{extension_of, format_from_extension, layout, PixelFormat};
use crate::ErrorKind;
use crate::MAX_NUMBER_OF_PLANES;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// The pieces of an image file name, `[dir/][prefix_]WIDTHxHEIGHT.EXT`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePathInfo {
    /// Directory holding the file
    pub dirname: PathBuf,
    /// Free form name prefix, possibly empty
    pub prefix: String,
    /// Image width, in pixels
    pub width: u32,
    /// Image height, in pixels
    pub height: u32,
    /// Pixel format extension, without the dot
    pub extension: String,
}

impl ImagePathInfo {
    /// Splits a path into directory, prefix, size and extension.
    ///
    /// The prefix is everything before the last `_` of the file stem.
    ///
    /// # Errors
    ///
    /// * [`InvalidPath`] if the file name does not follow the convention
    ///
    /// [`InvalidPath`]: ./enum.ErrorKind.html#variant.InvalidPath
    ///
    /// # Examples
    /// ```
    /// use offscreen_primitives::ImagePathInfo;
    ///
    /// let info = ImagePathInfo::parse("captures/foo_64x48.NV12")?;
    /// assert_eq!(info.prefix, "foo");
    /// assert_eq!((info.width, info.height), (64, 48));
    /// assert_eq!(info.extension, "NV12");
    /// # Ok::<(), offscreen_primitives::ErrorKind>(())
    /// ```
    pub fn parse(path: impl AsRef<Path>) -> Result<Self, ErrorKind> {
        let path = path.as_ref();
        let invalid = || ErrorKind::InvalidPath(path.display().to_string());

        let file_name = path.file_name().and_then(|name| name.to_str()).ok_or_else(invalid)?;
        let (stem, extension) = file_name.rsplit_once('.').ok_or_else(invalid)?;
        if extension.is_empty() {
            return Err(invalid());
        }

        let (prefix, dimensions) = stem.rsplit_once('_').unwrap_or(("", stem));
        let (width, height) = dimensions.split_once('x').ok_or_else(invalid)?;
        let width = parse_dimension(width).ok_or_else(invalid)?;
        let height = parse_dimension(height).ok_or_else(invalid)?;

        Ok(ImagePathInfo {
            dirname: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            prefix: prefix.to_owned(),
            width,
            height,
            extension: extension.to_owned(),
        })
    }

    /// Builds the file name an image is saved under.
    ///
    /// # Errors
    ///
    /// * [`InvalidPrefix`] if `prefix` holds characters other than ascii alphanumerics and `_`
    ///
    /// * [`UnsupportedFormat`] if the image format has no file extension
    ///
    /// [`InvalidPrefix`]: ./enum.ErrorKind.html#variant.InvalidPrefix
    /// [`UnsupportedFormat`]: ./enum.ErrorKind.html#variant.UnsupportedFormat
    pub fn for_image(
        dirname: impl AsRef<Path>,
        prefix: &str,
        image: &ImageDescriptor,
    ) -> Result<Self, ErrorKind> {
        if !prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            tracing::error!(prefix, "invalid file name prefix");
            return Err(ErrorKind::InvalidPrefix(prefix.to_owned()));
        }

        let extension =
            extension_of(image.format()).ok_or(ErrorKind::UnsupportedFormat(image.format()))?;

        Ok(ImagePathInfo {
            dirname: dirname.as_ref().to_path_buf(),
            prefix: prefix.to_owned(),
            width: image.width(),
            height: image.height(),
            extension: extension.to_owned(),
        })
    }

    /// Image size encoded in the name.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Pixel format the extension maps to, [`PixelFormat::UNKNOWN`] if none.
    pub fn format(&self) -> PixelFormat {
        format_from_extension(&self.extension)
    }

    /// Full path of the file.
    pub fn path(&self) -> PathBuf {
        let file_name = if self.prefix.is_empty() {
            format!("{}x{}.{}", self.width, self.height, self.extension)
        } else {
            format!(
                "{}_{}x{}.{}",
                self.prefix, self.width, self.height, self.extension
            )
        };

        self.dirname.join(file_name)
    }
}

fn require_layout(format: PixelFormat) -> Result<(), ErrorKind> {
    if layout(format).is_some() {
        Ok(())
    } else {
        tracing::error!(%format, "no plane layout for pixel format");
        Err(ErrorKind::UnsupportedFormat(format))
    }
}

// Ascii digits only, no sign.
fn parse_dimension(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    text.parse().ok()
}

/// Loads a raw image, taking size and pixel format from its file name.
///
/// # Errors
///
/// * [`InvalidPath`] if the file name does not follow the convention
///
/// * [`UnsupportedFormat`] if the extension is unknown or the format has no plane layout
///
/// * [`Io`] if the file cannot be read
///
/// [`InvalidPath`]: ./enum.ErrorKind.html#variant.InvalidPath
/// [`UnsupportedFormat`]: ./enum.ErrorKind.html#variant.UnsupportedFormat
/// [`Io`]: ./enum.ErrorKind.html#variant.Io
pub fn load(path: impl AsRef<Path>) -> Result<ImageDescriptor, ErrorKind> {
    let info = ImagePathInfo::parse(&path)?;
    load_as(path, info.format())
}

/// Loads a raw image stored with pixel format `format`, taking its size from the file name.
///
/// Bytes are copied plane after plane, row after row. A short file leaves the
/// remaining rows zeroed, extra bytes are ignored.
///
/// # Errors
///
/// Same as [`load`].
pub fn load_as(path: impl AsRef<Path>, format: PixelFormat) -> Result<ImageDescriptor, ErrorKind> {
    let path = path.as_ref();
    let info = ImagePathInfo::parse(path)?;
    require_layout(format)?;

    let data = fs::read(path).map_err(|error| {
        tracing::error!(path = %path.display(), %error, "cannot read image");
        ErrorKind::Io(error)
    })?;

    let mut image = ImageDescriptor::create(format, info.size())?;
    let views: [_; MAX_NUMBER_OF_PLANES] =
        std::array::from_fn(|index| image.plane_view(index).unwrap_or_default());

    let mut source = data.as_slice();
    for (plane, view) in image.planes_mut().into_iter().zip(views) {
        let Some(plane) = plane else {
            continue;
        };

        for y in 0..view.height {
            let Some(row) = plane.get_mut(y * view.pitch..y * view.pitch + view.row_bytes()) else {
                break;
            };

            let count = row.len().min(source.len());
            row[..count].copy_from_slice(&source[..count]);
            source = &source[count..];
        }
    }

    if source.is_empty() {
        let expected: usize = views.iter().map(|view| view.height * view.row_bytes()).sum();
        if data.len() < expected {
            tracing::debug!(path = %path.display(), read = data.len(), expected, "image file is short");
        }
    } else {
        tracing::debug!(path = %path.display(), ignored = source.len(), "image file has extra bytes");
    }

    tracing::debug!(path = %path.display(), image = %image, "image loaded");
    Ok(image)
}

/// Loads a raw nv21 image, whatever the file extension.
///
/// # Errors
///
/// Same as [`load`].
pub fn load_nv21(path: impl AsRef<Path>) -> Result<ImageDescriptor, ErrorKind> {
    load_as(path, PixelFormat::NV21)
}

/// Loads a raw nv12 image, whatever the file extension.
///
/// # Errors
///
/// Same as [`load`].
pub fn load_nv12(path: impl AsRef<Path>) -> Result<ImageDescriptor, ErrorKind> {
    load_as(path, PixelFormat::NV12)
}

/// Loads a raw packed rgb image, red first.
///
/// # Errors
///
/// Same as [`load`].
pub fn load_rgb(path: impl AsRef<Path>) -> Result<ImageDescriptor, ErrorKind> {
    load_as(path, PixelFormat::RGB24)
}

/// Loads a raw packed rgba image, red first.
///
/// # Errors
///
/// Same as [`load`].
pub fn load_rgba(path: impl AsRef<Path>) -> Result<ImageDescriptor, ErrorKind> {
    load_as(path, PixelFormat::RGBA32)
}

/// Saves an image as `dirname/[prefix_]WIDTHxHEIGHT.EXT`, rows tightly packed.
///
/// Returns the path written.
///
/// # Errors
///
/// * [`InvalidPrefix`] if `prefix` holds characters other than ascii alphanumerics and `_`
///
/// * [`UnsupportedFormat`] if the format has no file extension or no plane layout
///
/// * [`NotEnoughData`] if a plane the format expects is missing or truncated
///
/// * [`Io`] if the file cannot be written
///
/// [`InvalidPrefix`]: ./enum.ErrorKind.html#variant.InvalidPrefix
/// [`UnsupportedFormat`]: ./enum.ErrorKind.html#variant.UnsupportedFormat
/// [`NotEnoughData`]: ./enum.ErrorKind.html#variant.NotEnoughData
/// [`Io`]: ./enum.ErrorKind.html#variant.Io
pub fn save(
    dirname: impl AsRef<Path>,
    prefix: &str,
    image: &ImageDescriptor,
) -> Result<PathBuf, ErrorKind> {
    let info = ImagePathInfo::for_image(dirname, prefix, image)?;
    require_layout(image.format())?;
    let path = info.path();

    let mut rows = Vec::new();
    for index in 0..MAX_NUMBER_OF_PLANES {
        let view = image.plane_view(index)?;
        if view.row_bytes() == 0 || view.height == 0 {
            continue;
        }

        let data = image.plane(index).ok_or(ErrorKind::NotEnoughData)?;
        for y in 0..view.height {
            let row = data
                .get(y * view.pitch..y * view.pitch + view.row_bytes())
                .ok_or(ErrorKind::NotEnoughData)?;
            rows.push(row);
        }
    }

    let write = || -> std::io::Result<()> {
        let mut file = BufWriter::new(fs::File::create(&path)?);
        for row in &rows {
            file.write_all(row)?;
        }

        file.flush()
    };

    write().map_err(|error| {
        tracing::error!(path = %path.display(), %error, "cannot write image");
        ErrorKind::Io(error)
    })?;

    tracing::debug!(path = %path.display(), image = %image, "image saved");
    Ok(path)
}
