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
use crate::convert_image::common::{rgb_to_uv, rgb_to_y};
use crate::image::ImageDescriptor;
use crate::pixel_format::PixelFormat;
use crate::ErrorKind;

impl ImageDescriptor {
    /// Paints a filled disc of color `rgb` centered on `center`, in pixels.
    ///
    /// Row `dy` of the disc spans `floor(sqrt(radius² - dy²))` pixels on each
    /// side of the center. Coordinates are truncated toward zero. Pixels on the
    /// image border are left untouched. Each painted pixel also overwrites the
    /// chroma of its 2x2 block.
    ///
    /// # Errors
    ///
    /// * [`UnsupportedFormat`] if the image is neither NV12 nor NV21
    ///
    /// * [`InvalidValue`] if `radius` does not fit in an `i32`
    ///
    /// * [`NotEnoughData`] if the planes are missing or too small
    ///
    /// [`UnsupportedFormat`]: ./enum.ErrorKind.html#variant.UnsupportedFormat
    /// [`InvalidValue`]: ./enum.ErrorKind.html#variant.InvalidValue
    /// [`NotEnoughData`]: ./enum.ErrorKind.html#variant.NotEnoughData
    pub fn draw_point(
        &mut self,
        center: (f64, f64),
        radius: u32,
        rgb: [u8; 3],
    ) -> Result<(), ErrorKind> {
        let u_index = match self.format() {
            PixelFormat::NV12 => 0,
            PixelFormat::NV21 => 1,
            format => {
                tracing::error!(%format, "points can only be drawn on nv12 and nv21 images");
                return Err(ErrorKind::UnsupportedFormat(format));
            }
        };

        let radius = i32::try_from(radius).map_err(|_| ErrorKind::InvalidValue)?;
        let (width, height) = (i64::from(self.width()), i64::from(self.height()));
        if width < 3 || height < 3 {
            return Ok(());
        }

        if !self.validate() {
            return Err(ErrorKind::NotEnoughData);
        }

        let [r, g, b] = rgb;
        let luma = rgb_to_y(r, g, b);
        let (u, v) = rgb_to_uv(r, g, b);

        let [y_pitch, uv_pitch, ..] = self.pitches();
        let [Some(y_plane), Some(uv_plane), ..] = self.planes_mut() else {
            return Err(ErrorKind::NotEnoughData);
        };

        for dy in -radius..=radius {
            let reach = span(radius, dy);
            for dx in -reach..=reach {
                let x = truncate(center.0 + f64::from(dx));
                let y = truncate(center.1 + f64::from(dy));
                if x < 1 || x > width - 2 || y < 1 || y > height - 2 {
                    continue;
                }

                let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
                    continue;
                };

                if let Some(sample) = y_plane.get_mut(y * y_pitch + x) {
                    *sample = luma;
                }

                let uv = (y / 2) * uv_pitch + 2 * (x / 2);
                if let Some(pair) = uv_plane.get_mut(uv..uv + 2) {
                    pair[u_index] = u;
                    pair[1 - u_index] = v;
                }
            }
        }

        Ok(())
    }
}

/// Half width of row `dy` of a disc of radius `radius`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn span(radius: i32, dy: i32) -> i32 {
    let squared = i64::from(radius) * i64::from(radius) - i64::from(dy) * i64::from(dy);
    (squared as f64).sqrt().floor() as i32
}

#[allow(clippy::cast_possible_truncation)]
fn truncate(value: f64) -> i64 {
    value as i64
}
