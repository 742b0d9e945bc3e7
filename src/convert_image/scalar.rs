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
use crate::convert_image::common::*;

// Pixels of a 2x2 chroma block, top-left first.
const BLOCK: [(usize, usize); 4] = [(0, 0), (1, 0), (0, 1), (1, 1)];

const RGB_DEPTH: usize = 3;

fn unpack_rgb(image: &[u8], offset: usize, sampler: Sampler) -> (u8, u8, u8) {
    let [r, g, b] = sampler.offsets();
    (image[offset + r], image[offset + g], image[offset + b])
}

fn pack_rgb(image: &mut [u8], offset: usize, sampler: Sampler, (r, g, b): (u8, u8, u8)) {
    let [ro, go, bo] = sampler.offsets();
    image[offset + ro] = r;
    image[offset + go] = g;
    image[offset + bo] = b;
}

fn copy_plane(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    row_bytes: usize,
    line_count: usize,
) {
    for y in 0..line_count {
        let src_row = &src[y * src_stride..y * src_stride + row_bytes];
        dst[y * dst_stride..y * dst_stride + row_bytes].copy_from_slice(src_row);
    }
}

#[inline(always)]
fn rgb_to_semi_planar(
    width: u32,
    height: u32,
    src_strides: &[usize],
    src_buffers: &[&[u8]],
    dst_strides: &[usize],
    dst_buffers: &mut [&mut [u8]],
    sampler: Sampler,
    u_index: usize,
) -> bool {
    let (&[rgb_stride, ..], &[rgb_plane, ..]) = (src_strides, src_buffers) else {
        return false;
    };
    let (&[y_stride, uv_stride, ..], [y_plane, uv_plane, ..]) = (dst_strides, dst_buffers) else {
        return false;
    };

    let col_count = width as usize;
    let line_count = height as usize;
    if !planes_fit(&[
        (&rgb_plane[..], rgb_stride, line_count, RGB_DEPTH * col_count),
        (&y_plane[..], y_stride, line_count, col_count),
        (&uv_plane[..], uv_stride, line_count / 2, col_count),
    ]) {
        return false;
    }

    for y in 0..line_count / 2 {
        for x in 0..col_count / 2 {
            for (dx, dy) in BLOCK {
                let (px, py) = (2 * x + dx, 2 * y + dy);
                let (r, g, b) = unpack_rgb(rgb_plane, wg_index(px, py, RGB_DEPTH, rgb_stride), sampler);
                y_plane[wg_index(px, py, 1, y_stride)] = rgb_to_y(r, g, b);
            }

            // Chroma comes from the top-left pixel of the block
            let (r, g, b) = unpack_rgb(rgb_plane, wg_index(2 * x, 2 * y, RGB_DEPTH, rgb_stride), sampler);
            let (u, v) = rgb_to_uv(r, g, b);
            let uv = wg_index(x, y, 2, uv_stride);
            uv_plane[uv + u_index] = u;
            uv_plane[uv + 1 - u_index] = v;
        }
    }

    true
}

#[inline(always)]
fn rgb_to_i420(
    width: u32,
    height: u32,
    src_strides: &[usize],
    src_buffers: &[&[u8]],
    dst_strides: &[usize],
    dst_buffers: &mut [&mut [u8]],
    sampler: Sampler,
) -> bool {
    let (&[rgb_stride, ..], &[rgb_plane, ..]) = (src_strides, src_buffers) else {
        return false;
    };
    let (&[y_stride, u_stride, v_stride, ..], [y_plane, u_plane, v_plane, ..]) =
        (dst_strides, dst_buffers)
    else {
        return false;
    };

    let col_count = width as usize;
    let line_count = height as usize;
    if !planes_fit(&[
        (&rgb_plane[..], rgb_stride, line_count, RGB_DEPTH * col_count),
        (&y_plane[..], y_stride, line_count, col_count),
        (&u_plane[..], u_stride, line_count / 2, col_count / 2),
        (&v_plane[..], v_stride, line_count / 2, col_count / 2),
    ]) {
        return false;
    }

    for y in 0..line_count / 2 {
        for x in 0..col_count / 2 {
            for (dx, dy) in BLOCK {
                let (px, py) = (2 * x + dx, 2 * y + dy);
                let (r, g, b) = unpack_rgb(rgb_plane, wg_index(px, py, RGB_DEPTH, rgb_stride), sampler);
                y_plane[wg_index(px, py, 1, y_stride)] = rgb_to_y(r, g, b);
            }

            let (r, g, b) = unpack_rgb(rgb_plane, wg_index(2 * x, 2 * y, RGB_DEPTH, rgb_stride), sampler);
            let (u, v) = rgb_to_uv(r, g, b);
            u_plane[wg_index(x, y, 1, u_stride)] = u;
            v_plane[wg_index(x, y, 1, v_stride)] = v;
        }
    }

    true
}

#[inline(always)]
fn rgb_to_uyvy(
    width: u32,
    height: u32,
    src_strides: &[usize],
    src_buffers: &[&[u8]],
    dst_strides: &[usize],
    dst_buffers: &mut [&mut [u8]],
    sampler: Sampler,
) -> bool {
    let (&[rgb_stride, ..], &[rgb_plane, ..]) = (src_strides, src_buffers) else {
        return false;
    };
    let (&[uyvy_stride, ..], [uyvy_plane, ..]) = (dst_strides, dst_buffers) else {
        return false;
    };

    let col_count = width as usize;
    let line_count = height as usize;
    if !planes_fit(&[
        (&rgb_plane[..], rgb_stride, line_count, RGB_DEPTH * col_count),
        (&uyvy_plane[..], uyvy_stride, line_count, 2 * col_count),
    ]) {
        return false;
    }

    // Both rows of a row pair carry the chroma of the even row.
    for y in 0..line_count {
        for x in 0..col_count / 2 {
            let (r0, g0, b0) = unpack_rgb(rgb_plane, wg_index(2 * x, y, RGB_DEPTH, rgb_stride), sampler);
            let (r1, g1, b1) =
                unpack_rgb(rgb_plane, wg_index(2 * x + 1, y, RGB_DEPTH, rgb_stride), sampler);

            let (u, v) = if y % 2 == 0 {
                rgb_to_uv(r0, g0, b0)
            } else {
                let (r, g, b) =
                    unpack_rgb(rgb_plane, wg_index(2 * x, y - 1, RGB_DEPTH, rgb_stride), sampler);
                rgb_to_uv(r, g, b)
            };
            let macropixel = wg_index(x, y, 4, uyvy_stride);
            uyvy_plane[macropixel] = u;
            uyvy_plane[macropixel + 1] = rgb_to_y(r0, g0, b0);
            uyvy_plane[macropixel + 2] = v;
            uyvy_plane[macropixel + 3] = rgb_to_y(r1, g1, b1);
        }
    }

    true
}

#[inline(always)]
fn rgb_to_i444(
    width: u32,
    height: u32,
    src_strides: &[usize],
    src_buffers: &[&[u8]],
    dst_strides: &[usize],
    dst_buffers: &mut [&mut [u8]],
    sampler: Sampler,
) -> bool {
    let (&[rgb_stride, ..], &[rgb_plane, ..]) = (src_strides, src_buffers) else {
        return false;
    };
    let (&[y_stride, u_stride, v_stride, ..], [y_plane, u_plane, v_plane, ..]) =
        (dst_strides, dst_buffers)
    else {
        return false;
    };

    let col_count = width as usize;
    let line_count = height as usize;
    if !planes_fit(&[
        (&rgb_plane[..], rgb_stride, line_count, RGB_DEPTH * col_count),
        (&y_plane[..], y_stride, line_count, col_count),
        (&u_plane[..], u_stride, line_count, col_count),
        (&v_plane[..], v_stride, line_count, col_count),
    ]) {
        return false;
    }

    for y in 0..line_count {
        for x in 0..col_count {
            let (r, g, b) = unpack_rgb(rgb_plane, wg_index(x, y, RGB_DEPTH, rgb_stride), sampler);
            let (u, v) = rgb_to_uv(r, g, b);
            y_plane[wg_index(x, y, 1, y_stride)] = rgb_to_y(r, g, b);
            u_plane[wg_index(x, y, 1, u_stride)] = u;
            v_plane[wg_index(x, y, 1, v_stride)] = v;
        }
    }

    true
}

#[inline(always)]
fn semi_planar_to_rgb(
    width: u32,
    height: u32,
    src_strides: &[usize],
    src_buffers: &[&[u8]],
    dst_strides: &[usize],
    dst_buffers: &mut [&mut [u8]],
    sampler: Sampler,
    u_index: usize,
) -> bool {
    let (&[y_stride, uv_stride, ..], &[y_plane, uv_plane, ..]) = (src_strides, src_buffers) else {
        return false;
    };
    let (&[rgb_stride, ..], [rgb_plane, ..]) = (dst_strides, dst_buffers) else {
        return false;
    };

    let col_count = width as usize;
    let line_count = height as usize;
    if !planes_fit(&[
        (&y_plane[..], y_stride, line_count, col_count),
        (&uv_plane[..], uv_stride, line_count / 2, col_count),
        (&rgb_plane[..], rgb_stride, line_count, RGB_DEPTH * col_count),
    ]) {
        return false;
    }

    for y in 0..line_count / 2 {
        for x in 0..col_count / 2 {
            let uv = wg_index(x, y, 2, uv_stride);
            let terms = uv_terms(uv_plane[uv + u_index], uv_plane[uv + 1 - u_index]);

            for (dx, dy) in BLOCK {
                let (px, py) = (2 * x + dx, 2 * y + dy);
                let rgb = yuv_to_rgb(y_plane[wg_index(px, py, 1, y_stride)], terms);
                pack_rgb(rgb_plane, wg_index(px, py, RGB_DEPTH, rgb_stride), sampler, rgb);
            }
        }
    }

    true
}

#[inline(always)]
fn i420_to_rgb(
    width: u32,
    height: u32,
    src_strides: &[usize],
    src_buffers: &[&[u8]],
    dst_strides: &[usize],
    dst_buffers: &mut [&mut [u8]],
    sampler: Sampler,
) -> bool {
    let (&[y_stride, u_stride, v_stride, ..], &[y_plane, u_plane, v_plane, ..]) =
        (src_strides, src_buffers)
    else {
        return false;
    };
    let (&[rgb_stride, ..], [rgb_plane, ..]) = (dst_strides, dst_buffers) else {
        return false;
    };

    let col_count = width as usize;
    let line_count = height as usize;
    if !planes_fit(&[
        (&y_plane[..], y_stride, line_count, col_count),
        (&u_plane[..], u_stride, line_count / 2, col_count / 2),
        (&v_plane[..], v_stride, line_count / 2, col_count / 2),
        (&rgb_plane[..], rgb_stride, line_count, RGB_DEPTH * col_count),
    ]) {
        return false;
    }

    for y in 0..line_count / 2 {
        for x in 0..col_count / 2 {
            let terms = uv_terms(
                u_plane[wg_index(x, y, 1, u_stride)],
                v_plane[wg_index(x, y, 1, v_stride)],
            );

            for (dx, dy) in BLOCK {
                let (px, py) = (2 * x + dx, 2 * y + dy);
                let rgb = yuv_to_rgb(y_plane[wg_index(px, py, 1, y_stride)], terms);
                pack_rgb(rgb_plane, wg_index(px, py, RGB_DEPTH, rgb_stride), sampler, rgb);
            }
        }
    }

    true
}

#[inline(always)]
fn uyvy_to_rgb(
    width: u32,
    height: u32,
    src_strides: &[usize],
    src_buffers: &[&[u8]],
    dst_strides: &[usize],
    dst_buffers: &mut [&mut [u8]],
    sampler: Sampler,
) -> bool {
    let (&[uyvy_stride, ..], &[uyvy_plane, ..]) = (src_strides, src_buffers) else {
        return false;
    };
    let (&[rgb_stride, ..], [rgb_plane, ..]) = (dst_strides, dst_buffers) else {
        return false;
    };

    let col_count = width as usize;
    let line_count = height as usize;
    if !planes_fit(&[
        (&uyvy_plane[..], uyvy_stride, line_count, 2 * col_count),
        (&rgb_plane[..], rgb_stride, line_count, RGB_DEPTH * col_count),
    ]) {
        return false;
    }

    for y in 0..line_count {
        for x in 0..col_count / 2 {
            let macropixel = wg_index(x, y, 4, uyvy_stride);
            let chroma = wg_index(x, y & !1, 4, uyvy_stride);
            let terms = uv_terms(uyvy_plane[chroma], uyvy_plane[chroma + 2]);

            let rgb = yuv_to_rgb(uyvy_plane[macropixel + 1], terms);
            pack_rgb(rgb_plane, wg_index(2 * x, y, RGB_DEPTH, rgb_stride), sampler, rgb);
            let rgb = yuv_to_rgb(uyvy_plane[macropixel + 3], terms);
            pack_rgb(rgb_plane, wg_index(2 * x + 1, y, RGB_DEPTH, rgb_stride), sampler, rgb);
        }
    }

    true
}

#[inline(always)]
fn i444_to_rgb(
    width: u32,
    height: u32,
    src_strides: &[usize],
    src_buffers: &[&[u8]],
    dst_strides: &[usize],
    dst_buffers: &mut [&mut [u8]],
    sampler: Sampler,
) -> bool {
    let (&[y_stride, u_stride, v_stride, ..], &[y_plane, u_plane, v_plane, ..]) =
        (src_strides, src_buffers)
    else {
        return false;
    };
    let (&[rgb_stride, ..], [rgb_plane, ..]) = (dst_strides, dst_buffers) else {
        return false;
    };

    let col_count = width as usize;
    let line_count = height as usize;
    if !planes_fit(&[
        (&y_plane[..], y_stride, line_count, col_count),
        (&u_plane[..], u_stride, line_count, col_count),
        (&v_plane[..], v_stride, line_count, col_count),
        (&rgb_plane[..], rgb_stride, line_count, RGB_DEPTH * col_count),
    ]) {
        return false;
    }

    for y in 0..line_count {
        for x in 0..col_count {
            let terms = uv_terms(
                u_plane[wg_index(x, y, 1, u_stride)],
                v_plane[wg_index(x, y, 1, v_stride)],
            );
            let rgb = yuv_to_rgb(y_plane[wg_index(x, y, 1, y_stride)], terms);
            pack_rgb(rgb_plane, wg_index(x, y, RGB_DEPTH, rgb_stride), sampler, rgb);
        }
    }

    true
}

/// Swaps the first and third channel of every pixel, leaving the others untouched.
#[inline(always)]
fn swap_rb(
    width: u32,
    height: u32,
    src_strides: &[usize],
    src_buffers: &[&[u8]],
    dst_strides: &[usize],
    dst_buffers: &mut [&mut [u8]],
    depth: usize,
) -> bool {
    let (&[src_stride, ..], &[src_plane, ..]) = (src_strides, src_buffers) else {
        return false;
    };
    let (&[dst_stride, ..], [dst_plane, ..]) = (dst_strides, dst_buffers) else {
        return false;
    };

    let col_count = width as usize;
    let line_count = height as usize;
    if !planes_fit(&[
        (&src_plane[..], src_stride, line_count, depth * col_count),
        (&dst_plane[..], dst_stride, line_count, depth * col_count),
    ]) {
        return false;
    }

    for y in 0..line_count {
        for x in 0..col_count {
            let src = wg_index(x, y, depth, src_stride);
            let dst = wg_index(x, y, depth, dst_stride);
            dst_plane[dst..dst + depth].copy_from_slice(&src_plane[src..src + depth]);
            dst_plane.swap(dst, dst + 2);
        }
    }

    true
}

#[inline(always)]
fn swap_uv(
    width: u32,
    height: u32,
    src_strides: &[usize],
    src_buffers: &[&[u8]],
    dst_strides: &[usize],
    dst_buffers: &mut [&mut [u8]],
) -> bool {
    let (&[src_y_stride, src_uv_stride, ..], &[src_y_plane, src_uv_plane, ..]) =
        (src_strides, src_buffers)
    else {
        return false;
    };
    let (&[dst_y_stride, dst_uv_stride, ..], [dst_y_plane, dst_uv_plane, ..]) =
        (dst_strides, dst_buffers)
    else {
        return false;
    };

    let col_count = width as usize;
    let line_count = height as usize;
    if !planes_fit(&[
        (&src_y_plane[..], src_y_stride, line_count, col_count),
        (&src_uv_plane[..], src_uv_stride, line_count / 2, col_count),
        (&dst_y_plane[..], dst_y_stride, line_count, col_count),
        (&dst_uv_plane[..], dst_uv_stride, line_count / 2, col_count),
    ]) {
        return false;
    }

    copy_plane(
        src_y_plane,
        src_y_stride,
        dst_y_plane,
        dst_y_stride,
        col_count,
        line_count,
    );

    for y in 0..line_count / 2 {
        for x in 0..col_count / 2 {
            let src = wg_index(x, y, 2, src_uv_stride);
            let dst = wg_index(x, y, 2, dst_uv_stride);
            dst_uv_plane[dst] = src_uv_plane[src + 1];
            dst_uv_plane[dst + 1] = src_uv_plane[src];
        }
    }

    true
}

#[inline(always)]
fn i444_to_semi_planar(
    width: u32,
    height: u32,
    src_strides: &[usize],
    src_buffers: &[&[u8]],
    dst_strides: &[usize],
    dst_buffers: &mut [&mut [u8]],
    u_index: usize,
) -> bool {
    let (&[y_stride, u_stride, v_stride, ..], &[y_plane, u_plane, v_plane, ..]) =
        (src_strides, src_buffers)
    else {
        return false;
    };
    let (&[dst_y_stride, uv_stride, ..], [dst_y_plane, uv_plane, ..]) = (dst_strides, dst_buffers)
    else {
        return false;
    };

    let col_count = width as usize;
    let line_count = height as usize;
    if !planes_fit(&[
        (&y_plane[..], y_stride, line_count, col_count),
        (&u_plane[..], u_stride, line_count, col_count),
        (&v_plane[..], v_stride, line_count, col_count),
        (&dst_y_plane[..], dst_y_stride, line_count, col_count),
        (&uv_plane[..], uv_stride, line_count / 2, col_count),
    ]) {
        return false;
    }

    copy_plane(
        y_plane,
        y_stride,
        dst_y_plane,
        dst_y_stride,
        col_count,
        line_count,
    );

    // Decimation: odd rows and columns of the chroma planes are dropped
    for y in 0..line_count / 2 {
        for x in 0..col_count / 2 {
            let uv = wg_index(x, y, 2, uv_stride);
            uv_plane[uv + u_index] = u_plane[wg_index(2 * x, 2 * y, 1, u_stride)];
            uv_plane[uv + 1 - u_index] = v_plane[wg_index(2 * x, 2 * y, 1, v_stride)];
        }
    }

    true
}

pub fn i420_uyvy(
    width: u32,
    height: u32,
    src_strides: &[usize],
    src_buffers: &[&[u8]],
    dst_strides: &[usize],
    dst_buffers: &mut [&mut [u8]],
) -> bool {
    let (&[y_stride, u_stride, v_stride, ..], &[y_plane, u_plane, v_plane, ..]) =
        (src_strides, src_buffers)
    else {
        return false;
    };
    let (&[uyvy_stride, ..], [uyvy_plane, ..]) = (dst_strides, dst_buffers) else {
        return false;
    };

    let col_count = width as usize;
    let line_count = height as usize;
    if !planes_fit(&[
        (&y_plane[..], y_stride, line_count, col_count),
        (&u_plane[..], u_stride, line_count / 2, col_count / 2),
        (&v_plane[..], v_stride, line_count / 2, col_count / 2),
        (&uyvy_plane[..], uyvy_stride, line_count, 2 * col_count),
    ]) {
        return false;
    }

    for y in 0..line_count / 2 {
        for x in 0..col_count / 2 {
            let u = u_plane[wg_index(x, y, 1, u_stride)];
            let v = v_plane[wg_index(x, y, 1, v_stride)];

            for dy in 0..2 {
                let row = 2 * y + dy;
                let macropixel = wg_index(x, row, 4, uyvy_stride);
                uyvy_plane[macropixel] = u;
                uyvy_plane[macropixel + 1] = y_plane[wg_index(2 * x, row, 1, y_stride)];
                uyvy_plane[macropixel + 2] = v;
                uyvy_plane[macropixel + 3] = y_plane[wg_index(2 * x + 1, row, 1, y_stride)];
            }
        }
    }

    true
}

macro_rules! converter {
    ($name:ident, $body:ident $(, $arg:expr)*) => {
        pub fn $name(
            width: u32,
            height: u32,
            src_strides: &[usize],
            src_buffers: &[&[u8]],
            dst_strides: &[usize],
            dst_buffers: &mut [&mut [u8]],
        ) -> bool {
            $body(
                width,
                height,
                src_strides,
                src_buffers,
                dst_strides,
                dst_buffers,
                $($arg),*
            )
        }
    };
}

converter!(rgb24_nv12, rgb_to_semi_planar, Sampler::Rgb, 0);
converter!(rgb24_nv21, rgb_to_semi_planar, Sampler::Rgb, 1);
converter!(bgr24_nv12, rgb_to_semi_planar, Sampler::Bgr, 0);
converter!(bgr24_nv21, rgb_to_semi_planar, Sampler::Bgr, 1);
converter!(rgb24_i420, rgb_to_i420, Sampler::Rgb);
converter!(bgr24_i420, rgb_to_i420, Sampler::Bgr);
converter!(rgb24_uyvy, rgb_to_uyvy, Sampler::Rgb);
converter!(bgr24_uyvy, rgb_to_uyvy, Sampler::Bgr);
converter!(rgb24_i444, rgb_to_i444, Sampler::Rgb);
converter!(bgr24_i444, rgb_to_i444, Sampler::Bgr);
converter!(nv12_rgb24, semi_planar_to_rgb, Sampler::Rgb, 0);
converter!(nv21_rgb24, semi_planar_to_rgb, Sampler::Rgb, 1);
converter!(nv12_bgr24, semi_planar_to_rgb, Sampler::Bgr, 0);
converter!(nv21_bgr24, semi_planar_to_rgb, Sampler::Bgr, 1);
converter!(i420_rgb24, i420_to_rgb, Sampler::Rgb);
converter!(i420_bgr24, i420_to_rgb, Sampler::Bgr);
converter!(uyvy_rgb24, uyvy_to_rgb, Sampler::Rgb);
converter!(uyvy_bgr24, uyvy_to_rgb, Sampler::Bgr);
converter!(i444_rgb24, i444_to_rgb, Sampler::Rgb);
converter!(i444_bgr24, i444_to_rgb, Sampler::Bgr);
converter!(bgr24_rgb24, swap_rb, RGB_DEPTH);
converter!(rgb24_bgr24, swap_rb, RGB_DEPTH);
converter!(bgra32_rgba32, swap_rb, 4);
converter!(rgba32_bgra32, swap_rb, 4);
converter!(nv12_nv21, swap_uv);
converter!(nv21_nv12, swap_uv);
converter!(i444_nv12, i444_to_semi_planar, 0);
converter!(i444_nv21, i444_to_semi_planar, 1);
