#![allow(dead_code)]
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use offscreen_primitives::{ImageDescriptor, PixelFormat, Size};
use rand::Rng;

pub const RGB_SRC: [[[u8; 4]; 8]; 8] = [
    [
        [161, 24, 44, 58],
        [35, 95, 51, 205],
        [177, 30, 252, 158],
        [248, 94, 62, 28],
        [247, 51, 135, 38],
        [98, 147, 200, 127],
        [68, 103, 20, 124],
        [233, 227, 165, 0],
    ],
    [
        [251, 19, 32, 170],
        [235, 183, 25, 77],
        [146, 81, 218, 161],
        [25, 124, 96, 56],
        [22, 127, 167, 179],
        [247, 34, 40, 53],
        [164, 193, 159, 24],
        [96, 158, 17, 223],
    ],
    [
        [240, 123, 14, 108],
        [0, 105, 52, 116],
        [194, 219, 244, 47],
        [216, 254, 153, 84],
        [116, 77, 133, 68],
        [190, 96, 190, 133],
        [118, 4, 170, 115],
        [218, 145, 23, 50],
    ],
    [
        [202, 120, 126, 231],
        [42, 28, 137, 40],
        [136, 227, 210, 177],
        [254, 140, 238, 88],
        [90, 195, 170, 67],
        [125, 242, 148, 88],
        [1, 91, 190, 245],
        [31, 100, 190, 225],
    ],
    [
        [207, 49, 249, 131],
        [48, 120, 34, 82],
        [43, 145, 253, 141],
        [83, 205, 105, 44],
        [16, 9, 157, 22],
        [253, 131, 178, 148],
        [142, 236, 98, 6],
        [246, 190, 15, 213],
    ],
    [
        [72, 207, 6, 168],
        [220, 39, 6, 219],
        [244, 14, 252, 45],
        [159, 106, 17, 184],
        [222, 72, 230, 39],
        [6, 185, 30, 35],
        [101, 223, 30, 14],
        [40, 71, 16, 244],
    ],
    [
        [124, 121, 46, 190],
        [244, 206, 61, 169],
        [43, 130, 87, 247],
        [170, 10, 238, 229],
        [12, 168, 14, 220],
        [96, 60, 226, 235],
        [206, 93, 122, 117],
        [126, 168, 203, 39],
    ],
    [
        [181, 88, 248, 45],
        [65, 24, 208, 166],
        [24, 21, 151, 85],
        [60, 86, 9, 153],
        [225, 80, 156, 159],
        [210, 181, 6, 214],
        [17, 142, 255, 163],
        [189, 137, 72, 87],
    ],
];

/// Bytes per pixel and channel offsets (red, green, blue, alpha) of the packed rgb formats.
pub fn rgb_layout(format: PixelFormat) -> (usize, [usize; 4]) {
    match format {
        PixelFormat::RGB24 => (3, [0, 1, 2, 3]),
        PixelFormat::BGR24 => (3, [2, 1, 0, 3]),
        PixelFormat::RGBA32 => (4, [0, 1, 2, 3]),
        PixelFormat::BGRA32 => (4, [2, 1, 0, 3]),
        _ => unreachable!(),
    }
}

/// Writes `pixel(x, y)` (red, green, blue, alpha) into a packed rgb image.
pub fn fill_rgb(image: &mut ImageDescriptor, pixel: impl Fn(usize, usize) -> [u8; 4]) {
    let (depth, offsets) = rgb_layout(image.format());
    let pitch = image.pitches()[0];
    let (width, height) = (image.width() as usize, image.height() as usize);
    let Some(plane) = image.plane_mut(0) else {
        return;
    };

    for y in 0..height {
        for x in 0..width {
            let value = pixel(x, y);
            for (&offset, &channel) in offsets.iter().zip(&value).take(depth) {
                plane[y * pitch + x * depth + offset] = channel;
            }
        }
    }
}

/// Reads pixel (x, y) of a packed rgb image as (red, green, blue, alpha).
pub fn rgb_at(image: &ImageDescriptor, x: usize, y: usize) -> [u8; 4] {
    let (depth, offsets) = rgb_layout(image.format());
    let pitch = image.pitches()[0];
    let plane = image.plane(0).unwrap();

    let mut value = [0, 0, 0, 255];
    for (channel, &offset) in value.iter_mut().zip(&offsets).take(depth) {
        *channel = plane[y * pitch + x * depth + offset];
    }

    value
}

/// Sample (x, y) of plane `index`, for single byte sample planes.
pub fn sample(image: &ImageDescriptor, index: usize, x: usize, y: usize) -> u8 {
    let pitch = image.pitches()[index];
    image.plane(index).unwrap()[y * pitch + x]
}

/// Fills the meaningful bytes of every populated plane with random values.
pub fn fill_random(image: &mut ImageDescriptor, rng: &mut impl Rng) {
    let views: Vec<_> = (0..4).map(|index| image.plane_view(index).unwrap()).collect();
    for (plane, view) in image.planes_mut().into_iter().zip(views) {
        if let Some(plane) = plane {
            for y in 0..view.height {
                let row = &mut plane[y * view.pitch..y * view.pitch + view.row_bytes()];
                rng.fill(row);
            }
        }
    }
}

/// An rgb image whose pixels are constant over each 2x2 block.
pub fn block_constant_image(
    format: PixelFormat,
    width: u32,
    height: u32,
    rng: &mut impl Rng,
) -> ImageDescriptor {
    let stride = (width as usize + 1) / 2;
    let blocks: Vec<[u8; 4]> = (0..stride * ((height as usize + 1) / 2))
        .map(|_| [rng.random(), rng.random(), rng.random(), 255])
        .collect();

    let mut image = ImageDescriptor::create(format, Size::new(width, height)).unwrap();
    fill_rgb(&mut image, |x, y| blocks[(y / 2) * stride + x / 2]);
    image
}

fn saturate(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

/// Reference luma, BT.601 standard range, truncated.
pub fn ref_y([r, g, b, _]: [u8; 4]) -> u8 {
    let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
    saturate(0.257 * r + 0.504 * g + 0.098 * b + 16.0)
}

/// Reference chroma (u, v), BT.601 standard range, truncated.
pub fn ref_uv([r, g, b, _]: [u8; 4]) -> (u8, u8) {
    let (r, g, b) = (f64::from(r), f64::from(g), f64::from(b));
    (
        saturate(-0.148 * r - 0.291 * g + 0.439 * b + 128.0),
        saturate(0.439 * r - 0.368 * g - 0.071 * b + 128.0),
    )
}

/// Reference yuv to rgb, fixed point with 20 fractional bits.
pub fn ref_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let fix = |c: f64| (c * f64::from(1 << 20)).round() as i32;
    let to_u8 = |value: i32| (value >> 20).clamp(0, 255) as u8;

    let l = (i32::from(y) - 16).max(0) * fix(1.164);
    let u = i32::from(u) - 128;
    let v = i32::from(v) - 128;
    let half = 1 << 19;

    [
        to_u8(l + half + fix(1.596) * v),
        to_u8(l + half + fix(-0.813) * v + fix(-0.391) * u),
        to_u8(l + half + fix(2.018) * u),
    ]
}
