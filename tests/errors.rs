#![warn(unused)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unsafe_code)]
#![deny(unstable_features)]
#![deny(unused_import_braces)]
#![deny(
    clippy::complexity,
    clippy::correctness,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]
#![allow(clippy::too_many_lines)] // This requires effort to handle

use itertools::iproduct;
use offscreen_primitives as osp;
use osp::{convert_from, load, save, ErrorKind, ImageDescriptor, ImagePathInfo, PixelFormat, Size};
use std::mem::discriminant;

const PIXEL_FORMATS: &[PixelFormat; 10] = &[
    PixelFormat::RGB24,
    PixelFormat::BGR24,
    PixelFormat::RGBA32,
    PixelFormat::BGRA32,
    PixelFormat::GRAY,
    PixelFormat::NV12,
    PixelFormat::NV21,
    PixelFormat::I420,
    PixelFormat::I444,
    PixelFormat::UYVY,
];

const SUPPORTED_PAIRS: &[(PixelFormat, PixelFormat)] = &[
    (PixelFormat::RGB24, PixelFormat::NV12),
    (PixelFormat::RGB24, PixelFormat::NV21),
    (PixelFormat::RGB24, PixelFormat::I420),
    (PixelFormat::RGB24, PixelFormat::UYVY),
    (PixelFormat::RGB24, PixelFormat::I444),
    (PixelFormat::RGB24, PixelFormat::BGR24),
    (PixelFormat::BGR24, PixelFormat::NV12),
    (PixelFormat::BGR24, PixelFormat::NV21),
    (PixelFormat::BGR24, PixelFormat::I420),
    (PixelFormat::BGR24, PixelFormat::UYVY),
    (PixelFormat::BGR24, PixelFormat::I444),
    (PixelFormat::BGR24, PixelFormat::RGB24),
    (PixelFormat::NV12, PixelFormat::RGB24),
    (PixelFormat::NV12, PixelFormat::BGR24),
    (PixelFormat::NV12, PixelFormat::NV21),
    (PixelFormat::NV21, PixelFormat::RGB24),
    (PixelFormat::NV21, PixelFormat::BGR24),
    (PixelFormat::NV21, PixelFormat::NV12),
    (PixelFormat::I420, PixelFormat::RGB24),
    (PixelFormat::I420, PixelFormat::BGR24),
    (PixelFormat::I420, PixelFormat::UYVY),
    (PixelFormat::UYVY, PixelFormat::RGB24),
    (PixelFormat::UYVY, PixelFormat::BGR24),
    (PixelFormat::I444, PixelFormat::RGB24),
    (PixelFormat::I444, PixelFormat::BGR24),
    (PixelFormat::I444, PixelFormat::NV12),
    (PixelFormat::I444, PixelFormat::NV21),
    (PixelFormat::RGBA32, PixelFormat::BGRA32),
    (PixelFormat::BGRA32, PixelFormat::RGBA32),
];

macro_rules! set_expected {
    ($var:ident, $pred:expr, $status:expr) => {
        if $var.is_ok() && $pred {
            $var = Err($status);
        }
    };
}

fn check_err<T>(result: Result<T, ErrorKind>, err: &ErrorKind) {
    match result {
        Ok(_) => panic!("expected {err:?}"),
        Err(kind) => assert_eq!(discriminant(&kind), discriminant(err), "{kind:?}"),
    }
}

fn splits_chroma_block(format: PixelFormat, width: u32, height: u32) -> bool {
    match format {
        PixelFormat::NV12 | PixelFormat::NV21 | PixelFormat::I420 => {
            width % 2 == 1 || height % 2 == 1
        }
        PixelFormat::UYVY => width % 2 == 1,
        _ => false,
    }
}

#[test]
fn conversion_errors() {
    for (src_format, dst_format, width, height) in
        iproduct!(PIXEL_FORMATS, PIXEL_FORMATS, 1..=4, 1..=3)
    {
        let (src_format, dst_format) = (*src_format, *dst_format);
        let src = ImageDescriptor::create(src_format, Size::new(width, height)).unwrap();

        let mut expected: Result<(), ErrorKind> = Ok(());
        set_expected!(
            expected,
            !SUPPORTED_PAIRS.contains(&(src_format, dst_format)),
            ErrorKind::InvalidOperation {
                src: src_format,
                dst: dst_format
            }
        );
        set_expected!(
            expected,
            splits_chroma_block(src_format, width, height)
                || splits_chroma_block(dst_format, width, height),
            ErrorKind::InvalidValue
        );

        let result = convert_from(&src, dst_format);
        match expected {
            Ok(()) => {
                let dst = result.unwrap();
                assert_eq!(dst.format(), dst_format);
                assert!(dst.validate());
            }
            Err(err) => check_err(result, &err),
        }
    }
}

#[test]
fn unsupported_pair_names_formats() {
    let nv12 = ImageDescriptor::create(PixelFormat::NV12, Size::new(4, 4)).unwrap();
    match convert_from(&nv12, PixelFormat::I444) {
        Err(ErrorKind::InvalidOperation { src, dst }) => {
            assert_eq!(src, PixelFormat::NV12);
            assert_eq!(dst, PixelFormat::I444);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn named_conversions_check_source() {
    let nv21 = ImageDescriptor::create(PixelFormat::NV21, Size::new(4, 4)).unwrap();
    let rgba = ImageDescriptor::create(PixelFormat::RGBA32, Size::new(4, 4)).unwrap();
    let invalid_operation = ErrorKind::InvalidOperation {
        src: PixelFormat::UNKNOWN,
        dst: PixelFormat::UNKNOWN,
    };

    check_err(osp::rgb_to_nv12(&nv21), &invalid_operation);
    check_err(osp::rgb_to_i444(&rgba), &invalid_operation);
    check_err(osp::rgb_from_nv12(&nv21), &invalid_operation);
    check_err(osp::rgb_from_uyvy(&rgba), &invalid_operation);
    check_err(osp::i420_to_uyvy(&nv21), &invalid_operation);
    check_err(osp::i444_to_nv21(&nv21), &invalid_operation);
    assert!(osp::rgb_from_nv21(&nv21).is_ok());
}

#[test]
fn missing_planes() {
    let size = Size::new(4, 4);

    let empty = ImageDescriptor::create_header_only(PixelFormat::NV12, size).unwrap();
    check_err(convert_from(&empty, PixelFormat::RGB24), &ErrorKind::NotEnoughData);

    let mut short = ImageDescriptor::create_header_only(PixelFormat::NV12, size).unwrap();
    short.bind_plane(0, vec![0; 16], 4).unwrap();
    short.bind_plane(1, vec![0; 6], 4).unwrap();
    check_err(convert_from(&short, PixelFormat::BGR24), &ErrorKind::NotEnoughData);

    let mut narrow = ImageDescriptor::create_header_only(PixelFormat::RGB24, size).unwrap();
    narrow.bind_plane(0, vec![0; 48], 8).unwrap();
    check_err(convert_from(&narrow, PixelFormat::I444), &ErrorKind::NotEnoughData);
}

#[test]
fn unregistered_format() {
    let format = PixelFormat::from_raw(0xdead);
    check_err(
        ImageDescriptor::create(format, Size::new(2, 2)),
        &ErrorKind::UnsupportedFormat(format),
    );
    check_err(
        ImageDescriptor::create_header_only(format, Size::new(2, 2)),
        &ErrorKind::UnsupportedFormat(format),
    );
}

#[test]
fn plane_index_out_of_range() {
    let mut image = ImageDescriptor::create(PixelFormat::I420, Size::new(2, 2)).unwrap();

    check_err(image.plane_view(4), &ErrorKind::InvalidPlaneIndex(4));
    check_err(image.bind_plane(7, vec![0; 4], 2), &ErrorKind::InvalidPlaneIndex(7));
    assert!(image.plane(4).is_none());
    assert!(image.plane_mut(9).is_none());
    assert!(image.plane_view(3).is_ok());
}

#[test]
fn draw_point_errors() {
    let size = Size::new(8, 8);
    for format in PIXEL_FORMATS
        .iter()
        .filter(|&&f| f != PixelFormat::NV12 && f != PixelFormat::NV21)
    {
        let mut image = ImageDescriptor::create(*format, size).unwrap();
        let copy = image.clone();
        check_err(
            image.draw_point((4.0, 4.0), 2, [255, 0, 0]),
            &ErrorKind::UnsupportedFormat(*format),
        );
        assert_eq!(image.plane(0), copy.plane(0));
    }

    let mut header = ImageDescriptor::create_header_only(PixelFormat::NV21, size).unwrap();
    check_err(
        header.draw_point((4.0, 4.0), 2, [255, 0, 0]),
        &ErrorKind::NotEnoughData,
    );
}

#[test]
fn malformed_paths() {
    let invalid_path = ErrorKind::InvalidPath(String::new());
    for path in [
        "foo.NV12",
        "foo_64by48.NV12",
        "foo_64x48",
        "foo_64x48.",
        "foo_-4x48.NV12",
        "foo_+64x48.NV12",
        "foo_64x+48.NV12",
        "foo_6 4x48.NV12",
        "foo_64x.NV12",
        "",
    ] {
        check_err(ImagePathInfo::parse(path), &invalid_path);
    }
}

#[test]
fn invalid_prefix() {
    let image = ImageDescriptor::create(PixelFormat::NV12, Size::new(2, 2)).unwrap();
    let dir = std::env::temp_dir();

    for prefix in ["bad-prefix", "a b", "../escape", "naïve"] {
        check_err(
            save(&dir, prefix, &image),
            &ErrorKind::InvalidPrefix(String::new()),
        );
    }
}

#[test]
fn format_without_extension() {
    let image = ImageDescriptor::create(PixelFormat::GRAY, Size::new(2, 2)).unwrap();
    check_err(
        save(std::env::temp_dir(), "gray", &image),
        &ErrorKind::UnsupportedFormat(PixelFormat::GRAY),
    );
}

#[test]
fn load_failures() {
    let dir = std::env::temp_dir().join(format!("offscreen-primitives-missing-{}", std::process::id()));

    match load(dir.join("frame_4x4.NV12")) {
        Err(ErrorKind::Io(error)) => assert_eq!(error.kind(), std::io::ErrorKind::NotFound),
        other => panic!("unexpected {other:?}"),
    }

    check_err(
        load(dir.join("frame_4x4.PNG")),
        &ErrorKind::UnsupportedFormat(PixelFormat::UNKNOWN),
    );
    check_err(
        osp::load_as(dir.join("frame_4x4.NV12"), PixelFormat::YUYV),
        &ErrorKind::UnsupportedFormat(PixelFormat::YUYV),
    );
}

#[test]
fn negative_offscreen_fields() {
    let mut image = ImageDescriptor::create(PixelFormat::GRAY, Size::new(4, 2)).unwrap();
    let mut offscreen = image.as_offscreen().unwrap();
    offscreen.pitch[0] = -4;

    #[allow(unsafe_code)]
    let result = unsafe { ImageDescriptor::from_offscreen(&offscreen) };
    check_err(result, &ErrorKind::InvalidValue);
}
