use atlas_packer_core::compositing::{blit_rgba, compose, raster_origin};
use atlas_packer_core::prelude::*;
use image::{DynamicImage, Rgba, RgbaImage};

fn solid_image(w: u32, h: u32, rgba: [u8; 4]) -> DynamicImage {
    let mut img = RgbaImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            img.put_pixel(x, y, Rgba(rgba));
        }
    }
    DynamicImage::ImageRgba8(img)
}

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

#[test]
fn sprites_land_at_flipped_offsets() {
    let inputs = vec![
        InputImage {
            key: "c_big".into(),
            image: solid_image(64, 64, RED),
        },
        InputImage {
            key: "a_mid".into(),
            image: solid_image(32, 32, GREEN),
        },
        InputImage {
            key: "b_small".into(),
            image: solid_image(32, 16, BLUE),
        },
    ];
    let out = pack_images(inputs, PackerConfig::default()).expect("pack");
    assert_eq!(out.rgba.dimensions(), (128, 64));

    // a_mid sits at Y-up [32, 64) which is raster rows [0, 32)
    assert_eq!(out.manifest.get("a_mid"), Some(&Rect::new(64, 96, 32, 64)));
    assert_eq!(out.rgba.get_pixel(0, 0).0, RED);
    assert_eq!(out.rgba.get_pixel(63, 63).0, RED);
    assert_eq!(out.rgba.get_pixel(64, 0).0, GREEN);
    assert_eq!(out.rgba.get_pixel(95, 31).0, GREEN);
    assert_eq!(out.rgba.get_pixel(96, 0).0, BLUE);
    assert_eq!(out.rgba.get_pixel(127, 15).0, BLUE);
    // unused space stays transparent
    assert_eq!(out.rgba.get_pixel(96, 16).0, CLEAR);
    assert_eq!(out.rgba.get_pixel(64, 32).0, CLEAR);
    assert_eq!(out.rgba.get_pixel(127, 63).0, CLEAR);
}

#[test]
fn sprite_pixels_are_copied_verbatim_and_upright() {
    // top row red, bottom row blue: must stay that way after the flip
    let mut img = RgbaImage::new(3, 2);
    for x in 0..3 {
        img.put_pixel(x, 0, Rgba(RED));
        img.put_pixel(x, 1, Rgba([0, 0, 255, 128]));
    }
    let out = pack_images(
        vec![InputImage {
            key: "s".into(),
            image: DynamicImage::ImageRgba8(img),
        }],
        PackerConfig::default(),
    )
    .expect("pack");
    // area 6: estimate 4x2
    assert_eq!(out.rgba.dimensions(), (4, 2));
    let rect = out.manifest.get("s").copied().expect("placed");
    let (x0, y0) = raster_origin(&rect, out.layout.height);
    for x in 0..3 {
        assert_eq!(out.rgba.get_pixel(x0 + x, y0).0, RED);
        assert_eq!(out.rgba.get_pixel(x0 + x, y0 + 1).0, [0, 0, 255, 128]);
    }
}

#[test]
fn blit_clips_to_canvas() {
    let src = solid_image(4, 4, GREEN).to_rgba8();
    let mut canvas = RgbaImage::new(6, 6);
    blit_rgba(&src, &mut canvas, 4, 4);
    assert_eq!(canvas.get_pixel(5, 5).0, GREEN);
    assert_eq!(canvas.get_pixel(3, 3).0, CLEAR);
}

#[test]
fn compose_rejects_unknown_placement() {
    let layout = pack_layout(vec![("ghost", 4, 4)], PackerConfig::default()).expect("pack");
    let err = compose(&layout, &[]).expect_err("no sprite for ghost");
    assert!(err.to_string().contains("ghost"));
}

#[test]
fn compose_rejects_mismatched_sprite() {
    let layout = pack_layout(vec![("s", 4, 4)], PackerConfig::default()).expect("pack");
    let sprite = Sprite::new("s", RgbaImage::new(2, 2));
    assert!(compose(&layout, &[sprite]).is_err());
}

#[test]
fn blit_far_outside_canvas_is_a_no_op() {
    let src = solid_image(2, 2, GREEN).to_rgba8();
    let mut canvas = RgbaImage::new(4, 4);
    blit_rgba(&src, &mut canvas, u32::MAX, 0);
    blit_rgba(&src, &mut canvas, 0, u32::MAX);
    blit_rgba(&src, &mut canvas, u32::MAX - 1, u32::MAX - 1);
    assert!(canvas.pixels().all(|p| p.0 == CLEAR));

    // partial overlap still lands the visible corner
    blit_rgba(&src, &mut canvas, 3, 3);
    assert_eq!(canvas.get_pixel(3, 3).0, GREEN);
    assert_eq!(canvas.get_pixel(2, 2).0, CLEAR);
}
