use image::Rgba;

use super::*;

fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba(px))
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    assert_eq!(over(dst, [255, 255, 255, 0]), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    assert_eq!(over([0, 0, 0, 255], [255, 0, 0, 255]), [255, 0, 0, 255]);
}

#[test]
fn over_dst_transparent_returns_src() {
    let src = [100, 110, 120, 200];
    assert_eq!(over([0, 0, 0, 0], src), src);
}

#[test]
fn over_straight_half_red_on_opaque_blue() {
    let out = over_straight([0, 0, 255, 255], [255, 0, 0, 128]);
    assert_eq!(out[3], 255);
    assert!((i32::from(out[0]) - 128).abs() <= 1);
    assert!((i32::from(out[2]) - 127).abs() <= 1);
}

#[test]
fn placement_applies_inset() {
    let p = Placement::from_entry(PositionEntry::new(50, 60, 120), DEFAULT_PASTE_INSET);
    assert_eq!(p.origin(), (46, 56));

    let p = Placement::from_entry(PositionEntry::new(2, 0, 8), DEFAULT_PASTE_INSET);
    assert_eq!(p.origin(), (-2, -4));
}

#[test]
fn paste_writes_at_origin() {
    let mut bg = solid(8, 8, [0, 0, 255, 255]);
    paste_over(&mut bg, &solid(2, 2, [255, 0, 0, 255]), 3, 4);

    assert_eq!(bg.get_pixel(3, 4).0, [255, 0, 0, 255]);
    assert_eq!(bg.get_pixel(4, 5).0, [255, 0, 0, 255]);
    assert_eq!(bg.get_pixel(2, 4).0, [0, 0, 255, 255]);
    assert_eq!(bg.get_pixel(5, 4).0, [0, 0, 255, 255]);
    assert_eq!(bg.get_pixel(3, 6).0, [0, 0, 255, 255]);
}

#[test]
fn paste_clips_negative_and_overflowing_origins() {
    let mut bg = solid(4, 4, [0, 0, 0, 0]);
    paste_over(&mut bg, &solid(3, 3, [9, 9, 9, 255]), -2, -2);
    assert_eq!(bg.get_pixel(0, 0).0, [9, 9, 9, 255]);
    assert_eq!(bg.get_pixel(1, 0).0, [0, 0, 0, 0]);

    paste_over(&mut bg, &solid(3, 3, [7, 7, 7, 255]), 3, 3);
    assert_eq!(bg.get_pixel(3, 3).0, [7, 7, 7, 255]);

    // Entirely outside: untouched.
    let before = bg.clone();
    paste_over(&mut bg, &solid(3, 3, [1, 1, 1, 255]), 10, -10);
    assert_eq!(bg, before);
}

#[test]
fn transparent_avatar_pixels_keep_frame() {
    let mut bg = solid(4, 4, [20, 30, 40, 255]);
    paste_over(&mut bg, &solid(4, 4, [0, 0, 0, 0]), 0, 0);
    assert_eq!(bg, solid(4, 4, [20, 30, 40, 255]));
}

#[test]
fn composite_identity_rotation_keeps_canvas() {
    let frame = solid(10, 6, [0, 255, 0, 255]);
    let avatar = solid(2, 2, [255, 0, 0, 255]);
    let placement = Placement {
        offset_x: 5,
        offset_y: 5,
        inset: 4,
    };

    let a = composite(&frame, &avatar, placement, Rotation::NONE);
    let b = composite(
        &frame,
        &avatar,
        placement,
        Rotation::from_degrees(360.0).unwrap(),
    );
    assert_eq!(a.dimensions(), (10, 6));
    assert_eq!(a, b);
    assert_eq!(a.get_pixel(1, 1).0, [255, 0, 0, 255]);
    assert_eq!(a.get_pixel(0, 0).0, [0, 255, 0, 255]);
}

#[test]
fn composite_rotates_whole_frame() {
    let frame = solid(4, 2, [0, 255, 0, 255]);
    let avatar = solid(1, 1, [255, 0, 0, 255]);
    let placement = Placement {
        offset_x: 0,
        offset_y: 0,
        inset: 0,
    };

    let out = composite(
        &frame,
        &avatar,
        placement,
        Rotation::from_degrees(90.0).unwrap(),
    );
    assert_eq!(out.dimensions(), (2, 4));
    // Top-left of the frame ends up top-right after a clockwise quarter turn.
    assert_eq!(out.get_pixel(1, 0).0, [255, 0, 0, 255]);
    assert_eq!(out.get_pixel(0, 0).0, [0, 255, 0, 255]);
}
