use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(0, 200), 0);
    assert_eq!(mul_div255_u8(100, 128), 50);
}

#[test]
fn premultiply_fast_paths() {
    assert_eq!(premultiply([10, 20, 30, 0]), [0, 0, 0, 0]);
    assert_eq!(premultiply([10, 20, 30, 255]), [10, 20, 30, 255]);
}

#[test]
fn premultiply_then_unpremultiply_is_close() {
    let px = [200, 100, 50, 128];
    let back = unpremultiply(premultiply(px));
    for i in 0..3 {
        assert!((i32::from(back[i]) - i32::from(px[i])).abs() <= 2);
    }
    assert_eq!(back[3], 128);
}
