use super::*;

fn cs(millis: u32) -> u16 {
    FrameDelay::from_millis(millis).unwrap().centiseconds()
}

#[test]
fn centiseconds_round_to_nearest_with_floor_of_one() {
    assert_eq!(cs(1), 1);
    assert_eq!(cs(4), 1);
    assert_eq!(cs(14), 1);
    assert_eq!(cs(15), 2);
    assert_eq!(cs(100), 10);
    assert_eq!(cs(104), 10);
    assert_eq!(cs(105), 11);
}

#[test]
fn centiseconds_clamp_to_gif_maximum() {
    assert_eq!(cs(655_350), u16::MAX);
    assert_eq!(cs(u32::MAX), u16::MAX);
}

#[test]
fn zero_delay_is_rejected() {
    assert!(matches!(
        FrameDelay::from_millis(0),
        Err(AvatarGifError::Validation(_))
    ));
}

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 4).is_err());
    assert!(Canvas::new(4, 0).is_err());
    assert_eq!(Canvas::new(3, 2).unwrap().rgba_len(), 24);
}

#[test]
fn gif_repeat_maps_to_loop_count() {
    assert_eq!(LoopCount::from(gif::Repeat::Infinite), LoopCount::Infinite);
    assert_eq!(LoopCount::from(gif::Repeat::Finite(0)), LoopCount::Once);
    assert_eq!(LoopCount::from(gif::Repeat::Finite(3)), LoopCount::Finite(3));
}
