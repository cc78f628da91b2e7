use super::*;

#[test]
fn mul_div255_truncates() {
    assert_eq!(mul_div255(255, 255), 255);
    assert_eq!(mul_div255(128, 128), 64);
    assert_eq!(mul_div255(1, 254), 0);
    assert_eq!(mul_div255(200, 0), 0);
}

#[test]
fn expand_replicates_high_bits() {
    assert_eq!(expand_to_u8(31, 5), 255);
    assert_eq!(expand_to_u8(0, 5), 0);
    assert_eq!(expand_to_u8(16, 5), 132);
    assert_eq!(expand_to_u8(1, 1), 255);
    assert_eq!(expand_to_u8(0b101, 3), 0b1011_0110);
    assert_eq!(expand_to_u8(63, 6), 255);
    assert_eq!(expand_to_u8(0xAB, 8), 0xAB);
    assert_eq!(expand_to_u8(0, 0), 0);
}

#[test]
fn nearest_steps_identity_when_sizes_match() {
    let v: Vec<usize> = NearestSteps::new(5, 5).collect();
    assert_eq!(v, vec![0, 1, 2, 3, 4]);
}

#[test]
fn nearest_steps_upscale_repeats() {
    let v: Vec<usize> = NearestSteps::new(2, 4).collect();
    assert_eq!(v, vec![0, 0, 1, 1]);
}

#[test]
fn nearest_steps_downscale_skips() {
    let v: Vec<usize> = NearestSteps::new(4, 2).collect();
    assert_eq!(v, vec![0, 2]);
    assert_eq!(NearestSteps::new(4, 2).len(), 2);
}
