use super::*;

#[test]
fn parse_list_accepts_names_and_aliases() {
    assert_eq!(CpuCaps::parse_list("none").unwrap(), CpuCaps::empty());
    assert_eq!(CpuCaps::parse_list("").unwrap(), CpuCaps::empty());
    assert_eq!(CpuCaps::parse_list("simd128").unwrap(), CpuCaps::SIMD128);
    assert_eq!(
        CpuCaps::parse_list(" SSE2 , avx2 ").unwrap(),
        CpuCaps::SIMD128 | CpuCaps::SIMD256
    );
    assert_eq!(CpuCaps::parse_list("neon").unwrap(), CpuCaps::SIMD128);
}

#[test]
fn parse_list_rejects_unknown_names() {
    let err = CpuCaps::parse_list("simd128,avx512").unwrap_err();
    assert!(err.to_string().starts_with("invalid argument: "));
    assert!(err.to_string().contains("avx512"));
}

#[test]
fn store_width_follows_widest_capability() {
    assert_eq!(CpuCaps::empty().store_width(), 8);
    assert_eq!(CpuCaps::SIMD128.store_width(), 16);
    assert_eq!((CpuCaps::SIMD128 | CpuCaps::SIMD256).store_width(), 32);
}

#[test]
fn detect_is_stable() {
    assert_eq!(CpuCaps::detect(), CpuCaps::detect());
}
