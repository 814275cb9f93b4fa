use ras_crypto::kdfa;

/// KDFa's bit-masking of a non-byte-aligned output length.
#[test]
fn kdfa_masks_top_bits_of_first_octet() {
    let key = [0u8; 32];
    let out = kdfa(&key, "", &[], &[], 521).expect("kdfa should succeed");
    assert_eq!(out.len(), 66);
    assert_eq!(out[0] & 0b1111_1110, 0, "top 7 bits of first byte must be zero");
}

#[test]
fn kdfa_output_length_matches_requested_bits() {
    let key = [0x42u8; 32];
    for bits in [64u32, 128, 256, 512, 1024] {
        let out = kdfa(&key, "STORAGE", b"ctx-u", b"ctx-v", bits).unwrap();
        assert_eq!(out.len(), (bits as usize) / 8);
    }
}

#[test]
fn kdfa_rejects_oversized_output() {
    let key = [0u8; 32];
    let bits = (32768u32) * 8;
    assert!(kdfa(&key, "x", &[], &[], bits).is_err());
}

#[test]
fn kdfa_is_deterministic_for_same_inputs() {
    let key = b"a-fixed-key-0123".to_vec();
    let a = kdfa(&key, "STORAGE", b"name", &[], 256).unwrap();
    let b = kdfa(&key, "STORAGE", b"name", &[], 256).unwrap();
    assert_eq!(*a, *b);
}
