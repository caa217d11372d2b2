// Encodings of the private data initialization. Immediates are little-endian in the
// instruction stream; the reconstructed secret stores each word big-endian.

/// `mov dword [rbp+disp32], imm32`
pub fn data_store(displacement: i32, immediate: u32) -> Vec<u8> {
    let mut code = vec![0xC7, 0x85];
    code.extend_from_slice(&displacement.to_le_bytes());
    code.extend_from_slice(&immediate.to_le_bytes());
    code
}

/// `mov dword [rsp+disp8], 16`
pub fn terminator(displacement: i8) -> Vec<u8> {
    vec![0xC7, 0x44, 0x24, displacement as u8, 0x10, 0x00, 0x00, 0x00]
}

/// Four consecutive data stores from `rbp-0x40` upwards, followed by the length store.
pub fn idiom(words: [u32; 4]) -> Vec<u8> {
    let mut code = Vec::new();
    for (i, word) in words.into_iter().enumerate() {
        code.extend(data_store(-0x40 + 4 * i as i32, word));
    }
    code.extend(terminator(0x30));
    code
}

/// Idiom whose secret is `00 01 02 .. 0F`; CRC-32 0xCECEE288, not allow-listed.
pub const IDIOM_00_0F: [u8; 48] = [
    0xC7, 0x85, 0xC0, 0xFF, 0xFF, 0xFF, 0x03, 0x02, 0x01, 0x00,
    0xC7, 0x85, 0xC4, 0xFF, 0xFF, 0xFF, 0x07, 0x06, 0x05, 0x04,
    0xC7, 0x85, 0xC8, 0xFF, 0xFF, 0xFF, 0x0B, 0x0A, 0x09, 0x08,
    0xC7, 0x85, 0xCC, 0xFF, 0xFF, 0xFF, 0x0F, 0x0E, 0x0D, 0x0C,
    0xC7, 0x44, 0x24, 0x30, 0x10, 0x00, 0x00, 0x00,
];

/// 16 bytes whose CRC-32 is the Steam build checksum 0x85AC72FB.
pub const STEAM_SECRET: [u8; 16] = [
    0x4E, 0x76, 0x46, 0x42, 0x43, 0x50, 0x72, 0x69, 0x76, 0x44, 0x61, 0x74, 0x1E, 0x37, 0xAC,
    0xC4,
];

/// 16 bytes whose CRC-32 is the NVIDIA build checksum 0x3806C005.
pub const NVIDIA_SECRET: [u8; 16] = [
    0x4E, 0x76, 0x46, 0x42, 0x43, 0x50, 0x72, 0x69, 0x76, 0x44, 0x61, 0x74, 0xF9, 0x78, 0x18,
    0x4E,
];

/// Idiom encoding [`STEAM_SECRET`].
pub const STEAM_IDIOM: [u8; 48] = [
    0xC7, 0x85, 0xC0, 0xFF, 0xFF, 0xFF, 0x42, 0x46, 0x76, 0x4E,
    0xC7, 0x85, 0xC4, 0xFF, 0xFF, 0xFF, 0x69, 0x72, 0x50, 0x43,
    0xC7, 0x85, 0xC8, 0xFF, 0xFF, 0xFF, 0x74, 0x61, 0x44, 0x76,
    0xC7, 0x85, 0xCC, 0xFF, 0xFF, 0xFF, 0xC4, 0xAC, 0x37, 0x1E,
    0xC7, 0x44, 0x24, 0x30, 0x10, 0x00, 0x00, 0x00,
];

/// Idiom encoding [`NVIDIA_SECRET`].
pub const NVIDIA_IDIOM: [u8; 48] = [
    0xC7, 0x85, 0xC0, 0xFF, 0xFF, 0xFF, 0x42, 0x46, 0x76, 0x4E,
    0xC7, 0x85, 0xC4, 0xFF, 0xFF, 0xFF, 0x69, 0x72, 0x50, 0x43,
    0xC7, 0x85, 0xC8, 0xFF, 0xFF, 0xFF, 0x74, 0x61, 0x44, 0x76,
    0xC7, 0x85, 0xCC, 0xFF, 0xFF, 0xFF, 0x4E, 0x18, 0x78, 0xF9,
    0xC7, 0x44, 0x24, 0x30, 0x10, 0x00, 0x00, 0x00,
];

#[test]
fn fixtures_agree() {
    assert_eq!(idiom([0x0001_0203, 0x0405_0607, 0x0809_0A0B, 0x0C0D_0E0F]), IDIOM_00_0F);
    assert_eq!(idiom([0x4E76_4642, 0x4350_7269, 0x7644_6174, 0x1E37_ACC4]), STEAM_IDIOM);
    assert_eq!(idiom([0x4E76_4642, 0x4350_7269, 0x7644_6174, 0xF978_184E]), NVIDIA_IDIOM);
}
