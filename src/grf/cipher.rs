//! Keyless block cipher used to obfuscate entry names in generation-1
//! directories.
//!
//! Structurally a single-round DES variant: initial permutation, one Feistel
//! round over four substitution boxes, final permutation. There is no key
//! schedule; the fixed tables below are the only secret material, so
//! decryption is a deterministic transform. The final permutation inverts
//! the initial one and the round is self-inverse, which makes the whole
//! block transform an involution.

pub const BLOCK_SIZE: usize = 8;

#[rustfmt::skip]
const INITIAL_PERMUTATION_TABLE: [u8; 64] = [
    58, 50, 42, 34, 26, 18, 10,  2, 60, 52, 44, 36, 28, 20, 12,  4,
    62, 54, 46, 38, 30, 22, 14,  6, 64, 56, 48, 40, 32, 24, 16,  8,
    57, 49, 41, 33, 25, 17,  9,  1, 59, 51, 43, 35, 27, 19, 11,  3,
    61, 53, 45, 37, 29, 21, 13,  5, 63, 55, 47, 39, 31, 23, 15,  7,
];

#[rustfmt::skip]
const FINAL_PERMUTATION_TABLE: [u8; 64] = [
    40,  8, 48, 16, 56, 24, 64, 32, 39,  7, 47, 15, 55, 23, 63, 31,
    38,  6, 46, 14, 54, 22, 62, 30, 37,  5, 45, 13, 53, 21, 61, 29,
    36,  4, 44, 12, 52, 20, 60, 28, 35,  3, 43, 11, 51, 19, 59, 27,
    34,  2, 42, 10, 50, 18, 58, 26, 33,  1, 41,  9, 49, 17, 57, 25,
];

#[rustfmt::skip]
const TRANSPOSITION_TABLE: [u8; 32] = [
    16,  7, 20, 21, 29, 12, 28, 17,  1, 15, 23, 26,  5, 18, 31, 10,
     2,  8, 24, 14, 32, 27,  3,  9, 19, 13, 30,  6, 22, 11,  4, 25,
];

#[rustfmt::skip]
const EXPANSION_TABLE: [u8; 48] = [
    32,  1,  2,  3,  4,  5,
     4,  5,  6,  7,  8,  9,
     8,  9, 10, 11, 12, 13,
    12, 13, 14, 15, 16, 17,
    16, 17, 18, 19, 20, 21,
    20, 21, 22, 23, 24, 25,
    24, 25, 26, 27, 28, 29,
    28, 29, 30, 31, 32,  1,
];

#[rustfmt::skip]
const SUBSTITUTION_BOXES: [[u8; 64]; 4] = [
    [
        0xef, 0x03, 0x41, 0xfd, 0xd8, 0x74, 0x1e, 0x47,  0x26, 0xef, 0xfb, 0x22, 0xb3, 0xd8, 0x84, 0x1e,
        0x39, 0xac, 0xa7, 0x60, 0x62, 0xc1, 0xcd, 0xba,  0x5c, 0x96, 0x90, 0x59, 0x05, 0x3b, 0x7a, 0x85,
        0x40, 0xfd, 0x1e, 0xc8, 0xe7, 0x8a, 0x8b, 0x21,  0xda, 0x43, 0x64, 0x9f, 0x2d, 0x14, 0xb1, 0x72,
        0xf5, 0x5b, 0xc8, 0xb6, 0x9c, 0x37, 0x76, 0xec,  0x39, 0xa0, 0xa3, 0x05, 0x52, 0x6e, 0x0f, 0xd9,
    ],
    [
        0xa7, 0xdd, 0x0d, 0x78, 0x9e, 0x0b, 0xe3, 0x95,  0x60, 0x36, 0x36, 0x4f, 0xf9, 0x60, 0x5a, 0xa3,
        0x11, 0x24, 0xd2, 0x87, 0xc8, 0x52, 0x75, 0xec,  0xbb, 0xc1, 0x4c, 0xba, 0x24, 0xfe, 0x8f, 0x19,
        0xda, 0x13, 0x66, 0xaf, 0x49, 0xd0, 0x90, 0x06,  0x8c, 0x6a, 0xfb, 0x91, 0x37, 0x8d, 0x0d, 0x78,
        0xbf, 0x49, 0x11, 0xf4, 0x23, 0xe5, 0xce, 0x3b,  0x55, 0xbc, 0xa2, 0x57, 0xe8, 0x22, 0x74, 0xce,
    ],
    [
        0x2c, 0xea, 0xc1, 0xbf, 0x4a, 0x24, 0x1f, 0xc2,  0x79, 0x47, 0xa2, 0x7c, 0xb6, 0xd9, 0x68, 0x15,
        0x80, 0x56, 0x5d, 0x01, 0x33, 0xfd, 0xf4, 0xae,  0xde, 0x30, 0x07, 0x9b, 0xe5, 0x83, 0x9b, 0x68,
        0x49, 0xb4, 0x2e, 0x83, 0x1f, 0xc2, 0xb5, 0x7c,  0xa2, 0x19, 0xd8, 0xe5, 0x7c, 0x2f, 0x83, 0xda,
        0xf7, 0x6b, 0x90, 0xfe, 0xc4, 0x01, 0x5a, 0x97,  0x61, 0xa6, 0x3d, 0x40, 0x0b, 0x58, 0xe6, 0x3d,
    ],
    [
        0x4d, 0xd1, 0xb2, 0x0f, 0x28, 0xbd, 0xe4, 0x78,  0xf6, 0x4a, 0x0f, 0x93, 0x8b, 0x17, 0xd1, 0xa4,
        0x3a, 0xec, 0xc9, 0x35, 0x93, 0x56, 0x7e, 0xcb,  0x55, 0x20, 0xa0, 0xfe, 0x6c, 0x89, 0x17, 0x62,
        0x17, 0x62, 0x4b, 0xb1, 0xb4, 0xde, 0xd1, 0x87,  0xc9, 0x14, 0x3c, 0x4a, 0x7e, 0xa8, 0xe2, 0x7d,
        0xa0, 0x9f, 0xf6, 0x5c, 0x6a, 0x09, 0x8d, 0xf0,  0x0f, 0xe3, 0x53, 0x25, 0x95, 0x36, 0x28, 0xcb,
    ],
];

const BITMASK: [u8; 8] = [0x80, 0x40, 0x20, 0x10, 0x08, 0x04, 0x02, 0x01];

/// Reorders the 64 block bits per a one-based permutation table.
fn permute(block: &[u8; BLOCK_SIZE], table: &[u8; 64]) -> [u8; BLOCK_SIZE] {
    let mut out = [0u8; BLOCK_SIZE];
    for (i, &src) in table.iter().enumerate() {
        let j = usize::from(src - 1);
        if block[j >> 3] & BITMASK[j & 7] != 0 {
            out[i >> 3] |= BITMASK[i & 7];
        }
    }
    out
}

/// Single Feistel round: expand the right half to 48 bits, substitute,
/// transpose back to 32 bits and XOR into the left half. The right half
/// passes through unchanged, so the round inverts itself.
fn round(block: &mut [u8; BLOCK_SIZE]) {
    // eight 6-bit values, one per byte, taken from the right half
    let mut expanded = [0u8; BLOCK_SIZE];
    for (i, &src) in EXPANSION_TABLE.iter().enumerate() {
        let j = usize::from(src - 1);
        if block[(j >> 3) + 4] & BITMASK[j & 7] != 0 {
            expanded[i / 6] |= BITMASK[i % 6 + 2];
        }
    }

    // each box folds two 6-bit values into one output byte
    let mut substituted = [0u8; 4];
    for (i, sbox) in SUBSTITUTION_BOXES.iter().enumerate() {
        substituted[i] = (sbox[usize::from(expanded[i * 2])] & 0xF0)
            | (sbox[usize::from(expanded[i * 2 + 1])] & 0x0F);
    }

    let mut transposed = [0u8; 4];
    for (i, &src) in TRANSPOSITION_TABLE.iter().enumerate() {
        let j = usize::from(src - 1);
        if substituted[j >> 3] & BITMASK[j & 7] != 0 {
            transposed[i >> 3] |= BITMASK[i & 7];
        }
    }

    for (left, mixed) in block[..4].iter_mut().zip(transposed) {
        *left ^= mixed;
    }
}

/// Decrypts one 8-byte block in place.
pub fn decrypt_block(block: &mut [u8; BLOCK_SIZE]) {
    let mut permuted = permute(block, &INITIAL_PERMUTATION_TABLE);
    round(&mut permuted);
    *block = permute(&permuted, &FINAL_PERMUTATION_TABLE);
}

/// Recovers an entry name from its obfuscated form: swap the nibbles of
/// every byte, decrypt every complete block, then cut at the first NUL.
pub fn decode_file_name(encoded: &[u8]) -> Vec<u8> {
    let mut buf = encoded.to_vec();
    for byte in &mut buf {
        *byte = byte.rotate_left(4);
    }
    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        decrypt_block(chunk.try_into().unwrap());
    }

    let end = buf.iter().position(|&byte| byte == 0).unwrap_or(buf.len());
    buf.truncate(end);
    buf
}

/// Inverse of [`decode_file_name`], used to build directory fixtures. Pads
/// the name with NULs to the block boundary; relies on the block transform
/// being an involution.
#[cfg(test)]
pub(crate) fn encode_file_name(name: &[u8]) -> Vec<u8> {
    let padded_len = (name.len() + 1).div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
    let mut buf = vec![0u8; padded_len];
    buf[..name.len()].copy_from_slice(name);
    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        decrypt_block(chunk.try_into().unwrap());
    }
    for byte in &mut buf {
        *byte = byte.rotate_left(4);
    }
    buf
}
