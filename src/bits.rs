use crate::FULL_BYTE;

/// Mirrors the bit order of `byte`: bit 7 swaps with bit 0, bit 6 with bit 1,
/// bit 5 with bit 2 and bit 4 with bit 3.
#[inline(always)]
pub const fn reverse_byte(byte: u8) -> u8 {
    let byte = (byte & 0xF0) >> 4 | (byte & 0x0F) << 4;
    let byte = (byte & 0xCC) >> 2 | (byte & 0x33) << 2;
    (byte & 0xAA) >> 1 | (byte & 0x55) << 1
}

/// Mask of the bits at positions `filled..8`, i.e. the part of a partial byte
/// that is still free.
#[inline(always)]
pub const fn pad_mask(filled: u8) -> u8 {
    match FULL_BYTE.checked_shl(filled as u32) {
        Some(mask) => mask,
        None => 0,
    }
}
