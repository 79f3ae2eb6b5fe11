//! Byte-level scalar transforms shared by key expansion and the
//! ed25519-style secret key encoding.

use curve25519_dalek::scalar::Scalar;

/// Divides a little-endian 256-bit integer by the cofactor 8.
///
/// Shifts every byte right by three bits, starting from the most
/// significant byte, carrying the low bits into the byte below.
pub fn divide_scalar_bytes_by_cofactor(mut scalar: [u8; 32]) -> [u8; 32] {
    let mut low = 0u8;
    for byte in scalar.iter_mut().rev() {
        let r = *byte & 0b0000_0111;
        *byte >>= 3;
        *byte += low;
        low = r << 5;
    }
    scalar
}

/// Multiplies a little-endian 256-bit integer by the cofactor 8.
///
/// Inverse of [`divide_scalar_bytes_by_cofactor`] for inputs whose top
/// three bits are clear.
pub fn multiply_scalar_bytes_by_cofactor(mut scalar: [u8; 32]) -> [u8; 32] {
    let mut high = 0u8;
    for byte in scalar.iter_mut() {
        let r = *byte & 0b1110_0000;
        *byte <<= 3;
        *byte += high;
        high = r >> 5;
    }
    scalar
}

/// Reads 32 bytes as a scalar the way `Scalar::from_bits` did: the top
/// bit is dropped and the remaining 255 bits are taken as the integer.
///
/// The Ristretto group has prime order, so reducing here yields the same
/// point under base-point multiplication and the same sums as the
/// unreduced representation.
pub(crate) fn scalar_from_bits(mut bytes: [u8; 32]) -> Scalar {
    bytes[31] &= 0b0111_1111;
    Scalar::from_bytes_mod_order(bytes)
}
