//! 32-bit mixing primitives for the lane hash
//!
//! Every result is a `u32`, so wraparound is that of fixed-width unsigned
//! arithmetic on every target.

/// Bitwise XOR of two words
#[inline(always)]
pub const fn xor32(a: u32, b: u32) -> u32 {
    a ^ b
}

/// Circular left rotation within a 32-bit word
///
/// Defined for `0 <= amount < 32`.
#[inline(always)]
pub const fn rotate_left32(value: u32, amount: u32) -> u32 {
    debug_assert!(amount < 32);
    value.rotate_left(amount)
}

/// Circular right rotation within a 32-bit word
///
/// Defined for `0 <= amount < 32`.
#[inline(always)]
pub const fn rotate_right32(value: u32, amount: u32) -> u32 {
    debug_assert!(amount < 32);
    value.rotate_right(amount)
}

/// Addition modulo 2^32
#[inline(always)]
pub const fn add_mod32(a: u32, b: u32) -> u32 {
    a.wrapping_add(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xor32() {
        assert_eq!(xor32(0xffff_0000, 0x0f0f_0f0f), 0xf0f0_0f0f);
        assert_eq!(xor32(0x6a09e667, 0x6a09e667), 0);
        assert_eq!(xor32(0x1234_5678, 0), 0x1234_5678);
    }

    #[test]
    fn test_rotate_left32() {
        assert_eq!(rotate_left32(0x8000_0001, 1), 0x0000_0003);
        assert_eq!(rotate_left32(0x1234_5678, 0), 0x1234_5678);
        assert_eq!(rotate_left32(0x1234_5678, 8), 0x3456_7812);
        assert_eq!(rotate_left32(0x0000_0001, 31), 0x8000_0000);
    }

    #[test]
    fn test_rotate_right32() {
        assert_eq!(rotate_right32(0x0000_0003, 1), 0x8000_0001);
        assert_eq!(rotate_right32(0x1234_5678, 0), 0x1234_5678);
        assert_eq!(rotate_right32(0x1234_5678, 8), 0x7812_3456);
        assert_eq!(rotate_right32(0x8000_0000, 31), 0x0000_0001);
    }

    #[test]
    fn test_rotations_are_inverse() {
        let value = 0xdead_beef;
        for amount in 0..32 {
            assert_eq!(rotate_right32(rotate_left32(value, amount), amount), value);
        }
    }

    #[test]
    fn test_add_mod32_wraps() {
        assert_eq!(add_mod32(0xffff_ffff, 1), 0);
        assert_eq!(add_mod32(0xffff_ffff, 0xffff_ffff), 0xffff_fffe);
        assert_eq!(add_mod32(0x6a09e667, 0x5a827999), 0xc48c6000);
    }
}
