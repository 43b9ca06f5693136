// src/common/checksum.rs

//! Additive mod-256 checksum used by every SM70 frame.
//!
//! The final byte of each frame is chosen so that the unsigned byte sum of
//! the whole frame, checksum byte included, is zero. Validation therefore
//! reduces to summing the complete frame and comparing against zero.

/// Wrapping byte sum of a buffer.
#[inline]
pub fn sum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Checks that a complete frame (checksum byte included) sums to zero.
#[inline]
pub fn verify(frame: &[u8]) -> bool {
    sum(frame) == 0
}

/// Returns the checksum byte that completes `sum_of_rest` to zero.
///
/// Used at compile time to seal the constant outbound request frames.
#[inline]
pub const fn seal(sum_of_rest: u8) -> u8 {
    0u8.wrapping_sub(sum_of_rest)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_wraps() {
        assert_eq!(sum(&[]), 0);
        assert_eq!(sum(&[0x01, 0x02, 0x03]), 0x06);
        assert_eq!(sum(&[0xFF, 0x02]), 0x01);
        assert_eq!(sum(&[0x80, 0x80]), 0x00);
    }

    #[test]
    fn test_seal_completes_to_zero() {
        for partial in 0..=255u8 {
            assert_eq!(partial.wrapping_add(seal(partial)), 0);
        }
    }

    #[test]
    fn test_verify() {
        let mut frame = [0x55u8, 0x1A, 0x00, 0x00];
        frame[3] = seal(sum(&frame[..3]));
        assert!(verify(&frame));

        frame[2] = 0x01;
        assert!(!verify(&frame));
    }
}
