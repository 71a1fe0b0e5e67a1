//! Utilities.

/// Returns ceiling log2.
pub const fn clog2(value: usize) -> usize {
    if value == 0 {
        0
    } else {
        (::std::mem::size_of::<usize>() * 8) - (value - 1).leading_zeros() as usize
    }
}

/// Returns bits `[hi:lo]` of `value`, as in a Verilog part-select.
pub const fn field(value: u32, hi: u32, lo: u32) -> u32 {
    let width = hi - lo + 1;
    if width >= 32 {
        value >> lo
    } else {
        (value >> lo) & ((1 << width) - 1)
    }
}

/// Returns the integer value of LSB-first bits. Bits above 128 are ignored.
pub fn bits_to_u128(bits: &[bool]) -> u128 {
    bits.iter().take(128).rev().fold(0, |acc, &b| (acc << 1) | u128::from(b))
}

/// Returns the `n` low bits of an integer, LSB first.
pub fn u128_to_bits(n: usize, value: u128) -> Vec<bool> {
    (0..n).map(|i| i < 128 && (value >> i) & 1 == 1).collect()
}

/// Formats LSB-first bits as a binary string, most significant bit first.
pub fn bits_to_string(bits: &[bool]) -> String { bits.iter().rev().map(|&b| if b { '1' } else { '0' }).collect() }

/// Some or executing the given expression.
#[macro_export]
macro_rules! some_or {
    ($e:expr, $err:expr) => {{
        match $e {
            Some(r) => r,
            None => $err,
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clog2_rounds_up() {
        assert_eq!(clog2(0), 0);
        assert_eq!(clog2(1), 0);
        assert_eq!(clog2(2), 1);
        assert_eq!(clog2(7), 3);
        assert_eq!(clog2(8), 3);
        assert_eq!(clog2(1024), 10);
    }

    #[test]
    fn field_selects_bits() {
        assert_eq!(field(0x4000_0001, 31, 29), 0b010);
        assert_eq!(field(0xABCD_1234, 31, 16), 0xABCD);
        assert_eq!(field(0xABCD_1234, 31, 0), 0xABCD_1234);
        assert_eq!(field(0x0000_03FF, 9, 0), 0x3FF);
    }

    #[test]
    fn bits_conversions() {
        let bits = u128_to_bits(12, 0xA5C);
        assert_eq!(bits.len(), 12);
        assert_eq!(bits_to_u128(&bits), 0xA5C);
        assert_eq!(bits_to_string(&bits), "101001011100");
    }
}
