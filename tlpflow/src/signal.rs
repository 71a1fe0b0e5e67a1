//! Signal: a value carried on a fixed-width bundle of wires.

use std::fmt::Debug;

use arrayvec::ArrayVec;

/// Signal type.
///
/// The bit representation is least significant bit first. A derived struct concatenates its
/// fields in declaration order, so its first field occupies the lowest bits.
pub trait Signal: 'static + Debug + Clone {
    /// Width in bits.
    const WIDTH: usize;

    /// Translates the value into exactly `WIDTH` bits.
    fn transl(self) -> Vec<bool>;

    /// Reconstructs a value from its bits. Returns `None` if `bits` is not a valid encoding.
    fn from_bits(bits: &[bool]) -> Option<Self>;
}

impl Signal for () {
    const WIDTH: usize = 0;

    fn transl(self) -> Vec<bool> { Vec::new() }

    fn from_bits(bits: &[bool]) -> Option<Self> { bits.is_empty().then_some(()) }
}

impl Signal for bool {
    const WIDTH: usize = 1;

    fn transl(self) -> Vec<bool> { vec![self] }

    fn from_bits(bits: &[bool]) -> Option<Self> {
        match bits {
            [b] => Some(*b),
            _ => None,
        }
    }
}

// Integers accept any slice not wider than themselves and zero-extend it. This lets narrow struct
// members (`#[member(width = N)]`) reuse the integer implementations.
macro_rules! impl_signal_uint {
    ($($t:ty),*) => {
        $(
            impl Signal for $t {
                const WIDTH: usize = <$t>::BITS as usize;

                fn transl(self) -> Vec<bool> { (0..Self::WIDTH).map(|i| (self >> i) & 1 == 1).collect() }

                fn from_bits(bits: &[bool]) -> Option<Self> {
                    if bits.len() > Self::WIDTH {
                        return None;
                    }
                    Some(bits.iter().rev().fold(0, |acc, &b| (acc << 1) | <$t>::from(b)))
                }
            }
        )*
    };
}

impl_signal_uint!(u8, u16, u32, u64, u128, usize);

/// `Option<V>` is `V` followed by a valid bit. The payload bits of `None` are all zero.
impl<V: Signal> Signal for Option<V> {
    const WIDTH: usize = V::WIDTH + 1;

    fn transl(self) -> Vec<bool> {
        let valid = self.is_some();
        let mut bits = match self {
            Some(value) => value.transl(),
            None => vec![false; V::WIDTH],
        };
        bits.push(valid);
        bits
    }

    fn from_bits(bits: &[bool]) -> Option<Self> {
        if bits.len() != Self::WIDTH {
            return None;
        }
        let (payload, valid) = bits.split_at(V::WIDTH);
        if valid[0] {
            V::from_bits(payload).map(Some)
        } else {
            Some(None)
        }
    }
}

impl<V: Signal, const N: usize> Signal for [V; N] {
    const WIDTH: usize = V::WIDTH * N;

    fn transl(self) -> Vec<bool> { self.into_iter().flat_map(V::transl).collect() }

    fn from_bits(bits: &[bool]) -> Option<Self> {
        if bits.len() != Self::WIDTH {
            return None;
        }
        let elements =
            (0..N).map(|i| V::from_bits(&bits[i * V::WIDTH..(i + 1) * V::WIDTH])).collect::<Option<ArrayVec<V, N>>>()?;
        elements.into_inner().ok()
    }
}
