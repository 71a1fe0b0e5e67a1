//! Array map.

use arrayvec::ArrayVec;

/// Provide ergonomic API for array map.
pub trait ArrayMap<I, O> {
    /// Type of the output array.
    type Target;

    /// Maps every element together with its index.
    fn array_map_enumerate<F: FnMut(usize, I) -> O>(self, f: F) -> Self::Target;
}

impl<const N: usize, I, O> ArrayMap<I, O> for [I; N] {
    type Target = [O; N];

    fn array_map_enumerate<F: FnMut(usize, I) -> O>(self, mut f: F) -> Self::Target {
        let mapped = self.into_iter().enumerate().map(|(i, x)| f(i, x)).collect::<ArrayVec<O, N>>();
        match mapped.into_inner() {
            Ok(array) => array,
            Err(_) => unreachable!("mapping preserves the length"),
        }
    }
}

/// Returns `[f(0), f(1), .., f(N - 1)]`.
pub fn range_map<O, F: FnMut(usize) -> O, const N: usize>(mut f: F) -> [O; N] {
    [(); N].array_map_enumerate(|i, ()| f(i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_with_index() {
        assert_eq!(["a", "b", "c"].array_map_enumerate(|i, s| format!("{s}{i}")), ["a0", "b1", "c2"]);
        assert_eq!(range_map::<_, _, 4>(|i| i * i), [0, 1, 4, 9]);
    }
}
