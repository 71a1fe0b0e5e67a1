//! Mux with the priority for LSB.

use itertools::Itertools;

/// Returns the index of the lowest set bit, or `None` if no bit is set.
pub fn priority_encode(unencoded: &[bool]) -> Option<usize> { unencoded.iter().position(|b| *b) }

/// Output of a priority mux.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Muxed<T> {
    /// Index of the selected input.
    pub index: usize,
    /// Value of the selected input.
    pub value: T,
    /// Indices of the other valid inputs, which lost the arbitration.
    pub conflicts: Vec<usize>,
}

/// Selects the valid input with the lowest index.
pub fn priority_mux<T, I: IntoIterator<Item = Option<T>>>(inputs: I) -> Option<Muxed<T>> {
    let mut valid = inputs.into_iter().enumerate().filter_map(|(i, v)| Some((i, v?)));
    let (index, value) = valid.next()?;
    let conflicts = valid.map(|(i, _)| i).collect_vec();
    Some(Muxed { index, value, conflicts })
}

/// Priority mux extension.
pub trait PriorityMuxExt<T> {
    /// Selects the valid element with the lowest index.
    fn priority_mux(self) -> Option<Muxed<T>>;

    /// Returns the indices of the valid elements.
    fn valid_positions(&self) -> Vec<usize>;
}

impl<T, const N: usize> PriorityMuxExt<T> for [Option<T>; N] {
    fn priority_mux(self) -> Option<Muxed<T>> { priority_mux(self) }

    fn valid_positions(&self) -> Vec<usize> { self.iter().positions(Option::is_some).collect() }
}
