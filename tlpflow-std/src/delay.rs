/// Shift register delaying a valid-tagged value by `N` cycles.
///
/// A value given to `tick` in cycle `t` is visible on `output` during cycle `t + N`.
#[derive(Debug, Clone)]
pub struct DelayLine<T, const N: usize> {
    stages: [Option<T>; N],
}

impl<T, const N: usize> Default for DelayLine<T, N> {
    fn default() -> Self { Self::new() }
}

impl<T, const N: usize> DelayLine<T, N> {
    /// Creates an empty delay line.
    pub fn new() -> Self { Self { stages: std::array::from_fn(|_| None) } }

    /// Returns the value leaving the line in the current cycle.
    pub fn output(&self) -> Option<&T> { self.stages.last()?.as_ref() }

    /// Shifts every stage by one and inserts `input`.
    pub fn tick(&mut self, input: Option<T>) {
        if N == 0 {
            return;
        }
        self.stages.rotate_right(1);
        self.stages[0] = input;
    }

    /// Returns the number of values in flight.
    pub fn in_flight(&self) -> usize { self.stages.iter().filter(|s| s.is_some()).count() }

    /// Clears every stage.
    pub fn reset(&mut self) { self.stages.iter_mut().for_each(|s| *s = None); }
}
