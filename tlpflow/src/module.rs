/// A synchronous circuit.
///
/// `tick` takes the inputs of one clock cycle, returns that cycle's outputs, and advances every
/// register by one clock edge.
pub trait Module {
    /// Input type.
    type I;

    /// Output type.
    type O;

    /// Simulates one clock cycle.
    fn tick(&mut self, input: Self::I) -> Self::O;

    /// Returns every register to its reset value.
    fn reset(&mut self);
}
