//! Simulation driver.

use tracing::trace_span;

use crate::{Module, SimError};

/// Owns a module and drives its clock.
#[derive(Debug)]
pub struct Simulator<M: Module> {
    name: String,
    module: M,
    cycle: u64,
}

impl<M: Module> Simulator<M> {
    /// Creates a new simulator at cycle 0.
    pub fn new(name: &str, module: M) -> Self { Self { name: name.to_string(), module, cycle: 0 } }

    /// Returns the number of ticks since creation or the last reset.
    pub fn cycle(&self) -> u64 { self.cycle }

    /// Returns the simulated module.
    pub fn module(&self) -> &M { &self.module }

    /// Returns the simulated module mutably.
    pub fn module_mut(&mut self) -> &mut M { &mut self.module }

    /// Simulates one clock cycle.
    pub fn tick(&mut self, input: M::I) -> M::O {
        let span = trace_span!("cycle", sim = %self.name, cycle = self.cycle);
        let _enter = span.enter();
        let output = self.module.tick(input);
        self.cycle += 1;
        output
    }

    /// Simulates one cycle per input.
    pub fn run<It: IntoIterator<Item = M::I>>(&mut self, inputs: It) -> Vec<M::O> {
        inputs.into_iter().map(|input| self.tick(input)).collect()
    }

    /// Ticks with inputs from `input` until `done` holds for an output, and returns that output.
    pub fn run_until<F, P>(&mut self, max_cycles: u64, mut input: F, mut done: P) -> Result<M::O, SimError>
    where
        F: FnMut(u64) -> M::I,
        P: FnMut(&M::O) -> bool,
    {
        for _ in 0..max_cycles {
            let output = self.tick(input(self.cycle));
            if done(&output) {
                return Ok(output);
            }
        }
        Err(SimError::Timeout(max_cycles))
    }

    /// Resets the module and the cycle counter.
    pub fn reset(&mut self) {
        self.module.reset();
        self.cycle = 0;
    }

    /// Consumes the simulator and returns the module.
    pub fn into_inner(self) -> M { self.module }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsm_map;

    #[test]
    fn counts_cycles() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let mut sim = Simulator::new("acc", fsm_map(0u32, |input: u32, state: u32| (state + input, state + input)));
        assert_eq!(sim.run([1, 2, 3]), vec![1, 3, 6]);
        assert_eq!(sim.cycle(), 3);

        let output = sim.run_until(10, |_| 1, |o| *o >= 10).unwrap();
        assert_eq!(output, 10);
        assert_eq!(sim.cycle(), 7);

        assert!(matches!(sim.run_until(2, |_| 0, |_| false), Err(SimError::Timeout(2))));

        sim.reset();
        assert_eq!(sim.cycle(), 0);
        assert_eq!(sim.tick(5), 5);
    }
}
