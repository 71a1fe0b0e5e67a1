//! Finite state machine (Mealy machine).

use std::fmt;
use std::marker::PhantomData;

use crate::Module;

/// A Mealy machine.
///
/// `logic` computes (1) the current-cycle output from the input and the current state and (2) the
/// next-cycle state. It must not have side effects, so that every transition can be tested in
/// isolation from the driver that owns the state.
pub trait Fsm {
    /// Input type.
    type I;

    /// Output type.
    type O;

    /// State type.
    type S: fmt::Debug + Clone;

    /// Reset state.
    fn init(&self) -> Self::S;

    /// Transition function.
    fn logic(&self, input: Self::I, state: &Self::S) -> (Self::O, Self::S);
}

/// Holds the state register of an `Fsm` and updates it once per tick.
#[derive(Debug, Clone)]
pub struct FsmModule<F: Fsm> {
    fsm: F,
    state: F::S,
}

impl<F: Fsm> FsmModule<F> {
    /// Creates a new module in the reset state.
    pub fn new(fsm: F) -> Self {
        let state = fsm.init();
        Self { fsm, state }
    }

    /// Returns the current state.
    pub fn state(&self) -> &F::S { &self.state }

    /// Returns the transition function.
    pub fn fsm(&self) -> &F { &self.fsm }
}

impl<F: Fsm> Module for FsmModule<F> {
    type I = F::I;
    type O = F::O;

    fn tick(&mut self, input: F::I) -> F::O {
        let (output, state_next) = self.fsm.logic(input, &self.state);
        self.state = state_next;
        output
    }

    fn reset(&mut self) { self.state = self.fsm.init(); }
}

/// An `Fsm` described by a closure `(input, state) -> (output, state_next)`.
pub struct FnFsm<I, O, S, F> {
    init: S,
    f: F,
    _marker: PhantomData<fn(I) -> O>,
}

impl<I, O, S: fmt::Debug, F> fmt::Debug for FnFsm<I, O, S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.debug_struct("FnFsm").field("init", &self.init).finish() }
}

impl<I, O, S: Clone, F: Clone> Clone for FnFsm<I, O, S, F> {
    fn clone(&self) -> Self { Self { init: self.init.clone(), f: self.f.clone(), _marker: PhantomData } }
}

impl<I, O, S, F> Fsm for FnFsm<I, O, S, F>
where
    S: fmt::Debug + Clone,
    F: Fn(I, S) -> (O, S),
{
    type I = I;
    type O = O;
    type S = S;

    fn init(&self) -> S { self.init.clone() }

    fn logic(&self, input: I, state: &S) -> (O, S) { (self.f)(input, state.clone()) }
}

/// Creates a module from a closure over `(input, state)`, starting at `init`.
pub fn fsm_map<I, O, S, F>(init: S, f: F) -> FsmModule<FnFsm<I, O, S, F>>
where
    S: fmt::Debug + Clone,
    F: Fn(I, S) -> (O, S),
{
    FsmModule::new(FnFsm { init, f, _marker: PhantomData })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fsm_map_updates_state_after_output() {
        // Outputs the previous input.
        let mut delay = fsm_map(0u32, |input: u32, state: u32| (state, input));
        assert_eq!(delay.tick(7), 0);
        assert_eq!(delay.tick(9), 7);
        assert_eq!(*delay.state(), 9);
        delay.reset();
        assert_eq!(*delay.state(), 0);
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Parity {
        Even,
        Odd,
    }

    #[derive(Debug)]
    struct ParityFsm;

    impl Fsm for ParityFsm {
        type I = bool;
        type O = bool;
        type S = Parity;

        fn init(&self) -> Parity { Parity::Even }

        fn logic(&self, input: bool, state: &Parity) -> (bool, Parity) {
            let next = match (state, input) {
                (Parity::Even, true) => Parity::Odd,
                (Parity::Odd, true) => Parity::Even,
                (s, false) => *s,
            };
            (next == Parity::Odd, next)
        }
    }

    #[test]
    fn fsm_module_tracks_parity() {
        let mut module = FsmModule::new(ParityFsm);
        let outputs = [true, false, true, true].into_iter().map(|b| module.tick(b)).collect::<Vec<_>>();
        assert_eq!(outputs, vec![true, true, false, true]);
        assert_eq!(*module.state(), Parity::Odd);
    }
}
