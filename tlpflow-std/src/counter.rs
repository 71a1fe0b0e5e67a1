//! Counter modules.

use tlpflow::{fsm_map, FnFsm, FsmModule};

/// Transition function of [`CounterUpDown`].
pub type UpDownLogic = fn((bool, bool), u32) -> ((u32, u32), u32);

/// Up/down counter. The input is `(up, down)`; the output is `(count, count_next)`.
pub type CounterUpDown = FsmModule<FnFsm<(bool, bool), (u32, u32), u32, UpDownLogic>>;

/// Creates an up/down counter starting at zero. It saturates at zero.
pub fn counter_up_down() -> CounterUpDown { fsm_map(0, up_down as UpDownLogic) }

fn up_down((up, down): (bool, bool), count: u32) -> ((u32, u32), u32) {
    let count_next = (count + u32::from(up)).saturating_sub(u32::from(down));
    ((count, count_next), count_next)
}

#[cfg(test)]
mod tests {
    use tlpflow::Module;

    use super::*;

    #[test]
    fn counts_up_and_down() {
        let mut counter = counter_up_down();
        assert_eq!(counter.tick((true, false)), (0, 1));
        assert_eq!(counter.tick((true, true)), (1, 1));
        assert_eq!(counter.tick((false, true)), (1, 0));
        assert_eq!(counter.tick((false, true)), (0, 0));
        counter.tick((true, false));
        counter.reset();
        assert_eq!(*counter.state(), 0);
    }
}
