//! The timeslot scheduler: wraps the hardware's free-running tick counter
//! and the `embedded-hal-async` delay it drives, and resolves deadlines
//! with the same single-overflow-tolerant comparison [`Asn`](crate::asn::Asn)
//! uses, since the underlying counter wraps long before a real deployment's
//! uptime does.

use embedded_hal_async::delay::DelayNs;

use crate::config::GUARD_TICKS;

/// Reads the hardware's free-running tick counter. Implemented by the
/// platform integration; ticks run at [`crate::config::TIMER_TICKS_PER_SECOND`].
pub trait Clock {
    /// Current value of the free-running counter.
    fn now(&self) -> u32;
}

/// An absolute point in time expressed in hardware ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(pub u32);

impl Deadline {
    /// `true` once `now` has reached or passed this deadline, tolerating
    /// exactly one wraparound of the counter (i.e. `now` is never more than
    /// `2^31` ticks ahead of the deadline).
    pub fn has_passed(&self, now: u32) -> bool {
        (now.wrapping_sub(self.0) as i32) >= 0
    }

    /// Ticks remaining until this deadline, saturating at zero once it has
    /// passed.
    pub fn remaining(&self, now: u32) -> u32 {
        if self.has_passed(now) {
            0
        } else {
            self.0.wrapping_sub(now)
        }
    }
}

impl core::ops::Add<u32> for Deadline {
    type Output = Deadline;

    fn add(self, rhs: u32) -> Self::Output {
        Deadline(self.0.wrapping_add(rhs))
    }
}

/// Suspend the calling task until `deadline`, re-checking the clock after
/// each underlying delay in case the platform's delay implementation wakes
/// early. A deadline within [`GUARD_TICKS`] of "now" resolves immediately —
/// there is nothing useful left to wait for.
pub async fn yield_until<D: DelayNs>(delay: &mut D, clock: &impl Clock, deadline: Deadline) {
    loop {
        let now = clock.now();
        let remaining = deadline.remaining(now);
        if remaining <= GUARD_TICKS {
            return;
        }
        delay.delay_us(remaining).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeClock(core::cell::Cell<u32>);

    impl Clock for FakeClock {
        fn now(&self) -> u32 {
            self.0.get()
        }
    }

    struct FakeDelay<'a>(&'a FakeClock);

    impl DelayNs for FakeDelay<'_> {
        async fn delay_ns(&mut self, ns: u32) {
            self.0 .0.set(self.0 .0.get().wrapping_add(ns / 1000));
        }
    }

    #[test]
    fn deadline_has_passed_tolerates_one_wraparound() {
        let deadline = Deadline(u32::MAX - 10);
        assert!(!deadline.has_passed(u32::MAX - 20));
        assert!(deadline.has_passed(u32::MAX - 10));
        assert!(deadline.has_passed(5)); // wrapped past u32::MAX
    }

    #[test]
    fn yield_until_advances_the_clock_to_the_deadline() {
        pollster::FutureExt::block_on(async {
            let clock = FakeClock(core::cell::Cell::new(0));
            let mut delay = FakeDelay(&clock);
            yield_until(&mut delay, &clock, Deadline(10_000)).await;
            assert!(clock.now() >= 10_000 - GUARD_TICKS);
        });
    }
}
