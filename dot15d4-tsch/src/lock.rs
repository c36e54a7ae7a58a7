//! The lock arbiter mediates access to the schedule, neighbor table, and
//! queues between the slot engine ([`crate::engine::run_slot`]) and whatever
//! mutates them from outside slot execution — joining a new Enhanced Beacon,
//! adding a link, enqueuing a packet.
//!
//! Ownership is granted through a request-then-spin protocol: a holder
//! keeps the lock until it observes a request on its `wants_lock` channel,
//! at which point it must drop its guard at its next yield point so the
//! requester's [`acquire`] call can succeed. The slot engine itself only
//! ever takes the lock transiently, to check whether a foreground mutator
//! currently holds it — it never holds it across its own slot body.

pub use crate::sync::mutex::{Mutex, MutexGuard};
use crate::sync::channel::Sender;

/// Acquire the lock on `mutex`, signalling `wants_lock` and spinning until
/// it becomes available if some other holder currently has it.
///
/// `out_guard` is checked first: if a guard is already held, this is a
/// no-op. This lets a caller hold the lock across a sequence of
/// [`YIELD_UNTIL`](crate::timer)-style suspension points without
/// re-acquiring it every time, while still backing off to whichever other
/// task actually needs it next.
pub async fn acquire<'a, T>(
    mutex: &'a Mutex<T>,
    wants_lock: &Sender<'_, ()>,
    out_guard: &mut Option<MutexGuard<'a, T>>,
) {
    if out_guard.is_some() {
        return;
    }

    loop {
        match mutex.try_lock() {
            Some(guard) => {
                *out_guard = Some(guard);
                return;
            }
            None => {
                wants_lock.send_async(()).await;
            }
        }
    }
}

/// Release a previously acquired lock. Equivalent to dropping `guard`, kept
/// as a named operation so call sites read as an explicit release rather
/// than an implicit scope exit.
pub fn release<T>(guard: MutexGuard<'_, T>) {
    drop(guard);
}

#[cfg(test)]
mod tests {
    use pollster::FutureExt as _;

    use crate::sync::channel::Channel;
    use crate::sync::select::select;

    use super::*;

    #[test]
    fn second_acquirer_waits_for_a_release() {
        async {
            let mutex = Mutex::new(0usize);
            let mut wants_lock = Channel::new();
            let (sender, mut receiver) = wants_lock.split();

            let mut holder_guard = None;
            acquire(&mutex, &sender, &mut holder_guard).await;
            *holder_guard.as_mut().unwrap() += 1;

            select(
                async {
                    let mut waiter_guard = None;
                    acquire(&mutex, &sender, &mut waiter_guard).await;
                    *waiter_guard.as_mut().unwrap() += 10;
                },
                async {
                    // The holder observes the request and releases.
                    receiver.receive().await;
                    release(holder_guard.take().unwrap());
                },
            )
            .await;

            assert_eq!(*mutex.get_mut(), 11);
        }
        .block_on()
    }

    #[test]
    fn a_held_guard_is_reused_without_reacquiring() {
        async {
            let mutex = Mutex::new(0usize);
            let mut wants_lock = Channel::new();
            let (sender, _receiver) = wants_lock.split();

            let mut guard = None;
            acquire(&mutex, &sender, &mut guard).await;
            acquire(&mutex, &sender, &mut guard).await;
            assert!(guard.is_some());
        }
        .block_on()
    }
}
