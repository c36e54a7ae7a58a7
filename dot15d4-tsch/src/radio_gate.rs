//! Named sites at which the slot engine turns the radio on or off.
//!
//! The engine only ever powers the radio at one of these four points within
//! a timeslot; naming them lets the trace log read as a sequence of site
//! markers instead of bare `enable`/`disable` calls, the same way radio
//! events are traced as tagged variants elsewhere (see
//! [`crate::radio::tests::TestRadioEvent`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    /// The slot has an active link; the radio is being woken for it.
    StartOfSlot,
    /// A mid-slot transition, e.g. switching from CCA sampling into
    /// transmit, or from the ack-wait window back to idle.
    WithinSlot,
    /// The slot's work is fully done; the radio is put back to sleep.
    EndOfSlot,
    /// The radio is forced off outside the normal sequence, e.g. an RX
    /// window that never saw a carrier.
    Force,
}

/// Enable the radio, logging `site` as the reason.
pub async fn enable<R: crate::radio::Radio>(radio: &mut R, site: Site) {
    crate::trace!("radio on ({:?})", site);
    radio.enable().await;
}

/// Disable the radio, logging `site` as the reason.
pub async fn disable<R: crate::radio::Radio>(radio: &mut R, site: Site) {
    crate::trace!("radio off ({:?})", site);
    radio.disable().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::tests::TestRadio;
    use crate::radio::Radio;

    #[pollster::test]
    async fn enable_and_disable_forward_to_the_radio() {
        let mut radio = TestRadio::default();
        enable(&mut radio, Site::StartOfSlot).await;
        disable(&mut radio, Site::EndOfSlot).await;
        radio.inner(|inner| {
            assert!(inner
                .events
                .contains(&crate::radio::tests::TestRadioEvent::Enable));
            assert!(inner
                .events
                .contains(&crate::radio::tests::TestRadioEvent::Disable));
        });
    }
}
