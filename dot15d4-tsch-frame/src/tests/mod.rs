use super::*;

mod parsing;

#[macro_export]
#[allow(missing_docs)]
macro_rules! test {
    (
        $($getter:expr => $value:expr),* $(,)?
    ) => {
        $(
            assert_eq!($getter, $value);
        )*
    };
}

/// Example
/// ```rust
/// test_information_element!(
///     slots.next().unwrap(),
///     |slot| { GtsDirection::Receive(slot) },
///     |slot| {
///         test!(
///             slot.short_address() => Address::Short([0x78, 0x56]),
///             slot.starting_slot() => 4,
///             slot.length() => 1,
///             slot.direction() => GtsDirection::Receive,
///         );
///     }
/// );
/// ```
#[macro_export]
#[allow(missing_docs)]
macro_rules! test_sub_element {
    (
        $element:expr,
        |$name:ident| $constructor:block,
        |$name2:ident| $block:block
    ) => {
        let $name = $element;
        let $name2 = $constructor;
        $block;
    };
}

#[test]
fn emit_enhanced_beacon() {
    let frame = FrameRepr {
        frame_control: FrameControlRepr {
            frame_type: FrameType::Beacon,
            security_enabled: false,
            frame_pending: false,
            ack_request: false,
            pan_id_compression: true,
            sequence_number_suppression: true,
            information_elements_present: true,
            dst_addressing_mode: AddressingMode::Short,
            src_addressing_mode: AddressingMode::Extended,
            frame_version: FrameVersion::Ieee802154_2020,
        },
        sequence_number: None,
        addressing_fields: Some(AddressingFieldsRepr {
            dst_pan_id: Some(0xabcd),
            src_pan_id: None,
            dst_address: Some(Address::BROADCAST),
            src_address: Some(Address::Extended([
                0x00, 0x01, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01,
            ])),
        }),
        information_elements: Some(InformationElementsRepr {
            header_information_elements: heapless::Vec::new(),
            payload_information_elements: heapless::Vec::from_iter([
                PayloadInformationElementRepr::Mlme(heapless::Vec::from_iter([
                    NestedInformationElementRepr::TschSynchronization(TschSynchronizationRepr {
                        absolute_slot_number: 17,
                        join_metric: 0,
                    }),
                ])),
            ]),
        }),
        payload: None,
    };

    let mut buffer = vec![0; frame.buffer_len()];
    frame.emit(&mut DataFrame::new_unchecked(&mut buffer[..]));

    assert_eq!(
        buffer,
        [
            64, 235, 205, 171, 255, 255, 1, 0, 1, 0, 1, 0, 1, 0, 0, 63, 8, 136, 6, 26, 17, 0, 0,
            0, 0, 0,
        ]
    );
}
