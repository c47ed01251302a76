//! Property tests: byte-exact round trips for arbitrary buffers

use dataformats::{
    deserialize, serialize, BufferAdoption, ComponentRequest, Fragment, FragmentHeader, GeoId,
    SerializationType, TriggerRecordHeader, FRAGMENT_HEADER_SIZE, TRIGGER_RECORD_HEADER_SIZE,
};
use proptest::prelude::*;

fn encoding_strategy() -> impl Strategy<Value = SerializationType> {
    prop_oneof![Just(SerializationType::MsgPack), Just(SerializationType::Json)]
}

fn header_strategy() -> impl Strategy<Value = FragmentHeader> {
    (
        any::<u64>(),
        any::<u64>(),
        any::<u64>(),
        any::<u64>(),
        any::<u32>(),
        any::<(u32, u32)>(),
        any::<u32>(),
        any::<u32>(),
    )
        .prop_map(
            |(trigger_number, trigger_timestamp, window_begin, window_end, run_number, link, error_bits, fragment_type)| {
                FragmentHeader {
                    size: 0,
                    trigger_number,
                    trigger_timestamp,
                    window_begin,
                    window_end,
                    run_number,
                    link_id: GeoId::new(link.0, link.1),
                    error_bits,
                    fragment_type,
                }
            },
        )
}

fn component_strategy() -> impl Strategy<Value = ComponentRequest> {
    (any::<u32>(), any::<u32>(), any::<u64>(), any::<u64>()).prop_map(|(apa, link, begin, end)| {
        ComponentRequest::new(GeoId::new(apa, link), begin, end)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fragment_roundtrip(
        header in header_strategy(),
        payload in prop::collection::vec(any::<u8>(), 0..512),
        encoding in encoding_strategy(),
    ) {
        let frag = Fragment::from_pieces(&header, &[&payload]).unwrap();
        let decoded: Fragment = deserialize(&serialize(&frag, encoding).unwrap()).unwrap();
        prop_assert_eq!(decoded.total_size_bytes(), frag.total_size_bytes());
        prop_assert_eq!(decoded.storage(), frag.storage());
    }

    #[test]
    fn raw_fragment_buffer_roundtrip(
        raw in prop::collection::vec(any::<u8>(), FRAGMENT_HEADER_SIZE..FRAGMENT_HEADER_SIZE + 256),
        encoding in encoding_strategy(),
    ) {
        // Header bytes are arbitrary, including the size field
        let size = raw.len();
        let frag = Fragment::from_buffer_with_size(BufferAdoption::TakeOverBuffer(raw.clone()), size).unwrap();
        let decoded: Fragment = deserialize(&serialize(&frag, encoding).unwrap()).unwrap();
        prop_assert_eq!(decoded.storage(), raw.as_slice());
    }

    #[test]
    fn fragment_cross_encoding(
        header in header_strategy(),
        payload in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let frag = Fragment::from_pieces(&header, &[&payload]).unwrap();
        let from_msgpack: Fragment =
            deserialize(&serialize(&frag, SerializationType::MsgPack).unwrap()).unwrap();
        let from_json: Fragment =
            deserialize(&serialize(&frag, SerializationType::Json).unwrap()).unwrap();
        prop_assert_eq!(&from_msgpack, &from_json);
        prop_assert_eq!(&from_msgpack, &frag);
    }

    #[test]
    fn boxed_fragment_roundtrip(
        header in header_strategy(),
        payload in prop::collection::vec(any::<u8>(), 0..128),
        encoding in encoding_strategy(),
    ) {
        let frag = Box::new(Fragment::from_pieces(&header, &[&payload]).unwrap());
        let decoded: Box<Fragment> = deserialize(&serialize(&frag, encoding).unwrap()).unwrap();
        prop_assert_eq!(decoded.storage(), frag.storage());
    }

    #[test]
    fn trigger_record_header_roundtrip(
        components in prop::collection::vec(component_strategy(), 0..16),
        trigger_number in any::<u64>(),
        run_number in any::<u32>(),
        trigger_type in any::<u16>(),
        encoding in encoding_strategy(),
    ) {
        let mut header = TriggerRecordHeader::new(&components).unwrap();
        header.set_trigger_number(trigger_number);
        header.set_run_number(run_number);
        header.set_trigger_type(trigger_type);

        let decoded: TriggerRecordHeader = deserialize(&serialize(&header, encoding).unwrap()).unwrap();
        prop_assert_eq!(decoded.storage(), header.storage());
        prop_assert_eq!(decoded.components().collect::<Vec<_>>(), components);
    }

    #[test]
    fn raw_trigger_record_header_roundtrip(
        raw in prop::collection::vec(any::<u8>(), TRIGGER_RECORD_HEADER_SIZE..TRIGGER_RECORD_HEADER_SIZE + 128),
        encoding in encoding_strategy(),
    ) {
        let size = raw.len();
        let header = TriggerRecordHeader::from_buffer_with_size(BufferAdoption::CopyFromBuffer(&raw), size).unwrap();
        let decoded: TriggerRecordHeader = deserialize(&serialize(&header, encoding).unwrap()).unwrap();
        prop_assert_eq!(decoded.storage(), raw.as_slice());
    }
}
