//! Java edition packet shapes and their per-era wire layouts.

/// Builds descriptor entries: `State Direction [min ..= max] id => Kind (decode, encode);`
macro_rules! packet_descriptors {
    ($(
        $state:ident $direction:ident [$min:ident ..= $max:ident]
        $id:expr => $kind:ident ($decode:path, $encode:path);
    )*) => {
        vec![$(
            blockbridge_network_common::PacketDescriptor {
                name: concat!(stringify!($kind), "@", stringify!($min)),
                state: blockbridge_network_common::ConnectionState::$state,
                direction: blockbridge_network_common::Direction::$direction,
                versions: blockbridge_network_common::VersionRange::new($min, $max),
                id: $id as u32,
                kind: $crate::JavaPacketKind::$kind,
                decode: $decode,
                encode: $encode,
            },
        )*]
    };
}

pub mod common_packets;
pub mod legacy;
pub mod modern;
mod packets;
mod registry;

pub use packets::*;
pub use registry::JAVA_PACKETS;
