use std::{collections::HashMap, fmt, hash::Hash};

use thiserror::Error;

use crate::{
    ConnectionState, Direction, Packet, PacketError, PacketReader, PacketWriter, ProtocolVersion,
    VersionRange,
};

/// A protocol family's tagged union of packet shapes.
pub trait PacketSet: Sized + Send + Sync + 'static {
    type Kind: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;
}

pub type DecodeFn<P> = fn(&mut PacketReader<'_>) -> Result<P, PacketError>;
pub type EncodeFn<P> = fn(&P, &mut PacketWriter) -> Result<(), PacketError>;

/// One wire layout of a packet: where it is valid and how to read and
/// write it.
pub struct PacketDescriptor<P: PacketSet> {
    pub name: &'static str,
    pub state: ConnectionState,
    pub direction: Direction,
    pub versions: VersionRange,
    pub id: u32,
    pub kind: P::Kind,
    pub decode: DecodeFn<P>,
    pub encode: EncodeFn<P>,
}

impl<P: PacketSet> fmt::Debug for PacketDescriptor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketDescriptor")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("direction", &self.direction)
            .field("versions", &format_args!("{}", self.versions))
            .field("id", &format_args!("{:02X}", self.id))
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{name} has an empty version range")]
    EmptyRange { name: &'static str },

    #[error("{version}: {state} {direction:?} id 0x{id:02X} is ambiguous between {first} and {second}")]
    AmbiguousId {
        version: ProtocolVersion,
        state: ConnectionState,
        direction: Direction,
        id: u32,
        first: &'static str,
        second: &'static str,
    },

    #[error("{version}: {state} {direction:?} {kind} has two layouts, {first} and {second}")]
    AmbiguousKind {
        version: ProtocolVersion,
        state: ConnectionState,
        direction: Direction,
        kind: String,
        first: &'static str,
        second: &'static str,
    },
}

/// Narrower ranges win, then the more recently introduced one.
fn is_more_specific<P: PacketSet>(a: &PacketDescriptor<P>, b: &PacketDescriptor<P>) -> bool {
    let (wa, wb) = (a.versions.width(), b.versions.width());
    wa < wb || (wa == wb && a.versions.min > b.versions.min)
}

fn is_tie<P: PacketSet>(a: &PacketDescriptor<P>, b: &PacketDescriptor<P>) -> bool {
    a.versions.width() == b.versions.width() && a.versions.min == b.versions.min
}

pub struct PacketRegistry<P: PacketSet> {
    descriptors: Vec<PacketDescriptor<P>>,
}

impl<P: PacketSet> PacketRegistry<P> {
    pub fn new(descriptors: Vec<PacketDescriptor<P>>) -> Self {
        Self { descriptors }
    }

    pub fn descriptors(&self) -> &[PacketDescriptor<P>] {
        &self.descriptors
    }

    fn select<'a>(
        candidates: impl Iterator<Item = &'a PacketDescriptor<P>>,
    ) -> Option<&'a PacketDescriptor<P>> {
        let mut best: Option<&PacketDescriptor<P>> = None;
        for candidate in candidates {
            best = match best {
                Some(current) if !is_more_specific(candidate, current) => Some(current),
                _ => Some(candidate),
            };
        }
        best
    }

    pub fn resolve_id(
        &self,
        state: ConnectionState,
        direction: Direction,
        version: ProtocolVersion,
        id: u32,
    ) -> Option<&PacketDescriptor<P>> {
        Self::select(self.descriptors.iter().filter(|descriptor| {
            descriptor.state == state
                && descriptor.direction == direction
                && descriptor.id == id
                && descriptor.versions.contains(version)
        }))
    }

    pub fn resolve_kind(
        &self,
        state: ConnectionState,
        direction: Direction,
        version: ProtocolVersion,
        kind: P::Kind,
    ) -> Option<&PacketDescriptor<P>> {
        Self::select(self.descriptors.iter().filter(|descriptor| {
            descriptor.state == state
                && descriptor.direction == direction
                && descriptor.kind == kind
                && descriptor.versions.contains(version)
        }))
    }

    /// Checks that every lookup has exactly one most specific answer.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for descriptor in &self.descriptors {
            if descriptor.versions.width() == 0 {
                return Err(RegistryError::EmptyRange {
                    name: descriptor.name,
                });
            }
        }

        for &version in ProtocolVersion::ALL {
            let active = self
                .descriptors
                .iter()
                .filter(|descriptor| descriptor.versions.contains(version))
                .collect::<Vec<_>>();

            for (i, a) in active.iter().enumerate() {
                for b in active.iter().skip(i + 1) {
                    if a.state != b.state || a.direction != b.direction || !is_tie(a, b) {
                        continue;
                    }

                    if a.id == b.id {
                        return Err(RegistryError::AmbiguousId {
                            version,
                            state: a.state,
                            direction: a.direction,
                            id: a.id,
                            first: a.name,
                            second: b.name,
                        });
                    }

                    if a.kind == b.kind {
                        return Err(RegistryError::AmbiguousKind {
                            version,
                            state: a.state,
                            direction: a.direction,
                            kind: format!("{:?}", a.kind),
                            first: a.name,
                            second: b.name,
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Resolves every lookup for one version once, so a session never
    /// walks the full descriptor list again.
    pub fn session_table(
        &self,
        version: ProtocolVersion,
        inbound: Direction,
    ) -> SessionPacketTable<'_, P> {
        let mut decoders: HashMap<(ConnectionState, u32), &PacketDescriptor<P>> = HashMap::new();
        let mut encoders: HashMap<(ConnectionState, P::Kind), &PacketDescriptor<P>> =
            HashMap::new();

        for descriptor in self
            .descriptors
            .iter()
            .filter(|descriptor| descriptor.versions.contains(version))
        {
            if descriptor.direction == inbound {
                let slot = decoders
                    .entry((descriptor.state, descriptor.id))
                    .or_insert(descriptor);
                if is_more_specific(descriptor, *slot) {
                    *slot = descriptor;
                }
            } else {
                let slot = encoders
                    .entry((descriptor.state, descriptor.kind))
                    .or_insert(descriptor);
                if is_more_specific(descriptor, *slot) {
                    *slot = descriptor;
                }
            }
        }

        SessionPacketTable {
            version,
            decoders,
            encoders,
        }
    }
}

/// Per-session dispatch table for one fixed protocol version.
pub struct SessionPacketTable<'r, P: PacketSet> {
    version: ProtocolVersion,
    decoders: HashMap<(ConnectionState, u32), &'r PacketDescriptor<P>>,
    encoders: HashMap<(ConnectionState, P::Kind), &'r PacketDescriptor<P>>,
}

impl<'r, P: PacketSet> SessionPacketTable<'r, P> {
    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn decoder(&self, state: ConnectionState, id: u32) -> Option<&'r PacketDescriptor<P>> {
        self.decoders.get(&(state, id)).copied()
    }

    pub fn encoder(&self, state: ConnectionState, kind: P::Kind) -> Option<&'r PacketDescriptor<P>> {
        self.encoders.get(&(state, kind)).copied()
    }

    pub fn can_encode(&self, state: ConnectionState, kind: P::Kind) -> bool {
        self.encoders.contains_key(&(state, kind))
    }

    /// Decodes a complete frame; the body must be consumed exactly.
    pub fn decode(&self, state: ConnectionState, packet: &Packet) -> Result<P, PacketError> {
        let (decoded, consumed) = self.decode_prefix(state, packet.id, &packet.data)?;
        if consumed != packet.data.len() {
            return Err(PacketError::TrailingBytes(packet.data.len() - consumed));
        }
        Ok(decoded)
    }

    /// Decodes a packet from the front of `body`, returning how many bytes
    /// its layout occupied.
    pub fn decode_prefix(
        &self,
        state: ConnectionState,
        id: u32,
        body: &[u8],
    ) -> Result<(P, usize), PacketError> {
        let descriptor = self
            .decoder(state, id)
            .ok_or(PacketError::UnknownPacket { id })?;
        let mut reader = PacketReader::new(body, self.version);
        let decoded = (descriptor.decode)(&mut reader)?;
        Ok((decoded, reader.position()))
    }

    pub fn encode(&self, state: ConnectionState, packet: &P) -> Result<Packet, PacketError> {
        let kind = packet.kind();
        let descriptor =
            self.encoder(state, kind)
                .ok_or_else(|| PacketError::UnsupportedPacket {
                    kind: format!("{:?}", kind),
                    version: self.version.to_string(),
                })?;
        let mut writer = PacketWriter::new(descriptor.id, self.version);
        (descriptor.encode)(packet, &mut writer)?;
        Ok(writer.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProtocolVersion::*;

    #[derive(Debug, PartialEq)]
    enum TestPacket {
        Time { time: i64 },
        TimeAndAge { age: i64, time: i64 },
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum TestKind {
        Time,
        TimeAndAge,
    }

    impl PacketSet for TestPacket {
        type Kind = TestKind;

        fn kind(&self) -> TestKind {
            match self {
                TestPacket::Time { .. } => TestKind::Time,
                TestPacket::TimeAndAge { .. } => TestKind::TimeAndAge,
            }
        }
    }

    fn decode_time(reader: &mut PacketReader) -> Result<TestPacket, PacketError> {
        Ok(TestPacket::Time {
            time: reader.read_i64()?,
        })
    }

    fn encode_time(packet: &TestPacket, writer: &mut PacketWriter) -> Result<(), PacketError> {
        match packet {
            TestPacket::Time { time } => writer.write_i64(*time),
            _ => return Err(PacketError::WrongVariant),
        }
        Ok(())
    }

    fn decode_time_and_age(reader: &mut PacketReader) -> Result<TestPacket, PacketError> {
        Ok(TestPacket::TimeAndAge {
            age: reader.read_i64()?,
            time: reader.read_i64()?,
        })
    }

    fn encode_time_and_age(
        packet: &TestPacket,
        writer: &mut PacketWriter,
    ) -> Result<(), PacketError> {
        match packet {
            TestPacket::TimeAndAge { age, time } => {
                writer.write_i64(*age);
                writer.write_i64(*time);
            }
            _ => return Err(PacketError::WrongVariant),
        }
        Ok(())
    }

    fn descriptor(
        name: &'static str,
        versions: VersionRange,
        kind: TestKind,
        decode: DecodeFn<TestPacket>,
        encode: EncodeFn<TestPacket>,
    ) -> PacketDescriptor<TestPacket> {
        PacketDescriptor {
            name,
            state: ConnectionState::Play,
            direction: Direction::Clientbound,
            versions,
            id: 0x04,
            kind,
            decode,
            encode,
        }
    }

    fn registry() -> PacketRegistry<TestPacket> {
        PacketRegistry::new(vec![
            descriptor(
                "time",
                VersionRange::new(Alpha1_0_17, Release1_6_4),
                TestKind::Time,
                decode_time,
                encode_time,
            ),
            descriptor(
                "time_and_age",
                VersionRange::new(Release1_4_2, Release1_6_4),
                TestKind::TimeAndAge,
                decode_time_and_age,
                encode_time_and_age,
            ),
        ])
    }

    #[test]
    fn narrowest_range_wins() {
        let registry = registry();
        registry.validate().unwrap();

        let old = registry
            .resolve_id(ConnectionState::Play, Direction::Clientbound, Release1_3_1, 0x04)
            .unwrap();
        assert_eq!(old.name, "time");

        let new = registry
            .resolve_id(ConnectionState::Play, Direction::Clientbound, Release1_4_6, 0x04)
            .unwrap();
        assert_eq!(new.name, "time_and_age");

        assert!(registry
            .resolve_id(ConnectionState::Play, Direction::Clientbound, Modern1_8, 0x04)
            .is_none());
    }

    #[test]
    fn session_table_matches_resolution() {
        let registry = registry();
        let table = registry.session_table(Release1_4_6, Direction::Serverbound);
        let packet = table
            .encode(
                ConnectionState::Play,
                &TestPacket::TimeAndAge { age: 1, time: -6000 },
            )
            .unwrap();
        assert_eq!(packet.id, 0x04);
        assert_eq!(packet.data.len(), 16);

        let inbound = registry.session_table(Release1_4_6, Direction::Clientbound);
        assert_eq!(
            inbound.decode(ConnectionState::Play, &packet).unwrap(),
            TestPacket::TimeAndAge { age: 1, time: -6000 }
        );
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let registry = registry();
        let table = registry.session_table(Beta1_7, Direction::Clientbound);
        let packet = Packet::new(0x04, vec![0u8; 9]);
        assert!(matches!(
            table.decode(ConnectionState::Play, &packet),
            Err(PacketError::TrailingBytes(1))
        ));
    }

    #[test]
    fn missing_layout_is_reported() {
        let registry = registry();
        let table = registry.session_table(Beta1_7, Direction::Serverbound);
        assert!(matches!(
            table.encode(
                ConnectionState::Play,
                &TestPacket::TimeAndAge { age: 0, time: 0 }
            ),
            Err(PacketError::UnsupportedPacket { .. })
        ));
    }

    #[test]
    fn ties_fail_validation() {
        let registry = PacketRegistry::new(vec![
            descriptor(
                "a",
                VersionRange::new(Beta1_5, Beta1_7),
                TestKind::Time,
                decode_time,
                encode_time,
            ),
            descriptor(
                "b",
                VersionRange::new(Beta1_5, Beta1_7),
                TestKind::TimeAndAge,
                decode_time_and_age,
                encode_time_and_age,
            ),
        ]);
        assert!(matches!(
            registry.validate(),
            Err(RegistryError::AmbiguousId { .. })
        ));
    }
}
