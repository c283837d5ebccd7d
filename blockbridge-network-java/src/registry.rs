use blockbridge_network_common::PacketRegistry;
use lazy_static::lazy_static;

use crate::{legacy, modern, JavaPacket};

lazy_static! {
    /// Every Java layout, pre-netty and netty, in one table.
    pub static ref JAVA_PACKETS: PacketRegistry<JavaPacket> = {
        let mut descriptors = legacy::descriptors();
        descriptors.extend(modern::descriptors());
        PacketRegistry::new(descriptors)
    };
}
