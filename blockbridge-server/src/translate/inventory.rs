use std::time::{Duration, Instant};

use blockbridge_game_common::{nominal_hotbar, ItemStack, HOTBAR_SIZE};
use blockbridge_network_common::{ProtocolFamily, ProtocolVersion};
use blockbridge_network_java::{
    common_packets::ItemStack as WireItemStack, JavaPacket, PacketPlayerInventory,
    PacketSetSlot, PacketWindowItems,
};

/// Alpha main inventory, hotbar first.
const ALPHA_MAIN_INVENTORY: i32 = -1;
const ALPHA_MAIN_INVENTORY_SIZE: usize = 36;

const PLAYER_WINDOW: u8 = 0;
const PLAYER_WINDOW_SIZE: usize = 45;
const PLAYER_WINDOW_HOTBAR: usize = 36;

/// Java clients before beta 1.8 have no creative mode, so their stacks run
/// out and the server has to top them up.
pub fn has_finite_stacks(version: ProtocolVersion) -> bool {
    version.family() == ProtocolFamily::Java && !version.is_at_least(ProtocolVersion::Beta1_8)
}

pub fn to_wire_item(stack: ItemStack) -> WireItemStack {
    WireItemStack::new(stack.id as i16, stack.count as i8, stack.damage as i16)
}

/// The whole starting inventory in the shape the era expects.
pub fn inventory_packet(version: ProtocolVersion, hotbar: &[ItemStack; HOTBAR_SIZE]) -> JavaPacket {
    if version.is_at_least(ProtocolVersion::Beta1_0) {
        let mut items = vec![None; PLAYER_WINDOW_SIZE];
        for (slot, stack) in hotbar.iter().enumerate() {
            items[PLAYER_WINDOW_HOTBAR + slot] = Some(to_wire_item(*stack));
        }
        PacketWindowItems {
            window_id: PLAYER_WINDOW,
            items,
        }
        .into()
    } else {
        let mut items = vec![None; ALPHA_MAIN_INVENTORY_SIZE];
        for (slot, stack) in hotbar.iter().enumerate() {
            items[slot] = Some(to_wire_item(*stack));
        }
        PacketPlayerInventory {
            inventory_type: ALPHA_MAIN_INVENTORY,
            items,
        }
        .into()
    }
}

/// Packets that put `restored` hotbar slots back. Alpha has no single slot
/// update, so it gets the whole inventory again.
pub fn restore_packets(
    version: ProtocolVersion,
    hotbar: &[ItemStack; HOTBAR_SIZE],
    restored: &[usize],
) -> Vec<JavaPacket> {
    if restored.is_empty() {
        Vec::new()
    } else if version.is_at_least(ProtocolVersion::Beta1_0) {
        restored
            .iter()
            .map(|slot| {
                PacketSetSlot {
                    window_id: PLAYER_WINDOW as i8,
                    slot: (PLAYER_WINDOW_HOTBAR + slot) as i16,
                    item: Some(to_wire_item(hotbar[*slot])),
                }
                .into()
            })
            .collect()
    } else {
        vec![inventory_packet(version, hotbar)]
    }
}

/// Tracks what a finite-stack client believes its hotbar holds and when it
/// has to be refilled. Refills are batched: the first depletion opens a
/// window, and when it closes every depleted slot is restored at once.
pub struct Replenisher {
    window: Duration,
    hotbar: [ItemStack; HOTBAR_SIZE],
    counts: [u8; HOTBAR_SIZE],
    selected: usize,
    pending_since: Option<Instant>,
}

impl Replenisher {
    pub fn new(window: Duration) -> Self {
        let hotbar = nominal_hotbar();
        Self {
            window,
            counts: hotbar.map(|stack| stack.count),
            hotbar,
            selected: 0,
            pending_since: None,
        }
    }

    pub fn hotbar(&self) -> &[ItemStack; HOTBAR_SIZE] {
        &self.hotbar
    }

    pub fn selected(&self) -> ItemStack {
        self.hotbar[self.selected]
    }

    pub fn count(&self, slot: usize) -> u8 {
        self.counts[slot]
    }

    pub fn select_slot(&mut self, slot: usize) {
        if slot < HOTBAR_SIZE {
            self.selected = slot;
        }
    }

    /// Alpha reports the held item id instead of a slot.
    pub fn select_item(&mut self, item_id: u16) {
        if let Some(slot) = self.hotbar.iter().position(|stack| stack.id == item_id) {
            self.selected = slot;
        }
    }

    fn take(&mut self, slot: usize, count: u8, now: Instant) {
        self.counts[slot] = self.counts[slot].saturating_sub(count);
        if self.counts[slot] < self.hotbar[slot].count && self.pending_since.is_none() {
            self.pending_since = Some(now);
        }
    }

    /// A block was placed from the selected slot.
    pub fn consume_selected(&mut self, now: Instant) {
        self.take(self.selected, 1, now);
    }

    pub fn drop_selected(&mut self, now: Instant) {
        self.take(self.selected, 1, now);
    }

    /// Alpha drops name the item rather than the slot.
    pub fn drop_item(&mut self, item_id: u16, count: u8, now: Instant) {
        if let Some(slot) = self.hotbar.iter().position(|stack| stack.id == item_id) {
            self.take(slot, count, now);
        }
    }

    /// Slots to restore once the batching window has closed.
    pub fn due(&mut self, now: Instant) -> Vec<usize> {
        match self.pending_since {
            Some(since) if now.duration_since(since) >= self.window => {
                self.pending_since = None;
                let mut restored = Vec::new();
                for slot in 0..HOTBAR_SIZE {
                    if self.counts[slot] != self.hotbar[slot].count {
                        self.counts[slot] = self.hotbar[slot].count;
                        restored.push(slot);
                    }
                }
                restored
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use blockbridge_game_common::NOMINAL_STACK_SIZE;
    use proptest::prelude::*;

    use super::*;

    const WINDOW: Duration = Duration::from_millis(250);

    #[test]
    fn finite_stacks_end_at_beta_1_8() {
        assert!(has_finite_stacks(ProtocolVersion::Alpha1_0_17));
        assert!(has_finite_stacks(ProtocolVersion::Beta1_7));
        assert!(!has_finite_stacks(ProtocolVersion::Beta1_8));
        assert!(!has_finite_stacks(ProtocolVersion::Modern1_8));
        assert!(!has_finite_stacks(ProtocolVersion::Bedrock1_20_0));
    }

    #[test]
    fn refills_wait_for_the_window() {
        let start = Instant::now();
        let mut replenisher = Replenisher::new(WINDOW);
        replenisher.select_slot(2);
        replenisher.consume_selected(start);
        replenisher.consume_selected(start + Duration::from_millis(100));
        assert_eq!(replenisher.count(2), NOMINAL_STACK_SIZE - 2);

        assert!(replenisher.due(start + Duration::from_millis(200)).is_empty());
        assert_eq!(replenisher.due(start + WINDOW), vec![2]);
        assert_eq!(replenisher.count(2), NOMINAL_STACK_SIZE);
        assert!(replenisher.due(start + WINDOW * 4).is_empty());
    }

    #[test]
    fn alpha_drops_and_selection_use_item_ids() {
        let start = Instant::now();
        let mut replenisher = Replenisher::new(WINDOW);
        let glass = replenisher.hotbar()[6];
        replenisher.select_item(glass.id);
        assert_eq!(replenisher.selected(), glass);

        replenisher.drop_item(glass.id, 10, start);
        assert_eq!(replenisher.count(6), NOMINAL_STACK_SIZE - 10);
        assert_eq!(replenisher.due(start + WINDOW), vec![6]);
    }

    #[test]
    fn restore_packet_shapes() {
        let hotbar = nominal_hotbar();
        match &restore_packets(ProtocolVersion::Beta1_7, &hotbar, &[3])[..] {
            [JavaPacket::SetSlot(set_slot)] => {
                assert_eq!(set_slot.slot, 39);
                assert_eq!(set_slot.item, Some(to_wire_item(hotbar[3])));
            }
            other => panic!("unexpected {:?}", other),
        }

        match &restore_packets(ProtocolVersion::Alpha1_2_6, &hotbar, &[0, 4])[..] {
            [JavaPacket::PlayerInventory(inventory)] => {
                assert_eq!(inventory.items.len(), ALPHA_MAIN_INVENTORY_SIZE);
                assert_eq!(inventory.items[4], Some(to_wire_item(hotbar[4])));
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(restore_packets(ProtocolVersion::Beta1_7, &hotbar, &[]).is_empty());
    }

    proptest! {
        #[test]
        fn depleted_stacks_converge(
            actions in prop::collection::vec((0usize..HOTBAR_SIZE, any::<bool>(), 0u64..250), 1..40)
        ) {
            let start = Instant::now();
            let mut replenisher = Replenisher::new(WINDOW);
            let mut now = start;
            for (slot, drop, delay) in actions {
                now += Duration::from_millis(delay);
                replenisher.select_slot(slot);
                if drop {
                    replenisher.drop_selected(now);
                } else {
                    replenisher.consume_selected(now);
                }
                replenisher.due(now);
                for slot in 0..HOTBAR_SIZE {
                    prop_assert_eq!(replenisher.hotbar()[slot], nominal_hotbar()[slot]);
                }
            }

            replenisher.due(now + WINDOW);
            for slot in 0..HOTBAR_SIZE {
                prop_assert_eq!(replenisher.count(slot), NOMINAL_STACK_SIZE);
            }
        }
    }
}
