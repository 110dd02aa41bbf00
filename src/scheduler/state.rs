use std::collections::VecDeque;

use serde::Serialize;

use crate::config::{RotationPlan, SLOT_COUNT};

/// A casting ability waiting for its confirm click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InFlight {
    pub slot: usize,
    pub fire_at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LastFire {
    pub at_ms: u64,
    pub combo_index: u32,
}

/// Mutable bookkeeping for one scheduling run. Owned by a single
/// [RotationCore](super::RotationCore); never shared.
///
/// For every slot `unclaimed + queued + in-flight == charges`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleState {
    pub charges: [u32; SLOT_COUNT],
    /// Ready charges not yet handed to the queue.
    pub unclaimed: [u32; SLOT_COUNT],
    /// When the running recharge timer started, if the slot is below max.
    pub recharge_started_ms: [Option<u64>; SLOT_COUNT],
    pub queue: VecDeque<usize>,
    pub in_flight: Option<InFlight>,
    pub busy_until_ms: u64,
    /// Slot whose hotkey was pressed last.
    pub selected: Option<usize>,
    pub last_fire: [Option<LastFire>; SLOT_COUNT],
    /// Slots holding unclaimed charges, in the order they became ready.
    pub ready_order: Vec<usize>,
}

impl ScheduleState {
    /// Every equipped slot starts full, ready in slot order.
    pub fn new(plan: &RotationPlan) -> Self {
        let mut charges = [0; SLOT_COUNT];
        let mut ready_order = Vec::with_capacity(SLOT_COUNT);
        for planned in plan.equipped() {
            charges[planned.slot] = planned.max_charges();
            if planned.max_charges() > 0 {
                ready_order.push(planned.slot);
            }
        }
        Self {
            charges,
            unclaimed: charges,
            recharge_started_ms: [None; SLOT_COUNT],
            queue: VecDeque::new(),
            in_flight: None,
            busy_until_ms: 0,
            selected: None,
            last_fire: [None; SLOT_COUNT],
            ready_order,
        }
    }

    /// Move `count` unclaimed charges of `slot` onto the queue.
    pub(crate) fn claim(&mut self, slot: usize, count: u32) {
        let count = count.min(self.unclaimed[slot]);
        for _ in 0..count {
            self.queue.push_back(slot);
        }
        self.unclaimed[slot] -= count;
        if self.unclaimed[slot] == 0 {
            self.ready_order.retain(|&s| s != slot);
        }
    }

    pub(crate) fn add_ready_charge(&mut self, slot: usize) {
        self.charges[slot] += 1;
        self.unclaimed[slot] += 1;
        if !self.ready_order.contains(&slot) {
            self.ready_order.push(slot);
        }
    }

    pub fn queued(&self, slot: usize) -> usize {
        self.queue.iter().filter(|&&s| s == slot).count()
    }
}
