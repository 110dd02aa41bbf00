//! The stepping core shared by the offline scheduler and the live loop.

use crate::config::{ChainMode, RotationPlan, SLOT_COUNT};
use crate::scheduler::state::{InFlight, LastFire, ScheduleState};
use crate::scheduler::{CastEvent, CastSource, ScheduleConfig, COMBO_WINDOW_MS};

/// Who advances recharge timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RechargeClock {
    /// `step` compares timer start against the current tick.
    Polled,
    /// The owner runs timers and reports them with `complete_recharge`.
    External,
}

pub struct RotationCore<'p> {
    plan: &'p RotationPlan,
    cooldown_ms: [u64; SLOT_COUNT],
    cast_delay_ms: u64,
    clock: RechargeClock,
    state: ScheduleState,
    started_timers: Vec<usize>,
}

impl<'p> RotationCore<'p> {
    pub fn new(plan: &'p RotationPlan, config: &ScheduleConfig, clock: RechargeClock) -> Self {
        let mut cooldown_ms = [0; SLOT_COUNT];
        for planned in plan.equipped() {
            cooldown_ms[planned.slot] = planned
                .ability
                .effective_cooldown_ms(config.cooldown_reduction_pct);
        }
        Self {
            plan,
            cooldown_ms,
            cast_delay_ms: config.cast_delay_ms,
            clock,
            state: ScheduleState::new(plan),
            started_timers: Vec::new(),
        }
    }

    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    pub fn cooldown_ms(&self, slot: usize) -> u64 {
        self.cooldown_ms[slot]
    }

    /// Slots whose recharge timer started since the last call. Only filled
    /// under [RechargeClock::External].
    pub fn take_started_timers(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.started_timers)
    }

    /// Advance one tick: recharge, land in-flight casts, plan, fire.
    pub fn step(&mut self, now_ms: u64, out: &mut Vec<CastEvent>) {
        if self.clock == RechargeClock::Polled {
            self.poll_recharges(now_ms);
        }
        if let Some(in_flight) = self.state.in_flight {
            if in_flight.fire_at_ms <= now_ms {
                self.state.in_flight = None;
                self.fire(in_flight.slot, in_flight.fire_at_ms, out);
            }
        }
        self.plan_casts();
        if self.state.in_flight.is_none() && now_ms >= self.state.busy_until_ms {
            if let Some(slot) = self.state.queue.pop_front() {
                self.dispatch(slot, now_ms, out);
            }
        }
    }

    /// One recharge of `slot` finished at `now_ms`. Returns true when the slot
    /// is still below max and another timer started.
    pub fn complete_recharge(&mut self, slot: usize, now_ms: u64) -> bool {
        let max = self.plan.max_charges(slot);
        if self.state.charges[slot] >= max {
            self.state.recharge_started_ms[slot] = None;
            return false;
        }
        self.state.add_ready_charge(slot);
        if self.state.charges[slot] < max {
            self.start_timer(slot, now_ms);
            true
        } else {
            self.state.recharge_started_ms[slot] = None;
            false
        }
    }

    /// Queue chain `index` if every member is ready. Used for manual chains.
    pub fn trigger_chain(&mut self, index: usize) -> bool {
        if !self.chain_ready(index) {
            return false;
        }
        self.enqueue_chain(index);
        true
    }

    fn poll_recharges(&mut self, now_ms: u64) {
        for slot in 0..SLOT_COUNT {
            let Some(started) = self.state.recharge_started_ms[slot] else {
                continue;
            };
            if now_ms.saturating_sub(started) >= self.cooldown_ms[slot] {
                self.complete_recharge(slot, now_ms);
            }
        }
    }

    fn start_timer(&mut self, slot: usize, now_ms: u64) {
        self.state.recharge_started_ms[slot] = Some(now_ms);
        if self.clock == RechargeClock::External {
            self.started_timers.push(slot);
        }
    }

    fn chain_ready(&self, index: usize) -> bool {
        let Some(chain) = self.plan.chains.get(index) else {
            return false;
        };
        chain.satisfiable
            && chain
                .requirements
                .iter()
                .all(|req| self.state.unclaimed[req.slot] >= req.count)
    }

    fn enqueue_chain(&mut self, index: usize) {
        let plan = self.plan;
        for member in &plan.chains[index].members {
            self.state.claim(member.slot, member.count);
        }
    }

    fn plan_casts(&mut self) {
        let plan = self.plan;
        let mut locked = [false; SLOT_COUNT];

        while let Some(index) = (0..plan.chains.len())
            .find(|&i| plan.chains[i].mode == ChainMode::Automatic && self.chain_ready(i))
        {
            self.enqueue_chain(index);
            for req in &plan.chains[index].requirements {
                locked[req.slot] = true;
            }
        }

        let ranked = plan.ranked_slots();
        let mut order = ranked.clone();
        order.extend(
            self.state
                .ready_order
                .iter()
                .copied()
                .filter(|slot| !ranked.contains(slot)),
        );

        for slot in order {
            if locked[slot] {
                continue;
            }
            let Some(planned) = plan.slot(slot) else {
                continue;
            };
            let unclaimed = self.state.unclaimed[slot];
            if planned.chain.is_some() {
                if planned.solo_usable && unclaimed > 0 {
                    self.state.claim(slot, unclaimed.min(planned.combo_repeat));
                }
            } else if planned.enabled && planned.combo_repeat > 0 {
                let cycles = unclaimed / planned.combo_repeat;
                self.state.claim(slot, cycles * planned.combo_repeat);
            }
        }
    }

    fn dispatch(&mut self, slot: usize, now_ms: u64, out: &mut Vec<CastEvent>) {
        let casting = self.plan.slot(slot).is_some_and(|p| p.ability.casting);
        if casting && self.state.selected != Some(slot) {
            self.state.in_flight = Some(InFlight {
                slot,
                fire_at_ms: now_ms + self.cast_delay_ms,
            });
            self.state.busy_until_ms = now_ms + 2 * self.cast_delay_ms;
        } else {
            self.fire(slot, now_ms, out);
            self.state.busy_until_ms = now_ms + self.cast_delay_ms;
        }
        self.state.selected = Some(slot);
    }

    fn fire(&mut self, slot: usize, at_ms: u64, out: &mut Vec<CastEvent>) {
        let max = self.plan.max_charges(slot);
        if self.state.charges[slot] >= max {
            self.start_timer(slot, at_ms);
        }
        self.state.charges[slot] = self.state.charges[slot].saturating_sub(1);

        let max_combo = self
            .plan
            .slot(slot)
            .map_or(0, |planned| planned.ability.max_combo_index());
        let combo_index = match self.state.last_fire[slot] {
            Some(prev)
                if at_ms.saturating_sub(prev.at_ms) <= COMBO_WINDOW_MS
                    && prev.combo_index < max_combo =>
            {
                prev.combo_index + 1
            }
            _ => 0,
        };
        self.state.last_fire[slot] = Some(LastFire { at_ms, combo_index });
        out.push(CastEvent {
            source: CastSource::Slot(slot),
            timestamp_ms: at_ms,
            combo_index,
        });
    }
}
