use macrosim::combat::analysis::{analyze, DISTRIBUTION_BINS, STEP_COUNT};
use macrosim::combat::{
    merge_buffs, round_to, tier_multiplier, total_damage, BuffInterval, Encounter, PowerCategory,
    Rng, Roll, Target,
};
use macrosim::config::{EquippedAbility, Loadout, RotationPlan, SimInfo, Stat};
use macrosim::data::{Ability, AbilityId, AbilityLevel, Catalog, TimedEffect};
use macrosim::optimizer::{simulate, summarize, SimulationConfig};
use macrosim::scheduler::{CastEvent, CastSource};

fn approx_eq(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "expected {b}, got {a}");
}

fn catalog() -> Catalog {
    Catalog::single_job(
        "main",
        "warrior",
        vec![
            Ability {
                id: AbilityId::from("cleave"),
                name: "Cleave".to_string(),
                cooldown: 5.0,
                max_charges: 2,
                casting: false,
                levels: vec![AbilityLevel {
                    combos: vec![
                        vec![TimedEffect::damage(0.0, 1.0), TimedEffect::damage(0.333, 0.5)],
                        vec![TimedEffect::damage(0.0, 2.0)],
                    ],
                }],
            },
            Ability {
                id: AbilityId::from("roar"),
                name: "Roar".to_string(),
                cooldown: 20.0,
                max_charges: 1,
                casting: false,
                levels: vec![AbilityLevel {
                    combos: vec![vec![TimedEffect::buff(0.0, Stat::Attack, 100.0, 2.0)]],
                }],
            },
        ],
    )
}

fn loadout() -> Loadout {
    let mut loadout = Loadout::new("main", "warrior");
    loadout.equipped = vec![
        EquippedAbility::new(0, "cleave"),
        EquippedAbility {
            priority: Some(1),
            ..EquippedAbility::new(1, "roar")
        },
    ];
    loadout.stats = loadout
        .stats
        .with(Stat::Attack, 100.0)
        .with(Stat::Strength, 60.0)
        .with(Stat::Intellect, 40.0)
        .with(Stat::CritRate, 40.0)
        .with(Stat::CritDamage, 150.0)
        .with(Stat::BossDamage, 30.0)
        .with(Stat::Vitality, 2000.0)
        .with(Stat::AttackSpeed, 10.0);
    loadout.sim_info = SimInfo {
        normal_tier: 0.0,
        boss_tier: 2.0,
        potion_heal: 100.0,
    };
    loadout
}

fn cast(source: CastSource, timestamp_ms: u64, combo_index: u32) -> CastEvent {
    CastEvent {
        source,
        timestamp_ms,
        combo_index,
    }
}

#[test]
fn encounter_dates_hits_and_applies_buff_window() {
    let loadout = loadout();
    let plan = RotationPlan::resolve(&loadout, &catalog()).expect("loadout should resolve");
    let timeline = [
        cast(CastSource::Slot(1), 0, 0),
        cast(CastSource::Slot(0), 150, 0),
        cast(CastSource::Slot(0), 300, 1),
        cast(CastSource::Basic, 3000, 0),
    ];
    let encounter = Encounter::from_timeline(&timeline, &plan);

    let times: Vec<f64> = encounter.hits.iter().map(|h| h.time).collect();
    assert_eq!(times, vec![0.15, 0.3, 0.48, 3.0]);
    assert_eq!(encounter.buffs.len(), 1);
    assert_eq!(encounter.buffs[0].end, 2.0);

    let stats = loadout.stats.with(Stat::CritRate, 0.0);
    let events = encounter.run(&stats, &loadout.sim_info, Target::Normal, Roll::Expected);
    // Buffed attack 200 inside the window, 100 for the basic at 3 s.
    approx_eq(events[0].damage, round_to(200.0 * 100.0 * 0.01 * 1.1, 5), 1e-9);
    approx_eq(events[1].damage, round_to(200.0 * 100.0 * 0.01 * 1.1 * 2.0, 5), 1e-9);
    approx_eq(events[3].damage, 100.0 * 100.0 * 0.01 * 1.1, 1e-9);
}

#[test]
fn combo_index_beyond_timelines_uses_last_one() {
    let loadout = loadout();
    let plan = RotationPlan::resolve(&loadout, &catalog()).expect("loadout should resolve");
    let encounter = Encounter::from_timeline(&[cast(CastSource::Slot(0), 0, 5)], &plan);
    assert_eq!(encounter.hits.len(), 1);
    assert_eq!(encounter.hits[0].multiplier, 2.0);
}

#[test]
fn boss_tier_penalty_and_bonus_apply_to_boss_only() {
    let loadout = loadout();
    let plan = RotationPlan::resolve(&loadout, &catalog()).expect("loadout should resolve");
    let encounter = Encounter::from_timeline(&[cast(CastSource::Basic, 0, 0)], &plan);
    let stats = loadout.stats.with(Stat::CritRate, 0.0);
    let boss = encounter.run(&stats, &loadout.sim_info, Target::Boss, Roll::Expected);
    let normal = encounter.run(&stats, &loadout.sim_info, Target::Normal, Roll::Expected);
    approx_eq(boss[0].damage / normal[0].damage, 0.85 * 1.3, 1e-6);
}

#[test]
fn tier_table_bounds() {
    assert_eq!(tier_multiplier(100), 0.0);
    assert_eq!(tier_multiplier(6), 0.0);
    assert_eq!(tier_multiplier(0), 1.0);
    assert_eq!(tier_multiplier(-25), 1.4);
    assert_eq!(tier_multiplier(-26), 1.5);
}

#[test]
fn buff_merge_is_idempotent_on_overlapping_reapplications() {
    let raw: Vec<BuffInterval> = (0..10)
        .map(|i| BuffInterval {
            stat: Stat::Power,
            amount: 10.0,
            start: i as f64 * 1.5,
            end: i as f64 * 1.5 + 2.0,
        })
        .collect();
    let merged = merge_buffs(&raw);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].start, 0.0);
    assert_eq!(merged[0].end, 15.5);
    assert_eq!(merge_buffs(&merged), merged);
}

#[test]
fn sampled_runs_are_reproducible_per_seed() {
    let loadout = loadout();
    let plan = RotationPlan::resolve(&loadout, &catalog()).expect("loadout should resolve");
    let encounter = Encounter::from_timeline(
        &[cast(CastSource::Slot(0), 0, 0), cast(CastSource::Basic, 500, 0)],
        &plan,
    );
    let run = |seed| {
        let mut rng = Rng::new(seed);
        encounter.run(&loadout.stats, &loadout.sim_info, Target::Boss, Roll::Sampled(&mut rng))
    };
    assert_eq!(run(42), run(42));
    assert_ne!(total_damage(&run(42)), total_damage(&run(43)));
}

#[test]
fn thousand_runs_keep_percentiles_ordered() {
    let loadout = loadout();
    let plan = RotationPlan::resolve(&loadout, &catalog()).expect("loadout should resolve");
    let config = SimulationConfig {
        iterations: 1000,
        seed: Some(2024),
        keep_runs: true,
        workers: 0,
    };
    let result = simulate(&plan, &loadout, &config).expect("simulation should succeed");

    assert_eq!(result.categories.len(), 4);
    for summary in &result.categories {
        let s = summary.spread;
        assert!(s.min <= s.p25, "{:?}", summary.category);
        assert!(s.p25 <= s.p50);
        assert!(s.p50 <= s.p75);
        assert!(s.p75 <= s.max);
        assert!(s.std >= 0.0);
    }
    let boss = result
        .category(PowerCategory::BossDamage)
        .expect("boss damage summary");
    assert!(boss.spread.min <= boss.number * 1.2);

    let runs = result.sampled_boss_attacks.as_ref().expect("runs kept");
    let totals: Vec<f64> = runs.iter().map(|r| total_damage(r)).collect();
    let recomputed = summarize(&totals).expect("non-empty");
    approx_eq(recomputed.p50, boss.spread.p50, 1e-6);
}

#[test]
fn analysis_bands_and_distribution_cover_all_runs() {
    let loadout = loadout();
    let plan = RotationPlan::resolve(&loadout, &catalog()).expect("loadout should resolve");
    let config = SimulationConfig {
        iterations: 40,
        seed: Some(5),
        keep_runs: true,
        workers: 2,
    };
    let result = simulate(&plan, &loadout, &config).expect("simulation should succeed");
    let runs = result.sampled_boss_attacks.clone().expect("runs kept");
    let analysis = analyze(&runs, &result.deterministic_boss_attacks).expect("analysis");

    assert_eq!(analysis.damage_per_second.time.len(), STEP_COUNT + 1);
    assert_eq!(analysis.cumulative_damage.mean[0], 0.0);
    let band = &analysis.cumulative_damage;
    assert!((0..band.time.len())
        .all(|i| band.min[i] <= band.mean[i] + 1e-9 && band.mean[i] <= band.max[i] + 1e-9));
    assert!(band.mean.windows(2).all(|w| w[0] <= w[1]));

    assert_eq!(analysis.distribution.len(), DISTRIBUTION_BINS);
    assert_eq!(analysis.distribution.iter().map(|b| b.count).sum::<usize>(), 40);

    let share: f64 = analysis.shares.iter().map(|s| s.share).sum();
    approx_eq(share, 100.0, 1e-6);
}
