use std::fmt::Write as _;

use crate::combat::analysis::analyze;
use crate::combat::export::{export_attack_events, write_cast_timeline};
use crate::combat::power::PowerCategory;
use crate::config::stats::Stat;
use crate::config::{validate_loadout, Loadout, RotationPlan};
use crate::data::catalog::{catalog_path_from_env, Catalog};
use crate::optimizer::model::PowerModel;
use crate::optimizer::monte_carlo::{simulate, SimulationConfig, DEFAULT_ITERATIONS};
use crate::optimizer::solver::{required_delta, required_deltas, SolveOutcome};
use crate::scheduler::{schedule, ScheduleConfig};

const USAGE: &str = "usage: macrosim <schedule|simulate|solve|validate|export> <loadout> [options]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Schedule,
    Simulate,
    Solve,
    Validate,
    Export,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("schedule") => Some(Command::Schedule),
        Some("simulate") => Some(Command::Simulate),
        Some("solve") => Some(Command::Solve),
        Some("validate") => Some(Command::Validate),
        Some("export") => Some(Command::Export),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let positional = positional_args(args);
    let Some(loadout_path) = positional.first() else {
        eprintln!("{USAGE}");
        return 2;
    };
    log::debug!("running {command:?} for {loadout_path}");

    match command {
        Command::Schedule => handle_schedule(args, loadout_path),
        Command::Simulate => handle_simulate(args, loadout_path),
        Command::Solve => handle_solve(args, loadout_path, &positional[1..]),
        Command::Validate => handle_validate(args, loadout_path),
        Command::Export => handle_export(args, loadout_path, &positional[1..]),
    }
}

/// Arguments after the command word, minus `--flag value` pairs and switches.
fn positional_args(args: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = args.iter().skip(2);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--table" | "--analysis" => {}
            "--catalog" | "--seed" | "--iterations" | "--workers" => {
                rest.next();
            }
            _ => out.push(arg.clone()),
        }
    }
    out
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

fn load_catalog(args: &[String]) -> Result<Catalog, String> {
    let path = flag_value(args, "--catalog")
        .cloned()
        .unwrap_or_else(catalog_path_from_env);
    Catalog::load(&path).map_err(|err| format!("catalog error: {err}"))
}

fn load_plan(args: &[String], loadout_path: &str) -> Result<(Loadout, RotationPlan), String> {
    let catalog = load_catalog(args)?;
    let loadout = Loadout::load(loadout_path).map_err(|err| format!("loadout error: {err}"))?;
    let plan =
        RotationPlan::resolve(&loadout, &catalog).map_err(|err| format!("invalid loadout: {err}"))?;
    Ok((loadout, plan))
}

fn print_json<T: serde::Serialize>(value: &T, what: &str) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {what}: {err}");
            1
        }
    }
}

fn handle_schedule(args: &[String], loadout_path: &str) -> i32 {
    let (loadout, plan) = match load_plan(args, loadout_path) {
        Ok(loaded) => loaded,
        Err(message) => {
            eprintln!("{message}");
            return 1;
        }
    };
    let casts = schedule(&plan, &ScheduleConfig::from_loadout(&loadout));
    if has_flag(args, "--table") {
        if let Err(err) = write_cast_timeline(std::io::stdout().lock(), &casts) {
            eprintln!("failed to write timeline: {err}");
            return 1;
        }
        0
    } else {
        print_json(&casts, "cast timeline")
    }
}

fn handle_simulate(args: &[String], loadout_path: &str) -> i32 {
    let (loadout, plan) = match load_plan(args, loadout_path) {
        Ok(loaded) => loaded,
        Err(message) => {
            eprintln!("{message}");
            return 1;
        }
    };
    let with_analysis = has_flag(args, "--analysis");
    let config = SimulationConfig {
        iterations: parse_usize_arg(flag_value(args, "--iterations"), "iterations", DEFAULT_ITERATIONS),
        seed: flag_value(args, "--seed").map(|raw| parse_u64_arg(Some(raw), "seed", 0)),
        keep_runs: with_analysis,
        workers: parse_usize_arg(flag_value(args, "--workers"), "workers", 0),
    };

    let result = match simulate(&plan, &loadout, &config) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("simulation failed: {err}");
            return 1;
        }
    };
    log::info!("simulation finished with seed {}", result.seed);

    if has_flag(args, "--table") {
        let mut table = String::from("category\tnumber\tmin\tp25\tp50\tp75\tmax\tstd\n");
        for c in &result.categories {
            let s = c.spread;
            let _ = writeln!(
                table,
                "{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\t{:.2}",
                c.category, c.number, s.min, s.p25, s.p50, s.p75, s.max, s.std
            );
        }
        print!("{table}");
        return 0;
    }

    if with_analysis {
        let runs = result.sampled_boss_attacks.clone().unwrap_or_default();
        let analysis = match analyze(&runs, &result.deterministic_boss_attacks) {
            Ok(analysis) => analysis,
            Err(err) => {
                eprintln!("analysis failed: {err}");
                return 1;
            }
        };
        let payload = serde_json::json!({
            "seed": result.seed,
            "iterations": result.iterations,
            "categories": result.categories,
            "per_second": result.per_second(),
            "analysis": analysis,
        });
        return print_json(&payload, "simulation result");
    }
    print_json(&result, "simulation result")
}

fn handle_solve(args: &[String], loadout_path: &str, rest: &[String]) -> i32 {
    let usage = "usage: macrosim solve <loadout> <stat> <category|all> <target...>";
    let (Some(stat_name), Some(category_name)) = (rest.first(), rest.get(1)) else {
        eprintln!("{usage}");
        return 2;
    };
    let Some(stat) = Stat::from_name(stat_name) else {
        eprintln!("unknown stat '{stat_name}'");
        return 2;
    };
    let targets: Vec<f64> = match rest[2..].iter().map(|raw| raw.parse::<f64>()).collect() {
        Ok(targets) => targets,
        Err(_) => {
            eprintln!("{usage}");
            return 2;
        }
    };

    let (loadout, plan) = match load_plan(args, loadout_path) {
        Ok(loaded) => loaded,
        Err(message) => {
            eprintln!("{message}");
            return 1;
        }
    };
    let model = PowerModel::new(&plan, &loadout);

    if category_name == "all" {
        let Ok(targets) = <[f64; 4]>::try_from(targets.as_slice()) else {
            eprintln!("'all' needs one target per category (4)");
            return 2;
        };
        let outcomes = required_deltas(&model, stat, &targets);
        let payload: Vec<serde_json::Value> = PowerCategory::ALL
            .iter()
            .zip(outcomes)
            .map(|(category, outcome)| {
                serde_json::json!({ "category": category, "result": outcome })
            })
            .collect();
        return print_json(&payload, "solver result");
    }

    let Some(category) = PowerCategory::from_name(category_name) else {
        eprintln!("unknown power category '{category_name}'");
        return 2;
    };
    let [target] = targets.as_slice() else {
        eprintln!("{usage}");
        return 2;
    };
    match required_delta(&model, stat, *target, category) {
        SolveOutcome::Required(delta) => {
            println!("{stat} +{delta:.1} reaches {category} {target}");
            0
        }
        SolveOutcome::Unsatisfiable => {
            eprintln!("{category} {target} is not reachable by raising {stat}");
            1
        }
    }
}

fn handle_validate(args: &[String], loadout_path: &str) -> i32 {
    let catalog = match load_catalog(args) {
        Ok(catalog) => catalog,
        Err(message) => {
            eprintln!("{message}");
            return 1;
        }
    };
    let loadout = match Loadout::load(loadout_path) {
        Ok(loadout) => loadout,
        Err(err) => {
            eprintln!("loadout error: {err}");
            return 1;
        }
    };

    let report = validate_loadout(&loadout, &catalog);
    for diag in &report.diagnostics {
        eprintln!("- [{}] {}: {}", diag.severity, diag.context, diag.message);
    }
    if report.has_errors() {
        eprintln!("validation failed: {loadout_path}");
        1
    } else {
        println!("validation passed: {loadout_path}");
        0
    }
}

fn handle_export(args: &[String], loadout_path: &str, rest: &[String]) -> i32 {
    let Some(out_path) = rest.first() else {
        eprintln!("usage: macrosim export <loadout> <out.csv> [--catalog <path>]");
        return 2;
    };
    let (loadout, plan) = match load_plan(args, loadout_path) {
        Ok(loaded) => loaded,
        Err(message) => {
            eprintln!("{message}");
            return 1;
        }
    };
    let evaluation = PowerModel::new(&plan, &loadout).evaluate(&loadout.stats);
    match export_attack_events(out_path, &evaluation.boss_attacks) {
        Ok(()) => {
            println!(
                "export complete: events={}, path='{out_path}'",
                evaluation.boss_attacks.len()
            );
            0
        }
        Err(err) => {
            eprintln!("export failed: {err}");
            1
        }
    }
}

fn parse_usize_arg(raw: Option<&String>, name: &str, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn parse_u64_arg(raw: Option<&String>, name: &str, default: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
