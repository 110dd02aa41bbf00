use std::env;

use env_logger::Env;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args: Vec<String> = env::args().collect();
    std::process::exit(macrosim::cli::run_with_args(&args));
}
