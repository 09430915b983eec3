//! # Scheduling Simulator Daemon
//!
//! Main entry point for the simulator host.

use schedsimd::{SimMode, SimRuntime, SimRuntimeConfig};
use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    let config = parse_args(&args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        print_usage(&args[0]);
        process::exit(1);
    });

    let mut runtime = SimRuntime::new(config).unwrap_or_else(|e| {
        eprintln!("Load failed: {}", e);
        process::exit(1);
    });

    if let Err(e) = runtime.run() {
        eprintln!("Runtime error: {}", e);
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<SimRuntimeConfig, String> {
    let mut config = SimRuntimeConfig::default();
    let mut input: Option<String> = None;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            mode_arg if mode_arg.starts_with("--mode=") => {
                let value = &mode_arg["--mode=".len()..];
                config.mode = SimMode::parse(value)
                    .ok_or_else(|| format!("Invalid mode: {}", value))?;
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --seed".to_string());
                }
                config.seed = args[i]
                    .parse()
                    .map_err(|_| format!("Invalid seed value: {}", args[i]))?;
            }
            "--output" | "-o" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --output".to_string());
                }
                config.output = Some(args[i].clone());
            }
            "--max-ticks" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --max-ticks".to_string());
                }
                let cap = args[i]
                    .parse()
                    .map_err(|_| format!("Invalid max-ticks value: {}", args[i]))?;
                config.max_ticks = Some(cap);
            }
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                return Err(format!("Unknown option: {}", other));
            }
            other => {
                if input.is_some() {
                    return Err(format!("Unexpected extra argument: {}", other));
                }
                input = Some(other.to_string());
            }
        }
        i += 1;
    }

    config.input_path = input.ok_or_else(|| "Missing input file".to_string())?;
    Ok(config)
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <input_file> [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --mode=MODE          Observer mode: interactive (default), step, silent");
    eprintln!("  --seed N             Fork RNG seed (default 0)");
    eprintln!("  -o, --output PATH    Write the report to PATH instead of stdout");
    eprintln!("  --max-ticks N        Override the safety cap on simulated ticks");
    eprintln!("  -h, --help           Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} data/input.txt --mode=silent", program);
    eprintln!("  {} data/input.txt --mode=step --seed 7 -o data/output.txt", program);
}
