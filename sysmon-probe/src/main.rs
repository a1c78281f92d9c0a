mod cli;
mod config;
mod error;
mod report;

use dotenv::dotenv;
use mallab_filter_enum::FilterRecord;

use crate::config::ProbeConfig;
use crate::error::ProbeError;

fn main() {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("[!] {}", e);
            std::process::exit(2);
        }
    }
}

fn run() -> Result<i32, ProbeError> {
    let args = cli::parse_args(std::env::args().skip(1))?;
    if args.help {
        println!("{}", cli::USAGE);
        return Ok(0);
    }

    let mut cfg = ProbeConfig::from_env()?;
    args.apply(&mut cfg);
    log::info!(
        "looking for {} at altitude {} (default name {})",
        cfg.label,
        cfg.target_altitude,
        cfg.default_name
    );

    let filters = enumerate_host(cfg.initial_buffer)?;
    log::info!("filter manager reported {} filter(s)", filters.len());

    let report = report::evaluate(&filters, &cfg);
    if args.json {
        println!("{}", report::render_json(&report)?);
    } else {
        if args.list {
            println!("{}", report::render_table(&filters));
        }
        println!("{}", report::render_verdict(&report, &cfg.label));
    }

    Ok(report.verdict.exit_code())
}

#[cfg(windows)]
fn enumerate_host(initial_buffer: usize) -> Result<Vec<FilterRecord>, ProbeError> {
    Ok(mallab_filter_enum::enumerate_filters_with_capacity(initial_buffer)?)
}

#[cfg(not(windows))]
fn enumerate_host(_initial_buffer: usize) -> Result<Vec<FilterRecord>, ProbeError> {
    Err(ProbeError::Unsupported)
}
