use clap::{Arg, Command};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc};

use libgrams_sim::config::Config;
use libgrams_sim::process::{create_subsets, process_subset};
use libgrams_sim::simulator::Simulator;
use libgrams_sim::worker_status::{BarColor, WorkerStatus};

const LOG_FILE: &str = "./grams_sim.log";

fn make_template_config(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let yaml_str = serde_yaml::to_string(&config)?;
    let mut file = File::create(path)?;
    file.write_all(yaml_str.as_bytes())?;
    Ok(())
}

/// Library diagnostics go to a log file, the terminal only gets the summary
fn init_file_logger(path: &Path) -> spdlog::Result<()> {
    let file_sink = Arc::new(
        spdlog::sink::FileSink::builder()
            .path(path)
            .formatter(Box::new(spdlog::formatter::PatternFormatter::new(
                spdlog::formatter::pattern!(
                    "[{date_short} {time_short}] - [thread: {tid}] - [{^{level}}] - {payload}{eol}"
                ),
            )))
            .truncate(true)
            .build()?,
    );
    let logger = Arc::new(
        spdlog::Logger::builder()
            .flush_level_filter(spdlog::LevelFilter::All)
            .sink(file_sink)
            .build()?,
    );
    spdlog::set_default_logger(logger);
    Ok(())
}

fn bar_style(color: &BarColor) -> ProgressStyle {
    ProgressStyle::with_template(&format!(
        "{{msg:>12}} [{{bar:40.{}/blue}}] {{pos:>3}}%",
        color.as_str()
    ))
    .unwrap_or_else(|_| ProgressStyle::default_bar())
}

fn main() -> ExitCode {
    // Create a cli
    let matches = Command::new("grams_sim_cli")
        .about("Detector response and electronics simulation for the GRAMS LArTPC")
        .arg_required_else_help(true)
        .subcommand(Command::new("new").about("Make a template configuration yaml file"))
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .global(true)
                .help("Path to the configuration file"),
        )
        .get_matches();

    // Initialize feedback
    let logger = simplelog::TermLogger::new(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    let pb_manager = MultiProgress::new();

    if let Err(e) = LogWrapper::new(pb_manager.clone(), logger).try_init() {
        eprintln!("Could not create logging/progress: {e}");
        return ExitCode::FAILURE;
    }

    // Parse the cli
    let config_path = match matches.get_one::<String>("path") {
        Some(p) => PathBuf::from(p),
        None => {
            log::error!("A configuration path is required (-p/--path)");
            return ExitCode::FAILURE;
        }
    };

    if let Some(("new", _)) = matches.subcommand() {
        log::info!(
            "Making a template config at {}...",
            config_path.to_string_lossy()
        );
        return match make_template_config(&config_path) {
            Ok(()) => {
                log::info!("Done.");
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Could not write template config: {e}");
                ExitCode::FAILURE
            }
        };
    }

    if let Err(e) = init_file_logger(Path::new(LOG_FILE)) {
        log::warn!("Could not create log file {LOG_FILE}: {e}");
    }
    spdlog::info!("Starting GRAMS simulation");

    // Load our config
    log::info!("Loading config from {}...", config_path.to_string_lossy());
    let config = match Config::read_config_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = config.validate() {
        log::error!("{e}");
        return ExitCode::FAILURE;
    }
    log::info!("Config successfully loaded.");
    log::info!("Hit Path: {}", config.hit_path.to_string_lossy());
    log::info!("Output Path: {}", config.output_path.to_string_lossy());
    match &config.geometry_path {
        Some(p) => log::info!("Geometry Path: {}", p.to_string_lossy()),
        None => log::info!("Geometry Path: bundled default"),
    }
    log::info!(
        "First Run: {} Last Run: {}",
        config.first_run_number,
        config.last_run_number
    );
    log::info!("Workers: {} RNG seed: {}", config.n_threads, config.rng_seed);

    let simulator = match Simulator::new(&config) {
        Ok(sim) => Arc::new(sim),
        Err(e) => {
            log::error!("Could not set up the simulation: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Spawn the workers, one progress bar each
    let (tx, rx) = mpsc::channel::<WorkerStatus>();
    let mut bars: HashMap<usize, ProgressBar> = HashMap::new();
    let mut workers = Vec::new();
    let stop = Arc::new(AtomicBool::new(false));
    for (idx, subset) in create_subsets(&config).into_iter().enumerate() {
        // Dont make empty workers
        if subset.is_empty() {
            continue;
        }
        let bar = pb_manager.add(ProgressBar::new(100));
        bar.set_style(bar_style(&BarColor::default()));
        bar.set_message(format!("worker {idx}"));
        bars.insert(idx, bar);

        let conf = config.clone();
        let sim = simulator.clone();
        let tx = tx.clone();
        let stop = stop.clone();
        workers.push(std::thread::spawn(move || {
            process_subset(conf, sim, tx, idx, subset, stop)
        }));
    }
    // Only the workers hold senders now; the loop below ends when they are all done
    drop(tx);

    for status in rx.iter() {
        if let Some(bar) = bars.get(&status.worker_id) {
            bar.set_style(bar_style(&status.color));
            bar.set_message(format!("run {}", status.run_number));
            bar.set_position((status.progress * 100.0) as u64);
        }
    }

    let mut n_failed = 0;
    for worker in workers {
        match worker.join() {
            Ok(Ok(())) => (),
            Ok(Err(e)) => {
                n_failed += 1;
                log::error!("Simulation failed with error: {e}");
            }
            Err(_) => {
                n_failed += 1;
                log::error!("Failed to join a simulation worker!");
            }
        }
    }
    for bar in bars.values() {
        bar.finish();
    }

    if n_failed == 0 {
        log::info!("Successfully simulated all runs!");
        log::info!("Done.");
        ExitCode::SUCCESS
    } else {
        log::error!("{n_failed} worker(s) failed, simulation stopped. Check {LOG_FILE} for details.");
        ExitCode::FAILURE
    }
}
