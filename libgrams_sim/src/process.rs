use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use super::config::Config;
use super::error::ProcessorError;
use super::event_builder::EventBuilder;
use super::hit_file::HitFile;
use super::result_writer::ResultWriter;
use super::simulator::Simulator;
use super::worker_status::{BarColor, WorkerStatus};

/// Fraction of the input between two progress reports
const PROGRESS_STEP: f32 = 0.01;

/// The final event of the EventBuilder will need a manual flush.
/// Returns false if there was nothing left to flush.
fn flush_final_event(
    mut evb: EventBuilder,
    writer: &mut ResultWriter,
    simulator: &Simulator,
) -> Result<bool, ProcessorError> {
    if let Some(event) = evb.flush_final_event() {
        writer.write_event(&simulator.simulate_event(&event)?)?;
        Ok(true)
    } else {
        spdlog::warn!("Run contained no hits!");
        Ok(false)
    }
}

/// The main loop of grams_sim.
///
/// Reads the hit table of one run, simulates every event and writes the results. Progress
/// is reported through `tx` as the fraction of the hit file consumed.
pub fn process_run(
    config: &Config,
    simulator: &Simulator,
    run_number: i32,
    tx: &Sender<WorkerStatus>,
    worker_id: &usize,
) -> Result<(), ProcessorError> {
    let hit_path = config.get_hit_file_name(run_number)?;
    let output_stem = config.get_output_stem(run_number)?;
    let mut hit_file = HitFile::new(&hit_path)?;
    let mut evb = EventBuilder::new();
    let mut writer = ResultWriter::new(&output_stem, run_number)?;

    let total_data_size = hit_file.get_size_bytes();
    spdlog::info!(
        "Total run size: {}",
        human_bytes::human_bytes(total_data_size as f64)
    );
    let flush_val = (total_data_size as f64 * PROGRESS_STEP as f64) as u64;
    let mut last_report: u64 = 0;
    let mut event_counter: u64 = 0;

    tx.send(WorkerStatus::new(
        0.0,
        run_number,
        *worker_id,
        BarColor::CYAN,
    ))?;
    loop {
        if let Some(record) = hit_file.get_next_hit()? {
            let bytes_read = hit_file.get_bytes_read();
            if bytes_read - last_report > flush_val {
                last_report = bytes_read;
                tx.send(WorkerStatus::new(
                    bytes_read as f32 / total_data_size as f32,
                    run_number,
                    *worker_id,
                    BarColor::CYAN,
                ))?;
            }

            if let Some(event) = evb.append_hit(record)? {
                writer.write_event(&simulator.simulate_event(&event)?)?;
                event_counter += 1;
            }
        } else {
            // No more hits in the file
            if flush_final_event(evb, &mut writer, simulator)? {
                event_counter += 1;
            }
            break;
        }
    }
    writer.close(config, simulator.pixel_map())?;

    tx.send(WorkerStatus::new(
        1.0,
        run_number,
        *worker_id,
        BarColor::GREEN,
    ))?;
    spdlog::info!("Simulated {} events.", event_counter);
    Ok(())
}

/// The function to be called by a separate thread.
/// Builds its own Simulator and processes the whole run range of the config.
pub fn process(
    config: Config,
    tx: Sender<WorkerStatus>,
    worker_id: usize,
) -> Result<(), ProcessorError> {
    let simulator = Simulator::new(&config)?;
    let subset: Vec<i32> = (config.first_run_number..(config.last_run_number + 1)).collect();
    process_subset(
        config,
        Arc::new(simulator),
        tx,
        worker_id,
        subset,
        Arc::new(AtomicBool::new(false)),
    )
}

/// Process a subset of runs, sharing a Simulator with the other workers.
///
/// `stop` is shared by all workers. A worker that fails raises it, and every worker checks
/// it before starting a new run, so one fatal error ends the whole simulation.
pub fn process_subset(
    config: Config,
    simulator: Arc<Simulator>,
    tx: Sender<WorkerStatus>,
    worker_id: usize,
    subset: Vec<i32>,
    stop: Arc<AtomicBool>,
) -> Result<(), ProcessorError> {
    for run in subset {
        if stop.load(Ordering::Acquire) {
            spdlog::warn!(
                "Worker {} stopping before run {} after a failure elsewhere",
                worker_id,
                run
            );
            return Ok(());
        }
        if config.does_run_exist(run) {
            spdlog::info!("Processing run {}...", run);
            if let Err(e) = process_run(&config, &simulator, run, &tx, &worker_id) {
                spdlog::error!("Run {} failed: {}", run, e);
                stop.store(true, Ordering::Release);
                return Err(e);
            }
            spdlog::info!("Finished processing run {}.", run);
        } else {
            spdlog::info!("Run {} does not exist, skipping...", run);
        }
    }
    Ok(())
}

/// Divide a run range in to a set of subranges (per thread/worker)
pub fn create_subsets(config: &Config) -> Vec<Vec<i32>> {
    let mut subsets: Vec<Vec<i32>> = vec![Vec::new(); config.n_threads.max(1) as usize];
    let n_subsets = subsets.len();

    for (idx, run) in (config.first_run_number..(config.last_run_number + 1)).enumerate() {
        subsets[idx % n_subsets].push(run)
    }

    subsets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit_file::HIT_FILE_HEADER;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::mpsc;

    fn make_dirs(name: &str) -> (PathBuf, PathBuf) {
        let base = std::env::temp_dir().join(format!("grams_sim_{}_{}", name, std::process::id()));
        let hit_dir = base.join("hits");
        let out_dir = base.join("output");
        std::fs::create_dir_all(&hit_dir).unwrap();
        std::fs::create_dir_all(&out_dir).unwrap();
        (hit_dir, out_dir)
    }

    fn make_config(hit_dir: PathBuf, out_dir: PathBuf) -> Config {
        let mut config = Config {
            hit_path: hit_dir,
            output_path: out_dir,
            first_run_number: 1,
            last_run_number: 2,
            rng_seed: 42,
            ..Default::default()
        };
        // Keep the waveforms short
        config.elecsim.time_window = 2000.0;
        config.detsim.pixel_plane_offset = 10.0;
        config
    }

    #[test]
    fn test_create_subsets() {
        let config = Config {
            first_run_number: 3,
            last_run_number: 9,
            n_threads: 3,
            ..Default::default()
        };
        let subsets = create_subsets(&config);
        assert_eq!(subsets, vec![vec![3, 6, 9], vec![4, 7], vec![5, 8]]);
    }

    #[test]
    fn test_process_runs() {
        let (hit_dir, out_dir) = make_dirs("process");
        let mut file = std::fs::File::create(hit_dir.join("run_0001.csv")).unwrap();
        writeln!(file, "{HIT_FILE_HEADER}").unwrap();
        writeln!(file, "1,0,1,0,13,0.01,0,0,-1,0,0,0,1,0").unwrap();
        writeln!(file, "1,0,1,1,13,0.01,0,0,1,0,0,0,3,0").unwrap();
        writeln!(file, "1,1,1,0,13,0.02,5,5,-1,0,5,5,1,0").unwrap();
        drop(file);

        let config = make_config(hit_dir.clone(), out_dir.clone());
        let (tx, rx) = mpsc::channel::<WorkerStatus>();
        // Run 2 does not exist and is skipped
        process(config, tx, 0).unwrap();

        let statuses: Vec<WorkerStatus> = rx.iter().collect();
        assert!(statuses.iter().all(|s| s.run_number == 1));
        let last = statuses.last().unwrap();
        assert_eq!(last.progress, 1.0);
        assert_eq!(last.color, BarColor::GREEN);

        let header = std::fs::read_to_string(out_dir.join("run_0001.yml")).unwrap();
        assert!(header.contains("n_events: 2"));
        assert!(out_dir.join("run_0001_waveforms.csv").exists());
        assert!(!out_dir.join("run_0002.yml").exists());

        std::fs::remove_dir_all(hit_dir.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_failure_stops_workers() {
        let (hit_dir, out_dir) = make_dirs("stop");
        // Run 1 is malformed, run 2 is fine
        let mut file = std::fs::File::create(hit_dir.join("run_0001.csv")).unwrap();
        writeln!(file, "{HIT_FILE_HEADER}").unwrap();
        writeln!(file, "1,0,1,0,13,0.01").unwrap();
        drop(file);
        let mut file = std::fs::File::create(hit_dir.join("run_0002.csv")).unwrap();
        writeln!(file, "{HIT_FILE_HEADER}").unwrap();
        writeln!(file, "2,0,1,0,13,0.01,0,0,-1,0,0,0,1,0").unwrap();
        drop(file);

        let config = make_config(hit_dir.clone(), out_dir.clone());
        let simulator = Arc::new(Simulator::new(&config).unwrap());
        let stop = Arc::new(AtomicBool::new(false));

        let (tx, _rx) = mpsc::channel::<WorkerStatus>();
        let result = process_subset(
            config.clone(),
            simulator.clone(),
            tx.clone(),
            0,
            vec![1],
            stop.clone(),
        );
        assert!(matches!(result, Err(ProcessorError::HitFileError(_))));
        assert!(stop.load(Ordering::Acquire));

        // Another worker sees the flag and does not start its run
        process_subset(config, simulator, tx, 1, vec![2], stop).unwrap();
        assert!(!out_dir.join("run_0002.yml").exists());

        std::fs::remove_dir_all(hit_dir.parent().unwrap()).unwrap();
    }
}
