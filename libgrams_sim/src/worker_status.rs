/// Color hint for a worker's progress bar: simulating or finished with a run
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BarColor {
    #[default]
    CYAN,
    GREEN,
}

impl BarColor {
    /// Name understood by indicatif style templates
    pub fn as_str(&self) -> &'static str {
        match self {
            BarColor::CYAN => "cyan",
            BarColor::GREEN => "green",
        }
    }
}

/// Progress message sent from a worker thread to whoever is watching (typically the CLI)
#[derive(Debug, Clone, Default)]
pub struct WorkerStatus {
    pub progress: f32,
    pub run_number: i32,
    pub worker_id: usize,
    pub color: BarColor,
}

impl WorkerStatus {
    pub fn new(progress: f32, run_number: i32, worker_id: usize, color: BarColor) -> Self {
        Self {
            progress,
            run_number,
            worker_id,
            color,
        }
    }
}
