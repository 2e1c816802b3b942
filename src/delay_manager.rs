use std::time::Duration;
use std::thread;
use rand::Rng;
use log::info;

/// Pause source applied between page fetches. The pagination loop takes
/// this as a seam so tests can record pauses instead of sleeping.
pub trait Delay {
    fn pause(&mut self);
}

/// Blocking pause drawn uniformly from fixed bounds.
pub struct RandomDelay {
    min_secs: f64,
    max_secs: f64,
}

impl RandomDelay {
    pub fn new(bounds: (f64, f64)) -> Self {
        RandomDelay {
            min_secs: bounds.0,
            max_secs: bounds.1,
        }
    }

    pub fn sample(&self) -> Duration {
        let mut rng = rand::thread_rng();
        Duration::from_secs_f64(rng.gen_range(self.min_secs..=self.max_secs))
    }
}

impl Delay for RandomDelay {
    fn pause(&mut self) {
        let delay = self.sample();
        info!("Waiting for {:.2} seconds (Page Delay)...", delay.as_secs_f64());
        thread::sleep(delay);
    }
}

/// Wider pause between batch queries.
pub fn random_query_delay() {
    let mut rng = rand::thread_rng();
    let delay_secs = rng.gen_range(5.0..=12.0);
    info!("Waiting for {:.2} seconds (Query Delay)...", delay_secs);
    thread::sleep(Duration::from_secs_f64(delay_secs));
}
