//! Proportional-integral-derivative control over raw sensor readings
//!
//! A simple, non-scheduled consumer of readings: [`PidLoop`] runs its own
//! fixed-period thread, separate from [`crate::scheduler::SensorScheduler`],
//! reading each bound sensor's raw value and feeding the control output to a
//! per-sensor callback. Absent samples are skipped; the controller state is
//! not advanced for them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::sensor::Sensor;
use crate::time::Timestamp;

/// Standard PID controller with a fixed set point.
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,
    set_point: f64,
    integral: f64,
    previous_error: f64,
}

impl PidController {
    /// Create a controller from gain terms and a target value.
    pub fn new(kp: f64, ki: f64, kd: f64, set_point: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            set_point,
            integral: 0.0,
            previous_error: 0.0,
        }
    }

    /// The target value the controller drives toward.
    pub fn set_point(&self) -> f64 {
        self.set_point
    }

    /// Advance the controller by one sample taken `dt_s` seconds after the
    /// previous one, returning the control output.
    pub fn compute(&mut self, current: f64, dt_s: f64) -> f64 {
        let error = self.set_point - current;
        self.integral += error * dt_s;
        let derivative = if dt_s > 0.0 {
            (error - self.previous_error) / dt_s
        } else {
            0.0
        };
        self.previous_error = error;
        self.kp * error + self.ki * self.integral + self.kd * derivative
    }

    /// Clear accumulated state, keeping gains and set point.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = 0.0;
    }
}

struct PidChannel {
    sensor: Sensor,
    controller: PidController,
    on_output: Box<dyn FnMut(f64) + Send>,
}

/// Fixed-period control loop over a list of sensors.
pub struct PidLoop {
    channels: Vec<PidChannel>,
    period_ms: Timestamp,
}

impl PidLoop {
    /// Create a loop ticking every `period_ms` milliseconds.
    pub fn new(period_ms: Timestamp) -> Self {
        Self {
            channels: Vec::new(),
            period_ms,
        }
    }

    /// Bind a sensor to a controller and an output callback.
    pub fn add_channel(
        &mut self,
        sensor: Sensor,
        controller: PidController,
        on_output: impl FnMut(f64) + Send + 'static,
    ) {
        self.channels.push(PidChannel {
            sensor,
            controller,
            on_output: Box::new(on_output),
        });
    }

    /// Spawn the control thread. Stop latency is one period.
    pub fn start(self) -> PidHandle {
        let running = Arc::new(AtomicBool::new(true));
        let loop_running = Arc::clone(&running);
        let period = Duration::from_millis(self.period_ms);
        let dt_s = self.period_ms as f64 / 1000.0;
        let mut channels = self.channels;

        let thread = thread::Builder::new()
            .name("multilog-pid".into())
            .spawn(move || {
                let mut next_deadline = Instant::now() + period;
                while loop_running.load(Ordering::Acquire) {
                    let now = Instant::now();
                    if now < next_deadline {
                        thread::sleep(next_deadline - now);
                    }
                    next_deadline += period;

                    for channel in channels.iter_mut() {
                        if let Some(current) = channel.sensor.reading() {
                            let output = channel.controller.compute(current, dt_s);
                            (channel.on_output)(output);
                        }
                    }
                }
                log::debug!("pid loop stopped");
            })
            .ok();
        if thread.is_none() {
            log::warn!("failed to spawn pid thread");
        }

        PidHandle { running, thread }
    }
}

/// Control surface for a running [`PidLoop`].
pub struct PidHandle {
    running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl PidHandle {
    /// Request the loop stop at its next tick.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Stop and wait for the control thread to exit.
    pub fn join(mut self) {
        self.stop();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("pid thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportional_only_response() {
        let mut pid = PidController::new(2.0, 0.0, 0.0, 10.0);
        // error = 10 - 4 = 6, output = kp * error
        assert_eq!(pid.compute(4.0, 1.0), 12.0);
    }

    #[test]
    fn integral_accumulates_across_ticks() {
        let mut pid = PidController::new(0.0, 1.0, 0.0, 1.0);
        assert_eq!(pid.compute(0.0, 1.0), 1.0);
        assert_eq!(pid.compute(0.0, 1.0), 2.0);
        pid.reset();
        assert_eq!(pid.compute(0.0, 1.0), 1.0);
    }

    #[test]
    fn derivative_tracks_error_change() {
        let mut pid = PidController::new(0.0, 0.0, 1.0, 0.0);
        // first tick: error goes 0 -> -5 over 1s
        assert_eq!(pid.compute(5.0, 1.0), -5.0);
        // steady error: derivative term vanishes
        assert_eq!(pid.compute(5.0, 1.0), 0.0);
    }

    #[test]
    fn loop_drives_output_callbacks() {
        use std::sync::Mutex;

        let sensor = Sensor::builder("temp", || Some(20.0))
            .calibration(0.0, 100.0)
            .build()
            .unwrap();
        let outputs = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&outputs);

        let mut pid_loop = PidLoop::new(10);
        pid_loop.add_channel(
            sensor,
            PidController::new(1.0, 0.0, 0.0, 25.0),
            move |output| {
                if let Ok(mut outputs) = sink.lock() {
                    outputs.push(output);
                }
            },
        );
        let handle = pid_loop.start();
        thread::sleep(Duration::from_millis(60));
        handle.join();

        let outputs = outputs.lock().unwrap();
        assert!(!outputs.is_empty());
        // constant reading 20 against set point 25, kp = 1
        assert!(outputs.iter().all(|&o| o == 5.0));
    }
}
