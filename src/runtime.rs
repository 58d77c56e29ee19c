// Fixed-rate tick driver for the motion controller
// Drains commands, runs one control tick against the simulated base, and
// publishes telemetry and health at a lower rate.

use tokio::time::interval;
use tracing::{debug, info, warn};

// local imports
use crate::config::{tick_period, TOPIC_CMD_MOTION, TOPIC_HEALTH, TOPIC_TELEMETRY};
use crate::control::MotionControl;
use crate::hal::{MotionSensors, MotorDriver, Tuning, WallSensors};
use crate::messages::{ControlHealth, MotionCommand, MotionTelemetry};
use crate::motor::SaturatingDriver;
use crate::sim::SimulatedRobot;
use crate::tuning::{StaticTuning, TuningError};

/// Error types for the runtime
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Zenoh error: {0}")]
    Zenoh(zenoh::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tuning error: {0}")]
    Tuning(#[from] TuningError),

    #[error("Invalid tick frequency {0} Hz (must be positive and finite)")]
    InvalidFrequency(f32),
}

impl From<zenoh::Error> for RuntimeError {
    fn from(e: zenoh::Error) -> Self {
        RuntimeError::Zenoh(e)
    }
}

/// Runtime settings, usually filled from the command line
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    pub frequency_hz: f32,
    pub telemetry_divider: u32,
    pub tuning: StaticTuning,
}

impl RuntimeOptions {
    /// Reject settings the tick loop cannot run with
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if !(self.frequency_hz.is_finite() && self.frequency_hz > 0.0)
            || tick_period(self.frequency_hz).is_zero()
        {
            return Err(RuntimeError::InvalidFrequency(self.frequency_hz));
        }
        Ok(())
    }
}

pub struct Runtime<D, S, W, T> {
    control: MotionControl<D, S, W, T>,
    telemetry_divider: u32,
    ticks: u64,
}

impl<D, S, W, T> Runtime<D, S, W, T>
where
    D: MotorDriver,
    S: MotionSensors,
    W: WallSensors,
    T: Tuning,
{
    pub fn new(control: MotionControl<D, S, W, T>, telemetry_divider: u32) -> Self {
        Self {
            control,
            telemetry_divider: telemetry_divider.max(1),
            ticks: 0,
        }
    }

    pub fn control(&self) -> &MotionControl<D, S, W, T> {
        &self.control
    }

    /// Apply an incoming command
    pub fn on_command(&mut self, cmd: MotionCommand) {
        debug!("Received command: {:?}", &cmd);
        let state = self.control.handle();
        match cmd {
            MotionCommand::SetTargetLinearSpeed { speed } => state.set_target_linear_speed(speed),
            MotionCommand::SetIdealAngularSpeed { speed } => state.set_ideal_angular_speed(speed),
            MotionCommand::EnableMotorControl => {
                if state.enable_motor_control() {
                    info!("Motor control enabled");
                }
            }
            MotionCommand::DisableMotorControl => {
                info!("Motor control disabled");
                state.disable_motor_control();
            }
            MotionCommand::SideSensorsCloseControl { enabled } => {
                state.side_sensors_close_control(enabled)
            }
            MotionCommand::SideSensorsFarControl { enabled } => state.side_sensors_far_control(enabled),
            MotionCommand::FrontSensorsControl { enabled } => state.front_sensors_control(enabled),
            MotionCommand::DiagonalSensorsControl { enabled } => {
                state.diagonal_sensors_control(enabled)
            }
            MotionCommand::DisableWallsControl => state.disable_walls_control(),
            MotionCommand::ResetControlErrors => state.reset_control_errors(),
            MotionCommand::ResetControlSpeed => state.reset_control_speed(),
            MotionCommand::ResetCollisionDetection => self.control.reset_collision_detection(),
            MotionCommand::ResetControlAll => self.control.reset_control_all(),
            MotionCommand::ResetMotion => self.control.reset_motion(),
        }
    }

    /// Run one control tick; returns true when telemetry is due
    pub fn tick(&mut self) -> bool {
        self.control.motor_control();
        self.ticks += 1;
        self.ticks % self.telemetry_divider as u64 == 0
    }

    pub fn telemetry(&self) -> MotionTelemetry {
        MotionTelemetry::capture(
            self.control.state(),
            self.control.measured_linear_speed(),
            self.control.measured_angular_speed(),
        )
    }

    pub fn health(&self) -> ControlHealth {
        ControlHealth::from(self.control.state())
    }

    /// Return to idle before shutting down
    pub fn shutdown(&mut self) {
        self.control.reset_motion();
    }
}

type SimulatedControl =
    MotionControl<SaturatingDriver<SimulatedRobot, SimulatedRobot>, SimulatedRobot, SimulatedRobot, StaticTuning>;

fn simulated_control(robot: &SimulatedRobot, options: &RuntimeOptions) -> SimulatedControl {
    let driver = SaturatingDriver::new(robot.clone(), robot.clone());
    MotionControl::with_frequency(
        driver,
        robot.clone(),
        robot.clone(),
        options.tuning,
        options.frequency_hz,
    )
}

pub async fn run(options: RuntimeOptions) -> Result<(), RuntimeError> {
    options.validate()?;

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Setting up publishers and subscribers...");
    let subscriber = session.declare_subscriber(TOPIC_CMD_MOTION).await?;
    let pub_telemetry = session.declare_publisher(TOPIC_TELEMETRY).await?;
    let pub_health = session.declare_publisher(TOPIC_HEALTH).await?;

    let robot = SimulatedRobot::default();
    let mut runtime = Runtime::new(simulated_control(&robot, &options), options.telemetry_divider);
    let dt = 1.0 / options.frequency_hz;
    let mut tick = interval(tick_period(options.frequency_hz));

    info!(
        "Runtime started: {}Hz control tick, telemetry every {} ticks",
        options.frequency_hz, options.telemetry_divider
    );
    info!("Subscribed to: {}", TOPIC_CMD_MOTION);
    info!("Publishing to: {}, {}", TOPIC_TELEMETRY, TOPIC_HEALTH);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = tick.tick() => {}
            _ = &mut shutdown => {
                info!("Shutdown requested, returning to idle");
                runtime.shutdown();
                return Ok(());
            }
        }

        // 1. Drain all pending commands (non-blocking)
        while let Ok(Some(sample)) = subscriber.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<MotionCommand>(&payload) {
                Ok(cmd) => runtime.on_command(cmd),
                Err(e) => warn!("Failed to parse command: {}", e),
            }
        }

        // 2. Advance the plant and run the control tick
        robot.step(dt);
        if !runtime.tick() {
            continue;
        }

        // 3. Publish telemetry and health
        let telemetry_json = serde_json::to_string(&runtime.telemetry())?;
        pub_telemetry.put(telemetry_json).await?;

        let health_json = serde_json::to_string(&runtime.health())?;
        pub_health.put(health_json).await?;
    }
}
