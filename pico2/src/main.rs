//! Ultrasonic proximity alarm firmware for Raspberry Pi Pico 2 (RP2350)
//!
//! Sounds a buzzer and shows a warning on a 16x2 LCD when an object comes
//! closer than a threshold. The threshold is set with a rotary encoder after
//! the mode button switches to the adjust menu.
//!
//! # Architecture
//!
//! - Main task: the Menu/Alarm control loop (`AlarmController`)
//! - Button task: debounced edges posted to the dispatch queue
//! - Dispatch task: runs the mode toggle handler outside the edge path
//! - Encoder task: quadrature decoding into a shared pulse count
//! - Watchdog task: feeds the hardware watchdog while the loop keeps kicking

#![no_std]
#![no_main]

mod board;
mod buzzer;
mod clock;
mod tasks;

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_rp::watchdog::{ResetReason, Watchdog};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Delay;
use proximity_common::config::{ControllerConfig, WatchdogPolicy};
use proximity_common::{
    AlarmController,
    DeadlineWatchdog,
    DispatchQueue,
    Peripherals,
    SharedControl,
    SharedDeadline,
    Ultrasonic,
};
use proximity_pico2::lcd1602::{DEFAULT_ADDRESS, Lcd1602};
use {defmt_rtt as _, panic_probe as _};

use crate::board::Board;
use crate::buzzer::PwmBuzzer;
use crate::clock::EmbassyClock;
use crate::tasks::{EncoderCount, button_task, dispatch_task, encoder_task, watchdog_task};

// Program metadata for `picotool info`.
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"pico2-proximity-alarm"),
    embassy_rp::binary_info::rp_program_description!(c"Ultrasonic proximity alarm with LCD1602 and rotary encoder"),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

/// Mode and display-dirty flag, shared by the control loop and the worker.
static CONTROL: SharedControl<CriticalSectionRawMutex> = SharedControl::new();

/// Requests posted by the button task, drained by the worker.
static DISPATCH_QUEUE: DispatchQueue<CriticalSectionRawMutex> = DispatchQueue::new();

/// Software deadline kicked by the control loop, watched by the supervisor.
static DEADLINE: SharedDeadline<CriticalSectionRawMutex> = SharedDeadline::new();

const fn controller_config() -> ControllerConfig {
    if cfg!(feature = "reference-watchdog") {
        ControllerConfig::new().with_policy(WatchdogPolicy::MonitorOnly)
    } else {
        ControllerConfig::new()
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("------Start------");

    let p = embassy_rp::init(Default::default());
    let board = Board::new(p);

    let watchdog = Watchdog::new(board.watchdog);
    match watchdog.reset_reason() {
        Some(ResetReason::TimedOut) => warn!("Previous reset: watchdog timeout"),
        Some(_) => warn!("Previous reset: forced by watchdog"),
        None => info!("Previous reset: power-on"),
    }

    spawner.spawn(watchdog_task(watchdog, &DEADLINE)).unwrap();
    spawner.spawn(dispatch_task(&DISPATCH_QUEUE, &CONTROL)).unwrap();
    spawner.spawn(button_task(board.button, &DISPATCH_QUEUE)).unwrap();
    spawner.spawn(encoder_task(board.encoder_a, board.encoder_b)).unwrap();
    info!("Tasks spawned");

    let mut sensor = Ultrasonic::new(board.trigger, board.echo, EmbassyClock, Delay);
    if sensor.idle().is_err() {
        warn!("Trigger pin not driven low");
    }

    let io = Peripherals {
        display: Lcd1602::new(board.lcd_i2c, Delay, DEFAULT_ADDRESS),
        buzzer: PwmBuzzer::new(board.buzzer),
        watchdog: DeadlineWatchdog::new(&DEADLINE, EmbassyClock),
        sensor,
        encoder: EncoderCount,
    };
    let config = controller_config();
    info!("Controller config: {}", config);

    let mut controller = AlarmController::new(&CONTROL, io, config);
    // Without a display the buzzer still works: keep going on LCD errors
    if controller.start().is_err() {
        warn!("LCD init failed");
    }

    info!("Main loop starting");
    controller.run(&mut Delay).await
}
