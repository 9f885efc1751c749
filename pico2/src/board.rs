//! Pin and bus mapping.
//!
//! | Function          | GPIO | Notes                        |
//! |-------------------|------|------------------------------|
//! | LCD SDA (I2C0)    | 4    | PCF8574 backpack at 0x27     |
//! | LCD SCL (I2C0)    | 5    |                              |
//! | Encoder A (DT)    | 10   | pull-up                      |
//! | Encoder B (CLK)   | 11   | pull-up                      |
//! | Mode button       | 14   | active-high, pull-down       |
//! | Buzzer            | 15   | PWM slice 7, channel B       |
//! | Ultrasonic TRIG   | 16   |                              |
//! | Ultrasonic ECHO   | 17   | 5 V sensors need a divider   |

use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, Blocking, I2c};
use embassy_rp::peripherals::{I2C0, WATCHDOG};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::{Peri, Peripherals};

/// I2C bus speed for the LCD backpack.
const LCD_I2C_HZ: u32 = 100_000;

/// Buzzer PWM period in system clock ticks (150 MHz / 60 000 = 2.5 kHz).
pub const BUZZER_TOP: u16 = 60_000;

/// Everything the firmware drives, configured.
pub struct Board {
    pub lcd_i2c: I2c<'static, I2C0, Blocking>,
    pub encoder_a: Input<'static>,
    pub encoder_b: Input<'static>,
    pub button: Input<'static>,
    pub buzzer: Pwm<'static>,
    pub trigger: Output<'static>,
    pub echo: Input<'static>,
    pub watchdog: Peri<'static, WATCHDOG>,
}

impl Board {
    pub fn new(p: Peripherals) -> Self {
        let mut i2c_config = i2c::Config::default();
        i2c_config.frequency = LCD_I2C_HZ;

        let mut pwm_config = PwmConfig::default();
        pwm_config.top = BUZZER_TOP;
        pwm_config.compare_b = 0;

        Self {
            lcd_i2c: I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config),
            encoder_a: Input::new(p.PIN_10, Pull::Up),
            encoder_b: Input::new(p.PIN_11, Pull::Up),
            button: Input::new(p.PIN_14, Pull::Down),
            buzzer: Pwm::new_output_b(p.PWM_SLICE7, p.PIN_15, pwm_config),
            trigger: Output::new(p.PIN_16, Level::Low),
            echo: Input::new(p.PIN_17, Pull::None),
            watchdog: p.WATCHDOG,
        }
    }
}
