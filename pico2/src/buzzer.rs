//! PWM buzzer: on is a square wave at half duty, off is a silent output.

use defmt::warn;
use embassy_rp::pwm::{Pwm, SetDutyCycle};
use proximity_common::Buzzer;

/// Duty cycle while sounding.
const ON_DUTY_PERCENT: u8 = 50;

pub struct PwmBuzzer {
    pwm: Pwm<'static>,
}

impl PwmBuzzer {
    pub fn new(pwm: Pwm<'static>) -> Self {
        let mut buzzer = Self { pwm };
        buzzer.deactivate();
        buzzer
    }
}

impl Buzzer for PwmBuzzer {
    fn activate(&mut self) {
        if self.pwm.set_duty_cycle_percent(ON_DUTY_PERCENT).is_err() {
            warn!("buzzer duty rejected");
        }
    }

    fn deactivate(&mut self) {
        if self.pwm.set_duty_cycle_fully_off().is_err() {
            warn!("buzzer duty rejected");
        }
    }
}
