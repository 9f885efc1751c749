//! LCD1602 (HD44780) behind a PCF8574 I2C backpack.
//!
//! The expander drives the controller in 4-bit mode: every byte goes out as
//! two nibbles on P4-P7, each latched by a pulse on EN (P2).
//!
//! ```text
//! P7 P6 P5 P4 | P3 P2 P1 P0
//! D7 D6 D5 D4 | BL EN RW RS
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use proximity_common::CharDisplay;
use proximity_common::config::LCD_ROWS;

/// 7-bit address of a PCF8574 backpack with A0-A2 pulled high.
pub const DEFAULT_ADDRESS: u8 = 0x27;

// =============================================================================
// Expander bits
// =============================================================================

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

// =============================================================================
// HD44780 commands
// =============================================================================

const CLEAR_DISPLAY: u8 = 0x01;
const RETURN_HOME: u8 = 0x02;
const ENTRY_MODE_SET: u8 = 0x04;
const DISPLAY_CONTROL: u8 = 0x08;
const FUNCTION_SET: u8 = 0x20;
const SET_DDRAM_ADDR: u8 = 0x80;

const ENTRY_LEFT: u8 = 0x02;
const DISPLAY_ON: u8 = 0x04;
const TWO_LINE: u8 = 0x08;

/// DDRAM address of the first column of each row.
const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// Clear and home are slow.
const SLOW_COMMAND_US: u32 = 2_000;

pub struct Lcd1602<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    rows: u8,
    backlight: u8,
}

impl<I: I2c, D: DelayNs> Lcd1602<I, D> {
    pub fn new(
        i2c: I,
        delay: D,
        address: u8,
    ) -> Self {
        Self {
            i2c,
            delay,
            address,
            rows: LCD_ROWS,
            backlight: BACKLIGHT,
        }
    }

    pub fn release(self) -> (I, D) { (self.i2c, self.delay) }

    fn expander_write(
        &mut self,
        bits: u8,
    ) -> Result<(), I::Error> {
        self.i2c.write(self.address, &[bits | self.backlight])
    }

    /// Present `bits` and latch them on the falling edge of EN.
    fn write4bits(
        &mut self,
        bits: u8,
    ) -> Result<(), I::Error> {
        self.expander_write(bits)?;
        self.expander_write(bits | EN)?;
        self.delay.delay_us(1);
        self.expander_write(bits & !EN)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn send(
        &mut self,
        value: u8,
        mode: u8,
    ) -> Result<(), I::Error> {
        self.write4bits((value & 0xF0) | mode)?;
        self.write4bits((value << 4) | mode)
    }

    fn command(
        &mut self,
        value: u8,
    ) -> Result<(), I::Error> {
        self.send(value, 0)
    }
}

impl<I: I2c, D: DelayNs> CharDisplay for Lcd1602<I, D> {
    type Error = I::Error;

    /// Power-on sequence from the HD44780 datasheet (4-bit interface).
    fn init(&mut self) -> Result<(), Self::Error> {
        self.delay.delay_ms(50);
        self.expander_write(0)?;

        // Three tries at 8-bit mode force a known state, then switch to 4-bit
        self.write4bits(0x30)?;
        self.delay.delay_us(4_500);
        self.write4bits(0x30)?;
        self.delay.delay_us(4_500);
        self.write4bits(0x30)?;
        self.delay.delay_us(150);
        self.write4bits(0x20)?;

        let lines = if self.rows > 1 { TWO_LINE } else { 0 };
        self.command(FUNCTION_SET | lines)?;
        self.command(DISPLAY_CONTROL | DISPLAY_ON)?;
        self.clear()?;
        self.command(ENTRY_MODE_SET | ENTRY_LEFT)?;
        self.command(RETURN_HOME)?;
        self.delay.delay_us(SLOW_COMMAND_US);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.command(CLEAR_DISPLAY)?;
        self.delay.delay_us(SLOW_COMMAND_US);
        Ok(())
    }

    fn set_cursor(
        &mut self,
        col: u8,
        row: u8,
    ) -> Result<(), Self::Error> {
        let row = usize::from(row.min(self.rows - 1));
        self.command(SET_DDRAM_ADDR | col.wrapping_add(ROW_OFFSETS[row]))
    }

    fn print(
        &mut self,
        text: &str,
    ) -> Result<(), Self::Error> {
        for c in text.chars() {
            let byte = if c.is_ascii() { c as u8 } else { b'?' };
            self.send(byte, RS)?;
        }
        Ok(())
    }

    fn set_backlight(
        &mut self,
        on: bool,
    ) -> Result<(), Self::Error> {
        self.backlight = if on { BACKLIGHT } else { 0 };
        self.expander_write(0)
    }
}
