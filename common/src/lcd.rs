//! Character LCD model and field formatting.
//!
//! `TextLcd` is an in-memory 16x2 character display implementing
//! `CharDisplay`. The simulator draws it and the tests inspect it.

use core::convert::Infallible;

use heapless::String;

use crate::config::{LCD_COLS, LCD_ROWS};
use crate::devices::CharDisplay;

/// Longest field printed on the value line.
pub const FIELD_CAPACITY: usize = 8;

/// Left-aligned text field blank-padded to `width`.
pub type Field = String<FIELD_CAPACITY>;

/// Append the decimal digits of `val` (no format machinery).
pub fn push_u32<const N: usize>(
    s: &mut String<N>,
    mut val: u32,
) {
    if val == 0 {
        s.push('0').ok();
        return;
    }

    // Build digits in reverse
    let mut digits = [0u8; 10];
    let mut i = 0;
    while val > 0 {
        digits[i] = (val % 10) as u8;
        val /= 10;
        i += 1;
    }

    while i > 0 {
        i -= 1;
        s.push((b'0' + digits[i]) as char).ok();
    }
}

/// `text` followed by blanks up to `width`, so shorter values erase the stale
/// digits of a longer previous one.
pub fn text_field(
    text: &str,
    width: u8,
) -> Field {
    let mut field = Field::new();
    for c in text.chars() {
        if field.push(c).is_err() {
            break;
        }
    }
    while field.len() < usize::from(width) && field.push(' ').is_ok() {}
    field
}

/// Decimal `value` blank-padded to `width`.
pub fn number_field(
    value: u32,
    width: u8,
) -> Field {
    let mut digits = Field::new();
    push_u32(&mut digits, value);
    text_field(&digits, width)
}

const COLS: usize = LCD_COLS as usize;
const ROWS: usize = LCD_ROWS as usize;

/// In-memory character display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextLcd {
    cells: [[u8; COLS]; ROWS],
    col: usize,
    row: usize,
    backlight: bool,
    initialized: bool,
    clears: u32,
    prints: u32,
}

impl TextLcd {
    pub const fn new() -> Self {
        Self {
            cells: [[b' '; COLS]; ROWS],
            col: 0,
            row: 0,
            backlight: false,
            initialized: false,
            clears: 0,
            prints: 0,
        }
    }

    /// Contents of `row`, including trailing blanks.
    pub fn line(
        &self,
        row: usize,
    ) -> &str {
        self.cells
            .get(row)
            .and_then(|cells| core::str::from_utf8(cells).ok())
            .unwrap_or("")
    }

    #[inline]
    pub const fn backlight(&self) -> bool { self.backlight }

    #[inline]
    pub const fn is_initialized(&self) -> bool { self.initialized }

    /// Number of `clear` calls so far.
    #[inline]
    pub const fn clears(&self) -> u32 { self.clears }

    /// Number of `print` calls so far.
    #[inline]
    pub const fn prints(&self) -> u32 { self.prints }

    #[inline]
    pub const fn cursor(&self) -> (usize, usize) { (self.col, self.row) }
}

impl Default for TextLcd {
    fn default() -> Self { Self::new() }
}

impl CharDisplay for TextLcd {
    type Error = Infallible;

    fn init(&mut self) -> Result<(), Self::Error> {
        *self = Self::new();
        self.initialized = true;
        self.backlight = true;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.cells = [[b' '; COLS]; ROWS];
        self.col = 0;
        self.row = 0;
        self.clears += 1;
        Ok(())
    }

    fn set_cursor(
        &mut self,
        col: u8,
        row: u8,
    ) -> Result<(), Self::Error> {
        self.col = usize::from(col);
        self.row = usize::from(row).min(ROWS - 1);
        Ok(())
    }

    fn print(
        &mut self,
        text: &str,
    ) -> Result<(), Self::Error> {
        self.prints += 1;
        for c in text.chars() {
            // Writes past the last column are lost, as on the real controller
            if self.col < COLS {
                self.cells[self.row][self.col] = if c.is_ascii() { c as u8 } else { b'?' };
            }
            self.col += 1;
        }
        Ok(())
    }

    fn set_backlight(
        &mut self,
        on: bool,
    ) -> Result<(), Self::Error> {
        self.backlight = on;
        Ok(())
    }
}
