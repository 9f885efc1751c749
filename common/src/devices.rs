//! Output devices driven by the control loop.

/// Character display (HD44780-style): opaque device, called from the main
/// loop only.
pub trait CharDisplay {
    type Error: core::fmt::Debug;

    fn init(&mut self) -> Result<(), Self::Error>;

    /// Blank the whole display and home the cursor.
    fn clear(&mut self) -> Result<(), Self::Error>;

    fn set_cursor(
        &mut self,
        col: u8,
        row: u8,
    ) -> Result<(), Self::Error>;

    /// Write `text` at the cursor, advancing it.
    fn print(
        &mut self,
        text: &str,
    ) -> Result<(), Self::Error>;

    fn set_backlight(
        &mut self,
        on: bool,
    ) -> Result<(), Self::Error>;
}

/// On/off alarm sounder.
pub trait Buzzer {
    fn activate(&mut self);

    fn deactivate(&mut self);
}
