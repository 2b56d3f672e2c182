//! HD44780 instruction set

/// Clear display, cursor to address 0
pub const CLEAR: u8 = 0x01;
/// Cursor to address 0, undo display shift
pub const HOME: u8 = 0x02;

/// Entry mode set
pub const ENTRY_MODE: u8 = 0x04;
/// Entry mode: increment address after each write
pub const ENTRY_INCREMENT: u8 = 0x02;
/// Entry mode: shift the display with each write
pub const ENTRY_SHIFT: u8 = 0x01;

/// Display on/off control (flag bits live in [`ControlRegister`](super::ControlRegister))
pub const DISPLAY_CONTROL: u8 = 0x08;
/// Display control: display on
pub const CONTROL_DISPLAY_ON: u8 = 0x04;
/// Display control: underline cursor on
pub const CONTROL_CURSOR_ON: u8 = 0x02;
/// Display control: blinking block on
pub const CONTROL_BLINK_ON: u8 = 0x01;

/// Cursor or display shift
pub const SHIFT: u8 = 0x10;
/// Shift: move the display instead of the cursor
pub const SHIFT_DISPLAY: u8 = 0x08;
/// Shift: to the right
pub const SHIFT_RIGHT: u8 = 0x04;

/// Cursor one position left
pub const CURSOR_LEFT: u8 = SHIFT;
/// Cursor one position right
pub const CURSOR_RIGHT: u8 = SHIFT | SHIFT_RIGHT;
/// Display one column left
pub const DISPLAY_LEFT: u8 = SHIFT | SHIFT_DISPLAY;
/// Display one column right
pub const DISPLAY_RIGHT: u8 = SHIFT | SHIFT_DISPLAY | SHIFT_RIGHT;

/// Function set
pub const FUNCTION_SET: u8 = 0x20;
/// Function set: 8-bit interface (only used by the reset sequence)
pub const FUNCTION_8BIT: u8 = 0x10;
/// Function set: two-line display
pub const FUNCTION_2LINE: u8 = 0x08;
/// Function set: 5x10 dot font
pub const FUNCTION_5X10: u8 = 0x04;

/// Set DDRAM address
pub const SET_DDRAM_ADDR: u8 = 0x80;
/// Set DDRAM address: address bits
pub const DDRAM_ADDR_MASK: u8 = 0x7F;

/// Status word: busy flag
pub const STATUS_BUSY: u8 = 0x80;
/// Status word: address counter
pub const STATUS_ADDRESS: u8 = 0x7F;
