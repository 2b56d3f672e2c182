//! HD44780 display controller
//!
//! Owns the transport, the transfer queue, the busy poller and the shadow
//! control register. Public operations only encode and enqueue; delivery
//! happens in [`DisplayController::drain_one`], which the caller invokes
//! from its own loop, or in [`DisplayController::flush`].
//!
//! # States
//!
//! ```text
//!  new() ──► Uninitialized ──power-on ok──► Ready ◄──clear_error()──┐
//!                  │                          │                      │
//!                  └──failure: new() errs     └──Freeze/Transport──► Errored
//! ```
//!
//! `Uninitialized` is only ever seen while the power-on sequence runs.

use embedded_hal::delay::DelayNs;
use nibble_hal::{pins, Transport};

use crate::config::{DisplayConfig, Geometry};
use crate::error::{ConfigError, DisplayError, ErrorState};
use crate::pipeline::{Transfer, TransferQueue};
use crate::poller::{BusyPoller, DisplayState};
use crate::protocol::{commands, ControlRegister, FrameEncoder, Register};

/// Queue storage used when none is specified
pub const DEFAULT_QUEUE_DEPTH: usize = 16;

/// Settling time after power-up before the first instruction
const POWER_ON_DELAY_MS: u32 = 50;

/// 8-bit function set nibble used by the reset-by-instruction sequence
const RESET_NIBBLE: u8 = commands::FUNCTION_SET | commands::FUNCTION_8BIT;

/// Function set nibble that switches the interface to 4 bits
const FOUR_BIT_NIBBLE: u8 = commands::FUNCTION_SET;

/// Waits after the first two reset nibbles, in microseconds
const RESET_DELAYS_US: [u32; 2] = [4_100, 100];

/// Controller lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerState {
    /// Power-on sequence in progress
    Uninitialized,
    /// Accepting operations
    Ready,
    /// A fatal error is latched; see [`DisplayController::error`]
    Errored,
}

/// HD44780 controller behind a port expander
///
/// `Q` is the queue storage; the configured capacity may be smaller.
pub struct DisplayController<T, D, const Q: usize = DEFAULT_QUEUE_DEPTH> {
    transport: T,
    delay: D,
    config: DisplayConfig,
    control: ControlRegister,
    queue: TransferQueue<Q>,
    poller: BusyPoller,
    errors: ErrorState,
    /// Failure that moved the controller to `Errored`
    fatal: Option<DisplayError>,
    state: ControllerState,
    display: DisplayState,
}

impl<T: Transport, D: DelayNs, const Q: usize> DisplayController<T, D, Q> {
    /// Create a controller and run the power-on sequence
    ///
    /// A missing transport fails with [`DisplayError::Init`] before anything
    /// touches the bus. A configuration that does not validate, or a
    /// queue capacity above `Q`, fails with [`DisplayError::Config`]. Errors
    /// during the power-on sequence are returned as-is.
    pub fn new(transport: Option<T>, delay: D, config: DisplayConfig) -> Result<Self, DisplayError> {
        let Some(transport) = transport else {
            #[cfg(feature = "defmt")]
            defmt::error!("HD44780 constructed without a transport");
            return Err(DisplayError::Init);
        };

        config.validate()?;
        let queue = TransferQueue::new(config.queue_capacity as usize)?;

        let mut controller = Self {
            transport,
            delay,
            config,
            control: config.control,
            queue,
            poller: BusyPoller::new(config.poll),
            errors: ErrorState::new(),
            fatal: None,
            state: ControllerState::Uninitialized,
            display: DisplayState::default(),
        };

        controller.initialize()?;
        Ok(controller)
    }

    /// Power-on sequence (reset by instruction, then 4-bit setup)
    fn initialize(&mut self) -> Result<(), DisplayError> {
        self.state = ControllerState::Uninitialized;
        self.delay.delay_ms(POWER_ON_DELAY_MS);

        // The controller may be in 8-bit or either half of a 4-bit
        // transfer; three 8-bit function sets force it into 8-bit mode.
        self.send_nibble(RESET_NIBBLE)?;
        self.delay.delay_us(RESET_DELAYS_US[0]);
        self.send_nibble(RESET_NIBBLE)?;
        self.delay.delay_us(RESET_DELAYS_US[1]);
        self.send_nibble(RESET_NIBBLE)?;

        // Still read as 8-bit, so a single nibble switches modes
        self.send_nibble(FOUR_BIT_NIBBLE)?;
        self.wait_ready(self.control.bus_bits())?;

        let setup = [
            self.config.function_set(),
            self.control.command(),
            commands::ENTRY_MODE | commands::ENTRY_INCREMENT,
            commands::CLEAR,
            commands::HOME,
        ];
        for instruction in setup {
            self.send_now(instruction, Register::Command)?;
        }

        self.state = ControllerState::Ready;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "HD44780 ready ({}x{})",
            self.config.geometry.columns,
            self.config.geometry.rows
        );

        Ok(())
    }

    /// Clear the queue and error latch, then rerun the power-on sequence
    pub fn reinitialize(&mut self) -> Result<(), DisplayError> {
        self.queue.clear();
        self.errors.clear();
        self.fatal = None;
        self.initialize().map_err(|e| self.fail(e))
    }

    /// Clear the display and return the cursor home
    pub fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(commands::CLEAR)
    }

    /// Return the cursor home and undo any display shift
    pub fn home(&mut self) -> Result<(), DisplayError> {
        self.command(commands::HOME)
    }

    /// Move the cursor one position left
    pub fn move_cursor_left(&mut self) -> Result<(), DisplayError> {
        self.command(commands::CURSOR_LEFT)
    }

    /// Move the cursor one position right
    pub fn move_cursor_right(&mut self) -> Result<(), DisplayError> {
        self.command(commands::CURSOR_RIGHT)
    }

    /// Shift the whole display one column left
    pub fn shift_display_left(&mut self) -> Result<(), DisplayError> {
        self.command(commands::DISPLAY_LEFT)
    }

    /// Shift the whole display one column right
    pub fn shift_display_right(&mut self) -> Result<(), DisplayError> {
        self.command(commands::DISPLAY_RIGHT)
    }

    /// Turn display output and backlight on
    ///
    /// Does nothing if both are already on.
    pub fn on(&mut self) -> Result<(), DisplayError> {
        self.set_power(true)
    }

    /// Turn display output and backlight off
    ///
    /// Does nothing if both are already off.
    pub fn off(&mut self) -> Result<(), DisplayError> {
        self.set_power(false)
    }

    fn set_power(&mut self, on: bool) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        if self.control.is_powered(on) {
            return Ok(());
        }
        self.issue_control(self.control.with_power(on))
    }

    /// Switch the backlight alone
    pub fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        self.update_control(ControlRegister {
            backlight: on,
            ..self.control
        })
    }

    /// Show or hide the underline cursor
    pub fn set_cursor_visible(&mut self, on: bool) -> Result<(), DisplayError> {
        self.update_control(ControlRegister {
            cursor_on: on,
            ..self.control
        })
    }

    /// Enable or disable the blinking block cursor
    pub fn set_blink(&mut self, on: bool) -> Result<(), DisplayError> {
        self.update_control(ControlRegister {
            blink_on: on,
            ..self.control
        })
    }

    /// Move the cursor to `col`, `row`
    ///
    /// Rows and columns past the last one are clamped to it.
    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        self.command(self.cursor_address(col, row))
    }

    /// Set-DDRAM-address instruction for `col`, `row`
    pub fn cursor_address(&self, col: u8, row: u8) -> u8 {
        let Geometry { columns, rows } = self.config.geometry;
        let offset = self.config.row_offsets[row.min(rows.saturating_sub(1)) as usize];
        let col = col.min(columns.saturating_sub(1));
        (col.wrapping_add(offset) & commands::DDRAM_ADDR_MASK) | commands::SET_DDRAM_ADDR
    }

    /// Queue character data at the cursor
    ///
    /// Input is split into transfers of at most `max_chunk` bytes. Returns
    /// how many bytes were accepted; if the queue fills part-way the rest
    /// is dropped and [`DisplayError::QueueFull`] is latched. Fails only if
    /// nothing could be accepted.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<usize, DisplayError> {
        self.ensure_ready()?;

        let mut accepted = 0;
        for chunk in bytes.chunks(self.config.max_chunk as usize) {
            let transfer = self.encode(Register::Data, &self.control, chunk)?;
            match self.submit(transfer) {
                Ok(()) => accepted += chunk.len(),
                Err(e) if accepted == 0 => return Err(e),
                Err(_) => break,
            }
        }
        Ok(accepted)
    }

    /// Move the cursor, then write `text`
    pub fn print_at(&mut self, col: u8, row: u8, text: &str) -> Result<usize, DisplayError> {
        self.set_cursor(col, row)?;
        self.write_bytes(text.as_bytes())
    }

    /// Deliver the oldest pending transfer
    ///
    /// Every frame is followed by a bounded busy wait. Returns `Ok(false)`
    /// when the queue was empty. A transport failure or a frozen controller
    /// drops the rest of the transfer and moves to
    /// [`ControllerState::Errored`].
    pub fn drain_one(&mut self) -> Result<bool, DisplayError> {
        self.ensure_ready()?;

        let Some(transfer) = self.queue.dequeue() else {
            return Ok(false);
        };

        // Poll with the backlight the transfer was encoded with
        let bus_bits = transfer
            .bytes()
            .first()
            .map_or(self.control.bus_bits(), |b| b & pins::BACKLIGHT);

        for frame in transfer.frames(self.config.strategy.frame_len()) {
            if let Err(e) = self.deliver(frame, bus_bits) {
                return Err(self.fail(e));
            }
        }
        Ok(true)
    }

    /// Drain until the queue is empty or an error is latched
    ///
    /// Returns the latched error, if any, so `Ok(())` means every queued
    /// operation reached the controller.
    pub fn flush(&mut self) -> Result<(), DisplayError> {
        while self.errors.is_clear() {
            if !self.drain_one()? {
                break;
            }
        }
        match self.errors.latched() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Poll the busy flag once without waiting
    pub fn is_busy(&mut self) -> Result<bool, DisplayError> {
        self.ensure_ready()?;
        match self.poller.poll(&mut self.transport, self.control.bus_bits()) {
            Ok(state) => {
                self.display = state;
                Ok(state.busy)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Drop every pending transfer, returning how many were dropped
    pub fn clear_queue(&mut self) -> usize {
        self.queue.clear()
    }

    /// Current lifecycle state
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// First error since the last [`clear_error`](Self::clear_error)
    pub fn error(&self) -> Option<DisplayError> {
        self.errors.latched()
    }

    /// Numeric code of the latched error, 0 when clear
    pub fn error_code(&self) -> u8 {
        self.errors.code()
    }

    /// Reset the error latch and resume from [`ControllerState::Errored`]
    pub fn clear_error(&mut self) {
        self.errors.clear();
        self.fatal = None;
        if self.state == ControllerState::Errored {
            self.state = ControllerState::Ready;
        }
    }

    /// Pending transfers
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Characters per row
    pub fn width(&self) -> u8 {
        self.config.geometry.columns
    }

    /// Number of rows
    pub fn height(&self) -> u8 {
        self.config.geometry.rows
    }

    /// Address counter from the most recent status read
    pub fn cursor_index(&self) -> u8 {
        self.display.address
    }

    /// Most recent status read
    pub fn display_state(&self) -> DisplayState {
        self.display
    }

    /// Control register as last issued
    pub fn control(&self) -> ControlRegister {
        self.control
    }

    /// Configuration in use
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Get access to the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get mutable access to the underlying transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the controller and return the transport and delay
    pub fn into_parts(self) -> (T, D) {
        (self.transport, self.delay)
    }

    fn ensure_ready(&self) -> Result<(), DisplayError> {
        match self.state {
            ControllerState::Ready => Ok(()),
            ControllerState::Uninitialized => Err(DisplayError::Init),
            ControllerState::Errored => Err(self
                .fatal
                .or(self.errors.latched())
                .unwrap_or(DisplayError::Init)),
        }
    }

    /// Latch an error and leave `Ready` if it is fatal
    ///
    /// The latch keeps the first error of the session, which may be a
    /// non-fatal one; the fatal cause is kept separately so `Errored`
    /// always rejects with an error whose `is_fatal()` holds.
    fn fail(&mut self, error: DisplayError) -> DisplayError {
        if self.errors.record(error) {
            #[cfg(feature = "defmt")]
            defmt::warn!("HD44780 error latched: {}", error);
        }
        if error.is_fatal() {
            self.fatal.get_or_insert(error);
            self.state = ControllerState::Errored;
        }
        error
    }

    fn command(&mut self, instruction: u8) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        let transfer = self.encode(Register::Command, &self.control, &[instruction])?;
        self.submit(transfer)
    }

    /// Enqueue a display control instruction and commit the register once
    /// it is accepted
    fn issue_control(&mut self, control: ControlRegister) -> Result<(), DisplayError> {
        let transfer = self.encode(Register::Command, &control, &[control.command()])?;
        self.submit(transfer)?;
        self.control = control;
        Ok(())
    }

    fn update_control(&mut self, control: ControlRegister) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        if control == self.control {
            return Ok(());
        }
        self.issue_control(control)
    }

    fn encode(
        &self,
        kind: Register,
        control: &ControlRegister,
        payload: &[u8],
    ) -> Result<Transfer, DisplayError> {
        Transfer::encode(&self.config.strategy, kind, control, payload)
            .map_err(|_| DisplayError::Config(ConfigError::ChunkSize))
    }

    fn submit(&mut self, transfer: Transfer) -> Result<(), DisplayError> {
        match self.queue.enqueue(transfer) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(e)),
        }
    }

    fn deliver(&mut self, frame: &[u8], bus_bits: u8) -> Result<(), DisplayError> {
        self.send_frame(frame)?;
        self.wait_ready(bus_bits)?;
        Ok(())
    }

    /// Encode and send one value right away, then wait for it to finish
    fn send_now(&mut self, payload: u8, register: Register) -> Result<(), DisplayError> {
        let frame = self.config.strategy.encode(payload, register, &self.control);
        self.deliver(&frame, self.control.bus_bits())
    }

    /// Put one frame on the bus with the pattern its strategy expects
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), DisplayError> {
        let result = if self.config.strategy.needs_transport_pulses() {
            self.transport.send_pulsed(frame, false)
        } else {
            let (high, low) = frame.split_at(frame.len() / 2);
            self.transport
                .send(high, true)
                .and_then(|()| self.transport.send(low, false))
        };
        result.map_err(|_| DisplayError::Transport)?;

        if self.transport.is_error() {
            return Err(DisplayError::Transport);
        }
        Ok(())
    }

    /// Latch a single nibble in 8-bit mode (reset sequence only)
    fn send_nibble(&mut self, nibble: u8) -> Result<(), DisplayError> {
        let byte = (nibble & pins::DATA) | self.control.bus_bits();
        self.transport
            .send(&[byte, byte | pins::E, byte], false)
            .map_err(|_| DisplayError::Transport)?;

        if self.transport.is_error() {
            return Err(DisplayError::Transport);
        }
        Ok(())
    }

    fn wait_ready(&mut self, bus_bits: u8) -> Result<DisplayState, DisplayError> {
        let state = self
            .poller
            .wait_ready(&mut self.transport, &mut self.delay, bus_bits)?;
        self.display = state;
        Ok(state)
    }
}

impl<T: Transport, D: DelayNs, const Q: usize> embedded_io::ErrorType
    for DisplayController<T, D, Q>
{
    type Error = DisplayError;
}

impl<T: Transport, D: DelayNs, const Q: usize> embedded_io::Write for DisplayController<T, D, Q> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, DisplayError> {
        self.write_bytes(buf)
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        Self::flush(self)
    }
}

impl<T: Transport, D: DelayNs, const Q: usize> core::fmt::Write for DisplayController<T, D, Q> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        match self.write_bytes(s.as_bytes()) {
            Ok(n) if n == s.len() => Ok(()),
            _ => Err(core::fmt::Error),
        }
    }
}
