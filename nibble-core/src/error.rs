//! Error types and the session error latch

/// Reasons a [`DisplayConfig`](crate::DisplayConfig) is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Rows outside 1..=4, columns outside 1..=40, or more than 80 cells
    Geometry,
    /// 5x10 font requested on a multi-line display
    FontUnsupported,
    /// Chunk size is zero or its frames do not fit a transfer buffer
    ChunkSize,
    /// Queue capacity is zero or larger than the queue storage
    QueueCapacity,
    /// Poll bound of zero attempts
    PollBound,
    /// A row base address pushes the row past the 7-bit address space
    RowOffsets,
}

/// Display pipeline errors
///
/// Each variant carries a stable numeric code (see [`DisplayError::code`])
/// for callers that report faults as a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// No transport present at construction
    Init,
    /// Configuration rejected at construction
    Config(ConfigError),
    /// The transport reported a bus failure
    Transport,
    /// Transfer queue at capacity; the rejected transfer was released
    QueueFull,
    /// Busy flag never cleared within the poll bound
    Freeze,
}

impl DisplayError {
    /// Numeric error code, never zero
    pub const fn code(&self) -> u8 {
        match self {
            DisplayError::Config(_) => 76,
            DisplayError::Init => 77,
            DisplayError::Freeze => 78,
            DisplayError::QueueFull => 89,
            DisplayError::Transport => 99,
        }
    }

    /// Whether the controller must stop talking to the bus
    ///
    /// A full queue only loses the rejected operation; everything else
    /// means the controller or the bus can no longer be trusted.
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, DisplayError::QueueFull)
    }
}

impl From<ConfigError> for DisplayError {
    fn from(e: ConfigError) -> Self {
        DisplayError::Config(e)
    }
}

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DisplayError::Init => f.write_str("no transport"),
            DisplayError::Config(e) => write!(f, "invalid configuration: {:?}", e),
            DisplayError::Transport => f.write_str("transport failure"),
            DisplayError::QueueFull => f.write_str("transfer queue full"),
            DisplayError::Freeze => f.write_str("controller stuck busy"),
        }
    }
}

impl embedded_io::Error for DisplayError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            DisplayError::Init => embedded_io::ErrorKind::NotConnected,
            DisplayError::Config(_) => embedded_io::ErrorKind::InvalidInput,
            DisplayError::Transport => embedded_io::ErrorKind::Other,
            DisplayError::QueueFull => embedded_io::ErrorKind::OutOfMemory,
            DisplayError::Freeze => embedded_io::ErrorKind::TimedOut,
        }
    }
}

/// Sticky single-slot error latch
///
/// The first recorded error wins; later ones are dropped until
/// [`ErrorState::clear`] is called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorState {
    latched: Option<DisplayError>,
}

impl ErrorState {
    /// Create an empty latch
    pub const fn new() -> Self {
        Self { latched: None }
    }

    /// Record an error
    ///
    /// Returns `true` if this error was latched, `false` if an earlier
    /// one is already held.
    pub fn record(&mut self, error: DisplayError) -> bool {
        if self.latched.is_some() {
            return false;
        }
        self.latched = Some(error);
        true
    }

    /// The latched error, if any
    pub const fn latched(&self) -> Option<DisplayError> {
        self.latched
    }

    /// Numeric code of the latched error, 0 when clear
    pub const fn code(&self) -> u8 {
        match self.latched {
            Some(e) => e.code(),
            None => 0,
        }
    }

    /// Check if no error is latched
    pub const fn is_clear(&self) -> bool {
        self.latched.is_none()
    }

    /// Reset the latch
    pub fn clear(&mut self) {
        self.latched = None;
    }
}
