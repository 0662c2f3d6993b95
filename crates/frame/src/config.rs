//! Per-connection limits and switches.

/// Maximum size in bytes of a request head, terminator included.
pub const DEFAULT_MAX_HEADER_BYTES: usize = 8 * 1024;

/// Maximum size in bytes of one line for the newline-delimited protocol.
pub const DEFAULT_MAX_LINE_BYTES: usize = 8 * 1024;

/// How many bytes one transport read asks for.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;

/// Settings shared by every connection a server accepts.
///
/// ```
/// use micro_frame::config::ConnectionConfig;
///
/// let config = ConnectionConfig::new().with_max_header_bytes(16 * 1024).with_validate_headers(true);
/// assert_eq!(config.max_header_bytes(), 16 * 1024);
/// assert!(config.validate_headers());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    max_header_bytes: usize,
    max_line_bytes: usize,
    validate_headers: bool,
    read_buffer_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            validate_headers: false,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    #[must_use]
    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    /// Rejects header lines that are not `token ":" value` or carry control
    /// characters. Off by default: header lines are kept verbatim.
    #[must_use]
    pub fn with_validate_headers(mut self, validate_headers: bool) -> Self {
        self.validate_headers = validate_headers;
        self
    }

    /// A zero size is bumped to one byte, a read must be able to make progress.
    #[must_use]
    pub fn with_read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.read_buffer_size = read_buffer_size.max(1);
        self
    }

    pub fn max_header_bytes(&self) -> usize {
        self.max_header_bytes
    }

    pub fn max_line_bytes(&self) -> usize {
        self.max_line_bytes
    }

    pub fn validate_headers(&self) -> bool {
        self.validate_headers
    }

    pub fn read_buffer_size(&self) -> usize {
        self.read_buffer_size
    }
}
