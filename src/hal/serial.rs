//! Raw serial channel (the data UART).

/// Byte-wise UART access.
///
/// Reads never block: an empty receive FIFO is `None`, which is the normal
/// idle result and not an error.
pub trait SerialPort {
    /// Next received byte, if any.
    fn read_byte(&mut self) -> Option<u8>;

    /// Queue one byte for transmission.
    fn write_byte(&mut self, byte: u8);

    /// Reprogram the line rate. Called at every session start and whenever
    /// the system clock changes.
    fn set_baud_rate(&mut self, baud: u32);
}
