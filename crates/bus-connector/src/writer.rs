//! Byte-sink adapter over a structured message.
//!
//! [`MessageWriter`] lets any `std::io::Write` consumer (a JSON serializer,
//! `write!`, `io::copy`) write straight into a [`StructuredMessage`]. Nothing
//! is buffered: every call becomes exactly one field write on the message.
//!
//! # Message lifecycle
//!
//! The writer only borrows the message. Closing the writer does **not**
//! commit, close or send the message; the caller still owns it and decides
//! what happens after writing finishes.

use crate::error::{MessageWriteError, WriteOperation};
use crate::message::StructuredMessage;
use std::io;

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;

/// Forwards writes 1:1 to a borrowed structured message
///
/// Not thread-safe: one writer per message, used by a single writing sequence.
pub struct MessageWriter<'a, M: StructuredMessage + ?Sized> {
    message: &'a mut M,
}

impl<'a, M: StructuredMessage + ?Sized> MessageWriter<'a, M> {
    /// Wrap a message for writing
    pub fn new(message: &'a mut M) -> Self {
        Self { message }
    }

    /// Append an integer field
    pub fn write_int(&mut self, value: i32) -> Result<(), MessageWriteError> {
        self.message
            .write_int(value)
            .map_err(|e| MessageWriteError::new(WriteOperation::WriteInt, e))
    }

    /// Append a single byte field
    pub fn write_byte(&mut self, value: u8) -> Result<(), MessageWriteError> {
        self.message
            .write_byte(value)
            .map_err(|e| MessageWriteError::new(WriteOperation::WriteByte, e))
    }

    /// Append a buffer as one bytes field
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<(), MessageWriteError> {
        self.message
            .write_bytes(buf)
            .map_err(|e| MessageWriteError::new(WriteOperation::WriteBytes, e))
    }

    /// Append `len` bytes of `buf` starting at `offset` as one bytes field
    ///
    /// # Panics
    /// Panics if `offset + len` is out of bounds for `buf`, like slice indexing.
    pub fn write_slice(
        &mut self,
        buf: &[u8],
        offset: usize,
        len: usize,
    ) -> Result<(), MessageWriteError> {
        self.write_bytes(&buf[offset..offset + len])
    }

    /// Release the writer
    ///
    /// No-op on the message: it is neither closed nor sent. The caller
    /// regains use of the message once the writer is gone.
    pub fn close(self) {}
}

impl<M: StructuredMessage + ?Sized> io::Write for MessageWriter<'_, M> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Recover a message write failure carried through an `io::Error`
///
/// Returns the original error back when it did not come from a
/// [`MessageWriter`].
pub fn take_write_error(error: io::Error) -> Result<MessageWriteError, io::Error> {
    let is_write_error = error
        .get_ref()
        .is_some_and(|inner| inner.is::<MessageWriteError>());
    if !is_write_error {
        return Err(error);
    }

    match error.into_inner().map(|inner| inner.downcast::<MessageWriteError>()) {
        Some(Ok(write_error)) => Ok(*write_error),
        Some(Err(other)) => Err(io::Error::other(other)),
        None => Err(io::Error::other("write error without cause")),
    }
}
