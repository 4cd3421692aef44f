use std::io;

use crate::error::Error;

use super::{private, Read};

/// A reader for IO stream
#[derive(Debug)]
pub struct IoReader<R> {
    reader: R,
    // bytes peeked but not yet consumed
    buf: Vec<u8>,
}

impl<R: io::Read> IoReader<R> {
    /// Creates a new reader over IO stream
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    fn fill_buffer(&mut self, len: usize) -> Result<(), Error> {
        let l = self.buf.len();
        if l < len {
            self.buf.resize(len, 0);
            self.reader.read_exact(&mut self.buf[l..])?;
        }
        Ok(())
    }
}

impl<R> private::Sealed for IoReader<R> {}

impl<'de, R: io::Read + 'de> Read<'de> for IoReader<R> {
    fn peek(&mut self) -> Result<u8, Error> {
        self.fill_buffer(1)?;
        Ok(self.buf[0])
    }

    fn next(&mut self) -> Result<u8, Error> {
        if self.buf.is_empty() {
            let mut byte = [0u8; 1];
            self.reader.read_exact(&mut byte)?;
            Ok(byte[0])
        } else {
            Ok(self.buf.remove(0))
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        let l = self.buf.len().min(buf.len());
        buf[..l].copy_from_slice(&self.buf[..l]);
        self.buf.drain(..l);
        self.reader.read_exact(&mut buf[l..])?;
        Ok(())
    }

    fn forward_read_bytes<V>(&mut self, len: usize, visitor: V) -> Result<V::Value, Error>
    where
        V: serde::de::Visitor<'de>,
    {
        let buf = self.read_bytes(len)?;
        visitor.visit_byte_buf(buf)
    }

    fn forward_read_str<V>(&mut self, len: usize, visitor: V) -> Result<V::Value, Error>
    where
        V: serde::de::Visitor<'de>,
    {
        let buf = self.read_bytes(len)?;
        let string = String::from_utf8(buf)?;
        visitor.visit_string(string)
    }
}
