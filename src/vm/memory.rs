//! Byte-addressed machine memory.
//!
//! The data segment sits at address 0 upward; the call stack grows down from
//! the top. Integers are four bytes, little endian.

use bilby_core::RuntimeError;

#[derive(Debug, Clone)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn read_i32(&self, address: i32, pc: usize) -> Result<i32, RuntimeError> {
        let start = self.check(address, 4, pc)?;
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.bytes[start..start + 4]);
        Ok(i32::from_le_bytes(word))
    }

    pub fn write_i32(&mut self, address: i32, value: i32, pc: usize) -> Result<(), RuntimeError> {
        let start = self.check(address, 4, pc)?;
        self.bytes[start..start + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn read_u8(&self, address: i32, pc: usize) -> Result<u8, RuntimeError> {
        let start = self.check(address, 1, pc)?;
        Ok(self.bytes[start])
    }

    pub fn write_u8(&mut self, address: i32, value: u8, pc: usize) -> Result<(), RuntimeError> {
        let start = self.check(address, 1, pc)?;
        self.bytes[start] = value;
        Ok(())
    }

    /// Read a NUL-terminated string.
    pub fn read_c_string(&self, address: i32, pc: usize) -> Result<String, RuntimeError> {
        let start = self.check(address, 1, pc)?;
        let end = self.bytes[start..]
            .iter()
            .position(|b| *b == 0)
            .map(|len| start + len)
            .ok_or(RuntimeError::BadAddress {
                address: self.bytes.len() as i64,
                pc,
            })?;
        Ok(String::from_utf8_lossy(&self.bytes[start..end]).into_owned())
    }

    /// Copy `text` plus a terminating NUL to `address`.
    pub fn write_c_string(&mut self, address: usize, text: &str) -> Result<(), RuntimeError> {
        let end = address + text.len() + 1;
        if end > self.bytes.len() {
            return Err(RuntimeError::OutOfMemory {
                required: end,
                available: self.bytes.len(),
            });
        }
        self.bytes[address..end - 1].copy_from_slice(text.as_bytes());
        self.bytes[end - 1] = 0;
        Ok(())
    }

    fn check(&self, address: i32, len: usize, pc: usize) -> Result<usize, RuntimeError> {
        let bad = RuntimeError::BadAddress {
            address: i64::from(address),
            pc,
        };
        let start = usize::try_from(address).map_err(|_| bad.clone())?;
        if start + len > self.bytes.len() {
            return Err(bad);
        }
        Ok(start)
    }
}
