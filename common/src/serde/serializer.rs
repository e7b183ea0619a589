use super::SizedString;

/// Sink for little-endian binary data.
pub trait Serializer {
    fn pos(&self) -> usize;
    fn write_u8(&mut self, data: u8);
    fn write_u16_le(&mut self, data: u16);
    fn write_u32_le(&mut self, data: u32);
    fn write_f32_le(&mut self, data: f32);
    fn write_bytes(&mut self, data: &[u8]);
    fn write_sized_string<const SIZE: usize>(&mut self, data: &SizedString<SIZE>);
}

/// A [`Serializer`] backed by a growable buffer.
pub struct DynamicSerializer {
    buffer: Vec<u8>,
}

impl DynamicSerializer {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Creates a serializer that will not reallocate until `capacity` bytes
    /// have been written.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

impl Serializer for DynamicSerializer {
    fn pos(&self) -> usize {
        self.buffer.len()
    }

    fn write_u8(&mut self, data: u8) {
        self.buffer.push(data);
    }

    fn write_u16_le(&mut self, data: u16) {
        self.buffer.extend_from_slice(&data.to_le_bytes());
    }

    fn write_u32_le(&mut self, data: u32) {
        self.buffer.extend_from_slice(&data.to_le_bytes());
    }

    fn write_f32_le(&mut self, data: f32) {
        self.buffer.extend_from_slice(&data.to_le_bytes());
    }

    fn write_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    fn write_sized_string<const SIZE: usize>(&mut self, data: &SizedString<SIZE>) {
        self.buffer.extend_from_slice(data.as_bytes());
    }
}

impl Default for DynamicSerializer {
    fn default() -> Self {
        Self::new()
    }
}
