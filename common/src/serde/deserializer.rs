/// Source of little-endian binary data. Reads past the end of the data yield
/// zeroed values, so callers that care should check [`Deserializer::remaining`]
/// up front.
#[rustfmt::skip]
pub trait Deserializer {
    fn pos(&self) -> usize;
    fn size(&self) -> usize;
    fn advance_by(&mut self, amount: usize);
    fn read_bytes(&mut self, length: usize) -> &[u8];

    fn remaining(&self) -> usize { self.size().saturating_sub(self.pos()) }
    fn is_eof(&self) -> bool { self.remaining() == 0 }

    fn read_array<const LENGTH: usize>(&mut self) -> [u8; LENGTH] {
        self.read_bytes(LENGTH)
            .try_into()
            .unwrap_or([0; LENGTH])
    }

    fn read_u8(&mut self) -> u8 { self.read_array::<1>()[0] }
    fn read_u16_le(&mut self) -> u16 { u16::from_le_bytes(self.read_array()) }
    fn read_u32_le(&mut self) -> u32 { u32::from_le_bytes(self.read_array()) }
    fn read_f32_le(&mut self) -> f32 { f32::from_le_bytes(self.read_array()) }
}

pub struct SliceDeserializer<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> SliceDeserializer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            buffer: data,
            offset: 0,
        }
    }
}

impl Deserializer for SliceDeserializer<'_> {
    fn pos(&self) -> usize {
        self.offset
    }

    fn size(&self) -> usize {
        self.buffer.len()
    }

    fn advance_by(&mut self, amount: usize) {
        self.offset = (self.offset + amount).min(self.buffer.len());
    }

    fn read_bytes(&mut self, length: usize) -> &[u8] {
        let start = self.offset.min(self.buffer.len());
        let end = (start + length).min(self.buffer.len());
        self.offset = end;
        &self.buffer[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian() {
        let data = [0x02, 0x01, 0x06, 0x05, 0x04, 0x03, 0x00, 0x00, 0x80, 0x3F];
        let mut des = SliceDeserializer::new(&data);

        assert_eq!(des.read_u16_le(), 0x0102);
        assert_eq!(des.read_u32_le(), 0x0304_0506);
        assert_eq!(des.read_f32_le(), 1.0);
        assert!(des.is_eof());
    }

    #[test]
    fn short_reads_are_zeroed() {
        let mut des = SliceDeserializer::new(&[0xFF, 0xFF]);
        des.advance_by(1);

        assert_eq!(des.remaining(), 1);
        assert_eq!(des.read_u32_le(), 0);
        assert_eq!(des.pos(), 2);
    }
}
