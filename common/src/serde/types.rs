use std::{
    borrow::Cow,
    fmt::{self, Debug, Display},
};

/// A fixed width, zero padded byte string, as found in binary file headers.
#[derive(Clone, PartialEq, Eq)]
pub struct SizedString<const SIZE: usize> {
    data: [u8; SIZE],
}

impl<const SIZE: usize> SizedString<SIZE> {
    pub const fn new_full(data: [u8; SIZE]) -> Self {
        Self { data }
    }

    /// Copies `data` into a new string. Anything past `SIZE` bytes is cut off.
    pub const fn new(data: &[u8]) -> Self {
        // kinda crazy this works in a const fn
        let mut arr = [0; SIZE];
        let mut i = 0;
        while i < SIZE && i < data.len() {
            arr[i] = data[i];
            i += 1;
        }

        Self { data: arr }
    }

    pub fn as_bytes(&self) -> &[u8; SIZE] {
        &self.data
    }

    /// The contents up to the first null byte.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        let end = self.data.iter().position(|&x| x == 0).unwrap_or(SIZE);
        String::from_utf8_lossy(&self.data[..end])
    }
}

impl<const SIZE: usize> Default for SizedString<SIZE> {
    fn default() -> Self {
        Self { data: [0; SIZE] }
    }
}

impl<const SIZE: usize> Display for SizedString<SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.to_string_lossy().trim_end())
    }
}

impl<const SIZE: usize> Debug for SizedString<SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}
