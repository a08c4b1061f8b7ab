use crate::error::LoadError;
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// the biggest program we'll accept; the top byte of RAM is never program
pub const CHIP8_MAX_PROGRAM_BYTES: usize = 0x0fff - CHIP8_PROGRAM_ADDR as usize;

/// addresses only have 12 significant bits
const CHIP8_ADDR_MASK: u16 = 0x0fff;

/// Represents memory map, ROM, RAM etc.
pub trait MemoryMap {
    /// read one byte; the address wraps around the top of RAM
    fn read_byte(&self, addr: u16) -> u8;

    /// write one byte; the address wraps around the top of RAM
    fn write_byte(&mut self, addr: u16, value: u8);

    /// get a big-endian two-byte word (instructions)
    fn get_word(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.read_byte(addr), self.read_byte(addr.wrapping_add(1))])
    }

    /// fill `buf` from consecutive addresses starting at `addr`
    fn read_into(&self, addr: u16, buf: &mut [u8]) {
        for (offset, b) in buf.iter_mut().enumerate() {
            *b = self.read_byte(addr.wrapping_add(offset as u16));
        }
    }

    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) {
        for (offset, b) in data.iter().enumerate() {
            self.write_byte(addr.wrapping_add(offset as u16), *b);
        }
    }
}

/// Defines the CHIP-8 memory map used here:
///   0x0000-0x01ff  reserved (left zeroed; no font is baked in)
///   0x0200-0x0ffe  program
///
/// the call stack and display live outside of memory, in the interpreter and
/// the display collaborator respectively
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    pub program_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn read_byte(&self, addr: u16) -> u8 {
        self.bytes[(addr & CHIP8_ADDR_MASK) as usize]
    }
    fn write_byte(&mut self, addr: u16, value: u8) {
        self.bytes[(addr & CHIP8_ADDR_MASK) as usize] = value;
    }
}

impl Chip8MemoryMap {
    /// zeroed RAM with nothing loaded
    pub fn new() -> Self {
        Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
            program_addr: CHIP8_PROGRAM_ADDR,
        }
    }

    /// zeroed RAM with a CHIP-8 program at 0x200
    pub fn with_program(program: &[u8]) -> Result<Self, LoadError> {
        if program.len() > CHIP8_MAX_PROGRAM_BYTES {
            return Err(LoadError::RomTooLarge {
                size: program.len(),
                max: CHIP8_MAX_PROGRAM_BYTES,
            });
        }
        let mut mm = Chip8MemoryMap::new();
        mm.write(program, mm.program_addr);
        Ok(mm)
    }

    /// read unknown len of program data, then load it at 0x200
    pub fn read_program(reader: &mut impl io::Read) -> Result<Self, LoadError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Chip8MemoryMap::with_program(&buf)
    }

    /// all of RAM
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Chip8MemoryMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.bytes[..], [0; CHIP8_RAM_SIZE_BYTES]);
    }

    #[test]
    fn test_write_slice_ok() {
        let mut dst = Chip8MemoryMap::new();
        let src: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];
        dst.write(src, 8);
        assert_eq!(
            dst.bytes[..16],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
    }

    #[test]
    fn test_read_into() {
        let m = Chip8MemoryMap::new();
        let mut buf = [0xffu8; 8];
        m.read_into(0, &mut buf);
        assert_eq!(buf, [0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_read_across_top_of_ram() {
        let mut m = Chip8MemoryMap::new();
        m.write(&[1, 2, 3, 4, 5, 6, 7, 8], 0x0ffc);
        let mut buf = [0u8; 8];
        m.read_into(0x0ffc, &mut buf);
        assert_eq!(buf, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(m.as_slice()[0x0ffc..], [1, 2, 3, 4]);
        assert_eq!(m.as_slice()[..4], [5, 6, 7, 8]);
    }

    #[test]
    fn test_read_word() {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0);
        assert_eq!(m.get_word(0x4), 0x0405);
    }

    #[test]
    fn test_addresses_wrap() {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0xaa, 0xbb, 0xcc], 0x0fff);
        assert_eq!(m.read_byte(0x0fff), 0xaa);
        assert_eq!(m.read_byte(0x0000), 0xbb);
        assert_eq!(m.read_byte(0x1001), 0xcc);
        assert_eq!(m.get_word(0x0fff), 0xaabb);

        let mut buf = [0u8; 3];
        m.read_into(0xffff, &mut buf);
        assert_eq!(buf, [0xaa, 0xbb, 0xcc]);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), LoadError> {
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        let m = Chip8MemoryMap::read_program(&mut prog)?;
        assert_eq!(m.as_slice()[0x200..0x202], [0x00, 0xe0]);
        assert_eq!(m.bytes[..0x200], [0; 0x200]);
        assert_eq!(m.bytes[0x202..], [0; 0xdfe]);
        Ok(())
    }

    #[test]
    fn test_largest_program_fits() -> Result<(), LoadError> {
        let prog = vec![0x5a; CHIP8_MAX_PROGRAM_BYTES];
        let m = Chip8MemoryMap::with_program(&prog)?;
        assert_eq!(m.as_slice()[0x200..0x0fff], prog[..]);
        assert_eq!(m.read_byte(0x0fff), 0);
        Ok(())
    }

    #[test]
    fn test_program_too_large() {
        let prog = vec![0; CHIP8_MAX_PROGRAM_BYTES + 1];
        match Chip8MemoryMap::with_program(&prog) {
            Err(LoadError::RomTooLarge { size, max }) => {
                assert_eq!(size, 3584);
                assert_eq!(max, 3583);
            }
            _ => panic!("expected RomTooLarge"),
        }
    }
}
