use anyhow::Result;
use std::path::Path;

/// A raw binary buffer mapped at a base address in the target's address
/// space. Words are little-endian and read on 4-byte alignment.
#[derive(Debug, Clone)]
pub struct Image {
    pub base: u32,
    pub bytes: Vec<u8>,
}

impl Image {
    pub fn new(base: u32, bytes: Vec<u8>) -> Self {
        Self { base, bytes }
    }

    pub fn load(path: &Path, base: u32, skip: usize, len: Option<usize>) -> Result<Self> {
        let file = std::fs::read(path)?;
        anyhow::ensure!(skip <= file.len(), "--skip exceeds file size");
        let mut payload = &file[skip..];
        if let Some(limit) = len {
            anyhow::ensure!(
                limit <= payload.len(),
                "--len exceeds remaining file size after skip"
            );
            payload = &payload[..limit];
        }
        Ok(Self::new(base, payload.to_vec()))
    }

    pub fn contains(&self, addr: u32) -> bool {
        let end = self.base.wrapping_add(self.bytes.len() as u32);
        addr >= self.base && addr < end
    }

    /// The 4 raw bytes of the word at `addr`, in memory order.
    pub fn word_bytes(&self, addr: u32) -> Option<[u8; 4]> {
        let offset = addr.checked_sub(self.base)? as usize;
        let slice = self.bytes.get(offset..offset + 4)?;
        Some([slice[0], slice[1], slice[2], slice[3]])
    }

    pub fn read_word(&self, addr: u32) -> Option<u32> {
        self.word_bytes(addr).map(u32::from_le_bytes)
    }

    /// Addresses of every complete 4-byte-aligned word, in order.
    pub fn word_addresses(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.bytes.len() / 4).map(|i| self.base.wrapping_add(4 * i as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_applies_skip_and_len() {
        let cwd = std::env::current_dir().unwrap();
        let path = cwd.join("_test_image.bin");
        std::fs::write(&path, [0u8, 1, 2, 3, 4, 5, 6, 7]).unwrap();
        let img = Image::load(&path, 0x0010_0000, 2, Some(4)).unwrap();
        assert_eq!(img.base, 0x0010_0000);
        assert_eq!(img.bytes, vec![2, 3, 4, 5]);
        assert_eq!(img.read_word(0x0010_0000).unwrap(), 0x0504_0302);
        assert!(img.read_word(0x0010_0004).is_none());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn word_addresses_walk_whole_words_only() {
        let img = Image::new(0x100, vec![0u8; 10]);
        let addrs: Vec<u32> = img.word_addresses().collect();
        assert_eq!(addrs, vec![0x100, 0x104]);
    }
}
