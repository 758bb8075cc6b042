use sha2::{Digest, Sha256};
use std::io::{self, Read};

/// A reader that hashes every byte read through it with SHA256.
pub struct DigestingReader<R: Read> {
    inner: R,
    hasher: Sha256,
}

impl<R: Read> DigestingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    /// Lowercase hex encoded digest of all bytes read so far.
    #[must_use]
    pub fn hex_digest(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}

impl<R: Read> Read for DigestingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digesting_reader_hashes_what_was_read() {
        let mut reader = DigestingReader::new("Hello World!".as_bytes());
        let mut contents = String::new();
        reader.read_to_string(&mut contents).unwrap();

        assert_eq!(contents, "Hello World!");
        assert_eq!(
            reader.hex_digest(),
            "7f83b1657ff1fc53b92dc18148a1d65dfc2d4b1fa3d677284addd200126d9069"
        );
    }
}
