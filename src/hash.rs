use sha2::{Digest, Sha256};

pub trait Hasher {
    type Digest;
    fn reset(&mut self);
    fn update(&mut self, input: &[u8]);
    fn finalize_reset(&mut self) -> Self::Digest;
}

pub struct Sha256Digest(pub [u8; 32]);

pub struct Sha256Hasher {
    inner: Sha256,
}

impl Sha256Hasher {
    pub fn new() -> Self {
        Self {
            inner: Sha256::new(),
        }
    }
}

impl Default for Sha256Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Sha256Hasher {
    type Digest = Sha256Digest;

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn update(&mut self, input: &[u8]) {
        self.inner.update(input);
    }

    fn finalize_reset(&mut self) -> Self::Digest {
        Sha256Digest(self.inner.finalize_reset().into())
    }
}
