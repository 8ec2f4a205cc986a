/// How many protection events a fresh record is owed.
pub const DEFAULT_PRIVACY_COUNT: u32 = 1;

/// One in-flight private lookup awaiting resolution, keyed in the table by
/// its (name, nonce) pair.
#[derive(Clone, Debug)]
pub struct PrivacyEntry {
    privacy_count: u32,
    delayed: bool,
}

impl PrivacyEntry {
    pub fn new(privacy_count: u32) -> Self {
        Self {
            privacy_count,
            delayed: false,
        }
    }

    pub fn privacy_count(&self) -> u32 {
        self.privacy_count
    }

    pub fn set_privacy_count(&mut self, privacy_count: u32) {
        self.privacy_count = privacy_count;
    }

    /// Whether this record still owes a protection event.
    pub fn is_private(&self) -> bool {
        self.privacy_count > 0
    }

    /// Whether this (name, nonce) pair has already paid its one delay.
    pub fn is_delayed(&self) -> bool {
        self.delayed
    }

    pub fn set_delayed(&mut self, delayed: bool) {
        self.delayed = delayed;
    }
}

impl Default for PrivacyEntry {
    fn default() -> Self {
        Self::new(DEFAULT_PRIVACY_COUNT)
    }
}
