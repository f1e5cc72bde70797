use parking_lot::{Mutex, MutexGuard};

/// stripe count used by the ledger
pub const DEFAULT_STRIPES: usize = 64;

/// fixed table of mutexes, a key maps to stripe `key % stripes`
///
/// Holding a key's stripe serializes every operation on that key. Keys that
/// share a stripe also wait on each other, and the table never grows.
#[derive(Debug)]
pub struct KeyedLocks {
    stripes: Vec<Mutex<()>>,
}

impl Default for KeyedLocks {
    fn default() -> Self {
        Self::with_stripes(DEFAULT_STRIPES)
    }
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// at least one stripe is always allocated
    pub fn with_stripes(stripes: usize) -> Self {
        Self {
            stripes: (0..stripes.max(1)).map(|_| Mutex::new(())).collect(),
        }
    }

    /// lock `key` for the lifetime of the guard
    pub fn lock(&self, key: u64) -> MutexGuard<'_, ()> {
        self.stripe(key).lock()
    }

    pub fn try_lock(&self, key: u64) -> Option<MutexGuard<'_, ()>> {
        self.stripe(key).try_lock()
    }

    pub fn len(&self) -> usize {
        self.stripes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stripes.is_empty()
    }

    fn stripe(&self, key: u64) -> &Mutex<()> {
        &self.stripes[(key % self.stripes.len() as u64) as usize]
    }
}
