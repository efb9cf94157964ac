/// Byte/record/rekey counters updated by the record layer.
///
/// Grounded on the original implementation's `PROGRESS_UPDATE_INTERVAL`
/// byte-count tracking (`examples/original_source/constants.h`); this crate
/// keeps the counter but not the progress display itself, which is out of
/// scope (spec.md §1's CLI Non-goal).
#[derive(Debug, Default, Clone, Copy)]
pub struct TransferStats {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub records_sent: u64,
    pub records_received: u64,
    pub rekeys_performed: u64,
}

impl TransferStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sent(&mut self, payload_len: usize) {
        self.records_sent += 1;
        self.bytes_sent += payload_len as u64;
    }

    pub fn record_received(&mut self, payload_len: usize) {
        self.records_received += 1;
        self.bytes_received += payload_len as u64;
    }

    pub fn rekey_completed(&mut self) {
        self.rekeys_performed += 1;
    }
}
