use crate::platform::Platform;

/// One sequencing lane: the read files of one library from one run, plus who it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneRecord {
    /// 1-based, in the order lanes were resolved
    pub id: usize,
    pub individual: String,
    pub sample: String,
    pub library: String,
    pub sequencing: String,
    pub read1: String,
    /// Present only for paired-end lanes
    pub read2: Option<String>,
    pub tumor: bool,
    pub platform: Platform,
    pub platform_unit: String,
    pub center: String,
    pub description: String,
    pub date_sequenced: String,
}

impl LaneRecord {
    pub fn is_paired(&self) -> bool {
        self.read2.is_some()
    }

    /// SAM read group header line for this lane, tab separators escaped for `bwa -R`
    pub fn read_group(&self) -> String {
        format!(
            "@RG\\tID:{}.{}\\tSM:{}\\tLB:{}\\tPL:{}\\tPU:{}\\tCN:{}\\tDS:{}\\tDT:{}",
            self.sequencing,
            self.id,
            self.sample,
            self.library,
            self.platform,
            self.platform_unit,
            self.center,
            self.description,
            self.date_sequenced
        )
    }
}
