use std::fs;
use std::path::Path;

use log::{debug, info, warn};

use crate::error::{PlanError, Result};
use crate::metadata::lane::LaneRecord;
use crate::platform::Platform;

/// Header every flat metadata file must start with, compared character for character
pub const METADATA_HEADER: &str =
    "#FILE1,FILE2,INDIVIDUAL,SAMPLE,LIBRARY,SEQUENCING,TUMOR,PLATFORM,PLATFORM_UNIT,CENTER,DESCRIPTION,DATE_SEQUENCED";

const FIELD_COUNT: usize = 12;

/// Read a flat metadata file from disk
pub fn read_metadata_file(path: &Path) -> Result<Vec<LaneRecord>> {
    info!("Reading lane metadata at {}", path.display());
    let content = fs::read_to_string(path).map_err(|source| {
        warn!("Can't read metadata at path {}: {}", path.display(), source);
        PlanError::Io { path: path.to_path_buf(), source }
    })?;
    parse_metadata(&content)
}

/// Parse flat metadata text into lanes, numbered from 1 in file order
///
/// Blank lines are skipped. The first non-blank line must be [METADATA_HEADER].
pub fn parse_metadata(content: &str) -> Result<Vec<LaneRecord>> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.strip_suffix('\r').unwrap_or(line)))
        .filter(|(_, line)| !line.trim().is_empty());

    match lines.next() {
        Some((_, METADATA_HEADER)) => {}
        Some((number, line)) => {
            warn!("Metadata header doesn't match");
            return Err(PlanError::metadata(number, line, "expected header"));
        }
        None => return Err(PlanError::metadata(1, "", "missing header")),
    }

    let mut lanes = Vec::new();
    for (number, line) in lines {
        let lane = parse_line(lanes.len() + 1, number, line)?;
        debug!("Lane {} -> sample {}", lane.id, lane.sample);
        lanes.push(lane);
    }

    info!("Read {} lanes", lanes.len());
    Ok(lanes)
}

fn parse_line(id: usize, number: usize, line: &str) -> Result<LaneRecord> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != FIELD_COUNT {
        return Err(PlanError::metadata(
            number,
            line,
            format!("expected {FIELD_COUNT} fields, found {}", fields.len()),
        ));
    }
    if fields[0].is_empty() {
        return Err(PlanError::metadata(number, line, "FILE1 is empty"));
    }

    let platform: Platform = fields[7]
        .parse()
        .map_err(|err| PlanError::metadata(number, line, format!("{err}")))?;

    Ok(LaneRecord {
        id,
        read1: fields[0].to_string(),
        read2: match fields[1] {
            "" => None,
            mate => Some(mate.to_string()),
        },
        individual: fields[2].to_string(),
        sample: fields[3].to_string(),
        library: fields[4].to_string(),
        sequencing: fields[5].to_string(),
        tumor: fields[6] == "1",
        platform,
        platform_unit: fields[8].to_string(),
        center: fields[9].to_string(),
        description: fields[10].to_string(),
        date_sequenced: fields[11].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn with_header(lines: &[&str]) -> String {
        let mut content = format!("{METADATA_HEADER}\n");
        for line in lines {
            content.push_str(line);
            content.push('\n');
        }
        content
    }

    #[test]
    fn paired_tumor_lane() {
        let content = with_header(&["fq1.fastq,fq2.fastq,IND1,SAMP1,LIB1,SEQ1,1,ILLUMINA,PU1,CTR1,desc,2020-01-01"]);
        let lanes = parse_metadata(&content).unwrap();
        assert_eq!(lanes.len(), 1);
        let lane = &lanes[0];
        assert_eq!(lane.id, 1);
        assert!(lane.tumor);
        assert!(lane.is_paired());
        assert_eq!(lane.read2.as_deref(), Some("fq2.fastq"));
        assert_eq!(lane.platform, Platform::Illumina);
        assert_eq!(lane.date_sequenced, "2020-01-01");
    }

    #[test]
    fn single_end_normal_lane() {
        let content = with_header(&["fq1.fastq,,IND1,SAMP1,LIB1,SEQ1,0,ILLUMINA,PU1,CTR1,desc,2020-01-01"]);
        let lanes = parse_metadata(&content).unwrap();
        assert!(!lanes[0].tumor);
        assert!(!lanes[0].is_paired());
        assert_eq!(lanes[0].read2, None);
    }

    #[test]
    fn only_literal_one_is_tumor() {
        let content = with_header(&[
            "a.fq,,I,S1,L,Q,true,ILLUMINA,P,C,D,T",
            "b.fq,,I,S2,L,Q,01,ILLUMINA,P,C,D,T",
            "c.fq,,I,S3,L,Q,1,ILLUMINA,P,C,D,T",
        ]);
        let tumor: Vec<bool> = parse_metadata(&content).unwrap().iter().map(|l| l.tumor).collect();
        assert_eq!(tumor, vec![false, false, true]);
    }

    #[test]
    fn ids_follow_file_order() {
        let content = with_header(&[
            "a.fq,,I,S1,L,Q1,0,ILLUMINA,P,C,D,T",
            "",
            "b.fq,b2.fq,I,S1,L,Q2,0,ILLUMINA,P,C,D,T",
            "c.fq,,I,S2,L,Q3,1,SOLID,P,C,D,T",
        ]);
        let lanes = parse_metadata(&content).unwrap();
        let ids: Vec<usize> = lanes.iter().map(|l| l.id).collect();
        let runs: Vec<&str> = lanes.iter().map(|l| l.sequencing.as_str()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(runs, vec!["Q1", "Q2", "Q3"]);
    }

    #[test]
    fn header_only_has_no_lanes() {
        assert!(parse_metadata(&with_header(&[])).unwrap().is_empty());
    }

    #[test]
    fn rejects_wrong_header() {
        let content = "#FILE1,FILE2,INDIVIDUAL\nfq1.fastq,,IND1,SAMP1,LIB1,SEQ1,0,ILLUMINA,PU1,CTR1,desc,2020-01-01\n";
        match parse_metadata(content) {
            Err(PlanError::MetadataFormat { line, .. }) => assert_eq!(line, 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_header_with_trailing_space() {
        let content = format!("{METADATA_HEADER} \n");
        assert!(matches!(parse_metadata(&content), Err(PlanError::MetadataFormat { .. })));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(parse_metadata(""), Err(PlanError::MetadataFormat { .. })));
    }

    #[test]
    fn names_offending_line() {
        let content = with_header(&[
            "a.fq,,I,S1,L,Q1,0,ILLUMINA,P,C,D,T",
            "b.fq,,I,S1,L,Q2,0,ILLUMINA,P,C,D",
        ]);
        match parse_metadata(&content) {
            Err(PlanError::MetadataFormat { line, content, reason }) => {
                assert_eq!(line, 3);
                assert_eq!(content, "b.fq,,I,S1,L,Q2,0,ILLUMINA,P,C,D");
                assert!(reason.contains("found 11"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_platform() {
        let content = with_header(&["a.fq,,I,S1,L,Q1,0,TELEPATHY,P,C,D,T"]);
        match parse_metadata(&content) {
            Err(PlanError::MetadataFormat { line, reason, .. }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("TELEPATHY"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_primary_read() {
        let content = with_header(&[",b.fq,I,S1,L,Q1,0,ILLUMINA,P,C,D,T"]);
        assert!(matches!(parse_metadata(&content), Err(PlanError::MetadataFormat { line: 2, .. })));
    }

    #[test]
    fn reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", with_header(&["a.fq,,I,S1,L,Q1,0,ILLUMINA,P,C,D,T"])).unwrap();
        let lanes = read_metadata_file(file.path()).unwrap();
        assert_eq!(lanes.len(), 1);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.csv");
        assert!(matches!(read_metadata_file(&missing), Err(PlanError::Io { .. })));
    }
}
