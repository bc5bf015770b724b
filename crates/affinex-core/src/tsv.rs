//! TSV artifact layout and atomic writing.

use std::io::Write;
use std::path::Path;

/// The fixed 6-column header row, in the exact order the extraction prompt
/// requests. Every artifact's first line equals this, byte for byte.
pub const HEADER: &str = "Ligand name\tReceptor protein name\tReceptor protein organism source\tAffinity value\tWet lab method for affinity measurement\tCorresponding complex PDBID";

/// Write one artifact: the header line plus the provider's rows, verbatim.
///
/// The content is staged in a temp file in the destination directory and
/// renamed onto `path`, so a half-written artifact is never visible under
/// the final name. Model output is not validated or escaped before writing.
pub fn write_artifact(path: &Path, body: &str) -> std::io::Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = tempfile::NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))?;
    writeln!(tmp, "{HEADER}")?;
    if !body.is_empty() {
        writeln!(tmp, "{body}")?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_has_six_columns() {
        assert_eq!(HEADER.split('\t').count(), 6);
        assert!(HEADER.starts_with("Ligand name\t"));
        assert!(HEADER.ends_with("\tCorresponding complex PDBID"));
    }

    #[test]
    fn writes_header_then_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.tsv");
        write_artifact(&path, "P1\tR1\tHomo sapiens\tKd=1.2 nM\tSPR\t1ABC").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some(HEADER));
        assert_eq!(
            lines.next(),
            Some("P1\tR1\tHomo sapiens\tKd=1.2 nM\tSPR\t1ABC")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_body_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.tsv");
        write_artifact(&path, "").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("{HEADER}\n"));
    }

    #[test]
    fn overwrites_existing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.tsv");
        write_artifact(&path, "old\trow").unwrap();
        write_artifact(&path, "new\trow").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("new\trow"));
        assert!(!content.contains("old\trow"));
    }

    #[test]
    fn leaves_no_temp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.tsv");
        write_artifact(&path, "a\tb").unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("paper.tsv")]);
    }
}
