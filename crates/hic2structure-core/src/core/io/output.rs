use crate::core::io::traits::WriteFormat;
use crate::core::models::contact::{ContactRecordTable, ContactSet};
use crate::core::models::timestep::{AtomRecord, SimulationTimestep};
use serde::Serialize;
use std::collections::HashSet;
use std::io::{self, Write};
use thiserror::Error;

pub const STRUCTURE_FILE_NAME: &str = "structure.csv";
pub const CONTACT_MAP_FILE_NAME: &str = "contactmap.tsv";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),
}

/// One row of `structure.csv`: an atom id and its coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StructureRecord {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<&AtomRecord> for StructureRecord {
    fn from(atom: &AtomRecord) -> Self {
        Self {
            id: atom.id,
            x: atom.position.x,
            y: atom.position.y,
            z: atom.position.z,
        }
    }
}

/// Value written on the diagonal `(x, x)` cells of a contact map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiagonalPolicy {
    #[default]
    Zero,
    /// The largest value present in the table being written.
    MaxObserved,
}

impl DiagonalPolicy {
    pub fn value_for(&self, table: &ContactRecordTable) -> f64 {
        match self {
            Self::Zero => 0.0,
            Self::MaxObserved => table.max_value().unwrap_or(0.0),
        }
    }
}

/// Comma-separated structure table with an `id,x,y,z` header. Image flags are dropped.
pub struct StructureCsv;

impl WriteFormat for StructureCsv {
    type Input = SimulationTimestep;
    type Options = ();
    type Error = OutputError;

    fn write_to(
        input: &Self::Input,
        _options: &Self::Options,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for atom in input.atoms() {
            csv_writer.serialize(StructureRecord::from(atom))?;
        }
        if input.is_empty() {
            csv_writer.write_record(["id", "x", "y", "z"])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Symmetric tab-separated contact map without a header.
///
/// Every record `(x, y, v)` expands into `(x, x, d)`, `(y, y, d)`, `(x, y, v)`
/// and `(y, x, v)`; a cell already written is never written again, so the first
/// value for a cell wins.
pub struct ContactMapTsv;

impl WriteFormat for ContactMapTsv {
    type Input = ContactRecordTable;
    type Options = DiagonalPolicy;
    type Error = OutputError;

    fn write_to(
        input: &Self::Input,
        options: &Self::Options,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let diagonal = options.value_for(input);
        let mut tsv = tsv_writer(writer);
        let mut seen = HashSet::new();

        for record in input {
            let (x, y, v) = (record.bin_x, record.bin_y, record.value);
            for (a, b, value) in [(x, x, diagonal), (y, y, diagonal), (x, y, v), (y, x, v)] {
                if seen.insert((a, b)) {
                    tsv.serialize((a, b, value))?;
                }
            }
        }
        tsv.flush()?;
        Ok(())
    }
}

/// Symmetric tab-separated binary contact map: `(x, y)` and `(y, x)` per pair, deduplicated.
pub struct ContactSetTsv;

impl WriteFormat for ContactSetTsv {
    type Input = ContactSet;
    type Options = ();
    type Error = OutputError;

    fn write_to(
        input: &Self::Input,
        _options: &Self::Options,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let mut tsv = tsv_writer(writer);
        let mut seen = HashSet::new();

        for pair in input.iter() {
            for cell in [(pair.bin_x, pair.bin_y), (pair.bin_y, pair.bin_x)] {
                if seen.insert(cell) {
                    tsv.serialize(cell)?;
                }
            }
        }
        tsv.flush()?;
        Ok(())
    }
}

fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::contact::ContactRecord;
    use nalgebra::Point3;

    fn render<F: WriteFormat>(input: &F::Input, options: &F::Options) -> String
    where
        F::Error: std::fmt::Debug,
    {
        let mut out = Vec::new();
        F::write_to(input, options, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn table(rows: &[(usize, usize, f64)]) -> ContactRecordTable {
        rows.iter()
            .map(|&(x, y, v)| ContactRecord::new(x, y, v))
            .collect()
    }

    #[test]
    fn structure_csv_has_header_and_drops_images() {
        let snapshot = SimulationTimestep::new(vec![
            AtomRecord::new(1, Point3::new(0.5, -1.25, 2.0), [1, 0, 0]),
            AtomRecord::new(2, Point3::new(3.0, 0.0, -0.5), [0, 0, -1]),
        ]);
        let text = render::<StructureCsv>(&snapshot, &());
        assert_eq!(text, "id,x,y,z\n1,0.5,-1.25,2.0\n2,3.0,0.0,-0.5\n");
    }

    #[test]
    fn structure_csv_for_empty_snapshot_is_header_only() {
        let text = render::<StructureCsv>(&SimulationTimestep::new(Vec::new()), &());
        assert_eq!(text, "id,x,y,z\n");
    }

    #[test]
    fn contact_map_expands_and_deduplicates() {
        let text = render::<ContactMapTsv>(
            &table(&[(5, 6, 1.0), (6, 7, 2.0)]),
            &DiagonalPolicy::Zero,
        );
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(
            rows,
            vec![
                "5\t5\t0.0",
                "6\t6\t0.0",
                "5\t6\t1.0",
                "6\t5\t1.0",
                "7\t7\t0.0",
                "6\t7\t2.0",
                "7\t6\t2.0",
            ]
        );
    }

    #[test]
    fn contact_map_first_value_wins_for_repeated_pairs() {
        let text = render::<ContactMapTsv>(
            &table(&[(1, 2, 1.5), (2, 1, 9.0)]),
            &DiagonalPolicy::Zero,
        );
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows, vec!["1\t1\t0.0", "2\t2\t0.0", "1\t2\t1.5", "2\t1\t1.5"]);
    }

    #[test]
    fn contact_map_identical_rows_are_written_once() {
        let text = render::<ContactMapTsv>(
            &table(&[(1, 2, 3.0), (1, 2, 3.0)]),
            &DiagonalPolicy::Zero,
        );
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows, vec!["1\t1\t0.0", "2\t2\t0.0", "1\t2\t3.0", "2\t1\t3.0"]);

        let set = table(&[(1, 2, 3.0), (1, 2, 3.0)]).to_set();
        let text = render::<ContactSetTsv>(&set, &());
        assert_eq!(text, "1\t2\n2\t1\n");
    }

    #[test]
    fn contact_map_max_observed_diagonal() {
        let text = render::<ContactMapTsv>(
            &table(&[(1, 2, 1.5), (3, 4, 2.5)]),
            &DiagonalPolicy::MaxObserved,
        );
        assert!(text.lines().any(|l| l == "1\t1\t2.5"));
        assert!(text.lines().any(|l| l == "4\t4\t2.5"));
        assert!(text.lines().any(|l| l == "1\t2\t1.5"));
    }

    #[test]
    fn contact_set_is_symmetric_and_deduplicated() {
        let set = table(&[(1, 2, 0.0), (2, 1, 0.0), (3, 4, 0.0)]).to_set();
        let text = render::<ContactSetTsv>(&set, &());
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows, vec!["1\t2", "2\t1", "3\t4", "4\t3"]);
    }

    #[test]
    fn empty_contact_map_writes_nothing() {
        let text = render::<ContactMapTsv>(&ContactRecordTable::new(), &DiagonalPolicy::MaxObserved);
        assert!(text.is_empty());
    }

    #[test]
    fn write_to_path_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONTACT_MAP_FILE_NAME);
        ContactMapTsv::write_to_path(&table(&[(1, 3, 2.0)]), &DiagonalPolicy::Zero, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 4);
    }
}
