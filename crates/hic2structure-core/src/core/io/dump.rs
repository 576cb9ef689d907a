use crate::core::io::traits::ReadFormat;
use crate::core::models::timestep::{AtomRecord, SimulationTimestep, Timeseries};
use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;

pub const TIMESTEP_MARKER: &str = "ITEM: TIMESTEP";
pub const ATOMS_MARKER: &str = "ITEM: ATOMS";
pub const ATOMS_COLUMNS: &str = "id x y z ix iy iz";

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: DumpParseErrorKind },
    #[error("Missing '{marker}' marker{}", .after.map(|t| format!(" in block for timestep {t}")).unwrap_or_default())]
    MissingMarker {
        marker: &'static str,
        after: Option<u64>,
    },
    #[error("Unsupported atom columns on line {line}: expected 'id x y z ix iy iz', found '{found}'")]
    UnsupportedColumns { line: usize, found: String },
}

#[derive(Debug, Error)]
pub enum DumpParseErrorKind {
    #[error("Invalid timestep value '{0}'")]
    InvalidTimestep(String),
    #[error("Expected 7 fields per atom line, found {0}")]
    FieldCount(usize),
    #[error("Invalid integer in column '{column}' (value: '{value}')")]
    InvalidInt { column: &'static str, value: String },
    #[error("Invalid float in column '{column}' (value: '{value}')")]
    InvalidFloat { column: &'static str, value: String },
    #[error("Unexpected '{0}' inside atom table")]
    UnexpectedItem(String),
}

enum Section {
    Start,
    TimestepValue,
    Header { timestep: u64 },
    Atoms { timestep: u64, atoms: Vec<AtomRecord> },
}

/// LAMMPS `dump custom` trajectory with columns `id x y z ix iy iz`.
pub struct DumpFile;

impl ReadFormat for DumpFile {
    type Output = Timeseries;
    type Error = DumpError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Output, Self::Error> {
        let mut series = Timeseries::new();
        let mut section = Section::Start;

        for (line_num, line_res) in reader.lines().enumerate() {
            let raw = line_res?;
            let line_num = line_num + 1;
            let line = raw.trim();

            if line == TIMESTEP_MARKER {
                section = match section {
                    Section::Start => Section::TimestepValue,
                    Section::TimestepValue => {
                        return Err(DumpError::Parse {
                            line: line_num,
                            kind: DumpParseErrorKind::InvalidTimestep(line.to_string()),
                        });
                    }
                    Section::Header { timestep } => {
                        return Err(DumpError::MissingMarker {
                            marker: ATOMS_MARKER,
                            after: Some(timestep),
                        });
                    }
                    Section::Atoms { timestep, atoms } => {
                        series.insert(timestep, SimulationTimestep::new(atoms));
                        Section::TimestepValue
                    }
                };
                continue;
            }
            if line.is_empty() {
                continue;
            }

            section = match section {
                Section::Start => {
                    return Err(DumpError::MissingMarker {
                        marker: TIMESTEP_MARKER,
                        after: None,
                    });
                }
                Section::TimestepValue => {
                    let timestep = line.parse::<u64>().map_err(|_| DumpError::Parse {
                        line: line_num,
                        kind: DumpParseErrorKind::InvalidTimestep(line.to_string()),
                    })?;
                    Section::Header { timestep }
                }
                Section::Header { timestep } => match line.strip_prefix(ATOMS_MARKER) {
                    Some(columns) => {
                        let columns = columns.split_whitespace().collect::<Vec<_>>().join(" ");
                        if columns != ATOMS_COLUMNS {
                            return Err(DumpError::UnsupportedColumns {
                                line: line_num,
                                found: columns,
                            });
                        }
                        Section::Atoms {
                            timestep,
                            atoms: Vec::new(),
                        }
                    }
                    // NUMBER OF ATOMS, BOX BOUNDS and their values.
                    None => Section::Header { timestep },
                },
                Section::Atoms {
                    timestep,
                    mut atoms,
                } => {
                    if line.starts_with("ITEM:") {
                        return Err(DumpError::Parse {
                            line: line_num,
                            kind: DumpParseErrorKind::UnexpectedItem(line.to_string()),
                        });
                    }
                    atoms.push(parse_atom_line(line, line_num)?);
                    Section::Atoms { timestep, atoms }
                }
            };
        }

        match section {
            Section::Start => Err(DumpError::MissingMarker {
                marker: TIMESTEP_MARKER,
                after: None,
            }),
            Section::TimestepValue => Err(DumpError::MissingMarker {
                marker: "timestep value",
                after: None,
            }),
            Section::Header { timestep } => Err(DumpError::MissingMarker {
                marker: ATOMS_MARKER,
                after: Some(timestep),
            }),
            Section::Atoms { timestep, atoms } => {
                series.insert(timestep, SimulationTimestep::new(atoms));
                Ok(series)
            }
        }
    }
}

fn parse_atom_line(line: &str, line_num: usize) -> Result<AtomRecord, DumpError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 7 {
        return Err(DumpError::Parse {
            line: line_num,
            kind: DumpParseErrorKind::FieldCount(fields.len()),
        });
    }

    let int = |idx: usize, column: &'static str| -> Result<i64, DumpError> {
        fields[idx].parse().map_err(|_| DumpError::Parse {
            line: line_num,
            kind: DumpParseErrorKind::InvalidInt {
                column,
                value: fields[idx].to_string(),
            },
        })
    };
    let float = |idx: usize, column: &'static str| -> Result<f64, DumpError> {
        fields[idx].parse().map_err(|_| DumpError::Parse {
            line: line_num,
            kind: DumpParseErrorKind::InvalidFloat {
                column,
                value: fields[idx].to_string(),
            },
        })
    };
    let image = |idx: usize, column: &'static str| -> Result<i32, DumpError> {
        let value = int(idx, column)?;
        i32::try_from(value).map_err(|_| DumpError::Parse {
            line: line_num,
            kind: DumpParseErrorKind::InvalidInt {
                column,
                value: fields[idx].to_string(),
            },
        })
    };

    let id = int(0, "id")?;
    let id = usize::try_from(id).map_err(|_| DumpError::Parse {
        line: line_num,
        kind: DumpParseErrorKind::InvalidInt {
            column: "id",
            value: fields[0].to_string(),
        },
    })?;

    Ok(AtomRecord::new(
        id,
        Point3::new(float(1, "x")?, float(2, "y")?, float(3, "z")?),
        [image(4, "ix")?, image(5, "iy")?, image(6, "iz")?],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(text: &str) -> Result<Timeseries, DumpError> {
        DumpFile::read_from(&mut Cursor::new(text.as_bytes()))
    }

    const TWO_BLOCKS: &str = "\
ITEM: TIMESTEP
0
ITEM: NUMBER OF ATOMS
3
ITEM: BOX BOUNDS pp pp pp
-200.0 200.0
-200.0 200.0
-200.0 200.0
ITEM: ATOMS id x y z ix iy iz
1 0.00000 0.00000 0.00000 0 0 0
2 3.00000 0.00000 0.00000 0 0 0
3 3.00000 3.00000 0.00000 0 0 0
ITEM: TIMESTEP
1000
ITEM: NUMBER OF ATOMS
3
ITEM: BOX BOUNDS pp pp pp
-200.0 200.0
-200.0 200.0
-200.0 200.0
ITEM: ATOMS id x y z ix iy iz
1 0.10000 -0.20000 0.30000 0 0 -1
2 1.12000 0.00000 0.00000 1 0 0
3 1.50000 0.90000 0.05000 0 0 0
";

    #[test]
    fn reads_two_consecutive_blocks() {
        let series = read(TWO_BLOCKS).unwrap();
        assert_eq!(series.timesteps().collect::<Vec<_>>(), vec![0, 1000]);

        let first = series.get(0).unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first.ids().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(first.atoms()[2].position, Point3::new(3.0, 3.0, 0.0));

        let last = series.get(1000).unwrap();
        assert_eq!(last.len(), 3);
        assert_eq!(last.atoms()[0].position, Point3::new(0.1, -0.2, 0.3));
        assert_eq!(last.atoms()[0].image, [0, 0, -1]);
        assert_eq!(last.atoms()[1].image, [1, 0, 0]);
    }

    #[test]
    fn minimal_blocks_without_header_items_are_accepted() {
        let text = "ITEM: TIMESTEP\n5\nITEM: ATOMS id x y z ix iy iz\n7 1.5 2.5 3.5 0 0 0\n";
        let series = read(text).unwrap();
        let (step, snapshot) = series.final_timestep().unwrap();
        assert_eq!(step, 5);
        assert_eq!(snapshot.atoms()[0].id, 7);
    }

    #[test]
    fn final_timestep_is_largest_key_even_when_out_of_order() {
        let text = "\
ITEM: TIMESTEP
2000
ITEM: ATOMS id x y z ix iy iz
1 0 0 0 0 0 0
ITEM: TIMESTEP
1000
ITEM: ATOMS id x y z ix iy iz
1 1 1 1 0 0 0
";
        let series = read(text).unwrap();
        assert_eq!(series.final_timestep().map(|(k, _)| k), Some(2000));
    }

    #[test]
    fn missing_atoms_header_is_reported() {
        let text = "ITEM: TIMESTEP\n0\nITEM: NUMBER OF ATOMS\n3\nITEM: TIMESTEP\n1000\n";
        assert!(matches!(
            read(text),
            Err(DumpError::MissingMarker {
                marker: ATOMS_MARKER,
                after: Some(0)
            })
        ));
    }

    #[test]
    fn data_before_first_timestep_marker_is_reported() {
        let text = "1 0 0 0 0 0 0\nITEM: TIMESTEP\n0\n";
        assert!(matches!(
            read(text),
            Err(DumpError::MissingMarker {
                marker: TIMESTEP_MARKER,
                ..
            })
        ));
    }

    #[test]
    fn empty_input_is_reported() {
        assert!(matches!(read(""), Err(DumpError::MissingMarker { .. })));
    }

    #[test]
    fn trailing_timestep_marker_without_value_is_reported() {
        let text = "ITEM: TIMESTEP\n0\nITEM: ATOMS id x y z ix iy iz\n1 0 0 0 0 0 0\nITEM: TIMESTEP\n";
        assert!(matches!(
            read(text),
            Err(DumpError::MissingMarker {
                marker: "timestep value",
                ..
            })
        ));
    }

    #[test]
    fn wrong_column_layout_is_rejected() {
        let text = "ITEM: TIMESTEP\n0\nITEM: ATOMS id type x y z\n";
        assert!(matches!(
            read(text),
            Err(DumpError::UnsupportedColumns { line: 3, .. })
        ));
    }

    #[test]
    fn malformed_atom_lines_report_line_and_column() {
        let short = "ITEM: TIMESTEP\n0\nITEM: ATOMS id x y z ix iy iz\n1 0 0 0 0 0\n";
        assert!(matches!(
            read(short),
            Err(DumpError::Parse {
                line: 4,
                kind: DumpParseErrorKind::FieldCount(6)
            })
        ));

        let bad_float = "ITEM: TIMESTEP\n0\nITEM: ATOMS id x y z ix iy iz\n1 0 abc 0 0 0 0\n";
        assert!(matches!(
            read(bad_float),
            Err(DumpError::Parse {
                line: 4,
                kind: DumpParseErrorKind::InvalidFloat { column: "y", .. }
            })
        ));

        let bad_id = "ITEM: TIMESTEP\n0\nITEM: ATOMS id x y z ix iy iz\n1.5 0 0 0 0 0 0\n";
        assert!(matches!(
            read(bad_id),
            Err(DumpError::Parse {
                kind: DumpParseErrorKind::InvalidInt { column: "id", .. },
                ..
            })
        ));
    }

    #[test]
    fn invalid_timestep_value_is_rejected() {
        let text = "ITEM: TIMESTEP\nlater\n";
        assert!(matches!(
            read(text),
            Err(DumpError::Parse {
                line: 2,
                kind: DumpParseErrorKind::InvalidTimestep(_)
            })
        ));
    }
}
