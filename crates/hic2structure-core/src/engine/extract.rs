use super::config::{ConfigError, ExtractionConfig};
use super::error::{PipelineError, ValidationError};
use crate::core::io::hic::HicMetadata;
use crate::core::models::contact::{ContactRecord, ContactRecordTable};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    None,
    Vc,
    VcSqrt,
    Kr,
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Normalization::None => "NONE",
            Normalization::Vc => "VC",
            Normalization::VcSqrt => "VC_SQRT",
            Normalization::Kr => "KR",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixKind {
    Observed,
    Expected,
    ObservedOverExpected,
}

impl fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatrixKind::Observed => "observed",
            MatrixKind::Expected => "expected",
            MatrixKind::ObservedOverExpected => "oe",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinUnit {
    BasePair,
    Fragment,
}

impl fmt::Display for BinUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinUnit::BasePair => "BP",
            BinUnit::Fragment => "FRAG",
        })
    }
}

/// Parameters of a single matrix-block request against a Hi-C file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactQuery<'a> {
    pub path: &'a Path,
    pub normalization: Normalization,
    pub matrix: MatrixKind,
    pub chrom_a: &'a str,
    pub chrom_b: &'a str,
    pub unit: BinUnit,
    pub resolution: i32,
}

/// A contact as returned by the extraction backend, in genomic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RawContact {
    pub pos_x: i64,
    pub pos_y: i64,
    pub value: f64,
}

impl RawContact {
    pub fn new(pos_x: i64, pos_y: i64, value: f64) -> Self {
        Self {
            pos_x,
            pos_y,
            value,
        }
    }
}

/// Backend that decodes a matrix block of a Hi-C file into raw contacts.
pub trait ContactSource {
    type Error: std::error::Error;

    fn fetch(&self, query: &ContactQuery) -> Result<Vec<RawContact>, Self::Error>;
}

/// Reads a block previously dumped by straw or `juicer_tools dump`.
///
/// The file is tab-separated `binX binY counts` with genomic coordinates and no
/// header; lines starting with `#` are ignored. The query only labels the request,
/// the block itself is whatever the file holds.
#[derive(Debug, Clone)]
pub struct DumpedBlockSource {
    path: PathBuf,
}

impl DumpedBlockSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContactSource for DumpedBlockSource {
    type Error = csv::Error;

    fn fetch(&self, query: &ContactQuery) -> Result<Vec<RawContact>, Self::Error> {
        debug!(
            block = %self.path.display(),
            matrix = %query.matrix,
            normalization = %query.normalization,
            unit = %query.unit,
            "Reading dumped contact block"
        );
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_path(&self.path)?;
        reader.deserialize().collect()
    }
}

/// Validates a request against file metadata and turns raw contacts into particle contacts.
pub struct ContactExtractor<'a, S: ContactSource> {
    metadata: &'a HicMetadata,
    source: S,
}

impl<'a, S: ContactSource> ContactExtractor<'a, S> {
    pub fn new(metadata: &'a HicMetadata, source: S) -> Self {
        Self { metadata, source }
    }

    /// Checks that the request names a known chromosome and a positive, known resolution.
    pub fn validate(&self, config: &ExtractionConfig) -> Result<(), ValidationError> {
        if config.resolution <= 0 {
            return Err(ConfigError::InvalidParameter {
                name: "resolution",
                reason: "must be a positive number of base pairs".to_string(),
            }
            .into());
        }
        if !self.metadata.has_chromosome(&config.chromosome) {
            return Err(ValidationError::UnknownChromosome {
                requested: config.chromosome.clone(),
                available: self.metadata.chromosome_names(),
            });
        }
        if !self.metadata.has_resolution(config.resolution) {
            return Err(ValidationError::UnknownResolution {
                requested: config.resolution,
                available: self.metadata.basepair_resolutions.clone(),
            });
        }
        Ok(())
    }

    /// Fetches the intra-chromosomal KR-normalized observed block and converts it.
    ///
    /// Each genomic position becomes the 1-based particle index
    /// `position / resolution + 1`. Self-contacts and records whose value is not
    /// strictly above `count_threshold` are dropped; source order is kept.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Validation`] for an unknown chromosome or a non-positive or unknown
    /// resolution, and [`PipelineError::Extraction`] if the backend fails, returns
    /// nothing, or yields a negative position.
    #[instrument(skip_all, name = "contact_extraction", fields(chromosome = %config.chromosome, resolution = config.resolution))]
    pub fn extract(
        &self,
        path: &Path,
        config: &ExtractionConfig,
    ) -> Result<ContactRecordTable, PipelineError> {
        self.validate(config)?;

        let query = ContactQuery {
            path,
            normalization: Normalization::Kr,
            matrix: MatrixKind::Observed,
            chrom_a: &config.chromosome,
            chrom_b: &config.chromosome,
            unit: BinUnit::BasePair,
            resolution: config.resolution,
        };
        let raw = self
            .source
            .fetch(&query)
            .map_err(|e| PipelineError::Extraction(e.to_string()))?;
        if raw.is_empty() {
            return Err(PipelineError::Extraction(
                "No contact records found".to_string(),
            ));
        }

        let resolution = i64::from(config.resolution);
        let to_bin = |pos: i64| -> Result<usize, PipelineError> {
            if pos < 0 {
                return Err(PipelineError::Extraction(format!(
                    "Negative genomic position {pos}"
                )));
            }
            usize::try_from(pos / resolution + 1).map_err(|_| {
                PipelineError::Extraction(format!("Genomic position {pos} is out of range"))
            })
        };

        let mut table = ContactRecordTable::new();
        for contact in &raw {
            let record = ContactRecord::new(
                to_bin(contact.pos_x)?,
                to_bin(contact.pos_y)?,
                contact.value,
            );
            if record.value > config.count_threshold && !record.is_self_contact() {
                table.push(record);
            }
        }

        info!(
            fetched = raw.len(),
            kept = table.len(),
            threshold = config.count_threshold,
            "Extracted contact records"
        );
        Ok(table)
    }
}
