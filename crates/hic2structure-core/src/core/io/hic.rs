use crate::core::io::traits::ReadFormat;
use indexmap::IndexMap;
use std::io::{self, BufRead, Read};
use thiserror::Error;

const MAGIC: &[u8; 3] = b"HIC";

/// Header metadata of a `.hic` container.
///
/// Only the leading, sequentially laid out header is decoded. The matrix body
/// (master index, blocks, normalization vectors) is left to the extraction backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HicMetadata {
    pub version: i32,
    pub master_index: i64,
    pub genome_id: String,
    pub nvi: Option<i64>,
    pub nvi_size: Option<i64>,
    pub attributes: IndexMap<String, String>,
    pub chromosomes: IndexMap<String, i64>, // name -> length, in header order
    pub basepair_resolutions: Vec<i32>,
    pub fragment_resolutions: Vec<i32>,
}

impl HicMetadata {
    pub fn chromosome_names(&self) -> Vec<String> {
        self.chromosomes.keys().cloned().collect()
    }

    pub fn chromosome_length(&self, name: &str) -> Option<i64> {
        self.chromosomes.get(name).copied()
    }

    pub fn has_chromosome(&self, name: &str) -> bool {
        self.chromosomes.contains_key(name)
    }

    pub fn has_resolution(&self, resolution: i32) -> bool {
        self.basepair_resolutions.contains(&resolution)
    }
}

#[derive(Debug, Error)]
pub enum HicError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Incorrect magic string: expected 'HIC', found {found:?}")]
    BadMagic { found: Vec<u8> },
    #[error("Unexpected end of file while reading {field}")]
    Truncated { field: &'static str },
    #[error("Field {field} is not valid UTF-8")]
    InvalidText { field: &'static str },
    #[error("Field {field} has negative count {count}")]
    NegativeCount { field: &'static str, count: i32 },
}

/// Upper bound on capacity reserved up front for a count read from the file.
const MAX_PREALLOCATED: usize = 1024;

pub struct HicHeader;

impl ReadFormat for HicHeader {
    type Output = HicMetadata;
    type Error = HicError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Output, Self::Error> {
        let mut r = FieldReader { inner: reader };

        let magic: [u8; 4] = r.read_array("magic string")?;
        if &magic[..3] != MAGIC {
            return Err(HicError::BadMagic {
                found: magic[..3].to_vec(),
            });
        }

        let version = r.read_i32("version")?;
        let master_index = r.read_i64("master index")?;
        let genome_id = r.read_cstring("genome id")?;

        let (nvi, nvi_size) = if version > 8 {
            (
                Some(r.read_i64("normalization vector index")?),
                Some(r.read_i64("normalization vector index size")?),
            )
        } else {
            (None, None)
        };

        let attribute_count = r.read_count("attribute count")?;
        let mut attributes = IndexMap::with_capacity(attribute_count.min(MAX_PREALLOCATED));
        for _ in 0..attribute_count {
            let key = r.read_cstring("attribute key")?;
            let value = r.read_cstring("attribute value")?;
            attributes.insert(key, value);
        }

        let chromosome_count = r.read_count("chromosome count")?;
        let mut chromosomes = IndexMap::with_capacity(chromosome_count.min(MAX_PREALLOCATED));
        for _ in 0..chromosome_count {
            let name = r.read_cstring("chromosome name")?;
            let length = if version > 8 {
                r.read_i64("chromosome length")?
            } else {
                i64::from(r.read_i32("chromosome length")?)
            };
            chromosomes.insert(name, length);
        }

        let basepair_resolutions = r.read_i32_list("base-pair resolution")?;
        let fragment_resolutions = r.read_i32_list("fragment resolution")?;

        Ok(HicMetadata {
            version,
            master_index,
            genome_id,
            nvi,
            nvi_size,
            attributes,
            chromosomes,
            basepair_resolutions,
            fragment_resolutions,
        })
    }
}

/// Little-endian field reader that names the field on premature end of input.
struct FieldReader<'a, R: Read> {
    inner: &'a mut R,
}

impl<R: Read> FieldReader<'_, R> {
    fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], HicError> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => HicError::Truncated { field },
            _ => HicError::Io(e),
        })?;
        Ok(buf)
    }

    fn read_i32(&mut self, field: &'static str) -> Result<i32, HicError> {
        self.read_array(field).map(i32::from_le_bytes)
    }

    fn read_i64(&mut self, field: &'static str) -> Result<i64, HicError> {
        self.read_array(field).map(i64::from_le_bytes)
    }

    fn read_count(&mut self, field: &'static str) -> Result<usize, HicError> {
        let count = self.read_i32(field)?;
        usize::try_from(count).map_err(|_| HicError::NegativeCount { field, count })
    }

    fn read_i32_list(&mut self, field: &'static str) -> Result<Vec<i32>, HicError> {
        let count = self.read_count(field)?;
        let mut values = Vec::with_capacity(count.min(MAX_PREALLOCATED));
        for _ in 0..count {
            values.push(self.read_i32(field)?);
        }
        Ok(values)
    }

    fn read_cstring(&mut self, field: &'static str) -> Result<String, HicError> {
        let mut buf = Vec::new();
        loop {
            let [byte] = self.read_array::<1>(field)?;
            if byte == 0 {
                break;
            }
            buf.push(byte);
        }
        String::from_utf8(buf).map_err(|_| HicError::InvalidText { field })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    /// Builds a header byte stream with the given version and contents.
    pub(crate) fn header_bytes(
        version: i32,
        chromosomes: &[(&str, i64)],
        bp_resolutions: &[i32],
        frag_resolutions: &[i32],
    ) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"HIC\0");
        out.extend_from_slice(&version.to_le_bytes());
        out.extend_from_slice(&1234i64.to_le_bytes());
        out.extend_from_slice(b"hg19\0");
        if version > 8 {
            out.extend_from_slice(&99i64.to_le_bytes());
            out.extend_from_slice(&7i64.to_le_bytes());
        }
        out.extend_from_slice(&1i32.to_le_bytes());
        out.extend_from_slice(b"software\0juicer\0");
        out.extend_from_slice(&(chromosomes.len() as i32).to_le_bytes());
        for (name, length) in chromosomes {
            out.extend_from_slice(name.as_bytes());
            out.push(0);
            if version > 8 {
                out.extend_from_slice(&length.to_le_bytes());
            } else {
                out.extend_from_slice(&(*length as i32).to_le_bytes());
            }
        }
        out.extend_from_slice(&(bp_resolutions.len() as i32).to_le_bytes());
        for res in bp_resolutions {
            out.extend_from_slice(&res.to_le_bytes());
        }
        out.extend_from_slice(&(frag_resolutions.len() as i32).to_le_bytes());
        for res in frag_resolutions {
            out.extend_from_slice(&res.to_le_bytes());
        }
        out
    }

    fn parse(bytes: Vec<u8>) -> Result<HicMetadata, HicError> {
        HicHeader::read_from(&mut Cursor::new(bytes))
    }

    #[test]
    fn parses_version_8_header() {
        let bytes = header_bytes(
            8,
            &[("All", 3000), ("X", 155_270_560), ("2L", 23_011_544)],
            &[2_500_000, 250_000],
            &[500],
        );
        let meta = parse(bytes).unwrap();

        assert_eq!(meta.version, 8);
        assert_eq!(meta.master_index, 1234);
        assert_eq!(meta.genome_id, "hg19");
        assert_eq!(meta.nvi, None);
        assert_eq!(meta.nvi_size, None);
        assert_eq!(meta.attributes.get("software").map(String::as_str), Some("juicer"));
        assert_eq!(meta.chromosome_names(), vec!["All", "X", "2L"]);
        assert_eq!(meta.chromosome_length("X"), Some(155_270_560));
        assert_eq!(meta.basepair_resolutions, vec![2_500_000, 250_000]);
        assert_eq!(meta.fragment_resolutions, vec![500]);
        assert!(meta.has_resolution(250_000));
        assert!(!meta.has_resolution(100));
    }

    #[test]
    fn parses_version_9_header_with_wide_lengths_and_nvi() {
        let bytes = header_bytes(9, &[("chr1", 5_000_000_000)], &[1000], &[]);
        let meta = parse(bytes).unwrap();
        assert_eq!(meta.nvi, Some(99));
        assert_eq!(meta.nvi_size, Some(7));
        assert_eq!(meta.chromosome_length("chr1"), Some(5_000_000_000));
        assert!(meta.fragment_resolutions.is_empty());
    }

    #[test]
    fn trailing_matrix_data_is_ignored() {
        let mut bytes = header_bytes(8, &[("X", 100)], &[250_000], &[]);
        bytes.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        assert!(parse(bytes).is_ok());
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut bytes = header_bytes(8, &[("X", 100)], &[250_000], &[]);
        bytes[0] = b'B';
        match parse(bytes) {
            Err(HicError::BadMagic { found }) => assert_eq!(found, b"BIC".to_vec()),
            other => panic!("expected BadMagic, got {:?}", other),
        }
    }

    #[test]
    fn unterminated_genome_id_is_a_truncation_error() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"HIC\0");
        bytes.extend_from_slice(&8i32.to_le_bytes());
        bytes.extend_from_slice(&0i64.to_le_bytes());
        bytes.extend_from_slice(b"hg1");
        assert!(matches!(
            parse(bytes),
            Err(HicError::Truncated { field: "genome id" })
        ));
    }

    #[test]
    fn truncation_in_resolution_list_names_the_field() {
        let mut bytes = header_bytes(8, &[("X", 100)], &[250_000, 500_000], &[]);
        // Cut into the second base-pair resolution.
        let cut = bytes.len() - 4 - 2;
        bytes.truncate(cut);
        assert!(matches!(
            parse(bytes),
            Err(HicError::Truncated {
                field: "base-pair resolution"
            })
        ));
    }

    #[test]
    fn empty_input_is_a_truncation_error() {
        assert!(matches!(
            parse(Vec::new()),
            Err(HicError::Truncated {
                field: "magic string"
            })
        ));
    }

    #[test]
    fn negative_count_is_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"HIC\0");
        bytes.extend_from_slice(&8i32.to_le_bytes());
        bytes.extend_from_slice(&0i64.to_le_bytes());
        bytes.extend_from_slice(b"g\0");
        bytes.extend_from_slice(&(-1i32).to_le_bytes());
        assert!(matches!(
            parse(bytes),
            Err(HicError::NegativeCount { count: -1, .. })
        ));
    }

    #[test]
    fn oversized_count_on_short_input_is_truncated() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"HIC\0");
        bytes.extend_from_slice(&8i32.to_le_bytes());
        bytes.extend_from_slice(&0i64.to_le_bytes());
        bytes.extend_from_slice(b"g\0");
        bytes.extend_from_slice(&i32::MAX.to_le_bytes());
        assert!(matches!(
            parse(bytes),
            Err(HicError::Truncated {
                field: "attribute key"
            })
        ));

        let mut bytes = header_bytes(8, &[("X", 1000)], &[], &[]);
        let tail = bytes.len() - 8;
        bytes.truncate(tail);
        bytes.extend_from_slice(&i32::MAX.to_le_bytes());
        assert!(matches!(
            parse(bytes),
            Err(HicError::Truncated {
                field: "base-pair resolution"
            })
        ));
    }

    #[test]
    fn invalid_utf8_in_chromosome_name_is_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"HIC\0");
        bytes.extend_from_slice(&8i32.to_le_bytes());
        bytes.extend_from_slice(&0i64.to_le_bytes());
        bytes.extend_from_slice(b"g\0");
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(&[0xff, 0xfe, 0x00]);
        assert!(matches!(
            parse(bytes),
            Err(HicError::InvalidText {
                field: "chromosome name"
            })
        ));
    }

    #[test]
    fn read_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.hic");
        std::fs::write(&path, header_bytes(8, &[("X", 100)], &[250_000], &[])).unwrap();
        let meta = HicHeader::read_from_path(&path).unwrap();
        assert!(meta.has_chromosome("X"));
    }
}
