use serde::Serialize;

/// A single contact between two particles (or genomic bins).
///
/// Bin indices are 1-based particle ids. For records extracted from a Hi-C file
/// the value is the normalized contact count; for records derived from a
/// simulated structure it is the spatial distance between the two atoms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContactRecord {
    pub bin_x: usize,
    pub bin_y: usize,
    pub value: f64,
}

impl ContactRecord {
    pub fn new(bin_x: usize, bin_y: usize, value: f64) -> Self {
        Self {
            bin_x,
            bin_y,
            value,
        }
    }

    pub fn is_self_contact(&self) -> bool {
        self.bin_x == self.bin_y
    }

    pub fn pair(&self) -> ContactPair {
        ContactPair {
            bin_x: self.bin_x,
            bin_y: self.bin_y,
        }
    }
}

/// A contact with its value dropped, used for binary (connectivity-only) maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ContactPair {
    pub bin_x: usize,
    pub bin_y: usize,
}

/// An ordered table of contact records. Row order is significant and preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactRecordTable {
    records: Vec<ContactRecord>,
}

impl ContactRecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ContactRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ContactRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContactRecord> {
        self.records.iter()
    }

    /// Largest particle index referenced by either column, or `None` for an empty table.
    pub fn max_index(&self) -> Option<usize> {
        self.records
            .iter()
            .map(|r| r.bin_x.max(r.bin_y))
            .max()
    }

    /// Largest value in the table. NaN values are ignored.
    pub fn max_value(&self) -> Option<f64> {
        self.records
            .iter()
            .map(|r| r.value)
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                Some(m) if m >= v => Some(m),
                _ => Some(v),
            })
    }

    pub fn to_set(&self) -> ContactSet {
        ContactSet {
            pairs: self.records.iter().map(ContactRecord::pair).collect(),
        }
    }
}

impl From<Vec<ContactRecord>> for ContactRecordTable {
    fn from(records: Vec<ContactRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<ContactRecord> for ContactRecordTable {
    fn from_iter<I: IntoIterator<Item = ContactRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ContactRecordTable {
    type Item = &'a ContactRecord;
    type IntoIter = std::slice::Iter<'a, ContactRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A contact table without values, in the same row order as its source table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactSet {
    pairs: Vec<ContactPair>,
}

impl ContactSet {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[ContactPair] {
        &self.pairs
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContactPair> {
        self.pairs.iter()
    }
}

impl FromIterator<ContactPair> for ContactSet {
    fn from_iter<I: IntoIterator<Item = ContactPair>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}
