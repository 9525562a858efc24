//! Dataset assembly and the flat CSV interchange format.
//!
//! The exported file has no header row and no index column; every row is
//! `title,text` with standard CSV quoting.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::{SectionId, SectionRecord, SectionTitles};

/// Ordered `(title, text)` rows ready for export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetTable {
    records: Vec<SectionRecord>,
}

impl DatasetTable {
    pub fn new(records: Vec<SectionRecord>) -> Self { Self { records } }

    pub fn records(&self) -> &[SectionRecord] { &self.records }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)?;
        info!(rows = self.records.len(), path = %path.display(), "dataset exported");
        Ok(())
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        for record in &self.records {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let table = Self::read_from(file)?;
        debug!(rows = table.len(), path = %path.display(), "dataset loaded");
        Ok(table)
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(false).from_reader(reader);
        let records = rdr.deserialize().collect::<std::result::Result<Vec<SectionRecord>, _>>()?;
        Ok(Self { records })
    }
}

/// Join section titles with their normalized texts.
///
/// `theory_records` come first, in the order their headings appear, followed
/// by one record per entry of `titles` in document order. A title whose
/// identifier has no loaded text fails with [`Error::MissingSection`].
pub fn assemble(
    theory_records: Vec<SectionRecord>,
    titles: &SectionTitles,
    texts: &HashMap<SectionId, String>,
) -> Result<DatasetTable> {
    let mut records = theory_records;
    records.reserve(titles.len());
    for (id, title) in titles.iter() {
        let text = texts.get(id).ok_or_else(|| Error::MissingSection(id.to_string()))?;
        records.push(SectionRecord::new(title, text.clone()));
    }
    Ok(DatasetTable::new(records))
}
