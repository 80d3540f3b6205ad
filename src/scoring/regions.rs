use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum RegionTableError {
    #[error("failed to read region reference table {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid region reference data: {0}")]
    Csv(#[from] csv::Error),
}

/// Six-digit identity prefix to region name. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct RegionCodeTable {
    names: HashMap<String, String>,
    available: bool,
}

#[derive(Debug, Deserialize)]
struct RegionRow {
    number: String,
    name: String,
}

impl RegionCodeTable {
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            names: entries
                .into_iter()
                .map(|(code, name)| (code.into(), name.into()))
                .collect(),
            available: true,
        }
    }

    /// Empty table used when the reference file could not be loaded.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RegionTableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut names = HashMap::new();

        for row in csv_reader.deserialize::<RegionRow>() {
            let RegionRow { number, name } = row?;
            if number.is_empty() || name.is_empty() {
                continue;
            }
            names.insert(number, name);
        }

        Ok(Self {
            names,
            available: true,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RegionTableError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| RegionTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file)?;
        info!(path = %path.display(), regions = table.len(), "region reference table loaded");
        Ok(table)
    }

    /// Loads the table, or degrades to an unavailable table with a single
    /// warning when the file is optional.
    pub fn load_or_degrade<P: AsRef<Path>>(path: P, required: bool) -> Result<Self, RegionTableError> {
        match Self::load(path) {
            Ok(table) => Ok(table),
            Err(err) if !required => {
                warn!(error = %err, "region reference data unavailable; region consistency will not score");
                Ok(Self::unavailable())
            }
            Err(err) => Err(err),
        }
    }

    pub fn lookup(&self, prefix: &str) -> Option<&str> {
        self.names.get(prefix).map(String::as_str)
    }

    pub fn available(&self) -> bool {
        self.available
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reader_keeps_codes_as_text() {
        let table = RegionCodeTable::from_reader(Cursor::new(
            "number,name\n110105,北京市朝阳区\n010101,测试\n,空\n",
        ))
        .expect("table parses");

        assert!(table.available());
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("110105"), Some("北京市朝阳区"));
        assert_eq!(table.lookup("010101"), Some("测试"));
        assert_eq!(table.lookup("999999"), None);
    }

    #[test]
    fn leading_byte_order_mark_does_not_hide_headers() {
        let table = RegionCodeTable::from_reader(Cursor::new(
            "\u{feff}number,name\n110105,北京\n",
        ))
        .expect("table parses");
        assert_eq!(table.lookup("110105"), Some("北京"));
    }

    #[test]
    fn later_rows_override_duplicate_codes() {
        let table = RegionCodeTable::from_reader(Cursor::new(
            "number,name\n110105,旧名\n110105,北京\n",
        ))
        .expect("table parses");
        assert_eq!(table.lookup("110105"), Some("北京"));
    }

    #[test]
    fn optional_table_degrades_when_missing() {
        let table = RegionCodeTable::load_or_degrade("./no-such-id-card.csv", false)
            .expect("optional table degrades");
        assert!(!table.available());
        assert!(table.is_empty());
        assert_eq!(table.lookup("110105"), None);
    }

    #[test]
    fn required_table_fails_when_missing() {
        let error = RegionCodeTable::load_or_degrade("./no-such-id-card.csv", true)
            .expect_err("required table must exist");
        match error {
            RegionTableError::Io { path, .. } => {
                assert_eq!(path, PathBuf::from("./no-such-id-card.csv"))
            }
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
