use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use hashbrown::HashMap;

use crate::prelude::*;

/// A bidirectional mapping between free-form strings (glosses,
/// participants) and dense, 0-based integer codes.
///
/// Codes are assigned in sorted order of the values, which makes the
/// encoding independent of the row order of the input.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct LabelEncoder {
    classes: Vec<String>,
    codes: HashMap<String, u32>,
}

impl LabelEncoder {
    /// Creates an encoder over the distinct values of `values`.
    pub(crate) fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let classes: BTreeSet<&str> = values.into_iter().collect();
        Self::from_classes(classes.into_iter().map(String::from).collect())
    }

    fn from_classes(classes: Vec<String>) -> Self {
        let codes = classes
            .iter()
            .enumerate()
            .map(|(code, class)| (class.clone(), code as u32))
            .collect();

        Self { classes, codes }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    pub(crate) fn encode(&self, value: &str) -> Option<u32> {
        self.codes.get(value).copied()
    }

    #[inline]
    pub(crate) fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    /// Encodes every value or fails on the first unknown value.
    pub(crate) fn transform<'a, I>(
        &self,
        values: I,
    ) -> SignprepResult<Vec<u32>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        values
            .into_iter()
            .map(|value| match self.encode(value) {
                Some(code) => Ok(code),
                None => bail!("unknown class '{value}'"),
            })
            .collect()
    }

    /// Returns the mapping from code to the original value.
    pub(crate) fn mapping(&self) -> BTreeMap<u32, &str> {
        self.classes
            .iter()
            .enumerate()
            .map(|(code, class)| (code as u32, class.as_str()))
            .collect()
    }

    /// Writes the mapping as a JSON object (`{"0": "HOUSE", ...}`).
    pub(crate) fn save<P: AsRef<Path>>(&self, path: P) -> SignprepResult<()> {
        let mut out = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut out, &self.mapping())?;
        out.flush()?;
        Ok(())
    }

    /// Loads a mapping written by [LabelEncoder::save]. The codes must
    /// be dense and start at 0.
    pub(crate) fn load<P: AsRef<Path>>(path: P) -> SignprepResult<Self> {
        let rdr = BufReader::new(File::open(path)?);
        let mapping: BTreeMap<u32, String> = serde_json::from_reader(rdr)?;

        let mut classes = Vec::with_capacity(mapping.len());
        for (expected, (code, class)) in mapping.into_iter().enumerate() {
            if code as usize != expected {
                bail!("invalid mapping: expected code {expected}, got {code}");
            }

            classes.push(class);
        }

        let encoder = Self::from_classes(classes);
        if encoder.codes.len() != encoder.classes.len() {
            bail!("invalid mapping: classes are not unique");
        }

        Ok(encoder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn fit_sorted_and_dense() {
        let encoder = LabelEncoder::fit(["TREE", "HOUSE", "CAR", "HOUSE"]);
        assert_eq!(encoder.len(), 3);
        assert_eq!(encoder.encode("CAR"), Some(0));
        assert_eq!(encoder.encode("HOUSE"), Some(1));
        assert_eq!(encoder.encode("TREE"), Some(2));
        assert_eq!(encoder.encode("BOAT"), None);
        assert_eq!(encoder.decode(3), None);
    }

    #[test]
    fn round_trip() {
        let encoder =
            LabelEncoder::fit(["p3", "p1", "p2", "p10", "p1", "p2"]);

        for code in 0..encoder.len() as u32 {
            let value = encoder.decode(code).unwrap();
            assert_eq!(encoder.encode(value), Some(code));
        }

        for value in ["p1", "p2", "p3", "p10"] {
            let code = encoder.encode(value).unwrap();
            assert_eq!(encoder.decode(code), Some(value));
        }
    }

    #[test]
    fn fit_is_order_independent() {
        assert_eq!(
            LabelEncoder::fit(["B", "A", "C"]),
            LabelEncoder::fit(["C", "B", "A", "A"])
        );
    }

    #[test]
    fn transform() -> TestResult {
        let encoder = LabelEncoder::fit(["B", "A"]);
        assert_eq!(encoder.transform(["A", "B", "A"])?, vec![0, 1, 0]);
        assert!(encoder.transform(["A", "Z"]).is_err());
        Ok(())
    }

    #[test]
    fn save_and_load() -> TestResult {
        let path = std::env::temp_dir().join(format!(
            "signprep-encoder-{}.json",
            std::process::id()
        ));

        let encoder = LabelEncoder::fit(["WATER", "BREAD", "MILK"]);
        encoder.save(&path)?;

        let content = std::fs::read_to_string(&path)?;
        let json: serde_json::Value = serde_json::from_str(&content)?;
        assert_eq!(json["0"], "BREAD");
        assert_eq!(json["2"], "WATER");

        assert_eq!(LabelEncoder::load(&path)?, encoder);
        std::fs::remove_file(path)?;
        Ok(())
    }
}
