use hashbrown::HashSet;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::config::CleanConfig;
use crate::prelude::*;

/// Normalizes and filters gloss annotations.
#[derive(Debug)]
pub(crate) struct Cleaner {
    uppercase: bool,
    rewrites: Vec<(Regex, String)>,
    drop_exact: HashSet<String>,
    drop_prefixes: Vec<String>,
    drop_suffixes: Vec<String>,
    drop_contains: Vec<String>,
    drop_groups: HashSet<String>,
}

impl Cleaner {
    pub(crate) fn from_config(config: &CleanConfig) -> SignprepResult<Self> {
        let rewrites = config
            .rewrites
            .iter()
            .map(|rewrite| {
                Regex::new(&rewrite.pattern)
                    .map(|re| (re, rewrite.replacement.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            uppercase: config.uppercase,
            rewrites,
            drop_exact: config.drop_exact.iter().cloned().collect(),
            drop_prefixes: config.drop_prefixes.clone(),
            drop_suffixes: config.drop_suffixes.clone(),
            drop_contains: config.drop_contains.clone(),
            drop_groups: config.drop_groups.iter().cloned().collect(),
        })
    }

    /// Returns the normalized form of a gloss. The rewrites are applied
    /// in order, each one on the result of its predecessor.
    pub(crate) fn normalize(&self, gloss: &str) -> String {
        let mut gloss: String = gloss.trim().nfc().collect();
        if self.uppercase {
            gloss = gloss.to_uppercase();
        }

        for (re, replacement) in self.rewrites.iter() {
            gloss = re.replace_all(&gloss, replacement.as_str()).into_owned();
        }

        gloss.trim().to_string()
    }

    /// Whether a (normalized) gloss should be kept.
    pub(crate) fn is_wanted(&self, gloss: &str) -> bool {
        !gloss.is_empty()
            && !self.drop_exact.contains(gloss)
            && !self.drop_prefixes.iter().any(|p| gloss.starts_with(p))
            && !self.drop_suffixes.iter().any(|s| gloss.ends_with(s))
            && !self.drop_contains.iter().any(|c| gloss.contains(c.as_str()))
    }

    #[inline]
    pub(crate) fn is_dropped_group(&self, group: &str) -> bool {
        self.drop_groups.contains(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rewrite;

    type TestResult = anyhow::Result<()>;

    fn rewrite(pattern: &str, replacement: &str) -> Rewrite {
        Rewrite {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    fn cleaner() -> SignprepResult<Cleaner> {
        Cleaner::from_config(&CleanConfig {
            uppercase: true,
            rewrites: vec![
                rewrite(r"^\?+$", "<UNK>"),
                rewrite(r"^([^?]*)\?+$", "$1"),
                rewrite(r"\([aA][cC]\)", ""),
                rewrite(r":", "_"),
                rewrite(r"\++$", ""),
                rewrite(r"_+", "_"),
                rewrite(r"_$", ""),
            ],
            drop_exact: vec!["<UNK>".into()],
            drop_prefixes: vec!["G_".into(), "VS_".into()],
            drop_suffixes: vec!["(UNKNOWN)".into()],
            drop_contains: vec!["INDECIPHERABLE".into()],
            drop_groups: vec!["G16n.mov".into()],
            min_count: None,
        })
    }

    #[test]
    fn normalize() -> TestResult {
        let cleaner = cleaner()?;

        assert_eq!(cleaner.normalize("huis"), "HUIS");
        assert_eq!(cleaner.normalize(" boom++ "), "BOOM");
        assert_eq!(cleaner.normalize("???"), "<UNK>");
        assert_eq!(cleaner.normalize("auto?"), "AUTO");
        assert_eq!(cleaner.normalize("ws:gaan(ac)"), "WS_GAAN");
        assert_eq!(cleaner.normalize("a::b_"), "A_B");
        assert_eq!(cleaner.normalize("e\u{301}te\u{301}"), "ÉTÉ");
        Ok(())
    }

    #[test]
    fn is_wanted() -> TestResult {
        let cleaner = cleaner()?;

        assert!(cleaner.is_wanted("HUIS"));
        assert!(!cleaner.is_wanted(""));
        assert!(!cleaner.is_wanted("<UNK>"));
        assert!(!cleaner.is_wanted("G_FLAT"));
        assert!(!cleaner.is_wanted("VS_A"));
        assert!(!cleaner.is_wanted("TREE(UNKNOWN)"));
        assert!(!cleaner.is_wanted("INDECIPHERABLE:1"));
        assert!(cleaner.is_wanted("NG"));
        Ok(())
    }

    #[test]
    fn dropped_groups() -> TestResult {
        let cleaner = cleaner()?;
        assert!(cleaner.is_dropped_group("G16n.mov"));
        assert!(!cleaner.is_dropped_group("G17n.mov"));
        Ok(())
    }

    #[test]
    fn invalid_pattern() {
        let config = CleanConfig {
            rewrites: vec![rewrite("(", "")],
            ..Default::default()
        };

        assert!(matches!(
            Cleaner::from_config(&config),
            Err(SignprepError::Regex(_))
        ));
    }
}
