//! Corpus cleaning applied before training.
//!
//! Cleaning is line-wise: optional Unicode normalization (off by default, so
//! precomposed nukta letters are kept as written), removal of every character
//! outside ASCII letters and digits, the Devanagari block and whitespace,
//! then whitespace runs collapse to one space and the line is trimmed.
//! The tokenizer never cleans implicitly; callers opt in.

use log::info;
use shabda_core::{Result, TokenizerError};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

/// Normalization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationForm {
    /// Canonical composition
    NFC,
    /// Canonical decomposition
    NFD,
    /// Compatibility composition
    NFKC,
    /// Compatibility decomposition
    NFKD,
    /// No normalization
    #[default]
    None,
}

impl NormalizationForm {
    /// Normalize text.
    pub fn apply(self, text: &str) -> String {
        match self {
            NormalizationForm::NFC => text.nfc().collect(),
            NormalizationForm::NFD => text.nfd().collect(),
            NormalizationForm::NFKC => text.nfkc().collect(),
            NormalizationForm::NFKD => text.nfkd().collect(),
            NormalizationForm::None => text.to_string(),
        }
    }
}

/// Devanagari block, U+0900..=U+097F.
const DEVANAGARI: std::ops::RangeInclusive<char> = '\u{0900}'..='\u{097F}';

/// Whether a character survives cleaning.
#[inline]
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || DEVANAGARI.contains(&c) || c.is_whitespace()
}

/// Line counts from [`CorpusCleaner::clean_file`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    /// Lines read from the input
    pub lines: usize,
    /// Lines that were empty after cleaning
    pub empty_lines: usize,
    /// Characters removed by the filter
    pub removed_chars: usize,
}

/// Line-wise corpus cleaner.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorpusCleaner {
    normalization: NormalizationForm,
}

impl CorpusCleaner {
    /// Create a cleaner with the given normalization form.
    pub fn new(normalization: NormalizationForm) -> Self {
        Self { normalization }
    }

    pub fn normalization(&self) -> NormalizationForm {
        self.normalization
    }

    /// Clean a single line.
    pub fn clean_line(&self, line: &str) -> String {
        self.clean_line_counted(line).0
    }

    fn clean_line_counted(&self, line: &str) -> (String, usize) {
        let normalized = self.normalization.apply(line);
        let mut removed = 0;
        let filtered: String = normalized
            .chars()
            .filter(|&c| {
                let keep = is_allowed_char(c);
                if !keep {
                    removed += 1;
                }
                keep
            })
            .collect();

        let cleaned = filtered.split_whitespace().collect::<Vec<_>>().join(" ");
        (cleaned, removed)
    }

    /// Clean every line of an iterator. Empty results are kept.
    pub fn clean_lines<'a, I, S>(&'a self, lines: I) -> impl Iterator<Item = String> + 'a
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: 'a,
        S: AsRef<str> + 'a,
    {
        lines
            .into_iter()
            .map(move |line| self.clean_line(line.as_ref()))
    }

    /// Clean `input` line by line into `output`, one cleaned line per input line.
    pub fn clean_file(&self, input: &Path, output: &Path) -> Result<CleanStats> {
        let reader = BufReader::new(File::open(input).map_err(|e| TokenizerError::io(input, e))?);
        let mut writer =
            BufWriter::new(File::create(output).map_err(|e| TokenizerError::io(output, e))?);

        let mut stats = CleanStats::default();
        for line in reader.lines() {
            let line = line.map_err(|e| TokenizerError::io(input, e))?;
            let (cleaned, removed) = self.clean_line_counted(&line);

            stats.lines += 1;
            stats.removed_chars += removed;
            if cleaned.is_empty() {
                stats.empty_lines += 1;
            }
            writeln!(writer, "{}", cleaned).map_err(|e| TokenizerError::io(output, e))?;
        }
        writer.flush().map_err(|e| TokenizerError::io(output, e))?;

        info!(
            "Cleaned {} lines ({} empty, {} characters removed) into {}",
            stats.lines,
            stats.empty_lines,
            stats.removed_chars,
            output.display()
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_line() {
        let cleaner = CorpusCleaner::default();

        assert_eq!(
            cleaner.clean_line("  मी, मराठी   बोलतो!! (2024) "),
            "मी मराठी बोलतो 2024"
        );
        assert_eq!(cleaner.clean_line("Hello\t\tworld"), "Hello world");
        assert_eq!(cleaner.clean_line("“”—…"), "");
    }

    #[test]
    fn test_devanagari_signs_survive() {
        let cleaner = CorpusCleaner::default();
        // virama, anusvara and the danda are all inside the block
        assert_eq!(cleaner.clean_line("संस्कृत।"), "संस्कृत।");
    }

    #[test]
    fn test_default_keeps_precomposed_nukta_letters() {
        let cleaner = CorpusCleaner::default();
        assert_eq!(cleaner.normalization(), NormalizationForm::None);

        for c in '\u{0958}'..='\u{095F}' {
            assert_eq!(cleaner.clean_line(&c.to_string()), c.to_string());
        }
        assert_eq!(cleaner.clean_line("\u{0915}\u{093C}"), "\u{0915}\u{093C}");
    }

    #[test]
    fn test_nfc_normalization() {
        let cleaner = CorpusCleaner::new(NormalizationForm::NFC);
        // U+0958 is a composition exclusion, so क + nukta stays decomposed
        assert_eq!(cleaner.clean_line("\u{0915}\u{093C}"), "\u{0915}\u{093C}");
        assert_eq!(cleaner.clean_line("\u{0958}"), "\u{0915}\u{093C}");

        let text = "e\u{0301}"; // e + combining acute accent
        assert_eq!(NormalizationForm::NFC.apply(text), "\u{00e9}");
        assert_eq!(NormalizationForm::NFD.apply("\u{00e9}"), text);
        assert_eq!(NormalizationForm::None.apply(text), text);
    }

    #[test]
    fn test_clean_lines_keeps_empty_results() {
        let cleaner = CorpusCleaner::default();
        let cleaned: Vec<String> = cleaner.clean_lines(["a!", "!!", "b"]).collect();
        assert_eq!(cleaned, vec!["a", "", "b"]);
    }

    #[test]
    fn test_clean_file() {
        let dir = std::env::temp_dir().join("shabda_test_clean");
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("raw.txt");
        let output = dir.join("clean.txt");
        std::fs::write(&input, "माझा  देश!\n???\nab-cd\n").unwrap();

        let stats = CorpusCleaner::default().clean_file(&input, &output).unwrap();

        assert_eq!(
            stats,
            CleanStats {
                lines: 3,
                empty_lines: 1,
                removed_chars: 5,
            }
        );
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "माझा देश\n\nabcd\n"
        );

        // Cleanup
        std::fs::remove_dir_all(dir).ok();
    }
}
