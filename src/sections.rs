use anyhow::{Context, Result};
use regex::Regex;

use crate::model::NoteSection;

/// Result of organizing one notes document.
#[derive(Debug)]
pub struct OrganizeOutcome {
    pub sections: Vec<NoteSection>,
    /// Title lines that carried no text after the numbering.
    pub dropped_titles: usize,
}

/// Splits the running text of the notes chapter into numbered sections.
///
/// Titles look like "1. Umum", subtitles like "a. Pendirian". A segment is
/// emitted at every boundary; text before the first title is discarded.
pub struct SectionOrganizer {
    title_start: Regex,
    subtitle_start: Regex,
    title_clean: Regex,
}

impl SectionOrganizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            title_start: Regex::new(r"^\d+\.(?:\s|$)")
                .context("failed to compile section title pattern")?,
            subtitle_start: Regex::new(r"^[a-z]+\.\s")
                .context("failed to compile section subtitle pattern")?,
            title_clean: Regex::new(r"^(\d+)\.\s*(\S.*)$")
                .context("failed to compile title cleanup pattern")?,
        })
    }

    pub fn organize(&self, text: &str) -> OrganizeOutcome {
        let mut outcome = OrganizeOutcome {
            sections: Vec::new(),
            dropped_titles: 0,
        };
        let mut title: Option<String> = None;
        let mut subtitle: Option<String> = None;
        let mut body: Vec<&str> = Vec::new();

        for raw_line in text.lines() {
            let line = raw_line.trim();

            if self.title_start.is_match(line) {
                Self::flush(&mut outcome.sections, title.as_deref(), subtitle.take(), &mut body);
                title = match self.clean_title(line) {
                    Some(cleaned) => Some(cleaned),
                    None => {
                        outcome.dropped_titles += 1;
                        None
                    }
                };
                continue;
            }

            if self.subtitle_start.is_match(line) {
                Self::flush(&mut outcome.sections, title.as_deref(), subtitle.take(), &mut body);
                if title.is_some() {
                    subtitle = Some(line.to_string());
                }
                continue;
            }

            if title.is_some() {
                body.push(line);
            }
        }
        Self::flush(&mut outcome.sections, title.as_deref(), subtitle.take(), &mut body);

        outcome
    }

    fn flush(
        sections: &mut Vec<NoteSection>,
        title: Option<&str>,
        subtitle: Option<String>,
        body: &mut Vec<&str>,
    ) {
        let content = body.join("\n").trim().to_string();
        body.clear();

        let Some(title) = title else {
            return;
        };
        if subtitle.is_none() && content.is_empty() {
            return;
        }

        sections.push(NoteSection {
            title: title.to_string(),
            subtitle,
            content,
        });
    }

    /// Re-spaces "3.Pajak" style titles to "3. Pajak". Returns `None` when
    /// nothing follows the numbering.
    fn clean_title(&self, line: &str) -> Option<String> {
        let captures = self.title_clean.captures(line)?;
        Some(format!("{}. {}", &captures[1], &captures[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn organize(text: &str) -> OrganizeOutcome {
        SectionOrganizer::new().unwrap().organize(text)
    }

    #[test]
    fn splits_titles_and_subtitles_into_sections() {
        let outcome = organize(
            "1. Umum\n\
             PT Bank Rakyat Indonesia\n\
             a. Pendirian\n\
             Didirikan tahun 1895\n\
             2. Ikhtisar kebijakan akuntansi\n\
             Dasar penyusunan",
        );

        let sections = &outcome.sections;
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].title, "1. Umum");
        assert_eq!(sections[0].subtitle, None);
        assert_eq!(sections[0].content, "PT Bank Rakyat Indonesia");
        assert_eq!(sections[1].title, "1. Umum");
        assert_eq!(sections[1].subtitle.as_deref(), Some("a. Pendirian"));
        assert_eq!(sections[1].content, "Didirikan tahun 1895");
        assert_eq!(sections[2].title, "2. Ikhtisar kebijakan akuntansi");
        assert_eq!(sections[2].content, "Dasar penyusunan");
    }

    #[test]
    fn preamble_before_first_title_is_dropped() {
        let outcome = organize(
            "CATATAN ATAS LAPORAN KEUANGAN\n\
             Untuk tahun yang berakhir\n\
             1. Umum\n\
             Isi",
        );

        assert_eq!(outcome.sections.len(), 1);
        assert_eq!(outcome.sections[0].content, "Isi");
    }

    #[test]
    fn titles_without_content_are_skipped() {
        let outcome = organize("1. Umum\n2. Kebijakan\nIsi");

        assert_eq!(outcome.sections.len(), 1);
        assert_eq!(outcome.sections[0].title, "2. Kebijakan");
    }

    #[test]
    fn bare_number_titles_are_counted_and_dropped() {
        let outcome = organize("12.\nTeks di bawah nomor kosong\n2. Judul\nIsi");

        assert_eq!(outcome.dropped_titles, 1);
        assert_eq!(outcome.sections.len(), 1);
        assert_eq!(outcome.sections[0].title, "2. Judul");
        assert_eq!(outcome.sections[0].content, "Isi");
    }

    #[test]
    fn title_spacing_is_normalized() {
        let outcome = organize("3.   Pajak penghasilan\nIsi");

        assert_eq!(outcome.sections[0].title, "3. Pajak penghasilan");
    }

    #[test]
    fn numbers_with_separators_stay_in_the_body() {
        let outcome = organize("1. Umum\nSaldo 1.234.567\n2.345.678 rupiah");

        assert_eq!(outcome.sections.len(), 1);
        assert_eq!(outcome.sections[0].content, "Saldo 1.234.567\n2.345.678 rupiah");
    }

    #[test]
    fn blank_lines_inside_a_section_are_kept() {
        let outcome = organize("1. Umum\nParagraf satu\n\nParagraf dua");

        assert_eq!(outcome.sections[0].content, "Paragraf satu\n\nParagraf dua");
    }

    #[test]
    fn subtitle_without_a_title_is_ignored() {
        let outcome = organize("a. Pendirian\nTeks\n1. Umum\nIsi");

        assert_eq!(outcome.sections.len(), 1);
        assert_eq!(outcome.sections[0].subtitle, None);
    }
}
