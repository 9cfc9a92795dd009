use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::{Band, Passage, Question, WordList, WordListKind};
use crate::{log_info, log_warn};

use super::ContentProvider;

const ENABLE_LOGS: bool = true;

/// In-memory content set, usually loaded from a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentLibrary {
    pub passages: Vec<Passage>,
    pub word_lists: Vec<WordList>,
    pub questions: Vec<Question>,
}

impl ContentLibrary {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read content from {}", path.display()))?;
        let library: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse content in {}", path.display()))?;
        log_info!(
            "Loaded {} passages, {} word lists, {} questions from {}",
            library.passages.len(),
            library.word_lists.len(),
            library.questions.len(),
            path.display()
        );
        Ok(library)
    }
}

/// Exact band match first, otherwise the first candidate of any band.
fn pick<'a, T>(
    items: impl Iterator<Item = &'a T> + Clone,
    band_of: impl Fn(&T) -> Band,
    band: Band,
    what: &str,
) -> Option<&'a T>
where
    T: 'a,
{
    if let Some(exact) = items.clone().find(|item| band_of(item) == band) {
        return Some(exact);
    }
    let fallback = items.into_iter().next();
    if let Some(item) = fallback {
        log_warn!(
            "No {what} for band {}, substituting one from band {}",
            band.as_str(),
            band_of(item).as_str()
        );
    }
    fallback
}

impl ContentProvider for ContentLibrary {
    fn get_passage(&self, band: Band) -> Option<Passage> {
        pick(self.passages.iter(), |p| p.band, band, "passage").cloned()
    }

    fn get_word_list(&self, band: Band, kind: WordListKind) -> Option<WordList> {
        let lists = self.word_lists.iter().filter(move |list| list.kind == kind);
        pick(lists, |list| list.band, band, "word list").cloned()
    }

    fn get_questions(&self, passage_id: &str) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|question| question.passage_id == passage_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Choice, QuestionCategory};
    use tempfile::tempdir;

    fn passage(id: &str, band: Band) -> Passage {
        Passage {
            id: id.into(),
            band,
            title: format!("Passage {id}"),
            word_count: 3,
            text: "one two three".into(),
        }
    }

    fn word_list(id: &str, band: Band, kind: WordListKind) -> WordList {
        WordList {
            id: id.into(),
            band,
            kind,
            items: vec!["cat".into(), "dog".into()],
        }
    }

    fn library() -> ContentLibrary {
        ContentLibrary {
            passages: vec![
                passage("p-elem", Band::Elementary),
                passage("p-adv", Band::Advanced),
            ],
            word_lists: vec![
                word_list("real-int", Band::Intermediate, WordListKind::Real),
                word_list("pseudo-beg", Band::Beginner, WordListKind::Pseudo),
            ],
            questions: vec![Question {
                id: "q1".into(),
                passage_id: "p-adv".into(),
                prompt: "Why?".into(),
                choices: vec![Choice {
                    label: "A".into(),
                    text: "Because".into(),
                }],
                correct_index: 0,
                category: QuestionCategory::Inferential,
                difficulty: Band::Advanced,
            }],
        }
    }

    #[test]
    fn exact_band_wins() {
        let content = library();
        assert_eq!(content.get_passage(Band::Advanced).unwrap().id, "p-adv");
        assert_eq!(
            content
                .get_word_list(Band::Beginner, WordListKind::Pseudo)
                .unwrap()
                .id,
            "pseudo-beg"
        );
    }

    #[test]
    fn missing_band_falls_back_to_first_available() {
        let content = library();
        assert_eq!(content.get_passage(Band::Beginner).unwrap().id, "p-elem");
        assert_eq!(
            content
                .get_word_list(Band::Advanced, WordListKind::Real)
                .unwrap()
                .id,
            "real-int"
        );
    }

    #[test]
    fn fallback_never_crosses_list_kind() {
        let content = ContentLibrary {
            word_lists: vec![word_list("real", Band::Beginner, WordListKind::Real)],
            ..Default::default()
        };
        assert!(content
            .get_word_list(Band::Beginner, WordListKind::Pseudo)
            .is_none());
        assert!(content.get_passage(Band::Beginner).is_none());
    }

    #[test]
    fn questions_are_filtered_by_passage() {
        let content = library();
        assert_eq!(content.get_questions("p-adv").len(), 1);
        assert!(content.get_questions("p-elem").is_empty());
    }

    #[test]
    fn loads_from_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("content.json");
        fs::write(&path, serde_json::to_string_pretty(&library()).unwrap()).unwrap();

        let loaded = ContentLibrary::load(&path).unwrap();
        assert_eq!(loaded, library());
        assert!(ContentLibrary::load(&dir.path().join("missing.json")).is_err());
    }
}
