//! Case-insensitive text search across pages
//!
//! Matching folds case per character and keeps a map from folded positions
//! back to the original text, so offsets always point into the page text as
//! extracted. No ranking: matches come back in document order.

use crate::document::Document;
use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchMatch {
    /// Page index, 0-based
    pub page: usize,
    /// Character offset of the match in the page text
    pub offset: usize,
    /// Match length in characters of the page text
    pub len: usize,
}

fn fold(text: &str) -> (Vec<char>, Vec<usize>) {
    let mut folded = Vec::with_capacity(text.len());
    let mut origin = Vec::with_capacity(text.len());
    for (index, c) in text.chars().enumerate() {
        for lower in c.to_lowercase() {
            folded.push(lower);
            origin.push(index);
        }
    }
    (folded, origin)
}

/// All non-overlapping occurrences of `query` in `text`, as (offset, len)
/// in characters.
pub fn find_in_text(text: &str, query: &str) -> Vec<(usize, usize)> {
    let (needle, _) = fold(query);
    if needle.is_empty() {
        return Vec::new();
    }

    let (haystack, origin) = fold(text);
    let mut found = Vec::new();
    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        if haystack[i..i + needle.len()] == needle[..] {
            let start = origin[i];
            let end = origin[i + needle.len() - 1];
            found.push((start, end - start + 1));
            i += needle.len();
        } else {
            i += 1;
        }
    }
    found
}

/// Scan every page of `doc`, extracting text lazily through its cache
pub fn search_document(doc: &mut Document, query: &str) -> Result<Vec<SearchMatch>> {
    let mut matches = Vec::new();
    if query.is_empty() {
        return Ok(matches);
    }

    for page in 0..doc.page_count() {
        let text = doc.extract_text(page)?;
        matches.extend(
            find_in_text(text, query)
                .into_iter()
                .map(|(offset, len)| SearchMatch { page, offset, len }),
        );
    }
    Ok(matches)
}

/// Query, ordered matches and the current match cursor
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    pub matches: Vec<SearchMatch>,
    pub current: Option<usize>,
}

impl SearchState {
    pub fn new(query: impl Into<String>, matches: Vec<SearchMatch>, from_page: usize) -> Self {
        let mut state = Self {
            query: query.into(),
            matches,
            current: None,
        };
        state.current = state.first_match_from(from_page);
        state
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// First match on or after `page`, wrapping to the first match overall
    fn first_match_from(&self, page: usize) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        Some(
            self.matches
                .iter()
                .position(|m| m.page >= page)
                .unwrap_or(0),
        )
    }

    pub fn next_match(&mut self) -> Option<&SearchMatch> {
        if self.matches.is_empty() {
            return None;
        }

        self.current = Some(match self.current {
            Some(idx) => (idx + 1) % self.matches.len(), // Wrap around
            None => 0,
        });
        self.current_match()
    }

    pub fn previous_match(&mut self) -> Option<&SearchMatch> {
        if self.matches.is_empty() {
            return None;
        }

        self.current = Some(match self.current {
            Some(0) | None => self.matches.len() - 1, // Wrap to end
            Some(idx) => idx - 1,
        });
        self.current_match()
    }

    pub fn current_match(&self) -> Option<&SearchMatch> {
        self.current.and_then(|idx| self.matches.get(idx))
    }

    /// Status text like "3/12", or "no matches"
    pub fn position_label(&self) -> Option<String> {
        if !self.is_active() {
            return None;
        }
        Some(match self.current {
            Some(idx) => format!("{}/{}", idx + 1, self.matches.len()),
            None => "no matches".to_string(),
        })
    }
}
