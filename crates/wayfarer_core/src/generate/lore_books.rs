use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::document::{mapping, string_list};
use crate::ownership::LORE_BOOK_PREFIX;
use crate::region::RegionRecord;

use super::GenerationContext;

pub const DEFAULT_PAGE_BUDGET: usize = 256;
pub const DEFAULT_BREAK_ANCHOR: &str = "[page]";
pub const DEFAULT_AUTHOR: &str = "The Cartographer";

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t\r]*\n").expect("paragraph pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoreSettings {
    pub page_budget: usize,
    pub author: String,
    pub break_anchors: Vec<String>,
}

impl Default for LoreSettings {
    fn default() -> Self {
        Self {
            page_budget: DEFAULT_PAGE_BUDGET,
            author: DEFAULT_AUTHOR.to_string(),
            break_anchors: vec![DEFAULT_BREAK_ANCHOR.to_string()],
        }
    }
}

pub fn book_key(record: &RegionRecord) -> String {
    format!("{LORE_BOOK_PREFIX}{}-{}", record.world, record.id)
}

/// Splits a description into pages of at most `budget` characters.
///
/// Text containing one of `anchors` is split exactly at the anchors and
/// nowhere else. Otherwise short text is a single trimmed page; longer text
/// breaks at paragraphs, then between words, and splits a word only when it
/// alone exceeds the budget.
pub fn paginate(text: &str, budget: usize, anchors: &[String]) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    let budget = budget.max(1);

    let anchors: Vec<&str> = anchors
        .iter()
        .map(String::as_str)
        .filter(|a| !a.is_empty())
        .collect();
    if anchors.iter().any(|a| text.contains(a)) {
        return split_at_anchors(text, &anchors);
    }

    if char_len(text) <= budget {
        return vec![text.to_string()];
    }

    let mut pager = Pager::new(budget);
    for paragraph in PARAGRAPH_BREAK.split(text) {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        let joined = words.join(" ");
        if !pager.try_append_paragraph(&joined) {
            pager.flush();
            for word in words {
                pager.push_word(word);
            }
        }
    }
    pager.finish()
}

fn split_at_anchors(text: &str, anchors: &[&str]) -> Vec<String> {
    let mut pieces = vec![text.to_string()];
    for anchor in anchors {
        pieces = pieces
            .iter()
            .flat_map(|piece| piece.split(anchor).map(str::to_string).collect::<Vec<_>>())
            .collect();
    }
    pieces
        .into_iter()
        .map(|piece| piece.trim().to_string())
        .filter(|piece| !piece.is_empty())
        .collect()
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

struct Pager {
    budget: usize,
    pages: Vec<String>,
    current: String,
}

impl Pager {
    fn new(budget: usize) -> Self {
        Self {
            budget,
            pages: Vec::new(),
            current: String::new(),
        }
    }

    fn try_append_paragraph(&mut self, paragraph: &str) -> bool {
        if self.current.is_empty() {
            if char_len(paragraph) <= self.budget {
                self.current = paragraph.to_string();
                return true;
            }
            return false;
        }
        if char_len(&self.current) + 2 + char_len(paragraph) <= self.budget {
            self.current.push_str("\n\n");
            self.current.push_str(paragraph);
            return true;
        }
        false
    }

    fn push_word(&mut self, word: &str) {
        let len = char_len(word);
        if len > self.budget {
            self.flush();
            let chars: Vec<char> = word.chars().collect();
            let mut chunks = chars.chunks(self.budget).peekable();
            while let Some(chunk) = chunks.next() {
                let chunk: String = chunk.iter().collect();
                if chunks.peek().is_some() {
                    self.pages.push(chunk);
                } else {
                    self.current = chunk;
                }
            }
            return;
        }
        if self.current.is_empty() {
            self.current = word.to_string();
        } else if char_len(&self.current) + 1 + len <= self.budget {
            self.current.push(' ');
            self.current.push_str(word);
        } else {
            self.flush();
            self.current = word.to_string();
        }
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.pages
    }
}

/// One book per record with a non-empty description, keyed by world and id.
pub fn generate(ctx: &GenerationContext<'_>) -> Mapping {
    let mut books: Vec<(String, Value)> = ctx
        .regions
        .active()
        .filter_map(|record| {
            let description = record.description.as_deref()?.trim();
            if description.is_empty() {
                return None;
            }
            let pages = paginate(description, ctx.lore.page_budget, &ctx.lore.break_anchors);
            let book = mapping([
                ("title", Value::from(ctx.regions.display_name(record))),
                ("author", Value::from(ctx.lore.author.as_str())),
                ("pages", string_list(pages)),
            ]);
            Some((book_key(record), Value::Mapping(book)))
        })
        .collect();
    books.sort_by(|a, b| a.0.cmp(&b.0));

    books
        .into_iter()
        .map(|(key, value)| (Value::from(key), value))
        .collect()
}
