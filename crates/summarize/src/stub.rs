use crate::{SummarizeError, SummaryEngine};

/// Extractive stand-in: the first few sentences, capped at `max_words` words.
pub(crate) struct LeadSummaryEngine {
    sentences: usize,
    max_words: usize,
}

impl LeadSummaryEngine {
    pub(crate) fn new(sentences: usize, max_words: usize) -> Self {
        Self {
            sentences: sentences.max(1),
            max_words,
        }
    }

    fn summarize_one(&self, text: &str) -> String {
        let mut lead = String::new();
        let mut taken = 0;
        let mut start = 0;
        for (idx, ch) in text.char_indices() {
            if matches!(ch, '.' | '!' | '?') {
                let end = idx + ch.len_utf8();
                lead.push_str(&text[start..end]);
                start = end;
                taken += 1;
                if taken == self.sentences {
                    break;
                }
            }
        }
        if taken < self.sentences {
            lead.push_str(&text[start..]);
        }

        lead.split_whitespace()
            .take(self.max_words)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl SummaryEngine for LeadSummaryEngine {
    fn summarize_batch(&mut self, texts: &[String]) -> Result<Vec<String>, SummarizeError> {
        Ok(texts.iter().map(|t| self.summarize_one(t)).collect())
    }
}
