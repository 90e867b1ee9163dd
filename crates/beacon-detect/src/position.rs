//! Ranked-list position extraction.
//!
//! Providers tend to answer recommendation questions with a numbered list
//! ("1. Monday\n2. Asana") or a run of bold-emphasized items. When a brand
//! match falls inside such an item, its 1-based rank within the list is the
//! brand's position in the answer.

use std::sync::OnceLock;

use regex::Regex;

fn numbered_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\d+[.)]\s+").expect("static regex"))
}

fn bold_span_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*\n]+)\*\*").expect("static regex"))
}

/// Byte range of one list item together with its rank in the list.
#[derive(Debug, Clone, Copy)]
struct ListItem {
    start: usize,
    end: usize,
    rank: u32,
}

/// Rank of the list item containing `match_offset`, or `None` when the
/// match is not inside a ranked structure.
///
/// Numbered lists take precedence over bold-item sequences. Rank is the
/// ordinal of the item within the structural list nearest the match, not
/// the literal number printed by the provider.
#[must_use]
pub fn position_in_list(text: &str, match_offset: usize) -> Option<u32> {
    if let Some(rank) = numbered_list_rank(text, match_offset) {
        return Some(rank);
    }
    bold_sequence_rank(text, match_offset)
}

fn numbered_list_rank(text: &str, match_offset: usize) -> Option<u32> {
    let items = collect_numbered_items(text);
    items
        .iter()
        .find(|item| match_offset >= item.start && match_offset < item.end)
        .map(|item| item.rank)
}

/// Collect numbered list items, restarting the rank counter whenever a
/// blank line (or non-list text between items) ends a list block. An item
/// spans from its marker to the next numbered line or to the end of its
/// block, so wrapped continuation lines still belong to the item.
fn collect_numbered_items(text: &str) -> Vec<ListItem> {
    let mut items: Vec<ListItem> = Vec::new();
    let mut rank: u32 = 0;
    let mut in_block = false;
    let mut offset = 0usize;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        if numbered_line_re().is_match(line) {
            rank = if in_block { rank + 1 } else { 1 };
            in_block = true;
            if let Some(prev) = items.last_mut() {
                if prev.end > line_start {
                    prev.end = line_start;
                }
            }
            items.push(ListItem {
                start: line_start,
                end: text.len(),
                rank,
            });
        } else if line.trim().is_empty() {
            // Blank line closes the current block.
            if in_block {
                if let Some(prev) = items.last_mut() {
                    prev.end = line_start;
                }
            }
            in_block = false;
        }
        // Non-blank, non-numbered lines are continuations of the current
        // item and need no bookkeeping.
    }

    items
}

/// Rank within a sequence of bold-emphasized items. Only applies when the
/// text carries at least two bold spans (a single bold phrase is emphasis,
/// not a ranking) and the match falls inside one of them.
fn bold_sequence_rank(text: &str, match_offset: usize) -> Option<u32> {
    let spans: Vec<(usize, usize)> = bold_span_re()
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();

    if spans.len() < 2 {
        return None;
    }

    spans
        .iter()
        .position(|&(start, end)| match_offset >= start && match_offset < end)
        .map(|idx| u32::try_from(idx + 1).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_list_returns_item_rank() {
        let text = "1. Monday\n2. Asana\n3. Trello";
        let offset = text.find("Asana").unwrap();
        assert_eq!(position_in_list(text, offset), Some(2));
    }

    #[test]
    fn first_item_is_rank_one() {
        let text = "1. Monday\n2. Asana";
        let offset = text.find("Monday").unwrap();
        assert_eq!(position_in_list(text, offset), Some(1));
    }

    #[test]
    fn text_outside_any_list_has_no_position() {
        let text = "Asana is a popular project management tool.";
        let offset = text.find("Asana").unwrap();
        assert_eq!(position_in_list(text, offset), None);
    }

    #[test]
    fn continuation_lines_belong_to_their_item() {
        let text = "1. Monday\n2. Asana\n   great for teams that plan sprints\n3. Trello";
        let offset = text.find("sprints").unwrap();
        assert_eq!(position_in_list(text, offset), Some(2));
    }

    #[test]
    fn rank_restarts_after_a_blank_line() {
        let text = "1. Monday\n2. Asana\n\nSome prose.\n\n1. Trello\n2. ClickUp";
        let offset = text.find("ClickUp").unwrap();
        assert_eq!(position_in_list(text, offset), Some(2));
        let offset = text.find("Trello").unwrap();
        assert_eq!(position_in_list(text, offset), Some(1));
    }

    #[test]
    fn rank_is_ordinal_not_printed_number() {
        // Providers sometimes misnumber; the structural order wins.
        let text = "3. Monday\n5. Asana";
        let offset = text.find("Asana").unwrap();
        assert_eq!(position_in_list(text, offset), Some(2));
    }

    #[test]
    fn prose_between_items_does_not_leak_rank() {
        let text = "1. Monday\n\nUnrelated paragraph mentioning Asana.";
        let offset = text.find("Asana").unwrap();
        assert_eq!(position_in_list(text, offset), None);
    }

    #[test]
    fn bold_sequence_ranks_items() {
        let text = "**Monday** is solid. **Asana** is flexible. **Trello** is simple.";
        let offset = text.find("Asana").unwrap();
        assert_eq!(position_in_list(text, offset), Some(2));
    }

    #[test]
    fn single_bold_span_is_not_a_ranking() {
        let text = "We recommend **Asana** for this.";
        let offset = text.find("Asana").unwrap();
        assert_eq!(position_in_list(text, offset), None);
    }

    #[test]
    fn numbered_list_takes_precedence_over_bold() {
        let text = "1. **Monday**\n2. **Asana**\n3. **Trello**";
        let offset = text.find("Asana").unwrap();
        assert_eq!(position_in_list(text, offset), Some(2));
    }
}
