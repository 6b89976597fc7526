use eframe::egui::{self, Key, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::ViewModel;

const MAX_SUGGESTIONS: usize = 12;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Ids matching `query`: case-insensitive substring hits first in the order given,
/// then fuzzy-only hits by descending score.
pub(in crate::app) fn rank_matches<'a>(
    ids: impl IntoIterator<Item = &'a str>,
    query: &str,
    limit: usize,
) -> Vec<&'a str> {
    let query = query.trim();
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    let matcher = SkimMatcherV2::default();
    let mut substring = Vec::new();
    let mut fuzzy = Vec::new();
    for id in ids {
        if id.to_lowercase().contains(&needle) {
            substring.push(id);
        } else if let Some(score) = fuzzy_match_score(&matcher, id, query) {
            fuzzy.push((score, id));
        }
    }
    fuzzy.sort_by(|a, b| b.0.cmp(&a.0));

    substring
        .into_iter()
        .chain(fuzzy.into_iter().map(|(_, id)| id))
        .take(limit)
        .collect()
}

impl ViewModel {
    pub(in crate::app) fn draw_search(&mut self, ui: &mut Ui) {
        ui.label("Search nodes")
            .on_hover_text("Type part of a node id, then press Enter or pick a suggestion.");
        let response = ui.text_edit_singleline(&mut self.search);
        let submitted = response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter));

        let suggestions = rank_matches(
            self.document.nodes().iter().map(|node| node.id.as_str()),
            &self.search,
            MAX_SUGGESTIONS,
        )
        .into_iter()
        .map(str::to_owned)
        .collect::<Vec<_>>();

        let query = self.search.trim();
        let mut chosen = if submitted {
            if self.document.contains(query) {
                Some(query.to_owned())
            } else {
                suggestions.first().cloned()
            }
        } else {
            None
        };

        if !suggestions.is_empty() {
            egui::ScrollArea::vertical()
                .id_salt("search_suggestions")
                .max_height(220.0)
                .show(ui, |ui| {
                    for id in &suggestions {
                        if ui.link(id.as_str()).clicked() {
                            chosen = Some(id.clone());
                        }
                    }
                });
        } else if !query.is_empty() {
            ui.weak("No matching nodes.");
        }

        if let Some(node_id) = chosen {
            self.search = node_id.clone();
            self.highlight(&node_id);
        }
    }
}
