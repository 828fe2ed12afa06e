use serde::{Deserialize, Serialize};

/// One row from the suggestion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub symbol: String,
    #[serde(rename = "company")]
    pub company_name: String,
}

impl Suggestion {
    pub fn new(symbol: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            company_name: company_name.into(),
        }
    }
}

/// What the result container should show right now.
#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    Hidden,
    /// Non-selectable placeholder for an empty result list
    NoMatch { message: String },
    Items {
        items: Vec<Suggestion>,
        active: Option<usize>,
    },
}

/// Per-input suggestion state.
/// Results are replaced wholesale on every query; the index into them is
/// the only addressing used for keyboard and pointer navigation.
#[derive(Debug, Clone, Default)]
pub struct SuggestionSession {
    query: String,
    results: Vec<Suggestion>,
    active: Option<usize>,
    visible: bool,
}

impl SuggestionSession {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Query the current results were fetched for.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Suggestion] {
        &self.results
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn item(&self, index: usize) -> Option<&Suggestion> {
        if !self.visible {
            return None;
        }
        self.results.get(index)
    }

    pub fn active_item(&self) -> Option<&Suggestion> {
        self.active.and_then(|i| self.item(i))
    }

    /// Render model for the result container.
    pub fn view(&self, no_match_text: &str) -> ListView {
        if !self.visible {
            ListView::Hidden
        } else if self.results.is_empty() {
            ListView::NoMatch {
                message: no_match_text.to_string(),
            }
        } else {
            ListView::Items {
                items: self.results.clone(),
                active: self.active,
            }
        }
    }

    // =========================================================================
    // UPDATES
    // =========================================================================

    /// Install a fresh result list and show it. Clears the highlight.
    pub fn replace_results(&mut self, query: String, results: Vec<Suggestion>) {
        self.query = query;
        self.results = results;
        self.active = None;
        self.visible = true;
    }

    /// Hide and empty the list. Returns true if it was visible.
    pub fn hide(&mut self) -> bool {
        let was_visible = self.visible;
        self.results.clear();
        self.active = None;
        self.visible = false;
        was_visible
    }

    /// ArrowDown. Wraps from the last item to the first.
    /// Returns the new index, or None if there is nothing to navigate.
    pub fn move_next(&mut self) -> Option<usize> {
        let len = self.navigable_len()?;
        let next = match self.active {
            Some(i) => (i + 1) % len,
            None => 0,
        };
        self.active = Some(next);
        Some(next)
    }

    /// ArrowUp. Wraps from the first item to the last.
    pub fn move_prev(&mut self) -> Option<usize> {
        let len = self.navigable_len()?;
        let prev = match self.active {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.active = Some(prev);
        Some(prev)
    }

    /// Pointer hover. Out-of-range indices are ignored.
    pub fn set_active(&mut self, index: usize) -> bool {
        match self.navigable_len() {
            Some(len) if index < len => {
                self.active = Some(index);
                true
            }
            _ => false,
        }
    }

    fn navigable_len(&self) -> Option<usize> {
        if self.visible && !self.results.is_empty() {
            Some(self.results.len())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three() -> SuggestionSession {
        let mut session = SuggestionSession::new();
        session.replace_results(
            "inf".to_string(),
            vec![
                Suggestion::new("INFY", "Infosys Ltd"),
                Suggestion::new("INFIBEAM", "Infibeam Avenues Ltd"),
                Suggestion::new("INFOBEAN", "InfoBeans Technologies Ltd"),
            ],
        );
        session
    }

    #[test]
    fn test_default_hidden() {
        let session = SuggestionSession::new();
        assert!(!session.is_visible());
        assert_eq!(session.active_index(), None);
        assert_eq!(session.view("none"), ListView::Hidden);
    }

    #[test]
    fn test_arrow_down_wraps_to_first() {
        let mut session = three();
        assert_eq!(session.move_next(), Some(0));
        assert_eq!(session.move_next(), Some(1));
        assert_eq!(session.move_next(), Some(2));
        assert_eq!(session.move_next(), Some(0)); // len-1 -> 0
    }

    #[test]
    fn test_arrow_up_wraps_to_last() {
        let mut session = three();
        assert_eq!(session.move_prev(), Some(2)); // nothing active -> last
        session.set_active(0);
        assert_eq!(session.move_prev(), Some(2)); // 0 -> len-1
        assert_eq!(session.move_prev(), Some(1));
    }

    #[test]
    fn test_navigation_noop_when_empty() {
        let mut session = SuggestionSession::new();
        session.replace_results("zzz".to_string(), Vec::new());

        assert!(session.is_visible());
        assert_eq!(session.move_next(), None);
        assert_eq!(session.move_prev(), None);
        assert_eq!(session.active_index(), None);
        assert_eq!(
            session.view("No matching company found"),
            ListView::NoMatch {
                message: "No matching company found".to_string()
            }
        );
    }

    #[test]
    fn test_navigation_noop_when_hidden() {
        let mut session = three();
        session.hide();

        assert_eq!(session.move_next(), None);
        assert_eq!(session.move_prev(), None);
        assert!(!session.set_active(0));
        assert!(session.item(0).is_none());
    }

    #[test]
    fn test_replace_resets_active() {
        let mut session = three();
        session.move_next();
        session.move_next();
        assert_eq!(session.active_index(), Some(1));

        session.replace_results("tcs".to_string(), vec![Suggestion::new("TCS", "Tata Consultancy Services")]);
        assert_eq!(session.active_index(), None);
        assert_eq!(session.query(), "tcs");
        assert_eq!(session.results().len(), 1);
    }

    #[test]
    fn test_set_active_out_of_range() {
        let mut session = three();
        assert!(!session.set_active(3));
        assert_eq!(session.active_index(), None);

        assert!(session.set_active(2));
        assert_eq!(session.active_item().map(|s| s.symbol.as_str()), Some("INFOBEAN"));
    }

    #[test]
    fn test_hide_reports_visibility() {
        let mut session = three();
        session.move_next();
        assert!(session.hide());
        assert!(!session.hide());
        assert_eq!(session.active_index(), None);
        assert!(session.results().is_empty());
    }

    #[test]
    fn test_items_view_carries_active() {
        let mut session = three();
        session.move_next();
        match session.view("none") {
            ListView::Items { items, active } => {
                assert_eq!(items.len(), 3);
                assert_eq!(active, Some(0));
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }
}
