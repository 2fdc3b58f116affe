use crate::model::AnswerMode;

/// What a toggle did to the working selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected,
    Deselected,
    /// Session finished or option not offered by the current question.
    Ignored,
}

/// Uncommitted picks for the question on screen, in the order they were made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    picked: Vec<String>,
}

impl Selection {
    /// Toggle `option` under the given answer mode.
    ///
    /// Single-select keeps at most one pick: choosing a different option
    /// replaces it, choosing the same option again clears it.
    pub fn toggle(&mut self, mode: AnswerMode, option: &str) -> SelectOutcome {
        if let Some(pos) = self.picked.iter().position(|p| p == option) {
            self.picked.remove(pos);
            return SelectOutcome::Deselected;
        }
        if mode == AnswerMode::Single {
            self.picked.clear();
        }
        self.picked.push(option.to_owned());
        SelectOutcome::Selected
    }

    #[must_use]
    pub fn contains(&self, option: &str) -> bool {
        self.picked.iter().any(|p| p == option)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.picked
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.picked.is_empty()
    }

    pub(crate) fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.picked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_select_replaces_previous_pick() {
        let mut sel = Selection::default();
        sel.toggle(AnswerMode::Single, "X");
        assert_eq!(sel.toggle(AnswerMode::Single, "Y"), SelectOutcome::Selected);
        assert_eq!(sel.as_slice(), ["Y"]);
    }

    #[test]
    fn single_select_reselect_clears() {
        let mut sel = Selection::default();
        sel.toggle(AnswerMode::Single, "X");
        assert_eq!(sel.toggle(AnswerMode::Single, "X"), SelectOutcome::Deselected);
        assert!(sel.is_empty());
    }

    #[test]
    fn multi_select_toggle_is_its_own_inverse() {
        let mut sel = Selection::default();
        sel.toggle(AnswerMode::Multi, "A");
        sel.toggle(AnswerMode::Multi, "C");
        let before = sel.clone();

        sel.toggle(AnswerMode::Multi, "B");
        sel.toggle(AnswerMode::Multi, "B");
        assert_eq!(sel, before);
        assert_eq!(sel.as_slice(), ["A", "C"]);
    }
}
