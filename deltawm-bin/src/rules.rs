// SPDX-License-Identifier: GPL-3.0-only

//! Glob-matched window rules, one ordered list per property.

use std::cmp::Ordering;

use crate::geo::Point;
use crate::util::globber;

#[derive(Debug, Clone, PartialEq)]
pub struct Rule<T> {
    pub app_id_glob: String,
    pub title_glob: String,
    pub value: T,
}

/// Rules ordered most-specific first; lookup returns the first whose app-id
/// and title globs both match.
#[derive(Debug, Default)]
pub struct RuleList<T> {
    rules: Vec<Rule<T>>,
}

fn pair_order(a: (&str, &str), b: (&str, &str)) -> Ordering {
    globber::order(a.0, b.0).then_with(|| globber::order(a.1, b.1))
}

impl<T> RuleList<T> {
    /// Insert at the sorted position. A rule with an identical glob pair
    /// is replaced in place, keeping its position.
    pub fn add(&mut self, rule: Rule<T>) {
        if let Some(existing) = self
            .rules
            .iter_mut()
            .find(|r| r.app_id_glob == rule.app_id_glob && r.title_glob == rule.title_glob)
        {
            existing.value = rule.value;
            return;
        }
        let at = self
            .rules
            .partition_point(|r| {
                pair_order((&r.app_id_glob, &r.title_glob), (&rule.app_id_glob, &rule.title_glob))
                    != Ordering::Greater
            });
        self.rules.insert(at, rule);
    }

    /// Remove by glob pair; false if absent.
    pub fn del(&mut self, app_id_glob: &str, title_glob: &str) -> bool {
        let before = self.rules.len();
        self.rules
            .retain(|r| !(r.app_id_glob == app_id_glob && r.title_glob == title_glob));
        self.rules.len() != before
    }

    pub fn matching(&self, app_id: &str, title: &str) -> Option<&T> {
        self.rules
            .iter()
            .find(|r| globber::matches(app_id, &r.app_id_glob) && globber::matches(title, &r.title_glob))
            .map(|r| &r.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule<T>> {
        self.rules.iter()
    }
}

/// Every per-view property that rules may decide at map time (or on rule
/// change, for server-side decoration state).
#[derive(Debug, Default)]
pub struct Rules {
    pub float: RuleList<bool>,
    pub ssd: RuleList<bool>,
    pub tags: RuleList<u32>,
    pub output: RuleList<String>,
    pub position: RuleList<Point>,
    pub dimensions: RuleList<(i32, i32)>,
    pub fullscreen: RuleList<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(app: &str, title: &str, value: u32) -> Rule<u32> {
        Rule { app_id_glob: app.into(), title_glob: title.into(), value }
    }

    #[test]
    fn first_match_wins_in_specificity_order() {
        let mut list = RuleList::default();
        list.add(rule("*", "*", 1));
        list.add(rule("foot*", "*", 2));
        list.add(rule("foot", "*", 3));
        assert_eq!(list.matching("foot", "fish"), Some(&3));
        assert_eq!(list.matching("footclient", "fish"), Some(&2));
        assert_eq!(list.matching("firefox", "fish"), Some(&1));
    }

    #[test]
    fn title_glob_breaks_app_id_ties() {
        let mut list = RuleList::default();
        list.add(rule("foot", "*", 1));
        list.add(rule("foot", "htop", 2));
        assert_eq!(list.matching("foot", "htop"), Some(&2));
        assert_eq!(list.matching("foot", "vi"), Some(&1));
    }

    #[test]
    fn duplicate_pair_replaces_in_place() {
        let mut list = RuleList::default();
        list.add(rule("foot", "*", 1));
        list.add(rule("*", "*", 9));
        list.add(rule("foot", "*", 7));
        assert_eq!(list.matching("foot", "x"), Some(&7));
        assert_eq!(list.iter().count(), 2);
    }

    #[test]
    fn del_removes_by_pair() {
        let mut list = RuleList::default();
        list.add(rule("foot", "*", 1));
        assert!(list.del("foot", "*"));
        assert!(!list.del("foot", "*"));
        assert_eq!(list.matching("foot", "x"), None);
    }
}
