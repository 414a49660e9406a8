//! The ordered set of machine tabs.

use crate::target::Target;

/// All monitored machines and the index of the active tab.
///
/// The order is fixed at startup: the local machine first, then remote
/// hosts in configuration order. Tab switching wraps around at both ends.
#[derive(Debug)]
pub struct TargetRegistry {
    targets: Vec<Target>,
    active: usize,
}

impl TargetRegistry {
    pub fn new(targets: Vec<Target>) -> Self {
        Self { targets, active: 0 }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> Option<&Target> {
        self.targets.get(self.active)
    }

    pub fn active_mut(&mut self) -> Option<&mut Target> {
        self.targets.get_mut(self.active)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Target> {
        self.targets.get_mut(index)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut Target)> {
        self.targets.iter_mut().enumerate()
    }

    /// Activate the next tab. The incoming tab's scroll resets to the top;
    /// its cursor keeps whatever row it was on.
    pub fn next_tab(&mut self) {
        if self.targets.len() < 2 {
            return;
        }
        self.active = (self.active + 1) % self.targets.len();
        self.reset_incoming();
    }

    /// Activate the previous tab, wrapping to the last one from the first.
    pub fn prev_tab(&mut self) {
        if self.targets.len() < 2 {
            return;
        }
        self.active = self.active.checked_sub(1).unwrap_or(self.targets.len() - 1);
        self.reset_incoming();
    }

    fn reset_incoming(&mut self) {
        if let Some(target) = self.targets.get_mut(self.active) {
            target.reset_scroll();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procfleet_hosts::{ProcessRecord, ProcessSource, ProcessState};

    fn record(pid: i32) -> ProcessRecord {
        ProcessRecord {
            pid,
            owner: "root".to_string(),
            cpu_percent: 0.0,
            mem_percent: 0.0,
            state: ProcessState::Sleeping,
            command: format!("proc-{pid}"),
        }
    }

    fn registry(n: usize) -> TargetRegistry {
        TargetRegistry::new(
            (0..n)
                .map(|i| {
                    let mut t = Target::new(format!("m{i}"), ProcessSource::local());
                    t.apply_snapshot((0..30).map(record).collect());
                    t
                })
                .collect(),
        )
    }

    #[test]
    fn tabs_wrap_both_directions() {
        let mut r = registry(3);
        r.next_tab();
        r.next_tab();
        assert_eq!(r.active_index(), 2);
        r.next_tab();
        assert_eq!(r.active_index(), 0);
        r.prev_tab();
        assert_eq!(r.active_index(), 2);
    }

    #[test]
    fn single_tab_never_moves() {
        let mut r = registry(1);
        r.next_tab();
        r.prev_tab();
        assert_eq!(r.active_index(), 0);
    }

    #[test]
    fn switching_resets_incoming_scroll_but_keeps_cursor() {
        let mut r = registry(2);
        // scroll tab 1 down, then leave and come back
        r.next_tab();
        let tab = r.active_mut().unwrap();
        tab.page_down(10);
        tab.page_down(10);
        let cursor = tab.cursor_index();
        assert!(tab.scroll_offset() > 0);

        r.prev_tab();
        r.next_tab();
        let tab = r.active().unwrap();
        assert_eq!(tab.scroll_offset(), 0);
        assert_eq!(tab.cursor_index(), cursor);
    }

    #[test]
    fn tab_states_are_independent() {
        let mut r = registry(2);
        r.active_mut().unwrap().move_down(10);
        r.next_tab();
        assert_eq!(r.active().unwrap().cursor_index(), 0);
        r.prev_tab();
        assert_eq!(r.active().unwrap().cursor_index(), 1);
    }

    #[test]
    fn failed_fetch_on_one_tab_leaves_others() {
        let mut r = registry(2);
        r.get_mut(1).unwrap().begin_fetch();
        r.get_mut(1).unwrap().fetch_failed("unreachable");
        assert!(r.targets()[0].status().is_none());
        assert_eq!(r.targets()[0].snapshot().len(), 30);
        assert_eq!(r.targets()[1].status(), Some("unreachable"));
    }
}
