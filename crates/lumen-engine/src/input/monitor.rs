//! Connected monitors, keyed by their platform handle.

use std::collections::BTreeMap;

use super::event::Event;

/// Stable identifier of a monitor for as long as it stays connected.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct MonitorId(pub(crate) u32);

/// A connected display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monitor {
    pub id: MonitorId,
    pub name: String,
    /// Resolution in physical pixels.
    pub width: u32,
    pub height: u32,
}

/// What the platform reports about a monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

/// Owned map from platform monitor handle `H` to [`Monitor`].
///
/// Handles only need an ordering: winit's `MonitorHandle` is `Ord` but not
/// `Hash`.
///
/// The runtime calls [`MonitorRegistry::sync`] with the platform's current
/// monitor list; the registry diffs it against what it knows and reports
/// connects and disconnects as events.
#[derive(Debug)]
pub struct MonitorRegistry<H> {
    monitors: BTreeMap<H, Monitor>,
    next_id: u32,
}

impl<H> Default for MonitorRegistry<H> {
    fn default() -> Self {
        Self { monitors: BTreeMap::new(), next_id: 0 }
    }
}

impl<H: Ord + Clone> MonitorRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the known set with `current`.
    ///
    /// Returns disconnect events (ordered by id) followed by connect events
    /// (in the order given). Monitors present before and after keep their id.
    pub fn sync(&mut self, current: impl IntoIterator<Item = (H, MonitorInfo)>) -> Vec<Event> {
        let current: Vec<(H, MonitorInfo)> = current.into_iter().collect();

        let mut gone: Vec<H> = self
            .monitors
            .keys()
            .filter(|h| !current.iter().any(|(c, _)| c == *h))
            .cloned()
            .collect();
        gone.sort_by_key(|h| self.monitors[h].id);

        let mut events = Vec::new();
        for handle in gone {
            if let Some(m) = self.monitors.remove(&handle) {
                log::info!("monitor disconnected: {} ({:?})", m.name, m.id);
                events.push(Event::MonitorDisconnected(m));
            }
        }

        for (handle, info) in current {
            if self.monitors.contains_key(&handle) {
                continue;
            }
            let monitor = Monitor {
                id: MonitorId(self.next_id),
                name: info.name,
                width: info.width,
                height: info.height,
            };
            self.next_id += 1;
            log::info!("monitor connected: {} {}x{} ({:?})", monitor.name, monitor.width, monitor.height, monitor.id);
            self.monitors.insert(handle, monitor.clone());
            events.push(Event::MonitorConnected(monitor));
        }

        events
    }

    pub fn get(&self, id: MonitorId) -> Option<&Monitor> {
        self.monitors.values().find(|m| m.id == id)
    }

    /// Platform handle of a known monitor.
    pub fn handle(&self, id: MonitorId) -> Option<&H> {
        self.monitors.iter().find(|(_, m)| m.id == id).map(|(h, _)| h)
    }

    pub fn contains(&self, id: MonitorId) -> bool {
        self.get(id).is_some()
    }

    /// Known monitors ordered by id.
    pub fn monitors(&self) -> Vec<&Monitor> {
        let mut out: Vec<&Monitor> = self.monitors.values().collect();
        out.sort_by_key(|m| m.id);
        out
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str) -> MonitorInfo {
        MonitorInfo { name: name.into(), width: 1920, height: 1080 }
    }

    fn names(events: &[Event]) -> Vec<String> {
        events
            .iter()
            .map(|e| match e {
                Event::MonitorConnected(m) => format!("+{}", m.name),
                Event::MonitorDisconnected(m) => format!("-{}", m.name),
                other => panic!("unexpected event {other:?}"),
            })
            .collect()
    }

    #[test]
    fn first_sync_connects_everything() {
        let mut reg = MonitorRegistry::new();
        let events = reg.sync([(1u64, info("a")), (2, info("b"))]);
        assert_eq!(names(&events), vec!["+a", "+b"]);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn unchanged_list_produces_no_events() {
        let mut reg = MonitorRegistry::new();
        reg.sync([(1u64, info("a"))]);
        assert!(reg.sync([(1u64, info("a"))]).is_empty());
    }

    #[test]
    fn removal_and_addition_are_reported() {
        let mut reg = MonitorRegistry::new();
        reg.sync([(1u64, info("a")), (2, info("b"))]);
        let events = reg.sync([(2u64, info("b")), (3, info("c"))]);
        assert_eq!(names(&events), vec!["-a", "+c"]);
    }

    #[test]
    fn ids_survive_resync_and_are_never_reused() {
        let mut reg = MonitorRegistry::new();
        reg.sync([(1u64, info("a")), (2, info("b"))]);
        let b = reg.monitors()[1].id;

        reg.sync([(2u64, info("b"))]);
        assert_eq!(reg.get(b).map(|m| m.name.as_str()), Some("b"));
        assert_eq!(reg.handle(b), Some(&2));

        reg.sync([(2u64, info("b")), (1, info("a"))]);
        let a = reg.monitors().iter().find(|m| m.name == "a").map(|m| m.id);
        assert_eq!(a, Some(MonitorId(2)));
        assert!(!reg.contains(MonitorId(0)));
    }

    #[test]
    fn registry_accepts_winit_monitor_handles() {
        use winit::monitor::MonitorHandle;

        let mut reg: MonitorRegistry<MonitorHandle> = MonitorRegistry::new();
        assert!(reg.sync(std::iter::empty()).is_empty());
        assert!(reg.is_empty());
        assert!(reg.handle(MonitorId(0)).is_none());
        assert!(!reg.contains(MonitorId(0)));
        assert!(reg.monitors().is_empty());
    }
}
