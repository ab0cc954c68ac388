//! Macros for ergonomic watcher set construction.

/// Build a [`WatcherSet`](crate::race::WatcherSet) from `name => watcher`
/// pairs, in order.
///
/// # Example
///
/// ```
/// use raceway::race::{timers, Watcher, WatcherSet};
/// use raceway::watchers;
/// use std::time::Duration;
///
/// let set: WatcherSet<u32> = watchers! {
///     "success" => Watcher::resolves(async { 1 }),
///     "timeout" => timers::timeout(Duration::from_secs(30)),
/// };
///
/// assert_eq!(set.names(), vec!["success", "timeout"]);
/// ```
#[macro_export]
macro_rules! watchers {
    () => {
        $crate::race::WatcherSet::new()
    };
    (
        $($name:expr => $watcher:expr),+ $(,)?
    ) => {{
        let mut set = $crate::race::WatcherSet::new();
        $(
            set.insert($name, $watcher);
        )+
        set
    }};
}

#[cfg(test)]
mod tests {
    use crate::race::{timers, Watcher, WatcherSet};
    use std::time::Duration;

    #[test]
    fn watchers_macro_keeps_order() {
        let set: WatcherSet<u32> = watchers! {
            "error" => Watcher::fails(async { "boom" }),
            "success" => Watcher::resolves(async { 1 }),
            "timeout" => timers::timeout(Duration::from_millis(10)),
        };

        assert_eq!(set.names(), vec!["error", "success", "timeout"]);
    }

    #[test]
    fn watchers_macro_supports_empty_set() {
        let set: WatcherSet<u32> = watchers! {};
        assert!(set.is_empty());
    }

    #[test]
    fn watchers_macro_accepts_owned_names() {
        let target = String::from("reopened");
        let set: WatcherSet<u32> = watchers! {
            target.clone() => Watcher::resolves(async { 0 }),
        };

        assert!(set.contains(&target));
    }
}
