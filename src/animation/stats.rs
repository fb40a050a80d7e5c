//! Headline stat counters and the fire-once visibility trigger.
//!
//! A stat counter is declared by a target string such as `"95%"`,
//! `"$1,250"`, `"3.5x"` or `"10000"`. The decoration decides how every frame
//! is printed; the numeric part is the animation's end value.

use std::collections::BTreeSet;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use super::{Clock, CounterAnimation};

/// `$` prefix, digits with optional thousands separators and decimals, then
/// an optional `%` or `x` suffix.
static TARGET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\$)?\s*([0-9][0-9,]*(?:\.[0-9]+)?)\s*(%|x)?\s*$")
        .expect("stat target regex must compile")
});

/// How a stat counter's frames are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatFormat {
    /// `42%`
    Percent,
    /// `$1,250`
    Currency,
    /// `3.5x`, animated in tenths.
    Multiplier,
    /// `10,000`
    Plain,
}

/// A parsed stat counter target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatCounter {
    pub format: StatFormat,
    pub target: f64,
}

impl StatCounter {
    /// Parse a target attribute. Returns `None` when there is no number.
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = TARGET_RE.captures(raw)?;
        let number: f64 = caps[2].replace(',', "").parse().ok()?;

        let format = match (caps.get(1).is_some(), caps.get(3).map(|m| m.as_str())) {
            (_, Some("%")) => StatFormat::Percent,
            (_, Some("x")) => StatFormat::Multiplier,
            (true, _) => StatFormat::Currency,
            _ => StatFormat::Plain,
        };

        Some(Self {
            format,
            target: number,
        })
    }

    /// Animation whose integer frames map onto this counter's display units.
    fn animation(&self, duration: Duration) -> CounterAnimation {
        let end = match self.format {
            StatFormat::Multiplier => self.target * 10.0,
            _ => self.target.trunc(),
        };
        CounterAnimation::new(0.0, end, duration)
    }

    /// Text shown for one animation frame.
    pub fn format_frame(&self, frame: i64) -> String {
        match self.format {
            StatFormat::Percent => format!("{frame}%"),
            StatFormat::Currency => format!("${}", group_thousands(frame)),
            StatFormat::Multiplier => format!("{:.1}x", frame as f64 / 10.0),
            StatFormat::Plain => group_thousands(frame),
        }
    }

    /// Text shown after `elapsed` of a `duration`-long animation.
    pub fn text_at(&self, duration: Duration, elapsed: Duration) -> String {
        self.format_frame(self.animation(duration).value_at(elapsed))
    }

    /// Animate to completion, passing each formatted frame to `on_frame`.
    pub fn run<F>(
        &self,
        duration: Duration,
        clock: &dyn Clock,
        frame_interval: Duration,
        mut on_frame: F,
    ) -> String
    where
        F: FnMut(&str),
    {
        let last = self
            .animation(duration)
            .run(clock, frame_interval, |v| on_frame(&self.format_frame(v)));
        self.format_frame(last)
    }
}

/// `1250000` -> `1,250,000`.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Visibility trigger
// ---------------------------------------------------------------------------

/// Fires once per observed key, the first time it becomes visible, and then
/// stops observing it.
#[derive(Debug, Clone)]
pub struct VisibilityTrigger<K: Ord> {
    observed: BTreeSet<K>,
}

impl<K: Ord> Default for VisibilityTrigger<K> {
    fn default() -> Self {
        Self {
            observed: BTreeSet::new(),
        }
    }
}

impl<K: Ord> VisibilityTrigger<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, key: K) {
        self.observed.insert(key);
    }

    pub fn is_observed(&self, key: &K) -> bool {
        self.observed.contains(key)
    }

    /// Report `key` as visible. Returns `true` only on the first report for
    /// an observed key.
    pub fn notify_visible(&mut self, key: &K) -> bool {
        self.observed.remove(key)
    }

    pub fn pending(&self) -> usize {
        self.observed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::tests::SteppedClock;

    #[test]
    fn parses_decorations() {
        let pct = StatCounter::parse("95%").unwrap();
        assert_eq!(pct.format, StatFormat::Percent);
        assert_eq!(pct.target, 95.0);

        let money = StatCounter::parse("$1,250").unwrap();
        assert_eq!(money.format, StatFormat::Currency);
        assert_eq!(money.target, 1250.0);

        let mult = StatCounter::parse("3.5x").unwrap();
        assert_eq!(mult.format, StatFormat::Multiplier);

        let plain = StatCounter::parse("10000").unwrap();
        assert_eq!(plain.format, StatFormat::Plain);

        assert!(StatCounter::parse("n/a").is_none());
        assert!(StatCounter::parse("").is_none());
    }

    #[test]
    fn frames_are_formatted() {
        let money = StatCounter::parse("$1,250").unwrap();
        assert_eq!(money.format_frame(1250), "$1,250");
        let plain = StatCounter::parse("10000").unwrap();
        assert_eq!(plain.format_frame(10000), "10,000");
        let mult = StatCounter::parse("3.5x").unwrap();
        assert_eq!(mult.format_frame(35), "3.5x");
    }

    #[test]
    fn counter_ends_on_target() {
        let duration = Duration::from_millis(2000);
        let clock = SteppedClock::new();
        let mult = StatCounter::parse("3.5x").unwrap();
        let mut frames = Vec::new();
        let last = mult.run(duration, &clock, Duration::from_millis(16), |f| {
            frames.push(f.to_string())
        });
        assert_eq!(last, "3.5x");
        assert_eq!(frames.first().map(String::as_str), Some("0.0x"));

        let pct = StatCounter::parse("86%").unwrap();
        assert_eq!(pct.text_at(duration, Duration::from_millis(1000)), "43%");
        assert_eq!(pct.text_at(duration, duration), "86%");
    }

    #[test]
    fn grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1_250_000), "1,250,000");
        assert_eq!(group_thousands(-4200), "-4,200");
    }

    #[test]
    fn trigger_fires_once() {
        let mut trigger = VisibilityTrigger::new();
        trigger.observe("customers");
        trigger.observe("accuracy");

        assert!(trigger.notify_visible(&"customers"));
        assert!(!trigger.notify_visible(&"customers"));
        assert!(!trigger.is_observed(&"customers"));
        assert!(!trigger.notify_visible(&"unknown"));
        assert_eq!(trigger.pending(), 1);
    }
}
