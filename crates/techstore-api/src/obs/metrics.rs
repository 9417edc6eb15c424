//! Process-wide counter/gauge registry with Prometheus text rendering.
//!
//! Families are keyed by name and hold one atomic sample per observed label
//! set, backed by `DashMap`. Labels are flattened into sorted key vectors so
//! the same set always maps to the same sample. Gauges store the `f64` bit
//! pattern in an `AtomicU64`.
//!
//! A registered family with no observed label set renders its `# HELP` and
//! `# TYPE` lines only. The uptime gauge is computed at render time and never
//! stored.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::Ref;
use dashmap::DashMap;

type LabelKey = Vec<(String, String)>;

/// Name (without prefix) of the derived uptime gauge.
pub const UPTIME_SECONDS: &str = "uptime_seconds";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// HELP text escapes only backslash and newline.
fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Sorted, deduplicated label set. Invalid names are dropped; for a repeated
/// name the first value given wins.
fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .filter(|(k, _)| {
            let ok = is_valid_label_name(k);
            if !ok {
                tracing::warn!(label = %k, "invalid label name ignored");
            }
            ok
        })
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort_by(|a, b| a.0.cmp(&b.0));
    key.dedup_by(|later, earlier| later.0 == earlier.0);
    key
}

fn format_labels(key: &LabelKey) -> String {
    if key.is_empty() {
        return String::new();
    }
    let inner = key
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{inner}}}")
}

fn format_gauge(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v == f64::INFINITY {
        "+Inf".into()
    } else if v == f64::NEG_INFINITY {
        "-Inf".into()
    } else {
        v.to_string()
    }
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`, excluding the reserved `__` prefix.
pub fn is_valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

struct Family {
    kind: MetricKind,
    help: String,
    samples: DashMap<LabelKey, AtomicU64>,
}

impl Family {
    fn new(kind: MetricKind, help: String) -> Self {
        Self {
            kind,
            help,
            samples: DashMap::new(),
        }
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", name, escape_help(&self.help));
        let _ = writeln!(out, "# TYPE {} {}", name, self.kind.as_str());

        let mut rows: Vec<(LabelKey, u64)> = self
            .samples
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, raw) in rows {
            let value = match self.kind {
                MetricKind::Counter => raw.to_string(),
                MetricKind::Gauge => format_gauge(f64::from_bits(raw)),
            };
            let _ = writeln!(out, "{}{} {}", name, format_labels(&key), value);
        }
    }
}

/// Named counters and gauges shared by every request handler.
pub struct CounterRegistry {
    prefix: String,
    families: DashMap<String, Family>,
    started: Instant,
}

impl Default for CounterRegistry {
    fn default() -> Self {
        Self::new("")
    }
}

impl CounterRegistry {
    /// Create a registry. A non-empty `prefix` is prepended as `<prefix>_`
    /// to every family name when rendering.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            families: DashMap::new(),
            started: Instant::now(),
        }
    }

    /// Declare a counter family with its help text.
    pub fn register_counter(&self, name: &str, help: &str) {
        self.register(name, MetricKind::Counter, help);
    }

    /// Declare a gauge family with its help text.
    pub fn register_gauge(&self, name: &str, help: &str) {
        self.register(name, MetricKind::Gauge, help);
    }

    fn register(&self, name: &str, kind: MetricKind, help: &str) {
        if !self.accepts(name) {
            return;
        }
        match self.families.entry(name.to_string()) {
            Entry::Occupied(mut e) => {
                let fam = e.get_mut();
                if fam.kind != kind {
                    tracing::warn!(metric = %name, existing = fam.kind.as_str(), requested = kind.as_str(), "metric kind clash on register");
                    return;
                }
                fam.help = help.to_string();
            }
            Entry::Vacant(e) => {
                e.insert(Family::new(kind, help.to_string()));
            }
        }
    }

    /// Increment the unlabelled sample of `name` by 1.
    pub fn increment(&self, name: &str) {
        self.increment_with(name, &[]);
    }

    /// Increment the sample of `name` for this label set by 1.
    pub fn increment_with(&self, name: &str, labels: &[(&str, &str)]) {
        let Some(fam) = self.family(name, MetricKind::Counter) else {
            return;
        };
        let counter = fam
            .samples
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Overwrite the unlabelled sample of gauge `name`.
    pub fn set_gauge(&self, name: &str, value: f64) {
        self.set_gauge_with(name, &[], value);
    }

    /// Overwrite the sample of gauge `name` for this label set.
    pub fn set_gauge_with(&self, name: &str, labels: &[(&str, &str)], value: f64) {
        let Some(fam) = self.family(name, MetricKind::Gauge) else {
            return;
        };
        let bits = value.to_bits();
        match fam.samples.entry(label_key(labels)) {
            Entry::Occupied(e) => e.get().store(bits, Ordering::Relaxed),
            Entry::Vacant(e) => {
                e.insert(AtomicU64::new(bits));
            }
        };
    }

    /// Current counter value for a label set, if observed.
    pub fn counter_value(&self, name: &str, labels: &[(&str, &str)]) -> Option<u64> {
        let fam = self.families.get(name)?;
        if fam.kind != MetricKind::Counter {
            return None;
        }
        let v = fam.samples.get(&label_key(labels))?.load(Ordering::Relaxed);
        Some(v)
    }

    /// Current gauge value for a label set, if observed.
    pub fn gauge_value(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        let fam = self.families.get(name)?;
        if fam.kind != MetricKind::Gauge {
            return None;
        }
        let bits = fam.samples.get(&label_key(labels))?.load(Ordering::Relaxed);
        Some(f64::from_bits(bits))
    }

    /// Time since the registry was constructed.
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Render every family in Prometheus text exposition format.
    ///
    /// Families are sorted by name, samples by label set. The derived uptime
    /// gauge comes last.
    pub fn render(&self) -> String {
        let mut names: Vec<String> = self.families.iter().map(|r| r.key().clone()).collect();
        names.sort();

        let mut out = String::new();
        for name in &names {
            if let Some(fam) = self.families.get(name) {
                fam.render(&self.full_name(name), &mut out);
            }
        }

        let uptime = self.full_name(UPTIME_SECONDS);
        let _ = writeln!(out, "# HELP {} Seconds since the process started.", uptime);
        let _ = writeln!(out, "# TYPE {} gauge", uptime);
        let _ = writeln!(out, "{} {}", uptime, self.uptime().as_secs());
        out
    }

    fn full_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}_{}", self.prefix, name)
        }
    }

    fn accepts(&self, name: &str) -> bool {
        if name == UPTIME_SECONDS {
            tracing::warn!(metric = %name, "metric name is reserved for the derived uptime gauge");
            return false;
        }
        if !is_valid_metric_name(name) {
            tracing::warn!(metric = %name, "invalid metric name ignored");
            return false;
        }
        true
    }

    /// Look up a family of the given kind, creating it on first use.
    fn family(&self, name: &str, kind: MetricKind) -> Option<Ref<'_, String, Family>> {
        if !self.families.contains_key(name) {
            if !self.accepts(name) {
                return None;
            }
            self.families
                .entry(name.to_string())
                .or_insert_with(|| Family::new(kind, format!("{} {}", kind.as_str(), name)));
        }
        let fam = self.families.get(name)?;
        if fam.kind != kind {
            tracing::warn!(metric = %name, existing = fam.kind.as_str(), requested = kind.as_str(), "metric kind clash ignored");
            return None;
        }
        Some(fam)
    }
}
