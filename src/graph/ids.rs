use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

/// Source of fresh node ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Monotonic counter ids: `"{prefix}{n}"`, starting at `start`.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>, start: u64) -> Self {
        Self {
            prefix: prefix.into(),
            next: start,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("", 1)
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Source of labels for newly committed workflow nodes.
pub trait LabelGenerator {
    fn next_label(&mut self) -> String;
}

const FOOD_LABELS: &[&str] = &[
    "🍔 Burger",
    "🌮 Taco",
    "🍕 Pizza",
    "🍜 Ramen",
    "🥗 Salad",
    "🍣 Sushi",
    "🥐 Croissant",
    "🍩 Donut",
    "🌯 Burrito",
    "🥞 Pancakes",
    "🧇 Waffle",
    "🥟 Dumpling",
];

/// Picks labels from a fixed food list.
pub struct RandomLabels {
    rng: StdRng,
}

impl RandomLabels {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible label sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomLabels {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelGenerator for RandomLabels {
    fn next_label(&mut self) -> String {
        FOOD_LABELS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or("Node")
            .to_string()
    }
}

/// Cycles through a caller-provided list; an empty list yields `"Node {n}"`.
#[derive(Debug, Clone, Default)]
pub struct FixedLabels {
    labels: Vec<String>,
    cursor: usize,
}

impl FixedLabels {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            cursor: 0,
        }
    }
}

impl LabelGenerator for FixedLabels {
    fn next_label(&mut self) -> String {
        let label = if self.labels.is_empty() {
            format!("Node {}", self.cursor + 1)
        } else {
            self.labels[self.cursor % self.labels.len()].clone()
        };
        self.cursor += 1;
        label
    }
}
