use foundation::Color;
use elevation::{ELEVATION_LEVELS, ElevationRange};
use formats::{NumberLocale, fields::format_number};
use runtime::{Listeners, Subscription};

/// Order given to items registered without one; they sort last.
pub const DEFAULT_ORDER: u32 = 999;

#[derive(Debug, Clone, PartialEq)]
pub struct LegendConfig {
    pub title: String,
    pub show_feature_counts: bool,
    pub collapsed: bool,
    pub locale: NumberLocale,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            title: "Layers".to_string(),
            show_feature_counts: true,
            collapsed: false,
            locale: NumberLocale::default(),
        }
    }
}

/// One layer row as registered by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendItem {
    pub id: String,
    pub label: String,
    pub color: Color,
    pub visible: bool,
    pub order: u32,
    pub feature_count: Option<usize>,
    pub description: Option<String>,
}

impl LegendItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>, color: Color) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            color,
            visible: true,
            order: DEFAULT_ORDER,
            feature_count: None,
            description: None,
        }
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_feature_count(mut self, count: usize) -> Self {
        self.feature_count = Some(count);
        self
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

/// A row as displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub id: String,
    pub label: String,
    pub color: Color,
    pub visible: bool,
    /// Present only when counts are enabled and known.
    pub count_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendView {
    pub title: String,
    pub collapsed: bool,
    pub entries: Vec<LegendEntry>,
}

pub struct LegendController {
    config: LegendConfig,
    items: Vec<(u64, LegendItem)>,
    next_seq: u64,
    listeners: Listeners<LegendView>,
}

impl LegendController {
    pub fn new(config: LegendConfig) -> Self {
        Self {
            config,
            items: Vec::new(),
            next_seq: 0,
            listeners: Listeners::new(),
        }
    }

    pub fn config(&self) -> &LegendConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: &str) -> Option<&LegendItem> {
        self.items.iter().map(|(_, it)| it).find(|it| it.id == id)
    }

    /// Adds `item`, or updates the item with the same id in place.
    pub fn register(&mut self, item: LegendItem) {
        match self.items.iter_mut().find(|(_, it)| it.id == item.id) {
            Some((_, existing)) => *existing = item,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.items.push((seq, item));
            }
        }
        self.notify();
    }

    pub fn unregister(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|(_, it)| it.id != id);
        let removed = self.items.len() != before;
        if removed {
            self.notify();
        }
        removed
    }

    /// Flips visibility. Unknown ids are ignored and return false.
    pub fn toggle(&mut self, id: &str) -> bool {
        self.update(id, |it| it.visible = !it.visible)
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        self.update(id, |it| it.visible = visible)
    }

    pub fn set_feature_count(&mut self, id: &str, count: Option<usize>) -> bool {
        self.update(id, |it| it.feature_count = count)
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        if self.config.collapsed != collapsed {
            self.config.collapsed = collapsed;
            self.notify();
        }
    }

    pub fn is_visible(&self, id: &str) -> Option<bool> {
        self.item(id).map(|it| it.visible)
    }

    /// Rows sorted by `order`, ties in registration order.
    pub fn entries(&self) -> Vec<LegendEntry> {
        let mut sorted: Vec<&(u64, LegendItem)> = self.items.iter().collect();
        sorted.sort_by_key(|(seq, it)| (it.order, *seq));
        sorted
            .into_iter()
            .map(|(_, it)| LegendEntry {
                id: it.id.clone(),
                label: it.label.clone(),
                color: it.color,
                visible: it.visible,
                count_text: self
                    .config
                    .show_feature_counts
                    .then_some(it.feature_count)
                    .flatten()
                    .map(|n| format_number(n as f64, &self.config.locale, 0)),
            })
            .collect()
    }

    pub fn view(&self) -> LegendView {
        LegendView {
            title: self.config.title.clone(),
            collapsed: self.config.collapsed,
            entries: self.entries(),
        }
    }

    pub fn on_change(&self, callback: impl Fn(&LegendView) + 'static) -> Subscription {
        self.listeners.subscribe(callback)
    }

    fn update(&mut self, id: &str, f: impl FnOnce(&mut LegendItem)) -> bool {
        let Some((_, item)) = self.items.iter_mut().find(|(_, it)| it.id == id) else {
            return false;
        };
        f(item);
        tracing::debug!(id, visible = item.visible, "legend item updated");
        self.notify();
        true
    }

    fn notify(&self) {
        if self.listeners.is_empty() {
            return;
        }
        self.listeners.emit(&self.view());
    }
}

impl Default for LegendController {
    fn default() -> Self {
        Self::new(LegendConfig::default())
    }
}

/// One item per elevation band, highest band on top. Bands outside `range`
/// start hidden.
pub fn elevation_legend_items(range: &ElevationRange) -> Vec<LegendItem> {
    let n = ELEVATION_LEVELS.len() as u32;
    ELEVATION_LEVELS
        .iter()
        .enumerate()
        .map(|(i, level)| {
            LegendItem::new(level.id.as_str(), level.label, level.color)
                .with_order(n - 1 - i as u32)
                .with_visible(level.overlaps(range))
                .with_description(level.description)
        })
        .collect()
}
