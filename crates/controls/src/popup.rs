//! Feature popup: click to pin, hover to peek, optional reverse geocoding.
//!
//! Hover opening is debounced with a [`DelayTimer`] the host advances through
//! [`PopupController::tick`]. Reverse geocoding is split into
//! [`begin_geocode`](PopupController::begin_geocode) and
//! [`complete_geocode`](PopupController::complete_geocode) so the host can run
//! the lookup on its own executor while the popup keeps reacting to input. A
//! response for a coordinate the popup has since left is cached but never
//! shown.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use foundation::LngLat;
use formats::fields::{format_label, rules_for};
use formats::{Feature, FeatureDomain, FieldRule, FormattedField, NumberLocale, format_properties, format_value};
use layers::PickInfo;
use runtime::{DelayTimer, Listeners, Subscription};

use crate::geocode::{DEFAULT_GEOCODE_URL, GeocodeError, Geocoder, cache_key};

pub const DEFAULT_HOVER_DELAY: Duration = Duration::from_millis(300);
pub const DEFAULT_OFFSET: [f32; 2] = [0.0, -10.0];

/// Builds popup content from the picked feature and the id of its layer.
pub type ContentFormatter = Rc<dyn Fn(&Feature, &str) -> PopupContent>;

#[derive(Clone)]
pub struct PopupConfig {
    pub enabled: bool,
    pub show_on_hover: bool,
    pub show_on_click: bool,
    pub reverse_geocode: bool,
    pub geocode_url: String,
    pub hover_delay: Duration,
    pub format_content: Option<ContentFormatter>,
    /// Pixel offset of the popup anchor.
    pub offset: [f32; 2],
    pub close_on_click_outside: bool,
    pub show_close_button: bool,
    pub locale: NumberLocale,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            show_on_hover: true,
            show_on_click: true,
            reverse_geocode: false,
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            hover_delay: DEFAULT_HOVER_DELAY,
            format_content: None,
            offset: DEFAULT_OFFSET,
            close_on_click_outside: true,
            show_close_button: true,
            locale: NumberLocale::default(),
        }
    }
}

impl PopupConfig {
    pub fn with_reverse_geocode(mut self, on: bool) -> Self {
        self.reverse_geocode = on;
        self
    }

    pub fn with_hover_delay(mut self, delay: Duration) -> Self {
        self.hover_delay = delay;
        self
    }

    pub fn with_locale(mut self, locale: NumberLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_format_content(mut self, f: impl Fn(&Feature, &str) -> PopupContent + 'static) -> Self {
        self.format_content = Some(Rc::new(f));
        self
    }
}

impl fmt::Debug for PopupConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopupConfig")
            .field("enabled", &self.enabled)
            .field("show_on_hover", &self.show_on_hover)
            .field("show_on_click", &self.show_on_click)
            .field("reverse_geocode", &self.reverse_geocode)
            .field("geocode_url", &self.geocode_url)
            .field("hover_delay", &self.hover_delay)
            .field("format_content", &self.format_content.is_some())
            .field("offset", &self.offset)
            .field("close_on_click_outside", &self.close_on_click_outside)
            .field("show_close_button", &self.show_close_button)
            .field("locale", &self.locale.tag)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopupContent {
    pub title: String,
    pub fields: Vec<FormattedField>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PopupTrigger {
    Click,
    Hover,
    Manual,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopupState {
    pub open: bool,
    pub trigger: Option<PopupTrigger>,
    pub coordinate: Option<LngLat>,
    pub layer_id: Option<String>,
    pub content: Option<PopupContent>,
    pub address: Option<String>,
    /// A reverse lookup for the current coordinate is in flight.
    pub geocoding: bool,
}

/// Ticket for one reverse lookup, handed back to `complete_geocode`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeRequest {
    pub coordinate: LngLat,
    pub key: String,
}

#[derive(Debug, Clone)]
struct PendingOpen {
    coordinate: LngLat,
    layer_id: String,
    content: PopupContent,
}

pub struct PopupController {
    config: PopupConfig,
    state: PopupState,
    hover: DelayTimer<PendingOpen>,
    addresses: HashMap<String, String>,
    listeners: Listeners<PopupState>,
}

impl PopupController {
    pub fn new(config: PopupConfig) -> Self {
        Self {
            config,
            state: PopupState::default(),
            hover: DelayTimer::new(),
            addresses: HashMap::new(),
            listeners: Listeners::new(),
        }
    }

    pub fn config(&self) -> &PopupConfig {
        &self.config
    }

    pub fn state(&self) -> &PopupState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.open
    }

    pub fn hover_pending(&self) -> bool {
        self.hover.is_pending()
    }

    pub fn on_change(&self, callback: impl Fn(&PopupState) + 'static) -> Subscription {
        self.listeners.subscribe(callback)
    }

    /// Disabling closes the popup and drops any pending hover.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        if !enabled {
            self.hover.cancel();
            self.close();
        }
    }

    /// Opens at `coordinate` with caller-built content.
    pub fn open_at(&mut self, coordinate: LngLat, content: PopupContent) {
        if !self.config.enabled {
            return;
        }
        self.hover.cancel();
        self.open(coordinate, None, content, PopupTrigger::Manual);
    }

    pub fn close(&mut self) {
        if !self.state.open {
            return;
        }
        self.state = PopupState::default();
        tracing::debug!("popup closed");
        self.notify();
    }

    /// Click on a feature pins the popup there; a click on empty map closes it
    /// when `close_on_click_outside` is set.
    pub fn handle_click(&mut self, info: Option<&PickInfo>) {
        if !self.config.enabled || !self.config.show_on_click {
            return;
        }
        match info.and_then(hit_target) {
            Some((coordinate, feature, layer_id)) => {
                self.hover.cancel();
                let content = self.build_content(feature, layer_id);
                self.open(coordinate, Some(layer_id.to_string()), content, PopupTrigger::Click);
            }
            None => {
                if self.state.open && self.config.close_on_click_outside {
                    self.close();
                }
            }
        }
    }

    /// Schedules a hover popup, replacing any hover still waiting. Leaving
    /// all features cancels the wait and closes a hover popup. A popup pinned
    /// by click ignores hovering.
    pub fn handle_hover(&mut self, info: Option<&PickInfo>, now: Instant) {
        if !self.config.enabled || !self.config.show_on_hover {
            return;
        }
        if self.state.open && self.state.trigger == Some(PopupTrigger::Click) {
            return;
        }
        match info.and_then(hit_target) {
            Some((coordinate, feature, layer_id)) => {
                let pending = PendingOpen {
                    coordinate,
                    layer_id: layer_id.to_string(),
                    content: self.build_content(feature, layer_id),
                };
                self.hover.schedule(now, self.config.hover_delay, pending);
            }
            None => {
                self.hover.cancel();
                if self.state.open && self.state.trigger == Some(PopupTrigger::Hover) {
                    self.close();
                }
            }
        }
    }

    /// Opens a due hover popup. Returns whether one opened.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.hover.poll(now) {
            Some(p) => {
                self.open(p.coordinate, Some(p.layer_id), p.content, PopupTrigger::Hover);
                true
            }
            None => false,
        }
    }

    /// Starts a reverse lookup for the open popup, if one is needed. Cached
    /// addresses are applied immediately and yield no request, as does a
    /// lookup already in flight for the same opening.
    pub fn begin_geocode(&mut self) -> Option<GeocodeRequest> {
        if !self.config.reverse_geocode
            || !self.state.open
            || self.state.address.is_some()
            || self.state.geocoding
        {
            return None;
        }
        let coordinate = self.state.coordinate?;
        let key = cache_key(coordinate);
        if let Some(address) = self.addresses.get(&key) {
            self.state.address = Some(address.clone());
            self.notify();
            return None;
        }
        self.state.geocoding = true;
        self.notify();
        Some(GeocodeRequest { coordinate, key })
    }

    /// Applies a finished lookup. Successful results are always cached but
    /// only shown when the popup is still at the requested coordinate.
    /// Failures leave the popup open without an address.
    pub fn complete_geocode(
        &mut self,
        request: GeocodeRequest,
        result: Result<String, GeocodeError>,
    ) -> bool {
        let current = self.state.open.then_some(self.state.coordinate).flatten().map(cache_key);
        let is_current = current.as_deref() == Some(request.key.as_str());

        match result {
            Ok(address) => {
                self.addresses.insert(request.key.clone(), address.clone());
                if !is_current {
                    tracing::debug!(key = %request.key, "discarding stale geocode result");
                    return false;
                }
                self.state.address = Some(address);
                self.state.geocoding = false;
                self.notify();
                true
            }
            Err(err) => {
                tracing::warn!(%err, key = %request.key, "reverse geocoding failed");
                if is_current {
                    self.state.geocoding = false;
                    self.notify();
                }
                false
            }
        }
    }

    /// Runs one lookup to completion with `geocoder`.
    pub async fn resolve_address<G: Geocoder + ?Sized>(&mut self, geocoder: &G) -> bool {
        let Some(request) = self.begin_geocode() else {
            return false;
        };
        let result = geocoder.reverse(request.coordinate).await;
        self.complete_geocode(request, result)
    }

    fn open(
        &mut self,
        coordinate: LngLat,
        layer_id: Option<String>,
        content: PopupContent,
        trigger: PopupTrigger,
    ) {
        let address = if self.config.reverse_geocode {
            self.addresses.get(&cache_key(coordinate)).cloned()
        } else {
            None
        };
        self.state = PopupState {
            open: true,
            trigger: Some(trigger),
            coordinate: Some(coordinate),
            layer_id,
            content: Some(content),
            address,
            geocoding: false,
        };
        tracing::debug!(?trigger, lng = coordinate[0], lat = coordinate[1], "popup opened");
        self.notify();
    }

    fn build_content(&self, feature: &Feature, layer_id: &str) -> PopupContent {
        match &self.config.format_content {
            Some(f) => f(feature, layer_id),
            None => default_content(feature, layer_id, &self.config.locale),
        }
    }

    fn notify(&self) {
        self.listeners.emit(&self.state);
    }
}

impl Default for PopupController {
    fn default() -> Self {
        Self::new(PopupConfig::default())
    }
}

fn hit_target(info: &PickInfo) -> Option<(LngLat, &Feature, &str)> {
    let feature = info.feature.as_ref()?;
    let coordinate = info.coordinate.or_else(|| feature.anchor())?;
    Some((coordinate, feature, info.layer_id.as_str()))
}

/// Domain of a picked feature: from the layer id, else from telltale keys.
pub fn infer_domain(layer_id: &str, feature: &Feature) -> Option<FeatureDomain> {
    if let Some(d) = FeatureDomain::parse(layer_id) {
        return Some(d);
    }
    let has = |k: &str| feature.properties.contains_key(k);
    if has("zone_type") || has("max_height") {
        Some(FeatureDomain::Zoning)
    } else if has("building_type") || has("floors") || has("height") {
        Some(FeatureDomain::Building)
    } else if has("network_type") || has("depth") || has("diameter_mm") {
        Some(FeatureDomain::Subsurface)
    } else {
        None
    }
}

const GENERIC_RULE: FieldRule = FieldRule::new("", "", 0);

/// Field-table content for known domains; other features list every
/// non-empty property by key.
pub fn default_content(feature: &Feature, layer_id: &str, locale: &NumberLocale) -> PopupContent {
    let Some(domain) = infer_domain(layer_id, feature) else {
        let mut fields: Vec<FormattedField> = feature
            .properties
            .iter()
            .filter_map(|(k, v)| {
                format_value(v, &GENERIC_RULE, locale).map(|value| FormattedField {
                    key: k.clone(),
                    label: k.clone(),
                    value,
                })
            })
            .collect();
        fields.sort_by(|a, b| a.key.cmp(&b.key));
        return PopupContent {
            title: feature
                .id
                .as_ref()
                .map_or_else(|| "Feature".to_string(), ToString::to_string),
            fields,
        };
    };

    let title = match domain {
        FeatureDomain::Zoning => feature.string("zone_name").map(str::to_string),
        FeatureDomain::Building => feature.string("name").map(str::to_string),
        FeatureDomain::Subsurface => feature
            .property("facility_type")
            .or_else(|| feature.property("network_type"))
            .and_then(|v| format_label(v, locale)),
    }
    .unwrap_or_else(|| {
        match domain {
            FeatureDomain::Zoning => "Zoning",
            FeatureDomain::Building => "Building",
            FeatureDomain::Subsurface => "Utility",
        }
        .to_string()
    });

    PopupContent {
        title,
        fields: format_properties(&feature.properties, rules_for(domain), locale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formats::Geometry;
    use futures_util::future::BoxFuture;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TOKYO: LngLat = [139.7671, 35.6812];
    const SHINJUKU: LngLat = [139.7006, 35.6896];

    fn building_pick(at: LngLat) -> PickInfo {
        let feature = Feature::new(Geometry::Point(at))
            .with_property("name", "Marunouchi Tower")
            .with_property("building_type", "office")
            .with_property("height", 180.0)
            .with_property("floors", 38);
        PickInfo::hit("buildings", 0, feature, at)
    }

    fn miss() -> PickInfo {
        PickInfo {
            layer_id: "buildings".into(),
            index: None,
            feature: None,
            coordinate: Some(TOKYO),
            pixel: [10.0, 10.0],
        }
    }

    struct FakeGeocoder {
        calls: AtomicUsize,
        fail_with: Option<u16>,
    }

    impl FakeGeocoder {
        fn ok() -> Self {
            Self { calls: AtomicUsize::new(0), fail_with: None }
        }

        fn failing(status: u16) -> Self {
            Self { calls: AtomicUsize::new(0), fail_with: Some(status) }
        }
    }

    impl Geocoder for FakeGeocoder {
        fn reverse(&self, coord: LngLat) -> BoxFuture<'_, Result<String, GeocodeError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = match self.fail_with {
                Some(code) => Err(GeocodeError::Status(code)),
                None => Ok(format!("address at {}", cache_key(coord))),
            };
            Box::pin(async move { result })
        }
    }

    #[test]
    fn click_opens_with_building_fields() {
        let mut popup = PopupController::default();
        popup.handle_click(Some(&building_pick(TOKYO)));

        let state = popup.state();
        assert!(state.open);
        assert_eq!(state.trigger, Some(PopupTrigger::Click));
        assert_eq!(state.layer_id.as_deref(), Some("buildings"));
        let content = state.content.as_ref().unwrap();
        assert_eq!(content.title, "Marunouchi Tower");
        let rows: Vec<(&str, &str)> = content
            .fields
            .iter()
            .map(|f| (f.label.as_str(), f.value.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Name", "Marunouchi Tower"),
                ("Use", "Office"),
                ("Height", "180 m"),
                ("Floors", "38"),
            ]
        );
    }

    #[test]
    fn click_outside_closes() {
        let mut popup = PopupController::default();
        popup.handle_click(Some(&building_pick(TOKYO)));
        popup.handle_click(Some(&miss()));
        assert!(!popup.is_open());

        popup.handle_click(Some(&building_pick(TOKYO)));
        popup.handle_click(None);
        assert!(!popup.is_open());
    }

    #[test]
    fn hover_waits_for_the_delay_and_debounces() {
        let t0 = Instant::now();
        let mut popup = PopupController::default();

        popup.handle_hover(Some(&building_pick(TOKYO)), t0);
        assert!(!popup.tick(t0 + Duration::from_millis(299)));
        popup.handle_hover(Some(&building_pick(SHINJUKU)), t0 + Duration::from_millis(200));
        assert!(!popup.tick(t0 + Duration::from_millis(400)));
        assert!(popup.tick(t0 + Duration::from_millis(500)));

        assert_eq!(popup.state().coordinate, Some(SHINJUKU));
        assert_eq!(popup.state().trigger, Some(PopupTrigger::Hover));
        assert!(!popup.tick(t0 + Duration::from_secs(2)));
    }

    #[test]
    fn leaving_features_cancels_and_closes_hover() {
        let t0 = Instant::now();
        let mut popup = PopupController::default();
        popup.handle_hover(Some(&building_pick(TOKYO)), t0);
        popup.handle_hover(None, t0 + Duration::from_millis(100));
        assert!(!popup.hover_pending());
        assert!(!popup.tick(t0 + Duration::from_secs(1)));

        popup.handle_hover(Some(&building_pick(TOKYO)), t0);
        popup.tick(t0 + DEFAULT_HOVER_DELAY);
        assert!(popup.is_open());
        popup.handle_hover(Some(&miss()), t0 + Duration::from_secs(1));
        assert!(!popup.is_open());
    }

    #[test]
    fn pinned_popup_ignores_hover() {
        let t0 = Instant::now();
        let mut popup = PopupController::default();
        popup.handle_click(Some(&building_pick(TOKYO)));
        popup.handle_hover(Some(&building_pick(SHINJUKU)), t0);
        popup.handle_hover(None, t0);
        assert!(!popup.tick(t0 + Duration::from_secs(1)));
        assert_eq!(popup.state().coordinate, Some(TOKYO));
    }

    #[test]
    fn disabled_popup_does_nothing() {
        let mut popup = PopupController::default();
        popup.handle_click(Some(&building_pick(TOKYO)));
        popup.set_enabled(false);
        assert!(!popup.is_open());

        popup.handle_click(Some(&building_pick(TOKYO)));
        popup.open_at(TOKYO, PopupContent::default());
        assert!(!popup.is_open());
    }

    #[test]
    fn listeners_see_each_transition() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut popup = PopupController::default();
        let sink = Rc::clone(&seen);
        let sub = popup.on_change(move |s| sink.borrow_mut().push(s.open));

        popup.open_at(TOKYO, PopupContent::default());
        popup.close();
        popup.close();
        sub.unsubscribe();
        popup.open_at(TOKYO, PopupContent::default());

        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn custom_formatter_wins() {
        let mut popup = PopupController::new(
            PopupConfig::default().with_format_content(|f, layer| PopupContent {
                title: format!("{layer}:{}", f.string("name").unwrap_or("?")),
                fields: Vec::new(),
            }),
        );
        popup.handle_click(Some(&building_pick(TOKYO)));
        assert_eq!(
            popup.state().content.as_ref().map(|c| c.title.as_str()),
            Some("buildings:Marunouchi Tower")
        );
    }

    #[test]
    fn utility_content_is_inferred_from_properties() {
        let pipe = Feature::new(Geometry::LineString(vec![[0.0, 0.0], [1.0, 0.0]]))
            .with_property("network_type", "district_heating")
            .with_property("depth", -3.5);
        let content = default_content(&pipe, "access-points", &NumberLocale::DE_DE);
        assert_eq!(content.title, "District Heating");
        assert_eq!(content.fields[0].value, "District Heating");
        assert_eq!(content.fields[1].value, "3,5 m below grade");
    }

    #[tokio::test]
    async fn geocodes_once_per_coordinate() {
        let geocoder = FakeGeocoder::ok();
        let mut popup = PopupController::new(PopupConfig::default().with_reverse_geocode(true));

        popup.handle_click(Some(&building_pick(TOKYO)));
        assert!(popup.resolve_address(&geocoder).await);
        assert_eq!(
            popup.state().address.as_deref(),
            Some("address at 35.681200,139.767100")
        );

        popup.close();
        popup.handle_click(Some(&building_pick([139.76710004, 35.68120001])));
        assert!(popup.state().address.is_some());
        assert!(!popup.resolve_address(&geocoder).await);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_result_is_discarded() {
        let geocoder = FakeGeocoder::ok();
        let mut popup = PopupController::new(PopupConfig::default().with_reverse_geocode(true));

        popup.handle_click(Some(&building_pick(TOKYO)));
        let request = popup.begin_geocode().unwrap();
        assert!(popup.state().geocoding);

        popup.handle_click(Some(&building_pick(SHINJUKU)));
        let result = geocoder.reverse(request.coordinate).await;
        assert!(!popup.complete_geocode(request, result));
        assert_eq!(popup.state().coordinate, Some(SHINJUKU));
        assert_eq!(popup.state().address, None);

        // The stale answer still warms the cache.
        popup.handle_click(Some(&building_pick(TOKYO)));
        assert!(popup.state().address.is_some());
    }

    #[tokio::test]
    async fn failed_lookup_keeps_popup_open() {
        let geocoder = FakeGeocoder::failing(503);
        let mut popup = PopupController::new(PopupConfig::default().with_reverse_geocode(true));
        popup.handle_click(Some(&building_pick(TOKYO)));

        assert!(!popup.resolve_address(&geocoder).await);
        assert!(popup.is_open());
        assert!(!popup.state().geocoding);
        assert_eq!(popup.state().address, None);
    }

    #[test]
    fn one_lookup_in_flight_per_opening() {
        let mut popup = PopupController::new(PopupConfig::default().with_reverse_geocode(true));
        popup.handle_click(Some(&building_pick(TOKYO)));

        let first = popup.begin_geocode();
        assert!(first.is_some());
        assert_eq!(popup.begin_geocode(), None);

        // Reopening elsewhere starts a fresh opening.
        popup.handle_click(Some(&building_pick(SHINJUKU)));
        assert_eq!(
            popup.begin_geocode().map(|r| r.coordinate),
            Some(SHINJUKU)
        );
    }

    #[test]
    fn huge_hover_delay_never_opens() {
        let t0 = Instant::now();
        let mut popup = PopupController::new(PopupConfig::default().with_hover_delay(Duration::MAX));
        popup.handle_hover(Some(&building_pick(TOKYO)), t0);
        assert!(popup.hover_pending());
        assert!(!popup.tick(t0 + Duration::from_secs(86_400)));
        assert!(!popup.is_open());
    }

    #[test]
    fn no_geocoding_unless_configured() {
        let mut popup = PopupController::default();
        popup.handle_click(Some(&building_pick(TOKYO)));
        assert_eq!(popup.begin_geocode(), None);
    }
}
