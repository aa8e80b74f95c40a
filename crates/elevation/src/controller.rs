use runtime::{Listeners, Subscription};
use serde_json::Value;

use crate::level::{ElevationLevel, levels_in_range};
use crate::preset::{ElevationPreset, get_preset, preset_for_range};
use crate::range::{ElevationRange, height_to_percent, is_in_elevation_range, percent_to_height};

#[derive(Debug, thiserror::Error)]
pub enum RangeJsonError {
    #[error("invalid elevation range json: {0}")]
    Invalid(#[from] serde_json::Error),
}

type ChangeCallback = Box<dyn Fn(&ElevationRange)>;

/// Construction options; anything left unset falls back to the full range and
/// no initial listener.
#[derive(Default)]
pub struct ElevationControllerOptions {
    pub initial_range: Option<ElevationRange>,
    pub on_change: Option<ChangeCallback>,
}

impl ElevationControllerOptions {
    pub fn with_initial_range(mut self, range: ElevationRange) -> Self {
        self.initial_range = Some(range);
        self
    }

    pub fn with_on_change(mut self, callback: impl Fn(&ElevationRange) + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }
}

/// Owns the visible vertical slice and broadcasts every change.
///
/// All setters clamp instead of failing, so the range always satisfies
/// `GLOBAL_MIN <= min < max <= GLOBAL_MAX`.
#[derive(Debug)]
pub struct ElevationRangeController {
    range: ElevationRange,
    listeners: Listeners<ElevationRange>,
}

impl ElevationRangeController {
    pub fn new(options: ElevationControllerOptions) -> Self {
        let range = options
            .initial_range
            .map(ElevationRange::clamped)
            .unwrap_or(ElevationRange::FULL);
        let listeners = Listeners::new();
        if let Some(cb) = options.on_change {
            // Installed for the controller's lifetime.
            let _ = listeners.subscribe(cb);
        }
        Self { range, listeners }
    }

    pub fn range(&self) -> ElevationRange {
        self.range
    }

    pub fn set_range(&mut self, range: ElevationRange) {
        let next = range.clamped();
        tracing::debug!(
            requested_min = range.min,
            requested_max = range.max,
            min = next.min,
            max = next.max,
            "elevation range changed"
        );
        self.range = next;
        self.listeners.emit(&next);
    }

    pub fn set_min(&mut self, min: f64) {
        self.set_range(ElevationRange::new(min, self.range.max));
    }

    pub fn set_max(&mut self, max: f64) {
        self.set_range(ElevationRange::new(self.range.min, max));
    }

    /// Applies the named preset. Unknown ids leave the range untouched and
    /// return `false`.
    pub fn apply_preset(&mut self, id: &str) -> bool {
        let Some(preset) = get_preset(id) else {
            tracing::debug!(preset = id, "unknown elevation preset ignored");
            return false;
        };
        self.set_range(preset.range);
        true
    }

    /// The preset whose range equals the current one exactly.
    pub fn current_preset(&self) -> Option<&'static ElevationPreset> {
        preset_for_range(&self.range)
    }

    pub fn visible_levels(&self) -> Vec<&'static ElevationLevel> {
        levels_in_range(&self.range)
    }

    pub fn is_visible(&self, height: f64) -> bool {
        self.range.contains(height)
    }

    pub fn is_feature_visible(&self, feature_min: f64, feature_max: f64) -> bool {
        is_in_elevation_range(feature_min, feature_max, &self.range)
    }

    pub fn height_to_percent(height: f64) -> f64 {
        height_to_percent(height)
    }

    pub fn percent_to_height(percent: f64) -> f64 {
        percent_to_height(percent)
    }

    /// Slider positions of the current range ends.
    pub fn range_percent(&self) -> (f64, f64) {
        (
            height_to_percent(self.range.min),
            height_to_percent(self.range.max),
        )
    }

    pub fn on_change(&self, callback: impl Fn(&ElevationRange) + 'static) -> Subscription {
        self.listeners.subscribe(callback)
    }

    pub fn reset(&mut self) {
        self.set_range(ElevationRange::FULL);
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({ "min": self.range.min, "max": self.range.max })
    }

    /// Restores a range produced by [`Self::to_json`]; the value is clamped
    /// and listeners are notified like any other change.
    pub fn from_json(&mut self, value: Value) -> Result<(), RangeJsonError> {
        let range: ElevationRange = serde_json::from_value(value)?;
        self.set_range(range);
        Ok(())
    }

    pub fn from_json_str(&mut self, payload: &str) -> Result<(), RangeJsonError> {
        let range: ElevationRange = serde_json::from_str(payload)?;
        self.set_range(range);
        Ok(())
    }
}

impl Default for ElevationRangeController {
    fn default() -> Self {
        Self::new(ElevationControllerOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::ElevationLevelId;
    use crate::range::{GLOBAL_MAX, GLOBAL_MIN};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<ElevationRange>>>, impl Fn(&ElevationRange) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |r: &ElevationRange| sink.borrow_mut().push(*r))
    }

    #[test]
    fn defaults_to_global_bound() {
        let c = ElevationRangeController::default();
        assert_eq!(c.range(), ElevationRange::new(-50.0, 200.0));
        assert_eq!(c.current_preset().map(|p| p.id), Some("all"));
    }

    #[test]
    fn initial_range_and_listener_from_options() {
        let (log, cb) = recorder();
        let mut c = ElevationRangeController::new(
            ElevationControllerOptions::default()
                .with_initial_range(ElevationRange::new(-20.0, 10.0))
                .with_on_change(cb),
        );
        assert_eq!(c.range(), ElevationRange::new(-20.0, 10.0));
        assert!(log.borrow().is_empty());

        c.set_max(30.0);
        assert_eq!(*log.borrow(), vec![ElevationRange::new(-20.0, 30.0)]);
    }

    #[test]
    fn inverted_input_is_corrected() {
        let mut c = ElevationRangeController::default();
        c.set_range(ElevationRange::new(100.0, 50.0));
        assert_eq!(c.range(), ElevationRange::new(49.0, 50.0));
    }

    #[test]
    fn out_of_bound_input_is_clamped() {
        let mut c = ElevationRangeController::default();
        c.set_range(ElevationRange::new(-500.0, 900.0));
        assert_eq!(c.range(), ElevationRange::FULL);

        c.set_min(250.0);
        let r = c.range();
        assert!(r.min < r.max && r.min >= GLOBAL_MIN && r.max <= GLOBAL_MAX);
        assert_eq!(r, ElevationRange::new(199.0, 200.0));
    }

    #[test]
    fn apply_subsurface_preset() {
        let mut c = ElevationRangeController::default();
        assert!(c.apply_preset("subsurface"));
        assert_eq!(c.range(), ElevationRange::new(-50.0, 0.0));
        assert_eq!(c.current_preset().map(|p| p.id), Some("subsurface"));
    }

    #[test]
    fn unknown_preset_is_a_no_op() {
        let (log, cb) = recorder();
        let mut c = ElevationRangeController::default();
        let _sub = c.on_change(cb);
        c.set_range(ElevationRange::new(-10.0, 5.0));

        assert!(!c.apply_preset("mantle"));
        assert_eq!(c.range(), ElevationRange::new(-10.0, 5.0));
        assert_eq!(log.borrow().len(), 1);
        assert!(c.current_preset().is_none());
    }

    #[test]
    fn listeners_fire_once_each_in_order() {
        let c_log: Rc<RefCell<Vec<(&str, ElevationRange)>>> = Rc::new(RefCell::new(Vec::new()));
        let mut c = ElevationRangeController::default();

        let first = Rc::clone(&c_log);
        let _a = c.on_change(move |r| first.borrow_mut().push(("first", *r)));
        let second = Rc::clone(&c_log);
        let _b = c.on_change(move |r| second.borrow_mut().push(("second", *r)));

        c.set_range(ElevationRange::new(0.0, 50.0));
        let expected = ElevationRange::new(0.0, 50.0);
        assert_eq!(*c_log.borrow(), vec![("first", expected), ("second", expected)]);
    }

    #[test]
    fn unsubscribed_listener_is_silent() {
        let (log, cb) = recorder();
        let mut c = ElevationRangeController::default();
        let sub = c.on_change(cb);
        c.reset();
        sub.unsubscribe();
        c.set_min(0.0);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn visible_levels_follow_range() {
        let mut c = ElevationRangeController::default();
        c.set_range(ElevationRange::new(12.0, 40.0));
        let ids: Vec<_> = c.visible_levels().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![ElevationLevelId::LowRise, ElevationLevelId::MidRise]);
        assert_eq!(ElevationRangeController::default().visible_levels().len(), 6);
    }

    #[test]
    fn point_and_feature_visibility() {
        let mut c = ElevationRangeController::default();
        c.set_range(ElevationRange::new(0.0, 50.0));
        assert!(c.is_visible(0.0));
        assert!(c.is_visible(50.0));
        assert!(!c.is_visible(-0.5));
        assert!(c.is_feature_visible(-10.0, 0.0));
        assert!(!c.is_feature_visible(-50.0, -10.0));
        assert!(c.is_feature_visible(-20.0, 120.0));
    }

    #[test]
    fn percent_helpers() {
        assert_eq!(ElevationRangeController::height_to_percent(0.0), 20.0);
        assert_eq!(ElevationRangeController::percent_to_height(60.0), 100.0);
        let mut c = ElevationRangeController::default();
        c.set_range(ElevationRange::new(0.0, 75.0));
        assert_eq!(c.range_percent(), (20.0, 50.0));
    }

    #[test]
    fn json_round_trip() {
        let mut a = ElevationRangeController::default();
        a.set_range(ElevationRange::new(-20.0, 35.5));
        let json = a.to_json();
        assert_eq!(json, serde_json::json!({ "min": -20.0, "max": 35.5 }));

        let mut b = ElevationRangeController::default();
        b.from_json(json).expect("restore");
        assert_eq!(b.range(), a.range());
    }

    #[test]
    fn json_restore_clamps_and_rejects_garbage() {
        let mut c = ElevationRangeController::default();
        c.from_json_str(r#"{"min": 300, "max": -100}"#).expect("restore");
        let r = c.range();
        assert!(r.min < r.max);

        assert!(c.from_json_str(r#"{"low": 1}"#).is_err());
        assert_eq!(c.range(), r);
    }
}
