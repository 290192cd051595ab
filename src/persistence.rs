//! Saved configuration documents
//!
//! A document is a JSON object with a `creation_date` and one array per registry
//! collection. Loading is all-or-nothing: the whole document is validated into a
//! staged registry first, and only a fully valid document replaces the live one.
//!
//! Enumerations use the compact codes older documents were written with: ring modes
//! and colours as single letters, button output type as a boolean (`true` = Note).

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::controls::{
    Button, Color, Encoder, MonoLed, OutputType, Pad, Potentiometer, RgbLed, RingMode,
};
use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::topology::{
    BUTTON_LED_COUNT, BUTTON_SLOTS, ENCODER_COUNT, NAV_LED_COUNT, PAD_COUNT, POTENTIOMETER_COUNT,
};

#[derive(Serialize)]
struct DocumentRef<'a> {
    creation_date: String,
    encoders: &'a [Encoder],
    potentiometers: &'a [Potentiometer],
    buttons: &'a [Button],
    pads: &'a [Pad],
    #[serde(rename = "butLeds")]
    but_leds: &'a [RgbLed],
    #[serde(rename = "navLeds")]
    nav_leds: &'a [MonoLed],
}

/// A validated document, not yet applied to any registry
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub creation_date: Option<String>,
    pub registry: Registry,
}

impl Registry {
    /// Serialize every collection to a pretty-printed document stamped with the current time
    pub fn to_document(&self) -> Result<String> {
        let doc = DocumentRef {
            creation_date: Local::now().to_rfc3339(),
            encoders: self.encoders(),
            potentiometers: self.potentiometers(),
            buttons: self.buttons(),
            pads: self.pads(),
            but_leds: self.button_leds(),
            nav_leds: self.nav_leds(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Validate `text` and replace every collection with its contents
    ///
    /// On error nothing is changed. The loaded registry is unsynced.
    pub fn load_document(&mut self, text: &str) -> Result<()> {
        let parsed = parse_document(text)?;
        self.commit(parsed.registry);
        Ok(())
    }

    /// Write the document next to `path` and move it into place
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let text = self.to_document()?;
        let tmp = temp_path(path);
        fs::write(&tmp, text)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path)?;
        match self.load_document(&text) {
            Ok(()) => {
                info!("Loaded configuration from {}", path.display());
                Ok(())
            }
            Err(e) => {
                warn!("Rejected {}: {}", path.display(), e);
                Err(e)
            }
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config.json".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

/// Parse and validate a document without touching any live registry
pub fn parse_document(text: &str) -> Result<ParsedDocument> {
    let root: Value = serde_json::from_str(text)?;
    let root = root
        .as_object()
        .ok_or_else(|| Error::document("document", "expected a JSON object"))?;

    let creation_date = match root.get("creation_date") {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(Error::document("creation_date", "expected a string")),
    };

    let mut staged = Registry::new();

    for (i, record) in records(root, "encoders", ENCODER_COUNT)?.iter().enumerate() {
        staged.encoders[i] = read_encoder(record)?;
    }
    for (i, record) in records(root, "potentiometers", POTENTIOMETER_COUNT)?.iter().enumerate() {
        staged.potentiometers[i] = read_potentiometer(record)?;
    }
    for (i, record) in records(root, "buttons", BUTTON_SLOTS)?.iter().enumerate() {
        staged.buttons[i] = read_button(record)?;
    }
    for (i, record) in records(root, "pads", PAD_COUNT)?.iter().enumerate() {
        staged.pads[i] = read_pad(record)?;
    }
    for (i, record) in records(root, "butLeds", BUTTON_LED_COUNT)?.iter().enumerate() {
        staged.but_leds[i] = read_rgb_led(record)?;
    }
    for (i, record) in records(root, "navLeds", NAV_LED_COUNT)?.iter().enumerate() {
        staged.nav_leds[i] = read_mono_led(record)?;
    }

    Ok(ParsedDocument {
        creation_date,
        registry: staged,
    })
}

/// One entity object inside a collection array
struct Record<'a> {
    collection: &'static str,
    index: usize,
    fields: &'a Map<String, Value>,
}

fn records<'a>(
    root: &'a Map<String, Value>,
    collection: &'static str,
    len: usize,
) -> Result<Vec<Record<'a>>> {
    let items = root
        .get(collection)
        .ok_or_else(|| Error::document(collection, "missing collection"))?
        .as_array()
        .ok_or_else(|| Error::document(collection, "expected an array"))?;

    if items.len() != len {
        return Err(Error::document(
            collection,
            format!("expected exactly {} entries, found {}", len, items.len()),
        ));
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let fields = item
                .as_object()
                .ok_or_else(|| Error::validation(collection, index, "*", "expected an object"))?;
            Ok(Record {
                collection,
                index,
                fields,
            })
        })
        .collect()
}

impl Record<'_> {
    fn reject(&self, field: &str, reason: impl Into<String>) -> Error {
        Error::validation(self.collection, self.index, field, reason)
    }

    fn value(&self, field: &str) -> Result<&Value> {
        self.fields
            .get(field)
            .ok_or_else(|| self.reject(field, "missing field"))
    }

    /// Integral JSON number that fits a byte; `5.0` is accepted, `5.5` is not
    fn byte(&self, field: &str) -> Result<u8> {
        let value = self.value(field)?;
        let number = value
            .as_i64()
            .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .ok_or_else(|| self.reject(field, format!("expected an integer, found {}", value)))?;
        u8::try_from(number).map_err(|_| self.reject(field, format!("value {} out of range", number)))
    }

    fn flag(&self, field: &str) -> Result<bool> {
        match self.value(field)? {
            Value::Bool(b) => Ok(*b),
            other => Err(self.reject(field, format!("expected a boolean, found {}", other))),
        }
    }

    fn code<T>(&self, field: &str, decode: fn(&str) -> Option<T>) -> Result<T> {
        match self.value(field)? {
            Value::String(s) => {
                decode(s).ok_or_else(|| self.reject(field, format!("unknown code '{}'", s)))
            }
            other => Err(self.reject(field, format!("expected a string, found {}", other))),
        }
    }

    /// Map an entity setter's range error onto this record
    fn store(&self, field: &str, result: Result<()>) -> Result<()> {
        result.map_err(|e| self.reject(field, e.to_string()))
    }
}

fn read_encoder(r: &Record<'_>) -> Result<Encoder> {
    let mut enc = Encoder::default();
    r.store("ringMode", enc.set_ring_mode(r.code("ringMode", RingMode::from_code)?))?;
    r.store("relativeMode", enc.set_relative_mode(r.flag("relativeMode")?))?;
    r.store("speed", enc.set_speed(r.byte("speed")?))?;
    r.store("localControl", enc.set_local_control(r.flag("localControl")?))?;
    r.store("mapping", enc.set_mapping(r.byte("mapping")?))?;
    r.store("channel", enc.set_channel(r.byte("channel")?))?;
    r.store("ledMapping", enc.set_led_mapping(r.byte("ledMapping")?))?;
    r.store("ledChannel", enc.set_led_channel(r.byte("ledChannel")?))?;
    Ok(enc)
}

fn read_potentiometer(r: &Record<'_>) -> Result<Potentiometer> {
    let mut pot = Potentiometer::default();
    r.store("mapping", pot.set_mapping(r.byte("mapping")?))?;
    r.store("channel", pot.set_channel(r.byte("channel")?))?;
    Ok(pot)
}

fn read_button(r: &Record<'_>) -> Result<Button> {
    let mut button = Button::default();
    r.store("mapping", button.set_mapping(r.byte("mapping")?))?;
    r.store("channel", button.set_channel(r.byte("channel")?))?;
    let output = OutputType::from_flag(r.flag("outputType")?);
    r.store("outputType", button.set_output_type(output))?;
    r.store("speedControl", button.set_speed_control(r.flag("speedControl")?))?;
    r.store("localControl", button.set_local_control(r.flag("localControl")?))?;
    Ok(button)
}

fn read_pad(r: &Record<'_>) -> Result<Pad> {
    let mut pad = Pad::default();
    r.store("hitMapping", pad.set_hit_mapping(r.byte("hitMapping")?))?;
    r.store("hitChannel", pad.set_hit_channel(r.byte("hitChannel")?))?;
    r.store("retriggerMapping", pad.set_retrigger_mapping(r.byte("retriggerMapping")?))?;
    r.store("retriggerChannel", pad.set_retrigger_channel(r.byte("retriggerChannel")?))?;
    r.store("ccRetrigger17", pad.set_cc_retrigger_17(r.flag("ccRetrigger17")?))?;
    r.store("ccRetrigger8", pad.set_cc_retrigger_8(r.flag("ccRetrigger8")?))?;
    r.store("onThresholdLow", pad.set_on_threshold_low(r.byte("onThresholdLow")?))?;
    r.store("onThresholdHigh", pad.set_on_threshold_high(r.byte("onThresholdHigh")?))?;
    r.store("offThresholdLow", pad.set_off_threshold_low(r.byte("offThresholdLow")?))?;
    r.store("offThresholdHigh", pad.set_off_threshold_high(r.byte("offThresholdHigh")?))?;
    r.store("resendRate", pad.set_resend_rate(r.byte("resendRate")?))?;
    r.store("sensitivity", pad.set_sensitivity(r.byte("sensitivity")?))?;
    Ok(pad)
}

fn read_rgb_led(r: &Record<'_>) -> Result<RgbLed> {
    let mut led = RgbLed::default();
    r.store("color", led.set_color(r.code("color", Color::from_code)?))?;
    r.store("mapping", led.set_mapping(r.byte("mapping")?))?;
    r.store("channel", led.set_channel(r.byte("channel")?))?;
    Ok(led)
}

fn read_mono_led(r: &Record<'_>) -> Result<MonoLed> {
    let mut led = MonoLed::default();
    r.store("status", led.set_status(r.flag("status")?))?;
    r.store("mapping", led.set_mapping(r.byte("mapping")?))?;
    r.store("channel", led.set_channel(r.byte("channel")?))?;
    Ok(led)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn customized() -> Registry {
        let mut reg = Registry::new();
        reg.set_encoder_ring_mode(2, RingMode::Walk).unwrap();
        reg.set_encoder_relative_mode(0, true).unwrap();
        reg.set_potentiometer_channel(4, 12).unwrap();
        reg.set_button_output_type(45, OutputType::Cc).unwrap();
        reg.set_pad_sensitivity(7, 0).unwrap();
        reg.set_pad_cc_retrigger_8(1, false).unwrap();
        reg.set_button_led_color(30, Color::Magenta).unwrap();
        reg.set_nav_led_status(1, true).unwrap();
        reg
    }

    fn edit(doc: &str, f: impl FnOnce(&mut Value)) -> String {
        let mut value: Value = serde_json::from_str(doc).unwrap();
        f(&mut value);
        value.to_string()
    }

    #[test]
    fn test_document_layout() {
        let doc: Value = serde_json::from_str(&Registry::new().to_document().unwrap()).unwrap();
        assert!(doc["creation_date"].is_string());
        assert_eq!(doc["encoders"].as_array().unwrap().len(), 7);
        assert_eq!(doc["buttons"].as_array().unwrap().len(), 50);
        assert_eq!(doc["butLeds"].as_array().unwrap().len(), 38);
        assert_eq!(doc["navLeds"].as_array().unwrap().len(), 5);
        assert_eq!(doc["encoders"][0]["ringMode"], "e");
        assert_eq!(doc["encoders"][0]["ledMapping"], 79);
        assert_eq!(doc["buttons"][0]["outputType"], true);
        assert_eq!(doc["pads"][0]["ccRetrigger17"], true);
        assert_eq!(doc["butLeds"][0]["color"], "o");
        assert_eq!(doc["navLeds"][0]["status"], false);
    }

    #[test]
    fn test_round_trip() {
        let source = customized();
        let mut target = Registry::new();
        target.load_document(&source.to_document().unwrap()).unwrap();
        assert_eq!(target, source);
        assert!(!target.is_synced());
    }

    #[test]
    fn test_missing_field_changes_nothing() {
        let doc = edit(&Registry::new().to_document().unwrap(), |v| {
            v["pads"][3].as_object_mut().unwrap().remove("sensitivity");
        });

        let mut reg = customized();
        reg.mark_synced();
        let before = reg.clone();

        let err = reg.load_document(&doc).unwrap_err();
        assert!(matches!(
            &err,
            Error::Validation { collection, index: 3, field, .. }
                if collection == "pads" && field == "sensitivity"
        ));
        assert_eq!(reg, before);
        assert!(reg.is_synced());
    }

    #[test]
    fn test_short_collection_rejected() {
        let doc = edit(&Registry::new().to_document().unwrap(), |v| {
            v["buttons"].as_array_mut().unwrap().truncate(43);
        });
        let err = parse_document(&doc).unwrap_err();
        assert!(err.to_string().contains("expected exactly 50 entries, found 43"));
    }

    #[test]
    fn test_out_of_range_and_wrong_types() {
        let base = Registry::new().to_document().unwrap();
        let cases: Vec<(&str, Box<dyn Fn(&mut Value)>)> = vec![
            ("speed", Box::new(|v: &mut Value| v["encoders"][2]["speed"] = 8.into())),
            ("channel", Box::new(|v: &mut Value| v["potentiometers"][0]["channel"] = 0.into())),
            ("mapping", Box::new(|v: &mut Value| v["buttons"][9]["mapping"] = "12".into())),
            ("outputType", Box::new(|v: &mut Value| v["buttons"][9]["outputType"] = 1.into())),
            ("resendRate", Box::new(|v: &mut Value| v["pads"][0]["resendRate"] = 5.5.into())),
            ("color", Box::new(|v: &mut Value| v["butLeds"][4]["color"] = "p".into())),
            ("ringMode", Box::new(|v: &mut Value| v["encoders"][0]["ringMode"] = "fill".into())),
            ("mapping", Box::new(|v: &mut Value| v["navLeds"][0]["mapping"] = (-1).into())),
        ];

        for (field, mutate) in cases {
            let doc = edit(&base, |v| mutate(v));
            match parse_document(&doc) {
                Err(Error::Validation { field: f, .. }) => assert_eq!(f, field),
                other => panic!("{} accepted: {:?}", field, other.map(|_| ())),
            }
        }
    }

    #[test]
    fn test_integral_float_accepted() {
        let doc = edit(&Registry::new().to_document().unwrap(), |v| {
            v["encoders"][1]["speed"] = 3.0.into();
        });
        let parsed = parse_document(&doc).unwrap();
        assert_eq!(parsed.registry.encoder_speed(1).unwrap(), 3);
        assert!(parsed.creation_date.is_some());
    }

    #[test]
    fn test_not_a_document() {
        assert!(matches!(parse_document("[1, 2]"), Err(Error::Validation { .. })));
        assert!(matches!(parse_document("{"), Err(Error::Json(_))));
        assert!(parse_document("{}").is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tweaker.json");

        let source = customized();
        source.save_to_file(&path).unwrap();
        assert!(!temp_path(&path).exists());

        let mut loaded = Registry::new();
        loaded.load_from_file(&path).unwrap();
        assert_eq!(loaded, source);

        assert!(matches!(
            loaded.load_from_file(&dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));
    }

    fn apply(reg: &mut Registry, kind: usize, index: usize, value: u8, flag: bool) {
        let _ = match kind {
            0 => reg.set_encoder_speed(index % 7, value % 8),
            1 => reg.set_encoder_ring_mode(index % 7, RingMode::ALL[value as usize % 4]),
            2 => reg.set_button_mapping(index, value),
            3 => reg.set_button_output_type(index, OutputType::from_flag(flag)),
            4 => reg.set_pad_on_threshold_high(index % 8, value),
            5 => reg.set_pad_resend_rate(index % 8, value % 16),
            6 => reg.set_button_led_color(index % 38, Color::ALL[value as usize % 8]),
            7 => reg.set_nav_led_status(index % 5, flag),
            _ => reg.set_potentiometer_channel(index % 5, value % 17),
        };
    }

    proptest! {
        #[test]
        fn prop_save_load_round_trip(
            ops in prop::collection::vec((0usize..9, 0usize..50, 0u8..=127, any::<bool>()), 0..40)
        ) {
            let mut source = Registry::new();
            for (kind, index, value, flag) in ops {
                apply(&mut source, kind, index, value, flag);
            }
            let mut target = Registry::new();
            target.load_document(&source.to_document().unwrap()).unwrap();
            prop_assert_eq!(target, source);
        }
    }
}
