//! Command-line interface and REPL

use anyhow::{bail, Context, Result};
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::controls::{Color, OutputType, RingMode};
use crate::persistence::{parse_document, ParsedDocument};
use crate::propagation::{
    propagate_buttons, propagate_encoders, propagate_pads, propagate_potentiometers,
    ButtonScope, EncoderScope, PadScope, PotentiometerScope,
};
use crate::registry::Registry;
use crate::topology::{button_domain, potentiometer_kind, NavDirection, NAVIGATION};
use crate::transport::MidiTransport;
use crate::wire::{self, DumpOptions};

const HELP: &str = "\
Commands:
  get <collection> <index>                  show one control
  set <collection> <index> <field> <value>  change one field
  prop <family> <scope> <index> [keep]      copy a control onto its group
  dump [blocks]                             send the configuration to the device
  save [file]                               write the document
  load [file]                               replace the configuration from a document
  status                                    sync state, document, connection
  help                                      this text
  quit                                      leave

Collections: encoder pot button pad led nav
Families/scopes: button all|grid|control|column|row, encoder all|row|column,
                 pot all|faders, pad all|row|column";

/// Registry collection addressed from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Encoder,
    Potentiometer,
    Button,
    Pad,
    ButtonLed,
    NavLed,
}

impl FromStr for Collection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "encoder" | "enc" => Collection::Encoder,
            "pot" | "potentiometer" => Collection::Potentiometer,
            "button" | "btn" => Collection::Button,
            "pad" => Collection::Pad,
            "led" => Collection::ButtonLed,
            "nav" => Collection::NavLed,
            _ => bail!("unknown collection '{}'", s),
        })
    }
}

/// What the caller should do after a command
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Interactive editing state: the registry, the device and the current document
pub struct Session<T: MidiTransport> {
    pub registry: Registry,
    pub transport: T,
    pub options: DumpOptions,
    pub document: PathBuf,
}

impl<T: MidiTransport> Session<T> {
    pub fn new(registry: Registry, transport: T, options: DumpOptions, document: PathBuf) -> Self {
        Self {
            registry,
            transport,
            options,
            document,
        }
    }

    /// Run one command line
    pub fn execute(&mut self, line: &str) -> Result<Reply> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = words.split_first() else {
            return Ok(Reply::Text(String::new()));
        };
        debug!("REPL command: {}", line.trim());
        // Path argument of save/load: everything after the command word
        let rest = line
            .trim()
            .split_once(char::is_whitespace)
            .map(|(_, rest)| rest.trim())
            .unwrap_or("");

        let text = match command.to_ascii_lowercase().as_str() {
            "get" => {
                let [collection, index] = args else {
                    bail!("usage: get <collection> <index>");
                };
                describe(&self.registry, collection.parse()?, parse_index(index)?)?
            }
            "set" => {
                let [collection, index, field, value] = args else {
                    bail!("usage: set <collection> <index> <field> <value>");
                };
                let collection: Collection = collection.parse()?;
                let index = parse_index(index)?;
                set_field(&mut self.registry, collection, index, field, value)?;
                describe(&self.registry, collection, index)?
            }
            "prop" => {
                let (family, scope, index, keep) = match args {
                    [family, scope, index] => (family, scope, index, false),
                    [family, scope, index, flag] if flag.eq_ignore_ascii_case("keep") => {
                        (family, scope, index, true)
                    }
                    _ => bail!("usage: prop <family> <scope> <index> [keep]"),
                };
                propagate(&mut self.registry, family, scope, parse_index(index)?, keep)?;
                format!("propagated {} {} from {}", family, scope, index)
            }
            "dump" => {
                let mut options = self.options.clone();
                match args {
                    [] => {}
                    [flag] if flag.eq_ignore_ascii_case("blocks") => {
                        options.include_mapping_blocks = true
                    }
                    _ => bail!("usage: dump [blocks]"),
                }
                if !self.transport.is_connected() {
                    self.transport.open().context("Failed to open the device")?;
                }
                wire::dump(&mut self.registry, &mut self.transport, &options)?;
                "dump complete".to_string()
            }
            "save" => {
                let path = self.target(rest);
                self.registry.save_to_file(&path)?;
                let text = format!("saved {}", path.display());
                self.document = path;
                text
            }
            "load" => {
                let path = self.target(rest);
                self.registry
                    .load_from_file(&path)
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                let text = format!("loaded {}", path.display());
                self.document = path;
                text
            }
            "status" => format!(
                "{} | document {} | device {}",
                self.registry.sync_state(),
                self.document.display(),
                if self.transport.is_connected() { "connected" } else { "not connected" }
            ),
            "help" | "?" => HELP.to_string(),
            "quit" | "exit" => return Ok(Reply::Quit),
            other => bail!("unknown command '{}' (try 'help')", other),
        };

        Ok(Reply::Text(text))
    }

    fn target(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.document.clone()
        } else {
            PathBuf::from(path)
        }
    }
}

/// Read commands until `quit` or end of input
pub fn run_repl<T: MidiTransport>(session: &mut Session<T>) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    println!("{}", "Tweaker configuration shell, 'help' for commands".bold().cyan());

    loop {
        let prompt = if session.registry.is_synced() {
            "tweaker> "
        } else {
            "tweaker*> "
        };
        match rl.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                match session.execute(&line) {
                    Ok(Reply::Quit) => break,
                    Ok(Reply::Text(text)) if text.is_empty() => {}
                    Ok(Reply::Text(text)) => println!("{}", text),
                    Err(e) => println!("{} {:#}", "error:".red().bold(), e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

fn parse_index(text: &str) -> Result<usize> {
    text.parse()
        .with_context(|| format!("'{}' is not an index", text))
}

fn parse_byte(text: &str) -> Result<u8> {
    text.parse()
        .with_context(|| format!("'{}' is not a number 0-255", text))
}

fn parse_flag(text: &str) -> Result<bool> {
    match text.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => bail!("'{}' is not on/off", text),
    }
}

/// Field names follow the document keys, case-insensitively
pub fn set_field(
    registry: &mut Registry,
    collection: Collection,
    index: usize,
    field: &str,
    value: &str,
) -> Result<()> {
    let field_key = field.to_ascii_lowercase();
    let r = registry;

    match (collection, field_key.as_str()) {
        (Collection::Encoder, "ringmode") => r.set_encoder_ring_mode(index, value.parse::<RingMode>()?)?,
        (Collection::Encoder, "relativemode") => r.set_encoder_relative_mode(index, parse_flag(value)?)?,
        (Collection::Encoder, "speed") => r.set_encoder_speed(index, parse_byte(value)?)?,
        (Collection::Encoder, "localcontrol") => r.set_encoder_local_control(index, parse_flag(value)?)?,
        (Collection::Encoder, "mapping") => r.set_encoder_mapping(index, parse_byte(value)?)?,
        (Collection::Encoder, "channel") => r.set_encoder_channel(index, parse_byte(value)?)?,
        (Collection::Encoder, "ledmapping") => r.set_encoder_led_mapping(index, parse_byte(value)?)?,
        (Collection::Encoder, "ledchannel") => r.set_encoder_led_channel(index, parse_byte(value)?)?,

        (Collection::Potentiometer, "mapping") => r.set_potentiometer_mapping(index, parse_byte(value)?)?,
        (Collection::Potentiometer, "channel") => r.set_potentiometer_channel(index, parse_byte(value)?)?,

        (Collection::Button, "mapping") => r.set_button_mapping(index, parse_byte(value)?)?,
        (Collection::Button, "channel") => r.set_button_channel(index, parse_byte(value)?)?,
        (Collection::Button, "outputtype") => r.set_button_output_type(index, value.parse::<OutputType>()?)?,
        (Collection::Button, "speedcontrol") => r.set_button_speed_control(index, parse_flag(value)?)?,
        (Collection::Button, "localcontrol") => r.set_button_local_control(index, parse_flag(value)?)?,

        (Collection::Pad, "hitmapping") => r.set_pad_hit_mapping(index, parse_byte(value)?)?,
        (Collection::Pad, "hitchannel") => r.set_pad_hit_channel(index, parse_byte(value)?)?,
        (Collection::Pad, "retriggermapping") => r.set_pad_retrigger_mapping(index, parse_byte(value)?)?,
        (Collection::Pad, "retriggerchannel") => r.set_pad_retrigger_channel(index, parse_byte(value)?)?,
        (Collection::Pad, "ccretrigger17") => r.set_pad_cc_retrigger_17(index, parse_flag(value)?)?,
        (Collection::Pad, "ccretrigger8") => r.set_pad_cc_retrigger_8(index, parse_flag(value)?)?,
        (Collection::Pad, "onthresholdlow") => r.set_pad_on_threshold_low(index, parse_byte(value)?)?,
        (Collection::Pad, "onthresholdhigh") => r.set_pad_on_threshold_high(index, parse_byte(value)?)?,
        (Collection::Pad, "offthresholdlow") => r.set_pad_off_threshold_low(index, parse_byte(value)?)?,
        (Collection::Pad, "offthresholdhigh") => r.set_pad_off_threshold_high(index, parse_byte(value)?)?,
        (Collection::Pad, "resendrate") => r.set_pad_resend_rate(index, parse_byte(value)?)?,
        (Collection::Pad, "sensitivity") => r.set_pad_sensitivity(index, parse_byte(value)?)?,

        (Collection::ButtonLed, "color") => r.set_button_led_color(index, value.parse::<Color>()?)?,
        (Collection::ButtonLed, "mapping") => r.set_button_led_mapping(index, parse_byte(value)?)?,
        (Collection::ButtonLed, "channel") => r.set_button_led_channel(index, parse_byte(value)?)?,

        (Collection::NavLed, "status") => r.set_nav_led_status(index, parse_flag(value)?)?,
        (Collection::NavLed, "mapping") => r.set_nav_led_mapping(index, parse_byte(value)?)?,
        (Collection::NavLed, "channel") => r.set_nav_led_channel(index, parse_byte(value)?)?,

        _ => bail!("{:?} has no field '{}'", collection, field),
    }
    Ok(())
}

fn propagate(registry: &mut Registry, family: &str, scope: &str, source: usize, keep: bool) -> Result<()> {
    match family.to_ascii_lowercase().as_str() {
        "button" | "btn" => propagate_buttons(registry, scope.parse::<ButtonScope>()?, source, keep)?,
        "encoder" | "enc" => propagate_encoders(registry, scope.parse::<EncoderScope>()?, source, keep)?,
        "pot" | "potentiometer" => {
            propagate_potentiometers(registry, scope.parse::<PotentiometerScope>()?, source, keep)?
        }
        "pad" => propagate_pads(registry, scope.parse::<PadScope>()?, source, keep)?,
        _ => bail!("unknown family '{}'", family),
    }
    Ok(())
}

/// One-line description of a control
pub fn describe(registry: &Registry, collection: Collection, index: usize) -> Result<String> {
    let text = match collection {
        Collection::Encoder => {
            let e = registry.encoder(index)?;
            format!(
                "encoder {}: ringMode={} relativeMode={} speed={} localControl={} mapping={} channel={} ledMapping={} ledChannel={}",
                index,
                e.ring_mode(),
                e.relative_mode(),
                e.speed(),
                e.local_control(),
                e.mapping(),
                e.channel(),
                e.led_mapping(),
                e.led_channel()
            )
        }
        Collection::Potentiometer => {
            let p = registry.potentiometer(index)?;
            let kind = potentiometer_kind(index)
                .map(|k| format!(" ({:?})", k).to_lowercase())
                .unwrap_or_default();
            format!("pot {}{}: mapping={} channel={}", index, kind, p.mapping(), p.channel())
        }
        Collection::Button => {
            let b = registry.button(index)?;
            let domain = match button_domain(index) {
                Some(d) => format!("{:?}", d).to_lowercase(),
                None => "unused".to_string(),
            };
            format!(
                "button {} ({}): mapping={} channel={} outputType={} speedControl={} localControl={}",
                index,
                domain,
                b.mapping(),
                b.channel(),
                b.output_type(),
                b.speed_control(),
                b.local_control()
            )
        }
        Collection::Pad => {
            let p = registry.pad(index)?;
            format!(
                "pad {}: hit={}/{} retrigger={}/{} ccRetrigger17={} ccRetrigger8={} on={}/{} off={}/{} resendRate={} sensitivity={}",
                index,
                p.hit_mapping(),
                p.hit_channel(),
                p.retrigger_mapping(),
                p.retrigger_channel(),
                p.cc_retrigger_17(),
                p.cc_retrigger_8(),
                p.on_threshold_low(),
                p.on_threshold_high(),
                p.off_threshold_low(),
                p.off_threshold_high(),
                p.resend_rate(),
                p.sensitivity()
            )
        }
        Collection::ButtonLed => {
            let l = registry.button_led(index)?;
            format!("led {}: color={} mapping={} channel={}", index, l.color(), l.mapping(), l.channel())
        }
        Collection::NavLed => {
            let l = registry.nav_led(index)?;
            let direction = NavDirection::from_button(NAVIGATION.start + index)
                .map(|d| format!(" ({})", d))
                .unwrap_or_default();
            format!(
                "nav {}{}: status={} mapping={} channel={}",
                index,
                direction,
                if l.status() { "on" } else { "off" },
                l.mapping(),
                l.channel()
            )
        }
    };
    Ok(text)
}

/// Overview printed by `show`: every control grouped by collection
pub fn summary(registry: &Registry) -> Vec<String> {
    let sections = [
        (Collection::Encoder, registry.encoders().len()),
        (Collection::Potentiometer, registry.potentiometers().len()),
        (Collection::Button, crate::topology::ACTIVE_BUTTONS),
        (Collection::Pad, registry.pads().len()),
        (Collection::ButtonLed, registry.button_leds().len()),
        (Collection::NavLed, registry.nav_leds().len()),
    ];

    sections
        .into_iter()
        .flat_map(|(collection, len)| {
            (0..len).filter_map(move |i| describe(registry, collection, i).ok())
        })
        .collect()
}

/// Read and validate a document file, keeping its creation date
pub fn read_document(path: &Path) -> Result<ParsedDocument> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document =
        parse_document(&text).with_context(|| format!("Invalid document {}", path.display()))?;
    Ok(document)
}

/// Load a document file into a fresh registry
pub fn open_document(path: &Path) -> Result<Registry> {
    let mut registry = Registry::new();
    registry
        .load_from_file(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::RecordingTransport;

    fn session() -> Session<RecordingTransport> {
        Session::new(
            Registry::new(),
            RecordingTransport::default(),
            DumpOptions::default(),
            PathBuf::from("tweaker.json"),
        )
    }

    fn text(reply: Reply) -> String {
        match reply {
            Reply::Text(t) => t,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_set_and_get() {
        let mut s = session();
        let out = text(s.execute("set button 0 mapping 99").unwrap());
        assert!(out.contains("mapping=99"), "{}", out);
        assert_eq!(s.registry.button_mapping(0).unwrap(), 99);

        s.execute("set encoder 2 ringMode spread").unwrap();
        s.execute("set led 4 color b").unwrap();
        s.execute("set nav 1 status on").unwrap();
        s.execute("set button 3 outputType cc").unwrap();
        assert_eq!(s.registry.encoder_ring_mode(2).unwrap(), RingMode::Spread);
        assert_eq!(s.registry.button_led_color(4).unwrap(), Color::Blue);
        assert!(s.registry.nav_led_status(1).unwrap());
        assert_eq!(s.registry.button_output_type(3).unwrap(), OutputType::Cc);

        let out = text(s.execute("get nav 1").unwrap());
        assert!(out.contains("(center)") && out.contains("status=on"), "{}", out);
        assert!(text(s.execute("get nav 3").unwrap()).contains("(left)"));
        assert!(text(s.execute("get nav 2").unwrap()).contains("(down)"));
    }

    #[test]
    fn test_rejected_commands() {
        let mut s = session();
        assert!(s.execute("set encoder 0 speed 9").is_err());
        assert!(s.execute("set encoder 7 speed 3").is_err());
        assert!(s.execute("set pad 0 color red").is_err());
        assert!(s.execute("get dial 0").is_err());
        assert!(s.execute("frobnicate").is_err());
        assert_eq!(s.registry, Registry::new());
    }

    #[test]
    fn test_prop_command() {
        let mut s = session();
        s.execute("set button 0 mapping 99").unwrap();
        s.execute("prop button grid 0").unwrap();
        assert_eq!(s.registry.button_mapping(31).unwrap(), 99);

        s.execute("set encoder 1 speed 2").unwrap();
        s.execute("prop encoder column 1 keep").unwrap();
        assert_eq!(s.registry.encoder_speed(3).unwrap(), 2);
        assert_eq!(s.registry.encoder_mapping(3).unwrap(), 59);

        assert!(s.execute("prop encoder row 0").is_err());
        assert!(s.execute("prop pot diagonal 0").is_err());
        s.execute("prop pad all 3").unwrap();
    }

    #[test]
    fn test_dump_opens_device() {
        let mut s = session();
        let out = text(s.execute("dump blocks").unwrap());
        assert_eq!(out, "dump complete");
        assert_eq!(s.transport.opened, 1);
        assert_eq!(s.transport.sent.len(), 4 + 50);
        assert!(s.registry.is_synced());
        assert!(text(s.execute("status").unwrap()).starts_with("synced"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("set.json");
        let mut s = session();
        s.execute("set pad 2 sensitivity 1").unwrap();
        s.execute(&format!("save {}", path.display())).unwrap();
        assert_eq!(s.document, path);

        s.execute("set pad 2 sensitivity 4").unwrap();
        s.execute("load").unwrap();
        assert_eq!(s.registry.pad_sensitivity(2).unwrap(), 1);
        assert_eq!(open_document(&path).unwrap(), s.registry);
    }

    #[test]
    fn test_save_path_with_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live set 2.json");
        let mut s = session();
        s.execute("set button 7 channel 5").unwrap();
        s.execute(&format!("save   {}  ", path.display())).unwrap();
        assert!(path.is_file());
        assert_eq!(s.document, path);

        s.execute("set button 7 channel 1").unwrap();
        let out = text(s.execute(&format!("load {}", path.display())).unwrap());
        assert!(out.ends_with("live set 2.json"), "{}", out);
        assert_eq!(s.registry.button_channel(7).unwrap(), 5);
    }

    #[test]
    fn test_read_document_keeps_creation_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dated.json");
        Registry::new().save_to_file(&path).unwrap();

        let document = read_document(&path).unwrap();
        assert!(document.creation_date.is_some());
        assert_eq!(document.registry, Registry::new());
        assert!(read_document(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_quit_and_blank() {
        let mut s = session();
        assert_eq!(s.execute("quit").unwrap(), Reply::Quit);
        assert_eq!(s.execute("   ").unwrap(), Reply::Text(String::new()));
    }

    #[test]
    fn test_summary_covers_active_controls() {
        let lines = summary(&Registry::new());
        assert_eq!(lines.len(), 7 + 5 + 43 + 8 + 38 + 5);
        assert!(lines[7].contains("(knob)"));
    }
}
