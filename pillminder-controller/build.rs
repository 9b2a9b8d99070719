//! Build script for pillminder-controller
//!
//! Validates the embedded pillminder.toml at compile time, so a broken
//! default configuration never reaches the appliance.

use std::fs;
use std::path::Path;

/// Sections the configuration may contain
const SECTIONS: [&str; 6] = ["general", "buttons", "leds", "sound", "input", "schedule"];

/// Button keys under `[buttons]`
const BUTTONS: [&str; 4] = ["up", "down", "back", "select"];

/// Number of pill slots, one light each
const SLOT_COUNT: usize = 4;

fn main() {
    validate_config();
}

/// Validate pillminder.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=pillminder.toml");
    println!("cargo:rerun-if-changed=build.rs");

    let config_path = Path::new("pillminder.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: pillminder.toml not found!                               ║\n\
            ║                                                                  ║\n\
            ║  The controller embeds pillminder.toml as its default            ║\n\
            ║  configuration. Please create one in pillminder-controller.      ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read pillminder.toml                           ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in pillminder.toml                   ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_buttons(&config, &mut errors);
    validate_leds(&config, &mut errors);
    validate_sound(&config, &mut errors);
    validate_schedule(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in pillminder.toml                 ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=pillminder.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Every top-level key must be a known section table
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let table = match config.as_table() {
        Some(t) => t,
        None => return,
    };

    for (name, value) in table {
        if !SECTIONS.contains(&name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

/// Pin ids are integers 0-255
fn check_pin(section: &str, key: &str, value: &toml::Value, errors: &mut Vec<String>) {
    match value {
        toml::Value::Integer(pin) if (0..=255).contains(pin) => {}
        toml::Value::Integer(_) => errors.push(format!("[{}] {} must be 0-255", section, key)),
        _ => errors.push(format!("[{}] {} must be an integer", section, key)),
    }
}

fn validate_buttons(config: &toml::Value, errors: &mut Vec<String>) {
    let buttons = match config.get("buttons").and_then(|b| b.as_table()) {
        Some(t) => t,
        None => return,
    };

    for (key, value) in buttons {
        if !BUTTONS.contains(&key.as_str()) {
            errors.push(format!("[buttons] unknown button '{}'", key));
            continue;
        }
        check_pin("buttons", key, value, errors);
    }
}

fn validate_leds(config: &toml::Value, errors: &mut Vec<String>) {
    let slots = match config.get("leds").and_then(|l| l.get("slots")) {
        Some(s) => s,
        None => return,
    };

    match slots.as_array() {
        Some(pins) => {
            if pins.len() != SLOT_COUNT {
                errors.push(format!("[leds] slots needs {} pins, one per slot", SLOT_COUNT));
            }
            for pin in pins {
                check_pin("leds", "slots", pin, errors);
            }
        }
        None => errors.push("[leds] slots must be an array".to_string()),
    }
}

fn validate_sound(config: &toml::Value, errors: &mut Vec<String>) {
    let sound = match config.get("sound").and_then(|s| s.as_table()) {
        Some(t) => t,
        None => return,
    };

    if let Some(beeps) = sound.get("beeps") {
        match beeps.as_integer() {
            Some(n) if n >= 0 => {}
            _ => errors.push("[sound] beeps must be a non-negative integer".to_string()),
        }
    }
    if let Some(interval) = sound.get("interval_ms") {
        match interval.as_integer() {
            Some(n) if n >= 0 => {}
            _ => errors.push("[sound] interval_ms must be a non-negative integer".to_string()),
        }
    }
}

fn validate_schedule(config: &toml::Value, errors: &mut Vec<String>) {
    let schedule = match config.get("schedule").and_then(|s| s.as_table()) {
        Some(t) => t,
        None => return,
    };

    if let Some(field) = schedule.get("hour_field") {
        match field.as_str() {
            Some("hour") | Some("second") => {}
            _ => errors.push("[schedule] hour_field must be 'hour' or 'second'".to_string()),
        }
    }
    for key in ["dir", "capture_inbox"] {
        if let Some(value) = schedule.get(key) {
            match value.as_str() {
                Some(s) if !s.is_empty() => {}
                _ => errors.push(format!("[schedule] {} must be a non-empty string", key)),
            }
        }
    }
}
