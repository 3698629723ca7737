// SPDX-License-Identifier: GPL-3.0-only

//! libinput-style per-device configuration, matched by identifier glob in
//! insertion order and applied through the seam on hotplug or edit.

use std::fmt;

use crate::util::globber;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventsState {
    Enabled,
    Disabled,
    DisabledOnExternalMouse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccelProfile {
    None,
    Flat,
    Adaptive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickMethod {
    None,
    ButtonAreas,
    Clickfinger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapButtonMap {
    LeftRightMiddle,
    LeftMiddleRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMethod {
    None,
    TwoFinger,
    Edge,
    Button,
}

/// Sparse settings record; unset fields leave the device default alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSettings {
    pub events: Option<EventsState>,
    pub accel_profile: Option<AccelProfile>,
    pub pointer_accel: Option<f32>,
    pub click_method: Option<ClickMethod>,
    pub drag: Option<bool>,
    pub drag_lock: Option<bool>,
    pub disable_while_typing: Option<bool>,
    pub middle_emulation: Option<bool>,
    pub natural_scroll: Option<bool>,
    pub left_handed: Option<bool>,
    pub tap: Option<bool>,
    pub tap_button_map: Option<TapButtonMap>,
    pub scroll_method: Option<ScrollMethod>,
    pub scroll_button: Option<u32>,
    pub map_to_output: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown input setting: {0}")]
    UnknownSetting(String),
    #[error("invalid value for {setting}: {value}")]
    InvalidValue { setting: String, value: String },
}

fn parse_bool(setting: &str, value: &str) -> Result<bool, InputError> {
    match value {
        "enabled" => Ok(true),
        "disabled" => Ok(false),
        _ => Err(InputError::InvalidValue {
            setting: setting.to_owned(),
            value: value.to_owned(),
        }),
    }
}

impl InputSettings {
    /// Apply one `input` command setting.
    pub fn set(&mut self, setting: &str, value: &str) -> Result<(), InputError> {
        let invalid = || InputError::InvalidValue {
            setting: setting.to_owned(),
            value: value.to_owned(),
        };
        match setting {
            "events" => {
                self.events = Some(match value {
                    "enabled" => EventsState::Enabled,
                    "disabled" => EventsState::Disabled,
                    "disabled-on-external-mouse" => EventsState::DisabledOnExternalMouse,
                    _ => return Err(invalid()),
                })
            }
            "accel-profile" => {
                self.accel_profile = Some(match value {
                    "none" => AccelProfile::None,
                    "flat" => AccelProfile::Flat,
                    "adaptive" => AccelProfile::Adaptive,
                    _ => return Err(invalid()),
                })
            }
            "pointer-accel" => {
                let accel: f32 = value.parse().map_err(|_| invalid())?;
                if !(-1.0..=1.0).contains(&accel) {
                    return Err(invalid());
                }
                self.pointer_accel = Some(accel);
            }
            "click-method" => {
                self.click_method = Some(match value {
                    "none" => ClickMethod::None,
                    "button-areas" => ClickMethod::ButtonAreas,
                    "clickfinger" => ClickMethod::Clickfinger,
                    _ => return Err(invalid()),
                })
            }
            "drag" => self.drag = Some(parse_bool(setting, value)?),
            "drag-lock" => self.drag_lock = Some(parse_bool(setting, value)?),
            "disable-while-typing" => {
                self.disable_while_typing = Some(parse_bool(setting, value)?)
            }
            "middle-emulation" => self.middle_emulation = Some(parse_bool(setting, value)?),
            "natural-scroll" => self.natural_scroll = Some(parse_bool(setting, value)?),
            "left-handed" => self.left_handed = Some(parse_bool(setting, value)?),
            "tap" => self.tap = Some(parse_bool(setting, value)?),
            "tap-button-map" => {
                self.tap_button_map = Some(match value {
                    "left-right-middle" => TapButtonMap::LeftRightMiddle,
                    "left-middle-right" => TapButtonMap::LeftMiddleRight,
                    _ => return Err(invalid()),
                })
            }
            "scroll-method" => {
                self.scroll_method = Some(match value {
                    "none" => ScrollMethod::None,
                    "two-finger" => ScrollMethod::TwoFinger,
                    "edge" => ScrollMethod::Edge,
                    "button" => ScrollMethod::Button,
                    _ => return Err(invalid()),
                })
            }
            "scroll-button" => {
                self.scroll_button =
                    Some(crate::input::pointer::parse_button(value).ok_or_else(invalid)?)
            }
            "map-to-output" => self.map_to_output = Some(value.to_owned()),
            _ => return Err(InputError::UnknownSetting(setting.to_owned())),
        }
        Ok(())
    }

    /// Merge another record over this one.
    pub fn merge(&mut self, other: &InputSettings) {
        macro_rules! take {
            ($field:ident) => {
                if other.$field.is_some() {
                    self.$field = other.$field.clone();
                }
            };
        }
        take!(events);
        take!(accel_profile);
        take!(pointer_accel);
        take!(click_method);
        take!(drag);
        take!(drag_lock);
        take!(disable_while_typing);
        take!(middle_emulation);
        take!(natural_scroll);
        take!(left_handed);
        take!(tap);
        take!(tap_button_map);
        take!(scroll_method);
        take!(scroll_button);
        take!(map_to_output);
    }
}

impl fmt::Display for InputSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        macro_rules! row {
            ($field:ident, $label:expr, $fmt:expr) => {
                if let Some(v) = &self.$field {
                    writeln!(f, "\t{}: {}", $label, $fmt(v))?;
                }
            };
        }
        row!(events, "events", |v| format!("{v:?}"));
        row!(accel_profile, "accel-profile", |v| format!("{v:?}"));
        row!(pointer_accel, "pointer-accel", |v| format!("{v}"));
        row!(click_method, "click-method", |v| format!("{v:?}"));
        row!(drag, "drag", |v| format!("{v}"));
        row!(drag_lock, "drag-lock", |v| format!("{v}"));
        row!(disable_while_typing, "disable-while-typing", |v| format!("{v}"));
        row!(middle_emulation, "middle-emulation", |v| format!("{v}"));
        row!(natural_scroll, "natural-scroll", |v| format!("{v}"));
        row!(left_handed, "left-handed", |v| format!("{v}"));
        row!(tap, "tap", |v| format!("{v}"));
        row!(tap_button_map, "tap-button-map", |v| format!("{v:?}"));
        row!(scroll_method, "scroll-method", |v| format!("{v:?}"));
        row!(scroll_button, "scroll-button", |v| format!("{v}"));
        row!(map_to_output, "map-to-output", |v| format!("{v}"));
        Ok(())
    }
}

/// One configuration row, created or extended by the `input` command.
#[derive(Debug, Clone, PartialEq)]
pub struct InputConfig {
    pub identifier_glob: String,
    pub settings: InputSettings,
}

/// A device currently present on the seat. Effective settings are the
/// first matching row's, merged over the defaults at hotplug time.
#[derive(Debug, Clone)]
pub struct InputDevice {
    pub identifier: String,
    pub settings: InputSettings,
}

/// First matching row in insertion order, not specificity.
pub fn matching_config<'a>(
    configs: &'a [InputConfig],
    identifier: &str,
) -> Option<&'a InputConfig> {
    configs
        .iter()
        .find(|c| globber::matches(identifier, &c.identifier_glob))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_parses_and_rejects() {
        let mut settings = InputSettings::default();
        settings.set("tap", "enabled").unwrap();
        settings.set("accel-profile", "flat").unwrap();
        settings.set("pointer-accel", "-0.4").unwrap();
        settings.set("scroll-button", "BTN_MIDDLE").unwrap();
        assert_eq!(settings.tap, Some(true));
        assert_eq!(settings.accel_profile, Some(AccelProfile::Flat));
        assert_eq!(settings.scroll_button, Some(0x112));
        assert!(settings.set("pointer-accel", "3.0").is_err());
        assert!(settings.set("tap", "sometimes").is_err());
        assert!(matches!(
            settings.set("no-such-setting", "x"),
            Err(InputError::UnknownSetting(_))
        ));
    }

    #[test]
    fn insertion_order_wins_over_specificity() {
        let mut wildcard = InputSettings::default();
        wildcard.set("natural-scroll", "enabled").unwrap();
        let mut exact = InputSettings::default();
        exact.set("natural-scroll", "disabled").unwrap();
        let configs = vec![
            InputConfig { identifier_glob: "*".into(), settings: wildcard },
            InputConfig {
                identifier_glob: "1234:5678:Some_Touchpad".into(),
                settings: exact,
            },
        ];
        let hit = matching_config(&configs, "1234:5678:Some_Touchpad").unwrap();
        assert_eq!(hit.identifier_glob, "*");
    }
}
