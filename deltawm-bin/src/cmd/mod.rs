// SPDX-License-Identifier: GPL-3.0-only

//! Command dispatch. Control clients send argv-style token vectors;
//! token 0 picks the handler. Handlers validate fully before mutating any
//! pending state and may write a reply payload to `out`.

use crate::server::Server;

mod config_cmds;
mod focus;
mod input_cmds;
mod layout_cmds;
mod map_cmds;
mod move_resize;
mod option_cmds;
mod output_cmds;
mod rule_cmds;
mod spawn_cmd;
mod tags;
mod view_ops;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("not enough arguments")]
    NotEnoughArguments,
    #[error("too many arguments")]
    TooManyArguments,
    #[error("unknown option: {0}")]
    UnknownOption(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("invalid direction: {0}")]
    InvalidDirection(String),
    #[error("invalid physical direction: {0}")]
    InvalidPhysicalDirection(String),
    #[error("invalid orientation: {0}")]
    InvalidOrientation(String),
    #[error("{0}")]
    Other(String),
}

impl From<crate::util::flags::FlagsError> for Error {
    fn from(err: crate::util::flags::FlagsError) -> Self {
        match err {
            crate::util::flags::FlagsError::Unknown(flag) => Error::UnknownOption(flag),
            crate::util::flags::FlagsError::MissingValue(flag) => {
                Error::Other(format!("option {flag} requires a value"))
            }
        }
    }
}

impl From<crate::options::OptionsError> for Error {
    fn from(err: crate::options::OptionsError) -> Self {
        use crate::options::OptionsError;
        match err {
            OptionsError::InvalidValue { value, .. } => Error::InvalidValue(value),
            other => Error::Other(other.to_string()),
        }
    }
}

impl From<crate::input::config::InputError> for Error {
    fn from(err: crate::input::config::InputError) -> Self {
        use crate::input::config::InputError;
        match err {
            InputError::UnknownSetting(s) => Error::UnknownOption(s),
            InputError::InvalidValue { value, .. } => Error::InvalidValue(value),
        }
    }
}

pub type Handler = fn(&mut Server, &[String], &mut String) -> Result<(), Error>;

#[rustfmt::skip]
static COMMANDS: &[(&str, Handler)] = &[
    ("attach-mode",            config_cmds::attach_mode),
    ("background-color",       config_cmds::background_color),
    ("border-color-focused",   config_cmds::border_color_focused),
    ("border-color-unfocused", config_cmds::border_color_unfocused),
    ("border-color-urgent",    config_cmds::border_color_urgent),
    ("border-width",           config_cmds::border_width),
    ("close",                  view_ops::close),
    ("declare-mode",           map_cmds::declare_mode),
    ("declare-option",         option_cmds::declare_option),
    ("default-attach-mode",    config_cmds::attach_mode),
    ("default-layout",         layout_cmds::default_layout),
    ("enter-mode",             map_cmds::enter_mode),
    ("exit",                   config_cmds::exit),
    ("focus-follows-cursor",   config_cmds::focus_follows_cursor),
    ("focus-output",           output_cmds::focus_output),
    ("focus-previous-tags",    tags::focus_previous_tags),
    ("focus-view",             focus::focus_view),
    ("get-option",             option_cmds::get_option),
    ("hide-cursor",            config_cmds::hide_cursor),
    ("input",                  input_cmds::input),
    ("keyboard-group-add",     map_cmds::keyboard_group),
    ("keyboard-group-create",  map_cmds::keyboard_group),
    ("keyboard-group-destroy", map_cmds::keyboard_group),
    ("keyboard-group-remove",  map_cmds::keyboard_group),
    ("list-input-configs",     input_cmds::list_input_configs),
    ("list-inputs",            input_cmds::list_inputs),
    ("list-rules",             rule_cmds::list_rules),
    ("map",                    map_cmds::map),
    ("map-pointer",            map_cmds::map_pointer),
    ("mod-option",             option_cmds::mod_option),
    ("move",                   move_resize::move_view),
    ("output-layout",          layout_cmds::output_layout),
    ("resize",                 move_resize::resize),
    ("rule-add",               rule_cmds::rule_add),
    ("rule-del",               rule_cmds::rule_del),
    ("send-layout-cmd",        layout_cmds::send_layout_cmd),
    ("send-to-output",         output_cmds::send_to_output),
    ("send-to-previous-tags",  tags::send_to_previous_tags),
    ("set-cursor-warp",        config_cmds::set_cursor_warp),
    ("set-focused-tags",       tags::set_focused_tags),
    ("set-option",             option_cmds::set_option),
    ("set-repeat",             config_cmds::set_repeat),
    ("set-view-tags",          tags::set_view_tags),
    ("snap",                   move_resize::snap),
    ("spawn",                  spawn_cmd::spawn),
    ("spawn-tagmask",          tags::spawn_tagmask),
    ("swap",                   focus::swap),
    ("toggle-float",           view_ops::toggle_float),
    ("toggle-focused-tags",    tags::toggle_focused_tags),
    ("toggle-fullscreen",      view_ops::toggle_fullscreen),
    ("toggle-view-tags",       tags::toggle_view_tags),
    ("unmap",                  map_cmds::unmap),
    ("unmap-pointer",          map_cmds::unmap_pointer),
    ("unset-option",           option_cmds::unset_option),
    ("xcursor-theme",          config_cmds::xcursor_theme),
    ("zoom",                   focus::zoom),
];

pub fn dispatch(server: &mut Server, tokens: &[String], out: &mut String) -> Result<(), Error> {
    let name = tokens.first().ok_or(Error::NotEnoughArguments)?;
    let (_, handler) = COMMANDS
        .iter()
        .find(|(command, _)| *command == name.as_str())
        .ok_or_else(|| Error::Other(format!("unknown command: {name}")))?;
    handler(server, &tokens[1..], out)
}

/// Parse an unsigned 32-bit value, accepting 0x/0b prefixes.
pub(crate) fn parse_u32(s: &str) -> Result<u32, Error> {
    let parsed = if let Some(hex) = s.strip_prefix("0x") {
        u32::from_str_radix(hex, 16)
    } else if let Some(bin) = s.strip_prefix("0b") {
        u32::from_str_radix(bin, 2)
    } else {
        s.parse()
    };
    parsed.map_err(|_| Error::InvalidValue(s.to_owned()))
}

pub(crate) fn parse_i32(s: &str) -> Result<i32, Error> {
    s.parse().map_err(|_| Error::InvalidValue(s.to_owned()))
}

/// A tag mask for the set/toggle commands: any u32 except 0.
pub(crate) fn parse_tags(s: &str) -> Result<u32, Error> {
    let tags = parse_u32(s)?;
    if tags == 0 {
        return Err(Error::Other("tags may not be 0".into()));
    }
    Ok(tags)
}

pub(crate) fn expect_arity(args: &[String], min: usize, max: usize) -> Result<(), Error> {
    if args.len() < min {
        return Err(Error::NotEnoughArguments);
    }
    if args.len() > max {
        return Err(Error::TooManyArguments);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_u32_accepts_prefixes() {
        assert_eq!(parse_u32("5"), Ok(5));
        assert_eq!(parse_u32("0x20"), Ok(32));
        assert_eq!(parse_u32("0b101"), Ok(5));
        assert!(parse_u32("five").is_err());
    }

    #[test]
    fn zero_tags_are_refused() {
        assert_eq!(parse_tags("0"), Err(Error::Other("tags may not be 0".into())));
        assert_eq!(parse_tags("0x0"), Err(Error::Other("tags may not be 0".into())));
        assert_eq!(parse_tags("1"), Ok(1));
    }
}
