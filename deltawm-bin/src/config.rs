// SPDX-License-Identifier: GPL-3.0-only

//! Runtime configuration. Nothing here is read from disk: every field is
//! mutated through commands, usually from the init script.

use crate::input::config::InputConfig;
use crate::modes::ModeRegistry;
use crate::rules::Rules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachMode {
    #[default]
    Top,
    Bottom,
}

impl AttachMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusFollowsCursor {
    #[default]
    Disabled,
    Normal,
    Always,
}

impl FocusFollowsCursor {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "disabled" => Some(Self::Disabled),
            "normal" => Some(Self::Normal),
            "always" => Some(Self::Always),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WarpCursor {
    #[default]
    Disabled,
    OnOutputChange,
    OnFocusChange,
}

impl WarpCursor {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "disabled" => Some(Self::Disabled),
            "on-output-change" => Some(Self::OnOutputChange),
            "on-focus-change" => Some(Self::OnFocusChange),
            _ => None,
        }
    }
}

/// Parse 0xRRGGBB or 0xRRGGBBAA into packed RGBA.
pub fn parse_color(s: &str) -> Option<u32> {
    let hex = s.strip_prefix("0x")?;
    match hex.len() {
        6 => u32::from_str_radix(hex, 16).ok().map(|rgb| (rgb << 8) | 0xff),
        8 => u32::from_str_radix(hex, 16).ok(),
        _ => None,
    }
}

#[derive(Debug)]
pub struct Config {
    pub modes: ModeRegistry,
    pub rules: Rules,
    pub input_configs: Vec<InputConfig>,

    pub background_color: u32,
    pub border_color_focused: u32,
    pub border_color_unfocused: u32,
    pub border_color_urgent: u32,
    pub border_width: i32,

    pub attach_mode: AttachMode,
    pub focus_follows_cursor: FocusFollowsCursor,
    pub warp_cursor: WarpCursor,
    pub xcursor_theme: Option<(String, Option<u32>)>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            modes: ModeRegistry::default(),
            rules: Rules::default(),
            input_configs: Vec::new(),
            background_color: 0x002b36ff,
            border_color_focused: 0x93a1a1ff,
            border_color_unfocused: 0x586e75ff,
            border_color_urgent: 0xff0000ff,
            border_width: 2,
            attach_mode: AttachMode::default(),
            focus_follows_cursor: FocusFollowsCursor::default(),
            warp_cursor: WarpCursor::default(),
            xcursor_theme: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_parsing() {
        assert_eq!(parse_color("0x93a1a1"), Some(0x93a1a1ff));
        assert_eq!(parse_color("0x93a1a180"), Some(0x93a1a180));
        assert_eq!(parse_color("93a1a1"), None);
        assert_eq!(parse_color("0x93a1"), None);
        assert_eq!(parse_color("0xzzzzzz"), None);
    }
}
