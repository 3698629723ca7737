// SPDX-License-Identifier: GPL-3.0-only

//! Window rule commands.

use super::{expect_arity, parse_i32, parse_tags, Error};
use crate::geo::Point;
use crate::rules::{Rule, RuleList};
use crate::server::Server;
use crate::util::flags::{self, Flag};
use crate::util::globber;

const RULE_SCHEMA: &[Flag] = &[Flag::value("app-id"), Flag::value("title")];

fn glob_pair(parsed: &flags::ParsedArgs) -> Result<(String, String), Error> {
    let app_id = parsed.value("app-id").unwrap_or("*");
    let title = parsed.value("title").unwrap_or("*");
    for glob in [app_id, title] {
        if !globber::validate(glob) {
            return Err(Error::InvalidValue(glob.to_owned()));
        }
    }
    Ok((app_id.to_owned(), title.to_owned()))
}

fn add<T>(list: &mut RuleList<T>, globs: (String, String), value: T) {
    list.add(Rule { app_id_glob: globs.0, title_glob: globs.1, value });
}

pub fn rule_add(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    let parsed = flags::parse(args, RULE_SCHEMA)?;
    let globs = glob_pair(&parsed)?;
    let positionals = parsed.positionals();
    let action = positionals.first().ok_or(Error::NotEnoughArguments)?;
    let rules = &mut server.config.rules;
    match action.as_str() {
        "float" | "no-float" => {
            expect_arity(positionals, 1, 1)?;
            add(&mut rules.float, globs, action == "float");
        }
        "ssd" | "csd" => {
            expect_arity(positionals, 1, 1)?;
            add(&mut rules.ssd, globs, action == "ssd");
            refresh_ssd(server);
        }
        "fullscreen" | "no-fullscreen" => {
            expect_arity(positionals, 1, 1)?;
            add(&mut rules.fullscreen, globs, action == "fullscreen");
        }
        "tags" => {
            expect_arity(positionals, 2, 2)?;
            let tags = parse_tags(&positionals[1])?;
            add(&mut rules.tags, globs, tags);
        }
        "output" => {
            expect_arity(positionals, 2, 2)?;
            add(&mut rules.output, globs, positionals[1].clone());
        }
        "position" => {
            expect_arity(positionals, 3, 3)?;
            let x = parse_i32(&positionals[1])?;
            let y = parse_i32(&positionals[2])?;
            add(&mut rules.position, globs, Point::new(x, y));
        }
        "dimensions" => {
            expect_arity(positionals, 3, 3)?;
            let width = parse_i32(&positionals[1])?;
            let height = parse_i32(&positionals[2])?;
            if width <= 0 || height <= 0 {
                return Err(Error::InvalidValue(positionals[1].clone()));
            }
            add(&mut rules.dimensions, globs, (width, height));
        }
        other => return Err(Error::UnknownOption(other.to_owned())),
    }
    Ok(())
}

pub fn rule_del(server: &mut Server, args: &[String], _out: &mut String) -> Result<(), Error> {
    let parsed = flags::parse(args, RULE_SCHEMA)?;
    let (app_id, title) = glob_pair(&parsed)?;
    let positionals = parsed.positionals();
    expect_arity(positionals, 1, 1)?;
    let rules = &mut server.config.rules;
    let removed = match positionals[0].as_str() {
        "float" | "no-float" => rules.float.del(&app_id, &title),
        "ssd" | "csd" => {
            let removed = rules.ssd.del(&app_id, &title);
            if removed {
                refresh_ssd(server);
            }
            removed
        }
        "fullscreen" | "no-fullscreen" => rules.fullscreen.del(&app_id, &title),
        "tags" => rules.tags.del(&app_id, &title),
        "output" => rules.output.del(&app_id, &title),
        "position" => rules.position.del(&app_id, &title),
        "dimensions" => rules.dimensions.del(&app_id, &title),
        other => return Err(Error::UnknownOption(other.to_owned())),
    };
    if !removed {
        return Err(Error::Other("no such rule".into()));
    }
    Ok(())
}

/// Decoration rules take effect on mapped views immediately.
fn refresh_ssd(server: &mut Server) {
    let rules = &server.config.rules;
    for view in server.root.views.values_mut() {
        view.pending.ssd = rules.ssd.matching(&view.app_id, &view.title).copied().unwrap_or(false);
    }
}

fn table<T>(list: &RuleList<T>, render: impl Fn(&T) -> String) -> String {
    let mut w0 = "app-id".len();
    let mut w1 = "title".len();
    for rule in list.iter() {
        w0 = w0.max(rule.app_id_glob.len());
        w1 = w1.max(rule.title_glob.len());
    }
    let mut out = format!("{:w0$}  {:w1$}  action\n", "app-id", "title");
    for rule in list.iter() {
        out.push_str(&format!(
            "{:w0$}  {:w1$}  {}\n",
            rule.app_id_glob,
            rule.title_glob,
            render(&rule.value)
        ));
    }
    out
}

pub fn list_rules(server: &mut Server, args: &[String], out: &mut String) -> Result<(), Error> {
    expect_arity(args, 1, 1)?;
    let rules = &server.config.rules;
    let listed = match args[0].as_str() {
        "float" => table(&rules.float, |v| if *v { "float" } else { "no-float" }.to_owned()),
        "ssd" => table(&rules.ssd, |v| if *v { "ssd" } else { "csd" }.to_owned()),
        "fullscreen" => table(&rules.fullscreen, |v| {
            if *v { "fullscreen" } else { "no-fullscreen" }.to_owned()
        }),
        "tags" => table(&rules.tags, |v| format!("{v:#x}")),
        "output" => table(&rules.output, |v| v.clone()),
        "position" => table(&rules.position, |v| format!("{},{}", v.x, v.y)),
        "dimensions" => table(&rules.dimensions, |v| format!("{}x{}", v.0, v.1)),
        other => return Err(Error::UnknownOption(other.to_owned())),
    };
    out.push_str(&listed);
    Ok(())
}
