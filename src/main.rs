mod app;
mod calendar;
mod help;
mod logging;
mod theme;
use crate::app::App;
use crate::calendar::{local_today, TodayPolicy, WeekView};
use crate::theme::Theme;
use anyhow::Context;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use time::{format_description::FormatItem, macros::format_description, Date};

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run(RunOptions),
    Help,
    Version,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct RunOptions {
    date: Option<Date>,
    theme: Option<PathBuf>,
    unavailable: Vec<Date>,
    log_file: Option<PathBuf>,
}

impl RunOptions {
    /// Builds the week to show.  Cells compare against the clock each time
    /// they render, so "today" follows the date across midnight.
    fn week(&self, theme: Theme) -> WeekView {
        let policy = if theme.should_color_today.is_some() {
            TodayPolicy::ProviderDecides
        } else {
            TodayPolicy::Always
        };
        let start = self.date.unwrap_or_else(local_today);
        log::info!("showing the week of {start}");
        WeekView::new(start, Rc::new(theme))
            .today_policy(policy)
            .unavailable(&self.unavailable)
    }
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut opts = RunOptions::default();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('t') | Arg::Long("theme") => {
                    opts.theme = Some(parser.value()?.into());
                }
                Arg::Short('u') | Arg::Long("unavailable") => {
                    let value = parser.value()?.string()?;
                    opts.unavailable.push(parse_date(value)?);
                }
                Arg::Short('l') | Arg::Long("log-file") => {
                    opts.log_file = Some(parser.value()?.into());
                }
                Arg::Value(value) if opts.date.is_none() => {
                    opts.date = Some(parse_date(value.string()?)?);
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run(opts))
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run(opts) => {
                let _logger = opts
                    .log_file
                    .as_deref()
                    .map(logging::init_file_logging)
                    .transpose()
                    .context("failed to start logging")?;
                let theme = match opts.theme {
                    Some(ref path) => Theme::load(path)?,
                    None => Theme::default(),
                };
                let week = opts.week(theme);
                let selected = with_terminal(|terminal| {
                    App::new(week)
                        .run(terminal)
                        .context("failed to run the calendar")
                })?;
                if let Some(date) = selected {
                    println!("{}", date.format(&YMD_FMT)?);
                }
                Ok(())
            }
            Command::Help => {
                println!("Usage: daycell [OPTIONS] [YYYY-MM-DD]");
                println!();
                println!("Show one week of selectable calendar days in the terminal.  The date");
                println!("selected on exit, if any, is printed to standard output.");
                println!();
                println!("Options:");
                println!("  -t, --theme <FILE>        Read colors and shapes from a TOML file");
                println!("  -u, --unavailable <DATE>  Make a date unselectable (repeatable)");
                println!("  -l, --log-file <FILE>     Write log messages to the given file");
                println!("  -h, --help                Display this help message and exit");
                println!("  -V, --version             Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn parse_date(value: String) -> Result<Date, lexopt::Error> {
    match Date::parse(&value, &YMD_FMT) {
        Ok(d) => Ok(d),
        Err(e) => Err(lexopt::Error::ParsingFailed {
            value,
            error: Box::new(e),
        }),
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = execute!(io::stdout(), EnableMouseCapture)
        .context("failed to enable mouse capture")
        .and_then(|()| func(terminal));
    if let Err(e) = execute!(io::stdout(), DisableMouseCapture) {
        log::warn!("failed to disable mouse capture: {e}");
    }
    ratatui::restore();
    r
}
