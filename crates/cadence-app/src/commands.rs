//! Console commands.

use std::str::FromStr;

use anyhow::{anyhow, bail};

/// One line of console input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Play the queue starting at this (zero-based) index.
    Play(usize),
    Pause,
    Toggle,
    Next,
    Previous,
    Seek(f64),
    Volume(f32),
    Minimize,
    Maximize,
    Hide,
    Show,
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("empty command");
        };
        let arg = words.next();

        let command = match verb.to_ascii_lowercase().as_str() {
            "play" | "p" => Self::Play(arg.map_or(Ok(0), str::parse::<usize>)?),
            "pause" => Self::Pause,
            "toggle" | "t" => Self::Toggle,
            "next" | "n" => Self::Next,
            "prev" | "previous" => Self::Previous,
            "seek" => Self::Seek(required(arg, "seek <seconds>")?.parse()?),
            "vol" | "volume" => Self::Volume(required(arg, "vol <0.0-1.0>")?.parse()?),
            "min" => Self::Minimize,
            "max" => Self::Maximize,
            "hide" => Self::Hide,
            "show" => Self::Show,
            "status" | "s" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => bail!("unknown command `{other}`"),
        };
        Ok(command)
    }
}

fn required<'a>(arg: Option<&'a str>, usage: &str) -> anyhow::Result<&'a str> {
    arg.ok_or_else(|| anyhow!("usage: {usage}"))
}

pub const HELP: &str = "\
commands:
  play [n]      play the queue from track n (default 0)
  pause         pause playback
  toggle        toggle play/pause
  next, prev    move through the queue
  seek <s>      jump to s seconds
  vol <v>       set volume (0.0 - 1.0)
  min, max      minimize or restore the player
  hide, show    hide or show the player
  status        print the session as JSON
  quit          exit";
