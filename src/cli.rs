//! Startup arguments and the interactive command language.

use clap::Parser;

use crate::playback::Strategy;

/// VocalTales: create and listen to stories from the terminal.
#[derive(Debug, Parser)]
#[command(name = "vocal-tales", version)]
pub struct Args {
    /// Story service URL (overrides settings and VOCALTALES_SERVER).
    #[arg(long)]
    pub server: Option<String>,

    /// Default playback method: gtts, responsive, browser or readalong.
    #[arg(long)]
    pub method: Option<Strategy>,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Record,
    Idea(String),
    Set { field: String, value: String },
    Form,
    Generate,
    Library,
    Open(i64),
    Play(Option<Strategy>),
    Pause,
    ReadAlong,
    Download,
    Favorite,
    New,
    Stats,
    Method(Strategy),
    Help,
    Quit,
}

/// Parse one input line. `Ok(None)` for a blank line.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "record" | "rec" => Command::Record,
        "idea" => {
            if rest.is_empty() {
                return Err("usage: idea <your story idea>".into());
            }
            Command::Idea(rest.to_string())
        }
        "set" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .ok_or("usage: set <field> <value>")?;
            Command::Set {
                field: field.to_string(),
                value: value.trim().to_string(),
            }
        }
        "form" => Command::Form,
        "generate" | "gen" => Command::Generate,
        "library" | "ls" => Command::Library,
        "open" => {
            let id = rest
                .parse()
                .map_err(|_| format!("usage: open <story id>, got '{}'", rest))?;
            Command::Open(id)
        }
        "play" => {
            if rest.is_empty() {
                Command::Play(None)
            } else {
                Command::Play(Some(rest.parse()?))
            }
        }
        "pause" | "stop" => Command::Pause,
        "readalong" | "read" => Command::ReadAlong,
        "download" => Command::Download,
        "favorite" | "fav" => Command::Favorite,
        "new" => Command::New,
        "stats" => Command::Stats,
        "method" => Command::Method(rest.parse()?),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{}' (try `help`)", other)),
    };
    Ok(Some(command))
}

pub fn help_text() -> String {
    let mut output = String::from("Commands:\n");
    output.push_str("  record             -- Start or stop recording your story idea\n");
    output.push_str("  idea <text>        -- Type your story idea\n");
    output.push_str("  set <field> <val>  -- genre, length, language, age, characters, setting, moral\n");
    output.push_str("  form               -- Show the story creator form\n");
    output.push_str("  generate           -- Create a story from the form\n");
    output.push_str("  library            -- List your stories\n");
    output.push_str("  open <id>          -- Show a story from the library\n");
    output.push_str("  play [method]      -- Read the story aloud (gtts, responsive, browser)\n");
    output.push_str("  readalong          -- Highlight the story word by word\n");
    output.push_str("  pause              -- Stop reading\n");
    output.push_str("  download           -- Save the story as an mp3\n");
    output.push_str("  favorite           -- Toggle favorite for the current story\n");
    output.push_str("  new                -- Start a new story\n");
    output.push_str("  stats              -- Show story service statistics\n");
    output.push_str("  method <method>    -- Change the default playback method\n");
    output.push_str("  quit               -- Exit");
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse_line("   "), Ok(None));
    }

    #[test]
    fn idea_keeps_the_whole_sentence() {
        assert_eq!(
            parse_line("idea  a cat who  sails the sea "),
            Ok(Some(Command::Idea("a cat who  sails the sea".into())))
        );
        assert!(parse_line("idea").is_err());
    }

    #[test]
    fn set_splits_field_and_value() {
        assert_eq!(
            parse_line("set setting a floating castle"),
            Ok(Some(Command::Set {
                field: "setting".into(),
                value: "a floating castle".into()
            }))
        );
        assert!(parse_line("set genre").is_err());
    }

    #[test]
    fn play_takes_an_optional_method() {
        assert_eq!(parse_line("play"), Ok(Some(Command::Play(None))));
        assert_eq!(
            parse_line("play gtts"),
            Ok(Some(Command::Play(Some(Strategy::RemoteAudio))))
        );
        assert!(parse_line("play loudly").is_err());
    }

    #[test]
    fn open_needs_a_number() {
        assert_eq!(parse_line("open 42"), Ok(Some(Command::Open(42))));
        assert!(parse_line("open latest").is_err());
    }

    #[test]
    fn unknown_commands_are_rejected() {
        assert!(parse_line("dance").is_err());
    }

    #[test]
    fn startup_args_parse() {
        let args = Args::try_parse_from(["vocal-tales", "--server", "http://x/", "--method", "readalong"]).unwrap();
        assert_eq!(args.server.as_deref(), Some("http://x/"));
        assert_eq!(args.method, Some(Strategy::ReadAlong));
        assert!(!args.verbose);
    }
}
