use std::collections::HashMap;

use engine::{InputAction, Location};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ConsoleCommand {
    NewGame { hero_name: String },
    Continue,
    Go { location: Location },
    Hold { action: InputAction },
    Release { action: Option<InputAction> },
    Sleep { millis: u64 },
    Save,
    Erase,
    Status,
    Items,
    Buy { item_id: String },
    Sell { item_id: String },
    Modal { open: bool },
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CommandParseError {
    reason: String,
    usage: String,
}

type BuiltinParse = fn(&[String]) -> Result<ConsoleCommand, CommandParseError>;
type ParseFn = dyn Fn(&[String]) -> Result<ConsoleCommand, CommandParseError> + Send + Sync;

pub(crate) struct CommandSpec {
    name: String,
    help: String,
    arg_schema: String,
    parse: Box<ParseFn>,
}

pub(crate) struct CommandRegistry {
    specs: Vec<CommandSpec>,
    lookup_by_lower_name: HashMap<String, usize>,
}

impl CommandRegistry {
    pub(crate) fn new() -> Self {
        Self {
            specs: Vec::new(),
            lookup_by_lower_name: HashMap::new(),
        }
    }

    pub(crate) fn with_session_commands() -> Self {
        let mut registry = Self::new();
        let builtins: [(&str, &str, &str, BuiltinParse); 15] = [
            ("new", "Start a new game", "<hero_name:string>", parse_new_command),
            ("continue", "Continue from the save slot", "", parse_continue_command),
            ("go", "Travel to a location", "<location:tag>", parse_go_command),
            ("hold", "Hold a direction", "<dir:up|down|left|right>", parse_hold_command),
            ("release", "Release a direction", "[dir|all]", parse_release_command),
            ("sleep", "Pause command input while the game runs", "<ms:u64>", parse_sleep_command),
            ("save", "Write the save slot", "", parse_save_command),
            ("erase", "Delete the save slot", "", parse_erase_command),
            ("status", "Print hero and transition state", "", parse_status_command),
            ("items", "List the item catalog", "", parse_items_command),
            ("buy", "Buy an item", "<item_id:string>", parse_buy_command),
            ("sell", "Sell an item", "<item_id:string>", parse_sell_command),
            ("modal", "Open or close a modal", "<open|close>", parse_modal_command),
            ("help", "List commands", "", parse_help_command),
            ("quit", "Quit", "", parse_quit_command),
        ];
        for (name, help, arg_schema, parse) in builtins {
            if let Err(error) = registry.register(name, help, arg_schema, parse) {
                tracing::error!(command = name, error = %error, "command_registration_failed");
            }
        }
        registry
    }

    pub(crate) fn register<F>(
        &mut self,
        name: impl Into<String>,
        help: impl Into<String>,
        arg_schema: impl Into<String>,
        parse: F,
    ) -> Result<(), String>
    where
        F: Fn(&[String]) -> Result<ConsoleCommand, CommandParseError> + Send + Sync + 'static,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("command name cannot be empty".to_string());
        }
        let lower = name.to_ascii_lowercase();
        if self.lookup_by_lower_name.contains_key(&lower) {
            return Err(format!("duplicate command registration: {name}"));
        }

        self.specs.push(CommandSpec {
            name,
            help: help.into(),
            arg_schema: arg_schema.into(),
            parse: Box::new(parse),
        });
        self.lookup_by_lower_name
            .insert(lower, self.specs.len() - 1);
        Ok(())
    }

    fn lookup(&self, input_name: &str) -> Option<&CommandSpec> {
        let lower = input_name.to_ascii_lowercase();
        let index = self.lookup_by_lower_name.get(&lower)?;
        self.specs.get(*index)
    }

    /// Help lines in registration order.
    pub(crate) fn help_lines(&self) -> Vec<String> {
        self.specs
            .iter()
            .map(|spec| {
                if spec.arg_schema.is_empty() {
                    format!("{} - {}", spec.name, spec.help)
                } else {
                    format!("{} {} - {}", spec.name, spec.arg_schema, spec.help)
                }
            })
            .collect()
    }

    /// `Ok(None)` for blank lines; errors are ready to print.
    pub(crate) fn parse_line(&self, raw_line: &str) -> Result<Option<ConsoleCommand>, String> {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let tokens =
            tokenize_line(trimmed).map_err(|reason| format!("error: {reason}. usage: help"))?;
        let Some((command_name, args)) = tokens.split_first() else {
            return Ok(None);
        };
        let spec = self
            .lookup(command_name)
            .ok_or_else(|| format!("error: unknown command '{command_name}'. try: help"))?;

        (spec.parse)(args)
            .map(Some)
            .map_err(|error| format!("error: {}. usage: {}", error.reason, error.usage))
    }
}

fn tokenize_line(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut seen_token_content = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                seen_token_content = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if seen_token_content {
                    tokens.push(std::mem::take(&mut current));
                    seen_token_content = false;
                }
            }
            _ => {
                current.push(ch);
                seen_token_content = true;
            }
        }
    }

    if in_quotes {
        return Err("unterminated quoted string".to_string());
    }
    if seen_token_content {
        tokens.push(current);
    }
    Ok(tokens)
}

fn usage_error(reason: impl Into<String>, usage: &str) -> CommandParseError {
    CommandParseError {
        reason: reason.into(),
        usage: usage.to_string(),
    }
}

fn require_no_args(args: &[String], usage: &str) -> Result<(), CommandParseError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(usage_error("unexpected extra arguments", usage))
    }
}

fn single_arg<'a>(args: &'a [String], what: &str, usage: &str) -> Result<&'a str, CommandParseError> {
    match args {
        [value] => Ok(value.as_str()),
        _ => Err(usage_error(
            format!("expected exactly one argument <{what}>"),
            usage,
        )),
    }
}

fn parse_direction(raw: &str, usage: &str) -> Result<InputAction, CommandParseError> {
    InputAction::from_name(raw).ok_or_else(|| {
        usage_error(
            format!("unknown direction '{raw}' (expected up|down|left|right)"),
            usage,
        )
    })
}

fn parse_new_command(args: &[String]) -> Result<ConsoleCommand, CommandParseError> {
    if args.is_empty() {
        return Err(usage_error(
            "missing required argument <hero_name>",
            "new <hero_name>",
        ));
    }
    Ok(ConsoleCommand::NewGame {
        hero_name: args.join(" "),
    })
}

fn parse_continue_command(args: &[String]) -> Result<ConsoleCommand, CommandParseError> {
    require_no_args(args, "continue")?;
    Ok(ConsoleCommand::Continue)
}

fn parse_go_command(args: &[String]) -> Result<ConsoleCommand, CommandParseError> {
    const USAGE: &str = "go <location>";
    let raw = single_arg(args, "location", USAGE)?;
    let location = raw
        .parse::<Location>()
        .map_err(|error| usage_error(error.to_string(), USAGE))?;
    Ok(ConsoleCommand::Go { location })
}

fn parse_hold_command(args: &[String]) -> Result<ConsoleCommand, CommandParseError> {
    const USAGE: &str = "hold <dir>";
    let raw = single_arg(args, "dir", USAGE)?;
    Ok(ConsoleCommand::Hold {
        action: parse_direction(raw, USAGE)?,
    })
}

fn parse_release_command(args: &[String]) -> Result<ConsoleCommand, CommandParseError> {
    const USAGE: &str = "release [dir|all]";
    match args {
        [] => Ok(ConsoleCommand::Release { action: None }),
        [raw] if raw.eq_ignore_ascii_case("all") => Ok(ConsoleCommand::Release { action: None }),
        [raw] => Ok(ConsoleCommand::Release {
            action: Some(parse_direction(raw, USAGE)?),
        }),
        _ => Err(usage_error("expected at most one argument", USAGE)),
    }
}

fn parse_sleep_command(args: &[String]) -> Result<ConsoleCommand, CommandParseError> {
    const USAGE: &str = "sleep <ms>";
    let raw = single_arg(args, "ms", USAGE)?;
    let millis = raw
        .parse::<u64>()
        .map_err(|_| usage_error(format!("invalid duration '{raw}' (expected u64)"), USAGE))?;
    Ok(ConsoleCommand::Sleep { millis })
}

fn parse_save_command(args: &[String]) -> Result<ConsoleCommand, CommandParseError> {
    require_no_args(args, "save")?;
    Ok(ConsoleCommand::Save)
}

fn parse_erase_command(args: &[String]) -> Result<ConsoleCommand, CommandParseError> {
    require_no_args(args, "erase")?;
    Ok(ConsoleCommand::Erase)
}

fn parse_status_command(args: &[String]) -> Result<ConsoleCommand, CommandParseError> {
    require_no_args(args, "status")?;
    Ok(ConsoleCommand::Status)
}

fn parse_items_command(args: &[String]) -> Result<ConsoleCommand, CommandParseError> {
    require_no_args(args, "items")?;
    Ok(ConsoleCommand::Items)
}

fn parse_buy_command(args: &[String]) -> Result<ConsoleCommand, CommandParseError> {
    let item_id = single_arg(args, "item_id", "buy <item_id>")?;
    Ok(ConsoleCommand::Buy {
        item_id: item_id.to_string(),
    })
}

fn parse_sell_command(args: &[String]) -> Result<ConsoleCommand, CommandParseError> {
    let item_id = single_arg(args, "item_id", "sell <item_id>")?;
    Ok(ConsoleCommand::Sell {
        item_id: item_id.to_string(),
    })
}

fn parse_modal_command(args: &[String]) -> Result<ConsoleCommand, CommandParseError> {
    const USAGE: &str = "modal <open|close>";
    let raw = single_arg(args, "open|close", USAGE)?;
    let open = match raw.to_ascii_lowercase().as_str() {
        "open" => true,
        "close" => false,
        _ => {
            return Err(usage_error(
                format!("unknown modal state '{raw}' (expected open|close)"),
                USAGE,
            ))
        }
    };
    Ok(ConsoleCommand::Modal { open })
}

fn parse_help_command(args: &[String]) -> Result<ConsoleCommand, CommandParseError> {
    require_no_args(args, "help")?;
    Ok(ConsoleCommand::Help)
}

fn parse_quit_command(args: &[String]) -> Result<ConsoleCommand, CommandParseError> {
    require_no_args(args, "quit")?;
    Ok(ConsoleCommand::Quit)
}
