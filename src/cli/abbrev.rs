// Command abbreviation matching for the growstage CLI

/// Find all commands that start with the given prefix (case-insensitive)
pub fn find_matching_commands<'a>(prefix: &str, commands: &'a [&str]) -> Vec<&'a str> {
    let prefix_lower = prefix.to_lowercase();
    commands.iter()
        .filter(|cmd| cmd.to_lowercase().starts_with(&prefix_lower))
        .copied()
        .collect()
}

/// Find a unique command match for the given prefix
/// Returns Ok(command) if exactly one match, Err(matches) if ambiguous, Err(empty) if no match
/// Note: Exact matches take precedence over prefix matches
pub fn find_unique_command<'a>(prefix: &str, commands: &'a [&str]) -> Result<&'a str, Vec<&'a str>> {
    let prefix_lower = prefix.to_lowercase();
    for cmd in commands {
        if cmd.to_lowercase() == prefix_lower {
            return Ok(*cmd);
        }
    }
    
    let matches = find_matching_commands(prefix, commands);
    
    if matches.is_empty() {
        Err(Vec::new())
    } else if matches.len() == 1 {
        Ok(matches[0])
    } else {
        Err(matches)
    }
}

/// Top-level commands
pub const TOP_LEVEL_COMMANDS: &[&str] = &["evaluate", "status", "config", "help"];

/// Config subcommands
pub const CONFIG_COMMANDS: &[&str] = &["show", "get", "set", "reset", "path"];

/// Global options that take a value
const GLOBAL_VALUE_OPTIONS: &[&str] = &["--config-dir", "--config-name"];

/// Get subcommands for a given top-level command
pub fn get_subcommands(command: &str) -> Option<&'static [&'static str]> {
    match command {
        "config" => Some(CONFIG_COMMANDS),
        _ => None,
    }
}

fn expand_one(arg: &str, commands: &[&str], what: &str) -> Result<Option<String>, String> {
    match find_unique_command(arg, commands) {
        Ok(full) => Ok(Some(full.to_string())),
        Err(matches) if matches.is_empty() => Ok(None),
        Err(matches) => Err(format!(
            "Ambiguous {} '{}'. Did you mean one of: {}?",
            what,
            arg,
            matches.join(", ")
        )),
    }
}

/// Expand command abbreviations in argument list
/// Leading global options are skipped; only the command word and its
/// subcommand word are expanded. Returns expanded args or error message
pub fn expand_command_abbreviations(args: Vec<String>) -> Result<Vec<String>, String> {
    let mut expanded = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();
    
    // Pass global options through until the command word
    let command = loop {
        match iter.next() {
            None => return Ok(expanded),
            Some(arg) if GLOBAL_VALUE_OPTIONS.contains(&arg.as_str()) => {
                expanded.push(arg);
                if let Some(value) = iter.next() {
                    expanded.push(value);
                }
            }
            Some(arg) if arg.starts_with('-') => expanded.push(arg),
            Some(arg) => break arg,
        }
    };
    
    let command = expand_one(&command, TOP_LEVEL_COMMANDS, "command")?.unwrap_or(command);
    let subcommands = get_subcommands(&command);
    expanded.push(command);
    
    if let Some(subcommands) = subcommands {
        if let Some(next_arg) = iter.next() {
            if next_arg.starts_with('-') {
                expanded.push(next_arg);
            } else {
                let sub = expand_one(&next_arg, subcommands, "subcommand")?.unwrap_or(next_arg);
                expanded.push(sub);
            }
        }
    }
    
    expanded.extend(iter);
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    
    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }
    
    #[test]
    fn test_find_matching_commands() {
        let commands = &["show", "set", "reset"];
        assert_eq!(find_matching_commands("s", commands), vec!["show", "set"]);
        assert_eq!(find_matching_commands("SH", commands), vec!["show"]);
        assert!(find_matching_commands("x", commands).is_empty());
    }
    
    #[test]
    fn test_find_unique_command() {
        assert_eq!(find_unique_command("eval", TOP_LEVEL_COMMANDS), Ok("evaluate"));
        assert_eq!(find_unique_command("st", TOP_LEVEL_COMMANDS), Ok("status"));
        assert_eq!(find_unique_command("get", CONFIG_COMMANDS), Ok("get"));
        assert_eq!(find_unique_command("s", CONFIG_COMMANDS), Err(vec!["show", "set"]));
        assert_eq!(find_unique_command("zzz", CONFIG_COMMANDS), Err(vec![]));
    }
    
    #[test]
    fn test_expand_top_level() {
        assert_eq!(
            expand_command_abbreviations(args(&["ev", "flower=1"])),
            Ok(args(&["evaluate", "flower=1"]))
        );
        assert_eq!(
            expand_command_abbreviations(args(&["--config-dir", "st", "sta"])),
            Ok(args(&["--config-dir", "st", "status"]))
        );
    }
    
    #[test]
    fn test_expand_subcommand() {
        assert_eq!(
            expand_command_abbreviations(args(&["conf", "sh", "--json"])),
            Ok(args(&["config", "show", "--json"]))
        );
        assert_eq!(
            expand_command_abbreviations(args(&["c", "res"])),
            Ok(args(&["config", "reset"]))
        );
    }
    
    #[test]
    fn test_ambiguous_subcommand() {
        let result = expand_command_abbreviations(args(&["config", "s", "x"]));
        assert!(matches!(result, Err(msg) if msg.contains("Ambiguous subcommand")));
    }
    
    #[test]
    fn test_unknown_passes_through() {
        assert_eq!(
            expand_command_abbreviations(args(&["bogus", "x"])),
            Ok(args(&["bogus", "x"]))
        );
        assert_eq!(expand_command_abbreviations(vec![]), Ok(vec![]));
    }
}
