//! Shell command catalogue.
//!
//! Every command the shell understands is represented by the [`Command`]
//! enum. [`CommandRegistry`] provides metadata (name, usage, description,
//! category) for `help`, and fuzzy suggestions for mistyped names.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::error::{CoreError, CoreResult};

/// Number of suggestions offered for an unknown command.
const MAX_SUGGESTIONS: usize = 3;

/// Every command the shell accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    // Navigation
    List,
    ChangeDir,
    PrintDir,
    Back,
    Forward,
    // File operations
    MakeDir,
    Touch,
    Remove,
    RemoveDir,
    Copy,
    Move,
    Chmod,
    // Search
    Find,
    Grep,
    RegexGrep,
    // View
    Info,
    Cat,
    Filter,
    // Archives
    Archive,
    Extract,
    ListArchive,
    // Bookmarks
    Bookmark,
    // Trash
    TrashList,
    Restore,
    EmptyTrash,
    // System
    Log,
    Help,
    Exit,
}

/// Broad category for grouping commands in `help`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandCategory {
    Navigation,
    FileOps,
    Search,
    View,
    Archive,
    Bookmark,
    Trash,
    System,
}

impl CommandCategory {
    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Navigation => "Navigation",
            Self::FileOps => "File",
            Self::Search => "Search",
            Self::View => "View",
            Self::Archive => "Archive",
            Self::Bookmark => "Bookmark",
            Self::Trash => "Trash",
            Self::System => "System",
        }
    }
}

/// Metadata for a single command.
#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    pub command: Command,
    /// What the user types (e.g. `"list-archive"`).
    pub name: &'static str,
    /// Argument synopsis (e.g. `"cat <file> [start] [count]"`).
    pub usage: &'static str,
    pub description: &'static str,
    pub category: CommandCategory,
}

/// Registry of all shell commands.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    descriptors: Vec<CommandDescriptor>,
}

macro_rules! descriptor {
    ($command:ident, $name:literal, $usage:literal, $description:literal, $category:ident) => {
        CommandDescriptor {
            command: Command::$command,
            name: $name,
            usage: $usage,
            description: $description,
            category: CommandCategory::$category,
        }
    };
}

impl CommandRegistry {
    /// Builds the registry containing every known command.
    pub fn new() -> Self {
        let descriptors = vec![
            descriptor!(List, "ls", "ls", "List the current directory", Navigation),
            descriptor!(ChangeDir, "cd", "cd <dir>", "Change the current directory", Navigation),
            descriptor!(PrintDir, "pwd", "pwd", "Print the current directory", Navigation),
            descriptor!(Back, "back", "back", "Go to the previous directory", Navigation),
            descriptor!(Forward, "forward", "forward", "Undo the last back", Navigation),
            descriptor!(MakeDir, "mkdir", "mkdir <name>", "Create a directory", FileOps),
            descriptor!(Touch, "touch", "touch <name>", "Create an empty file", FileOps),
            descriptor!(Remove, "rm", "rm <name>", "Move a file or directory to the trash", FileOps),
            descriptor!(RemoveDir, "rmdir", "rmdir <name>", "Delete a directory permanently", FileOps),
            descriptor!(Copy, "cp", "cp <source> <destination>", "Copy a file or directory", FileOps),
            descriptor!(Move, "mv", "mv <source> <destination>", "Move or rename a file or directory", FileOps),
            descriptor!(Chmod, "chmod", "chmod <mode> <name>", "Change permissions (octal mode)", FileOps),
            descriptor!(Find, "find", "find <glob>", "Find entries by name", Search),
            descriptor!(Grep, "grep", "grep <text>", "Find files containing text", Search),
            descriptor!(RegexGrep, "rgrep", "rgrep <regex>", "Find files matching a regular expression", Search),
            descriptor!(Info, "info", "info <name>", "Show file details", View),
            descriptor!(Cat, "cat", "cat <file> [start] [count]", "Show part of a text file", View),
            descriptor!(
                Filter,
                "filter",
                "filter [--ext=a,b] [--name=<glob>] [--size=<min>-<max>] [--date=<from>..<to>] [--type=fdh]",
                "Filter listings; no arguments resets",
                View
            ),
            descriptor!(
                Archive,
                "archive",
                "archive <name> <format|auto> <file>...",
                "Create a zip, tar, tar.gz or tar.xz archive",
                Archive
            ),
            descriptor!(Extract, "extract", "extract <archive> <dir>", "Extract an archive", Archive),
            descriptor!(ListArchive, "list-archive", "list-archive <archive>", "List archive members", Archive),
            descriptor!(
                Bookmark,
                "bookmark",
                "bookmark add <name> [dir] | list | remove <name> | go <name>",
                "Manage bookmarks",
                Bookmark
            ),
            descriptor!(TrashList, "trash-list", "trash-list", "List the trash", Trash),
            descriptor!(Restore, "restore", "restore <name>", "Restore an item from the trash", Trash),
            descriptor!(EmptyTrash, "empty-trash", "empty-trash", "Permanently delete everything in the trash", Trash),
            descriptor!(Log, "log", "log [n]", "Show the last n journal entries", System),
            descriptor!(Help, "help", "help [command]", "Show available commands", System),
            descriptor!(Exit, "exit", "exit | quit", "Leave the shell", System),
        ];
        Self { descriptors }
    }

    /// Returns all descriptors.
    pub fn all(&self) -> &[CommandDescriptor] {
        &self.descriptors
    }

    /// Looks up a command by the name the user typed.
    pub fn find(&self, name: &str) -> Option<Command> {
        if name == "quit" {
            return Some(Command::Exit);
        }
        self.descriptors
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.command)
    }

    /// Returns the descriptor for a given command.
    pub fn descriptor_for(&self, command: Command) -> Option<&CommandDescriptor> {
        self.descriptors.iter().find(|d| d.command == command)
    }

    /// Closest command names for an unknown `name`, best first.
    pub fn suggest(&self, name: &str) -> Vec<&CommandDescriptor> {
        if name.is_empty() {
            return Vec::new();
        }
        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, &CommandDescriptor)> = self
            .descriptors
            .iter()
            .filter_map(|d| {
                // Score both ways so "mkdr" finds "mkdir" and "lsx" finds "ls".
                let forward = matcher.fuzzy_match(d.name, name).unwrap_or(0);
                let reverse = matcher.fuzzy_match(name, d.name).unwrap_or(0);
                let best = forward.max(reverse);
                (best > 0).then_some((best, d))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, d)| d)
            .collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits a command line into words.
///
/// Words are separated by whitespace. Single or double quotes group text
/// containing spaces; quotes may start mid-word (`name="a b"` is one word)
/// and `""` yields an empty word. There are no escape sequences, so Windows
/// paths pass through unchanged.
///
/// # Errors
///
/// Returns [`CoreError::InvalidArgument`] for an unterminated quote.
pub fn tokenize(line: &str) -> CoreResult<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(CoreError::InvalidArgument(format!(
            "unterminated {q} quote"
        )));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- registry tests ---

    #[test]
    fn every_command_has_a_descriptor() {
        let registry = CommandRegistry::new();
        assert_eq!(registry.all().len(), 28);
        for d in registry.all() {
            assert_eq!(registry.find(d.name), Some(d.command));
            assert!(d.usage.starts_with(d.name), "{}", d.usage);
        }
    }

    #[test]
    fn quit_is_an_alias_for_exit() {
        let registry = CommandRegistry::new();
        assert_eq!(registry.find("quit"), Some(Command::Exit));
        assert_eq!(registry.find("exit"), Some(Command::Exit));
    }

    #[test]
    fn find_unknown_returns_none() {
        let registry = CommandRegistry::new();
        assert_eq!(registry.find("nonexistent"), None);
        assert_eq!(registry.find("LS"), None);
    }

    #[test]
    fn suggest_finds_close_names() {
        let registry = CommandRegistry::new();
        let names: Vec<&str> = registry.suggest("mkdr").iter().map(|d| d.name).collect();
        assert_eq!(names.first(), Some(&"mkdir"));

        let names: Vec<&str> = registry.suggest("extact").iter().map(|d| d.name).collect();
        assert!(names.contains(&"extract"), "{names:?}");
    }

    #[test]
    fn suggest_caps_results_and_ignores_noise() {
        let registry = CommandRegistry::new();
        assert!(registry.suggest("r").len() <= MAX_SUGGESTIONS);
        assert!(registry.suggest("zzzzqqq").is_empty());
        assert!(registry.suggest("").is_empty());
    }

    #[test]
    fn descriptor_for_returns_metadata() {
        let registry = CommandRegistry::new();
        let desc = registry.descriptor_for(Command::ListArchive).unwrap();
        assert_eq!(desc.name, "list-archive");
        assert_eq!(desc.category, CommandCategory::Archive);
        assert_eq!(desc.category.label(), "Archive");
    }

    // --- tokenize tests ---

    #[test]
    fn tokenize_splits_on_whitespace() {
        assert_eq!(
            tokenize("  cp   a.txt\tb.txt ").unwrap(),
            vec!["cp", "a.txt", "b.txt"]
        );
        assert!(tokenize("   ").unwrap().is_empty());
    }

    #[test]
    fn tokenize_honours_quotes() {
        assert_eq!(
            tokenize(r#"mv "my file.txt" 'other dir'"#).unwrap(),
            vec!["mv", "my file.txt", "other dir"]
        );
        assert_eq!(
            tokenize(r#"filter --name="a b*" """#).unwrap(),
            vec!["filter", "--name=a b*", ""]
        );
        assert_eq!(tokenize(r#"say "it's""#).unwrap(), vec!["say", "it's"]);
    }

    #[test]
    fn tokenize_keeps_backslashes() {
        assert_eq!(
            tokenize(r"cd C:\Users\me").unwrap(),
            vec!["cd", r"C:\Users\me"]
        );
    }

    #[test]
    fn tokenize_rejects_unterminated_quote() {
        let result = tokenize("cat \"broken");
        assert!(matches!(result, Err(CoreError::InvalidArgument(_))));
    }
}
