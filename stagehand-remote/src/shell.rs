//! POSIX shell quoting for commands sent over the SSH channel.

/// Characters that force an argument into single quotes.
const SHELL_META: &[char] = &[
    ' ', '\t', '\n', '\'', '"', '\\', '$', '`', '!', '*', '?', '[', ']', '(', ')', '{', '}', '<',
    '>', '|', '&', ';', '#', '~', '=', '%',
];

/// Quote one argument so the remote shell sees it as a single word.
///
/// Plain words pass through untouched; anything else is single-quoted with
/// embedded quotes rewritten as `'\''`.
pub fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }
    if !arg.contains(SHELL_META) {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', "'\\''"))
}

/// Quote and join a program and its arguments.
pub fn join<'a>(words: impl IntoIterator<Item = &'a str>) -> String {
    words
        .into_iter()
        .map(quote_arg)
        .collect::<Vec<_>>()
        .join(" ")
}
