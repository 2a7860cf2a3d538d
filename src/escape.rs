use std::borrow::Cow;

use crate::executor::ShellKind;

/// Characters `cmd` acts on even inside double quotes: `"` ends the quoted
/// run, `%` and `!` expand variables.
const CMD_NEUTRALISED: [char; 3] = ['"', '%', '!'];

/// Quotes `value` as a single token for the given shell family.
///
/// Unix shells get single quotes (embedded quotes become `'\''`). For `cmd`
/// the value is always wrapped in double quotes, after `"`, `%` and `!` are
/// replaced by spaces and trailing backslashes are doubled so they cannot
/// escape the closing quote.
pub fn escape_argument(shell: ShellKind, value: &str) -> Cow<'_, str> {
    match shell {
        ShellKind::Unix => shell_escape::unix::escape(Cow::Borrowed(value)),
        ShellKind::Windows => Cow::Owned(escape_cmd(value)),
    }
}

fn escape_cmd(value: &str) -> String {
    let body = value.replace(CMD_NEUTRALISED, " ");
    let trailing = body.len() - body.trim_end_matches('\\').len();

    let mut escaped = String::with_capacity(body.len() + trailing + 2);
    escaped.push('"');
    escaped.push_str(&body);
    escaped.extend(std::iter::repeat_n('\\', trailing));
    escaped.push('"');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unix_wraps_whitespace_in_single_quotes() {
        assert_eq!(escape_argument(ShellKind::Unix, " foo bar"), "' foo bar'");
    }

    #[test]
    fn unix_neutralises_metacharacters() {
        assert_eq!(
            escape_argument(ShellKind::Unix, " $(rm -rf ~); `id`"),
            "' $(rm -rf ~); `id`'"
        );
        assert_eq!(escape_argument(ShellKind::Unix, " it's"), r"' it'\''s'");
    }

    #[test]
    fn unix_leaves_plain_words_alone() {
        assert_eq!(escape_argument(ShellKind::Unix, "plain-word_1.txt"), "plain-word_1.txt");
    }

    #[test]
    fn windows_wraps_in_double_quotes() {
        assert_eq!(escape_argument(ShellKind::Windows, " foo bar"), "\" foo bar\"");
        assert_eq!(escape_argument(ShellKind::Windows, "plain"), "\"plain\"");
    }

    #[test]
    fn windows_embedded_quote_cannot_close_the_token() {
        let escaped = escape_argument(ShellKind::Windows, " a\" & whoami");
        assert_eq!(escaped, "\" a  & whoami\"");
        assert_eq!(escaped.matches('"').count(), 2);
    }

    #[test]
    fn windows_variables_are_not_expanded() {
        assert_eq!(escape_argument(ShellKind::Windows, " %PATH%"), "\"  PATH \"");
        assert_eq!(escape_argument(ShellKind::Windows, " !HOME!"), "\"  HOME \"");
    }

    #[test]
    fn windows_trailing_backslashes_are_doubled() {
        assert_eq!(escape_argument(ShellKind::Windows, r" C:\dir\"), r#"" C:\dir\\""#);
        assert_eq!(escape_argument(ShellKind::Windows, r" a\\"), r#"" a\\\\""#);
        assert_eq!(escape_argument(ShellKind::Windows, r" C:\dir\x"), r#"" C:\dir\x""#);
    }
}
