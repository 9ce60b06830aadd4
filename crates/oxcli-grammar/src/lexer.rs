//! Shell-like line tokenizer.

use oxcli_types::error::{CliError, Result};

/// Split a line into tokens.
///
/// Supports single quotes (literal), double quotes (with `\"` and `\\`
/// escapes) and backslash escapes outside quotes.
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    Ok(lex(input)?.tokens)
}

/// Tokenize for completion: a trailing separator (or an empty line)
/// yields an empty final token, the word being typed.
pub fn tokenize_partial(input: &str) -> Result<Vec<String>> {
    let lexed = lex(input)?;
    let mut tokens = lexed.tokens;
    if tokens.is_empty() || lexed.trailing_space {
        tokens.push(String::new());
    }
    Ok(tokens)
}

struct Lexed {
    tokens: Vec<String>,
    trailing_space: bool,
}

fn lex(input: &str) -> Result<Lexed> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // A quoted empty string is still a token.
    let mut has_token = false;
    let mut chars = input.chars().peekable();
    let mut in_single = false;
    let mut in_double = false;
    let mut trailing_space = false;

    while let Some(ch) = chars.next() {
        trailing_space = false;
        if in_single {
            if ch == '\'' {
                in_single = false;
            } else {
                current.push(ch);
            }
        } else if in_double {
            if ch == '"' {
                in_double = false;
            } else if ch == '\\'
                && let Some(&next) = chars.peek()
                && matches!(next, '"' | '\\')
            {
                current.push(next);
                chars.next();
            } else {
                current.push(ch);
            }
        } else {
            match ch {
                '\'' => {
                    in_single = true;
                    has_token = true;
                },
                '"' => {
                    in_double = true;
                    has_token = true;
                },
                '\\' => match chars.next() {
                    Some(next) => {
                        current.push(next);
                        has_token = true;
                    },
                    None => return Err(CliError::Parse("trailing backslash".to_string())),
                },
                c if c.is_whitespace() => {
                    if has_token {
                        tokens.push(std::mem::take(&mut current));
                        has_token = false;
                    }
                    trailing_space = true;
                },
                _ => {
                    current.push(ch);
                    has_token = true;
                },
            }
        }
    }

    if in_single {
        return Err(CliError::Parse("unterminated single quote".to_string()));
    }
    if in_double {
        return Err(CliError::Parse("unterminated double quote".to_string()));
    }

    if has_token {
        tokens.push(current);
    }

    Ok(Lexed {
        tokens,
        trailing_space,
    })
}
