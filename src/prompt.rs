//! Interactive terminal prompts

use std::io::{self, BufRead, Write};

/// Ask a yes/no question. Only `y` (any case) counts as yes.
pub fn confirm(question: &str) -> io::Result<bool> {
    let answer = ask(&format!("{question} (y/n)"))?;
    Ok(is_yes(&answer))
}

pub fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Print `question` and read one trimmed line from stdin.
pub fn ask(question: &str) -> io::Result<String> {
    print!("{question} ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Like [`ask`] without echoing the input.
pub fn ask_secret(question: &str) -> io::Result<String> {
    rpassword::prompt_password(format!("{question}: "))
}
