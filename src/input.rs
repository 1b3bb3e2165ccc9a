//! Edit stream for the demo: every stdin line is either a command or the new content.

/// One event read from the edit stream
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// Replace the content. `\n` escapes are expanded.
    Text(String),
    /// `:size W H` resizes the surface
    Bounds { width: f32, height: f32 },
    /// `:pad N` sets uniform padding
    Padding(f32),
    /// `:text-size S` sets the configured size, 0 disables fitting
    TextSize(f32),
}

/// Parse one input line. Unknown or malformed commands are reported as `Err` with a
/// message for the user.
pub fn parse_line(line: &str) -> Result<Edit, String> {
    // `::` escapes a literal leading colon
    if let Some(rest) = line.strip_prefix("::") {
        return Ok(Edit::Text(format!(":{}", rest.replace("\\n", "\n"))));
    }
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Edit::Text(line.replace("\\n", "\n")));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let numbers: Vec<f32> = parts
        .map(|p| p.parse::<f32>().map_err(|e| format!("bad number {p:?}: {e}")))
        .collect::<Result<_, _>>()?;

    match (name, numbers.as_slice()) {
        ("size", &[width, height]) => Ok(Edit::Bounds { width, height }),
        ("pad", &[padding]) => Ok(Edit::Padding(padding)),
        ("text-size", &[size]) => Ok(Edit::TextSize(size)),
        _ => Err(format!("unknown command {line:?}")),
    }
}

/// Render display text on one line of output
pub fn escape(text: &str) -> String {
    text.replace('\n', "\\n")
}
