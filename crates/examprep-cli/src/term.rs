// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io::BufRead;
use std::io::Write;

use examprep_core::Fallible;

/// Read one line, without its line ending. `None` at end of input.
pub fn read_line(input: &mut impl BufRead) -> Fallible<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Print a prompt and read the answer.
pub fn ask(
    input: &mut impl BufRead,
    output: &mut impl Write,
    prompt: &str,
) -> Fallible<Option<String>> {
    write!(output, "{prompt}")?;
    output.flush()?;
    read_line(input)
}

/// Ask a yes/no question. Anything but `y` or `yes` is a no.
pub fn confirm(input: &mut impl BufRead, output: &mut impl Write, prompt: &str) -> Fallible<bool> {
    let answer = ask(input, output, &format!("{prompt} [y/N] "))?;
    Ok(matches!(
        answer.as_deref().map(|a| a.trim().to_ascii_lowercase()).as_deref(),
        Some("y" | "yes")
    ))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_read_line() -> Fallible<()> {
        let mut input = Cursor::new("first\r\nsecond\n");
        assert_eq!(read_line(&mut input)?, Some("first".to_string()));
        assert_eq!(read_line(&mut input)?, Some("second".to_string()));
        assert_eq!(read_line(&mut input)?, None);
        Ok(())
    }

    #[test]
    fn test_confirm() -> Fallible<()> {
        let mut output = Vec::new();
        assert!(confirm(&mut Cursor::new("y\n"), &mut output, "Sure?")?);
        assert!(confirm(&mut Cursor::new(" YES \n"), &mut output, "Sure?")?);
        assert!(!confirm(&mut Cursor::new("\n"), &mut output, "Sure?")?);
        assert!(!confirm(&mut Cursor::new(""), &mut output, "Sure?")?);
        assert_eq!(String::from_utf8_lossy(&output).matches("Sure? [y/N] ").count(), 4);
        Ok(())
    }
}
