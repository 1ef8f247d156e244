//! Register dump
//!
//! Human-readable snapshot of the register file and zero-flag.

use std::fmt::Write as _;
use std::io::Write;

use super::value::Value;
use super::vm::VirtualMachine;

impl<W: Write> VirtualMachine<W> {
    /// One line per register plus the zero-flag. Read-only.
    pub fn register_dump(&self) -> String {
        let mut dump = String::from("register dump\n");

        for (i, value) in self.registers.iter().enumerate() {
            let _ = match value {
                Value::Number(n) => writeln!(dump, "\tregister {:02} - decimal: {:04} [hex:{:04x}]", i, n, n),
                Value::String(s) => writeln!(dump, "\tregister {:02} - string: \"{}\"", i, escape(s)),
            };
        }

        let _ = writeln!(dump, "\tz-flag: {}", self.zero_flag);
        dump
    }
}

/// Escape control characters, quotes and backslashes for display
pub fn escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for ch in String::from_utf8_lossy(bytes).chars() {
        match ch {
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\x0C' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0B' => out.push_str("\\v"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c if c.is_ascii_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_control_characters() {
        assert_eq!(escape(b"a\tb\n"), "a\\tb\\n");
        assert_eq!(escape(b"back\\slash"), "back\\\\slash");
        assert_eq!(escape(b"\x07\x08\x0B\x0C\r"), "\\a\\b\\v\\f\\r");
        assert_eq!(escape(b"nul\0"), "nul\\x00");
        assert_eq!(escape(b"say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(escape(b"plain"), "plain");
    }
}
