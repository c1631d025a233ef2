// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Executable used to run PowerShell scripts.
pub const POWERSHELL: &str = "powershell.exe";

/// Arguments preceding a script passed to [POWERSHELL].
pub const POWERSHELL_ARGS: [&str; 4] = ["-NoLogo", "-NoProfile", "-NonInteractive", "-Command"];

/// Quote a string as a PowerShell single-quoted literal.
///
/// PowerShell treats the typographic single quotes as quote characters too, so
/// those are doubled as well.
pub fn powershell_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');

    for c in value.chars() {
        if matches!(c, '\'' | '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}') {
            quoted.push(c);
        }
        quoted.push(c);
    }

    quoted.push('\'');
    quoted
}

/// Escape a value for use inside an LDAP search filter (RFC 4515).
pub fn ldap_filter_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\5c"),
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\0' => escaped.push_str("\\00"),
            _ => escaped.push(c),
        }
    }

    escaped
}
