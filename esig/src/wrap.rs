// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Iterator of fixed-width lines produced by [wrap_text].
pub struct WrappedLines<'a> {
    remaining: &'a str,
    pad: String,
    available: usize,
    pad_next: bool,
}

/// Wrap `text` into lines no wider than `width`, each indented by `indent` spaces.
///
/// Lines break at the last space that fits. Words longer than a line are split.
/// The first line is only indented when `pad_first` is set, which lets the
/// first line continue something already printed at that column.
pub fn wrap_text(indent: usize, width: usize, text: &str, pad_first: bool) -> WrappedLines<'_> {
    WrappedLines {
        remaining: text.trim(),
        pad: " ".repeat(indent),
        available: width.saturating_sub(indent).max(1),
        pad_next: pad_first,
    }
}

impl<'a> Iterator for WrappedLines<'a> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }

        let text = self.remaining;
        let (line, rest) = match text.char_indices().nth(self.available) {
            None => (text, ""),
            Some((limit, _)) if text[limit..].starts_with(' ') => (&text[..limit], &text[limit..]),
            Some((limit, _)) => match text[..limit].rfind(' ') {
                Some(space) if space > 0 => (&text[..space], &text[space..]),
                _ => (&text[..limit], &text[limit..]),
            },
        };

        self.remaining = rest.trim_start_matches(' ');

        let pad = if self.pad_next { self.pad.as_str() } else { "" };
        self.pad_next = true;

        Some(format!("{}{}", pad, line.trim_end()))
    }
}
