use unicode_normalization::UnicodeNormalization;

/// Punctuation that upstream services reject in ASCII-only transports,
/// mapped to plain equivalents before anything else happens.
const SUBSTITUTIONS: &[(char, &str)] = &[
    ('\u{2014}', "--"), // em dash
    ('\u{2013}', "-"),  // en dash
    ('\u{2018}', "'"),  // left single quote
    ('\u{2019}', "'"),  // right single quote
    ('\u{201C}', "\""), // left double quote
    ('\u{201D}', "\""), // right double quote
    ('\u{2026}', "..."),
    ('\u{2022}', "*"), // bullet
    ('\u{00A0}', " "), // non-breaking space
    ('\u{2010}', "-"), // hyphen
    ('\u{2011}', "-"), // non-breaking hyphen
    ('\u{2212}', "-"), // minus sign
];

/// Normalize arbitrary text into an encoding-stable ASCII form.
///
/// Total function: any input yields a (possibly empty) string. Callers must
/// treat an empty result as "no usable content". The output is always within
/// code points 0-127, and running the function twice is a no-op.
pub fn sanitize(text: &str) -> String {
    let mut replaced = String::with_capacity(text.len());
    'outer: for c in text.chars() {
        for (from, to) in SUBSTITUTIONS {
            if c == *from {
                replaced.push_str(to);
                continue 'outer;
            }
        }
        replaced.push(c);
    }

    let cleaned: String = replaced
        .nfc()
        .filter(|c| !c.is_control() || matches!(*c, '\t' | '\n' | '\r'))
        .filter(char::is_ascii)
        .collect();

    cleaned.trim().to_string()
}
