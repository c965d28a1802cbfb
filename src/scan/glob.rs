//! Glob translation
//!
//! The grid's query API takes a regular expression. Globs are translated
//! by escaping every regex metacharacter and then turning the escaped
//! wildcards back into their regex forms:
//!
//! | glob | regex |
//! |------|-------|
//! | `*`  | `.*`  |
//! | `?`  | `.`   |

const METACHARACTERS: &[char] = &[
    '|', '\\', '{', '}', '(', ')', '[', ']', '^', '$', '+', '*', '?', '.',
];

/// Escape regex metacharacters in `value`
pub fn escape_regex(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() * 2);
    for c in value.chars() {
        if METACHARACTERS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Translate a glob into the regex understood by the grid
pub fn glob_to_regex(glob: &str) -> String {
    let mut regex = String::with_capacity(glob.len() * 2);
    for c in glob.chars() {
        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            c if METACHARACTERS.contains(&c) => {
                regex.push('\\');
                regex.push(c);
            }
            c => regex.push(c),
        }
    }
    regex
}
