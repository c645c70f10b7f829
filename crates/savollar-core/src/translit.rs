//! Uzbek Latin to Cyrillic transliteration

/// Digraphs, matched before single characters
const DIGRAPHS: &[(&str, &str)] = &[
    ("sh", "ш"),
    ("ch", "ч"),
    ("g'", "ғ"),
    ("o'", "ў"),
    ("ng", "нг"),
];

const SINGLE_CHARS: &[(char, char)] = &[
    ('a', 'а'),
    ('b', 'б'),
    ('d', 'д'),
    ('e', 'е'),
    ('f', 'ф'),
    ('g', 'г'),
    ('h', 'ҳ'),
    ('i', 'и'),
    ('j', 'ж'),
    ('k', 'к'),
    ('l', 'л'),
    ('m', 'м'),
    ('n', 'н'),
    ('o', 'о'),
    ('p', 'п'),
    ('q', 'қ'),
    ('r', 'р'),
    ('s', 'с'),
    ('t', 'т'),
    ('u', 'у'),
    ('v', 'в'),
    ('x', 'х'),
    ('y', 'й'),
    ('z', 'з'),
    ('\'', 'ъ'),
];

/// Convert Uzbek Latin text to Cyrillic, preserving case
pub fn latin_to_cyrillic(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if i + 1 < chars.len() {
            let pair: String = chars[i..i + 2]
                .iter()
                .flat_map(|c| c.to_lowercase())
                .collect();
            if let Some((_, mapped)) = DIGRAPHS.iter().find(|(latin, _)| *latin == pair) {
                result.push_str(&apply_case(mapped, chars[i], chars[i + 1]));
                i += 2;
                continue;
            }
        }

        let c = chars[i];
        let lower = c.to_lowercase().next().unwrap_or(c);
        match SINGLE_CHARS.iter().find(|(latin, _)| *latin == lower) {
            Some((_, mapped)) => {
                if c.is_uppercase() {
                    result.extend(mapped.to_uppercase());
                } else {
                    result.push(*mapped);
                }
            }
            None => result.push(c),
        }
        i += 1;
    }

    result
}

/// Carry Latin casing over to the mapped Cyrillic digraph
fn apply_case(mapped: &str, first: char, second: char) -> String {
    if first.is_uppercase() && second.is_uppercase() {
        mapped.to_uppercase()
    } else if first.is_uppercase() {
        let mut chars = mapped.chars();
        match chars.next() {
            Some(head) => head.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        mapped.to_string()
    }
}

/// Heuristic: does the text look like Latin Uzbek? (>30% Latin letters)
pub fn is_latin(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let total = text.chars().count();
    let latin = text
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || *c == '\'')
        .count();
    latin * 10 > total * 3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digraphs_before_singles() {
        assert_eq!(latin_to_cyrillic("shahar"), "шаҳар");
        assert_eq!(latin_to_cyrillic("choy"), "чой");
        assert_eq!(latin_to_cyrillic("g'oz"), "ғоз");
        assert_eq!(latin_to_cyrillic("o'zbek"), "ўзбек");
        assert_eq!(latin_to_cyrillic("keling"), "келинг");
    }

    #[test]
    fn test_single_chars_and_apostrophe() {
        assert_eq!(latin_to_cyrillic("namoz"), "намоз");
        assert_eq!(latin_to_cyrillic("ta'lim"), "таълим");
    }

    #[test]
    fn test_case_preserved() {
        assert_eq!(latin_to_cyrillic("Shahar"), "Шаҳар");
        assert_eq!(latin_to_cyrillic("SHAHAR"), "ШАҲАР");
        assert_eq!(latin_to_cyrillic("Namoz"), "Намоз");
    }

    #[test]
    fn test_non_latin_passthrough() {
        assert_eq!(latin_to_cyrillic("123, !"), "123, !");
        assert_eq!(latin_to_cyrillic("намоз"), "намоз");
    }

    #[test]
    fn test_is_latin() {
        assert!(is_latin("namoz vaqtlari"));
        assert!(!is_latin("намоз вақтлари"));
        assert!(!is_latin(""));
    }
}
