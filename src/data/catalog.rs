use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// AttributeCatalog – the filterable attributes and their possible values
// ---------------------------------------------------------------------------

/// Attribute key that is never offered in the attribute picker.
pub const RESERVED_KEY: &str = "profile_picture";

/// Whether an attribute's values are all numbers or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainKind {
    Categorical,
    Numeric,
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainKind::Categorical => write!(f, "categorical"),
            DomainKind::Numeric => write!(f, "numeric"),
        }
    }
}

/// Parse a catalog value or threshold the way the widget does everywhere.
///
/// Leading whitespace is skipped and the longest numeric prefix is read, so
/// `"10kg"` is 10 and `"5abc"` is 5. Infinity must be spelled `Infinity`;
/// `"inf"` and `"nan"` are not numbers.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if text[end..].starts_with("Infinity") {
        return Some(if bytes[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let int_digits = digits(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = digits(exp_end);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    text[..end].parse::<f64>().ok()
}

/// Infer the domain of an attribute from its values.
///
/// A single non-numeric value makes the whole attribute categorical. An
/// empty list is vacuously numeric.
pub fn infer_domain<S: AsRef<str>>(values: &[S]) -> DomainKind {
    if values.iter().all(|v| parse_number(v.as_ref()).is_some()) {
        DomainKind::Numeric
    } else {
        DomainKind::Categorical
    }
}

/// Human-facing label for an attribute key or value.
pub fn display_label(raw: &str) -> String {
    raw.replace('_', " ")
}

/// Mapping attribute name → ordered list of permissible values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeCatalog {
    entries: BTreeMap<String, Vec<String>>,
}

impl AttributeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an attribute and its values.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.entries.insert(name.into(), values);
    }

    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn domain(&self, name: &str) -> Option<DomainKind> {
        self.values(name).map(infer_domain)
    }

    /// Every attribute, reserved key included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, v): (&String, &Vec<String>)| (k.as_str(), v.as_slice()))
    }

    /// Keys offered by the attribute picker.
    pub fn pickable_keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .keys()
            .map(String::as_str)
            .filter(|k| *k != RESERVED_KEY)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeCatalog
where
    K: Into<String>,
    V: IntoIterator,
    V::Item: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, vals)| (k.into(), vals.into_iter().map(Into::into).collect()))
            .collect();
        AttributeCatalog { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_inference_is_stable() {
        let values = ["1", "2.5", " 3 "];
        let first = infer_domain(&values);
        assert_eq!(first, DomainKind::Numeric);
        for _ in 0..3 {
            assert_eq!(infer_domain(&values), first);
        }
    }

    #[test]
    fn one_word_makes_attribute_categorical() {
        assert_eq!(infer_domain(&["1", "2", "three"]), DomainKind::Categorical);
        assert_eq!(infer_domain(&["", "2"]), DomainKind::Categorical);
    }

    #[test]
    fn nan_text_is_not_a_number() {
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_number(" -4.5 "), Some(-4.5));
    }

    #[test]
    fn reads_the_longest_numeric_prefix() {
        assert_eq!(parse_number("10kg"), Some(10.0));
        assert_eq!(parse_number("5abc"), Some(5.0));
        assert_eq!(parse_number(" 3 "), Some(3.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("7."), Some(7.0));
        assert_eq!(parse_number("1e3x"), Some(1000.0));
        assert_eq!(parse_number("2e"), Some(2.0));
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("kg10"), None);
    }

    #[test]
    fn unit_suffixes_stay_numeric_but_inf_does_not() {
        assert_eq!(infer_domain(&["10kg", "20kg"]), DomainKind::Numeric);
        assert_eq!(infer_domain(&["inf", "1"]), DomainKind::Categorical);
        assert_eq!(infer_domain(&["Infinity", "1"]), DomainKind::Numeric);
    }

    #[test]
    fn empty_entry_is_numeric() {
        let empty: [&str; 0] = [];
        assert_eq!(infer_domain(&empty), DomainKind::Numeric);
    }

    #[test]
    fn reserved_key_is_never_pickable() {
        let catalog: AttributeCatalog = [
            ("profile_picture", vec!["a.png", "b.png"]),
            ("gender", vec!["male", "female"]),
            ("age", vec!["1"]),
        ]
        .into_iter()
        .collect();

        let keys: Vec<&str> = catalog.pickable_keys().collect();
        assert_eq!(keys, vec!["age", "gender"]);
        assert!(catalog.contains(RESERVED_KEY));

        let only_reserved: AttributeCatalog =
            [(RESERVED_KEY, Vec::<String>::new())].into_iter().collect();
        assert_eq!(only_reserved.pickable_keys().count(), 0);
    }

    #[test]
    fn labels_replace_underscores() {
        assert_eq!(display_label("account_balance"), "account balance");
        assert_eq!(display_label("plain"), "plain");
    }
}
