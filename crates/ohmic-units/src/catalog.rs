//! Named unit catalog
//!
//! The catalog maps unit names to [`Unit`]s. [`UnitCatalog::standard`]
//! returns the process-wide catalog of circuit-relevant SI units, built once
//! on first access and read-only afterwards.
//!
//! # Standard Units
//!
//! | Base | Dimension | Prefixed |
//! |------|-----------|----------|
//! | `m` `g` `s` `A` `cd` `rad` | base dimensions | yes |
//! | `V` `ohm` `Ω` `F` `H` `W` `Hz` `C` `S` `J` `N` | derived | yes |
//! | `cm` `min` `h` `in` `mil` | length, time | no |
//! | `1` `%` `ppm` | dimensionless | no |
//!
//! Prefixes: `T G M k m u µ n p f`.
//!
//! Besides single names the catalog resolves unit expressions such as
//! `kg·m/s^2` or `V/(m*s)` through [`UnitCatalog::parse`].

use crate::decimal::pow10;
use crate::dimension::Dimensionality;
use crate::error::UnitParseError;
use crate::unit::Unit;
use indexmap::IndexMap;
use std::sync::OnceLock;

/// Default cap on "did you mean" suggestions.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 3;

/// Default maximum edit distance for a suggestion.
pub const DEFAULT_SUGGESTION_DISTANCE: usize = 2;

/// SI prefixes accepted in front of prefixable units, with their power of ten.
const PREFIXES: &[(&str, i32)] = &[
    ("T", 12),
    ("G", 9),
    ("M", 6),
    ("k", 3),
    ("m", -3),
    ("u", -6),
    ("µ", -6),
    ("n", -9),
    ("p", -12),
    ("f", -15),
];

/// Name → unit lookup table.
#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    units: IndexMap<String, Unit>,
}

static STANDARD_CATALOG: OnceLock<UnitCatalog> = OnceLock::new();

impl UnitCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard catalog, initialized on first call.
    pub fn standard() -> &'static UnitCatalog {
        STANDARD_CATALOG.get_or_init(Self::initialize)
    }

    fn initialize() -> UnitCatalog {
        let mut catalog = UnitCatalog::new();

        // Mass is anchored on the gram so that `kg` falls out of the prefix table.
        catalog.register_prefixed(Unit::ratio("g", Dimensionality::MASS, 1, 1000));
        catalog.register_prefixed(Unit::coherent("m", Dimensionality::LENGTH));
        catalog.register_prefixed(Unit::coherent("rad", Dimensionality::ANGLE));
        catalog.register_prefixed(Unit::coherent("s", Dimensionality::TIME));
        catalog.register_prefixed(Unit::coherent("A", Dimensionality::CURRENT));
        catalog.register_prefixed(Unit::coherent("cd", Dimensionality::LUMINOUS));

        catalog.register_prefixed(Unit::coherent("V", Dimensionality::VOLTAGE));
        catalog.register_prefixed(Unit::coherent("ohm", Dimensionality::RESISTANCE));
        catalog.register_prefixed(Unit::coherent("Ω", Dimensionality::RESISTANCE));
        catalog.register_prefixed(Unit::coherent("F", Dimensionality::CAPACITANCE));
        catalog.register_prefixed(Unit::coherent("H", Dimensionality::INDUCTANCE));
        catalog.register_prefixed(Unit::coherent("W", Dimensionality::POWER));
        catalog.register_prefixed(Unit::coherent("Hz", Dimensionality::FREQUENCY));
        catalog.register_prefixed(Unit::coherent("C", Dimensionality::CHARGE));
        catalog.register_prefixed(Unit::coherent("S", Dimensionality::CONDUCTANCE));
        catalog.register_prefixed(Unit::coherent("J", Dimensionality::ENERGY));
        catalog.register_prefixed(Unit::coherent("N", Dimensionality::FORCE));

        catalog.register(Unit::ratio("cm", Dimensionality::LENGTH, 1, 100));
        catalog.register(Unit::ratio("in", Dimensionality::LENGTH, 254, 10_000));
        catalog.register(Unit::ratio("mil", Dimensionality::LENGTH, 254, 10_000_000));
        catalog.register(Unit::ratio("min", Dimensionality::TIME, 60, 1));
        catalog.register(Unit::ratio("h", Dimensionality::TIME, 3600, 1));

        catalog.register_as("1", Unit::dimensionless());
        catalog.register(Unit::ratio("%", Dimensionality::DIMENSIONLESS, 1, 100));
        catalog.register(Unit::ratio("ppm", Dimensionality::DIMENSIONLESS, 1, 1_000_000));

        catalog
    }

    /// Register a unit under its own symbol.
    ///
    /// # Panics
    ///
    /// Panics if the name is already taken.
    pub fn register(&mut self, unit: Unit) {
        let name = unit.symbol().to_string();
        self.register_as(name, unit);
    }

    /// Register a unit under an explicit name.
    ///
    /// # Panics
    ///
    /// Panics if the name is already taken.
    pub fn register_as(&mut self, name: impl Into<String>, unit: Unit) {
        let name = name.into();
        if self.units.contains_key(&name) {
            panic!("Duplicate unit registration: {}", name);
        }
        self.units.insert(name, unit);
    }

    /// Register a unit and every SI-prefixed variant of it.
    pub fn register_prefixed(&mut self, unit: Unit) {
        for (prefix, exponent) in PREFIXES {
            let name = format!("{}{}", prefix, unit.symbol());
            let scaled = Unit::new(name, *unit.dims(), unit.scale() * pow10(*exponent));
            self.register(scaled);
        }
        self.register(unit);
    }

    /// Look up a single unit name. The empty name is the dimensionless unit.
    pub fn by_name(&self, name: &str) -> Option<&Unit> {
        let name = if name.is_empty() { "1" } else { name };
        self.units.get(name)
    }

    /// All registered names, in registration order.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Closest known names to `name` with the default bounds.
    pub fn suggest(&self, name: &str) -> Vec<&str> {
        self.suggest_with(name, DEFAULT_SUGGESTION_LIMIT, DEFAULT_SUGGESTION_DISTANCE)
    }

    /// Up to `limit` known names within `max_distance` edits of `name`,
    /// nearest first; ties keep registration order.
    pub fn suggest_with(&self, name: &str, limit: usize, max_distance: usize) -> Vec<&str> {
        closest_matches(name, self.all_names(), limit, max_distance)
    }

    /// Resolve a unit expression.
    ///
    /// Names combine with `*` or `·` (product), `/` (quotient, binding the
    /// next factor only) and `^n` (integer power); parentheses group.
    pub fn parse(&self, expr: &str) -> Result<Unit, UnitParseError> {
        let chars: Vec<(usize, char)> = expr.char_indices().collect();
        let mut parser = UnitExprParser {
            catalog: self,
            chars,
            pos: 0,
        };
        parser.skip_whitespace();
        if parser.at_end() {
            return Err(UnitParseError::Empty);
        }
        let unit = parser.product()?;
        parser.skip_whitespace();
        match parser.peek() {
            None => Ok(unit),
            Some((offset, found)) => Err(UnitParseError::UnexpectedChar { found, offset }),
        }
    }

    fn lookup(&self, name: &str) -> Result<Unit, UnitParseError> {
        self.by_name(name)
            .cloned()
            .ok_or_else(|| UnitParseError::UnknownUnit {
                name: name.to_string(),
                suggestions: self
                    .suggest(name)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            })
    }
}

/// Recursive-descent reader over a unit expression.
struct UnitExprParser<'a> {
    catalog: &'a UnitCatalog,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl UnitExprParser<'_> {
    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some((_, c)) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn product(&mut self) -> Result<Unit, UnitParseError> {
        let mut unit = self.power()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some((_, '*' | '·')) => {
                    self.bump();
                    unit = unit
                        .multiply(&self.power()?)
                        .ok_or(UnitParseError::ExponentOverflow)?;
                }
                Some((_, '/')) => {
                    self.bump();
                    unit = unit
                        .divide(&self.power()?)
                        .ok_or(UnitParseError::ExponentOverflow)?;
                }
                _ => return Ok(unit),
            }
        }
    }

    fn power(&mut self) -> Result<Unit, UnitParseError> {
        let base = self.atom()?;
        self.skip_whitespace();
        if !matches!(self.peek(), Some((_, '^'))) {
            return Ok(base);
        }
        self.bump();
        self.skip_whitespace();

        let start = self.pos;
        if matches!(self.peek(), Some((_, '-' | '+'))) {
            self.bump();
        }
        while matches!(self.peek(), Some((_, c)) if c.is_ascii_digit()) {
            self.bump();
        }
        let text: String = self.chars[start..self.pos].iter().map(|(_, c)| c).collect();
        if text.is_empty() {
            return Err(self.unexpected());
        }
        let invalid = || UnitParseError::InvalidExponent(text.clone());
        let exponent: i8 = text.parse().map_err(|_| invalid())?;
        base.pow(exponent).ok_or_else(invalid)
    }

    fn atom(&mut self) -> Result<Unit, UnitParseError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(UnitParseError::UnexpectedEnd),
            Some((_, '(')) => {
                self.bump();
                let inner = self.product()?;
                self.skip_whitespace();
                match self.peek() {
                    Some((_, ')')) => {
                        self.bump();
                        Ok(inner)
                    }
                    _ => Err(self.unexpected()),
                }
            }
            Some((_, '1')) => {
                self.bump();
                Ok(Unit::dimensionless())
            }
            Some((_, c)) if is_name_char(c) => {
                let start = self.pos;
                while matches!(self.peek(), Some((_, c)) if is_name_char(c)) {
                    self.bump();
                }
                let name: String = self.chars[start..self.pos].iter().map(|(_, c)| c).collect();
                self.catalog.lookup(&name)
            }
            Some(_) => Err(self.unexpected()),
        }
    }

    fn unexpected(&self) -> UnitParseError {
        match self.peek() {
            Some((offset, found)) => UnitParseError::UnexpectedChar { found, offset },
            None => UnitParseError::UnexpectedEnd,
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphabetic() || c == '%'
}

/// Up to `limit` of `candidates` within `max_distance` edits of `name`,
/// nearest first. The sort is stable, so ties keep candidate order.
pub fn closest_matches<'n>(
    name: &str,
    candidates: impl IntoIterator<Item = &'n str>,
    limit: usize,
    max_distance: usize,
) -> Vec<&'n str> {
    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .map(|candidate| (levenshtein_distance(name, candidate), candidate))
        .filter(|(distance, _)| *distance <= max_distance)
        .collect();
    scored.sort_by_key(|(distance, _)| *distance);
    scored
        .into_iter()
        .take(limit)
        .map(|(_, candidate)| candidate)
        .collect()
}

/// Edit distance between two names, counted in chars.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_rational::BigRational;

    fn scale(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    #[test]
    fn test_base_and_prefixed_lookup() {
        let catalog = UnitCatalog::standard();
        let kg = catalog.by_name("kg").unwrap();
        assert_eq!(*kg.dims(), Dimensionality::MASS);
        assert_eq!(*kg.scale(), scale(1, 1));

        let kohm = catalog.by_name("kohm").unwrap();
        assert_eq!(*kohm.scale(), scale(1000, 1));
        assert_eq!(catalog.by_name("kΩ"), Some(kohm));

        assert_eq!(catalog.by_name("uF"), catalog.by_name("µF"));
        assert_eq!(*catalog.by_name("pF").unwrap().scale(), scale(1, 1_000_000_000_000));
        assert_eq!(*catalog.by_name("MHz").unwrap().dims(), Dimensionality::FREQUENCY);
    }

    #[test]
    fn test_non_prefixed_units() {
        let catalog = UnitCatalog::standard();
        assert_eq!(*catalog.by_name("mil").unwrap().scale(), scale(254, 10_000_000));
        assert_eq!(*catalog.by_name("h").unwrap().scale(), scale(3600, 1));
        assert!(catalog.by_name("1").unwrap().is_dimensionless());
        assert!(catalog.by_name("").unwrap().is_dimensionless());
        assert!(catalog.by_name("kmin").is_none());
    }

    #[test]
    fn test_case_sensitive_prefixes() {
        let catalog = UnitCatalog::standard();
        assert_eq!(*catalog.by_name("ms").unwrap().dims(), Dimensionality::TIME);
        assert_eq!(
            *catalog.by_name("mS").unwrap().dims(),
            Dimensionality::CONDUCTANCE
        );
        assert_eq!(*catalog.by_name("Mm").unwrap().scale(), scale(1_000_000, 1));
    }

    #[test]
    #[should_panic(expected = "Duplicate unit registration")]
    fn test_duplicate_registration_panics() {
        let mut catalog = UnitCatalog::new();
        catalog.register(Unit::coherent("V", Dimensionality::VOLTAGE));
        catalog.register(Unit::coherent("V", Dimensionality::VOLTAGE));
    }

    #[test]
    fn test_suggestions() {
        let catalog = UnitCatalog::standard();
        let suggestions = catalog.suggest("kohms");
        assert_eq!(suggestions.first(), Some(&"kohm"));
        assert!(suggestions.len() <= DEFAULT_SUGGESTION_LIMIT);

        assert!(catalog.suggest_with("zzzzzz", 3, 1).is_empty());
        assert_eq!(catalog.suggest_with("Vx", 1, 1), vec!["V"]);
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("ohm", ""), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("µF", "uF"), 1);
    }

    #[test]
    fn test_closest_matches() {
        let names = ["vdd", "vcc1", "gnd", "vc"];
        assert_eq!(closest_matches("vcc", names, 3, 2), ["vcc1", "vc", "vdd"]);
        assert_eq!(closest_matches("vcc", names, 1, 2), ["vcc1"]);
        assert_eq!(closest_matches("vcc", names, 3, 0), Vec::<&str>::new());
        assert!(closest_matches("vcc", std::iter::empty(), 3, 2).is_empty());
    }

    #[test]
    fn test_parse_expression() {
        let catalog = UnitCatalog::standard();

        let newton = catalog.parse("kg·m/s^2").unwrap();
        assert_eq!(*newton.dims(), Dimensionality::FORCE);
        assert_eq!(newton, *catalog.by_name("N").unwrap());
        assert_eq!(newton.symbol(), "kg·m/s^2");

        let ohm = catalog.parse("V / A").unwrap();
        assert_eq!(ohm, *catalog.by_name("ohm").unwrap());

        let per_area = catalog.parse("1/(m*m)").unwrap();
        assert_eq!(Some(*per_area.dims()), Dimensionality::LENGTH.pow(-2));

        let hz = catalog.parse("s^-1").unwrap();
        assert_eq!(hz, *catalog.by_name("Hz").unwrap());
    }

    #[test]
    fn test_parse_errors() {
        let catalog = UnitCatalog::standard();
        assert_eq!(catalog.parse("  "), Err(UnitParseError::Empty));
        assert_eq!(catalog.parse("V/"), Err(UnitParseError::UnexpectedEnd));
        assert!(matches!(
            catalog.parse("kohmz"),
            Err(UnitParseError::UnknownUnit { .. })
        ));
        assert!(matches!(
            catalog.parse("(V"),
            Err(UnitParseError::UnexpectedEnd)
        ));
        assert_eq!(
            catalog.parse("V A"),
            Err(UnitParseError::UnexpectedChar {
                found: 'A',
                offset: 2
            })
        );
        assert_eq!(
            catalog.parse("m^x"),
            Err(UnitParseError::UnexpectedChar {
                found: 'x',
                offset: 2
            })
        );
        assert_eq!(
            catalog.parse("m^999"),
            Err(UnitParseError::InvalidExponent("999".to_string()))
        );
    }

    #[test]
    fn test_parse_exponent_overflow() {
        let catalog = UnitCatalog::standard();
        assert_eq!(
            catalog.parse("Hz^-128"),
            Err(UnitParseError::InvalidExponent("-128".to_string()))
        );
        assert_eq!(
            catalog.parse("m^100 * m^100"),
            Err(UnitParseError::ExponentOverflow)
        );
        assert_eq!(
            catalog.parse("m^100 / m^-100"),
            Err(UnitParseError::ExponentOverflow)
        );
        assert_eq!(catalog.parse("s^-127").unwrap().dims().time, -127);
    }
}
