use rand::Rng;

use crate::{
    generation::{gen_random_digits, gen_random_text, pick, ArbitraryFrom},
    model::{
        column::{Column, ColumnKind},
        table::{SimValue, Table},
    },
};

pub mod time;

pub use time::Window;

pub const MIN_YEAR: i64 = 1901;
pub const MAX_YEAR: i64 = 2155;

impl ArbitraryFrom<&Table> for Vec<SimValue> {
    fn arbitrary_from<R: Rng + ?Sized>(rng: &mut R, table: &Table) -> Self {
        table
            .columns
            .iter()
            .map(|column| SimValue::arbitrary_from(rng, column.as_ref()))
            .collect()
    }
}

impl ArbitraryFrom<&Column> for SimValue {
    fn arbitrary_from<R: Rng + ?Sized>(rng: &mut R, column: &Column) -> Self {
        match column.kind {
            ColumnKind::TinyInt => gen_integer(rng, 8, column.unsigned),
            ColumnKind::SmallInt => gen_integer(rng, 16, column.unsigned),
            ColumnKind::MediumInt => gen_integer(rng, 24, column.unsigned),
            ColumnKind::Int => gen_integer(rng, 32, column.unsigned),
            ColumnKind::BigInt => gen_integer(rng, 64, column.unsigned),
            ColumnKind::Bit => SimValue::Text(gen_bit(rng, column.width)),
            ColumnKind::Bool => SimValue::Int(rng.random_range(0..=1)),
            ColumnKind::Float => SimValue::Float(rng.random_range(1.0f32..2.0)),
            ColumnKind::Double => SimValue::Double(rng.random_range(1.0f64..2.0)),
            ColumnKind::Decimal => SimValue::Text(gen_decimal(
                rng,
                column.width,
                column.scale,
                column.unsigned,
            )),
            ColumnKind::Date => SimValue::Text(time::gen_date(rng)),
            ColumnKind::Time => SimValue::Text(time::gen_time(rng)),
            ColumnKind::DateTime => SimValue::Text(time::gen_datetime(rng, Window::DateTime)),
            ColumnKind::Timestamp => SimValue::Text(time::gen_datetime(rng, Window::Timestamp)),
            ColumnKind::Year => SimValue::Int(rng.random_range(MIN_YEAR..MAX_YEAR)),
            ColumnKind::Enum => SimValue::Text(pick(&column.members, rng).clone()),
            ColumnKind::Set => SimValue::Text(gen_set(rng, &column.members)),
            ColumnKind::Json => SimValue::Text(gen_json(rng)),
            ColumnKind::Char
            | ColumnKind::VarChar
            | ColumnKind::Binary
            | ColumnKind::VarBinary
            | ColumnKind::TinyText
            | ColumnKind::Text
            | ColumnKind::MediumText
            | ColumnKind::LongText
            | ColumnKind::TinyBlob
            | ColumnKind::Blob
            | ColumnKind::MediumBlob
            | ColumnKind::LongBlob => SimValue::Text(gen_characters(rng, column.width)),
        }
    }
}

/// Uniform over the full range of a `bits`-wide integer.
pub fn gen_integer<R: Rng + ?Sized>(rng: &mut R, bits: u32, unsigned: bool) -> SimValue {
    if unsigned {
        let max = if bits >= 64 {
            u64::MAX
        } else {
            (1u64 << bits) - 1
        };
        SimValue::UInt(rng.random_range(0..=max))
    } else {
        let max = if bits >= 64 {
            i64::MAX
        } else {
            (1i64 << (bits - 1)) - 1
        };
        SimValue::Int(rng.random_range(-max - 1..=max))
    }
}

/// A binary digit string for a `BIT(width)` column.
pub fn gen_bit<R: Rng + ?Sized>(rng: &mut R, width: u32) -> String {
    if width >= 64 {
        return format!("{:b}", rng.random::<u64>());
    }
    let mut bits = width.max(1);
    // Widths above 7 lose one bit of range.
    if bits > 7 {
        bits -= 1;
    }
    let bound = (1u64 << bits) - 1;
    format!("{:b}", rng.random_range(0..bound.max(1)))
}

/// A `DECIMAL(width, scale)` literal. Never renders a negative zero.
pub fn gen_decimal<R: Rng + ?Sized>(rng: &mut R, width: u32, scale: u32, unsigned: bool) -> String {
    let integer = gen_random_digits(rng, width.saturating_sub(scale) as usize);
    let fraction = gen_random_digits(rng, scale as usize);

    let integer = match integer.trim_start_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };
    let is_zero = integer == "0" && fraction.bytes().all(|b| b == b'0');

    let mut value = String::with_capacity(integer.len() + fraction.len() + 2);
    if !unsigned && !is_zero && rng.random_bool(0.5) {
        value.push('-');
    }
    value.push_str(integer);
    if !fraction.is_empty() {
        value.push('.');
        value.push_str(&fraction);
    }
    value
}

/// Random text shorter than the declared length; empty when no length is declared.
pub fn gen_characters<R: Rng + ?Sized>(rng: &mut R, width: u32) -> String {
    if width == 0 {
        return String::new();
    }
    let len = rng.random_range(0..width as usize);
    gen_random_text(rng, len)
}

/// A random subset of `members`, in declaration order.
pub fn gen_set<R: Rng + ?Sized>(rng: &mut R, members: &[String]) -> String {
    members
        .iter()
        .filter(|_| rng.random_bool(0.5))
        .cloned()
        .collect::<Vec<_>>()
        .join(",")
}

pub fn gen_json<R: Rng + ?Sized>(rng: &mut R) -> String {
    let len = rng.random_range(0..16);
    serde_json::json!({
        "k": rng.random::<i32>(),
        "v": gen_random_text(rng, len),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn column(ty: &str) -> Column {
        Column::parse(0, "c", ty).unwrap()
    }

    fn generate(ty: &str, seed: u64) -> SimValue {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        SimValue::arbitrary_from(&mut rng, &column(ty))
    }

    fn int_in(value: &SimValue, min: i64, max: i64) -> bool {
        matches!(value, SimValue::Int(v) if (min..=max).contains(v))
    }

    fn uint_in(value: &SimValue, max: u64) -> bool {
        matches!(value, SimValue::UInt(v) if *v <= max)
    }

    proptest! {
        #[test]
        fn integers_fit_their_width(seed: u64) {
            prop_assert!(int_in(&generate("tinyint", seed), -128, 127));
            prop_assert!(uint_in(&generate("tinyint unsigned", seed), 255));
            prop_assert!(int_in(&generate("smallint(6)", seed), -32768, 32767));
            prop_assert!(uint_in(&generate("smallint unsigned", seed), 65535));
            prop_assert!(int_in(&generate("mediumint", seed), -(1 << 23), (1 << 23) - 1));
            prop_assert!(uint_in(&generate("mediumint unsigned", seed), (1 << 24) - 1));
            prop_assert!(int_in(&generate("int(11)", seed), i32::MIN as i64, i32::MAX as i64));
            prop_assert!(uint_in(&generate("int unsigned", seed), u32::MAX as u64));
            prop_assert!(matches!(generate("bigint", seed), SimValue::Int(_)));
            prop_assert!(matches!(generate("bigint unsigned", seed), SimValue::UInt(_)));
        }

        #[test]
        fn floats_are_in_one_to_two(seed: u64) {
            prop_assert!(matches!(generate("float", seed), SimValue::Float(v) if (1.0..2.0).contains(&v)));
            prop_assert!(matches!(generate("double", seed), SimValue::Double(v) if (1.0..2.0).contains(&v)));
        }

        #[test]
        fn decimals_respect_precision(seed: u64, width in 1u32..30, scale_frac in 0u32..=100) {
            let scale = width * scale_frac / 100;
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let value = gen_decimal(&mut rng, width, scale, false);
            let digits = value.trim_start_matches('-');
            let (integer, fraction) = digits.split_once('.').unwrap_or((digits, ""));
            prop_assert_eq!(fraction.len(), scale as usize);
            prop_assert!(integer.len() <= (width - scale).max(1) as usize);
            prop_assert!(integer == "0" || !integer.starts_with('0'));
            prop_assert!(integer.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()));
            if value.starts_with('-') {
                prop_assert!(digits.bytes().any(|b| (b'1'..=b'9').contains(&b)), "negative zero {}", value);
            }
        }

        #[test]
        fn unsigned_decimals_have_no_sign(seed: u64) {
            let value = generate("decimal(6,2) unsigned", seed);
            prop_assert!(matches!(value, SimValue::Text(s) if !s.starts_with('-')));
        }

        #[test]
        fn characters_are_shorter_than_declared(seed: u64, width in 1u32..64) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let s = gen_characters(&mut rng, width);
            prop_assert!(s.len() < width as usize);
            prop_assert!(s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
        }

        #[test]
        fn bits_stay_under_bound(seed: u64, width in 0u32..=70) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let s = gen_bit(&mut rng, width);
            let v = u64::from_str_radix(&s, 2).unwrap();
            if width < 64 {
                let bits = match width.max(1) { b if b > 7 => b - 1, b => b };
                let bound = ((1u64 << bits) - 1).max(1);
                prop_assert!(v < bound);
            }
        }

        #[test]
        fn years_in_range(seed: u64) {
            prop_assert!(int_in(&generate("year", seed), MIN_YEAR, MAX_YEAR - 1));
        }

        #[test]
        fn bools_are_zero_or_one(seed: u64) {
            prop_assert!(int_in(&generate("boolean", seed), 0, 1));
        }

        #[test]
        fn enum_and_set_use_members(seed: u64) {
            let members = ["x", "y", "z"];
            prop_assert!(matches!(generate("enum('x','y','z')", seed), SimValue::Text(s) if members.contains(&s.as_str())));
            let set = generate("set('x','y','z')", seed);
            let SimValue::Text(set) = set else { panic!("set value must be text") };
            prop_assert!(set.is_empty() || set.split(',').all(|m| members.contains(&m)));
        }
    }

    #[test]
    fn test_decimal_zero_is_never_negative() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..2000 {
            let v = gen_decimal(&mut rng, 2, 1, false);
            assert_ne!(v, "-0.0");
            assert_ne!(v, "-0");
        }
        for _ in 0..200 {
            let v = gen_decimal(&mut rng, 1, 0, false);
            assert_ne!(v, "-0");
        }
    }

    #[test]
    fn test_decimal_without_integer_digits() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let v = gen_decimal(&mut rng, 3, 3, false);
        assert!(v.trim_start_matches('-').starts_with("0."), "{v}");
    }

    #[test]
    fn test_unbounded_text_is_empty() {
        assert_eq!(generate("text", 3), SimValue::Text(String::new()));
        assert_eq!(generate("longblob", 3), SimValue::Text(String::new()));
    }

    #[test]
    fn test_character_kinds_generate_bounded_text() {
        let types = [
            "char(8)", "varchar(8)", "binary(8)", "varbinary(8)", "tinytext(8)", "text(8)",
            "mediumtext(8)", "longtext(8)", "tinyblob(8)", "blob(8)", "mediumblob(8)",
            "longblob(8)",
        ];
        for ty in types {
            for seed in 0..20 {
                let value = generate(ty, seed);
                assert!(matches!(&value, SimValue::Text(s) if s.len() < 8), "{ty}: {value:?}");
            }
        }
    }

    #[test]
    fn test_json_is_valid() {
        let SimValue::Text(json) = generate("json", 9) else {
            panic!("json value must be text")
        };
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("k").is_some());
    }

    #[test]
    fn test_row_follows_columns() {
        let table = Table::new(
            "db",
            "t",
            vec![column("int"), column("varchar(4)"), column("float")],
        )
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let row = Vec::<SimValue>::arbitrary_from(&mut rng, &table);
        assert_eq!(row.len(), 3);
        assert!(matches!(row[0], SimValue::Int(_)));
        assert!(matches!(row[1], SimValue::Text(_)));
        assert!(matches!(row[2], SimValue::Float(_)));
    }
}
