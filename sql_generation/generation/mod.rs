use rand::Rng;

pub mod query;
pub mod value;

/// Values that can be generated at random given some context, such as a column or a table.
pub trait ArbitraryFrom<T> {
    fn arbitrary_from<R: Rng + ?Sized>(rng: &mut R, t: T) -> Self;
}

pub fn pick<'a, T, R: Rng + ?Sized>(choices: &'a [T], rng: &mut R) -> &'a T {
    let index = rng.random_range(0..choices.len());
    &choices[index]
}

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz1234567890";

/// A random lowercase alphanumeric string of exactly `len` characters.
pub fn gen_random_text<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| LETTERS[rng.random_range(0..LETTERS.len())] as char)
        .collect()
}

/// A string of `len` random decimal digits, leading zeros allowed.
pub fn gen_random_digits<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}
