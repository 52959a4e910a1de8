use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use time::Date;

pub const ORDER_PREFIX: &str = "NST";

/// `NST` + `YYYYMMDD` + 4-digit zero-padded random suffix.
/// Not collision-free; the `orders.order_number` unique index catches repeats.
pub fn generate_order_number<R: Rng>(day: Date, rng: &mut R) -> String {
    let suffix: u16 = rng.gen_range(0..9999);
    format!(
        "{ORDER_PREFIX}{:04}{:02}{:02}{suffix:04}",
        day.year(),
        u8::from(day.month()),
        day.day()
    )
}

pub fn is_order_number(s: &str) -> bool {
    lazy_static! {
        static ref ORDER_NUMBER_RE: Regex = Regex::new(r"^NST\d{8}\d{4}$").unwrap();
    }
    ORDER_NUMBER_RE.is_match(s)
}
