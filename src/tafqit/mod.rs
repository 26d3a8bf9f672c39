//! Amount-in-words ("tafqit") for invoices.
//!
//! `tafqit(1250.50, "USD", En)` →
//! `"one thousand two hundred and fifty US dollars and fifty cents"`.

mod currency;
mod words;

pub use currency::{currency_names, is_known_currency};
pub use words::{number_to_words_ar, number_to_words_en, number_to_words_tr};

use crate::language::Language;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Splits an amount into its whole part and hundredths.
///
/// The sign is dropped. Hundredths are rounded half away from zero; a
/// fraction that rounds up to 100 carries into the whole part.
pub fn split_amount(amount: Decimal) -> (u64, u32) {
    let abs = amount.abs();
    let whole = abs.trunc();
    let hundredths = ((abs - whole) * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0);

    let whole = whole.to_u64().unwrap_or(u64::MAX);
    if hundredths >= 100 {
        (whole.saturating_add(1), 0)
    } else {
        (whole, hundredths)
    }
}

/// Spells `n` in the given language.
pub fn number_to_words(n: u64, lang: Language) -> String {
    match lang {
        Language::Ar => number_to_words_ar(n),
        Language::En => number_to_words_en(n),
        Language::Tr => number_to_words_tr(n),
    }
}

/// Spells an amount with its currency units.
pub fn tafqit(amount: Decimal, currency_code: &str, lang: Language) -> String {
    let (whole, fraction) = split_amount(amount);
    let (main_unit, fraction_unit) = currency_names(currency_code, lang);
    let joiner = match lang {
        Language::Ar => "و",
        Language::En => "and",
        Language::Tr => "ve",
    };

    let whole_words = number_to_words(whole, lang);
    if fraction > 0 {
        let fraction_words = number_to_words(u64::from(fraction), lang);
        format!(
            "{} {} {} {} {}",
            whole_words, main_unit, joiner, fraction_words, fraction_unit
        )
    } else {
        format!("{} {}", whole_words, main_unit)
    }
}
