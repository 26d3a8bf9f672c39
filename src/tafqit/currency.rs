//! Currency unit names per language: (main unit, fractional unit).

use crate::language::Language;

struct CurrencyNames {
    code: &'static str,
    ar: (&'static str, &'static str),
    en: (&'static str, &'static str),
    tr: (&'static str, &'static str),
}

const CURRENCIES: &[CurrencyNames] = &[
    CurrencyNames { code: "USD", ar: ("دولار أمريكي", "سنت"), en: ("US dollars", "cents"), tr: ("Amerikan doları", "sent") },
    CurrencyNames { code: "EUR", ar: ("يورو", "سنت"), en: ("euros", "cents"), tr: ("euro", "sent") },
    CurrencyNames { code: "TRY", ar: ("ليرة تركية", "قرش"), en: ("Turkish liras", "kuruş"), tr: ("Türk lirası", "kuruş") },
    CurrencyNames { code: "GBP", ar: ("جنيه إسترليني", "بنس"), en: ("pounds sterling", "pence"), tr: ("İngiliz sterlini", "peni") },
    CurrencyNames { code: "SAR", ar: ("ريال سعودي", "هللة"), en: ("Saudi riyals", "halalas"), tr: ("Suudi riyali", "halala") },
    CurrencyNames { code: "AED", ar: ("درهم إماراتي", "فلس"), en: ("UAE dirhams", "fils"), tr: ("BAE dirhemi", "fils") },
    CurrencyNames { code: "RUB", ar: ("روبل روسي", "كوبيك"), en: ("Russian rubles", "kopeks"), tr: ("Rus rublesi", "kopek") },
    CurrencyNames { code: "CNY", ar: ("يوان صيني", "فين"), en: ("Chinese yuan", "fen"), tr: ("Çin yuanı", "fen") },
    CurrencyNames { code: "JPY", ar: ("ين ياباني", "سين"), en: ("Japanese yen", "sen"), tr: ("Japon yeni", "sen") },
    CurrencyNames { code: "IQD", ar: ("دينار عراقي", "فلس"), en: ("Iraqi dinars", "fils"), tr: ("Irak dinarı", "fils") },
    CurrencyNames { code: "EGP", ar: ("جنيه مصري", "قرش"), en: ("Egyptian pounds", "piastres"), tr: ("Mısır lirası", "kuruş") },
    CurrencyNames { code: "JOD", ar: ("دينار أردني", "فلس"), en: ("Jordanian dinars", "fils"), tr: ("Ürdün dinarı", "fils") },
    CurrencyNames { code: "KWD", ar: ("دينار كويتي", "فلس"), en: ("Kuwaiti dinars", "fils"), tr: ("Kuveyt dinarı", "fils") },
    CurrencyNames { code: "OMR", ar: ("ريال عماني", "بيسة"), en: ("Omani rials", "baisa"), tr: ("Umman riyali", "baisa") },
    CurrencyNames { code: "BHD", ar: ("دينار بحريني", "فلس"), en: ("Bahraini dinars", "fils"), tr: ("Bahreyn dinarı", "fils") },
    CurrencyNames { code: "QAR", ar: ("ريال قطري", "درهم"), en: ("Qatari riyals", "dirhams"), tr: ("Katar riyali", "dirhem") },
];

/// Main and fractional unit names for `code` in `lang`.
///
/// Unknown codes use the code itself as the main unit (or a generic word
/// when the code is blank) and cents as the fractional unit.
pub fn currency_names(code: &str, lang: Language) -> (String, String) {
    let code = code.trim().to_ascii_uppercase();

    if let Some(cur) = CURRENCIES.iter().find(|c| c.code == code) {
        let (main, frac) = match lang {
            Language::Ar => cur.ar,
            Language::En => cur.en,
            Language::Tr => cur.tr,
        };
        return (main.to_string(), frac.to_string());
    }

    let (generic, frac) = match lang {
        Language::Ar => ("عملة", "سنت"),
        Language::Tr => ("para birimi", "sent"),
        Language::En => ("currency", "cents"),
    };
    let main = if code.is_empty() { generic.to_string() } else { code };
    (main, frac.to_string())
}

pub fn is_known_currency(code: &str) -> bool {
    let code = code.trim().to_ascii_uppercase();
    CURRENCIES.iter().any(|c| c.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_currency_is_case_insensitive() {
        let (main, frac) = currency_names("usd", Language::En);
        assert_eq!(main, "US dollars");
        assert_eq!(frac, "cents");
        assert!(is_known_currency("qar"));
    }

    #[test]
    fn unknown_currency_uses_code() {
        let (main, frac) = currency_names("XYZ", Language::Tr);
        assert_eq!(main, "XYZ");
        assert_eq!(frac, "sent");
    }

    #[test]
    fn blank_currency_uses_generic_word() {
        assert_eq!(currency_names("", Language::Ar).0, "عملة");
        assert_eq!(currency_names(" ", Language::En).0, "currency");
    }
}
