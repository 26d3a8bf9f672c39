//! Cardinal numbers spelled out in English, Turkish and Arabic.

const EN_ONES: [&str; 20] = [
    "", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen", "nineteen",
];
const EN_TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];
const EN_SCALES: [&str; 7] = [
    "", "thousand", "million", "billion", "trillion", "quadrillion", "quintillion",
];

const TR_ONES: [&str; 10] = ["", "bir", "iki", "üç", "dört", "beş", "altı", "yedi", "sekiz", "dokuz"];
const TR_TENS: [&str; 10] = [
    "", "on", "yirmi", "otuz", "kırk", "elli", "altmış", "yetmiş", "seksen", "doksan",
];
const TR_SCALES: [&str; 7] = ["", "bin", "milyon", "milyar", "trilyon", "katrilyon", "kentilyon"];

const AR_ONES: [&str; 20] = [
    "", "واحد", "اثنان", "ثلاثة", "أربعة", "خمسة", "ستة", "سبعة", "ثمانية", "تسعة", "عشرة",
    "أحد عشر", "اثنا عشر", "ثلاثة عشر", "أربعة عشر", "خمسة عشر", "ستة عشر", "سبعة عشر",
    "ثمانية عشر", "تسعة عشر",
];
const AR_TENS: [&str; 10] = [
    "", "عشرة", "عشرون", "ثلاثون", "أربعون", "خمسون", "ستون", "سبعون", "ثمانون", "تسعون",
];
const AR_HUNDREDS: [&str; 10] = [
    "", "مئة", "مئتان", "ثلاثمئة", "أربعمئة", "خمسمئة", "ستمئة", "سبعمئة", "ثمانمئة", "تسعمئة",
];

/// (singular, dual, plural) forms of an Arabic scale word.
struct ArScale {
    value: u64,
    singular: &'static str,
    dual: &'static str,
    plural: &'static str,
}

const AR_SCALES: [ArScale; 3] = [
    ArScale { value: 1_000_000_000, singular: "مليار", dual: "ملياران", plural: "مليارات" },
    ArScale { value: 1_000_000, singular: "مليون", dual: "مليونان", plural: "ملايين" },
    ArScale { value: 1_000, singular: "ألف", dual: "ألفان", plural: "آلاف" },
];

/// Splits `n` into groups of three digits, least significant first.
fn chunks(mut n: u64) -> Vec<u64> {
    let mut out = Vec::new();
    while n > 0 {
        out.push(n % 1000);
        n /= 1000;
    }
    out
}

fn en_chunk(mut x: u64) -> String {
    let mut w: Vec<&str> = Vec::new();
    if x >= 100 {
        w.push(EN_ONES[(x / 100) as usize]);
        w.push("hundred");
        x %= 100;
        if x > 0 {
            w.push("and");
        }
    }
    if x >= 20 {
        w.push(EN_TENS[(x / 10) as usize]);
        x %= 10;
        if x > 0 {
            w.push(EN_ONES[x as usize]);
        }
    } else if x > 0 {
        w.push(EN_ONES[x as usize]);
    }
    w.join(" ")
}

pub fn number_to_words_en(n: u64) -> String {
    if n == 0 {
        return "zero".to_string();
    }
    let mut parts = Vec::new();
    for (idx, chunk) in chunks(n).into_iter().enumerate() {
        if chunk == 0 {
            continue;
        }
        let mut txt = en_chunk(chunk);
        if !EN_SCALES[idx].is_empty() {
            txt.push(' ');
            txt.push_str(EN_SCALES[idx]);
        }
        parts.push(txt);
    }
    parts.reverse();
    parts.join(" ")
}

fn tr_chunk(mut x: u64) -> String {
    let mut w: Vec<&str> = Vec::new();
    if x >= 100 {
        // "yüz", never "bir yüz"
        if x / 100 > 1 {
            w.push(TR_ONES[(x / 100) as usize]);
        }
        w.push("yüz");
        x %= 100;
    }
    if x >= 10 {
        w.push(TR_TENS[(x / 10) as usize]);
        x %= 10;
    }
    if x > 0 {
        w.push(TR_ONES[x as usize]);
    }
    w.join(" ")
}

pub fn number_to_words_tr(n: u64) -> String {
    if n == 0 {
        return "sıfır".to_string();
    }
    let mut parts = Vec::new();
    for (idx, chunk) in chunks(n).into_iter().enumerate() {
        if chunk == 0 {
            continue;
        }
        let txt = if idx == 1 && chunk == 1 {
            "bin".to_string()
        } else if TR_SCALES[idx].is_empty() {
            tr_chunk(chunk)
        } else {
            format!("{} {}", tr_chunk(chunk), TR_SCALES[idx])
        };
        parts.push(txt);
    }
    parts.reverse();
    parts.join(" ")
}

fn ar_1_99(x: u64) -> String {
    if x < 20 {
        return AR_ONES[x as usize].to_string();
    }
    let (t, u) = (x / 10, x % 10);
    if u == 0 {
        AR_TENS[t as usize].to_string()
    } else {
        format!("{} و {}", AR_ONES[u as usize], AR_TENS[t as usize])
    }
}

fn ar_1_999(x: u64) -> String {
    let (h, r) = (x / 100, x % 100);
    let mut parts = Vec::new();
    if h > 0 {
        parts.push(AR_HUNDREDS[h as usize].to_string());
    }
    if r > 0 {
        parts.push(ar_1_99(r));
    }
    parts.join(" و ")
}

fn ar_count(n: u64) -> String {
    if n < 1000 {
        ar_1_999(n)
    } else {
        number_to_words_ar(n)
    }
}

pub fn number_to_words_ar(n: u64) -> String {
    if n == 0 {
        return "صفر".to_string();
    }
    let mut rest = n;
    let mut parts = Vec::new();
    for scale in &AR_SCALES {
        let count = rest / scale.value;
        rest %= scale.value;
        match count {
            0 => {}
            1 => parts.push(scale.singular.to_string()),
            2 => parts.push(scale.dual.to_string()),
            3..=10 => parts.push(format!("{} {}", ar_count(count), scale.plural)),
            _ => parts.push(format!("{} {}", ar_count(count), scale.singular)),
        }
    }
    if rest > 0 {
        parts.push(ar_1_999(rest));
    }
    parts.join(" و ")
}
