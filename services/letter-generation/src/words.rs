//! Russian amount-in-words formatting for the letter body.
//!
//! Totals are quoted twice in a claim letter: in figures and spelled out.
//! Grammatical agreement matters: unit words decline by the last two digits
//! (1 рубль / 2 рубля / 5 рублей, with the 11–14 exception), and thousands
//! take feminine numeral forms («одна тысяча», «две тысячи»).

const ONES: [&str; 20] = [
    "",
    "один",
    "два",
    "три",
    "четыре",
    "пять",
    "шесть",
    "семь",
    "восемь",
    "девять",
    "десять",
    "одиннадцать",
    "двенадцать",
    "тринадцать",
    "четырнадцать",
    "пятнадцать",
    "шестнадцать",
    "семнадцать",
    "восемнадцать",
    "девятнадцать",
];

const TENS: [&str; 10] = [
    "",
    "",
    "двадцать",
    "тридцать",
    "сорок",
    "пятьдесят",
    "шестьдесят",
    "семьдесят",
    "восемьдесят",
    "девяносто",
];

const HUNDREDS: [&str; 10] = [
    "",
    "сто",
    "двести",
    "триста",
    "четыреста",
    "пятьсот",
    "шестьсот",
    "семьсот",
    "восемьсот",
    "девятьсот",
];

/// Pick the declined form for a count: `one` for 1, `few` for 2–4, `many`
/// otherwise, with 11–14 always taking `many`.
pub fn plural_form<'a>(n: u64, one: &'a str, few: &'a str, many: &'a str) -> &'a str {
    let last_two = n % 100;
    let last = n % 10;
    if last == 1 && last_two != 11 {
        one
    } else if (2..=4).contains(&last) && !(12..=14).contains(&last_two) {
        few
    } else {
        many
    }
}

fn triple_to_words(n: u64, feminine: bool) -> String {
    debug_assert!(n < 1000);
    let mut parts = Vec::new();
    let mut n = n;

    if n >= 100 {
        parts.push(HUNDREDS[(n / 100) as usize]);
        n %= 100;
    }
    if n >= 20 {
        parts.push(TENS[(n / 10) as usize]);
        n %= 10;
    }
    if n > 0 {
        parts.push(match (n, feminine) {
            (1, true) => "одна",
            (2, true) => "две",
            _ => ONES[n as usize],
        });
    }

    parts.join(" ")
}

/// Spell out a non-negative integer in Russian.
pub fn number_to_words(n: u64) -> String {
    if n == 0 {
        return "ноль".to_string();
    }

    // (scale words, feminine agreement) from the largest group down.
    let groups: [(u64, &str, &str, &str, bool); 3] = [
        (1_000_000_000, "миллиард", "миллиарда", "миллиардов", false),
        (1_000_000, "миллион", "миллиона", "миллионов", false),
        (1_000, "тысяча", "тысячи", "тысяч", true),
    ];

    let mut parts = Vec::new();
    let mut rest = n;

    for (scale, one, few, many, feminine) in groups {
        let count = rest / scale;
        if count > 0 {
            parts.push(triple_to_words(count, feminine));
            parts.push(plural_form(count, one, few, many).to_string());
            rest %= scale;
        }
    }
    if rest > 0 {
        parts.push(triple_to_words(rest, false));
    }

    parts.join(" ")
}

/// Format a monetary amount as «<words> рублей NN копеек».
pub fn amount_in_words(amount: f64) -> String {
    let total_kopecks = (amount.max(0.0) * 100.0).round() as u64;
    let rubles = total_kopecks / 100;
    let kopecks = total_kopecks % 100;

    let ruble_form = plural_form(rubles, "рубль", "рубля", "рублей");
    let kopeck_form = plural_form(kopecks, "копейка", "копейки", "копеек");

    format!(
        "{} {} {:02} {}",
        number_to_words(rubles),
        ruble_form,
        kopecks,
        kopeck_form
    )
}
