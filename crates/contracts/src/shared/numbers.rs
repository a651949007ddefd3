//! Нестрогий разбор чисел из форм и вывод чисел в таблицах и экспорте.

/// Разбор введённого числа: символы валют, пробелы и разделители разрядов
/// отбрасываются. Всё, что не разобралось, становится `0.0`.
///
/// `"₹ 1,20,000"` → `120000.0`, `"12.5 sqft"` → `12.5`
pub fn coerce_number(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// То же, что `coerce_number`, с отбрасыванием дробной части
pub fn coerce_int(raw: &str) -> i64 {
    coerce_number(raw).trunc() as i64
}

/// Пустой ввод остаётся `None`
pub fn coerce_optional_int(raw: &str) -> Option<i64> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(coerce_int(raw))
    }
}

/// Целые без дробной части: `100.0` → `"100"`, `12.5` → `"12.5"`
pub fn format_plain(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Разряды через пробел: `1234567` → `"1 234 567"`
pub fn format_grouped(value: f64) -> String {
    let plain = format_plain(value);
    let (sign, rest) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain.as_str()),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    let int_grouped: String = grouped.chars().rev().collect();

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, int_grouped, f),
        None => format!("{}{}", sign, int_grouped),
    }
}
