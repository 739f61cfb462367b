use rust_decimal::{Decimal, RoundingStrategy};

/// Formats an amount the way the gateway expects it on the wire.
///
/// Always two fraction digits with a dot separator and no grouping, so
/// `19.5` becomes `"19.50"`. Extra precision is rounded half away from zero.
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}
