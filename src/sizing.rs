//! Quantity/margin synchronization.
//!
//! Quantity is the notional position size in account currency. Margin is the
//! cash set aside for it and is always `quantity / leverage`; it is never
//! written on its own. Every mutation goes through [`PositionSizer::apply`],
//! which recomputes margin from the new state.

/// Number of increments between zero and the solvency ceiling.
pub const STEP_DIVISOR: f64 = 100.0;

/// Tagged mutation of the sizing state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizingUpdate {
    Quantity(f64),
    Leverage(u32),
}

/// Result of a user edit against the sizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizingOutcome {
    /// New quantity stored as requested.
    Committed,
    /// Manual entry exceeded the ceiling and was pinned to it.
    Clamped,
    /// Edit not applicable in the current state (e.g. decrease at the floor).
    Unchanged,
    /// Increase refused because the resulting margin would exceed the ceiling.
    Rejected { candidate: f64, margin: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSizer {
    quantity: f64,
    leverage: u32,
    margin: f64,
}

/// Increment used by the +/- controls: one percent of the ceiling.
///
/// Shrinks to zero as the ceiling approaches zero.
pub fn quantity_step(ceiling: f64) -> f64 {
    ceiling / STEP_DIVISOR
}

pub fn margin_for(quantity: f64, leverage: u32) -> f64 {
    quantity / f64::from(leverage.max(1))
}

/// Lenient number parse for text inputs: reads the longest leading decimal
/// literal and ignores the rest (`"12.5usd"` is 12.5). Anything without a
/// leading number, or a non-finite result, reads as 0.
pub fn parse_amount(raw: &str) -> f64 {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut pos = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            pos = 1;
            true
        }
        Some(b'+') => {
            pos = 1;
            false
        }
        _ => false,
    };

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_digits = &s[int_start..pos];

    let mut frac_digits = "";
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        frac_digits = &s[frac_start..frac_end];
        pos = frac_end;
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return 0.0;
    }

    let mut exponent = "";
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut exp_end = pos + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            exponent = &s[pos..exp_end];
        }
    }

    let mut literal = String::with_capacity(s.len() + 2);
    if negative {
        literal.push('-');
    }
    literal.push_str(if int_digits.is_empty() { "0" } else { int_digits });
    if !frac_digits.is_empty() {
        literal.push('.');
        literal.push_str(frac_digits);
    }
    literal.push_str(exponent);

    literal
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

impl PositionSizer {
    pub fn new(quantity: f64, leverage: u32) -> Self {
        let mut sizer = Self {
            quantity: 0.0,
            leverage: leverage.max(1),
            margin: 0.0,
        };
        sizer.apply(SizingUpdate::Quantity(quantity.max(0.0)));
        sizer
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn leverage(&self) -> u32 {
        self.leverage
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    fn apply(&mut self, update: SizingUpdate) {
        match update {
            SizingUpdate::Quantity(q) => self.quantity = q,
            SizingUpdate::Leverage(l) => self.leverage = l.max(1),
        }
        self.margin = margin_for(self.quantity, self.leverage);
    }

    /// Range checks belong to the leverage input; only zero is coerced (to 1).
    pub fn set_leverage(&mut self, leverage: u32) {
        self.apply(SizingUpdate::Leverage(leverage));
    }

    /// Step quantity up by one increment if the resulting margin stays
    /// within `ceiling`. On rejection the state is left untouched.
    pub fn increase(&mut self, ceiling: f64) -> SizingOutcome {
        let candidate = self.quantity + quantity_step(ceiling);
        let margin = margin_for(candidate, self.leverage);
        if margin > ceiling {
            return SizingOutcome::Rejected { candidate, margin };
        }
        self.apply(SizingUpdate::Quantity(candidate));
        SizingOutcome::Committed
    }

    /// Step quantity down by one increment while it is above one increment.
    pub fn decrease(&mut self, ceiling: f64) -> SizingOutcome {
        let step = quantity_step(ceiling);
        if self.quantity <= step {
            return SizingOutcome::Unchanged;
        }
        self.apply(SizingUpdate::Quantity(self.quantity - step));
        SizingOutcome::Committed
    }

    /// Manual entry. Values above `ceiling` are clamped silently; negative
    /// and unparseable input reads as 0.
    pub fn enter_quantity(&mut self, raw: &str, ceiling: f64) -> SizingOutcome {
        let value = parse_amount(raw).max(0.0);
        if value > ceiling {
            self.apply(SizingUpdate::Quantity(ceiling.max(0.0)));
            return SizingOutcome::Clamped;
        }
        self.apply(SizingUpdate::Quantity(value));
        SizingOutcome::Committed
    }
}
