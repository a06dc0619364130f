/// EV above which a position is assessed Add
pub const ADD_THRESHOLD: f64 = 7.0;

/// Default EV boundary between Trim and Sell
pub const DEFAULT_SELL_THRESHOLD: f64 = -5.0;

/// EV targeted when deriving the maximum attractive entry price
pub const DEFAULT_TARGET_EV: f64 = 15.0;

/// Upper bound for half-Kelly sizing, in percent
pub const HALF_KELLY_CAP: f64 = 15.0;

/// Probability of a positive outcome used when none is supplied
pub const DEFAULT_PROBABILITY_POSITIVE: f64 = 0.65;

/// Default absolute EV delta that raises an `ev_change` alert
pub const DEFAULT_ALERT_THRESHOLD_EV: f64 = 10.0;

/// Snapshots retained per position
pub const DEFAULT_HISTORY_RETENTION: usize = 100;

/// Buy zone fallback band, as fractions of the reference price
pub const BUY_ZONE_FALLBACK_MIN: f64 = 0.85;
pub const BUY_ZONE_FALLBACK_MAX: f64 = 0.95;

/// Width of the derived buy zone below its maximum
pub const BUY_ZONE_WIDTH: f64 = 0.9;

/// Tolerance when checking provider-computed EV against the formula
pub const SUPPLIED_EV_TOLERANCE: f64 = 0.5;

/// Upside above which a warning is logged
pub const UPSIDE_WARNING_PERCENT: f64 = 100.0;

/// Default base currency for normalized values
pub const DEFAULT_BASE_CURRENCY: &str = "USD";

/// Provenance markers
pub const DATA_SOURCE_NONE: &str = "None";
pub const DATA_SOURCE_MANUAL: &str = "Manual";
pub const FAIR_VALUE_SOURCE_NONE: &str = "Not available";

/// Sector bucket for positions without one
pub const UNKNOWN_SECTOR: &str = "Unknown";
