//! Pricing engine
//!
//! Maps a reservation window to a flat-fee cost under day/week/month
//! rates, where the longer units carry a volume discount. Duration is
//! rounded up to whole days first.
//!
//! The engine enumerates four decompositions (greedy, all-weeks,
//! all-months, all-days) and takes the cheapest. This is only exhaustive
//! because the three unit sizes are fixed and nested (1 < 7 < 30) with
//! flat per-unit rates; if unit sizes ever become configurable or
//! non-nested this needs a real coin-change search.

use crate::domain::TimeWindow;

const SECS_PER_DAY: i64 = 86_400;
const DAYS_PER_WEEK: i64 = 7;
const DAYS_PER_MONTH: i64 = 30;

/// Flat per-unit rates in cents.
#[derive(Debug, Clone, Copy)]
pub struct RateCard {
    pub day_cents: i64,
    pub week_cents: i64,
    pub month_cents: i64,
}

impl Default for RateCard {
    fn default() -> Self {
        Self {
            day_cents: 1500,
            week_cents: 5000,
            month_cents: 10000,
        }
    }
}

/// Unit decomposition behind a quoted total. Derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub months: i64,
    pub weeks: i64,
    pub days: i64,
    pub total_cents: i64,
}

impl PriceBreakdown {
    pub fn zero() -> Self {
        Self {
            months: 0,
            weeks: 0,
            days: 0,
            total_cents: 0,
        }
    }

    /// Human-readable dollar total, e.g. `$15.00`.
    pub fn format_total(&self) -> String {
        format!("${}.{:02}", self.total_cents / 100, self.total_cents % 100)
    }
}

impl RateCard {
    /// Quote a window. Elapsed hours are rounded up to the next whole
    /// day before unit decomposition.
    pub fn quote(&self, window: &TimeWindow) -> PriceBreakdown {
        let secs = window.duration().num_seconds();
        if secs <= 0 {
            // Defensive floor: the normalizer rejects such windows upstream.
            return PriceBreakdown::zero();
        }
        self.quote_days((secs + SECS_PER_DAY - 1) / SECS_PER_DAY)
    }

    /// Quote a whole-day duration: cheapest of the four candidate
    /// decompositions, preferring the coarsest unit on a tie.
    pub fn quote_days(&self, total_days: i64) -> PriceBreakdown {
        if total_days <= 0 {
            return PriceBreakdown::zero();
        }

        let months = total_days / DAYS_PER_MONTH;
        let mut remaining = total_days - months * DAYS_PER_MONTH;
        let weeks = remaining / DAYS_PER_WEEK;
        remaining -= weeks * DAYS_PER_WEEK;
        let days = remaining;

        let greedy = months * self.month_cents + weeks * self.week_cents + days * self.day_cents;
        let all_weeks = (total_days + DAYS_PER_WEEK - 1) / DAYS_PER_WEEK * self.week_cents;
        let all_months = (total_days + DAYS_PER_MONTH - 1) / DAYS_PER_MONTH * self.month_cents;
        let all_days = total_days * self.day_cents;

        let best = greedy.min(all_weeks).min(all_months).min(all_days);

        if best == all_months {
            PriceBreakdown {
                months: (total_days + DAYS_PER_MONTH - 1) / DAYS_PER_MONTH,
                weeks: 0,
                days: 0,
                total_cents: best,
            }
        } else if best == all_weeks {
            PriceBreakdown {
                months: 0,
                weeks: (total_days + DAYS_PER_WEEK - 1) / DAYS_PER_WEEK,
                days: 0,
                total_cents: best,
            }
        } else if best == all_days {
            PriceBreakdown {
                months: 0,
                weeks: 0,
                days: total_days,
                total_cents: best,
            }
        } else {
            PriceBreakdown {
                months,
                weeks,
                days,
                total_cents: best,
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> RateCard {
        RateCard::default()
    }

    fn window(start: &str, end: &str) -> TimeWindow {
        TimeWindow::new(start.parse().unwrap(), end.parse().unwrap())
    }

    #[test]
    fn single_day_costs_day_rate() {
        let q = rates().quote(&window("2024-01-10T10:00:00Z", "2024-01-11T10:00:00Z"));
        assert_eq!(q.days, 1);
        assert_eq!(q.total_cents, 1500);
    }

    #[test]
    fn partial_day_rounds_up() {
        // 25 hours -> 2 days
        let q = rates().quote(&window("2024-01-10T10:00:00Z", "2024-01-11T11:00:00Z"));
        assert_eq!(q.days, 2);
        assert_eq!(q.total_cents, 3000);
    }

    #[test]
    fn thirty_days_tie_prefers_month() {
        let q = rates().quote_days(30);
        assert_eq!(
            q,
            PriceBreakdown {
                months: 1,
                weeks: 0,
                days: 0,
                total_cents: 10000
            }
        );
    }

    #[test]
    fn seven_days_tie_prefers_week() {
        let q = rates().quote_days(7);
        assert_eq!(q.weeks, 1);
        assert_eq!(q.months, 0);
        assert_eq!(q.days, 0);
        assert_eq!(q.total_cents, 5000);
    }

    #[test]
    fn rounding_up_to_a_month_can_beat_greedy() {
        // 3 weeks + 4 days greedy = 21000, one month = 10000
        let q = rates().quote_days(25);
        assert_eq!(q.months, 1);
        assert_eq!(q.total_cents, 10000);
    }

    #[test]
    fn greedy_wins_when_units_fit() {
        // 1 week + 3 days = 9500 beats 2 weeks (10000) and 1 month (10000)
        let q = rates().quote_days(10);
        assert_eq!((q.months, q.weeks, q.days), (0, 1, 3));
        assert_eq!(q.total_cents, 9500);
    }

    #[test]
    fn zero_or_negative_duration_is_free() {
        assert_eq!(rates().quote_days(0), PriceBreakdown::zero());
        assert_eq!(rates().quote_days(-3), PriceBreakdown::zero());
        let q = rates().quote(&window("2024-01-11T00:00:00Z", "2024-01-10T00:00:00Z"));
        assert_eq!(q, PriceBreakdown::zero());
    }

    #[test]
    fn quoted_total_is_never_worse_than_any_candidate() {
        let r = rates();
        for total_days in 1..=400 {
            let months = total_days / 30;
            let rem = total_days - months * 30;
            let weeks = rem / 7;
            let days = rem - weeks * 7;
            let candidates = [
                months * r.month_cents + weeks * r.week_cents + days * r.day_cents,
                (total_days + 7 - 1) / 7 * r.week_cents,
                (total_days + 30 - 1) / 30 * r.month_cents,
                total_days * r.day_cents,
            ];
            let best = *candidates.iter().min().unwrap();
            assert_eq!(
                r.quote_days(total_days).total_cents,
                best,
                "total_days={total_days}"
            );
        }
    }

    #[test]
    fn price_is_monotonic_in_duration() {
        let r = rates();
        for total_days in 1..400 {
            assert!(
                r.quote_days(total_days).total_cents <= r.quote_days(total_days + 1).total_cents,
                "price regressed between {total_days} and {} days",
                total_days + 1
            );
        }
    }

    #[test]
    fn breakdown_units_account_for_the_total() {
        let r = rates();
        for total_days in 1..=120 {
            let q = r.quote_days(total_days);
            assert_eq!(
                q.total_cents,
                q.months * r.month_cents + q.weeks * r.week_cents + q.days * r.day_cents
            );
        }
    }

    #[test]
    fn formats_dollars() {
        assert_eq!(rates().quote_days(1).format_total(), "$15.00");
        let q = PriceBreakdown {
            months: 0,
            weeks: 0,
            days: 0,
            total_cents: 1234,
        };
        assert_eq!(q.format_total(), "$12.34");
    }
}
